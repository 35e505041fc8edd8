//! 工具结果记录与参数解析辅助
//!
//! 每个结果都是带 `status` 字段的 JSON 对象：成功为 "success"，失败为 "error" 并附 `error_kind` / `error`。

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::OrchestrationError;
use crate::orchestration::Payload;

/// 成功记录：`status` 在最前，其余字段来自 payload（须为对象）
pub fn success(payload: Value) -> String {
    let mut record = Map::new();
    record.insert("status".to_string(), Value::String("success".to_string()));
    if let Value::Object(fields) = payload {
        record.extend(fields);
    }
    Value::Object(record).to_string()
}

/// 失败记录
pub fn failure(err: &OrchestrationError) -> String {
    serde_json::json!({
        "status": "error",
        "error_kind": err.kind(),
        "error": err.to_string(),
    })
    .to_string()
}

/// 业务结果转记录
pub fn record<T>(
    result: Result<T, OrchestrationError>,
    on_success: impl FnOnce(T) -> Value,
) -> String {
    match result {
        Ok(value) => success(on_success(value)),
        Err(err) => {
            tracing::debug!(error_kind = %err.kind(), "{err}");
            failure(&err)
        }
    }
}

/// 解析参数；无参数（null）视为空对象
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, String> {
    let args = if args.is_null() {
        Value::Object(Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {e}"))
}

/// 空字符串视为未提供
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim();
        (!v.is_empty()).then(|| v.to_string())
    })
}

/// 字符串参数按 JSON 文本解析，其余 JSON 值原样作为文档
pub fn payload_arg(value: Value) -> Payload {
    match value {
        Value::String(text) => Payload::Text(text),
        other => Payload::Json(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_record_puts_status_first() {
        let out = success(json!({"task_id": "task_1", "priority": 5}));
        assert!(out.starts_with(r#"{"status":"success""#));
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["priority"], json!(5));
    }

    #[test]
    fn test_failure_record() {
        let out = failure(&OrchestrationError::NoAvailableTask("A".to_string()));
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], json!("error"));
        assert_eq!(v["error_kind"], json!("no_available_task"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(" ".into())), None);
        assert_eq!(non_empty(Some(" A ".into())), Some("A".to_string()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_payload_arg() {
        assert_eq!(payload_arg(json!("{}")), Payload::Text("{}".to_string()));
        assert_eq!(payload_arg(json!({"a": 1})), Payload::Json(json!({"a": 1})));
    }
}
