//! 结构化文档载荷（content / params / result / metadata）
//!
//! 核心不理解载荷语义，只要求格式合法。调用方可以传 JSON 文本，也可以直接传已解析的值。

use serde_json::{Map, Value};

use crate::core::OrchestrationError;

/// 不透明的结构化文档（null / bool / number / string / 有序列表 / 有序映射）
pub type Document = Value;

/// 进入核心前的载荷
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 尚未解析的 JSON 文本
    Text(String),
    /// 已是结构化值
    Json(Value),
}

impl Payload {
    /// 校验并得到文档；空白文本视为空对象
    pub fn into_document(self, field: &str) -> Result<Document, OrchestrationError> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Text(text) if text.trim().is_empty() => Ok(Value::Object(Map::new())),
            Payload::Text(text) => serde_json::from_str(&text).map_err(|e| {
                OrchestrationError::Validation(format!("Invalid JSON in {field}: {e}"))
            }),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// 校验可选载荷
pub fn optional_document(
    payload: Option<Payload>,
    field: &str,
) -> Result<Option<Document>, OrchestrationError> {
    payload.map(|p| p.into_document(field)).transpose()
}
