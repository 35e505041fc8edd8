//! stdio 行协议：一行 `{"tool": "...", "args": {...}}` 进，一行 JSON 记录出
//!
//! 任何失败都转成 `status = "error"` 的记录，调用方的读循环不因单行出错而中断。

use crate::core::ToolError;

use super::{ToolCall, ToolExecutor};

/// 处理一行请求，返回要写回的 JSON 记录
pub async fn handle_line(executor: &ToolExecutor, line: &str) -> String {
    let call: ToolCall = match serde_json::from_str(line) {
        Ok(call) => call,
        Err(e) => {
            tracing::debug!("Rejected request line: {e}");
            return error_record("invalid_request", &format!("Invalid request line: {e}"));
        }
    };

    match executor.execute(&call.tool, call.args).await {
        Ok(content) => content,
        Err(err) => error_record(transport_kind(&err), &err.to_string()),
    }
}

fn transport_kind(err: &ToolError) -> &'static str {
    match err {
        ToolError::UnknownTool(_) => "unknown_tool",
        ToolError::ExecutionFailed(_) => "invalid_arguments",
        ToolError::Timeout(_) => "timeout",
    }
}

fn error_record(kind: &str, message: &str) -> String {
    serde_json::json!({
        "status": "error",
        "error_kind": kind,
        "error": message,
    })
    .to_string()
}
