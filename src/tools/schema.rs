//! 工具调用请求格式与参数 Schema 生成（schemars）

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

/// 一次工具调用：`{"tool": "...", "args": {...}}`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ToolCall {
    /// 工具名，如 register_agent、claim_workflow_task
    pub tool: String,
    /// 工具参数，依工具不同而不同
    #[serde(default)]
    pub args: Value,
}

/// 参数结构体的 JSON Schema（作为 Tool::parameters_schema）
pub fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null)
}
