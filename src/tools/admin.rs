//! 工作台管理工具：get_orchestration_status / clear_orchestration_state

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::response::{parse_args, record};
use super::schema::schema_of;
use crate::orchestration::Orchestration;
use crate::tools::Tool;

/// get_orchestration_status 工具
pub struct OrchestrationStatusTool {
    orchestration: Arc<Orchestration>,
}

impl OrchestrationStatusTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for OrchestrationStatusTool {
    fn name(&self) -> &str {
        "get_orchestration_status"
    }

    fn description(&self) -> &str {
        "Aggregate counts of agents, tasks by status, knowledge atoms and history entries. No args."
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        let status = self.orchestration.status();
        Ok(record(Ok(status), |status| json!({ "orchestration": status })))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ClearStateArgs {
    /// 必须为 true 才会清空
    #[serde(default)]
    confirm: bool,
}

/// clear_orchestration_state 工具
pub struct ClearOrchestrationStateTool {
    orchestration: Arc<Orchestration>,
}

impl ClearOrchestrationStateTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for ClearOrchestrationStateTool {
    fn name(&self) -> &str {
        "clear_orchestration_state"
    }

    fn description(&self) -> &str {
        "Remove all agents, tasks, history and shared knowledge. WARNING: irreversible; requires {\"confirm\": true}."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<ClearStateArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: ClearStateArgs = parse_args(args)?;
        let result = self.orchestration.reset(args.confirm);
        Ok(record(result, |()| {
            json!({ "message": "Orchestration state cleared successfully" })
        }))
    }
}
