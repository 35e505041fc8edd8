//! Agent 会话工具：register_agent / list_active_agents / deregister_agent

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::response::{parse_args, record};
use super::schema::schema_of;
use crate::orchestration::{Orchestration, Registration};
use crate::tools::Tool;

/// 能力列表：逗号分隔字符串或字符串数组
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Capabilities {
    List(Vec<String>),
    Csv(String),
}

impl Capabilities {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Capabilities::List(list) => list,
            Capabilities::Csv(csv) => csv.split(',').map(|c| c.trim().to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RegisterAgentArgs {
    /// 会话唯一标识，如 "cursor-session-1"
    agent_id: String,
    /// cursor / windsurf / claude_desktop / custom，其他值原样保留
    agent_type: String,
    /// 能力标签，如 "blueprint_creation,level_design"
    #[serde(default)]
    capabilities: Option<Capabilities>,
}

/// register_agent 工具
pub struct RegisterAgentTool {
    orchestration: Arc<Orchestration>,
}

impl RegisterAgentTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for RegisterAgentTool {
    fn name(&self) -> &str {
        "register_agent"
    }

    fn description(&self) -> &str {
        "Register an AI agent session for coordinated multi-agent workflows. Re-registering an existing id re-activates it. Args: {\"agent_id\": \"cursor-main\", \"agent_type\": \"cursor\", \"capabilities\": \"blueprint_creation,level_design\"}"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<RegisterAgentArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: RegisterAgentArgs = parse_args(args)?;
        let capabilities = args.capabilities.map(Capabilities::into_vec).unwrap_or_default();
        let result = self.orchestration.register_agent(
            &args.agent_id,
            args.agent_type.as_str(),
            capabilities,
        );
        Ok(record(result, |(session, kind)| {
            let message = match kind {
                Registration::Created => format!("Agent {} registered successfully", session.id),
                Registration::Reactivated => format!("Agent {} re-activated", session.id),
            };
            json!({ "message": message, "agent": session })
        }))
    }
}

/// list_active_agents 工具
pub struct ListActiveAgentsTool {
    orchestration: Arc<Orchestration>,
}

impl ListActiveAgentsTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for ListActiveAgentsTool {
    fn name(&self) -> &str {
        "list_active_agents"
    }

    fn description(&self) -> &str {
        "List all active agent sessions in registration order, with task counts and idle time. No args."
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        let agents = self.orchestration.list_active_agents();
        Ok(record(Ok(agents), |agents| {
            json!({ "total_agents": agents.len(), "agents": agents })
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DeregisterAgentArgs {
    /// 要移除的会话 id
    agent_id: String,
}

/// deregister_agent 工具
pub struct DeregisterAgentTool {
    orchestration: Arc<Orchestration>,
}

impl DeregisterAgentTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for DeregisterAgentTool {
    fn name(&self) -> &str {
        "deregister_agent"
    }

    fn description(&self) -> &str {
        "Remove an agent session. Fails with not_found if the id is unknown (treat as already gone). Args: {\"agent_id\": \"cursor-main\"}"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<DeregisterAgentArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: DeregisterAgentArgs = parse_args(args)?;
        let result = self.orchestration.deregister_agent(&args.agent_id);
        Ok(record(result, |session| {
            json!({ "message": format!("Agent {} deregistered successfully", session.id) })
        }))
    }
}
