//! 工作流任务工具：create / claim / complete / list / history

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::response::{failure, non_empty, parse_args, payload_arg, record};
use super::schema::schema_of;
use crate::orchestration::{Orchestration, TaskSpec, TaskStatus};
use crate::tools::Tool;

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateTaskArgs {
    /// 任务类型，如 create_actor / create_blueprint / setup_level
    task_type: String,
    /// 任务参数：JSON 文本或 JSON 值
    task_params: Value,
    /// 预分配的 agent，只有它能领取
    #[serde(default)]
    assigned_agent: Option<String>,
    /// 越大越优先，默认 0
    #[serde(default)]
    priority: i64,
}

/// create_workflow_task 工具
pub struct CreateWorkflowTaskTool {
    orchestration: Arc<Orchestration>,
}

impl CreateWorkflowTaskTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for CreateWorkflowTaskTool {
    fn name(&self) -> &str {
        "create_workflow_task"
    }

    fn description(&self) -> &str {
        "Create a workflow task. Unassigned tasks can be claimed by any agent; higher priority is claimed first. Args: {\"task_type\": \"create_actor\", \"task_params\": \"{\\\"name\\\": \\\"TestCube\\\"}\", \"assigned_agent\": \"\", \"priority\": 5}"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<CreateTaskArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: CreateTaskArgs = parse_args(args)?;
        let mut spec = TaskSpec::new(args.task_type, payload_arg(args.task_params))
            .with_priority(args.priority);
        if let Some(agent) = non_empty(args.assigned_agent) {
            spec = spec.assigned_to(agent);
        }

        let result = self.orchestration.create_workflow_task(spec);
        Ok(record(result, |task| {
            json!({
                "task_id": task.task_id,
                "task_type": task.task_type,
                "priority": task.priority,
                "assigned_agent": task.assigned_agent.as_deref().unwrap_or("unassigned"),
            })
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ClaimTaskArgs {
    /// 领取者 agent id
    agent_id: String,
    /// 指定任务；留空则自动领取最高优先级的可领任务
    #[serde(default)]
    task_id: Option<String>,
}

/// claim_workflow_task 工具
pub struct ClaimWorkflowTaskTool {
    orchestration: Arc<Orchestration>,
}

impl ClaimWorkflowTaskTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for ClaimWorkflowTaskTool {
    fn name(&self) -> &str {
        "claim_workflow_task"
    }

    fn description(&self) -> &str {
        "Claim a workflow task. Without task_id, claims the highest-priority pending task that is unassigned or assigned to this agent (oldest first on ties). Args: {\"agent_id\": \"cursor-main\", \"task_id\": \"\"}"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<ClaimTaskArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: ClaimTaskArgs = parse_args(args)?;
        let task_id = non_empty(args.task_id);
        let result = self
            .orchestration
            .claim_workflow_task(&args.agent_id, task_id.as_deref());
        Ok(record(result, |task| {
            json!({
                "task_id": task.task_id,
                "task_type": task.task_type,
                "params": task.params,
                "priority": task.priority,
            })
        }))
    }
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CompleteTaskArgs {
    /// 已领取的任务 id
    task_id: String,
    /// 任务结果：JSON 文本或 JSON 值
    result: Value,
    /// false 表示失败，默认 true
    #[serde(default = "default_success")]
    success: bool,
}

/// complete_workflow_task 工具
pub struct CompleteWorkflowTaskTool {
    orchestration: Arc<Orchestration>,
}

impl CompleteWorkflowTaskTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for CompleteWorkflowTaskTool {
    fn name(&self) -> &str {
        "complete_workflow_task"
    }

    fn description(&self) -> &str {
        "Mark a claimed task as completed (success=true) or failed (success=false) and store its result. Args: {\"task_id\": \"task_...\", \"result\": \"{\\\"actor_name\\\": \\\"TestCube\\\"}\", \"success\": true}"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<CompleteTaskArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: CompleteTaskArgs = parse_args(args)?;
        let result = self.orchestration.complete_workflow_task(
            &args.task_id,
            payload_arg(args.result),
            args.success,
        );
        Ok(record(result, |task| {
            json!({
                "message": format!("Task {} completed with status: {}", task.task_id, task.status),
                "task_id": task.task_id,
                "task_status": task.status,
            })
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListTasksArgs {
    /// pending / claimed / completed / failed，空表示全部
    #[serde(default)]
    status: Option<String>,
    /// 预分配或领取者为该 agent 的任务
    #[serde(default)]
    assigned_agent: Option<String>,
}

/// list_workflow_tasks 工具
pub struct ListWorkflowTasksTool {
    orchestration: Arc<Orchestration>,
}

impl ListWorkflowTasksTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for ListWorkflowTasksTool {
    fn name(&self) -> &str {
        "list_workflow_tasks"
    }

    fn description(&self) -> &str {
        "List workflow tasks in claim order (priority desc, then oldest first). Args: {\"status\": \"pending\", \"assigned_agent\": \"\"}"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<ListTasksArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: ListTasksArgs = parse_args(args)?;
        let status = match non_empty(args.status).map(|s| s.parse::<TaskStatus>()).transpose() {
            Ok(status) => status,
            Err(err) => return Ok(failure(&err)),
        };
        let agent = non_empty(args.assigned_agent);

        let tasks = self
            .orchestration
            .list_workflow_tasks(status, agent.as_deref());
        Ok(record(Ok(tasks), |tasks| {
            json!({ "total_tasks": tasks.len(), "tasks": tasks })
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct HistoryArgs {
    /// 最多返回条数，默认取配置
    #[serde(default)]
    limit: Option<usize>,
}

/// get_workflow_history 工具
pub struct WorkflowHistoryTool {
    orchestration: Arc<Orchestration>,
}

impl WorkflowHistoryTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for WorkflowHistoryTool {
    fn name(&self) -> &str {
        "get_workflow_history"
    }

    fn description(&self) -> &str {
        "Most recent task completions (completed and failed), newest first. Args: {\"limit\": 10}"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<HistoryArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: HistoryArgs = parse_args(args)?;
        let limit = args
            .limit
            .unwrap_or_else(|| self.orchestration.default_query_limit());
        let history = self.orchestration.workflow_history(limit);
        Ok(record(Ok(history), |history| {
            json!({ "total_entries": history.len(), "history": history })
        }))
    }
}
