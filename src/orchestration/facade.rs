//! 编排门面：三个存储共用一把锁
//!
//! 每次外部调用：取锁 → 对相关存储执行一次原子操作 → 更新活跃信息 → 返回普通记录。
//! 自动领取的「选择 + 状态迁移」因此与其他所有操作互斥。

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::agent::{normalize_id, AgentRegistry, AgentSession, AgentType, AgentView, Registration};
use super::knowledge::{KnowledgeAtom, KnowledgeStore};
use super::payload::{optional_document, Payload};
use super::task_queue::{HistoryEntry, TaskQueue, TaskStatus, WorkflowTask};
use crate::config::OrchestrationSection;
use crate::core::{IdGenerator, OrchestrationError, OrchestrationStatus};

/// 新任务的描述
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub task_type: String,
    pub params: Payload,
    pub assigned_agent: Option<String>,
    pub priority: i64,
}

impl TaskSpec {
    pub fn new(task_type: impl Into<String>, params: impl Into<Payload>) -> Self {
        Self {
            task_type: task_type.into(),
            params: params.into(),
            assigned_agent: None,
            priority: 0,
        }
    }

    pub fn assigned_to(mut self, agent_id: impl Into<String>) -> Self {
        self.assigned_agent = Some(agent_id.into());
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

/// 锁内状态
#[derive(Debug)]
struct OrchestrationState {
    agents: AgentRegistry,
    knowledge: KnowledgeStore,
    tasks: TaskQueue,
}

/// 编排工作台；通过 `Arc<Orchestration>` 注入到调用方
#[derive(Debug)]
pub struct Orchestration {
    state: Mutex<OrchestrationState>,
    ids: IdGenerator,
    settings: OrchestrationSection,
}

impl Orchestration {
    pub fn new(settings: OrchestrationSection) -> Self {
        Self {
            state: Mutex::new(OrchestrationState {
                agents: AgentRegistry::new(),
                knowledge: KnowledgeStore::new(),
                tasks: TaskQueue::new(settings.history_limit),
            }),
            ids: IdGenerator::new(),
            settings,
        }
    }

    /// 临界区内不会留下半更新的状态，锁中毒时直接取回内部数据
    fn lock(&self) -> MutexGuard<'_, OrchestrationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// query_knowledge 未指定 limit 时的默认值
    pub fn default_query_limit(&self) -> usize {
        self.settings.default_query_limit
    }

    pub fn register_agent(
        &self,
        agent_id: &str,
        agent_type: impl Into<AgentType>,
        capabilities: Vec<String>,
    ) -> Result<(AgentSession, Registration), OrchestrationError> {
        let mut state = self.lock();
        let (session, kind) = state
            .agents
            .register(agent_id, agent_type.into(), capabilities)?;
        match kind {
            Registration::Created => tracing::info!(
                agent_id = %session.id,
                agent_type = %session.agent_type,
                "Registered new agent"
            ),
            Registration::Reactivated => {
                tracing::info!(agent_id = %session.id, "Agent re-activated")
            }
        }
        Ok((session, kind))
    }

    pub fn list_active_agents(&self) -> Vec<AgentView> {
        self.lock().agents.list_active()
    }

    pub fn deregister_agent(&self, agent_id: &str) -> Result<AgentSession, OrchestrationError> {
        let session = self.lock().agents.deregister(agent_id)?;
        tracing::info!(agent_id, "Deregistered agent");
        Ok(session)
    }

    /// 标记为 inactive，保留计数；再次 register 恢复
    pub fn deactivate_agent(&self, agent_id: &str) -> Result<AgentSession, OrchestrationError> {
        let session = self.lock().agents.deactivate(agent_id)?;
        tracing::info!(agent_id, "Agent marked inactive");
        Ok(session)
    }

    pub fn share_knowledge(
        &self,
        knowledge_type: &str,
        content: impl Into<Payload>,
        source_agent: Option<&str>,
        metadata: Option<Payload>,
    ) -> Result<KnowledgeAtom, OrchestrationError> {
        // 先校验，失败时不触碰任何状态
        let content = content.into().into_document("content")?;
        let metadata = optional_document(metadata, "metadata")?;
        // 锁外生成 id：并发时存放顺序可能与 id 序号不一致
        let generated = self.ids.generate(knowledge_type);

        let mut state = self.lock();
        let atom = state.knowledge.share(
            generated.id,
            knowledge_type,
            content,
            source_agent.map(str::to_string),
            metadata,
        );
        if let Some(source) = source_agent {
            state.agents.touch(source, false);
        }
        tracing::info!(
            atom_id = %atom.atom_id,
            source_agent = source_agent.unwrap_or("-"),
            "Knowledge shared"
        );
        Ok(atom)
    }

    pub fn query_knowledge(
        &self,
        knowledge_type: Option<&str>,
        source_agent: Option<&str>,
        limit: usize,
    ) -> Vec<KnowledgeAtom> {
        let atoms = self
            .lock()
            .knowledge
            .query(knowledge_type, source_agent, limit);
        tracing::debug!(
            knowledge_type = knowledge_type.unwrap_or("*"),
            results = atoms.len(),
            "Knowledge queried"
        );
        atoms
    }

    pub fn create_workflow_task(&self, spec: TaskSpec) -> Result<WorkflowTask, OrchestrationError> {
        let params = spec.params.into_document("task_params")?;
        // 锁外生成 id：插入顺序可能与 sequence 不一致，FIFO 以 sequence 为准
        let generated = self.ids.generate("task");
        let task = WorkflowTask::new(generated.id, generated.sequence, spec.task_type, params)
            .with_assigned_agent(spec.assigned_agent)
            .with_priority(spec.priority);

        let task = self.lock().tasks.create(task);
        tracing::info!(
            task_id = %task.task_id,
            priority = task.priority,
            "Created workflow task"
        );
        Ok(task)
    }

    /// 领取任务；领取者不存在时计数更新静默跳过，不影响领取结果
    pub fn claim_workflow_task(
        &self,
        agent_id: &str,
        task_id: Option<&str>,
    ) -> Result<WorkflowTask, OrchestrationError> {
        let agent_id = normalize_id(agent_id);
        let mut state = self.lock();
        let task = state.tasks.claim(agent_id, task_id)?;
        if !state.agents.touch(agent_id, true) {
            tracing::debug!(agent_id, "Claiming agent is not registered");
        }
        tracing::info!(task_id = %task.task_id, agent_id, "Task claimed");
        Ok(task)
    }

    pub fn complete_workflow_task(
        &self,
        task_id: &str,
        result: impl Into<Payload>,
        success: bool,
    ) -> Result<WorkflowTask, OrchestrationError> {
        let result = result.into().into_document("result")?;

        let mut state = self.lock();
        let task = state.tasks.complete(task_id, result, success)?;
        if let Some(agent_id) = task.claimed_by.as_deref() {
            state.agents.touch(agent_id, false);
        }
        tracing::info!(task_id, status = %task.status, "Task completed");
        Ok(task)
    }

    pub fn list_workflow_tasks(
        &self,
        status: Option<TaskStatus>,
        agent_id: Option<&str>,
    ) -> Vec<WorkflowTask> {
        self.lock().tasks.list(status, agent_id)
    }

    pub fn workflow_history(&self, limit: usize) -> Vec<HistoryEntry> {
        self.lock().tasks.history(limit)
    }

    /// 一次快照内的聚合计数
    pub fn status(&self) -> OrchestrationStatus {
        let state = self.lock();
        OrchestrationStatus {
            active_agents: state.agents.active_count(),
            total_agents: state.agents.ever_seen(),
            pending_tasks: state.tasks.count_by_status(TaskStatus::Pending),
            claimed_tasks: state.tasks.count_by_status(TaskStatus::Claimed),
            completed_tasks: state.tasks.count_by_status(TaskStatus::Completed),
            failed_tasks: state.tasks.count_by_status(TaskStatus::Failed),
            knowledge_atoms: state.knowledge.len(),
            history_entries: state.tasks.history_len(),
        }
    }

    /// 清空全部状态；`confirm` 为 false 时拒绝且不做任何修改
    pub fn reset(&self, confirm: bool) -> Result<(), OrchestrationError> {
        if !confirm {
            return Err(OrchestrationError::Validation(
                "Must set confirm=true to clear orchestration state".to_string(),
            ));
        }
        let mut state = self.lock();
        state.agents.clear();
        state.knowledge.clear();
        state.tasks.clear();
        tracing::info!("Orchestration state cleared");
        Ok(())
    }
}

impl Default for Orchestration {
    fn default() -> Self {
        Self::new(OrchestrationSection::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_failure_leaves_state_untouched() {
        let orch = Orchestration::default();
        let err = orch
            .share_knowledge("actor", "{broken", Some("A"), None)
            .unwrap_err();
        assert!(matches!(err, OrchestrationError::Validation(_)));

        let err = orch
            .create_workflow_task(TaskSpec::new("t", "[1, 2"))
            .unwrap_err();
        assert!(matches!(err, OrchestrationError::Validation(_)));

        assert!(orch.status().is_empty());
    }

    #[test]
    fn test_bad_metadata_rejected() {
        let orch = Orchestration::default();
        let err = orch
            .share_knowledge("actor", r#"{"v":1}"#, None, Some(Payload::from("nope")))
            .unwrap_err();
        match err {
            OrchestrationError::Validation(msg) => assert!(msg.contains("metadata")),
            other => panic!("Expected Validation, got {other:?}"),
        }
        assert_eq!(orch.status().knowledge_atoms, 0);
    }

    #[test]
    fn test_claim_updates_agent_counters() {
        let orch = Orchestration::default();
        orch.register_agent("A", "cursor", Vec::new()).unwrap();
        orch.create_workflow_task(TaskSpec::new("t", json!({}))).unwrap();
        orch.create_workflow_task(TaskSpec::new("t", json!({}))).unwrap();

        orch.claim_workflow_task("A", None).unwrap();
        orch.claim_workflow_task("A", None).unwrap();

        let agents = orch.list_active_agents();
        assert_eq!(agents[0].session.task_count, 2);
    }

    #[test]
    fn test_unknown_agent_may_claim() {
        let orch = Orchestration::default();
        let task = orch
            .create_workflow_task(TaskSpec::new("t", json!({})).with_priority(2))
            .unwrap();
        let claimed = orch.claim_workflow_task("ghost", None).unwrap();
        assert_eq!(claimed.task_id, task.task_id);
        assert_eq!(orch.status().total_agents, 0);
    }

    #[test]
    fn test_reset_requires_confirm() {
        let orch = Orchestration::default();
        orch.register_agent("A", "custom", Vec::new()).unwrap();
        assert!(matches!(
            orch.reset(false),
            Err(OrchestrationError::Validation(_))
        ));
        assert_eq!(orch.status().total_agents, 1);

        orch.reset(true).unwrap();
        assert!(orch.status().is_empty());
    }

    #[test]
    fn test_atom_id_embeds_type() {
        let orch = Orchestration::default();
        let atom = orch
            .share_knowledge("blueprint", json!({"name": "BP_Door"}), None, None)
            .unwrap();
        assert!(atom.atom_id.starts_with("blueprint_"));
        assert_eq!(atom.access_count, 0);
    }

    #[test]
    fn test_total_agents_counts_deregistered() {
        let orch = Orchestration::default();
        orch.register_agent("A", "cursor", Vec::new()).unwrap();
        orch.register_agent("B", "windsurf", Vec::new()).unwrap();
        orch.deregister_agent("A").unwrap();

        let status = orch.status();
        assert_eq!(status.active_agents, 1);
        assert_eq!(status.total_agents, 2);
    }

    #[test]
    fn test_padded_agent_id_round_trip() {
        let orch = Orchestration::default();
        orch.register_agent(" A ", "cursor", Vec::new()).unwrap();
        orch.create_workflow_task(TaskSpec::new("t", json!({}))).unwrap();

        let claimed = orch.claim_workflow_task(" A", None).unwrap();
        assert_eq!(claimed.claimed_by.as_deref(), Some("A"));
        assert_eq!(orch.list_active_agents()[0].session.task_count, 1);

        orch.deregister_agent(" A ").unwrap();
        assert_eq!(orch.status().active_agents, 0);
    }

    #[test]
    fn test_deactivate_then_reregister() {
        let orch = Orchestration::default();
        orch.register_agent("A", "windsurf", vec!["ui_design".into()]).unwrap();
        orch.deactivate_agent("A").unwrap();

        let status = orch.status();
        assert_eq!(status.active_agents, 0);
        assert_eq!(status.total_agents, 1);

        let (_, kind) = orch.register_agent("A", "windsurf", Vec::new()).unwrap();
        assert_eq!(kind, Registration::Reactivated);
        assert_eq!(orch.status().active_agents, 1);
    }
}
