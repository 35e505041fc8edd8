//! 状态快照：get_orchestration_status 的聚合计数
//!
//! 只由 Orchestration 在持锁时一次性生成，纯派生、只读。

use serde::Serialize;

/// 编排工作台的聚合状态
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrchestrationStatus {
    pub active_agents: usize,
    /// 出现过的 agent 总数（含 inactive 与已 deregister 的）
    pub total_agents: usize,
    pub pending_tasks: usize,
    pub claimed_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub knowledge_atoms: usize,
    /// 工作流历史条数
    pub history_entries: usize,
}

impl OrchestrationStatus {
    /// 所有计数是否为零（reset 后应成立）
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
