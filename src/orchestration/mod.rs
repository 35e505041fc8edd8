//! 多智能体编排：Agent 登记、共享知识库、工作流任务队列，以及统一入口的门面
//!
//! 三个存储只归 [`Orchestration`] 所有；跨实体引用（source_agent / assigned_agent / claimed_by）
//! 一律是按 id 查找的弱引用，写入时不校验存在性。

pub mod agent;
pub mod facade;
pub mod knowledge;
pub mod payload;
pub mod task_queue;

pub use agent::{AgentRegistry, AgentSession, AgentStatus, AgentType, AgentView, Registration};
pub use facade::{Orchestration, TaskSpec};
pub use knowledge::{KnowledgeAtom, KnowledgeStore};
pub use payload::{Document, Payload};
pub use task_queue::{HistoryEntry, TaskId, TaskQueue, TaskStatus, WorkflowTask};
