//! 编排工具：把 Orchestration 的操作暴露为按名调用的 Tool

pub mod admin;
pub mod agents;
pub mod executor;
pub mod knowledge;
pub mod protocol;
pub mod registry;
pub mod response;
pub mod schema;
pub mod workflow;

use std::sync::Arc;

use crate::orchestration::Orchestration;

pub use admin::{ClearOrchestrationStateTool, OrchestrationStatusTool};
pub use agents::{DeregisterAgentTool, ListActiveAgentsTool, RegisterAgentTool};
pub use executor::ToolExecutor;
pub use knowledge::{QueryKnowledgeTool, ShareKnowledgeTool};
pub use protocol::handle_line;
pub use registry::{Tool, ToolCatalog, ToolDescriptor, ToolRegistry};
pub use schema::ToolCall;
pub use workflow::{
    ClaimWorkflowTaskTool, CompleteWorkflowTaskTool, CreateWorkflowTaskTool,
    ListWorkflowTasksTool, WorkflowHistoryTool,
};

/// 注册全部编排工具（共享同一个 Orchestration 实例）
pub fn register_orchestration_tools(registry: &mut ToolRegistry, orchestration: Arc<Orchestration>) {
    registry.register(RegisterAgentTool::new(Arc::clone(&orchestration)));
    registry.register(ListActiveAgentsTool::new(Arc::clone(&orchestration)));
    registry.register(DeregisterAgentTool::new(Arc::clone(&orchestration)));
    registry.register(ShareKnowledgeTool::new(Arc::clone(&orchestration)));
    registry.register(QueryKnowledgeTool::new(Arc::clone(&orchestration)));
    registry.register(CreateWorkflowTaskTool::new(Arc::clone(&orchestration)));
    registry.register(ClaimWorkflowTaskTool::new(Arc::clone(&orchestration)));
    registry.register(CompleteWorkflowTaskTool::new(Arc::clone(&orchestration)));
    registry.register(ListWorkflowTasksTool::new(Arc::clone(&orchestration)));
    registry.register(WorkflowHistoryTool::new(Arc::clone(&orchestration)));
    registry.register(OrchestrationStatusTool::new(Arc::clone(&orchestration)));
    registry.register(ClearOrchestrationStateTool::new(orchestration));
    tracing::info!("Orchestration tools registered successfully");
}
