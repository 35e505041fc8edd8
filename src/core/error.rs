//! 编排错误类型
//!
//! 所有失败都在发生处转为 OrchestrationError；工具层再根据 `kind()` 转成结构化错误记录，
//! 不会把 panic 或裸错误抛过服务边界。

use serde::Serialize;
use thiserror::Error;

use crate::orchestration::TaskStatus;

/// 编排核心可能返回的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    /// 结构化载荷非法，或 reset 未确认
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Agent {0} not found")]
    AgentNotFound(String),

    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error("Task {task_id} is {status}, expected {expected}")]
    InvalidState {
        task_id: String,
        status: TaskStatus,
        expected: TaskStatus,
    },

    /// 任务已预分配给其他 agent
    #[error("Task {task_id} is assigned to {assigned}, not {agent_id}")]
    NotAuthorized {
        task_id: String,
        agent_id: String,
        assigned: String,
    },

    #[error("No available tasks to claim for agent {0}")]
    NoAvailableTask(String),
}

/// 错误类别（对外协议中的 `error_kind` 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    InvalidState,
    NotAuthorized,
    NoAvailableTask,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::NotAuthorized => "not_authorized",
            ErrorKind::NoAvailableTask => "no_available_task",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OrchestrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestrationError::Validation(_) => ErrorKind::ValidationError,
            OrchestrationError::AgentNotFound(_) | OrchestrationError::TaskNotFound(_) => {
                ErrorKind::NotFound
            }
            OrchestrationError::InvalidState { .. } => ErrorKind::InvalidState,
            OrchestrationError::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            OrchestrationError::NoAvailableTask(_) => ErrorKind::NoAvailableTask,
        }
    }
}

/// 工具调用层错误（未知工具、参数错误、超时）
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    Timeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let err = OrchestrationError::AgentNotFound("A".to_string());
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Agent A not found");

        let err = OrchestrationError::TaskNotFound("task_1".to_string());
        assert_eq!(err.kind().as_str(), "not_found");

        let err = OrchestrationError::InvalidState {
            task_id: "task_1".to_string(),
            status: TaskStatus::Completed,
            expected: TaskStatus::Claimed,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(err.to_string().contains("completed"));
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let v = serde_json::to_value(ErrorKind::NoAvailableTask).unwrap();
        assert_eq!(v, serde_json::json!("no_available_task"));
        assert_eq!(ErrorKind::ValidationError.to_string(), "validation_error");
    }
}
