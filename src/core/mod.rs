//! 核心层：错误类型、标识生成、状态快照

pub mod error;
pub mod ids;
pub mod state;

pub use error::{ErrorKind, OrchestrationError, ToolError};
pub use ids::{GeneratedId, IdGenerator};
pub use state::OrchestrationStatus;
