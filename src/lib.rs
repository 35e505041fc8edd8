//! Hive - 多智能体编排核心
//!
//! 让多个独立的 AI 客户端会话（Cursor、Windsurf、Claude Desktop 等）登记在线、
//! 通过共享知识库交换结构化事实、通过优先级任务队列协作，彼此无需直接通信。
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、标识生成、状态快照
//! - **observability**: tracing 初始化
//! - **orchestration**: Agent 登记、知识库、任务队列与统一门面
//! - **tools**: 把编排操作暴露为按名调用的工具，含超时与审计日志

pub mod config;
pub mod core;
pub mod observability;
pub mod orchestration;
pub mod tools;

pub use orchestration::{Orchestration, TaskSpec};
