//! 标识生成：原子递增序号 + 毫秒时间戳
//!
//! 同一毫秒内多次生成也不会冲突；序号严格单调，reset 后不回绕。

use std::sync::atomic::{AtomicU64, Ordering};

/// 一次生成的标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedId {
    /// 进程内单调序号（用作同优先级任务的 FIFO 依据）
    pub sequence: u64,
    /// 可读标识，如 `task_1760700000000_000042`
    pub id: String,
}

/// 标识生成器
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以 `prefix` 开头生成新标识
    pub fn generate(&self, prefix: &str) -> GeneratedId {
        let sequence = self.next.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis();
        GeneratedId {
            sequence,
            id: format!("{prefix}_{millis}_{sequence:06}"),
        }
    }
}
