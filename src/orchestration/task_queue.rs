//! 工作流任务队列
//!
//! 优先级高者先领取，同优先级按创建顺序（FIFO）。状态只能前进：
//! pending → claimed → completed / failed；完成的任务保留在队列中作为审计记录，
//! 同时追加一条工作流历史。

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payload::Document;
use crate::core::OrchestrationError;

/// 任务 ID
pub type TaskId = String;

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// 等待领取
    Pending,
    /// 已被某个 agent 领取
    Claimed,
    /// 已完成
    Completed,
    /// 执行失败
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Claimed => "claimed",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "claimed" => Ok(TaskStatus::Claimed),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(OrchestrationError::Validation(format!(
                "Unknown task status: {other} (expected pending, claimed, completed or failed)"
            ))),
        }
    }
}

/// 工作流任务
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowTask {
    pub task_id: TaskId,
    pub task_type: String,
    pub params: Document,
    /// 创建时指定的目标 agent（与最终领取者不同）
    pub assigned_agent: Option<String>,
    /// 越大越紧急
    pub priority: i64,
    pub status: TaskStatus,
    pub claimed_by: Option<String>,
    pub result: Option<Document>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// 创建序号，同优先级的先后依据
    #[serde(skip)]
    pub sequence: u64,
}

impl WorkflowTask {
    pub fn new(task_id: TaskId, sequence: u64, task_type: String, params: Document) -> Self {
        Self {
            task_id,
            task_type,
            params,
            assigned_agent: None,
            priority: 0,
            status: TaskStatus::Pending,
            claimed_by: None,
            result: None,
            created_at: Utc::now(),
            claimed_at: None,
            completed_at: None,
            sequence,
        }
    }

    pub fn with_assigned_agent(mut self, agent_id: Option<String>) -> Self {
        self.assigned_agent = agent_id;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// 该 agent 是否有资格领取（未预分配，或预分配给它）
    fn claimable_by(&self, agent_id: &str) -> bool {
        self.assigned_agent.as_deref().map_or(true, |a| a == agent_id)
    }

    /// 预分配或领取者是该 agent
    fn involves(&self, agent_id: &str) -> bool {
        self.assigned_agent.as_deref() == Some(agent_id)
            || self.claimed_by.as_deref() == Some(agent_id)
    }
}

/// 领取顺序：优先级降序，再按创建顺序升序
fn claim_order(a: &WorkflowTask, b: &WorkflowTask) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// 工作流历史（任务完成时追加）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub task_id: TaskId,
    pub task_type: String,
    pub agent: Option<String>,
    pub status: TaskStatus,
    pub completed_at: DateTime<Utc>,
    pub result: Document,
}

/// 任务队列
#[derive(Debug)]
pub struct TaskQueue {
    tasks: HashMap<TaskId, WorkflowTask>,
    history: VecDeque<HistoryEntry>,
    /// 历史保留上限，0 表示不限
    history_limit: usize,
}

impl TaskQueue {
    pub fn new(history_limit: usize) -> Self {
        Self {
            tasks: HashMap::new(),
            history: VecDeque::new(),
            history_limit,
        }
    }

    /// 入队（参数已在门面层校验）
    pub fn create(&mut self, task: WorkflowTask) -> WorkflowTask {
        self.tasks.insert(task.task_id.clone(), task.clone());
        task
    }

    /// 领取任务：指定 task_id 时校验存在 / pending / 预分配；否则自动选择
    pub fn claim(
        &mut self,
        agent_id: &str,
        task_id: Option<&str>,
    ) -> Result<WorkflowTask, OrchestrationError> {
        let selected = match task_id {
            Some(task_id) => {
                let task = self
                    .tasks
                    .get(task_id)
                    .ok_or_else(|| OrchestrationError::TaskNotFound(task_id.to_string()))?;
                if task.status != TaskStatus::Pending {
                    return Err(OrchestrationError::InvalidState {
                        task_id: task_id.to_string(),
                        status: task.status,
                        expected: TaskStatus::Pending,
                    });
                }
                if !task.claimable_by(agent_id) {
                    return Err(OrchestrationError::NotAuthorized {
                        task_id: task_id.to_string(),
                        agent_id: agent_id.to_string(),
                        assigned: task.assigned_agent.clone().unwrap_or_default(),
                    });
                }
                task.task_id.clone()
            }
            None => self
                .tasks
                .values()
                .filter(|t| t.status == TaskStatus::Pending && t.claimable_by(agent_id))
                .min_by(|a, b| claim_order(a, b))
                .map(|t| t.task_id.clone())
                .ok_or_else(|| OrchestrationError::NoAvailableTask(agent_id.to_string()))?,
        };

        let task = self
            .tasks
            .get_mut(&selected)
            .ok_or_else(|| OrchestrationError::TaskNotFound(selected.clone()))?;
        task.status = TaskStatus::Claimed;
        task.claimed_by = Some(agent_id.to_string());
        task.claimed_at = Some(Utc::now());
        Ok(task.clone())
    }

    /// 完成任务；只有 claimed 状态可完成
    pub fn complete(
        &mut self,
        task_id: &str,
        result: Document,
        success: bool,
    ) -> Result<WorkflowTask, OrchestrationError> {
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| OrchestrationError::TaskNotFound(task_id.to_string()))?;
        if task.status != TaskStatus::Claimed {
            return Err(OrchestrationError::InvalidState {
                task_id: task_id.to_string(),
                status: task.status,
                expected: TaskStatus::Claimed,
            });
        }

        let now = Utc::now();
        task.status = if success {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        task.completed_at = Some(now);
        task.result = Some(result.clone());
        let task = task.clone();

        self.history.push_back(HistoryEntry {
            task_id: task.task_id.clone(),
            task_type: task.task_type.clone(),
            agent: task.claimed_by.clone(),
            status: task.status,
            completed_at: now,
            result,
        });
        if self.history_limit > 0 {
            while self.history.len() > self.history_limit {
                self.history.pop_front();
            }
        }

        Ok(task)
    }

    /// 按状态 / agent 过滤，排序与自动领取一致
    pub fn list(&self, status: Option<TaskStatus>, agent_id: Option<&str>) -> Vec<WorkflowTask> {
        let mut tasks: Vec<WorkflowTask> = self
            .tasks
            .values()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .filter(|t| agent_id.map_or(true, |a| t.involves(a)))
            .cloned()
            .collect();
        tasks.sort_by(claim_order);
        tasks
    }

    /// 最近的历史在前
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        self.history.iter().rev().take(limit).cloned().collect()
    }

    pub fn count_by_status(&self, status: TaskStatus) -> usize {
        self.tasks.values().filter(|t| t.status == status).count()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.history.clear();
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new(1000)
    }
}
