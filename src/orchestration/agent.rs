//! Agent 会话登记
//!
//! 按调用方提供的 id 跟踪各 AI 客户端会话；重复登记视为重新激活，不会产生重复条目。
//! 列表保持登记顺序。

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::OrchestrationError;

/// Agent 类型（开放枚举：已知客户端家族，或原样保留的其他标签）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentType {
    Cursor,
    Windsurf,
    ClaudeDesktop,
    Custom,
    Other(String),
}

impl From<&str> for AgentType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cursor" => AgentType::Cursor,
            "windsurf" => AgentType::Windsurf,
            "claude_desktop" => AgentType::ClaudeDesktop,
            "custom" => AgentType::Custom,
            _ => AgentType::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for AgentType {
    fn from(s: String) -> Self {
        AgentType::from(s.as_str())
    }
}

impl From<AgentType> for String {
    fn from(t: AgentType) -> Self {
        t.to_string()
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentType::Cursor => write!(f, "cursor"),
            AgentType::Windsurf => write!(f, "windsurf"),
            AgentType::ClaudeDesktop => write!(f, "claude_desktop"),
            AgentType::Custom => write!(f, "custom"),
            AgentType::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Inactive,
}

/// 单个 agent 会话
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSession {
    pub id: String,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    /// 能力标签，仅作信息展示，不参与任务路由
    pub capabilities: Vec<String>,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    /// 曾领取过的任务数
    pub task_count: u64,
}

impl AgentSession {
    pub fn new(id: String, agent_type: AgentType, capabilities: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            agent_type,
            capabilities: normalize_capabilities(capabilities),
            status: AgentStatus::Active,
            created_at: now,
            last_active_at: now,
            task_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    /// 距上次活跃的秒数
    pub fn idle_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_active_at).num_seconds().max(0)
    }
}

/// agent id 两端空白不参与匹配
pub(crate) fn normalize_id(id: &str) -> &str {
    id.trim()
}

/// 去空白、去空、去重（保持首次出现顺序）
fn normalize_capabilities(capabilities: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(capabilities.len());
    for cap in capabilities {
        let cap = cap.trim();
        if !cap.is_empty() && !out.iter().any(|c| c == cap) {
            out.push(cap.to_string());
        }
    }
    out
}

/// list_active 返回的视图：会话本身 + 派生的空闲时长
#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    #[serde(flatten)]
    pub session: AgentSession,
    pub idle_secs: i64,
}

/// register 的结果类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    Reactivated,
}

/// Agent 登记表
#[derive(Debug, Default)]
pub struct AgentRegistry {
    sessions: HashMap<String, AgentSession>,
    /// 登记顺序
    order: Vec<String>,
    /// 出现过的全部 id；deregister 不移除，只有 clear 清空
    seen: HashSet<String>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记或重新激活
    pub fn register(
        &mut self,
        id: &str,
        agent_type: AgentType,
        capabilities: Vec<String>,
    ) -> Result<(AgentSession, Registration), OrchestrationError> {
        let id = normalize_id(id);
        if id.is_empty() {
            return Err(OrchestrationError::Validation(
                "agent_id must not be empty".to_string(),
            ));
        }

        if let Some(session) = self.sessions.get_mut(id) {
            session.status = AgentStatus::Active;
            session.last_active_at = Utc::now();
            return Ok((session.clone(), Registration::Reactivated));
        }

        let session = AgentSession::new(id.to_string(), agent_type, capabilities);
        self.seen.insert(id.to_string());
        self.order.push(id.to_string());
        self.sessions.insert(id.to_string(), session.clone());
        Ok((session, Registration::Created))
    }

    /// 所有 active 会话，按登记顺序
    pub fn list_active(&self) -> Vec<AgentView> {
        let now = Utc::now();
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .filter(|s| s.is_active())
            .map(|s| AgentView {
                session: s.clone(),
                idle_secs: s.idle_secs(now),
            })
            .collect()
    }

    /// 彻底移除会话
    pub fn deregister(&mut self, id: &str) -> Result<AgentSession, OrchestrationError> {
        let id = normalize_id(id);
        let session = self
            .sessions
            .remove(id)
            .ok_or_else(|| OrchestrationError::AgentNotFound(id.to_string()))?;
        self.order.retain(|existing| existing != id);
        Ok(session)
    }

    /// 标记为 inactive 但保留条目；再次 register 即恢复
    pub fn deactivate(&mut self, id: &str) -> Result<AgentSession, OrchestrationError> {
        let id = normalize_id(id);
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| OrchestrationError::AgentNotFound(id.to_string()))?;
        session.status = AgentStatus::Inactive;
        Ok(session.clone())
    }

    /// 刷新活跃时间；`counts_task` 时任务计数 +1。未知 id 不报错，返回 false
    pub fn touch(&mut self, id: &str, counts_task: bool) -> bool {
        match self.sessions.get_mut(normalize_id(id)) {
            Some(session) => {
                session.last_active_at = Utc::now();
                if counts_task {
                    session.task_count += 1;
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&AgentSession> {
        self.sessions.get(normalize_id(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// 出现过的 agent 总数（含已 deregister 的），同一 id 只计一次
    pub fn ever_seen(&self) -> usize {
        self.seen.len()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.values().filter(|s| s.is_active()).count()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.order.clear();
        self.seen.clear();
    }
}
