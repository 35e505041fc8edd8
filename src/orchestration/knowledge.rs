//! 共享知识库（atomspace）
//!
//! agent 之间通过知识原子交换事实：只追加，不原地修改（access 统计除外），
//! 只有整体 reset 会清空。

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::payload::Document;

/// 一条知识原子
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeAtom {
    pub atom_id: String,
    #[serde(rename = "type")]
    pub knowledge_type: String,
    pub content: Document,
    /// 弱引用：不校验是否存在，session 注销后可能悬空
    pub source_agent: Option<String>,
    pub metadata: Option<Document>,
    pub created_at: DateTime<Utc>,
    /// 被查询返回的次数
    pub access_count: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

/// 知识库：按写入顺序保存
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    atoms: Vec<KnowledgeAtom>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入已校验的原子，返回其副本
    pub fn share(
        &mut self,
        atom_id: String,
        knowledge_type: &str,
        content: Document,
        source_agent: Option<String>,
        metadata: Option<Document>,
    ) -> KnowledgeAtom {
        let atom = KnowledgeAtom {
            atom_id,
            knowledge_type: knowledge_type.to_string(),
            content,
            source_agent,
            metadata,
            created_at: Utc::now(),
            access_count: 0,
            last_accessed_at: None,
        };
        self.atoms.push(atom.clone());
        atom
    }

    /// 按类型 / 来源过滤（None 表示不限），最新优先，截断到 limit。
    /// 每个被返回的原子 access_count +1。
    pub fn query(
        &mut self,
        knowledge_type: Option<&str>,
        source_agent: Option<&str>,
        limit: usize,
    ) -> Vec<KnowledgeAtom> {
        let now = Utc::now();
        self.atoms
            .iter_mut()
            .rev()
            .filter(|atom| knowledge_type.map_or(true, |t| atom.knowledge_type == t))
            .filter(|atom| source_agent.map_or(true, |s| atom.source_agent.as_deref() == Some(s)))
            .take(limit)
            .map(|atom| {
                atom.access_count += 1;
                atom.last_accessed_at = Some(now);
                atom.clone()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn clear(&mut self) {
        self.atoms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with(entries: &[(&str, &str, Option<&str>)]) -> KnowledgeStore {
        let mut store = KnowledgeStore::new();
        for (i, (id, ty, source)) in entries.iter().enumerate() {
            store.share(
                id.to_string(),
                ty,
                json!({ "n": i }),
                source.map(str::to_string),
                None,
            );
        }
        store
    }

    #[test]
    fn test_query_most_recent_first() {
        let mut store = store_with(&[
            ("a1", "actor", Some("A")),
            ("b1", "blueprint", Some("A")),
            ("a2", "actor", Some("B")),
        ]);
        let ids: Vec<_> = store
            .query(None, None, 10)
            .into_iter()
            .map(|a| a.atom_id)
            .collect();
        assert_eq!(ids, vec!["a2", "b1", "a1"]);
    }

    #[test]
    fn test_query_filters_and_limit() {
        let mut store = store_with(&[
            ("a1", "actor", Some("A")),
            ("a2", "actor", Some("B")),
            ("a3", "actor", Some("A")),
            ("b1", "blueprint", Some("A")),
        ]);

        let by_type = store.query(Some("actor"), None, 2);
        assert_eq!(by_type.len(), 2);
        assert_eq!(by_type[0].atom_id, "a3");

        let by_both = store.query(Some("actor"), Some("A"), 10);
        let ids: Vec<_> = by_both.iter().map(|a| a.atom_id.as_str()).collect();
        assert_eq!(ids, vec!["a3", "a1"]);

        assert!(store.query(None, None, 0).is_empty());
        assert!(store.query(Some("scene_state"), None, 10).is_empty());
    }

    #[test]
    fn test_query_increments_only_returned_atoms() {
        let mut store = store_with(&[("a1", "actor", None), ("b1", "blueprint", None)]);

        store.query(Some("actor"), None, 10);
        let second = store.query(Some("actor"), None, 10);
        assert_eq!(second[0].access_count, 2);
        assert!(second[0].last_accessed_at.is_some());

        let blueprint = store.query(Some("blueprint"), None, 10);
        assert_eq!(blueprint[0].access_count, 1);
    }

    #[test]
    fn test_atom_without_source() {
        let mut store = store_with(&[("s1", "scene_state", None)]);
        assert!(store.query(None, Some("A"), 10).is_empty());
        let atoms = store.query(None, None, 10);
        assert_eq!(atoms[0].source_agent, None);
    }
}
