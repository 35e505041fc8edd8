//! 知识库工具：share_knowledge / query_knowledge

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::response::{non_empty, parse_args, payload_arg, record};
use super::schema::schema_of;
use crate::orchestration::Orchestration;
use crate::tools::Tool;

#[derive(Debug, Deserialize, JsonSchema)]
struct ShareKnowledgeArgs {
    /// 知识类型，如 actor / blueprint / workflow / scene_state / best_practice
    knowledge_type: String,
    /// 知识内容：JSON 文本，或直接给 JSON 值
    knowledge_content: Value,
    /// 分享者 agent id
    #[serde(default)]
    source_agent: Option<String>,
    /// 可选元数据：JSON 文本或 JSON 值
    #[serde(default)]
    metadata: Option<Value>,
}

/// share_knowledge 工具
pub struct ShareKnowledgeTool {
    orchestration: Arc<Orchestration>,
}

impl ShareKnowledgeTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for ShareKnowledgeTool {
    fn name(&self) -> &str {
        "share_knowledge"
    }

    fn description(&self) -> &str {
        "Share a knowledge atom in the shared atomspace. Args: {\"knowledge_type\": \"actor\", \"knowledge_content\": \"{\\\"name\\\": \\\"PlayerCube\\\"}\", \"source_agent\": \"cursor-main\"}"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<ShareKnowledgeArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: ShareKnowledgeArgs = parse_args(args)?;
        let source_agent = non_empty(args.source_agent);
        // 空字符串元数据等同于未提供
        let metadata = args
            .metadata
            .filter(|m| !m.is_null() && m.as_str().map_or(true, |s| !s.trim().is_empty()))
            .map(payload_arg);

        let result = self.orchestration.share_knowledge(
            &args.knowledge_type,
            payload_arg(args.knowledge_content),
            source_agent.as_deref(),
            metadata,
        );
        Ok(record(result, |atom| {
            json!({
                "atom_id": atom.atom_id,
                "knowledge_type": atom.knowledge_type,
                "created_at": atom.created_at,
            })
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct QueryKnowledgeArgs {
    /// 按类型过滤，空表示全部
    #[serde(default)]
    knowledge_type: Option<String>,
    /// 按来源 agent 过滤，空表示全部
    #[serde(default)]
    source_agent: Option<String>,
    /// 最多返回条数，默认取配置
    #[serde(default)]
    limit: Option<usize>,
}

/// query_knowledge 工具
pub struct QueryKnowledgeTool {
    orchestration: Arc<Orchestration>,
}

impl QueryKnowledgeTool {
    pub fn new(orchestration: Arc<Orchestration>) -> Self {
        Self { orchestration }
    }
}

#[async_trait]
impl Tool for QueryKnowledgeTool {
    fn name(&self) -> &str {
        "query_knowledge"
    }

    fn description(&self) -> &str {
        "Query shared knowledge atoms, most recent first. Each returned atom's access_count is incremented. Args: {\"knowledge_type\": \"actor\", \"source_agent\": \"\", \"limit\": 5}"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<QueryKnowledgeArgs>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: QueryKnowledgeArgs = parse_args(args)?;
        let knowledge_type = non_empty(args.knowledge_type);
        let source_agent = non_empty(args.source_agent);
        let limit = args
            .limit
            .unwrap_or_else(|| self.orchestration.default_query_limit());

        let atoms = self.orchestration.query_knowledge(
            knowledge_type.as_deref(),
            source_agent.as_deref(),
            limit,
        );
        Ok(record(Ok(atoms), |atoms| {
            json!({ "total_results": atoms.len(), "atoms": atoms })
        }))
    }
}
