//! 工具注册表
//!
//! 编排工具实现 Tool trait，由 ToolRegistry 按名登记；调用统一经 ToolExecutor（超时 + 审计）。
//! `catalog()` 给出请求格式与每个工具的参数 schema，供客户端发现能力。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::schema::{schema_of, ToolCall};

/// 工具 trait：名称、描述、参数 schema、异步执行（args 为 JSON）
///
/// 执行结果约定：参数缺失或类型不符返回 `Err`；编排层的业务失败返回 `Ok`，内容为 `status = "error"` 的记录。
#[async_trait]
pub trait Tool: Send + Sync {
    /// 请求行中 "tool" 字段的取值
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 参数 JSON Schema，默认无参数
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String>;
}

/// 单个工具的对外描述
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// 能力目录：请求行格式 + 全部工具
#[derive(Debug, Clone, Serialize)]
pub struct ToolCatalog {
    pub request: Value,
    pub tools: Vec<ToolDescriptor>,
}

/// 按名称有序存放，目录输出稳定
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同名工具后登记者覆盖先登记者
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            tracing::warn!(tool = %name, "Tool registered twice, previous one replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    pub fn catalog(&self) -> ToolCatalog {
        ToolCatalog {
            request: schema_of::<ToolCall>(),
            tools: self.describe(),
        }
    }
}
