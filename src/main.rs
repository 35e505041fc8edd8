//! Hive - 多智能体编排核心
//!
//! 入口：初始化日志与配置，构建 Orchestration 与工具执行器，然后按行处理 stdin 上的工具调用：
//! 每行一个 `{"tool": "...", "args": {...}}`，每个结果输出一行 JSON 到 stdout。
//!
//! 用法：`hive [config.toml]`；`hive --schema [config.toml]` 只打印工具目录后退出。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use hive::config::load_config;
use hive::tools::{handle_line, register_orchestration_tools, ToolExecutor, ToolRegistry};
use hive::Orchestration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hive::observability::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let print_schema = args.first().map(String::as_str) == Some("--schema");
    if print_schema {
        args.remove(0);
    }
    let config_path = args.first().map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;

    let orchestration = Arc::new(Orchestration::new(cfg.orchestration.clone()));
    let mut registry = ToolRegistry::new();
    register_orchestration_tools(&mut registry, orchestration);
    let executor = ToolExecutor::new(registry, cfg.tools.tool_timeout_secs);

    if print_schema {
        let catalog = serde_json::to_string_pretty(&executor.registry().catalog())
            .context("Failed to render tool catalog")?;
        println!("{catalog}");
        return Ok(());
    }

    tracing::info!(
        name = cfg.app.name.as_deref().unwrap_or("hive"),
        tools = executor.tool_names().len(),
        "Orchestration workbench ready, reading tool calls from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_line(&executor, &line).await;
        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
