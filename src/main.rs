//! llmcast 可执行入口

use std::path::PathBuf;

use anyhow::Context;

use llmcast::config::GatewayConfig;
use llmcast::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // 配置文件路径来自 LLMCAST_CONFIG，未设置时全部使用默认值 + 环境变量覆盖
    let config_path = std::env::var("LLMCAST_CONFIG").ok().map(PathBuf::from);
    let config = GatewayConfig::load(config_path.as_deref()).context("加载配置失败")?;

    tracing::info!(
        "[MAIN] llmcast 启动: backend={}, model={}, listen={}",
        config.llm_base_url,
        config.model_name,
        config.listen_addr()
    );

    server::serve(config).await
}
