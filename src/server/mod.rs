//! HTTP 服务模块
//!
//! 基于 axum 的网关对外 REST 接口。路由与处理器只做协议层的事：
//! 解析入站参数、调用翻译层、用统一信封序列化结果。

pub mod handlers;


use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::GatewayConfig;
use crate::gateway::LlmGateway;

/// 应用状态：只读翻译器的共享句柄
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<LlmGateway>,
}

/// 构建网关路由
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health-check-llm", get(handlers::llm_api::health_check_llm))
        .route("/ask", get(handlers::llm_api::ask))
        .route("/ask/chat", get(handlers::llm_api::ask_chat))
        .route("/chat", post(handlers::llm_api::chat))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

/// 启动 HTTP 服务并阻塞运行
pub async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr();
    let max_body_bytes = config.server.max_body_bytes;

    let gateway = LlmGateway::new(config)?;
    let state = AppState {
        gateway: Arc::new(gateway),
    };
    let app = build_router(state, max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[SERVER] 网关已启动，监听 {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
