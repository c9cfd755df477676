//! LLM 网关 API 端点
//!
//! 四个端点分别对应翻译层的四个操作：
//! - GET  /health-check-llm → 模型列表透传
//! - GET  /ask              → 单轮补全（prompt 可由调用方提供）
//! - GET  /ask/chat         → 会话种子对话（q 参数可选）
//! - POST /chat             → 交互式对话（消息必填）
//!
//! 所有端点返回统一的 `ApiResponse` 信封；后端失败映射为网关侧
//! 非成功状态码（502/504），校验失败为 400，不再一律压成 200。

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::models::api::{ApiResponse, AskQuery, ChatInput, ChatQuery};
use crate::models::openai::GenerationOverrides;
use crate::server::AppState;

/// GET /health-check-llm - 后端健康检查（列出可用模型）
pub async fn health_check_llm(State(state): State<AppState>) -> Response {
    let request_id = Uuid::new_v4();
    tracing::info!("[API] {} 健康检查", request_id);

    respond(request_id, state.gateway.list_models().await)
}

/// GET /ask - 单轮文本补全
pub async fn ask(State(state): State<AppState>, Query(query): Query<AskQuery>) -> Response {
    let request_id = Uuid::new_v4();
    let prompt = query
        .prompt
        .as_deref()
        .unwrap_or(&state.gateway.config().default_prompt)
        .to_string();
    tracing::info!("[API] {} 补全请求: prompt_len={}", request_id, prompt.len());

    let overrides = GenerationOverrides {
        max_tokens: query.max_tokens,
        temperature: query.temperature,
    };
    respond(request_id, state.gateway.complete(&prompt, overrides).await)
}

/// GET /ask/chat - 以会话种子发起对话
pub async fn ask_chat(State(state): State<AppState>, Query(query): Query<ChatQuery>) -> Response {
    let request_id = Uuid::new_v4();
    tracing::info!(
        "[API] {} 种子对话请求: has_user_message={}",
        request_id,
        query.q.is_some()
    );

    let messages = state.gateway.seed_conversation(query.q.as_deref());
    let result = state
        .gateway
        .chat(messages, GenerationOverrides::default())
        .await;
    respond(request_id, result)
}

/// POST /chat - 交互式对话
pub async fn chat(State(state): State<AppState>, Json(input): Json<ChatInput>) -> Response {
    let request_id = Uuid::new_v4();
    tracing::info!(
        "[API] {} 对话请求: message_len={}",
        request_id,
        input.message.len()
    );

    respond(
        request_id,
        state.gateway.chat_with_user_message(&input.message).await,
    )
}

/// 将翻译层结果序列化为统一信封，状态码按错误语义映射
fn respond<T: Serialize>(request_id: Uuid, result: Result<T, GatewayError>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(err) => {
            tracing::warn!(
                "[API] {} 请求失败: type={}, {}",
                request_id,
                err.error_type(),
                err
            );
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ApiResponse::<T>::failure(&err))).into_response()
        }
    }
}
