//! 网关翻译层
//!
//! 系统核心：将入站客户端意图（健康检查 / 补全 / 对话）翻译为
//! OpenAI 兼容后端的出站请求，发起一次调用，并把结果或失败
//! 归一化为稳定的客户端契约。
//!
//! # 失败映射规则
//!
//! - 后端非成功状态码：捕获为 `GatewayError::Backend`，消息格式
//!   固定为 `<status> - <body>`，原始错误体绝不裸露给客户端
//! - 传输失败 / 超时：分类为 `Transport` / `Timeout`
//! - 成功但缺少 `choices` 内容：不是错误，代以哨兵文本（降级可用）
//!
//! 翻译层本身无每请求共享状态，仅持有只读配置与复用的 HTTP 客户端；
//! 取消传播依赖 axum 丢弃 handler future 时连带中止出站调用。

#[cfg(test)]
mod tests;

use reqwest::Client;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::models::openai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionRequest,
    CompletionResponse, GenerationOverrides,
};

/// 补全/对话响应缺少内容时的哨兵文本
pub const NO_RESPONSE_SENTINEL: &str = "No response";

/// 交互式对话路由（POST /chat）的哨兵文本，沿用原始契约
pub const NO_ANSWER_SENTINEL: &str = "ไม่มีคำตอบ";

/// 网关翻译器
///
/// 每个操作恰好发起一次出站调用；HTTP 客户端在构造时创建并复用，
/// 单次调用超时由配置注入。
pub struct LlmGateway {
    config: GatewayConfig,
    client: Client,
}

impl LlmGateway {
    /// 基于配置构造翻译器
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Config(format!("构建 HTTP 客户端失败: {}", e)))?;
        Ok(Self { config, client })
    }

    /// 获取配置引用
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// 列出后端可用模型
    ///
    /// 成功时原样透传后端返回的 JSON 载荷。
    pub async fn list_models(&self) -> Result<Value, GatewayError> {
        let url = format!("{}/v1/models", self.config.llm_base_url);
        tracing::debug!("[GATEWAY] 获取模型列表: {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, self.config.request_timeout_ms))?;

        let resp = self.ensure_success(resp).await?;
        let models: Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("解析后端响应失败: {}", e)))?;

        tracing::info!("[GATEWAY] 模型列表获取成功");
        Ok(models)
    }

    /// 单轮文本补全
    ///
    /// 出站请求的模型名与数值参数始终存在：调用方未提供的字段
    /// 落回配置默认值，提供的覆盖项优先。
    pub async fn complete(
        &self,
        prompt: &str,
        overrides: GenerationOverrides,
    ) -> Result<String, GatewayError> {
        let payload = self.build_completion_request(prompt, overrides)?;
        let url = format!("{}/v1/completions", self.config.llm_base_url);
        tracing::debug!(
            "[GATEWAY] 补全请求: model={}, max_tokens={}, temperature={}",
            payload.model,
            payload.max_tokens,
            payload.temperature
        );

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, self.config.request_timeout_ms))?;

        let resp = self.ensure_success(resp).await?;
        let data: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("解析后端响应失败: {}", e)))?;

        Ok(extract_completion_text(&data, NO_RESPONSE_SENTINEL))
    }

    /// 多轮对话补全
    ///
    /// 空历史时以配置中的系统提示词作为会话种子；
    /// 消息顺序原样透传，先行轮次在前。
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        overrides: GenerationOverrides,
    ) -> Result<String, GatewayError> {
        self.chat_inner(messages, overrides, NO_RESPONSE_SENTINEL)
            .await
    }

    /// 交互式对话：校验用户消息后以 [system, user] 种子发起对话
    ///
    /// 空白消息直接返回校验错误，不触发任何后端调用。
    pub async fn chat_with_user_message(&self, message: &str) -> Result<String, GatewayError> {
        if message.trim().is_empty() {
            return Err(GatewayError::Validation("message required".to_string()));
        }

        let messages = self.seed_conversation(Some(message));
        let overrides = GenerationOverrides {
            max_tokens: Some(self.config.chat_max_tokens),
            temperature: None,
        };
        self.chat_inner(messages, overrides, NO_ANSWER_SENTINEL).await
    }

    async fn chat_inner(
        &self,
        messages: Vec<ChatMessage>,
        overrides: GenerationOverrides,
        sentinel: &str,
    ) -> Result<String, GatewayError> {
        let payload = self.build_chat_request(messages, overrides)?;
        let url = format!("{}/v1/chat/completions", self.config.llm_base_url);
        tracing::debug!(
            "[GATEWAY] 对话请求: model={}, turns={}, max_tokens={}",
            payload.model,
            payload.messages.len(),
            payload.max_tokens
        );

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, self.config.request_timeout_ms))?;

        let resp = self.ensure_success(resp).await?;
        let data: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("解析后端响应失败: {}", e)))?;

        Ok(extract_chat_content(&data, sentinel))
    }

    /// 构造补全请求体，默认值与覆盖项合并
    ///
    /// 越界的覆盖项在此被拒绝，保证出站载荷始终满足
    /// `max_tokens > 0` 且 `temperature ∈ [0, 2]`。
    pub fn build_completion_request(
        &self,
        prompt: &str,
        overrides: GenerationOverrides,
    ) -> Result<CompletionRequest, GatewayError> {
        validate_overrides(&overrides)?;
        Ok(CompletionRequest {
            model: self.config.model_name.clone(),
            prompt: prompt.to_string(),
            max_tokens: overrides.max_tokens.unwrap_or(self.config.default_max_tokens),
            temperature: overrides
                .temperature
                .unwrap_or(self.config.default_temperature),
        })
    }

    /// 构造对话请求体，空历史时注入系统提示词种子
    pub fn build_chat_request(
        &self,
        messages: Vec<ChatMessage>,
        overrides: GenerationOverrides,
    ) -> Result<ChatCompletionRequest, GatewayError> {
        validate_overrides(&overrides)?;
        let messages = if messages.is_empty() {
            self.seed_conversation(None)
        } else {
            messages
        };
        Ok(ChatCompletionRequest {
            model: self.config.model_name.clone(),
            messages,
            max_tokens: overrides.max_tokens.unwrap_or(self.config.default_max_tokens),
            temperature: overrides
                .temperature
                .unwrap_or(self.config.default_temperature),
        })
    }

    /// 会话种子：系统提示词 + 可选的用户消息
    pub fn seed_conversation(&self, user_message: Option<&str>) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.config.system_prompt.clone())];
        if let Some(content) = user_message {
            messages.push(ChatMessage::user(content));
        }
        messages
    }

    /// 非成功状态码统一转换为 `Backend { status, body }`
    async fn ensure_success(
        &self,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!("[GATEWAY] 后端返回错误: {} - {}", status, body);
        Err(GatewayError::Backend { status, body })
    }
}

/// 校验调用方提供的生成参数覆盖项
///
/// 越界值直接拒绝而不静默钳制，契约与配置校验保持一致：
/// `max_tokens` 必须为正整数，`temperature` 必须在 [0, 2] 内。
pub fn validate_overrides(overrides: &GenerationOverrides) -> Result<(), GatewayError> {
    if overrides.max_tokens == Some(0) {
        return Err(GatewayError::Validation(
            "max_tokens must be greater than 0".to_string(),
        ));
    }
    if let Some(temperature) = overrides.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(GatewayError::Validation(format!(
                "temperature must be within [0, 2]: {}",
                temperature
            )));
        }
    }
    Ok(())
}

/// 从补全响应中提取首个候选文本，缺失时代以哨兵
pub fn extract_completion_text(resp: &CompletionResponse, sentinel: &str) -> String {
    resp.choices
        .first()
        .and_then(|c| c.text.clone())
        .unwrap_or_else(|| sentinel.to_string())
}

/// 从对话响应中提取首个候选的消息内容，缺失时代以哨兵
pub fn extract_chat_content(resp: &ChatCompletionResponse, sentinel: &str) -> String {
    resp.choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_else(|| sentinel.to_string())
}
