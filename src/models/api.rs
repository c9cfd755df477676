//! 网关对外 API 的入站/出站模型
//!
//! 出站统一使用 `ApiResponse` 信封：`ok` 标识成败，`data` 与 `error`
//! 互斥，错误体携带错误码与消息。历史实现中 `errors`/`error`/`data`/
//! `response` 字段名不一致的问题在此统一。

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// POST /chat 请求体
#[derive(Debug, Clone, Deserialize)]
pub struct ChatInput {
    pub message: String,
}

/// GET /ask 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskQuery {
    /// 提示词，缺省时使用配置中的 default_prompt
    pub prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// GET /ask/chat 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatQuery {
    /// 用户消息，缺省时仅以系统提示词作为会话种子
    pub q: Option<String>,
}

/// 错误体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    /// 错误码：后端失败时为后端原始状态码，其余为网关状态码
    pub code: u16,
    /// 错误类型标识
    #[serde(rename = "type")]
    pub error_type: String,
    /// 人类可读的错误消息，后端失败时格式为 `<status> - <body>`
    pub message: String,
}

impl From<&GatewayError> for ApiError {
    fn from(err: &GatewayError) -> Self {
        Self {
            code: err.error_code(),
            error_type: err.error_type().to_string(),
            message: err.to_string(),
        }
    }
}

/// 统一响应信封
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// 成功信封
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// 失败信封
    pub fn failure(err: &GatewayError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(ApiError::from(err)),
        }
    }
}
