//! 网关错误类型
//!
//! 定义请求翻译与后端调用过程中可能发生的错误。
//! 所有后端侧失败都在翻译边界被捕获并转换为本类型，不向上抛出未处理异常。

use thiserror::Error;

/// 网关错误
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// 入站请求校验失败（不会触发后端调用）
    #[error("{0}")]
    Validation(String),

    /// 后端返回非成功状态码，消息格式固定为 `<status> - <body>`
    #[error("{status} - {body}")]
    Backend { status: u16, body: String },

    /// 传输层失败（连接拒绝、DNS 解析失败等）
    #[error("后端不可达: {0}")]
    Transport(String),

    /// 后端调用超时
    #[error("后端调用超时: {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

impl GatewayError {
    /// 获取网关自身应返回的 HTTP 状态码
    ///
    /// 原始实现将所有后端失败压成 200，这里按语义映射：
    /// 校验失败 400，后端失败 502，超时 504。
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Validation(_) => 400,
            GatewayError::Backend { .. } => 502,
            GatewayError::Transport(_) => 502,
            GatewayError::Timeout { .. } => 504,
            GatewayError::Config(_) => 500,
        }
    }

    /// 错误体中携带的错误码
    ///
    /// 后端失败时保留后端原始状态码，便于客户端排查。
    pub fn error_code(&self) -> u16 {
        match self {
            GatewayError::Backend { status, .. } => *status,
            _ => self.status_code(),
        }
    }

    /// 获取错误类型字符串
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation_error",
            GatewayError::Backend { .. } => "backend_error",
            GatewayError::Transport(_) => "backend_unavailable",
            GatewayError::Timeout { .. } => "timeout_error",
            GatewayError::Config(_) => "config_error",
        }
    }

    /// 从 reqwest 错误分类：超时单独识别，其余归为传输失败
    pub fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout { timeout_ms }
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}
