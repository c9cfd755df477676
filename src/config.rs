//! 网关配置模块
//!
//! 进程级只读配置：后端地址、默认模型、默认生成参数、HTTP 监听参数。
//! 启动时从 YAML 配置文件加载（可选），环境变量优先级更高；
//! 加载完成后不再变更，以不可变引用的方式注入翻译层。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::GatewayError;

/// 环境变量前缀对应的各项配置键
const ENV_BASE_URL: &str = "LLMCAST_BASE_URL";
const ENV_MODEL: &str = "LLMCAST_MODEL";
const ENV_MAX_TOKENS: &str = "LLMCAST_MAX_TOKENS";
const ENV_TEMPERATURE: &str = "LLMCAST_TEMPERATURE";
const ENV_TIMEOUT_MS: &str = "LLMCAST_TIMEOUT_MS";
const ENV_HOST: &str = "LLMCAST_HOST";
const ENV_PORT: &str = "LLMCAST_PORT";

/// HTTP 服务监听配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 请求体大小上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// 网关配置
///
/// 默认值与本地 Ollama 部署对齐（`http://127.0.0.1:11434` + `llama3.2:1b`）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    /// 推理后端基础地址（OpenAI 兼容 API，不含 `/v1` 路径）
    #[serde(default = "default_base_url")]
    pub llm_base_url: String,
    /// 默认模型名称
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// 补全请求的默认 max_tokens
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
    /// 交互式对话路由的 max_tokens（对应 POST /chat）
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    /// 默认采样温度，范围 [0, 2]
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    /// 单次后端调用超时（毫秒），0 表示不限制
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    /// GET /ask 未携带 prompt 参数时使用的默认提示词
    #[serde(default = "default_prompt")]
    pub default_prompt: String,
    /// 对话种子使用的系统提示词
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// HTTP 服务监听配置
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model_name() -> String {
    "llama3.2:1b".to_string()
}

fn default_max_tokens() -> u32 {
    100
}

fn default_chat_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_prompt() -> String {
    "What are the key benefits of local LLM systems?".to_string()
}

fn default_system_prompt() -> String {
    "You are a friendly assistant that gives accurate and precise answers.".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            llm_base_url: default_base_url(),
            model_name: default_model_name(),
            default_max_tokens: default_max_tokens(),
            chat_max_tokens: default_chat_max_tokens(),
            default_temperature: default_temperature(),
            request_timeout_ms: default_timeout_ms(),
            default_prompt: default_prompt(),
            system_prompt: default_system_prompt(),
            server: ServerConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// 从 YAML 配置文件加载，再叠加环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, GatewayError> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    GatewayError::Config(format!("读取配置文件失败 {}: {}", p.display(), e))
                })?;
                serde_yaml::from_str(&content)
                    .map_err(|e| GatewayError::Config(format!("解析配置文件失败: {}", e)))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        config.llm_base_url = config.llm_base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// 叠加环境变量覆盖（环境变量优先于配置文件）
    fn apply_env_overrides(&mut self) -> Result<(), GatewayError> {
        if let Ok(v) = std::env::var(ENV_BASE_URL) {
            self.llm_base_url = v;
        }
        if let Ok(v) = std::env::var(ENV_MODEL) {
            self.model_name = v;
        }
        if let Ok(v) = std::env::var(ENV_MAX_TOKENS) {
            self.default_max_tokens = v
                .parse()
                .map_err(|_| GatewayError::Config(format!("{} 不是有效整数: {}", ENV_MAX_TOKENS, v)))?;
        }
        if let Ok(v) = std::env::var(ENV_TEMPERATURE) {
            self.default_temperature = v.parse().map_err(|_| {
                GatewayError::Config(format!("{} 不是有效浮点数: {}", ENV_TEMPERATURE, v))
            })?;
        }
        if let Ok(v) = std::env::var(ENV_TIMEOUT_MS) {
            self.request_timeout_ms = v
                .parse()
                .map_err(|_| GatewayError::Config(format!("{} 不是有效整数: {}", ENV_TIMEOUT_MS, v)))?;
        }
        if let Ok(v) = std::env::var(ENV_HOST) {
            self.server.host = v;
        }
        if let Ok(v) = std::env::var(ENV_PORT) {
            self.server.port = v
                .parse()
                .map_err(|_| GatewayError::Config(format!("{} 不是有效端口: {}", ENV_PORT, v)))?;
        }
        Ok(())
    }

    /// 校验配置合法性
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.llm_base_url.trim().is_empty() {
            return Err(GatewayError::Config("llm_base_url 不能为空".to_string()));
        }
        if self.default_max_tokens == 0 {
            return Err(GatewayError::Config(
                "default_max_tokens 必须大于 0".to_string(),
            ));
        }
        if self.chat_max_tokens == 0 {
            return Err(GatewayError::Config("chat_max_tokens 必须大于 0".to_string()));
        }
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(GatewayError::Config(format!(
                "default_temperature 必须在 [0, 2] 范围内: {}",
                self.default_temperature
            )));
        }
        Ok(())
    }

    /// 获取单次后端调用超时，0 表示不限制
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_ms > 0 {
            Some(Duration::from_millis(self.request_timeout_ms))
        } else {
            None
        }
    }

    /// 监听地址字符串，形如 `0.0.0.0:8080`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
