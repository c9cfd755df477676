//! llmcast - 本地 LLM 推理网关
//!
//! 在本地推理服务（OpenAI 兼容 API，如 Ollama 的 `/v1` 端点）前
//! 暴露一层小型 REST 接口：接收客户端意图，翻译为后端请求，
//! 并把结果或失败归一化为稳定的 JSON 契约。

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod server;
