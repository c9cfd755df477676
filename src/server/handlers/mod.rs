//! 请求处理器模块

pub mod llm_api;
