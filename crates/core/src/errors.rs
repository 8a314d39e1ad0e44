use thiserror::Error;

/// Checker错误类型定义
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("消息队列错误: {0}")]
    MessageQueue(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("诊断上报错误: {0}")]
    Diagnostics(String),
}

impl From<serde_json::Error> for CheckerError {
    fn from(e: serde_json::Error) -> Self {
        CheckerError::Serialization(e.to_string())
    }
}

impl From<config::ConfigError> for CheckerError {
    fn from(e: config::ConfigError) -> Self {
        CheckerError::Configuration(e.to_string())
    }
}

/// 统一的Result类型
pub type CheckerResult<T> = std::result::Result<T, CheckerError>;
