use thiserror::Error;
use uuid::Uuid;

/// 提醒后端统一错误类型
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("待办事项未找到: {id}")]
    TodoNotFound { id: Uuid },

    #[error("待办事项已存在: {title}")]
    DuplicateTitle { title: String },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("消息通道 {channel} 错误: {message}")]
    Channel {
        channel: &'static str,
        message: String,
    },

    #[error("网络错误: {0}")]
    Network(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type TodoResult<T> = std::result::Result<T, TodoError>;
