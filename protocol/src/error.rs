//! 错误类型定义

use thiserror::Error;

/// 无法解码的消息
///
/// 只影响单条消息：调用方丢弃它并继续处理后续消息，连接保持。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedMessage {
    /// 不是 JSON 对象
    #[error("payload is not a record: {reason}")]
    NotARecord { reason: String },

    /// 缺少 action 字段
    #[error("missing action tag")]
    MissingTag,

    /// 未知的 action（通常意味着协议版本不一致）
    #[error("unknown action tag: {tag}")]
    UnknownTag { tag: String },

    /// 字段缺失或取值非法
    #[error("invalid payload for '{tag}': {reason}")]
    InvalidPayload { tag: String, reason: String },
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 协议版本不匹配
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,

    /// 消息格式错误
    #[error("Malformed message: {0}")]
    Malformed(#[from] MalformedMessage),
}

impl ProtocolError {
    /// 是否只是单条消息损坏（连接仍然可用）
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::Malformed(_))
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
