//! 客户端错误类型

use protocol::{PieceId, ProtocolError};
use thiserror::Error;

/// 客户端错误
#[derive(Error, Debug)]
pub enum ClientError {
    /// 收到的移动引用了不存在的棋子，两端状态已无法对齐
    #[error("Unknown piece identity: {id}")]
    UnknownPieceIdentity { id: PieceId },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
