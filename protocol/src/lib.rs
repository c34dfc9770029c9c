//! 双陆棋同步共享协议库
//!
//! 包含:
//! - 事件类型定义 (GameEvent)
//! - 事件编解码 (encode / decode)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 帧编解码 (FrameReader, FrameWriter)
//! - 错误类型

mod codec;
mod constants;
mod error;
mod message;
mod transport;

pub use codec::{decode, encode};
pub use constants::*;
pub use error::{MalformedMessage, ProtocolError, Result};
pub use message::{GameEvent, PeerId, PieceId, ALL_TAGS, TAG_KEY};
pub use transport::{
    Connection, Connector, Listener,
    TcpConnection, TcpConnector, TcpListener,
    NetworkConfig,
    FrameReader, FrameWriter,
};
