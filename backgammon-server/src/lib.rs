//! 双陆棋中继服务端
//!
//! 包含:
//! - 连接注册表
//! - 中继逻辑（转发、人数广播、心跳）
//! - TCP 监听与中继 actor
//! - 公网 IP 查询

pub mod ip;
pub mod peer;
pub mod relay;
pub mod server;

pub use peer::{Peer, PeerRegistry};
pub use relay::{start_server, ServerConfig, ServerHandle};
pub use server::{MessageHandler, RelayState};
