//! 双陆棋客户端
//!
//! 与中继服务端保持连接，把本地操作广播给对方并合并对方的操作。

pub mod app;
pub mod board;
pub mod console;
pub mod error;
pub mod frontend;
pub mod input;
pub mod network;
pub mod settings;

pub use app::{run, step, GameClient};
pub use error::{ClientError, Result};
