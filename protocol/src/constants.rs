//! 协议常量定义

use std::time::Duration;

/// 协议版本号
pub const PROTOCOL_VERSION: u8 = 1;

/// 默认端口
pub const DEFAULT_PORT: u16 = 61096;

/// 消息帧最大大小（单条事件只有几十字节）
pub const MAX_FRAME_SIZE: usize = 4096;

/// 服务端最大连接数
pub const MAX_CONNECTIONS: usize = 16;

/// 客户端主循环频率（每秒 tick 数）
pub const TICKS_PER_SECOND: u32 = 60;

/// 心跳间隔（秒）
pub const PING_INTERVAL_SECS: u32 = 4;

/// 心跳间隔（tick 数）
pub const PING_INTERVAL_TICKS: u32 = PING_INTERVAL_SECS * TICKS_PER_SECOND;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

/// 棋子总数
pub const PIECE_COUNT: usize = 30;

/// 每方棋子数
pub const PIECES_PER_COLOR: usize = 15;

/// 棋盘格数
pub const FIELD_COUNT: usize = 24;
