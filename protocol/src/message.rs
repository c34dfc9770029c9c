//! 消息类型定义

use serde::{Deserialize, Serialize};

/// 棋子 ID（棋盘重置时分配，1..=30）
pub type PieceId = u32;

/// 连接 ID（服务端为每个连接分配）
pub type PeerId = u64;

/// 消息标签字段名
pub const TAG_KEY: &str = "action";

/// 所有合法标签
pub const ALL_TAGS: [&str; 9] = [
    "resetboard",
    "roll",
    "move",
    "impact",
    "ping",
    "pong",
    "mousemotion",
    "playercount",
    "eyes",
];

/// 游戏事件
///
/// 客户端与服务端共用同一套事件。线上格式为带 `action` 标签的 JSON 对象，
/// 例如 `{"action":"move","piece":[7,120,340]}`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum GameEvent {
    /// 棋盘恢复初始布局
    ResetBoard,
    /// 掷骰结果
    Roll { dice: (u8, u8) },
    /// 棋子新位置 (id, x, y)
    Move { piece: (PieceId, i32, i32) },
    /// 棋子落下（接收方播放音效）
    Impact,
    /// 心跳请求（客户端 -> 服务端）
    Ping,
    /// 心跳响应（服务端 -> 客户端）
    Pong,
    /// 对方鼠标位置
    MouseMotion { pos: (i32, i32) },
    /// 当前在线人数
    PlayerCount { count: u32 },
    /// 点数计数器（黑，白）
    Eyes { eyes: (u32, u32) },
}

impl GameEvent {
    /// 线上标签
    pub fn tag(&self) -> &'static str {
        match self {
            GameEvent::ResetBoard => "resetboard",
            GameEvent::Roll { .. } => "roll",
            GameEvent::Move { .. } => "move",
            GameEvent::Impact => "impact",
            GameEvent::Ping => "ping",
            GameEvent::Pong => "pong",
            GameEvent::MouseMotion { .. } => "mousemotion",
            GameEvent::PlayerCount { .. } => "playercount",
            GameEvent::Eyes { .. } => "eyes",
        }
    }

    /// 服务端是否原样转发给其他连接
    pub fn is_relayed(&self) -> bool {
        matches!(
            self,
            GameEvent::ResetBoard
                | GameEvent::Roll { .. }
                | GameEvent::Move { .. }
                | GameEvent::Impact
                | GameEvent::MouseMotion { .. }
                | GameEvent::Eyes { .. }
        )
    }

    /// 构造走子事件
    pub fn piece_move(id: PieceId, x: i32, y: i32) -> Self {
        GameEvent::Move { piece: (id, x, y) }
    }
}
