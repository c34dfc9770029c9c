//! 前端接口
//!
//! 渲染、音效和输入由外部实现，核心只通过这几个 trait 调用。

use crate::board::{BoardModel, DicePair, EyeCounters, Piece, Point};
use crate::input::InputEvent;

/// 音效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    DiceRoll,
    Impact,
    BoardReset,
    /// 掷出对子
    DoubleCheer,
}

/// 一帧要绘制的内容
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    /// 优先级顺序，下标 0 在最上层，绘制时应倒序
    pub pieces: &'a [Piece],
    pub dice: &'a DicePair,
    pub eyes: EyeCounters,
    /// 对方光标，不可见时为 None
    pub cursor: Option<Point>,
    /// 状态栏文字
    pub status: String,
}

impl<'a> Scene<'a> {
    pub fn from_board(board: &'a BoardModel, connected: bool) -> Self {
        let cursor = board.cursor();
        Self {
            pieces: board.pieces(),
            dice: board.dice(),
            eyes: board.eyes(),
            cursor: cursor.visible.then_some(cursor.pos),
            status: status_text(board.player_count(), connected),
        }
    }
}

/// 状态栏文字
pub fn status_text(player_count: u32, connected: bool) -> String {
    if connected {
        format!("{} Player(s)", player_count)
    } else {
        "Offline".to_string()
    }
}

pub trait Renderer {
    fn render(&mut self, scene: &Scene<'_>);
}

pub trait AudioCue {
    fn play(&mut self, sound: Sound);
}

pub trait InputSource {
    /// 非阻塞地取出待处理的输入
    fn poll(&mut self) -> Vec<InputEvent>;
}
