//! 棋盘状态模型
//!
//! 持有棋子、骰子、眼数和对方光标。所有本地修改都通过 [`EventSink`]
//! 产出要广播的事件，远端事件只修改本地状态不再转发。

pub mod dice;
pub mod pieces;

pub use dice::*;
pub use pieces::*;

use protocol::{GameEvent, PieceId};
use rand::Rng;
use tracing::debug;

use crate::error::{ClientError, Result};

/// 出站事件的去处
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// 掷骰来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollSource {
    /// 本地掷骰，生成点数并广播
    Local,
    /// 对方的点数
    Remote((u8, u8)),
}

/// 远端移动的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMove {
    Applied,
    /// 本地正在拖动该棋子，保留本地位置
    SuppressedByDrag,
}

/// 对方光标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoteCursor {
    pub pos: Point,
    pub visible: bool,
}

/// 棋盘状态
#[derive(Debug, Clone)]
pub struct BoardModel {
    /// 优先级顺序，下标 0 在最上层
    pieces: Vec<Piece>,
    dice: DicePair,
    eyes: EyeCounters,
    player_count: u32,
    cursor: RemoteCursor,
}

impl BoardModel {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            pieces: initial_pieces(),
            dice: DicePair::random(rng),
            eyes: EyeCounters::default(),
            player_count: 0,
            cursor: RemoteCursor::default(),
        }
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn dice(&self) -> &DicePair {
        &self.dice
    }

    pub fn eyes(&self) -> EyeCounters {
        self.eyes
    }

    pub fn player_count(&self) -> u32 {
        self.player_count
    }

    pub fn cursor(&self) -> RemoteCursor {
        self.cursor
    }

    /// 恢复开局布局
    pub fn reset<R, S>(&mut self, broadcast: bool, rng: &mut R, sink: &mut S)
    where
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        self.pieces = initial_pieces();
        self.dice.rejitter(rng);
        self.eyes.clear();

        if broadcast {
            sink.emit(GameEvent::ResetBoard);
        }
        debug!("Board reset (broadcast: {})", broadcast);
    }

    /// 采用对方的棋子位置
    ///
    /// ID 不存在时返回错误且不修改任何状态。
    pub fn apply_remote_move(&mut self, id: PieceId, x: i32, y: i32) -> Result<RemoteMove> {
        let piece = self
            .pieces
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ClientError::UnknownPieceIdentity { id })?;

        if piece.is_dragging() {
            debug!("Ignoring remote move of piece {} while dragging", id);
            return Ok(RemoteMove::SuppressedByDrag);
        }

        piece.pos = Point::new(x, y);
        Ok(RemoteMove::Applied)
    }

    /// 本地移动棋子并立即广播
    pub fn apply_local_move<S>(&mut self, index: usize, pos: Point, sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        let Some(piece) = self.pieces.get_mut(index) else {
            return;
        };
        piece.pos = pos;
        sink.emit(GameEvent::piece_move(piece.id, pos.x, pos.y));
    }

    /// 掷骰，返回是否为对子
    pub fn roll_dice<R, S>(&mut self, source: RollSource, rng: &mut R, sink: &mut S) -> bool
    where
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        match source {
            RollSource::Local => {
                let dice = self.dice.roll(rng);
                sink.emit(GameEvent::Roll { dice });
                debug!("Rolled {:?}", dice);
            }
            RollSource::Remote(dice) => self.dice.adopt(dice, rng),
        }
        self.dice.is_double()
    }

    /// 采用对方的眼数
    pub fn set_eyes(&mut self, eyes: (u32, u32)) {
        self.eyes = eyes.into();
    }

    /// 本地调整眼数并广播
    pub fn adjust_eyes<S>(&mut self, color: PieceColor, delta: i32, sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        self.eyes.adjust(color, delta);
        sink.emit(GameEvent::Eyes {
            eyes: self.eyes.into(),
        });
    }

    /// 更新人数，返回人数是否增加
    pub fn set_player_count(&mut self, count: u32) -> bool {
        let increased = count > self.player_count;
        self.player_count = count;
        if count < 2 {
            self.cursor.visible = false;
        }
        increased
    }

    pub fn show_cursor(&mut self, pos: Point) {
        self.cursor = RemoteCursor { pos, visible: true };
    }

    pub fn hide_cursor(&mut self) {
        self.cursor.visible = false;
    }

    /// 握手时重发的完整状态
    pub fn full_state_events(&self) -> Vec<GameEvent> {
        let mut events: Vec<GameEvent> = self
            .pieces
            .iter()
            .map(|p| GameEvent::piece_move(p.id, p.pos.x, p.pos.y))
            .collect();
        events.push(GameEvent::Roll {
            dice: self.dice.values(),
        });
        events.push(GameEvent::Eyes {
            eyes: self.eyes.into(),
        });
        events
    }

    /// 正在拖动的棋子下标
    pub fn dragging_index(&self) -> Option<usize> {
        self.pieces.iter().position(Piece::is_dragging)
    }

    pub(crate) fn piece_at_mut(&mut self, index: usize) -> Option<&mut Piece> {
        self.pieces.get_mut(index)
    }

    /// 棋子的外接矩形是否与其他棋子重叠
    pub(crate) fn overlaps_any(&self, index: usize) -> bool {
        let Some(piece) = self.pieces.get(index) else {
            return false;
        };
        let rect = piece.rect();
        self.pieces
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && rect.overlaps(&other.rect()))
    }

    /// 把棋子移到最上层
    pub(crate) fn bring_to_front(&mut self, index: usize) {
        if index < self.pieces.len() {
            let piece = self.pieces.remove(index);
            self.pieces.insert(0, piece);
        }
    }
}
