//! 棋子与棋盘几何

use protocol::{PieceId, FIELD_COUNT};

/// 窗口宽度
pub const BOARD_WIDTH: i32 = 1800;

/// 窗口高度
pub const BOARD_HEIGHT: i32 = 960;

/// 三角格宽度
pub const TRIANGLE_WIDTH: i32 = 128;

/// 中间木条宽度
pub const BAR_WIDTH: i32 = BOARD_WIDTH - 12 * TRIANGLE_WIDTH;

/// 棋子半径（同时是叠放间距的一半）
pub const PIECE_RADIUS: i32 = 42;

/// 屏幕坐标（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, by: Point) -> Self {
        Self::new(self.x.saturating_add(by.x), self.y.saturating_add(by.y))
    }

    /// self - other
    pub fn delta(self, other: Point) -> Self {
        Self::new(self.x.saturating_sub(other.x), self.y.saturating_sub(other.y))
    }

    /// 距离的平方，超出 i64 范围时饱和
    pub fn distance_sq(self, other: Point) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// 轴对齐矩形，右、下边界不包含
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// 以 center 为中心的矩形
    pub fn centered(center: Point, width: i32, height: i32) -> Self {
        Self {
            left: center.x.saturating_sub(width / 2),
            top: center.y.saturating_sub(height / 2),
            width,
            height,
        }
    }

    /// 坐标在 i32 边界处饱和
    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }

    /// 是否有重叠面积（边缘相接不算）
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// 棋子颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceColor {
    Black,
    White,
}

impl PieceColor {
    /// 计数器下标（黑 0，白 1）
    pub fn index(self) -> usize {
        match self {
            PieceColor::Black => 0,
            PieceColor::White => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceColor::Black => "black",
            PieceColor::White => "white",
        }
    }
}

/// 拖动状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// 本地拖动中，offset 为棋子中心相对鼠标的偏移
    Dragging { offset: Point },
}

/// 棋子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub color: PieceColor,
    /// 中心位置
    pub pos: Point,
    pub drag: DragState,
}

impl Piece {
    pub fn new(id: PieceId, color: PieceColor, pos: Point) -> Self {
        Self {
            id,
            color,
            pos,
            drag: DragState::Idle,
        }
    }

    /// 外接矩形
    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, PIECE_RADIUS * 2, PIECE_RADIUS * 2)
    }

    /// 点是否落在圆形范围内
    pub fn hit(&self, p: Point) -> bool {
        if !self.rect().contains(p) {
            return false;
        }
        let r = PIECE_RADIUS as i64;
        self.pos.distance_sq(p) <= r * r
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }
}

/// 初始布局：(格子, 颜色, 棋子数)，按格子升序
pub const SETUP: [(usize, PieceColor, usize); 8] = [
    (0, PieceColor::Black, 2),
    (5, PieceColor::White, 5),
    (7, PieceColor::White, 3),
    (11, PieceColor::Black, 5),
    (12, PieceColor::White, 5),
    (16, PieceColor::Black, 3),
    (18, PieceColor::Black, 5),
    (23, PieceColor::White, 2),
];

/// 第 field 格第 slot 个棋子的初始位置
///
/// 12..24 格在上排从左往右，0..12 格在下排从右往左。
pub fn field_position(field: usize, slot: usize) -> Point {
    debug_assert!(field < FIELD_COUNT);
    let column = (field % 12) as i32;
    let offset_x = TRIANGLE_WIDTH / 2 + TRIANGLE_WIDTH * column + (column / 6) * BAR_WIDTH;
    let offset_y = PIECE_RADIUS * (slot as i32 * 2 + 1);

    if field / 12 == 1 {
        Point::new(offset_x, offset_y)
    } else {
        Point::new(BOARD_WIDTH - offset_x, BOARD_HEIGHT - offset_y)
    }
}

/// 生成初始棋子，ID 从 1 开始按格子、叠放顺序分配
pub fn initial_pieces() -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(protocol::PIECE_COUNT);
    let mut id: PieceId = 1;
    for (field, color, count) in SETUP {
        for slot in 0..count {
            pieces.push(Piece::new(id, color, field_position(field, slot)));
            id += 1;
        }
    }
    pieces
}
