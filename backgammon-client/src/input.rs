//! 本地输入处理
//!
//! 把抽象输入事件落到棋盘模型上：拖动棋子、点击骰子、快捷键。

use protocol::{GameEvent, PieceId};
use rand::Rng;

use crate::board::{BoardModel, DragState, EventSink, Piece, PieceColor, Point, RollSource};

/// 鼠标按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// 按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// 掷骰
    Space,
    /// 重置棋盘
    Escape,
    /// 调整眼数
    AdjustEyes { color: PieceColor, delta: i32 },
}

/// 输入事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown { pos: Point, button: MouseButton },
    PointerUp { pos: Point, button: MouseButton },
    PointerMotion { pos: Point },
    Key(Key),
    Quit,
}

/// 棋子对事件的响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Grabbed,
    /// 拖动到新位置
    Dragged(Point),
    Released,
}

/// 认领了事件的棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claimed {
    pub id: PieceId,
    pub claim: Claim,
    /// 是否被提到最上层
    pub promoted: bool,
}

/// 一次输入的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Ignored,
    Piece(Claimed),
    Rolled { double: bool },
    Reset,
    EyesAdjusted,
    Quit,
}

/// 处理一次本地输入
pub fn reconcile<R, S>(
    board: &mut BoardModel,
    event: &InputEvent,
    rng: &mut R,
    sink: &mut S,
) -> InputOutcome
where
    R: Rng + ?Sized,
    S: EventSink + ?Sized,
{
    match *event {
        InputEvent::Quit => InputOutcome::Quit,
        InputEvent::Key(Key::Space) => InputOutcome::Rolled {
            double: board.roll_dice(RollSource::Local, rng, sink),
        },
        InputEvent::Key(Key::Escape) => {
            board.reset(true, rng, sink);
            InputOutcome::Reset
        }
        InputEvent::Key(Key::AdjustEyes { color, delta }) => {
            board.adjust_eyes(color, delta, sink);
            InputOutcome::EyesAdjusted
        }
        InputEvent::PointerDown { pos, button } => match handle_piece_event(board, event, sink) {
            Some(claimed) => InputOutcome::Piece(claimed),
            None if button == MouseButton::Primary && board.dice().hit(pos) => {
                InputOutcome::Rolled {
                    double: board.roll_dice(RollSource::Local, rng, sink),
                }
            }
            None => InputOutcome::Ignored,
        },
        InputEvent::PointerUp { .. } => handle_piece_event(board, event, sink)
            .map(InputOutcome::Piece)
            .unwrap_or(InputOutcome::Ignored),
        InputEvent::PointerMotion { pos } => {
            let outcome = handle_piece_event(board, event, sink)
                .map(InputOutcome::Piece)
                .unwrap_or(InputOutcome::Ignored);
            sink.emit(GameEvent::MouseMotion { pos: pos.into() });
            outcome
        }
    }
}

/// 按从上到下的顺序让棋子认领指针事件
///
/// 第一个认领的棋子是当前活动棋子。不在最上层且不与其他棋子重叠时提到最上层。
pub fn handle_piece_event<S>(
    board: &mut BoardModel,
    event: &InputEvent,
    sink: &mut S,
) -> Option<Claimed>
where
    S: EventSink + ?Sized,
{
    let drag_free = board.dragging_index().is_none();

    let mut found = None;
    for index in 0..board.pieces().len() {
        let Some(piece) = board.piece_at_mut(index) else {
            break;
        };
        if let Some(claim) = claim(piece, event, drag_free) {
            found = Some((index, piece.id, claim));
            break;
        }
    }
    let (index, id, claim) = found?;

    match claim {
        Claim::Grabbed => {}
        Claim::Dragged(to) => board.apply_local_move(index, to, sink),
        Claim::Released => sink.emit(GameEvent::Impact),
    }

    let promoted = index != 0 && !board.overlaps_any(index);
    if promoted {
        board.bring_to_front(index);
    }

    Some(Claimed { id, claim, promoted })
}

fn claim(piece: &mut Piece, event: &InputEvent, drag_free: bool) -> Option<Claim> {
    match (*event, piece.drag) {
        (
            InputEvent::PointerDown {
                pos,
                button: MouseButton::Primary,
            },
            DragState::Idle,
        ) if drag_free && piece.hit(pos) => {
            piece.drag = DragState::Dragging {
                offset: piece.pos.delta(pos),
            };
            Some(Claim::Grabbed)
        }
        (
            InputEvent::PointerUp {
                button: MouseButton::Primary,
                ..
            },
            DragState::Dragging { .. },
        ) => {
            piece.drag = DragState::Idle;
            Some(Claim::Released)
        }
        (InputEvent::PointerMotion { pos }, DragState::Dragging { offset }) => {
            Some(Claim::Dragged(pos.offset(offset)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (BoardModel, StdRng, Vec<GameEvent>) {
        let mut rng = StdRng::seed_from_u64(5);
        (BoardModel::new(&mut rng), rng, Vec::new())
    }

    fn down(x: i32, y: i32) -> InputEvent {
        InputEvent::PointerDown {
            pos: Point::new(x, y),
            button: MouseButton::Primary,
        }
    }

    fn up(x: i32, y: i32) -> InputEvent {
        InputEvent::PointerUp {
            pos: Point::new(x, y),
            button: MouseButton::Primary,
        }
    }

    fn motion(x: i32, y: i32) -> InputEvent {
        InputEvent::PointerMotion {
            pos: Point::new(x, y),
        }
    }

    #[test]
    fn test_isolated_piece_is_promoted() {
        let (mut board, mut rng, mut out) = setup();
        // 3 号棋子在 5 号格底部
        let target = board.piece(3).unwrap().pos;
        assert_eq!(board.pieces()[2].id, 3);

        let outcome = reconcile(&mut board, &down(target.x, target.y), &mut rng, &mut out);
        assert_eq!(
            outcome,
            InputOutcome::Piece(Claimed {
                id: 3,
                claim: Claim::Grabbed,
                promoted: true,
            })
        );
        assert_eq!(board.pieces()[0].id, 3);
        assert!(out.is_empty());
    }

    #[test]
    fn test_overlapping_piece_is_not_promoted() {
        let (mut board, mut rng, mut out) = setup();
        let anchor = board.piece(3).unwrap().pos;
        board.apply_remote_move(4, anchor.x + 60, anchor.y).unwrap();
        let order: Vec<PieceId> = board.pieces().iter().map(|p| p.id).collect();

        // 只命中 4 号棋子
        let outcome = reconcile(&mut board, &down(anchor.x + 90, anchor.y), &mut rng, &mut out);
        assert_eq!(
            outcome,
            InputOutcome::Piece(Claimed {
                id: 4,
                claim: Claim::Grabbed,
                promoted: false,
            })
        );
        let after: Vec<PieceId> = board.pieces().iter().map(|p| p.id).collect();
        assert_eq!(order, after);
    }

    #[test]
    fn test_drag_emits_moves_and_impact() {
        let (mut board, mut rng, mut out) = setup();
        let start = board.piece(7).unwrap().pos;

        // 偏离中心 10 像素抓取
        reconcile(&mut board, &down(start.x + 10, start.y), &mut rng, &mut out);
        reconcile(&mut board, &motion(130, 340), &mut rng, &mut out);
        reconcile(&mut board, &up(130, 340), &mut rng, &mut out);

        assert_eq!(
            out,
            vec![
                GameEvent::piece_move(7, 120, 340),
                GameEvent::MouseMotion { pos: (130, 340) },
                GameEvent::Impact,
            ]
        );
        let piece = board.piece(7).unwrap();
        assert_eq!(piece.pos, Point::new(120, 340));
        assert_eq!(piece.drag, DragState::Idle);
    }

    #[test]
    fn test_only_one_piece_drags() {
        let (mut board, mut rng, mut out) = setup();
        let first = board.piece(1).unwrap().pos;
        let second = board.piece(20).unwrap().pos;

        reconcile(&mut board, &down(first.x, first.y), &mut rng, &mut out);
        let outcome = reconcile(&mut board, &down(second.x, second.y), &mut rng, &mut out);
        assert_eq!(outcome, InputOutcome::Ignored);
        assert_eq!(board.pieces().iter().filter(|p| p.is_dragging()).count(), 1);
        assert!(board.piece(1).unwrap().is_dragging());
    }

    #[test]
    fn test_secondary_button_does_not_drag() {
        let (mut board, mut rng, mut out) = setup();
        let pos = board.piece(1).unwrap().pos;
        let event = InputEvent::PointerDown {
            pos,
            button: MouseButton::Secondary,
        };
        assert_eq!(reconcile(&mut board, &event, &mut rng, &mut out), InputOutcome::Ignored);
        assert!(board.dragging_index().is_none());
    }

    #[test]
    fn test_motion_without_drag_sends_cursor_only() {
        let (mut board, mut rng, mut out) = setup();
        let outcome = reconcile(&mut board, &motion(900, 100), &mut rng, &mut out);
        assert_eq!(outcome, InputOutcome::Ignored);
        assert_eq!(out, vec![GameEvent::MouseMotion { pos: (900, 100) }]);
    }

    #[test]
    fn test_click_on_dice_rolls() {
        let (mut board, mut rng, mut out) = setup();
        let die = board.dice().die_center(1);

        let outcome = reconcile(&mut board, &down(die.x, die.y), &mut rng, &mut out);
        assert!(matches!(outcome, InputOutcome::Rolled { .. }));
        assert_eq!(out, vec![GameEvent::Roll { dice: board.dice().values() }]);
    }

    #[test]
    fn test_keys() {
        let (mut board, mut rng, mut out) = setup();

        reconcile(&mut board, &InputEvent::Key(Key::Space), &mut rng, &mut out);
        assert!(matches!(out[0], GameEvent::Roll { .. }));

        let adjust = InputEvent::Key(Key::AdjustEyes {
            color: PieceColor::Black,
            delta: 3,
        });
        reconcile(&mut board, &adjust, &mut rng, &mut out);
        assert_eq!(out[1], GameEvent::Eyes { eyes: (3, 0) });

        let outcome = reconcile(&mut board, &InputEvent::Key(Key::Escape), &mut rng, &mut out);
        assert_eq!(outcome, InputOutcome::Reset);
        assert_eq!(out[2], GameEvent::ResetBoard);

        assert_eq!(
            reconcile(&mut board, &InputEvent::Quit, &mut rng, &mut out),
            InputOutcome::Quit
        );
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let (mut board, mut rng, mut out) = setup();
        board.apply_remote_move(1, i32::MAX, 0).unwrap();
        board.apply_remote_move(2, i32::MIN, i32::MAX).unwrap();

        let start = board.piece(3).unwrap().pos;
        let outcome = reconcile(&mut board, &down(start.x + 5, start.y), &mut rng, &mut out);
        assert!(matches!(outcome, InputOutcome::Piece(c) if c.id == 3));

        // 拖到边界外，偏移量饱和
        reconcile(&mut board, &motion(i32::MIN, i32::MIN), &mut rng, &mut out);
        assert_eq!(board.piece(3).unwrap().pos, Point::new(i32::MIN, i32::MIN));
        reconcile(&mut board, &up(i32::MIN, i32::MIN), &mut rng, &mut out);

        // 远处的棋子点不中
        let outcome = reconcile(&mut board, &down(i32::MAX, 0), &mut rng, &mut out);
        assert!(!matches!(outcome, InputOutcome::Piece(c) if c.id == 1));
    }
}
