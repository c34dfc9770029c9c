//! 网络通信模块
//!
//! 会话在后台 tokio 任务中运行，收到的事件按标签分发给 [`EventHandler`]。

mod connection;

pub use connection::*;

use protocol::{GameEvent, PieceId};
use tracing::debug;

use crate::board::Point;
use crate::error::Result;

/// 收到的事件的处理器，每个标签一个方法
pub trait EventHandler {
    fn on_reset_board(&mut self);

    fn on_roll(&mut self, dice: (u8, u8));

    /// 棋子 ID 不存在时返回错误
    fn on_move(&mut self, id: PieceId, x: i32, y: i32) -> Result<()>;

    fn on_impact(&mut self);

    /// 服务端不会向客户端发送 ping
    fn on_ping(&mut self) {
        debug!("Unexpected ping from server");
    }

    fn on_pong(&mut self) {}

    fn on_mouse_motion(&mut self, pos: Point);

    fn on_player_count(&mut self, count: u32);

    fn on_eyes(&mut self, eyes: (u32, u32));
}

/// 把事件分发到对应的处理方法
pub fn dispatch<H>(event: GameEvent, handler: &mut H) -> Result<()>
where
    H: EventHandler + ?Sized,
{
    match event {
        GameEvent::ResetBoard => handler.on_reset_board(),
        GameEvent::Roll { dice } => handler.on_roll(dice),
        GameEvent::Move { piece: (id, x, y) } => return handler.on_move(id, x, y),
        GameEvent::Impact => handler.on_impact(),
        GameEvent::Ping => handler.on_ping(),
        GameEvent::Pong => handler.on_pong(),
        GameEvent::MouseMotion { pos } => handler.on_mouse_motion(pos.into()),
        GameEvent::PlayerCount { count } => handler.on_player_count(count),
        GameEvent::Eyes { eyes } => handler.on_eyes(eyes),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    /// 记录调用的处理器
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl EventHandler for Recorder {
        fn on_reset_board(&mut self) {
            self.calls.push("reset".into());
        }

        fn on_roll(&mut self, dice: (u8, u8)) {
            self.calls.push(format!("roll {:?}", dice));
        }

        fn on_move(&mut self, id: PieceId, x: i32, y: i32) -> Result<()> {
            if id > 30 {
                return Err(ClientError::UnknownPieceIdentity { id });
            }
            self.calls.push(format!("move {} {} {}", id, x, y));
            Ok(())
        }

        fn on_impact(&mut self) {
            self.calls.push("impact".into());
        }

        fn on_pong(&mut self) {
            self.calls.push("pong".into());
        }

        fn on_mouse_motion(&mut self, pos: Point) {
            self.calls.push(format!("cursor {} {}", pos.x, pos.y));
        }

        fn on_player_count(&mut self, count: u32) {
            self.calls.push(format!("count {}", count));
        }

        fn on_eyes(&mut self, eyes: (u32, u32)) {
            self.calls.push(format!("eyes {:?}", eyes));
        }
    }

    #[test]
    fn test_dispatch_routes_each_tag() {
        let mut recorder = Recorder::default();
        let events = [
            GameEvent::ResetBoard,
            GameEvent::Roll { dice: (3, 5) },
            GameEvent::piece_move(7, 120, 340),
            GameEvent::Impact,
            GameEvent::Ping,
            GameEvent::Pong,
            GameEvent::MouseMotion { pos: (1, 2) },
            GameEvent::PlayerCount { count: 2 },
            GameEvent::Eyes { eyes: (1, 0) },
        ];
        for event in events {
            dispatch(event, &mut recorder).unwrap();
        }

        assert_eq!(
            recorder.calls,
            vec![
                "reset",
                "roll (3, 5)",
                "move 7 120 340",
                "impact",
                "pong",
                "cursor 1 2",
                "count 2",
                "eyes (1, 0)",
            ]
        );
    }

    #[test]
    fn test_dispatch_propagates_move_error() {
        let mut recorder = Recorder::default();
        let err = dispatch(GameEvent::piece_move(99, 0, 0), &mut recorder).unwrap_err();
        assert!(matches!(err, ClientError::UnknownPieceIdentity { id: 99 }));
    }
}
