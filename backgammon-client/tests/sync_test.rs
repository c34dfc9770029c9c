//! 两个客户端通过真实中继同步棋盘

use std::net::SocketAddr;
use std::time::Duration;

use backgammon_client::board::{PieceColor, Point};
use backgammon_client::frontend::{AudioCue, InputSource, Renderer, Scene, Sound};
use backgammon_client::input::{InputEvent, Key, MouseButton};
use backgammon_client::network::Session;
use backgammon_client::{step, GameClient};
use backgammon_server::{start_server, ServerConfig, ServerHandle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::runtime::Handle;

/// 脚本化前端：按顺序吐出输入，记录音效
#[derive(Default)]
struct ScriptedFrontend {
    pending: Vec<InputEvent>,
    sounds: Vec<Sound>,
}

impl InputSource for ScriptedFrontend {
    fn poll(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl Renderer for ScriptedFrontend {
    fn render(&mut self, _scene: &Scene<'_>) {}
}

impl AudioCue for ScriptedFrontend {
    fn play(&mut self, sound: Sound) {
        self.sounds.push(sound);
    }
}

struct Player {
    client: GameClient,
    session: Session,
    frontend: ScriptedFrontend,
}

impl Player {
    fn join(addr: SocketAddr, hosting: bool, seed: u64) -> Self {
        Self {
            client: GameClient::with_rng(hosting, StdRng::seed_from_u64(seed)),
            session: Session::connect(&Handle::current(), addr.to_string()),
            frontend: ScriptedFrontend::default(),
        }
    }

    fn step(&mut self) {
        step(&mut self.client, &mut self.session, &mut self.frontend).unwrap();
    }

    fn input(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.frontend.pending.extend(events);
    }

    fn piece_pos(&self, id: u32) -> Point {
        self.client.board().piece(id).unwrap().pos
    }
}

async fn start() -> (ServerHandle, SocketAddr) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        announce_public_ip: false,
        ..ServerConfig::default()
    };
    start_server(config).await.unwrap()
}

/// 交替推进两个客户端直到条件满足
async fn pump_until(a: &mut Player, b: &mut Player, done: impl Fn(&Player, &Player) -> bool) {
    for _ in 0..500 {
        a.step();
        b.step();
        if done(a, b) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("players did not converge");
}

fn both_see_two(a: &Player, b: &Player) -> bool {
    a.client.board().player_count() == 2 && b.client.board().player_count() == 2
}

#[tokio::test(flavor = "multi_thread")]
async fn test_roll_and_move_converge() {
    let (handle, addr) = start().await;
    let mut a = Player::join(addr, true, 1);
    let mut b = Player::join(addr, false, 2);
    pump_until(&mut a, &mut b, both_see_two).await;

    a.input([InputEvent::Key(Key::Space)]);
    pump_until(&mut a, &mut b, |a, b| {
        b.frontend.sounds.contains(&Sound::DiceRoll)
            && a.client.board().dice().values() == b.client.board().dice().values()
    })
    .await;

    let from = a.client.board().piece(7).unwrap().pos;
    a.input([
        InputEvent::PointerDown {
            pos: from,
            button: MouseButton::Primary,
        },
        InputEvent::PointerMotion {
            pos: Point::new(120, 340),
        },
        InputEvent::PointerUp {
            pos: Point::new(120, 340),
            button: MouseButton::Primary,
        },
    ]);
    pump_until(&mut a, &mut b, |_, b| {
        b.client.board().piece(7).unwrap().pos == Point::new(120, 340)
    })
    .await;

    assert_eq!(a.client.board().piece(7).unwrap().pos, Point::new(120, 340));
    assert!(b.client.board().cursor().visible);
    assert_eq!(b.client.board().cursor().pos, Point::new(120, 340));

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_host_sends_state_to_late_joiner() {
    let (handle, addr) = start().await;
    let mut a = Player::join(addr, true, 3);

    // 对方加入前先改动棋盘
    let from = a.piece_pos(20);
    a.input([
        InputEvent::PointerDown {
            pos: from,
            button: MouseButton::Primary,
        },
        InputEvent::PointerMotion {
            pos: Point::new(900, 700),
        },
        InputEvent::PointerUp {
            pos: Point::new(900, 700),
            button: MouseButton::Primary,
        },
        InputEvent::Key(Key::AdjustEyes {
            color: PieceColor::White,
            delta: 4,
        }),
    ]);
    for _ in 0..20 {
        a.step();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let mut b = Player::join(addr, false, 4);
    pump_until(&mut a, &mut b, |a, b| {
        both_see_two(a, b)
            && b.client.board().piece(20).unwrap().pos == Point::new(900, 700)
            && b.client.board().eyes() == a.client.board().eyes()
            && b.client.board().dice().values() == a.client.board().dice().values()
    })
    .await;

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reset_propagates_once() {
    let (handle, addr) = start().await;
    let mut a = Player::join(addr, true, 5);
    let mut b = Player::join(addr, false, 6);
    pump_until(&mut a, &mut b, both_see_two).await;

    let from = b.piece_pos(1);
    b.input([
        InputEvent::PointerDown {
            pos: from,
            button: MouseButton::Primary,
        },
        InputEvent::PointerMotion {
            pos: Point::new(500, 500),
        },
        InputEvent::PointerUp {
            pos: Point::new(500, 500),
            button: MouseButton::Primary,
        },
    ]);
    pump_until(&mut a, &mut b, |a, _| {
        a.client.board().piece(1).unwrap().pos == Point::new(500, 500)
    })
    .await;

    a.input([InputEvent::Key(Key::Escape)]);
    pump_until(&mut a, &mut b, |_, b| {
        b.client.board().piece(1).unwrap().pos == from
    })
    .await;

    // 对方不会把重置再发回来
    for _ in 0..20 {
        a.step();
        b.step();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let resets = a
        .frontend
        .sounds
        .iter()
        .filter(|s| **s == Sound::BoardReset)
        .count();
    assert_eq!(resets, 1);

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_loss_zeroes_player_count() {
    let (handle, addr) = start().await;
    let mut a = Player::join(addr, false, 7);
    let mut b = Player::join(addr, false, 8);
    pump_until(&mut a, &mut b, both_see_two).await;

    handle.shutdown().await;
    pump_until(&mut a, &mut b, |a, b| {
        !a.client.is_connected() && !b.client.is_connected()
    })
    .await;

    assert_eq!(a.client.board().player_count(), 0);
    assert!(!b.client.board().cursor().visible);
}
