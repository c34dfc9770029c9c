//! 客户端主循环
//!
//! [`GameClient`] 把网络事件和本地输入落到棋盘上，产出待发送的事件和音效。
//! [`run`] 以固定帧率驱动它：先处理网络，再处理输入，然后推进心跳并渲染。

use std::thread;
use std::time::{Duration, Instant};

use protocol::{GameEvent, PieceId, TICKS_PER_SECOND};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::board::{BoardModel, Point, RollSource};
use crate::error::Result;
use crate::frontend::{AudioCue, InputSource, Renderer, Scene, Sound};
use crate::input::{self, Claim, InputEvent, InputOutcome};
use crate::network::{dispatch, ConnectionStatus, EventHandler, Session, SessionEvent};

/// 客户端状态
pub struct GameClient {
    board: BoardModel,
    rng: StdRng,
    /// 本进程是否同时运行服务端
    hosting: bool,
    connected: bool,
    running: bool,
    /// 待发送的事件
    outbox: Vec<GameEvent>,
    /// 待播放的音效
    sounds: Vec<Sound>,
}

impl GameClient {
    pub fn new(hosting: bool) -> Self {
        Self::with_rng(hosting, StdRng::from_entropy())
    }

    pub fn with_rng(hosting: bool, mut rng: StdRng) -> Self {
        Self {
            board: BoardModel::new(&mut rng),
            rng,
            hosting,
            connected: false,
            running: true,
            outbox: Vec::new(),
            sounds: Vec::new(),
        }
    }

    pub fn board(&self) -> &BoardModel {
        &self.board
    }

    pub fn is_hosting(&self) -> bool {
        self.hosting
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene::from_board(&self.board, self.connected)
    }

    pub fn take_outbox(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn take_sounds(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.sounds)
    }

    /// 处理一次本地输入
    pub fn handle_input(&mut self, event: &InputEvent) {
        let outcome = input::reconcile(&mut self.board, event, &mut self.rng, &mut self.outbox);
        match outcome {
            InputOutcome::Piece(claimed) if claimed.claim == Claim::Released => {
                self.sounds.push(Sound::Impact);
            }
            InputOutcome::Rolled { double } => self.play_roll(double),
            InputOutcome::Reset => self.sounds.push(Sound::BoardReset),
            InputOutcome::Quit => {
                info!("Quit requested");
                self.running = false;
            }
            _ => {}
        }
    }

    /// 处理会话事件，棋子 ID 不匹配时返回错误
    pub fn handle_session_event(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::Connected => {
                self.connected = true;
            }
            SessionEvent::Received(event) => {
                debug!("Received {}", event.tag());
                dispatch(event, self)?;
            }
            SessionEvent::Malformed(e) => {
                warn!("Dropping malformed message: {}", e);
            }
            SessionEvent::Disconnected { reason } => {
                warn!("Connection lost: {}", reason);
                self.connected = false;
                self.board.set_player_count(0);
                self.board.hide_cursor();
            }
        }
        Ok(())
    }

    fn play_roll(&mut self, double: bool) {
        self.sounds.push(Sound::DiceRoll);
        if double {
            self.sounds.push(Sound::DoubleCheer);
        }
    }
}

impl EventHandler for GameClient {
    fn on_reset_board(&mut self) {
        self.board.reset(false, &mut self.rng, &mut self.outbox);
        self.sounds.push(Sound::BoardReset);
    }

    fn on_roll(&mut self, dice: (u8, u8)) {
        let double = self
            .board
            .roll_dice(RollSource::Remote(dice), &mut self.rng, &mut self.outbox);
        self.play_roll(double);
    }

    fn on_move(&mut self, id: PieceId, x: i32, y: i32) -> Result<()> {
        self.board.apply_remote_move(id, x, y)?;
        Ok(())
    }

    fn on_impact(&mut self) {
        self.sounds.push(Sound::Impact);
    }

    fn on_mouse_motion(&mut self, pos: Point) {
        self.board.show_cursor(pos);
    }

    fn on_player_count(&mut self, count: u32) {
        let increased = self.board.set_player_count(count);
        info!("{} player(s) connected", count);

        // 只有服务端所在的客户端负责同步完整状态
        if self.hosting && increased {
            let events = self.board.full_state_events();
            info!("Sending board state ({} events)", events.len());
            self.outbox.extend(events);
        }
    }

    fn on_eyes(&mut self, eyes: (u32, u32)) {
        self.board.set_eyes(eyes);
    }
}

/// 推进一帧
pub fn step<F>(client: &mut GameClient, session: &mut Session, frontend: &mut F) -> Result<()>
where
    F: Renderer + AudioCue + InputSource,
{
    for event in session.poll() {
        client.handle_session_event(event)?;
    }

    for event in frontend.poll() {
        client.handle_input(&event);
    }

    session.tick();
    for event in client.take_outbox() {
        session.send(event);
    }
    for sound in client.take_sounds() {
        frontend.play(sound);
    }

    frontend.render(&client.scene());
    Ok(())
}

/// 以固定帧率运行直到退出
///
/// 收到不存在的棋子 ID 时终止并返回错误。
pub fn run<F>(client: &mut GameClient, session: &mut Session, frontend: &mut F) -> Result<()>
where
    F: Renderer + AudioCue + InputSource,
{
    let frame = Duration::from_secs(1) / TICKS_PER_SECOND;
    let mut next = Instant::now();

    info!("Connecting to {}", session.addr());
    while client.is_running() {
        if let Err(e) = step(client, session, frontend) {
            error!("Session aborted: {}", e);
            session.close();
            return Err(e);
        }

        next += frame;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            next = now;
        }
    }

    if session.status() != ConnectionStatus::Disconnected {
        session.close();
    }
    Ok(())
}
