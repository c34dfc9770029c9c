//! 中继逻辑
//!
//! 服务端不解释 move/roll 的内容，也不保存棋盘状态，只负责转发。

use protocol::{GameEvent, PeerId};
use tokio::sync::mpsc;

use crate::peer::{Peer, PeerRegistry};

/// 中继状态
pub struct RelayState {
    pub peers: PeerRegistry,
}

impl RelayState {
    pub fn new() -> Self {
        Self {
            peers: PeerRegistry::new(),
        }
    }

    /// 发送事件给单个连接
    pub fn send_to_peer(&mut self, peer_id: PeerId, event: GameEvent) {
        if let Some(peer) = self.peers.get_mut(peer_id) {
            peer.deliver(event);
        }
    }

    /// 广播事件（可排除发送者）
    ///
    /// 按注册表顺序逐个投递，不等待任何连接的队列腾出空间。
    pub fn broadcast(&mut self, event: GameEvent, except: Option<PeerId>) {
        for peer in self.peers.iter_mut() {
            if Some(peer.id) == except {
                continue;
            }
            peer.deliver(event);
        }
    }

    /// 当前人数
    pub fn player_count(&self) -> u32 {
        self.peers.len() as u32
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new()
    }
}

/// 待发送的消息
struct PendingMessages {
    messages: Vec<(PeerId, GameEvent)>,
    broadcasts: Vec<(Option<PeerId>, GameEvent)>,
}

impl PendingMessages {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            broadcasts: Vec::new(),
        }
    }

    fn send(&mut self, peer_id: PeerId, event: GameEvent) {
        self.messages.push((peer_id, event));
    }

    fn broadcast_all(&mut self, event: GameEvent) {
        self.broadcasts.push((None, event));
    }

    fn broadcast_others(&mut self, sender: PeerId, event: GameEvent) {
        self.broadcasts.push((Some(sender), event));
    }

    fn flush(self, state: &mut RelayState) {
        for (peer_id, event) in self.messages {
            state.send_to_peer(peer_id, event);
        }
        for (except, event) in self.broadcasts {
            state.broadcast(event, except);
        }
    }
}

/// 消息处理器
pub struct MessageHandler;

impl MessageHandler {
    /// 新连接：登记并向所有人（包括新连接）广播人数
    pub fn handle_connect(
        state: &mut RelayState,
        addr: Option<String>,
        tx: mpsc::Sender<GameEvent>,
    ) -> PeerId {
        let peer_id = state.peers.allocate_id();
        Self::register(state, Peer::new(peer_id, addr, tx));
        peer_id
    }

    /// 登记已构造好的连接
    pub fn register(state: &mut RelayState, peer: Peer) {
        tracing::info!("New player {} from {:?}", peer.id, peer.addr);
        state.peers.insert(peer);
        tracing::info!("Players: {:?}", state.peers.ids());

        let mut pending = PendingMessages::new();
        pending.broadcast_all(GameEvent::PlayerCount {
            count: state.player_count(),
        });
        pending.flush(state);
    }

    /// 断开：移除并向剩余连接广播人数
    pub fn handle_disconnect(state: &mut RelayState, peer_id: PeerId) {
        let Some(peer) = state.peers.remove(peer_id) else {
            tracing::debug!("Disconnect for unknown player {}", peer_id);
            return;
        };
        tracing::info!("Deleting player {} ({:?})", peer_id, peer.addr);
        drop(peer);

        let mut pending = PendingMessages::new();
        pending.broadcast_all(GameEvent::PlayerCount {
            count: state.player_count(),
        });
        pending.flush(state);
    }

    /// 处理客户端消息
    pub fn handle(state: &mut RelayState, sender: PeerId, event: GameEvent) {
        if !state.peers.contains(sender) {
            tracing::warn!("Message from unregistered player {}: {:?}", sender, event);
            return;
        }

        let mut pending = PendingMessages::new();

        match event {
            GameEvent::ResetBoard
            | GameEvent::Roll { .. }
            | GameEvent::Move { .. }
            | GameEvent::Impact
            | GameEvent::MouseMotion { .. }
            | GameEvent::Eyes { .. } => {
                pending.broadcast_others(sender, event);
            }
            GameEvent::Ping => {
                pending.send(sender, GameEvent::Pong);
            }
            GameEvent::Pong | GameEvent::PlayerCount { .. } => {
                tracing::warn!(
                    "Player {} sent server-only event '{}', dropping",
                    sender,
                    event.tag()
                );
            }
        }

        pending.flush(state);
    }
}
