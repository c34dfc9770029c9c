//! 连接管理

use std::collections::BTreeMap;

use protocol::{GameEvent, PeerId};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::AbortHandle;

/// 已连接的客户端
#[derive(Debug)]
pub struct Peer {
    pub id: PeerId,
    /// 远端地址
    pub addr: Option<String>,
    /// 投递失败后置为 false，等待读任务上报断开
    pub alive: bool,
    /// 发送通道（由该连接的写任务消费）
    tx: mpsc::Sender<GameEvent>,
    /// 读任务句柄，移除时终止
    reader: Option<AbortHandle>,
}

impl Peer {
    pub fn new(id: PeerId, addr: Option<String>, tx: mpsc::Sender<GameEvent>) -> Self {
        Self {
            id,
            addr,
            alive: true,
            tx,
            reader: None,
        }
    }

    /// 绑定读任务
    pub fn with_reader(mut self, reader: AbortHandle) -> Self {
        self.reader = Some(reader);
        self
    }

    /// 投递事件，不阻塞
    ///
    /// 队列已满时丢弃该事件，写任务退出时标记为断开。
    pub fn deliver(&mut self, event: GameEvent) -> bool {
        if !self.alive {
            return false;
        }
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    "peer {} queue full, dropping '{}'",
                    self.id,
                    event.tag()
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("peer {} writer gone, marking dead", self.id);
                self.alive = false;
                false
            }
        }
    }
}

impl Drop for Peer {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// 连接注册表
///
/// 只由中继 actor 修改，按连接 ID 顺序广播。
#[derive(Debug)]
pub struct PeerRegistry {
    peers: BTreeMap<PeerId, Peer>,
    next_id: PeerId,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            peers: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// 分配新的连接 ID
    pub fn allocate_id(&mut self) -> PeerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// 登记连接
    pub fn insert(&mut self, peer: Peer) {
        self.peers.insert(peer.id, peer);
    }

    /// 移除连接
    pub fn remove(&mut self, peer_id: PeerId) -> Option<Peer> {
        self.peers.remove(&peer_id)
    }

    /// 获取连接（可变）
    pub fn get_mut(&mut self, peer_id: PeerId) -> Option<&mut Peer> {
        self.peers.get_mut(&peer_id)
    }

    /// 检查连接是否存在
    pub fn contains(&self, peer_id: PeerId) -> bool {
        self.peers.contains_key(&peer_id)
    }

    /// 连接 ID 列表（升序）
    pub fn ids(&self) -> Vec<PeerId> {
        self.peers.keys().copied().collect()
    }

    /// 所有连接（可变，升序）
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Peer> {
        self.peers.values_mut()
    }

    /// 在线连接数量
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
