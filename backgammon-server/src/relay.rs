//! 网络层与中继 actor
//!
//! - 监听任务：接受 TCP 连接，交给 actor。
//! - 读任务（每个连接一个）：解码事件并送入 actor 的队列；损坏的消息只记日志。
//! - 写任务（每个连接一个）：消费该连接的发送通道并写帧。
//! - actor：独占 `RelayState`，逐个处理连接、消息、断开事件，
//!   一次广播全部入队后才处理下一个事件，保证同一发送者的消息顺序。

use std::net::SocketAddr;
use std::time::Duration;

use protocol::{
    FrameReader, FrameWriter, GameEvent, Listener, PeerId, ProtocolError, TcpConnection,
    TcpListener, DEFAULT_PORT, MAX_CONNECTIONS,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::peer::Peer;
use crate::server::{MessageHandler, RelayState};

/// 每个连接发送队列的容量，满时丢弃新事件
const PEER_QUEUE_CAPACITY: usize = 256;

/// accept 出错后的重试间隔
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(50);

/// 服务端配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_connections: usize,
    /// 启动后查询公网 IP 并记录日志
    pub announce_public_ip: bool,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_connections: MAX_CONNECTIONS,
            announce_public_ip: true,
        }
    }
}

/// 发给 actor 的内部事件
enum RelayEvent {
    NewConnection {
        conn: TcpConnection,
        addr: SocketAddr,
    },
    MessageFrom {
        peer_id: PeerId,
        event: GameEvent,
    },
    Disconnected {
        peer_id: PeerId,
    },
}

/// 运行中服务端的句柄
pub struct ServerHandle {
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
    actor_task: JoinHandle<()>,
}

impl ServerHandle {
    /// 实际监听地址
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 停止服务端，立即断开所有连接
    pub async fn shutdown(self) {
        let ServerHandle {
            accept_task,
            actor_task,
            ..
        } = self;
        accept_task.abort();
        actor_task.abort();
        let _ = accept_task.await;
        let _ = actor_task.await;
        tracing::info!("Relay server stopped");
    }
}

/// 在当前 tokio 运行时上启动服务端
///
/// 返回句柄和实际绑定地址（端口为 0 时由系统分配）。
pub async fn start_server(config: ServerConfig) -> protocol::Result<(ServerHandle, SocketAddr)> {
    let mut listener = TcpListener::bind(&config.bind_addr()).await?;
    let local_addr = listener.socket_addr()?;
    tracing::info!("Starting relay server on {}", local_addr);

    if config.announce_public_ip {
        crate::ip::spawn_announce(local_addr.port());
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let accept_tx = events_tx.clone();
    let accept_task = tokio::spawn(async move {
        loop {
            match listener.accept_with_addr().await {
                Ok((conn, addr)) => {
                    if accept_tx
                        .send(RelayEvent::NewConnection { conn, addr })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
            }
        }
    });

    let actor_task = tokio::spawn(run_actor(config.max_connections, events_tx, events_rx));

    Ok((
        ServerHandle {
            local_addr,
            accept_task,
            actor_task,
        },
        local_addr,
    ))
}

/// actor 主循环
async fn run_actor(
    max_connections: usize,
    events_tx: mpsc::UnboundedSender<RelayEvent>,
    mut events_rx: mpsc::UnboundedReceiver<RelayEvent>,
) {
    let mut state = RelayState::new();

    while let Some(event) = events_rx.recv().await {
        match event {
            RelayEvent::NewConnection { conn, addr } => {
                if state.peers.len() >= max_connections {
                    tracing::warn!(
                        "Refusing connection from {}: {} players already connected",
                        addr,
                        max_connections
                    );
                    continue;
                }

                let peer_id = state.peers.allocate_id();
                let (reader, writer) = conn.split();
                let (tx, rx) = mpsc::channel(PEER_QUEUE_CAPACITY);

                tokio::spawn(write_loop(peer_id, writer, rx));
                let reader_task = tokio::spawn(read_loop(peer_id, reader, events_tx.clone()));

                let peer = Peer::new(peer_id, Some(addr.to_string()), tx)
                    .with_reader(reader_task.abort_handle());
                MessageHandler::register(&mut state, peer);
            }
            RelayEvent::MessageFrom { peer_id, event } => {
                tracing::debug!("Player {} -> {:?}", peer_id, event);
                MessageHandler::handle(&mut state, peer_id, event);
            }
            RelayEvent::Disconnected { peer_id } => {
                MessageHandler::handle_disconnect(&mut state, peer_id);
            }
        }
    }
}

/// 读任务：直到连接关闭或出现不可恢复的错误
async fn read_loop<R>(
    peer_id: PeerId,
    mut reader: FrameReader<R>,
    events: mpsc::UnboundedSender<RelayEvent>,
) where
    R: AsyncRead + Unpin + Send,
{
    loop {
        match reader.recv().await {
            Ok(event) => {
                if events.send(RelayEvent::MessageFrom { peer_id, event }).is_err() {
                    return;
                }
            }
            Err(ProtocolError::Malformed(m)) => {
                tracing::warn!("Dropping malformed message from player {}: {}", peer_id, m);
            }
            Err(ProtocolError::ConnectionClosed) => {
                tracing::debug!("Player {} closed the connection", peer_id);
                break;
            }
            Err(e) => {
                tracing::warn!("Read error from player {}: {}", peer_id, e);
                break;
            }
        }
    }
    let _ = events.send(RelayEvent::Disconnected { peer_id });
}

/// 写任务：发送通道关闭（连接被移除）时结束
async fn write_loop<W>(peer_id: PeerId, mut writer: FrameWriter<W>, mut rx: mpsc::Receiver<GameEvent>)
where
    W: AsyncWrite + Unpin + Send,
{
    while let Some(event) = rx.recv().await {
        if let Err(e) = writer.send(&event).await {
            tracing::debug!("Write to player {} failed: {}", peer_id, e);
            return;
        }
    }
    let _ = writer.shutdown().await;
}
