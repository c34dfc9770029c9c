//! 网络连接管理
//!
//! 连接、读、写都在后台 tokio 任务中运行，游戏循环只通过非阻塞队列收发。

use protocol::{
    Connector, GameEvent, MalformedMessage, ProtocolError, TcpConnector, PING_INTERVAL_TICKS,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::board::EventSink;

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// 后台任务上报给游戏循环的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    Received(GameEvent),
    Malformed(MalformedMessage),
    Disconnected { reason: String },
}

/// 到中继服务端的会话
pub struct Session {
    addr: String,
    status: ConnectionStatus,
    /// 发送队列
    outbound: mpsc::UnboundedSender<GameEvent>,
    /// 接收队列
    inbound: mpsc::UnboundedReceiver<SessionEvent>,
    ticks: u32,
    task: JoinHandle<()>,
}

impl Session {
    /// 在给定运行时上发起连接，立即返回
    pub fn connect(runtime: &Handle, addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();

        let task = runtime.spawn(run_connection(addr.clone(), outbound_rx, inbound_tx));

        Self {
            addr,
            status: ConnectionStatus::Connecting,
            outbound,
            inbound,
            ticks: 0,
            task,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// 加入发送队列，连接建立前的事件会在连接后发出
    pub fn send(&self, event: GameEvent) {
        if self.outbound.send(event).is_err() {
            debug!("Dropping {} on closed session", event.tag());
        }
    }

    /// 取出后台任务积累的事件
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.inbound.try_recv() {
            match &event {
                SessionEvent::Connected => self.status = ConnectionStatus::Connected,
                SessionEvent::Disconnected { .. } => self.status = ConnectionStatus::Disconnected,
                _ => {}
            }
            events.push(event);
        }
        events
    }

    /// 推进一帧，到期时发送心跳，返回是否发送了 ping
    pub fn tick(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks < PING_INTERVAL_TICKS {
            return false;
        }
        self.ticks = 0;
        if self.status == ConnectionStatus::Disconnected {
            return false;
        }
        self.send(GameEvent::Ping);
        true
    }

    /// 断开连接
    pub fn close(&mut self) {
        self.task.abort();
        self.status = ConnectionStatus::Disconnected;
    }
}

impl EventSink for Session {
    fn emit(&mut self, event: GameEvent) {
        self.send(event);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_connection(
    addr: String,
    mut outbound: mpsc::UnboundedReceiver<GameEvent>,
    inbound: mpsc::UnboundedSender<SessionEvent>,
) {
    let conn = match TcpConnector.connect(&addr).await {
        Ok(conn) => conn,
        Err(e) => {
            warn!("Failed to connect to {}: {}", addr, e);
            let _ = inbound.send(SessionEvent::Disconnected {
                reason: e.to_string(),
            });
            return;
        }
    };
    info!("Connected to server: {}", addr);
    let _ = inbound.send(SessionEvent::Connected);

    let (mut reader, mut writer) = conn.split();

    let write = async {
        while let Some(event) = outbound.recv().await {
            writer.send(&event).await?;
        }
        writer.shutdown().await
    };

    let read = async {
        loop {
            match reader.recv().await {
                Ok(event) => {
                    if inbound.send(SessionEvent::Received(event)).is_err() {
                        return ProtocolError::ConnectionClosed;
                    }
                }
                Err(ProtocolError::Malformed(m)) => {
                    let _ = inbound.send(SessionEvent::Malformed(m));
                }
                Err(e) => return e,
            }
        }
    };

    let reason = tokio::select! {
        result = write => match result {
            Ok(()) => "session closed".to_string(),
            Err(e) => e.to_string(),
        },
        e = read => e.to_string(),
    };

    info!("Disconnected from {}: {}", addr, reason);
    let _ = inbound.send(SessionEvent::Disconnected { reason });
}
