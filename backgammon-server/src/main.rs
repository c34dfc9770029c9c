use anyhow::Result;
use backgammon_server::{start_server, ServerConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 独立运行的中继服务端
#[derive(Parser, Debug)]
#[command(name = "backgammon-server")]
#[command(about = "Relay server for two-player backgammon board sync")]
struct Args {
    /// 监听地址
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// 监听端口
    #[arg(long, default_value_t = protocol::DEFAULT_PORT)]
    port: u16,

    /// 最大连接数
    #[arg(long, default_value_t = protocol::MAX_CONNECTIONS)]
    max_connections: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("backgammon_server=info".parse()?))
        .init();

    let args = Args::parse();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        max_connections: args.max_connections,
        ..ServerConfig::default()
    };

    let (handle, addr) = start_server(config).await?;
    info!("Relay listening on {}, press Ctrl+C to stop", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    handle.shutdown().await;

    Ok(())
}
