use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Result;
use backgammon_client::console::ConsoleFrontend;
use backgammon_client::network::Session;
use backgammon_client::settings::ClientSettings;
use backgammon_client::GameClient;
use backgammon_server::{start_server, ServerConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 双陆棋客户端
#[derive(Parser, Debug)]
#[command(name = "backgammon")]
#[command(about = "Two-player backgammon board with live sync")]
struct Args {
    /// 同时在本进程启动服务端
    #[arg(long)]
    server: bool,

    /// 服务器地址（与 --server 同用时为监听地址）
    #[arg(long)]
    host: Option<String>,

    /// 服务器端口
    #[arg(long)]
    port: Option<u16>,

    /// 把本次参数写入设置文件
    #[arg(long)]
    save_settings: bool,
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("backgammon_client=info".parse()?)
            .add_directive("backgammon_server=info".parse()?))
        .init();

    let args = Args::parse();
    let mut settings = ClientSettings::load();
    let bind_host = args.host.clone();
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if args.server {
        settings.host_server = true;
    }
    if args.save_settings {
        settings.save()?;
    }

    let runtime = tokio::runtime::Runtime::new()?;

    let server = if settings.host_server {
        let config = relay_config(settings.port, bind_host.as_deref());
        let (handle, addr) = runtime.block_on(start_server(config))?;
        info!("Hosting relay on {}", addr);
        Some((handle, addr))
    } else {
        None
    };

    let addr = match &server {
        Some((_, bound)) => local_addr(*bound),
        None => settings.server_addr(),
    };

    let mut session = Session::connect(runtime.handle(), addr);
    let mut client = GameClient::new(server.is_some());
    let mut frontend = ConsoleFrontend::spawn();

    let result = backgammon_client::run(&mut client, &mut session, &mut frontend);

    drop(session);
    if let Some((handle, _)) = server {
        runtime.block_on(handle.shutdown());
    }

    result?;
    Ok(())
}

/// 自带服务端的配置，只有显式指定 --host 时才改变监听地址
fn relay_config(port: u16, bind_host: Option<&str>) -> ServerConfig {
    let defaults = ServerConfig::default();
    ServerConfig {
        host: bind_host.map_or(defaults.host.clone(), str::to_string),
        port,
        ..defaults
    }
}

/// 自带服务端时客户端连接的地址，监听全部网卡时走本机回环
fn local_addr(bound: SocketAddr) -> String {
    if bound.ip().is_unspecified() {
        SocketAddr::new(Ipv4Addr::LOCALHOST.into(), bound.port()).to_string()
    } else {
        bound.to_string()
    }
}
