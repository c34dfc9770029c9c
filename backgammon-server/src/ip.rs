//! 公网 IP 查询
//!
//! 只用于启动日志，不在关键路径上。需要启用 `ip-lookup` feature。

#[cfg(feature = "ip-lookup")]
use std::time::Duration;

#[cfg(feature = "ip-lookup")]
use anyhow::Context;

/// 查询服务地址
pub const IP_LOOKUP_URL: &str = "https://api.ipify.org";

/// 查询超时
#[cfg(feature = "ip-lookup")]
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// 查询本机公网 IP
#[cfg(feature = "ip-lookup")]
pub async fn public_ip() -> anyhow::Result<String> {
    let client = reqwest::Client::builder()
        .timeout(LOOKUP_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let body = client
        .get(IP_LOOKUP_URL)
        .send()
        .await
        .context("IP lookup request failed")?
        .error_for_status()?
        .text()
        .await?;

    Ok(body.trim().to_string())
}

#[cfg(not(feature = "ip-lookup"))]
pub async fn public_ip() -> anyhow::Result<String> {
    anyhow::bail!("IP lookup disabled (build with --features ip-lookup)")
}

/// 后台查询并记录对外地址
pub fn spawn_announce(port: u16) {
    tokio::spawn(async move {
        match public_ip().await {
            Ok(ip) => tracing::info!("Relay reachable at {}:{}", ip, port),
            Err(e) => tracing::debug!("Public IP unavailable: {:#}", e),
        }
    });
}
