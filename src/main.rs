use std::time::Duration;

use proxydial::settings::{JsonFileStore, SettingsStore};
use proxydial::{Error, ProxyConfig, ProxyDialer, Result};
use tracing::info;

use tracing_subscriber;

fn parse_target(target: &str) -> Result<(&str, u16)> {
    let (host, port) = target
        .rsplit_once(':')
        .ok_or_else(|| Error::InvalidInput(format!("expected host:port, got {target}")))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| Error::InvalidInput(format!("bad port in {target}")))?;
    Ok((host, port))
}

#[tokio::main]
async fn main() -> Result<()> {
    std::env::set_var("RUST_LOG", "proxydial=debug");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_file(true)
        .with_line_number(true)
        .init();

    let mut args = std::env::args().skip(1);
    let target = args
        .next()
        .ok_or_else(|| Error::InvalidInput("usage: proxydial <host:port> [settings.json]".to_string()))?;
    let settings_path = args.next().unwrap_or_else(|| "proxydial.json".to_string());
    let (host, port) = parse_target(&target)?;

    let store = JsonFileStore::new(settings_path);
    let config = store.load()?.unwrap_or_else(ProxyConfig::direct);
    info!(?config, "loaded configuration");

    let dialer = ProxyDialer::new(config);
    let stream = dialer.dial(host, port, Duration::from_secs(10)).await?;
    let peer = stream.peer_addr()?;
    info!(?peer, host, port, "connected");

    Ok(())
}
