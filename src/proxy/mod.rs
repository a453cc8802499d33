use crate::config::{ProxyConfig, ProxyType};
use crate::error::DialError;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

mod http;
mod socks5;

pub use socks5::Socks5Addr;

/// Dials targets through the configured proxy. Each dial owns its socket
/// until the finished stream is handed to the caller, so concurrent dials
/// need no coordination.
#[derive(Debug, Clone)]
pub struct ProxyDialer {
    config: ProxyConfig,
}

impl ProxyDialer {
    pub fn new(config: ProxyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Returns a stream that behaves as a plain connection to
    /// `host:port`. The timeout bounds the whole sequence, connection
    /// plus negotiation; on expiry the pending socket is dropped before
    /// the error is returned.
    pub async fn dial(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<TcpStream, DialError> {
        match tokio::time::timeout(timeout, self.dial_inner(host, port)).await {
            Ok(result) => result,
            Err(_) => Err(DialError::Timeout),
        }
    }

    async fn dial_inner(&self, host: &str, port: u16) -> Result<TcpStream, DialError> {
        self.config.validate()?;

        if !self.config.is_active() {
            debug!(host, port, "dialing direct");
            let stream = TcpStream::connect((host, port)).await?;
            return Ok(stream);
        }

        let mut stream = self.connect_proxy().await?;
        let auth = self.config.auth();
        match self.config.proxy_type() {
            ProxyType::Http => http::connect(&mut stream, host, port, auth.as_ref()).await?,
            ProxyType::Socks5 => socks5::connect(&mut stream, host, port, auth.as_ref()).await?,
            // is_active() rules this arm out
            ProxyType::None => unreachable!("inactive config handled above"),
        }
        Ok(stream)
    }

    async fn connect_proxy(&self) -> Result<TcpStream, DialError> {
        let addr = (self.config.address(), self.config.port());
        debug!(addr = self.config.address(), port = self.config.port(), "connecting to proxy");
        TcpStream::connect(addr)
            .await
            .map_err(DialError::ProxyUnreachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn spawn_echo_target() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 512];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                stream.write_all(&buf[..n]).await.unwrap();
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_disabled_config_dials_direct() {
        let target = spawn_echo_target().await;

        // proxy fields point at a blackhole address, so a dial that
        // succeeds can only have gone straight to the target
        let config = ProxyConfig::new(ProxyType::Socks5, "192.0.2.1", 1, None, false).unwrap();
        let dialer = ProxyDialer::new(config);

        let mut stream = dialer
            .dial("127.0.0.1", target.port(), Duration::from_secs(5))
            .await
            .unwrap();
        stream.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_dialing() {
        // construction via serde skips validation, the dialer re-checks
        let config: ProxyConfig = serde_json::from_str(
            r#"{"type": "socks5", "address": "", "port": 1080, "enabled": true}"#,
        )
        .unwrap();
        let dialer = ProxyDialer::new(config);

        let err = dialer
            .dial("example.com", 80, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DialError::Config(crate::ConfigError::MissingAddress)
        ));
    }

    #[tokio::test]
    async fn test_proxy_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config =
            ProxyConfig::new(ProxyType::Socks5, "127.0.0.1", addr.port(), None, true).unwrap();
        let dialer = ProxyDialer::new(config);

        let err = dialer
            .dial("example.com", 80, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, DialError::ProxyUnreachable(_)));
    }

    #[tokio::test]
    async fn test_silent_proxy_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // accept and never answer the greeting
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let config =
            ProxyConfig::new(ProxyType::Socks5, "127.0.0.1", addr.port(), None, true).unwrap();
        let dialer = ProxyDialer::new(config);

        let started = std::time::Instant::now();
        let err = dialer
            .dial("example.com", 80, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, DialError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
