use crate::config::ProxyAuth;
use crate::error::DialError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_RESPONSE_HEAD: usize = 8 * 1024;

/// Negotiates a CONNECT tunnel to `host:port` over an open proxy
/// connection. On success the stream carries raw target bytes.
pub(crate) async fn connect(
    stream: &mut TcpStream,
    host: &str,
    port: u16,
    auth: Option<&ProxyAuth>,
) -> Result<(), DialError> {
    let mut request = format!("CONNECT {host}:{port} HTTP/1.1\r\nHost: {host}:{port}\r\n");
    if let Some(auth) = auth {
        let token = BASE64.encode(format!("{}:{}", auth.username, auth.password));
        request.push_str(&format!("Proxy-Authorization: Basic {token}\r\n"));
    }
    request.push_str("\r\n");
    stream.write_all(request.as_bytes()).await?;

    let head = read_response_head(stream).await?;
    let status_line = head.lines().next().unwrap_or_default().to_string();
    let code = parse_status_code(&status_line)?;
    if !(200..300).contains(&code) {
        return Err(DialError::ProxyRejected(status_line));
    }

    debug!(%status_line, host, port, "http connect tunnel established");
    Ok(())
}

// Single-byte reads so nothing past the header terminator is consumed;
// every byte after it belongs to the tunnel.
async fn read_response_head(stream: &mut TcpStream) -> Result<String, DialError> {
    let mut head = Vec::with_capacity(256);
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if head.len() >= MAX_RESPONSE_HEAD {
            return Err(DialError::MalformedResponse(
                "response head too large".to_string(),
            ));
        }
        let n = stream.read(&mut byte).await?;
        if n == 0 {
            return Err(DialError::MalformedResponse(
                "connection closed before end of response".to_string(),
            ));
        }
        head.push(byte[0]);
    }
    Ok(String::from_utf8_lossy(&head).to_string())
}

fn parse_status_code(status_line: &str) -> Result<u16, DialError> {
    let mut parts = status_line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse()
            .map_err(|_| DialError::MalformedResponse(status_line.to_string())),
        _ => Err(DialError::MalformedResponse(status_line.to_string())),
    }
}
