use crate::config::ProxyAuth;
use crate::error::DialError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const SOCKS_VERSION: u8 = 0x05;
const AUTH_VERSION: u8 = 0x01;
const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_USERNAME_PASSWORD: u8 = 0x02;
const CMD_CONNECT: u8 = 0x01;

#[derive(Debug, Clone)]
pub enum Socks5Addr {
    IPv4(Ipv4Addr),
    Domain(String),
    IPv6(Ipv6Addr),
}

impl Socks5Addr {
    /// A literal IP is sent as-is, anything else goes as a domain name
    /// for the proxy to resolve.
    pub fn from_host(host: &str) -> Result<Self, DialError> {
        match host.parse::<IpAddr>() {
            Ok(IpAddr::V4(v4)) => Ok(Self::IPv4(v4)),
            Ok(IpAddr::V6(v6)) => Ok(Self::IPv6(v6)),
            Err(_) => {
                if host.len() > 255 {
                    return Err(DialError::InvalidInput(format!(
                        "domain name too long: {host}"
                    )));
                }
                Ok(Self::Domain(host.to_string()))
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Domain(domain) => {
                let mut buf = Vec::with_capacity(2 + domain.len());
                buf.push(0x03);
                buf.push(domain.len() as u8);
                buf.extend(domain.as_bytes());
                buf
            }
            Self::IPv4(addr) => {
                let mut buf = Vec::with_capacity(1 + 4);
                buf.push(0x01);
                buf.extend(addr.octets());
                buf
            }
            Self::IPv6(addr) => {
                let mut buf = Vec::with_capacity(1 + 16);
                buf.push(0x04);
                buf.extend(addr.octets());
                buf
            }
        }
    }

    pub async fn from_async_reader(
        mut reader: impl tokio::io::AsyncRead + Unpin,
    ) -> Result<Self, DialError> {
        let t = reader.read_u8().await?;
        match t {
            0x01 => {
                let mut buf = [0; 4];
                reader.read_exact(&mut buf).await?;
                Ok(Self::IPv4(Ipv4Addr::from(buf)))
            }
            0x03 => {
                let len = reader.read_u8().await?;
                let mut buf = vec![0; len as usize];
                reader.read_exact(&mut buf).await?;
                Ok(Self::Domain(String::from_utf8_lossy(&buf).to_string()))
            }
            0x04 => {
                let mut buf = [0; 16];
                reader.read_exact(&mut buf).await?;
                Ok(Self::IPv6(Ipv6Addr::from(buf)))
            }
            _ => Err(DialError::MalformedResponse(format!(
                "unknown address type: {t}"
            ))),
        }
    }
}

/// Runs the RFC 1928 handshake to `host:port` over an open proxy
/// connection: method negotiation, optional RFC 1929 subnegotiation,
/// then the CONNECT exchange.
pub(crate) async fn connect(
    stream: &mut TcpStream,
    host: &str,
    port: u16,
    auth: Option<&ProxyAuth>,
) -> Result<(), DialError> {
    negotiate_method(stream, auth).await?;

    let mut request = vec![SOCKS_VERSION, CMD_CONNECT, 0x00];
    request.extend(Socks5Addr::from_host(host)?.to_bytes());
    request.extend(port.to_be_bytes());
    stream.write_all(&request).await?;

    let mut reply = [0; 3];
    stream.read_exact(&mut reply).await?;
    let [ver, code, _rsv] = reply;
    if ver != SOCKS_VERSION {
        return Err(DialError::MalformedResponse(format!(
            "bad socks version: {ver}"
        )));
    }
    check_reply_code(code)?;

    let bound_addr = Socks5Addr::from_async_reader(&mut *stream).await?;
    let bound_port = stream.read_u16().await?;
    debug!(?bound_addr, bound_port, host, port, "socks5 tunnel established");
    Ok(())
}

async fn negotiate_method(
    stream: &mut TcpStream,
    auth: Option<&ProxyAuth>,
) -> Result<(), DialError> {
    let greeting: &[u8] = if auth.is_some() {
        &[SOCKS_VERSION, 2, METHOD_NO_AUTH, METHOD_USERNAME_PASSWORD]
    } else {
        &[SOCKS_VERSION, 1, METHOD_NO_AUTH]
    };
    stream.write_all(greeting).await?;

    let mut choice = [0; 2];
    stream.read_exact(&mut choice).await?;
    let [ver, method] = choice;
    if ver != SOCKS_VERSION {
        return Err(DialError::MalformedResponse(format!(
            "bad socks version: {ver}"
        )));
    }
    match (method, auth) {
        (METHOD_NO_AUTH, _) => Ok(()),
        (METHOD_USERNAME_PASSWORD, Some(auth)) => authenticate(stream, auth).await,
        // chose a method we never offered
        _ => Err(DialError::NoAcceptableAuthMethod),
    }
}

async fn authenticate(stream: &mut TcpStream, auth: &ProxyAuth) -> Result<(), DialError> {
    let username = auth.username.as_bytes();
    let password = auth.password.as_bytes();
    if username.len() > 255 || password.len() > 255 {
        return Err(DialError::InvalidInput(
            "username or password longer than 255 bytes".to_string(),
        ));
    }

    let mut request = Vec::with_capacity(3 + username.len() + password.len());
    request.push(AUTH_VERSION);
    request.push(username.len() as u8);
    request.extend(username);
    request.push(password.len() as u8);
    request.extend(password);
    stream.write_all(&request).await?;

    let mut reply = [0; 2];
    stream.read_exact(&mut reply).await?;
    if reply[1] != 0x00 {
        return Err(DialError::AuthRejected);
    }
    Ok(())
}

// RFC 1928 §6 reply field
fn check_reply_code(code: u8) -> Result<(), DialError> {
    match code {
        0x00 => Ok(()),
        0x01 => Err(DialError::GeneralFailure),
        0x02 => Err(DialError::ConnectionNotAllowed),
        0x03 => Err(DialError::NetworkUnreachable),
        0x04 => Err(DialError::HostUnreachable),
        0x05 => Err(DialError::ConnectionRefused),
        0x06 => Err(DialError::TtlExpired),
        0x07 => Err(DialError::CommandNotSupported),
        0x08 => Err(DialError::AddressTypeNotSupported),
        n => Err(DialError::MalformedResponse(format!(
            "unknown reply code: {n}"
        ))),
    }
}
