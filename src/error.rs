#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid port: {0}")]
    InvalidPort(u16),
    #[error("missing address")]
    MissingAddress,
    #[error("unknown proxy type: {0}")]
    UnknownType(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DialError {
    #[error("proxy unreachable: {0}")]
    ProxyUnreachable(std::io::Error),
    #[error("proxy rejected: {0}")]
    ProxyRejected(String),
    #[error("auth rejected")]
    AuthRejected,
    #[error("no acceptable auth method")]
    NoAcceptableAuthMethod,
    #[error("timeout")]
    Timeout,
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("general failure")]
    GeneralFailure,
    #[error("connection not allowed")]
    ConnectionNotAllowed,
    #[error("network unreachable")]
    NetworkUnreachable,
    #[error("host unreachable")]
    HostUnreachable,
    #[error("connection refused")]
    ConnectionRefused,
    #[error("ttl expired")]
    TtlExpired,
    #[error("command not supported")]
    CommandNotSupported,
    #[error("address type not supported")]
    AddressTypeNotSupported,
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("dial: {0}")]
    Dial(#[from] DialError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
