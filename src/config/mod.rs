use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    #[default]
    None,
    Http,
    Socks5,
}

impl FromStr for ProxyType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "http" => Ok(Self::Http),
            "socks5" => Ok(Self::Socks5),
            _ => Err(ConfigError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Http => write!(f, "http"),
            Self::Socks5 => write!(f, "socks5"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

impl ProxyAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Validated proxy connection parameters. Immutable once built; editing
/// settings produces a new value, in-flight dials keep the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(rename = "type", default)]
    proxy_type: ProxyType,
    #[serde(default)]
    address: String,
    #[serde(default)]
    port: u16,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    enabled: bool,
}

impl ProxyConfig {
    pub fn new(
        proxy_type: ProxyType,
        address: &str,
        port: u16,
        auth: Option<ProxyAuth>,
        enabled: bool,
    ) -> Result<Self, ConfigError> {
        let (username, password) = match auth {
            Some(auth) => (auth.username, auth.password),
            None => (String::new(), String::new()),
        };
        let config = Self {
            proxy_type,
            address: address.to_string(),
            port,
            username,
            password,
            enabled,
        };
        config.validate()?;
        Ok(config)
    }

    /// The no-proxy value: every dial goes straight to the target.
    pub fn direct() -> Self {
        Self::default()
    }

    /// Checked at construction, and again at dial time for values that
    /// came through deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_active() {
            if self.port == 0 {
                return Err(ConfigError::InvalidPort(self.port));
            }
            if self.address.is_empty() {
                return Err(ConfigError::MissingAddress);
            }
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.enabled && self.proxy_type != ProxyType::None
    }

    pub fn proxy_type(&self) -> ProxyType {
        self.proxy_type
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Credentials, when either field is non-empty. Absence means
    /// "attempt unauthenticated negotiation".
    pub fn auth(&self) -> Option<ProxyAuth> {
        if self.username.is_empty() && self.password.is_empty() {
            return None;
        }
        Some(ProxyAuth {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}
