pub mod config;
mod error;
pub mod proxy;
pub mod settings;

pub use config::{ProxyAuth, ProxyConfig, ProxyType};
pub use error::{ConfigError, DialError, Error, Result};
pub use proxy::ProxyDialer;

pub const PROXYDIAL_VERSION: &str = "ProxyDial 0.0.1";
