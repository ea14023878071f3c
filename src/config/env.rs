use std::{net::SocketAddr, path::PathBuf, time::Duration};

use secrecy::SecretString;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub groq: GroqConfig,
    pub keywords: KeywordConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

/// Remote provider settings. `api_keys` keeps the order of the
/// `GROQ_API_KEY_*` variable names and never contains empty entries.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_keys: Vec<SecretString>,
    pub model: String,
    pub api_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct KeywordConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
