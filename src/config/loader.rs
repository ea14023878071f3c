use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf, time::Duration};

use secrecy::SecretString;

use super::env::{
    AppConfig, ConfigError, DirectoryConfig, GroqConfig, KeywordConfig, LoggingConfig,
    ServerConfig,
};
use crate::ai::inference::{DEFAULT_MODEL, GROQ_API_URL};

pub const API_KEY_PREFIX: &str = "GROQ_API_KEY_";

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_vars(env::vars())
}

impl AppConfig {
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: BTreeMap<String, String> = vars.into_iter().collect();
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let host = get("BIND_ADDR").unwrap_or("127.0.0.1");
        let port = get("PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: host.to_string(),
            })?;

        // BTreeMap iteration keeps GROQ_API_KEY_1, GROQ_API_KEY_2, ... in name order.
        let api_keys = vars
            .iter()
            .filter(|(key, _)| key.starts_with(API_KEY_PREFIX))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| SecretString::from(value.to_string()))
            .collect::<Vec<_>>();

        let groq = GroqConfig {
            api_keys,
            model: get("GROQ_MODEL").unwrap_or(DEFAULT_MODEL).to_string(),
            api_url: get("GROQ_API_URL").unwrap_or(GROQ_API_URL).to_string(),
            request_timeout: Duration::from_millis(
                get("GROQ_TIMEOUT_MS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(5_000),
            ),
        };

        let keywords = KeywordConfig {
            path: PathBuf::from(get("KEYWORDS_PATH").unwrap_or("data/keywords.csv")),
        };

        let directories = DirectoryConfig {
            logs_dir: get("LOGS_DIR").unwrap_or("logs").to_string(),
        };

        let logging = LoggingConfig {
            level: get("LOG_LEVEL").unwrap_or("info").to_string(),
        };

        Ok(Self {
            server: ServerConfig { bind_addr },
            groq,
            keywords,
            directories,
            logging,
        })
    }
}
