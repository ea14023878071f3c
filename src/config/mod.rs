pub mod env;
mod loader;

pub use env::{AppConfig, ConfigError, DirectoryConfig, GroqConfig, KeywordConfig};
pub use loader::load_config;
