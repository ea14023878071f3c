use std::{io, path::Path};

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::env::LoggingConfig;

const LOG_FILE_PREFIX: &str = "phish-triage.log";

/// Per-request HTTP client chatter is only interesting when asked for explicitly.
const QUIET_DEPENDENCIES: &str = "hyper=warn,hyper_util=warn,reqwest=warn";

static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// `RUST_LOG` wins; otherwise the configured level with noisy HTTP crates
/// capped at warn. An unusable level degrades to `info`.
pub fn build_filter(level: &str, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }
    EnvFilter::try_new(format!("{level},{QUIET_DEPENDENCIES}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{QUIET_DEPENDENCIES}")))
}

pub fn init_tracing(logging: &LoggingConfig, logs_dir: &Path) -> Result<()> {
    GUARD.get_or_try_init::<_, anyhow::Error>(|| {
        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let filter = build_filter(&logging.level, rust_log.as_deref());

        let (file_writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stdout).with_target(true))
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_ansi(false),
            )
            .try_init()?;

        tracing::info!(logs = %logs_dir.display(), "tracing initialized");
        Ok(guard)
    })?;
    Ok(())
}
