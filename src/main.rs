use anyhow::Result;
use phish_triage::{
    app::TriageApp,
    config,
    infrastructure::{directories, logging, shutdown::Shutdown},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config.logging, &paths.logs_dir)?;

    let shutdown = Shutdown::new();
    shutdown.install_signal_handlers();

    let app = TriageApp::initialize(config, paths, shutdown)?;
    app.run().await
}
