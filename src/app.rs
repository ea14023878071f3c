use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::net::TcpListener;

use crate::{
    ai::{CredentialPool, GroqClient},
    config::AppConfig,
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    keywords::{KeywordScanner, KeywordTable},
    pipeline::ClassificationPipeline,
    server,
};

pub struct TriageApp {
    _paths: ResolvedPaths,
    config: Arc<AppConfig>,
    pipeline: Arc<ClassificationPipeline>,
    shutdown: Shutdown,
}

impl TriageApp {
    pub fn initialize(config: AppConfig, paths: ResolvedPaths, shutdown: Shutdown) -> Result<Self> {
        let config = Arc::new(config);

        let http_client = Client::builder()
            .user_agent(format!("phish-triage/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let table = KeywordTable::load(&config.keywords.path);
        let credentials = CredentialPool::new(config.groq.api_keys.iter().cloned());
        if credentials.is_empty() {
            tracing::warn!(
                target: "app",
                "no GROQ_API_KEY_* variables set; every request will use the keyword scan"
            );
        }

        let groq = Arc::new(GroqClient::new(http_client, config.groq.clone()));
        let pipeline = Arc::new(ClassificationPipeline::new(
            groq,
            credentials,
            KeywordScanner::new(table),
        ));

        Ok(Self {
            _paths: paths,
            config,
            pipeline,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let TriageApp {
            _paths: _,
            config,
            pipeline,
            shutdown,
        } = self;

        let bind_addr = config.server.bind_addr;
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind {bind_addr}"))?;

        tracing::info!(
            target: "app",
            addr = %bind_addr,
            model = %config.groq.model,
            keys = pipeline.credentials().len(),
            keywords = pipeline.scanner().table().len(),
            "phish-triage listening"
        );

        axum::serve(listener, server::routes(pipeline))
            .with_graceful_shutdown(shutdown.requested())
            .await
            .context("http server failed")?;

        tracing::info!(target: "app", "server stopped");
        Ok(())
    }
}
