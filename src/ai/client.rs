use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    config::GroqConfig,
    domain::{ClassificationRequest, ClassificationResult},
};

use super::{
    inference::{build_request, parse_completion, ProviderError},
    RemoteClassifier,
};

/// Groq chat completions client. The key is supplied per call so the
/// pipeline can rotate between credentials.
#[derive(Clone)]
pub struct GroqClient {
    http: Client,
    config: GroqConfig,
}

impl GroqClient {
    pub fn new(http: Client, config: GroqConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl RemoteClassifier for GroqClient {
    async fn classify(
        &self,
        api_key: &SecretString,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResult, ProviderError> {
        let body = build_request(&self.config.model, request);
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key.expose_secret())
            .timeout(self.config.request_timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16(), text));
        }

        parse_completion(&text)
    }
}
