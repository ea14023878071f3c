use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    ai::{CredentialPool, ProviderError, RemoteClassifier},
    domain::{ClassificationRequest, ClassificationResult},
    keywords::KeywordScanner,
};

/// Result of one remote attempt, as seen by the rotation loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(ClassificationResult),
    RotateRetry,
    Abort,
}

impl AttemptOutcome {
    pub fn from_reply(reply: Result<ClassificationResult, ProviderError>) -> Self {
        match reply {
            Ok(result) => AttemptOutcome::Success(result),
            Err(err) if err.is_rate_limited() => AttemptOutcome::RotateRetry,
            Err(_) => AttemptOutcome::Abort,
        }
    }
}

/// Remote-first classifier that always produces a verdict: every remote
/// failure ends in either a key rotation or the keyword scan.
pub struct ClassificationPipeline {
    remote: Arc<dyn RemoteClassifier>,
    credentials: CredentialPool,
    scanner: KeywordScanner,
}

impl ClassificationPipeline {
    pub fn new(
        remote: Arc<dyn RemoteClassifier>,
        credentials: CredentialPool,
        scanner: KeywordScanner,
    ) -> Self {
        Self {
            remote,
            credentials,
            scanner,
        }
    }

    pub fn credentials(&self) -> &CredentialPool {
        &self.credentials
    }

    pub fn scanner(&self) -> &KeywordScanner {
        &self.scanner
    }

    pub async fn classify(&self, request: &ClassificationRequest) -> ClassificationResult {
        if let Some(result) = self.classify_remote(request).await {
            return result;
        }

        let result = self.scanner.scan(&request.text);
        info!(
            target: "pipeline",
            label = %result.label,
            confidence = result.confidence,
            "remote classification unavailable; used keyword scan"
        );
        result
    }

    async fn classify_remote(&self, request: &ClassificationRequest) -> Option<ClassificationResult> {
        if self.credentials.is_empty() {
            debug!(target: "pipeline", "no provider credentials configured");
            return None;
        }

        for attempt in 0..self.credentials.len() {
            match self.attempt(request).await {
                AttemptOutcome::Success(result) => {
                    debug!(target: "pipeline", attempt, label = %result.label, "remote verdict received");
                    return Some(result);
                }
                AttemptOutcome::RotateRetry => continue,
                AttemptOutcome::Abort => return None,
            }
        }

        warn!(
            target: "pipeline",
            keys = self.credentials.len(),
            "every provider key is rate limited"
        );
        None
    }

    async fn attempt(&self, request: &ClassificationRequest) -> AttemptOutcome {
        let Some((index, key)) = self.credentials.current() else {
            return AttemptOutcome::Abort;
        };

        let reply = self.remote.classify(&key, request).await;
        if let Err(err) = &reply {
            if err.is_rate_limited() {
                let next = self.credentials.rotate();
                info!(target: "pipeline", key_index = index, next_index = next, "provider key rate limited; rotating");
            } else {
                warn!(target: "pipeline", key_index = index, error = %err, "provider call failed");
            }
        }
        AttemptOutcome::from_reply(reply)
    }
}
