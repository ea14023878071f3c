pub mod client;
pub mod credentials;
pub mod inference;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::{ClassificationRequest, ClassificationResult};

pub use client::GroqClient;
pub use credentials::CredentialPool;
pub use inference::ProviderError;

/// One remote classification exchange made with a specific credential.
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    async fn classify(
        &self,
        api_key: &SecretString,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResult, ProviderError>;
}
