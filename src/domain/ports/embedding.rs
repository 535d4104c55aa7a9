use std::sync::Arc;

use crate::domain::{errors::DomainError, Embedding, ModelDescriptor};
use async_trait::async_trait;

/// A loaded sentence encoder. Implementations are shared across requests and must
/// tolerate concurrent calls.
#[async_trait]
pub trait SentenceEncoder: Send + Sync {
    /// Encodes the whole batch at once, one embedding per sentence, in order.
    async fn encode(&self, sentences: &[String]) -> Result<Vec<Embedding>, DomainError>;
}

/// Builds encoders from catalog entries. Construction is expensive.
#[async_trait]
pub trait EncoderLoader: Send + Sync {
    async fn load(&self, model: &ModelDescriptor)
        -> Result<Arc<dyn SentenceEncoder>, DomainError>;
}
