use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::OnceCell;
use tracing::instrument;

use crate::domain::{
    find_model, list_models,
    ports::{EncoderLoader, SentenceEncoder},
    DomainError,
};

type EncoderCell = Arc<OnceCell<Arc<dyn SentenceEncoder>>>;

/// Process-lifetime memo of loaded encoders, one per model identifier.
///
/// Each identifier owns a `OnceCell`: the first caller runs the loader while
/// concurrent callers for the same identifier wait on the same cell. A failed
/// load leaves the cell empty so the next caller retries. Entries are never
/// evicted.
pub struct ModelCache {
    loader: Arc<dyn EncoderLoader>,
    entries: Mutex<HashMap<String, EncoderCell>>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn EncoderLoader>) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn cell(&self, name: &str) -> Result<EncoderCell, DomainError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(entries.entry(name.to_string()).or_default().clone())
    }

    #[instrument(skip(self))]
    pub async fn get_encoder(&self, name: &str) -> Result<Arc<dyn SentenceEncoder>, DomainError> {
        let model = find_model(name)
            .ok_or_else(|| DomainError::model_load(format!("unknown model identifier: {name}")))?;
        let cell = self.cell(name)?;

        cell.get_or_try_init(|| async {
            tracing::info!(model = %model.name, "loading model");
            let start = Instant::now();
            let encoder = self.loader.load(&model).await?;
            tracing::info!(
                model = %model.name,
                elapsed_ms = %start.elapsed().as_millis(),
                "model loaded"
            );
            Ok::<_, DomainError>(encoder)
        })
        .await
        .cloned()
    }

    /// Loads every catalog model. All models are attempted; the first failure is
    /// returned after the rest have had their chance.
    #[instrument(skip(self))]
    pub async fn preload_all(&self) -> Result<(), DomainError> {
        let mut first_error = None;

        for model in list_models() {
            if let Err(e) = self.get_encoder(&model.name).await {
                tracing::error!(model = %model.name, error = %e, "failed to preload model");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Catalog identifiers whose encoder is currently loaded, in catalog order.
    pub fn loaded_models(&self) -> Vec<String> {
        let Ok(entries) = self.entries.lock() else {
            return Vec::new();
        };

        list_models()
            .into_iter()
            .filter(|m| entries.get(&m.name).is_some_and(|cell| cell.initialized()))
            .map(|m| m.name)
            .collect()
    }
}
