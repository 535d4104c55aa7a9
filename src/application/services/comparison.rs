use std::sync::Arc;
use tracing::instrument;

use crate::application::services::{similarity, ModelCache};
use crate::domain::{
    find_model, CompareError, ComparisonRequest, ComparisonResponse, ModelDescriptor,
};

pub struct ComparisonService {
    cache: Arc<ModelCache>,
}

impl ComparisonService {
    pub fn new(cache: Arc<ModelCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    /// Checks the request in a fixed order; the first violation wins. Returns the
    /// catalog entries of the requested models, in request order.
    pub fn validate(request: &ComparisonRequest) -> Result<Vec<ModelDescriptor>, CompareError> {
        if request.sentences.len() < 2 {
            return Err(CompareError::InsufficientSentences);
        }

        if request.models.is_empty() {
            return Err(CompareError::NoModelsSelected);
        }

        if let Some(index) = request.sentences.iter().position(|s| s.trim().is_empty()) {
            return Err(CompareError::EmptySentence(index));
        }

        request
            .models
            .iter()
            .map(|name| find_model(name).ok_or_else(|| CompareError::UnknownModel(name.clone())))
            .collect()
    }

    /// Runs every requested model in order. Any model failure aborts the request
    /// and nothing from earlier models is returned.
    #[instrument(skip(self, request), fields(sentences = request.sentences.len(), models = request.models.len()))]
    pub async fn compare(
        &self,
        request: ComparisonRequest,
    ) -> Result<ComparisonResponse, CompareError> {
        let models = Self::validate(&request)?;
        let mut results = Vec::with_capacity(models.len());

        for model in &models {
            let encoder = self
                .cache
                .get_encoder(&model.name)
                .await
                .map_err(|e| CompareError::processing(&model.name, e))?;

            results.push(similarity::compare(&request.sentences, encoder.as_ref(), model).await?);
        }

        Ok(ComparisonResponse {
            results,
            sentences: request.sentences,
        })
    }
}
