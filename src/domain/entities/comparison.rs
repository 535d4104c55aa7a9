use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub sentences: Vec<String>,
    pub models: Vec<String>,
}

impl ComparisonRequest {
    pub fn new<S: Into<String>, M: Into<String>>(
        sentences: impl IntoIterator<Item = S>,
        models: impl IntoIterator<Item = M>,
    ) -> Self {
        Self {
            sentences: sentences.into_iter().map(Into::into).collect(),
            models: models.into_iter().map(Into::into).collect(),
        }
    }
}

/// Row-major N×N matrix, rows and columns in sentence order.
pub type Matrix = Vec<Vec<f32>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub model_name: String,
    pub dimension: usize,
    pub cosine_similarity: Matrix,
    pub normalized_euclidean_distance: Matrix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResponse {
    pub results: Vec<SimilarityResult>,
    pub sentences: Vec<String>,
}
