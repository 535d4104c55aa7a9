use serde::{Deserialize, Serialize};

pub const QWEN3_EMBEDDING_0_6B: &str = "Qwen/Qwen3-Embedding-0.6B";
pub const ALL_MINILM_L6_V2: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// A supported embedding model. `dimension` is advisory metadata reported back to
/// clients; it is never checked against what the encoder actually produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    pub dimension: usize,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
        }
    }
}

const CATALOG: [(&str, usize); 2] = [(QWEN3_EMBEDDING_0_6B, 1024), (ALL_MINILM_L6_V2, 384)];

/// The fixed catalog, in display order.
pub fn list_models() -> Vec<ModelDescriptor> {
    CATALOG
        .iter()
        .map(|(name, dimension)| ModelDescriptor::new(*name, *dimension))
        .collect()
}

pub fn find_model(name: &str) -> Option<ModelDescriptor> {
    CATALOG
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(n, dimension)| ModelDescriptor::new(*n, *dimension))
}
