mod comparison;
mod embedding;
mod model;

pub use comparison::{ComparisonRequest, ComparisonResponse, Matrix, SimilarityResult};
pub use embedding::Embedding;
pub use model::{find_model, list_models, ModelDescriptor, ALL_MINILM_L6_V2, QWEN3_EMBEDDING_0_6B};
