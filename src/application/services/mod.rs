mod comparison;
mod model_cache;
pub mod similarity;

pub use comparison::ComparisonService;
pub use model_cache::ModelCache;
