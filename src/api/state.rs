use std::sync::Arc;

use crate::application::ComparisonService;
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub comparison: Arc<ComparisonService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(comparison: Arc<ComparisonService>, config: AppConfig) -> Self {
        Self {
            comparison,
            config: Arc::new(config),
        }
    }
}
