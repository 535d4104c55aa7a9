use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::lock_recovering;
use super::qwen3::{Qwen3Encoder, Qwen3Source};
use crate::domain::{
    ports::{EncoderLoader, SentenceEncoder},
    DomainError, Embedding, ModelDescriptor, ALL_MINILM_L6_V2, QWEN3_EMBEDDING_0_6B,
};
use crate::infrastructure::config::ModelsConfig;

/// A fastembed sentence encoder. Inference needs exclusive access to the
/// session, so calls on one model are serialized.
pub struct FastembedEncoder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl FastembedEncoder {
    pub fn new(model: TextEmbedding) -> Self {
        Self {
            model: Arc::new(Mutex::new(model)),
        }
    }
}

#[async_trait]
impl SentenceEncoder for FastembedEncoder {
    async fn encode(&self, sentences: &[String]) -> Result<Vec<Embedding>, DomainError> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model.clone();
        let texts = sentences.to_vec();

        let embeddings = tokio::task::spawn_blocking(move || {
            lock_recovering(&*model)
                .embed(texts, None)
                .map_err(|e| DomainError::encoding(e.to_string()))
        })
        .await
        .map_err(|e| DomainError::internal(e.to_string()))??;

        Ok(embeddings.into_iter().map(Embedding::new).collect())
    }
}

type Constructor = fn(&OnnxModelLoader) -> Result<Arc<dyn SentenceEncoder>, DomainError>;

/// Identifier to constructor dispatch for every catalog model.
const CONSTRUCTORS: [(&str, Constructor); 2] = [
    (QWEN3_EMBEDDING_0_6B, OnnxModelLoader::load_qwen3),
    (ALL_MINILM_L6_V2, OnnxModelLoader::load_minilm),
];

/// Builds ONNX Runtime encoders on the blocking pool. Weights are downloaded into
/// `cache_dir` on first load.
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    config: ModelsConfig,
}

impl OnnxModelLoader {
    pub fn new(config: ModelsConfig) -> Self {
        Self { config }
    }

    fn load_minilm(&self) -> Result<Arc<dyn SentenceEncoder>, DomainError> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(self.config.cache_dir.clone())
                .with_show_download_progress(false),
        )
        .map_err(|e| DomainError::model_load(e.to_string()))?;

        Ok(Arc::new(FastembedEncoder::new(model)))
    }

    /// fastembed has no last-token pooling, which Qwen3-Embedding needs, so it
    /// runs on its own session.
    fn load_qwen3(&self) -> Result<Arc<dyn SentenceEncoder>, DomainError> {
        Ok(Arc::new(Qwen3Encoder::load(&self.qwen3_source())?))
    }

    fn qwen3_source(&self) -> Qwen3Source {
        match &self.config.qwen3_dir {
            Some(dir) => Qwen3Source::Local(dir.clone()),
            None => Qwen3Source::Hub {
                repo: self.config.qwen3_repo.clone(),
                onnx_file: self.config.qwen3_onnx_file.clone(),
                cache_dir: self.config.cache_dir.clone(),
            },
        }
    }
}

#[async_trait]
impl EncoderLoader for OnnxModelLoader {
    async fn load(
        &self,
        model: &ModelDescriptor,
    ) -> Result<Arc<dyn SentenceEncoder>, DomainError> {
        let constructor = CONSTRUCTORS
            .iter()
            .find(|(name, _)| *name == model.name)
            .map(|(_, constructor)| *constructor)
            .ok_or_else(|| {
                DomainError::model_load(format!("no encoder backend for {}", model.name))
            })?;

        let loader = self.clone();
        tokio::task::spawn_blocking(move || constructor(&loader))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?
    }
}
