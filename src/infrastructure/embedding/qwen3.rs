//! Qwen3-Embedding-0.6B on ONNX Runtime.
//!
//! Sentences are tokenized, `<|endoftext|>` is appended when the tokenizer did not
//! add it, the batch is left-padded, and the hidden state of the last real token
//! of each row is the sentence embedding.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hf_hub::api::sync::ApiBuilder;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionInputValue};
use ort::value::Tensor;
use tokenizers::Tokenizer;

use super::lock_recovering;
use crate::domain::{ports::SentenceEncoder, DomainError, Embedding};

pub const END_OF_TEXT: &str = "<|endoftext|>";
const HIDDEN_STATE_OUTPUT: &str = "last_hidden_state";

/// Where the ONNX export and tokenizer come from.
#[derive(Debug, Clone)]
pub enum Qwen3Source {
    /// Files fetched from a Hugging Face repository into `cache_dir`.
    Hub {
        repo: String,
        onnx_file: String,
        cache_dir: PathBuf,
    },
    /// A directory holding `model.onnx` (plus any external data) and `tokenizer.json`.
    Local(PathBuf),
}

impl Qwen3Source {
    fn resolve(&self) -> Result<(PathBuf, PathBuf), DomainError> {
        match self {
            Self::Local(dir) => Ok((
                existing(dir.join("model.onnx"))?,
                existing(dir.join("tokenizer.json"))?,
            )),
            Self::Hub {
                repo,
                onnx_file,
                cache_dir,
            } => {
                let api = ApiBuilder::new()
                    .with_cache_dir(cache_dir.clone())
                    .with_progress(false)
                    .build()
                    .map_err(|e| DomainError::model_load(e.to_string()))?;
                let repo_api = api.model(repo.clone());
                let fetch = |file: &str| {
                    repo_api
                        .get(file)
                        .map_err(|e| DomainError::model_load(format!("{repo}/{file}: {e}")))
                };

                let model = fetch(onnx_file)?;
                // Exports above 2 GB keep their weights next to the graph.
                if let Err(e) = fetch(&format!("{onnx_file}_data")) {
                    tracing::debug!(error = %e, "no external weight file");
                }
                Ok((model, fetch("tokenizer.json")?))
            }
        }
    }
}

fn existing(path: PathBuf) -> Result<PathBuf, DomainError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(DomainError::model_load(format!("{}: file not found", path.display())))
    }
}

struct Qwen3Model {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    eos_id: u32,
    takes_position_ids: bool,
}

pub struct Qwen3Encoder {
    model: Arc<Qwen3Model>,
}

impl Qwen3Encoder {
    /// Blocking: resolves the files (possibly downloading) and builds the session.
    pub fn load(source: &Qwen3Source) -> Result<Self, DomainError> {
        let (model_path, tokenizer_path) = source.resolve()?;
        Self::from_files(&model_path, &tokenizer_path)
    }

    pub fn from_files(model_path: &Path, tokenizer_path: &Path) -> Result<Self, DomainError> {
        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| DomainError::model_load(format!("{}: {e}", tokenizer_path.display())))?;
        tokenizer.with_padding(None);
        let eos_id = tokenizer.token_to_id(END_OF_TEXT).ok_or_else(|| {
            DomainError::model_load(format!("tokenizer has no {END_OF_TEXT} token"))
        })?;

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| DomainError::model_load(format!("{}: {e}", model_path.display())))?;
        let takes_position_ids = session.inputs.iter().any(|i| i.name == "position_ids");

        Ok(Self {
            model: Arc::new(Qwen3Model {
                session: Mutex::new(session),
                tokenizer,
                eos_id,
                takes_position_ids,
            }),
        })
    }
}

impl Qwen3Model {
    fn embed(&self, sentences: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError> {
        let encodings = self
            .tokenizer
            .encode_batch(sentences, true)
            .map_err(|e| DomainError::encoding(e.to_string()))?;
        let rows: Vec<Vec<u32>> = encodings
            .iter()
            .map(|encoding| {
                let mut ids = encoding.get_ids().to_vec();
                if ids.last() != Some(&self.eos_id) {
                    ids.push(self.eos_id);
                }
                ids
            })
            .collect();
        let batch = TokenBatch::left_padded(&rows, self.eos_id);

        let shape = [batch.rows, batch.seq_len];
        let tensor = |data: Vec<i64>| -> Result<SessionInputValue<'static>, DomainError> {
            Tensor::from_array((shape, data))
                .map(Into::into)
                .map_err(|e| DomainError::encoding(e.to_string()))
        };
        let mut inputs = vec![
            ("input_ids", tensor(batch.input_ids.clone())?),
            ("attention_mask", tensor(batch.attention_mask.clone())?),
        ];
        if self.takes_position_ids {
            inputs.push(("position_ids", tensor(batch.position_ids.clone())?));
        }

        let mut session = lock_recovering(&self.session);
        let outputs = session
            .run(inputs)
            .map_err(|e| DomainError::encoding(e.to_string()))?;
        let hidden = outputs
            .get(HIDDEN_STATE_OUTPUT)
            .ok_or_else(|| DomainError::encoding(format!("model has no {HIDDEN_STATE_OUTPUT} output")))?;
        let (dims, data) = hidden
            .try_extract_tensor::<f32>()
            .map_err(|e| DomainError::encoding(e.to_string()))?;

        let width = match dims.len() {
            3 => dims[2] as usize,
            n => return Err(DomainError::encoding(format!("expected rank-3 hidden state, got rank {n}"))),
        };
        last_token_pool(data, &batch.attention_mask, batch.rows, batch.seq_len, width)
    }
}

#[async_trait]
impl SentenceEncoder for Qwen3Encoder {
    async fn encode(&self, sentences: &[String]) -> Result<Vec<Embedding>, DomainError> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model.clone();
        let texts = sentences.to_vec();
        let embeddings = tokio::task::spawn_blocking(move || model.embed(texts))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))??;

        Ok(embeddings.into_iter().map(Embedding::new).collect())
    }
}

/// Row-major `rows × seq_len` model inputs.
#[derive(Debug, PartialEq)]
pub struct TokenBatch {
    pub rows: usize,
    pub seq_len: usize,
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub position_ids: Vec<i64>,
}

impl TokenBatch {
    /// Pads every row on the left to the longest row. Positions count real tokens
    /// only, so each row starts at position 0.
    pub fn left_padded(rows: &[Vec<u32>], pad_id: u32) -> Self {
        let seq_len = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut batch = Self {
            rows: rows.len(),
            seq_len,
            input_ids: Vec::with_capacity(rows.len() * seq_len),
            attention_mask: Vec::with_capacity(rows.len() * seq_len),
            position_ids: Vec::with_capacity(rows.len() * seq_len),
        };

        for ids in rows {
            let pad = seq_len - ids.len();
            batch.input_ids.extend(std::iter::repeat(pad_id as i64).take(pad));
            batch.input_ids.extend(ids.iter().map(|&id| id as i64));
            batch.attention_mask.extend(std::iter::repeat(0).take(pad));
            batch.attention_mask.extend(std::iter::repeat(1).take(ids.len()));
            batch.position_ids.extend(std::iter::repeat(0).take(pad));
            batch.position_ids.extend(0..ids.len() as i64);
        }

        batch
    }
}

/// Picks, per row, the hidden state at the last position whose mask is 1. Works for
/// either padding side; a row with no real token pools to a zero vector.
pub fn last_token_pool(
    hidden: &[f32],
    attention_mask: &[i64],
    rows: usize,
    seq_len: usize,
    width: usize,
) -> Result<Vec<Vec<f32>>, DomainError> {
    if hidden.len() != rows * seq_len * width || attention_mask.len() != rows * seq_len {
        return Err(DomainError::encoding(format!(
            "hidden state of {} values does not match {rows}×{seq_len}×{width}",
            hidden.len()
        )));
    }

    Ok((0..rows)
        .map(|row| {
            let mask = &attention_mask[row * seq_len..(row + 1) * seq_len];
            match mask.iter().rposition(|&m| m != 0) {
                Some(pos) => {
                    let start = (row * seq_len + pos) * width;
                    hidden[start..start + width].to_vec()
                }
                None => vec![0.0; width],
            }
        })
        .collect())
}
