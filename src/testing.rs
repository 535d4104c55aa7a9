//! Deterministic encoder doubles shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    ports::{EncoderLoader, SentenceEncoder},
    DomainError, Embedding, ModelDescriptor,
};

const MOCK_WIDTH: usize = 64;

/// Bag-of-words hashing encoder: sentences sharing words land close together.
pub struct MockEncoder {
    width: usize,
    fail: bool,
}

impl MockEncoder {
    pub fn new() -> Self {
        Self {
            width: MOCK_WIDTH,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            width: MOCK_WIDTH,
            fail: true,
        }
    }

    fn bucket(&self, word: &str) -> usize {
        // FNV-1a
        let hash = word
            .bytes()
            .fold(0xcbf29ce484222325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100000001b3));
        (hash % self.width as u64) as usize
    }

    pub fn embed(&self, sentence: &str) -> Embedding {
        let mut vec = vec![0.0; self.width];
        for word in sentence
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vec[self.bucket(&word.to_lowercase())] += 1.0;
        }
        Embedding::new(vec)
    }
}

#[async_trait]
impl SentenceEncoder for MockEncoder {
    async fn encode(&self, sentences: &[String]) -> Result<Vec<Embedding>, DomainError> {
        if self.fail {
            return Err(DomainError::encoding("mock encoder failure"));
        }
        Ok(sentences.iter().map(|s| self.embed(s)).collect())
    }
}

#[derive(Default)]
pub struct MockLoader {
    loads: Mutex<HashMap<String, usize>>,
    fail_once: Mutex<HashSet<String>>,
    failing_encoders: HashSet<String>,
    delay: Option<Duration>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(ms));
        self
    }

    /// The next load of `model` fails; later loads succeed.
    pub fn failing_once(self, model: &str) -> Self {
        self.fail_once.lock().unwrap().insert(model.to_string());
        self
    }

    /// Loads of `model` succeed but its encoder always errors.
    pub fn with_failing_encoder(mut self, model: &str) -> Self {
        self.failing_encoders.insert(model.to_string());
        self
    }

    pub fn load_count(&self, model: &str) -> usize {
        self.loads.lock().unwrap().get(model).copied().unwrap_or(0)
    }

    pub fn total_loads(&self) -> usize {
        self.loads.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl EncoderLoader for MockLoader {
    async fn load(
        &self,
        model: &ModelDescriptor,
    ) -> Result<Arc<dyn SentenceEncoder>, DomainError> {
        *self.loads.lock().unwrap().entry(model.name.clone()).or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_once.lock().unwrap().remove(&model.name) {
            return Err(DomainError::model_load(format!("weights unavailable for {}", model.name)));
        }

        if self.failing_encoders.contains(&model.name) {
            Ok(Arc::new(MockEncoder::failing()))
        } else {
            Ok(Arc::new(MockEncoder::new()))
        }
    }
}
