use thiserror::Error;

/// Failures raised by encoder ports and their adapters.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

/// Outcome of a rejected comparison request.
///
/// The first four variants are caused by the client and are detected before any
/// model is touched. `ModelProcessing` aborts the whole request.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("At least 2 sentences are required.")]
    InsufficientSentences,

    #[error("Select at least one model.")]
    NoModelsSelected,

    /// Carries the 0-based index of the offending sentence.
    #[error("Sentence {} is empty.", .0 + 1)]
    EmptySentence(usize),

    #[error("Invalid model: {0}")]
    UnknownModel(String),

    #[error("Error while processing model '{model}': {source}")]
    ModelProcessing {
        model: String,
        #[source]
        source: DomainError,
    },
}

impl CompareError {
    pub fn processing(model: impl Into<String>, source: DomainError) -> Self {
        Self::ModelProcessing {
            model: model.into(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::ModelProcessing { .. })
    }
}
