mod embedding;

pub use embedding::{EncoderLoader, SentenceEncoder};
