pub mod config;
pub mod embedding;

pub use config::{AppConfig, Config, ConfigError};
pub use embedding::{FastembedEncoder, OnnxModelLoader, Qwen3Encoder, Qwen3Source};
