use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub models: ModelsConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Download cache shared by fastembed and the Hugging Face hub client.
    pub cache_dir: PathBuf,
    /// Hub repository holding the ONNX export of Qwen3-Embedding-0.6B.
    pub qwen3_repo: String,
    /// Graph file inside `qwen3_repo`; `<file>_data` is fetched alongside when present.
    pub qwen3_onnx_file: String,
    /// Offline alternative to the hub: a directory with `model.onnx` and `tokenizer.json`.
    pub qwen3_dir: Option<PathBuf>,
    pub preload: bool,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".fastembed_cache"),
            qwen3_repo: "onnx-community/Qwen3-Embedding-0.6B-ONNX".to_string(),
            qwen3_onnx_file: "onnx/model.onnx".to_string(),
            qwen3_dir: None,
            preload: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub static_dir: PathBuf,
    pub index_page: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            index_page: PathBuf::from("templates/embedding.html"),
        }
    }
}

/// Resolved runtime configuration: YAML file (optional) with environment overrides.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.yaml";

    /// Reads `$CONFIG_PATH` (or `config.yaml`) if present, then applies env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| Self::DEFAULT_PATH.into());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(Self {
            config: serde_yaml::from_str(raw)?,
        })
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let config = &mut self.config;

        if let Some(host) = lookup("SERVER_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::Env {
                key: "SERVER_PORT",
                value: port,
            })?;
        }
        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(dir) = lookup("MODEL_CACHE_DIR") {
            config.models.cache_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("QWEN3_MODEL_DIR") {
            config.models.qwen3_dir = Some(PathBuf::from(dir));
        }
        if let Some(repo) = lookup("QWEN3_REPO") {
            config.models.qwen3_repo = repo;
        }
        if let Some(preload) = lookup("PRELOAD_MODELS") {
            config.models.preload = preload.parse().map_err(|_| ConfigError::Env {
                key: "PRELOAD_MODELS",
                value: preload,
            })?;
        }

        Ok(())
    }
}
