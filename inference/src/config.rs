use crate::{InferenceError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_MODEL_PATH: &str = "model/Model_Sentiment_BiLSTM.safetensors";
pub const DEFAULT_VOCABULARY_PATH: &str = "model/tokenizer_sentiment.json";
pub const DEFAULT_FALLBACK_VOCABULARY_PATH: &str = "model/tokenizer.json";

/// Which runtime executes the classifier artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Keras layer graph evaluated in-process from a safetensors artifact
    #[default]
    Native,
    /// Exported ONNX graph (requires the `onnx` feature)
    Onnx,
}

impl FromStr for Backend {
    type Err = InferenceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "native" => Ok(Backend::Native),
            "onnx" => Ok(Backend::Onnx),
            other => Err(InferenceError::Config(format!(
                "Unknown backend {:?} (expected native or onnx)",
                other
            ))),
        }
    }
}

// Configuration structure matching sentiment_config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub model_path: PathBuf,
    pub vocabulary_path: PathBuf,
    pub fallback_vocabulary_path: PathBuf,
    pub backend: Backend,
    pub onnx_input_name: String,
    pub onnx_output_name: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            vocabulary_path: PathBuf::from(DEFAULT_VOCABULARY_PATH),
            fallback_vocabulary_path: PathBuf::from(DEFAULT_FALLBACK_VOCABULARY_PATH),
            backend: Backend::Native,
            onnx_input_name: "embedding_input".to_string(),
            onnx_output_name: "dense".to_string(),
        }
    }
}

impl SentimentConfig {
    /// Reads a JSON config; relative artifact paths resolve against the
    /// config file's directory.
    pub fn from_file(config_path: &Path) -> Result<Self> {
        tracing::info!("Loading sentiment config from: {:?}", config_path);

        let content = std::fs::read_to_string(config_path)
            .map_err(|e| InferenceError::Config(format!("Failed to read config file: {}", e)))?;
        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| InferenceError::Config(format!("Failed to parse config: {}", e)))?;

        let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_relative_to(base_dir);
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env_or_default() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = env::var("SENTIMEN_MODEL_PATH") {
            self.model_path = PathBuf::from(path);
        }

        if let Ok(path) = env::var("SENTIMEN_VOCABULARY_PATH") {
            self.vocabulary_path = PathBuf::from(path);
        }

        if let Ok(path) = env::var("SENTIMEN_FALLBACK_VOCABULARY_PATH") {
            self.fallback_vocabulary_path = PathBuf::from(path);
        }

        if let Ok(backend) = env::var("SENTIMEN_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.backend = backend,
                Err(e) => tracing::warn!("Ignoring SENTIMEN_BACKEND: {}", e),
            }
        }

        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_path.as_os_str().is_empty() {
            return Err(InferenceError::Config("Model path cannot be empty".to_string()));
        }

        if self.vocabulary_path.as_os_str().is_empty() && self.fallback_vocabulary_path.as_os_str().is_empty() {
            return Err(InferenceError::Config(
                "At least one vocabulary path must be set".to_string(),
            ));
        }

        if self.backend == Backend::Onnx {
            if !cfg!(feature = "onnx") {
                return Err(InferenceError::Config(
                    "ONNX backend requested but this build lacks the `onnx` feature".to_string(),
                ));
            }
            if self.onnx_input_name.is_empty() || self.onnx_output_name.is_empty() {
                return Err(InferenceError::Config(
                    "ONNX input and output names cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn resolve_relative_to(&mut self, base_dir: &Path) {
        for path in [
            &mut self.model_path,
            &mut self.vocabulary_path,
            &mut self.fallback_vocabulary_path,
        ] {
            if path.is_relative() && !path.as_os_str().is_empty() {
                *path = base_dir.join(&*path);
            }
        }
    }
}
