use crate::model::{KerasSequenceModel, SequenceClassifier};
use crate::{Backend, InferenceError, PredictionResult, Result, SentimentConfig, SentimentTokenizer};
use once_cell::sync::OnceCell;
use sentimen_preprocessing::TextNormalizer;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

static SHARED: OnceCell<Arc<SentimentInference>> = OnceCell::new();

enum Runtime {
    Ready {
        tokenizer: Arc<SentimentTokenizer>,
        classifier: Arc<dyn SequenceClassifier>,
    },
    Unavailable(String),
}

/// Raw text in, labelled prediction out: normalize, encode, score, decide.
pub struct SentimentInference {
    normalizer: TextNormalizer,
    runtime: Runtime,
}

impl SentimentInference {
    pub fn load(config: &SentimentConfig) -> Result<Self> {
        tracing::info!("Initializing sentiment inference engine");
        config.validate()?;

        let tokenizer = SentimentTokenizer::from_config(config)?;
        let classifier = load_classifier(config)?;
        tracing::info!(
            "Successfully initialized sentiment inference engine ({}, vocabulary {})",
            classifier.name(),
            tokenizer.vocabulary_size()
        );

        let inference = Self::from_parts(tokenizer, classifier);
        tracing::debug!("Slang table holds {} entries", inference.normalizer.slang_len());
        Ok(inference)
    }

    pub fn from_parts(tokenizer: SentimentTokenizer, classifier: Arc<dyn SequenceClassifier>) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            runtime: Runtime::Ready {
                tokenizer: Arc::new(tokenizer),
                classifier,
            },
        }
    }

    /// A service whose every prediction is an `Error` result.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            runtime: Runtime::Unavailable(reason.into()),
        }
    }

    /// Degraded start: a load failure is logged once and the service keeps
    /// answering with `Error` results.
    pub fn load_or_unavailable(config: &SentimentConfig) -> Self {
        match Self::load(config) {
            Ok(inference) => inference,
            Err(e) => {
                tracing::error!("Sentiment model unavailable: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Process-wide instance; the first call loads, later calls reuse it
    /// regardless of `config`.
    pub fn shared(config: &SentimentConfig) -> Arc<Self> {
        SHARED
            .get_or_init(|| Arc::new(Self::load_or_unavailable(config)))
            .clone()
    }

    pub fn is_available(&self) -> bool {
        matches!(self.runtime, Runtime::Ready { .. })
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.runtime {
            Runtime::Ready { .. } => None,
            Runtime::Unavailable(reason) => Some(reason),
        }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Never fails: blank input, a missing runtime or a fault while scoring
    /// yields `PredictionResult::error(raw_text)`.
    pub fn predict(&self, raw_text: &str) -> PredictionResult {
        match self.try_predict(raw_text) {
            Ok(result) => result,
            Err(InferenceError::InvalidInput(_)) => PredictionResult::error(raw_text),
            Err(e) => {
                tracing::warn!("Prediction failed: {}", e);
                PredictionResult::error(raw_text)
            }
        }
    }

    /// Like `predict`, but reports why no label was produced. A panic inside
    /// the tokenizer or classifier comes back as `InferenceError::Runtime`.
    pub fn try_predict(&self, raw_text: &str) -> Result<PredictionResult> {
        match catch_unwind(AssertUnwindSafe(|| self.run_pipeline(raw_text))) {
            Ok(result) => result,
            Err(payload) => Err(InferenceError::Runtime(panic_message(payload.as_ref()))),
        }
    }

    fn run_pipeline(&self, raw_text: &str) -> Result<PredictionResult> {
        if raw_text.trim().is_empty() {
            return Err(InferenceError::InvalidInput("Text is empty".to_string()));
        }

        let (tokenizer, classifier) = match &self.runtime {
            Runtime::Ready { tokenizer, classifier } => (tokenizer, classifier),
            Runtime::Unavailable(reason) => return Err(InferenceError::Unavailable(reason.clone())),
        };

        let cleaned_text = self.normalizer.normalize(raw_text);
        let sequence = tokenizer.encode(&cleaned_text)?;
        let probabilities = classifier.score(&sequence)?;

        if probabilities.as_array().iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::Runtime(
                "Classifier produced non-finite probabilities".to_string(),
            ));
        }

        let result = PredictionResult::from_probabilities(probabilities, cleaned_text);
        tracing::debug!(
            "Sentiment for '{}': {} ({:.2}%)",
            result.cleaned_text.chars().take(50).collect::<String>(),
            result.label,
            result.confidence
        );
        Ok(result)
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {}", message)
    } else {
        "panic during prediction".to_string()
    }
}

fn load_classifier(config: &SentimentConfig) -> Result<Arc<dyn SequenceClassifier>> {
    match config.backend {
        Backend::Native => Ok(Arc::new(KerasSequenceModel::load(&config.model_path)?)),
        #[cfg(feature = "onnx")]
        Backend::Onnx => Ok(Arc::new(crate::onnx::OnnxSequenceModel::load(&config.model_path, config)?)),
        #[cfg(not(feature = "onnx"))]
        Backend::Onnx => Err(InferenceError::Config(
            "ONNX backend requested but this build lacks the `onnx` feature".to_string(),
        )),
    }
}
