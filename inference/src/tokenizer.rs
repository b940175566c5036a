use crate::{InferenceError, Result, SentimentConfig};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tokenizers::Tokenizer;

/// Every encoded text is aligned to this many ids before scoring.
pub const MAX_SEQUENCE_LENGTH: usize = 100;

const KERAS_DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Fixed-length id sequence; only constructible through the padding rule,
/// so its length is always [`MAX_SEQUENCE_LENGTH`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedSequence {
    ids: Vec<i64>,
}

impl PaddedSequence {
    /// Keeps the first `MAX_SEQUENCE_LENGTH` ids and right-pads with 0.
    pub fn from_ids(mut ids: Vec<i64>) -> Self {
        ids.truncate(MAX_SEQUENCE_LENGTH);
        ids.resize(MAX_SEQUENCE_LENGTH, 0);
        Self { ids }
    }

    pub fn zeros() -> Self {
        Self::from_ids(Vec::new())
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

#[derive(Debug, Deserialize)]
struct KerasTokenizerJson {
    config: KerasTokenizerConfig,
}

#[derive(Debug, Deserialize)]
struct KerasTokenizerConfig {
    #[serde(default)]
    num_words: Option<usize>,
    #[serde(default = "default_filters")]
    filters: Option<String>,
    #[serde(default = "default_true")]
    lower: bool,
    #[serde(default = "default_split")]
    split: String,
    #[serde(default)]
    char_level: bool,
    #[serde(default)]
    oov_token: Option<String>,
    word_index: Value,
}

fn default_filters() -> Option<String> {
    Some(KERAS_DEFAULT_FILTERS.to_string())
}

fn default_true() -> bool {
    true
}

fn default_split() -> String {
    " ".to_string()
}

/// Word index fitted by a Keras `Tokenizer`, applied with the same
/// splitting and out-of-vocabulary rules the tokenizer was saved with.
#[derive(Debug, Clone)]
pub struct KerasVocabulary {
    word_index: HashMap<String, i64>,
    num_words: Option<usize>,
    oov_index: Option<i64>,
    filters: Vec<char>,
    lower: bool,
    split: String,
    char_level: bool,
}

impl KerasVocabulary {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::VocabularyLoad(format!("Failed to read {:?}: {}", path, e))
        })?;
        Self::from_json(&content)
    }

    /// Accepts `Tokenizer.to_json()` output, also when it was dumped a
    /// second time as a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let parsed: Value = serde_json::from_str(content)
            .map_err(|e| InferenceError::VocabularyLoad(format!("Invalid vocabulary JSON: {}", e)))?;
        let parsed = match parsed {
            Value::String(inner) => serde_json::from_str(&inner).map_err(|e| {
                InferenceError::VocabularyLoad(format!("Invalid embedded vocabulary JSON: {}", e))
            })?,
            other => other,
        };

        let tokenizer: KerasTokenizerJson = serde_json::from_value(parsed)
            .map_err(|e| InferenceError::VocabularyLoad(format!("Unexpected vocabulary layout: {}", e)))?;
        let config = tokenizer.config;

        let word_index: HashMap<String, i64> = match config.word_index {
            Value::String(encoded) => serde_json::from_str(&encoded),
            other => serde_json::from_value(other),
        }
        .map_err(|e| InferenceError::VocabularyLoad(format!("Invalid word_index: {}", e)))?;

        if !config.char_level && config.split.is_empty() {
            return Err(InferenceError::VocabularyLoad(
                "Word-level vocabulary needs a non-empty split separator".to_string(),
            ));
        }

        let oov_index = config
            .oov_token
            .as_ref()
            .and_then(|token| word_index.get(token).copied());
        if config.oov_token.is_some() && oov_index.is_none() {
            tracing::warn!("OOV token {:?} is not in the word index; unknown words will be dropped", config.oov_token);
        }

        Ok(Self {
            word_index,
            num_words: config.num_words.filter(|&limit| limit > 0),
            oov_index,
            filters: config.filters.unwrap_or_default().chars().collect(),
            lower: config.lower,
            split: config.split,
            char_level: config.char_level,
        })
    }

    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    pub fn oov_index(&self) -> Option<i64> {
        self.oov_index
    }

    pub fn id(&self, word: &str) -> Option<i64> {
        self.word_index.get(word).copied()
    }

    pub fn sequence(&self, text: &str) -> Vec<i64> {
        let mut ids = Vec::new();

        for word in self.split_words(text) {
            match self.word_index.get(&word) {
                Some(&id) => match self.num_words {
                    Some(limit) if id >= limit as i64 => ids.extend(self.oov_index),
                    _ => ids.push(id),
                },
                None => ids.extend(self.oov_index),
            }
        }

        ids
    }

    fn split_words(&self, text: &str) -> Vec<String> {
        let text = if self.lower { text.to_lowercase() } else { text.to_string() };

        if self.char_level {
            return text.chars().map(String::from).collect();
        }

        let mut translated = String::with_capacity(text.len());
        for c in text.chars() {
            if self.filters.contains(&c) {
                translated.push_str(&self.split);
            } else {
                translated.push(c);
            }
        }

        translated
            .split(self.split.as_str())
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug)]
enum Vocabulary {
    Keras(KerasVocabulary),
    Pretrained(Box<Tokenizer>),
}

/// Maps normalized text to the fixed-length id sequence the classifier
/// consumes.
#[derive(Debug)]
pub struct SentimentTokenizer {
    vocabulary: Vocabulary,
}

impl SentimentTokenizer {
    /// Loads the Keras vocabulary at `primary`, or the `tokenizers` file at
    /// `fallback` when the primary artifact is absent.
    pub fn load(primary: &Path, fallback: &Path) -> Result<Self> {
        if primary.is_file() {
            tracing::info!("Loading vocabulary from: {:?}", primary);
            let vocabulary = KerasVocabulary::from_file(primary)?;
            tracing::info!("Loaded vocabulary with {} entries", vocabulary.len());
            return Ok(Self::from_keras(vocabulary));
        }

        if fallback.is_file() {
            tracing::info!("Primary vocabulary missing, loading fallback from: {:?}", fallback);
            let tokenizer = Tokenizer::from_file(fallback).map_err(|e| {
                InferenceError::VocabularyLoad(format!("Failed to load tokenizer: {}", e))
            })?;
            return Ok(Self::from_pretrained(tokenizer));
        }

        Err(InferenceError::VocabularyLoad(format!(
            "Vocabulary file not found: {:?} (fallback {:?})",
            primary, fallback
        )))
    }

    pub fn from_config(config: &SentimentConfig) -> Result<Self> {
        Self::load(&config.vocabulary_path, &config.fallback_vocabulary_path)
    }

    pub fn from_keras(vocabulary: KerasVocabulary) -> Self {
        Self {
            vocabulary: Vocabulary::Keras(vocabulary),
        }
    }

    pub fn from_pretrained(tokenizer: Tokenizer) -> Self {
        Self {
            vocabulary: Vocabulary::Pretrained(Box::new(tokenizer)),
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        match &self.vocabulary {
            Vocabulary::Keras(vocabulary) => vocabulary.len(),
            Vocabulary::Pretrained(tokenizer) => tokenizer.get_vocab_size(true),
        }
    }

    /// Variable-length ids, before padding.
    pub fn sequence(&self, text: &str) -> Result<Vec<i64>> {
        match &self.vocabulary {
            Vocabulary::Keras(vocabulary) => Ok(vocabulary.sequence(text)),
            Vocabulary::Pretrained(tokenizer) => {
                if text.trim().is_empty() {
                    return Ok(Vec::new());
                }
                let encoding = tokenizer
                    .encode(text, false)
                    .map_err(|e| InferenceError::Tokenization(format!("Encoding failed: {}", e)))?;
                Ok(encoding.get_ids().iter().map(|&id| id as i64).collect())
            }
        }
    }

    pub fn encode(&self, text: &str) -> Result<PaddedSequence> {
        Ok(PaddedSequence::from_ids(self.sequence(text)?))
    }
}
