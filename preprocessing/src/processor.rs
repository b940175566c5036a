use crate::{slang::SLANG_DICTIONARY, PreprocessingError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+|www\S+").expect("valid url pattern"));
static MENTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("valid mention pattern"));
static HASHTAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("valid hashtag pattern"));
static DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit pattern"));
static PUNCTUATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

/// Deterministic cleanup of raw commentary into the canonical form the
/// vocabulary was fitted on.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    slang: HashMap<String, String>,
}

impl TextNormalizer {
    pub fn new() -> Self {
        let slang = SLANG_DICTIONARY
            .iter()
            .map(|&(informal, canonical)| (informal.to_string(), canonical.to_string()))
            .collect();

        Self { slang }
    }

    /// Builds a normalizer over a custom slang table.
    ///
    /// Replacement is a single pass, so a table whose targets are also keys
    /// would make normalization non-idempotent and is rejected.
    pub fn with_slang<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let slang: HashMap<String, String> = pairs
            .into_iter()
            .map(|(informal, canonical)| (informal.into(), canonical.into()))
            .collect();

        for (informal, canonical) in &slang {
            if informal.is_empty() || informal.split_whitespace().count() != 1 {
                return Err(PreprocessingError::Config(format!(
                    "Slang key must be a single token, got {:?}",
                    informal
                )));
            }
            if slang.contains_key(canonical) {
                return Err(PreprocessingError::Config(format!(
                    "Slang target {:?} (for {:?}) is itself a slang key",
                    canonical, informal
                )));
            }
        }

        tracing::debug!("Using custom slang table with {} entries", slang.len());
        Ok(Self { slang })
    }

    pub fn normalize(&self, text: &str) -> String {
        let mut cleaned = text.to_lowercase();

        // Order matters: punctuation removal must not run before the
        // URL/mention/hashtag patterns have seen their anchors.
        for pattern in [
            &*URL_REGEX,
            &*MENTION_REGEX,
            &*HASHTAG_REGEX,
            &*DIGIT_REGEX,
            &*PUNCTUATION_REGEX,
        ] {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }

        cleaned
            .split_whitespace()
            .map(|token| self.canonical(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn slang_len(&self) -> usize {
        self.slang.len()
    }

    fn canonical<'a>(&'a self, token: &'a str) -> &'a str {
        self.slang.get(token).map(String::as_str).unwrap_or(token)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
