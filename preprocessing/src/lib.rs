// Indonesian social-media text preprocessing

pub mod error;
pub mod processor;
pub mod slang;

pub use error::{PreprocessingError, Result};
pub use processor::TextNormalizer;
pub use slang::SLANG_DICTIONARY;
