//! Translation of locale maps through an external service.
//!
//! - `TranslationService`: seam for the external translator (OpenAI, mocks)
//! - `openai`: chat-completions implementation
//! - `batch`: fans one source map out to many target locales under a
//!   concurrency cap and validates every response

mod batch;
mod openai;

pub use batch::{strip_code_fence, translate_locale_batch, BatchOptions, BatchResult, LocaleFailure};
pub use openai::OpenAiTranslator;

use crate::error::LocaleError;
use crate::validation::LocaleMap;
use async_trait::async_trait;

/// One request to translate every value of `source_map` into `target_locale`.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    pub model: &'a str,
    pub source_locale: &'a str,
    pub target_locale: &'a str,
    pub source_map: &'a LocaleMap,
}

/// An external service that translates a whole locale map at once.
///
/// Implementations return the raw response text; the caller strips code
/// fences, parses and validates it.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, request: &TranslationRequest<'_>) -> Result<String, LocaleError>;
}
