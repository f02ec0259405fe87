use super::{TranslationRequest, TranslationService};
use crate::error::LocaleError;
use crate::validation::{parse_locale_map, validate_translated_map, LocaleMap, Violation};
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

static CODE_FENCE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Inputs for translating one source map into several locales.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions<'a> {
    pub model: &'a str,
    pub source_locale: &'a str,
    pub source_map: &'a LocaleMap,
    pub target_locales: &'a [String],
    /// Maximum requests in flight; values below 1 are treated as 1
    pub concurrency: usize,
}

/// A locale whose translation was rejected or could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFailure {
    pub locale: String,
    pub reason: String,
}

/// Outcome of a batch: every distinct target locale lands in exactly one of
/// `successes` or `failures`.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub successes: IndexMap<String, LocaleMap>,
    pub failures: Vec<LocaleFailure>,
}

impl BatchResult {
    pub fn outcome_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

/// Remove a surrounding Markdown code fence (optionally tagged `json`).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let regex = CODE_FENCE_REGEX.get_or_init(|| {
        Regex::new(r"(?is)^```(?:json)?\s*(.*?)\s*```$").expect("code fence pattern is valid")
    });

    regex
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(trimmed)
}

/// Translate, parse and validate a single locale.
async fn translate_to_locale(
    service: &dyn TranslationService,
    options: &BatchOptions<'_>,
    target_locale: &str,
) -> Result<LocaleMap, LocaleError> {
    let request = TranslationRequest {
        model: options.model,
        source_locale: options.source_locale,
        target_locale,
        source_map: options.source_map,
    };

    let raw = service.translate(&request).await?;
    let translated = parse_locale_map(
        strip_code_fence(&raw),
        &format!("Model output for locale {}", target_locale),
    )?;

    let violations = validate_translated_map(options.source_map, &translated);
    if !violations.is_empty() {
        debug!(
            "Rejected {} output, offending keys: {:?}",
            target_locale,
            violations.iter().map(Violation::key).collect::<Vec<_>>()
        );
        return Err(LocaleError::InvalidTranslation(violations));
    }

    Ok(translated)
}

/// Translate `options.source_map` into every target locale.
///
/// At most `max(1, concurrency)` requests are in flight at once; a freed slot
/// is taken by the next queued locale immediately. A failure for one locale
/// never affects another, and nothing is retried.
pub async fn translate_locale_batch(
    service: &dyn TranslationService,
    options: &BatchOptions<'_>,
) -> BatchResult {
    let concurrency = options.concurrency.max(1);

    let mut seen = HashSet::new();
    let locales: Vec<&str> = options
        .target_locales
        .iter()
        .map(String::as_str)
        .filter(|locale| seen.insert(*locale))
        .collect();

    info!(
        "Translating {} keys from {} into {} locales (concurrency {})",
        options.source_map.len(),
        options.source_locale,
        locales.len(),
        concurrency
    );

    let mut outcomes = stream::iter(locales)
        .map(move |locale| async move { (locale, translate_to_locale(service, options, locale).await) })
        .buffer_unordered(concurrency);

    let mut result = BatchResult::default();
    while let Some((locale, outcome)) = outcomes.next().await {
        match outcome {
            Ok(translated) => {
                debug!("Translation to {} passed validation", locale);
                result.successes.insert(locale.to_string(), translated);
            }
            Err(e) => {
                warn!("Translation to {} failed: {}", locale, e);
                result.failures.push(LocaleFailure {
                    locale: locale.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        "Batch finished: {} outcomes, {} failed",
        result.outcome_count(),
        result.failures.len()
    );
    result
}
