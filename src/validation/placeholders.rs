//! Placeholder preservation checks.
//!
//! Interpolation slots such as `{name}`, `{{count}}` and `%1$s` are consumed
//! by downstream code, so a translated value must carry exactly the same
//! multiset of tokens as its source value.

use super::{LocaleMap, Violation};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{\{[^{}]+\}\}|\{[^{}\r\n]+\}|%(?:\d+\$)?[sdif]")
            .expect("placeholder pattern is valid")
    })
}

/// Extract every placeholder token from `text`, in order of appearance.
pub fn extract_placeholders(text: &str) -> Vec<&str> {
    placeholder_regex()
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

/// Count occurrences of each placeholder token in `text`.
fn count_placeholders(text: &str) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for token in extract_placeholders(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Whether `source` and `target` hold the same placeholder multiset.
pub fn same_placeholders(source: &str, target: &str) -> bool {
    count_placeholders(source) == count_placeholders(target)
}

/// Report a [`Violation::PlaceholderMismatch`] for every key present in both
/// maps whose values disagree on placeholders. Keys missing from either side
/// are left to the key-set check.
pub fn validate_placeholder_preservation(
    source: &LocaleMap,
    translated: &LocaleMap,
) -> Vec<Violation> {
    source
        .iter()
        .filter_map(|(key, source_value)| {
            let translated_value = translated.get(key)?;
            if same_placeholders(source_value, translated_value) {
                None
            } else {
                Some(Violation::PlaceholderMismatch(key.clone()))
            }
        })
        .collect()
}
