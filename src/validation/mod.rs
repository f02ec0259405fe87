//! Locale map parsing and translated-map validation.
//!
//! A locale map is a flat JSON object whose values are all strings. A
//! translated map is only acceptable when it has exactly the source's key set
//! and every shared key keeps its placeholder tokens.

mod placeholders;

pub use placeholders::{extract_placeholders, same_placeholders, validate_placeholder_preservation};

use crate::error::LocaleError;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// One locale's strings, keyed by message key, in file order.
pub type LocaleMap = IndexMap<String, String>;

/// A single reason a translated map was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingKey(String),
    UnexpectedKey(String),
    PlaceholderMismatch(String),
}

impl Violation {
    /// The key this violation is about.
    pub fn key(&self) -> &str {
        match self {
            Violation::MissingKey(key)
            | Violation::UnexpectedKey(key)
            | Violation::PlaceholderMismatch(key) => key,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingKey(key) => {
                write!(f, "Missing key \"{}\" in translated output.", key)
            }
            Violation::UnexpectedKey(key) => {
                write!(f, "Unexpected key \"{}\" in translated output.", key)
            }
            Violation::PlaceholderMismatch(key) => {
                write!(f, "Placeholder mismatch for key \"{}\".", key)
            }
        }
    }
}

/// Parse raw JSON text into a [`LocaleMap`].
///
/// # Arguments
/// * `raw` - The JSON text
/// * `label` - Prefix used in error messages (e.g., "Source file locales/en.json")
///
/// # Returns
/// * `Err(LocaleError::MalformedInput)` if the text is not JSON
/// * `Err(LocaleError::SchemaViolation)` if the top level is not an object or
///   any value is not a string
pub fn parse_locale_map(raw: &str, label: &str) -> Result<LocaleMap, LocaleError> {
    let parsed: Value = serde_json::from_str(raw).map_err(|source| LocaleError::MalformedInput {
        label: label.to_string(),
        source,
    })?;

    let Value::Object(object) = parsed else {
        return Err(LocaleError::SchemaViolation {
            label: label.to_string(),
            message: "must be a flat JSON object of string values.".to_string(),
        });
    };

    let mut map = LocaleMap::with_capacity(object.len());
    for (key, value) in object {
        match value {
            Value::String(text) => {
                map.insert(key, text);
            }
            _ => {
                return Err(LocaleError::SchemaViolation {
                    label: label.to_string(),
                    message: format!("key \"{}\" must map to a string value.", key),
                });
            }
        }
    }

    Ok(map)
}

/// Check a translated map against its source.
///
/// Returns every violation found; an empty list means the translation is
/// acceptable. Key-set findings come first (missing, then unexpected),
/// followed by placeholder findings.
pub fn validate_translated_map(source: &LocaleMap, translated: &LocaleMap) -> Vec<Violation> {
    let mut violations: Vec<Violation> = source
        .keys()
        .filter(|key| !translated.contains_key(*key))
        .map(|key| Violation::MissingKey(key.clone()))
        .collect();

    violations.extend(
        translated
            .keys()
            .filter(|key| !source.contains_key(*key))
            .map(|key| Violation::UnexpectedKey(key.clone())),
    );

    violations.extend(validate_placeholder_preservation(source, translated));
    violations
}
