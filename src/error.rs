//! Error taxonomy for the locale translation pipeline.
//!
//! Where an error is consumed decides its blast radius: a source-file error
//! aborts that file, a translated-response error aborts one locale, a write
//! error aborts one locale's output. The `Display` text of every variant is
//! what ends up in a report entry.

use crate::validation::Violation;
use thiserror::Error;

/// Errors produced while reading, parsing, translating or writing locale files.
#[derive(Debug, Error)]
pub enum LocaleError {
    /// Text is not valid JSON.
    #[error("{label} is not valid JSON: {source}")]
    MalformedInput {
        label: String,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, but not a flat object of string values.
    #[error("{label} {message}")]
    SchemaViolation { label: String, message: String },

    /// A translated map broke the closed key set or placeholder invariants.
    #[error("{}", join_violations(.0))]
    InvalidTranslation(Vec<Violation>),

    /// Read, write, stat or directory listing failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The external translation service failed or returned nothing usable.
    #[error("{0}")]
    Service(String),
}

impl LocaleError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        LocaleError::Io {
            context: context.into(),
            source,
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
