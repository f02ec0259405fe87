//! Generate per-locale JSON translation files from a source locale file.
//!
//! The [`pipeline`] module ties everything together: source files found by
//! [`discovery`] are parsed and checked by [`validation`], translated through a
//! [`translation::TranslationService`], and written next to the source using
//! the naming rules in [`locale`]. Every outcome is collected in a
//! [`report::RunReport`].

pub mod config;
pub mod discovery;
pub mod error;
pub mod locale;
pub mod pipeline;
pub mod report;
pub mod translation;
pub mod validation;

pub use config::{ApiKey, Config};
pub use error::LocaleError;
pub use report::{RunReport, SourceFileReport};
pub use translation::{OpenAiTranslator, TranslationRequest, TranslationService};
