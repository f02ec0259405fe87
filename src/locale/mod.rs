//! Locale file naming and target locale resolution.
//!
//! - `path`: maps a source file to the sibling file for another locale
//! - `targets`: infers and merges the set of locales to generate

mod path;
mod targets;

pub use path::{
    base_name, build_target_path, is_source_locale_path, normalize_path_for_match,
    LocaleFileNaming, SourcePathDescriptor,
};
pub use targets::{
    extract_locale_candidates, infer_from_sibling_names, is_valid_locale_code,
    merge_target_locales, LocaleSet,
};
