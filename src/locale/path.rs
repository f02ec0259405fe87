//! Sibling path mapping between locale files.
//!
//! Two naming conventions are recognised for a source file, compared
//! case-insensitively:
//!
//! - `<locale>.json` (e.g. `locales/en.json`)
//! - `<prefix>.<locale>.json` (e.g. `i18n/messages.en.json`)
//!
//! Both `/` and `\` are accepted as path separators.

use std::path::{Path, PathBuf};

const JSON_EXTENSION: &str = ".json";

/// Which naming convention a source file follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleFileNaming {
    /// `<locale>.json`
    Bare,
    /// `<prefix>.<locale>.json`, carrying the prefix as written
    Prefixed(String),
}

/// A source locale file split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePathDescriptor {
    /// Everything up to and including the last separator (may be empty)
    pub directory: String,
    pub naming: LocaleFileNaming,
    pub source_locale: String,
}

impl SourcePathDescriptor {
    /// Recognise `path` as a file for `source_locale`.
    ///
    /// Returns `None` when the base name follows neither convention.
    pub fn parse(path: &Path, source_locale: &str) -> Option<Self> {
        let text = path.to_string_lossy();
        let (directory, base_name) = split_base_name(&text);

        let naming = if base_name.eq_ignore_ascii_case(&format!("{}{}", source_locale, JSON_EXTENSION)) {
            LocaleFileNaming::Bare
        } else {
            let suffix = format!(".{}{}", source_locale, JSON_EXTENSION);
            let prefix = strip_suffix_ignore_case(base_name, &suffix)?;
            if prefix.is_empty() {
                return None;
            }
            LocaleFileNaming::Prefixed(prefix.to_string())
        };

        Some(Self {
            directory: directory.to_string(),
            naming,
            source_locale: source_locale.to_string(),
        })
    }

    /// The base name this convention gives to `locale`.
    pub fn file_name_for(&self, locale: &str) -> String {
        match &self.naming {
            LocaleFileNaming::Bare => format!("{}{}", locale, JSON_EXTENSION),
            LocaleFileNaming::Prefixed(prefix) => {
                format!("{}.{}{}", prefix, locale, JSON_EXTENSION)
            }
        }
    }

    /// The sibling path for `locale`, in the same directory.
    pub fn path_for(&self, locale: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.directory, self.file_name_for(locale)))
    }
}

/// Replace every `\` with `/`.
pub fn normalize_path_for_match(path: &str) -> String {
    path.replace('\\', "/")
}

/// Split a path string into its directory part (with trailing separator)
/// and its base name.
pub(crate) fn split_base_name(path: &str) -> (&str, &str) {
    match path.rfind(['/', '\\']) {
        Some(index) => path.split_at(index + 1),
        None => ("", path),
    }
}

/// The base name of `path`, honouring both separator styles.
pub fn base_name(path: &Path) -> String {
    let text = path.to_string_lossy();
    split_base_name(&text).1.to_string()
}

/// Strip `suffix` from the end of `text`, comparing ASCII case-insensitively.
pub(crate) fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let start = text.len().checked_sub(suffix.len())?;
    let tail = text.get(start..)?;
    if tail.eq_ignore_ascii_case(suffix) {
        text.get(..start)
    } else {
        None
    }
}

/// Whether `path` names a file for `source_locale` under either convention.
pub fn is_source_locale_path(path: &Path, source_locale: &str) -> bool {
    let name = base_name(path);
    name.eq_ignore_ascii_case(&format!("{}{}", source_locale, JSON_EXTENSION))
        || strip_suffix_ignore_case(&name, &format!(".{}{}", source_locale, JSON_EXTENSION))
            .is_some()
}

/// Derive the sibling path for `target_locale` from a source file path.
///
/// Returns `None` when the source path follows neither convention; callers
/// should skip that locale rather than fail.
pub fn build_target_path(
    source_path: &Path,
    source_locale: &str,
    target_locale: &str,
) -> Option<PathBuf> {
    SourcePathDescriptor::parse(source_path, source_locale).map(|d| d.path_for(target_locale))
}
