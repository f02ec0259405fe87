//! Target locale inference and merging.
//!
//! Locale codes compare case-insensitively but keep the casing of the first
//! occurrence seen, so `pt-BR` and `pt-br` are the same target and whichever
//! appeared first is what ends up in file names.

use super::path::{base_name, strip_suffix_ignore_case, LocaleFileNaming, SourcePathDescriptor};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

static LOCALE_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Whether `code` looks like a locale code (`en`, `pt-BR`, `zh-Hans-CN`).
pub fn is_valid_locale_code(code: &str) -> bool {
    LOCALE_CODE_REGEX
        .get_or_init(|| {
            Regex::new(r"(?i)^[a-z]{2,3}(?:-[a-z0-9]{2,8})*$").expect("locale pattern is valid")
        })
        .is_match(code)
}

/// An insertion-ordered set of locale codes with case-insensitive identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSet {
    codes: Vec<String>,
    seen: HashSet<String>,
}

impl LocaleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `code`, trimmed. Returns `false` if it was blank or already present.
    pub fn insert(&mut self, code: &str) -> bool {
        let code = code.trim();
        if code.is_empty() {
            return false;
        }
        if !self.seen.insert(code.to_ascii_lowercase()) {
            return false;
        }
        self.codes.push(code.to_string());
        true
    }

    pub fn contains(&self, code: &str) -> bool {
        self.seen.contains(&code.trim().to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.codes
    }
}

/// Trim `candidate` and accept it only if it is a valid locale code other
/// than the source locale.
fn clean_locale<'a>(candidate: &'a str, source_locale: &str) -> Option<&'a str> {
    let candidate = candidate.trim();
    if candidate.is_empty() || !is_valid_locale_code(candidate) {
        return None;
    }
    if candidate.eq_ignore_ascii_case(source_locale.trim()) {
        return None;
    }
    Some(candidate)
}

/// Pull a locale out of a sibling's base name, using the convention the
/// source file follows.
fn locale_from_sibling<'a>(
    descriptor: &SourcePathDescriptor,
    sibling: &'a str,
) -> Option<&'a str> {
    let stem = strip_suffix_ignore_case(sibling, ".json")?;
    let candidate = match &descriptor.naming {
        LocaleFileNaming::Bare => stem,
        LocaleFileNaming::Prefixed(prefix) => {
            let head = stem.get(..prefix.len() + 1)?;
            if !head.eq_ignore_ascii_case(&format!("{}.", prefix)) {
                return None;
            }
            stem.get(prefix.len() + 1..)?
        }
    };
    clean_locale(candidate, &descriptor.source_locale)
}

/// Infer target locales from the names of files next to `source_path`.
///
/// Siblings that do not follow the source's naming convention, are not JSON,
/// or do not carry a valid locale code are ignored. The source file itself
/// never contributes.
pub fn infer_from_sibling_names<S: AsRef<str>>(
    source_path: &Path,
    sibling_names: &[S],
    source_locale: &str,
) -> LocaleSet {
    let mut inferred = LocaleSet::new();
    let Some(descriptor) = SourcePathDescriptor::parse(source_path, source_locale) else {
        return inferred;
    };
    let source_name = base_name(source_path);

    for sibling in sibling_names {
        let sibling = sibling.as_ref();
        if sibling.eq_ignore_ascii_case(&source_name) {
            continue;
        }
        if let Some(locale) = locale_from_sibling(&descriptor, sibling) {
            inferred.insert(locale);
        }
    }

    inferred
}

/// Guess a locale from an arbitrary file name.
///
/// `xx.json` yields `xx`; `a.b.xx.json` yields only the last segment `xx`.
/// Returns at most one entry, and never the source locale.
pub fn extract_locale_candidates(file_name: &str, source_locale: &str) -> Vec<String> {
    let Some(stem) = strip_suffix_ignore_case(file_name, ".json") else {
        return Vec::new();
    };
    let last_segment = stem.rsplit('.').next().unwrap_or(stem);

    clean_locale(last_segment, source_locale)
        .map(|locale| vec![locale.to_string()])
        .unwrap_or_default()
}

/// Union configured and inferred locales.
///
/// Configured locales come first; duplicates and the source locale are
/// dropped case-insensitively, keeping the first-seen casing.
pub fn merge_target_locales<A, B>(configured: &[A], inferred: &[B], source_locale: &str) -> LocaleSet
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let source = source_locale.trim();
    let mut merged = LocaleSet::new();
    let candidates = configured
        .iter()
        .map(AsRef::as_ref)
        .chain(inferred.iter().map(AsRef::as_ref));

    for locale in candidates {
        if locale.trim().eq_ignore_ascii_case(source) {
            continue;
        }
        merged.insert(locale);
    }

    merged
}
