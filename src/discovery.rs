//! Source locale file discovery.
//!
//! A file is a source locale file if any configured glob pattern matches it,
//! or if its name follows one of the locale naming conventions for the source
//! locale. Pattern matching is case-insensitive and tried against the
//! normalized absolute path, the path relative to every known root, and the
//! bare file name.

use crate::config::Config;
use crate::locale::{base_name, is_source_locale_path, normalize_path_for_match};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Decides which files are source locale files for one run.
#[derive(Debug, Clone)]
pub struct SourceMatcher {
    patterns: Vec<Pattern>,
    source_locale: String,
    roots: Vec<PathBuf>,
}

impl SourceMatcher {
    /// Compile the configured patterns. Invalid patterns are logged and
    /// ignored; the naming-convention fallback stays active regardless.
    pub fn new(config: &Config, roots: &[PathBuf]) -> Self {
        let patterns = config
            .file_patterns
            .iter()
            .filter_map(|raw| {
                let normalized = normalize_path_for_match(raw);
                match Pattern::new(&normalized) {
                    Ok(pattern) => Some(pattern),
                    Err(e) => {
                        warn!("Ignoring invalid file pattern '{}': {}", raw, e);
                        None
                    }
                }
            })
            .collect();

        Self {
            patterns,
            source_locale: config.source_locale.clone(),
            roots: roots.to_vec(),
        }
    }

    /// Path forms a pattern is tried against.
    fn candidates(&self, path: &Path) -> Vec<String> {
        let normalized = normalize_path_for_match(&path.to_string_lossy());
        let mut candidates = vec![normalized.clone()];

        for root in &self.roots {
            let root = normalize_path_for_match(&root.to_string_lossy());
            if let Some(relative) = relative_to_root(&normalized, &root) {
                candidates.push(relative.to_string());
            }
        }

        candidates.push(base_name(path));
        candidates
    }

    /// Whether any configured pattern matches `path`.
    pub fn matches_pattern(&self, path: &Path) -> bool {
        let candidates = self.candidates(path);
        self.patterns.iter().any(|pattern| {
            candidates
                .iter()
                .any(|candidate| pattern.matches_with(candidate, MATCH_OPTIONS))
        })
    }

    /// Pattern match, or naming-convention match as a fallback.
    pub fn matches(&self, path: &Path) -> bool {
        self.matches_pattern(path) || is_source_locale_path(path, &self.source_locale)
    }

    /// Whether `path` is eligible as a source document: the host predicate
    /// must accept its content type and the matcher must accept its path.
    pub fn is_source_document<F>(&self, path: &Path, is_supported_document: F) -> bool
    where
        F: Fn(&Path) -> bool,
    {
        is_supported_document(path) && self.matches(path)
    }
}

/// `path` relative to `root`, comparing the root prefix ASCII
/// case-insensitively. Both must already use `/` separators.
fn relative_to_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    let root = root.trim_end_matches('/');
    let prefix = path.get(..root.len())?;
    if !prefix.eq_ignore_ascii_case(root) {
        return None;
    }
    let relative = path.get(root.len()..)?.strip_prefix('/')?;
    (!relative.is_empty()).then_some(relative)
}

/// Content-type predicate for the command-line host: `.json` and `.jsonc`
/// files only.
pub fn is_json_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("jsonc"))
        .unwrap_or(false)
}

/// Expand the given paths into eligible source files, in the order given.
///
/// Directories are walked recursively (entries sorted by name); files are
/// checked directly. Duplicates are dropped.
pub fn collect_source_files(inputs: &[PathBuf], matcher: &SourceMatcher) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = Vec::new();

    let mut push = |path: PathBuf| {
        if matcher.is_source_document(&path, is_json_document) && !found.contains(&path) {
            debug!("Discovered source file {}", path.display());
            found.push(path);
        }
    };

    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => push(entry.into_path()),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable entry under {}: {}", input.display(), e),
                }
            }
        } else {
            push(input.clone());
        }
    }

    found
}
