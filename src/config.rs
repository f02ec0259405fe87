use anyhow::{Context, Result};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_SOURCE_LOCALE: &str = "en";
pub const DEFAULT_TARGET_LOCALES: &[&str] = &["es", "fr", "de", "it", "pt-BR"];
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_FILE_PATTERNS: &[&str] = &["**/en.json", "**/*.en.json"];
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Immutable settings snapshot for one run.
#[derive(Debug, Clone)]
pub struct Config {
    // Locales
    pub source_locale: String,
    pub target_locales: Vec<String>,
    pub auto_detect_target_locales: bool,

    // Discovery
    pub file_patterns: Vec<String>,

    // Output
    pub overwrite_existing: bool,

    // OpenAI
    pub model: String,
    pub concurrency: usize,
    pub openai_api_url: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::sanitized(
            DEFAULT_SOURCE_LOCALE,
            DEFAULT_TARGET_LOCALES,
            true,
            DEFAULT_FILE_PATTERNS,
            true,
            DEFAULT_MODEL,
            DEFAULT_CONCURRENCY,
            DEFAULT_OPENAI_API_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let target_locales = list_var("LOCALEFORGE_TARGET_LOCALES")
            .unwrap_or_else(|| to_strings(DEFAULT_TARGET_LOCALES));
        let file_patterns = list_var("LOCALEFORGE_FILE_PATTERNS")
            .unwrap_or_else(|| to_strings(DEFAULT_FILE_PATTERNS));

        Ok(Self::sanitized(
            // Locales
            &std::env::var("LOCALEFORGE_SOURCE_LOCALE")
                .unwrap_or_else(|_| DEFAULT_SOURCE_LOCALE.to_string()),
            &target_locales,
            bool_var("LOCALEFORGE_AUTO_DETECT")?.unwrap_or(true),
            // Discovery
            &file_patterns,
            // Output
            bool_var("LOCALEFORGE_OVERWRITE")?.unwrap_or(true),
            // OpenAI
            &std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            std::env::var("LOCALEFORGE_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CONCURRENCY),
            &std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string()),
            Duration::from_secs(
                std::env::var("OPENAI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        ))
    }

    /// Build a config, applying the same clean-up rules as [`Config::from_env`]:
    /// blank values fall back to defaults, the source locale is removed from
    /// the targets, and concurrency is at least 1.
    #[allow(clippy::too_many_arguments)]
    pub fn sanitized<L: AsRef<str>, P: AsRef<str>>(
        source_locale: &str,
        target_locales: &[L],
        auto_detect_target_locales: bool,
        file_patterns: &[P],
        overwrite_existing: bool,
        model: &str,
        concurrency: usize,
        openai_api_url: &str,
        request_timeout: Duration,
    ) -> Self {
        let source_locale = non_blank(source_locale).unwrap_or(DEFAULT_SOURCE_LOCALE);
        let target_locales = crate::locale::merge_target_locales(
            target_locales,
            &[] as &[&str],
            source_locale,
        )
        .into_vec();

        let mut file_patterns: Vec<String> = file_patterns
            .iter()
            .filter_map(|p| non_blank(p.as_ref()))
            .map(str::to_string)
            .collect();
        if file_patterns.is_empty() {
            file_patterns = to_strings(DEFAULT_FILE_PATTERNS);
        }

        Self {
            source_locale: source_locale.to_string(),
            target_locales,
            auto_detect_target_locales,
            file_patterns,
            overwrite_existing,
            model: non_blank(model).unwrap_or(DEFAULT_MODEL).to_string(),
            concurrency: concurrency.max(1),
            openai_api_url: non_blank(openai_api_url)
                .unwrap_or(DEFAULT_OPENAI_API_URL)
                .to_string(),
            request_timeout,
        }
    }
}

/// OpenAI access token. Never printed, not even in `Debug` output.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_env() -> Result<Self> {
        let key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let key = non_blank(&key).context("OPENAI_API_KEY is empty")?;
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Comma-separated list variable. Unset means "use the default".
fn list_var(name: &str) -> Option<Vec<String>> {
    std::env::var(name)
        .ok()
        .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
}

fn bool_var(name: &str) -> Result<Option<bool>> {
    let Ok(value) = std::env::var(name) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        other => anyhow::bail!("{} must be a boolean, got '{}'", name, other),
    }
}
