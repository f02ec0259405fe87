//! Source file processing.
//!
//! For each source file: read and parse it, resolve the target locales,
//! translate into all of them, then write every accepted translation next to
//! the source. Files are processed one at a time in the order given.

use crate::config::Config;
use crate::error::LocaleError;
use crate::locale::{
    base_name, build_target_path, extract_locale_candidates, infer_from_sibling_names,
    merge_target_locales, LocaleSet,
};
use crate::report::{RunHeader, RunReport, SourceFileReport};
use crate::translation::{translate_locale_batch, BatchOptions, TranslationService};
use crate::validation::{parse_locale_map, LocaleMap};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory holding `path`, or `.` for a bare file name.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Names of the regular files next to `source_path`.
pub async fn list_sibling_files(source_path: &Path) -> Result<Vec<String>, LocaleError> {
    let dir = parent_dir(source_path);
    let context = || format!("Could not scan sibling files in {}", dir.display());

    let mut entries = tokio::fs::read_dir(&dir)
        .await
        .map_err(|e| LocaleError::io(context(), e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LocaleError::io(context(), e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| LocaleError::io(context(), e))?;
        if file_type.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    Ok(names)
}

/// Configured targets, plus locales inferred from sibling files when
/// auto-detection is on. A failed directory scan is reported as a skip
/// notice and the configured targets are used alone.
async fn resolve_target_locales(
    config: &Config,
    source_path: &Path,
    report: &mut SourceFileReport,
) -> Vec<String> {
    if !config.auto_detect_target_locales {
        return config.target_locales.clone();
    }

    let inferred = match list_sibling_files(source_path).await {
        Ok(siblings) => {
            let inferred = infer_from_sibling_names(source_path, &siblings, &config.source_locale);
            debug!(
                "Inferred {} locales from siblings of {}",
                inferred.len(),
                base_name(source_path)
            );
            inferred.into_vec()
        }
        Err(e) => {
            warn!("{}", e);
            report.skip(e.to_string());
            Vec::new()
        }
    };

    merge_target_locales(&config.target_locales, &inferred, &config.source_locale).into_vec()
}

/// Serialize `translated` in the key order of `source`: two-space indent,
/// trailing newline.
pub fn render_locale_json(
    source: &LocaleMap,
    translated: &LocaleMap,
) -> Result<String, serde_json::Error> {
    let ordered: IndexMap<&String, &String> = source
        .keys()
        .filter_map(|key| translated.get_key_value(key))
        .collect();

    let mut json = serde_json::to_string_pretty(&ordered)?;
    json.push('\n');
    Ok(json)
}

/// Write one accepted translation, recording generated / skipped / failed.
async fn write_translation(
    config: &Config,
    source_path: &Path,
    source_map: &LocaleMap,
    locale: &str,
    translated: &LocaleMap,
    report: &mut SourceFileReport,
) {
    let Some(target_path) = build_target_path(source_path, &config.source_locale, locale) else {
        report.skip(format!(
            "Could not derive target path for {} from {}",
            locale,
            base_name(source_path)
        ));
        return;
    };

    if !config.overwrite_existing {
        match tokio::fs::try_exists(&target_path).await {
            Ok(true) => {
                report.skip(format!("Skipped existing file {}", target_path.display()));
                return;
            }
            Ok(false) => {}
            Err(e) => {
                report.fail_locale(locale, Some(target_path), e.to_string());
                return;
            }
        }
    }

    let json = match render_locale_json(source_map, translated) {
        Ok(json) => json,
        Err(e) => {
            report.fail_locale(locale, Some(target_path), e.to_string());
            return;
        }
    };

    match tokio::fs::write(&target_path, json).await {
        Ok(()) => {
            info!("Wrote {}", target_path.display());
            report.generate(target_path);
        }
        Err(e) => {
            warn!("Failed to write {}: {}", target_path.display(), e);
            report.fail_locale(locale, Some(target_path), e.to_string());
        }
    }
}

/// Process one source file end to end.
///
/// Never fails: every problem becomes an entry in the returned report. An
/// unreadable or invalid source aborts only this file.
pub async fn process_source_file(
    service: &dyn TranslationService,
    config: &Config,
    source_path: &Path,
) -> SourceFileReport {
    let mut report = SourceFileReport::new(source_path);

    let text = match tokio::fs::read_to_string(source_path).await {
        Ok(text) => text,
        Err(e) => {
            let err = LocaleError::io(
                format!("Failed to read source file {}", source_path.display()),
                e,
            );
            warn!("{}", err);
            report.fail(err.to_string());
            return report;
        }
    };

    // Editors often save locale bundles with a byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let source_map = match parse_locale_map(
        text,
        &format!("Source file {}", source_path.display()),
    ) {
        Ok(map) => map,
        Err(e) => {
            warn!("{}", e);
            report.fail(e.to_string());
            return report;
        }
    };

    let target_locales = resolve_target_locales(config, source_path, &mut report).await;
    if target_locales.is_empty() {
        report.fail(
            "No target locales configured or detected. \
             Set LOCALEFORGE_TARGET_LOCALES or pass --target.",
        );
        return report;
    }

    let batch = translate_locale_batch(
        service,
        &BatchOptions {
            model: &config.model,
            source_locale: &config.source_locale,
            source_map: &source_map,
            target_locales: &target_locales,
            concurrency: config.concurrency,
        },
    )
    .await;

    for failure in batch.failures {
        report.fail_locale(failure.locale, None, failure.reason);
    }

    // Target order keeps the output deterministic.
    for locale in &target_locales {
        if let Some(translated) = batch.successes.get(locale) {
            write_translation(
                config,
                source_path,
                &source_map,
                locale,
                translated,
                &mut report,
            )
            .await;
        }
    }

    report
}

/// Process every source file in order and collect the reports.
pub async fn run_generation(
    service: &dyn TranslationService,
    config: &Config,
    sources: &[PathBuf],
) -> RunReport {
    let header = RunHeader {
        source_locale: config.source_locale.clone(),
        configured_targets: config.target_locales.clone(),
        auto_detect_target_locales: config.auto_detect_target_locales,
        model: config.model.clone(),
    };

    let total = sources.len();
    let mut reports = Vec::with_capacity(total);
    for (index, source) in sources.iter().enumerate() {
        info!(
            "Processing {} ({}/{})",
            base_name(source),
            index + 1,
            total
        );
        let report = process_source_file(service, config, source).await;
        if report.has_failures() {
            warn!(
                "{} finished with {} failures",
                base_name(source),
                report.failures.len()
            );
        }
        reports.push(report);
    }

    RunReport::new(header, reports)
}

/// Where a locale listed by [`detect_locales`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleOrigin {
    Detected,
    Configured,
}

impl fmt::Display for LocaleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocaleOrigin::Detected => f.write_str("detected"),
            LocaleOrigin::Configured => f.write_str("configured"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedLocale {
    pub code: String,
    pub origin: LocaleOrigin,
}

/// List the configured target locales together with every locale that can
/// be detected from `paths`: siblings of each path plus the locale encoded
/// in each file name. A locale found both ways is labelled detected.
pub async fn detect_locales(config: &Config, paths: &[PathBuf]) -> Vec<DetectedLocale> {
    let mut detected = LocaleSet::new();

    for path in paths {
        match list_sibling_files(path).await {
            Ok(siblings) => {
                for locale in infer_from_sibling_names(path, &siblings, &config.source_locale).iter() {
                    detected.insert(locale);
                }
            }
            Err(e) => warn!("{}", e),
        }

        for locale in extract_locale_candidates(&base_name(path), &config.source_locale) {
            detected.insert(&locale);
        }
    }

    let detected_codes: Vec<&str> = detected.iter().collect();
    merge_target_locales(&config.target_locales, &detected_codes, &config.source_locale)
        .into_vec()
        .into_iter()
        .map(|code| {
            let is_detected = detected.contains(&code);
            DetectedLocale {
                origin: if is_detected {
                    LocaleOrigin::Detected
                } else {
                    LocaleOrigin::Configured
                },
                code,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::TranslationRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Echoes the source map back with each value prefixed by the locale.
    struct EchoService {
        calls: AtomicUsize,
    }

    impl EchoService {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TranslationService for EchoService {
        async fn translate(&self, request: &TranslationRequest<'_>) -> Result<String, LocaleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Reverse key order to prove output follows the source order
            let translated: IndexMap<&String, String> = request
                .source_map
                .iter()
                .rev()
                .map(|(k, v)| (k, format!("[{}] {}", request.target_locale, v)))
                .collect();
            serde_json::to_string(&translated).map_err(|e| LocaleError::Service(e.to_string()))
        }
    }

    fn test_config(targets: &[&str]) -> Config {
        Config {
            target_locales: targets.iter().map(|t| t.to_string()).collect(),
            auto_detect_target_locales: false,
            ..Config::default()
        }
    }

    // ==================== Rendering Tests ====================

    #[test]
    fn test_render_locale_json_uses_source_order() {
        let source: LocaleMap = [("b", "B"), ("a", "A")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let translated: LocaleMap = [("a", "Ah"), ("b", "Be")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let json = render_locale_json(&source, &translated).unwrap();
        assert_eq!(json, "{\n  \"b\": \"Be\",\n  \"a\": \"Ah\"\n}\n");
    }

    // ==================== Processing Tests ====================

    #[tokio::test]
    async fn test_process_writes_target_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");
        std::fs::write(&source, r#"{"title": "Hello {name}", "bye": "Bye"}"#).unwrap();

        let service = EchoService::new();
        let report = process_source_file(&service, &test_config(&["es", "fr"]), &source).await;

        assert!(report.failures.is_empty(), "{:?}", report.failures);
        assert_eq!(
            report.generated,
            vec![temp_dir.path().join("es.json"), temp_dir.path().join("fr.json")]
        );
        let written = std::fs::read_to_string(temp_dir.path().join("es.json")).unwrap();
        assert_eq!(
            written,
            "{\n  \"title\": \"[es] Hello {name}\",\n  \"bye\": \"[es] Bye\"\n}\n"
        );
    }

    #[tokio::test]
    async fn test_process_keeps_existing_file_when_overwrite_disabled() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");
        let existing = temp_dir.path().join("es.json");
        std::fs::write(&source, r#"{"title": "Hello"}"#).unwrap();
        std::fs::write(&existing, b"{\"title\": \"hand tuned\"}").unwrap();

        let config = Config {
            overwrite_existing: false,
            ..test_config(&["es"])
        };
        let report = process_source_file(&EchoService::new(), &config, &source).await;

        assert!(report.generated.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].starts_with("Skipped existing file"));
        assert_eq!(
            std::fs::read(&existing).unwrap(),
            b"{\"title\": \"hand tuned\"}".to_vec()
        );
    }

    #[tokio::test]
    async fn test_process_overwrites_by_default() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");
        let existing = temp_dir.path().join("es.json");
        std::fs::write(&source, r#"{"title": "Hello"}"#).unwrap();
        std::fs::write(&existing, "{}").unwrap();

        let report = process_source_file(&EchoService::new(), &test_config(&["es"]), &source).await;

        assert_eq!(report.generated, vec![existing.clone()]);
        assert!(std::fs::read_to_string(&existing).unwrap().contains("[es] Hello"));
    }

    #[tokio::test]
    async fn test_process_unrecognised_name_skips_without_failing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("strings.json");
        std::fs::write(&source, r#"{"title": "Hello"}"#).unwrap();

        let report = process_source_file(&EchoService::new(), &test_config(&["es"]), &source).await;

        assert!(report.failures.is_empty());
        assert!(report.generated.is_empty());
        assert_eq!(
            report.skipped,
            vec!["Could not derive target path for es from strings.json".to_string()]
        );
    }

    #[tokio::test]
    async fn test_process_write_error_is_locale_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");
        std::fs::write(&source, r#"{"title": "Hello"}"#).unwrap();
        // A directory where the file should go makes the write fail
        std::fs::create_dir(temp_dir.path().join("fr.json")).unwrap();

        let report =
            process_source_file(&EchoService::new(), &test_config(&["es", "fr"]), &source).await;

        assert_eq!(report.generated, vec![temp_dir.path().join("es.json")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].locale.as_deref(), Some("fr"));
        assert_eq!(
            report.failures[0].target_path,
            Some(temp_dir.path().join("fr.json"))
        );
    }

    #[tokio::test]
    async fn test_process_invalid_source_aborts_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");
        std::fs::write(&source, r#"{"nested": {"a": "b"}}"#).unwrap();

        let service = EchoService::new();
        let report = process_source_file(&service, &test_config(&["es"]), &source).await;

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].locale.is_none());
        assert!(report.failures[0].reason.contains("\"nested\""));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_process_missing_source_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");

        let report = process_source_file(&EchoService::new(), &test_config(&["es"]), &source).await;

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0]
            .reason
            .starts_with("Failed to read source file"));
    }

    #[tokio::test]
    async fn test_process_no_targets() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");
        std::fs::write(&source, r#"{"title": "Hello"}"#).unwrap();

        let service = EchoService::new();
        let report = process_source_file(&service, &test_config(&[]), &source).await;

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("No target locales"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_process_auto_detects_sibling_locales() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");
        std::fs::write(&source, r#"{"title": "Hello"}"#).unwrap();
        std::fs::write(temp_dir.path().join("ar.json"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("package.json"), "{}").unwrap();
        std::fs::create_dir(temp_dir.path().join("de.json")).unwrap();

        let config = Config {
            auto_detect_target_locales: true,
            ..test_config(&["es"])
        };
        let report = process_source_file(&EchoService::new(), &config, &source).await;

        assert!(report.failures.is_empty(), "{:?}", report.failures);
        assert_eq!(
            report.generated,
            vec![temp_dir.path().join("es.json"), temp_dir.path().join("ar.json")]
        );
    }

    #[tokio::test]
    async fn test_process_accepts_byte_order_mark() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");
        std::fs::write(&source, "\u{feff}{\"a\": \"A\"}").unwrap();

        let report = process_source_file(&EchoService::new(), &test_config(&["es"]), &source).await;

        assert!(report.failures.is_empty(), "{:?}", report.failures);
        assert_eq!(report.generated, vec![temp_dir.path().join("es.json")]);
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("es.json")).unwrap(),
            "{\n  \"a\": \"[es] A\"\n}\n"
        );
    }

    #[tokio::test]
    async fn test_list_sibling_files_only_regular_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("en.json"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("fr.json"), "{}").unwrap();
        std::fs::create_dir(temp_dir.path().join("de.json")).unwrap();

        let mut names = list_sibling_files(&temp_dir.path().join("en.json"))
            .await
            .expect("Should list siblings");
        names.sort();

        assert_eq!(names, vec!["en.json", "fr.json"]);
    }

    #[tokio::test]
    async fn test_list_sibling_files_surfaces_errors() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("gone/en.json");

        let err = list_sibling_files(&missing).await.unwrap_err();

        assert!(err.to_string().starts_with("Could not scan sibling files in"));
    }

    // ==================== Run Tests ====================

    #[tokio::test]
    async fn test_run_generation_processes_in_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir(temp_dir.path().join("b")).unwrap();
        std::fs::create_dir(temp_dir.path().join("a")).unwrap();
        let first = temp_dir.path().join("b/en.json");
        let second = temp_dir.path().join("a/en.json");
        std::fs::write(&first, r#"{"x": "X"}"#).unwrap();
        std::fs::write(&second, "not json").unwrap();

        let run = run_generation(
            &EchoService::new(),
            &test_config(&["es"]),
            &[first.clone(), second.clone()],
        )
        .await;

        assert_eq!(run.reports.len(), 2);
        assert_eq!(run.reports[0].source_path, first);
        assert_eq!(run.reports[1].source_path, second);
        assert_eq!(run.totals.generated, 1);
        assert_eq!(run.totals.failures, 1);
    }

    // ==================== Detection Tests ====================

    #[tokio::test]
    async fn test_detect_locales_labels_origin() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("en.json");
        std::fs::write(&source, "{}").unwrap();
        std::fs::write(temp_dir.path().join("es.json"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("ja.json"), "{}").unwrap();

        let detected = detect_locales(&test_config(&["es", "fr"]), &[source]).await;

        assert_eq!(
            detected,
            vec![
                DetectedLocale {
                    code: "es".to_string(),
                    origin: LocaleOrigin::Detected
                },
                DetectedLocale {
                    code: "fr".to_string(),
                    origin: LocaleOrigin::Configured
                },
                DetectedLocale {
                    code: "ja".to_string(),
                    origin: LocaleOrigin::Detected
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_detect_locales_uses_file_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("de.json");
        std::fs::write(&target, "{}").unwrap();

        let detected = detect_locales(&test_config(&[]), &[target]).await;

        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].code, "de");
        assert_eq!(detected[0].origin, LocaleOrigin::Detected);
    }
}
