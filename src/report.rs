//! Per-source-file outcome reports and run totals.
//!
//! Reports for different source files are kept side by side in the order the
//! files were processed; they are never merged.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A failure recorded against one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFileFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<PathBuf>,
    pub reason: String,
}

impl fmt::Display for SourceFileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(locale) = &self.locale {
            write!(f, "[{}] ", locale)?;
        }
        if let Some(path) = &self.target_path {
            write!(f, "{}: ", path.display())?;
        }
        f.write_str(&self.reason)
    }
}

/// Everything that happened while processing one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFileReport {
    pub source_path: PathBuf,
    pub generated: Vec<PathBuf>,
    pub skipped: Vec<String>,
    pub failures: Vec<SourceFileFailure>,
}

impl SourceFileReport {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            generated: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Record a failure that is not tied to any locale (e.g. unreadable source).
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.failures.push(SourceFileFailure {
            locale: None,
            target_path: None,
            reason: reason.into(),
        });
    }

    /// Record a failure for one target locale.
    pub fn fail_locale(
        &mut self,
        locale: impl Into<String>,
        target_path: Option<PathBuf>,
        reason: impl Into<String>,
    ) {
        self.failures.push(SourceFileFailure {
            locale: Some(locale.into()),
            target_path,
            reason: reason.into(),
        });
    }

    pub fn skip(&mut self, notice: impl Into<String>) {
        self.skipped.push(notice.into());
    }

    pub fn generate(&mut self, path: PathBuf) {
        self.generated.push(path);
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for SourceFileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source_path.display())?;

        if !self.generated.is_empty() {
            writeln!(f, "  Generated:")?;
            for path in &self.generated {
                writeln!(f, "    - {}", path.display())?;
            }
        }

        if !self.skipped.is_empty() {
            writeln!(f, "  Skipped:")?;
            for notice in &self.skipped {
                writeln!(f, "    - {}", notice)?;
            }
        }

        if !self.failures.is_empty() {
            writeln!(f, "  Failures:")?;
            for failure in &self.failures {
                writeln!(f, "    - {}", failure)?;
            }
        }

        Ok(())
    }
}

/// Summed counts across all reports of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub generated: usize,
    pub skipped: usize,
    pub failures: usize,
}

impl fmt::Display for RunTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated: {}, Skipped: {}, Failures: {}",
            self.generated, self.skipped, self.failures
        )
    }
}

/// Settings echoed at the top of a run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunHeader {
    pub source_locale: String,
    pub configured_targets: Vec<String>,
    pub auto_detect_target_locales: bool,
    pub model: String,
}

impl fmt::Display for RunHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets = if self.configured_targets.is_empty() {
            "(none)".to_string()
        } else {
            self.configured_targets.join(", ")
        };
        writeln!(f, "Source locale: {}", self.source_locale)?;
        writeln!(f, "Configured targets: {}", targets)?;
        writeln!(
            f,
            "Auto-detect targets: {}",
            if self.auto_detect_target_locales { "on" } else { "off" }
        )?;
        writeln!(f, "Model: {}", self.model)
    }
}

/// All reports of one run, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub header: RunHeader,
    pub reports: Vec<SourceFileReport>,
    pub totals: RunTotals,
}

impl RunReport {
    pub fn new(header: RunHeader, reports: Vec<SourceFileReport>) -> Self {
        let totals = reports.iter().fold(RunTotals::default(), |acc, r| RunTotals {
            generated: acc.generated + r.generated.len(),
            skipped: acc.skipped + r.skipped.len(),
            failures: acc.failures + r.failures.len(),
        });
        Self {
            header,
            reports,
            totals,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.totals.failures > 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for report in &self.reports {
            writeln!(f, "{}", report)?;
        }
        write!(f, "Complete. {}", self.totals)
    }
}
