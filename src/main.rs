use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use localeforge::config::{ApiKey, Config};
use localeforge::discovery::{collect_source_files, SourceMatcher};
use localeforge::pipeline::{detect_locales, run_generation};
use localeforge::OpenAiTranslator;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "localeforge",
    version,
    about = "Generate per-locale JSON translation files with an LLM"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate source locale files into every target locale
    Generate {
        /// Source files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Extra root directories for relative pattern matching
        #[arg(long)]
        root: Vec<PathBuf>,
        /// Print the run report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        #[command(flatten)]
        overrides: Overrides,
    },

    /// List configured target locales and those detected next to the given files
    Detect {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command-line values that take precedence over the environment.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Target locales (comma separated or repeated)
    #[arg(long = "target", value_delimiter = ',')]
    targets: Vec<String>,
    #[arg(long)]
    source_locale: Option<String>,
    /// Use only the configured target locales
    #[arg(long, default_value_t = false)]
    no_auto_detect: bool,
    #[arg(long)]
    model: Option<String>,
    /// Maximum translation requests in flight
    #[arg(long)]
    concurrency: Option<usize>,
    /// Source file glob patterns (comma separated or repeated)
    #[arg(long = "pattern", value_delimiter = ',')]
    patterns: Vec<String>,
    /// Keep existing target files instead of replacing them
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

impl Overrides {
    fn apply(&self, config: Config) -> Config {
        let targets: &[String] = if self.targets.is_empty() {
            &config.target_locales
        } else {
            &self.targets
        };
        let patterns: &[String] = if self.patterns.is_empty() {
            &config.file_patterns
        } else {
            &self.patterns
        };

        Config::sanitized(
            self.source_locale.as_deref().unwrap_or(&config.source_locale),
            targets,
            config.auto_detect_target_locales && !self.no_auto_detect,
            patterns,
            config.overwrite_existing && !self.no_overwrite,
            self.model.as_deref().unwrap_or(&config.model),
            self.concurrency.unwrap_or(config.concurrency),
            &config.openai_api_url,
            config.request_timeout,
        )
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Expand `paths` into source locale files. Given directories, `--root`
/// values and the current directory all count as roots.
fn discover_sources(
    config: &Config,
    cwd: &Path,
    paths: &[PathBuf],
    extra_roots: &[PathBuf],
) -> Vec<PathBuf> {
    let inputs: Vec<PathBuf> = paths.iter().map(|p| absolute(cwd, p)).collect();
    let mut roots: Vec<PathBuf> = inputs.iter().filter(|p| p.is_dir()).cloned().collect();
    roots.extend(extra_roots.iter().map(|p| absolute(cwd, p)));
    roots.push(cwd.to_path_buf());

    let matcher = SourceMatcher::new(config, &roots);
    collect_source_files(&inputs, &matcher)
}

async fn generate(
    config: Config,
    paths: &[PathBuf],
    extra_roots: &[PathBuf],
    json: bool,
) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let sources = discover_sources(&config, &cwd, paths, extra_roots);
    if sources.is_empty() {
        warn!("No source locale files found");
        return Ok(ExitCode::SUCCESS);
    }
    info!("Found {} source locale files", sources.len());

    let api_key = ApiKey::from_env()?;
    let translator = OpenAiTranslator::from_config(&config, api_key)?;
    let run = run_generation(&translator, &config, &sources).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        println!("{}", run);
    }

    if run.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn detect(config: Config, paths: &[PathBuf], json: bool) -> Result<ExitCode> {
    let locales = detect_locales(&config, paths).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&locales)?);
    } else if locales.is_empty() {
        println!("No target locales configured or detected.");
    } else {
        for locale in &locales {
            println!("{}\t{}", locale.code, locale.origin);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("localeforge=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let env_config = Config::from_env()?;

    match cli.cmd {
        Commands::Generate {
            paths,
            root,
            json,
            overrides,
        } => {
            let config = overrides.apply(env_config);
            info!(
                "Generating from {} into {:?} (auto-detect {}, model {})",
                config.source_locale,
                config.target_locales,
                config.auto_detect_target_locales,
                config.model
            );
            generate(config, &paths, &root, json).await
        }
        Commands::Detect {
            paths,
            json,
            overrides,
        } => detect(overrides.apply(env_config), &paths, json).await,
    }
}
