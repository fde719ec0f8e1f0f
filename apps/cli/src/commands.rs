//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use srsguard_core::{CheckReport, ProgressReporter, Services, Upload, check_document};
use srsguard_server::CheckResponse;
use srsguard_server::upload::validate_filename;
use srsguard_shared::{
    AppConfig, init_config, init_config_at, load_config, load_config_from, validate_api_key,
};
use srsguard_storage::Storage;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SRS Guard: flag near-duplicate SRS submissions.
#[derive(Parser)]
#[command(
    name = "srsguard",
    version,
    about = "Detect near-duplicate SRS PDF submissions against a corpus of prior documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.srsguard/srsguard.toml.
    #[arg(long, global = true, env = "SRSGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to bind (overrides server.host).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check one PDF against the corpus and print the result as JSON.
    Check {
        /// Path to the PDF.
        file: PathBuf,
    },

    /// Inspect the corpus.
    Corpus {
        #[command(subcommand)]
        action: CorpusAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Corpus subcommands.
#[derive(Subcommand)]
pub(crate) enum CorpusAction {
    /// List stored documents.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show document count and index settings.
    Stats,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default config file.
    ///
    /// Writes to `--config` (or `SRSGUARD_CONFIG`) when given, otherwise to
    /// ~/.srsguard/srsguard.toml. An existing file is kept unless --force.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "srsguard=info",
        1 => "srsguard=debug,tower_http=debug",
        _ => "srsguard=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Serve { host, port } => {
            cmd_serve(resolve_config(config_path.as_deref())?, host, port).await
        }
        Command::Check { file } => cmd_check(resolve_config(config_path.as_deref())?, &file).await,
        Command::Corpus { action } => {
            let config = resolve_config(config_path.as_deref())?;
            match action {
                CorpusAction::List { json } => cmd_corpus_list(&config, json).await,
                CorpusAction::Stats => cmd_corpus_stats(&config).await,
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Init { force } => cmd_config_init(config_path.as_deref(), force).await,
            ConfigAction::Show => cmd_config_show(resolve_config(config_path.as_deref())?).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    // Fail before binding if the key is missing
    validate_api_key(&config)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let services = Services::from_config(&config).await?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        chat_model = %config.openai.chat_model,
        embedding_model = %config.openai.embedding_model,
        "starting plagiarism detection service"
    );

    srsguard_server::serve(&config.server, services)
        .await
        .map_err(|e| eyre!("server error: {e}"))?;
    Ok(())
}

async fn cmd_check(config: AppConfig, file: &Path) -> Result<()> {
    validate_api_key(&config)?;

    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string());
    let filename = validate_filename(filename.as_deref())?;

    let bytes = std::fs::read(file).map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;
    if bytes.len() > config.server.max_upload_bytes {
        return Err(eyre!(
            "'{}' is {} bytes, over the {} byte upload limit",
            file.display(),
            bytes.len(),
            config.server.max_upload_bytes
        ));
    }

    let services = Services::from_config(&config).await?;
    let reporter = CliProgress::new();
    let report = check_document(&services, Upload { filename, bytes }, &reporter).await?;

    let json = serde_json::to_string_pretty(&CheckResponse::from(&report))?;
    println!("{json}");
    Ok(())
}

async fn cmd_corpus_list(config: &AppConfig, json: bool) -> Result<()> {
    let storage = Storage::open_readonly(&config.corpus_path()?).await?;
    let entries = storage.list_documents().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Corpus is empty.");
        return Ok(());
    }

    println!("{:<36}  {:<20}  {:>10}  {:<30}", "ID", "ADDED", "BYTES", "FILE");
    for entry in &entries {
        println!(
            "{:<36}  {:<20}  {:>10}  {:<30}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.file_size,
            entry.source_file
        );
    }
    println!();
    println!("{} document(s)", entries.len());
    Ok(())
}

async fn cmd_corpus_stats(config: &AppConfig) -> Result<()> {
    let path = config.corpus_path()?;
    let storage = Storage::open_readonly(&path).await?;
    let documents = storage.count_documents().await?;

    println!();
    println!("  Path:       {}", path.display());
    println!("  Documents:  {documents}");
    println!("  Dimension:  {}", storage.dimension());
    println!("  Metric:     cosine");
    println!("  Threshold:  {}", srsguard_core::DUPLICATE_THRESHOLD);
    println!();
    Ok(())
}

async fn cmd_config_init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => {
            init_config_at(path, force)?;
            path.to_path_buf()
        }
        None => init_config(force)?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shown while `check` runs.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(format!("{name}..."));
    }

    fn done(&self, report: &CheckReport) {
        let verdict = if report.decision.duplicate_detected {
            "possible duplicate"
        } else {
            "no duplicate"
        };
        self.spinner.finish_with_message(format!(
            "{} checked: {verdict} ({:.1}s)",
            report.source_file,
            report.elapsed.as_secs_f64()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_init_parses_global_config_and_force() {
        let cli = Cli::try_parse_from([
            "srsguard",
            "config",
            "init",
            "--force",
            "--config",
            "/tmp/custom.toml",
        ])
        .expect("parse");
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/custom.toml")));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[tokio::test]
    async fn config_init_writes_to_the_given_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");

        cmd_config_init(Some(&path), false).await.expect("init");
        assert!(load_config_from(&path).is_ok());

        let err = cmd_config_init(Some(&path), false).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        cmd_config_init(Some(&path), true).await.expect("forced init");
    }
}
