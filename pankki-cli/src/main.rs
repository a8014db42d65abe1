use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pankki_ingest::{normalize_file, write_normalized, write_normalized_csv};
use pankki_ynab::{ArchiveLayout, BudgetSyncClient, SyncOrchestrator, TransactionBuilder};
use std::path::{Path, PathBuf};
use tracing::info;

mod config;
mod credentials;
mod error;
mod logging;
mod state;
mod watcher;

use config::Config;
use watcher::DirectoryWatcher;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PANKKI_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "pankki",
    version,
    long_version = LONG_VERSION,
    about = "Sync S-Bank statement exports into YNAB"
)]
struct Cli {
    /// Config file (default: ~/.pankki/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the downloads directory and sync every export that appears (default)
    Watch,

    /// Run one sync cycle for an export already in place
    Run {
        /// Export to sync (defaults to <work_dir>/export.csv)
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Normalize an export without talking to YNAB
    Normalize {
        #[arg(long)]
        csv: PathBuf,

        /// Write the normalized CSV here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write a default config file
    InitConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_file.as_deref())?;
    info!(version = LONG_VERSION, "pankki starting");

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => {
            let cfg = config::load_config(cli.config.as_deref())?;
            watch(&cfg).await?;
        }

        Command::Run { csv } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let input = match csv {
                Some(p) => p,
                None => cfg.work_file()?,
            };
            if !input.exists() {
                bail!("export not found: {} (pass --csv <path>)", input.display());
            }

            let mut orchestrator = build_orchestrator(&cfg)?;
            let summary = orchestrator.process_file(&input).await?;
            println!(
                "Synced {} transactions from {} ({} already imported)",
                summary.uploaded,
                input.display(),
                summary.duplicate_import_ids.len()
            );
            println!("Normalized CSV: {}", summary.output.display());
            println!("Archived export: {}", summary.archived.display());
        }

        Command::Normalize { csv, out } => {
            normalize(&csv, out.as_deref())?;
        }

        Command::InitConfig => {
            config::init_config(cli.config.as_deref())?;
        }
    }

    Ok(())
}

fn build_orchestrator(cfg: &Config) -> Result<SyncOrchestrator<BudgetSyncClient>> {
    let work_dir = cfg.work_dir()?;
    let creds_path = credentials::credentials_path(&work_dir);
    info!(path = %creds_path.display(), "loading YNAB credentials");
    let creds = credentials::load_credentials(&creds_path)?;
    info!(budget_id = %creds.budget_id, "credentials loaded");

    let client = BudgetSyncClient::with_base_url(creds, &cfg.ynab.base_url);
    let builder = TransactionBuilder::new(&cfg.ynab.account_id, &cfg.ynab.default_category_id);
    Ok(SyncOrchestrator::new(client, builder, ArchiveLayout::under(&work_dir)))
}

async fn watch(cfg: &Config) -> Result<()> {
    let downloads = cfg.downloads_dir()?;
    let mut orchestrator = build_orchestrator(cfg)?;
    let watcher = DirectoryWatcher::new(
        downloads.join(&cfg.watch.filename),
        cfg.work_file()?,
        cfg.poll_interval(),
    );
    watcher.run(&mut orchestrator).await;
    Ok(())
}

fn normalize(csv: &Path, out: Option<&Path>) -> Result<()> {
    let rows = normalize_file(csv).with_context(|| format!("normalizing {}", csv.display()))?;
    match out {
        Some(path) => {
            write_normalized_csv(path, &rows).with_context(|| format!("writing {}", path.display()))?;
            println!("Normalized {} transactions into {}", rows.len(), path.display());
        }
        None => {
            write_normalized(std::io::stdout().lock(), &rows).context("writing to stdout")?;
        }
    }
    Ok(())
}
