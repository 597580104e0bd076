mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use datamirror::{HandlerRegistry, PathOptions};
use datamirror_ledger::MirrorLedger;
use datamirror_oceandata::OceandataHandler;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, SourceEntry};

#[derive(Parser)]
#[command(name = "datamirror")]
#[command(about = "Mirror scientific data files from remote providers")]
struct Cli {
    /// Config file (defaults to ~/.config/datamirror/sources.toml)
    #[arg(long, global = true, env = "DATAMIRROR_CONFIG")]
    config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mirror every enabled source (or one) into its local root
    Sync {
        /// Only sync the source with this label
        #[arg(long)]
        source: Option<String>,
        /// Decide what would be fetched without transferring anything
        #[arg(long)]
        dry_run: bool,
        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the remote listing of a configured source
    List {
        /// Source label
        label: String,
    },
    /// Print the local path a remote URL or file name maps to
    Map {
        /// Remote URLs or bare file names
        #[arg(required = true)]
        locators: Vec<String>,
        /// Print the directory only
        #[arg(long)]
        path_only: bool,
        /// Path separator
        #[arg(long, default_value_t = '/')]
        separator: char,
        /// Handler whose naming conventions apply
        #[arg(long, default_value = datamirror_oceandata::HANDLER_NAME)]
        handler: String,
        /// Also print a readable description of each file name
        #[arg(long)]
        describe: bool,
    },
    /// Show when each source last synced
    Status,
    /// List registered handlers
    Handlers,
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("could not determine cache directory")?;
    let dir = base.join("datamirror");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create cache directory: {}", dir.display()))?;
    Ok(dir)
}

fn ledger_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join("ledger.db"))
}

fn open_ledger(label: &str) -> Result<MirrorLedger> {
    let path = ledger_path()?;
    MirrorLedger::open(&path, label).map_err(|e| anyhow::anyhow!("{e}"))
}

fn build_registry(config: &AppConfig) -> Result<HandlerRegistry> {
    let oceandata = OceandataHandler::new(config.oceandata.handler_config())
        .context("failed to build oceandata HTTP client")?;
    Ok(HandlerRegistry::new().with(Arc::new(oceandata)))
}

fn find_source<'a>(config: &'a AppConfig, label: &str) -> Result<&'a SourceEntry> {
    config
        .sources
        .iter()
        .find(|s| s.label == label)
        .with_context(|| format!("no source labelled `{label}` in config"))
}

async fn sync_one(
    registry: &HandlerRegistry,
    entry: &SourceEntry,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let handler = registry.resolve(&entry.handler)?;
    let ledger = open_ledger(&entry.label)?;
    commands::sync::run(&ledger, handler.as_ref(), &entry.descriptor(dry_run), json).await?;
    Ok(())
}

async fn sync_sources(
    config: &AppConfig,
    registry: &HandlerRegistry,
    only: Option<&str>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let entries: Vec<&SourceEntry> = match only {
        Some(label) => vec![find_source(config, label)?],
        None => config.sources.iter().filter(|s| s.enabled).collect(),
    };
    if entries.is_empty() {
        anyhow::bail!("no enabled sources configured");
    }

    let total = entries.len();
    let mut failed = 0usize;

    for entry in entries {
        if let Err(e) = sync_one(registry, entry, dry_run, json).await {
            eprintln!("warning: sync failed for [{}]: {e}", entry.label);
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} source(s) failed to sync");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let config = match &cli.command {
        Command::Map { .. } | Command::Handlers => {
            config::load_optional_config(cli.config.as_deref())?
        }
        _ => config::load_config(cli.config.as_deref())?,
    };
    tracing::debug!(sources = config.sources.len(), "configuration loaded");
    let registry = build_registry(&config)?;

    match cli.command {
        Command::Sync {
            source,
            dry_run,
            json,
        } => sync_sources(&config, &registry, source.as_deref(), dry_run, json).await,
        Command::List { label } => {
            let entry = find_source(&config, &label)?;
            let handler = registry.resolve(&entry.handler)?;
            commands::list::run(handler.as_ref(), &entry.descriptor(true)).await
        }
        Command::Map {
            locators,
            path_only,
            separator,
            handler,
            describe,
        } => {
            let resolved = registry.resolve(&handler)?;
            let options = PathOptions {
                path_only,
                separator,
            };
            let describe_oceandata = |locator: &str| {
                datamirror_oceandata::parse(locator)
                    .ok()
                    .map(|parsed| parsed.describe())
            };
            let describer: Option<&dyn Fn(&str) -> Option<String>> =
                if describe && handler == datamirror_oceandata::HANDLER_NAME {
                    Some(&describe_oceandata)
                } else {
                    None
                };
            commands::map::run(resolved.as_ref(), &locators, &options, describer)
        }
        Command::Status => {
            if config.sources.is_empty() {
                println!("No sources configured.");
                return Ok(());
            }
            for entry in &config.sources {
                let ledger = open_ledger(&entry.label)?;
                commands::status::run(&ledger, entry.enabled)?;
            }
            Ok(())
        }
        Command::Handlers => {
            commands::handlers::run(&registry);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_defaults_to_info() {
        let cli = Cli::try_parse_from(["datamirror", "handlers"]).unwrap();
        assert_eq!(cli.log_level, "info");
        assert!(!cli.log_json);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "datamirror",
            "sync",
            "--dry-run",
            "--log-level",
            "debug",
            "--config",
            "/tmp/sources.toml",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sources.toml")));
        assert!(matches!(cli.command, Command::Sync { dry_run: true, .. }));
    }
}
