//! Offline administration of the crafts document.
//!
//! Commands:
//! - `list` - every configured recipe and whether it has been crafted
//! - `check <id>` - availability of one recipe
//! - `reset <id>` - make a crafted recipe available again
//! - `validate` - parse every recipe and report configuration errors
//!
//! Runs without a game server: materials are only checked for syntax. Do not
//! reset while the server is running; its next flush overwrites the store.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use uniquecraft_core::{AnyMaterial, CraftRegistry, RecipeId, ResetOutcome, UniqueCraftConfig};

/// Exit status: success.
pub const EXIT_OK: u8 = 0;

/// Exit status: the recipe is already crafted, or was not crafted for `reset`.
pub const EXIT_UNAVAILABLE: u8 = 1;

/// Exit status: `validate` found invalid recipes.
pub const EXIT_INVALID: u8 = 2;

/// Command line of `uniquecraft_admin`.
#[derive(Debug, Parser)]
#[command(name = "uniquecraft_admin")]
#[command(about = "Inspect and edit the UniqueCraft crafts document")]
#[command(version)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "uniquecraft.toml", global = true)]
    pub config: PathBuf,

    /// Crafts document path, overriding `store_path` from the configuration
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Offline operations.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every recipe with its status
    List,
    /// Show whether one recipe can still be crafted
    Check {
        /// Recipe identifier
        id: String,
    },
    /// Make a crafted recipe available again
    Reset {
        /// Recipe identifier
        id: String,
    },
    /// Report every recipe configuration error
    Validate,
}

/// Default log filter for a `-v` count, used when `RUST_LOG` is unset.
#[must_use]
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Runs one command, writing its report to `out`. Returns the exit status.
///
/// # Errors
///
/// The configuration or crafts document cannot be read, a report line cannot
/// be written, or a reset could not be saved.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<u8> {
    let mut config = UniqueCraftConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(store) = &cli.store {
        config.store_path.clone_from(store);
    }
    debug!("using crafts document {}", config.store_path.display());

    let registry = CraftRegistry::new(config);
    let report = registry
        .load(&AnyMaterial)
        .with_context(|| format!("reading {}", registry.config().store_path.display()))?;

    match &cli.command {
        Commands::List => {
            let statuses = registry.statuses();
            if statuses.is_empty() {
                writeln!(out, "No crafts configured.")?;
            }
            for status in &statuses {
                let label = if status.available { "available" } else { "already crafted" };
                writeln!(out, "{:<32} {label}", status.id.as_str())?;
            }
            writeln!(out, "Total: {} crafts, {} crafted", statuses.len(), report.crafted)?;
            Ok(EXIT_OK)
        }
        Commands::Check { id } => {
            if !registry.catalogue().contains(id) {
                writeln!(out, "{id}: not configured")?;
            }
            if registry.is_available(id) {
                writeln!(out, "{id}: available")?;
                Ok(EXIT_OK)
            } else {
                writeln!(out, "{id}: already crafted")?;
                Ok(EXIT_UNAVAILABLE)
            }
        }
        Commands::Reset { id } => match registry.reset(&RecipeId::new(id.as_str())) {
            ResetOutcome::Released { persisted: true } => {
                writeln!(out, "{id}: reset")?;
                Ok(EXIT_OK)
            }
            ResetOutcome::Released { persisted: false } => {
                anyhow::bail!("{id}: reset could not be written to the crafts document")
            }
            ResetOutcome::NotClaimed => {
                writeln!(out, "{id}: has not been crafted")?;
                Ok(EXIT_UNAVAILABLE)
            }
        },
        Commands::Validate => {
            for error in &report.skipped {
                writeln!(out, "error: {error}")?;
            }
            writeln!(out, "{} valid, {} invalid", report.loaded, report.skipped.len())?;
            if report.skipped.is_empty() {
                Ok(EXIT_OK)
            } else {
                Ok(EXIT_INVALID)
            }
        }
    }
}
