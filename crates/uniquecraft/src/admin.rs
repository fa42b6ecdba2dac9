//! # Admin Commands
//!
//! The `/uniquecraft` command surface.
//!
//! ```text
//! /uniquecraft              help
//! /uniquecraft reload       re-read the store, re-register   (uniquecrafts.reload)
//! /uniquecraft list         every recipe and its status
//! /uniquecraft reset <id>   make a crafted recipe available  (uniquecrafts.reset)
//! /uniquecraft debug        host registrations and store info
//! ```
//!
//! Replies are returned as rendered lines so the host decides how to deliver
//! them; [`AdminCommands::dispatch`] sends them straight to the sender.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uniquecraft_core::config::render_template;
use uniquecraft_core::{CraftRegistry, CraftingHost, Party, RecipeId, ResetOutcome};

/// Root command name.
pub const COMMAND_NAME: &str = "uniquecraft";

/// Permission required for `reload`.
pub const RELOAD_PERMISSION: &str = "uniquecrafts.reload";

/// Permission required for `reset`.
pub const RESET_PERMISSION: &str = "uniquecrafts.reset";

/// Subcommands offered by tab completion, in display order.
pub const SUBCOMMANDS: [&str; 4] = ["reload", "list", "reset", "debug"];

/// A parsed admin command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminCommand {
    /// No arguments: print usage.
    Help,
    /// Re-read the store and re-register recipes.
    Reload,
    /// List recipes with their status.
    List,
    /// Reset a recipe. `None` when the id argument is missing.
    Reset(Option<RecipeId>),
    /// Dump host and store state.
    Debug,
}

/// Command parse failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
    /// First argument is not a known subcommand.
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),
}

impl AdminCommand {
    /// Parses arguments following the root command. Subcommands are
    /// case-insensitive; recipe ids are taken verbatim.
    ///
    /// # Errors
    ///
    /// `UnknownSubcommand` if the first argument is not recognized.
    pub fn parse(args: &[&str]) -> Result<Self, AdminError> {
        let Some(sub) = args.first() else {
            return Ok(Self::Help);
        };
        match sub.to_ascii_lowercase().as_str() {
            "reload" => Ok(Self::Reload),
            "list" => Ok(Self::List),
            "reset" => Ok(Self::Reset(args.get(1).map(|id| RecipeId::from(*id)))),
            "debug" => Ok(Self::Debug),
            _ => Err(AdminError::UnknownSubcommand((*sub).to_string())),
        }
    }

    /// Permission the sender must hold, if any.
    #[must_use]
    pub fn permission(&self) -> Option<&'static str> {
        match self {
            Self::Reload => Some(RELOAD_PERMISSION),
            Self::Reset(_) => Some(RESET_PERMISSION),
            Self::Help | Self::List | Self::Debug => None,
        }
    }
}

/// Executes admin commands against a registry.
pub struct AdminCommands {
    registry: Arc<CraftRegistry>,
}

impl AdminCommands {
    /// Creates the command handler.
    #[must_use]
    pub fn new(registry: Arc<CraftRegistry>) -> Self {
        Self { registry }
    }

    /// Runs a command and sends every reply line to `sender`.
    pub fn dispatch(&self, sender: &dyn Party, args: &[&str], host: &dyn CraftingHost) {
        for line in self.execute(sender, args, host) {
            sender.send_message(&line);
        }
    }

    /// Runs a command and returns the reply lines.
    #[must_use]
    pub fn execute(&self, sender: &dyn Party, args: &[&str], host: &dyn CraftingHost) -> Vec<String> {
        let command = match AdminCommand::parse(args) {
            Ok(command) => command,
            Err(e) => {
                let mut lines = vec![format!("§c{e}")];
                lines.extend(help_lines());
                return lines;
            }
        };

        if let Some(permission) = command.permission() {
            if !sender.has_permission(permission) {
                warn!("{} lacks {permission}", sender.name());
                let messages = &self.registry.config().messages;
                return vec![render_template(&messages.no_permission, sender.name())];
            }
        }

        match command {
            AdminCommand::Help => help_lines(),
            AdminCommand::Reload => self.reload(sender, host),
            AdminCommand::List => self.list(),
            AdminCommand::Reset(None) => vec![format!("§cUsage: /{COMMAND_NAME} reset <craft_id>")],
            AdminCommand::Reset(Some(id)) => self.reset(sender, &id),
            AdminCommand::Debug => self.debug(host),
        }
    }

    /// Completion candidates for the argument currently being typed.
    ///
    /// `args` holds every argument so far, the last one possibly partial.
    #[must_use]
    pub fn complete(&self, args: &[&str]) -> Vec<String> {
        match args {
            [partial] => {
                let partial = partial.to_ascii_lowercase();
                SUBCOMMANDS
                    .iter()
                    .filter(|sub| sub.starts_with(&partial))
                    .map(|sub| (*sub).to_string())
                    .collect()
            }
            [sub, partial] if sub.eq_ignore_ascii_case("reset") => self
                .registry
                .catalogue()
                .ids()
                .filter(|id| id.as_str().starts_with(*partial))
                .map(ToString::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn reload(&self, sender: &dyn Party, host: &dyn CraftingHost) -> Vec<String> {
        info!("{} requested a reload", sender.name());
        match self.registry.reload(host) {
            Ok(report) => {
                let messages = &self.registry.config().messages;
                let mut lines = vec![render_template(&messages.reloaded, sender.name())];
                if !report.skipped.is_empty() || !report.rejected.is_empty() {
                    lines.push(format!(
                        "§e{} recipes skipped, {} rejected by the server (see log)",
                        report.skipped.len(),
                        report.rejected.len()
                    ));
                }
                lines
            }
            Err(e) => vec![format!("§cReload failed, previous configuration kept: {e}")],
        }
    }

    fn list(&self) -> Vec<String> {
        let statuses = self.registry.statuses();
        if statuses.is_empty() {
            return vec!["§cNo crafts configured!".to_string()];
        }

        let mut lines = Vec::with_capacity(statuses.len() + 2);
        lines.push("§6=== Unique crafts ===".to_string());
        for status in &statuses {
            let label = if status.available {
                "§aAvailable"
            } else {
                "§cAlready crafted"
            };
            lines.push(format!("§e- {}: {label}", status.id));
        }
        lines.push(format!("§eTotal: {} crafts", statuses.len()));
        lines
    }

    fn reset(&self, sender: &dyn Party, id: &RecipeId) -> Vec<String> {
        match self.registry.reset(id) {
            ResetOutcome::NotClaimed => vec![format!("§cCraft {id} has not been crafted yet!")],
            ResetOutcome::Released { persisted } => {
                info!("{} reset craft {id}", sender.name());
                let mut lines = vec![format!("§aCraft {id} reset!")];
                if !persisted {
                    lines.push("§eThe reset could not be saved yet and will be retried.".to_string());
                }
                lines
            }
        }
    }

    fn debug(&self, host: &dyn CraftingHost) -> Vec<String> {
        let scheme = self.registry.scheme();
        let keys = host.registered_keys();
        let ours = keys.iter().filter(|key| scheme.owns(key)).count();

        let mut lines = vec![
            "§6=== DEBUG UniqueCrafts ===".to_string(),
            "§eShaped recipes on the server:".to_string(),
        ];
        lines.extend(keys.iter().map(|key| format!("§7- {key}")));
        lines.push(format!("§eTotal shaped recipes: {}", keys.len()));
        lines.push(format!("§eUnique crafts registered: {ours}"));

        let catalogue = self.registry.catalogue();
        lines.push("§6Configured crafts:".to_string());
        lines.extend(catalogue.ids().map(|id| format!("§7- {id}")));
        lines.push(format!("§eTotal in config: {}", catalogue.len()));

        let store = &self.registry.config().store_path;
        lines.push(format!("§6Store {} exists: {}", store.display(), store.exists()));
        if self.registry.ledger().has_pending_changes() {
            lines.push("§cLedger has unflushed changes".to_string());
        }
        lines
    }
}

/// Usage text shown for the bare command.
#[must_use]
pub fn help_lines() -> Vec<String> {
    vec![
        "§6=== UniqueCrafts ===".to_string(),
        format!("§e/{COMMAND_NAME} reload - Reload the configuration"),
        format!("§e/{COMMAND_NAME} list - List configured crafts"),
        format!("§e/{COMMAND_NAME} reset <id> - Make a craft available again"),
        format!("§e/{COMMAND_NAME} debug - Debug information"),
    ]
}
