//! `uniquecraft_admin` entrypoint. See [`uniquecraft::cli`] for the commands.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use uniquecraft::cli::{self, Cli};

fn init_logging(verbose: u8) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli::log_level(verbose))),
        )
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let status = cli::run(&cli, &mut std::io::stdout().lock())?;
    Ok(ExitCode::from(status))
}
