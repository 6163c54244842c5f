mod cli;
mod error;
mod logging;
mod output;

use std::io::{self, Write};
use std::sync::Arc;
use std::process::ExitCode;

use clap::Parser;
use sharecount_core::{Collector, CollectorConfig, PlatformRegistry, ReqwestClientFactory};
use tracing::warn;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let registry = PlatformRegistry::default();
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    if cli.list_platforms {
        output::render_platforms(&mut stdout, &registry, cli.pretty)?;
        return Ok(());
    }

    let urls = cli.urls()?;
    let selection = cli.selection();
    for name in selection.names() {
        if registry.get(name).is_none() {
            warn!(platform = name, "unknown platform in selection, ignoring");
        }
    }

    let config = cli.config(CollectorConfig::from_env());
    let collector = Collector::new(registry, config, Arc::new(ReqwestClientFactory));

    for url in urls {
        let report = collector.collect(&url, &selection).await;
        output::render(&mut stdout, &report, cli.pretty)?;
    }
    stdout.flush()?;

    Ok(())
}
