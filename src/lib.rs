// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod present;
pub mod types;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{Settings, load_for_cli};
use crate::engine::Runtime;
use crate::errors::Result;
use crate::exec::ShellRunner;
use crate::present::{BatchSummary, Printer};
use crate::types::parse_commands;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI/config merging
/// - command list parsing
/// - the batch runtime with the real shell runner
/// - Ctrl-C handling (cancels queued and running commands)
/// - the stdout printer
pub async fn run(args: CliArgs) -> Result<BatchSummary> {
    let file = load_for_cli(args.config.as_deref())?;
    let settings = Settings::resolve(&args, &file);
    debug!(?settings, "resolved settings");

    let commands = parse_commands(
        &args.commands,
        &settings.name_separator,
        args.names.as_deref(),
    )?;

    let cancel = CancellationToken::new();

    // Ctrl-C → cancel the batch.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; cancelling batch");
            cancel.cancel();
        });
    }

    let runtime = Runtime::new(Arc::new(ShellRunner), settings.batch_options(), cancel);
    let stream = runtime.start(commands);

    let mut printer = Printer::new(tokio::io::stdout(), settings.present_options());
    let summary = printer.consume(stream).await?;

    info!(outcome = ?summary.outcome, "batch finished");
    Ok(summary)
}
