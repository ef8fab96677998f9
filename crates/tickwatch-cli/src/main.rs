mod cli;
mod error;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tickwatch_core::{AlphaVantageSource, FetchState, QuotePoller, Symbol};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::cli::{Cli, Input};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

/// Logs go to stderr so they never interleave with rendered quotes.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let poller_config = cli.poller_config()?;
    let source = Arc::new(AlphaVantageSource::new(cli.source_config()?));
    info!(config = ?source.config(), "quote source configured");

    let poller = QuotePoller::from_config(
        poller_config,
        source,
        Arc::new(|symbol: &Symbol, state: &FetchState| {
            println!("{} {}", clock(), render::state_line(symbol, state));
        }),
    );
    poller.start_default()?;
    eprintln!("type a symbol to switch, `quit` to exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match Input::parse(&line) {
            Input::Skip => {}
            Input::Quit => break,
            Input::Switch(key) => {
                if let Err(error) = poller.set_key(key) {
                    eprintln!("error: {error}");
                }
            }
        }
    }

    poller.stop();
    info!("tickwatch exiting");
    Ok(())
}

fn clock() -> String {
    let now = OffsetDateTime::now_utc();
    format!("[{:02}:{:02}:{:02}Z]", now.hour(), now.minute(), now.second())
}
