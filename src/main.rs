use anyhow::Result;
use clap::Parser;
use std::{
    io::{self, IsTerminal},
    process::ExitCode,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

mod capture;
mod cli;
mod commands;
mod compare;
mod extract;
mod report;
mod snapshot;
mod surface;

use capture::ProcessHelp;
use cli::{Cli, Commands};
use commands::Verdict;
use report::Report;

const EXIT_BREAKING: u8 = 1;
const EXIT_FAILURE: u8 = 2;

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn use_color(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let color = use_color(cli.no_color);
    let mut stdout = io::stdout();

    match cli.command {
        Commands::Snapshot {
            tool,
            output,
            capture,
        } => {
            let source = ProcessHelp::new(Duration::from_secs(capture.timeout));
            commands::snapshot(&source, &tool, output, &capture.args, &mut stdout).await?;
        }
        Commands::Compare { old, new, format } => {
            let report = Report { format, color };
            commands::compare_files(&old, &new, &report, &mut stdout)?;
        }
        Commands::Guard {
            baseline,
            tool,
            capture,
            format,
        } => {
            let report = Report { format, color };
            let source = ProcessHelp::new(Duration::from_secs(capture.timeout));
            let verdict =
                commands::guard(&source, &baseline, &tool, &capture.args, &report, &mut stdout)
                    .await?;
            if verdict == Verdict::Breaking {
                return Ok(ExitCode::from(EXIT_BREAKING));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
