use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::capture::DEFAULT_TIMEOUT_SECS;

#[derive(Parser)]
#[command(author, version, about = "Detect breaking changes in a CLI's flags and subcommands", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a tool's --help output as a structured snapshot
    Snapshot {
        /// Tool to invoke
        tool: String,
        /// Where to write the snapshot [default: <tool>.snap]
        output: Option<PathBuf>,
        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Diff two snapshots by compatibility severity
    Compare {
        old: PathBuf,
        new: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Compare a baseline snapshot against the live tool; exit 1 on breaking changes
    Guard {
        baseline: PathBuf,
        tool: String,
        #[command(flatten)]
        capture: CaptureArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Argument passed to the tool before --help (repeatable, e.g. --arg deploy)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Seconds to wait for the tool's help output
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn snapshot_defaults() {
        let cli = Cli::try_parse_from(["clidiff", "snapshot", "kubectl"]).unwrap();
        match cli.command {
            Commands::Snapshot {
                tool,
                output,
                capture,
            } => {
                assert_eq!(tool, "kubectl");
                assert!(output.is_none());
                assert!(capture.args.is_empty());
                assert_eq!(capture.timeout, DEFAULT_TIMEOUT_SECS);
            }
            _ => panic!("expected snapshot"),
        }
    }

    #[test]
    fn guard_accepts_capture_args_and_format() {
        let cli = Cli::try_parse_from([
            "clidiff", "guard", "base.snap", "helm", "--arg", "install", "--timeout", "3",
            "--format", "json", "--no-color",
        ])
        .unwrap();
        assert!(cli.no_color);
        match cli.command {
            Commands::Guard {
                baseline,
                tool,
                capture,
                format,
            } => {
                assert_eq!(baseline, PathBuf::from("base.snap"));
                assert_eq!(tool, "helm");
                assert_eq!(capture.args, ["install"]);
                assert_eq!(capture.timeout, 3);
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected guard"),
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["clidiff", "snapshot", "kubectl", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["clidiff", "snapshot", "kubectl", "--timeout", "1"]).is_ok());
    }

    #[test]
    fn compare_requires_two_paths() {
        assert!(Cli::try_parse_from(["clidiff", "compare", "old.snap"]).is_err());
    }
}
