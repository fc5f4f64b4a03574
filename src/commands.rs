use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::capture::HelpSource;
use crate::compare::{compare, has_breaking, Change};
use crate::extract::extract;
use crate::report::Report;
use crate::snapshot::{default_snapshot_path, format_timestamp, Snapshot};
use crate::surface::Surface;

/// How a guard run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Compatible,
    Breaking,
}

async fn live_surface<H: HelpSource>(source: &H, tool: &str, args: &[String]) -> Result<Surface> {
    let help = source
        .capture(tool, args)
        .await
        .with_context(|| format!("Could not capture help for `{tool}`"))?;
    let surface = extract(tool, &help);
    if surface.flags.is_empty() && surface.subcommands.is_empty() {
        warn!(tool, "No flags or subcommands recognised in help output");
    }
    Ok(surface)
}

pub async fn snapshot<H: HelpSource>(
    source: &H,
    tool: &str,
    output: Option<PathBuf>,
    args: &[String],
    out: &mut impl Write,
) -> Result<PathBuf> {
    let surface = live_surface(source, tool, args).await?;
    let path = output.unwrap_or_else(|| default_snapshot_path(tool));
    let snapshot = Snapshot::captured_now(surface);
    snapshot.save(&path)?;

    writeln!(
        out,
        "Snapshot saved: {} ({} flags, {} subcommands)",
        path.display(),
        snapshot.surface.flags.len(),
        snapshot.surface.subcommands.len()
    )?;
    Ok(path)
}

pub fn compare_files(
    old: &Path,
    new: &Path,
    report: &Report,
    out: &mut impl Write,
) -> Result<Vec<Change>> {
    let baseline = Snapshot::load(old)?;
    let candidate = Snapshot::load(new)?;
    info!(
        baseline = %format_timestamp(baseline.captured_at),
        candidate = %format_timestamp(candidate.captured_at),
        "Comparing snapshots of {}",
        baseline.surface.tool
    );

    let changes = compare(&baseline.surface, &candidate.surface);
    report.write_changes(out, &changes)?;
    Ok(changes)
}

pub async fn guard<H: HelpSource>(
    source: &H,
    baseline: &Path,
    tool: &str,
    args: &[String],
    report: &Report,
    out: &mut impl Write,
) -> Result<Verdict> {
    let baseline = Snapshot::load(baseline)?;
    let current = live_surface(source, tool, args).await?;
    info!(
        baseline = %format_timestamp(baseline.captured_at),
        "Guarding {} against its baseline",
        tool
    );

    let changes = compare(&baseline.surface, &current);
    report.write_changes(out, &changes)?;

    let breaking = has_breaking(&changes);
    report.write_verdict(out, breaking)?;
    Ok(if breaking {
        Verdict::Breaking
    } else {
        Verdict::Compatible
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureError;
    use crate::cli::OutputFormat;
    use crate::compare::Category;
    use std::io;
    use tempfile::TempDir;

    const HELP: &str = "Available Commands:
  deploy      Deploy the application
  rollback    Rollback

Flags:
  -v, --verbose           Enable verbose output
      --output string     Output format (default \"text\")
      --dry-run           Dry run mode
";

    /// Serves fixed help text without spawning anything.
    struct StaticHelp(String);

    impl HelpSource for StaticHelp {
        async fn capture(&self, _tool: &str, _args: &[String]) -> Result<String, CaptureError> {
            Ok(self.0.clone())
        }
    }

    struct Unlaunchable;

    impl HelpSource for Unlaunchable {
        async fn capture(&self, tool: &str, _args: &[String]) -> Result<String, CaptureError> {
            Err(CaptureError::Launch {
                tool: tool.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    fn text_report() -> Report {
        Report {
            format: OutputFormat::Text,
            color: false,
        }
    }

    async fn baseline_in(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("mytool.snap");
        let mut sink = Vec::new();
        snapshot(&StaticHelp(HELP.to_string()), "mytool", Some(path.clone()), &[], &mut sink)
            .await
            .unwrap();
        path
    }

    #[tokio::test]
    async fn snapshot_reports_counts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.snap");
        let mut out = Vec::new();

        let written = snapshot(&StaticHelp(HELP.to_string()), "mytool", Some(path.clone()), &[], &mut out)
            .await
            .unwrap();

        assert_eq!(written, path);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(3 flags, 2 subcommands)"), "{text}");
        let stored = Snapshot::load(&path).unwrap();
        assert_eq!(stored.surface.tool, "mytool");
        assert!(stored.captured_at.is_some());
    }

    #[tokio::test]
    async fn guard_passes_when_only_additions() {
        let dir = TempDir::new().unwrap();
        let baseline = baseline_in(&dir).await;
        let grown = StaticHelp(format!("{HELP}      --format string     Output format type\n"));
        let mut out = Vec::new();

        let verdict = guard(&grown, &baseline, "mytool", &[], &text_report(), &mut out)
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Compatible);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("flag-added"));
        assert!(text.ends_with("No breaking changes.\n"));
    }

    #[tokio::test]
    async fn guard_fails_on_removed_flag() {
        let dir = TempDir::new().unwrap();
        let baseline = baseline_in(&dir).await;
        let shrunk = "Available Commands:\n  deploy      Deploy\n  rollback    Rollback\n\n  -v, --verbose   Verbose\n      --output string   Out (default \"text\")\n";
        let mut out = Vec::new();

        let verdict = guard(&StaticHelp(shrunk.to_string()), &baseline, "mytool", &[], &text_report(), &mut out)
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Breaking);
        assert!(String::from_utf8(out).unwrap().contains("--dry-run"));
    }

    #[tokio::test]
    async fn guard_propagates_launch_failure() {
        let dir = TempDir::new().unwrap();
        let baseline = baseline_in(&dir).await;
        let mut out = Vec::new();

        let err = guard(&Unlaunchable, &baseline, "ghost", &[], &text_report(), &mut out)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("ghost"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn compare_files_reports_changes() {
        let dir = TempDir::new().unwrap();
        let old = baseline_in(&dir).await;
        let new = dir.path().join("new.snap");
        let mut sink = Vec::new();
        snapshot(
            &StaticHelp("Flags:\n  -v, --verbose   Verbose\n".to_string()),
            "mytool",
            Some(new.clone()),
            &[],
            &mut sink,
        )
        .await
        .unwrap();

        let mut out = Vec::new();
        let changes = compare_files(&old, &new, &text_report(), &mut out).unwrap();
        let categories: Vec<Category> = changes.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            [
                Category::FlagRemoved,
                Category::FlagRemoved,
                Category::SubcommandRemoved,
                Category::SubcommandRemoved,
            ]
        );
    }

    #[tokio::test]
    async fn comparing_a_snapshot_with_itself_prints_no_changes() {
        let dir = TempDir::new().unwrap();
        let path = baseline_in(&dir).await;
        let mut out = Vec::new();

        let changes = compare_files(&path, &path, &text_report(), &mut out).unwrap();

        assert!(changes.is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), "No changes detected.\n");
    }
}
