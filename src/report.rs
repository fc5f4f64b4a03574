use anyhow::Result;
use crossterm::style::{Color, Stylize};
use std::io::Write;
use unicode_width::UnicodeWidthStr;

use crate::cli::OutputFormat;
use crate::compare::{Change, Severity, Summary};

pub const NO_CHANGES: &str = "No changes detected.";

#[derive(Debug, Clone, Copy)]
pub struct Report {
    pub format: OutputFormat,
    pub color: bool,
}

impl Report {
    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn severity_color(severity: Severity) -> Color {
        match severity {
            Severity::Breaking => Color::Red,
            Severity::Minor => Color::Yellow,
        }
    }

    pub fn write_changes(&self, out: &mut impl Write, changes: &[Change]) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, changes)?;
                writeln!(out)?;
            }
            OutputFormat::Text => self.write_text(out, changes)?,
        }
        Ok(())
    }

    fn write_text(&self, out: &mut impl Write, changes: &[Change]) -> Result<()> {
        if changes.is_empty() {
            writeln!(out, "{}", NO_CHANGES)?;
            return Ok(());
        }

        let category_width = changes
            .iter()
            .map(|c| c.category.as_str().width())
            .max()
            .unwrap_or(0);
        let severity_width = "[BREAKING]".width();

        for change in changes {
            let severity = format!("[{}]", change.severity);
            let severity_pad = severity_width.saturating_sub(severity.width());
            let category = format!("{}:", change.category);
            let category_pad = (category_width + 1).saturating_sub(category.width());
            writeln!(
                out,
                "{}{} {}{} {}",
                self.paint(&severity, Self::severity_color(change.severity)),
                " ".repeat(severity_pad),
                category,
                " ".repeat(category_pad),
                change.detail
            )?;
        }

        let summary = Summary::of(changes);
        writeln!(
            out,
            "\n{} breaking, {} minor",
            summary.breaking, summary.minor
        )?;
        Ok(())
    }

    /// Final line of a guard run. JSON reports carry no verdict text.
    pub fn write_verdict(&self, out: &mut impl Write, breaking: bool) -> Result<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        if breaking {
            writeln!(out, "{}", self.paint("BREAKING changes detected!", Color::Red))?;
        } else {
            writeln!(out, "{}", self.paint("No breaking changes.", Color::Green))?;
        }
        Ok(())
    }
}
