//! Help text → [`Surface`] extraction.
//!
//! Flags are recognised per line by shape (`-x, --long TYPE  description (default "v")`);
//! subcommands are collected by a small state machine that watches for `Commands:`-style
//! headers and reads the indented entries underneath them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::surface::{Flag, FlagType, Surface};

static FLAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+(?:-(\w),\s+)?--(\S+)(?:\s+(string|int|bool|float|duration)\s)?").unwrap()
});

static DEFAULT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\(default\s+"?([^")]*?)"?\)\s*$"#).unwrap());

static SUBCOMMAND_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s{2,4}([A-Za-z_][\w-]*)\s{2,}").unwrap());

/// Where the subcommand scan currently is relative to a commands block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    Inside,
}

/// What a single line means to the subcommand scan.
#[derive(Debug, PartialEq, Eq)]
enum LineEvent<'a> {
    Header,
    Blank,
    Entry(&'a str),
    Other,
}

impl ScanState {
    fn step<'a>(self, line: &'a str) -> (ScanState, Option<&'a str>) {
        match (self, classify_line(line)) {
            (_, LineEvent::Header) => (ScanState::Inside, None),
            (ScanState::Inside, LineEvent::Blank) => (ScanState::Outside, None),
            (ScanState::Inside, LineEvent::Entry(name)) => (ScanState::Inside, Some(name)),
            (state, _) => (state, None),
        }
    }
}

fn classify_line(line: &str) -> LineEvent<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineEvent::Blank;
    }
    let lowered = trimmed.to_lowercase();
    if lowered.contains("command") && lowered.ends_with(':') {
        return LineEvent::Header;
    }
    match SUBCOMMAND_REGEX.captures(line) {
        Some(caps) => caps
            .get(1)
            .map(|m| LineEvent::Entry(m.as_str()))
            .unwrap_or(LineEvent::Other),
        None => LineEvent::Other,
    }
}

/// Parses one line as a flag declaration, if it has that shape.
pub fn parse_flag_line(line: &str) -> Option<Flag> {
    let caps = FLAG_REGEX.captures(line)?;
    let long = caps.get(2)?.as_str().to_string();
    let short = caps.get(1).and_then(|m| m.as_str().chars().next());
    let flag_type = caps
        .get(3)
        .and_then(|m| FlagType::from_keyword(m.as_str()))
        .unwrap_or(FlagType::Bool);
    let default = DEFAULT_REGEX
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Some(Flag {
        long,
        short,
        flag_type,
        default,
    })
}

/// Extracts the flag and subcommand surface of `tool` from its help output.
///
/// Never fails: text without recognisable declarations yields an empty surface.
pub fn extract(tool: &str, help_text: &str) -> Surface {
    let mut surface = Surface::new(tool);

    for flag in help_text.lines().filter_map(parse_flag_line) {
        surface.insert_flag(flag);
    }

    let mut state = ScanState::Outside;
    for line in help_text.lines() {
        let (next, entry) = state.step(line);
        if let Some(name) = entry {
            surface.insert_subcommand(name);
        }
        state = next;
    }

    surface
}
