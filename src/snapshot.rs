use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::surface::Surface;

pub const SNAPSHOT_EXTENSION: &str = "snap";

/// A surface as stored on disk, plus when it was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub surface: Surface,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<i64>,
}

impl Snapshot {
    pub fn captured_now(surface: Surface) -> Self {
        Snapshot {
            surface,
            captured_at: Some(Local::now().timestamp()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        debug!(path = %path.display(), "Snapshot written");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Malformed snapshot {}", path.display()))?;
        debug!(
            path = %path.display(),
            tool = %snapshot.surface.tool,
            flags = snapshot.surface.flags.len(),
            subcommands = snapshot.surface.subcommands.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }
}

/// `<tool>.snap`, using only the final path component of the tool name.
pub fn default_snapshot_path(tool: &str) -> PathBuf {
    let name = Path::new(tool)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| tool.to_string());
    PathBuf::from(format!("{name}.{SNAPSHOT_EXTENSION}"))
}

pub fn format_timestamp(timestamp: Option<i64>) -> String {
    let Some(timestamp) = timestamp else {
        return "capture time not recorded".to_string();
    };
    match Local.timestamp_opt(timestamp, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%b %d %Y at %I:%M %P").to_string(),
        _ => "invalid timestamp".to_string(),
    }
}
