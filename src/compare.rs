use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::surface::{Flag, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Breaking,
    Minor,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Breaking => "BREAKING",
            Severity::Minor => "MINOR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    FlagRemoved,
    FlagAdded,
    TypeChanged,
    DefaultChanged,
    SubcommandRemoved,
    SubcommandAdded,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FlagRemoved => "flag-removed",
            Category::FlagAdded => "flag-added",
            Category::TypeChanged => "type-changed",
            Category::DefaultChanged => "default-changed",
            Category::SubcommandRemoved => "subcommand-removed",
            Category::SubcommandAdded => "subcommand-added",
        }
    }

    /// Severity every change of this category carries.
    pub fn severity(&self) -> Severity {
        match self {
            Category::FlagAdded | Category::SubcommandAdded => Severity::Minor,
            Category::FlagRemoved
            | Category::TypeChanged
            | Category::DefaultChanged
            | Category::SubcommandRemoved => Severity::Breaking,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub severity: Severity,
    pub category: Category,
    pub detail: String,
}

impl Change {
    fn new(category: Category, detail: String) -> Self {
        Change {
            severity: category.severity(),
            category,
            detail,
        }
    }

    pub fn is_breaking(&self) -> bool {
        self.severity == Severity::Breaking
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.detail)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub breaking: usize,
    pub minor: usize,
}

impl Summary {
    pub fn of(changes: &[Change]) -> Self {
        changes.iter().fold(Summary::default(), |mut acc, c| {
            match c.severity {
                Severity::Breaking => acc.breaking += 1,
                Severity::Minor => acc.minor += 1,
            }
            acc
        })
    }
}

pub fn has_breaking(changes: &[Change]) -> bool {
    changes.iter().any(Change::is_breaking)
}

fn index_flags(surface: &Surface) -> HashMap<&str, &Flag> {
    // Later declarations overwrite earlier ones.
    surface.flags.iter().map(|f| (f.long.as_str(), f)).collect()
}

/// Compares a baseline surface against a candidate and classifies every difference.
///
/// Flag changes come before subcommand changes; within each group, removals and
/// modifications follow baseline order and additions follow candidate order.
pub fn compare(baseline: &Surface, candidate: &Surface) -> Vec<Change> {
    let mut changes = Vec::new();
    let old_flags = index_flags(baseline);
    let new_flags = index_flags(candidate);

    for old in &baseline.flags {
        let Some(new) = new_flags.get(old.long.as_str()) else {
            changes.push(Change::new(Category::FlagRemoved, format!("--{}", old.long)));
            continue;
        };
        if old.flag_type != new.flag_type {
            changes.push(Change::new(
                Category::TypeChanged,
                format!("--{}: {} → {}", old.long, old.flag_type, new.flag_type),
            ));
        }
        if old.default != new.default {
            changes.push(Change::new(
                Category::DefaultChanged,
                format!("--{}: {:?} → {:?}", old.long, old.default, new.default),
            ));
        }
    }

    for new in &candidate.flags {
        if !old_flags.contains_key(new.long.as_str()) {
            changes.push(Change::new(Category::FlagAdded, format!("--{}", new.long)));
        }
    }

    let old_subs: HashSet<&str> = baseline.subcommands.iter().map(|s| s.name.as_str()).collect();
    let new_subs: HashSet<&str> = candidate.subcommands.iter().map(|s| s.name.as_str()).collect();

    for sub in &baseline.subcommands {
        if !new_subs.contains(sub.name.as_str()) {
            changes.push(Change::new(Category::SubcommandRemoved, sub.name.clone()));
        }
    }
    for sub in &candidate.subcommands {
        if !old_subs.contains(sub.name.as_str()) {
            changes.push(Change::new(Category::SubcommandAdded, sub.name.clone()));
        }
    }

    changes
}
