use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Value type a flag declares in help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    String,
    Int,
    #[default]
    Bool,
    Float,
    Duration,
}

impl FlagType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(FlagType::String),
            "int" => Some(FlagType::Int),
            "bool" => Some(FlagType::Bool),
            "float" => Some(FlagType::Float),
            "duration" => Some(FlagType::Duration),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::String => "string",
            FlagType::Int => "int",
            FlagType::Bool => "bool",
            FlagType::Float => "float",
            FlagType::Duration => "duration",
        }
    }
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    /// Long name without the leading dashes, e.g. `output`.
    pub long: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "short_alias"
    )]
    pub short: Option<char>,
    #[serde(rename = "type", default)]
    pub flag_type: FlagType,
    /// Literal default text; empty when the help text shows none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcommand {
    pub name: String,
}

/// The declared CLI contract of one tool at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Surface {
    pub tool: String,
    #[serde(default, deserialize_with = "list_or_null")]
    pub flags: Vec<Flag>,
    #[serde(default, deserialize_with = "list_or_null")]
    pub subcommands: Vec<Subcommand>,
}

/// Accepts an absent, empty or single-character alias.
fn short_alias<'de, D>(deserializer: D) -> Result<Option<char>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) => Ok(Some(c)),
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Str(&raw),
            &"a single character or an empty string",
        )),
    }
}

/// Older snapshot writers emit `null` for a tool with no flags or subcommands.
fn list_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Surface {
    pub fn new(tool: impl Into<String>) -> Self {
        Surface {
            tool: tool.into(),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn flag(&self, long: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.long == long)
    }

    pub fn has_subcommand(&self, name: &str) -> bool {
        self.subcommands.iter().any(|s| s.name == name)
    }

    /// Adds a flag, replacing an earlier declaration with the same long name in place.
    pub(crate) fn insert_flag(&mut self, flag: Flag) {
        match self.flags.iter_mut().find(|f| f.long == flag.long) {
            Some(existing) => *existing = flag,
            None => self.flags.push(flag),
        }
    }

    pub(crate) fn insert_subcommand(&mut self, name: &str) {
        if !self.has_subcommand(name) {
            self.subcommands.push(Subcommand {
                name: name.to_string(),
            });
        }
    }
}
