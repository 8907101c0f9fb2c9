//! Typed flag values.

use crate::group::RegionGroup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The value type a flag accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Boolean,
    /// One of a fixed list of options, stored on the definition.
    Enum,
    String,
    RegionGroup,
    Numeric,
}

impl FlagKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::String => "string",
            Self::RegionGroup => "region-group",
            Self::Numeric => "numeric",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete value stored for a flag.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Boolean(bool),
    Choice(String),
    Text(String),
    Group(RegionGroup),
    Numeric(f64),
}

impl FlagValue {
    #[must_use]
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::Boolean(_) => FlagKind::Boolean,
            Self::Choice(_) => FlagKind::Enum,
            Self::Text(_) => FlagKind::String,
            Self::Group(_) => FlagKind::RegionGroup,
            Self::Numeric(_) => FlagKind::Numeric,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Choice(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_group(&self) -> Option<RegionGroup> {
        match self {
            Self::Group(g) => Some(*g),
            _ => None,
        }
    }

    /// JSON form used by the storage layer. Type information is not kept;
    /// the flag definition restores it on load.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Choice(s) | Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Group(g) => serde_json::Value::String(g.as_str().to_string()),
            Self::Numeric(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }

    /// Best-effort typing for values of flags nobody registered, so they
    /// survive a load/save cycle.
    #[must_use]
    pub fn infer_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Boolean(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Numeric),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(true) => f.write_str("allow"),
            Self::Boolean(false) => f.write_str("deny"),
            Self::Choice(s) | Self::Text(s) => f.write_str(s),
            Self::Group(g) => write!(f, "{g}"),
            Self::Numeric(n) => write!(f, "{n}"),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<RegionGroup> for FlagValue {
    fn from(g: RegionGroup) -> Self {
        Self::Group(g)
    }
}

impl From<f64> for FlagValue {
    fn from(n: f64) -> Self {
        Self::Numeric(n)
    }
}
