use regionguard_flags::{FlagValue, SettingPart};
use regionguard_types::RegionId;
use std::fmt;

/// Where an explicit value was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSource {
    /// The region whose flag map held the value: the deciding region
    /// itself, one of its ancestors, or `__global__`.
    pub defined_on: RegionId,
    pub part: SettingPart,
}

impl ValueSource {
    /// True when the value came from an ancestor rather than `region`.
    #[must_use]
    pub fn is_inherited(&self, region: &RegionId) -> bool {
        &self.defined_on != region
    }
}

/// Why a query produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndefinedReason {
    UnknownFlag,
    UnknownWorld,
    NoValue,
}

impl UndefinedReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownFlag => "unknown flag",
            Self::UnknownWorld => "unknown world",
            Self::NoValue => "no value",
        }
    }
}

/// Outcome of resolving one flag at one point for one subject.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A region supplied the value.
    Explicit {
        value: FlagValue,
        region: RegionId,
        source: ValueSource,
    },
    /// No region had a value; the flag default applies.
    Default(FlagValue),
    Undefined(UndefinedReason),
}

impl Resolution {
    #[must_use]
    pub fn value(&self) -> Option<&FlagValue> {
        match self {
            Self::Explicit { value, .. } | Self::Default(value) => Some(value),
            Self::Undefined(_) => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<FlagValue> {
        match self {
            Self::Explicit { value, .. } | Self::Default(value) => Some(value),
            Self::Undefined(_) => None,
        }
    }

    /// The deciding region for explicit results.
    #[must_use]
    pub fn region(&self) -> Option<&RegionId> {
        match self {
            Self::Explicit { region, .. } => Some(region),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit { .. })
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.value().and_then(FlagValue::as_bool)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { value, region, source } if source.is_inherited(region) => {
                write!(f, "{value} (region {region}, inherited from {})", source.defined_on)
            }
            Self::Explicit { value, region, source } => {
                write!(f, "{value} (region {region}, {})", source.part.as_str())
            }
            Self::Default(value) => write!(f, "{value} (default)"),
            Self::Undefined(reason) => write!(f, "undefined ({})", reason.as_str()),
        }
    }
}
