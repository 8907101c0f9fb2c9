//! Flag definitions.

use crate::error::{FlagError, FlagResult};
use crate::group::RegionGroup;
use crate::value::{FlagKind, FlagValue};

/// Describes one flag: its name, value type, default and scoping.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagDefinition {
    pub name: String,
    pub kind: FlagKind,
    /// Value used when no region sets the flag.
    pub default: Option<FlagValue>,
    /// Allowed options. Only meaningful when kind is Enum.
    pub options: Option<Vec<String>>,
    /// Whether owner/member overrides on a region apply to this flag.
    pub scoped: bool,
}

impl FlagDefinition {
    fn simple(name: &str, kind: FlagKind, default: Option<FlagValue>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default,
            options: None,
            scoped: false,
        }
    }

    /// Shorthand for an allow/deny flag.
    pub fn boolean(name: &str, default: Option<bool>) -> Self {
        Self::simple(name, FlagKind::Boolean, default.map(FlagValue::Boolean))
    }

    /// Shorthand for a free-text flag.
    pub fn string(name: &str, default: Option<&str>) -> Self {
        Self::simple(
            name,
            FlagKind::String,
            default.map(|s| FlagValue::Text(s.to_string())),
        )
    }

    /// Shorthand for a numeric flag.
    pub fn numeric(name: &str, default: Option<f64>) -> Self {
        Self::simple(name, FlagKind::Numeric, default.map(FlagValue::Numeric))
    }

    /// Shorthand for a region-group flag.
    pub fn group(name: &str, default: Option<RegionGroup>) -> Self {
        Self::simple(name, FlagKind::RegionGroup, default.map(FlagValue::Group))
    }

    /// Shorthand for an enum flag with fixed options.
    pub fn choice(name: &str, options: &[&str], default: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            kind: FlagKind::Enum,
            default: default.map(|s| FlagValue::Choice(s.to_string())),
            options: Some(options.iter().map(|o| o.to_string()).collect()),
            scoped: false,
        }
    }

    /// Marks the flag as honouring owner/member overrides.
    #[must_use]
    pub fn scoped(mut self) -> Self {
        self.scoped = true;
        self
    }

    /// Checks that `value` has this flag's type (and option list for enums).
    pub fn validate(&self, value: &FlagValue) -> FlagResult<()> {
        if value.kind() != self.kind {
            return Err(self.mismatch(value.kind().as_str()));
        }
        if let (FlagValue::Choice(choice), Some(options)) = (value, &self.options) {
            if !options.iter().any(|o| o == choice) {
                return Err(FlagError::UnknownOption {
                    flag: self.name.clone(),
                    value: choice.clone(),
                    options: options.join(", "),
                });
            }
        }
        Ok(())
    }

    /// Restores a typed value from its stored JSON form.
    pub fn value_from_json(&self, json: &serde_json::Value) -> FlagResult<FlagValue> {
        let value = match (self.kind, json) {
            (FlagKind::Boolean, serde_json::Value::Bool(b)) => FlagValue::Boolean(*b),
            (FlagKind::Numeric, serde_json::Value::Number(n)) => match n.as_f64() {
                Some(n) => FlagValue::Numeric(n),
                None => return Err(self.mismatch("number")),
            },
            (FlagKind::String, serde_json::Value::String(s)) => FlagValue::Text(s.clone()),
            (FlagKind::Enum, serde_json::Value::String(s)) => FlagValue::Choice(s.clone()),
            (FlagKind::RegionGroup, serde_json::Value::String(s)) => match s.parse() {
                Ok(g) => FlagValue::Group(g),
                Err(()) => return Err(self.unparseable(s)),
            },
            (_, other) => return Err(self.mismatch(json_type(other))),
        };
        self.validate(&value)?;
        Ok(value)
    }

    /// Parses operator input such as `allow`, `deny`, `12.5` or `members`.
    pub fn parse_input(&self, input: &str) -> FlagResult<FlagValue> {
        let trimmed = input.trim();
        let value = match self.kind {
            FlagKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "allow" | "true" | "yes" | "on" => FlagValue::Boolean(true),
                "deny" | "false" | "no" | "off" => FlagValue::Boolean(false),
                _ => return Err(self.unparseable(input)),
            },
            FlagKind::Numeric => match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => FlagValue::Numeric(n),
                _ => return Err(self.unparseable(input)),
            },
            FlagKind::String => FlagValue::Text(input.to_string()),
            FlagKind::Enum => FlagValue::Choice(trimmed.to_ascii_lowercase()),
            FlagKind::RegionGroup => match trimmed.parse() {
                Ok(g) => FlagValue::Group(g),
                Err(()) => return Err(self.unparseable(input)),
            },
        };
        self.validate(&value)?;
        Ok(value)
    }

    fn mismatch(&self, actual: &str) -> FlagError {
        FlagError::TypeMismatch {
            flag: self.name.clone(),
            expected: self.kind.as_str().to_string(),
            actual: actual.to_string(),
        }
    }

    fn unparseable(&self, input: &str) -> FlagError {
        FlagError::Unparseable {
            flag: self.name.clone(),
            input: input.to_string(),
        }
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
