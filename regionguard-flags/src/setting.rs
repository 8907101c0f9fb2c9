use crate::group::Membership;
use crate::value::FlagValue;

/// Which part of a [`FlagSetting`] a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingPart {
    Value,
    Owners,
    Members,
}

impl SettingPart {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Owners => "owners",
            Self::Members => "members",
        }
    }
}

/// What a single region stores for one flag.
///
/// `value` applies to everybody; the overrides replace it for owners or
/// members of the region when the flag is scoped. Owners fall back to the
/// member override before the plain value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlagSetting {
    pub value: Option<FlagValue>,
    pub owners: Option<FlagValue>,
    pub members: Option<FlagValue>,
}

impl FlagSetting {
    /// A setting with only a plain value.
    #[must_use]
    pub fn plain(value: impl Into<FlagValue>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_owners(mut self, value: impl Into<FlagValue>) -> Self {
        self.owners = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_members(mut self, value: impl Into<FlagValue>) -> Self {
        self.members = Some(value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.owners.is_none() && self.members.is_none()
    }

    /// The value this setting gives an actor with `membership`.
    ///
    /// Overrides are ignored unless `scoped` is set.
    #[must_use]
    pub fn value_for(&self, membership: Membership, scoped: bool) -> Option<&FlagValue> {
        self.resolve_for(membership, scoped).map(|(_, v)| v)
    }

    /// Like [`value_for`](Self::value_for), also reporting which part of
    /// the setting supplied the value.
    #[must_use]
    pub fn resolve_for(&self, membership: Membership, scoped: bool) -> Option<(SettingPart, &FlagValue)> {
        if scoped {
            if membership.is_owner() {
                if let Some(v) = &self.owners {
                    return Some((SettingPart::Owners, v));
                }
            }
            if membership.is_member() {
                if let Some(v) = &self.members {
                    return Some((SettingPart::Members, v));
                }
            }
        }
        self.value.as_ref().map(|v| (SettingPart::Value, v))
    }

    /// Iterates over the values that are present.
    pub fn values(&self) -> impl Iterator<Item = &FlagValue> {
        [&self.value, &self.owners, &self.members]
            .into_iter()
            .filter_map(Option::as_ref)
    }
}
