//! Region groups and actor membership.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an actor relates to one particular region.
///
/// Owners are also members; `Unassociated` is used for queries without a
/// player behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Membership {
    Owner,
    Member,
    NonMember,
    Unassociated,
}

impl Membership {
    #[must_use]
    pub fn is_owner(self) -> bool {
        self == Self::Owner
    }

    /// True for owners and members.
    #[must_use]
    pub fn is_member(self) -> bool {
        matches!(self, Self::Owner | Self::Member)
    }
}

/// A set of actors defined relative to a region, used as a flag value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionGroup {
    All,
    Members,
    Owners,
    NonMembers,
    NonOwners,
    None,
}

impl RegionGroup {
    pub const ALL: [RegionGroup; 6] = [
        Self::All,
        Self::Members,
        Self::Owners,
        Self::NonMembers,
        Self::NonOwners,
        Self::None,
    ];

    #[must_use]
    pub fn contains(self, membership: Membership) -> bool {
        match self {
            Self::All => true,
            Self::Members => membership.is_member(),
            Self::Owners => membership.is_owner(),
            Self::NonMembers => !membership.is_member(),
            Self::NonOwners => !membership.is_owner(),
            Self::None => false,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Members => "members",
            Self::Owners => "owners",
            Self::NonMembers => "non_members",
            Self::NonOwners => "non_owners",
            Self::None => "none",
        }
    }
}

impl fmt::Display for RegionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `non_members`, `non-members` and `nonmembers` spellings.
impl FromStr for RegionGroup {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "all" | "everyone" => Ok(Self::All),
            "members" | "member" => Ok(Self::Members),
            "owners" | "owner" => Ok(Self::Owners),
            "nonmembers" | "nonmember" => Ok(Self::NonMembers),
            "nonowners" | "nonowner" => Ok(Self::NonOwners),
            "none" | "nobody" => Ok(Self::None),
            _ => Err(()),
        }
    }
}
