use crate::ActorId;
use serde::{Deserialize, Serialize};

/// The party on whose behalf a flag is queried.
///
/// Environmental actions (fire spread, explosions, water flow) have no
/// player behind them and query as [`Subject::Nobody`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    #[default]
    Nobody,
    Player {
        id: ActorId,
        /// Permission groups the player belongs to, as reported by the host.
        #[serde(default)]
        groups: Vec<String>,
    },
}

impl Subject {
    /// A player with no group memberships.
    #[must_use]
    pub fn player(id: ActorId) -> Self {
        Self::Player { id, groups: Vec::new() }
    }

    /// A player that belongs to the given groups.
    #[must_use]
    pub fn player_in_groups<I, S>(id: ActorId, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Player {
            id,
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn actor_id(&self) -> Option<ActorId> {
        match self {
            Self::Nobody => None,
            Self::Player { id, .. } => Some(*id),
        }
    }

    /// Group names of the subject; empty for [`Subject::Nobody`].
    #[must_use]
    pub fn groups(&self) -> &[String] {
        match self {
            Self::Nobody => &[],
            Self::Player { groups, .. } => groups,
        }
    }
}
