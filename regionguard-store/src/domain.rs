use regionguard_types::{ActorId, Subject};
use std::collections::BTreeSet;

/// The owners or members of a region: individual players plus named
/// permission groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domain {
    players: BTreeSet<ActorId>,
    groups: BTreeSet<String>,
}

impl Domain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the player was not already present.
    pub fn add_player(&mut self, id: ActorId) -> bool {
        self.players.insert(id)
    }

    pub fn remove_player(&mut self, id: &ActorId) -> bool {
        self.players.remove(id)
    }

    /// Group names are case-insensitive and stored lower-case.
    pub fn add_group(&mut self, group: &str) -> bool {
        self.groups.insert(group.to_ascii_lowercase())
    }

    pub fn remove_group(&mut self, group: &str) -> bool {
        self.groups.remove(&group.to_ascii_lowercase())
    }

    #[must_use]
    pub fn contains_player(&self, id: &ActorId) -> bool {
        self.players.contains(id)
    }

    #[must_use]
    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains(&group.to_ascii_lowercase())
    }

    /// True when the subject is listed directly or through a group.
    #[must_use]
    pub fn contains(&self, subject: &Subject) -> bool {
        match subject {
            Subject::Nobody => false,
            Subject::Player { id, groups } => {
                self.players.contains(id) || groups.iter().any(|g| self.contains_group(g))
            }
        }
    }

    pub fn players(&self) -> impl Iterator<Item = &ActorId> {
        self.players.iter()
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len() + self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.players.clear();
        self.groups.clear();
    }
}

impl FromIterator<ActorId> for Domain {
    fn from_iter<T: IntoIterator<Item = ActorId>>(iter: T) -> Self {
        Self {
            players: iter.into_iter().collect(),
            groups: BTreeSet::new(),
        }
    }
}
