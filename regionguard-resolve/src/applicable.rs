use crate::resolution::Resolution;
use crate::resolver::FlagResolver;
use regionguard_store::{Region, WorldRegionSet};
use regionguard_types::Subject;

/// The regions containing one point, in precedence order.
///
/// Computed once and then queried for any number of flags, the way an
/// event handler checks several flags at the same block.
#[derive(Debug, Clone)]
pub struct ApplicableRegions<'s, 'a> {
    resolver: FlagResolver<'a>,
    set: &'s WorldRegionSet,
    regions: Vec<&'s Region>,
}

impl<'s, 'a> ApplicableRegions<'s, 'a> {
    pub(crate) fn new(resolver: FlagResolver<'a>, set: &'s WorldRegionSet, regions: Vec<&'s Region>) -> Self {
        Self { resolver, set, regions }
    }

    /// Containing regions, highest precedence first. `__global__` is never
    /// listed.
    #[must_use]
    pub fn regions(&self) -> &[&'s Region] {
        &self.regions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// True when only the world-wide region (or nothing) applies.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.regions.is_empty()
    }

    #[must_use]
    pub fn query_value(&self, flag: &str, subject: &Subject) -> Resolution {
        self.resolver
            .resolve_among(self.set, &self.regions, flag, subject)
    }

    /// Combines boolean flags: any deny wins, otherwise any allow, otherwise
    /// `None`.
    #[must_use]
    pub fn query_state(&self, subject: &Subject, flags: &[&str]) -> Option<bool> {
        let mut state = None;
        for flag in flags {
            match self.query_value(flag, subject).as_bool() {
                Some(false) => return Some(false),
                Some(true) => state = Some(true),
                None => {}
            }
        }
        state
    }

    /// True only when the combined state is allow.
    #[must_use]
    pub fn test_state(&self, subject: &Subject, flags: &[&str]) -> bool {
        self.query_state(subject, flags) == Some(true)
    }

    /// True when the subject owns every containing region, directly or
    /// through a parent.
    #[must_use]
    pub fn is_owner_of_all(&self, subject: &Subject) -> bool {
        self.regions
            .iter()
            .all(|r| self.set.membership(r, subject).is_owner())
    }

    /// True when the subject is an owner or member of every containing
    /// region.
    #[must_use]
    pub fn is_member_of_all(&self, subject: &Subject) -> bool {
        self.regions
            .iter()
            .all(|r| self.set.membership(r, subject).is_member())
    }
}
