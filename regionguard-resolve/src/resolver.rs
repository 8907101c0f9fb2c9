//! The resolution algorithm.

use crate::applicable::ApplicableRegions;
use crate::resolution::{Resolution, UndefinedReason, ValueSource};
use regionguard_flags::{FlagDefaults, FlagDefinition, FlagRegistry};
use regionguard_store::{Region, WorldRegionSet};
use regionguard_types::{BlockVector, Subject};
use tracing::trace;

/// Resolves flags against a world's regions.
///
/// Holds only borrowed configuration; build one per query or keep one
/// alongside a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FlagResolver<'a> {
    registry: &'a FlagRegistry,
    defaults: &'a FlagDefaults,
}

impl<'a> FlagResolver<'a> {
    #[must_use]
    pub fn new(registry: &'a FlagRegistry, defaults: &'a FlagDefaults) -> Self {
        Self { registry, defaults }
    }

    #[must_use]
    pub fn registry(&self) -> &'a FlagRegistry {
        self.registry
    }

    /// Resolves `flag` at `point` for `subject`.
    ///
    /// Never fails; unknown flags resolve to
    /// [`Resolution::Undefined`].
    #[must_use]
    pub fn resolve(&self, set: &WorldRegionSet, point: BlockVector, flag: &str, subject: &Subject) -> Resolution {
        let candidates = set.containing(point);
        let resolution = self.resolve_among(set, &candidates, flag, subject);
        trace!(world = %set.world(), %point, flag, %resolution, "Resolved flag");
        resolution
    }

    /// The regions containing `point`, ready for repeated queries.
    #[must_use]
    pub fn applicable<'s>(&self, set: &'s WorldRegionSet, point: BlockVector) -> ApplicableRegions<'s, 'a> {
        ApplicableRegions::new(*self, set, set.containing(point))
    }

    /// Resolves among an already computed candidate list (every entry must
    /// contain the query point).
    pub(crate) fn resolve_among(
        &self,
        set: &WorldRegionSet,
        candidates: &[&Region],
        flag: &str,
        subject: &Subject,
    ) -> Resolution {
        let Some(def) = self.registry.get(flag) else {
            return Resolution::Undefined(UndefinedReason::UnknownFlag);
        };

        if let Some(found) = decide(set, candidates, def, subject) {
            return found;
        }
        if let Some(global) = set.global() {
            if let Some(found) = lineage_value(set, global, def, subject) {
                return found;
            }
        }
        match self.defaults.default_for(def) {
            Some(value) => Resolution::Default(value.clone()),
            None => Resolution::Undefined(UndefinedReason::NoValue),
        }
    }
}

/// Picks the deciding region among point candidates.
///
/// Candidates that are ancestors of another candidate are dropped; the
/// rest are tried in precedence order and the first that yields a value
/// through its lineage decides.
fn decide(set: &WorldRegionSet, candidates: &[&Region], def: &FlagDefinition, subject: &Subject) -> Option<Resolution> {
    let mut ordered: Vec<&Region> = candidates
        .iter()
        .copied()
        .filter(|c| !candidates.iter().any(|d| set.is_ancestor(c.id(), d.id())))
        .collect();
    ordered.sort_by(|a, b| a.precedence_cmp(b));
    ordered
        .into_iter()
        .find_map(|region| lineage_value(set, region, def, subject))
}

/// Walks `region` and its ancestors; the first level with a value for the
/// subject's membership of `region` supplies it.
fn lineage_value(set: &WorldRegionSet, region: &Region, def: &FlagDefinition, subject: &Subject) -> Option<Resolution> {
    let membership = set.membership(region, subject);
    set.lineage(region).find_map(|level| {
        let setting = level.flag(&def.name)?;
        let (part, value) = setting.resolve_for(membership, def.scoped)?;
        Some(Resolution::Explicit {
            value: value.clone(),
            region: region.id().clone(),
            source: ValueSource {
                defined_on: level.id().clone(),
                part,
            },
        })
    })
}
