//! Reports and maintenance operations behind the `regionguard` binary.
//!
//! Everything here works on a [`RegionEngine`] and returns plain
//! serializable reports; the binary decides how to print them.

use anyhow::{Context, Result};
use regionguard_engine::{RegionEngine, RegionUpdate};
use regionguard_flags::SettingPart;
use regionguard_geometry::{Selection, Shape};
use regionguard_resolve::Resolution;
use regionguard_store::{Domain, Region};
use regionguard_types::{BlockVector, RegionId, Subject, WorldId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of loading (and possibly migrating) one world.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WorldStatus {
    pub world: String,
    pub regions: Option<usize>,
    pub migrated_from: Option<u32>,
    /// Whether the world was written back during this run.
    pub saved: bool,
    pub error: Option<String>,
}

impl WorldStatus {
    fn failed(world: &WorldId, error: impl ToString) -> Self {
        Self {
            world: world.to_string(),
            regions: None,
            migrated_from: None,
            saved: false,
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// One region as shown by `regions` and `info`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RegionSummary {
    pub id: String,
    pub shape: String,
    pub priority: i32,
    pub parent: Option<String>,
    pub owners: Vec<String>,
    pub members: Vec<String>,
    pub flags: BTreeMap<String, String>,
}

impl From<&Region> for RegionSummary {
    fn from(region: &Region) -> Self {
        let domain = |d: &Domain| -> Vec<String> {
            d.players()
                .map(ToString::to_string)
                .chain(d.groups().map(|g| format!("g:{g}")))
                .collect()
        };
        let flags = region
            .flags()
            .iter()
            .map(|(name, setting)| {
                let mut parts = Vec::new();
                if let Some(v) = &setting.value {
                    parts.push(v.to_string());
                }
                if let Some(v) = &setting.members {
                    parts.push(format!("members={v}"));
                }
                if let Some(v) = &setting.owners {
                    parts.push(format!("owners={v}"));
                }
                (name.clone(), parts.join(" "))
            })
            .collect();
        Self {
            id: region.id().to_string(),
            shape: region.shape().kind().as_str().to_string(),
            priority: region.priority(),
            parent: region.parent().map(ToString::to_string),
            owners: domain(region.owners()),
            members: domain(region.members()),
            flags,
        }
    }
}

/// A flag query answered with the regions that took part.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QueryReport {
    pub world: String,
    pub point: String,
    pub flag: String,
    /// Containing regions, highest precedence first.
    pub regions: Vec<String>,
    pub value: Option<String>,
    pub region: Option<String>,
    pub defined_on: Option<String>,
    pub part: Option<&'static str>,
    /// Human-readable summary of the resolution.
    pub outcome: String,
}

/// The configured worlds plus every world present in storage, sorted and
/// de-duplicated.
pub fn known_worlds(engine: &RegionEngine, configured: &[WorldId]) -> Result<Vec<WorldId>> {
    let mut worlds = engine
        .storage()
        .stored_worlds()
        .context("Failed to list stored worlds")?;
    worlds.extend(configured.iter().cloned());
    worlds.sort();
    worlds.dedup();
    Ok(worlds)
}

/// Loads each world, reporting failures per world.
pub fn load_worlds(engine: &RegionEngine, worlds: &[WorldId]) -> Vec<WorldStatus> {
    engine
        .load_worlds(worlds)
        .into_iter()
        .map(|(world, result)| match result {
            Ok(summary) => WorldStatus {
                world: world.to_string(),
                regions: Some(summary.regions),
                migrated_from: summary.migrated_from,
                saved: false,
                error: None,
            },
            Err(e) => WorldStatus::failed(&world, e),
        })
        .collect()
}

/// Loads each world and writes back the ones that were migrated.
pub fn migrate_worlds(engine: &RegionEngine, worlds: &[WorldId]) -> Vec<WorldStatus> {
    load_worlds(engine, worlds)
        .into_iter()
        .zip(worlds)
        .map(|(mut status, world)| {
            if status.is_ok() && status.migrated_from.is_some() {
                match engine.save_world(world) {
                    Ok(()) => status.saved = true,
                    Err(e) => status.error = Some(e.to_string()),
                }
            }
            status
        })
        .collect()
}

/// Regions containing `point`, highest precedence first.
pub fn regions_at(engine: &RegionEngine, world: &WorldId, point: BlockVector) -> Result<Vec<RegionSummary>> {
    let set = engine
        .snapshot(world)
        .with_context(|| format!("World '{world}' is not loaded"))?;
    Ok(set.containing(point).into_iter().map(RegionSummary::from).collect())
}

/// Details of a single region.
pub fn region_info(engine: &RegionEngine, world: &WorldId, id: &RegionId) -> Result<RegionSummary> {
    let set = engine
        .snapshot(world)
        .with_context(|| format!("World '{world}' is not loaded"))?;
    let region = set
        .get(id)
        .with_context(|| format!("No region '{id}' in world '{world}'"))?;
    Ok(region.into())
}

/// Resolves `flag` at `point` for `subject`.
pub fn query(
    engine: &RegionEngine,
    world: &WorldId,
    point: BlockVector,
    flag: &str,
    subject: &Subject,
) -> Result<QueryReport> {
    let regions = engine
        .regions_at(world, point)
        .with_context(|| format!("Cannot query world '{world}'"))?;
    let resolution = engine.query_flag(world, point, flag, subject);
    let (region, defined_on, part) = match &resolution {
        Resolution::Explicit { region, source, .. } => (
            Some(region.to_string()),
            Some(source.defined_on.to_string()),
            Some(source.part.as_str()),
        ),
        _ => (None, None, None),
    };
    Ok(QueryReport {
        world: world.to_string(),
        point: point.to_string(),
        flag: flag.to_string(),
        regions: regions.iter().map(ToString::to_string).collect(),
        value: resolution.value().map(ToString::to_string),
        region,
        defined_on,
        part,
        outcome: resolution.to_string(),
    })
}

/// Defines a region from a selection, or the world's global region when
/// `selection` is `None`.
pub fn define(
    engine: &RegionEngine,
    world: &WorldId,
    id: &RegionId,
    selection: Option<Selection>,
    priority: i32,
    parent: Option<RegionId>,
) -> Result<()> {
    let mut region = match selection {
        Some(selection) => {
            let shape = Shape::try_from(selection).context("Invalid selection")?;
            Region::new(id.clone(), world.clone(), shape)
        }
        None => Region::global(world.clone()),
    };
    region = region.with_priority(priority);
    if let Some(parent) = parent {
        region = region.with_parent(parent);
    }
    engine
        .define_region(region)
        .with_context(|| format!("Failed to define '{id}'"))
}

/// Sets one part of a flag from user input, or clears the whole flag when
/// `input` is `None`.
pub fn set_flag(
    engine: &RegionEngine,
    world: &WorldId,
    id: &RegionId,
    flag: &str,
    part: SettingPart,
    input: Option<&str>,
) -> Result<()> {
    let Some(input) = input else {
        return engine
            .update_region(world, id, &[RegionUpdate::ClearFlag(flag.to_string())])
            .with_context(|| format!("Failed to clear '{flag}' on '{id}'"));
    };

    let def = engine.registry().require(flag)?;
    let value = def.parse_input(input)?;
    let set = engine
        .snapshot(world)
        .with_context(|| format!("World '{world}' is not loaded"))?;
    let mut setting = set
        .get(id)
        .and_then(|r| r.flag(&def.name))
        .cloned()
        .unwrap_or_default();
    match part {
        SettingPart::Value => setting.value = Some(value),
        SettingPart::Owners => setting.owners = Some(value),
        SettingPart::Members => setting.members = Some(value),
    }
    engine
        .update_region(
            world,
            id,
            &[RegionUpdate::SetFlag {
                flag: def.name.clone(),
                setting,
            }],
        )
        .with_context(|| format!("Failed to set '{flag}' on '{id}'"))
}
