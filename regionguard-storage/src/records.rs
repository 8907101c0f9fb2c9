//! Current-schema document layout and conversion to and from the store.

use crate::cancel::CancelToken;
use crate::error::{StorageError, StorageResult};
use crate::migration::CURRENT_SCHEMA_VERSION;
use regionguard_flags::{FlagRegistry, FlagSetting, FlagValue};
use regionguard_geometry::{Cuboid, Polygon, Shape};
use regionguard_index::IndexConfig;
use regionguard_store::{Domain, Region, WorldRegionSet};
use regionguard_types::{ActorId, BlockVector, BlockVector2, RegionId, WorldId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Cancellation is polled once per this many decoded regions.
const CANCEL_CHECK_INTERVAL: usize = 256;

/// A whole world as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldDocument {
    pub schema_version: u32,
    /// Absent in documents migrated from v1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<WorldId>,
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: RegionId,
    pub seq: u64,
    pub shape: ShapeRecord,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub parent: Option<RegionId>,
    #[serde(default)]
    pub owners: DomainRecord,
    #[serde(default)]
    pub members: DomainRecord,
    #[serde(default)]
    pub flags: BTreeMap<String, SettingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeRecord {
    Cuboid {
        min: BlockVector,
        max_exclusive: BlockVector,
    },
    Polygon {
        points: Vec<BlockVector2>,
        min_y: i32,
        max_y_exclusive: i32,
    },
    Global,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    #[serde(default)]
    pub players: Vec<ActorId>,
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owners: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Value>,
}

// ── Encoding ─────────────────────────────────────────────────────

/// Serializes a region set at the current schema version, regions in
/// definition order.
#[must_use]
pub fn encode(set: &WorldRegionSet) -> WorldDocument {
    WorldDocument {
        schema_version: CURRENT_SCHEMA_VERSION,
        world: Some(set.world().clone()),
        regions: set.regions().into_iter().map(encode_region).collect(),
    }
}

fn encode_region(region: &Region) -> RegionRecord {
    RegionRecord {
        id: region.id().clone(),
        seq: region.seq(),
        shape: encode_shape(region.shape()),
        priority: region.priority(),
        parent: region.parent().cloned(),
        owners: encode_domain(region.owners()),
        members: encode_domain(region.members()),
        flags: region
            .flags()
            .iter()
            .map(|(name, setting)| {
                let record = SettingRecord {
                    value: setting.value.as_ref().map(FlagValue::to_json),
                    owners: setting.owners.as_ref().map(FlagValue::to_json),
                    members: setting.members.as_ref().map(FlagValue::to_json),
                };
                (name.clone(), record)
            })
            .collect(),
    }
}

fn encode_shape(shape: &Shape) -> ShapeRecord {
    match shape {
        Shape::Cuboid(c) => ShapeRecord::Cuboid {
            min: c.min(),
            max_exclusive: c.max(),
        },
        Shape::Polygon(p) => ShapeRecord::Polygon {
            points: p.points().to_vec(),
            min_y: p.min_y(),
            max_y_exclusive: p.max_y(),
        },
        Shape::Global => ShapeRecord::Global,
    }
}

fn encode_domain(domain: &Domain) -> DomainRecord {
    DomainRecord {
        players: domain.players().copied().collect(),
        groups: domain.groups().map(str::to_string).collect(),
    }
}

// ── Decoding ─────────────────────────────────────────────────────

/// Builds a region set from a current-schema document.
///
/// Known flags are validated against their definitions. Values of flags
/// the registry does not know are kept with an inferred type so that
/// saving does not lose them.
pub fn decode(
    world: &WorldId,
    document: WorldDocument,
    registry: &FlagRegistry,
    index: IndexConfig,
    cancel: &CancelToken,
) -> StorageResult<WorldRegionSet> {
    if document.schema_version != CURRENT_SCHEMA_VERSION {
        return Err(StorageError::InvalidData(format!(
            "expected schema version {CURRENT_SCHEMA_VERSION}, found {}",
            document.schema_version
        )));
    }
    if let Some(stored) = &document.world {
        if stored != world {
            return Err(StorageError::InvalidData(format!(
                "document belongs to world '{stored}'"
            )));
        }
    }

    let mut regions = Vec::with_capacity(document.regions.len());
    for (i, record) in document.regions.into_iter().enumerate() {
        if i % CANCEL_CHECK_INTERVAL == 0 {
            cancel.check(world)?;
        }
        regions.push(decode_region(world, record, registry)?);
    }
    cancel.check(world)?;
    Ok(WorldRegionSet::from_regions(world.clone(), index, regions)?)
}

fn decode_region(world: &WorldId, record: RegionRecord, registry: &FlagRegistry) -> StorageResult<Region> {
    let id = record.id;
    let shape = decode_shape(record.shape)
        .map_err(|e| StorageError::InvalidData(format!("region '{id}': {e}")))?;

    let mut region = Region::new(id.clone(), world.clone(), shape)
        .with_priority(record.priority)
        .with_seq(record.seq)
        .with_owners(decode_domain(record.owners))
        .with_members(decode_domain(record.members));
    if let Some(parent) = record.parent {
        region = region.with_parent(parent);
    }

    for (name, stored) in record.flags {
        let setting = FlagSetting {
            value: decode_value(&id, &name, stored.value, registry)?,
            owners: decode_value(&id, &name, stored.owners, registry)?,
            members: decode_value(&id, &name, stored.members, registry)?,
        };
        region = region.with_flag(&name, setting);
    }
    Ok(region)
}

fn decode_shape(shape: ShapeRecord) -> Result<Shape, regionguard_geometry::GeometryError> {
    Ok(match shape {
        ShapeRecord::Cuboid { min, max_exclusive } => Cuboid::new(min, max_exclusive)?.into(),
        ShapeRecord::Polygon {
            points,
            min_y,
            max_y_exclusive,
        } => Polygon::new(points, min_y, max_y_exclusive)?.into(),
        ShapeRecord::Global => Shape::Global,
    })
}

fn decode_domain(record: DomainRecord) -> Domain {
    let mut domain: Domain = record.players.into_iter().collect();
    for group in &record.groups {
        domain.add_group(group);
    }
    domain
}

fn decode_value(
    region: &RegionId,
    flag: &str,
    raw: Option<Value>,
    registry: &FlagRegistry,
) -> StorageResult<Option<FlagValue>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.is_null() {
        return Ok(None);
    }
    match registry.get(flag) {
        Some(def) => Ok(Some(def.value_from_json(&raw)?)),
        None => {
            warn!(%region, flag, "Keeping value of unregistered flag");
            FlagValue::infer_json(&raw).map(Some).ok_or_else(|| {
                StorageError::InvalidData(format!("region '{region}': flag '{flag}' has unusable value {raw}"))
            })
        }
    }
}
