//! Forward-only schema migrations for stored world documents.
//!
//! Each step is a pure transform of a `serde_json::Value` from one schema
//! version to the next. Steps are idempotent: running one on a document it
//! already migrated leaves the document unchanged.

use crate::cancel::CancelToken;
use crate::error::{StorageError, StorageResult};
use regionguard_types::WorldId;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

/// Key holding the schema version at the top of every document.
pub const VERSION_KEY: &str = "schema_version";

/// One forward step of the schema history.
pub trait Migration: Send + Sync {
    /// Version this step reads.
    fn from_version(&self) -> u32;

    /// Version this step writes.
    fn to_version(&self) -> u32 {
        self.from_version() + 1
    }

    /// Short human-readable summary for logs.
    fn describe(&self) -> &'static str;

    /// Transforms a document at `from_version` into `to_version`.
    fn apply(&self, document: Value) -> StorageResult<Value>;
}

/// A document brought up to the current schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    pub document: Value,
    /// Version the document was stored at.
    pub from_version: u32,
}

impl Migrated {
    #[must_use]
    pub fn was_migrated(&self) -> bool {
        self.from_version != CURRENT_SCHEMA_VERSION
    }
}

/// Ordered registry of migration steps.
pub struct Migrator {
    steps: BTreeMap<u32, Box<dyn Migration>>,
    target: u32,
}

impl Migrator {
    /// A migrator with no steps targeting `target`.
    #[must_use]
    pub fn empty(target: u32) -> Self {
        Self {
            steps: BTreeMap::new(),
            target,
        }
    }

    /// Registers a step, replacing any step with the same source version.
    pub fn register(&mut self, step: Box<dyn Migration>) {
        self.steps.insert(step.from_version(), step);
    }

    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Reads the stored version. Documents without one predate versioning
    /// and are version 1.
    pub fn version_of(document: &Value) -> StorageResult<u32> {
        match document.get(VERSION_KEY) {
            None => Ok(1),
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| StorageError::InvalidData(format!("bad {VERSION_KEY}: {v}"))),
        }
    }

    /// Applies every step from the stored version up to the target in
    /// strictly increasing order.
    pub fn migrate(&self, mut document: Value, world: &WorldId, cancel: &CancelToken) -> StorageResult<Migrated> {
        let from_version = Self::version_of(&document)?;
        if from_version > self.target {
            return Err(StorageError::UnsupportedVersion {
                found: from_version,
                supported: self.target,
            });
        }

        let mut version = from_version;
        while version < self.target {
            cancel.check(world)?;
            let step = self
                .steps
                .get(&version)
                .ok_or(StorageError::MigrationGap { from: version })?;
            let next = step.to_version();
            if next <= version {
                return Err(StorageError::MigrationFailed {
                    from: version,
                    reason: format!("step does not advance the version (to {next})"),
                });
            }

            document = step.apply(document)?;
            set_version(&mut document, next, version)?;
            info!(%world, from = version, to = next, step = step.describe(), "Migrated region document");
            version = next;
        }

        if version != from_version {
            debug!(%world, from_version, to = version, "Migration chain complete");
        }
        Ok(Migrated {
            document,
            from_version,
        })
    }
}

impl Default for Migrator {
    /// All built-in steps up to [`CURRENT_SCHEMA_VERSION`].
    fn default() -> Self {
        let mut migrator = Self::empty(CURRENT_SCHEMA_VERSION);
        migrator.register(Box::new(KeyedToSequenced));
        migrator.register(Box::new(HalfOpenShapes));
        migrator
    }
}

fn set_version(document: &mut Value, version: u32, from: u32) -> StorageResult<()> {
    let obj = document.as_object_mut().ok_or_else(|| not_an_object(from))?;
    obj.insert(VERSION_KEY.to_string(), json!(version));
    Ok(())
}

fn not_an_object(from: u32) -> StorageError {
    StorageError::MigrationFailed {
        from,
        reason: "document is not an object".to_string(),
    }
}

fn failed(from: u32, reason: impl Into<String>) -> StorageError {
    StorageError::MigrationFailed {
        from,
        reason: reason.into(),
    }
}

// ── v1 → v2 ──────────────────────────────────────────────────────

/// v1 kept regions in an object keyed by id. v2 stores an array of records
/// carrying their own `id` and a definition `seq`, assigned in id order.
pub struct KeyedToSequenced;

impl Migration for KeyedToSequenced {
    fn from_version(&self) -> u32 {
        1
    }

    fn describe(&self) -> &'static str {
        "region map to sequenced records"
    }

    fn apply(&self, mut document: Value) -> StorageResult<Value> {
        let obj = document.as_object_mut().ok_or_else(|| not_an_object(1))?;
        let regions = match obj.remove("regions") {
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(Value::Array(records)) => Value::Array(records),
            Some(Value::Object(mut keyed)) => {
                let mut ids: Vec<String> = keyed.keys().cloned().collect();
                ids.sort();
                let mut records = Vec::with_capacity(ids.len());
                for (i, id) in ids.into_iter().enumerate() {
                    let mut record = match keyed.remove(&id) {
                        Some(Value::Object(record)) => record,
                        _ => return Err(failed(1, format!("region '{id}' is not an object"))),
                    };
                    record.insert("id".to_string(), Value::String(id));
                    record.insert("seq".to_string(), json!(i as u64 + 1));
                    records.push(Value::Object(record));
                }
                Value::Array(records)
            }
            Some(_) => return Err(failed(1, "regions must be an object")),
        };
        obj.insert("regions".to_string(), regions);
        Ok(document)
    }
}

// ── v2 → v3 ──────────────────────────────────────────────────────

/// v2 records carried inclusive upper corners at the top level, plain flag
/// values and owner/member UUID lists. v3 nests a half-open `shape`, stores
/// flag settings with override slots, and domains with groups.
pub struct HalfOpenShapes;

impl Migration for HalfOpenShapes {
    fn from_version(&self) -> u32 {
        2
    }

    fn describe(&self) -> &'static str {
        "half-open shapes, flag settings and group domains"
    }

    fn apply(&self, mut document: Value) -> StorageResult<Value> {
        let obj = document.as_object_mut().ok_or_else(|| not_an_object(2))?;
        let Some(Value::Array(records)) = obj.get_mut("regions") else {
            return Err(failed(2, "regions must be an array"));
        };
        for record in records.iter_mut() {
            let record = record
                .as_object_mut()
                .ok_or_else(|| failed(2, "region record is not an object"))?;
            nest_shape(record)?;
            wrap_flags(record);
            for key in ["owners", "members"] {
                if let Some(Value::Array(players)) = record.get(key) {
                    let domain = json!({ "players": players.clone(), "groups": [] });
                    record.insert(key.to_string(), domain);
                }
            }
        }
        Ok(document)
    }
}

fn nest_shape(record: &mut Map<String, Value>) -> StorageResult<()> {
    if record.contains_key("shape") {
        return Ok(());
    }
    let id = record.get("id").map(ToString::to_string).unwrap_or_default();
    let kind = record
        .remove("type")
        .and_then(|t| t.as_str().map(str::to_ascii_lowercase))
        .ok_or_else(|| failed(2, format!("region {id} has no shape type")))?;

    let shape = match kind.as_str() {
        "cuboid" => {
            let min = record
                .remove("min")
                .ok_or_else(|| failed(2, format!("cuboid {id} has no min")))?;
            let max = record
                .remove("max")
                .ok_or_else(|| failed(2, format!("cuboid {id} has no max")))?;
            let mut exclusive = Map::new();
            for axis in ["x", "y", "z"] {
                exclusive.insert(axis.to_string(), json!(bump(&max, axis, &id)?));
            }
            json!({ "type": "cuboid", "min": min, "max_exclusive": exclusive })
        }
        "polygon" => {
            let points = record
                .remove("points")
                .ok_or_else(|| failed(2, format!("polygon {id} has no points")))?;
            let min_y = record.remove("min_y").unwrap_or(Value::Null);
            let max_y = record
                .remove("max_y")
                .ok_or_else(|| failed(2, format!("polygon {id} has no max_y")))?;
            let top = max_y
                .as_i64()
                .and_then(|y| i32::try_from(y + 1).ok())
                .ok_or_else(|| failed(2, format!("polygon {id} has bad max_y")))?;
            json!({ "type": "polygon", "points": points, "min_y": min_y, "max_y_exclusive": top })
        }
        "global" => json!({ "type": "global" }),
        other => return Err(failed(2, format!("region {id} has unknown shape type '{other}'"))),
    };
    record.insert("shape".to_string(), shape);
    Ok(())
}

fn bump(corner: &Value, axis: &str, id: &str) -> StorageResult<i32> {
    corner
        .get(axis)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v + 1).ok())
        .ok_or_else(|| failed(2, format!("cuboid {id} has bad max.{axis}")))
}

fn wrap_flags(record: &mut Map<String, Value>) {
    if let Some(Value::Object(flags)) = record.get_mut("flags") {
        for value in flags.values_mut() {
            if !value.is_object() {
                *value = json!({ "value": value.take() });
            }
        }
    }
}
