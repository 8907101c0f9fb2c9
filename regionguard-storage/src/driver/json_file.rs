use super::RegionDriver;
use crate::error::StorageResult;
use regionguard_types::WorldId;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FILE_NAME: &str = "regions.json";

/// Stores each world as `<root>/<world>/regions.json`.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the old document.
#[derive(Debug, Clone)]
pub struct JsonFileDriver {
    root: PathBuf,
}

impl JsonFileDriver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, world: &WorldId) -> PathBuf {
        self.root.join(world.as_str()).join(FILE_NAME)
    }
}

impl RegionDriver for JsonFileDriver {
    fn name(&self) -> &'static str {
        "json"
    }

    fn read(&self, world: &WorldId) -> StorageResult<Option<Value>> {
        let path = self.path_for(world);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), bytes = bytes.len(), "Read region document");
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn write(&self, world: &WorldId, document: &Value) -> StorageResult<()> {
        let path = self.path_for(world);
        let dir = self.root.join(world.as_str());
        fs::create_dir_all(&dir)?;

        let tmp = dir.join(format!("{FILE_NAME}.tmp"));
        let bytes = serde_json::to_vec_pretty(document)?;
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote region document");
        Ok(())
    }

    fn delete(&self, world: &WorldId) -> StorageResult<bool> {
        match fs::remove_file(self.path_for(world)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn worlds(&self) -> StorageResult<Vec<WorldId>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut worlds = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().join(FILE_NAME).is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match WorldId::new(name.clone()) {
                Ok(world) => worlds.push(world),
                Err(e) => warn!(directory = %name, error = %e, "Skipping directory with invalid world name"),
            }
        }
        worlds.sort();
        Ok(worlds)
    }
}
