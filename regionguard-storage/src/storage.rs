use crate::cancel::CancelToken;
use crate::driver::RegionDriver;
use crate::error::{StorageError, StorageResult};
use crate::migration::Migrator;
use crate::records::{self, WorldDocument};
use regionguard_flags::FlagRegistry;
use regionguard_index::IndexConfig;
use regionguard_store::WorldRegionSet;
use regionguard_types::WorldId;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A world read from storage.
#[derive(Debug, Clone)]
pub struct LoadedWorld {
    pub set: WorldRegionSet,
    /// The stored schema version when the document had to be migrated.
    /// The migrated form is not written back until the world is saved.
    pub migrated_from: Option<u32>,
}

/// Outcome of loading several worlds. One world failing never prevents
/// the others from loading.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<LoadedWorld>,
    pub failed: Vec<(WorldId, StorageError)>,
}

impl LoadReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Loads and saves region sets through a driver, migrating documents
/// from older schema versions on the way in.
pub struct RegionStorage {
    driver: Box<dyn RegionDriver>,
    migrator: Migrator,
    registry: Arc<FlagRegistry>,
    index: IndexConfig,
}

impl RegionStorage {
    pub fn new(driver: Box<dyn RegionDriver>, registry: Arc<FlagRegistry>) -> Self {
        Self {
            driver,
            migrator: Migrator::default(),
            registry,
            index: IndexConfig::default(),
        }
    }

    #[must_use]
    pub fn with_migrator(mut self, migrator: Migrator) -> Self {
        self.migrator = migrator;
        self
    }

    #[must_use]
    pub fn with_index_config(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    #[must_use]
    pub fn driver(&self) -> &dyn RegionDriver {
        self.driver.as_ref()
    }

    #[must_use]
    pub fn index_config(&self) -> IndexConfig {
        self.index
    }

    /// Reads, migrates, validates and indexes one world.
    ///
    /// A world with no stored document loads as an empty set.
    pub fn load(&self, world: &WorldId, cancel: &CancelToken) -> StorageResult<LoadedWorld> {
        let started = Instant::now();
        cancel.check(world)?;

        let raw = self.driver.read(world)?;
        cancel.check(world)?;
        let Some(raw) = raw else {
            info!(%world, backend = self.driver.name(), "No stored regions, starting empty");
            return Ok(LoadedWorld {
                set: WorldRegionSet::with_index_config(world.clone(), self.index),
                migrated_from: None,
            });
        };

        let migrated = self.migrator.migrate(raw, world, cancel)?;
        let migrated_from = migrated.was_migrated().then_some(migrated.from_version);
        let document: WorldDocument = serde_json::from_value(migrated.document)?;
        let set = records::decode(world, document, &self.registry, self.index, cancel)?;

        info!(
            %world,
            backend = self.driver.name(),
            regions = set.len(),
            migrated_from,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Loaded regions"
        );
        Ok(LoadedWorld { set, migrated_from })
    }

    /// Loads each world independently.
    pub fn load_all(&self, worlds: &[WorldId], cancel: &CancelToken) -> LoadReport {
        let mut report = LoadReport::default();
        for world in worlds {
            match self.load(world, cancel) {
                Ok(loaded) => report.loaded.push(loaded),
                Err(e) => {
                    warn!(%world, error = %e, "Failed to load regions");
                    report.failed.push((world.clone(), e));
                }
            }
        }
        report
    }

    /// Writes a world at the current schema version.
    pub fn save(&self, set: &WorldRegionSet) -> StorageResult<()> {
        let document = serde_json::to_value(records::encode(set))?;
        self.driver.write(set.world(), &document)?;
        info!(world = %set.world(), backend = self.driver.name(), regions = set.len(), "Saved regions");
        Ok(())
    }

    /// Removes a world's stored document.
    pub fn delete(&self, world: &WorldId) -> StorageResult<bool> {
        self.driver.delete(world)
    }

    /// Worlds that have stored documents.
    pub fn stored_worlds(&self) -> StorageResult<Vec<WorldId>> {
        self.driver.worlds()
    }
}
