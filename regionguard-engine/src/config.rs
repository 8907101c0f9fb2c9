//! Engine configuration read from `regionguard.toml`.
//!
//! ```toml
//! worlds = ["world", "world_nether"]
//!
//! [storage]
//! backend = "sqlite"
//! path = "plugins/RegionGuard/regions.db"
//!
//! [index]
//! cell_shift = 4
//! max_cells_per_region = 4096
//!
//! [flag_defaults]
//! pvp = false
//! heal-amount = 1
//! ```

use crate::error::{EngineError, EngineResult};
use regionguard_flags::{FlagDefaults, FlagRegistry};
use regionguard_index::IndexConfig;
use regionguard_storage::{JsonFileDriver, MemoryDriver, RegionDriver, SqliteDriver, StorageResult};
use regionguard_types::WorldId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where region documents live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per world under `path`.
    #[default]
    Json,
    /// One SQLite database at `path`.
    Sqlite,
    /// Nothing is written to disk.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("regions")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    /// Opens the configured backend.
    pub fn open_driver(&self) -> StorageResult<Box<dyn RegionDriver>> {
        Ok(match self.backend {
            StorageBackend::Json => Box::new(JsonFileDriver::new(&self.path)),
            StorageBackend::Sqlite => Box::new(SqliteDriver::open(&self.path)?),
            StorageBackend::Memory => Box::new(MemoryDriver::new()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "default_cell_shift")]
    pub cell_shift: u8,
    #[serde(default = "default_max_cells")]
    pub max_cells_per_region: usize,
}

fn default_cell_shift() -> u8 {
    IndexConfig::default().cell_shift()
}

fn default_max_cells() -> usize {
    IndexConfig::default().max_cells_per_region()
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            cell_shift: default_cell_shift(),
            max_cells_per_region: default_max_cells(),
        }
    }
}

impl From<IndexSettings> for IndexConfig {
    fn from(settings: IndexSettings) -> Self {
        IndexConfig::new(settings.cell_shift, settings.max_cells_per_region)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worlds loaded at start-up.
    #[serde(default)]
    pub worlds: Vec<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub index: IndexSettings,
    /// Server-wide flag default overrides, by flag name.
    #[serde(default)]
    pub flag_defaults: BTreeMap<String, toml::Value>,
}

impl EngineConfig {
    /// Parses configuration text strictly.
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        toml::from_str(contents).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Loads configuration from `path` if it exists.
    /// Falls back to defaults with a warning on read or parse errors.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No configuration file at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse configuration {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read configuration {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Start-up worlds as validated identifiers.
    pub fn world_ids(&self) -> EngineResult<Vec<WorldId>> {
        self.worlds
            .iter()
            .map(|w| WorldId::new(w.clone()).map_err(|e| EngineError::Config(e.to_string())))
            .collect()
    }

    #[must_use]
    pub fn index_config(&self) -> IndexConfig {
        self.index.into()
    }

    /// Validates `flag_defaults` against the registry.
    pub fn flag_defaults(&self, registry: &FlagRegistry) -> EngineResult<FlagDefaults> {
        let mut entries = BTreeMap::new();
        for (name, value) in &self.flag_defaults {
            let json = serde_json::to_value(value)
                .map_err(|e| EngineError::Config(format!("flag_defaults.{name}: {e}")))?;
            entries.insert(name.clone(), json);
        }
        Ok(FlagDefaults::from_json(registry, entries.iter())?)
    }
}
