//! The query facade and snapshot publication.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::update::RegionUpdate;
use parking_lot::{Mutex, RwLock};
use regionguard_flags::{FlagDefaults, FlagRegistry};
use regionguard_resolve::{ApplicableRegions, FlagResolver, Resolution, UndefinedReason};
use regionguard_storage::{CancelToken, RegionStorage};
use regionguard_store::{Region, RemovedRegion, WorldRegionSet};
use regionguard_types::{BlockVector, RegionId, Subject, WorldId};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Summary of one successful world load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub regions: usize,
    /// Set when the stored document was migrated; the world starts dirty.
    pub migrated_from: Option<u32>,
}

/// Per-world publication state.
struct WorldSlot {
    snapshot: RwLock<Arc<WorldRegionSet>>,
    /// Serializes writers; readers never take it.
    writer: Mutex<()>,
    dirty: AtomicBool,
    /// Set under `writer` when the world is unloaded. Nothing publishes
    /// into a detached slot.
    detached: AtomicBool,
}

impl WorldSlot {
    fn new(set: Arc<WorldRegionSet>, dirty: bool) -> Self {
        Self {
            snapshot: RwLock::new(set),
            writer: Mutex::new(()),
            dirty: AtomicBool::new(dirty),
            detached: AtomicBool::new(false),
        }
    }

    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    fn current(&self) -> Arc<WorldRegionSet> {
        Arc::clone(&self.snapshot.read())
    }
}

/// Region queries and edits for every loaded world.
///
/// Readers take the current snapshot of a world (an `Arc` clone under a
/// short read lock) and query it without further locking. Writers are
/// serialized per world: each edit clones the set, applies changes and
/// publishes the result in one swap, so readers see either the old or
/// the new set and never a partial edit.
///
/// Reloads and unloads take the same per-world writer lock, so an edit
/// either lands before them (and blocks a reload as unsaved) or fails
/// with [`EngineError::WorldNotFound`] after an unload.
pub struct RegionEngine {
    registry: Arc<FlagRegistry>,
    defaults: FlagDefaults,
    storage: RegionStorage,
    worlds: RwLock<HashMap<WorldId, Arc<WorldSlot>>>,
    loading: Mutex<HashMap<WorldId, Vec<CancelToken>>>,
}

impl RegionEngine {
    pub fn new(storage: RegionStorage, registry: Arc<FlagRegistry>, defaults: FlagDefaults) -> Self {
        Self {
            registry,
            defaults,
            storage,
            worlds: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
        }
    }

    /// Builds an engine with the built-in flags, configured defaults and
    /// the configured storage backend. No worlds are loaded yet.
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let mut registry = FlagRegistry::with_builtins();
        registry.lock();
        let registry = Arc::new(registry);
        let defaults = config.flag_defaults(&registry)?;
        let driver = config.storage.open_driver()?;
        let storage = RegionStorage::new(driver, Arc::clone(&registry)).with_index_config(config.index_config());
        info!(
            backend = storage.driver().name(),
            flag_defaults = defaults.len(),
            "Region engine ready"
        );
        Ok(Self::new(storage, registry, defaults))
    }

    #[must_use]
    pub fn registry(&self) -> &FlagRegistry {
        &self.registry
    }

    #[must_use]
    pub fn defaults(&self) -> &FlagDefaults {
        &self.defaults
    }

    #[must_use]
    pub fn storage(&self) -> &RegionStorage {
        &self.storage
    }

    /// A resolver bound to this engine's flag configuration.
    #[must_use]
    pub fn resolver(&self) -> FlagResolver<'_> {
        FlagResolver::new(&self.registry, &self.defaults)
    }

    // ── Reads ────────────────────────────────────────────────────

    /// The current published region set of a world.
    #[must_use]
    pub fn snapshot(&self, world: &WorldId) -> Option<Arc<WorldRegionSet>> {
        self.slot(world).map(|s| s.current())
    }

    /// Loaded worlds, sorted.
    #[must_use]
    pub fn worlds(&self) -> Vec<WorldId> {
        let mut worlds: Vec<WorldId> = self.worlds.read().keys().cloned().collect();
        worlds.sort();
        worlds
    }

    #[must_use]
    pub fn is_dirty(&self, world: &WorldId) -> bool {
        self.slot(world)
            .is_some_and(|s| s.dirty.load(Ordering::Acquire))
    }

    /// Resolves a flag. Unloaded worlds resolve to
    /// `Undefined(UnknownWorld)`.
    #[must_use]
    pub fn query_flag(&self, world: &WorldId, point: BlockVector, flag: &str, subject: &Subject) -> Resolution {
        match self.snapshot(world) {
            Some(set) => self.resolver().resolve(&set, point, flag, subject),
            None => Resolution::Undefined(UndefinedReason::UnknownWorld),
        }
    }

    /// Ids of the regions containing `point`, highest precedence first.
    pub fn regions_at(&self, world: &WorldId, point: BlockVector) -> EngineResult<Vec<RegionId>> {
        let set = self.require_snapshot(world)?;
        Ok(set
            .containing(point)
            .into_iter()
            .map(|r| r.id().clone())
            .collect())
    }

    /// Runs `f` over the regions containing `point` in one snapshot.
    pub fn applicable_regions<R>(
        &self,
        world: &WorldId,
        point: BlockVector,
        f: impl FnOnce(&ApplicableRegions<'_, '_>) -> R,
    ) -> EngineResult<R> {
        let set = self.require_snapshot(world)?;
        let applicable = self.resolver().applicable(&set, point);
        Ok(f(&applicable))
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Adds a region to its world. Flag values are checked against the
    /// registry first.
    pub fn define_region(&self, region: Region) -> EngineResult<()> {
        for (flag, setting) in region.flags() {
            let def = self.registry.require(flag)?;
            for value in setting.values() {
                def.validate(value)?;
            }
        }
        let world = region.world().clone();
        self.mutate(&world, |set| Ok(set.define(region)?))
    }

    pub fn remove_region(&self, world: &WorldId, id: &RegionId) -> EngineResult<RemovedRegion> {
        self.mutate(world, |set| Ok(set.remove(id)?))
    }

    /// Applies a batch of updates to one region atomically.
    pub fn update_region(&self, world: &WorldId, id: &RegionId, updates: &[RegionUpdate]) -> EngineResult<()> {
        let registry = Arc::clone(&self.registry);
        self.mutate(world, |set| {
            for update in updates {
                update.apply(set, id, &registry)?;
            }
            Ok(())
        })
    }

    fn mutate<R>(&self, world: &WorldId, f: impl FnOnce(&mut WorldRegionSet) -> EngineResult<R>) -> EngineResult<R> {
        let slot = self
            .slot(world)
            .ok_or_else(|| EngineError::WorldNotFound(world.clone()))?;
        let _writer = slot.writer.lock();
        if slot.is_detached() {
            return Err(EngineError::WorldNotFound(world.clone()));
        }

        let mut next = WorldRegionSet::clone(&slot.current());
        let result = f(&mut next)?;
        *slot.snapshot.write() = Arc::new(next);
        slot.dirty.store(true, Ordering::Release);
        debug!(%world, "Published region set");
        Ok(result)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Loads a world from storage and publishes it.
    ///
    /// Replacing a loaded world that has unsaved changes is refused, both
    /// before reading storage and again at publication, since edits may
    /// land while the load runs.
    pub fn load_world(&self, world: &WorldId) -> EngineResult<LoadSummary> {
        if self.is_dirty(world) {
            return Err(EngineError::UnsavedChanges(world.clone()));
        }

        let cancel = CancelToken::new();
        self.loading
            .lock()
            .entry(world.clone())
            .or_default()
            .push(cancel.clone());
        let loaded = self.storage.load(world, &cancel);
        self.finish_load(world, &cancel);
        let loaded = loaded?;

        let summary = LoadSummary {
            regions: loaded.set.len(),
            migrated_from: loaded.migrated_from,
        };
        let dirty = loaded.migrated_from.is_some();
        let fresh = Arc::new(loaded.set);
        loop {
            let existing = {
                let mut worlds = self.worlds.write();
                match worlds.get(world) {
                    Some(slot) => Arc::clone(slot),
                    None => {
                        worlds.insert(world.clone(), Arc::new(WorldSlot::new(fresh, dirty)));
                        return Ok(summary);
                    }
                }
            };

            let _writer = existing.writer.lock();
            if existing.is_detached() {
                // Unloaded meanwhile; the map no longer holds it.
                continue;
            }
            if existing.dirty.load(Ordering::Acquire) {
                return Err(EngineError::UnsavedChanges(world.clone()));
            }
            *existing.snapshot.write() = fresh;
            existing.dirty.store(dirty, Ordering::Release);
            debug!(%world, "Replaced region set");
            return Ok(summary);
        }
    }

    fn finish_load(&self, world: &WorldId, cancel: &CancelToken) {
        let mut loading = self.loading.lock();
        if let Some(tokens) = loading.get_mut(world) {
            tokens.retain(|t| !t.same(cancel));
            if tokens.is_empty() {
                loading.remove(world);
            }
        }
    }

    /// Loads several worlds; each succeeds or fails on its own.
    pub fn load_worlds(&self, worlds: &[WorldId]) -> Vec<(WorldId, EngineResult<LoadSummary>)> {
        worlds
            .iter()
            .map(|world| {
                let result = self.load_world(world);
                if let Err(e) = &result {
                    warn!(%world, error = %e, "World failed to load");
                }
                (world.clone(), result)
            })
            .collect()
    }

    /// Cancels every in-flight load of `world`. Returns false if none is
    /// running.
    pub fn cancel_load(&self, world: &WorldId) -> bool {
        match self.loading.lock().get(world) {
            Some(tokens) => {
                tokens.iter().for_each(CancelToken::cancel);
                true
            }
            None => false,
        }
    }

    /// Writes a loaded world to storage and clears its dirty mark.
    pub fn save_world(&self, world: &WorldId) -> EngineResult<()> {
        let slot = self
            .slot(world)
            .ok_or_else(|| EngineError::WorldNotLoaded(world.clone()))?;
        let _writer = slot.writer.lock();
        self.save_locked(world, &slot)
    }

    /// Caller holds `slot.writer`.
    fn save_locked(&self, world: &WorldId, slot: &WorldSlot) -> EngineResult<()> {
        if slot.is_detached() {
            return Err(EngineError::WorldNotLoaded(world.clone()));
        }
        self.storage.save(&slot.current())?;
        slot.dirty.store(false, Ordering::Release);
        Ok(())
    }

    /// Saves every world with unsaved changes.
    pub fn save_dirty(&self) -> Vec<(WorldId, EngineResult<()>)> {
        self.worlds()
            .into_iter()
            .filter(|w| self.is_dirty(w))
            .map(|world| {
                let result = self.save_world(&world);
                if let Err(e) = &result {
                    warn!(%world, error = %e, "Failed to save regions");
                }
                (world, result)
            })
            .collect()
    }

    /// Saves the world if needed and stops serving it. The writer lock is
    /// held from the save through the removal, so no edit slips in between.
    pub fn unload_world(&self, world: &WorldId) -> EngineResult<Arc<WorldRegionSet>> {
        let slot = self
            .slot(world)
            .ok_or_else(|| EngineError::WorldNotLoaded(world.clone()))?;
        let _writer = slot.writer.lock();
        if slot.is_detached() {
            return Err(EngineError::WorldNotLoaded(world.clone()));
        }
        if slot.dirty.load(Ordering::Acquire) {
            self.save_locked(world, &slot)?;
        }

        slot.detached.store(true, Ordering::Release);
        {
            let mut worlds = self.worlds.write();
            if worlds.get(world).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                worlds.remove(world);
            }
        }
        info!(%world, "Unloaded regions");
        Ok(slot.current())
    }

    fn slot(&self, world: &WorldId) -> Option<Arc<WorldSlot>> {
        self.worlds.read().get(world).cloned()
    }

    fn require_snapshot(&self, world: &WorldId) -> EngineResult<Arc<WorldRegionSet>> {
        self.snapshot(world)
            .ok_or_else(|| EngineError::WorldNotFound(world.clone()))
    }
}
