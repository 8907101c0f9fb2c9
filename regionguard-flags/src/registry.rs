//! The set of known flags.
//!
//! Built-in flags are registered first; host plugins may add their own
//! until the registry is locked at start-up completion.

use crate::definition::FlagDefinition;
use crate::error::{FlagError, FlagResult};
use crate::group::RegionGroup;
use std::collections::BTreeMap;

/// Game modes accepted by the `game-mode` flag.
pub const GAME_MODES: [&str; 4] = ["survival", "creative", "adventure", "spectator"];

/// Registry of flag definitions keyed by lower-case name.
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    flags: BTreeMap<String, FlagDefinition>,
    locked: bool,
}

impl FlagRegistry {
    /// An empty, unlocked registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in flags.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for def in builtin_flags() {
            registry.flags.insert(def.name.clone(), def);
        }
        registry
    }

    /// Adds a flag definition. Names are normalised to lower case.
    pub fn register(&mut self, mut def: FlagDefinition) -> FlagResult<()> {
        let name = def.name.to_ascii_lowercase();
        if !is_valid_name(&name) {
            return Err(FlagError::InvalidName(def.name));
        }
        if self.locked {
            return Err(FlagError::RegistryLocked(name));
        }
        if self.flags.contains_key(&name) {
            return Err(FlagError::DuplicateFlag(name));
        }
        if let Some(default) = &def.default {
            def.validate(default)?;
        }
        def.name = name.clone();
        self.flags.insert(name, def);
        Ok(())
    }

    /// Looks up a flag; the name is matched case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagDefinition> {
        match self.flags.get(name) {
            Some(def) => Some(def),
            None => self.flags.get(&name.to_ascii_lowercase()),
        }
    }

    /// Like [`FlagRegistry::get`] but reports unknown flags as an error.
    pub fn require(&self, name: &str) -> FlagResult<&FlagDefinition> {
        self.get(name)
            .ok_or_else(|| FlagError::UnknownFlag(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &FlagDefinition> {
        self.flags.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Refuses further registrations.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

fn builtin_flags() -> Vec<FlagDefinition> {
    vec![
        // Protection
        FlagDefinition::boolean("build", Some(true)).scoped(),
        FlagDefinition::boolean("block-break", Some(true)).scoped(),
        FlagDefinition::boolean("block-place", Some(true)).scoped(),
        FlagDefinition::boolean("interact", Some(true)).scoped(),
        FlagDefinition::boolean("use", Some(true)).scoped(),
        FlagDefinition::boolean("chest-access", Some(true)).scoped(),
        FlagDefinition::boolean("damage-animals", Some(true)).scoped(),
        FlagDefinition::group("build-group", Some(RegionGroup::Members)),
        FlagDefinition::boolean("passthrough", None),
        // Movement
        FlagDefinition::boolean("entry", Some(true)).scoped(),
        FlagDefinition::boolean("exit", Some(true)).scoped(),
        FlagDefinition::string("entry-deny-message", Some("Hey! You are not permitted to enter this area.")),
        FlagDefinition::string("greeting", None).scoped(),
        FlagDefinition::string("farewell", None).scoped(),
        FlagDefinition::string("deny-message", Some("Hey! Sorry, but you can't do that here.")),
        // Combat
        FlagDefinition::boolean("pvp", Some(true)),
        FlagDefinition::boolean("invincible", Some(false)).scoped(),
        // Environment
        FlagDefinition::boolean("mob-spawning", Some(true)),
        FlagDefinition::boolean("creeper-explosion", Some(true)),
        FlagDefinition::boolean("tnt", Some(true)),
        FlagDefinition::boolean("fire-spread", Some(true)),
        FlagDefinition::boolean("lava-flow", Some(true)),
        FlagDefinition::boolean("water-flow", Some(true)),
        FlagDefinition::boolean("leaf-decay", Some(true)),
        // Player state
        FlagDefinition::choice("game-mode", &GAME_MODES, None).scoped(),
        FlagDefinition::numeric("heal-amount", None).scoped(),
        FlagDefinition::numeric("heal-delay", None),
        FlagDefinition::numeric("feed-amount", None).scoped(),
    ]
}
