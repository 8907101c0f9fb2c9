use crate::definition::FlagDefinition;
use crate::error::FlagResult;
use crate::registry::FlagRegistry;
use crate::value::FlagValue;
use std::collections::HashMap;

/// Server-wide default overrides read from configuration.
///
/// An override replaces the definition's own default for every world.
#[derive(Debug, Clone, Default)]
pub struct FlagDefaults {
    overrides: HashMap<String, FlagValue>,
}

impl FlagDefaults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds overrides from raw configuration values, validating each
    /// against its registered definition.
    pub fn from_json<'a, I>(registry: &FlagRegistry, entries: I) -> FlagResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a serde_json::Value)>,
    {
        let mut defaults = Self::new();
        for (name, raw) in entries {
            let def = registry.require(name)?;
            defaults.overrides.insert(def.name.clone(), def.value_from_json(raw)?);
        }
        Ok(defaults)
    }

    /// Sets an override after validating it against `def`.
    pub fn set(&mut self, def: &FlagDefinition, value: FlagValue) -> FlagResult<()> {
        def.validate(&value)?;
        self.overrides.insert(def.name.clone(), value);
        Ok(())
    }

    /// The effective default for a flag: override first, then definition.
    #[must_use]
    pub fn default_for<'a>(&'a self, def: &'a FlagDefinition) -> Option<&'a FlagValue> {
        self.overrides.get(&def.name).or(def.default.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
