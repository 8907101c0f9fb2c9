//! Flags for RegionGuard.
//!
//! A flag is a named, typed behavioural override (for example `build` or
//! `pvp`) with a default and optional per-region values:
//! - [`FlagDefinition`]: name, [`FlagKind`], default, enum options, scoping
//! - [`FlagValue`]: a concrete typed value
//! - [`FlagSetting`]: what one region stores for one flag, including
//!   owner/member overrides
//! - [`FlagRegistry`]: the known flags, built-ins included
//! - [`FlagDefaults`]: configured server-wide default overrides
//! - [`RegionGroup`] / [`Membership`]: actor-relative groups

mod defaults;
mod definition;
mod error;
mod group;
mod registry;
mod setting;
mod value;

pub use defaults::FlagDefaults;
pub use definition::FlagDefinition;
pub use error::{FlagError, FlagResult};
pub use group::{Membership, RegionGroup};
pub use registry::{FlagRegistry, GAME_MODES};
pub use setting::{FlagSetting, SettingPart};
pub use value::{FlagKind, FlagValue};
