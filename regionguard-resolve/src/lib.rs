//! Flag resolution for RegionGuard.
//!
//! Answers "what is flag F at point P for subject S" over one world's
//! region set:
//! 1. regions containing P (index candidates, exact geometry check)
//! 2. candidates that are ancestors of another candidate step aside
//! 3. each remaining region walks its lineage child to parent; the first
//!    level with a value decides for that region, with owner and member
//!    overrides applied for scoped flags
//! 4. highest priority wins, then the earliest defined region
//! 5. otherwise `__global__`, then the configured or built-in default
//!
//! Resolution is a pure function of the region set, flag configuration
//! and query, and never fails.

mod applicable;
mod resolution;
mod resolver;

pub use applicable::ApplicableRegions;
pub use resolution::{Resolution, UndefinedReason, ValueSource};
pub use resolver::FlagResolver;
