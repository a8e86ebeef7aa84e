//! # ecs_core
//!
//! Single-threaded entity-component store with dense per-type pools,
//! generational handles, cached entity proxies, and snapshot/restore.
//!
//! ## Design Goals
//! - Fast iteration over all instances of one component type
//! - Constant-amortized component add/remove without migrating other data
//! - Safe handles that survive slot reuse
//! - Bulk construction from prefabs and bulk component copy
//! - Deterministic deep snapshot and restore of the whole population
//!
//! The store indexes components without hash tables: each entity carries a
//! fixed-width signature bitset plus a rank-indexed list of dense pool
//! indices, and pools delete by swap-erase with an owner write-back that
//! keeps both structures (and any proxy caches) coherent.

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![deny(dead_code)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Core store types

pub use engine::world::{Snapshot, World};

pub use engine::types::{
    ComponentId, DenseIndex, Entity, Signature, GEN_ALIVE_BIT, GEN_MASK, MAX_COMPONENTS,
};

pub use engine::component::{component_description, component_id_of, try_component_id_of, ComponentDesc};

pub use engine::prefab::{prefab, Prefab, PrefabBundle};

pub use engine::proxy::EntityProxy;

pub use engine::pool::{ComponentPool, ComponentRecord, Pool};

pub use engine::error::{RegistryError, RegistryResult};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used store types.
///
/// Import with:
/// ```rust
/// use ecs_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{component_id_of, prefab, Entity, EntityProxy, Prefab, Snapshot, World};
}
