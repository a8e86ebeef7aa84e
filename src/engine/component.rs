//! # Component Registry
//!
//! This module provides a global registry that assigns stable
//! [`ComponentId`] values to Rust component types on first use.
//!
//! ## Purpose
//! The registry decouples component type information (`TypeId`, name, size,
//! alignment) from runtime storage, so worlds can index their pool tables
//! and signature bitsets by small dense integers instead of hashing type
//! tokens on every access.
//!
//! ## Design
//! - A component type is assigned a compact id in `[0, MAX_COMPONENTS)` the
//!   first time it is seen; subsequent lookups return the same id.
//! - Ids are unique and stable for the lifetime of the process. The order
//!   of assignment depends on first-use order and is not portable across
//!   runs or builds.
//! - A [`ComponentDesc`] per id records the type name, size, and alignment
//!   for diagnostics.
//!
//! ## Invariants
//! - Every registered `TypeId` maps to exactly one id, and `by_id[id]` is
//!   populated if and only if id has been assigned.
//! - Ids never exceed `MAX_COMPONENTS`; exceeding the bound is a programmer
//!   error surfaced at assignment time.
//!
//! ## Concurrency
//! The registry is protected by `RwLock` for concurrent reads and
//! serialized writes. Worlds themselves are single-threaded; the lock only
//! exists because the registry is process-global state.

use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    mem::{align_of, size_of},
    sync::{OnceLock, RwLock},
};

use log::debug;

use crate::engine::error::{RegistryError, RegistryResult};
use crate::engine::types::{ComponentId, MAX_COMPONENTS};

/// Global mapping between Rust component types and compact ids.
struct ComponentRegistry {
    next_id: ComponentId,
    by_type: HashMap<TypeId, ComponentId>,
    by_id: Vec<Option<ComponentDesc>>,
}

static REGISTRY: OnceLock<RwLock<ComponentRegistry>> = OnceLock::new();

fn component_registry() -> &'static RwLock<ComponentRegistry> {
    REGISTRY.get_or_init(|| {
        RwLock::new(ComponentRegistry {
            next_id: 0,
            by_type: HashMap::new(),
            by_id: vec![None; MAX_COMPONENTS],
        })
    })
}

impl ComponentRegistry {
    fn lookup_or_assign<T: 'static>(&mut self) -> RegistryResult<ComponentId> {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return Ok(existing);
        }

        let id = self.next_id;
        if (id as usize) >= MAX_COMPONENTS {
            return Err(RegistryError::CapacityExceeded { capacity: MAX_COMPONENTS });
        }
        self.next_id = id.wrapping_add(1);

        let desc = ComponentDesc::of::<T>().with_id(id);
        self.by_type.insert(type_id, id);
        self.by_id[id as usize] = Some(desc);
        debug!("assigned component id {} to {}", id, desc.name);
        Ok(id)
    }
}

/// Returns the id for component type `T`, assigning one on first use.
///
/// ## Errors
/// - `CapacityExceeded` if more than [`MAX_COMPONENTS`] distinct component
///   types have been seen in this process.
/// - `PoisonedLock` if the registry lock is poisoned.
pub fn try_component_id_of<T: 'static>() -> RegistryResult<ComponentId> {
    let registry = component_registry();

    // Fast path: the common case is a type that already has an id.
    {
        let registry = registry.read().map_err(|_| RegistryError::PoisonedLock)?;
        if let Some(&id) = registry.by_type.get(&TypeId::of::<T>()) {
            return Ok(id);
        }
    }

    let mut registry = registry.write().map_err(|_| RegistryError::PoisonedLock)?;
    registry.lookup_or_assign::<T>()
}

/// Returns the id for component type `T`, assigning one on first use.
///
/// ## Panics
/// Panics if more than [`MAX_COMPONENTS`] distinct component types are ever
/// used, or if the registry lock is poisoned. Both indicate programmer
/// error rather than recoverable conditions.
#[inline]
pub fn component_id_of<T: 'static>() -> ComponentId {
    match try_component_id_of::<T>() {
        Ok(id) => id,
        Err(err) => panic!("component id assignment failed for {}: {}", type_name::<T>(), err),
    }
}

/// Returns a copy of the descriptor for `component_id`, if assigned.
pub fn component_description(component_id: ComponentId) -> Option<ComponentDesc> {
    let registry = component_registry().read().ok()?;
    registry.by_id.get(component_id as usize).copied().flatten()
}

/// Describes a registered component type.
///
/// ## Purpose
/// Provides metadata about a component type for debugging, validation, and
/// tooling. `ComponentDesc` is `Copy` and safe to clone freely.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentDesc {
    /// Runtime identifier assigned to this component type.
    pub component_id: ComponentId,

    /// Rust type name for diagnostics.
    pub name: &'static str,

    /// Runtime `TypeId` of the component.
    pub type_id: TypeId,

    /// Size of the component type in bytes.
    pub size: usize,

    /// Alignment of the component type in bytes.
    pub align: usize,
}

impl ComponentDesc {
    /// Constructs a descriptor for type `T` with `component_id = 0`;
    /// finalize via [`with_id`](ComponentDesc::with_id).
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            component_id: 0,
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
        }
    }

    /// Returns a copy of this descriptor with `component_id` set.
    #[inline]
    pub fn with_id(mut self, component_id: ComponentId) -> Self {
        self.component_id = component_id;
        self
    }
}

impl std::fmt::Display for ComponentDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ComponentDesc {{ id: {}, name: {}, size: {}, align: {} }}",
            self.component_id, self.name, self.size, self.align
        )
    }
}
