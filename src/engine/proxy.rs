//! Cached per-entity accessor.
//!
//! ## Purpose
//! An [`EntityProxy`] fronts repeated component lookups for one entity with
//! a per-component-type pointer cache, skipping handle validation and rank
//! arithmetic on the hot path. Proxies are shared: user code holds strong
//! [`Rc`](std::rc::Rc) references obtained from
//! [`World::get_proxy`](crate::engine::world::World::get_proxy), while the
//! world keeps a weak back-reference in the entity's metadata so it can
//! push cache updates. The proxy lives as long as its longest holder.
//!
//! ## Cache states
//! Each cache slot is tri-state:
//! - null — never queried,
//! - a sentinel non-dereferenceable value — queried, component absent,
//! - otherwise — a borrowed pointer to the component record in its pool.
//!
//! Cached pointers are validated against the record's owner slot and
//! generation before use, so a stale hit falls through to a fresh world
//! lookup instead of returning another entity's data.
//!
//! ## Coherence
//! The world invalidates or refreshes the affected slot on component add,
//! remove, swap-erase moves, entity destruction, and snapshot restore. A
//! proxy observes itself dead once its entity is destroyed, the world is
//! restored, or the world is dropped.
//!
//! ## Borrow discipline
//! References returned by [`try_get`](EntityProxy::try_get) borrow from the
//! world's pools. They are invalidated by any subsequent structural
//! mutation of the world (add/remove/destroy/restore); callers must not
//! hold them across such mutations.

use std::cell::Cell;
use std::ptr;

use crate::engine::component::component_id_of;
use crate::engine::pool::{ComponentRecord, RecordHeader};
use crate::engine::types::{ComponentId, Entity, MAX_COMPONENTS};
use crate::engine::world::World;

/// Cached accessor for a single entity. See the module docs.
pub struct EntityProxy {
    world: Cell<*mut World>,
    entity: Cell<Entity>,
    alive: Cell<bool>,
    cache: [Cell<*mut u8>; MAX_COMPONENTS],
}

impl EntityProxy {
    /// Sentinel distinguishing "queried, absent" from "never queried".
    #[inline]
    fn missing_tag() -> *mut u8 {
        1 as *mut u8
    }

    pub(crate) fn new(world: *mut World, entity: Entity) -> Self {
        Self {
            world: Cell::new(world),
            entity: Cell::new(entity),
            alive: Cell::new(true),
            cache: std::array::from_fn(|_| Cell::new(ptr::null_mut())),
        }
    }

    /// The handle this proxy was created for.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity.get()
    }

    /// Returns `true` while the proxy's entity is alive in its world.
    pub fn is_alive(&self) -> bool {
        if !self.alive.get() {
            return false;
        }
        let world = self.world.get();
        if world.is_null() {
            return false;
        }
        // SAFETY: the world marks every outstanding proxy dead before it is
        // dropped or restored, so a live proxy's world pointer is valid.
        unsafe { (*world).is_alive(self.entity.get()) }
    }

    /// Returns the cached component of type `T`, or `None` if the entity is
    /// dead or does not carry one.
    ///
    /// A stale cache entry (the record moved or changed owner) is detected
    /// by owner validation and falls through to a fresh lookup.
    pub fn try_get<T: 'static + Clone>(&self) -> Option<&T> {
        if !self.alive.get() {
            return None;
        }
        let world = self.world.get();
        if world.is_null() {
            return None;
        }

        let cid = component_id_of::<T>();
        let cached = self.cache[cid as usize].get();
        if cached == Self::missing_tag() {
            return None;
        }
        if !cached.is_null() {
            let entity = self.entity.get();
            // SAFETY: present cache entries point at a live pool record
            // (the world refreshes this slot whenever that record moves or
            // is erased), and ComponentRecord<T> is repr(C) with a
            // RecordHeader prefix.
            let header = unsafe { *(cached as *const RecordHeader) };
            if header.slot == entity.slot && header.gen == entity.gen {
                let record = cached as *mut ComponentRecord<T>;
                // SAFETY: owner validated; see above.
                return Some(unsafe { &(*record).data });
            }
            self.cache[cid as usize].set(ptr::null_mut());
        }

        // SAFETY: see is_alive; the world outlives every live proxy.
        let world = unsafe { &mut *world };
        match world.record_ptr_for::<T>(self.entity.get()) {
            Some(record) => {
                self.cache[cid as usize].set(record as *mut u8);
                // SAFETY: the pointer was just produced from a live record.
                Some(unsafe { &(*record).data })
            }
            None => {
                self.cache[cid as usize].set(Self::missing_tag());
                None
            }
        }
    }

    /// Returns the component of type `T`.
    ///
    /// ## Panics
    /// Panics if the entity is dead or does not carry `T`.
    pub fn get<T: 'static + Clone>(&self) -> &T {
        self.try_get::<T>().expect("entity does not carry the requested component")
    }

    /// Returns `true` if the entity currently carries component `T`.
    pub fn has<T: 'static + Clone>(&self) -> bool {
        self.try_get::<T>().is_some()
    }

    pub(crate) fn cache_present(&self, component_id: ComponentId, record: *mut u8) {
        self.cache[component_id as usize].set(record);
    }

    pub(crate) fn cache_missing(&self, component_id: ComponentId) {
        self.cache[component_id as usize].set(Self::missing_tag());
    }

    pub(crate) fn invalidate_all(&self) {
        for slot in &self.cache {
            slot.set(ptr::null_mut());
        }
    }

    pub(crate) fn mark_dead(&self) {
        self.alive.set(false);
        self.world.set(ptr::null_mut());
        self.entity.set(Entity::NULL);
    }
}
