//! The world: façade over the arena, the pools, and the proxies.
//!
//! ## Purpose
//! [`World`] owns the entity arena, one lazily created pool per component
//! type, the monotonic entity-id counter, and the proxy back-references.
//! Every public operation validates handles and maintains the mutual
//! invariants between the three storage layers:
//!
//! - an entity's dense index list is always exactly as long as its
//!   signature's popcount, ordered by ascending component id;
//! - the record at `pool[c][dense[rank(c)]]` is owned by that entity;
//! - every live pool record points back at a live owner slot whose dense
//!   list points at it.
//!
//! ## Swap-erase write-back
//! Removing a record from a pool moves the pool's last record into the
//! hole. The pool reports the moved record's owner, and the world rewrites
//! that entity's dense index list and refreshes its proxy cache before
//! anything else observes the store.
//!
//! ## Concurrency
//! Single-threaded by design; no internal synchronization. Iteration
//! visitors receive only the current entity and its components, so the
//! iterated pool cannot be structurally mutated from inside a visitor.

use std::rc::Rc;

use log::{debug, trace, warn};

use crate::engine::component::component_id_of;
use crate::engine::entity::{EntityArena, EntityMeta};
use crate::engine::pool::{ComponentPool, ComponentRecord, Pool};
use crate::engine::prefab::{Prefab, PrefabBundle};
use crate::engine::proxy::EntityProxy;
use crate::engine::types::{
    ComponentId, DenseIndex, Entity, Signature, GEN_ALIVE_BIT, GEN_MASK, INVALID_INDEX,
    MAX_COMPONENTS,
};

/// Deep copy of a world's entity and component state.
///
/// Produced by [`World::snapshot`] and consumed by [`World::restore`]. A
/// snapshot carries no proxy state; proxies belong to the live world only.
pub struct Snapshot {
    arena: EntityArena,
    pools: Vec<Option<Box<dyn ComponentPool>>>,
    next_entity_id: u64,
}

/// Container for a population of entities and their components.
pub struct World {
    arena: EntityArena,
    pools: Vec<Option<Box<dyn ComponentPool>>>,
    next_entity_id: u64,
}

fn notify_proxy_present(meta: &EntityMeta, cid: ComponentId, record: *mut u8) {
    if let Some(proxy) = meta.proxy.as_ref().and_then(|weak| weak.upgrade()) {
        proxy.cache_present(cid, record);
    }
}

/// Captures raw pointers to the pool-table slots for `cids` in a single
/// pass, so multi-pool iteration can hold one pointer per pool without
/// overlapping mutable borrows of the table.
fn pool_slots<const N: usize>(
    pools: &mut [Option<Box<dyn ComponentPool>>],
    cids: [ComponentId; N],
) -> [*mut Option<Box<dyn ComponentPool>>; N] {
    let mut out = [std::ptr::null_mut(); N];
    for (index, slot) in pools.iter_mut().enumerate() {
        let slot: *mut Option<Box<dyn ComponentPool>> = slot;
        for (k, cid) in cids.iter().enumerate() {
            if *cid as usize == index {
                out[k] = slot;
            }
        }
    }
    debug_assert!(out.iter().all(|slot| !slot.is_null()));
    out
}

/// Resolves one captured slot to a typed pool pointer.
///
/// # Safety
/// `slot` must come from [`pool_slots`] over a live pool table, and no
/// other pointer to the same slot may be dereferenced while the returned
/// pool pointer is in use.
unsafe fn pool_ptr<T: 'static + Clone>(
    slot: *mut Option<Box<dyn ComponentPool>>,
) -> Option<*mut Pool<T>> {
    let pool = unsafe { (*slot).as_mut() }?;
    pool.as_any_mut().downcast_mut::<Pool<T>>().map(|pool| pool as *mut Pool<T>)
}

fn notify_proxy_missing(meta: &EntityMeta, cid: ComponentId) {
    if let Some(proxy) = meta.proxy.as_ref().and_then(|weak| weak.upgrade()) {
        proxy.cache_missing(cid);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        let mut pools = Vec::with_capacity(MAX_COMPONENTS);
        pools.resize_with(MAX_COMPONENTS, || None);
        Self { arena: EntityArena::new(), pools, next_entity_id: 0 }
    }

    fn validate(&self, entity: Entity) -> Option<u32> {
        if entity.slot as usize >= self.arena.len() {
            return None;
        }
        let meta = self.arena.at(entity.slot);
        if meta.gen & GEN_ALIVE_BIT == 0 || meta.gen != entity.gen || meta.entity_id != entity.id {
            return None;
        }
        Some(entity.slot)
    }

    pub(crate) fn pool_mut<T: 'static + Clone>(&mut self) -> &mut Pool<T> {
        let cid = component_id_of::<T>();
        let entry = &mut self.pools[cid as usize];
        if entry.is_none() {
            debug!("created pool for component id {}", cid);
            *entry = Some(Box::new(Pool::<T>::new()));
        }
        entry
            .as_mut()
            .and_then(|pool| pool.as_any_mut().downcast_mut::<Pool<T>>())
            .expect("component pool type mismatch")
    }

    /// Creates a new entity with no components.
    pub fn create(&mut self) -> Entity {
        let slot = self.arena.alloc();
        self.next_entity_id += 1;
        let id = self.next_entity_id;

        let meta = self.arena.at_mut(slot);
        meta.entity_id = id;
        meta.gen = (meta.gen & GEN_MASK) | GEN_ALIVE_BIT;
        meta.signature.clear_all();
        meta.dense.clear();
        trace!("created entity {} in slot {}", id, slot);
        Entity { id, slot, gen: meta.gen }
    }

    /// Destroys an entity, erasing all of its components. A dead or stale
    /// handle is a no-op.
    pub fn destroy(&mut self, entity: Entity) {
        let Some(slot) = self.validate(entity) else { return };

        {
            let meta = self.arena.at_mut(slot);
            if let Some(proxy) = meta.proxy.take().and_then(|weak| weak.upgrade()) {
                proxy.invalidate_all();
                proxy.mark_dead();
            }
        }

        let (signature, mut dense) = {
            let meta = self.arena.at_mut(slot);
            (meta.signature, std::mem::take(&mut meta.dense))
        };
        for (position, cid) in signature.iter().enumerate() {
            self.erase_record(cid, dense[position]);
        }
        dense.clear();

        // The generation must not change until every pool erase above has
        // run its moved-record write-backs.
        let meta = self.arena.at_mut(slot);
        meta.dense = dense;
        meta.signature.clear_all();
        meta.gen = (meta.gen + 1) & GEN_MASK;
        self.arena.free(slot);
        trace!("destroyed entity {} in slot {}", entity.id, slot);
    }

    /// Returns `true` if the handle refers to a live entity.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.validate(entity).is_some()
    }

    /// Rebuilds a full handle from a compact `(slot, generation)`
    /// reference. Returns [`Entity::NULL`] if the slot is not alive or the
    /// generation does not match.
    pub fn resolve(&self, slot: u32, gen: u32) -> Entity {
        if slot as usize >= self.arena.len() {
            return Entity::NULL;
        }
        let meta = self.arena.at(slot);
        if meta.gen & GEN_ALIVE_BIT == 0 || meta.gen != gen {
            return Entity::NULL;
        }
        Entity { id: meta.entity_id, slot, gen }
    }

    /// Returns `true` if the entity is alive and carries component `T`.
    pub fn has<T: 'static + Clone>(&self, entity: Entity) -> bool {
        match self.validate(entity) {
            Some(slot) => self.arena.at(slot).signature.has(component_id_of::<T>()),
            None => false,
        }
    }

    /// Returns the entity's component of type `T`, if alive and present.
    pub fn try_get<T: 'static + Clone>(&self, entity: Entity) -> Option<&T> {
        let slot = self.validate(entity)?;
        let cid = component_id_of::<T>();
        let meta = self.arena.at(slot);
        if !meta.signature.has(cid) {
            return None;
        }
        let index = meta.dense[meta.signature.rank(cid)];
        let pool = self.pools[cid as usize].as_ref()?.as_any().downcast_ref::<Pool<T>>()?;
        Some(&pool.record(index).data)
    }

    /// Mutable variant of [`try_get`](World::try_get).
    pub fn try_get_mut<T: 'static + Clone>(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = self.validate(entity)?;
        let cid = component_id_of::<T>();
        let index = {
            let meta = self.arena.at(slot);
            if !meta.signature.has(cid) {
                return None;
            }
            meta.dense[meta.signature.rank(cid)]
        };
        let pool = self.pools[cid as usize].as_mut()?.as_any_mut().downcast_mut::<Pool<T>>()?;
        Some(&mut pool.record_mut(index).data)
    }

    /// Returns the entity's component of type `T`.
    ///
    /// ## Panics
    /// Panics if the handle is dead or the component is absent.
    pub fn get<T: 'static + Clone>(&self, entity: Entity) -> &T {
        self.try_get::<T>(entity).expect("entity does not carry the requested component")
    }

    /// Mutable variant of [`get`](World::get).
    ///
    /// ## Panics
    /// Panics if the handle is dead or the component is absent.
    pub fn get_mut<T: 'static + Clone>(&mut self, entity: Entity) -> &mut T {
        self.try_get_mut::<T>(entity).expect("entity does not carry the requested component")
    }

    /// Component access from a compact `(slot, generation)` reference,
    /// without the full handle. Useful for entity references stored inside
    /// components.
    pub fn try_get_at<T: 'static + Clone>(&self, slot: u32, gen: u32) -> Option<&T> {
        if slot as usize >= self.arena.len() {
            return None;
        }
        let meta = self.arena.at(slot);
        if meta.gen & GEN_ALIVE_BIT == 0 || meta.gen != gen {
            return None;
        }
        let cid = component_id_of::<T>();
        if !meta.signature.has(cid) {
            return None;
        }
        let index = meta.dense[meta.signature.rank(cid)];
        let pool = self.pools[cid as usize].as_ref()?.as_any().downcast_ref::<Pool<T>>()?;
        Some(&pool.record(index).data)
    }

    /// Mutable variant of [`try_get_at`](World::try_get_at).
    pub fn try_get_at_mut<T: 'static + Clone>(&mut self, slot: u32, gen: u32) -> Option<&mut T> {
        if slot as usize >= self.arena.len() {
            return None;
        }
        let cid = component_id_of::<T>();
        let index = {
            let meta = self.arena.at(slot);
            if meta.gen & GEN_ALIVE_BIT == 0 || meta.gen != gen {
                return None;
            }
            if !meta.signature.has(cid) {
                return None;
            }
            meta.dense[meta.signature.rank(cid)]
        };
        let pool = self.pools[cid as usize].as_mut()?.as_any_mut().downcast_mut::<Pool<T>>()?;
        Some(&mut pool.record_mut(index).data)
    }

    /// Adds component `T` to the entity and returns it. If the component is
    /// already present, returns the existing value unchanged.
    ///
    /// ## Panics
    /// Panics if the handle is dead or stale.
    pub fn add<T: 'static + Clone>(&mut self, entity: Entity, value: T) -> &mut T {
        let slot = match self.validate(entity) {
            Some(slot) => slot,
            None => panic!("add on a dead or stale entity handle"),
        };
        let cid = component_id_of::<T>();
        if self.arena.at(slot).signature.has(cid) {
            return self.get_mut::<T>(entity);
        }

        let (index, record) = {
            let pool = self.pool_mut::<T>();
            let index = pool.emplace(slot, entity.gen, value);
            (index, pool.record_mut(index) as *mut ComponentRecord<T>)
        };

        let meta = self.arena.at_mut(slot);
        let position = meta.signature.rank(cid);
        meta.signature.set(cid);
        meta.dense.insert(position, index);
        notify_proxy_present(meta, cid, record as *mut u8);

        // SAFETY: record addresses are stable and no pool mutation happened
        // since the pointer was taken.
        unsafe { &mut (*record).data }
    }

    /// Removes component `T` from the entity. A dead handle or an absent
    /// component is a no-op.
    pub fn remove<T: 'static + Clone>(&mut self, entity: Entity) {
        let Some(slot) = self.validate(entity) else { return };
        let cid = component_id_of::<T>();
        let (position, index) = {
            let meta = self.arena.at(slot);
            if !meta.signature.has(cid) {
                return;
            }
            let position = meta.signature.rank(cid);
            (position, meta.dense[position])
        };

        self.erase_record(cid, index);

        let meta = self.arena.at_mut(slot);
        meta.dense.remove(position);
        meta.signature.clear(cid);
        notify_proxy_missing(meta, cid);
    }

    /// Copies every component `src` carries and `dst` lacks onto `dst`.
    /// Components already present on `dst` are left untouched; either
    /// handle being dead makes the whole call a no-op.
    pub fn add_missing_components(&mut self, dst: Entity, src: Entity) {
        let (Some(dst_slot), Some(src_slot)) = (self.validate(dst), self.validate(src)) else {
            return;
        };
        let (src_signature, src_dense) = {
            let meta = self.arena.at(src_slot);
            (meta.signature, meta.dense.clone())
        };

        for (k, cid) in src_signature.iter().enumerate() {
            if self.arena.at(dst_slot).signature.has(cid) {
                continue;
            }
            let Some(pool) = self.pools[cid as usize].as_mut() else { continue };
            let index = pool.clone_record(dst_slot, dst.gen, src_dense[k]);
            let record = pool.record_ptr(index);

            let meta = self.arena.at_mut(dst_slot);
            let position = meta.signature.rank(cid);
            meta.signature.set(cid);
            meta.dense.insert(position, index);
            notify_proxy_present(meta, cid, record);
        }
    }

    /// Visits every live entity carrying component `T`, in dense pool
    /// order. Records whose owner died without cleanup are skipped.
    ///
    /// Structural mutation of pool `T` during iteration is impossible from
    /// inside the visitor (it receives no world access) and must not be
    /// attempted by other means.
    pub fn each<T, F>(&mut self, mut f: F)
    where
        T: 'static + Clone,
        F: FnMut(Entity, &mut T),
    {
        let cid = component_id_of::<T>();
        let Self { arena, pools, .. } = self;
        let Some(pool) = pools[cid as usize].as_mut() else { return };
        let Some(pool) = pool.as_any_mut().downcast_mut::<Pool<T>>() else { return };

        let count = pool.len();
        for index in 0..count {
            let record = pool.record_mut(index as DenseIndex);
            let meta = arena.at(record.slot);
            if meta.gen & GEN_ALIVE_BIT == 0 || meta.gen != record.gen {
                continue;
            }
            let entity = Entity { id: meta.entity_id, slot: record.slot, gen: record.gen };
            f(entity, &mut record.data);
        }
    }

    /// Visits every live entity carrying both `A` and `B`, in the dense
    /// order of pool `A`. Returns without calling the visitor if either
    /// pool does not exist yet.
    ///
    /// ## Panics
    /// Panics if `A` and `B` are the same component type.
    pub fn query2<A, B, F>(&mut self, mut f: F)
    where
        A: 'static + Clone,
        B: 'static + Clone,
        F: FnMut(Entity, &mut A, &mut B),
    {
        let cid_a = component_id_of::<A>();
        let cid_b = component_id_of::<B>();
        assert!(cid_a != cid_b, "query component types must be unique");

        let Self { arena, pools, .. } = self;
        let [slot_a, slot_b] = pool_slots(pools, [cid_a, cid_b]);
        // SAFETY: the ids are distinct, so the captured slots are disjoint.
        let (pool_a, pool_b) = unsafe {
            match (pool_ptr::<A>(slot_a), pool_ptr::<B>(slot_b)) {
                (Some(a), Some(b)) => (a, b),
                _ => return,
            }
        };

        let mut required = Signature::default();
        required.set(cid_a);
        required.set(cid_b);

        // SAFETY: the pool pointers address different pools; the arena is
        // only read.
        unsafe {
            let count = (*pool_a).len();
            for index in 0..count {
                let record_a = (*pool_a).record_mut(index as DenseIndex);
                let meta = arena.at(record_a.slot);
                if meta.gen & GEN_ALIVE_BIT == 0 || meta.gen != record_a.gen {
                    continue;
                }
                if !meta.signature.contains_all(&required) {
                    continue;
                }
                let index_b = meta.dense[meta.signature.rank(cid_b)];
                let record_b = (*pool_b).record_mut(index_b);
                let entity = Entity { id: meta.entity_id, slot: record_a.slot, gen: record_a.gen };
                f(entity, &mut record_a.data, &mut record_b.data);
            }
        }
    }

    /// Three-component variant of [`query2`](World::query2), driven by the
    /// dense order of pool `A`.
    ///
    /// ## Panics
    /// Panics if any two of `A`, `B`, `C` are the same component type.
    pub fn query3<A, B, C, F>(&mut self, mut f: F)
    where
        A: 'static + Clone,
        B: 'static + Clone,
        C: 'static + Clone,
        F: FnMut(Entity, &mut A, &mut B, &mut C),
    {
        let cid_a = component_id_of::<A>();
        let cid_b = component_id_of::<B>();
        let cid_c = component_id_of::<C>();
        assert!(
            cid_a != cid_b && cid_a != cid_c && cid_b != cid_c,
            "query component types must be unique"
        );

        let Self { arena, pools, .. } = self;
        let [slot_a, slot_b, slot_c] = pool_slots(pools, [cid_a, cid_b, cid_c]);
        // SAFETY: the ids are pairwise distinct, so the captured slots are
        // disjoint.
        let (pool_a, pool_b, pool_c) = unsafe {
            match (pool_ptr::<A>(slot_a), pool_ptr::<B>(slot_b), pool_ptr::<C>(slot_c)) {
                (Some(a), Some(b), Some(c)) => (a, b, c),
                _ => return,
            }
        };

        let mut required = Signature::default();
        required.set(cid_a);
        required.set(cid_b);
        required.set(cid_c);

        // SAFETY: the pool pointers address different pools; the arena is
        // only read.
        unsafe {
            let count = (*pool_a).len();
            for index in 0..count {
                let record_a = (*pool_a).record_mut(index as DenseIndex);
                let meta = arena.at(record_a.slot);
                if meta.gen & GEN_ALIVE_BIT == 0 || meta.gen != record_a.gen {
                    continue;
                }
                if !meta.signature.contains_all(&required) {
                    continue;
                }
                let index_b = meta.dense[meta.signature.rank(cid_b)];
                let index_c = meta.dense[meta.signature.rank(cid_c)];
                let record_b = (*pool_b).record_mut(index_b);
                let record_c = (*pool_c).record_mut(index_c);
                let entity = Entity { id: meta.entity_id, slot: record_a.slot, gen: record_a.gen };
                f(entity, &mut record_a.data, &mut record_b.data, &mut record_c.data);
            }
        }
    }

    /// Four-component variant of [`query2`](World::query2), driven by the
    /// dense order of pool `A`.
    ///
    /// ## Panics
    /// Panics if any two of `A`, `B`, `C`, `D` are the same component type.
    pub fn query4<A, B, C, D, F>(&mut self, mut f: F)
    where
        A: 'static + Clone,
        B: 'static + Clone,
        C: 'static + Clone,
        D: 'static + Clone,
        F: FnMut(Entity, &mut A, &mut B, &mut C, &mut D),
    {
        let cids = [
            component_id_of::<A>(),
            component_id_of::<B>(),
            component_id_of::<C>(),
            component_id_of::<D>(),
        ];
        for i in 0..cids.len() {
            for j in i + 1..cids.len() {
                assert!(cids[i] != cids[j], "query component types must be unique");
            }
        }

        let Self { arena, pools, .. } = self;
        let [slot_a, slot_b, slot_c, slot_d] = pool_slots(pools, cids);
        // SAFETY: the ids are pairwise distinct, so the captured slots are
        // disjoint.
        let (pool_a, pool_b, pool_c, pool_d) = unsafe {
            match (
                pool_ptr::<A>(slot_a),
                pool_ptr::<B>(slot_b),
                pool_ptr::<C>(slot_c),
                pool_ptr::<D>(slot_d),
            ) {
                (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
                _ => return,
            }
        };

        let mut required = Signature::default();
        for cid in cids {
            required.set(cid);
        }

        // SAFETY: the pool pointers address different pools; the arena is
        // only read.
        unsafe {
            let count = (*pool_a).len();
            for index in 0..count {
                let record_a = (*pool_a).record_mut(index as DenseIndex);
                let meta = arena.at(record_a.slot);
                if meta.gen & GEN_ALIVE_BIT == 0 || meta.gen != record_a.gen {
                    continue;
                }
                if !meta.signature.contains_all(&required) {
                    continue;
                }
                let index_b = meta.dense[meta.signature.rank(cids[1])];
                let index_c = meta.dense[meta.signature.rank(cids[2])];
                let index_d = meta.dense[meta.signature.rank(cids[3])];
                let record_b = (*pool_b).record_mut(index_b);
                let record_c = (*pool_c).record_mut(index_c);
                let record_d = (*pool_d).record_mut(index_d);
                let entity = Entity { id: meta.entity_id, slot: record_a.slot, gen: record_a.gen };
                f(
                    entity,
                    &mut record_a.data,
                    &mut record_b.data,
                    &mut record_c.data,
                    &mut record_d.data,
                );
            }
        }
    }

    /// Creates an entity from a template, setting its whole signature and
    /// dense index list in one pass.
    ///
    /// ## Panics
    /// Panics if the prefab contains the same component type twice.
    pub fn instantiate<B: PrefabBundle>(&mut self, prefab: &Prefab<B>) -> Entity {
        let entity = self.create();
        if B::COUNT == 0 {
            return entity;
        }

        let mut entries = Vec::with_capacity(B::COUNT);
        prefab.components.collect(&mut entries);
        entries.sort_unstable_by_key(|entry| entry.cid);
        for pair in entries.windows(2) {
            assert!(pair[0].cid != pair[1].cid, "prefab component types must be unique");
        }

        {
            let meta = self.arena.at_mut(entity.slot);
            for entry in &entries {
                meta.signature.set(entry.cid);
            }
            meta.dense.resize(entries.len(), INVALID_INDEX);
        }

        for (position, entry) in entries.iter().enumerate() {
            let index = (entry.emplace)(self, entity.slot, entity.gen, entry.value);
            self.arena.at_mut(entity.slot).dense[position] = index;
        }
        entity
    }

    /// Returns the entity's shared proxy, creating one on first request.
    /// Returns `None` for a dead or stale handle.
    ///
    /// The proxy records this world's address. The world must not be moved
    /// while proxies are in use; dropping or restoring the world marks all
    /// outstanding proxies dead.
    pub fn get_proxy(&mut self, entity: Entity) -> Option<Rc<EntityProxy>> {
        let slot = self.validate(entity)?;
        let world = self as *mut World;
        let meta = self.arena.at_mut(slot);
        if let Some(existing) = meta.proxy.as_ref().and_then(|weak| weak.upgrade()) {
            return Some(existing);
        }
        let proxy = Rc::new(EntityProxy::new(world, entity));
        meta.proxy = Some(Rc::downgrade(&proxy));
        Some(proxy)
    }

    /// Deep copy of the whole population: arena, pools, and the entity-id
    /// counter. Proxy back-references are not copied.
    pub fn snapshot(&self) -> Snapshot {
        debug!("snapshot of {} slots", self.arena.len());
        Snapshot {
            arena: self.arena.clone_detached(),
            pools: self.pools.iter().map(|pool| pool.as_ref().map(|p| p.clone_pool())).collect(),
            next_entity_id: self.next_entity_id,
        }
    }

    /// Replaces the world's state with a deep copy of the snapshot.
    ///
    /// Every proxy issued before the restore observes itself dead
    /// afterwards; fresh proxies can be requested for the restored
    /// entities.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.invalidate_all_proxies();
        self.arena = snapshot.arena.clone_detached();
        self.pools =
            snapshot.pools.iter().map(|pool| pool.as_ref().map(|p| p.clone_pool())).collect();
        self.next_entity_id = snapshot.next_entity_id;
        debug!("restored {} slots", self.arena.len());
    }

    /// Pool-record lookup for the proxy cache-miss path.
    pub(crate) fn record_ptr_for<T: 'static + Clone>(
        &mut self,
        entity: Entity,
    ) -> Option<*mut ComponentRecord<T>> {
        let slot = self.validate(entity)?;
        let cid = component_id_of::<T>();
        let index = {
            let meta = self.arena.at(slot);
            if !meta.signature.has(cid) {
                return None;
            }
            meta.dense[meta.signature.rank(cid)]
        };
        let pool = self.pools[cid as usize].as_mut()?.as_any_mut().downcast_mut::<Pool<T>>()?;
        Some(pool.record_mut(index) as *mut ComponentRecord<T>)
    }

    fn erase_record(&mut self, cid: ComponentId, index: DenseIndex) {
        let moved = match self.pools[cid as usize].as_mut() {
            Some(pool) => pool.swap_remove(index),
            None => return,
        };
        if let Some(moved) = moved {
            self.record_moved(cid, index, moved.slot, moved.gen);
        }
    }

    /// Write-back after a swap-erase moved another entity's record to
    /// `index`: patch that entity's dense index list and refresh its proxy
    /// cache.
    fn record_moved(&mut self, cid: ComponentId, index: DenseIndex, owner_slot: u32, owner_gen: u32) {
        let record = match self.pools[cid as usize].as_mut() {
            Some(pool) => pool.record_ptr(index),
            None => return,
        };

        // Pools only hold records for live owners; a dead owner here means
        // an upstream invariant was broken.
        let in_range = (owner_slot as usize) < self.arena.len();
        debug_assert!(in_range, "swap-erase moved a record with an out-of-range owner");
        if !in_range {
            warn!("swap-erase write-back skipped: owner slot {} out of range", owner_slot);
            return;
        }
        let meta = self.arena.at_mut(owner_slot);
        let alive = meta.gen & GEN_ALIVE_BIT != 0 && meta.gen == owner_gen;
        debug_assert!(alive, "swap-erase moved a record whose owner is dead");
        if !alive {
            warn!("swap-erase write-back skipped: owner slot {} is dead", owner_slot);
            return;
        }

        let position = meta.signature.rank(cid);
        if position < meta.dense.len() {
            meta.dense[position] = index;
        }
        notify_proxy_present(meta, cid, record);
    }

    fn invalidate_all_proxies(&mut self) {
        for slot in 0..self.arena.len() as u32 {
            let meta = self.arena.at_mut(slot);
            if let Some(proxy) = meta.proxy.take().and_then(|weak| weak.upgrade()) {
                proxy.invalidate_all();
                proxy.mark_dead();
            }
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.invalidate_all_proxies();
    }
}
