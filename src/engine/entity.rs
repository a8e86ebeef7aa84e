//! # Entity Metadata Arena
//!
//! This module defines per-entity metadata and the block-allocated arena
//! that owns it.
//!
//! ## Purpose
//! Every entity is described by one [`EntityMeta`] slot: its monotonic id,
//! its generation (with alive flag), its component [`Signature`], and the
//! rank-indexed list of dense pool indices. The [`EntityArena`] allocates,
//! reuses, and addresses these slots with stable addresses.
//!
//! ## Design
//! - Slots are allocated from a bump frontier, or reused from an intrusive
//!   free list. While a slot sits on the free list, its `entity_id` field
//!   is reinterpreted as the next-free-slot index.
//! - Storage grows by appending fixed-size blocks that are never moved, so
//!   references obtained from [`at`](EntityArena::at) survive later
//!   allocations.
//! - Freeing a slot does not drop its metadata; the slot is reused in
//!   place, which lets the dense index list keep its allocation across
//!   lifetimes. Metadata is dropped only when the arena itself drops.
//!
//! ## Invariants
//! - `dense.len() == signature.count()` at every external observation
//!   point.
//! - Slots below the bump frontier are always initialized, free or not.
//! - Free-list links always refer to slots below the bump frontier.
//!
//! ## Error semantics
//! The arena is an internal abstraction used only by the world; all
//! functions assume preconditioned input.

use std::mem::MaybeUninit;
use std::rc::Weak;

use crate::engine::proxy::EntityProxy;
use crate::engine::types::{DenseIndex, Signature, ENTITY_BLOCK_CAP, INVALID_INDEX};

/// Per-entity metadata, addressed only by slot index.
pub struct EntityMeta {
    /// Assigned monotonic id. While the slot is on the free list this field
    /// holds the next-free-slot index instead.
    pub entity_id: u64,

    /// Generation counter plus alive flag.
    pub gen: u32,

    /// Which component types this entity carries.
    pub signature: Signature,

    /// Dense pool index of the k-th component by ascending component id;
    /// always exactly `signature.count()` entries long.
    pub dense: Vec<DenseIndex>,

    /// Back-reference to the entity's proxy, if one was ever handed out.
    /// Never owning; not carried across arena clones.
    pub(crate) proxy: Option<Weak<EntityProxy>>,
}

impl EntityMeta {
    fn new() -> Self {
        Self {
            entity_id: 0,
            gen: 1,
            signature: Signature::default(),
            dense: Vec::new(),
            proxy: None,
        }
    }

    /// Copy for snapshots: everything but the proxy back-reference.
    fn clone_detached(&self) -> Self {
        Self {
            entity_id: self.entity_id,
            gen: self.gen,
            signature: self.signature,
            dense: self.dense.clone(),
            proxy: None,
        }
    }
}

/// Block-allocated slot arena with generational reuse.
pub struct EntityArena {
    blocks: Vec<Box<[MaybeUninit<EntityMeta>; ENTITY_BLOCK_CAP]>>,
    bump: u32,
    free_head: u32,
}

impl Default for EntityArena {
    fn default() -> Self {
        Self { blocks: Vec::new(), bump: 0, free_head: INVALID_INDEX }
    }
}

impl EntityArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump frontier: one past the highest slot ever allocated. Not the
    /// count of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.bump as usize
    }

    /// Returns `true` if no slot was ever allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bump == 0
    }

    #[inline]
    fn slot_ptr(&self, index: u32) -> *const EntityMeta {
        debug_assert!(index < self.bump);
        let block = &self.blocks[index as usize / ENTITY_BLOCK_CAP];
        block[index as usize % ENTITY_BLOCK_CAP].as_ptr()
    }

    #[inline]
    fn slot_ptr_mut(&mut self, index: u32) -> *mut EntityMeta {
        debug_assert!(index < self.bump);
        let block = &mut self.blocks[index as usize / ENTITY_BLOCK_CAP];
        block[index as usize % ENTITY_BLOCK_CAP].as_mut_ptr()
    }

    /// Returns a fresh slot or the head of the free list.
    ///
    /// In the reuse case the slot's generation is preserved from its
    /// previous life; the caller bumps the counter and sets the alive flag.
    pub fn alloc(&mut self) -> u32 {
        if self.free_head != INVALID_INDEX {
            let index = self.free_head;
            self.free_head = self.at(index).entity_id as u32;
            return index;
        }

        let index = self.bump;
        while index as usize / ENTITY_BLOCK_CAP >= self.blocks.len() {
            self.blocks.push(Box::new(std::array::from_fn(|_| MaybeUninit::uninit())));
        }
        self.bump += 1;
        // SAFETY: slot `index` is freshly allocated and was never
        // initialized; `bump` was advanced first so slot_ptr_mut's bound
        // check passes.
        unsafe { self.slot_ptr_mut(index).write(EntityMeta::new()) };
        index
    }

    /// Pushes `index` onto the free list. The slot's metadata is not
    /// dropped; its `entity_id` field now carries the free-list link.
    pub fn free(&mut self, index: u32) {
        let head = self.free_head;
        self.at_mut(index).entity_id = head as u64;
        self.free_head = index;
    }

    /// Unchecked indexed access; the caller must have validated the handle.
    #[inline]
    pub fn at(&self, index: u32) -> &EntityMeta {
        // SAFETY: all slots below the bump frontier are initialized.
        unsafe { &*self.slot_ptr(index) }
    }

    /// Unchecked mutable indexed access.
    #[inline]
    pub fn at_mut(&mut self, index: u32) -> &mut EntityMeta {
        // SAFETY: all slots below the bump frontier are initialized.
        unsafe { &mut *self.slot_ptr_mut(index) }
    }

    /// Deep copy of every slot below the bump frontier, free-list links
    /// included. Proxy back-references are not carried over.
    pub fn clone_detached(&self) -> EntityArena {
        let mut out = EntityArena::new();
        for index in 0..self.bump {
            let copy = self.at(index).clone_detached();
            while index as usize / ENTITY_BLOCK_CAP >= out.blocks.len() {
                out.blocks.push(Box::new(std::array::from_fn(|_| MaybeUninit::uninit())));
            }
            out.bump = index + 1;
            // SAFETY: slot `index` in `out` is allocated and uninitialized.
            unsafe { out.slot_ptr_mut(index).write(copy) };
        }
        out.free_head = self.free_head;
        out
    }
}

impl Drop for EntityArena {
    fn drop(&mut self) {
        for index in 0..self.bump {
            // SAFETY: every slot below the bump frontier is initialized and
            // dropped exactly once here.
            unsafe { std::ptr::drop_in_place(self.slot_ptr_mut(index)) };
        }
    }
}
