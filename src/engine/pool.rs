//! Per-type component pools.
//!
//! A pool owns every instance of one component type, stored densely in a
//! [`BlockVec`] together with owner identification. Pools are held by the
//! world behind the object-safe [`ComponentPool`] trait so that structural
//! operations (destroy, clone, swap-erase) can run without knowing the
//! component type.
//!
//! Deletion is swap-erase: the last record moves into the vacated index and
//! the pool reports the moved record's owner so the world can rewrite that
//! entity's dense index list and proxy cache. The capability set is small
//! and closed; dynamic dispatch overhead is amortized by the work performed
//! per call.

use std::any::Any;
use std::ops::{Deref, DerefMut};

use crate::engine::storage::BlockVec;
use crate::engine::types::DenseIndex;

/// Owner identification shared by every pool record, independent of the
/// component type.
///
/// [`ComponentRecord`] is `#[repr(C)]` with this exact prefix, so a
/// type-erased record pointer can always be read as a `RecordHeader` to
/// validate ownership.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    /// Arena slot of the owning entity.
    pub slot: u32,

    /// Generation of the owning entity at the time of insertion.
    pub gen: u32,
}

/// One pool entry: owner identification plus the component payload.
#[repr(C)]
#[derive(Clone)]
pub struct ComponentRecord<T> {
    /// Arena slot of the owning entity.
    pub slot: u32,

    /// Generation of the owning entity at the time of insertion.
    pub gen: u32,

    /// The component value.
    pub data: T,
}

impl<T> Deref for ComponentRecord<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for ComponentRecord<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

/// Owner of the record that a swap-erase moved into the vacated index.
#[derive(Clone, Copy, Debug)]
pub struct MovedRecord {
    /// Arena slot of the moved record's owner.
    pub slot: u32,

    /// Generation of the moved record's owner.
    pub gen: u32,
}

/// Dense storage for all instances of component type `T`.
pub struct Pool<T> {
    records: BlockVec<ComponentRecord<T>>,
}

impl<T: 'static + Clone> Default for Pool<T> {
    fn default() -> Self {
        Self { records: BlockVec::new() }
    }
}

impl<T: 'static + Clone> Pool<T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record for the given owner and returns its dense index.
    pub fn emplace(&mut self, slot: u32, gen: u32, data: T) -> DenseIndex {
        self.records.push(ComponentRecord { slot, gen, data }) as DenseIndex
    }

    /// Shared access to the record at `index`.
    #[inline]
    pub fn record(&self, index: DenseIndex) -> &ComponentRecord<T> {
        self.records.get(index as usize).expect("dense index out of bounds")
    }

    /// Mutable access to the record at `index`.
    #[inline]
    pub fn record_mut(&mut self, index: DenseIndex) -> &mut ComponentRecord<T> {
        self.records.get_mut(index as usize).expect("dense index out of bounds")
    }
}

/// Type-erased pool capabilities used by the world.
pub trait ComponentPool {
    /// Number of live records.
    fn len(&self) -> usize;

    /// Returns `true` if the pool holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Swap-erases the record at `index`.
    ///
    /// If another record was moved into `index` to fill the hole, returns
    /// that record's owner; the caller must rewrite the owner's dense index
    /// list and proxy cache. The move is complete before this returns, so
    /// the new record is already visible at `index`.
    fn swap_remove(&mut self, index: DenseIndex) -> Option<MovedRecord>;

    /// Appends a copy of the record at `src` under a new owner and returns
    /// the copy's dense index.
    fn clone_record(&mut self, dst_slot: u32, dst_gen: u32, src: DenseIndex) -> DenseIndex;

    /// Type-erased pointer to the record at `index`, valid until the pool
    /// mutates that index. Readable as a [`RecordHeader`].
    fn record_ptr(&mut self, index: DenseIndex) -> *mut u8;

    /// Deep copy of the pool.
    fn clone_pool(&self) -> Box<dyn ComponentPool>;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static + Clone> ComponentPool for Pool<T> {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn swap_remove(&mut self, index: DenseIndex) -> Option<MovedRecord> {
        let last = self.records.len() - 1;
        let _removed = self.records.swap_remove(index as usize);
        if (index as usize) < last {
            let moved = self.record(index);
            Some(MovedRecord { slot: moved.slot, gen: moved.gen })
        } else {
            None
        }
    }

    fn clone_record(&mut self, dst_slot: u32, dst_gen: u32, src: DenseIndex) -> DenseIndex {
        let data = self.record(src).data.clone();
        self.emplace(dst_slot, dst_gen, data)
    }

    fn record_ptr(&mut self, index: DenseIndex) -> *mut u8 {
        self.record_mut(index) as *mut ComponentRecord<T> as *mut u8
    }

    fn clone_pool(&self) -> Box<dyn ComponentPool> {
        Box::new(Pool { records: self.records.clone() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
