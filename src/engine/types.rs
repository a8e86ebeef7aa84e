//! Core Types, Identifiers, and Bit-Level Layouts
//!
//! This module defines the fundamental types, identifiers, and bit layouts
//! shared across the store: component identifiers, dense pool indices, the
//! generational entity handle, and the per-entity [`Signature`] bitset.
//!
//! ## Entity Representation
//!
//! An [`Entity`] handle carries three values:
//!
//! - **id** — a strictly monotonic 64-bit identifier, never reused for the
//!   lifetime of a world. Suitable for debugging, deterministic ordering,
//!   and map keys.
//! - **slot** — an index into the world's entity arena. Slots are reused
//!   after destruction, so a slot alone is not a stable identifier.
//! - **gen** — a generation counter (low 31 bits) plus an alive flag in the
//!   most significant bit. Together with the slot this forms the stable
//!   handle: a handle is valid only while the slot's stored generation
//!   matches exactly.
//!
//! Packing the alive flag into the generation makes handle validation a
//! single equality test after fetching the slot.
//!
//! ## Signatures
//!
//! Each entity records which component types it carries in a fixed-size
//! bitset of [`MAX_COMPONENTS`] bits. Signatures additionally answer the
//! *rank* query — how many set bits lie strictly below a given position —
//! which maps a [`ComponentId`] to the entity's per-slot list of dense pool
//! indices without a hash table.
//!
//! All capacities here are compile-time constants, validated by static
//! assertions. Block sizes affect performance only, never observable
//! behavior.

/// Unique identifier for a component type.
pub type ComponentId = u16;

/// Position of a component record inside its per-type pool.
pub type DenseIndex = u32;

/// Maximum number of distinct component types registrable in a process.
///
/// Sizes every signature bitset and every proxy cache array.
pub const MAX_COMPONENTS: usize = 128;

/// Number of `u64` words backing a [`Signature`].
pub const SIGNATURE_WORDS: usize = (MAX_COMPONENTS + 63) / 64;

/// Sentinel for "no index" (free-list terminator, unfilled dense index).
pub const INVALID_INDEX: u32 = u32::MAX;

/// Alive flag stored in the most significant bit of a generation value.
pub const GEN_ALIVE_BIT: u32 = 0x8000_0000;

/// Mask selecting the generation counter (low 31 bits).
pub const GEN_MASK: u32 = 0x7FFF_FFFF;

/// Number of entity slots per arena block.
pub const ENTITY_BLOCK_CAP: usize = 4096;

/// Number of component records per pool block.
pub const POOL_BLOCK_CAP: usize = 4096;

const _: [(); 1] = [(); (MAX_COMPONENTS > 0) as usize];
const _: [(); 1] = [(); (MAX_COMPONENTS <= (ComponentId::MAX as usize) + 1) as usize];
const _: [(); 1] = [(); (ENTITY_BLOCK_CAP > 0) as usize];
const _: [(); 1] = [(); (POOL_BLOCK_CAP > 0) as usize];

/// Generational handle identifying an entity instance.
///
/// Handles are cheap to copy and compare. A stale handle (one whose entity
/// has been destroyed) is rejected by every world operation; slot reuse
/// cannot resurrect it until the slot's 31-bit generation counter wraps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Monotonic, never-reused identifier assigned at creation.
    pub id: u64,

    /// Index into the world's entity arena. Reused after destruction.
    pub slot: u32,

    /// Generation counter plus alive flag ([`GEN_ALIVE_BIT`]).
    pub gen: u32,
}

impl Entity {
    /// The null handle. Never valid in any world.
    pub const NULL: Entity = Entity { id: 0, slot: 0, gen: 0 };

    /// Returns `true` if this is the null handle.
    #[inline]
    pub fn is_null(self) -> bool {
        self.id == 0
    }
}

/// Bitset recording which component types an entity carries.
///
/// Bit `c` corresponds to [`ComponentId`] `c`. The set supports the usual
/// bit operations plus [`rank`](Signature::rank), the position-in-sorted-
/// order query the per-entity dense index list is keyed by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    /// Packed component bitset.
    pub words: [u64; SIGNATURE_WORDS],
}

/// Zeroes all bits of `value` at positions `>= k`. Requires `k < 64`.
#[inline]
fn clear_high_bits(value: u64, k: usize) -> u64 {
    debug_assert!(k < 64);
    value & ((1u64 << k) - 1)
}

impl Signature {
    /// Sets the bit corresponding to `component_id`.
    #[inline]
    pub fn set(&mut self, component_id: ComponentId) {
        debug_assert!((component_id as usize) < MAX_COMPONENTS);
        let index = (component_id as usize) / 64;
        let bits = (component_id as usize) % 64;
        self.words[index] |= 1u64 << bits;
    }

    /// Clears the bit corresponding to `component_id`.
    #[inline]
    pub fn clear(&mut self, component_id: ComponentId) {
        debug_assert!((component_id as usize) < MAX_COMPONENTS);
        let index = (component_id as usize) / 64;
        let bits = (component_id as usize) % 64;
        self.words[index] &= !(1u64 << bits);
    }

    /// Returns `true` if `component_id` is present in this signature.
    #[inline]
    pub fn has(&self, component_id: ComponentId) -> bool {
        debug_assert!((component_id as usize) < MAX_COMPONENTS);
        let index = (component_id as usize) / 64;
        let bits = (component_id as usize) % 64;
        (self.words[index] >> bits) & 1 == 1
    }

    /// Clears every bit.
    #[inline]
    pub fn clear_all(&mut self) {
        self.words = [0u64; SIGNATURE_WORDS];
    }

    /// Returns the total number of set bits.
    #[inline]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns the number of set bits strictly below `component_id`.
    ///
    /// ## Semantics
    /// For an entity whose signature has bit `c` set, `rank(c)` is the
    /// position of component `c` in the entity's dense index list (set bits
    /// sorted ascending by id). This is the hot lookup of the whole store:
    /// masked popcounts over at most [`SIGNATURE_WORDS`] words, no memory
    /// indirection beyond the signature itself.
    #[inline]
    pub fn rank(&self, component_id: ComponentId) -> usize {
        debug_assert!((component_id as usize) < MAX_COMPONENTS);
        let word = (component_id as usize) / 64;
        let bit = (component_id as usize) % 64;
        let mut count = clear_high_bits(self.words[word], bit).count_ones() as usize;
        for w in &self.words[..word] {
            count += w.count_ones() as usize;
        }
        count
    }

    /// Returns `true` if every bit set in `other` is also set in `self`.
    #[inline]
    pub fn contains_all(&self, other: &Signature) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(word, required)| (word & required) == *required)
    }

    /// Iterates over all set component ids in ascending order.
    ///
    /// The ascending order is load-bearing: destruction and bulk copies
    /// walk this iterator in lockstep with the entity's dense index list.
    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.words.iter().enumerate().flat_map(|(word_index, &word)| {
            let base = word_index * 64;
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some((base + tz) as ComponentId)
            })
        })
    }
}
