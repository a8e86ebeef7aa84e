//! # Engine Module
//!
//! Internal implementation of the entity-component store.
//!
//! This module contains all core building blocks:
//! - Identifiers, handles, and signatures
//! - The entity metadata arena
//! - Dense block storage and per-type component pools
//! - The world façade
//! - Entity proxies and prefabs
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod component;
pub mod entity;
pub mod error;
pub mod pool;
pub mod prefab;
pub mod proxy;
pub mod storage;
pub mod types;
pub mod world;
