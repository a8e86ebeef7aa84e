//! Error types for component registration.
//!
//! The store's public surface reports recoverable outcomes by nullability
//! (`Option`, `bool`, no-op mutators) and treats contract violations as
//! assertions, so the only operations with a genuine error channel are the
//! ones touching process-global state: the component registry. Each error
//! type here models a single failure mode, carries enough context to make
//! the failure actionable, and implements [`std::error::Error`] and
//! [`fmt::Display`].
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is optimized for operator logs (short, imperative
//!   phrasing).
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.

use std::fmt;

/// Result alias for component-registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Returned when the component registry cannot satisfy a request.
///
/// ### Variants
/// * `CapacityExceeded` — more distinct component types were registered
///   than the compile-time bound allows.
/// * `PoisonedLock` — a thread panicked while holding the registry lock.
///
/// ### Example
/// ```ignore
/// let id = try_component_id_of::<Position>()?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Registration would exceed the maximum number of component types.
    CapacityExceeded {
        /// The compile-time bound that was hit.
        capacity: usize,
    },

    /// The registry lock was poisoned by a panic in another thread.
    PoisonedLock,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::CapacityExceeded { capacity } => {
                write!(f, "component type limit reached (capacity {})", capacity)
            }
            RegistryError::PoisonedLock => f.write_str("component registry lock poisoned"),
        }
    }
}

impl std::error::Error for RegistryError {}
