// SPDX-License-Identifier: MIT

//! ID generation abstractions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for truncating string identifiers to a short prefix.
pub trait ShortId {
    /// Returns a string slice truncated to at most `n` characters.
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        if self.len() <= n {
            self
        } else {
            &self[..n]
        }
    }
}

/// Define a newtype ID wrapper around `u64`.
///
/// Generates `new()`, `get()`, `Display`, `Ord`/`PartialOrd`, and
/// `From<u64>` implementations. Used for identifiers that are allocated
/// monotonically rather than generated at random (unlike [`IdGen`]-backed
/// string ids).
///
/// ```ignore
/// define_numeric_id! {
///     /// Doc comment for the ID type.
///     pub struct MyId;
/// }
/// ```
#[macro_export]
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

crate::define_numeric_id! {
    /// Unique, monotonically increasing identifier for a queue item.
    /// Preserved across stage transitions (I3 in DESIGN.md).
    pub struct ItemId;
}

crate::define_numeric_id! {
    /// Identifier for a work unit handed to an executor.
    pub struct WorkUnitId;
}

/// Monotonically increasing [`ItemId`] allocator.
///
/// `next()` is lock-free; `seed()` primes the counter above a value seen
/// during persistence load, so restored items never collide with newly
/// allocated ones.
#[derive(Debug, Clone, Default)]
pub struct ItemIdAllocator {
    next: Arc<AtomicU64>,
}

impl ItemIdAllocator {
    pub fn new() -> Self {
        Self {
            next: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Allocate the next id.
    pub fn next(&self) -> ItemId {
        ItemId(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// Ensure future allocations are strictly greater than `seen`.
    pub fn seed(&self, seen: ItemId) {
        self.next.fetch_max(seen.get() + 1, Ordering::SeqCst);
    }
}

/// Monotonically increasing [`WorkUnitId`] allocator.
#[derive(Debug, Clone, Default)]
pub struct WorkUnitIdAllocator {
    next: Arc<AtomicU64>,
}

impl WorkUnitIdAllocator {
    pub fn new() -> Self {
        Self {
            next: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn next(&self) -> WorkUnitId {
        WorkUnitId(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// Generates unique opaque string identifiers (used for [`WorkUnitId`]
/// display names and similar non-ordering-sensitive ids).
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> String;
}

/// UUID-based id generator for production use.
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
