//! Concurrent storage for the container
//!
//! Both maps use DashMap with ahash for lock-free reads from many threads.

use crate::ServiceIdentity;
use crate::factory::{Instance, Registration};
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Build a map with a shard count suited to the expected number of services.
///
/// Default DashMap uses num_cpus * 4 shards which is overkill for
/// typical containers with <50 services.
fn sharded_map<V>(capacity: usize) -> DashMap<ServiceIdentity, V, RandomState> {
    let shard_amount = if capacity <= 16 {
        8
    } else if capacity <= 64 {
        16
    } else {
        32
    };
    DashMap::with_capacity_and_hasher_and_shard_amount(capacity, RandomState::new(), shard_amount)
}

// =============================================================================
// Type Registry
// =============================================================================

/// Mapping from service identity to its registration entry.
///
/// At most one entry exists per identity; inserting replaces the previous one.
pub(crate) struct TypeRegistry {
    entries: DashMap<ServiceIdentity, Registration, RandomState>,
}

impl TypeRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: sharded_map(capacity),
        }
    }

    /// Store an entry, returning the one it replaced
    #[inline]
    pub fn insert(&self, identity: ServiceIdentity, registration: Registration) -> Option<Registration> {
        self.entries.insert(identity, registration)
    }

    /// Clone the entry out of the map so no shard guard outlives the call
    #[inline]
    pub fn lookup(&self, identity: &ServiceIdentity) -> Option<Registration> {
        self.entries.get(identity).map(|entry| entry.value().clone())
    }

    #[inline]
    pub fn contains(&self, identity: &ServiceIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identities(&self) -> Vec<ServiceIdentity> {
        self.entries.iter().map(|r| *r.key()).collect()
    }

    #[inline]
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("count", &self.len())
            .finish()
    }
}

// =============================================================================
// Singleton Store
// =============================================================================

/// Cache of constructed singleton instances.
///
/// Eager singletons are inserted at registration; lazy singletons go through
/// [`SingletonStore::set`], where the first writer wins. Lazy construction is
/// serialized by [`SingletonStore::lock_init`].
pub(crate) struct SingletonStore {
    instances: DashMap<ServiceIdentity, Instance, RandomState>,
    init: ReentrantMutex<()>,
}

impl SingletonStore {
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: sharded_map(capacity),
            init: ReentrantMutex::new(()),
        }
    }

    #[inline]
    pub fn get(&self, identity: &ServiceIdentity) -> Option<Instance> {
        self.instances.get(identity).map(|entry| entry.value().clone())
    }

    /// Cache `instance` unless one is already present, and return whichever
    /// instance is cached afterwards.
    ///
    /// The shard stays write-locked between the check and the insert, so two
    /// racing first constructions converge on a single winner.
    #[inline]
    pub fn set(&self, identity: ServiceIdentity, instance: Instance) -> Instance {
        self.instances.entry(identity).or_insert(instance).value().clone()
    }

    /// Acquire the lazy initialization lock.
    ///
    /// One lock covers every identity, so threads entering a cyclic graph from
    /// different ends wait on each other instead of deadlocking. Re-entrant so a
    /// lazy producer can resolve further lazy singletons on the same thread.
    #[inline]
    pub fn lock_init(&self) -> ReentrantMutexGuard<'_, ()> {
        self.init.lock()
    }

    /// Unconditionally cache `instance` (eager registration)
    #[inline]
    pub fn insert(&self, identity: ServiceIdentity, instance: Instance) {
        self.instances.insert(identity, instance);
    }

    /// Drop the cached instance of an identity whose registration was replaced
    #[inline]
    pub fn evict(&self, identity: &ServiceIdentity) -> bool {
        self.instances.remove(identity).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn clear(&self) {
        self.instances.clear();
    }
}

impl Default for SingletonStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SingletonStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonStore")
            .field("count", &self.len())
            .finish()
    }
}
