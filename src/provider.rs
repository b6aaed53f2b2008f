//! Service identity and lifetime types
//!
//! These types define what can be registered and how long instances live.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for service contracts the container can hold.
///
/// This is automatically implemented for every `Send + Sync + 'static` type,
/// including unsized trait objects such as `dyn Repository` when the trait
/// has `Send + Sync` as supertraits. You never need to implement this manually.
///
/// # Examples
///
/// ```rust
/// use ioc_container::Injectable;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// fn assert_injectable<T: ?Sized + Injectable>() {}
/// assert_injectable::<dyn Clock>();
/// assert_injectable::<String>();
/// ```
pub trait Injectable: Send + Sync + 'static {}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Stable key naming a service contract.
///
/// Equality and hashing use the `TypeId` only; the type name is carried for
/// diagnostics and logging.
#[derive(Clone, Copy)]
pub struct ServiceIdentity {
    type_id: TypeId,
    type_name: &'static str,
}

impl ServiceIdentity {
    /// Identity of the contract `T`
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable type name
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ServiceIdentity {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceIdentity {}

impl Hash for ServiceIdentity {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceIdentity").field(&self.type_name).finish()
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Service lifetime specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// New instance created on every resolve
    #[default]
    Transient,

    /// Single instance built at registration time and shared across all resolves
    Singleton,

    /// Single instance built on first successful resolve, then shared
    Lazy,
}

impl Lifetime {
    /// Name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Transient => "transient",
            Lifetime::Singleton => "singleton",
            Lifetime::Lazy => "lazy_singleton",
        }
    }
}
