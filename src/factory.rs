//! Factory types for creating service instances
//!
//! A registration pairs a lifetime with a type-erased producer. Producers
//! receive the in-flight [`Resolver`] so they can pull each constructor
//! parameter from the container in declared order.
//!
//! Instances are stored as `Arc<dyn Any>` wrapping an `Arc<T>`. Wrapping the
//! typed `Arc` lets unsized contracts such as `dyn Trait` round-trip through
//! the erased form with a checked downcast.

use crate::resolver::Resolver;
use crate::{DiError, Injectable, Lifetime, Result};
use std::any::Any;
use std::sync::Arc;

/// Type-erased service instance
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

/// Type-erased producer function
pub(crate) type Producer = Arc<dyn Fn(&mut Resolver<'_>) -> Result<Instance> + Send + Sync>;

/// Erase a typed instance for storage
#[inline]
pub(crate) fn erase<T: ?Sized + Injectable>(instance: Arc<T>) -> Instance {
    Arc::new(instance)
}

/// Recover the typed instance from its erased form
#[inline]
pub(crate) fn downcast<T: ?Sized + Injectable>(instance: &Instance) -> Result<Arc<T>> {
    instance.downcast_ref::<Arc<T>>().cloned().ok_or_else(|| {
        DiError::Internal(format!(
            "stored instance is not an Arc<{}>",
            std::any::type_name::<T>()
        ))
    })
}

/// Erase a typed factory into a producer
#[inline]
pub(crate) fn producer<T, F>(factory: F) -> Producer
where
    T: ?Sized + Injectable,
    F: Fn(&mut Resolver<'_>) -> Result<Arc<T>> + Send + Sync + 'static,
{
    Arc::new(erased_fn(move |resolver| factory(resolver).map(erase::<T>)))
}

/// Pins the closure signature so the resolver lifetime stays higher-ranked
#[inline]
fn erased_fn<F>(f: F) -> F
where
    F: Fn(&mut Resolver<'_>) -> Result<Instance> + Send + Sync + 'static,
{
    f
}

/// Registration entry for one service identity
///
/// Cloning is cheap (reference counts only); the resolver clones the entry
/// out of the registry before running a producer so no map guard is held
/// across recursive resolution.
#[derive(Clone)]
pub(crate) enum Registration {
    /// Eager singleton - instance built at registration time
    Singleton(Instance),
    /// Lazy singleton - built on first successful resolve, cached in the singleton store
    Lazy(Producer),
    /// Transient - new instance each time
    Transient(Producer),
}

impl Registration {
    /// The lifetime this entry implements
    #[inline]
    pub fn lifetime(&self) -> Lifetime {
        match self {
            Registration::Singleton(_) => Lifetime::Singleton,
            Registration::Lazy(_) => Lifetime::Lazy,
            Registration::Transient(_) => Lifetime::Transient,
        }
    }
}
