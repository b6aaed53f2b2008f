//! Recursive dependency resolution
//!
//! A [`Resolver`] is created for every top-level resolve call and handed to
//! each producer as it runs. Producers call [`Resolver::resolve`] once per
//! constructor parameter, which re-enters the same resolver and therefore
//! shares its [`ConstructionStack`]. Concurrent resolve calls each own a
//! separate resolver, so they never see each other's in-flight identities.

use crate::factory::{Instance, Producer, Registration, downcast};
use crate::stack::ConstructionStack;
use crate::storage::{SingletonStore, TypeRegistry};
use crate::{DiError, Injectable, Result, ServiceIdentity};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Resolution context passed to every producer.
///
/// # Examples
///
/// ```rust
/// use ioc_container::{Container, Resolver};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct Fixed;
/// impl Clock for Fixed {
///     fn now(&self) -> u64 { 42 }
/// }
///
/// struct Scheduler {
///     clock: Arc<dyn Clock>,
/// }
///
/// let container = Container::new();
/// container.lazy::<dyn Clock, _>(|_| Ok(Arc::new(Fixed) as Arc<dyn Clock>));
/// container.transient(|r: &mut Resolver<'_>| {
///     Ok(Arc::new(Scheduler { clock: r.resolve::<dyn Clock>()? }))
/// });
///
/// let scheduler = container.resolve::<Scheduler>().unwrap();
/// assert_eq!(scheduler.clock.now(), 42);
/// ```
pub struct Resolver<'c> {
    registry: &'c TypeRegistry,
    singletons: &'c SingletonStore,
    stack: ConstructionStack,
}

impl<'c> Resolver<'c> {
    #[inline]
    pub(crate) fn new(registry: &'c TypeRegistry, singletons: &'c SingletonStore) -> Self {
        Self {
            registry,
            singletons,
            stack: ConstructionStack::new(),
        }
    }

    /// Resolve a dependency by contract type.
    ///
    /// Any error should be propagated with `?` so the enclosing construction
    /// aborts without building a partial object.
    #[inline]
    pub fn resolve<T: ?Sized + Injectable>(&mut self) -> Result<Arc<T>> {
        let instance = self.resolve_identity(ServiceIdentity::of::<T>())?;
        downcast::<T>(&instance)
    }

    /// Resolve a dependency, returning None on any failure.
    #[inline]
    pub fn try_resolve<T: ?Sized + Injectable>(&mut self) -> Option<Arc<T>> {
        self.resolve::<T>().ok()
    }

    /// Check if a contract has a registration.
    #[inline]
    pub fn contains<T: ?Sized + Injectable>(&self) -> bool {
        self.registry.contains(&ServiceIdentity::of::<T>())
    }

    /// Number of services currently under construction in this call chain.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Type names currently under construction, outermost first.
    #[inline]
    pub fn construction_chain(&self) -> Vec<&'static str> {
        self.stack.chain()
    }

    pub(crate) fn resolve_identity(&mut self, identity: ServiceIdentity) -> Result<Instance> {
        #[cfg(feature = "logging")]
        trace!(
            target: "ioc_container",
            service = identity.type_name(),
            depth = self.stack.depth(),
            "Resolving service"
        );

        let Some(registration) = self.registry.lookup(&identity) else {
            #[cfg(feature = "logging")]
            debug!(
                target: "ioc_container",
                service = identity.type_name(),
                depth = self.stack.depth(),
                "Service not registered"
            );
            return Err(DiError::not_registered(identity));
        };

        match registration {
            // Built at registration time, outside any resolve-time cycle
            Registration::Singleton(instance) => Ok(instance),
            Registration::Lazy(producer) => {
                if let Some(instance) = self.singletons.get(&identity) {
                    #[cfg(feature = "logging")]
                    trace!(
                        target: "ioc_container",
                        service = identity.type_name(),
                        "Lazy singleton already initialized, returning cached instance"
                    );
                    return Ok(instance);
                }

                let singletons = self.singletons;
                let _init = singletons.lock_init();

                // Another thread may have finished construction while this one waited
                if let Some(instance) = singletons.get(&identity) {
                    return Ok(instance);
                }
                self.build(identity, &producer, true)
            }
            Registration::Transient(producer) => self.build(identity, &producer, false),
        }
    }

    /// Run `producer` with `identity` marked as under construction.
    pub(crate) fn build(
        &mut self,
        identity: ServiceIdentity,
        producer: &Producer,
        cache: bool,
    ) -> Result<Instance> {
        let mut frame = self.enter(identity)?;

        #[cfg(feature = "logging")]
        trace!(
            target: "ioc_container",
            service = identity.type_name(),
            depth = frame.stack.depth(),
            "Constructing service"
        );

        let instance = producer(&mut *frame)?;

        if cache {
            #[cfg(feature = "logging")]
            debug!(
                target: "ioc_container",
                service = identity.type_name(),
                "Lazy singleton initialized on first access"
            );

            // Must happen before the frame is released
            return Ok(frame.singletons.set(identity, instance));
        }

        Ok(instance)
    }

    /// Push `identity` and return a guard that pops it when dropped.
    pub(crate) fn enter(&mut self, identity: ServiceIdentity) -> Result<ConstructionFrame<'_, 'c>> {
        if let Err(err) = self.stack.push(identity) {
            #[cfg(feature = "logging")]
            debug!(
                target: "ioc_container",
                service = identity.type_name(),
                chain = ?self.stack.chain(),
                "Circular dependency detected"
            );
            return Err(err);
        }

        Ok(ConstructionFrame {
            resolver: self,
            identity,
        })
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("under_construction", &self.stack.chain())
            .finish()
    }
}

/// Scoped marker for one identity under construction.
///
/// Dereferences to the resolver so the producer can keep resolving while the
/// frame is held. Dropping the frame pops the identity on every exit path.
pub(crate) struct ConstructionFrame<'r, 'c> {
    resolver: &'r mut Resolver<'c>,
    identity: ServiceIdentity,
}

impl<'c> Deref for ConstructionFrame<'_, 'c> {
    type Target = Resolver<'c>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.resolver
    }
}

impl DerefMut for ConstructionFrame<'_, '_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resolver
    }
}

impl Drop for ConstructionFrame<'_, '_> {
    fn drop(&mut self) {
        self.resolver.stack.pop(self.identity);
    }
}
