//! Declared constructors
//!
//! Services that list their constructor parameters as a `Dependencies` type
//! can be registered without writing a factory closure. Parameters are
//! resolved strictly left to right and the first failure aborts the whole
//! construction.
//!
//! # Example
//!
//! ```rust
//! use ioc_container::service::{Service, ServiceProvider};
//! use ioc_container::{Container, Lifetime};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! impl Service for Database {
//!     type Dependencies = ();
//!
//!     fn create(_deps: ()) -> Self {
//!         Database { url: "postgres://localhost".into() }
//!     }
//! }
//!
//! struct UserRepository {
//!     db: Arc<Database>,
//! }
//!
//! impl Service for UserRepository {
//!     type Dependencies = Arc<Database>;
//!
//!     fn create(db: Arc<Database>) -> Self {
//!         UserRepository { db }
//!     }
//! }
//!
//! let container = Container::new();
//! container.provide::<Database>(Lifetime::Lazy).unwrap();
//! container.provide::<UserRepository>(Lifetime::Transient).unwrap();
//!
//! let repo = container.resolve::<UserRepository>().unwrap();
//! assert_eq!(repo.db.url, "postgres://localhost");
//! ```

use crate::resolver::Resolver;
use crate::{Container, Injectable, Lifetime, Result};
use std::sync::Arc;

// =============================================================================
// Service Trait
// =============================================================================

/// A service that declares its constructor parameters.
///
/// # Supported Dependency Types
///
/// - `()` - No dependencies
/// - `Arc<T>` - Single dependency (`T` may be a `dyn Trait` contract)
/// - `(Arc<A>, Arc<B>, ...)` - Multiple dependencies (tuples up to 8),
///   resolved in declaration order
pub trait Service: Injectable + Sized {
    /// The constructor parameters, in declaration order.
    type Dependencies: Dependencies;

    /// Create a new instance given the resolved dependencies.
    fn create(deps: Self::Dependencies) -> Self;
}

// =============================================================================
// Dependencies Trait
// =============================================================================

/// Constructor parameter lists that can be resolved through a [`Resolver`].
pub trait Dependencies: Sized {
    /// Resolve every parameter, stopping at the first failure.
    fn resolve(resolver: &mut Resolver<'_>) -> Result<Self>;

    /// Type names of the parameters, in resolution order.
    fn names() -> Vec<&'static str>;
}

// No dependencies
impl Dependencies for () {
    #[inline]
    fn resolve(_resolver: &mut Resolver<'_>) -> Result<Self> {
        Ok(())
    }

    fn names() -> Vec<&'static str> {
        vec![]
    }
}

// Single dependency
impl<T: ?Sized + Injectable> Dependencies for Arc<T> {
    #[inline]
    fn resolve(resolver: &mut Resolver<'_>) -> Result<Self> {
        resolver.resolve::<T>()
    }

    fn names() -> Vec<&'static str> {
        vec![std::any::type_name::<T>()]
    }
}

// Tuple expressions evaluate left to right, which fixes the resolution order
macro_rules! impl_dependencies_tuple {
    ($($T:ident),+) => {
        impl<$($T: ?Sized + Injectable),+> Dependencies for ($(Arc<$T>,)+) {
            #[inline]
            fn resolve(resolver: &mut Resolver<'_>) -> Result<Self> {
                Ok(($(resolver.resolve::<$T>()?,)+))
            }

            fn names() -> Vec<&'static str> {
                vec![$(std::any::type_name::<$T>()),+]
            }
        }
    };
}

impl_dependencies_tuple!(A);
impl_dependencies_tuple!(A, B);
impl_dependencies_tuple!(A, B, C);
impl_dependencies_tuple!(A, B, C, D);
impl_dependencies_tuple!(A, B, C, D, E);
impl_dependencies_tuple!(A, B, C, D, E, F);
impl_dependencies_tuple!(A, B, C, D, E, F, G);
impl_dependencies_tuple!(A, B, C, D, E, F, G, H);

/// Resolve the declared dependencies of `S` and build it.
#[inline]
pub fn create<S: Service>(resolver: &mut Resolver<'_>) -> Result<Arc<S>> {
    let deps = S::Dependencies::resolve(resolver)?;
    Ok(Arc::new(S::create(deps)))
}

// =============================================================================
// ServiceProvider Trait - Registration from declared constructors
// =============================================================================

/// Extension trait for containers to register [`Service`] implementations.
pub trait ServiceProvider {
    /// Register `S` under its own type with the given lifetime.
    ///
    /// Fails only for [`Lifetime::Singleton`] when the dependencies cannot be
    /// resolved at registration time.
    fn provide<S: Service>(&self, lifetime: Lifetime) -> Result<()>;

    /// Register `S` under the contract `I`.
    ///
    /// `upcast` converts the built service to the contract, typically an
    /// unsizing coercion such as `|s| s as Arc<dyn Repository>`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ioc_container::service::{Service, ServiceProvider};
    /// use ioc_container::{Container, Lifetime};
    /// use std::sync::Arc;
    ///
    /// trait Repository: Send + Sync {
    ///     fn kind(&self) -> &'static str;
    /// }
    ///
    /// struct MemoryRepository;
    ///
    /// impl Repository for MemoryRepository {
    ///     fn kind(&self) -> &'static str { "memory" }
    /// }
    ///
    /// impl Service for MemoryRepository {
    ///     type Dependencies = ();
    ///     fn create(_: ()) -> Self { MemoryRepository }
    /// }
    ///
    /// let container = Container::new();
    /// container
    ///     .bind::<dyn Repository, MemoryRepository>(Lifetime::Lazy, |s| s as Arc<dyn Repository>)
    ///     .unwrap();
    ///
    /// let repo = container.resolve::<dyn Repository>().unwrap();
    /// assert_eq!(repo.kind(), "memory");
    /// ```
    fn bind<I, S>(&self, lifetime: Lifetime, upcast: fn(Arc<S>) -> Arc<I>) -> Result<()>
    where
        I: ?Sized + Injectable,
        S: Service;
}

impl ServiceProvider for Container {
    #[inline]
    fn provide<S: Service>(&self, lifetime: Lifetime) -> Result<()> {
        self.register(lifetime, create::<S>)
    }

    #[inline]
    fn bind<I, S>(&self, lifetime: Lifetime, upcast: fn(Arc<S>) -> Arc<I>) -> Result<()>
    where
        I: ?Sized + Injectable,
        S: Service,
    {
        self.register(lifetime, move |resolver| create::<S>(resolver).map(upcast))
    }
}

// =============================================================================
// ServiceModule - Group related services
// =============================================================================

/// A module that groups related service registrations.
///
/// # Example
///
/// ```rust
/// use ioc_container::service::{Service, ServiceModule, ServiceProvider};
/// use ioc_container::{Container, Lifetime, Result};
///
/// struct Database;
///
/// impl Service for Database {
///     type Dependencies = ();
///     fn create(_: ()) -> Self { Database }
/// }
///
/// struct Cache;
///
/// impl Service for Cache {
///     type Dependencies = ();
///     fn create(_: ()) -> Self { Cache }
/// }
///
/// struct DataModule;
///
/// impl ServiceModule for DataModule {
///     fn register(container: &Container) -> Result<()> {
///         container.provide::<Database>(Lifetime::Singleton)?;
///         container.provide::<Cache>(Lifetime::Lazy)
///     }
/// }
///
/// let container = Container::new();
/// DataModule::register(&container).unwrap();
///
/// assert!(container.contains::<Database>());
/// assert!(container.contains::<Cache>());
/// ```
pub trait ServiceModule {
    /// Register all services in this module.
    fn register(container: &Container) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiError;
    use std::sync::Mutex;

    struct Config {
        debug: bool,
    }

    impl Service for Config {
        type Dependencies = ();

        fn create(_: ()) -> Self {
            Config { debug: true }
        }
    }

    struct Database {
        url: String,
    }

    impl Service for Database {
        type Dependencies = Arc<Config>;

        fn create(config: Arc<Config>) -> Self {
            Database {
                url: if config.debug {
                    "debug://localhost".into()
                } else {
                    "prod://server".into()
                },
            }
        }
    }

    struct Cache {
        size: usize,
    }

    impl Service for Cache {
        type Dependencies = ();

        fn create(_: ()) -> Self {
            Cache { size: 1024 }
        }
    }

    struct UserService {
        db: Arc<Database>,
        cache: Arc<Cache>,
    }

    impl Service for UserService {
        type Dependencies = (Arc<Database>, Arc<Cache>);

        fn create((db, cache): Self::Dependencies) -> Self {
            UserService { db, cache }
        }
    }

    #[test]
    fn test_provide_chain() {
        let container = Container::new();
        container.provide::<Config>(Lifetime::Lazy).unwrap();
        container.provide::<Database>(Lifetime::Lazy).unwrap();
        container.provide::<Cache>(Lifetime::Singleton).unwrap();
        container.provide::<UserService>(Lifetime::Transient).unwrap();

        let users = container.resolve::<UserService>().unwrap();
        assert_eq!(users.db.url, "debug://localhost");
        assert_eq!(users.cache.size, 1024);
    }

    #[test]
    fn test_provide_singleton_requires_dependencies() {
        let container = Container::new();
        let err = container.provide::<Database>(Lifetime::Singleton).unwrap_err();
        assert!(matches!(err, DiError::EagerConstructionFailed { .. }));
        assert!(!container.contains::<Database>());
    }

    #[test]
    fn test_dependencies_resolve_left_to_right() {
        static ORDER: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

        struct First;
        struct Second;
        struct Third;

        let container = Container::new();
        container.transient(|_| {
            ORDER.lock().unwrap().push("second");
            Ok(Arc::new(Second))
        });
        container.transient(|_| {
            ORDER.lock().unwrap().push("first");
            Ok(Arc::new(First))
        });

        // Third is missing: First and Second are built, then resolution stops
        let result = container.construct(|r| <(Arc<First>, Arc<Second>, Arc<Third>)>::resolve(r));
        assert!(matches!(result, Err(DiError::NotRegistered { .. })));
        assert_eq!(*ORDER.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_first_failure_stops_resolution() {
        static BUILT: Mutex<u32> = Mutex::new(0);

        struct Missing;
        struct Counted;

        let container = Container::new();
        container.transient(|_| {
            *BUILT.lock().unwrap() += 1;
            Ok(Arc::new(Counted))
        });

        let result = container.construct(|r| <(Arc<Missing>, Arc<Counted>)>::resolve(r));
        assert!(result.is_err());
        assert_eq!(*BUILT.lock().unwrap(), 0);
    }

    #[test]
    fn test_dependency_names() {
        assert!(<()>::names().is_empty());
        assert_eq!(
            <(Arc<Database>, Arc<Cache>)>::names(),
            vec![std::any::type_name::<Database>(), std::any::type_name::<Cache>()]
        );
    }
}
