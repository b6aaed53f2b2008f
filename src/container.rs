//! Inversion-of-control container
//!
//! The `Container` owns the type registry and the singleton store. Every
//! resolve call gets its own [`Resolver`], so cycle detection is local to the
//! call chain while registrations and singletons are shared.

use crate::factory::{self, Registration};
use crate::resolver::Resolver;
use crate::storage::{SingletonStore, TypeRegistry};
use crate::{DiError, Injectable, Lifetime, Result, ServiceIdentity};
use once_cell::sync::Lazy;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

static GLOBAL: Lazy<Container> = Lazy::new(Container::new);

/// Dependency-injection container.
///
/// Cloning is cheap and yields a handle to the same registrations.
///
/// # Examples
///
/// ```rust
/// use ioc_container::Container;
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// let container = Container::new();
/// container.lazy::<dyn Greeter, _>(|_| Ok(Arc::new(English) as Arc<dyn Greeter>));
///
/// let greeter = container.try_resolve::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[derive(Clone)]
pub struct Container {
    registry: Arc<TypeRegistry>,
    singletons: Arc<SingletonStore>,
}

impl Container {
    /// Create an empty container.
    #[inline]
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "ioc_container",
            "Creating new IoC container"
        );

        Self {
            registry: Arc::new(TypeRegistry::new()),
            singletons: Arc::new(SingletonStore::new()),
        }
    }

    /// Create a container with pre-allocated capacity.
    ///
    /// Use this when you know approximately how many services will be registered.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "ioc_container",
            capacity,
            "Creating new IoC container"
        );

        Self {
            registry: Arc::new(TypeRegistry::with_capacity(capacity)),
            singletons: Arc::new(SingletonStore::with_capacity(capacity)),
        }
    }

    /// Process-wide container for application bootstrap code.
    ///
    /// Prefer passing an explicit `Container` to the code that needs it; this
    /// exists for entry points that cannot receive one.
    #[inline]
    pub fn global() -> &'static Container {
        &GLOBAL
    }

    // =========================================================================
    // Registration Methods
    // =========================================================================

    /// Register a transient service.
    ///
    /// The factory runs on every resolve and receives the resolver to pull its
    /// dependencies from.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ioc_container::Container;
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicU64, Ordering};
    ///
    /// static COUNTER: AtomicU64 = AtomicU64::new(0);
    ///
    /// struct RequestId(u64);
    ///
    /// let container = Container::new();
    /// container.transient(|_| Ok(Arc::new(RequestId(COUNTER.fetch_add(1, Ordering::SeqCst)))));
    ///
    /// let id1 = container.resolve::<RequestId>().unwrap();
    /// let id2 = container.resolve::<RequestId>().unwrap();
    /// assert_ne!(id1.0, id2.0);
    /// ```
    #[inline]
    pub fn transient<T, F>(&self, factory: F)
    where
        T: ?Sized + Injectable,
        F: Fn(&mut Resolver<'_>) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        let identity = ServiceIdentity::of::<T>();
        self.insert(identity, Registration::Transient(factory::producer(factory)));
    }

    /// Register a lazy singleton service.
    ///
    /// The factory runs on the first successful resolve; the instance is then
    /// cached and shared. A failed first resolve caches nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ioc_container::Container;
    /// use std::sync::Arc;
    ///
    /// struct ExpensiveService { data: Vec<u8> }
    ///
    /// let container = Container::new();
    /// container.lazy(|_| Ok(Arc::new(ExpensiveService {
    ///     data: vec![0; 1024 * 1024], // Only allocated on first use
    /// })));
    /// ```
    #[inline]
    pub fn lazy<T, F>(&self, factory: F)
    where
        T: ?Sized + Injectable,
        F: Fn(&mut Resolver<'_>) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        let identity = ServiceIdentity::of::<T>();
        self.insert(identity, Registration::Lazy(factory::producer(factory)));
    }

    /// Register an eager singleton service.
    ///
    /// The factory runs immediately, resolving its dependencies from what is
    /// registered so far. If construction fails the registration fails and
    /// nothing is stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ioc_container::{Container, DiError};
    /// use std::sync::Arc;
    ///
    /// struct Config { debug: bool }
    /// struct Database { config: Arc<Config> }
    ///
    /// let container = Container::new();
    ///
    /// // Config isn't registered yet
    /// let err = container
    ///     .singleton(|r| Ok(Arc::new(Database { config: r.resolve::<Config>()? })))
    ///     .unwrap_err();
    /// assert!(matches!(err, DiError::EagerConstructionFailed { .. }));
    ///
    /// container.singleton(|_| Ok(Arc::new(Config { debug: true }))).unwrap();
    /// container
    ///     .singleton(|r| Ok(Arc::new(Database { config: r.resolve::<Config>()? })))
    ///     .unwrap();
    /// assert!(container.resolve::<Database>().unwrap().config.debug);
    /// ```
    pub fn singleton<T, F>(&self, factory: F) -> Result<()>
    where
        T: ?Sized + Injectable,
        F: Fn(&mut Resolver<'_>) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        let identity = ServiceIdentity::of::<T>();
        let producer = factory::producer(factory);

        let instance = match self.resolver().build(identity, &producer, false) {
            Ok(instance) => instance,
            Err(source) => {
                #[cfg(feature = "logging")]
                warn!(
                    target: "ioc_container",
                    service = identity.type_name(),
                    error = %source,
                    "Eager singleton construction failed, service not registered"
                );
                return Err(DiError::eager_construction_failed(identity, source));
            }
        };

        self.singletons.insert(identity, Arc::clone(&instance));
        self.insert(identity, Registration::Singleton(instance));
        Ok(())
    }

    /// Register an already constructed instance as a singleton.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ioc_container::Container;
    /// use std::sync::Arc;
    ///
    /// trait Clock: Send + Sync {}
    /// struct SystemClock;
    /// impl Clock for SystemClock {}
    ///
    /// let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    ///
    /// let container = Container::new();
    /// container.instance(Arc::clone(&clock));
    ///
    /// let resolved = container.resolve::<dyn Clock>().unwrap();
    /// assert!(std::ptr::addr_eq(Arc::as_ptr(&resolved), Arc::as_ptr(&clock)));
    /// ```
    #[inline]
    pub fn instance<T: ?Sized + Injectable>(&self, instance: Arc<T>) {
        let identity = ServiceIdentity::of::<T>();
        let instance = factory::erase(instance);
        self.singletons.insert(identity, Arc::clone(&instance));
        self.insert(identity, Registration::Singleton(instance));
    }

    /// Register with an explicit lifetime.
    ///
    /// Only [`Lifetime::Singleton`] can fail, since it constructs immediately.
    pub fn register<T, F>(&self, lifetime: Lifetime, factory: F) -> Result<()>
    where
        T: ?Sized + Injectable,
        F: Fn(&mut Resolver<'_>) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        match lifetime {
            Lifetime::Transient => self.transient(factory),
            Lifetime::Lazy => self.lazy(factory),
            Lifetime::Singleton => self.singleton(factory)?,
        }
        Ok(())
    }

    /// Store an entry, replacing any previous registration and its cached instance
    fn insert(&self, identity: ServiceIdentity, registration: Registration) {
        #[cfg(feature = "logging")]
        let lifetime = registration.lifetime();

        if !matches!(registration, Registration::Singleton(_)) {
            self.singletons.evict(&identity);
        }
        let _replaced = self.registry.insert(identity, registration);

        #[cfg(feature = "logging")]
        debug!(
            target: "ioc_container",
            service = identity.type_name(),
            lifetime = lifetime.as_str(),
            replaced = _replaced.is_some(),
            service_count = self.registry.len(),
            "Registered service"
        );
    }

    // =========================================================================
    // Resolution Methods
    // =========================================================================

    /// Resolve a service, reporting why resolution failed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ioc_container::{Container, DiError};
    ///
    /// struct Missing;
    ///
    /// let container = Container::new();
    /// let result = container.resolve::<Missing>();
    /// assert!(matches!(result, Err(DiError::NotRegistered { .. })));
    /// ```
    #[inline]
    pub fn resolve<T: ?Sized + Injectable>(&self) -> Result<Arc<T>> {
        self.resolver().resolve::<T>()
    }

    /// Resolve a service, returning None on any failure.
    ///
    /// Unregistered services and circular dependency chains both yield None.
    #[inline]
    pub fn try_resolve<T: ?Sized + Injectable>(&self) -> Option<Arc<T>> {
        match self.resolve::<T>() {
            Ok(service) => Some(service),
            Err(_err) => {
                #[cfg(feature = "logging")]
                trace!(
                    target: "ioc_container",
                    service = std::any::type_name::<T>(),
                    error = %_err,
                    "try_resolve failed"
                );
                None
            }
        }
    }

    /// Build a value that is not registered, resolving its dependencies from
    /// the container.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ioc_container::Container;
    /// use std::sync::Arc;
    ///
    /// struct Config { name: &'static str }
    /// struct Handler { config: Arc<Config> }
    ///
    /// let container = Container::new();
    /// container.instance(Arc::new(Config { name: "app" }));
    ///
    /// let handler = container
    ///     .construct(|r| Ok(Handler { config: r.resolve::<Config>()? }))
    ///     .unwrap();
    /// assert_eq!(handler.config.name, "app");
    /// assert!(!container.contains::<Handler>());
    /// ```
    #[inline]
    pub fn construct<T, F>(&self, factory: F) -> Result<T>
    where
        F: FnOnce(&mut Resolver<'_>) -> Result<T>,
    {
        factory(&mut self.resolver())
    }

    /// Fresh resolver with an empty construction stack
    #[inline]
    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry, &self.singletons)
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// Check if a service is registered.
    #[inline]
    pub fn contains<T: ?Sized + Injectable>(&self) -> bool {
        self.registry.contains(&ServiceIdentity::of::<T>())
    }

    /// Lifetime a service was registered with.
    #[inline]
    pub fn lifetime_of<T: ?Sized + Injectable>(&self) -> Option<Lifetime> {
        self.registry
            .lookup(&ServiceIdentity::of::<T>())
            .map(|registration| registration.lifetime())
    }

    /// Number of registered services.
    #[inline]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if nothing is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Identities of all registered services.
    pub fn registered_services(&self) -> Vec<ServiceIdentity> {
        self.registry.identities()
    }

    // =========================================================================
    // Lifecycle Methods
    // =========================================================================

    /// Remove every registration and cached singleton.
    ///
    /// Intended as a session boundary (e.g. between tests); do not call it
    /// while other threads are resolving.
    #[inline]
    pub fn reset(&self) {
        let count = self.registry.len();
        self.registry.clear();
        self.singletons.clear();

        #[cfg(feature = "logging")]
        debug!(
            target: "ioc_container",
            services_removed = count,
            "Container reset - all registrations and singletons removed"
        );
        #[cfg(not(feature = "logging"))]
        let _ = count;
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.registry.len())
            .field("singleton_count", &self.singletons.len())
            .finish()
    }
}
