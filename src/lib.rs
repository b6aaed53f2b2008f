//! # ioc-container - Cycle-Safe Dependency Resolution for Rust
//!
//! An inversion-of-control container that maps service contracts (usually
//! `dyn Trait` types) to factories, builds object graphs on demand and manages
//! instance lifetime.
//!
//! ## Features
//!
//! - 🔒 **Type-safe** - Contracts are keyed by `TypeId`, instances come back as `Arc<T>`
//! - ♻️ **Transient services** - Fresh instance on every resolve
//! - 🏭 **Lazy singletons** - Built on first successful resolve, then shared
//! - ⚡ **Eager singletons** - Built at registration; failures surface immediately
//! - 🔁 **Cycle detection** - Circular graphs fail cleanly instead of recursing forever
//! - 🧵 **Concurrent** - `DashMap` storage; racing lazy initializations converge on one instance
//! - 📊 **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use ioc_container::Container;
//! use std::sync::Arc;
//!
//! trait Database: Send + Sync {
//!     fn url(&self) -> &str;
//! }
//!
//! struct Postgres;
//!
//! impl Database for Postgres {
//!     fn url(&self) -> &str { "postgres://localhost" }
//! }
//!
//! struct UserService {
//!     db: Arc<dyn Database>,
//! }
//!
//! let container = Container::new();
//!
//! // Each factory resolves its constructor parameters in order
//! container.lazy::<dyn Database, _>(|_| Ok(Arc::new(Postgres) as Arc<dyn Database>));
//! container.transient(|r| Ok(Arc::new(UserService { db: r.resolve::<dyn Database>()? })));
//!
//! let users = container.try_resolve::<UserService>().unwrap();
//! assert_eq!(users.db.url(), "postgres://localhost");
//! ```
//!
//! ## Circular Dependencies
//!
//! ```rust
//! use ioc_container::{Container, DiError};
//! use std::sync::Arc;
//!
//! struct A(#[allow(dead_code)] Arc<B>);
//! struct B(#[allow(dead_code)] Arc<A>);
//!
//! let container = Container::new();
//! container.lazy(|r| Ok(Arc::new(A(r.resolve::<B>()?))));
//! container.lazy(|r| Ok(Arc::new(B(r.resolve::<A>()?))));
//!
//! assert!(container.try_resolve::<A>().is_none());
//! assert!(container.resolve::<A>().err().is_some_and(|err| err.is_circular()));
//! ```

mod container;
mod error;
mod factory;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod resolver;
pub mod service;
mod stack;
mod storage;

pub use container::*;
pub use error::*;
pub use provider::*;
pub use resolver::Resolver;
pub use stack::ConstructionStack;

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::service::{Service, ServiceModule, ServiceProvider};
    pub use crate::{Container, DiError, Injectable, Lifetime, Resolver, Result, ServiceIdentity};
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_ID: AtomicU64 = AtomicU64::new(0);

    trait IA: Send + Sync {
        fn b(&self) -> &Arc<dyn IB>;
        fn id(&self) -> u64;
    }
    trait IB: Send + Sync {
        fn kind(&self) -> &'static str;
    }
    trait IC: Send + Sync {}

    struct A {
        b: Arc<dyn IB>,
        id: u64,
    }

    impl A {
        fn new(b: Arc<dyn IB>) -> Self {
            A {
                b,
                id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            }
        }
    }

    impl IA for A {
        fn b(&self) -> &Arc<dyn IB> {
            &self.b
        }

        fn id(&self) -> u64 {
            self.id
        }
    }

    struct B {
        _c: Arc<dyn IC>,
    }

    impl IB for B {
        fn kind(&self) -> &'static str {
            "B"
        }
    }

    struct C {
        _a: Arc<dyn IA>,
    }

    impl IC for C {}

    struct C2;

    impl IC for C2 {}

    fn a(r: &mut Resolver<'_>) -> Result<Arc<dyn IA>> {
        Ok(Arc::new(A::new(r.resolve::<dyn IB>()?)))
    }

    fn b(r: &mut Resolver<'_>) -> Result<Arc<dyn IB>> {
        Ok(Arc::new(B {
            _c: r.resolve::<dyn IC>()?,
        }))
    }

    fn c(r: &mut Resolver<'_>) -> Result<Arc<dyn IC>> {
        Ok(Arc::new(C {
            _a: r.resolve::<dyn IA>()?,
        }))
    }

    fn c2(_: &mut Resolver<'_>) -> Result<Arc<dyn IC>> {
        Ok(Arc::new(C2))
    }

    fn same<T: ?Sized>(x: &Arc<T>, y: &Arc<T>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(x), Arc::as_ptr(y))
    }

    #[test]
    fn test_circular_lazy_registration_fails() {
        let container = Container::new();
        container.lazy(a);
        container.lazy(b);
        container.lazy(c);

        assert!(container.try_resolve::<dyn IA>().is_none());

        match container.resolve::<dyn IA>() {
            Err(DiError::CircularDependency { chain, .. }) => {
                assert_eq!(chain.len(), 4);
                assert_eq!(chain.first(), chain.last());
            }
            Err(other) => panic!("expected circular dependency, got {other}"),
            Ok(_) => panic!("expected circular dependency"),
        }
    }

    #[test]
    fn test_circular_transient_registration_fails() {
        let container = Container::new();
        container.transient(a);
        container.transient(b);
        container.transient(c);

        assert!(container.try_resolve::<dyn IA>().is_none());
        assert!(container.try_resolve::<dyn IB>().is_none());
        assert!(container.try_resolve::<dyn IC>().is_none());
    }

    #[test]
    fn test_failed_cycle_caches_nothing() {
        let container = Container::new();
        container.lazy(a);
        container.lazy(b);
        container.lazy(c);

        assert!(container.try_resolve::<dyn IA>().is_none());
        assert!(format!("{container:?}").contains("singleton_count: 0"));

        // Breaking the cycle makes the same graph resolvable
        container.lazy(c2);
        assert!(container.try_resolve::<dyn IA>().is_some());
    }

    #[test]
    fn test_non_circular_registration_succeeds() {
        let container = Container::new();
        container.lazy(a);
        container.lazy(b);
        container.lazy(c2);

        let instance = container.try_resolve::<dyn IA>();
        assert!(instance.is_some());
    }

    #[test]
    fn test_lazy_singleton_same_instance_each_time() {
        let container = Container::new();
        container.lazy(a);
        container.lazy(b);
        container.lazy(c2);

        let a0 = container.try_resolve::<dyn IA>().unwrap();
        for _ in 0..100 {
            let a1 = container.try_resolve::<dyn IA>().unwrap();
            assert!(same(&a0, &a1));
        }
    }

    #[test]
    fn test_eager_singleton_same_instance_each_time() {
        let container = Container::new();
        container.lazy(b);
        container.lazy(c2);
        container.singleton(a).unwrap();

        let a0 = container.try_resolve::<dyn IA>().unwrap();
        for _ in 0..100 {
            let a1 = container.try_resolve::<dyn IA>().unwrap();
            assert!(same(&a0, &a1));
        }
    }

    #[test]
    fn test_eager_singleton_with_missing_dependency_fails_registration() {
        let container = Container::new();
        container.lazy(b);
        container.lazy(c);

        // C needs IA, which is not registered yet
        let err = container.singleton(a).unwrap_err();
        assert!(!err.is_circular());
        assert!(matches!(
            err,
            DiError::EagerConstructionFailed { ref source, .. }
                if matches!(**source, DiError::NotRegistered { .. })
        ));
        assert!(!container.contains::<dyn IA>());
    }

    #[test]
    fn test_eager_singleton_in_cycle_keeps_previous_registration() {
        let container = Container::new();
        container.lazy(a);
        container.lazy(b);
        container.lazy(c);

        let err = container.singleton(a).unwrap_err();
        assert!(err.is_circular());
        assert_eq!(container.lifetime_of::<dyn IA>(), Some(Lifetime::Lazy));
    }

    #[test]
    fn test_transient_different_instance_each_time() {
        let container = Container::new();
        container.lazy(b);
        container.lazy(c2);
        container.transient(a);

        let mut previous: Vec<Arc<dyn IA>> = Vec::new();
        let mut ids = HashSet::new();
        for i in 0..100 {
            let a1 = container.try_resolve::<dyn IA>().unwrap();
            assert!(!previous.iter().any(|p| same(p, &a1)));
            assert!(ids.insert(a1.id()));
            assert_eq!(previous.len(), i);
            previous.push(a1);
        }

        // The shared lazy dependency is the same for every transient
        assert!(previous.windows(2).all(|w| same(w[0].b(), w[1].b())));
    }

    #[test]
    fn test_constructor_parameters_resolved_through_container() {
        let container = Container::new();
        container.transient(b);
        container.lazy(c2);
        container.transient(a);

        let a1 = container.try_resolve::<dyn IA>().unwrap();
        assert_eq!(a1.b().kind(), "B");
    }

    #[test]
    fn test_reset_isolates_sessions() {
        let container = Container::new();
        container.lazy(a);
        container.lazy(b);
        container.lazy(c2);
        let first = container.try_resolve::<dyn IA>().unwrap();

        container.reset();
        assert!(container.try_resolve::<dyn IA>().is_none());

        container.lazy(a);
        container.lazy(b);
        container.lazy(c2);
        let second = container.try_resolve::<dyn IA>().unwrap();
        assert!(!same(&first, &second));
    }

    #[test]
    fn test_concurrent_lazy_resolution_converges() {
        let container = Container::new();
        container.lazy(a);
        container.lazy(b);
        container.lazy(c2);

        let resolved: Vec<Arc<dyn IA>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..100)
                .map(|_| s.spawn(|| container.try_resolve::<dyn IA>()))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        let first = &resolved[0];
        assert!(resolved.iter().all(|other| same(first, other)));
        assert!(same(first, &container.try_resolve::<dyn IA>().unwrap()));
    }

    #[test]
    fn test_concurrent_lazy_resolution_constructs_once() {
        static BUILT: AtomicU64 = AtomicU64::new(0);

        struct Heavy;

        let container = Container::new();
        container.lazy(|_| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            BUILT.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Heavy))
        });

        let resolved: Vec<Arc<Heavy>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..100)
                .map(|_| s.spawn(|| container.resolve::<Heavy>()))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
        assert!(resolved.iter().all(|other| Arc::ptr_eq(&resolved[0], other)));
    }

    #[test]
    fn test_concurrent_lazy_cycle_fails_from_both_ends() {
        let container = Container::new();
        container.lazy(a);
        container.lazy(b);
        container.lazy(c);

        std::thread::scope(|s| {
            let from_a = s.spawn(|| container.try_resolve::<dyn IA>());
            let from_c = s.spawn(|| container.try_resolve::<dyn IC>());
            assert!(from_a.join().unwrap().is_none());
            assert!(from_c.join().unwrap().is_none());
        });
        assert!(format!("{container:?}").contains("singleton_count: 0"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lazy_resolution_across_tasks() {
        let container = Container::new();
        container.lazy(a);
        container.lazy(b);
        container.lazy(c2);

        let tasks: Vec<_> = (0..100)
            .map(|_| {
                let container = container.clone();
                tokio::spawn(async move { container.try_resolve::<dyn IA>() })
            })
            .collect();

        let mut resolved = Vec::with_capacity(tasks.len());
        for task in tasks {
            resolved.push(task.await.unwrap().unwrap());
        }

        assert!(resolved.iter().all(|other| same(&resolved[0], other)));
    }

    #[test]
    fn test_concurrent_resolutions_do_not_share_cycle_state() {
        // Two threads building the same transient at once must not see each
        // other's in-flight identities as cycles
        let container = Container::new();
        container.transient(a);
        container.transient(b);
        container.transient::<dyn IC, _>(|r| {
            std::thread::sleep(std::time::Duration::from_millis(5));
            c2(r)
        });

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| container.resolve::<dyn IA>()))
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap().is_ok());
            }
        });
    }
}
