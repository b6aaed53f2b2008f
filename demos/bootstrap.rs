//! Application bootstrap with structured logging
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example bootstrap --features logging-pretty
//! ```
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example bootstrap --features logging-json
//! ```

use ioc_container::prelude::*;

trait Settings: Send + Sync {
    fn database_url(&self) -> &str;
}

struct EnvSettings {
    url: String,
}

impl Settings for EnvSettings {
    fn database_url(&self) -> &str {
        &self.url
    }
}

trait Database: Send + Sync {
    fn describe(&self) -> String;
}

struct Postgres {
    settings: Arc<dyn Settings>,
}

impl Database for Postgres {
    fn describe(&self) -> String {
        format!("postgres at {}", self.settings.database_url())
    }
}

struct UserRepository {
    db: Arc<dyn Database>,
}

impl Service for UserRepository {
    type Dependencies = Arc<dyn Database>;

    fn create(db: Arc<dyn Database>) -> Self {
        UserRepository { db }
    }
}

// Two services that need each other
#[allow(dead_code)]
struct Billing(Arc<Invoices>);
#[allow(dead_code)]
struct Invoices(Arc<Billing>);

fn main() -> Result<()> {
    ioc_container::logging::init();

    println!("=== IoC Container Bootstrap Demo ===\n");

    let container = Container::new();

    // Eager: built right now (logs: "Registered service" with lifetime=singleton)
    container.singleton::<dyn Settings, _>(|_| {
        Ok(Arc::new(EnvSettings {
            url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/app".into()),
        }) as Arc<dyn Settings>)
    })?;

    // Lazy: built on first resolve (logs: "Lazy singleton initialized on first access")
    container.lazy::<dyn Database, _>(|r| {
        println!("  [App] Connecting to database...");
        Ok(Arc::new(Postgres {
            settings: r.resolve::<dyn Settings>()?,
        }) as Arc<dyn Database>)
    });

    // Transient via declared constructor
    container.provide::<UserRepository>(Lifetime::Transient)?;

    let repo = container.resolve::<UserRepository>()?;
    println!("  [App] Repository uses {}", repo.db.describe());

    // Misconfigured graph (logs: "Circular dependency detected")
    container.lazy(|r| Ok(Arc::new(Billing(r.resolve::<Invoices>()?))));
    container.lazy(|r| Ok(Arc::new(Invoices(r.resolve::<Billing>()?))));

    match container.resolve::<Billing>() {
        Ok(_) => println!("  [App] Billing resolved"),
        Err(err) => println!("  [App] Billing unavailable: {err}"),
    }
    assert!(container.try_resolve::<Billing>().is_none());

    // Session boundary (logs: "Container reset")
    container.reset();

    println!("\n=== Demo Complete ===");
    Ok(())
}
