//! Shared helpers for the Diesel integration tests.
//!
//! Each test provisions a throwaway database next to the one named by
//! `DATABASE_URL`, applies the embedded migrations and drops the database
//! again when the harness goes out of scope.

use std::future::Future;

use bookhub::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use postgres::{Client, NoTls};
use rstest::fixture;
use tokio::runtime::Runtime;
use url::Url;
use uuid::Uuid;

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// The `postgres::Error` `Display` implementation often collapses database
/// errors to a generic `db error`, so prefer the SQLSTATE and message.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Returns true when the `SKIP_TEST_CLUSTER` environment variable is set to a
/// truthy value ("1", "true" or "yes", case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Handles database setup failures consistently across integration tests.
///
/// When `SKIP_TEST_CLUSTER` is truthy, prints a skip marker and returns `None`.
/// Otherwise, panics so CI breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test database setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Database created for one test and dropped on `Drop`.
pub struct TemporaryDatabase {
    admin_url: String,
    name: String,
    url: String,
}

impl TemporaryDatabase {
    /// Create a uniquely named database on the server behind `admin_url`.
    pub fn create(admin_url: &str) -> Result<Self, String> {
        let name = format!("bookhub_test_{}", Uuid::new_v4().simple());
        let mut admin = Client::connect(admin_url, NoTls).map_err(|e| format_postgres_error(&e))?;
        admin
            .batch_execute(&format!("CREATE DATABASE \"{name}\""))
            .map_err(|e| format_postgres_error(&e))?;

        let mut url = Url::parse(admin_url).map_err(|e| e.to_string())?;
        url.set_path(&name);
        Ok(Self {
            admin_url: admin_url.to_owned(),
            name,
            url: url.to_string(),
        })
    }

    /// Connection URL of the temporary database.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        let dropped = Client::connect(&self.admin_url, NoTls).and_then(|mut admin| {
            admin.batch_execute(&format!(
                "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                self.name
            ))
        });
        if let Err(err) = dropped {
            eprintln!(
                "failed to drop test database {}: {}",
                self.name,
                format_postgres_error(&err)
            );
        }
    }
}

/// Migrated database plus a pool and runtime to drive the async adapters.
pub struct Harness {
    pub pool: DbPool,
    runtime: Runtime,
    _database: TemporaryDatabase,
}

impl Harness {
    /// Run `future` to completion on the harness runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

fn setup_harness(admin_url: &str) -> Result<Harness, String> {
    let database = TemporaryDatabase::create(admin_url)?;
    run_pending_migrations(database.url()).map_err(|e| e.to_string())?;
    let runtime = Runtime::new().map_err(|e| e.to_string())?;
    let pool = runtime
        .block_on(DbPool::new(
            PoolConfig::new(database.url()).with_max_size(2),
        ))
        .map_err(|e| e.to_string())?;
    Ok(Harness {
        pool,
        runtime,
        _database: database,
    })
}

/// Provision a migrated database, or `None` when tests should be skipped.
#[fixture]
pub fn harness() -> Option<Harness> {
    let Ok(admin_url) = std::env::var("DATABASE_URL") else {
        eprintln!("SKIP-TEST-CLUSTER: DATABASE_URL is not set");
        return None;
    };
    match setup_harness(&admin_url) {
        Ok(harness) => Some(harness),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}
