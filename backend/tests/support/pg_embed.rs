//! Embedded PostgreSQL for the Diesel adapter suites.
//!
//! Every context gets its own temporary database on a cluster shared by the
//! test binary, migrated with the production migrations. Set
//! `SKIP_TEST_CLUSTER=1` where the cluster cannot start; the suites then
//! report a skip instead of failing.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use postboard::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// A migrated database with a pool and a runtime to drive it.
pub struct PgContext {
    /// Runtime reused for every async call in one test.
    pub runtime: Runtime,
    /// Pool over the temporary database.
    pub pool: DbPool,
    /// Connection URL of the temporary database.
    pub url: String,
    _database: TemporaryDatabase,
}

/// Whether `SKIP_TEST_CLUSTER` holds a truthy value.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn setup() -> Result<PgContext, String> {
    assert!(
        tokio::runtime::Handle::try_current().is_err(),
        "build the context outside a Tokio runtime"
    );
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| format!("cluster: {err:?}"))?;
    let name = format!("postboard_{}", Uuid::new_v4().simple());
    let database = cluster
        .temporary_database_from_template(name.as_str(), "template1")
        .map_err(|err| format!("temporary database: {err:?}"))?;
    let url = database.url().to_string();

    runtime
        .block_on(run_migrations(&url))
        .map_err(|err| err.to_string())?;
    let pool = runtime
        .block_on(DbPool::new(PoolConfig::new(url.as_str()).with_max_size(4)))
        .map_err(|err| err.to_string())?;

    Ok(PgContext {
        runtime,
        pool,
        url,
        _database: database,
    })
}

/// A fresh migrated database, or `None` when the cluster is skipped.
///
/// # Panics
///
/// When the cluster fails to start and skipping is not requested.
pub fn pg_context() -> Option<PgContext> {
    match setup() {
        Ok(context) => Some(context),
        Err(reason) if should_skip_test_cluster() => {
            eprintln!("SKIP-TEST-CLUSTER: {reason}");
            None
        }
        Err(reason) => {
            panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.")
        }
    }
}
