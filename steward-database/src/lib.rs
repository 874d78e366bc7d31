use sqlx::{PgPool, migrate::Migrator};

/// Compile-time discovered SQLx migrations for the `steward-database` crate.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Shared database handle passed across crates.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a database handle from an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Expose the underlying pool for query modules.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Persisted record shapes for custom messages and role reactions.
pub mod model;
/// Collection-level state persistence and its backends.
pub mod state;
