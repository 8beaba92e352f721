//! Database connection for the storefront.
//!
//! The storefront shares the `fournil` database with the admin binary but
//! only ever reads the catalog and writes orders; catalog mutations and audit
//! reads belong to admin. Migrations live in `crates/core/migrations/` and
//! are run via:
//!
//! ```bash
//! cargo run -p fournil-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
