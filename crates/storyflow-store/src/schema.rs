//! Database schema.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use storyflow_core::error::DomainError;

/// Migrations creating the catalog tables and `player_profiles`.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies pending migrations.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), DomainError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("migration failed: {e}")))
}
