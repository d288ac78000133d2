//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::CertifyDb;
use crate::error::DatabaseError;

/// Core tables, lookup lists, admin row and log tables.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");
/// Dashboard work-queue tables and reporting views.
const MIGRATION_002: &str = include_str!("../migrations/002_dashboard.sql");
/// Category address uses, test results and audit expenses.
const MIGRATION_003: &str = include_str!("../migrations/003_audit_records.sql");

impl CertifyDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let conn = self.connect().await?;
        conn.execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        conn.execute_batch(MIGRATION_002)
            .await
            .map_err(|e| DatabaseError::Migration(format!("002_dashboard: {e}")))?;
        conn.execute_batch(MIGRATION_003)
            .await
            .map_err(|e| DatabaseError::Migration(format!("003_audit_records: {e}")))?;
        Ok(())
    }
}
