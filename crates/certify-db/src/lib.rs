//! # certify-db
//!
//! libSQL persistence for Certify.
//!
//! Holds the relational state for clients, services, audits, web
//! applications, users and the dashboard work queues. Every call opens
//! its own connection, runs one statement, and drops the connection;
//! there are no multi-statement transactions and no retries.
//!
//! SQL failures are written to the `log` table and traced before the
//! error is returned to the caller.

pub mod error;
pub mod helpers;
pub mod log;
mod migrations;
pub mod repos;
pub mod service;
pub mod status;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::{Builder, Value};

/// Central database handle.
///
/// Wraps a libSQL database. Connections are opened per call, so the
/// handle is cheap to share across tasks.
pub struct CertifyDb {
    db: libsql::Database,
    log_prefix: String,
}

impl CertifyDb {
    /// Open a local database file, creating it if needed.
    ///
    /// Runs migrations automatically. `log_prefix` is written before
    /// every `log` table entry from this handle.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str, log_prefix: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let certify_db = Self {
            db,
            log_prefix: log_prefix.to_string(),
        };
        certify_db.run_migrations().await?;
        Ok(certify_db)
    }

    #[must_use]
    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }

    /// Open a fresh connection with foreign keys enforced.
    pub(crate) async fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.db.connect()?;
        // Must be set per connection in SQLite
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("PRAGMA foreign_keys: {e}")))?;
        Ok(conn)
    }

    /// Run a statement and return the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the statement fails.
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64, DatabaseError> {
        let result = async {
            let conn = self.connect().await?;
            Ok(conn.execute(sql, libsql::params_from_iter(params)).await?)
        }
        .await;
        self.logged(sql, result).await
    }

    /// Run an `INSERT` and return the new row's id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the statement fails.
    pub async fn insert(&self, sql: &str, params: Vec<Value>) -> Result<i64, DatabaseError> {
        let result = async {
            let conn = self.connect().await?;
            conn.execute(sql, libsql::params_from_iter(params)).await?;
            Ok(conn.last_insert_rowid())
        }
        .await;
        self.logged(sql, result).await
    }

    /// Run a query and map every row.
    ///
    /// Rows are mapped while the statement is live; a `libsql::Row` must not
    /// outlive the iteration that produced it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row cannot be mapped.
    pub async fn query_map<T, F>(
        &self,
        sql: &str,
        params: Vec<Value>,
        map: F,
    ) -> Result<Vec<T>, DatabaseError>
    where
        F: Fn(&libsql::Row) -> Result<T, DatabaseError>,
    {
        let result = async {
            let conn = self.connect().await?;
            let mut rows = conn.query(sql, libsql::params_from_iter(params)).await?;
            let mut out = Vec::new();
            while let Some(row) = rows.next().await? {
                out.push(map(&row)?);
            }
            Ok(out)
        }
        .await;
        self.logged(sql, result).await
    }

    /// Run a query and map the first row, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the row cannot be mapped.
    pub async fn query_one<T, F>(
        &self,
        sql: &str,
        params: Vec<Value>,
        map: F,
    ) -> Result<Option<T>, DatabaseError>
    where
        F: Fn(&libsql::Row) -> Result<T, DatabaseError>,
    {
        let result = async {
            let conn = self.connect().await?;
            let mut rows = conn.query(sql, libsql::params_from_iter(params)).await?;
            match rows.next().await? {
                Some(row) => Ok(Some(map(&row)?)),
                None => Ok(None),
            }
        }
        .await;
        self.logged(sql, result).await
    }

    /// Run a `SELECT COUNT(*)` style query. No row counts as zero.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count(&self, sql: &str, params: Vec<Value>) -> Result<i64, DatabaseError> {
        Ok(self
            .query_one(sql, params, |row| Ok(row.get::<i64>(0)?))
            .await?
            .unwrap_or(0))
    }

    /// True when a counting query returns more than zero.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn exists(&self, sql: &str, params: Vec<Value>) -> Result<bool, DatabaseError> {
        Ok(self.count(sql, params).await? > 0)
    }

    async fn logged<T>(
        &self,
        sql: &str,
        result: Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        if let Err(error) = &result {
            let statement = sql_summary(sql);
            tracing::error!(%error, statement, "database call failed");
            self.write_log(&format!("Database error: {error} [{statement}]"))
                .await;
        }
        result
    }
}

/// First line of a statement, whitespace collapsed, for log entries.
fn sql_summary(sql: &str) -> String {
    sql.split_whitespace().take(12).collect::<Vec<_>>().join(" ")
}
