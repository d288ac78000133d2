//! The `log` and `log_email` tables.
//!
//! Operational messages from every Certify process land in `log`, each
//! prefixed with the writing application's name. The monitor counts error
//! lines here to decide whether to raise an alert.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::CertifyDb;
use crate::error::DatabaseError;
use crate::helpers::{datetime, get_opt_datetime, get_string, opt_text, text};

/// Longest entry the `log` table accepts, prefix included.
pub const MAX_LOG_ENTRY_CHARS: usize = 450;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub entry: String,
    pub entry_date_time: Option<NaiveDateTime>,
}

/// `"{prefix}: {entry}"`, cut to [`MAX_LOG_ENTRY_CHARS`] characters.
#[must_use]
pub fn format_log_entry(prefix: &str, entry: &str) -> String {
    format!("{prefix}: {entry}")
        .chars()
        .take(MAX_LOG_ENTRY_CHARS)
        .collect()
}

impl CertifyDb {
    /// Append to the `log` table. Never fails; a write error is traced.
    pub async fn write_log(&self, entry: &str) {
        let line = format_log_entry(&self.log_prefix, entry);
        if let Err(error) = self.insert_log_line(&line).await {
            tracing::warn!(%error, entry = %line, "could not write log entry");
        }
    }

    async fn insert_log_line(&self, line: &str) -> Result<(), DatabaseError> {
        // Bypasses `execute` so a failing log insert cannot log itself.
        let conn = self.connect().await?;
        conn.execute("INSERT INTO log (entry) VALUES (?1)", [line])
            .await?;
        Ok(())
    }

    /// Record an outgoing email.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the insert fails.
    pub async fn write_email_log(
        &self,
        to: Option<&str>,
        subject: Option<&str>,
        entry: &str,
    ) -> Result<i64, DatabaseError> {
        self.insert(
            "INSERT INTO log_email (email_to, subject, entry) VALUES (?1, ?2, ?3)",
            vec![opt_text(to), opt_text(subject), text(entry)],
        )
        .await
    }

    /// Count error lines written after `since` across both log tables.
    ///
    /// Lines produced by the error report itself ("Error Log", "No Errors")
    /// are excluded, and email log lines about log errors too.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if either count fails.
    pub async fn log_error_count(&self, since: NaiveDateTime) -> Result<i64, DatabaseError> {
        let log_errors = self
            .count(
                "SELECT COUNT(*) FROM log
                 WHERE entry LIKE '%error%'
                   AND entry NOT LIKE '%Error Log%'
                   AND entry NOT LIKE '%No Errors%'
                   AND entry_date_time > ?1",
                vec![datetime(since)],
            )
            .await?;
        let email_errors = self
            .count(
                "SELECT COUNT(*) FROM log_email
                 WHERE entry LIKE '%error%'
                   AND entry NOT LIKE '%Error Log%'
                   AND entry NOT LIKE '%No Errors%'
                   AND entry NOT LIKE '%Log Error%'
                   AND entry_date_time > ?1",
                vec![datetime(since)],
            )
            .await?;
        Ok(log_errors + email_errors)
    }

    /// Most recent `log` entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn recent_log(&self, limit: u32) -> Result<Vec<LogEntry>, DatabaseError> {
        self.query_map(
            "SELECT id, entry, entry_date_time FROM log ORDER BY id DESC LIMIT ?1",
            vec![i64::from(limit).into()],
            |row| {
                Ok(LogEntry {
                    id: row.get::<i64>(0)?,
                    entry: get_string(row, 1)?,
                    entry_date_time: get_opt_datetime(row, 2)?,
                })
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_db;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn entries_are_prefixed_and_truncated() {
        assert_eq!(format_log_entry("Certify API", "hello"), "Certify API: hello");
        let long = "x".repeat(1000);
        let line = format_log_entry("Certify API", &long);
        assert_eq!(line.chars().count(), MAX_LOG_ENTRY_CHARS);
        assert!(line.starts_with("Certify API: xxx"));
    }

    #[tokio::test]
    async fn write_log_prefixes_with_app_type() {
        let (db, _dir) = test_db().await;
        db.write_log("Access Granted for: Jane").await;

        let entries = db.recent_log(5).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry, "Certify Test: Access Granted for: Jane");
        assert!(entries[0].entry_date_time.is_some());
    }

    #[tokio::test]
    async fn error_count_filters_report_lines() {
        let (db, _dir) = test_db().await;
        db.write_log("Error saving client").await;
        db.write_log("Daily Error Log sent").await;
        db.write_log("No Errors found").await;
        db.write_log("all fine").await;
        db.write_email_log(Some("ops@example.com"), Some("Alert"), "SMTP error")
            .await
            .unwrap();
        db.write_email_log(None, None, "Log Error report sent")
            .await
            .unwrap();

        let since = (Utc::now() - Duration::hours(1)).naive_utc();
        assert_eq!(db.log_error_count(since).await.unwrap(), 2);

        let later = (Utc::now() + Duration::hours(1)).naive_utc();
        assert_eq!(db.log_error_count(later).await.unwrap(), 0);
    }
}
