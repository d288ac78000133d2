//! Shared test utilities for certify-db unit tests.
//!
//! Connections are opened per call, so tests use a file in a temp dir
//! rather than `:memory:` (each in-memory connection is its own database).

#[cfg(test)]
pub(crate) mod helpers {
    use tempfile::TempDir;

    use crate::CertifyDb;
    use crate::service::{CertifyService, ServiceSettings};

    pub async fn test_db() -> (CertifyDb, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("certify.db");
        let db = CertifyDb::open_local(path.to_str().unwrap(), "Certify Test")
            .await
            .unwrap();
        (db, dir)
    }

    pub async fn test_service() -> (CertifyService, TempDir) {
        let (db, dir) = test_db().await;
        let settings = ServiceSettings {
            app_type: "Certify Test".into(),
            ..ServiceSettings::default()
        };
        (CertifyService::from_db(db, settings), dir)
    }

    /// Insert a bare client row and return its id.
    pub async fn seed_client(svc: &CertifyService, company: &str) -> i64 {
        svc.db()
            .insert(
                "INSERT INTO clients (company) VALUES (?1)",
                vec![company.into()],
            )
            .await
            .unwrap()
    }

    /// Insert a lookup row by name and return its id.
    pub async fn seed_lookup(svc: &CertifyService, table: &str, name: &str) -> i64 {
        svc.db()
            .insert(
                &format!("INSERT INTO {table} (name) VALUES (?1)"),
                vec![name.into()],
            )
            .await
            .unwrap()
    }

    /// Insert a user with an auditor role and return the `user_auditor` id.
    pub async fn seed_auditor(svc: &CertifyService, full_name: &str) -> i64 {
        let user_id = svc
            .db()
            .insert(
                "INSERT INTO users (full_name, email, password) VALUES (?1, ?2, 'x')",
                vec![full_name.into(), format!("{}@example.com", full_name.replace(' ', ".")).into()],
            )
            .await
            .unwrap();
        svc.db()
            .insert(
                "INSERT INTO user_auditor (user_id) VALUES (?1)",
                vec![user_id.into()],
            )
            .await
            .unwrap()
    }
}
