//! User repository: accounts, role rows, web-client membership, credentials.
//!
//! Role tables come from [`UserRole::table_name`], never from input.

use certify_core::entities::{DEFAULT_PASSWORD_HASH, DEFAULT_PASSWORD_SALT, User};
use certify_core::enums::{ApiRole, UserRole};
use certify_core::ids::UNSET_ID;

use crate::error::DatabaseError;
use crate::helpers::{flag, get_flag, get_opt_string, get_string, opt_text, text};
use crate::service::CertifyService;

const MISSING_USER_DETAILS: &str =
    "Please ensure the Users full name and email address have been entered.";

const USER_COLUMNS: &str = "id, full_name, user_position, email, password, password_salt, phone,
     phone_secondary, domain_user_name, training_plan, is_admin, active, send_newsletter,
     send_promotions";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        user_id: row.get::<i64>(0)?,
        web_id: None,
        auditor_id: None,
        staff_id: None,
        full_name: get_string(row, 1)?,
        user_position: get_opt_string(row, 2)?,
        email: get_string(row, 3)?,
        password: get_string(row, 4)?,
        password_salt: get_string(row, 5)?,
        phone: get_opt_string(row, 6)?,
        phone_secondary: get_opt_string(row, 7)?,
        domain_user_name: get_opt_string(row, 8)?,
        training_plan: get_opt_string(row, 9)?,
        is_admin: get_flag(row, 10)?,
        active: get_flag(row, 11)?,
        send_newsletter: get_flag(row, 12)?,
        send_promotions: get_flag(row, 13)?,
    })
}

impl CertifyService {
    /// Load a user with the ids of their live role rows.
    pub async fn fetch_user(&self, user_id: i64) -> Result<User, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = self
            .db()
            .query_one(&sql, vec![user_id.into()], row_to_user)
            .await?
            .ok_or_else(|| DatabaseError::not_found("user", user_id))?;
        self.with_roles(user).await
    }

    /// The user registered under `email`, when exactly one is.
    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        let mut users = self
            .db()
            .query_map(&sql, vec![text(email.trim())], row_to_user)
            .await?;
        if users.len() != 1 {
            return Ok(None);
        }
        match users.pop() {
            Some(user) => Ok(Some(self.with_roles(user).await?)),
            None => Ok(None),
        }
    }

    async fn with_roles(&self, mut user: User) -> Result<User, DatabaseError> {
        user.web_id = self.live_role_id(user.user_id, UserRole::Web).await?;
        user.auditor_id = self.live_role_id(user.user_id, UserRole::Auditor).await?;
        user.staff_id = self.live_role_id(user.user_id, UserRole::Staff).await?;
        Ok(user)
    }

    async fn live_role_id(&self, user_id: i64, role: UserRole) -> Result<Option<i64>, DatabaseError> {
        let sql = format!(
            "SELECT id FROM {} WHERE user_id = ?1 AND is_deleted = 0 ORDER BY id LIMIT 1",
            role.table_name()
        );
        self.db()
            .query_one(&sql, vec![user_id.into()], |row| Ok(row.get::<i64>(0)?))
            .await
    }

    /// Insert or update a user. Returns the user id.
    ///
    /// New users also get a confirmed web role.
    pub async fn save_user(&self, user: &User) -> Result<i64, DatabaseError> {
        if user.full_name.trim().is_empty() || user.email.trim().is_empty() {
            self.write_log(MISSING_USER_DETAILS).await;
            return Err(DatabaseError::validation(MISSING_USER_DETAILS));
        }
        let mut params = vec![
            text(user.full_name.trim()),
            opt_text(user.user_position.as_deref()),
            text(user.email.trim()),
            opt_text(user.phone.as_deref()),
            opt_text(user.phone_secondary.as_deref()),
            text(&user.password),
            text(&user.password_salt),
            opt_text(user.domain_user_name.as_deref()),
            opt_text(user.training_plan.as_deref()),
            flag(user.is_admin),
            flag(user.active),
            flag(user.send_newsletter),
            flag(user.send_promotions),
        ];

        if user.user_id == UNSET_ID {
            let user_id = self
                .db()
                .insert(
                    "INSERT INTO users (full_name, user_position, email, phone, phone_secondary,
                     password, password_salt, domain_user_name, training_plan, is_admin, active,
                     send_newsletter, send_promotions)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                    params,
                )
                .await?;
            self.create_user_role(user_id, UserRole::Web).await?;
            return Ok(user_id);
        }

        params.push(user.user_id.into());
        self.db()
            .execute(
                "UPDATE users SET full_name = ?1, user_position = ?2, email = ?3, phone = ?4,
                 phone_secondary = ?5, password = ?6, password_salt = ?7, domain_user_name = ?8,
                 training_plan = ?9, is_admin = ?10, active = ?11, send_newsletter = ?12,
                 send_promotions = ?13
                 WHERE id = ?14",
                params,
            )
            .await?;
        Ok(user.user_id)
    }

    // -----------------------------------------------------------------------
    // Roles
    // -----------------------------------------------------------------------

    /// Whether the user currently holds the role.
    pub async fn is_user_role(&self, user_id: i64, role: UserRole) -> Result<bool, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = ?1 AND is_deleted = 0",
            role.table_name()
        );
        self.db().exists(&sql, vec![user_id.into()]).await
    }

    /// Any role row for the user, deleted or not.
    async fn has_role_row(&self, user_id: i64, role: UserRole) -> Result<bool, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE user_id = ?1", role.table_name());
        self.db().exists(&sql, vec![user_id.into()]).await
    }

    pub async fn is_user_role_deleted(&self, user_id: i64, role: UserRole) -> Result<bool, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = ?1 AND is_deleted = 1",
            role.table_name()
        );
        self.db().exists(&sql, vec![user_id.into()]).await
    }

    /// Give the user a role, reinstating a deleted one. Returns the role row id.
    pub async fn create_user_role(&self, user_id: i64, role: UserRole) -> Result<i64, DatabaseError> {
        let table = role.table_name();
        if !self.has_role_row(user_id, role).await? {
            let sql = match role {
                UserRole::Web => format!("INSERT INTO {table} (user_id, is_confirmed) VALUES (?1, 1)"),
                UserRole::Auditor | UserRole::Staff => format!("INSERT INTO {table} (user_id) VALUES (?1)"),
            };
            return self.db().insert(&sql, vec![user_id.into()]).await;
        }

        if self.is_user_role_deleted(user_id, role).await? {
            let sql = format!("UPDATE {table} SET is_deleted = 0 WHERE user_id = ?1");
            self.db().execute(&sql, vec![user_id.into()]).await?;
        }
        let sql = format!("SELECT id FROM {table} WHERE user_id = ?1 ORDER BY id LIMIT 1");
        self.db()
            .query_one(&sql, vec![user_id.into()], |row| Ok(row.get::<i64>(0)?))
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    /// Soft delete the user's role. A user without the role counts as done.
    pub async fn delete_user_role(&self, user_id: i64, role: UserRole) -> Result<bool, DatabaseError> {
        if !self.has_role_row(user_id, role).await? {
            return Ok(true);
        }
        if self.is_user_role_deleted(user_id, role).await? {
            return Ok(false);
        }
        let sql = format!("UPDATE {} SET is_deleted = 1 WHERE user_id = ?1", role.table_name());
        Ok(self.db().execute(&sql, vec![user_id.into()]).await? > 0)
    }

    /// Roles carried in the user's bearer token.
    pub async fn api_roles(&self, user_id: i64) -> Result<Vec<ApiRole>, DatabaseError> {
        let user = self.fetch_user(user_id).await?;
        let mut roles = Vec::new();
        if user.web_id.is_some() {
            roles.push(ApiRole::Web);
        }
        if user.auditor_id.is_some() {
            roles.push(ApiRole::Auditor);
        }
        if user.is_admin {
            roles.push(ApiRole::Admin);
        }
        Ok(roles)
    }

    // -----------------------------------------------------------------------
    // Web users and clients
    // -----------------------------------------------------------------------

    /// Any membership row, deleted or not.
    pub async fn does_user_belong_to_client(&self, user: &User, client_id: i64) -> Result<bool, DatabaseError> {
        let Some(web_id) = user.web_id else {
            return Ok(false);
        };
        if client_id == UNSET_ID {
            return Ok(false);
        }
        self.db()
            .exists(
                "SELECT COUNT(*) FROM user_web_clients WHERE user_web_id = ?1 AND client_id = ?2",
                vec![web_id.into(), client_id.into()],
            )
            .await
    }

    /// True unless a live membership row exists.
    pub async fn is_user_web_client_deleted(&self, user: &User, client_id: i64) -> Result<bool, DatabaseError> {
        let Some(web_id) = user.web_id else {
            return Ok(true);
        };
        Ok(!self
            .db()
            .exists(
                "SELECT COUNT(*) FROM user_web_clients
                 WHERE user_web_id = ?1 AND client_id = ?2 AND is_deleted = 0",
                vec![web_id.into(), client_id.into()],
            )
            .await?)
    }

    /// Make the web user an authorised user of the client.
    pub async fn add_web_user_to_client(&self, user: &User, client_id: i64) -> Result<bool, DatabaseError> {
        let Some(web_id) = user.web_id else {
            return Ok(false);
        };
        if client_id == UNSET_ID {
            return Ok(false);
        }
        if !self.does_user_belong_to_client(user, client_id).await? {
            self.db()
                .insert(
                    "INSERT INTO user_web_clients (user_web_id, client_id, admin) VALUES (?1, ?2, 0)",
                    vec![web_id.into(), client_id.into()],
                )
                .await?;
            return Ok(true);
        }
        if self.is_user_web_client_deleted(user, client_id).await? {
            self.db()
                .execute(
                    "UPDATE user_web_clients SET is_deleted = 0 WHERE user_web_id = ?1 AND client_id = ?2",
                    vec![web_id.into(), client_id.into()],
                )
                .await?;
        }
        Ok(true)
    }

    pub async fn delete_web_user_from_client(&self, user: &User, client_id: i64) -> Result<(), DatabaseError> {
        let Some(web_id) = user.web_id else {
            return Ok(());
        };
        self.db()
            .execute(
                "UPDATE user_web_clients SET is_deleted = 1 WHERE user_web_id = ?1 AND client_id = ?2",
                vec![web_id.into(), client_id.into()],
            )
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    /// Put the user back on the default password.
    pub async fn reset_password(&self, user_id: i64) -> Result<bool, DatabaseError> {
        self.set_password(user_id, DEFAULT_PASSWORD_HASH, DEFAULT_PASSWORD_SALT)
            .await
    }

    pub async fn set_password(&self, user_id: i64, hash: &str, salt: &str) -> Result<bool, DatabaseError> {
        Ok(self
            .db()
            .execute(
                "UPDATE users SET password = ?1, password_salt = ?2 WHERE id = ?3",
                vec![text(hash), text(salt), user_id.into()],
            )
            .await?
            == 1)
    }

    /// Clear a lockout caused by failed logins.
    pub async fn unlock_web_access(&self, user_id: i64) -> Result<bool, DatabaseError> {
        Ok(self
            .db()
            .execute(
                "UPDATE user_web SET lockout_end_date_time = NULL, failed_login_count = 0 WHERE user_id = ?1",
                vec![user_id.into()],
            )
            .await?
            > 0)
    }

    pub async fn confirm_account(&self, user_id: i64) -> Result<bool, DatabaseError> {
        Ok(self
            .db()
            .execute(
                "UPDATE user_web SET is_confirmed = 1 WHERE user_id = ?1",
                vec![user_id.into()],
            )
            .await?
            > 0)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    async fn single_id(&self, sql: &str, param: libsql::Value) -> Result<Option<i64>, DatabaseError> {
        let ids = self
            .db()
            .query_map(sql, vec![param], |row| Ok(row.get::<i64>(0)?))
            .await?;
        Ok(match ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        })
    }

    pub async fn user_id_by_name(&self, full_name: &str) -> Result<Option<i64>, DatabaseError> {
        self.single_id("SELECT id FROM users WHERE full_name = ?1", text(full_name))
            .await
    }

    pub async fn user_id_by_domain_name(&self, domain_user_name: &str) -> Result<Option<i64>, DatabaseError> {
        self.single_id(
            "SELECT id FROM users WHERE domain_user_name = ?1",
            text(domain_user_name),
        )
        .await
    }

    pub async fn user_full_name(&self, user_id: i64) -> Result<Option<String>, DatabaseError> {
        self.db()
            .query_one("SELECT full_name FROM users WHERE id = ?1", vec![user_id.into()], |row| {
                get_string(row, 0)
            })
            .await
    }

    pub async fn auditor_full_name(&self, auditor_id: i64) -> Result<Option<String>, DatabaseError> {
        self.db()
            .query_one(
                "SELECT u.full_name FROM users u
                 JOIN user_auditor a ON a.user_id = u.id
                 WHERE a.id = ?1",
                vec![auditor_id.into()],
                |row| get_string(row, 0),
            )
            .await
    }

    pub async fn auditor_id_by_name(&self, full_name: &str) -> Result<Option<i64>, DatabaseError> {
        self.single_id(
            "SELECT a.id FROM users u JOIN user_auditor a ON a.user_id = u.id WHERE u.full_name = ?1",
            text(full_name),
        )
        .await
    }

    pub async fn auditor_id_for_user(&self, user_id: i64) -> Result<Option<i64>, DatabaseError> {
        self.single_id("SELECT id FROM user_auditor WHERE user_id = ?1", user_id.into())
            .await
    }

    pub async fn user_id_for_auditor(&self, auditor_id: i64) -> Result<Option<i64>, DatabaseError> {
        self.single_id("SELECT user_id FROM user_auditor WHERE id = ?1", auditor_id.into())
            .await
    }

    pub async fn user_id_for_web_user(&self, web_id: i64) -> Result<Option<i64>, DatabaseError> {
        self.single_id("SELECT user_id FROM user_web WHERE id = ?1", web_id.into())
            .await
    }

    pub async fn user_email(&self, user_id: i64) -> Result<Option<String>, DatabaseError> {
        self.db()
            .query_one("SELECT email FROM users WHERE id = ?1", vec![user_id.into()], |row| {
                get_string(row, 0)
            })
            .await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError> {
        self.db()
            .exists("SELECT COUNT(*) FROM users WHERE email = ?1", vec![text(email.trim())])
            .await
    }

    pub async fn full_name_exists(&self, full_name: &str) -> Result<bool, DatabaseError> {
        self.db()
            .exists(
                "SELECT COUNT(*) FROM users WHERE full_name = ?1",
                vec![text(full_name.trim())],
            )
            .await
    }

    pub async fn count_active_web_users(&self) -> Result<i64, DatabaseError> {
        self.db()
            .count("SELECT COUNT(*) FROM user_web WHERE is_deleted = 0", vec![])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_client, test_service};
    use pretty_assertions::assert_eq;

    fn jane() -> User {
        User {
            full_name: "Jane Citizen".into(),
            email: "jane@example.com".into(),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn new_user_gets_confirmed_web_role() {
        let (svc, _dir) = test_service().await;
        let id = svc.save_user(&jane()).await.unwrap();

        let user = svc.fetch_user(id).await.unwrap();
        assert!(user.web_id.is_some());
        assert_eq!(user.auditor_id, None);
        assert_eq!(user.password, DEFAULT_PASSWORD_HASH);
        let confirmed = svc
            .db()
            .count(
                "SELECT COUNT(*) FROM user_web WHERE user_id = ?1 AND is_confirmed = 1",
                vec![id.into()],
            )
            .await
            .unwrap();
        assert_eq!(confirmed, 1);
        assert_eq!(svc.count_active_web_users().await.unwrap(), 1);
        assert_eq!(svc.api_roles(id).await.unwrap(), vec![ApiRole::Web]);
    }

    #[tokio::test]
    async fn missing_details_are_rejected_and_logged() {
        let (svc, _dir) = test_service().await;
        let err = svc
            .save_user(&User {
                email: String::new(),
                ..jane()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("full name and email"));
        let log = svc.db().recent_log(1).await.unwrap();
        assert!(log[0].entry.ends_with(MISSING_USER_DETAILS));
    }

    #[tokio::test]
    async fn roles_create_delete_and_reinstate() {
        let (svc, _dir) = test_service().await;
        let id = svc.save_user(&jane()).await.unwrap();

        assert!(!svc.is_user_role(id, UserRole::Auditor).await.unwrap());
        assert!(svc.delete_user_role(id, UserRole::Auditor).await.unwrap());

        let auditor = svc.create_user_role(id, UserRole::Auditor).await.unwrap();
        assert_eq!(svc.auditor_id_for_user(id).await.unwrap(), Some(auditor));
        assert_eq!(svc.user_id_for_auditor(auditor).await.unwrap(), Some(id));
        assert_eq!(svc.auditor_full_name(auditor).await.unwrap().as_deref(), Some("Jane Citizen"));
        assert_eq!(svc.auditor_id_by_name("Jane Citizen").await.unwrap(), Some(auditor));

        assert!(svc.delete_user_role(id, UserRole::Auditor).await.unwrap());
        assert!(svc.is_user_role_deleted(id, UserRole::Auditor).await.unwrap());
        assert!(!svc.delete_user_role(id, UserRole::Auditor).await.unwrap());
        assert_eq!(svc.fetch_user(id).await.unwrap().auditor_id, None);

        assert_eq!(svc.create_user_role(id, UserRole::Auditor).await.unwrap(), auditor);
        assert!(!svc.is_user_role_deleted(id, UserRole::Auditor).await.unwrap());
    }

    #[tokio::test]
    async fn revoked_role_is_not_held() {
        let (svc, _dir) = test_service().await;
        let id = svc.save_user(&jane()).await.unwrap();

        svc.create_user_role(id, UserRole::Auditor).await.unwrap();
        assert!(svc.is_user_role(id, UserRole::Auditor).await.unwrap());

        svc.delete_user_role(id, UserRole::Auditor).await.unwrap();
        assert!(!svc.is_user_role(id, UserRole::Auditor).await.unwrap());
        assert!(svc.is_user_role_deleted(id, UserRole::Auditor).await.unwrap());

        svc.create_user_role(id, UserRole::Auditor).await.unwrap();
        assert!(svc.is_user_role(id, UserRole::Auditor).await.unwrap());
    }

    #[tokio::test]
    async fn admin_and_auditor_roles_reach_the_token() {
        let (svc, _dir) = test_service().await;
        let id = svc
            .save_user(&User {
                is_admin: true,
                ..jane()
            })
            .await
            .unwrap();
        svc.create_user_role(id, UserRole::Auditor).await.unwrap();
        svc.delete_user_role(id, UserRole::Web).await.unwrap();
        assert_eq!(
            svc.api_roles(id).await.unwrap(),
            vec![ApiRole::Auditor, ApiRole::Admin]
        );
    }

    #[tokio::test]
    async fn web_client_membership() {
        let (svc, _dir) = test_service().await;
        let id = svc.save_user(&jane()).await.unwrap();
        let user = svc.fetch_user(id).await.unwrap();
        let client_id = seed_client(&svc, "Member Co").await;

        assert!(!svc.does_user_belong_to_client(&user, client_id).await.unwrap());
        assert!(svc.is_user_web_client_deleted(&user, client_id).await.unwrap());

        assert!(svc.add_web_user_to_client(&user, client_id).await.unwrap());
        assert!(!svc.is_user_web_client_deleted(&user, client_id).await.unwrap());

        svc.delete_web_user_from_client(&user, client_id).await.unwrap();
        assert!(svc.does_user_belong_to_client(&user, client_id).await.unwrap());
        assert!(svc.is_user_web_client_deleted(&user, client_id).await.unwrap());

        assert!(svc.add_web_user_to_client(&user, client_id).await.unwrap());
        let rows = svc
            .db()
            .count("SELECT COUNT(*) FROM user_web_clients", vec![])
            .await
            .unwrap();
        assert_eq!(rows, 1);

        let no_web = User::default();
        assert!(!svc.add_web_user_to_client(&no_web, client_id).await.unwrap());
    }

    #[tokio::test]
    async fn credentials_and_account_state() {
        let (svc, _dir) = test_service().await;
        let id = svc.save_user(&jane()).await.unwrap();

        assert!(svc.set_password(id, "ABC", "salt").await.unwrap());
        let user = svc.user_by_email("jane@example.com").await.unwrap().unwrap();
        assert_eq!((user.password.as_str(), user.password_salt.as_str()), ("ABC", "salt"));

        assert!(svc.reset_password(id).await.unwrap());
        assert_eq!(svc.fetch_user(id).await.unwrap().password_salt, DEFAULT_PASSWORD_SALT);

        svc.db()
            .execute(
                "UPDATE user_web SET failed_login_count = 5, lockout_end_date_time = '2030-01-01 00:00:00', is_confirmed = 0 WHERE user_id = ?1",
                vec![id.into()],
            )
            .await
            .unwrap();
        assert!(svc.unlock_web_access(id).await.unwrap());
        assert!(svc.confirm_account(id).await.unwrap());
        let locked = svc
            .db()
            .count(
                "SELECT COUNT(*) FROM user_web WHERE user_id = ?1 AND (failed_login_count > 0 OR is_confirmed = 0)",
                vec![id.into()],
            )
            .await
            .unwrap();
        assert_eq!(locked, 0);
    }

    #[tokio::test]
    async fn name_and_email_lookups() {
        let (svc, _dir) = test_service().await;
        let id = svc
            .save_user(&User {
                domain_user_name: Some("CERT\\jane".into()),
                ..jane()
            })
            .await
            .unwrap();
        assert_eq!(svc.user_id_by_name("Jane Citizen").await.unwrap(), Some(id));
        assert_eq!(svc.user_id_by_domain_name("CERT\\jane").await.unwrap(), Some(id));
        assert_eq!(svc.user_email(id).await.unwrap().as_deref(), Some("jane@example.com"));
        assert_eq!(svc.user_full_name(id).await.unwrap().as_deref(), Some("Jane Citizen"));
        assert!(svc.email_exists("jane@example.com").await.unwrap());
        assert!(svc.full_name_exists("Jane Citizen").await.unwrap());
        assert!(!svc.email_exists("nobody@example.com").await.unwrap());

        let web_id = svc.fetch_user(id).await.unwrap().web_id.unwrap();
        assert_eq!(svc.user_id_for_web_user(web_id).await.unwrap(), Some(id));

        svc.save_user(&User {
            email: "jane2@example.com".into(),
            ..jane()
        })
        .await
        .unwrap();
        assert_eq!(svc.user_id_by_name("Jane Citizen").await.unwrap(), None);
        assert!(svc.user_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
