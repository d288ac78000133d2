//! REST surface tests against a live listener on an ephemeral port.
//!
//! - Password grant: success, bad password, inactive user, wrong grant type
//! - Role checks: 401 without a token, 403 for web-only tokens
//! - Reads: clients, services, statuses, applications; 404s and 501 stubs

use chrono::TimeDelta;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

use certify_api::{AppState, router};
use certify_auth::TokenIssuer;
use certify_core::entities::{Client, Service, User};
use certify_core::enums::UserRole;
use certify_db::service::{CertifyService, ServiceSettings};

const PASSWORD: &str = "h0neyB33";

struct TestApi {
    base: String,
    http: reqwest::Client,
    service: std::sync::Arc<CertifyService>,
    _dir: TempDir,
}

impl TestApi {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.db");
        let settings = ServiceSettings {
            app_type: "Certify API".into(),
            ..ServiceSettings::default()
        };
        let service = CertifyService::new_local(path.to_str().unwrap(), settings)
            .await
            .unwrap();
        let tokens = TokenIssuer::new("api-test-secret", TimeDelta::hours(8)).unwrap();
        let state = AppState::new(service, tokens);
        let service = state.service.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            http: reqwest::Client::new(),
            service,
            _dir: dir,
        }
    }

    /// A user with the reset password; `auditor` adds the auditor role.
    async fn user(&self, email: &str, auditor: bool, active: bool) -> i64 {
        let user_id = self
            .service
            .save_user(&User {
                full_name: format!("User {email}"),
                email: email.into(),
                active,
                ..User::default()
            })
            .await
            .unwrap();
        if auditor {
            self.service
                .create_user_role(user_id, UserRole::Auditor)
                .await
                .unwrap();
        }
        user_id
    }

    async fn request_token(&self, grant_type: &str, username: &str, password: &str) -> reqwest::Response {
        let body = format!(
            "grant_type={}&username={}&password={}",
            urlencoding::encode(grant_type),
            urlencoding::encode(username),
            urlencoding::encode(password),
        );
        self.http
            .post(format!("{}/token", self.base))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    async fn token(&self, username: &str) -> String {
        let response = self.request_token("password", username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.http.get(format!("{}{path}", self.base));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.unwrap()
    }
}

// ---------------------------------------------------------------------------
// Token endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn password_grant_issues_bearer_token() {
    let api = TestApi::start().await;
    api.user("lee@example.com", true, true).await;

    let response = api.request_token("password", "lee@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    assert!(body["expires_in"].as_i64().unwrap() > 8 * 3600 - 10);

    let log = api.service.db().recent_log(1).await.unwrap();
    assert_eq!(log[0].entry, "Certify API: Access Granted for: User lee@example.com");
}

#[tokio::test]
async fn bad_credentials_are_invalid_grant() {
    let api = TestApi::start().await;
    api.user("lee@example.com", true, true).await;
    api.user("gone@example.com", true, false).await;

    for (username, password) in [
        ("lee@example.com", "wrong"),
        ("nobody@example.com", PASSWORD),
        ("gone@example.com", PASSWORD),
    ] {
        let response = api.request_token("password", username, password).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "invalid_grant");
        assert_eq!(
            body["error_description"],
            "The user name or password is incorrect."
        );
    }

    let log = api.service.db().recent_log(1).await.unwrap();
    assert_eq!(log[0].entry, "Certify API: Access Denied for: gone@example.com");
}

#[tokio::test]
async fn other_grant_types_are_unsupported() {
    let api = TestApi::start().await;
    let response = api.request_token("client_credentials", "x", "y").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "unsupported_grant_type");
}

// ---------------------------------------------------------------------------
// Role checks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_or_bad_token_is_401() {
    let api = TestApi::start().await;
    assert_eq!(api.get("/api/status", None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        api.get("/api/client", Some("not-a-token")).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn web_only_token_is_403_on_staff_routes() {
    let api = TestApi::start().await;
    api.user("web@example.com", false, true).await;
    let token = api.token("web@example.com").await;

    let status = api.get("/api/status", Some(&token)).await;
    assert_eq!(status.status(), StatusCode::OK);
    assert_eq!(status.json::<Value>().await.unwrap(), "Status: OK");

    assert_eq!(
        api.get("/api/client", Some(&token)).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        api.get("/api/sxcstatus", Some(&token)).await.status(),
        StatusCode::FORBIDDEN
    );
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clients_list_and_fetch() {
    let api = TestApi::start().await;
    api.user("lee@example.com", true, true).await;
    let token = api.token("lee@example.com").await;
    let a = api.service.save_client(&Client::new("Alpha Farm")).await.unwrap();
    api.service.save_client(&Client::new("Beta Farm")).await.unwrap();

    let list: Value = api
        .get("/api/client?maxCount=1", Some(&token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(list, serde_json::json!([[a.to_string(), "Alpha Farm"]]));

    let client: Value = api
        .get(&format!("/api/client/{a}"), Some(&token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(client["company"], "Alpha Farm");

    assert_eq!(
        api.get("/api/client/9999", Some(&token)).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        api.get(&format!("/api/clientaddress/{a}"), Some(&token))
            .await
            .json::<Value>()
            .await
            .unwrap(),
        serde_json::json!([])
    );
}

#[tokio::test]
async fn services_need_no_token() {
    let api = TestApi::start().await;
    let id = api.service.save_service(&Service::new("Organic")).await.unwrap();

    let names: Value = api.get("/api/service", None).await.json().await.unwrap();
    assert_eq!(names, serde_json::json!(["Organic"]));

    let service: Value = api
        .get(&format!("/api/service/{id}"), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(service["name"], "Organic");
}

#[tokio::test]
async fn writes_are_not_implemented() {
    let api = TestApi::start().await;
    api.user("lee@example.com", true, true).await;
    let token = api.token("lee@example.com").await;

    let response = api
        .http
        .post(format!("{}/api/client", api.base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    let response = api
        .http
        .delete(format!("{}/api/service/1", api.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn statuses_by_name_and_index() {
    let api = TestApi::start().await;
    api.user("lee@example.com", true, true).await;
    let token = api.token("lee@example.com").await;

    let active: Value = api.get("/api/sxcstatus", Some(&token)).await.json().await.unwrap();
    assert_eq!(active, serde_json::json!([]));

    let by_name: Value = api
        .get("/api/sxcstatus/overdue_car", Some(&token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(by_name["type"], "OVERDUE_CAR");
    assert_eq!(by_name["name"], "0 Overdue CARs");

    let by_index: Value = api.get("/api/sxcstatus/0", Some(&token)).await.json().await.unwrap();
    assert_eq!(by_index["type"], "NEW_PRODUCT");

    assert_eq!(
        api.get("/api/sxcstatus/BOGUS", Some(&token)).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn unsubmitted_application_is_404() {
    let api = TestApi::start().await;
    api.user("lee@example.com", true, true).await;
    let token = api.token("lee@example.com").await;
    let id = api
        .service
        .save_application(&certify_core::entities::WebApplication::default())
        .await
        .unwrap();

    assert_eq!(
        api.get(&format!("/api/application/{id}"), Some(&token)).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        api.get(&format!("/api/applicationresponse/{id}"), Some(&token))
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
    let open: Value = api
        .get("/api/application?criteria=open", Some(&token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(open.as_array().unwrap().len(), 1);
}
