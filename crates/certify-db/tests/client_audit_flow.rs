//! End-to-end repository flows against a real database file.
//!
//! - Client lifecycle: save, fetch with audit cycle, soft delete
//! - Audit lifecycle: validation logging, services, open list, dashboard count
//! - Web applications: workflow history and soft delete round trip

use tempfile::TempDir;

use certify_core::entities::{Audit, AuditService, Client, Service, User, WebApplication};
use certify_core::enums::{ListCriteria, StatusType, UserRole};
use certify_core::ids::UNSET_ID;
use certify_core::names::WORKFLOW_READY_FOR_DECISION;
use certify_db::repos::lookup::LookupList;
use certify_db::service::{CertifyService, ServiceSettings};

async fn test_service() -> (CertifyService, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flow.db");
    let settings = ServiceSettings {
        app_type: "Certify Flow".into(),
        ..ServiceSettings::default()
    };
    let svc = CertifyService::new_local(path.to_str().unwrap(), settings)
        .await
        .unwrap();
    (svc, dir)
}

async fn auditor(svc: &CertifyService, name: &str) -> i64 {
    let user_id = svc
        .save_user(&User {
            full_name: name.into(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            ..User::default()
        })
        .await
        .unwrap();
    svc.create_user_role(user_id, UserRole::Auditor).await.unwrap()
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_lifecycle() {
    let (svc, _dir) = test_service().await;

    let id = svc.save_client(&Client::new("Green Acres Pty Ltd")).await.unwrap();
    let client = svc.fetch_client(id).await.unwrap();
    assert_eq!(client.company, "Green Acres Pty Ltd");
    assert!(client.audit_cycle.is_some());

    assert_eq!(
        svc.client_id_by_name("Green Acres Pty Ltd").await.unwrap(),
        Some(id)
    );
    assert_eq!(svc.list_clients(0).await.unwrap().len(), 1);

    svc.delete_client(id).await.unwrap();
    assert!(svc.list_clients(0).await.unwrap().is_empty());
    assert_eq!(
        svc.client_id_by_name("Green Acres Pty Ltd").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_clients_are_hidden_from_lists() {
    let (svc, _dir) = test_service().await;
    svc.save_client(&Client::new("Real Farm")).await.unwrap();
    svc.save_client(&Client {
        is_test: true,
        ..Client::new("Test Client")
    })
    .await
    .unwrap();

    let listed = svc.list_clients(10).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].1, "Real Farm");
}

// ---------------------------------------------------------------------------
// Audits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_audit_is_logged_and_rejected() {
    let (svc, _dir) = test_service().await;
    let client_id = svc.save_client(&Client::new("Orchard Co")).await.unwrap();

    let err = svc
        .save_audit(&Audit {
            client_id,
            ..Audit::default()
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no lead auditor"));

    let log = svc.db().recent_log(1).await.unwrap();
    assert!(log[0].entry.starts_with("Certify Flow: "));
    assert!(log[0].entry.contains("no lead auditor"));
}

#[tokio::test]
async fn inspected_audit_reaches_dashboard_and_leaves_open_list_when_finished() {
    let (svc, _dir) = test_service().await;
    let client_id = svc.save_client(&Client::new("Vineyard Co")).await.unwrap();
    let lead = auditor(&svc, "Alex Field").await;
    let service_id = svc.save_service(&Service::new("Organic")).await.unwrap();
    let audit_type = svc.ensure_lookup(LookupList::AuditType, "Annual").await.unwrap();
    let inspected = svc.ensure_lookup(LookupList::AuditStatus, "Inspected").await.unwrap();
    let finished = svc.ensure_lookup(LookupList::AuditStatus, "Finished").await.unwrap();

    let audit = Audit {
        client_id,
        lead_auditor_id: Some(lead),
        audit_type_id: Some(audit_type),
        audit_status_id: Some(inspected),
        services: vec![AuditService {
            id: UNSET_ID,
            audit_id: UNSET_ID,
            service_id,
            service: None,
        }],
        ..Audit::default()
    };
    let audit_id = svc.save_audit(&audit).await.unwrap();

    let fetched = svc.fetch_audit(audit_id).await.unwrap();
    assert_eq!(fetched.services.len(), 1);
    assert_eq!(fetched.lead_auditor.as_deref(), Some("Alex Field"));
    assert_eq!(
        svc.audit_title(audit_id).await.unwrap().as_deref(),
        Some("Vineyard Co - Annual (Inspected)")
    );

    let status = svc.status(StatusType::InspectedAudit).await.unwrap();
    assert_eq!(status.name, "1 Inspected Audit");
    assert_eq!(svc.list_audits(&ListCriteria::Open).await.unwrap().len(), 1);

    svc.save_audit(&Audit {
        id: audit_id,
        audit_status_id: Some(finished),
        ..audit
    })
    .await
    .unwrap();
    assert!(svc.list_audits(&ListCriteria::Open).await.unwrap().is_empty());
    assert_eq!(
        svc.list_audits(&ListCriteria::from("Finished"))
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(svc.status(StatusType::InspectedAudit).await.unwrap().count, 0);

    svc.delete_audit(audit_id).await.unwrap();
    assert!(svc.audit_is_deleted(audit_id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Web applications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn application_workflow_and_soft_delete() {
    let (svc, _dir) = test_service().await;
    let client_id = svc.save_client(&Client::new("Dairy Co")).await.unwrap();
    let app_id = svc
        .save_application(&WebApplication {
            client_id: Some(client_id),
            ..WebApplication::default()
        })
        .await
        .unwrap();

    svc.record_workflow(app_id, WORKFLOW_READY_FOR_DECISION, None)
        .await
        .unwrap();
    assert!(svc.workflow_date(app_id, WORKFLOW_READY_FOR_DECISION).await.unwrap().is_some());
    assert_eq!(
        svc.list_applications(&ListCriteria::from(WORKFLOW_READY_FOR_DECISION))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(svc.status(StatusType::ApplicationReadyForDecision).await.unwrap().is_active());

    assert!(svc.delete_application(app_id).await.unwrap());
    assert!(svc.application_is_deleted(app_id).await.unwrap());
    assert!(!svc.status(StatusType::ApplicationReadyForDecision).await.unwrap().is_active());

    assert!(svc.undelete_application(app_id).await.unwrap());
    assert!(!svc.application_is_deleted(app_id).await.unwrap());
}
