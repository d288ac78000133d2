//! Lookup-table names that carry business meaning.
//!
//! Workflow, audit status and service status names are rows in lookup
//! tables; queries compare against these exact strings.

// Application workflow
pub const WORKFLOW_READY_FOR_INITIAL_REVIEW: &str = "Ready for Initial Review";
pub const WORKFLOW_DOC_REVIEW_UNDERWAY: &str = "Doc Review Underway";
pub const WORKFLOW_READY_FOR_DECISION: &str = "Ready for Decision";
pub const WORKFLOW_APPLICATION_FINISHED: &str = "Application Finished";
pub const WORKFLOW_APPLICATION_CANCELLED: &str = "Application Cancelled";

// Audit status
pub const AUDIT_STATUS_CREATED: &str = "Created";
pub const AUDIT_STATUS_ALLOCATED: &str = "Allocated";
pub const AUDIT_STATUS_REJECTED: &str = "Rejected";
pub const AUDIT_STATUS_INSPECTED: &str = "Inspected";
pub const AUDIT_STATUS_FINISHED: &str = "Finished";
pub const AUDIT_STATUS_CANCELLED: &str = "Cancelled";

// Audit type
pub const AUDIT_TYPE_ANNUAL: &str = "Annual";
pub const AUDIT_TYPE_INITIAL: &str = "Initial";

// Service status
pub const SERVICE_STATUS_ACTIVE: &str = "Active";
pub const SERVICE_STATUS_INTENT_TO_SUSPEND: &str = "Intent to Suspend";

// Address modifiers and uses
pub const ADDRESS_MODIFIER_PRIVATE: &str = "Private Address";
/// Uses every operation address starts with.
pub const OPERATION_ADDRESS_USES: [&str; 3] = ["Records", "Labelling", "Packaging"];

/// Company name reserved for the test client; excluded from dashboards.
pub const TEST_CLIENT_COMPANY: &str = "Test Client";

/// CAR severity counted against a web application during document review.
pub const CAR_SEVERITY_MAJOR: &str = "Major (30 Day)";
pub const CAR_SOURCE_DOCUMENT_REVIEW: &str = "Document Review";
