//! Repository modules implementing CRUD operations for all Certify entities.
//!
//! Each module adds methods to `CertifyService` via `impl CertifyService` blocks.

pub mod admin;
pub mod application_response;
pub mod audit;
pub mod audit_address;
pub mod audit_service;
pub mod client;
pub mod client_address;
pub mod client_audit_cycle;
pub mod client_category;
pub mod client_contact;
pub mod client_service;
pub mod lookup;
pub mod service;
pub mod user;
pub mod web_application;
