//! Entity structs for every Certify table.
//!
//! Each struct maps to one table in the libSQL schema. Wire names are
//! camelCase so the desktop client's field names carry over unchanged.

mod audit;
mod client;
mod client_address;
mod client_audit_cycle;
mod client_category;
mod client_contact;
mod client_service;
mod service;
mod user;
mod web_application;

pub use audit::{Audit, AuditAddress, AuditService};
pub use client::{Client, ClientListItem, clean_client_name};
pub use client_address::{ClientAddress, ClientAddressSample, ClientAddressUse};
pub use client_audit_cycle::{ClientAuditCycle, DEFAULT_AUDIT_CYCLE_FREQUENCY};
pub use client_category::ClientCategory;
pub use client_contact::{ClientContact, ClientContactListItem};
pub use client_service::{ClientService, ClientServiceHistory, active_during_period};
pub use service::{Service, ServiceStat};
pub use user::{DEFAULT_PASSWORD_HASH, DEFAULT_PASSWORD_SALT, User};
pub use web_application::{WebApplication, WebApplicationResponse};
