//! # certify-core
//!
//! Core types and domain rules shared by every Certify crate.
//!
//! - Entity structs for clients, addresses, services, audits, web
//!   applications and users
//! - Dashboard status types and their display naming
//! - Role and list-criteria enums
//! - Application option-string parsing
//! - Network share path rewriting
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod names;
pub mod options;
pub mod paths;
pub mod status;
