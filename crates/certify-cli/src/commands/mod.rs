pub mod admin;
pub mod config;
pub mod dispatch;
pub mod log;
pub mod serve;
pub mod status;
pub mod user;
