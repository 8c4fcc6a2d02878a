//! HTTP request handlers for the Manager API.
//!
//! This module is organized by domain:
//! - `common` - Response envelope and shared query structs
//! - `maintenance` - Administrative commands: end, status, schedule
//! - `sessions` - Bridge for the proxy host: sessions, directives, server list

pub mod common;
pub mod maintenance;
pub mod sessions;

pub use maintenance::*;
pub use sessions::*;
