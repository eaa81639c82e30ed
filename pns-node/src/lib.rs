//! Command-line executor for the Push Name Service.
//!
//! Each invocation opens the configured store, applies one operation through
//! [`NameService`](pns_registry::service::NameService) and exits.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod store;
pub mod ui;
