//! Name service components for the Push Name Service.
//!
//! Implements the node registry, length-tiered pricing, the expiry-based base
//! registrar, the commit-reveal registrar controller, the public resolver and
//! the reverse registrar, plus deterministic genesis and an atomic executor
//! facade ([`service::NameService`]).

pub mod commitment;
pub mod controller;
pub mod error;
pub mod genesis;
pub mod ownable;
pub mod price;
pub mod registrar;
pub mod registry;
pub mod resolver;
pub mod reverse;
pub mod service;
pub mod transaction;
