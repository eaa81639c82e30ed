//! Shared types for the Push Name Service: identities, namespace records,
//! resolver records, events and protocol parameters.

pub mod constants;
pub mod error;
pub mod event;
pub mod name;
pub mod params;
pub mod primitives;
pub mod record;
