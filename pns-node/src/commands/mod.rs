//! One module per group of `pns` subcommands.

pub mod admin;
pub mod deploy;
pub mod query;
pub mod records;
pub mod register;
pub mod reverse;

use pns_crypto::address::contract_address;
use pns_crypto::namehash::namehash;
use pns_registry::genesis::{Contracts, PUBLIC_RESOLVER_NAME};
use pns_registry::service::NameService;
use pns_storage::traits::DynStore;
use pns_types::event::Event;
use pns_types::name::validate_name;
use pns_types::primitives::{Address, Node, Timestamp};

use crate::config::{NodeConfig, ProtocolConfig};
use crate::error::NodeError;
use crate::format::{parse_address, style_dim};
use crate::store::create_store;

/// An opened store plus the output mode of the current invocation.
pub struct Session {
    pub service: NameService<DynStore>,
    pub protocol: ProtocolConfig,
    pub json: bool,
}

impl Session {
    pub fn open(config: &NodeConfig, json: bool) -> Result<Self, NodeError> {
        let store = create_store(&config.storage)?;
        Ok(Self {
            service: NameService::open(store)?,
            protocol: config.protocol.clone(),
            json,
        })
    }

    pub fn contracts(&self) -> Result<&Contracts, NodeError> {
        Ok(self.service.contracts()?)
    }

    /// TLD of the deployment, or of the configuration before deployment.
    pub fn tld(&self) -> &str {
        match self.service.deployment() {
            Ok(deployment) => &deployment.params.tld,
            Err(_) => &self.protocol.tld,
        }
    }
}

/// Wall-clock time in unix seconds.
pub fn now() -> Timestamp {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Parse a resolver argument; "public" names the public resolver.
pub fn parse_resolver(s: &str) -> Result<Address, NodeError> {
    if s.eq_ignore_ascii_case("public") {
        Ok(contract_address(PUBLIC_RESOLVER_NAME))
    } else {
        parse_address(s)
    }
}

/// Validate a dotted name and return its node.
pub fn node_of(name: &str) -> Result<Node, NodeError> {
    let name = name.trim_end_matches('.');
    validate_name(name).map_err(pns_registry::error::RegistryError::from)?;
    Ok(namehash(name))
}

pub fn event_kinds(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::kind).collect()
}

/// Print the kinds of events an operation emitted.
pub fn print_events(events: &[Event]) {
    if events.is_empty() {
        return;
    }
    println!(
        "  {} {}",
        style_dim().apply_to("events:"),
        style_dim().apply_to(event_kinds(events).join(", "))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolver_keyword() {
        assert_eq!(
            parse_resolver("public").unwrap(),
            contract_address(PUBLIC_RESOLVER_NAME)
        );
        let addr = [9u8; 20];
        assert_eq!(parse_resolver(&hex::encode(addr)).unwrap(), addr);
        assert!(parse_resolver("private").is_err());
    }

    #[test]
    fn test_node_of() {
        assert_eq!(node_of("tess.push").unwrap(), namehash("tess.push"));
        assert_eq!(node_of("tess.push.").unwrap(), namehash("tess.push"));
        assert!(node_of("").is_err());
        assert!(node_of("bad..push").is_err());
    }
}
