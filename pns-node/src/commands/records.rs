use pns_crypto::namehash::label_hash;
use pns_registry::error::RegistryError;
use pns_types::event::Event;
use pns_types::name::validate_label;
use pns_types::primitives::ROOT_NODE;
use serde_json::json;

use crate::cli::CallArgs;
use crate::error::NodeError;
use crate::format::*;

use super::{event_kinds, node_of, print_events, Session};

fn report(session: &Session, name: &str, summary: &str, events: &[Event]) -> Result<(), NodeError> {
    if session.json {
        let out = json!({
            "name": name,
            "result": summary,
            "events": event_kinds(events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_success(summary);
        print_events(events);
    }
    Ok(())
}

pub fn set_addr(session: &Session, name: &str, addr: &str, call: &CallArgs) -> Result<(), NodeError> {
    let node = node_of(name)?;
    let addr = parse_address(addr)?;
    let receipt = session
        .service
        .execute(call.context()?, "set-addr", |c, tx| {
            c.resolver.set_addr(tx, &node, &addr)
        })?;
    report(
        session,
        name,
        &format!("{} now resolves to {}", name, format_address(&addr)),
        &receipt.events,
    )
}

pub fn set_text(
    session: &Session,
    name: &str,
    key: &str,
    value: &str,
    call: &CallArgs,
) -> Result<(), NodeError> {
    let node = node_of(name)?;
    let receipt = session
        .service
        .execute(call.context()?, "set-text", |c, tx| {
            c.resolver.set_text(tx, &node, key, value)
        })?;
    let summary = if value.is_empty() {
        format!("Removed text:{} from {}", key, name)
    } else {
        format!("Set text:{} on {}", key, name)
    };
    report(session, name, &summary, &receipt.events)
}

pub fn set_name(session: &Session, name: &str, value: &str, call: &CallArgs) -> Result<(), NodeError> {
    let node = node_of(name)?;
    let receipt = session
        .service
        .execute(call.context()?, "set-name", |c, tx| {
            c.resolver.set_name(tx, &node, value)
        })?;
    report(
        session,
        name,
        &format!("Set name record of {} to {}", name, value),
        &receipt.events,
    )
}

pub fn set_subnode_owner(
    session: &Session,
    parent: &str,
    label: &str,
    owner: &str,
    call: &CallArgs,
) -> Result<(), NodeError> {
    let parent_node = if parent.is_empty() {
        ROOT_NODE
    } else {
        node_of(parent)?
    };
    validate_label(label).map_err(RegistryError::from)?;
    let owner = parse_address(owner)?;
    let receipt = session
        .service
        .execute(call.context()?, "set-subnode-owner", |c, tx| {
            c.registry
                .set_subnode_owner(tx, &parent_node, &label_hash(label), &owner)
        })?;
    let name = if parent.is_empty() {
        label.to_string()
    } else {
        format!("{}.{}", label, parent)
    };
    report(
        session,
        &name,
        &format!("{} is now owned by {}", name, format_address(&owner)),
        &receipt.events,
    )
}
