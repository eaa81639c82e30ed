use pns_registry::controller::RegistrationRequest;
use pns_types::name::strip_tld;
use pns_types::record::ResolverRecord;
use serde_json::json;

use crate::cli::{CallArgs, RequestArgs};
use crate::error::NodeError;
use crate::format::*;

use super::{event_kinds, parse_resolver, print_events, Session};

/// Build the request a commitment binds. Records keep the order addr, name,
/// then texts as given.
pub fn build_request(
    tld: &str,
    args: &RequestArgs,
    secret: [u8; 32],
) -> Result<RegistrationRequest, NodeError> {
    let mut records = Vec::new();
    if let Some(addr) = &args.addr_record {
        records.push(ResolverRecord::Addr(parse_address(addr)?));
    }
    if let Some(name) = &args.name_record {
        records.push(ResolverRecord::Name(name.clone()));
    }
    for text in &args.texts {
        let (key, value) = text.split_once('=').ok_or_else(|| {
            NodeError::InvalidArgument(format!("text record '{}' is not key=value", text))
        })?;
        records.push(ResolverRecord::Text {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    Ok(RegistrationRequest {
        label: strip_tld(&args.label, tld).to_string(),
        owner: parse_address(&args.owner)?,
        duration: args.duration,
        secret,
        resolver: args.resolver.as_deref().map(parse_resolver).transpose()?,
        records,
    })
}

/// Resolve `--value`, quoting the exact rent when it is omitted.
fn payment(
    session: &Session,
    label: &str,
    duration: u64,
    value: Option<&str>,
) -> Result<u128, NodeError> {
    match value {
        Some(v) => parse_amount(v),
        None => Ok(session.contracts()?.controller.rent_price(label, duration)?),
    }
}

pub fn make_commitment(
    session: &Session,
    args: &RequestArgs,
    secret: Option<&str>,
) -> Result<(), NodeError> {
    let (secret, generated) = match secret {
        Some(s) => (parse_hash(s)?, false),
        None => (rand::random::<[u8; 32]>(), true),
    };
    let request = build_request(session.tld(), args, secret)?;
    let commitment = request.commitment()?;

    if session.json {
        let out = json!({
            "label": request.label,
            "commitment": format_hash(&commitment),
            "secret": format_hash(&secret),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        print_info("Commitment", &format_hash(&commitment));
        print_info("Secret", &format_hash(&secret));
        if generated {
            print_warn("Keep this secret: the reveal must present it unchanged.");
        }
        println!();
    }
    Ok(())
}

pub fn commit(session: &Session, commitment: &str, call: &CallArgs) -> Result<(), NodeError> {
    let commitment = parse_hash(commitment)?;
    let receipt = session
        .service
        .execute(call.context()?, "commit", |c, tx| {
            c.controller.commit(tx, &commitment)?;
            Ok((
                tx.now().saturating_add(c.controller.min_commitment_age),
                tx.now().saturating_add(c.controller.max_commitment_age),
            ))
        })?;
    let (opens, closes) = receipt.value;

    if session.json {
        let out = json!({
            "commitment": format_hash(&commitment),
            "reveal_after": opens,
            "reveal_before": closes,
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        print_success(&format!("Committed {}", format_hash(&commitment)));
        print_info(
            "Reveal window",
            &format!("{} to {}", format_timestamp(opens), format_timestamp(closes)),
        );
        print_events(&receipt.events);
        println!();
    }
    Ok(())
}

pub fn register(
    session: &Session,
    args: &RequestArgs,
    secret: &str,
    value: Option<&str>,
    call: &CallArgs,
) -> Result<(), NodeError> {
    let request = build_request(session.tld(), args, parse_hash(secret)?)?;
    let paid = payment(session, &request.label, request.duration, value)?;
    let receipt = session
        .service
        .execute(call.context()?, "register", |c, tx| {
            c.controller.register(tx, &request, paid)
        })?;
    let r = &receipt.value;

    if session.json {
        let out = json!({
            "name": r.name,
            "node": format_hash(&r.node),
            "label_hash": format_hash(&r.label_hash),
            "owner": format_address(&request.owner),
            "expires": r.expires,
            "cost": format_amount(r.cost),
            "refund": format_amount(r.refund),
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        print_success(&format!(
            "Registered {} to {}",
            style_bold().apply_to(&r.name),
            format_address(&request.owner)
        ));
        print_info("Expires", &format_timestamp(r.expires));
        print_info("Cost", &format_amount(r.cost));
        if r.refund > 0 {
            print_info("Refund", &format_amount(r.refund));
        }
        print_events(&receipt.events);
        println!();
    }
    Ok(())
}

pub fn renew(
    session: &Session,
    label: &str,
    duration: u64,
    value: Option<&str>,
    call: &CallArgs,
) -> Result<(), NodeError> {
    let label = strip_tld(label, session.tld()).to_string();
    let paid = payment(session, &label, duration, value)?;
    let receipt = session
        .service
        .execute(call.context()?, "renew", |c, tx| {
            c.controller.renew(tx, &label, duration, paid)
        })?;
    let r = &receipt.value;

    if session.json {
        let out = json!({
            "name": r.name,
            "expires": r.expires,
            "cost": format_amount(r.cost),
            "refund": format_amount(r.refund),
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        print_success(&format!(
            "Renewed {} until {}",
            style_bold().apply_to(&r.name),
            format_timestamp(r.expires)
        ));
        print_info("Cost", &format_amount(r.cost));
        print_events(&receipt.events);
        println!();
    }
    Ok(())
}
