use serde_json::json;

use crate::cli::CallArgs;
use crate::error::NodeError;
use crate::format::*;

use super::{event_kinds, node_of, parse_resolver, print_events, Session};

/// Claim a reverse node. With no `--resolver` the default resolver is used;
/// `--resolver keep` leaves the current one in place.
pub fn claim(
    session: &Session,
    addr: Option<&str>,
    resolver: Option<&str>,
    call: &CallArgs,
) -> Result<(), NodeError> {
    let ctx = call.context()?;
    let addr = match addr {
        Some(a) => parse_address(a)?,
        None => ctx.sender,
    };
    let resolver = match resolver {
        None => None,
        Some(r) if r.eq_ignore_ascii_case("keep") => Some(None),
        Some(r) => Some(Some(parse_resolver(r)?)),
    };
    let receipt = session.service.execute(ctx, "claim", |c, tx| match resolver {
        None => c.reverse.claim(tx, &addr),
        Some(r) => c.reverse.claim_with_resolver(tx, &addr, r),
    })?;
    let node = receipt.value;

    if session.json {
        let out = json!({
            "addr": format_address(&addr),
            "node": format_hash(&node),
            "owner": format_address(&ctx.sender),
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_success(&format!(
            "Claimed the reverse record of {}",
            format_address(&addr)
        ));
        print_info("Node", &format_hash(&node));
        print_events(&receipt.events);
    }
    Ok(())
}

pub fn set_reverse_name(session: &Session, name: &str, call: &CallArgs) -> Result<(), NodeError> {
    // Reject malformed names before touching state.
    node_of(name)?;
    let ctx = call.context()?;
    let receipt = session
        .service
        .execute(ctx, "set-reverse-name", |c, tx| c.reverse.set_name(tx, name))?;

    if session.json {
        let out = json!({
            "addr": format_address(&ctx.sender),
            "name": name,
            "node": format_hash(&receipt.value),
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_success(&format!(
            "Primary name of {} is now {}",
            format_address(&ctx.sender),
            style_bold().apply_to(name)
        ));
        print_events(&receipt.events);
    }
    Ok(())
}
