use pns_crypto::namehash::label_hash;
use pns_types::name::{label_length, split_name, strip_tld};
use pns_types::primitives::ZERO_ADDRESS;
use serde_json::json;

use crate::cli::AtArgs;
use crate::error::NodeError;
use crate::format::*;
use crate::ui::{info_table, print_table};

use super::{node_of, Session};

pub fn available(session: &Session, label: &str, at: &AtArgs) -> Result<(), NodeError> {
    let tld = session.tld().to_string();
    let label = strip_tld(label, &tld);
    let (valid, available) = session.service.query(at.context(), |c, tx| {
        Ok((c.controller.valid(label), c.controller.available(tx, label)?))
    })?;

    if session.json {
        let out = json!({
            "name": format!("{}.{}", label, tld),
            "valid": valid,
            "available": available,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if !valid {
        print_warn(&format!("'{}' is not a valid label", label));
    } else if available {
        print_success(&format!(
            "{} is available",
            style_bold().apply_to(format!("{}.{}", label, tld))
        ));
    } else {
        print_warn(&format!("{}.{} is taken", label, tld));
    }
    Ok(())
}

pub fn price(session: &Session, label: &str, duration: u64) -> Result<(), NodeError> {
    let label = strip_tld(label, session.tld());
    let controller = &session.contracts()?.controller;
    let daily = controller.prices.price(label_length(label));
    let rent = controller.rent_price(label, duration)?;

    if session.json {
        let out = json!({
            "label": label,
            "duration": duration,
            "daily": format_amount(daily),
            "rent": format_amount(rent),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        print_info("Label", label);
        print_info("Per day", &format_amount(daily));
        print_info(
            &format!("Rent for {}", format_duration(duration)),
            &format_amount(rent),
        );
        println!();
    }
    Ok(())
}

pub fn owner(session: &Session, name: &str, at: &AtArgs) -> Result<(), NodeError> {
    let node = node_of(name)?;
    let tld = session.tld().to_string();
    let labels = split_name(name.trim_end_matches('.'));
    // Only direct children of the TLD carry a registration.
    let leaf = match labels.as_slice() {
        [leaf, parent] if *parent == tld => Some(*leaf),
        _ => None,
    };

    let ctx = at.context();
    let now = ctx.timestamp;
    let (record, registration) = session.service.query(ctx, |c, tx| {
        let record = c.registry.record(tx, &node)?;
        let registration = match leaf {
            Some(label) => c.registrar.registration(tx, &label_hash(label))?,
            None => None,
        };
        Ok((record, registration))
    })?;

    if session.json {
        let out = json!({
            "name": name,
            "node": format_hash(&node),
            "owner": (record.owner != ZERO_ADDRESS).then(|| format_address(&record.owner)),
            "resolver": record.resolver.as_ref().map(format_address),
            "ttl": record.ttl,
            "registration": registration.as_ref().map(|r| json!({
                "owner": format_address(&r.owner),
                "expires": r.expires,
                "expired": r.is_expired(now),
            })),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", style_bold().apply_to(name));
    let mut table = info_table();
    table.add_row(vec!["Node".to_string(), format_hash(&node)]);
    table.add_row(vec![
        "Owner".to_string(),
        if record.owner == ZERO_ADDRESS {
            "(none)".to_string()
        } else {
            format_address(&record.owner)
        },
    ]);
    table.add_row(vec![
        "Resolver".to_string(),
        record
            .resolver
            .as_ref()
            .map(format_address)
            .unwrap_or_else(|| "(none)".to_string()),
    ]);
    if let Some(reg) = &registration {
        table.add_row(vec!["Registrant".to_string(), format_address(&reg.owner)]);
        let status = if reg.is_expired(now) { "expired" } else { "active" };
        table.add_row(vec![
            "Expires".to_string(),
            format!("{} ({})", format_timestamp(reg.expires), status),
        ]);
    }
    print_table(&table);
    println!();
    Ok(())
}

pub fn resolve(session: &Session, name: &str, at: &AtArgs) -> Result<(), NodeError> {
    let node = node_of(name)?;
    let (resolver, records) = session.service.query(at.context(), |c, tx| {
        let resolver = c.registry.resolver(tx, &node)?;
        // Only the public resolver's records live in this store.
        let records = match resolver {
            Some(r) if r == c.resolver.address => Some(c.resolver.records(tx, &node)?),
            _ => None,
        };
        Ok((resolver, records))
    })?;

    if session.json {
        let out = json!({
            "name": name,
            "node": format_hash(&node),
            "resolver": resolver.as_ref().map(format_address),
            "addr": records.as_ref().and_then(|r| r.addr.as_ref()).map(format_address),
            "name_record": records.as_ref().and_then(|r| r.name.clone()),
            "texts": records.as_ref().map(|r| r.texts.clone()).unwrap_or_default(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", style_bold().apply_to(name));
    match (&resolver, &records) {
        (None, _) => print_warn("no resolver set"),
        (Some(r), None) => print_warn(&format!(
            "resolver {} is not the public resolver",
            format_address(r)
        )),
        (Some(_), Some(records)) if records.is_empty() => {
            println!("  {}", style_dim().apply_to("No records."))
        }
        (Some(_), Some(records)) => {
            let mut table = info_table();
            if let Some(addr) = &records.addr {
                table.add_row(vec!["addr".to_string(), format_address(addr)]);
            }
            if let Some(n) = &records.name {
                table.add_row(vec!["name".to_string(), n.clone()]);
            }
            for (key, value) in &records.texts {
                table.add_row(vec![format!("text:{}", key), value.clone()]);
            }
            print_table(&table);
        }
    }
    println!();
    Ok(())
}

pub fn reverse(session: &Session, addr: &str, at: &AtArgs) -> Result<(), NodeError> {
    let addr = parse_address(addr)?;
    let (node, name, verified) = session.service.query(at.context(), |c, tx| {
        let node = c.reverse.node(&addr);
        let name = match c.registry.resolver(tx, &node)? {
            Some(r) if r == c.resolver.address => c.resolver.name(tx, &node)?,
            _ => None,
        };
        // A primary name is verified when it resolves forward to the address.
        let verified = match &name {
            Some(n) => match node_of(n) {
                Ok(forward) => c.resolver.addr(tx, &forward)? == Some(addr),
                Err(_) => false,
            },
            None => false,
        };
        Ok((node, name, verified))
    })?;

    if session.json {
        let out = json!({
            "addr": format_address(&addr),
            "node": format_hash(&node),
            "name": name,
            "verified": verified,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match name {
        Some(n) => {
            print_info(&format_address(&addr), &n);
            if !verified {
                print_warn("the name does not resolve back to this address");
            }
        }
        None => println!(
            "  {}",
            style_dim().apply_to(format!("{} has no primary name", format_address(&addr)))
        ),
    }
    Ok(())
}
