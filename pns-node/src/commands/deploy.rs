use pns_storage::name_store::NameStore;
use serde_json::json;

use crate::cli::{AtArgs, CallArgs};
use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::format::*;
use crate::ui::{cell_right, data_table, info_table, print_table};

use super::{event_kinds, print_events, Session};

pub fn init(dir: &str, json: bool) -> Result<(), NodeError> {
    let path = NodeConfig::init(dir)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "config": path }))?);
    } else {
        print_success(&format!("Wrote {}", style_info().apply_to(&path)));
    }
    Ok(())
}

pub fn deploy(session: &mut Session, call: &CallArgs) -> Result<(), NodeError> {
    let params = session.protocol.to_params()?;
    let receipt = session.service.deploy(call.context()?, params)?;
    let d = &receipt.value;

    if session.json {
        let out = json!({
            "deployer": format_address(&d.deployer),
            "registry": format_address(&d.registry),
            "registrar": format_address(&d.registrar),
            "controller": format_address(&d.controller),
            "resolver": format_address(&d.resolver),
            "reverse_registrar": format_address(&d.reverse_registrar),
            "base_node": format_hash(&d.base_node),
            "reverse_node": format_hash(&d.reverse_node),
            "tld": d.params.tld,
            "deployed_at": d.deployed_at,
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        print_success(&format!(
            "Deployed .{} at {}",
            style_bold().apply_to(&d.params.tld),
            format_timestamp(d.deployed_at)
        ));
        println!();
        let mut table = info_table();
        for (label, addr) in [
            ("Registry", &d.registry),
            ("Base registrar", &d.registrar),
            ("Controller", &d.controller),
            ("Public resolver", &d.resolver),
            ("Reverse registrar", &d.reverse_registrar),
        ] {
            table.add_row(vec![label.to_string(), format_address(addr)]);
        }
        print_table(&table);
        println!();
        print_events(&receipt.events);
    }
    Ok(())
}

pub fn info(session: &Session, at: &AtArgs) -> Result<(), NodeError> {
    let d = session.service.deployment()?;
    let ctx = at.context();
    let now = ctx.timestamp;
    let store = NameStore::new(session.service.store());
    let controllers = store.list_controllers()?;
    let registrations = store.list_registrations()?;
    let commitments = store.list_commitments()?;
    let balance = session
        .service
        .query(ctx, |c, tx| c.controller.balance(tx))?;
    let params = &d.params;

    if session.json {
        let out = json!({
            "tld": params.tld,
            "deployer": format_address(&d.deployer),
            "deployed_at": d.deployed_at,
            "controller": format_address(&d.controller),
            "resolver": format_address(&d.resolver),
            "reverse_registrar": format_address(&d.reverse_registrar),
            "min_commitment_age": params.min_commitment_age,
            "max_commitment_age": params.max_commitment_age,
            "min_registration_duration": params.min_registration_duration,
            "grace_period": params.grace_period,
            "price_tiers": params.price_tiers.iter().map(|p| format_amount(*p)).collect::<Vec<_>>(),
            "controllers": controllers.iter().map(format_address).collect::<Vec<_>>(),
            "registrations": registrations.iter().map(|(label, reg)| json!({
                "label_hash": format_hash(label),
                "owner": format_address(&reg.owner),
                "expires": reg.expires,
                "expired": reg.is_expired(now),
            })).collect::<Vec<_>>(),
            "pending_commitments": commitments.len(),
            "balance": format_amount(balance),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} .{}",
        style_bold().apply_to("Push Name Service"),
        style_info().apply_to(&params.tld)
    );
    println!();
    let mut table = info_table();
    table.add_row(vec!["Deployer".to_string(), format_address(&d.deployer)]);
    table.add_row(vec!["Deployed".to_string(), format_timestamp(d.deployed_at)]);
    table.add_row(vec![
        "Reveal window".to_string(),
        format!(
            "{} to {}",
            format_duration(params.min_commitment_age),
            format_duration(params.max_commitment_age)
        ),
    ]);
    table.add_row(vec![
        "Min duration".to_string(),
        format_duration(params.min_registration_duration),
    ]);
    table.add_row(vec![
        "Grace period".to_string(),
        format_duration(params.grace_period),
    ]);
    table.add_row(vec![
        "Daily prices".to_string(),
        params
            .price_tiers
            .iter()
            .map(|p| format_amount(*p))
            .collect::<Vec<_>>()
            .join(" / "),
    ]);
    table.add_row(vec!["Collected".to_string(), format_amount(balance)]);
    table.add_row(vec![
        "Pending commits".to_string(),
        commitments.len().to_string(),
    ]);
    print_table(&table);
    println!();

    print_divider();
    print_info("Controllers", &controllers.len().to_string());
    for controller in &controllers {
        println!("    {}", format_address(controller));
    }
    println!();

    if registrations.is_empty() {
        println!("  {}", style_dim().apply_to("No names registered yet."));
    } else {
        let mut table = data_table(&["Label hash", "Owner", "Expires", "Status"]);
        for (label, reg) in &registrations {
            let status = if reg.is_expired(now) {
                style_warn().apply_to("expired").to_string()
            } else {
                style_success().apply_to("active").to_string()
            };
            table.add_row(vec![
                comfy_table::Cell::new(format_hash(label)),
                comfy_table::Cell::new(format_address(&reg.owner)),
                cell_right(format_timestamp(reg.expires)),
                comfy_table::Cell::new(status),
            ]);
        }
        print_table(&table);
    }
    println!();
    Ok(())
}
