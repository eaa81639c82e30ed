use serde_json::json;

use crate::cli::{CallArgs, Component};
use crate::error::NodeError;
use crate::format::*;

use super::{event_kinds, parse_resolver, print_events, Session};

pub fn add_controller(session: &Session, controller: &str, call: &CallArgs) -> Result<(), NodeError> {
    let controller = parse_address(controller)?;
    let receipt = session
        .service
        .execute(call.context()?, "add-controller", |c, tx| {
            c.registrar.add_controller(tx, &controller)
        })?;
    if session.json {
        let out = json!({
            "controller": format_address(&controller),
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_success(&format!("Added controller {}", format_address(&controller)));
        print_events(&receipt.events);
    }
    Ok(())
}

pub fn remove_controller(
    session: &Session,
    controller: &str,
    call: &CallArgs,
) -> Result<(), NodeError> {
    let controller = parse_address(controller)?;
    let receipt = session
        .service
        .execute(call.context()?, "remove-controller", |c, tx| {
            c.registrar.remove_controller(tx, &controller)
        })?;
    if session.json {
        let out = json!({
            "controller": format_address(&controller),
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_success(&format!(
            "Removed controller {}",
            format_address(&controller)
        ));
        print_events(&receipt.events);
    }
    Ok(())
}

pub fn set_default_resolver(
    session: &Session,
    resolver: &str,
    call: &CallArgs,
) -> Result<(), NodeError> {
    let resolver = parse_resolver(resolver)?;
    let receipt = session
        .service
        .execute(call.context()?, "set-default-resolver", |c, tx| {
            c.reverse.set_default_resolver(tx, &resolver)
        })?;
    if session.json {
        let out = json!({
            "resolver": format_address(&resolver),
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_success(&format!(
            "Default reverse resolver is now {}",
            format_address(&resolver)
        ));
        print_events(&receipt.events);
    }
    Ok(())
}

pub fn withdraw(session: &Session, call: &CallArgs) -> Result<(), NodeError> {
    let ctx = call.context()?;
    let receipt = session
        .service
        .execute(ctx, "withdraw", |c, tx| c.controller.withdraw(tx))?;
    let amount = receipt.value;
    if session.json {
        let out = json!({
            "to": format_address(&ctx.sender),
            "amount": format_amount(amount),
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if amount == 0 {
        print_warn("Nothing to withdraw.");
    } else {
        print_success(&format!(
            "Withdrew {} to {}",
            format_amount(amount),
            format_address(&ctx.sender)
        ));
        print_events(&receipt.events);
    }
    Ok(())
}

pub fn transfer_authority(
    session: &Session,
    component: Component,
    new_authority: &str,
    call: &CallArgs,
) -> Result<(), NodeError> {
    let new_authority = parse_address(new_authority)?;
    let receipt = session
        .service
        .execute(call.context()?, "transfer-authority", |c, tx| {
            let ownable = match component {
                Component::Registrar => c.registrar.ownable(),
                Component::Controller => c.controller.ownable(),
                Component::Reverse => c.reverse.ownable(),
            };
            ownable.transfer_ownership(tx, &new_authority)
        })?;
    let name = match component {
        Component::Registrar => "base registrar",
        Component::Controller => "registrar controller",
        Component::Reverse => "reverse registrar",
    };
    if session.json {
        let out = json!({
            "component": name,
            "authority": format_address(&new_authority),
            "events": event_kinds(&receipt.events),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_success(&format!(
            "Authority of the {} is now {}",
            name,
            format_address(&new_authority)
        ));
        print_events(&receipt.events);
    }
    Ok(())
}
