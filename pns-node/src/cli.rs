use clap::{Args, Parser, Subcommand, ValueEnum};

use pns_registry::transaction::CallContext;
use pns_types::constants::SECONDS_PER_YEAR;
use pns_types::primitives::{Timestamp, ZERO_ADDRESS};

use crate::commands::{self, Session};
use crate::config::{NodeConfig, CONFIG_FILE};
use crate::error::NodeError;
use crate::format::parse_address;

#[derive(Parser)]
#[command(
    name = "pns",
    about = "Push Name Service: commit-reveal name registration with resolvers and reverse records",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    pub config: String,
    /// Override data directory path
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
    /// Override storage backend: "sqlite", "rocksdb", "memory"
    #[arg(long, global = true)]
    pub storage: Option<String>,
    /// Print machine-readable JSON instead of styled output
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Identity and time of a state-changing call.
#[derive(Args, Debug, Clone)]
pub struct CallArgs {
    /// Caller address (hex)
    #[arg(long)]
    pub from: String,
    /// Unix timestamp of the call (defaults to now)
    #[arg(long)]
    pub at: Option<Timestamp>,
}

impl CallArgs {
    pub fn context(&self) -> Result<CallContext, NodeError> {
        Ok(CallContext::new(
            parse_address(&self.from)?,
            self.at.unwrap_or_else(commands::now),
        ))
    }
}

/// Point in time a query is evaluated at.
#[derive(Args, Debug, Clone)]
pub struct AtArgs {
    /// Unix timestamp to evaluate at (defaults to now)
    #[arg(long)]
    pub at: Option<Timestamp>,
}

impl AtArgs {
    pub fn context(&self) -> CallContext {
        CallContext::new(ZERO_ADDRESS, self.at.unwrap_or_else(commands::now))
    }
}

/// Everything a commitment binds, shared by `make-commitment` and `register`.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Label to register (a trailing ".<tld>" is ignored)
    pub label: String,
    /// Owner of the new name (hex)
    #[arg(long)]
    pub owner: String,
    /// Registration length in seconds
    #[arg(long, default_value_t = SECONDS_PER_YEAR)]
    pub duration: u64,
    /// Resolver address, or "public" for the public resolver
    #[arg(long)]
    pub resolver: Option<String>,
    /// Initial address record (hex)
    #[arg(long = "addr-record")]
    pub addr_record: Option<String>,
    /// Initial name record
    #[arg(long = "name-record")]
    pub name_record: Option<String>,
    /// Initial text record as key=value (can be specified multiple times)
    #[arg(long = "text")]
    pub texts: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a default pns.toml
    Init {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: String,
    },
    /// Deploy the name service with the caller as root owner
    Deploy {
        #[command(flatten)]
        call: CallArgs,
    },
    /// Show the deployment, controllers and registrations
    Info {
        #[command(flatten)]
        at: AtArgs,
    },
    /// Compute the commitment for a registration request
    MakeCommitment {
        #[command(flatten)]
        request: RequestArgs,
        /// 32-byte secret (hex); a random one is generated if omitted
        #[arg(long)]
        secret: Option<String>,
    },
    /// Record a commitment
    Commit {
        /// Commitment hash (hex)
        commitment: String,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Reveal a commitment and register the name
    Register {
        #[command(flatten)]
        request: RequestArgs,
        /// The secret used in the commitment (hex)
        #[arg(long)]
        secret: String,
        /// Payment in tokens (defaults to the exact rent)
        #[arg(long)]
        value: Option<String>,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Extend a registration
    Renew {
        /// Label to renew
        label: String,
        /// Extension in seconds
        #[arg(long, default_value_t = SECONDS_PER_YEAR)]
        duration: u64,
        /// Payment in tokens (defaults to the exact rent)
        #[arg(long)]
        value: Option<String>,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Check whether a label can be registered
    Available {
        /// Label to check
        label: String,
        #[command(flatten)]
        at: AtArgs,
    },
    /// Quote the rent for a label
    Price {
        /// Label to price
        label: String,
        /// Registration length in seconds
        #[arg(long, default_value_t = SECONDS_PER_YEAR)]
        duration: u64,
    },
    /// Show the owner and registration of a name
    Owner {
        /// Full name, e.g. tess.push
        name: String,
        #[command(flatten)]
        at: AtArgs,
    },
    /// Show the resolver records of a name
    Resolve {
        /// Full name, e.g. tess.push
        name: String,
        #[command(flatten)]
        at: AtArgs,
    },
    /// Set the address record of a name
    SetAddr {
        /// Full name
        name: String,
        /// Address the name resolves to (hex)
        addr: String,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Set a text record of a name; an empty value removes it
    SetText {
        /// Full name
        name: String,
        key: String,
        value: String,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Set the name record of a node
    SetName {
        /// Full name of the node
        name: String,
        /// Value of the name record
        value: String,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Assign a subnode of a name to a new owner
    SetSubnodeOwner {
        /// Parent name ("" for the root)
        parent: String,
        /// Label of the subnode
        label: String,
        /// New owner (hex)
        #[arg(long)]
        owner: String,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Claim the reverse node of an address
    Claim {
        /// Address whose reverse node to claim (defaults to --from)
        #[arg(long)]
        addr: Option<String>,
        /// Resolver for the reverse node, or "keep" to leave it unchanged
        #[arg(long)]
        resolver: Option<String>,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Look up the primary name of an address
    Reverse {
        /// Address (hex)
        addr: String,
        #[command(flatten)]
        at: AtArgs,
    },
    /// Set the caller's primary name
    SetReverseName {
        /// Full name, e.g. tess.push
        name: String,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Allow an address to register names
    AddController {
        /// Controller address (hex)
        controller: String,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Revoke a controller
    RemoveController {
        /// Controller address (hex)
        controller: String,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Set the resolver used for new reverse records
    SetDefaultResolver {
        /// Resolver address (hex), or "public"
        resolver: String,
        #[command(flatten)]
        call: CallArgs,
    },
    /// Pay out collected registration fees to the controller authority
    Withdraw {
        #[command(flatten)]
        call: CallArgs,
    },
    /// Hand a component's authority to another account
    TransferAuthority {
        /// Component whose authority changes hands
        #[arg(value_enum)]
        component: Component,
        /// New authority address (hex)
        new_authority: String,
        #[command(flatten)]
        call: CallArgs,
    },
}

/// Components with an administrative authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Component {
    /// Base registrar: controllers and the base node resolver
    Registrar,
    /// Registrar controller: fee withdrawal
    Controller,
    /// Reverse registrar: default resolver
    Reverse,
}

/// Execute a parsed command line against `config`.
pub fn run(cli: Cli, mut config: NodeConfig) -> Result<(), NodeError> {
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    if let Some(db) = cli.storage {
        config.storage.db_type = db;
    }
    let json = cli.json;

    if let Command::Init { dir } = &cli.command {
        return commands::deploy::init(dir, json);
    }
    let mut session = Session::open(&config, json)?;

    match cli.command {
        Command::Init { .. } => Ok(()),
        Command::Deploy { call } => commands::deploy::deploy(&mut session, &call),
        Command::Info { at } => commands::deploy::info(&session, &at),
        Command::MakeCommitment { request, secret } => {
            commands::register::make_commitment(&session, &request, secret.as_deref())
        }
        Command::Commit { commitment, call } => {
            commands::register::commit(&session, &commitment, &call)
        }
        Command::Register {
            request,
            secret,
            value,
            call,
        } => commands::register::register(&session, &request, &secret, value.as_deref(), &call),
        Command::Renew {
            label,
            duration,
            value,
            call,
        } => commands::register::renew(&session, &label, duration, value.as_deref(), &call),
        Command::Available { label, at } => commands::query::available(&session, &label, &at),
        Command::Price { label, duration } => commands::query::price(&session, &label, duration),
        Command::Owner { name, at } => commands::query::owner(&session, &name, &at),
        Command::Resolve { name, at } => commands::query::resolve(&session, &name, &at),
        Command::Reverse { addr, at } => commands::query::reverse(&session, &addr, &at),
        Command::SetAddr { name, addr, call } => {
            commands::records::set_addr(&session, &name, &addr, &call)
        }
        Command::SetText {
            name,
            key,
            value,
            call,
        } => commands::records::set_text(&session, &name, &key, &value, &call),
        Command::SetName { name, value, call } => {
            commands::records::set_name(&session, &name, &value, &call)
        }
        Command::SetSubnodeOwner {
            parent,
            label,
            owner,
            call,
        } => commands::records::set_subnode_owner(&session, &parent, &label, &owner, &call),
        Command::Claim {
            addr,
            resolver,
            call,
        } => commands::reverse::claim(&session, addr.as_deref(), resolver.as_deref(), &call),
        Command::SetReverseName { name, call } => {
            commands::reverse::set_reverse_name(&session, &name, &call)
        }
        Command::AddController { controller, call } => {
            commands::admin::add_controller(&session, &controller, &call)
        }
        Command::RemoveController { controller, call } => {
            commands::admin::remove_controller(&session, &controller, &call)
        }
        Command::SetDefaultResolver { resolver, call } => {
            commands::admin::set_default_resolver(&session, &resolver, &call)
        }
        Command::Withdraw { call } => commands::admin::withdraw(&session, &call),
        Command::TransferAuthority {
            component,
            new_authority,
            call,
        } => commands::admin::transfer_authority(&session, component, &new_authority, &call),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_register() {
        let cli = Cli::try_parse_from([
            "pns",
            "--json",
            "register",
            "tess",
            "--owner",
            "0x0202020202020202020202020202020202020202",
            "--secret",
            "0303030303030303030303030303030303030303030303030303030303030303",
            "--resolver",
            "public",
            "--text",
            "url=https://push.org",
            "--text",
            "avatar=x",
            "--from",
            "0x0202020202020202020202020202020202020202",
            "--at",
            "1070",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Register {
                request, call, value, ..
            } => {
                assert_eq!(request.label, "tess");
                assert_eq!(request.duration, SECONDS_PER_YEAR);
                assert_eq!(request.texts.len(), 2);
                assert_eq!(value, None);
                assert_eq!(call.context().unwrap().timestamp, 1070);
            }
            _ => panic!("expected register"),
        }
    }

    #[test]
    fn test_parse_transfer_authority() {
        let cli = Cli::try_parse_from([
            "pns",
            "transfer-authority",
            "controller",
            "0x0202020202020202020202020202020202020202",
            "--from",
            "0x0101010101010101010101010101010101010101",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::TransferAuthority {
                component: Component::Controller,
                ..
            }
        ));
        assert!(Cli::try_parse_from([
            "pns",
            "transfer-authority",
            "registry",
            "0x0202020202020202020202020202020202020202",
            "--from",
            "0x0101010101010101010101010101010101010101",
        ])
        .is_err());
    }

    #[test]
    fn test_mutating_commands_require_from() {
        assert!(Cli::try_parse_from(["pns", "withdraw"]).is_err());
        assert!(Cli::try_parse_from(["pns", "commit", "0x00"]).is_err());
    }

    #[test]
    fn test_call_context_rejects_bad_address() {
        let call = CallArgs {
            from: "alice".to_string(),
            at: Some(1),
        };
        assert!(matches!(call.context(), Err(NodeError::InvalidAddress(_))));
    }

    #[test]
    fn test_query_defaults_to_now() {
        let at = AtArgs { at: None };
        assert!(at.context().timestamp > 1_600_000_000);
    }
}
