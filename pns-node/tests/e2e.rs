//! End-to-end flow through the `pns` command layer against on-disk stores:
//! deploy → commit → register → reverse name, then reopen and verify.

use clap::Parser;

use pns_crypto::namehash::{label_hash, namehash, reverse_node};
use pns_node::cli::{self, Cli, RequestArgs};
use pns_node::commands::register::build_request;
use pns_node::config::NodeConfig;
use pns_node::error::NodeError;
use pns_node::format::{format_address, format_hash};
use pns_node::store::create_store;
use pns_registry::error::RegistryError;
use pns_registry::service::NameService;
use pns_registry::transaction::CallContext;
use pns_storage::traits::DynStore;
use pns_types::constants::{ONE_TOKEN, SECONDS_PER_YEAR};
use pns_types::primitives::Address;

const DEPLOYER: Address = [1u8; 20];
const ALICE: Address = [2u8; 20];
const BOB: Address = [4u8; 20];
const SECRET: [u8; 32] = [3u8; 32];

fn config_in(dir: &std::path::Path, db_type: &str) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.storage.data_dir = dir.join("data").to_string_lossy().into_owned();
    config.storage.db_type = db_type.to_string();
    config
}

/// Run one `pns` command line against `config`.
fn pns(config: &NodeConfig, args: &[&str]) -> Result<(), NodeError> {
    let cli = Cli::try_parse_from(std::iter::once("pns").chain(args.iter().copied()))
        .expect("command line parses");
    cli::run(cli, config.clone())
}

fn reopen(config: &NodeConfig) -> NameService<DynStore> {
    NameService::open(create_store(&config.storage).unwrap()).unwrap()
}

fn tess_request() -> RequestArgs {
    RequestArgs {
        label: "tess".to_string(),
        owner: format_address(&ALICE),
        duration: SECONDS_PER_YEAR,
        resolver: Some("public".to_string()),
        addr_record: Some(format_address(&ALICE)),
        name_record: None,
        texts: vec!["url=https://push.org".to_string()],
    }
}

fn commitment_hex() -> String {
    let request = build_request("push", &tess_request(), SECRET).unwrap();
    format_hash(&request.commitment().unwrap())
}

fn register_args<'a>(secret: &'a str, at: &'a str, alice: &'a str) -> Vec<&'a str> {
    vec![
        "register",
        "tess",
        "--owner",
        alice,
        "--resolver",
        "public",
        "--addr-record",
        alice,
        "--text",
        "url=https://push.org",
        "--secret",
        secret,
        "--from",
        alice,
        "--at",
        at,
    ]
}

fn full_flow(db_type: &str) {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path(), db_type);
    let deployer = format_address(&DEPLOYER);
    let alice = format_address(&ALICE);
    let secret = format_hash(&SECRET);
    let commitment = commitment_hex();

    pns(&config, &["deploy", "--from", &deployer, "--at", "1000"]).unwrap();
    pns(&config, &["commit", &commitment, "--from", &alice, "--at", "2000"]).unwrap();

    // Ten seconds in is inside the minimum commitment age.
    let err = pns(&config, &register_args(&secret, "2010", &alice)).unwrap_err();
    assert!(matches!(
        err,
        NodeError::RegistryError(RegistryError::CommitmentTooNew { .. })
    ));

    pns(&config, &register_args(&secret, "2070", &alice)).unwrap();
    pns(
        &config,
        &["set-reverse-name", "tess.push", "--from", &alice, "--at", "2080"],
    )
    .unwrap();

    let service = reopen(&config);
    service
        .query(CallContext::new(ALICE, 3_000), |c, tx| {
            assert!(!c.controller.available(tx, "tess")?);
            let registration = c.registrar.registration(tx, &label_hash("tess"))?.unwrap();
            assert_eq!(registration.owner, ALICE);
            assert_eq!(registration.expires, 2_070 + SECONDS_PER_YEAR);

            let node = namehash("tess.push");
            assert_eq!(c.registry.owner(tx, &node)?, ALICE);
            assert_eq!(c.resolver.addr(tx, &node)?, Some(ALICE));
            assert_eq!(
                c.resolver.text(tx, &node, "url")?,
                Some("https://push.org".to_string())
            );
            assert_eq!(
                c.resolver.name(tx, &reverse_node(&ALICE))?,
                Some("tess.push".to_string())
            );

            // 4-character labels cost 0.1 per day.
            assert_eq!(c.controller.balance(tx)?, 365 * ONE_TOKEN / 10);
            Ok(())
        })
        .unwrap();

    // Expiry is evaluated at the query time.
    let later = 2_070 + SECONDS_PER_YEAR + 1;
    assert!(service
        .query(CallContext::new(ALICE, later), |c, tx| c
            .controller
            .available(tx, "tess"))
        .unwrap());
}

#[test]
fn test_full_flow_sqlite() {
    full_flow("sqlite");
}

#[test]
fn test_full_flow_rocksdb() {
    full_flow("rocksdb");
}

#[test]
fn test_wrong_secret_leaves_commitment_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path(), "sqlite");
    let deployer = format_address(&DEPLOYER);
    let alice = format_address(&ALICE);
    let commitment = commitment_hex();

    pns(&config, &["deploy", "--from", &deployer, "--at", "1000"]).unwrap();
    pns(&config, &["commit", &commitment, "--from", &alice, "--at", "2000"]).unwrap();

    let wrong = format_hash(&[9u8; 32]);
    let err = pns(&config, &register_args(&wrong, "2070", &alice)).unwrap_err();
    assert!(matches!(
        err,
        NodeError::RegistryError(RegistryError::UnknownCommitment { .. })
    ));

    let service = reopen(&config);
    let request = build_request("push", &tess_request(), SECRET).unwrap();
    service
        .query(CallContext::new(ALICE, 2_070), |c, tx| {
            assert!(c.controller.available(tx, "tess")?);
            assert_eq!(
                c.controller
                    .commitment_time(tx, &request.commitment()?)?,
                Some(2_000)
            );
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_withdraw_is_authority_only() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path(), "sqlite");
    let deployer = format_address(&DEPLOYER);
    let alice = format_address(&ALICE);
    let bob = format_address(&BOB);
    let secret = format_hash(&SECRET);

    pns(&config, &["deploy", "--from", &deployer, "--at", "1000"]).unwrap();
    pns(&config, &["commit", &commitment_hex(), "--from", &alice, "--at", "2000"]).unwrap();
    pns(&config, &register_args(&secret, "2070", &alice)).unwrap();

    let err = pns(&config, &["withdraw", "--from", &bob, "--at", "3000"]).unwrap_err();
    assert!(matches!(
        err,
        NodeError::RegistryError(RegistryError::Unauthorized { .. })
    ));
    pns(&config, &["withdraw", "--from", &deployer, "--at", "3000"]).unwrap();

    let service = reopen(&config);
    let balance = service
        .query(CallContext::new(DEPLOYER, 3_000), |c, tx| {
            c.controller.balance(tx)
        })
        .unwrap();
    assert_eq!(balance, 0);
}

#[test]
fn test_transfer_authority_moves_withdraw_rights() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path(), "sqlite");
    let deployer = format_address(&DEPLOYER);
    let bob = format_address(&BOB);

    pns(&config, &["deploy", "--from", &deployer, "--at", "1000"]).unwrap();
    let err = pns(
        &config,
        &["transfer-authority", "controller", &bob, "--from", &bob, "--at", "1100"],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        NodeError::RegistryError(RegistryError::Unauthorized { .. })
    ));

    pns(
        &config,
        &["transfer-authority", "controller", &bob, "--from", &deployer, "--at", "1100"],
    )
    .unwrap();
    let err = pns(&config, &["withdraw", "--from", &deployer, "--at", "1200"]).unwrap_err();
    assert!(matches!(
        err,
        NodeError::RegistryError(RegistryError::Unauthorized { .. })
    ));
    pns(&config, &["withdraw", "--from", &bob, "--at", "1200"]).unwrap();

    // The other components keep their authority.
    let service = reopen(&config);
    service
        .query(CallContext::new(BOB, 1_300), |c, tx| {
            assert_eq!(c.controller.ownable().owner(tx)?, BOB);
            assert_eq!(c.registrar.ownable().owner(tx)?, DEPLOYER);
            assert_eq!(c.reverse.ownable().owner(tx)?, DEPLOYER);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_commands_before_deploy() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path(), "sqlite");
    let err = pns(&config, &["available", "tess", "--at", "0"]).unwrap_err();
    assert!(matches!(
        err,
        NodeError::RegistryError(RegistryError::NotDeployed)
    ));

    // Commitments can be computed offline.
    pns(
        &config,
        &[
            "make-commitment",
            "tess",
            "--owner",
            &format_address(&ALICE),
            "--secret",
            &format_hash(&SECRET),
        ],
    )
    .unwrap();
}

#[test]
fn test_init_writes_config() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_str().unwrap();
    let config = config_in(tmp.path(), "memory");
    pns(&config, &["init", "--dir", dir]).unwrap();
    let written = NodeConfig::load(tmp.path().join("pns.toml").to_str().unwrap()).unwrap();
    assert_eq!(written.protocol.tld, "push");
}
