//! Deterministic bootstrap of a name service deployment.

use pns_crypto::address::contract_address;
use pns_crypto::namehash::{addr_reverse_node, label_hash, namehash};
use pns_storage::keys::{meta, meta_key};
use pns_types::constants::{ADDR_REVERSE_LABEL, REVERSE_LABEL};
use pns_types::params::{Deployment, ProtocolParams};
use pns_types::primitives::*;

use crate::controller::RegistrarController;
use crate::error::RegistryError;
use crate::price::PriceOracle;
use crate::registrar::BaseRegistrar;
use crate::registry::NodeRegistry;
use crate::resolver::Resolver;
use crate::reverse::ReverseRegistrar;
use crate::transaction::Transaction;

pub const REGISTRY_NAME: &str = "registry";
pub const BASE_REGISTRAR_NAME: &str = "base-registrar";
pub const CONTROLLER_NAME: &str = "registrar-controller";
pub const PUBLIC_RESOLVER_NAME: &str = "public-resolver";
pub const REVERSE_REGISTRAR_NAME: &str = "reverse-registrar";

/// The deployed components, wired together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contracts {
    pub registry: NodeRegistry,
    pub registrar: BaseRegistrar,
    pub controller: RegistrarController,
    pub resolver: Resolver,
    pub reverse: ReverseRegistrar,
}

impl Contracts {
    pub fn from_deployment(deployment: &Deployment) -> Result<Self, RegistryError> {
        let params = &deployment.params;
        let registry = NodeRegistry::new(deployment.registry);
        let registrar = BaseRegistrar::new(
            deployment.registrar,
            registry,
            deployment.base_node,
            params.grace_period,
        );
        let resolver = Resolver::new(deployment.resolver, registry, deployment.controller);
        let controller = RegistrarController {
            address: deployment.controller,
            registrar,
            resolver,
            prices: PriceOracle::new(params.price_tiers.clone())?,
            tld: params.tld.clone(),
            min_commitment_age: params.min_commitment_age,
            max_commitment_age: params.max_commitment_age,
            min_registration_duration: params.min_registration_duration,
        };
        let reverse = ReverseRegistrar::new(
            deployment.reverse_registrar,
            registry,
            resolver,
            deployment.reverse_node,
        );
        Ok(Self {
            registry,
            registrar,
            controller,
            resolver,
            reverse,
        })
    }
}

/// The deployment record a caller would get for `params` at `now`.
pub fn plan_deployment(deployer: Address, params: ProtocolParams, now: Timestamp) -> Deployment {
    Deployment {
        deployer,
        registry: contract_address(REGISTRY_NAME),
        registrar: contract_address(BASE_REGISTRAR_NAME),
        controller: contract_address(CONTROLLER_NAME),
        resolver: contract_address(PUBLIC_RESOLVER_NAME),
        reverse_registrar: contract_address(REVERSE_REGISTRAR_NAME),
        base_node: namehash(&params.tld),
        reverse_node: addr_reverse_node(),
        deployed_at: now,
        params,
    }
}

/// Deploy the name service with the caller as root owner and authority.
///
/// 1. root -> deployer; authorities of registrar, controller and reverse
///    registrar -> deployer
/// 2. controller added to the base registrar
/// 3. `tld` -> base registrar, base node resolver -> public resolver
/// 4. `reverse` -> deployer, `addr.reverse` -> reverse registrar
/// 5. default reverse resolver -> public resolver
pub fn deploy(
    tx: &mut Transaction<'_>,
    params: ProtocolParams,
) -> Result<(Deployment, Contracts), RegistryError> {
    let key = meta_key(meta::DEPLOYMENT);
    if tx.exists(&key)? {
        return Err(RegistryError::AlreadyDeployed);
    }
    params.validate()?;

    let deployer = tx.caller();
    let deployment = plan_deployment(deployer, params, tx.now());
    let contracts = Contracts::from_deployment(&deployment)?;
    let Contracts {
        registry,
        registrar,
        controller,
        resolver,
        reverse,
    } = &contracts;

    registry.init_root(tx, &deployer)?;
    registrar.ownable().init(tx, &deployer)?;
    controller.ownable().init(tx, &deployer)?;
    reverse.ownable().init(tx, &deployer)?;

    registrar.add_controller(tx, &controller.address)?;

    registry.set_subnode_owner(
        tx,
        &ROOT_NODE,
        &label_hash(&deployment.params.tld),
        &registrar.address,
    )?;
    registrar.set_resolver(tx, &resolver.address)?;

    let reverse_parent =
        registry.set_subnode_owner(tx, &ROOT_NODE, &label_hash(REVERSE_LABEL), &deployer)?;
    registry.set_subnode_owner(
        tx,
        &reverse_parent,
        &label_hash(ADDR_REVERSE_LABEL),
        &reverse.address,
    )?;
    reverse.set_default_resolver(tx, &resolver.address)?;

    tx.put(key, &deployment)?;
    Ok((deployment, contracts))
}
