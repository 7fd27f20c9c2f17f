// SPDX-License-Identifier: MIT
// Task-level behaviour: registry writes, validation ordering and admin tasks on the dev chain.

use alloy::primitives::{Address, U256};
use coverage_deployer::data::registry::ContractRegistry;
use coverage_deployer::domain::constants::ContractId;
use coverage_deployer::domain::error::AppError;
use coverage_deployer::network::ProtocolChain;
use coverage_deployer::network::devnet::{DevChain, DevDeployment};
use coverage_deployer::tasks::deploy_coverage_pool::{
    DeployCoveragePoolArgs, dev_deploy_coverage_pool, full_deploy_coverage_pool,
};
use coverage_deployer::tasks::deposit_eth::{DepositEthArgs, deposit_eth};
use coverage_deployer::tasks::enable_lending_pool::{EnableLendingPoolArgs, enable_lending_pool};
use coverage_deployer::tasks::tenderly::TenderlyFork;
use std::collections::HashMap;

fn seeded(network: &str) -> (DevChain, DevDeployment, ContractRegistry) {
    let (chain, market) = DevChain::bootstrap(network, 3).expect("bootstrap");
    let mut registry = ContractRegistry::in_memory();
    registry
        .insert(
            ContractId::LendingPoolAddressesProvider,
            network,
            market.addresses_provider,
            None,
        )
        .expect("seed provider");
    (chain, market, registry)
}

fn temp_registry_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "deploy-tasks-{tag}-{}-{}.json",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[tokio::test]
async fn redeploy_keeps_single_coverage_pool_address() {
    let (chain, _, mut registry) = seeded("hardhat");
    let args = DeployCoveragePoolArgs::default();

    let first = dev_deploy_coverage_pool(&chain, &mut registry, &args)
        .await
        .expect("first run");
    let second = dev_deploy_coverage_pool(&chain, &mut registry, &args)
        .await
        .expect("second run");

    assert_eq!(first.proxy, second.proxy);
    assert_ne!(first.implementation, second.implementation);
    assert_eq!(
        registry.address(ContractId::CoveragePool, "hardhat"),
        Some(second.proxy)
    );
    assert_eq!(
        registry.address(ContractId::CoveragePoolImpl, "hardhat"),
        Some(second.implementation)
    );
    assert_eq!(
        chain.coverage_pool_implementation(second.proxy),
        Some(second.implementation)
    );
}

#[tokio::test]
async fn unsupported_pool_fails_before_any_transaction() {
    let (chain, _, mut registry) = seeded("hardhat");
    let before = chain.transaction_count();
    let args = DeployCoveragePoolArgs {
        pool: Some("Compound".into()),
        ..Default::default()
    };

    let err = dev_deploy_coverage_pool(&chain, &mut registry, &args)
        .await
        .expect_err("unsupported pool");
    assert!(matches!(err, AppError::Config(msg) if msg.starts_with("Unsupported pool configuration")));
    assert_eq!(chain.transaction_count(), before);
    assert!(registry.address(ContractId::CoveragePoolImpl, "hardhat").is_none());
}

#[tokio::test]
async fn missing_address_provider_fails_before_any_transaction() {
    let (chain, _) = DevChain::bootstrap("kovan", 2).expect("bootstrap");
    let before = chain.transaction_count();
    let mut registry = ContractRegistry::in_memory();

    let err = dev_deploy_coverage_pool(&chain, &mut registry, &DeployCoveragePoolArgs::default())
        .await
        .expect_err("no provider registered");
    assert!(matches!(err, AppError::Config(msg) if msg.contains("LendingPoolAddressesProvider")));
    assert_eq!(chain.transaction_count(), before);
}

#[tokio::test]
async fn full_task_propagates_failure_on_tenderly_fork() {
    let (chain, _) = DevChain::bootstrap("tenderly-main", 2).expect("bootstrap");
    let mut registry = ContractRegistry::in_memory();
    let fork = TenderlyFork {
        username: "team".into(),
        project: "market".into(),
        fork_id: "fork".into(),
        head_id: "head".into(),
    };

    let err = full_deploy_coverage_pool(
        &chain,
        &mut registry,
        &DeployCoveragePoolArgs::default(),
        Some(&fork),
    )
    .await
    .expect_err("no provider registered");
    assert!(matches!(err, AppError::Config(_)));
    assert!(registry.entries_for("tenderly-main").is_empty());
}

#[tokio::test]
async fn full_task_uses_explicit_provider_and_persists_registry() {
    let (chain, market) = DevChain::bootstrap("kovan", 2).expect("bootstrap");
    let path = temp_registry_path("full");
    let mut registry = ContractRegistry::load_from_file(path.to_str().unwrap()).expect("open");
    let args = DeployCoveragePoolArgs {
        verify: true,
        addresses_provider: Some(market.addresses_provider),
        ..Default::default()
    };

    let deployment = full_deploy_coverage_pool(&chain, &mut registry, &args, None)
        .await
        .expect("deploy");

    let reopened = ContractRegistry::load_from_file(path.to_str().unwrap()).expect("reopen");
    assert_eq!(
        reopened.address(ContractId::CoveragePool, "kovan"),
        Some(deployment.proxy)
    );
    let impl_entry = reopened
        .get(ContractId::CoveragePoolImpl, "kovan")
        .expect("impl entry");
    assert_eq!(impl_entry.address, deployment.implementation);
    assert_eq!(impl_entry.deployer, Some(chain.signers()[0]));
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn enable_lending_pool_acts_as_emergency_admin() {
    let (chain, market, _) = seeded("kovan");
    let pause = EnableLendingPoolArgs {
        paused: true,
        addresses_provider: Some(market.addresses_provider),
        emergency_admins: HashMap::new(),
    };
    enable_lending_pool(&chain, &pause).await.expect("pause");
    assert_eq!(chain.is_paused(market.configurator), Some(true));

    let unpause = EnableLendingPoolArgs {
        paused: false,
        ..pause
    };
    enable_lending_pool(&chain, &unpause).await.expect("unpause");
    assert_eq!(chain.is_paused(market.configurator), Some(false));
}

#[tokio::test]
async fn enable_lending_pool_rejects_wrong_explicit_admin() {
    let (chain, market, _) = seeded("kovan");
    let deployer = chain.signers()[0];
    let args = EnableLendingPoolArgs {
        paused: true,
        addresses_provider: Some(market.addresses_provider),
        emergency_admins: HashMap::from([("kovan".to_string(), deployer)]),
    };

    let err = enable_lending_pool(&chain, &args)
        .await
        .expect_err("deployer is not emergency admin");
    assert!(err.revert_reason().is_some());
    assert_eq!(chain.is_paused(market.configurator), Some(false));
}

#[tokio::test]
async fn deposit_eth_forwards_value_to_lending_pool() {
    let (chain, market, _) = seeded("hardhat");
    let beneficiary = Address::from([0x16; 20]);
    let args = DepositEthArgs {
        gateway: market.weth_gateway,
        lending_pool: market.lending_pool,
        on_behalf_of: beneficiary,
        ..Default::default()
    };

    deposit_eth(&chain, &args).await.expect("deposit");
    assert_eq!(
        chain.deposited(market.lending_pool, beneficiary),
        U256::from(500_000_000_000_000_000u64)
    );

    let zero = DepositEthArgs {
        amount: U256::ZERO,
        ..args
    };
    assert!(matches!(
        deposit_eth(&chain, &zero).await,
        Err(AppError::Validation { .. })
    ));
}

#[tokio::test]
async fn deposit_eth_to_unknown_gateway_reverts() {
    let (chain, _, _) = seeded("hardhat");
    let err = deposit_eth(&chain, &DepositEthArgs::default())
        .await
        .expect_err("default gateway does not exist on the dev chain");
    assert!(matches!(err, AppError::Reverted(msg) if msg.contains("non-contract")));
}
