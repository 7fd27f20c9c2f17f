// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::registry::ContractRegistry;
use crate::domain::constants::ContractId;
use crate::domain::pool::load_pool_config_by_name;
use crate::network::chain::ProtocolChain;
use crate::tasks::tenderly::{TenderlyFork, report_failure};
use crate::tasks::{deploy_and_register, resolve_addresses_provider, wait_for_tx};
use alloy::primitives::Address;

#[derive(Debug, Clone, Default)]
pub struct DeployCoveragePoolArgs {
    pub verify: bool,
    /// Pool configuration name; checked before anything is sent.
    pub pool: Option<String>,
    pub addresses_provider: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoveragePoolDeployment {
    pub implementation: Address,
    pub proxy: Address,
}

/// `dev:deploy-coverage-pool`
pub async fn dev_deploy_coverage_pool<C: ProtocolChain>(
    chain: &C,
    registry: &mut ContractRegistry,
    args: &DeployCoveragePoolArgs,
) -> Result<CoveragePoolDeployment, AppError> {
    if let Some(pool) = args.pool.as_deref() {
        let config = load_pool_config_by_name(pool)?;
        tracing::info!(target: "deploy", pool = %config.name, market = config.market_id, "Pool configuration loaded");
    }
    deploy_coverage_pool(chain, registry, args).await
}

/// `full:deploy-coverage-pool`. On a Tenderly fork the failing simulation link
/// is logged before the error propagates.
pub async fn full_deploy_coverage_pool<C: ProtocolChain>(
    chain: &C,
    registry: &mut ContractRegistry,
    args: &DeployCoveragePoolArgs,
    tenderly: Option<&TenderlyFork>,
) -> Result<CoveragePoolDeployment, AppError> {
    match deploy_coverage_pool(chain, registry, args).await {
        Ok(deployment) => Ok(deployment),
        Err(err) => {
            report_failure(chain.network(), tenderly);
            Err(err)
        }
    }
}

async fn deploy_coverage_pool<C: ProtocolChain>(
    chain: &C,
    registry: &mut ContractRegistry,
    args: &DeployCoveragePoolArgs,
) -> Result<CoveragePoolDeployment, AppError> {
    let deployer = chain.deployer()?;
    let addresses_provider = resolve_addresses_provider(chain, registry, args.addresses_provider)?;

    let implementation =
        deploy_and_register(chain, registry, ContractId::CoveragePoolImpl, args.verify).await?;

    let hash = chain
        .set_coverage_pool_impl(deployer, addresses_provider, implementation)
        .await?;
    wait_for_tx(chain, "setCoveragePoolImpl", hash).await?;

    let proxy = chain.coverage_pool(addresses_provider).await?;
    if proxy.is_zero() {
        return Err(AppError::Transaction {
            hash: format!("{hash:#x}"),
            reason: "address provider returned no coverage pool proxy".into(),
        });
    }
    registry.insert(ContractId::CoveragePool, chain.network(), proxy, None)?;

    tracing::info!(
        target: "deploy",
        network = chain.network(),
        implementation = %format!("{implementation:#x}"),
        proxy = %format!("{proxy:#x}"),
        "Coverage pool deployed"
    );
    Ok(CoveragePoolDeployment {
        implementation,
        proxy,
    })
}
