// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod deploy_coverage_pool;
pub mod deposit_eth;
pub mod enable_lending_pool;
pub mod tenderly;

use crate::common::error::AppError;
use crate::data::registry::ContractRegistry;
use crate::domain::constants::ContractId;
use crate::network::chain::{ConfirmedTx, ProtocolChain};
use alloy::primitives::{Address, B256};

/// Wait for `hash` and log it under the step name.
pub async fn wait_for_tx<C: ProtocolChain>(
    chain: &C,
    step: &str,
    hash: B256,
) -> Result<ConfirmedTx, AppError> {
    let confirmed = chain.wait_for_tx(hash).await?;
    tracing::info!(
        target: "deploy",
        step,
        tx = %format!("{hash:#x}"),
        block = confirmed.block_number,
        "Confirmed"
    );
    Ok(confirmed)
}

/// Deploy `id`, wait for the receipt, then record it in the registry.
///
/// The registry write happens strictly after confirmation; a failed deploy
/// leaves the previous entry in place.
pub async fn deploy_and_register<C: ProtocolChain>(
    chain: &C,
    registry: &mut ContractRegistry,
    id: ContractId,
    verify: bool,
) -> Result<Address, AppError> {
    let deployer = chain.deployer()?;
    let hash = chain.deploy(id).await?;
    let confirmed = wait_for_tx(chain, id.as_str(), hash).await?;
    let address = confirmed
        .contract_address
        .ok_or_else(|| AppError::Transaction {
            hash: format!("{hash:#x}"),
            reason: format!("receipt for {id} creation has no contract address"),
        })?;

    tracing::info!(
        target: "deploy",
        contract = %id,
        address = %format!("{address:#x}"),
        network = chain.network(),
        "Deployed"
    );
    registry.insert(id, chain.network(), address, Some(deployer))?;

    if verify {
        // Source verification is handled outside this tool.
        tracing::info!(
            target: "deploy",
            contract = %id,
            address = %format!("{address:#x}"),
            "Verification requested; submit sources to the block explorer separately"
        );
    }
    Ok(address)
}

/// Address provider for the current network: explicit override first, then the registry.
pub fn resolve_addresses_provider<C: ProtocolChain>(
    chain: &C,
    registry: &ContractRegistry,
    override_address: Option<Address>,
) -> Result<Address, AppError> {
    match override_address {
        Some(addr) => Ok(addr),
        None => registry.require_address(ContractId::LendingPoolAddressesProvider, chain.network()),
    }
}
