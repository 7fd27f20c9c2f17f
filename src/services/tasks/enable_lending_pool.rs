// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::parsing::parse_address_field;
use crate::domain::constants::LENDING_POOL_ADDRESS_PROVIDER;
use crate::domain::pool::{ConfigNames, load_pool_config};
use crate::network::chain::{ConfirmedTx, ProtocolChain};
use crate::tasks::wait_for_tx;
use alloy::primitives::Address;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct EnableLendingPoolArgs {
    pub paused: bool,
    pub addresses_provider: Option<Address>,
    pub emergency_admins: HashMap<String, Address>,
}

/// Address provider the external admin tasks target on `network`.
pub fn known_addresses_provider(network: &str) -> Result<Address, AppError> {
    let raw = LENDING_POOL_ADDRESS_PROVIDER
        .iter()
        .find(|(name, _)| *name == network)
        .map(|(_, addr)| *addr)
        .unwrap_or_default();
    if raw.is_empty() {
        return Err(AppError::Config(format!(
            "No LendingPoolAddressesProvider known for network '{network}'"
        )));
    }
    parse_address_field("LENDING_POOL_ADDRESS_PROVIDER", raw)
}

/// `external:enable-lending-pool`: flip the market pause flag as emergency admin.
pub async fn enable_lending_pool<C: ProtocolChain>(
    chain: &C,
    args: &EnableLendingPoolArgs,
) -> Result<ConfirmedTx, AppError> {
    let network = chain.network();
    let pool_config =
        load_pool_config(ConfigNames::Aave).with_emergency_admins(args.emergency_admins.clone());

    let addresses_provider = match args.addresses_provider {
        Some(addr) => addr,
        None => known_addresses_provider(network)?,
    };
    let configurator = chain.lending_pool_configurator(addresses_provider).await?;
    if configurator.is_zero() {
        return Err(AppError::Config(format!(
            "Address provider {addresses_provider:#x} has no LendingPoolConfigurator"
        )));
    }

    let admin = pool_config.emergency_admin_for(network, chain.signers())?;
    tracing::info!(
        target: "deploy",
        network,
        configurator = %format!("{configurator:#x}"),
        admin = %format!("{admin:#x}"),
        paused = args.paused,
        "Setting lending pool pause flag"
    );
    let hash = chain.set_pool_pause(admin, configurator, args.paused).await?;
    wait_for_tx(chain, "setPoolPause", hash).await
}
