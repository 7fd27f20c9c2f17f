// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::constants::{DEFAULT_LENDING_POOL, DEFAULT_ON_BEHALF_OF, DEFAULT_WETH_GATEWAY};
use crate::network::chain::{ConfirmedTx, ProtocolChain};
use crate::tasks::wait_for_tx;
use alloy::primitives::{Address, U256};
use alloy::primitives::utils::format_ether;

#[derive(Debug, Clone)]
pub struct DepositEthArgs {
    pub gateway: Address,
    pub lending_pool: Address,
    pub on_behalf_of: Address,
    pub amount: U256,
    pub referral_code: u16,
}

impl Default for DepositEthArgs {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_WETH_GATEWAY,
            lending_pool: DEFAULT_LENDING_POOL,
            on_behalf_of: DEFAULT_ON_BEHALF_OF,
            amount: U256::from(500_000_000_000_000_000u64),
            referral_code: 0,
        }
    }
}

/// `interact:deposit-eth`: wrap and deposit ETH through the WETH gateway from the deployer.
pub async fn deposit_eth<C: ProtocolChain>(
    chain: &C,
    args: &DepositEthArgs,
) -> Result<ConfirmedTx, AppError> {
    if args.amount.is_zero() {
        return Err(AppError::Validation {
            field: "amount".into(),
            message: "deposit amount must be positive".into(),
        });
    }
    let from = chain.deployer()?;
    tracing::info!(
        target: "deploy",
        gateway = %format!("{:#x}", args.gateway),
        lending_pool = %format!("{:#x}", args.lending_pool),
        on_behalf_of = %format!("{:#x}", args.on_behalf_of),
        eth = %format_ether(args.amount),
        "Depositing ETH"
    );
    let hash = chain
        .deposit_eth(
            from,
            args.gateway,
            args.lending_pool,
            args.on_behalf_of,
            args.referral_code,
            args.amount,
        )
        .await?;
    wait_for_tx(chain, "depositETH", hash).await
}
