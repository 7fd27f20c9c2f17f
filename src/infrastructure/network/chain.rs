// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::constants::ContractId;
use alloy::primitives::{Address, B256, U256};

/// Receipt data kept once a transaction is mined and confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedTx {
    pub hash: B256,
    pub block_number: u64,
    pub contract_address: Option<Address>,
}

/// The protocol calls the deployment tasks make, independent of where the chain lives.
///
/// State-changing methods return the submitted transaction hash; callers confirm it
/// with [`ProtocolChain::wait_for_tx`]. Reverts surface as [`AppError::Reverted`].
#[allow(async_fn_in_trait)]
pub trait ProtocolChain {
    fn network(&self) -> &str;

    /// Local signer addresses, deployer first.
    fn signers(&self) -> &[Address];

    fn deployer(&self) -> Result<Address, AppError> {
        self.signers()
            .first()
            .copied()
            .ok_or_else(|| AppError::Config("No signer configured (WALLET_KEYS)".into()))
    }

    /// Submit the creation transaction for `id`'s artifact from the deployer.
    async fn deploy(&self, id: ContractId) -> Result<B256, AppError>;

    async fn wait_for_tx(&self, hash: B256) -> Result<ConfirmedTx, AppError>;

    async fn set_coverage_pool_impl(
        &self,
        from: Address,
        provider: Address,
        implementation: Address,
    ) -> Result<B256, AppError>;

    async fn coverage_pool(&self, provider: Address) -> Result<Address, AppError>;

    async fn lending_pool_configurator(&self, provider: Address) -> Result<Address, AppError>;

    async fn set_pool_pause(
        &self,
        from: Address,
        configurator: Address,
        paused: bool,
    ) -> Result<B256, AppError>;

    async fn deposit_eth(
        &self,
        from: Address,
        gateway: Address,
        lending_pool: Address,
        on_behalf_of: Address,
        referral_code: u16,
        value: U256,
    ) -> Result<B256, AppError>;

    async fn value_of_token(
        &self,
        pool: Address,
        token: Address,
        index: U256,
    ) -> Result<U256, AppError>;

    async fn initialize_bond(
        &self,
        from: Address,
        pool: Address,
        asset: Address,
        bond: Address,
    ) -> Result<B256, AppError>;
}
