// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::common::parsing::parse_revert_reason;
use crate::common::retry::{poll_until, retry_async};
use crate::data::artifacts::ArtifactRegistry;
use crate::data::contracts::{
    ICoveragePool, ILendingPoolAddressesProvider, ILendingPoolConfigurator, IWETHGateway,
};
use crate::domain::constants::ContractId;
use crate::network::chain::{ConfirmedTx, ProtocolChain};
use crate::network::provider::{ConnectionFactory, SignerProvider};
use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use std::fmt::Display;
use std::time::Duration;

/// Confirmation tuning for [`RpcChain::wait_for_tx`].
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub confirmations: u64,
}

pub struct RpcChain {
    network: String,
    provider: SignerProvider,
    signers: Vec<Address>,
    artifacts: ArtifactRegistry,
    receipts: ReceiptPolicy,
}

impl RpcChain {
    pub async fn connect(
        network: &str,
        rpc_url: &str,
        wallet_keys: &[String],
        artifacts: ArtifactRegistry,
        receipts: ReceiptPolicy,
    ) -> Result<Self, AppError> {
        let (provider, signers) = ConnectionFactory::signer_http(rpc_url, wallet_keys)?;

        let probe = provider.clone();
        let chain_id = retry_async(
            move |_| {
                let probe = probe.clone();
                async move { probe.get_chain_id().await }
            },
            3,
            Duration::from_millis(200),
        )
        .await
        .map_err(|e| AppError::Connection(format!("chain_id probe failed for {rpc_url}: {e}")))?;

        tracing::info!(
            target: "rpc",
            network,
            chain_id,
            deployer = %signers.first().map(|a| format!("{a:#x}")).unwrap_or_default(),
            signers = signers.len(),
            "Connected"
        );

        Ok(Self {
            network: network.to_string(),
            provider,
            signers,
            artifacts,
            receipts,
        })
    }

    async fn send(&self, tx: TransactionRequest) -> Result<B256, AppError> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(classify_send_error)?;
        let hash = *pending.tx_hash();
        tracing::debug!(target: "rpc", tx = %format!("{hash:#x}"), "Transaction submitted");
        Ok(hash)
    }

    async fn wait_for_confirmations(&self, mined_at: u64) -> Result<(), AppError> {
        let target = mined_at + self.receipts.confirmations.saturating_sub(1);
        let provider = &self.provider;
        let reached = poll_until(
            || async move {
                let head = provider.get_block_number().await.map_err(|e| {
                    tracing::warn!(target: "rpc", error = %e, "Block number read failed; retrying");
                    AppError::Connection(format!("block number: {e}"))
                })?;
                Ok::<_, AppError>((head >= target).then_some(head))
            },
            self.receipts.poll_interval,
            self.receipts.timeout,
        )
        .await?;
        if reached.is_none() {
            return Err(AppError::Connection(format!(
                "block {target} not reached within {:?}",
                self.receipts.timeout
            )));
        }
        Ok(())
    }
}

/// Reverts become [`AppError::Reverted`]; anything else is a transport problem.
fn classify_send_error(err: impl Display) -> AppError {
    let message = err.to_string();
    match parse_revert_reason(&message) {
        Some(reason) => AppError::Reverted(reason),
        None => AppError::Connection(message),
    }
}

impl ProtocolChain for RpcChain {
    fn network(&self) -> &str {
        &self.network
    }

    fn signers(&self) -> &[Address] {
        &self.signers
    }

    async fn deploy(&self, id: ContractId) -> Result<B256, AppError> {
        let deployer = self.deployer()?;
        let code = self.artifacts.deployable(id.artifact_name())?;
        let tx = TransactionRequest::default()
            .with_from(deployer)
            .with_deploy_code(code.clone());
        tracing::info!(
            target: "deploy",
            contract = %id,
            bytes = code.len(),
            "Submitting creation transaction"
        );
        self.send(tx).await
    }

    async fn wait_for_tx(&self, hash: B256) -> Result<ConfirmedTx, AppError> {
        let provider = &self.provider;
        let receipt = poll_until(
            || async move {
                provider.get_transaction_receipt(hash).await.map_err(|e| {
                    tracing::warn!(
                        target: "rpc",
                        tx = %format!("{hash:#x}"),
                        error = %e,
                        "Receipt read failed; retrying"
                    );
                    AppError::Connection(format!("receipt fetch: {e}"))
                })
            },
            self.receipts.poll_interval,
            self.receipts.timeout,
        )
        .await?
        .ok_or_else(|| AppError::Transaction {
            hash: format!("{hash:#x}"),
            reason: format!("not mined within {:?}", self.receipts.timeout),
        })?;

        if !receipt.status() {
            return Err(AppError::Transaction {
                hash: format!("{hash:#x}"),
                reason: "reverted".into(),
            });
        }
        let block_number = receipt.block_number().unwrap_or_default();
        self.wait_for_confirmations(block_number).await?;

        Ok(ConfirmedTx {
            hash,
            block_number,
            contract_address: receipt.contract_address(),
        })
    }

    async fn set_coverage_pool_impl(
        &self,
        from: Address,
        provider: Address,
        implementation: Address,
    ) -> Result<B256, AppError> {
        let contract = ILendingPoolAddressesProvider::new(provider, self.provider.clone());
        let tx = contract
            .setCoveragePoolImpl(implementation)
            .from(from)
            .into_transaction_request();
        self.send(tx).await
    }

    async fn coverage_pool(&self, provider: Address) -> Result<Address, AppError> {
        ILendingPoolAddressesProvider::new(provider, self.provider.clone())
            .getCoveragePool()
            .call()
            .await
            .map_err(classify_send_error)
    }

    async fn lending_pool_configurator(&self, provider: Address) -> Result<Address, AppError> {
        ILendingPoolAddressesProvider::new(provider, self.provider.clone())
            .getLendingPoolConfigurator()
            .call()
            .await
            .map_err(classify_send_error)
    }

    async fn set_pool_pause(
        &self,
        from: Address,
        configurator: Address,
        paused: bool,
    ) -> Result<B256, AppError> {
        let tx = ILendingPoolConfigurator::new(configurator, self.provider.clone())
            .setPoolPause(paused)
            .from(from)
            .into_transaction_request();
        self.send(tx).await
    }

    async fn deposit_eth(
        &self,
        from: Address,
        gateway: Address,
        lending_pool: Address,
        on_behalf_of: Address,
        referral_code: u16,
        value: U256,
    ) -> Result<B256, AppError> {
        let tx = IWETHGateway::new(gateway, self.provider.clone())
            .depositETH(lending_pool, on_behalf_of, referral_code)
            .from(from)
            .value(value)
            .into_transaction_request();
        self.send(tx).await
    }

    async fn value_of_token(
        &self,
        pool: Address,
        token: Address,
        index: U256,
    ) -> Result<U256, AppError> {
        ICoveragePool::new(pool, self.provider.clone())
            .valueOfToken(token, index)
            .call()
            .await
            .map_err(classify_send_error)
    }

    async fn initialize_bond(
        &self,
        from: Address,
        pool: Address,
        asset: Address,
        bond: Address,
    ) -> Result<B256, AppError> {
        let tx = ICoveragePool::new(pool, self.provider.clone())
            .initializeBond(asset, bond)
            .from(from)
            .into_transaction_request();
        self.send(tx).await
    }
}
