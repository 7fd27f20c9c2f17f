// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;
use url::Url;

/// Provider with nonce/gas fillers and a wallet holding every configured signer.
pub type SignerProvider = DynProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    /// Signing provider over HTTP. Returns the signer addresses in key order.
    pub fn signer_http(
        rpc_url: &str,
        wallet_keys: &[String],
    ) -> Result<(SignerProvider, Vec<Address>), AppError> {
        let url = parse_url(rpc_url)?;
        let signers = parse_signers(wallet_keys)?;
        let addresses: Vec<Address> = signers.iter().map(|s| s.address()).collect();

        let mut iter = signers.into_iter();
        let Some(first) = iter.next() else {
            return Err(AppError::Config("WALLET_KEYS is missing".to_string()));
        };
        let mut wallet = EthereumWallet::from(first);
        for signer in iter {
            wallet.register_signer(signer);
        }

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();
        Ok((provider, addresses))
    }
}

fn parse_url(rpc_url: &str) -> Result<Url, AppError> {
    Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))
}

pub fn parse_signers(wallet_keys: &[String]) -> Result<Vec<PrivateKeySigner>, AppError> {
    wallet_keys
        .iter()
        .enumerate()
        .map(|(idx, key)| {
            PrivateKeySigner::from_str(key.trim())
                .map_err(|e| AppError::Config(format!("Invalid wallet key #{idx}: {}", e)))
        })
        .collect()
}
