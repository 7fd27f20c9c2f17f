// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

//! In-process stand-in for a node, used by `--dry-run` and the test suite.
//!
//! Only the request/response surface the tasks touch is modelled: contract
//! creation, the address provider's coverage pool proxy slot, pool-admin and
//! emergency-admin gates, and ETH deposits through the gateway. Every call is
//! applied to a scratch copy of the state and committed only on success, so a
//! revert leaves nothing behind.

use crate::common::error::AppError;
use crate::domain::constants::{
    CALLER_NOT_POOL_ADMIN, ContractId, LPC_CALLER_NOT_EMERGENCY_ADMIN, OWNABLE_CALLER_NOT_OWNER,
};
use crate::network::chain::{ConfirmedTx, ProtocolChain};
use alloy::primitives::{Address, B256, U256, keccak256};
use std::collections::HashMap;
use std::sync::Mutex;

/// Balance every dev signer starts with (10_000 ETH).
const DEV_SIGNER_BALANCE_WEI: u128 = 10_000 * 1_000_000_000_000_000_000;

#[derive(Debug, Clone)]
enum DevContract {
    AddressesProvider {
        owner: Address,
        pool_admin: Address,
        emergency_admin: Address,
        configurator: Option<Address>,
        lending_pool: Option<Address>,
        coverage_pool: Option<Address>,
    },
    Configurator {
        provider: Address,
        paused: bool,
    },
    LendingPool {
        deposits: HashMap<Address, U256>,
    },
    WethGateway,
    CoveragePoolImpl,
    CoveragePoolProxy {
        provider: Address,
        implementation: Address,
        bonds: Vec<(Address, Address)>,
    },
}

#[derive(Debug, Clone, Default)]
struct DevState {
    block_number: u64,
    nonces: HashMap<Address, u64>,
    balances: HashMap<Address, U256>,
    contracts: HashMap<Address, DevContract>,
    receipts: HashMap<B256, ConfirmedTx>,
}

impl DevState {
    fn next_nonce(&mut self, account: Address) -> u64 {
        let nonce = self.nonces.entry(account).or_insert(0);
        let current = *nonce;
        *nonce += 1;
        current
    }

    fn create(&mut self, creator: Address, contract: DevContract) -> Address {
        let nonce = self.next_nonce(creator);
        let address = creator.create(nonce);
        self.contracts.insert(address, contract);
        address
    }

    fn contract_mut(&mut self, address: Address) -> Result<&mut DevContract, AppError> {
        self.contracts.get_mut(&address).ok_or_else(|| {
            AppError::Reverted(format!("call to non-contract account {address:#x}"))
        })
    }

    fn contract(&self, address: Address) -> Result<&DevContract, AppError> {
        self.contracts.get(&address).ok_or_else(|| {
            AppError::Reverted(format!("call to non-contract account {address:#x}"))
        })
    }

    fn provider_admins(&self, provider: Address) -> Result<(Address, Address), AppError> {
        match self.contract(provider)? {
            DevContract::AddressesProvider {
                pool_admin,
                emergency_admin,
                ..
            } => Ok((*pool_admin, *emergency_admin)),
            _ => Err(unexpected_selector(provider)),
        }
    }
}

fn unexpected_selector(address: Address) -> AppError {
    AppError::Reverted(format!(
        "function selector was not recognized by {address:#x}"
    ))
}

/// Addresses created by [`DevChain::bootstrap`].
#[derive(Debug, Clone, Copy)]
pub struct DevDeployment {
    pub addresses_provider: Address,
    pub configurator: Address,
    pub lending_pool: Address,
    pub weth_gateway: Address,
}

impl DevDeployment {
    pub fn entries(&self) -> [(ContractId, Address); 4] {
        [
            (ContractId::LendingPoolAddressesProvider, self.addresses_provider),
            (ContractId::LendingPoolConfigurator, self.configurator),
            (ContractId::LendingPool, self.lending_pool),
            (ContractId::WethGateway, self.weth_gateway),
        ]
    }
}

pub struct DevChain {
    network: String,
    signers: Vec<Address>,
    state: Mutex<DevState>,
}

impl DevChain {
    /// Empty chain with `accounts` funded signers derived from the network name.
    pub fn new(network: &str, accounts: usize) -> Self {
        let signers: Vec<Address> = (0..accounts.max(1))
            .map(|i| Address::from_slice(&keccak256(format!("{network}:signer:{i}"))[12..]))
            .collect();
        let mut state = DevState::default();
        for signer in &signers {
            state
                .balances
                .insert(*signer, U256::from(DEV_SIGNER_BALANCE_WEI));
        }
        Self {
            network: network.to_string(),
            signers,
            state: Mutex::new(state),
        }
    }

    /// Chain with the lending market already in place: the deployer owns the
    /// address provider and is pool admin, signer #1 is emergency admin.
    pub fn bootstrap(network: &str, accounts: usize) -> Result<(Self, DevDeployment), AppError> {
        let chain = Self::new(network, accounts.max(2));
        let deployer = chain.signers[0];
        let emergency_admin = chain.signers[1];

        let deployment = chain.transact(deployer, U256::ZERO, |state| {
            let provider = state.create(
                deployer,
                DevContract::AddressesProvider {
                    owner: deployer,
                    pool_admin: deployer,
                    emergency_admin,
                    configurator: None,
                    lending_pool: None,
                    coverage_pool: None,
                },
            );
            let lending_pool = state.create(
                provider,
                DevContract::LendingPool {
                    deposits: HashMap::new(),
                },
            );
            let configurator = state.create(
                provider,
                DevContract::Configurator {
                    provider,
                    paused: false,
                },
            );
            if let DevContract::AddressesProvider {
                configurator: slot_configurator,
                lending_pool: slot_pool,
                ..
            } = state.contract_mut(provider)?
            {
                *slot_configurator = Some(configurator);
                *slot_pool = Some(lending_pool);
            }
            let weth_gateway = state.create(deployer, DevContract::WethGateway);
            Ok(DevDeployment {
                addresses_provider: provider,
                configurator,
                lending_pool,
                weth_gateway,
            })
        })?;

        tracing::debug!(
            target: "devnet",
            network,
            provider = %format!("{:#x}", deployment.0.addresses_provider),
            "Bootstrapped dev market"
        );
        Ok((chain, deployment.0))
    }

    /// Number of transactions mined so far, including bootstrap.
    pub fn transaction_count(&self) -> usize {
        self.lock().receipts.len()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.lock()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_paused(&self, configurator: Address) -> Option<bool> {
        match self.lock().contracts.get(&configurator) {
            Some(DevContract::Configurator { paused, .. }) => Some(*paused),
            _ => None,
        }
    }

    pub fn deposited(&self, lending_pool: Address, on_behalf_of: Address) -> U256 {
        match self.lock().contracts.get(&lending_pool) {
            Some(DevContract::LendingPool { deposits }) => {
                deposits.get(&on_behalf_of).copied().unwrap_or_default()
            }
            _ => U256::ZERO,
        }
    }

    /// Implementation currently behind a coverage pool proxy.
    pub fn coverage_pool_implementation(&self, proxy: Address) -> Option<Address> {
        match self.lock().contracts.get(&proxy) {
            Some(DevContract::CoveragePoolProxy { implementation, .. }) => Some(*implementation),
            _ => None,
        }
    }

    pub fn bonds(&self, proxy: Address) -> Vec<(Address, Address)> {
        match self.lock().contracts.get(&proxy) {
            Some(DevContract::CoveragePoolProxy { bonds, .. }) => bonds.clone(),
            _ => Vec::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DevState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `f` as one transaction from `from` carrying `value` wei. State is
    /// committed, and a receipt mined, only when `f` succeeds.
    fn transact<T>(
        &self,
        from: Address,
        value: U256,
        f: impl FnOnce(&mut DevState) -> Result<T, AppError>,
    ) -> Result<(T, B256), AppError> {
        if !self.signers.contains(&from) {
            return Err(AppError::Config(format!(
                "{from:#x} is not a local signer on {}",
                self.network
            )));
        }
        let mut guard = self.lock();
        let available = guard.balances.get(&from).copied().unwrap_or_default();
        if available < value {
            return Err(AppError::InsufficientFunds {
                required: value.to_string(),
                available: available.to_string(),
            });
        }

        let mut scratch = guard.clone();
        let nonce = scratch.next_nonce(from);
        let mut preimage = Vec::with_capacity(28);
        preimage.extend_from_slice(from.as_slice());
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let hash = keccak256(&preimage);

        let out = f(&mut scratch)?;

        scratch.balances.insert(from, available - value);
        scratch.block_number += 1;
        let receipt = ConfirmedTx {
            hash,
            block_number: scratch.block_number,
            contract_address: None,
        };
        scratch.receipts.insert(hash, receipt);
        *guard = scratch;
        Ok((out, hash))
    }

    fn set_receipt_contract(&self, hash: B256, address: Address) {
        if let Some(receipt) = self.lock().receipts.get_mut(&hash) {
            receipt.contract_address = Some(address);
        }
    }
}

impl ProtocolChain for DevChain {
    fn network(&self) -> &str {
        &self.network
    }

    fn signers(&self) -> &[Address] {
        &self.signers
    }

    async fn deploy(&self, id: ContractId) -> Result<B256, AppError> {
        let deployer = self.deployer()?;
        let contract = match id {
            ContractId::CoveragePool | ContractId::CoveragePoolImpl => DevContract::CoveragePoolImpl,
            ContractId::WethGateway => DevContract::WethGateway,
            other => {
                return Err(AppError::Config(format!(
                    "{other} cannot be deployed standalone on the dev chain"
                )));
            }
        };
        let (address, hash) = self.transact(deployer, U256::ZERO, |state| {
            // Creation address derives from the sender nonce before this tx.
            let nonce = state.nonces.get(&deployer).copied().unwrap_or(1) - 1;
            let address = deployer.create(nonce);
            state.contracts.insert(address, contract);
            Ok(address)
        })?;
        self.set_receipt_contract(hash, address);
        Ok(hash)
    }

    async fn wait_for_tx(&self, hash: B256) -> Result<ConfirmedTx, AppError> {
        self.lock()
            .receipts
            .get(&hash)
            .copied()
            .ok_or_else(|| AppError::Transaction {
                hash: format!("{hash:#x}"),
                reason: "unknown transaction".into(),
            })
    }

    async fn set_coverage_pool_impl(
        &self,
        from: Address,
        provider: Address,
        implementation: Address,
    ) -> Result<B256, AppError> {
        let (_, hash) = self.transact(from, U256::ZERO, |state| {
            if !matches!(state.contract(implementation)?, DevContract::CoveragePoolImpl) {
                return Err(AppError::Reverted(format!(
                    "{implementation:#x} is not a coverage pool implementation"
                )));
            }
            let existing = match state.contract(provider)? {
                DevContract::AddressesProvider { owner, .. } if *owner != from => {
                    return Err(AppError::Reverted(OWNABLE_CALLER_NOT_OWNER.into()));
                }
                DevContract::AddressesProvider { coverage_pool, .. } => *coverage_pool,
                _ => return Err(unexpected_selector(provider)),
            };

            match existing {
                // Proxy already exists: upgrade in place, keep its address.
                Some(proxy) => {
                    if let DevContract::CoveragePoolProxy {
                        implementation: current,
                        ..
                    } = state.contract_mut(proxy)?
                    {
                        *current = implementation;
                    }
                }
                None => {
                    let proxy = state.create(
                        provider,
                        DevContract::CoveragePoolProxy {
                            provider,
                            implementation,
                            bonds: Vec::new(),
                        },
                    );
                    if let DevContract::AddressesProvider { coverage_pool, .. } =
                        state.contract_mut(provider)?
                    {
                        *coverage_pool = Some(proxy);
                    }
                }
            }
            Ok(())
        })?;
        Ok(hash)
    }

    async fn coverage_pool(&self, provider: Address) -> Result<Address, AppError> {
        match self.lock().contract(provider)? {
            DevContract::AddressesProvider { coverage_pool, .. } => {
                Ok(coverage_pool.unwrap_or(Address::ZERO))
            }
            _ => Err(unexpected_selector(provider)),
        }
    }

    async fn lending_pool_configurator(&self, provider: Address) -> Result<Address, AppError> {
        match self.lock().contract(provider)? {
            DevContract::AddressesProvider { configurator, .. } => {
                Ok(configurator.unwrap_or(Address::ZERO))
            }
            _ => Err(unexpected_selector(provider)),
        }
    }

    async fn set_pool_pause(
        &self,
        from: Address,
        configurator: Address,
        paused: bool,
    ) -> Result<B256, AppError> {
        let (_, hash) = self.transact(from, U256::ZERO, |state| {
            let provider = match state.contract(configurator)? {
                DevContract::Configurator { provider, .. } => *provider,
                _ => return Err(unexpected_selector(configurator)),
            };
            let (_, emergency_admin) = state.provider_admins(provider)?;
            if from != emergency_admin {
                return Err(AppError::Reverted(LPC_CALLER_NOT_EMERGENCY_ADMIN.into()));
            }
            if let DevContract::Configurator { paused: slot, .. } = state.contract_mut(configurator)? {
                *slot = paused;
            }
            Ok(())
        })?;
        Ok(hash)
    }

    async fn deposit_eth(
        &self,
        from: Address,
        gateway: Address,
        lending_pool: Address,
        on_behalf_of: Address,
        _referral_code: u16,
        value: U256,
    ) -> Result<B256, AppError> {
        let (_, hash) = self.transact(from, value, |state| {
            if !matches!(state.contract(gateway)?, DevContract::WethGateway) {
                return Err(unexpected_selector(gateway));
            }
            match state.contract_mut(lending_pool)? {
                DevContract::LendingPool { deposits } => {
                    *deposits.entry(on_behalf_of).or_default() += value;
                    Ok(())
                }
                _ => Err(unexpected_selector(lending_pool)),
            }
        })?;
        Ok(hash)
    }

    async fn value_of_token(
        &self,
        pool: Address,
        _token: Address,
        _index: U256,
    ) -> Result<U256, AppError> {
        // No bond pricing is modelled; every token is worth nothing.
        match self.lock().contract(pool)? {
            DevContract::CoveragePoolProxy { .. } | DevContract::CoveragePoolImpl => Ok(U256::ZERO),
            _ => Err(unexpected_selector(pool)),
        }
    }

    async fn initialize_bond(
        &self,
        from: Address,
        pool: Address,
        asset: Address,
        bond: Address,
    ) -> Result<B256, AppError> {
        let (_, hash) = self.transact(from, U256::ZERO, |state| {
            let provider = match state.contract(pool)? {
                DevContract::CoveragePoolProxy { provider, .. } => *provider,
                _ => return Err(unexpected_selector(pool)),
            };
            let (pool_admin, _) = state.provider_admins(provider)?;
            if from != pool_admin {
                return Err(AppError::Reverted(CALLER_NOT_POOL_ADMIN.into()));
            }
            if let DevContract::CoveragePoolProxy { bonds, .. } = state.contract_mut(pool)? {
                bonds.push((asset, bond));
            }
            Ok(())
        })?;
        Ok(hash)
    }
}
