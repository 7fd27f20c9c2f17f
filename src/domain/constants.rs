// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};
use std::fmt;

pub const ZERO_ADDRESS: Address = Address::ZERO;

// =============================================================================
// CONTRACT IDS
// =============================================================================

/// Logical contract names used as registry keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractId {
    LendingPoolAddressesProvider,
    LendingPoolConfigurator,
    LendingPool,
    CoveragePool,
    CoveragePoolImpl,
    WethGateway,
}

impl ContractId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractId::LendingPoolAddressesProvider => "LendingPoolAddressesProvider",
            ContractId::LendingPoolConfigurator => "LendingPoolConfigurator",
            ContractId::LendingPool => "LendingPool",
            ContractId::CoveragePool => "CoveragePool",
            ContractId::CoveragePoolImpl => "CoveragePoolImpl",
            ContractId::WethGateway => "WETHGateway",
        }
    }

    /// Artifact file stem holding the bytecode for this id.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ContractId::CoveragePool | ContractId::CoveragePoolImpl => "CoveragePool",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PROTOCOL ERRORS
// =============================================================================

/// 'The caller must be the pool admin'
pub const CALLER_NOT_POOL_ADMIN: &str = "33";
/// 'The caller must be the emergency admin'
pub const LPC_CALLER_NOT_EMERGENCY_ADMIN: &str = "76";
pub const OWNABLE_CALLER_NOT_OWNER: &str = "Ownable: caller is not the owner";

// =============================================================================
// NETWORK DEFAULTS
// =============================================================================

pub const DEFAULT_NETWORK: &str = "hardhat";

/// Address providers targeted by the external admin tasks. Empty means not deployed.
pub const LENDING_POOL_ADDRESS_PROVIDER: [(&str, &str); 2] = [
    ("main", ""),
    ("kovan", "0x9BF95C16b5698b3EeC6cC0d33728fAB40c691bd1"),
];

// WETH gateway deposit defaults (kovan deployment)
pub const DEFAULT_WETH_GATEWAY: Address = address!("cD34503e5fD5Ff9bC370679a92ad26011bC7cd9F");
pub const DEFAULT_LENDING_POOL: Address = address!("10DcdCAfA77CB47C8b2a496E4Ec264F96B729923");
pub const DEFAULT_ON_BEHALF_OF: Address = address!("163e23Ea39BEB535b038E009b1C3966805f8c0BC");
pub const DEFAULT_DEPOSIT_ETH: &str = "0.5";

pub const TENDERLY_DASHBOARD: &str = "https://dashboard.tenderly.co";
