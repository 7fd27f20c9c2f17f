// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use alloy::primitives::Address;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Named market configurations a task can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigNames {
    Commons,
    Aave,
    Matic,
    Amm,
}

impl ConfigNames {
    pub const ALL: [ConfigNames; 4] = [
        ConfigNames::Commons,
        ConfigNames::Aave,
        ConfigNames::Matic,
        ConfigNames::Amm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigNames::Commons => "Commons",
            ConfigNames::Aave => "Aave",
            ConfigNames::Matic => "Matic",
            ConfigNames::Amm => "Amm",
        }
    }

    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(ConfigNames::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for ConfigNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigNames {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s.trim())
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Unsupported pool configuration: {}",
                    Self::supported()
                ))
            })
    }
}

#[derive(Debug, Clone)]
pub struct PoolConfiguration {
    pub name: ConfigNames,
    pub market_id: &'static str,
    pub emergency_admin_index: usize,
    /// Explicit emergency admins per network; the signer index is used when absent.
    pub emergency_admin: HashMap<String, Address>,
}

impl PoolConfiguration {
    fn base(name: ConfigNames, market_id: &'static str) -> Self {
        Self {
            name,
            market_id,
            emergency_admin_index: 1,
            emergency_admin: HashMap::new(),
        }
    }

    pub fn with_emergency_admins(mut self, admins: HashMap<String, Address>) -> Self {
        self.emergency_admin.extend(admins);
        self
    }

    /// Emergency admin for `network`: explicit entry first, then the signer at the
    /// configured index.
    pub fn emergency_admin_for(
        &self,
        network: &str,
        signers: &[Address],
    ) -> Result<Address, AppError> {
        if let Some(addr) = self.emergency_admin.get(network)
            && !addr.is_zero()
        {
            return Ok(*addr);
        }
        let index = self.emergency_admin_index;
        signers.get(index).copied().ok_or_else(|| AppError::Validation {
            field: "emergency_admin".to_string(),
            message: format!(
                "no explicit address for network '{network}' and only {} signer(s) available (index {index})",
                signers.len()
            ),
        })
    }
}

pub fn load_pool_config(name: ConfigNames) -> PoolConfiguration {
    match name {
        ConfigNames::Commons => PoolConfiguration::base(name, "Commons"),
        ConfigNames::Aave => PoolConfiguration::base(name, "Aave genesis market"),
        ConfigNames::Amm => PoolConfiguration::base(name, "Aave AMM market"),
        ConfigNames::Matic => PoolConfiguration::base(name, "Matic Market"),
    }
}

/// Parse and load in one step; the error lists the supported names.
pub fn load_pool_config_by_name(raw: &str) -> Result<PoolConfiguration, AppError> {
    Ok(load_pool_config(ConfigNames::from_str(raw)?))
}
