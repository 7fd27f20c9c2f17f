// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::constants::ContractId;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployer: Option<Address>,
}

/// contract name -> network -> entry
type RegistryFile = BTreeMap<String, BTreeMap<String, RegistryEntry>>;

/// Deployed-contract address book, one entry per (contract, network).
///
/// Entries are overwritten on redeploy and never removed. File-backed registries
/// persist after every insert; in-memory ones (dry runs) never touch disk.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    path: Option<PathBuf>,
    entries: RegistryFile,
}

impl ContractRegistry {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RegistryFile::new(),
        }
    }

    /// Open a file-backed registry. A missing file is an empty registry.
    pub fn load_from_file(path: &str) -> Result<Self, AppError> {
        let p = Path::new(path);
        let entries = if p.exists() {
            let raw = fs::read_to_string(p)
                .map_err(|e| AppError::Config(format!("Failed to read registry {}: {e}", path)))?;
            if raw.trim().is_empty() {
                RegistryFile::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| {
                    AppError::Config(format!("Failed to parse registry {}: {e}", path))
                })?
            }
        } else {
            tracing::debug!(target: "registry", path, "Registry file not found; starting empty");
            RegistryFile::new()
        };

        Ok(Self {
            path: Some(p.to_path_buf()),
            entries,
        })
    }

    pub fn get(&self, id: ContractId, network: &str) -> Option<RegistryEntry> {
        self.entries
            .get(id.as_str())
            .and_then(|by_network| by_network.get(network))
            .copied()
    }

    pub fn address(&self, id: ContractId, network: &str) -> Option<Address> {
        self.get(id, network).map(|e| e.address)
    }

    pub fn require_address(&self, id: ContractId, network: &str) -> Result<Address, AppError> {
        self.address(id, network).ok_or_else(|| {
            let location = self
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "in-memory registry".to_string());
            AppError::Config(format!(
                "{id} is not registered for network '{network}' in {location}"
            ))
        })
    }

    /// Record a confirmed deployment and persist it.
    pub fn insert(
        &mut self,
        id: ContractId,
        network: &str,
        address: Address,
        deployer: Option<Address>,
    ) -> Result<(), AppError> {
        let previous = self
            .entries
            .entry(id.as_str().to_string())
            .or_default()
            .insert(network.to_string(), RegistryEntry { address, deployer });

        match previous {
            Some(old) if old.address != address => tracing::info!(
                target: "registry",
                contract = %id,
                network,
                old = %format!("{:#x}", old.address),
                new = %format!("{:#x}", address),
                "Registry entry replaced"
            ),
            _ => tracing::info!(
                target: "registry",
                contract = %id,
                network,
                address = %format!("{:#x}", address),
                "Registry entry recorded"
            ),
        }

        self.persist()
    }

    /// All entries for `network`, sorted by contract name.
    pub fn entries_for(&self, network: &str) -> Vec<(String, RegistryEntry)> {
        self.entries
            .iter()
            .filter_map(|(name, by_network)| by_network.get(network).map(|e| (name.clone(), *e)))
            .collect()
    }

    fn persist(&self) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let body = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| AppError::Initialization(format!("Registry encode failed: {e}")))?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Initialization(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        // Write-then-rename so a crash never leaves a truncated registry behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| {
            AppError::Initialization(format!("Failed to write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, path).map_err(|e| {
            AppError::Initialization(format!("Failed to replace {}: {e}", path.display()))
        })?;
        Ok(())
    }
}
