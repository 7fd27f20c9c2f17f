// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::error::AppError;
use alloy::primitives::{Address, U256};
use alloy::primitives::utils::parse_ether;
use std::str::FromStr;

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn parse_address_hex(s: &str) -> Option<Address> {
    Address::from_str(strip_0x(s.trim())).ok()
}

/// Strict address parse for user-supplied values; empty strings are rejected.
pub fn parse_address_field(field: &str, raw: &str) -> Result<Address, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation {
            field: field.to_string(),
            message: "address is empty".into(),
        });
    }
    parse_address_hex(trimmed).ok_or_else(|| AppError::InvalidAddress(trimmed.to_string()))
}

pub fn parse_ether_amount(raw: &str) -> Result<U256, AppError> {
    parse_ether(raw.trim()).map_err(|e| AppError::Validation {
        field: "amount".into(),
        message: format!("invalid ether amount '{raw}': {e}"),
    })
}

/// Pull the revert reason out of a node error message, if it carries one.
///
/// Nodes phrase this differently: geth/anvil report `execution reverted: <reason>`,
/// hardhat reports `reverted with reason string '<reason>'`.
pub fn parse_revert_reason(message: &str) -> Option<String> {
    if let Some(idx) = message.find("reverted with reason string '") {
        let rest = &message[idx + "reverted with reason string '".len()..];
        let end = rest.find('\'').unwrap_or(rest.len());
        return Some(rest[..end].to_string());
    }
    if let Some(idx) = message.find("execution reverted") {
        let rest = message[idx + "execution reverted".len()..].trim_start_matches(':');
        let reason = rest
            .split(|c| c == ',' || c == '\n')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches('"');
        return Some(reason.to_string());
    }
    None
}
