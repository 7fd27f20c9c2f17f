// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod chain;
pub mod devnet;
pub mod provider;
pub mod rpc;

pub use chain::{ConfirmedTx, ProtocolChain};
