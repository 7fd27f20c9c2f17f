// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use coverage_deployer::app::config::GlobalSettings;
use coverage_deployer::app::logging::setup_logging;
use coverage_deployer::common::parsing::parse_ether_amount;
use coverage_deployer::data::artifacts::ArtifactRegistry;
use coverage_deployer::data::registry::ContractRegistry;
use coverage_deployer::domain::constants::{
    DEFAULT_DEPOSIT_ETH, DEFAULT_LENDING_POOL, DEFAULT_ON_BEHALF_OF, DEFAULT_WETH_GATEWAY,
};
use coverage_deployer::domain::error::AppError;
use coverage_deployer::domain::pool::ConfigNames;
use std::str::FromStr;
use coverage_deployer::network::ProtocolChain;
use coverage_deployer::network::devnet::{DevChain, DevDeployment};
use coverage_deployer::network::rpc::{ReceiptPolicy, RpcChain};
use coverage_deployer::tasks::deploy_coverage_pool::{
    DeployCoveragePoolArgs, dev_deploy_coverage_pool, full_deploy_coverage_pool,
};
use coverage_deployer::tasks::deposit_eth::{DepositEthArgs, deposit_eth};
use coverage_deployer::tasks::enable_lending_pool::{EnableLendingPoolArgs, enable_lending_pool};
use coverage_deployer::tasks::tenderly::TenderlyFork;

#[derive(Parser, Debug)]
#[command(author, version, about = "Coverage pool deployment tasks")]
struct Cli {
    /// Path to config file (default: active config.*.toml or config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Network to run against (overrides config/env)
    #[arg(long, global = true)]
    network: Option<String>,

    /// Run against an in-process dev chain; nothing is broadcast or persisted
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,

    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Deploy coverage pool for dev enviroment
    #[command(name = "dev:deploy-coverage-pool")]
    DevDeployCoveragePool {
        /// Verify contracts at Etherscan
        #[arg(long, default_value_t = false)]
        verify: bool,
        #[arg(long, help = format!("Pool name to retrieve configuration, supported: {}", ConfigNames::supported()))]
        pool: Option<String>,
    },

    /// Deploy coverage pool for full enviroment
    #[command(name = "full:deploy-coverage-pool")]
    FullDeployCoveragePool {
        /// Verify contracts at Etherscan
        #[arg(long, default_value_t = false)]
        verify: bool,
    },

    /// Enable or pause lending pool from operation. Emergency admin only.
    #[command(name = "external:enable-lending-pool")]
    EnableLendingPool {
        /// Pause instead of enabling
        #[arg(long, default_value_t = false)]
        pause: bool,
    },

    /// Deposit ETH into the lending pool through the WETH gateway
    #[command(name = "interact:deposit-eth")]
    DepositEth {
        #[arg(long)]
        gateway: Option<Address>,
        #[arg(long)]
        lending_pool: Option<Address>,
        #[arg(long)]
        on_behalf_of: Option<Address>,
        /// Amount in ether
        #[arg(long, default_value = DEFAULT_DEPOSIT_ETH, value_parser = parse_ether_amount)]
        amount: U256,
        #[arg(long, default_value_t = 0)]
        referral: u16,
    },
}

impl Task {
    /// Argument checks that need no chain, registry or artifacts.
    fn validate(&self) -> Result<(), AppError> {
        if let Task::DevDeployCoveragePool {
            pool: Some(pool), ..
        } = self
        {
            ConfigNames::from_str(pool)?;
        }
        Ok(())
    }

    fn needs_artifacts(&self) -> bool {
        matches!(
            self,
            Task::DevDeployCoveragePool { .. } | Task::FullDeployCoveragePool { .. }
        )
    }
}

fn addresses_provider_for(
    settings: &GlobalSettings,
    network: &str,
    dev_market: Option<DevDeployment>,
) -> Result<Option<Address>, AppError> {
    match dev_market {
        Some(market) => Ok(Some(market.addresses_provider)),
        None => settings.addresses_provider_override(network),
    }
}

async fn run_task<C: ProtocolChain>(
    chain: &C,
    registry: &mut ContractRegistry,
    settings: &GlobalSettings,
    dev_market: Option<DevDeployment>,
    task: Task,
) -> Result<(), AppError> {
    let network = chain.network().to_string();

    match task {
        Task::DevDeployCoveragePool { verify, pool } => {
            let args = DeployCoveragePoolArgs {
                verify,
                pool,
                addresses_provider: addresses_provider_for(settings, &network, dev_market)?,
            };
            dev_deploy_coverage_pool(chain, registry, &args).await?;
        }
        Task::FullDeployCoveragePool { verify } => {
            let args = DeployCoveragePoolArgs {
                verify,
                pool: None,
                addresses_provider: addresses_provider_for(settings, &network, dev_market)?,
            };
            let fork = TenderlyFork::from_settings(settings);
            full_deploy_coverage_pool(chain, registry, &args, fork.as_ref()).await?;
        }
        Task::EnableLendingPool { pause } => {
            let args = EnableLendingPoolArgs {
                paused: pause,
                addresses_provider: addresses_provider_for(settings, &network, dev_market)?,
                emergency_admins: settings.emergency_admin_map()?,
            };
            enable_lending_pool(chain, &args).await?;
        }
        Task::DepositEth {
            gateway,
            lending_pool,
            on_behalf_of,
            amount,
            referral,
        } => {
            let (default_gateway, default_pool) = match dev_market {
                Some(market) => (market.weth_gateway, market.lending_pool),
                None => (DEFAULT_WETH_GATEWAY, DEFAULT_LENDING_POOL),
            };
            let args = DepositEthArgs {
                gateway: gateway.unwrap_or(default_gateway),
                lending_pool: lending_pool.unwrap_or(default_pool),
                on_behalf_of: on_behalf_of.unwrap_or(DEFAULT_ON_BEHALF_OF),
                amount,
                referral_code: referral,
            };
            deposit_eth(chain, &args).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    if let Some(network) = cli.network.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        settings.network = network.to_string();
    }
    setup_logging(if settings.debug { "debug" } else { "info" }, settings.log_json);

    cli.task.validate()?;

    let network = settings.network.clone();
    if cli.dry_run {
        tracing::info!(target: "config", network = %network, "Dry run on in-process dev chain");
        let (chain, market) = DevChain::bootstrap(&network, 4)?;
        let mut registry = ContractRegistry::in_memory();
        for (id, address) in market.entries() {
            registry.insert(id, &network, address, chain.signers().first().copied())?;
        }
        run_task(&chain, &mut registry, &settings, Some(market), cli.task).await?;
        for (name, entry) in registry.entries_for(&network) {
            tracing::info!(target: "registry", contract = %name, address = %format!("{:#x}", entry.address), "Dry-run registry");
        }
        return Ok(());
    }

    let registry_path = settings.registry_path()?;
    let mut registry = ContractRegistry::load_from_file(&registry_path)?;
    tracing::debug!(target: "registry", path = %registry_path, "Registry opened");

    let mut artifacts = ArtifactRegistry::new();
    if cli.task.needs_artifacts() {
        let dir = settings.artifacts_dir()?;
        let loaded = artifacts.load_from_directory(&dir)?;
        tracing::info!(target: "config", dir = %dir, loaded, "Artifacts loaded");
    }

    let rpc_url = settings.rpc_url_for(&network)?;
    let receipts = ReceiptPolicy {
        poll_interval: settings.receipt_poll_interval(),
        timeout: settings.receipt_timeout(),
        confirmations: settings.receipt_confirm_blocks_value(),
    };
    let chain = RpcChain::connect(&network, &rpc_url, &settings.wallet_keys, artifacts, receipts).await?;

    run_task(&chain, &mut registry, &settings, None, cli.task).await
}
