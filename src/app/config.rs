// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::data_path::{resolve_data_path, resolve_required_data_path};
use crate::common::parsing::parse_address_field;
use crate::domain::constants::DEFAULT_NETWORK;
use crate::domain::error::AppError;
use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_false")]
    pub debug: bool,
    #[serde(default = "default_false")]
    pub log_json: bool,
    #[serde(default = "default_network")]
    pub network: String,
    pub data_dir: Option<String>,

    // Identity
    /// Private keys; the first one is the deployer.
    #[serde(default, deserialize_with = "deserialize_key_list")]
    pub wallet_keys: Vec<String>,

    // Endpoints
    pub rpc_urls: Option<HashMap<String, String>>,

    // Files
    pub registry_path: Option<String>,
    pub artifacts_dir: Option<String>,

    // Per-network address overrides
    pub addresses_providers: Option<HashMap<String, String>>,
    pub emergency_admins: Option<HashMap<String, String>>,

    // Tenderly fork diagnostics
    pub tenderly_username: Option<String>,
    pub tenderly_project: Option<String>,
    pub tenderly_fork_id: Option<String>,
    pub tenderly_head_id: Option<String>,

    // Confirmation
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
    #[serde(default = "default_receipt_confirm_blocks")]
    pub receipt_confirm_blocks: u64,
}

// Defaults
fn default_false() -> bool {
    false
}
fn default_network() -> String {
    DEFAULT_NETWORK.to_string()
}
fn default_receipt_poll_ms() -> u64 {
    500
}
fn default_receipt_timeout_ms() -> u64 {
    120_000
}
fn default_receipt_confirm_blocks() -> u64 {
    1
}

const DEFAULT_REGISTRY_FILE: &str = "deployed-contracts.json";
const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

fn deserialize_key_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{SeqAccess, Visitor};
    use std::fmt;

    struct KeyVisitor;

    impl<'de> Visitor<'de> for KeyVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a sequence of private keys or a comma-separated string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(split_key_list(v))
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut out = Vec::new();
            while let Some(elem) = seq.next_element::<String>()? {
                let trimmed = elem.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(KeyVisitor)
}

fn split_key_list(raw: &str) -> Vec<String> {
    raw.trim_matches(|c| c == '`' || c == '"' || c == '\'')
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let selected_config = resolve_config_path(path);
        let mut builder = Config::builder();

        if let Some(ref selected_path) = selected_config {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Precedence: CLI (in main) > env/.env > selected profile file.
        builder = builder.add_source(Environment::default());

        let mut settings: GlobalSettings = builder.build()?.try_deserialize()?;

        // Env lists arrive as plain strings; normalize them the same way as file values.
        if let Ok(keys) = std::env::var("WALLET_KEYS") {
            settings.wallet_keys = split_key_list(&keys);
        }
        if settings.network.trim().is_empty() {
            return Err(AppError::Config("NETWORK is empty".to_string()));
        }
        settings.network = settings.network.trim().to_string();

        Ok(settings)
    }

    fn data_dir_value(&self) -> Option<String> {
        std::env::var("DATA_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.data_dir
                    .as_ref()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
    }

    fn resolve_path_setting(
        &self,
        configured: Option<&str>,
        default_path: &str,
        required: bool,
    ) -> Result<String, AppError> {
        let raw = configured
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_path);
        let data_dir = self.data_dir_value();
        let resolved = if required {
            resolve_required_data_path(raw, data_dir.as_deref())?
        } else {
            resolve_data_path(raw, data_dir.as_deref())
        };
        Ok(resolved.to_string_lossy().to_string())
    }

    /// Registry file; created on first write, so it need not exist yet.
    pub fn registry_path(&self) -> Result<String, AppError> {
        self.resolve_path_setting(self.registry_path.as_deref(), DEFAULT_REGISTRY_FILE, false)
    }

    pub fn artifacts_dir(&self) -> Result<String, AppError> {
        self.resolve_path_setting(self.artifacts_dir.as_deref(), DEFAULT_ARTIFACTS_DIR, true)
    }

    /// RPC endpoint for `network`: config map first, then `RPC_URL_<NETWORK>`.
    pub fn rpc_url_for(&self, network: &str) -> Result<String, AppError> {
        if let Some(url) = self
            .rpc_urls
            .as_ref()
            .and_then(|m| m.get(network))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
        {
            return Ok(url.to_string());
        }
        let env_key = format!("RPC_URL_{}", network.to_ascii_uppercase().replace('-', "_"));
        if let Ok(url) = std::env::var(&env_key)
            && !url.trim().is_empty()
        {
            return Ok(url.trim().to_string());
        }
        Err(AppError::Config(format!(
            "No RPC URL configured for network '{network}' (set rpc_urls.{network} or {env_key})"
        )))
    }

    pub fn addresses_provider_override(&self, network: &str) -> Result<Option<Address>, AppError> {
        match self
            .addresses_providers
            .as_ref()
            .and_then(|m| m.get(network))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
        {
            Some(raw) => Ok(Some(parse_address_field("addresses_providers", raw)?)),
            None => Ok(None),
        }
    }

    pub fn emergency_admin_map(&self) -> Result<HashMap<String, Address>, AppError> {
        parse_address_map(self.emergency_admins.as_ref(), "emergency_admins")
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms.max(100))
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms.max(100))
    }

    pub fn receipt_confirm_blocks_value(&self) -> u64 {
        self.receipt_confirm_blocks.max(1)
    }
}

fn resolve_config_path(path: Option<&str>) -> Option<String> {
    if let Some(path) = path {
        return Some(path.to_string());
    }
    detect_active_config_file()
}

fn detect_active_config_file() -> Option<String> {
    let priority_files = [
        "config.main.toml",
        "config.kovan.toml",
        "config.dev.toml",
        "config.toml",
    ];

    for file in priority_files.iter() {
        if let Some(true) = config_has_active_flag(file) {
            return Some((*file).to_string());
        }
    }

    // Fallback: scan current dir for config.*.toml with THIS_ACTIVE = true
    if let Ok(entries) = fs::read_dir(".") {
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && name.starts_with("config.")
                && name.ends_with(".toml")
                && let Some(true) = config_has_active_flag(name)
            {
                return Some(name.to_string());
            }
        }
    }

    None
}

fn config_has_active_flag(path: &str) -> Option<bool> {
    let p = Path::new(path);
    if !p.exists() {
        return None;
    }

    Config::builder()
        .add_source(File::from(p))
        .build()
        .ok()?
        .get_bool("THIS_ACTIVE")
        .ok()
}

fn parse_address_map(
    raw: Option<&HashMap<String, String>>,
    field: &str,
) -> Result<HashMap<String, Address>, AppError> {
    let mut out = HashMap::new();
    let Some(raw) = raw else {
        return Ok(out);
    };
    for (network, value) in raw {
        if value.trim().is_empty() {
            continue;
        }
        out.insert(network.clone(), parse_address_field(field, value)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn base_settings() -> GlobalSettings {
        GlobalSettings {
            debug: default_false(),
            log_json: default_false(),
            network: default_network(),
            data_dir: None,
            wallet_keys: Vec::new(),
            rpc_urls: None,
            registry_path: None,
            artifacts_dir: None,
            addresses_providers: None,
            emergency_admins: None,
            tenderly_username: None,
            tenderly_project: None,
            tenderly_fork_id: None,
            tenderly_head_id: None,
            receipt_poll_ms: default_receipt_poll_ms(),
            receipt_timeout_ms: default_receipt_timeout_ms(),
            receipt_confirm_blocks: default_receipt_confirm_blocks(),
        }
    }

    fn temp_config(tag: &str, body: &str) -> std::path::PathBuf {
        let tmp = std::env::temp_dir().join(format!(
            "config-{tag}-{}-{}.toml",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        std::fs::write(&tmp, body).expect("write temp config");
        tmp
    }

    #[test]
    fn key_list_splits_commas_and_whitespace() {
        assert_eq!(
            split_key_list("\"0xaa, 0xbb 0xcc\""),
            vec!["0xaa".to_string(), "0xbb".to_string(), "0xcc".to_string()]
        );
        assert!(split_key_list(" , ").is_empty());
    }

    #[test]
    fn rpc_url_prefers_config_map_then_env() {
        let _env_lock = env_lock_guard();
        let mut settings = base_settings();
        settings.rpc_urls = Some(HashMap::from([(
            "kovan".to_string(),
            "http://kovan.example".to_string(),
        )]));
        assert_eq!(settings.rpc_url_for("kovan").unwrap(), "http://kovan.example");

        unsafe { std::env::set_var("RPC_URL_TENDERLY_MAIN", "http://fork.example") };
        assert_eq!(
            settings.rpc_url_for("tenderly-main").unwrap(),
            "http://fork.example"
        );
        unsafe { std::env::remove_var("RPC_URL_TENDERLY_MAIN") };

        let err = settings.rpc_url_for("ropsten").unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("ropsten")));
    }

    #[test]
    fn addresses_provider_override_is_validated() {
        let mut settings = base_settings();
        settings.addresses_providers = Some(HashMap::from([
            (
                "kovan".to_string(),
                "0x9BF95C16b5698b3EeC6cC0d33728fAB40c691bd1".to_string(),
            ),
            ("main".to_string(), "not-an-address".to_string()),
        ]));
        assert!(settings.addresses_provider_override("kovan").unwrap().is_some());
        assert!(settings.addresses_provider_override("hardhat").unwrap().is_none());
        assert!(matches!(
            settings.addresses_provider_override("main"),
            Err(AppError::InvalidAddress(_))
        ));
    }

    #[test]
    fn emergency_admin_map_skips_blank_entries() {
        let mut settings = base_settings();
        settings.emergency_admins = Some(HashMap::from([
            ("main".to_string(), String::new()),
            (
                "kovan".to_string(),
                "0x0000000000000000000000000000000000000001".to_string(),
            ),
        ]));
        let map = settings.emergency_admin_map().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("kovan"));
    }

    #[test]
    fn receipt_tuning_values_have_safe_floor() {
        let mut settings = base_settings();
        settings.receipt_poll_ms = 0;
        settings.receipt_timeout_ms = 1;
        settings.receipt_confirm_blocks = 0;
        assert_eq!(settings.receipt_poll_interval(), Duration::from_millis(100));
        assert_eq!(settings.receipt_timeout(), Duration::from_millis(100));
        assert_eq!(settings.receipt_confirm_blocks_value(), 1);
    }

    #[test]
    fn registry_path_resolves_against_data_dir() {
        let _env_lock = env_lock_guard();
        unsafe { std::env::remove_var("DATA_DIR") };
        let mut settings = base_settings();
        let dir = std::env::temp_dir();
        settings.data_dir = Some(dir.to_string_lossy().to_string());
        assert_eq!(
            settings.registry_path().unwrap(),
            dir.join("deployed-contracts.json").to_string_lossy()
        );
    }

    #[test]
    fn explicit_config_path_wins_over_active_discovery() {
        let resolved = resolve_config_path(Some("custom-config.toml"));
        assert_eq!(resolved.as_deref(), Some("custom-config.toml"));
    }

    #[test]
    fn file_values_load_with_defaults() {
        let _env_lock = env_lock_guard();
        unsafe {
            std::env::remove_var("NETWORK");
            std::env::remove_var("WALLET_KEYS");
        }
        let tmp = temp_config(
            "file-values",
            r#"
network = "kovan"
wallet_keys = ["0x01", "0x02"]

[rpc_urls]
kovan = "http://127.0.0.1:8545"
"#,
        );
        let loaded = GlobalSettings::load_with_path(Some(tmp.to_str().expect("utf8 path")))
            .expect("load settings");
        std::fs::remove_file(&tmp).ok();

        assert_eq!(loaded.network, "kovan");
        assert_eq!(loaded.wallet_keys, vec!["0x01", "0x02"]);
        assert_eq!(loaded.receipt_poll_ms, default_receipt_poll_ms());
        assert_eq!(loaded.rpc_url_for("kovan").unwrap(), "http://127.0.0.1:8545");
    }

    #[test]
    fn env_overrides_selected_profile_file_values() {
        let _env_lock = env_lock_guard();
        let tmp = temp_config(
            "env-override",
            r#"
network = "kovan"
wallet_keys = ["0x01"]
"#,
        );
        let old_network = std::env::var("NETWORK").ok();
        let old_keys = std::env::var("WALLET_KEYS").ok();
        unsafe {
            std::env::set_var("NETWORK", "main");
            std::env::set_var("WALLET_KEYS", "0xaa,0xbb");
        }

        let loaded = GlobalSettings::load_with_path(Some(tmp.to_str().expect("utf8 path")))
            .expect("load settings");
        assert_eq!(loaded.network, "main");
        assert_eq!(loaded.wallet_keys, vec!["0xaa", "0xbb"]);

        std::fs::remove_file(&tmp).ok();
        match old_network {
            Some(v) => unsafe { std::env::set_var("NETWORK", v) },
            None => unsafe { std::env::remove_var("NETWORK") },
        }
        match old_keys {
            Some(v) => unsafe { std::env::set_var("WALLET_KEYS", v) },
            None => unsafe { std::env::remove_var("WALLET_KEYS") },
        }
    }
}
