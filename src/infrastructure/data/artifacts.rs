// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::common::parsing::strip_0x;
use alloy::primitives::Bytes;
use alloy_json_abi::JsonAbi;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Hardhat artifact layout; other keys are ignored. Files lacking `abi` or
/// `bytecode` (build-info, debug metadata) are not artifacts.
#[derive(Deserialize)]
struct HardhatArtifact {
    #[serde(rename = "contractName")]
    contract_name: Option<String>,
    abi: Option<JsonAbi>,
    bytecode: Option<String>,
}

const BUILD_INFO_DIR: &str = "build-info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bytecode {
    Ready(Bytes),
    /// Library placeholders (`__$<hash>$__`) are still present.
    Unlinked,
}

#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub abi: JsonAbi,
    pub bytecode: Bytecode,
}

impl ContractArtifact {
    /// Creation code, provided the artifact can be deployed as-is.
    pub fn creation_code(&self, name: &str) -> Result<&Bytes, AppError> {
        let code = match &self.bytecode {
            Bytecode::Unlinked => {
                return Err(AppError::Config(format!(
                    "Artifact {name} has unlinked library references"
                )));
            }
            Bytecode::Ready(code) if code.is_empty() => {
                return Err(AppError::Config(format!(
                    "Artifact {name} has no bytecode (interface or abstract contract?)"
                )));
            }
            Bytecode::Ready(code) => code,
        };
        if let Some(ctor) = self.abi.constructor()
            && !ctor.inputs.is_empty()
        {
            return Err(AppError::Config(format!(
                "Artifact {name} constructor takes {} argument(s); only argument-free deployments are supported",
                ctor.inputs.len()
            )));
        }
        Ok(code)
    }
}

fn decode_bytecode(name: &str, raw: &str) -> Result<Bytecode, AppError> {
    let raw = raw.trim();
    if raw.contains("__") {
        return Ok(Bytecode::Unlinked);
    }
    hex::decode(strip_0x(raw))
        .map(|code| Bytecode::Ready(code.into()))
        .map_err(|e| AppError::Config(format!("Invalid bytecode in artifact {}: {}", name, e)))
}

#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    artifacts: HashMap<String, ContractArtifact>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` artifact under `dir_path`, recursing into `X.sol/` folders.
    /// Returns how many artifacts were registered.
    pub fn load_from_directory(&mut self, dir_path: &str) -> Result<usize, AppError> {
        let path = Path::new(dir_path);
        if !path.exists() {
            return Err(AppError::Config(format!(
                "Artifacts directory not found: {}",
                dir_path
            )));
        }
        let before = self.artifacts.len();
        self.load_dir(path)?;
        Ok(self.artifacts.len() - before)
    }

    fn load_dir(&mut self, dir: &Path) -> Result<(), AppError> {
        for entry in fs::read_dir(dir).map_err(|e| AppError::Initialization(e.to_string()))? {
            let entry = entry.map_err(|e| AppError::Initialization(e.to_string()))?;
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };

            if path.is_dir() {
                if file_name == BUILD_INFO_DIR {
                    tracing::debug!(target: "artifacts", dir = %path.display(), "Skipping build-info");
                    continue;
                }
                self.load_dir(&path)?;
                continue;
            }
            if !file_name.ends_with(".json") || file_name.ends_with(".dbg.json") {
                continue;
            }
            let file_stem = file_name.trim_end_matches(".json").to_string();

            let file_content = fs::read_to_string(&path).map_err(|e| {
                AppError::Config(format!("Failed to read artifact {}: {}", file_stem, e))
            })?;
            let artifact: HardhatArtifact = serde_json::from_str(&file_content).map_err(|e| {
                AppError::Config(format!("Failed to parse artifact {}: {}", file_stem, e))
            })?;
            let (Some(abi), Some(raw_bytecode)) = (artifact.abi, artifact.bytecode) else {
                tracing::debug!(target: "artifacts", file = %path.display(), "Not a contract artifact");
                continue;
            };

            let name = artifact.contract_name.unwrap_or(file_stem);
            let bytecode = decode_bytecode(&name, &raw_bytecode)?;
            match &bytecode {
                Bytecode::Ready(code) => {
                    tracing::debug!(target: "artifacts", contract = %name, bytes = code.len(), "Loaded artifact")
                }
                Bytecode::Unlinked => {
                    tracing::debug!(target: "artifacts", contract = %name, "Loaded artifact with unlinked libraries")
                }
            }
            self.artifacts.insert(name, ContractArtifact { abi, bytecode });
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ContractArtifact> {
        self.artifacts.get(name)
    }

    /// Creation code for `name`. Missing, unlinked, bytecode-less and
    /// constructor-argument artifacts are rejected here, not at load time.
    pub fn deployable(&self, name: &str) -> Result<&Bytes, AppError> {
        self.get(name)
            .ok_or_else(|| AppError::Config(format!("No artifact found for {name}")))?
            .creation_code(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_artifacts_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "artifacts-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::create_dir_all(dir.join("CoveragePool.sol")).unwrap();
        dir
    }

    #[test]
    fn loads_nested_hardhat_artifacts_and_skips_debug_files() {
        let dir = temp_artifacts_dir("nested");
        fs::write(
            dir.join("CoveragePool.sol").join("CoveragePool.json"),
            r#"{"contractName":"CoveragePool","abi":[],"bytecode":"0x6080604052"}"#,
        )
        .unwrap();
        fs::write(
            dir.join("CoveragePool.sol").join("CoveragePool.dbg.json"),
            r#"{"buildInfo":"../build-info/x.json"}"#,
        )
        .unwrap();
        fs::write(
            dir.join("ICoveragePool.json"),
            r#"{"contractName":"ICoveragePool","abi":[],"bytecode":"0x"}"#,
        )
        .unwrap();

        let mut registry = ArtifactRegistry::new();
        let loaded = registry
            .load_from_directory(dir.to_str().unwrap())
            .expect("load artifacts");
        fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded, 2);
        let code = registry.deployable("CoveragePool").expect("deployable");
        assert_eq!(code.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);

        let err = registry.deployable("ICoveragePool").unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("no bytecode")));
        assert!(registry.deployable("LendingPool").is_err());
    }

    #[test]
    fn build_info_and_non_artifact_json_are_skipped() {
        let dir = temp_artifacts_dir("build-info");
        fs::create_dir_all(dir.join("build-info")).unwrap();
        fs::write(
            dir.join("build-info").join("abc123.json"),
            r#"{"id":"abc123","_format":"hh-sol-build-info-1","solcVersion":"0.6.12","input":{},"output":{}}"#,
        )
        .unwrap();
        fs::write(dir.join("cache-manifest.json"), r#"{"files":{}}"#).unwrap();
        fs::write(
            dir.join("CoveragePool.sol").join("CoveragePool.json"),
            r#"{"contractName":"CoveragePool","abi":[],"bytecode":"0x60806040"}"#,
        )
        .unwrap();

        let mut registry = ArtifactRegistry::new();
        let loaded = registry
            .load_from_directory(dir.to_str().unwrap())
            .expect("load artifacts");
        fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded, 1);
        assert!(registry.deployable("CoveragePool").is_ok());
        assert!(registry.get("abc123").is_none());
    }

    #[test]
    fn unlinked_library_bytecode_only_fails_when_deployed() {
        let dir = temp_artifacts_dir("linked");
        fs::write(
            dir.join("LendingPool.json"),
            r#"{"contractName":"LendingPool","abi":[],"bytecode":"0x6080__$4c26be947d349222af871a3168b3fe584b$__6040"}"#,
        )
        .unwrap();
        fs::write(
            dir.join("CoveragePool.sol").join("CoveragePool.json"),
            r#"{"contractName":"CoveragePool","abi":[],"bytecode":"0x60806040"}"#,
        )
        .unwrap();

        let mut registry = ArtifactRegistry::new();
        registry
            .load_from_directory(dir.to_str().unwrap())
            .expect("load artifacts");
        fs::remove_dir_all(&dir).ok();

        assert_eq!(
            registry.get("LendingPool").map(|a| &a.bytecode),
            Some(&Bytecode::Unlinked)
        );
        let err = registry.deployable("LendingPool").unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("unlinked")));
        assert!(registry.deployable("CoveragePool").is_ok());
    }

    #[test]
    fn constructor_arguments_block_deployment() {
        let dir = temp_artifacts_dir("ctor");
        fs::write(
            dir.join("CoveragePool.sol").join("CoveragePool.json"),
            r#"{"contractName":"CoveragePool","abi":[{"type":"constructor","stateMutability":"nonpayable","inputs":[{"name":"provider","type":"address","internalType":"address"}]}],"bytecode":"0x60806040"}"#,
        )
        .unwrap();

        let mut registry = ArtifactRegistry::new();
        registry
            .load_from_directory(dir.to_str().unwrap())
            .expect("load artifacts");
        fs::remove_dir_all(&dir).ok();

        let err = registry.deployable("CoveragePool").unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("1 argument")));
    }

    #[test]
    fn garbage_bytecode_is_config_error() {
        let dir = temp_artifacts_dir("garbage");
        fs::write(
            dir.join("Broken.json"),
            r#"{"contractName":"Broken","abi":[],"bytecode":"0xzz"}"#,
        )
        .unwrap();

        let mut registry = ArtifactRegistry::new();
        let err = registry
            .load_from_directory(dir.to_str().unwrap())
            .unwrap_err();
        fs::remove_dir_all(&dir).ok();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("Broken")));
    }

    #[test]
    fn missing_directory_is_config_error() {
        let mut registry = ArtifactRegistry::new();
        let err = registry
            .load_from_directory("/nonexistent/artifacts")
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
