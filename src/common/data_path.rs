// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::error::AppError;
use std::path::{Path, PathBuf};

const DATA_DIR_ENV: &str = "DATA_DIR";

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

fn env_data_dir() -> Option<String> {
    std::env::var(DATA_DIR_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Directory relative paths are anchored to: explicit value, then `DATA_DIR`,
/// then the working directory.
pub fn resolve_data_dir(explicit_data_dir: Option<&str>) -> PathBuf {
    match non_empty(explicit_data_dir).or_else(env_data_dir) {
        Some(dir) => absolute(PathBuf::from(dir)),
        None => absolute(PathBuf::from(".")),
    }
}

/// Resolve a path that may be absolute or relative to the data directory.
pub fn resolve_data_path(raw_path: &str, explicit_data_dir: Option<&str>) -> PathBuf {
    let as_path = Path::new(raw_path.trim());
    if as_path.is_absolute() {
        return as_path.to_path_buf();
    }
    resolve_data_dir(explicit_data_dir).join(as_path)
}

pub fn resolve_required_data_path(
    raw_path: &str,
    explicit_data_dir: Option<&str>,
) -> Result<PathBuf, AppError> {
    let resolved = resolve_data_path(raw_path, explicit_data_dir);
    if resolved.exists() {
        return Ok(resolved);
    }
    Err(AppError::Config(format!(
        "expected at {}; set DATA_DIR",
        resolved.display()
    )))
}
