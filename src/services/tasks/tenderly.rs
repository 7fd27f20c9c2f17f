// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::app::config::GlobalSettings;
use crate::domain::constants::TENDERLY_DASHBOARD;

/// Coordinates of a Tenderly fork, used to point at the failing simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenderlyFork {
    pub username: String,
    pub project: String,
    pub fork_id: String,
    pub head_id: String,
}

impl TenderlyFork {
    /// `None` unless every coordinate is configured.
    pub fn from_settings(settings: &GlobalSettings) -> Option<Self> {
        let pick = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };
        Some(Self {
            username: pick(&settings.tenderly_username)?,
            project: pick(&settings.tenderly_project)?,
            fork_id: pick(&settings.tenderly_fork_id)?,
            head_id: pick(&settings.tenderly_head_id)?,
        })
    }

    pub fn simulation_link(&self) -> String {
        format!(
            "{TENDERLY_DASHBOARD}/{}/{}/fork/{}/simulation/{}",
            self.username, self.project, self.fork_id, self.head_id
        )
    }
}

pub fn is_tenderly_network(network: &str) -> bool {
    network.contains("tenderly")
}

/// Log where to inspect a failed transaction when running on a Tenderly fork.
/// Returns the logged line, if any.
pub fn report_failure(network: &str, fork: Option<&TenderlyFork>) -> Option<String> {
    if !is_tenderly_network(network) {
        return None;
    }
    match fork {
        Some(fork) => {
            let line = format!("Check tx error: {}", fork.simulation_link());
            tracing::error!(target: "deploy", "{line}");
            Some(line)
        }
        None => {
            tracing::warn!(
                target: "deploy",
                network,
                "Task failed on a Tenderly fork but tenderly_* settings are incomplete"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_follows_dashboard_layout() {
        let fork = TenderlyFork {
            username: "aave".into(),
            project: "protocol-v2".into(),
            fork_id: "f0rk".into(),
            head_id: "h3ad".into(),
        };
        assert_eq!(
            fork.simulation_link(),
            "https://dashboard.tenderly.co/aave/protocol-v2/fork/f0rk/simulation/h3ad"
        );
    }

    #[test]
    fn only_tenderly_networks_qualify() {
        assert!(is_tenderly_network("tenderly-main"));
        assert!(!is_tenderly_network("kovan"));
    }

    #[test]
    fn failure_report_carries_simulation_link_on_forks_only() {
        let fork = TenderlyFork {
            username: "aave".into(),
            project: "protocol-v2".into(),
            fork_id: "f0rk".into(),
            head_id: "h3ad".into(),
        };
        assert_eq!(
            report_failure("tenderly-main", Some(&fork)).as_deref(),
            Some("Check tx error: https://dashboard.tenderly.co/aave/protocol-v2/fork/f0rk/simulation/h3ad")
        );
        assert!(report_failure("kovan", Some(&fork)).is_none());
        assert!(report_failure("tenderly-main", None).is_none());
    }
}
