// src/config.rs
//! Configuration: environment variables with defaults plus an optional YAML
//! scoring policy file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::policy::ScoringPolicy;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLICY_FILE: &str = "hireflow.yaml";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SEED: u64 = 42;
const CLI_DELAY_MS: u64 = 150;
const DEFAULT_SESSION_FILE: &str = ".hireflow/session.json";
const DEFAULT_SESSION_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub service: ServiceConfig,
    pub simulation: SimulationConfig,
    pub session: SessionConfig,
    pub policy: ScoringPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Artificial latency of every simulated call.
    pub delay_ms: u64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub file: PathBuf,
    pub lifetime_hours: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_SESSION_FILE),
            lifetime_hours: DEFAULT_SESSION_HOURS,
        }
    }
}

impl ConfigManager {
    /// Load all configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok(), 0)
    }

    /// Same as `load`, but simulated calls get a visible delay unless
    /// `HIREFLOW_SIM_DELAY_MS` says otherwise.
    pub fn load_for_cli() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok(), CLI_DELAY_MS)
    }

    pub fn load_with<F>(lookup: F, default_delay_ms: u64) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "local".to_string());
        info!("Loading configuration for environment: {}", environment);

        let service = Self::load_service(&lookup)?;
        let simulation = Self::load_simulation(&lookup, default_delay_ms)?;
        let session = Self::load_session(&lookup);
        let policy = match lookup("HIREFLOW_CONFIG") {
            Some(path) => load_policy_file(Path::new(&path))?,
            None => {
                let default = Path::new(DEFAULT_POLICY_FILE);
                if default.exists() {
                    load_policy_file(default)?
                } else {
                    ScoringPolicy::default()
                }
            }
        };

        info!("Backend API: {}", service.api_base_url);
        Ok(Self {
            environment,
            service,
            simulation,
            session,
            policy,
        })
    }

    fn load_service<F>(lookup: &F) -> Result<ServiceConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("REACT_APP_API_URL")
            .or_else(|| lookup("HIREFLOW_API_URL"))
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_seconds = match lookup("HIREFLOW_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid HIREFLOW_TIMEOUT_SECS: {}", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(ServiceConfig {
            api_base_url,
            timeout_seconds,
        })
    }

    fn load_simulation<F>(lookup: &F, default_delay_ms: u64) -> Result<SimulationConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let delay_ms = match lookup("HIREFLOW_SIM_DELAY_MS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid HIREFLOW_SIM_DELAY_MS: {}", raw))?,
            None => default_delay_ms,
        };
        let seed = match lookup("HIREFLOW_SEED") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid HIREFLOW_SEED: {}", raw))?,
            None => DEFAULT_SEED,
        };
        Ok(SimulationConfig { delay_ms, seed })
    }

    fn load_session<F>(lookup: &F) -> SessionConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        SessionConfig {
            file: lookup("HIREFLOW_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE)),
            lifetime_hours: DEFAULT_SESSION_HOURS,
        }
    }
}

/// Reads a scoring policy from YAML. Keys left out keep their defaults.
pub fn load_policy_file(path: &Path) -> Result<ScoringPolicy> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file: {}", path.display()))?;
    let policy: ScoringPolicy = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse policy file: {}", path.display()))?;
    policy
        .validate()
        .with_context(|| format!("Invalid policy in {}", path.display()))?;
    info!("Loaded scoring policy from {}", path.display());
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConfigManager::load_with(lookup_from(&[]), 0).unwrap();
        assert_eq!(config.environment, "local");
        assert_eq!(config.service, ServiceConfig::default());
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.delay_ms, 0);
        assert_eq!(config.session.lifetime_hours, 24);
    }

    #[test]
    fn test_react_app_api_url_wins() {
        let config = ConfigManager::load_with(
            lookup_from(&[
                ("REACT_APP_API_URL", "https://api.example.com"),
                ("HIREFLOW_API_URL", "http://ignored"),
            ]),
            0,
        )
        .unwrap();
        assert_eq!(config.service.api_base_url, "https://api.example.com");
    }

    #[test]
    fn test_cli_delay_default_and_override() {
        let config = ConfigManager::load_with(lookup_from(&[]), CLI_DELAY_MS).unwrap();
        assert_eq!(config.simulation.delay_ms, 150);

        let config =
            ConfigManager::load_with(lookup_from(&[("HIREFLOW_SIM_DELAY_MS", "0")]), CLI_DELAY_MS)
                .unwrap();
        assert_eq!(config.simulation.delay_ms, 0);

        assert!(
            ConfigManager::load_with(lookup_from(&[("HIREFLOW_SEED", "abc")]), 0).is_err()
        );
    }

    #[test]
    fn test_policy_file_is_loaded_and_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recommendation:\n  strong_hire: 95").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config =
            ConfigManager::load_with(lookup_from(&[("HIREFLOW_CONFIG", path.as_str())]), 0).unwrap();
        assert_eq!(config.policy.recommendation.strong_hire, 95);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "weights:\n  technical: 0.9").unwrap();
        assert!(load_policy_file(bad.path()).is_err());
    }

    #[test]
    fn test_missing_explicit_policy_file_is_an_error() {
        let result = ConfigManager::load_with(
            lookup_from(&[("HIREFLOW_CONFIG", "/nonexistent/hireflow.yaml")]),
            0,
        );
        assert!(result.is_err());
    }
}
