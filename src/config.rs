//! Configuration management for the swap orchestrator
//!
//! Loads configuration from TOML files with environment variable substitution.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub orchestrator: OrchestratorConfig,
    pub api: ApiConfig,
    pub metrics: MetricsConfig,
    pub chain: ChainConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Retry budget for a single swap submission
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    crate::submit::DEFAULT_MAX_ATTEMPTS
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Which set of chain collaborators to run against
    pub backend: Backend,
    /// JSON-RPC endpoint for the `rpc` backend
    pub rpc_url: String,
    /// Account reported by the `simulated` backend wallet
    pub dev_address: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Rpc,
    Simulated,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Backing file for the swap history; rewritten in full on every append
    pub path: PathBuf,
}

impl Settings {
    /// Load settings from configuration files
    pub fn load() -> Result<Self> {
        let config_path = env::var("SWAP_ORCHESTRATOR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // Substitute environment variables
        let config_str = substitute_env_vars(&config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.orchestrator.max_attempts == 0 {
            anyhow::bail!("orchestrator.max_attempts must be at least 1");
        }

        if self.chain.backend == Backend::Rpc && self.chain.rpc_url.is_empty() {
            anyhow::bail!("chain.rpc_url is required for the rpc backend");
        }

        if self.ledger.path.as_os_str().is_empty() {
            anyhow::bail!("ledger.path must not be empty");
        }

        if self.metrics.enabled && self.metrics.port == self.api.port {
            anyhow::bail!("api.port and metrics.port must differ");
        }

        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
