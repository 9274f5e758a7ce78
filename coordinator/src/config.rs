//! Coordinator configuration with TOML file support.

use serde::{Deserialize, Serialize};

use ivp_types::ChainId;

use crate::error::ElectionError;

/// Configuration for an election session coordinator.
///
/// Can be loaded from a TOML file via [`CoordinatorConfig::from_toml_file`]
/// or built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Base URL of the ledger RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Address of the deployed election contract.
    #[serde(default = "default_contract_address")]
    pub contract_address: String,

    /// Chain the contract is deployed on. Connections to any other chain
    /// are refused with `WrongNetwork`.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// How often to poll for transaction confirmation, in milliseconds.
    #[serde(default = "default_confirm_poll_ms")]
    pub confirm_poll_ms: u64,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// HTTP connect timeout, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_contract_address() -> String {
    "0xb6f8a477d1572fab0632e5afb787e974d2595f42".to_string()
}

fn default_chain_id() -> u64 {
    ChainId::GOERLI.as_u64()
}

fn default_confirm_poll_ms() -> u64 {
    2_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CoordinatorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ElectionError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ElectionError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ElectionError> {
        toml::from_str(s).map_err(|e| ElectionError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("CoordinatorConfig is always serializable to TOML")
    }

    /// The configured chain as a typed id.
    pub fn chain(&self) -> ChainId {
        ChainId::new(self.chain_id)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract_address: default_contract_address(),
            chain_id: default_chain_id(),
            confirm_poll_ms: default_confirm_poll_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = CoordinatorConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = CoordinatorConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_url, config.rpc_url);
        assert_eq!(parsed.chain_id, config.chain_id);
        assert_eq!(parsed.confirm_poll_ms, config.confirm_poll_ms);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = CoordinatorConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.chain_id, 5);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_url = "https://rpc.example.org"
            chain_id = 11155111
        "#;
        let config = CoordinatorConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_url, "https://rpc.example.org");
        assert_eq!(config.chain(), ChainId::SEPOLIA);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = CoordinatorConfig::from_toml_file("/nonexistent/ivp.toml");
        assert!(matches!(result, Err(ElectionError::Config(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chain_id = 1337\nlog_format = \"json\"").unwrap();
        let config =
            CoordinatorConfig::from_toml_file(file.path().to_str().unwrap()).expect("should load");
        assert_eq!(config.chain(), ChainId::DEV);
        assert_eq!(config.log_format, "json");
    }
}
