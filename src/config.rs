use serde::{Deserialize, Serialize};
use std::fs;

use crate::bridge::wallet::ChainIds;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "bridge.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            enable_tracing: true,
            bridge: BridgeConfig::default(),
        }
    }
}

/// Chain and confirmation parameters of the bridge itself.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BridgeConfig {
    /// Base mainnet chain id.
    pub base_chain_id: u64,
    /// Torus EVM chain id.
    pub torus_evm_chain_id: u64,
    /// Confirmations to wait for on EVM withdrawal receipts.
    pub required_confirmations: u32,
    /// Bounded retries when asking the EVM wallet to switch networks.
    pub max_switch_attempts: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_chain_id: 8453,
            torus_evm_chain_id: 21000,
            required_confirmations: 2,
            max_switch_attempts: 3,
        }
    }
}

impl BridgeConfig {
    /// The two EVM chain ids in readiness-gate form.
    pub fn chain_ids(&self) -> ChainIds {
        ChainIds {
            base: self.base_chain_id,
            torus_evm: self.torus_evm_chain_id,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}
