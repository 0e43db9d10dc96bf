//! Configuration management
//!
//! Manages the LLM provider, server and gas-estimation settings. Loaded
//! from a TOML file under the platform config directory; every field has a
//! default so a missing file just means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Report-generation provider settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Analysis proxy server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Gas estimation settings
    #[serde(default)]
    pub gas: GasConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible completion endpoint
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model used for report synthesis
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// API key; falls back to the OPENROUTER_API_KEY environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_llm_model() -> String {
    "google/gemini-2.5-flash".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasConfig {
    /// Ethereum JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Fiat price feed endpoint
    #[serde(default = "default_price_url")]
    pub price_url: String,
    /// ENS name resolution endpoint
    #[serde(default = "default_ens_url")]
    pub ens_url: String,
}

fn default_rpc_url() -> String {
    "https://eth.llamarpc.com".to_string()
}

fn default_price_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price?ids=ethereum&vs_currencies=usd".to_string()
}

fn default_ens_url() -> String {
    "https://api.ensideas.com/ens/resolve".to_string()
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            price_url: default_price_url(),
            ens_url: default_ens_url(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it with defaults
    /// on first run.
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().context("Config path has no parent")?;
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")
    }
}

/// Default config file location: `<config dir>/dao-analyst/config.toml`
pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join("dao-analyst").join("config.toml"))
}
