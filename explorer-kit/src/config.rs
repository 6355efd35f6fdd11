//! Configuration loading and default template generation.
//!
//! This module provides:
//!
//! - [`Config`] — the explorer's static configuration: application base URL,
//!   target chain, feature flags and client storage location.
//! - [`load_config`] — reads, parses and validates a TOML configuration file.
//! - [`generate_default_config`] — produces a commented TOML template.
//!
//! # Configuration File Format
//!
//! ```toml
//! [app]
//! base_url = "https://explorer.example.com"
//!
//! [chain]
//! id = 5611
//! name = "Ozura Ledger"
//! rpc_urls = ["https://rpc.example.com"]
//!
//! [chain.currency]
//! name = "Ozura"
//! symbol = "OZR"
//! decimals = 18
//!
//! [features.growthbook]
//! enabled = true
//! client_key = "$GROWTHBOOK_CLIENT_KEY"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::growthbook::STORAGE_LIMIT;

/// Default GrowthBook CDN host.
pub const DEFAULT_GROWTHBOOK_API_HOST: &str = "https://cdn.growthbook.io";

/// Default location of the client-local storage file.
pub const DEFAULT_STORAGE_PATH: &str = ".explorer-kit/storage.json";

/// Root configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Explorer application settings.
    pub app: AppConfig,
    /// The network this explorer serves.
    pub chain: ChainConfig,
    /// Feature switches.
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Client-local durable storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Explorer application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Public base URL of the explorer (also advertised as the block explorer URL).
    pub base_url: String,
    /// Development mode flag, forwarded to the experimentation client.
    #[serde(default)]
    pub is_dev: bool,
}

/// Target chain configuration (matches TOML structure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Decimal EIP-155 chain id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Native currency.
    pub currency: CurrencyConfig,
    /// RPC endpoint(s), at least one.
    pub rpc_urls: Vec<String>,
    /// Block explorer URL(s). Falls back to `app.base_url` when empty.
    #[serde(default)]
    pub explorer_urls: Vec<String>,
}

/// Native currency block of [`ChainConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal precision.
    pub decimals: u8,
}

/// Feature switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Wallet interaction (chain switching).
    #[serde(default)]
    pub blockchain_interaction: ToggleConfig,
    /// GrowthBook experimentation.
    #[serde(default)]
    pub growthbook: GrowthBookFeature,
}

/// A plain on/off feature.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ToggleConfig {
    /// Whether the feature is enabled (default: false).
    #[serde(default)]
    pub enabled: bool,
}

/// GrowthBook experimentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthBookFeature {
    /// Whether the experimentation client is constructed at all (default: false).
    #[serde(default)]
    pub enabled: bool,
    /// SDK client key. Supports `$VAR` / `${VAR}` environment references.
    #[serde(default)]
    pub client_key: Option<String>,
    /// SDK API host.
    #[serde(default = "default_api_host")]
    pub api_host: String,
    /// Capacity of the exposure log.
    #[serde(default = "default_storage_limit")]
    pub storage_limit: usize,
}

impl Default for GrowthBookFeature {
    fn default() -> Self {
        Self {
            enabled: false,
            client_key: None,
            api_host: default_api_host(),
            storage_limit: default_storage_limit(),
        }
    }
}

fn default_api_host() -> String {
    DEFAULT_GROWTHBOOK_API_HOST.to_owned()
}

const fn default_storage_limit() -> usize {
    STORAGE_LIMIT
}

/// Client-local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the key-value store.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_PATH)
}

impl Config {
    /// Parse and validate a configuration document from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not valid TOML, does not
    /// match the expected structure, or fails validation.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| Error::config_with("failed to parse TOML", e))?;
        let growthbook = &mut config.features.growthbook;
        if growthbook.enabled {
            growthbook.client_key = growthbook.client_key.as_deref().map(resolve_env).transpose()?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Block explorer URLs advertised for the chain.
    #[must_use]
    pub fn explorer_urls(&self) -> Vec<String> {
        if self.chain.explorer_urls.is_empty() {
            vec![self.app.base_url.clone()]
        } else {
            self.chain.explorer_urls.clone()
        }
    }

    fn validate(&self) -> Result<(), Error> {
        parse_url("app.base_url", &self.app.base_url)?;
        if self.chain.rpc_urls.is_empty() {
            return Err(Error::config("chain.rpc_urls must list at least one URL"));
        }
        for url in self.chain.rpc_urls.iter().chain(&self.chain.explorer_urls) {
            parse_url("chain", url)?;
        }
        let growthbook = &self.features.growthbook;
        if growthbook.enabled {
            if growthbook.client_key.as_deref().is_none_or(str::is_empty) {
                return Err(Error::config(
                    "features.growthbook.client_key is required when growthbook is enabled",
                ));
            }
            if growthbook.storage_limit == 0 {
                return Err(Error::config(
                    "features.growthbook.storage_limit must be greater than zero",
                ));
            }
            parse_url("features.growthbook.api_host", &growthbook.api_host)?;
        }
        Ok(())
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url, Error> {
    Url::parse(value).map_err(|e| Error::config_with(format!("{field}: invalid URL '{value}'"), e))
}

/// Resolve an environment-variable reference (`$VAR` or `${VAR}`), returning
/// the literal string unchanged if it does not match either pattern.
///
/// # Errors
///
/// Returns [`Error::Config`] if the referenced variable is not set.
pub fn resolve_env(value: &str) -> Result<String, Error> {
    let var_name = if let Some(name) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        name
    } else if let Some(name) = value
        .strip_prefix('$')
        .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_'))
    {
        name
    } else {
        return Ok(value.to_owned());
    };
    std::env::var(var_name).map_err(|_| {
        Error::config(format!(
            "env var '{var_name}' not found (referenced as '{value}')"
        ))
    })
}

/// Load configuration from a TOML file at the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be resolved, read, parsed, or validated.
pub fn load_config(path: &Path) -> Result<Config, Error> {
    let config_path = path.canonicalize().map_err(|e| {
        Error::config_with(format!("failed to resolve config path '{}'", path.display()), e)
    })?;
    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::config_with(format!("failed to read config file '{}'", config_path.display()), e)
    })?;
    Config::from_toml(&content).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("'{}': {msg}", config_path.display())),
        other => other,
    })
}

/// Generate a default TOML configuration template.
#[must_use]
pub fn generate_default_config() -> String {
    format!(
        r#"# explorer-kit configuration

# ── Application ─────────────────────────────────────────────────────
[app]
base_url = "https://explorer.example.com"
is_dev = false

# ── Target chain ────────────────────────────────────────────────────
# Registered with the wallet when it does not recognise the chain id.

[chain]
id = 5611
name = "Ozura Ledger"
rpc_urls = ["https://rpc.example.com"]
# Defaults to [app.base_url] when omitted.
# explorer_urls = ["https://explorer.example.com"]

[chain.currency]
name = "Ozura"
symbol = "OZR"
decimals = 18

# ── Features ────────────────────────────────────────────────────────

[features.blockchain_interaction]
enabled = true

# Values support environment variable references: "$VAR" or "${{VAR}}"
[features.growthbook]
enabled = false
client_key = "$GROWTHBOOK_CLIENT_KEY"
api_host = "{DEFAULT_GROWTHBOOK_API_HOST}"
storage_limit = {STORAGE_LIMIT}

# ── Client storage ──────────────────────────────────────────────────

[storage]
path = "{DEFAULT_STORAGE_PATH}"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [app]
        base_url = "https://explorer.example.com"

        [chain]
        id = 5611
        name = "Ozura Ledger"
        rpc_urls = ["https://rpc.example.com"]

        [chain.currency]
        name = "Ozura"
        symbol = "OZR"
        decimals = 18
    "#;

    #[test]
    fn default_template_parses() {
        let config = Config::from_toml(&generate_default_config()).expect("template is valid");
        assert_eq!(config.chain.id, 5611);
        assert!(config.features.blockchain_interaction.enabled);
        assert!(!config.features.growthbook.enabled);
        assert_eq!(config.features.growthbook.storage_limit, STORAGE_LIMIT);
        assert_eq!(config.storage.path, PathBuf::from(DEFAULT_STORAGE_PATH));
    }

    #[test]
    fn features_default_to_disabled() {
        let config = Config::from_toml(MINIMAL).expect("minimal config is valid");
        assert!(!config.features.blockchain_interaction.enabled);
        assert!(!config.features.growthbook.enabled);
        assert_eq!(config.features.growthbook.api_host, DEFAULT_GROWTHBOOK_API_HOST);
    }

    #[test]
    fn explorer_urls_fall_back_to_base_url() {
        let config = Config::from_toml(MINIMAL).expect("minimal config is valid");
        assert_eq!(config.explorer_urls(), vec!["https://explorer.example.com"]);
    }

    #[test]
    fn rejects_empty_rpc_list() {
        let content = MINIMAL.replace(r#"["https://rpc.example.com"]"#, "[]");
        let err = Config::from_toml(&content).expect_err("empty rpc list");
        assert!(err.to_string().contains("rpc_urls"));
    }

    #[test]
    fn rejects_invalid_url() {
        let content = MINIMAL.replace("https://rpc.example.com", "not a url");
        assert!(matches!(Config::from_toml(&content), Err(Error::Config(_))));
    }

    #[test]
    fn growthbook_requires_client_key() {
        let content = format!("{MINIMAL}\n[features.growthbook]\nenabled = true\n");
        let err = Config::from_toml(&content).expect_err("missing client key");
        assert!(err.to_string().contains("client_key"));
    }

    #[test]
    fn literal_values_pass_through_resolve_env() {
        assert_eq!(resolve_env("sdk-abc").expect("literal"), "sdk-abc");
        assert_eq!(resolve_env("$").expect("lone dollar"), "$");
        assert_eq!(resolve_env("$not-a-var").expect("dash"), "$not-a-var");
    }

    #[test]
    fn missing_env_reference_is_an_error() {
        let err = resolve_env("${EXPLORER_KIT_TEST_SURELY_UNSET}").expect_err("unset var");
        assert!(err.to_string().contains("EXPLORER_KIT_TEST_SURELY_UNSET"));
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).expect_err("missing");
        assert!(err.to_string().contains("failed to resolve config path"));
    }
}
