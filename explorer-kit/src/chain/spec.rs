//! Target network description sent to wallets.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Encode a decimal chain id as an EIP-695 hex quantity (`0x`-prefixed,
/// lowercase, no leading zeros).
#[must_use]
pub fn hex_chain_id(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

/// Native currency of a [`ChainSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal precision.
    pub decimals: u8,
}

/// Immutable description of the network a wallet should switch to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSpec {
    /// Decimal chain id.
    pub chain_id: u64,
    /// Display name.
    pub name: String,
    /// Native currency.
    pub currency: NativeCurrency,
    /// RPC endpoint URLs.
    pub rpc_urls: Vec<String>,
    /// Block explorer URLs.
    pub explorer_urls: Vec<String>,
}

impl ChainSpec {
    /// Derive the target chain from static configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let chain = &config.chain;
        Self {
            chain_id: chain.id,
            name: chain.name.clone(),
            currency: NativeCurrency {
                name: chain.currency.name.clone(),
                symbol: chain.currency.symbol.clone(),
                decimals: chain.currency.decimals,
            },
            rpc_urls: chain.rpc_urls.clone(),
            explorer_urls: config.explorer_urls(),
        }
    }

    /// The chain id in wallet wire format.
    #[must_use]
    pub fn hex_id(&self) -> String {
        hex_chain_id(self.chain_id)
    }

    /// Parameters of a `wallet_switchEthereumChain` request.
    #[must_use]
    pub fn switch_params(&self) -> SwitchChainParams {
        SwitchChainParams {
            chain_id: self.hex_id(),
        }
    }

    /// Parameters of a `wallet_addEthereumChain` request.
    #[must_use]
    pub fn add_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: self.hex_id(),
            chain_name: self.name.clone(),
            native_currency: self.currency.clone(),
            rpc_urls: self.rpc_urls.clone(),
            block_explorer_urls: self.explorer_urls.clone(),
        }
    }
}

/// EIP-3326 `wallet_switchEthereumChain` parameter object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    /// Hex chain id.
    pub chain_id: String,
}

/// EIP-3085 `wallet_addEthereumChain` parameter object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    /// Hex chain id.
    pub chain_id: String,
    /// Display name.
    pub chain_name: String,
    /// Native currency block.
    pub native_currency: NativeCurrency,
    /// RPC endpoint URLs.
    pub rpc_urls: Vec<String>,
    /// Block explorer URLs.
    pub block_explorer_urls: Vec<String>,
}
