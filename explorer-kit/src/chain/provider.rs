//! Wallet provider abstraction and its JSON-RPC over HTTP implementation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use super::spec::{AddChainParams, SwitchChainParams};

/// EIP-3326 chain switch method.
pub const SWITCH_CHAIN_METHOD: &str = "wallet_switchEthereumChain";

/// EIP-3085 chain registration method.
pub const ADD_CHAIN_METHOD: &str = "wallet_addEthereumChain";

/// Error code a wallet returns when it does not know the requested chain id.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Error code a wallet returns when the user rejects the request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Successful provider response payload.
pub type RequestResult = Value;

/// A request addressed to a wallet provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Method name.
    pub method: String,
    /// Positional parameters.
    pub params: Vec<Value>,
}

impl RpcRequest {
    /// `wallet_switchEthereumChain` carrying only the hex chain id.
    #[must_use]
    pub fn switch_chain(params: &SwitchChainParams) -> Self {
        Self {
            method: SWITCH_CHAIN_METHOD.to_owned(),
            params: vec![json!(params)],
        }
    }

    /// `wallet_addEthereumChain` carrying the full chain description.
    #[must_use]
    pub fn add_chain(params: &AddChainParams) -> Self {
        Self {
            method: ADD_CHAIN_METHOD.to_owned(),
            params: vec![json!(params)],
        }
    }
}

/// Where a numeric error code may appear in a [`ProviderError`].
///
/// Wallets disagree on where they report the code; each quirk is one more
/// location rather than another branch in the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLocation {
    /// The top-level `code` field.
    TopLevel,
    /// A JSON pointer into the `data` payload.
    Data(&'static str),
}

/// Locations inspected when deciding whether a chain is unknown to the wallet.
pub const UNRECOGNIZED_CHAIN_CODE_LOCATIONS: &[CodeLocation] = &[
    CodeLocation::TopLevel,
    CodeLocation::Data("/originalError/code"),
];

/// A failed provider request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderError {
    /// Top-level error code, if any.
    #[serde(default)]
    pub code: Option<i64>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Wallet-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Error with a top-level code.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
            data: None,
        }
    }

    /// Error that never reached the wallet (connection, decoding).
    pub fn transport(message: impl fmt::Display) -> Self {
        Self {
            code: None,
            message: message.to_string(),
            data: None,
        }
    }

    /// Attach a wallet-specific `data` payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Code found at `location`; a missing path is simply no code.
    #[must_use]
    pub fn code_at(&self, location: CodeLocation) -> Option<i64> {
        match location {
            CodeLocation::TopLevel => self.code,
            CodeLocation::Data(pointer) => self
                .data
                .as_ref()
                .and_then(|data| data.pointer(pointer))
                .and_then(Value::as_i64),
        }
    }

    /// Every code present at any of `locations`, in order.
    pub fn candidate_codes<'a>(
        &'a self,
        locations: &'a [CodeLocation],
    ) -> impl Iterator<Item = i64> + 'a {
        locations.iter().filter_map(|&location| self.code_at(location))
    }

    /// Whether the wallet reported that it does not recognise the chain.
    #[must_use]
    pub fn is_unrecognized_chain(&self) -> bool {
        self.candidate_codes(UNRECOGNIZED_CHAIN_CODE_LOCATIONS)
            .any(|code| code == UNRECOGNIZED_CHAIN_CODE)
    }
}

/// An already-connected agent able to service chain-management requests.
#[async_trait::async_trait]
pub trait WalletProvider: fmt::Debug + Send + Sync {
    /// Send a request and await the wallet's answer.
    async fn request(&self, request: RpcRequest) -> Result<RequestResult, ProviderError>;
}

/// Wallet provider reached through a JSON-RPC 2.0 HTTP bridge.
#[derive(Debug)]
pub struct HttpWalletProvider {
    endpoint: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct JsonRpcEnvelope<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [Value],
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

impl HttpWalletProvider {
    /// Creates a provider posting to `endpoint`.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Creates a provider with a preconfigured HTTP client.
    #[must_use]
    pub const fn with_client(endpoint: Url, client: reqwest::Client) -> Self {
        Self {
            endpoint,
            client,
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait::async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn request(&self, request: RpcRequest) -> Result<RequestResult, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = JsonRpcEnvelope {
            jsonrpc: "2.0",
            id,
            method: &request.method,
            params: &request.params,
        };
        tracing::trace!(id, method = %request.method, "sending wallet request");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&envelope)
            .send()
            .await
            .map_err(ProviderError::transport)?;
        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(format!("invalid JSON-RPC response: {e}")))?;
        match body.error {
            Some(error) => Err(error),
            None => Ok(body.result.unwrap_or(Value::Null)),
        }
    }
}
