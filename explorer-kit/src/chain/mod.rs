//! Wallet-facing chain management.
//!
//! - [`spec`] — [`ChainSpec`] and the wire shapes of the chain-management requests.
//! - [`provider`] — the [`WalletProvider`] seam, [`ProviderError`] and its code
//!   extraction, plus an HTTP JSON-RPC provider.
//! - [`account`] — connection state and the disabled-interaction fallback.
//! - [`negotiator`] — [`ChainNegotiator`], the switch-or-register handshake.

mod account;
mod negotiator;
mod provider;
mod spec;

pub use self::account::*;
pub use self::negotiator::*;
pub use self::provider::*;
pub use self::spec::*;
