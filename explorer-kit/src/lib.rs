//! Wallet chain negotiation and experiment exposure tracking for the
//! explorer front-end.
//!
//! - [`chain`] — switch a connected wallet to the explorer's chain, registering
//!   the chain first when the wallet does not know it.
//! - [`growthbook`] — report each experiment exposure at most once per client,
//!   backed by a bounded log in client storage.
//! - [`context`] — one-time initialisation of both, threaded through the app.
//! - [`monitoring`] / [`solidity_scan`] — invalid-response beacons and the
//!   contract report fetch that emits them.

pub mod chain;
pub mod cmd;
pub mod config;
pub mod context;
pub mod error;
pub mod growthbook;
pub mod monitoring;
pub mod solidity_scan;
pub mod telemetry;

pub use error::Error;
