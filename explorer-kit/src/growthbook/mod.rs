//! GrowthBook experimentation support.
//!
//! - [`storage`] — [`KeyValueStore`] and its in-memory / file implementations.
//! - [`tracker`] — [`ExposureTracker`], the at-most-once exposure callback.
//! - [`client`] — [`ExperimentClient`], built only when the feature is enabled.

mod client;
mod storage;
mod tracker;

pub use self::client::*;
pub use self::storage::*;
pub use self::tracker::*;
