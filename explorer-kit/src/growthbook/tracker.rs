//! At-most-once experiment exposure notifications.
//!
//! Keys of experiments that have already been reported are kept in a bounded,
//! most-recent-first list in client storage. A key is reported the first time
//! it is seen and recorded at the same moment; once it falls off the end of
//! the list it is treated as unseen again.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::storage::KeyValueStore;

/// Storage key of the exposure log.
pub const STORAGE_KEY: &str = "growthbook:experiments";

/// Default capacity of the exposure log.
pub const STORAGE_LIMIT: usize = 20;

/// `Source` value attached to every exposure record.
pub const EXPOSURE_SOURCE: &str = "growthbook";

/// Experiment keys already reported, most recent first.
///
/// Entries are kept as raw JSON values: a stored array may hold items other
/// than strings, which never match a key but are carried through writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExposureLog {
    entries: Vec<Value>,
}

impl ExposureLog {
    /// Decode a stored log. Anything that is not a JSON array, including a
    /// missing entry, is an empty log.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let entries = raw
            .and_then(|raw| serde_json::from_str::<Vec<Value>>(raw).ok())
            .unwrap_or_default();
        Self { entries }
    }

    /// Whether `key` appears anywhere in the log as a string entry.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.as_str() == Some(key))
    }

    /// Put `key` at the front and drop whatever no longer fits.
    ///
    /// Callers only record keys that [`contains`](Self::contains) rejected;
    /// an existing occurrence is not removed first.
    pub fn record(&mut self, key: &str, capacity: usize) {
        self.entries.insert(0, Value::String(key.to_owned()));
        self.entries.truncate(capacity);
    }

    /// String keys, most recent first.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().filter_map(Value::as_str).collect()
    }

    /// Every stored entry, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// Storage encoding: a JSON array.
    ///
    /// # Errors
    ///
    /// Propagates the (practically unreachable) encoder failure.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }
}

/// The notification emitted on first exposure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureRecord {
    /// Experiment key.
    #[serde(rename = "Experiment name")]
    pub experiment_name: String,
    /// Assigned variant value.
    #[serde(rename = "Variant name")]
    pub variant_name: Value,
    /// Always [`EXPOSURE_SOURCE`].
    #[serde(rename = "Source")]
    pub source: &'static str,
}

impl ExposureRecord {
    /// Record for `experiment_name` assigned `variant_name`.
    pub fn new(experiment_name: impl Into<String>, variant_name: Value) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            variant_name,
            source: EXPOSURE_SOURCE,
        }
    }
}

/// Receiver of exposure notifications.
pub trait ExposureSink: Send + Sync {
    /// Deliver one notification.
    fn notify(&self, record: &ExposureRecord);
}

/// Emits exposures as structured `tracing` events and, with the `telemetry`
/// feature, as an `experiment.exposures` counter.
pub struct TracingSink {
    #[cfg(feature = "telemetry")]
    exposures: opentelemetry::metrics::Counter<u64>,
}

impl fmt::Debug for TracingSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingSink").finish_non_exhaustive()
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingSink {
    /// Sink bound to the global meter provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "telemetry")]
            exposures: opentelemetry::global::meter(env!("CARGO_PKG_NAME"))
                .u64_counter("experiment.exposures")
                .with_description("First exposures of a client to an experiment")
                .build(),
        }
    }
}

impl ExposureSink for TracingSink {
    fn notify(&self, record: &ExposureRecord) {
        tracing::info!(
            target: "explorer_kit::exposure",
            experiment_name = %record.experiment_name,
            variant_name = %record.variant_name,
            source = record.source,
            "Experiment Started"
        );
        #[cfg(feature = "telemetry")]
        self.exposures.add(
            1,
            &[opentelemetry::KeyValue::new(
                "experiment",
                record.experiment_name.clone(),
            )],
        );
    }
}

/// Tracking callback deduplicating exposures through a persisted [`ExposureLog`].
#[derive(Clone)]
pub struct ExposureTracker {
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn ExposureSink>,
    capacity: usize,
}

impl fmt::Debug for ExposureTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposureTracker")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl ExposureTracker {
    /// Tracker over `store` reporting to `sink`, keeping at most `capacity` keys.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, sink: Arc<dyn ExposureSink>, capacity: usize) -> Self {
        Self {
            store,
            sink,
            capacity,
        }
    }

    /// Capacity of the exposure log.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current persisted log.
    #[must_use]
    pub fn log(&self) -> ExposureLog {
        ExposureLog::parse(self.store.get(STORAGE_KEY).as_deref())
    }

    /// Report the assignment of `variant` in `experiment_key` unless the key
    /// was already reported. Returns whether a notification was emitted.
    ///
    /// Storage failures never surface: an unreadable log counts as empty, and
    /// a failed write only risks a repeated notification later.
    pub fn track(&self, experiment_key: &str, variant: &Value) -> bool {
        let mut log = self.log();
        if log.contains(experiment_key) {
            tracing::trace!(experiment_key, "exposure already reported");
            return false;
        }

        self.sink
            .notify(&ExposureRecord::new(experiment_key, variant.clone()));

        log.record(experiment_key, self.capacity);
        let written = log
            .encode()
            .map_err(super::StorageError::from)
            .and_then(|raw| self.store.set(STORAGE_KEY, &raw));
        if let Err(error) = written {
            tracing::debug!(experiment_key, %error, "failed to persist exposure log");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::growthbook::storage::MemoryStore;

    #[derive(Debug, Default)]
    struct RecordingSink(Mutex<Vec<ExposureRecord>>);

    impl RecordingSink {
        fn records(&self) -> Vec<ExposureRecord> {
            self.0.lock().expect("sink lock").clone()
        }
    }

    impl ExposureSink for RecordingSink {
        fn notify(&self, record: &ExposureRecord) {
            self.0.lock().expect("sink lock").push(record.clone());
        }
    }

    fn tracker(
        store: Arc<dyn KeyValueStore>,
        capacity: usize,
    ) -> (ExposureTracker, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let tracker = ExposureTracker::new(store, sink.clone(), capacity);
        (tracker, sink)
    }

    #[test]
    fn repeated_key_notifies_once() {
        let (tracker, sink) = tracker(Arc::new(MemoryStore::new()), STORAGE_LIMIT);

        assert!(tracker.track("test_value", &json!("a")));
        assert!(!tracker.track("test_value", &json!("b")));

        assert_eq!(
            sink.records(),
            vec![ExposureRecord::new("test_value", json!("a"))]
        );
    }

    #[test]
    fn record_serializes_with_display_field_names() {
        let record = ExposureRecord::new("hero", json!(true));
        assert_eq!(
            serde_json::to_value(record).expect("serialize"),
            json!({ "Experiment name": "hero", "Variant name": true, "Source": "growthbook" })
        );
    }

    #[test]
    fn evicted_key_is_reported_again() {
        let store = Arc::new(MemoryStore::new());
        let (tracker, sink) = tracker(store.clone(), 3);

        for key in ["A", "B", "C", "D"] {
            assert!(tracker.track(key, &json!(1)));
        }
        assert_eq!(tracker.log().keys(), ["D", "C", "B"]);
        assert_eq!(store.get(STORAGE_KEY).as_deref(), Some(r#"["D","C","B"]"#));

        assert!(tracker.track("A", &json!(1)));
        assert_eq!(tracker.log().keys(), ["A", "D", "C"]);
        assert_eq!(sink.records().len(), 5);
    }

    #[test]
    fn log_keeps_most_recent_keys_up_to_capacity() {
        let (tracker, _sink) = tracker(Arc::new(MemoryStore::new()), STORAGE_LIMIT);
        let keys: Vec<String> = (0..STORAGE_LIMIT + 7).map(|i| format!("exp-{i}")).collect();
        for key in &keys {
            tracker.track(key, &Value::Null);
        }

        let expected: Vec<String> = keys.iter().rev().take(STORAGE_LIMIT).cloned().collect();
        assert_eq!(tracker.log().keys(), expected.as_slice());
    }

    #[test]
    fn malformed_storage_counts_as_empty() {
        for raw in ["not json", r#"{"A":1}"#, r#""A""#, "null"] {
            let store = Arc::new(MemoryStore::new());
            store.set(STORAGE_KEY, raw).expect("seed");
            let (tracker, sink) = tracker(store.clone(), STORAGE_LIMIT);

            assert!(tracker.track("A", &json!("on")), "{raw}");
            assert_eq!(sink.records().len(), 1);
            assert_eq!(store.get(STORAGE_KEY).as_deref(), Some(r#"["A"]"#));
        }
    }

    #[test]
    fn mixed_array_still_suppresses_known_key() {
        let store = Arc::new(MemoryStore::new());
        store.set(STORAGE_KEY, r#"["A","B",7]"#).expect("seed");
        let (tracker, sink) = tracker(store.clone(), STORAGE_LIMIT);

        assert!(!tracker.track("A", &json!(1)));
        assert!(sink.records().is_empty());
        assert_eq!(store.get(STORAGE_KEY).as_deref(), Some(r#"["A","B",7]"#));
    }

    #[test]
    fn non_string_entries_survive_a_write() {
        let store = Arc::new(MemoryStore::new());
        store.set(STORAGE_KEY, "[1, 2]").expect("seed");
        let (tracker, sink) = tracker(store.clone(), 2);

        assert!(tracker.track("A", &json!("on")));
        assert_eq!(sink.records().len(), 1);
        assert_eq!(store.get(STORAGE_KEY).as_deref(), Some(r#"["A",1]"#));
        assert_eq!(tracker.log().keys(), ["A"]);
    }

    #[test]
    fn previously_stored_keys_are_respected() {
        let store = Arc::new(MemoryStore::new());
        store.set(STORAGE_KEY, r#"["B","A"]"#).expect("seed");
        let (tracker, sink) = tracker(store, STORAGE_LIMIT);

        assert!(!tracker.track("A", &json!(0)));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn write_failure_is_swallowed() {
        let (tracker, sink) = tracker(Arc::new(MemoryStore::with_quota(0)), STORAGE_LIMIT);

        assert!(tracker.track("A", &json!(1)));
        // Nothing was persisted, so the next call reports again.
        assert!(tracker.track("A", &json!(1)));
        assert_eq!(sink.records().len(), 2);
        assert!(tracker.log().keys().is_empty());
    }

    #[test]
    fn record_does_not_deduplicate() {
        let mut log = ExposureLog::parse(Some(r#"["A","B"]"#));
        log.record("A", 5);
        assert_eq!(log.keys(), ["A", "A", "B"]);
    }

    #[test]
    fn tracing_sink_accepts_records() {
        TracingSink::new().notify(&ExposureRecord::new("hero", json!("control")));
    }
}
