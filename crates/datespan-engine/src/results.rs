//! The result log: a live view of computed results plus a capped,
//! persisted history that is replayed at startup.
//!
//! The persisted form is a JSON array of strings under [`RESULTS_KEY`],
//! newest first, at most [`MAX_PERSISTED`] long. Every write replaces the
//! whole array.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::store::KeyValueStore;

/// Store key holding the persisted history.
pub const RESULTS_KEY: &str = "results";

/// Most entries kept in the persisted history.
pub const MAX_PERSISTED: usize = 10;

/// Where [`ResultLog::append`] inserts into the live view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Newest results go first.
    Start,
    /// Used when replaying stored history, which is already newest-first.
    End,
}

#[derive(Debug)]
pub struct ResultLog<S> {
    store: S,
    visible: VecDeque<String>,
    has_results: bool,
}

impl<S: KeyValueStore> ResultLog<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            visible: VecDeque::new(),
            has_results: false,
        }
    }

    /// Insert into the live view. The view is never pruned.
    pub fn append(&mut self, entry: impl Into<String>, position: Position) {
        let entry = entry.into();
        match position {
            Position::Start => self.visible.push_front(entry),
            Position::End => self.visible.push_back(entry),
        }
        self.has_results = true;
    }

    /// Prepend `entry` to the stored history, keep the newest
    /// [`MAX_PERSISTED`], and rewrite the store.
    ///
    /// A stored value that is not a JSON string array is replaced. A store
    /// that cannot be read is an error and nothing is written.
    pub fn persist(&mut self, entry: &str) -> Result<()> {
        let mut stored = match self.store.get(RESULTS_KEY)? {
            Some(raw) => decode(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "discarding unreadable result history");
                Vec::new()
            }),
            None => Vec::new(),
        };

        stored.insert(0, entry.to_string());
        stored.truncate(MAX_PERSISTED);
        self.write_stored(&stored)?;

        debug!(persisted = stored.len(), "result history saved");
        Ok(())
    }

    /// The stored history, newest first.
    ///
    /// On first use the key is initialized to an empty array.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the store fails or holds
    /// something other than a JSON string array.
    pub fn load_all(&mut self) -> Result<Vec<String>> {
        match self.read_stored()? {
            Some(stored) => Ok(stored),
            None => {
                debug!(key = RESULTS_KEY, "initializing empty result history");
                self.write_stored(&[])?;
                Ok(Vec::new())
            }
        }
    }

    /// Show a new result first in the view and persist it.
    ///
    /// The entry stays visible even if persisting fails.
    pub fn record(&mut self, entry: &str) -> Result<()> {
        self.append(entry, Position::Start);
        self.persist(entry)
    }

    /// Replay the stored history into the view in stored order.
    ///
    /// Returns how many entries were replayed.
    pub fn restore(&mut self) -> Result<usize> {
        let stored = self.load_all()?;
        let count = stored.len();
        for entry in stored {
            self.append(entry, Position::End);
        }
        debug!(count, "result history restored");
        Ok(count)
    }

    /// The live view, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.visible.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Whether the results header is shown. Once true, stays true.
    pub fn has_results(&self) -> bool {
        self.has_results
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn read_stored(&self) -> Result<Option<Vec<String>>> {
        self.store
            .get(RESULTS_KEY)?
            .map(|raw| decode(&raw))
            .transpose()
    }

    fn write_stored(&mut self, entries: &[String]) -> Result<()> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| EngineError::Storage(format!("cannot encode '{RESULTS_KEY}': {e}")))?;
        self.store.set(RESULTS_KEY, &raw)
    }
}

fn decode(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| EngineError::Storage(format!("'{RESULTS_KEY}' is not a string array: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn stored(log: &ResultLog<MemoryStore>) -> Vec<String> {
        let raw = log.store().get(RESULTS_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_load_all_initializes_missing_key() {
        let mut log = ResultLog::new(MemoryStore::new());
        assert!(log.load_all().unwrap().is_empty());
        assert_eq!(
            log.store().get(RESULTS_KEY).unwrap().as_deref(),
            Some("[]")
        );
        assert!(!log.has_results());
    }

    #[test]
    fn test_persist_caps_at_ten_newest_first() {
        let mut log = ResultLog::new(MemoryStore::new());
        log.load_all().unwrap();
        for i in 1..=12 {
            log.persist(&format!("entry {i}")).unwrap();
        }

        let expected: Vec<String> = (3..=12).rev().map(|i| format!("entry {i}")).collect();
        assert_eq!(stored(&log), expected);
    }

    #[test]
    fn test_persist_without_prior_load() {
        let mut log = ResultLog::new(MemoryStore::new());
        log.persist("only").unwrap();
        assert_eq!(stored(&log), vec!["only".to_string()]);
    }

    #[test]
    fn test_record_prepends_to_view() {
        let mut log = ResultLog::new(MemoryStore::new());
        log.record("first").unwrap();
        log.record("second").unwrap();
        assert_eq!(log.entries().collect::<Vec<_>>(), vec!["second", "first"]);
        assert!(log.has_results());
    }

    #[test]
    fn test_view_is_not_pruned() {
        let mut log = ResultLog::new(MemoryStore::new());
        for i in 0..15 {
            log.record(&format!("r{i}")).unwrap();
        }
        assert_eq!(log.len(), 15);
        assert_eq!(stored(&log).len(), MAX_PERSISTED);
    }

    #[test]
    fn test_restore_reproduces_visible_order() {
        let mut log = ResultLog::new(MemoryStore::new());
        for i in 1..=12 {
            log.record(&format!("entry {i}")).unwrap();
        }
        let shown: Vec<String> = log.entries().take(MAX_PERSISTED).map(String::from).collect();

        let mut replayed = ResultLog::new(log.into_store());
        assert!(!replayed.has_results());
        assert_eq!(replayed.restore().unwrap(), MAX_PERSISTED);
        assert_eq!(replayed.entries().map(String::from).collect::<Vec<_>>(), shown);
        assert!(replayed.has_results());
    }

    #[test]
    fn test_restore_empty_keeps_header_hidden() {
        let mut log = ResultLog::new(MemoryStore::new());
        assert_eq!(log.restore().unwrap(), 0);
        assert!(!log.has_results());
    }

    #[test]
    fn test_corrupt_history_is_storage_error() {
        let mut store = MemoryStore::new();
        store.set(RESULTS_KEY, "{not json").unwrap();
        let mut log = ResultLog::new(store);

        let err = log.load_all().unwrap_err();
        assert!(matches!(err, EngineError::Storage(_)), "got: {err}");
    }

    #[test]
    fn test_persist_replaces_corrupt_history() {
        let mut store = MemoryStore::new();
        store.set(RESULTS_KEY, "42").unwrap();
        let mut log = ResultLog::new(store);

        log.persist("fresh").unwrap();
        assert_eq!(stored(&log), vec!["fresh".to_string()]);
    }

    /// Holds a value but fails every read.
    struct UnreadableStore(MemoryStore);

    impl KeyValueStore for UnreadableStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(EngineError::Storage("read failed".to_string()))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }
    }

    #[test]
    fn test_persist_keeps_history_when_store_unreadable() {
        let mut inner = MemoryStore::new();
        inner.set(RESULTS_KEY, r#"["a","b","c"]"#).unwrap();
        let mut log = ResultLog::new(UnreadableStore(inner));

        let err = log.persist("new").unwrap_err();
        assert!(matches!(err, EngineError::Storage(_)), "got: {err}");
        assert_eq!(
            log.store().0.get(RESULTS_KEY).unwrap().as_deref(),
            Some(r#"["a","b","c"]"#)
        );
    }

    #[test]
    fn test_record_shows_entry_when_store_unreadable() {
        let mut log = ResultLog::new(UnreadableStore(MemoryStore::new()));
        assert!(log.record("shown").is_err());
        assert_eq!(log.entries().collect::<Vec<_>>(), vec!["shown"]);
        assert_eq!(log.store().0.get(RESULTS_KEY).unwrap(), None);
    }
}
