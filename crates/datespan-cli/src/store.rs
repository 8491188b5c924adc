use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use datespan_engine::error::Result as EngineResult;
use datespan_engine::{EngineError, KeyValueStore};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const STORE_FILE: &str = "store.json";

/// A key-value store kept as one JSON object on disk.
///
/// Every `set` rewrites the whole file through a temp file in the same
/// directory, so a crash leaves either the old or the new contents. A file
/// that does not parse opens as an empty store and is replaced on the next
/// `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let path = data_dir.join(STORE_FILE);
        let entries = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(
                        store = %path.display(),
                        error = %err,
                        "store is not a JSON object, starting empty"
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!(store = %path.display(), keys = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    fn save(&self) -> anyhow::Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, &self.entries)?;
        writeln!(temp)?;
        temp.flush()?;
        temp.persist(&self.path)
            .with_context(|| format!("failed to persist {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> EngineResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.save()
            .map_err(|e| EngineError::Storage(format!("{e:#}")))?;
        debug!(key, store = %self.path.display(), "store written");
        Ok(())
    }
}
