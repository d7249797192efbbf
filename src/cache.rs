use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use cnidarium::{StateDelta, StateRead, StateWrite, Storage};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// Key prefix (no trailing slash, cnidarium convention)
const PAGE_PREFIX: &str = "page";

fn page_key(url: &str) -> String {
    format!("{}/{}", PAGE_PREFIX, url)
}

/// Value stored per URL. Empty `content` records a failed fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPage {
    content: String,
    fetched_at: i64,
}

/// Extracted page text keyed by URL, loaded wholesale into memory and
/// written back on [`UrlCache::save`].
///
/// A key being present means the URL was already attempted, even when the
/// stored text is empty. Nothing in here is fatal: an unreadable store leaves
/// an empty, memory-only cache and failed saves are logged.
pub struct UrlCache {
    entries: HashMap<String, StoredPage>,
    /// URLs put since the last successful save.
    pending: HashSet<String>,
    storage: Option<Storage>,
    /// Successful commits since load.
    commits: usize,
}

impl UrlCache {
    /// A cache with no backing store. `save` is a no-op.
    pub fn in_memory() -> Self {
        Self {
            entries: HashMap::new(),
            pending: HashSet::new(),
            storage: None,
            commits: 0,
        }
    }

    /// Open (or create) the store under `data_dir` and read every entry.
    pub async fn load(data_dir: &Path) -> Self {
        let storage = match Self::open(data_dir).await {
            Ok(storage) => storage,
            Err(e) => {
                warn!(
                    path = %data_dir.display(),
                    "Error loading cache, continuing without persistence: {:#}",
                    e
                );
                return Self::in_memory();
            }
        };

        let entries = match Self::read_all(&storage).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error reading cache entries, starting empty: {:#}", e);
                HashMap::new()
            }
        };

        if entries.is_empty() {
            info!(path = %data_dir.display(), "No existing cache found, starting fresh");
        } else {
            info!(path = %data_dir.display(), count = entries.len(), "Loaded URL cache");
        }

        Self {
            entries,
            pending: HashSet::new(),
            storage: Some(storage),
            commits: 0,
        }
    }

    async fn open(data_dir: &Path) -> Result<Storage> {
        std::fs::create_dir_all(data_dir)?;
        Storage::load(data_dir.to_path_buf(), vec![PAGE_PREFIX.to_string()])
            .await
            .context("Failed to init cnidarium storage")
    }

    async fn read_all(storage: &Storage) -> Result<HashMap<String, StoredPage>> {
        let snapshot = storage.latest_snapshot();
        let key_prefix = format!("{}/", PAGE_PREFIX);
        let mut stream = snapshot.prefix_raw(PAGE_PREFIX);
        let mut entries = HashMap::new();

        while let Some(entry) = stream.next().await {
            let (key, value) = entry?;
            let key_str = String::from_utf8_lossy(key.as_bytes());
            let Some(url) = key_str.strip_prefix(&key_prefix) else {
                continue;
            };
            match serde_json::from_slice::<StoredPage>(&value) {
                Ok(page) => {
                    entries.insert(url.to_string(), page);
                }
                Err(e) => warn!(url, "Skipping corrupt cache entry: {}", e),
            }
        }

        Ok(entries)
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(|p| p.content.as_str())
    }

    /// Record the outcome of a fetch. Pass an empty string for failures.
    pub fn put(&mut self, url: &str, content: String) {
        self.entries.insert(
            url.to_string(),
            StoredPage {
                content,
                fetched_at: chrono::Utc::now().timestamp(),
            },
        );
        self.pending.insert(url.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Write the in-memory map to the store. Entries read at load time are
    /// already stored, so only URLs put since the last save are committed.
    pub async fn save(&mut self) {
        let Some(storage) = &self.storage else {
            debug!(count = self.entries.len(), "Cache has no backing store, skipping save");
            return;
        };
        if self.pending.is_empty() {
            debug!(count = self.entries.len(), "Cache unchanged since last save");
            return;
        }

        let mut delta = StateDelta::new(storage.latest_snapshot());
        for url in &self.pending {
            let Some(page) = self.entries.get(url) else {
                continue;
            };
            match serde_json::to_vec(page) {
                Ok(bytes) => delta.put_raw(page_key(url), bytes),
                Err(e) => warn!(url, "Failed to serialize cache entry: {}", e),
            }
        }

        match storage.commit(delta).await {
            Ok(_) => {
                info!(
                    count = self.entries.len(),
                    written = self.pending.len(),
                    "Saved URL cache"
                );
                self.pending.clear();
                self.commits += 1;
            }
            Err(e) => warn!("Error saving cache: {:#}", e),
        }
    }

    /// Release the backing store so it can be reopened.
    pub async fn close(self) {
        if let Some(storage) = self.storage {
            storage.release().await;
        }
    }
}
