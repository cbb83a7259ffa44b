//! Recently used products, persisted across sessions.
//!
//! The list is stored under a fixed key as a JSON array of `{id, label}`,
//! most recent first, capped at [`MAX_RECENT_PRODUCTS`]. Anything unreadable
//! is treated as an empty list.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::RecentConfig;
use crate::types::ProductRef;

/// Storage key of the recent-products list.
pub const RECENT_PRODUCTS_KEY: &str = "inventario.movimientos.recent_products";

/// Maximum number of remembered products.
pub const MAX_RECENT_PRODUCTS: usize = 5;

static TEMP_SUFFIX_COUNTER: AtomicU64 = AtomicU64::new(0);

/// String key/value persistence.
pub trait KeyValueStorage: Send + Sync {
    /// Read a key. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, String>;

    fn set(&self, key: &str, value: &str) -> Result<(), String>;
}

/// Volatile storage, for tests and for hosts without a writable disk.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        match self.values.lock() {
            Ok(guard) => Ok(guard.get(key).cloned()),
            Err(poisoned) => Ok(poisoned.into_inner().get(key).cloned()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        match self.values.lock() {
            Ok(mut guard) => {
                guard.insert(key.to_string(), value.to_string());
            }
            Err(poisoned) => {
                poisoned
                    .into_inner()
                    .insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}

/// One JSON file per key under a directory. Writes go through a temp file
/// and a rename so a crash never leaves a half-written list behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("read {}: {err}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|err| format!("create storage directory {}: {err}", self.dir.display()))?;
        let path = self.path_for(key);
        let temp = temp_path(&path);
        write_file_synced(&temp, value.as_bytes())?;
        if let Err(err) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(format!(
                "rename {} -> {}: {err}",
                temp.display(),
                path.display()
            ));
        }
        Ok(())
    }
}

fn write_file_synced(path: &Path, bytes: &[u8]) -> Result<(), String> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .map_err(|err| format!("open {}: {err}", path.display()))?;
    file.write_all(bytes)
        .map_err(|err| format!("write {}: {err}", path.display()))?;
    file.sync_all()
        .map_err(|err| format!("sync {}: {err}", path.display()))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let pid = std::process::id();
    let suffix = TEMP_SUFFIX_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut os = path.as_os_str().to_os_string();
    os.push(format!(".tmp-{pid}-{suffix}"));
    PathBuf::from(os)
}

/// Bounded most-recent-first product list on top of a [`KeyValueStorage`].
#[derive(Clone)]
pub struct RecentProductsStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl RecentProductsStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            key: RECENT_PRODUCTS_KEY.to_string(),
        }
    }

    /// File-backed store under the configured `recent.storage_dir`.
    pub fn from_config(cfg: &RecentConfig) -> Self {
        Self::new(Arc::new(FileStorage::new(cfg.storage_dir.clone())))
    }

    /// Store without persistence beyond the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Current list. Missing, unreadable or corrupt data yields an empty list.
    pub fn load(&self) -> Vec<ProductRef> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "recent products unreadable");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ProductRef>>(&raw) {
            Ok(items) => sanitize(items),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "recent products corrupt; ignoring");
                Vec::new()
            }
        }
    }

    /// Move `product` to the front, dedupe by id, cap and persist. Returns
    /// the new list. Persistence failures are logged and otherwise ignored.
    pub fn record(&self, product: &ProductRef) -> Vec<ProductRef> {
        if product.id.trim().is_empty() {
            return self.load();
        }
        let mut items = self.load();
        items.retain(|p| p.id != product.id);
        items.insert(0, product.clone());
        items.truncate(MAX_RECENT_PRODUCTS);

        match serde_json::to_string(&items) {
            Ok(encoded) => {
                if let Err(err) = self.storage.set(&self.key, &encoded) {
                    tracing::warn!(key = %self.key, error = %err, "recent products not saved");
                }
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "recent products not encoded");
            }
        }
        items
    }
}

fn sanitize(items: Vec<ProductRef>) -> Vec<ProductRef> {
    let mut out: Vec<ProductRef> = Vec::with_capacity(MAX_RECENT_PRODUCTS);
    for item in items {
        if item.id.trim().is_empty() || out.iter().any(|p| p.id == item.id) {
            continue;
        }
        out.push(item);
        if out.len() == MAX_RECENT_PRODUCTS {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(n: u32) -> ProductRef {
        ProductRef::new(format!("P{n}"), format!("Producto {n}"))
    }

    fn ids(items: &[ProductRef]) -> Vec<&str> {
        items.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn configured_store_persists_under_storage_dir() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir: {err}"),
        };
        let cfg = RecentConfig {
            storage_dir: dir.path().join("recent"),
        };
        RecentProductsStore::from_config(&cfg).record(&product(3));

        let reopened = RecentProductsStore::from_config(&cfg);
        assert_eq!(ids(&reopened.load()), vec!["P3"]);
        assert!(FileStorage::new(cfg.storage_dir.clone())
            .path_for(RECENT_PRODUCTS_KEY)
            .exists());
    }

    #[test]
    fn six_selections_keep_five_most_recent() {
        let store = RecentProductsStore::in_memory();
        for n in 1..=6 {
            store.record(&product(n));
        }
        assert_eq!(ids(&store.load()), vec!["P6", "P5", "P4", "P3", "P2"]);
    }

    #[test]
    fn reselecting_moves_to_front_without_duplicates() {
        let store = RecentProductsStore::in_memory();
        store.record(&product(1));
        store.record(&product(2));
        let list = store.record(&product(1));
        assert_eq!(ids(&list), vec!["P1", "P2"]);
    }

    #[test]
    fn empty_id_is_not_recorded() {
        let store = RecentProductsStore::in_memory();
        store.record(&product(1));
        let list = store.record(&ProductRef::new(" ", "nada"));
        assert_eq!(ids(&list), vec!["P1"]);
    }

    #[test]
    fn corrupt_storage_reads_as_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(RECENT_PRODUCTS_KEY, "{not json").unwrap_or_default();
        let store = RecentProductsStore::new(storage.clone());
        assert!(store.load().is_empty());

        let list = store.record(&product(3));
        assert_eq!(ids(&list), vec!["P3"]);
    }

    #[test]
    fn oversized_or_duplicated_payload_is_sanitized() {
        let storage = Arc::new(MemoryStorage::new());
        let payload = r#"[{"id":"a","label":"A"},{"id":"a","label":"A2"},{"id":"","label":"x"},
            {"id":"b","label":"B"},{"id":"c","label":"C"},{"id":"d","label":"D"},
            {"id":"e","label":"E"},{"id":"f","label":"F"}]"#;
        storage.set(RECENT_PRODUCTS_KEY, payload).unwrap_or_default();
        let store = RecentProductsStore::new(storage);
        assert_eq!(ids(&store.load()), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn file_storage_round_trips() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir: {err}"),
        };
        let storage = Arc::new(FileStorage::new(dir.path().join("state")));
        let store = RecentProductsStore::new(storage.clone());
        store.record(&product(1));
        store.record(&product(2));

        let reopened = RecentProductsStore::new(Arc::new(FileStorage::new(dir.path().join("state"))));
        assert_eq!(ids(&reopened.load()), vec!["P2", "P1"]);

        let path = storage.path_for(RECENT_PRODUCTS_KEY);
        assert!(path.ends_with("inventario.movimientos.recent_products.json"));
    }

    #[test]
    fn unreadable_file_reads_as_empty() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir: {err}"),
        };
        let storage = FileStorage::new(dir.path());
        // A directory where the file should be makes the read fail.
        if let Err(err) = fs::create_dir_all(storage.path_for(RECENT_PRODUCTS_KEY)) {
            panic!("mkdir: {err}");
        }
        let store = RecentProductsStore::new(Arc::new(storage));
        assert!(store.load().is_empty());
    }
}
