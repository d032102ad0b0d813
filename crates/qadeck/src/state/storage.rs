use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const STEP_KEY: &str = "step";
pub const HIGHLIGHTS_KEY: &str = "highlights";

/// The keys the step store reads and writes.
pub const STATE_KEYS: [&str; 2] = [STEP_KEY, HIGHLIGHTS_KEY];

/// Client-local key/value storage shared by every window showing the same deck.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One file per key inside a per-deck directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read state key '{key}'")),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        // Write-then-rename so a concurrent reader never sees a half-written value.
        let tmp = self.dir.join(format!(".{key}.tmp"));
        std::fs::write(&tmp, value)
            .with_context(|| format!("Failed to write state key '{key}'"))?;
        std::fs::rename(&tmp, self.key_path(key))
            .with_context(|| format!("Failed to write state key '{key}'"))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove state key '{key}'")),
        }
    }
}

/// In-memory store. Clones share the same entries, which makes two clones
/// behave like two windows on one deck.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: std::sync::Arc<std::sync::Mutex<std::collections::HashMap<String, String>>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// Directory holding the state of one deck under `root`.
///
/// The directory name is derived from the deck's absolute path, so every
/// window opened on the same file shares it.
pub fn deck_state_dir(root: &Path, deck: &Path) -> PathBuf {
    let absolute = std::fs::canonicalize(deck).unwrap_or_else(|_| deck.to_path_buf());
    root.join(deck_key(&absolute))
}

fn deck_key(path: &Path) -> String {
    let key: String = path
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    let key = key.trim_matches('_');
    if key.is_empty() {
        "deck".to_string()
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never-created"));
        assert_eq!(store.get(STEP_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("deck"));
        store.set(STEP_KEY, "3").unwrap();
        store.set(HIGHLIGHTS_KEY, "[0,1]").unwrap();
        assert_eq!(store.get(STEP_KEY).unwrap().as_deref(), Some("3"));
        assert_eq!(store.get(HIGHLIGHTS_KEY).unwrap().as_deref(), Some("[0,1]"));

        store.remove(STEP_KEY).unwrap();
        assert_eq!(store.get(STEP_KEY).unwrap(), None);
        // Removing twice is fine.
        store.remove(STEP_KEY).unwrap();
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        store.set(STEP_KEY, "1").unwrap();
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![STEP_KEY.to_string()]);
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        a.set(STEP_KEY, "5").unwrap();
        assert_eq!(b.get(STEP_KEY).unwrap().as_deref(), Some("5"));
    }

    #[test]
    fn test_deck_key_is_filesystem_safe() {
        let key = deck_key(Path::new("/home/me/talks/little rust.md"));
        assert_eq!(key, "home_me_talks_little_rust.md");
    }

    #[test]
    fn test_deck_state_dir_is_stable() {
        let root = Path::new("/tmp/qadeck-state");
        let deck = Path::new("/nonexistent/deck.md");
        assert_eq!(deck_state_dir(root, deck), deck_state_dir(root, deck));
        assert!(deck_state_dir(root, deck).starts_with(root));
    }
}
