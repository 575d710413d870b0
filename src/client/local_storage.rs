use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// Synchronous string key-value storage scoped to one client profile, the
/// same shape as a browser's `localStorage`.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        items.remove(key);
        Ok(())
    }
}

/// Stores each key as a file under a profile directory.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_round_trips_and_removes() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("profile"));
        assert_eq!(storage.get_item("drafts").unwrap(), None);

        storage.set_item("drafts", "[]").unwrap();
        assert_eq!(storage.get_item("drafts").unwrap().as_deref(), Some("[]"));

        storage.remove_item("drafts").unwrap();
        assert_eq!(storage.get_item("drafts").unwrap(), None);
        // removing twice is fine
        storage.remove_item("drafts").unwrap();
    }

    #[test]
    fn file_storage_keeps_keys_inside_root() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.set_item("../escape", "x").unwrap();
        assert!(temp.path().join("___escape.json").exists());
    }
}
