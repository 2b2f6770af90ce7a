//! The VIP watchlist: an ordered set of users, unique by id.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::json_file;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipEntry {
    pub id: String,
    pub username: String,
}

impl VipEntry {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

/// Persistent VIP list
pub trait VipRegistry: Send + Sync {
    /// Entries in insertion order
    fn list(&self) -> Vec<VipEntry>;

    /// Returns `false` when `id` was already present.
    fn add(&self, id: &str, username: &str) -> Result<bool>;

    /// Returns `false` when `id` was not present.
    fn remove(&self, id: &str) -> Result<bool>;

    fn contains(&self, id: &str) -> bool {
        self.list().iter().any(|entry| entry.id == id)
    }

    /// Case-insensitive lookup by stored username, `@` prefix allowed.
    fn find_by_username(&self, username: &str) -> Option<VipEntry> {
        let wanted = username.trim_start_matches('@');
        self.list()
            .into_iter()
            .find(|entry| entry.username.eq_ignore_ascii_case(wanted))
    }
}

/// [`VipRegistry`] backed by `vip_users.json`
pub struct JsonVipRegistry {
    path: PathBuf,
    entries: RwLock<Vec<VipEntry>>,
}

impl JsonVipRegistry {
    /// Load the list at `path`; a missing or unreadable file is an empty list.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loaded: Vec<VipEntry> = json_file::load_or(&path, Vec::new());

        // Files edited by hand may carry duplicates
        let mut entries: Vec<VipEntry> = Vec::with_capacity(loaded.len());
        for entry in loaded {
            if !entries.iter().any(|e| e.id == entry.id) {
                entries.push(entry);
            }
        }

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl VipRegistry for JsonVipRegistry {
    fn list(&self) -> Vec<VipEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn add(&self, id: &str, username: &str) -> Result<bool> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|entry| entry.id == id) {
            return Ok(false);
        }

        let mut updated = entries.clone();
        updated.push(VipEntry::new(id, username));
        json_file::save(&self.path, updated.as_slice())?;
        *entries = updated;
        tracing::debug!(user_id = id, "added VIP");
        Ok(true)
    }

    fn remove(&self, id: &str) -> Result<bool> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.iter().any(|entry| entry.id == id) {
            return Ok(false);
        }

        let updated: Vec<VipEntry> = entries.iter().filter(|entry| entry.id != id).cloned().collect();
        json_file::save(&self.path, updated.as_slice())?;
        *entries = updated;
        tracing::debug!(user_id = id, "removed VIP");
        Ok(true)
    }

    fn contains(&self, id: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_unique_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonVipRegistry::open(dir.path().join("vip_users.json"));

        assert!(registry.add("U1", "ada").unwrap());
        assert!(!registry.add("U1", "ada.renamed").unwrap());
        assert!(registry.add("U2", "grace").unwrap());

        assert_eq!(
            registry.list(),
            vec![VipEntry::new("U1", "ada"), VipEntry::new("U2", "grace")]
        );
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vip_users.json");
        {
            let registry = JsonVipRegistry::open(&path);
            registry.add("U1", "ada").unwrap();
            registry.add("U2", "grace").unwrap();
            assert!(registry.remove("U1").unwrap());
        }

        let registry = JsonVipRegistry::open(&path);
        assert_eq!(registry.list(), vec![VipEntry::new("U2", "grace")]);
        assert!(registry.contains("U2"));
        assert!(!registry.contains("U1"));
    }

    #[test]
    fn test_remove_absent_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonVipRegistry::open(dir.path().join("vip_users.json"));
        assert!(!registry.remove("U9").unwrap());
        assert!(!dir.path().join("vip_users.json").exists());
    }

    #[test]
    fn test_reads_existing_format_and_drops_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vip_users.json");
        std::fs::write(
            &path,
            r#"[{"id": "U1", "username": "ada"}, {"id": "U1", "username": "ada"}, {"id": "U3", "username": "linus"}]"#,
        )
        .unwrap();

        let registry = JsonVipRegistry::open(&path);
        assert_eq!(registry.list().len(), 2);
    }

    #[test]
    fn test_failed_save_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonVipRegistry::open(dir.path().join("missing_dir").join("vip_users.json"));

        assert!(registry.add("U1", "ada").is_err());
        assert!(registry.list().is_empty());
        assert!(!registry.contains("U1"));

        std::fs::create_dir(dir.path().join("missing_dir")).unwrap();
        assert!(registry.add("U1", "ada").unwrap());
        assert!(registry.path().exists());
    }

    #[test]
    fn test_failed_remove_keeps_entry() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        let registry = JsonVipRegistry::open(nested.join("vip_users.json"));
        registry.add("U1", "ada").unwrap();

        std::fs::remove_dir_all(&nested).unwrap();
        assert!(registry.remove("U1").is_err());
        assert!(registry.contains("U1"));
    }

    #[test]
    fn test_find_by_username() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonVipRegistry::open(dir.path().join("vip_users.json"));
        registry.add("U1", "Ada").unwrap();

        assert_eq!(registry.find_by_username("@ada").map(|e| e.id), Some("U1".to_string()));
        assert_eq!(registry.find_by_username("grace"), None);
    }
}
