//! List store for list and membership persistence.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use dinelog_models::{ItemId, ItemRef, List, ListId, ListItem, PositionUpdate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::atomic::{atomic_write_json, read_json};
use crate::error::{PersistenceError, Result};

/// On-disk record: a list and every item it holds.
///
/// Keeping a list's rows in one file makes a position batch a single
/// atomic rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRecord {
    pub list: List,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

impl ListRecord {
    fn new(list: List) -> Self {
        Self {
            list,
            items: Vec::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if item.list_id != self.list.id {
                return Err(PersistenceError::InvalidData(format!(
                    "item {} claims list {} but is stored in {}",
                    item.id, item.list_id, self.list.id
                )));
            }
            if !seen.insert(&item.id) {
                return Err(PersistenceError::InvalidData(format!(
                    "duplicate item {} in list {}",
                    item.id, self.list.id
                )));
            }
        }
        Ok(())
    }
}

/// Manages persistence of lists and their items.
///
/// Each list is stored as one JSON file:
/// ```text
/// base_path/
/// └── lists/
///     ├── list-abc123.json
///     └── list-def456.json
/// ```
pub struct FileListStore {
    base_path: PathBuf,
    /// Serializes read-modify-write cycles on this store.
    write_lock: Mutex<()>,
}

impl FileListStore {
    /// Creates a new FileListStore with the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path to the lists directory.
    fn lists_dir(&self) -> PathBuf {
        self.base_path.join("lists")
    }

    /// Returns the path to a specific list file.
    fn list_path(&self, id: &ListId) -> PathBuf {
        self.lists_dir().join(format!("{}.json", id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| PersistenceError::LockPoisoned(e.to_string()))
    }

    fn read_record(&self, id: &ListId) -> Result<ListRecord> {
        let path = self.list_path(id);
        if !path.exists() {
            return Err(PersistenceError::not_found("list", id));
        }
        let record: ListRecord = read_json(&path)?;
        record.validate()?;
        Ok(record)
    }

    fn write_record(&self, record: &ListRecord) -> Result<()> {
        record.validate()?;
        atomic_write_json(&self.list_path(&record.list.id), record)
    }

    /// Saves list metadata, keeping any items already stored.
    pub fn save_list(&self, list: &List) -> Result<()> {
        let _guard = self.lock()?;
        let record = match self.read_record(&list.id) {
            Ok(mut existing) => {
                existing.list = list.clone();
                existing
            }
            Err(PersistenceError::NotFound { .. }) => ListRecord::new(list.clone()),
            Err(e) => return Err(e),
        };
        self.write_record(&record)
    }

    /// Loads a list by ID.
    pub fn load_list(&self, id: &ListId) -> Result<List> {
        self.read_record(id).map(|record| record.list)
    }

    /// Loads every item of a list, in storage order.
    pub fn load_items(&self, id: &ListId) -> Result<Vec<ListItem>> {
        self.read_record(id).map(|record| record.items)
    }

    /// Lists all list IDs.
    pub fn list_ids(&self) -> Result<Vec<ListId>> {
        let dir = self.lists_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|source| PersistenceError::ReadError {
            path: dir.clone(),
            source,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PersistenceError::ReadError {
                path: dir.clone(),
                source,
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(ListId::from(stem));
                }
            }
        }

        Ok(ids)
    }

    /// Rewrites the positions of a batch of items in one atomic write.
    ///
    /// Every id must belong to the list; otherwise nothing is written.
    pub fn commit_positions(&self, list_id: &ListId, updates: &[PositionUpdate]) -> Result<()> {
        let _guard = self.lock()?;
        let mut record = self.read_record(list_id)?;

        let mut index: HashMap<&ItemId, usize> = HashMap::with_capacity(record.items.len());
        for (i, item) in record.items.iter().enumerate() {
            index.insert(&item.id, i);
        }

        let mut resolved = Vec::with_capacity(updates.len());
        for update in updates {
            let slot = index
                .get(&update.id)
                .copied()
                .ok_or_else(|| PersistenceError::not_found("item", &update.id))?;
            resolved.push((slot, update.position));
        }

        for (slot, position) in resolved {
            record.items[slot].position = position;
        }

        self.write_record(&record)?;
        debug!(list_id = %list_id, rows = updates.len(), "committed positions");
        Ok(())
    }

    /// Appends a new item after the current last position.
    pub fn add_item(&self, list_id: &ListId, target: ItemRef) -> Result<ListItem> {
        let _guard = self.lock()?;
        let mut record = self.read_record(list_id)?;

        let position = match record.items.iter().map(|item| item.position).max() {
            None => 0,
            Some(max) => max.checked_add(1).ok_or_else(|| {
                PersistenceError::InvalidData(format!(
                    "list {} has no position left after {}",
                    list_id, max
                ))
            })?,
        };

        let item = ListItem::new(list_id.clone(), target, position);
        record.items.push(item.clone());
        self.write_record(&record)?;

        Ok(item)
    }

    /// Removes an item from whichever list holds it.
    ///
    /// Sibling positions are left untouched. Returns the owning list's ID.
    pub fn remove_item(&self, item_id: &ItemId) -> Result<ListId> {
        let _guard = self.lock()?;

        for list_id in self.list_ids()? {
            let mut record = match self.read_record(&list_id) {
                Ok(record) => record,
                Err(e) => {
                    warn!(list_id = %list_id, error = %e, "skipping unreadable list record");
                    continue;
                }
            };

            let before = record.items.len();
            record.items.retain(|item| item.id != *item_id);
            if record.items.len() != before {
                self.write_record(&record)?;
                return Ok(list_id);
            }
        }

        Err(PersistenceError::not_found("item", item_id))
    }

    /// Deletes a list and all of its items.
    pub fn delete_list(&self, id: &ListId) -> Result<()> {
        let _guard = self.lock()?;
        let path = self.list_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| PersistenceError::WriteError { path, source })?;
        }
        Ok(())
    }
}
