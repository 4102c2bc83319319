//! The note store: current snapshot plus sort preference, mirrored into a
//! `KeyValueStore` after every change.

use chrono::Utc;
use tracing::{debug, warn};

use crate::models::{Note, NoteId, NoteView, SortOrder};
use crate::notes;
use crate::storage::{KeyValueStore, StorageError, NOTES_KEY, SORT_KEY};

pub struct NoteStore<S: KeyValueStore> {
    storage: S,
    notes: Vec<Note>,
    order: SortOrder,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Initialize from storage. Missing or malformed values fall back to an
    /// empty list and latest-first ordering.
    pub fn load(storage: S) -> Self {
        let notes = read_json::<Vec<Note>>(&storage, NOTES_KEY).unwrap_or_default();
        let order = read_json::<bool>(&storage, SORT_KEY)
            .map(SortOrder::from_latest_first)
            .unwrap_or_default();

        debug!(count = notes.len(), ?order, "loaded note store");

        Self {
            storage,
            notes,
            order,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        notes::find_note(&self.notes, id)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order
    }

    /// Pinned and regular lists in the current sort order.
    pub fn view(&self) -> NoteView {
        notes::project(&self.notes, self.order)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a note. Returns the new id, or `None` when both inputs are blank.
    pub fn add(&mut self, title: &str, content: &str) -> Result<Option<NoteId>, StorageError> {
        let now = Utc::now();
        let id = notes::next_id(&self.notes, now);
        match notes::add_note(&self.notes, title, content, id, now) {
            Some(next) => {
                self.commit(next)?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Update a note's title and content. Returns whether a note matched.
    pub fn update(&mut self, id: NoteId, title: &str, content: &str) -> Result<bool, StorageError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next = notes::update_note(&self.notes, id, title, content, Utc::now());
        self.commit(next)?;
        Ok(true)
    }

    pub fn delete(&mut self, id: NoteId) -> Result<bool, StorageError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next = notes::delete_note(&self.notes, id);
        self.commit(next)?;
        Ok(true)
    }

    pub fn toggle_pin(&mut self, id: NoteId) -> Result<bool, StorageError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next = notes::toggle_pin(&self.notes, id);
        self.commit(next)?;
        Ok(true)
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> Result<(), StorageError> {
        self.order = order;
        self.storage
            .set(SORT_KEY, &serde_json::Value::Bool(order.is_latest_first()).to_string())
    }

    pub fn toggle_sort_order(&mut self) -> Result<SortOrder, StorageError> {
        let order = self.order.toggled();
        self.set_sort_order(order)?;
        Ok(order)
    }

    /// Swap in a new snapshot and write the full list.
    fn commit(&mut self, next: Vec<Note>) -> Result<(), StorageError> {
        self.notes = next;
        let encoded = serde_json::to_string(&self.notes)?;
        self.storage.set(NOTES_KEY, &encoded)
    }
}

/// Read and decode a JSON value, treating absence, read errors and bad JSON
/// alike as "nothing stored".
fn read_json<T: serde::de::DeserializeOwned>(storage: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!("Failed to read '{}' from storage: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding malformed '{}' value: {}", key, e);
            None
        }
    }
}
