//! Edit session over a note store.
//!
//! Holds the title/content inputs and the note being edited. Submitting
//! either adds a new note or updates the edited one, then resets the inputs.

use crate::models::{NoteId, NoteView, SortOrder};
use crate::storage::{KeyValueStore, StorageError};
use crate::store::NoteStore;

/// Outcome of `NoteEditor::submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Added(NoteId),
    Updated(NoteId),
    /// Both inputs were blank, or the edited note no longer exists. In the
    /// second case the inputs are kept.
    Ignored,
}

pub struct NoteEditor<S: KeyValueStore> {
    store: NoteStore<S>,
    title_input: String,
    content_input: String,
    editing: Option<NoteId>,
}

impl<S: KeyValueStore> NoteEditor<S> {
    pub fn new(store: NoteStore<S>) -> Self {
        Self {
            store,
            title_input: String::new(),
            content_input: String::new(),
            editing: None,
        }
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn title_input(&self) -> &str {
        &self.title_input
    }

    pub fn content_input(&self) -> &str {
        &self.content_input
    }

    pub fn editing(&self) -> Option<NoteId> {
        self.editing
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title_input = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content_input = content.into();
    }

    /// Load a note into the inputs. Returns false if the id is unknown.
    pub fn begin_edit(&mut self, id: NoteId) -> bool {
        let Some(note) = self.store.get(id) else {
            return false;
        };
        self.title_input = note.title.clone();
        self.content_input = note.content.clone();
        self.editing = Some(id);
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.clear_inputs();
    }

    pub fn submit(&mut self) -> Result<Submitted, StorageError> {
        if self.title_input.trim().is_empty() && self.content_input.trim().is_empty() {
            return Ok(Submitted::Ignored);
        }

        let outcome = match self.editing {
            Some(id) => {
                let updated = self
                    .store
                    .update(id, &self.title_input, &self.content_input)?;
                self.editing = None;
                if !updated {
                    // The note is gone; keep the typed text so it can be
                    // submitted again as a new note.
                    return Ok(Submitted::Ignored);
                }
                Submitted::Updated(id)
            }
            None => match self.store.add(&self.title_input, &self.content_input)? {
                Some(id) => Submitted::Added(id),
                None => Submitted::Ignored,
            },
        };

        self.clear_inputs();
        Ok(outcome)
    }

    /// Delete a note. Once the note under edit is gone from the store the
    /// session ends, even if the write failed.
    pub fn delete(&mut self, id: NoteId) -> Result<bool, StorageError> {
        let result = self.store.delete(id);
        if let Some(editing) = self.editing {
            if self.store.get(editing).is_none() {
                self.cancel_edit();
            }
        }
        result
    }

    pub fn toggle_pin(&mut self, id: NoteId) -> Result<bool, StorageError> {
        self.store.toggle_pin(id)
    }

    pub fn toggle_sort_order(&mut self) -> Result<SortOrder, StorageError> {
        self.store.toggle_sort_order()
    }

    pub fn view(&self) -> NoteView {
        self.store.view()
    }

    fn clear_inputs(&mut self) {
        self.title_input.clear();
        self.content_input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::cell::Cell;

    fn editor() -> NoteEditor<MemoryStorage> {
        NoteEditor::new(NoteStore::load(MemoryStorage::new()))
    }

    /// Memory storage whose writes can be switched to fail.
    #[derive(Default)]
    struct FailingStorage {
        inner: MemoryStorage,
        fail_writes: Cell<bool>,
    }

    impl KeyValueStore for FailingStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.get() {
                return Err(StorageError::Poisoned);
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            if self.fail_writes.get() {
                return Err(StorageError::Poisoned);
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_submit_adds_then_clears_inputs() {
        let mut editor = editor();
        editor.set_title("Groceries");
        editor.set_content("Milk, eggs");
        let outcome = editor.submit().unwrap();

        let Submitted::Added(id) = outcome else {
            panic!("expected add, got {:?}", outcome);
        };
        let note = editor.store().get(id).unwrap();
        assert_eq!(note.content, "Milk, eggs");
        assert!(!note.pinned);
        assert_eq!(editor.title_input(), "");
        assert_eq!(editor.content_input(), "");
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut editor = editor();
        editor.set_title("   ");
        assert_eq!(editor.submit().unwrap(), Submitted::Ignored);
        assert!(editor.store().notes().is_empty());
    }

    #[test]
    fn test_edit_session_updates_existing_note() {
        let mut editor = editor();
        editor.set_title("Draft");
        let Submitted::Added(id) = editor.submit().unwrap() else {
            panic!("expected add");
        };
        editor.toggle_pin(id).unwrap();

        assert!(editor.begin_edit(id));
        assert_eq!(editor.title_input(), "Draft");
        editor.set_content("Final text");
        assert_eq!(editor.submit().unwrap(), Submitted::Updated(id));

        assert_eq!(editor.editing(), None);
        assert_eq!(editor.store().notes().len(), 1);
        let note = editor.store().get(id).unwrap();
        assert_eq!(note.content, "Final text");
        assert!(note.pinned);
    }

    #[test]
    fn test_deleting_edited_note_clears_session() {
        let mut editor = editor();
        editor.set_title("Doomed");
        let Submitted::Added(id) = editor.submit().unwrap() else {
            panic!("expected add");
        };

        editor.begin_edit(id);
        editor.set_content("half-typed");
        assert!(editor.delete(id).unwrap());

        assert_eq!(editor.editing(), None);
        assert_eq!(editor.title_input(), "");
        assert_eq!(editor.content_input(), "");
        assert!(editor.view().is_empty());
    }

    #[test]
    fn test_deleting_other_note_keeps_session() {
        let mut editor = editor();
        editor.set_title("one");
        let Submitted::Added(first) = editor.submit().unwrap() else {
            panic!("expected add");
        };
        editor.set_title("two");
        let Submitted::Added(second) = editor.submit().unwrap() else {
            panic!("expected add");
        };

        editor.begin_edit(first);
        editor.delete(second).unwrap();
        assert_eq!(editor.editing(), Some(first));
        assert_eq!(editor.title_input(), "one");
    }

    #[test]
    fn test_cancel_and_unknown_begin_edit() {
        let mut editor = editor();
        assert!(!editor.begin_edit(12345));
        editor.set_title("typed");
        editor.cancel_edit();
        assert_eq!(editor.title_input(), "");
        assert_eq!(editor.editing(), None);
    }

    #[test]
    fn test_failed_delete_of_edited_note_keeps_typed_text_safe() {
        let mut editor = NoteEditor::new(NoteStore::load(FailingStorage::default()));
        editor.set_title("Draft");
        let Submitted::Added(id) = editor.submit().unwrap() else {
            panic!("expected add");
        };

        editor.begin_edit(id);
        editor.store().storage().fail_writes.set(true);
        assert!(editor.delete(id).is_err());
        assert!(editor.store().get(id).is_none());
        assert_eq!(editor.editing(), None);

        editor.store().storage().fail_writes.set(false);
        editor.set_content("important typed text");
        let Submitted::Added(new_id) = editor.submit().unwrap() else {
            panic!("expected the text to be saved as a new note");
        };
        assert_eq!(
            editor.store().get(new_id).unwrap().content,
            "important typed text"
        );
    }

    #[test]
    fn test_submit_for_vanished_note_keeps_inputs() {
        let mut editor = editor();
        editor.editing = Some(424242);
        editor.set_title("kept");
        editor.set_content("still here");

        assert_eq!(editor.submit().unwrap(), Submitted::Ignored);
        assert_eq!(editor.editing(), None);
        assert_eq!(editor.title_input(), "kept");
        assert_eq!(editor.content_input(), "still here");
        assert!(editor.store().notes().is_empty());
    }
}
