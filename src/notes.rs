//! Note operations and the view projection.
//!
//! Everything here is pure: each operation takes the current snapshot and
//! returns a new one, leaving the input untouched. Unknown ids are ignored
//! rather than reported, so every operation is total.

use crate::models::{Note, NoteId, NoteView, SortOrder, UNTITLED};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

// ============================================================================
// Identifiers
// ============================================================================

/// Next identifier for a note created at `now`.
///
/// Uses the creation time in milliseconds, bumped past the largest existing
/// id so ids stay unique and increasing even within the same millisecond.
/// If the largest id is `NoteId::MAX`, the lowest unused non-negative id is
/// taken instead.
pub fn next_id(notes: &[Note], now: DateTime<Utc>) -> NoteId {
    let millis = now.timestamp_millis();
    match notes.iter().map(|n| n.id).max() {
        Some(max) if max >= millis => max
            .checked_add(1)
            .unwrap_or_else(|| lowest_free_id(notes)),
        _ => millis,
    }
}

fn lowest_free_id(notes: &[Note]) -> NoteId {
    let used: HashSet<NoteId> = notes.iter().map(|n| n.id).collect();
    (0..=NoteId::MAX)
        .find(|id| !used.contains(id))
        .unwrap_or(NoteId::MIN)
}

fn title_or_untitled(title: &str) -> String {
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Append a new note. Returns `None` when both inputs are blank.
pub fn add_note(
    notes: &[Note],
    title: &str,
    content: &str,
    id: NoteId,
    now: DateTime<Utc>,
) -> Option<Vec<Note>> {
    let title = title.trim();
    let content = content.trim();
    if title.is_empty() && content.is_empty() {
        return None;
    }

    let mut next = notes.to_vec();
    next.push(Note {
        id,
        title: title_or_untitled(title),
        content: content.to_string(),
        pinned: false,
        timestamp: now,
    });
    Some(next)
}

/// Replace title, content and timestamp of the note with `id`.
pub fn update_note(
    notes: &[Note],
    id: NoteId,
    title: &str,
    content: &str,
    now: DateTime<Utc>,
) -> Vec<Note> {
    notes
        .iter()
        .map(|note| {
            if note.id == id {
                Note {
                    title: title_or_untitled(title.trim()),
                    content: content.trim().to_string(),
                    timestamp: now,
                    ..note.clone()
                }
            } else {
                note.clone()
            }
        })
        .collect()
}

pub fn delete_note(notes: &[Note], id: NoteId) -> Vec<Note> {
    notes.iter().filter(|note| note.id != id).cloned().collect()
}

/// Flip the pinned flag. The timestamp is left as it was.
pub fn toggle_pin(notes: &[Note], id: NoteId) -> Vec<Note> {
    notes
        .iter()
        .map(|note| {
            if note.id == id {
                Note {
                    pinned: !note.pinned,
                    ..note.clone()
                }
            } else {
                note.clone()
            }
        })
        .collect()
}

pub fn find_note(notes: &[Note], id: NoteId) -> Option<&Note> {
    notes.iter().find(|note| note.id == id)
}

// ============================================================================
// Projection
// ============================================================================

/// Sort by timestamp in the requested order, then split pinned from regular.
///
/// `sort_by` is stable, so notes with equal timestamps keep their list order.
pub fn project(notes: &[Note], order: SortOrder) -> NoteView {
    let mut sorted = notes.to_vec();
    match order {
        SortOrder::LatestFirst => sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortOrder::OldestFirst => sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
    }

    let (pinned, regular) = sorted.into_iter().partition(|note| note.pinned);
    NoteView { pinned, regular }
}
