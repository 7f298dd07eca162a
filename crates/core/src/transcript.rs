//! Transcript entries and the store that owns them.
//!
//! The store is the single writer of the conversation; views only read whole
//! snapshots of it through [`TranscriptStore`]. [`SharedTranscript`] is the
//! in-process implementation: a cloneable handle over an `RwLock` that bumps a
//! revision counter on every mutation so readers can wait for changes.

use crate::error::StoreError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Role::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque entry identifier, stable across in-place updates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub role: Role,
    /// Markdown body; rewritten in place while content streams in
    pub title: String,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub expanded: bool,
}

impl Entry {
    pub fn new(role: Role, title: impl Into<String>) -> Self {
        Self { id: EntryId::new(), role, title: title.into(), is_hidden: false, expanded: false }
    }

    pub fn user(title: impl Into<String>) -> Self {
        Self::new(Role::User, title)
    }

    pub fn assistant(title: impl Into<String>) -> Self {
        Self::new(Role::Assistant, title)
    }

    pub fn with_id(mut self, id: impl Into<EntryId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }
}

/// Read side of the transcript, as consumed by views
pub trait TranscriptStore {
    /// Ordered copy of every entry, hidden ones included
    fn entries(&self) -> Vec<Entry>;

    /// Flip the expand/collapse flag of an entry
    fn toggle_expand(&self, id: &EntryId) -> Result<(), StoreError>;

    /// Monotonic counter bumped on every mutation
    fn revision(&self) -> u64;
}

#[derive(Debug, Default)]
struct TranscriptLog {
    entries: Vec<Entry>,
    revision: u64,
}

#[derive(Debug)]
struct Shared {
    log: RwLock<TranscriptLog>,
    revision_tx: watch::Sender<u64>,
}

/// Cloneable handle to an in-memory transcript
///
/// All clones observe the same entries. Every write bumps the revision and
/// notifies subscribers obtained through [`SharedTranscript::subscribe`].
#[derive(Debug, Clone)]
pub struct SharedTranscript {
    shared: Arc<Shared>,
}

impl SharedTranscript {
    pub fn new() -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self { shared: Arc::new(Shared { log: RwLock::new(TranscriptLog::default()), revision_tx }) }
    }

    /// Create a transcript pre-filled with entries
    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let transcript = Self::new();
        {
            let mut log = transcript.write();
            log.entries.extend(entries);
        }
        transcript
    }

    /// Receiver that yields the revision after each mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision_tx.subscribe()
    }

    /// Append an entry, returning its id
    pub fn push(&self, entry: Entry) -> EntryId {
        let id = entry.id.clone();
        let revision = self.mutate_infallible(|log| log.entries.push(entry));
        tracing::debug!(entry = %id, revision, "transcript entry appended");
        id
    }

    /// Append streamed text to an existing entry's body
    pub fn append_to(&self, id: &EntryId, text: &str) -> Result<(), StoreError> {
        self.mutate(|log| {
            let entry = find_mut(&mut log.entries, id)?;
            entry.title.push_str(text);
            Ok(())
        })
    }

    /// Replace an entry's body
    pub fn set_title(&self, id: &EntryId, title: impl Into<String>) -> Result<(), StoreError> {
        let title = title.into();
        self.mutate(|log| {
            find_mut(&mut log.entries, id)?.title = title;
            Ok(())
        })
    }

    pub fn set_hidden(&self, id: &EntryId, hidden: bool) -> Result<(), StoreError> {
        self.mutate(|log| {
            find_mut(&mut log.entries, id)?.is_hidden = hidden;
            Ok(())
        })
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.mutate_infallible(|log| log.entries.clear());
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    pub fn last_id(&self) -> Option<EntryId> {
        self.read().entries.last().map(|e| e.id.clone())
    }

    fn mutate(&self, f: impl FnOnce(&mut TranscriptLog) -> Result<(), StoreError>) -> Result<(), StoreError> {
        let revision = {
            let mut log = self.write();
            f(&mut log)?;
            log.revision += 1;
            log.revision
        };
        self.shared.revision_tx.send_replace(revision);
        Ok(())
    }

    /// Apply a write that cannot fail, returning the new revision
    fn mutate_infallible(&self, f: impl FnOnce(&mut TranscriptLog)) -> u64 {
        let revision = {
            let mut log = self.write();
            f(&mut log);
            log.revision += 1;
            log.revision
        };
        self.shared.revision_tx.send_replace(revision);
        revision
    }

    fn read(&self) -> RwLockReadGuard<'_, TranscriptLog> {
        self.shared.log.read().unwrap_or_else(|poisoned| {
            tracing::warn!("transcript lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, TranscriptLog> {
        self.shared.log.write().unwrap_or_else(|poisoned| {
            tracing::warn!("transcript lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for SharedTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptStore for SharedTranscript {
    fn entries(&self) -> Vec<Entry> {
        self.read().entries.clone()
    }

    fn toggle_expand(&self, id: &EntryId) -> Result<(), StoreError> {
        self.mutate(|log| {
            let entry = find_mut(&mut log.entries, id)?;
            entry.expanded = !entry.expanded;
            Ok(())
        })
    }

    fn revision(&self) -> u64 {
        self.read().revision
    }
}

fn find_mut<'a>(entries: &'a mut [Entry], id: &EntryId) -> Result<&'a mut Entry, StoreError> {
    entries
        .iter_mut()
        .find(|e| &e.id == id)
        .ok_or_else(|| StoreError::EntryNotFound(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert!(Role::User.is_user());
        assert!(!Role::Assistant.is_user());
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = Entry::user("hi");
        let b = Entry::user("hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_entry_defaults() {
        let entry = Entry::assistant("Hello");
        assert_eq!(entry.role, Role::Assistant);
        assert!(!entry.is_hidden);
        assert!(!entry.expanded);
        assert!(Entry::user("x").hidden().is_hidden);
    }

    #[test]
    fn test_push_and_entries() {
        let transcript = SharedTranscript::new();
        transcript.push(Entry::user("First"));
        transcript.push(Entry::assistant("Second"));

        let entries = transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "First");
        assert_eq!(entries[1].role, Role::Assistant);
    }

    #[test]
    fn test_append_keeps_id_and_position() {
        let transcript = SharedTranscript::new();
        transcript.push(Entry::user("question"));
        let id = transcript.push(Entry::assistant("Hel"));

        transcript.append_to(&id, "lo").unwrap();

        let entries = transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, id);
        assert_eq!(entries[1].title, "Hello");
    }

    #[test]
    fn test_set_title_and_hidden() {
        let transcript = SharedTranscript::new();
        let id = transcript.push(Entry::assistant("draft"));

        transcript.set_title(&id, "final").unwrap();
        transcript.set_hidden(&id, true).unwrap();

        let entry = &transcript.entries()[0];
        assert_eq!(entry.title, "final");
        assert!(entry.is_hidden);
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let transcript = SharedTranscript::new();
        let missing = EntryId::from("missing");
        assert_eq!(
            transcript.append_to(&missing, "x"),
            Err(StoreError::EntryNotFound(missing.clone()))
        );
        assert!(transcript.toggle_expand(&missing).is_err());
        assert_eq!(transcript.revision(), 0);
    }

    #[test]
    fn test_toggle_expand() {
        let transcript = SharedTranscript::new();
        let id = transcript.push(Entry::user("hi"));

        transcript.toggle_expand(&id).unwrap();
        assert!(transcript.entries()[0].expanded);

        transcript.toggle_expand(&id).unwrap();
        assert!(!transcript.entries()[0].expanded);
    }

    #[test]
    fn test_revision_bumps_on_every_write() {
        let transcript = SharedTranscript::new();
        assert_eq!(transcript.revision(), 0);

        let id = transcript.push(Entry::assistant(""));
        transcript.append_to(&id, "a").unwrap();
        transcript.clear();

        assert_eq!(transcript.revision(), 3);
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_push_and_clear_publish_revisions() {
        let transcript = SharedTranscript::new();
        let rx = transcript.subscribe();

        transcript.push(Entry::user("a"));
        assert_eq!(*rx.borrow(), 1);

        assert!(transcript.append_to(&EntryId::from("missing"), "x").is_err());
        assert_eq!(*rx.borrow(), 1);

        transcript.clear();
        assert_eq!(*rx.borrow(), 2);
        assert_eq!(transcript.revision(), 2);
    }

    #[test]
    fn test_clones_share_entries() {
        let writer = SharedTranscript::new();
        let reader = writer.clone();
        writer.push(Entry::user("shared"));
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.last_id(), writer.last_id());
    }

    #[test]
    fn test_with_entries() {
        let transcript = SharedTranscript::with_entries([Entry::user("a"), Entry::assistant("b")]);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.revision(), 0);
    }

    #[test]
    fn test_subscribe_sees_revision() {
        let transcript = SharedTranscript::new();
        let mut rx = transcript.subscribe();
        let writer = transcript.clone();

        tokio_test::block_on(async move {
            writer.push(Entry::user("ping"));
            rx.changed().await.unwrap();
            assert_eq!(*rx.borrow_and_update(), 1);
        });
    }

    #[test]
    fn test_entry_serde_defaults() {
        let entry: Entry = toml::from_str(
            r#"
id = "abc"
role = "user"
title = "hello"
"#,
        )
        .unwrap();
        assert_eq!(entry.id.as_str(), "abc");
        assert_eq!(entry.role, Role::User);
        assert!(!entry.is_hidden);
    }
}
