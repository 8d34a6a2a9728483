//! Document, chapter and paragraph entities.

use crate::id::EntityId;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an entity, used as the store namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A document, the root of the hierarchy.
    Document,
    /// A chapter inside a document.
    Chapter,
    /// A paragraph inside a chapter.
    Paragraph,
}

impl EntityKind {
    /// Store namespace name for this kind.
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        match self {
            EntityKind::Document => "documents",
            EntityKind::Chapter => "chapters",
            EntityKind::Paragraph => "paragraphs",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Common behavior shared by all syncable entities.
///
/// The store and sync layers operate through this trait instead of
/// matching on concrete types. Parent references are non-owning ids.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The entity kind, fixed per implementing type.
    const KIND: EntityKind;

    /// Current id (temporary or permanent).
    fn id(&self) -> &EntityId;

    /// Replaces the current id.
    fn set_id(&mut self, id: EntityId);

    /// The id this entity had before its last reconciliation, if any.
    fn previous_id(&self) -> Option<&EntityId>;

    /// Sets or clears the previous id.
    fn set_previous_id(&mut self, id: Option<EntityId>);

    /// The parent scope this entity is ordered within, if any.
    ///
    /// Chapters are scoped by document, paragraphs by chapter.
    /// Documents have no parent.
    fn parent_id(&self) -> Option<&EntityId>;

    /// Whether the remote store has confirmed the latest local state.
    fn is_synced(&self) -> bool;

    /// Marks the entity synced or unsynced.
    fn set_synced(&mut self, synced: bool);

    /// Whether the entity is tombstoned, pending a remote delete.
    fn is_deleted(&self) -> bool;

    /// Sets or clears the tombstone marker.
    fn set_deleted(&mut self, deleted: bool);

    /// Whether the entity has dispatchable content.
    ///
    /// Entities without content (a blank chapter title, an empty
    /// paragraph) are excluded from sync dispatch entirely.
    fn has_content(&self) -> bool;

    /// Registers a local edit: bumps `updated_at` and `version` and
    /// marks the entity unsynced.
    fn touch(&mut self);
}

/// An entity ordered among siblings that share the same parent.
pub trait Ordered: Entity {
    /// Position among siblings, 0-based and contiguous.
    fn order_index(&self) -> u32;

    /// Sets the sibling position.
    fn set_order_index(&mut self, index: u32);
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// A document: the root entity. Created server-side; locally it only
/// ever updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document id. Always permanent.
    pub id: EntityId,
    /// Previous id, set transiently after a reconciliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<EntityId>,
    /// Document title.
    pub title: String,
    /// URL slug derived from the title.
    pub slug: String,
    /// Document subtitle.
    pub subtitle: String,
    /// Author display name.
    pub author: String,
    /// Creation timestamp, set by the writer.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, set by the writer.
    pub updated_at: DateTime<Utc>,
    /// Monotonic revision counter, informational.
    pub version: u32,
    /// False when the entity has local changes not confirmed remotely.
    pub sync: bool,
    /// Tombstone marker pending remote deletion.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,
}

impl Document {
    /// Creates a document shell around a remote-assigned id.
    pub fn new(id: EntityId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        let title = title.into();
        Self {
            id,
            previous_id: None,
            slug: String::new(),
            subtitle: String::new(),
            author: String::new(),
            created_at: now,
            updated_at: now,
            version: 1,
            sync: true,
            deleted: false,
            title,
        }
    }
}

impl Entity for Document {
    const KIND: EntityKind = EntityKind::Document;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn previous_id(&self) -> Option<&EntityId> {
        self.previous_id.as_ref()
    }

    fn set_previous_id(&mut self, id: Option<EntityId>) {
        self.previous_id = id;
    }

    fn parent_id(&self) -> Option<&EntityId> {
        None
    }

    fn is_synced(&self) -> bool {
        self.sync
    }

    fn set_synced(&mut self, synced: bool) {
        self.sync = synced;
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn has_content(&self) -> bool {
        !self.title.trim().is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
        self.sync = false;
    }
}

/// A chapter: ordered within its document, parent of paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Chapter id, temporary until the remote create is confirmed.
    pub id: EntityId,
    /// Previous id, set transiently after a reconciliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<EntityId>,
    /// Owning document.
    pub document_id: EntityId,
    /// Position among the document's chapters.
    pub index: u32,
    /// Chapter title.
    pub title: String,
    /// Chapter subtitle.
    pub subtitle: String,
    /// Creation timestamp, set by the writer.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, set by the writer.
    pub updated_at: DateTime<Utc>,
    /// Monotonic revision counter, informational.
    pub version: u32,
    /// False when the entity has local changes not confirmed remotely.
    pub sync: bool,
    /// Tombstone marker pending remote deletion.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,
    /// Aggregate word count across the chapter's paragraphs.
    #[serde(default)]
    pub word_count: u32,
}

impl Chapter {
    /// Creates a fresh, unsynced chapter with a temporary id.
    pub fn new(document_id: EntityId, index: u32) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::temp(),
            previous_id: None,
            document_id,
            index,
            title: String::new(),
            subtitle: String::new(),
            created_at: now,
            updated_at: now,
            version: 1,
            sync: false,
            deleted: false,
            word_count: 0,
        }
    }
}

impl Entity for Chapter {
    const KIND: EntityKind = EntityKind::Chapter;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn previous_id(&self) -> Option<&EntityId> {
        self.previous_id.as_ref()
    }

    fn set_previous_id(&mut self, id: Option<EntityId>) {
        self.previous_id = id;
    }

    fn parent_id(&self) -> Option<&EntityId> {
        Some(&self.document_id)
    }

    fn is_synced(&self) -> bool {
        self.sync
    }

    fn set_synced(&mut self, synced: bool) {
        self.sync = synced;
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn has_content(&self) -> bool {
        !self.title.trim().is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
        self.sync = false;
    }
}

impl Ordered for Chapter {
    fn order_index(&self) -> u32 {
        self.index
    }

    fn set_order_index(&mut self, index: u32) {
        self.index = index;
    }
}

/// A paragraph: ordered within its chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    /// Paragraph id, temporary until the remote create is confirmed.
    pub id: EntityId,
    /// Previous id, set transiently after a reconciliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<EntityId>,
    /// Owning document.
    pub document_id: EntityId,
    /// Owning chapter. May name a temporary chapter id until that
    /// chapter is reconciled.
    pub chapter_id: EntityId,
    /// Position among the chapter's paragraphs.
    pub index: u32,
    /// Paragraph text.
    pub text: String,
    /// Creation timestamp, set by the writer.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, set by the writer.
    pub updated_at: DateTime<Utc>,
    /// Monotonic revision counter, informational.
    pub version: u32,
    /// False when the entity has local changes not confirmed remotely.
    pub sync: bool,
    /// Tombstone marker pending remote deletion.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,
    /// Character count of `text`.
    #[serde(default)]
    pub character_count: u32,
    /// Word count of `text`.
    #[serde(default)]
    pub word_count: u32,
}

impl Paragraph {
    /// Creates a fresh, empty, unsynced paragraph with a temporary id.
    pub fn new(document_id: EntityId, chapter_id: EntityId, index: u32) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::temp(),
            previous_id: None,
            document_id,
            chapter_id,
            index,
            text: String::new(),
            created_at: now,
            updated_at: now,
            version: 1,
            sync: false,
            deleted: false,
            character_count: 0,
            word_count: 0,
        }
    }

    /// Replaces the paragraph text, recomputing the character and word
    /// counts and registering the edit.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.character_count = self.text.chars().count() as u32;
        self.word_count = self.text.split_whitespace().count() as u32;
        self.touch();
    }
}

impl Entity for Paragraph {
    const KIND: EntityKind = EntityKind::Paragraph;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn previous_id(&self) -> Option<&EntityId> {
        self.previous_id.as_ref()
    }

    fn set_previous_id(&mut self, id: Option<EntityId>) {
        self.previous_id = id;
    }

    fn parent_id(&self) -> Option<&EntityId> {
        Some(&self.chapter_id)
    }

    fn is_synced(&self) -> bool {
        self.sync
    }

    fn set_synced(&mut self, synced: bool) {
        self.sync = synced;
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
        self.sync = false;
    }
}

impl Ordered for Paragraph {
    fn order_index(&self) -> u32 {
        self.index
    }

    fn set_order_index(&mut self, index: u32) {
        self.index = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_chapter_is_temp_and_unsynced() {
        let chapter = Chapter::new(EntityId::new("doc-1"), 0);
        assert!(chapter.id.is_temp());
        assert!(!chapter.sync);
        assert_eq!(chapter.version, 1);
        assert_eq!(chapter.parent_id(), Some(&EntityId::new("doc-1")));
    }

    #[test]
    fn touch_resets_sync_flag() {
        let mut chapter = Chapter::new(EntityId::new("doc-1"), 0);
        chapter.sync = true;
        let before = chapter.updated_at;
        chapter.touch();
        assert!(!chapter.sync);
        assert_eq!(chapter.version, 2);
        assert!(chapter.updated_at >= before);
    }

    #[test]
    fn set_text_recomputes_counts() {
        let mut p = Paragraph::new(EntityId::new("doc-1"), EntityId::new("ch-1"), 0);
        p.set_text("two words");
        assert_eq!(p.word_count, 2);
        assert_eq!(p.character_count, 9);
        assert!(!p.sync);
    }

    #[test]
    fn blank_entities_have_no_content() {
        let chapter = Chapter::new(EntityId::new("doc-1"), 0);
        assert!(!chapter.has_content());

        let mut p = Paragraph::new(EntityId::new("doc-1"), chapter.id.clone(), 0);
        assert!(!p.has_content());
        p.set_text("   ");
        assert!(!p.has_content());
        p.set_text("hello");
        assert!(p.has_content());
    }

    #[test]
    fn transient_fields_are_skipped_when_unset() {
        let chapter = Chapter::new(EntityId::new("doc-1"), 0);
        let json = serde_json::to_value(&chapter).unwrap();
        assert!(json.get("previousId").is_none());
        assert!(json.get("deleted").is_none());
        assert_eq!(json["documentId"], "doc-1");
    }

    #[test]
    fn tombstone_survives_a_round_trip() {
        let mut chapter = Chapter::new(EntityId::new("doc-1"), 0);
        chapter.set_deleted(true);
        let json = serde_json::to_string(&chapter).unwrap();
        let back: Chapter = serde_json::from_str(&json).unwrap();
        assert!(back.is_deleted());
    }

    #[test]
    fn namespaces() {
        assert_eq!(EntityKind::Document.namespace(), "documents");
        assert_eq!(EntityKind::Chapter.namespace(), "chapters");
        assert_eq!(EntityKind::Paragraph.namespace(), "paragraphs");
    }
}
