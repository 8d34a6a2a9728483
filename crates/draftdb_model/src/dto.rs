//! Wire DTOs for the remote store boundary.
//!
//! The sync core never hands an entity directly to the remote client:
//! every dispatch converts to one of these records first, and this is
//! the only conversion point. None of the records carries an entity id:
//! create calls must not transmit temporary ids, and update/delete
//! calls address the permanent id out of band.

use crate::entity::{Chapter, Document, Paragraph};
use crate::id::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote payload for a chapter create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    /// Owning document id.
    pub document_id: EntityId,
    /// Position among the document's chapters.
    pub index: u32,
    /// Chapter title.
    pub title: String,
    /// Chapter subtitle.
    pub subtitle: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Revision counter.
    pub version: u32,
    /// Aggregate word count.
    pub word_count: u32,
}

impl From<&Chapter> for ChapterRecord {
    fn from(chapter: &Chapter) -> Self {
        Self {
            document_id: chapter.document_id.clone(),
            index: chapter.index,
            title: chapter.title.clone(),
            subtitle: chapter.subtitle.clone(),
            created_at: chapter.created_at,
            updated_at: chapter.updated_at,
            version: chapter.version,
            word_count: chapter.word_count,
        }
    }
}

/// Remote payload for a paragraph create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphRecord {
    /// Owning document id.
    pub document_id: EntityId,
    /// Owning chapter id. Must be permanent at dispatch time.
    pub chapter_id: EntityId,
    /// Position among the chapter's paragraphs.
    pub index: u32,
    /// Paragraph text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Revision counter.
    pub version: u32,
    /// Character count of `text`.
    pub character_count: u32,
    /// Word count of `text`.
    pub word_count: u32,
}

impl From<&Paragraph> for ParagraphRecord {
    fn from(paragraph: &Paragraph) -> Self {
        Self {
            document_id: paragraph.document_id.clone(),
            chapter_id: paragraph.chapter_id.clone(),
            index: paragraph.index,
            text: paragraph.text.clone(),
            created_at: paragraph.created_at,
            updated_at: paragraph.updated_at,
            version: paragraph.version,
            character_count: paragraph.character_count,
            word_count: paragraph.word_count,
        }
    }
}

/// Remote payload for a document update. Documents are created
/// server-side, so there is no create variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Document title.
    pub title: String,
    /// URL slug derived from the title.
    pub slug: String,
    /// Document subtitle.
    pub subtitle: String,
    /// Author display name.
    pub author: String,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Revision counter.
    pub version: u32,
}

impl From<&Document> for DocumentRecord {
    fn from(document: &Document) -> Self {
        Self {
            title: document.title.clone(),
            slug: document.slug.clone(),
            subtitle: document.subtitle.clone(),
            author: document.author.clone(),
            updated_at: document.updated_at,
            version: document.version,
        }
    }
}

/// Response to a successful remote create: the permanent id the remote
/// store assigned to the entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedRecord {
    /// The remote-assigned permanent id.
    pub id: EntityId,
}

impl CreatedRecord {
    /// Wraps a permanent id.
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    #[test]
    fn chapter_record_carries_no_id() {
        let mut chapter = Chapter::new(EntityId::new("doc-1"), 2);
        chapter.title = "Intro".into();
        let record = ChapterRecord::from(&chapter);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("previousId").is_none());
        assert_eq!(json["documentId"], "doc-1");
        assert_eq!(json["index"], 2);
        assert_eq!(json["title"], "Intro");
    }

    #[test]
    fn paragraph_record_keeps_parent_references() {
        let mut p = Paragraph::new(EntityId::new("doc-1"), EntityId::new("ch-9"), 1);
        p.set_text("some text");
        let record = ParagraphRecord::from(&p);
        assert_eq!(record.chapter_id, EntityId::new("ch-9"));
        assert_eq!(record.word_count, 2);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("sync").is_none());
    }

    #[test]
    fn document_record_is_update_only() {
        let mut doc = Document::new(EntityId::new("doc-1"), "My Draft");
        doc.touch();
        let record = DocumentRecord::from(&doc);
        assert_eq!(record.title, "My Draft");
        assert_eq!(record.version, 2);
    }
}
