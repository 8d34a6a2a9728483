//! # DraftDB Model
//!
//! Entity model for a local-first document editor: a document owns an
//! ordered list of chapters, each chapter an ordered list of paragraphs.
//!
//! This crate provides:
//! - String entity identifiers with a reserved `temp-` prefix for
//!   locally minted ids that the remote store has not confirmed yet
//! - The `Document`, `Chapter` and `Paragraph` entities with their
//!   sync/tombstone lifecycle fields
//! - The `Entity` and `Ordered` traits the store and sync layers work
//!   through
//! - Wire DTOs for the remote store boundary (create payloads never
//!   carry an id)
//!
//! ## Key invariants
//!
//! - Children hold a non-owning parent-id reference; there is no
//!   ownership cycle between documents, chapters and paragraphs
//! - An entity with `sync == true` transitions to `false` on any local
//!   edit (`touch`)
//! - Temporary ids are never part of a remote payload

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dto;
mod entity;
mod id;

pub use dto::{ChapterRecord, CreatedRecord, DocumentRecord, ParagraphRecord};
pub use entity::{Chapter, Document, Entity, EntityKind, Ordered, Paragraph};
pub use id::{EntityId, TEMP_ID_PREFIX};
