//! # DraftDB Sync
//!
//! Reconciliation and sync orchestration for the DraftDB editor core.
//!
//! Local edits land in the [`draftdb_store`] immediately with
//! temporary entity ids and `sync == false`; this crate moves that
//! state to the remote store and back into a confirmed shape:
//!
//! - [`Reindexer`] keeps sibling indices contiguous after inserts,
//!   deletes and moves, rewriting only the siblings whose index
//!   actually changed
//! - [`Reconciler`] swaps a confirmed entity's temporary id for the
//!   remote-assigned permanent one and retargets every dependent that
//!   still names the old id
//! - [`SyncOrchestrator`] runs one pass at a time per document,
//!   dispatching the document update, then chapters, then paragraphs,
//!   so a child is never sent against an unconfirmed parent
//! - [`SyncScheduler`] decides when passes run: debounced edit bursts,
//!   the offline-to-online transition, or an explicit request
//!
//! The remote side is abstracted behind the [`RemoteStore`] trait;
//! [`MockRemote`] implements it for tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod orchestrator;
mod reconcile;
mod reindex;
mod remote;
mod scheduler;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use orchestrator::{PassOutcome, PassReport, SyncOrchestrator, SyncStats};
pub use reconcile::Reconciler;
pub use reindex::{assign_indices, Reindexer};
pub use remote::{MockRemote, RemoteRequest, RemoteStore};
pub use scheduler::{Connectivity, SyncScheduler};
