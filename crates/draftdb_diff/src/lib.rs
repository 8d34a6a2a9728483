//! # DraftDB Diff
//!
//! Myers shortest-edit-script engine.
//!
//! Computes the minimum edit distance and an edit script between two
//! token sequences using Myers' O((N+M)·D) greedy frontier algorithm,
//! then normalizes the script: adjacent operations of the same kind at
//! contiguous positions are merged, and a delete/insert pair at the
//! same position collapses into a single update.
//!
//! Two granularities are provided: [`diff_chars`] (the default for
//! paragraph text) and [`diff_words`] (for coarse comparisons; word
//! and whitespace runs are separate tokens so scripts still apply
//! losslessly).
//!
//! The engine is pure: no I/O, no mutable state, and the same inputs
//! always produce the same script.
//!
//! ```
//! use draftdb_diff::diff_chars;
//!
//! let script = diff_chars("kitten", "sitting");
//! assert_eq!(script.distance(), 3);
//! assert_eq!(script.apply("kitten"), "sitting");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod myers;
mod script;

pub use script::{diff_chars, diff_words, EditOp, EditScript, Granularity};
