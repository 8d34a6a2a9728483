//! Edit scripts and the normalization pass.

use crate::myers::{shortest_edit, RawEdit};

/// Token granularity of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One token per Unicode scalar value. The default for paragraph
    /// text, where "minimal" should mean minimal keystrokes.
    Chars,
    /// One token per word or whitespace run. Coarser scripts for
    /// comparisons where word-level moves matter more than spelling.
    /// Whitespace runs are kept as tokens so applying a script
    /// reproduces the modified text exactly.
    Words,
}

impl Granularity {
    fn tokenize(self, text: &str) -> Vec<String> {
        match self {
            Granularity::Chars => text.chars().map(String::from).collect(),
            Granularity::Words => word_tokens(text),
        }
    }
}

fn word_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_space = false;
    for ch in text.chars() {
        let is_space = ch.is_whitespace();
        if !current.is_empty() && is_space != in_space {
            tokens.push(std::mem::take(&mut current));
        }
        in_space = is_space;
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// A normalized edit operation, positioned in original-sequence
/// coordinates: an insert lands before `original[pos]`, a delete or
/// update consumes tokens starting at `original[pos]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Insert `tokens` before `original[pos]`.
    Insert {
        /// Anchor position in the original sequence.
        pos: usize,
        /// Tokens to insert, in order.
        tokens: Vec<String>,
    },
    /// Remove `tokens.len()` tokens starting at `original[pos]`.
    Delete {
        /// First removed position in the original sequence.
        pos: usize,
        /// The removed tokens.
        tokens: Vec<String>,
    },
    /// Replace `old.len()` tokens starting at `original[pos]` with
    /// `new`.
    Update {
        /// First replaced position in the original sequence.
        pos: usize,
        /// The replaced tokens.
        old: Vec<String>,
        /// Their replacement.
        new: Vec<String>,
    },
}

/// A normalized shortest edit script between two texts.
///
/// Produced by [`diff_chars`] or [`diff_words`]; pure data, safe to
/// hold across passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditScript {
    granularity: Granularity,
    ops: Vec<EditOp>,
}

impl EditScript {
    /// The token granularity the script was computed at.
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The normalized operations, in ascending position order.
    #[must_use]
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Returns true if the two texts were identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The edit distance implied by the script: one per inserted or
    /// deleted token, and one per replaced position (an update of `k`
    /// tokens counts `k`, not `2k`), so `kitten -> sitting` is 3.
    #[must_use]
    pub fn distance(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                EditOp::Insert { tokens, .. } | EditOp::Delete { tokens, .. } => tokens.len(),
                EditOp::Update { old, new, .. } => old.len().max(new.len()),
            })
            .sum()
    }

    /// Applies the script to the original text, reproducing the
    /// modified text exactly.
    #[must_use]
    pub fn apply(&self, original: &str) -> String {
        let source = self.granularity.tokenize(original);
        let mut out = String::new();
        let mut next = 0usize;

        let copy_to = |out: &mut String, from: usize, to: usize| {
            for token in &source[from..to] {
                out.push_str(token);
            }
        };

        for op in &self.ops {
            match op {
                EditOp::Insert { pos, tokens } => {
                    copy_to(&mut out, next, *pos);
                    for token in tokens {
                        out.push_str(token);
                    }
                    next = *pos;
                }
                EditOp::Delete { pos, tokens } => {
                    copy_to(&mut out, next, *pos);
                    next = *pos + tokens.len();
                }
                EditOp::Update { pos, old, new } => {
                    copy_to(&mut out, next, *pos);
                    for token in new {
                        out.push_str(token);
                    }
                    next = *pos + old.len();
                }
            }
        }
        copy_to(&mut out, next, source.len());
        out
    }
}

/// Diffs two texts one character at a time.
#[must_use]
pub fn diff_chars(original: &str, modified: &str) -> EditScript {
    diff(original, modified, Granularity::Chars)
}

/// Diffs two texts one word (or whitespace run) at a time.
#[must_use]
pub fn diff_words(original: &str, modified: &str) -> EditScript {
    diff(original, modified, Granularity::Words)
}

fn diff(original: &str, modified: &str, granularity: Granularity) -> EditScript {
    let a = granularity.tokenize(original);
    let b = granularity.tokenize(modified);
    let raw = shortest_edit(&a, &b);
    EditScript {
        granularity,
        ops: normalize(raw),
    }
}

/// Normalizes a raw single-token script: merge runs of the same kind,
/// collapse delete/insert pairs at the same position into updates,
/// then merge once more so updates formed from interleaved pairs fuse.
fn normalize(raw: Vec<RawEdit<String>>) -> Vec<EditOp> {
    let singles = raw
        .into_iter()
        .map(|edit| match edit {
            RawEdit::Insert { pos, token } => EditOp::Insert {
                pos,
                tokens: vec![token],
            },
            RawEdit::Delete { pos, token } => EditOp::Delete {
                pos,
                tokens: vec![token],
            },
        })
        .collect();
    merge_adjacent(collapse(merge_adjacent(singles)))
}

fn merge_adjacent(ops: Vec<EditOp>) -> Vec<EditOp> {
    let mut merged: Vec<EditOp> = Vec::with_capacity(ops.len());
    for op in ops {
        let op = match merged.last_mut() {
            Some(last) => match fuse(last, op) {
                None => continue,
                Some(op) => op,
            },
            None => op,
        };
        merged.push(op);
    }
    merged
}

/// Folds `op` into `last` when they are the same kind at contiguous
/// positions; otherwise hands `op` back.
fn fuse(last: &mut EditOp, op: EditOp) -> Option<EditOp> {
    match (last, op) {
        (EditOp::Insert { pos, tokens }, EditOp::Insert { pos: p, tokens: t }) if *pos == p => {
            tokens.extend(t);
            None
        }
        (EditOp::Delete { pos, tokens }, EditOp::Delete { pos: p, tokens: t })
            if *pos + tokens.len() == p =>
        {
            tokens.extend(t);
            None
        }
        (EditOp::Update { pos, old, new }, EditOp::Update { pos: p, old: o, new: n })
            if *pos + old.len() == p =>
        {
            old.extend(o);
            new.extend(n);
            None
        }
        (_, op) => Some(op),
    }
}

fn collapse(ops: Vec<EditOp>) -> Vec<EditOp> {
    let mut out: Vec<EditOp> = Vec::with_capacity(ops.len());
    for op in ops {
        match (out.pop(), op) {
            // A delete whose span ends exactly where the insert lands
            // is a replacement of that span.
            (Some(EditOp::Delete { pos, tokens }), EditOp::Insert { pos: p, tokens: t })
                if pos + tokens.len() == p =>
            {
                out.push(EditOp::Update {
                    pos,
                    old: tokens,
                    new: t,
                });
            }
            (Some(EditOp::Insert { pos, tokens }), EditOp::Delete { pos: p, tokens: t })
                if pos == p =>
            {
                out.push(EditOp::Update {
                    pos,
                    old: t,
                    new: tokens,
                });
            }
            (last, op) => {
                if let Some(last) = last {
                    out.push(last);
                }
                out.push(op);
            }
        }
    }
    out
}
