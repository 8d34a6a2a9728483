//! Greedy frontier search and backtracking.
//!
//! Implements the forward variant of Myers' shortest-edit-script
//! algorithm: for increasing edit distance `d`, extend a frontier of
//! furthest-reaching x values per diagonal `k = x - y`, following
//! equal-token snakes, and stop at the first `d` that reaches
//! `(n, m)`. The per-`d` frontier maps are recorded so the edit path
//! can be recovered by backtracking.

use std::collections::HashMap;

/// A single-token edit in original-sequence coordinates.
///
/// An insert at `pos` places its token before `original[pos]`; a
/// delete at `pos` removes `original[pos]`. Anchoring both sides in
/// the original sequence lets a script be applied left to right
/// without tracking positional drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawEdit<T> {
    /// Insert `token` before `original[pos]`.
    Insert { pos: usize, token: T },
    /// Remove `original[pos]`.
    Delete { pos: usize, token: T },
}

/// Computes a shortest edit script between two token sequences.
///
/// The returned edits are in forward order and each one is a single
/// token; normalization into merged multi-token operations happens in
/// the caller.
pub(crate) fn shortest_edit<T: PartialEq + Clone>(
    original: &[T],
    modified: &[T],
) -> Vec<RawEdit<T>> {
    let n = original.len() as isize;
    let m = modified.len() as isize;
    let max = n + m;

    // k -> furthest-reaching x on that diagonal; absent means
    // unreached, which compares as -1 in the tie-break below.
    let mut v: HashMap<isize, isize> = HashMap::from([(1, 0)]);
    let mut trace: Vec<HashMap<isize, isize>> = Vec::new();

    'search: for d in 0..=max {
        trace.push(v.clone());

        let mut k = -d;
        while k <= d {
            let down = k == -d
                || (k != d && reach(&v, k - 1) < reach(&v, k + 1));
            let mut x = if down {
                reach(&v, k + 1).max(0)
            } else {
                reach(&v, k - 1).max(0) + 1
            };
            let mut y = x - k;

            // Snake: follow the diagonal while tokens match.
            while x < n && y < m && original[x as usize] == modified[y as usize] {
                x += 1;
                y += 1;
            }

            v.insert(k, x);

            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    backtrack(original, modified, &trace)
}

fn reach(v: &HashMap<isize, isize>, k: isize) -> isize {
    v.get(&k).copied().unwrap_or(-1)
}

/// Recovers the edit path from the recorded frontiers, walking from
/// `(n, m)` back to `(0, 0)` and emitting one edit per non-snake step.
fn backtrack<T: Clone>(
    original: &[T],
    modified: &[T],
    trace: &[HashMap<isize, isize>],
) -> Vec<RawEdit<T>> {
    let mut x = original.len() as isize;
    let mut y = modified.len() as isize;
    let mut edits = Vec::new();

    for d in (0..trace.len() as isize).rev() {
        let frontier = &trace[d as usize];
        let k = x - y;

        let down = k == -d
            || (k != d && reach(frontier, k - 1) < reach(frontier, k + 1));
        let prev_k = if down { k + 1 } else { k - 1 };
        let prev_x = reach(frontier, prev_k).max(0);
        let prev_y = prev_x - prev_k;

        // Walk back over the snake.
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
        }

        if d > 0 {
            if x == prev_x {
                // Vertical step: a token of the modified sequence was
                // inserted before original[x].
                y -= 1;
                edits.push(RawEdit::Insert {
                    pos: x as usize,
                    token: modified[y as usize].clone(),
                });
            } else {
                // Horizontal step: original[x - 1] was deleted.
                x -= 1;
                edits.push(RawEdit::Delete {
                    pos: x as usize,
                    token: original[x as usize].clone(),
                });
            }
        }
    }

    edits.reverse();
    edits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn identical_sequences_need_no_edits() {
        assert!(shortest_edit(&chars("abc"), &chars("abc")).is_empty());
        assert!(shortest_edit::<char>(&[], &[]).is_empty());
    }

    #[test]
    fn empty_original_is_all_inserts() {
        let edits = shortest_edit(&chars(""), &chars("ab"));
        assert_eq!(
            edits,
            vec![
                RawEdit::Insert { pos: 0, token: 'a' },
                RawEdit::Insert { pos: 0, token: 'b' },
            ]
        );
    }

    #[test]
    fn empty_modified_is_all_deletes() {
        let edits = shortest_edit(&chars("ab"), &chars(""));
        assert_eq!(
            edits,
            vec![
                RawEdit::Delete { pos: 0, token: 'a' },
                RawEdit::Delete { pos: 1, token: 'b' },
            ]
        );
    }

    #[test]
    fn edit_count_is_minimal() {
        // The worked example from Myers' paper: D(abcabba, cbabac) = 5.
        let edits = shortest_edit(&chars("abcabba"), &chars("cbabac"));
        assert_eq!(edits.len(), 5);
    }

    #[test]
    fn single_replacement_is_a_delete_then_insert() {
        let edits = shortest_edit(&chars("k"), &chars("s"));
        assert_eq!(
            edits,
            vec![
                RawEdit::Delete { pos: 0, token: 'k' },
                RawEdit::Insert { pos: 1, token: 's' },
            ]
        );
    }
}
