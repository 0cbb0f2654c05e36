//! Levenshtein distance and minimal edit scripts over arbitrary token alphabets.
//!
//! With unit costs, the distance table
//! \[
//! L_{i,j} = \min\left(L_{i-1,j} + 1,\; L_{i,j-1} + 1,\; L_{i-1,j-1} + [a_i \ne b_j]\right),
//! \quad L_{i,0} = i,\; L_{0,j} = j
//! \]
//! gives `distance(a, b) = L_{n,m}`.
//!
//! Two entry points:
//! - [`distance`] keeps two rows only; use it when the number is all you need.
//! - [`editops`] keeps the full table and walks it back into one minimal script.
//!
//! Both strip the common prefix and suffix first, which never changes the result.
//!
//! Script positions are original-sequence coordinates: `source` indexes `a`,
//! `target` indexes `b`. Ops are emitted in increasing position order.
//!
//! Backtrace tie-break (from the bottom-right corner):
//! 1. keep moving in the current insert/delete direction while it stays optimal;
//! 2. otherwise take a free diagonal (match), then a substitution;
//! 3. otherwise start an insert run, then a delete run.
//!
//! Reversed, this prefers substitutions over delete+insert pairs and produces
//! the same scripts as the widely used `python-Levenshtein` `editops`.

use serde::{Deserialize, Serialize};

/// One edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EditOp {
    /// Drop `a[source]`.
    Delete {
        /// Index into the source sequence.
        source: usize,
        /// Index into the target sequence where the drop happens.
        target: usize,
    },
    /// Insert `b[target]` before `a[source]`.
    Insert {
        /// Index into the source sequence the insertion precedes.
        source: usize,
        /// Index of the inserted token in the target sequence.
        target: usize,
    },
    /// Replace `a[source]` with `b[target]`.
    Replace {
        /// Index into the source sequence.
        source: usize,
        /// Index into the target sequence.
        target: usize,
    },
}

impl EditOp {
    /// Source-sequence coordinate.
    pub fn source(&self) -> usize {
        match *self {
            Self::Delete { source, .. } | Self::Insert { source, .. } | Self::Replace { source, .. } => {
                source
            }
        }
    }

    /// Target-sequence coordinate.
    pub fn target(&self) -> usize {
        match *self {
            Self::Delete { target, .. } | Self::Insert { target, .. } | Self::Replace { target, .. } => {
                target
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Diagonal,
    Insert,
    Delete,
}

/// Common prefix and suffix lengths, non-overlapping.
fn trim_common<T: PartialEq>(a: &[T], b: &[T]) -> (usize, usize) {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    (prefix, suffix)
}

/// Minimum number of single-token insertions, deletions and substitutions
/// turning `a` into `b`.
pub fn distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (prefix, suffix) = trim_common(a, b);
    let a = &a[prefix..a.len() - suffix];
    let b = &b[prefix..b.len() - suffix];
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Rows run over the longer side so the kept rows are as short as possible.
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];
    for (i, x) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, y) in short.iter().enumerate() {
            let diag = prev[j] + usize::from(x != y);
            let left = curr[j] + 1;
            let up = prev[j + 1] + 1;
            curr[j + 1] = diag.min(left).min(up);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

/// One minimal edit script turning `a` into `b`.
///
/// `editops(a, b).len() == distance(a, b)` and
/// `apply_editops(a, &editops(a, b), b) == b`.
pub fn editops<T: PartialEq>(a: &[T], b: &[T]) -> Vec<EditOp> {
    let (offset, suffix) = trim_common(a, b);
    let a = &a[offset..a.len() - suffix];
    let b = &b[offset..b.len() - suffix];

    // Table L has shape (n+1, m+1), row-major: l[i*w + j].
    let w = b.len() + 1;
    let mut l = vec![0usize; (a.len() + 1) * w];
    for (j, cell) in l.iter_mut().take(w).enumerate() {
        *cell = j;
    }
    for i in 1..=a.len() {
        l[i * w] = i;
        for j in 1..=b.len() {
            let diag = l[(i - 1) * w + (j - 1)] + usize::from(a[i - 1] != b[j - 1]);
            let left = l[i * w + (j - 1)] + 1;
            let up = l[(i - 1) * w + j] + 1;
            l[i * w + j] = diag.min(left).min(up);
        }
    }

    let at = |i: usize, j: usize| l[i * w + j];
    let (mut i, mut j) = (a.len(), b.len());
    let mut ops = Vec::with_capacity(at(i, j));
    let mut dir = Direction::Diagonal;

    while i > 0 || j > 0 {
        let here = at(i, j);
        if dir == Direction::Insert && j > 0 && here == at(i, j - 1) + 1 {
            j -= 1;
            ops.push(EditOp::Insert {
                source: i + offset,
                target: j + offset,
            });
            continue;
        }
        if dir == Direction::Delete && i > 0 && here == at(i - 1, j) + 1 {
            i -= 1;
            ops.push(EditOp::Delete {
                source: i + offset,
                target: j + offset,
            });
            continue;
        }
        if i > 0 && j > 0 && here == at(i - 1, j - 1) && a[i - 1] == b[j - 1] {
            i -= 1;
            j -= 1;
            dir = Direction::Diagonal;
            continue;
        }
        if i > 0 && j > 0 && here == at(i - 1, j - 1) + 1 {
            i -= 1;
            j -= 1;
            ops.push(EditOp::Replace {
                source: i + offset,
                target: j + offset,
            });
            dir = Direction::Diagonal;
            continue;
        }
        // An insert run never turns straight into a delete run: a diagonal
        // step is always at least as cheap there.
        if dir == Direction::Diagonal && j > 0 && here == at(i, j - 1) + 1 {
            j -= 1;
            ops.push(EditOp::Insert {
                source: i + offset,
                target: j + offset,
            });
            dir = Direction::Insert;
            continue;
        }
        if dir == Direction::Diagonal && i > 0 && here == at(i - 1, j) + 1 {
            i -= 1;
            ops.push(EditOp::Delete {
                source: i + offset,
                target: j + offset,
            });
            dir = Direction::Delete;
            continue;
        }
        unreachable!("edit-distance backtrace left the optimal path at ({i}, {j})");
    }

    ops.reverse();
    ops
}

/// Replay `ops` against a copy of `source`, pulling new tokens from `target`.
///
/// Replay runs in target coordinates: once every op before it has been
/// applied, the working copy agrees with `target` up to the op's `target`
/// index.
pub fn apply_editops<T: Clone>(source: &[T], ops: &[EditOp], target: &[T]) -> Vec<T> {
    let mut out = source.to_vec();
    for op in ops {
        match *op {
            EditOp::Delete { target: t, .. } => {
                out.remove(t);
            }
            EditOp::Insert { target: t, .. } => out.insert(t, target[t].clone()),
            EditOp::Replace { target: t, .. } => out[t] = target[t].clone(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn ops(a: &str, b: &str) -> Vec<EditOp> {
        editops(&chars(a), &chars(b))
    }

    fn del(source: usize, target: usize) -> EditOp {
        EditOp::Delete { source, target }
    }
    fn ins(source: usize, target: usize) -> EditOp {
        EditOp::Insert { source, target }
    }
    fn rep(source: usize, target: usize) -> EditOp {
        EditOp::Replace { source, target }
    }

    #[test]
    fn scripts_follow_the_documented_tie_break() {
        assert_eq!(ops("x", "x"), vec![]);
        assert_eq!(ops("xxyy", "x"), vec![del(1, 1), del(2, 1), del(3, 1)]);
        assert_eq!(ops("xz", "xyx"), vec![ins(1, 1), rep(1, 2)]);
        assert_eq!(ops("x", "y"), vec![rep(0, 0)]);
        assert_eq!(ops("yz", "x"), vec![del(0, 0), rep(1, 0)]);
        assert_eq!(ops("abcd", "dcd"), vec![del(0, 0), rep(1, 0)]);
        assert_eq!(ops("abcd", "addcd"), vec![ins(1, 1), rep(1, 2)]);
        assert_eq!(
            ops("œπ31% ^", " πU312%"),
            vec![rep(0, 0), ins(2, 2), del(4, 5), rep(5, 5), rep(6, 6)]
        );
    }

    #[test]
    fn distances_on_known_pairs() {
        let cases = [
            ("x", "x", 0),
            ("xxyy", "x", 3),
            ("xz", "xyx", 2),
            ("x", "y", 1),
            ("yz", "x", 2),
            ("abcd", "dcd", 2),
            ("abcd", "addcd", 2),
            ("œπ31% ^", " πU312%", 5),
            ("", "abc", 3),
            ("abc", "", 3),
            ("", "", 0),
        ];
        for (a, b, d) in cases {
            assert_eq!(distance(&chars(a), &chars(b)), d, "a={a:?} b={b:?}");
        }
    }

    #[test]
    fn works_on_word_tokens() {
        let a = ["the", "cat", "sat"];
        let b = ["the", "dog", "sat", "down"];
        assert_eq!(distance(&a, &b), 2);
        let script = editops(&a, &b);
        assert_eq!(script, vec![rep(1, 1), ins(3, 3)]);
        assert_eq!(apply_editops(&a, &script, &b), b.to_vec());
    }

    #[test]
    fn ops_serialize_with_a_tag() {
        let json = serde_json::to_string(&rep(1, 2)).unwrap();
        assert_eq!(json, r#"{"op":"replace","source":1,"target":2}"#);
        let back: EditOp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rep(1, 2));
    }

    fn naive_levenshtein(a: &[u8], b: &[u8]) -> usize {
        let w = b.len() + 1;
        let mut l = vec![0usize; (a.len() + 1) * w];
        for i in 0..=a.len() {
            for j in 0..=b.len() {
                l[i * w + j] = if i == 0 {
                    j
                } else if j == 0 {
                    i
                } else {
                    let c = usize::from(a[i - 1] != b[j - 1]);
                    (l[(i - 1) * w + j] + 1)
                        .min(l[i * w + j - 1] + 1)
                        .min(l[(i - 1) * w + j - 1] + c)
                };
            }
        }
        l[a.len() * w + b.len()]
    }

    proptest! {
        #[test]
        fn script_replays_to_target_and_is_minimal(
            a in prop::collection::vec(0u8..4, 0..16),
            b in prop::collection::vec(0u8..4, 0..16),
        ) {
            let script = editops(&a, &b);
            prop_assert_eq!(apply_editops(&a, &script, &b), b.clone());
            prop_assert_eq!(script.len(), distance(&a, &b));
            prop_assert_eq!(distance(&a, &b), naive_levenshtein(&a, &b));
        }

        #[test]
        fn distance_is_symmetric(
            a in prop::collection::vec(0u8..4, 0..16),
            b in prop::collection::vec(0u8..4, 0..16),
        ) {
            prop_assert_eq!(distance(&a, &b), distance(&b, &a));
        }

        #[test]
        fn positions_are_nondecreasing(
            a in prop::collection::vec(0u8..3, 0..12),
            b in prop::collection::vec(0u8..3, 0..12),
        ) {
            let script = editops(&a, &b);
            for pair in script.windows(2) {
                prop_assert!(pair[0].source() <= pair[1].source());
                prop_assert!(pair[0].target() <= pair[1].target());
            }
        }
    }
}
