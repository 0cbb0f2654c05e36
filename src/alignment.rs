//! Position-paired alignment of a hypothesis against a reference.
//!
//! [`align`] replays a minimal edit script (hypothesis → reference) into two
//! equal-length tracks of [`Slot`]s:
//!
//! - `Delete` (an extra hypothesis token): the hypothesis slot turns incorrect
//!   and an empty slot is spliced into the reference track;
//! - `Insert` (a missing reference token): an empty slot is spliced into the
//!   hypothesis track and the reference slot turns incorrect;
//! - `Replace`: both slots turn incorrect, lengths unchanged.
//!
//! Afterwards a slot pair is correct iff both tokens are present and equal.
//!
//! [`Alignment`] wraps one text pair and computes lazily: the distance-only
//! quantities (WER/CER fast path) and the full alignment are each built on
//! first access and cached for the lifetime of the value.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::distance::{distance, editops, EditOp};
use crate::metrics::{edit_rate, weighted_counts, EditCounts, ErrorRates};
use crate::options::{AnalysisOptions, GramRange};
use crate::symbols::encode_pair;
use crate::tokens::{self, Level};

/// Errors for alignment side-channel operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The mirrored sequence must have one element per hypothesis token.
    #[error("sequence to mirror has length {got}, expected {expected} (hypothesis length)")]
    MirrorLengthMismatch {
        /// Hypothesis token count.
        expected: usize,
        /// Provided length.
        got: usize,
    },
    /// A reference token needs a value but the hypothesis is empty.
    #[error("nothing to mirror: the hypothesis is empty but the reference is not")]
    NothingToMirror,
}

/// Convenience result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// An n-gram of tokens.
pub type Gram = Vec<String>;

/// One side of an aligned position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Token, or `None` for a placeholder.
    pub text: Option<String>,
    /// Whether this position matches the other side.
    pub correct: bool,
}

impl Slot {
    fn present(token: &str) -> Self {
        Self {
            text: Some(token.to_string()),
            correct: true,
        }
    }

    fn absent() -> Self {
        Self {
            text: None,
            correct: false,
        }
    }

    /// True for a placeholder.
    pub fn is_absent(&self) -> bool {
        self.text.is_none()
    }
}

/// One aligned position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedSlot {
    /// Hypothesis side.
    pub hypothesis: Slot,
    /// Reference side.
    pub reference: Slot,
}

/// Longest runs along the alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunLengths {
    /// Longest run of correct positions.
    pub correct: usize,
    /// Longest run of reference tokens missing from the hypothesis.
    pub deleted: usize,
    /// Longest run of hypothesis tokens missing from the reference.
    pub inserted: usize,
}

/// Correct/incorrect split of the reference's n-grams.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GramSplit {
    /// Reference n-grams reproduced verbatim by the hypothesis.
    pub correct: Vec<Gram>,
    /// The remaining reference n-grams.
    pub incorrect: Vec<Gram>,
}

/// Everything derived from one replayed edit script.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAlignment {
    /// Aligned positions.
    pub slots: Vec<AlignedSlot>,
    /// Hits, in alignment order.
    pub correct: Vec<String>,
    /// Reference tokens the hypothesis lacks (deletions and substituted-away tokens).
    pub deleted: Vec<String>,
    /// Hypothesis tokens the reference lacks (insertions and substituted-in tokens).
    pub inserted: Vec<String>,
    /// H/S/D/I and lengths.
    pub counts: EditCounts,
    /// Longest runs.
    pub runs: RunLengths,
    /// N-gram split, when a gram range was configured.
    pub grams: Option<GramSplit>,
    /// The script that produced this alignment.
    pub script: Vec<EditOp>,
}

impl TokenAlignment {
    /// `deleted` followed by `inserted`.
    pub fn incorrect(&self) -> Vec<String> {
        self.deleted
            .iter()
            .chain(self.inserted.iter())
            .cloned()
            .collect()
    }
}

/// Longest run of items satisfying `pred`.
fn longest_run<T>(items: impl IntoIterator<Item = T>, pred: impl Fn(&T) -> bool) -> usize {
    let mut current = 0;
    let mut best = 0;
    for item in items {
        if pred(&item) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

/// All contiguous windows of every order in `range`, shortest order first.
fn grams_of<T: Clone>(seq: &[T], range: GramRange) -> Vec<Vec<T>> {
    range
        .orders()
        .flat_map(|o| seq.windows(o).map(|w| w.to_vec()))
        .collect()
}

fn split_grams(reference: &[&str], slots: &[AlignedSlot], range: GramRange) -> GramSplit {
    let correct: Vec<Gram> = range
        .orders()
        .flat_map(|o| slots.windows(o))
        .filter(|w| w.iter().all(|s| s.hypothesis.correct))
        .map(|w| {
            w.iter()
                .filter_map(|s| s.hypothesis.text.clone())
                .collect()
        })
        .collect();

    // Remove one reference occurrence per correct occurrence, first ones first.
    let mut pending: HashMap<&Gram, usize> = HashMap::new();
    for g in &correct {
        *pending.entry(g).or_insert(0) += 1;
    }
    let incorrect = grams_of(reference, range)
        .into_iter()
        .map(|g| g.into_iter().map(str::to_string).collect::<Gram>())
        .filter(|g| match pending.get_mut(g) {
            Some(n) if *n > 0 => {
                *n -= 1;
                false
            }
            _ => true,
        })
        .collect();

    GramSplit { correct, incorrect }
}

/// Align `hypothesis` against `reference` token by token.
pub fn align(hypothesis: &[&str], reference: &[&str], gram_range: Option<GramRange>) -> TokenAlignment {
    let (hyp_codes, ref_codes) = encode_pair(hypothesis, reference);
    let script = editops(&hyp_codes, &ref_codes);

    let mut hyp_track: Vec<Slot> = hypothesis.iter().map(|t| Slot::present(t)).collect();
    let mut ref_track: Vec<Slot> = reference.iter().map(|t| Slot::present(t)).collect();
    let mut deleted = Vec::new();
    let mut inserted = Vec::new();
    let (mut delete_ops, mut insert_ops, mut replace_ops) = (0usize, 0usize, 0usize);

    // A position's track index is its source index shifted by the
    // placeholders already spliced into the hypothesis track.
    for op in &script {
        match *op {
            EditOp::Delete { source, .. } => {
                let slot = source + insert_ops;
                inserted.push(hypothesis[source].to_string());
                hyp_track[slot].correct = false;
                ref_track.insert(slot, Slot::absent());
                delete_ops += 1;
            }
            EditOp::Insert { source, target } => {
                let slot = source + insert_ops;
                deleted.push(reference[target].to_string());
                hyp_track.insert(slot, Slot::absent());
                ref_track[slot].correct = false;
                insert_ops += 1;
            }
            EditOp::Replace { source, target } => {
                let slot = source + insert_ops;
                inserted.push(hypothesis[source].to_string());
                deleted.push(reference[target].to_string());
                hyp_track[slot].correct = false;
                ref_track[slot].correct = false;
                replace_ops += 1;
            }
        }
    }
    debug_assert_eq!(hyp_track.len(), ref_track.len());

    let slots: Vec<AlignedSlot> = hyp_track
        .into_iter()
        .zip(ref_track)
        .map(|(hypothesis, reference)| AlignedSlot {
            hypothesis,
            reference,
        })
        .collect();

    let correct: Vec<String> = slots
        .iter()
        .filter(|s| s.hypothesis.correct)
        .filter_map(|s| s.hypothesis.text.clone())
        .collect();

    let runs = RunLengths {
        correct: longest_run(&slots, |s| s.hypothesis.correct),
        deleted: longest_run(&slots, |s| s.hypothesis.is_absent()),
        inserted: longest_run(&slots, |s| s.reference.is_absent()),
    };

    let grams = gram_range.map(|range| split_grams(reference, &slots, range));

    // Delete ops remove extra hypothesis tokens: those are insertion errors.
    let counts = EditCounts {
        hits: correct.len(),
        substitutions: replace_ops,
        deletions: insert_ops,
        insertions: delete_ops,
        reference_len: reference.len(),
        hypothesis_len: hypothesis.len(),
    };

    tracing::trace!(
        hypothesis_len = counts.hypothesis_len,
        reference_len = counts.reference_len,
        script_len = script.len(),
        "aligned pair"
    );

    TokenAlignment {
        slots,
        correct,
        deleted,
        inserted,
        counts,
        runs,
        grams,
        script,
    }
}

/// Edit count and reference length from a distance-only comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FastCount {
    /// Edit distance.
    pub edits: usize,
    /// Reference length in comparison units.
    pub reference_len: usize,
}

impl FastCount {
    /// `edits / reference_len` as a percentage (raw count for an empty reference).
    pub fn rate(&self) -> f64 {
        edit_rate(self.edits, self.reference_len)
    }
}

#[derive(Debug, Clone)]
struct Computed {
    alignment: TokenAlignment,
    rates: ErrorRates,
}

/// A hypothesis/reference pair with lazily computed, cached analysis.
///
/// Not `Sync`: the cache is private to one pair. Analyze independent pairs on
/// separate threads instead.
#[derive(Debug)]
pub struct Alignment<'a> {
    hypothesis: &'a str,
    reference: &'a str,
    options: &'a AnalysisOptions,
    words: OnceCell<FastCount>,
    chars: OnceCell<FastCount>,
    full: OnceCell<Computed>,
}

impl<'a> Alignment<'a> {
    /// Wrap a pair; nothing is computed yet.
    pub fn new(hypothesis: &'a str, reference: &'a str, options: &'a AnalysisOptions) -> Self {
        Self {
            hypothesis,
            reference,
            options,
            words: OnceCell::new(),
            chars: OnceCell::new(),
            full: OnceCell::new(),
        }
    }

    /// Hypothesis text.
    pub fn hypothesis(&self) -> &'a str {
        self.hypothesis
    }

    /// Reference text.
    pub fn reference(&self) -> &'a str {
        self.reference
    }

    /// Options in effect.
    pub fn options(&self) -> &'a AnalysisOptions {
        self.options
    }

    /// Word-level edit distance and reference word count.
    pub fn word_count(&self) -> FastCount {
        *self.words.get_or_init(|| {
            let h = tokens::words(self.hypothesis);
            let r = tokens::words(self.reference);
            let (h, r) = encode_pair(&h, &r);
            FastCount {
                edits: distance(&h, &r),
                reference_len: r.len(),
            }
        })
    }

    /// Character-level edit distance and reference character count, whitespace ignored.
    pub fn char_count(&self) -> FastCount {
        *self.chars.get_or_init(|| {
            let h = tokens::dense_chars(self.hypothesis);
            let r = tokens::dense_chars(self.reference);
            FastCount {
                edits: distance(&h, &r),
                reference_len: r.len(),
            }
        })
    }

    /// Word edit distance.
    pub fn word_distance(&self) -> usize {
        self.word_count().edits
    }

    /// Reference length in words.
    pub fn reference_word_count(&self) -> usize {
        self.word_count().reference_len
    }

    /// Character edit distance, whitespace ignored.
    pub fn char_distance(&self) -> usize {
        self.char_count().edits
    }

    /// Reference length in non-whitespace characters.
    pub fn reference_char_count(&self) -> usize {
        self.char_count().reference_len
    }

    /// Word error rate from the distance alone.
    ///
    /// For an empty reference this is `100 * edits`, an approximation of an
    /// unbounded rate.
    pub fn wer(&self) -> f64 {
        self.word_count().rate()
    }

    /// Character error rate from the distance alone; same empty-reference caveat as [`Alignment::wer`].
    pub fn cer(&self) -> f64 {
        self.char_count().rate()
    }

    fn computed(&self) -> &Computed {
        self.full.get_or_init(|| {
            let level = self.options.level();
            let h = level.tokenize(self.hypothesis);
            let r = level.tokenize(self.reference);
            let alignment = align(&h, &r, self.options.gram_range());
            let weighted = weighted_counts(
                &alignment.correct,
                &alignment.deleted,
                &alignment.inserted,
                self.options.weights(),
            );
            let rates = ErrorRates::compute(
                &alignment.counts,
                alignment.deleted.len(),
                alignment.inserted.len(),
                &weighted,
            );
            Computed { alignment, rates }
        })
    }

    /// The full alignment, computed on first use.
    pub fn alignment(&self) -> &TokenAlignment {
        &self.computed().alignment
    }

    /// Alignment-based metrics at the configured level.
    pub fn rates(&self) -> ErrorRates {
        self.computed().rates
    }

    /// H/S/D/I and lengths.
    pub fn counts(&self) -> EditCounts {
        self.alignment().counts
    }

    /// Aligned positions.
    pub fn slots(&self) -> &[AlignedSlot] {
        &self.alignment().slots
    }

    /// Longest runs of correct, deleted and inserted positions.
    pub fn runs(&self) -> RunLengths {
        self.alignment().runs
    }

    /// Carry a per-hypothesis-token sequence `u` across the alignment.
    ///
    /// Returns `v` with one element per reference token: each reference token
    /// takes the element of the hypothesis token it is aligned with, or of the
    /// nearest preceding hypothesis token when it has none (the first
    /// hypothesis token for a leading insertion).
    pub fn mirror_editops<T: Clone>(&self, u: &[T]) -> Result<Vec<T>> {
        let slots = self.slots();
        let expected = self.counts().hypothesis_len;
        if u.len() != expected {
            return Err(Error::MirrorLengthMismatch {
                expected,
                got: u.len(),
            });
        }
        let mut pending = u.iter();
        let mut last: Option<&T> = None;
        let mut v = Vec::with_capacity(self.counts().reference_len);
        for slot in slots {
            if !slot.hypothesis.is_absent() {
                last = pending.next();
            }
            if !slot.reference.is_absent() {
                let item = match last {
                    Some(item) => item,
                    None => u.first().ok_or(Error::NothingToMirror)?,
                };
                v.push(item.clone());
            }
        }
        Ok(v)
    }

    /// Two padded lines, hypothesis over reference.
    pub fn render_lines(&self) -> (String, String) {
        render_lines(
            self.slots(),
            self.options.level(),
            self.options.empty_marker(),
            self.options.fill_marker(),
        )
    }

    /// Hypothesis and reference lines joined by a newline.
    pub fn render(&self) -> String {
        let (h, r) = self.render_lines();
        format!("{h}\n{r}")
    }
}

impl fmt::Display for Alignment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, r) = self.render_lines();
        write!(f, "{h}\n{r}")
    }
}

fn pad(marker: char, width: usize) -> String {
    std::iter::repeat(marker).take(width).collect()
}

fn render_pair(slot: &AlignedSlot, empty: char, fill: char) -> (String, String) {
    match (&slot.hypothesis.text, &slot.reference.text) {
        (Some(h), Some(r)) if slot.hypothesis.correct && slot.reference.correct => {
            (h.clone(), r.clone())
        }
        (None, Some(r)) => (pad(empty, r.chars().count()), r.clone()),
        (Some(h), None) => (h.clone(), pad(empty, h.chars().count())),
        (Some(h), Some(r)) => {
            let (hw, rw) = (h.chars().count(), r.chars().count());
            let width = hw.max(rw);
            (
                format!("{h}{}", pad(fill, width - hw)),
                format!("{r}{}", pad(fill, width - rw)),
            )
        }
        (None, None) => unreachable!("aligned position with no token on either side"),
    }
}

/// Render aligned positions as two visually aligned lines.
///
/// Matches print verbatim; a token facing a placeholder is echoed by `empty`
/// markers of the same width; substituted tokens are padded with `fill` to a
/// common width.
pub fn render_lines(slots: &[AlignedSlot], level: Level, empty: char, fill: char) -> (String, String) {
    let (h, r): (Vec<String>, Vec<String>) = slots
        .iter()
        .map(|s| render_pair(s, empty, fill))
        .unzip();
    (h.join(level.gap()), r.join(level.gap()))
}
