//! Corpus-level aggregation of per-pair analyses.
//!
//! Per distinct entity (token or n-gram) we add up occurrence counts across
//! samples and derive, with `c` correct, `d` deleted, `i` inserted:
//! \[
//! \text{total} = c + (d + i),\quad
//! \text{error rate} = \frac{d + i}{\text{total}},\quad
//! P = \frac{c}{c + i},\quad R = \frac{c}{c + d},\quad
//! F = \frac{2PR}{P + R}.
//! \]
//! `P` (`R`) is undefined when `c = i = 0` (`c = d = 0`); `F` is undefined
//! unless both are defined and one is positive, which happens exactly when
//! `c > 0`.
//!
//! N-grams only split into correct/incorrect, so they get total and error
//! rate only.
//!
//! Merging is additive, commutative and associative: samples can be analyzed
//! in any order or in parallel and reduced afterwards.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::alignment::Gram;
use crate::analysis::{analyze, SampleAnalysis};
use crate::options::AnalysisOptions;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Errors for batch preparation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Line-by-line batches must pair up one to one.
    #[error("hypothesis has {hypotheses} lines but reference has {references}")]
    UnpairedLines {
        /// Hypothesis line count.
        hypotheses: usize,
        /// Reference line count.
        references: usize,
    },
}

/// Convenience result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// How one occurrence of an entity was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Reproduced by the hypothesis.
    Correct,
    /// Reference occurrence the hypothesis lacks.
    Deleted,
    /// Hypothesis occurrence the reference lacks.
    Inserted,
    /// Wrong without a deletion/insertion distinction (n-grams).
    Incorrect,
}

/// Occurrence counters for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    /// Correct occurrences.
    pub correct: u64,
    /// Incorrect occurrences (`deleted + inserted` for tokens).
    pub incorrect: u64,
    /// Deleted occurrences.
    pub deleted: u64,
    /// Inserted occurrences.
    pub inserted: u64,
}

impl Tally {
    /// Count one occurrence.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::Deleted => {
                self.deleted += 1;
                self.incorrect += 1;
            }
            Outcome::Inserted => {
                self.inserted += 1;
                self.incorrect += 1;
            }
            Outcome::Incorrect => self.incorrect += 1,
        }
    }

    /// Add another tally.
    pub fn merge(&mut self, other: &Tally) {
        self.correct += other.correct;
        self.incorrect += other.incorrect;
        self.deleted += other.deleted;
        self.inserted += other.inserted;
    }

    /// `correct + incorrect`.
    pub fn total(&self) -> u64 {
        self.correct + self.incorrect
    }

    /// `incorrect / total`, 0 for an empty tally.
    pub fn error_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.incorrect as f64 / total as f64,
        }
    }

    /// `correct / (correct + inserted)`.
    pub fn precision(&self) -> Option<f64> {
        let denom = self.correct + self.inserted;
        (denom > 0).then(|| self.correct as f64 / denom as f64)
    }

    /// `correct / (correct + deleted)`.
    pub fn recall(&self) -> Option<f64> {
        let denom = self.correct + self.deleted;
        (denom > 0).then(|| self.correct as f64 / denom as f64)
    }

    /// Harmonic mean of precision and recall.
    pub fn f_measure(&self) -> Option<f64> {
        match (self.precision(), self.recall()) {
            (Some(p), Some(r)) if p > 0.0 || r > 0.0 => Some(2.0 * p * r / (p + r)),
            _ => None,
        }
    }
}

/// Tallies keyed by entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tallies<K: Eq + Hash> {
    entries: HashMap<K, Tally>,
}

impl<K: Eq + Hash> Default for Tallies<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Ord + Clone> Tallies<K> {
    /// Empty tallies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every item with the same outcome.
    pub fn record_all<'a>(&mut self, items: impl IntoIterator<Item = &'a K>, outcome: Outcome)
    where
        K: 'a,
    {
        for item in items {
            match self.entries.get_mut(item) {
                Some(t) => t.record(outcome),
                None => {
                    let mut t = Tally::default();
                    t.record(outcome);
                    self.entries.insert(item.clone(), t);
                }
            }
        }
    }

    /// Add another set of tallies.
    pub fn merge(&mut self, other: &Tallies<K>) {
        for (k, t) in &other.entries {
            self.entries.entry(k.clone()).or_default().merge(t);
        }
    }

    /// Tally for one entity.
    pub fn get(&self, key: &K) -> Option<&Tally> {
        self.entries.get(key)
    }

    /// Number of distinct entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derived statistics, most frequent first (ties by entity).
    pub fn ranked<S: EntityStats<Key = K>>(&self) -> Vec<S> {
        let mut rows: Vec<(&K, &Tally)> = self.entries.iter().collect();
        rows.sort_by(|a, b| b.1.total().cmp(&a.1.total()).then_with(|| a.0.cmp(b.0)));
        rows.into_iter().map(|(k, t)| S::derive(k.clone(), t)).collect()
    }
}

/// Statistics row derived from one entity's tally.
pub trait EntityStats {
    /// Entity type.
    type Key;
    /// Build the row.
    fn derive(key: Self::Key, tally: &Tally) -> Self;
}

/// Corpus statistics for one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenStats {
    /// The token.
    pub token: String,
    /// True positives.
    pub correct: u64,
    /// False positives plus false negatives.
    pub incorrect: u64,
    /// False negatives.
    pub deleted: u64,
    /// False positives.
    pub inserted: u64,
    /// `correct + incorrect`.
    pub total: u64,
    /// `incorrect / total`.
    pub error_rate: f64,
    /// `correct / (correct + inserted)`.
    pub precision: Option<f64>,
    /// `correct / (correct + deleted)`.
    pub recall: Option<f64>,
    /// Harmonic mean of precision and recall.
    pub f_measure: Option<f64>,
}

impl EntityStats for TokenStats {
    type Key = String;

    fn derive(token: String, t: &Tally) -> Self {
        Self {
            token,
            correct: t.correct,
            incorrect: t.incorrect,
            deleted: t.deleted,
            inserted: t.inserted,
            total: t.total(),
            error_rate: t.error_rate(),
            precision: t.precision(),
            recall: t.recall(),
            f_measure: t.f_measure(),
        }
    }
}

/// Corpus statistics for one n-gram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GramStats {
    /// The n-gram.
    pub gram: Gram,
    /// Reference occurrences reproduced by the hypothesis.
    pub correct: u64,
    /// Remaining reference occurrences.
    pub incorrect: u64,
    /// `correct + incorrect`.
    pub total: u64,
    /// `incorrect / total`.
    pub error_rate: f64,
}

impl EntityStats for GramStats {
    type Key = Gram;

    fn derive(gram: Gram, t: &Tally) -> Self {
        Self {
            gram,
            correct: t.correct,
            incorrect: t.incorrect,
            total: t.total(),
            error_rate: t.error_rate(),
        }
    }
}

/// Additive corpus counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CorpusTallies {
    /// Per-token tallies.
    pub tokens: Tallies<String>,
    /// Per-n-gram tallies.
    pub grams: Tallies<Gram>,
    /// Summed word edit distances.
    pub word_edits: u64,
    /// Summed reference word counts.
    pub reference_words: u64,
    /// Summed character edit distances.
    pub char_edits: u64,
    /// Summed reference character counts.
    pub reference_chars: u64,
    /// Number of samples folded in.
    pub samples: u64,
}

impl CorpusTallies {
    /// Fold in one sample.
    pub fn add(&mut self, a: &SampleAnalysis) {
        self.tokens.record_all(&a.correct, Outcome::Correct);
        self.tokens.record_all(&a.deleted, Outcome::Deleted);
        self.tokens.record_all(&a.inserted, Outcome::Inserted);
        if let Some(g) = &a.correct_grams {
            self.grams.record_all(g, Outcome::Correct);
        }
        if let Some(g) = &a.incorrect_grams {
            self.grams.record_all(g, Outcome::Incorrect);
        }
        self.word_edits += a.words.edits as u64;
        self.reference_words += a.words.reference_len as u64;
        self.char_edits += a.chars.edits as u64;
        self.reference_chars += a.chars.reference_len as u64;
        self.samples += 1;
    }

    /// Fold in another set of counters.
    pub fn merge(&mut self, other: &CorpusTallies) {
        self.tokens.merge(&other.tokens);
        self.grams.merge(&other.grams);
        self.word_edits += other.word_edits;
        self.reference_words += other.reference_words;
        self.char_edits += other.char_edits;
        self.reference_chars += other.reference_chars;
        self.samples += other.samples;
    }

    /// Counters over a batch of analyses.
    pub fn from_analyses<'a>(analyses: impl IntoIterator<Item = &'a SampleAnalysis>) -> Self {
        let mut out = Self::default();
        for a in analyses {
            out.add(a);
        }
        out
    }

    /// Micro-averaged word error rate, percent; `None` without reference words.
    pub fn wer(&self) -> Option<f64> {
        (self.reference_words > 0)
            .then(|| 100.0 * self.word_edits as f64 / self.reference_words as f64)
    }

    /// Micro-averaged character error rate, percent; `None` without reference characters.
    pub fn cer(&self) -> Option<f64> {
        (self.reference_chars > 0)
            .then(|| 100.0 * self.char_edits as f64 / self.reference_chars as f64)
    }
}

/// Aggregated results over a batch of pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    /// One analysis per input pair, in input order.
    pub analyses: Vec<SampleAnalysis>,
    /// Per-token statistics, most frequent first.
    pub tokens: Vec<TokenStats>,
    /// Per-n-gram statistics, most frequent first; empty unless grams were configured.
    pub grams: Vec<GramStats>,
    /// Micro-averaged word error rate.
    pub wer: Option<f64>,
    /// Micro-averaged character error rate.
    pub cer: Option<f64>,
}

impl Corpus {
    /// Derive corpus statistics from finished analyses.
    pub fn from_analyses(analyses: Vec<SampleAnalysis>) -> Self {
        let tallies = CorpusTallies::from_analyses(&analyses);
        tracing::debug!(
            samples = tallies.samples,
            tokens = tallies.tokens.len(),
            grams = tallies.grams.len(),
            "aggregated corpus"
        );
        Self {
            tokens: tallies.tokens.ranked(),
            grams: tallies.grams.ranked(),
            wer: tallies.wer(),
            cer: tallies.cer(),
            analyses,
        }
    }
}

fn analyze_all<S: AsRef<str> + Sync>(pairs: &[(S, S)], options: &AnalysisOptions) -> Vec<SampleAnalysis> {
    #[cfg(feature = "parallel")]
    let iter = pairs.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = pairs.iter();
    iter.map(|(h, r)| analyze(h.as_ref(), r.as_ref(), options))
        .collect()
}

/// Analyze every `(hypothesis, reference)` pair and aggregate.
///
/// With the `parallel` feature, pairs are analyzed on the rayon pool; the
/// reduction runs once all of them are done.
pub fn aggregate<S: AsRef<str> + Sync>(pairs: &[(S, S)], options: &AnalysisOptions) -> Corpus {
    tracing::debug!(pairs = pairs.len(), "analyzing batch");
    Corpus::from_analyses(analyze_all(pairs, options))
}

/// Split two texts into line-by-line pairs.
///
/// Trailing newlines are ignored; both texts must have the same line count.
pub fn pair_lines<'a>(hypothesis: &'a str, reference: &'a str) -> Result<Vec<(&'a str, &'a str)>> {
    let hyps: Vec<&str> = hypothesis.trim_end_matches('\n').split('\n').collect();
    let refs: Vec<&str> = reference.trim_end_matches('\n').split('\n').collect();
    if hyps.len() != refs.len() {
        return Err(Error::UnpairedLines {
            hypotheses: hyps.len(),
            references: refs.len(),
        });
    }
    Ok(hyps.into_iter().zip(refs).collect())
}
