//! Error-rate metrics over an alignment.
//!
//! Notation: `H` hits, `S` substitutions, `D` deletions (reference tokens the
//! hypothesis lacks), `I` insertions (hypothesis tokens the reference lacks),
//! `N1` reference length, `N2` hypothesis length.
//!
//! `D_S` and `I_S` are the sizes of the deleted and inserted token lists. Every
//! substitution contributes to both, so `D_S = D + S` and `I_S = I + S`. The
//! replacement discount
//! \[
//! f = 1 - \frac{S}{D_S + I_S}
//! \]
//! gives `f (D_S + I_S) = S + D + I`, the edit distance.
//!
//! | Metric | Value | Undefined when |
//! |---|---|---|
//! | WER | \(100 f (D_S+I_S) / N_1\) | never (`N1 = 0` leaves it unnormalized) |
//! | NWER | \(100 f (D_S+I_S) / \max(N_1,N_2)\) | `N1 = N2 = 0` |
//! | MER | \(100 f (D_S+I_S) / (H + f (D_S+I_S))\) | `H = D_S = I_S = 0` |
//! | WIL | \(100 (1 - H^2 / (N_1 N_2))\) | `N1 = 0` or `N2 = 0` |
//!
//! The salient variants (SWER, SNWER, SMER, SWIL) replace `H`, `D_S`, `I_S`
//! by their weighted sums \(\sum_t w(t)\,\#t\). With every weight equal to 1
//! they coincide with the plain metrics bit for bit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::options::TokenWeights;

/// Raw per-pair tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditCounts {
    /// `H`: aligned pairs that agree.
    pub hits: usize,
    /// `S`: aligned pairs that disagree.
    pub substitutions: usize,
    /// `D`: reference tokens with no hypothesis counterpart.
    pub deletions: usize,
    /// `I`: hypothesis tokens with no reference counterpart.
    pub insertions: usize,
    /// `N1`.
    pub reference_len: usize,
    /// `N2`.
    pub hypothesis_len: usize,
}

impl EditCounts {
    /// `N = H + S`.
    pub fn matched(&self) -> usize {
        self.hits + self.substitutions
    }

    /// `S + D + I`.
    pub fn errors(&self) -> usize {
        self.substitutions + self.deletions + self.insertions
    }
}

/// Weighted `H`, `D_S`, `I_S`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedCounts {
    /// Weighted hits.
    pub hits: f64,
    /// Weighted deleted tokens.
    pub deleted: f64,
    /// Weighted inserted tokens.
    pub inserted: f64,
}

fn tally<'a>(tokens: &'a [String]) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for t in tokens {
        *counts.entry(t.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Sum `weight(token) * occurrences(token)` over each list.
pub fn weighted_counts(
    correct: &[String],
    deleted: &[String],
    inserted: &[String],
    weights: &TokenWeights,
) -> WeightedCounts {
    let weigh = |tokens: &[String]| -> f64 {
        tally(tokens)
            .into_iter()
            .map(|(t, n)| weights.weight_of(t) * n as f64)
            .sum()
    };
    WeightedCounts {
        hits: weigh(correct),
        deleted: weigh(deleted),
        inserted: weigh(inserted),
    }
}

/// Replacement discount `f`; 1 when there is nothing to discount.
pub fn replacement_factor(deleted: usize, inserted: usize, substitutions: usize) -> f64 {
    if deleted + inserted == 0 {
        return 1.0;
    }
    1.0 - substitutions as f64 / (deleted + inserted) as f64
}

/// `100 * edits / reference_len`, or `100 * edits` for an empty reference.
///
/// The empty-reference value is an approximation: the true rate is unbounded.
pub fn edit_rate(edits: usize, reference_len: usize) -> f64 {
    let edits = edits as f64;
    if reference_len == 0 {
        100.0 * edits
    } else {
        100.0 * (edits / reference_len as f64)
    }
}

/// Full metric set for one pair, as percentages.
///
/// `None` marks a metric that is undefined for the pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorRates {
    /// Word error rate.
    pub wer: f64,
    /// Salient word error rate.
    pub swer: f64,
    /// Normalized word error rate.
    pub nwer: Option<f64>,
    /// Salient normalized word error rate.
    pub snwer: Option<f64>,
    /// Match error rate.
    pub mer: Option<f64>,
    /// Salient match error rate.
    pub smer: Option<f64>,
    /// Word information lost.
    pub wil: Option<f64>,
    /// Salient word information lost.
    pub swil: Option<f64>,
}

impl ErrorRates {
    /// Evaluate every metric.
    ///
    /// `deleted` and `inserted` are `D_S` and `I_S`.
    pub fn compute(
        counts: &EditCounts,
        deleted: usize,
        inserted: usize,
        weighted: &WeightedCounts,
    ) -> Self {
        let f = replacement_factor(deleted, inserted, counts.substitutions);
        let h = counts.hits as f64;
        let errs = (deleted + inserted) as f64;
        let w_errs = weighted.deleted + weighted.inserted;
        let n1 = counts.reference_len;
        let n2 = counts.hypothesis_len;

        let (wer, swer) = if n1 == 0 {
            (100.0 * f * errs, 100.0 * f * w_errs)
        } else {
            (100.0 * f * errs / n1 as f64, 100.0 * f * w_errs / n1 as f64)
        };

        let (nwer, snwer) = if n1 == 0 && n2 == 0 {
            (None, None)
        } else {
            let longest = n1.max(n2) as f64;
            (
                Some(100.0 * f * errs / longest),
                Some(100.0 * f * w_errs / longest),
            )
        };

        let mer = (counts.hits > 0 || deleted > 0 || inserted > 0)
            .then(|| 100.0 * f * errs / (h + f * errs));
        let smer = (weighted.hits != 0.0 || weighted.deleted != 0.0 || weighted.inserted != 0.0)
            .then(|| 100.0 * f * w_errs / (weighted.hits + f * w_errs));

        let (wil, swil) = if n1 == 0 || n2 == 0 {
            (None, None)
        } else {
            let denom = n1 as f64 * n2 as f64;
            (
                Some(100.0 * (1.0 - h * h / denom)),
                Some(100.0 * (1.0 - weighted.hits * weighted.hits / denom)),
            )
        };

        Self {
            wer,
            swer,
            nwer,
            snwer,
            mer,
            smer,
            wil,
            swil,
        }
    }
}
