//! Per-pair analysis record.

use serde::{Deserialize, Serialize};

use crate::alignment::{Alignment, FastCount, Gram};
use crate::metrics::{EditCounts, ErrorRates};
use crate::options::AnalysisOptions;

/// Immutable result of analyzing one hypothesis/reference pair.
///
/// Token lists are multisets kept in alignment order. `wer` and friends come
/// from the alignment at the configured level; `cer`, `words` and `chars` come
/// from the distance-only path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleAnalysis {
    /// Hypothesis text as given.
    pub hypothesis: String,
    /// Reference text as given.
    pub reference: String,
    /// Rendered hypothesis line.
    pub aligned_hypothesis: String,
    /// Rendered reference line.
    pub aligned_reference: String,
    /// H/S/D/I and lengths.
    #[serde(flatten)]
    pub counts: EditCounts,
    /// `N = H + S`.
    #[serde(rename = "N")]
    pub matched: usize,
    /// Character error rate (distance-only, whitespace ignored).
    pub cer: f64,
    /// Alignment-based rates.
    #[serde(flatten)]
    pub rates: ErrorRates,
    /// Word distance and reference word count.
    pub words: FastCount,
    /// Character distance and reference character count.
    pub chars: FastCount,
    /// Hits.
    pub correct: Vec<String>,
    /// `deleted` followed by `inserted`.
    pub incorrect: Vec<String>,
    /// Reference tokens the hypothesis lacks.
    pub deleted: Vec<String>,
    /// Hypothesis tokens the reference lacks.
    pub inserted: Vec<String>,
    /// Reference n-grams reproduced by the hypothesis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_grams: Option<Vec<Gram>>,
    /// Remaining reference n-grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incorrect_grams: Option<Vec<Gram>>,
    /// Longest run of correct positions.
    pub n_consecutive_correct: usize,
    /// Longest run of deleted reference tokens.
    pub n_consecutive_deleted: usize,
    /// Longest run of inserted hypothesis tokens.
    pub n_consecutive_inserted: usize,
}

impl SampleAnalysis {
    /// Snapshot everything an [`Alignment`] can compute.
    pub fn from_alignment(a: &Alignment<'_>) -> Self {
        let t = a.alignment();
        let (aligned_hypothesis, aligned_reference) = a.render_lines();
        let (correct_grams, incorrect_grams) = match &t.grams {
            Some(g) => (Some(g.correct.clone()), Some(g.incorrect.clone())),
            None => (None, None),
        };
        Self {
            hypothesis: a.hypothesis().to_string(),
            reference: a.reference().to_string(),
            aligned_hypothesis,
            aligned_reference,
            counts: t.counts,
            matched: t.counts.matched(),
            cer: a.cer(),
            rates: a.rates(),
            words: a.word_count(),
            chars: a.char_count(),
            correct: t.correct.clone(),
            incorrect: t.incorrect(),
            deleted: t.deleted.clone(),
            inserted: t.inserted.clone(),
            correct_grams,
            incorrect_grams,
            n_consecutive_correct: t.runs.correct,
            n_consecutive_deleted: t.runs.deleted,
            n_consecutive_inserted: t.runs.inserted,
        }
    }

    /// One JSON object, for line-oriented output.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Analyze one pair.
pub fn analyze(hypothesis: &str, reference: &str, options: &AnalysisOptions) -> SampleAnalysis {
    SampleAnalysis::from_alignment(&Alignment::new(hypothesis, reference, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_both_paths() {
        let opts = AnalysisOptions::default();
        let a = analyze("x z", "x y x", &opts);
        assert_eq!(a.hypothesis, "x z");
        assert_eq!(a.reference, "x y x");
        assert_eq!(a.counts.hits, 1);
        assert_eq!(a.matched, 2);
        assert_eq!(a.words.edits, 2);
        assert_eq!(a.words.reference_len, 3);
        assert_eq!(a.chars.edits, 2);
        assert_eq!(a.incorrect, vec!["y", "x", "z"]);
        assert_eq!(a.aligned_hypothesis, "x * z");
        assert_eq!(a.aligned_reference, "x y x");
        assert_eq!(a.n_consecutive_correct, 1);
        assert!(a.correct_grams.is_none());
    }

    #[test]
    fn json_flattens_counts_and_rates_and_nulls_undefined_metrics() {
        let opts = AnalysisOptions::default();
        let json = analyze("", "", &opts).to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["hits"], 0);
        assert_eq!(v["reference_len"], 0);
        assert_eq!(v["wer"], 0.0);
        assert!(v["mer"].is_null());
        assert!(v["wil"].is_null());
        assert!(v.get("correct_grams").is_none());

        let v: serde_json::Value =
            serde_json::from_str(&analyze("x z", "x y x", &opts).to_json().unwrap()).unwrap();
        assert_eq!(v["N"], 2);
        assert_eq!(v["reference_len"], 3);
        assert_eq!(v["hypothesis_len"], 2);

        let back: SampleAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back, analyze("", "", &opts));
    }

    #[test]
    fn grams_present_when_configured() {
        let opts = AnalysisOptions::builder().gram_range(2, 3).build().unwrap();
        let a = analyze("the cat sat", "the cat sat down", &opts);
        let correct = a.correct_grams.unwrap();
        let incorrect = a.incorrect_grams.unwrap();
        assert_eq!(correct.len(), 3);
        assert_eq!(incorrect.len(), 2);
        assert!(incorrect.contains(&vec!["sat".to_string(), "down".to_string()]));
    }
}
