//! End-to-end checks against hand-computed word-level scenarios.
//!
//! Counts follow Morris, Maier & Green (2004), table 1.

use editops::{analyze, AnalysisOptions, Alignment, SampleAnalysis};
use proptest::prelude::*;

fn run(hyp: &str, reference: &str) -> SampleAnalysis {
    analyze(hyp, reference, &AnalysisOptions::default())
}

fn hsdi(a: &SampleAnalysis) -> (usize, usize, usize, usize) {
    (
        a.counts.hits,
        a.counts.substitutions,
        a.counts.deletions,
        a.counts.insertions,
    )
}

fn assert_salient_matches_plain(a: &SampleAnalysis) {
    let r = a.rates;
    assert_eq!(r.swer, r.wer);
    assert_eq!(r.snwer, r.nwer);
    assert_eq!(r.smer, r.mer);
    assert_eq!(r.swil, r.wil);
}

fn assert_nwer_rescales_wer(a: &SampleAnalysis) {
    let n1 = a.counts.reference_len as f64;
    let longest = a.counts.reference_len.max(a.counts.hypothesis_len) as f64;
    assert_eq!(a.rates.nwer, Some(a.rates.wer * (n1 / longest)));
}

#[test]
fn identical() {
    let a = run("x", "x");
    assert_eq!(hsdi(&a), (1, 0, 0, 0));
    assert_eq!((a.counts.reference_len, a.counts.hypothesis_len), (1, 1));
    assert_eq!(a.rates.wer, 0.0);
    assert_eq!(a.rates.mer, Some(0.0));
    assert_eq!(a.rates.wil, Some(0.0));
    assert_eq!(a.cer, a.rates.wer);
    assert_nwer_rescales_wer(&a);
    assert_salient_matches_plain(&a);
}

#[test]
fn insertions_only() {
    let a = run("x x y y", "x");
    assert_eq!(hsdi(&a), (1, 0, 0, 3));
    assert_eq!((a.counts.reference_len, a.counts.hypothesis_len), (1, 4));
    assert_eq!(a.rates.wer, 300.0);
    assert_eq!(a.rates.mer, Some(75.0));
    assert_eq!(a.rates.wil, Some(75.0));
    assert_eq!(a.cer, a.rates.wer);
    assert_nwer_rescales_wer(&a);
    assert_salient_matches_plain(&a);
}

#[test]
fn substitution_and_deletion() {
    let a = run("x z", "x y x");
    assert_eq!(hsdi(&a), (1, 1, 1, 0));
    assert_eq!((a.counts.reference_len, a.counts.hypothesis_len), (3, 2));
    assert_eq!(a.rates.wer.round(), 67.0);
    assert_eq!(a.rates.mer.unwrap().round(), 67.0);
    assert_eq!(a.rates.wil.unwrap().round(), 83.0);
    assert_eq!(a.cer.round(), a.rates.wer.round());
    assert_nwer_rescales_wer(&a);
    assert_salient_matches_plain(&a);
}

#[test]
fn single_substitution() {
    let a = run("x", "y");
    assert_eq!(hsdi(&a), (0, 1, 0, 0));
    assert_eq!(a.rates.wer, 100.0);
    assert_eq!(a.rates.mer, Some(100.0));
    assert_eq!(a.rates.wil, Some(100.0));
    assert_eq!(a.cer, a.rates.wer);
    assert_nwer_rescales_wer(&a);
    assert_salient_matches_plain(&a);
}

#[test]
fn substitution_and_insertion() {
    let a = run("y z", "x");
    assert_eq!(hsdi(&a), (0, 1, 0, 1));
    assert_eq!((a.counts.reference_len, a.counts.hypothesis_len), (1, 2));
    assert_eq!(a.rates.wer, 200.0);
    assert_eq!(a.rates.mer, Some(100.0));
    assert_eq!(a.rates.wil, Some(100.0));
    assert_eq!(a.cer, a.rates.wer);
    assert_nwer_rescales_wer(&a);
    assert_salient_matches_plain(&a);
}

#[test]
fn empty_reference_and_hypothesis() {
    let a = run("", "");
    assert_eq!(hsdi(&a), (0, 0, 0, 0));
    assert_eq!(a.rates.wer, 0.0);
    assert_eq!(a.rates.nwer, None);
    assert_eq!(a.rates.mer, None);
    assert_eq!(a.rates.wil, None);

    // Unnormalized: the true rate is unbounded.
    let a = run("a b", "");
    assert_eq!(a.rates.wer, 200.0);
    assert_eq!(a.rates.nwer, Some(100.0));
    assert_eq!(a.rates.wil, None);
}

#[test]
fn rendering_pads_to_matching_width() {
    let opts = AnalysisOptions::default();
    let a = Alignment::new("version of a string one", "another version of it", &opts);
    let (h, r) = a.render_lines();
    assert_eq!(h, "******* version of a string one");
    assert_eq!(r, "another version of * ****** it_");
    assert_eq!(h.split(' ').count(), r.split(' ').count());
}

const HYP: &str = "version of a string one";
const REF: &str = "another version of it";

fn weighted(weights: &[(&str, f64)], default: f64) -> SampleAnalysis {
    let mut builder = AnalysisOptions::builder().default_weight(default);
    for &(t, w) in weights {
        builder = builder.weight(t, w);
    }
    analyze(HYP, REF, &builder.build().unwrap())
}

#[test]
fn unit_weights_are_neutral() {
    assert_salient_matches_plain(&weighted(&[], 1.0));
}

#[test]
fn zero_weight_on_a_hit() {
    let r = weighted(&[("of", 0.0)], 1.0).rates;
    assert_eq!(r.wer, r.swer);
    assert_eq!(r.nwer, r.snwer);
    assert!(r.mer.unwrap() < r.smer.unwrap());
    assert!(r.wil.unwrap() < r.swil.unwrap());
}

#[test]
fn zero_weight_on_an_error() {
    let r = weighted(&[("another", 0.0)], 1.0).rates;
    assert!(r.wer > r.swer);
    assert!(r.nwer.unwrap() > r.snwer.unwrap());
    assert!(r.mer.unwrap() > r.smer.unwrap());
    assert_eq!(r.wil, r.swil);
}

#[test]
fn all_weights_zero() {
    let r = weighted(&[], 0.0).rates;
    assert!(r.wer > r.swer);
    assert_eq!(r.swer, 0.0);
    assert_eq!(r.snwer, Some(0.0));
    assert!(r.mer.unwrap() > 0.0);
    assert_eq!(r.smer, None);
    assert_eq!(r.swil, Some(100.0));
}

proptest! {
    #[test]
    fn fast_and_full_paths_agree(hyp in "[abc ]{0,16}", reference in "[abc ]{0,16}") {
        let opts = AnalysisOptions::default();
        let a = Alignment::new(&hyp, &reference, &opts);
        let full = a.rates();
        prop_assert!((a.wer() - full.wer).abs() < 1e-9, "fast={} full={}", a.wer(), full.wer);
        prop_assert_eq!(a.word_distance(), a.counts().errors());
    }

    #[test]
    fn default_weights_are_neutral(hyp in "[abc ]{0,16}", reference in "[abc ]{0,16}") {
        let a = run(&hyp, &reference);
        let r = a.rates;
        prop_assert_eq!(r.swer, r.wer);
        prop_assert_eq!(r.snwer, r.nwer);
        prop_assert_eq!(r.smer, r.mer);
        prop_assert_eq!(r.swil, r.wil);
    }
}
