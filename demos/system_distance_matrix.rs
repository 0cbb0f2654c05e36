//! Relatable demo: how far apart are several transcription systems?
//!
//! We take a reference transcript and the outputs of a few (made-up) systems,
//! and fill a matrix with normalized word edit distances between every pair of
//! texts (reference included), divided by the longer of the two texts. Row 0 is
//! each system's normalized WER (NWER) against the reference; the other rows
//! show which systems make the *same* mistakes.

use editops::{distance, tokens};
use ndarray::Array2;

fn normalized_distance(a: &str, b: &str) -> f64 {
    let (a, b) = (tokens::words(a), tokens::words(b));
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    100.0 * distance(&a, &b) as f64 / longest as f64
}

fn main() {
    let texts = [
        ("reference", "the quick brown fox jumps over the lazy dog"),
        ("system-a", "the quick brown fox jumps over the lazy dog"),
        ("system-b", "the quick brown fox jump over a lazy dog"),
        ("system-c", "a quick brown box jumps over the lazy dog"),
        ("system-d", "quick brown fox jumped over lazy dogs"),
    ];

    let n = texts.len();
    let mut m = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            m[[i, j]] = normalized_distance(texts[i].1, texts[j].1);
        }
    }

    print!("{:<10}", "");
    for (name, _) in &texts {
        print!("{name:>10}");
    }
    println!();
    for (i, (name, _)) in texts.iter().enumerate() {
        print!("{name:<10}");
        for j in 0..n {
            print!("{:>10.1}", m[[i, j]]);
        }
        println!();
    }

    // Symmetric with a zero diagonal.
    assert!(m.iter().zip(m.t().iter()).all(|(a, b)| (a - b).abs() < 1e-12));
    assert!(m.diag().iter().all(|&d| d == 0.0));

    let closest = (1..n)
        .min_by(|&a, &b| m[[0, a]].total_cmp(&m[[0, b]]))
        .unwrap_or(0);
    println!();
    println!("closest to the reference: {}", texts[closest].0);
}
