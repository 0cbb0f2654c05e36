//! Edit scripts, token alignments and error rates for transcription evaluation.
//!
//! Given a hypothesis and a reference string, this crate computes a minimal
//! edit script between their tokens (words or characters), replays it into a
//! position-paired alignment, and derives WER, CER and related rates (NWER,
//! MER, WIL and their per-token weighted "salient" variants). Many pairs can be
//! aggregated into per-token and per-n-gram corpus statistics.
//!
//! Pipeline: text → [`tokens`] → [`symbols`] → [`distance`] → [`alignment`]
//! → [`metrics`] → [`SampleAnalysis`] → [`aggregate()`].
//!
//! Public invariants (must not change):
//! - Edit scripts are minimal and deterministic; replaying a script against
//!   its source reproduces the target exactly.
//! - Both alignment tracks have equal length; a position is correct iff both
//!   tokens are present and equal.
//! - Undefined metrics are `None`, never a numeric sentinel.
//! - With uniform unit weights the salient metrics equal the plain ones exactly.
//! - Configuration is validated once at construction; nothing is clamped.
//!
//! ```
//! use editops::{analyze, AnalysisOptions};
//!
//! let opts = AnalysisOptions::default();
//! let a = analyze("x z", "x y x", &opts);
//! assert_eq!((a.counts.hits, a.counts.substitutions, a.counts.deletions), (1, 1, 1));
//! assert_eq!(a.aligned_hypothesis, "x * z");
//! ```

pub mod aggregate;
pub mod alignment;
pub mod analysis;
pub mod distance;
pub mod metrics;
pub mod options;
pub mod symbols;
pub mod tokens;

pub use aggregate::{aggregate, pair_lines, Corpus, CorpusTallies, GramStats, TokenStats};
pub use alignment::{AlignedSlot, Alignment, Gram, Slot};
pub use analysis::{analyze, SampleAnalysis};
pub use distance::{apply_editops, distance, editops, EditOp};
pub use metrics::{EditCounts, ErrorRates};
pub use options::{AnalysisOptions, GramRange, TokenWeights};
pub use tokens::Level;
