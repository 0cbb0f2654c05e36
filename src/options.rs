//! Validated, immutable analysis configuration.
//!
//! Everything here is checked once at construction and never clamped: a
//! negative weight or an empty gram range is an error, not a silent fix.

use std::collections::HashMap;

use serde::Deserialize;

use crate::tokens::Level;

/// Errors for analysis configuration.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A per-token weight was negative, NaN or infinite.
    #[error("weight for token {token:?} must be finite and non-negative, got {weight}")]
    InvalidWeight {
        /// The token carrying the bad weight.
        token: String,
        /// The rejected weight.
        weight: f64,
    },
    /// The fallback weight was negative, NaN or infinite.
    #[error("default weight must be finite and non-negative, got {0}")]
    InvalidDefaultWeight(f64),
    /// Gram orders must satisfy `1 <= min <= max`.
    #[error("gram range must satisfy 1 <= min <= max, got [{min}, {max}]")]
    InvalidGramRange {
        /// Smallest requested order.
        min: usize,
        /// Largest requested order.
        max: usize,
    },
    /// Options document could not be parsed.
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

fn check_weight(w: f64) -> bool {
    w.is_finite() && w >= 0.0
}

/// Per-token weights with a fallback for unlisted tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenWeights {
    weights: HashMap<String, f64>,
    default: f64,
}

impl Default for TokenWeights {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
            default: Self::DEFAULT_WEIGHT,
        }
    }
}

impl TokenWeights {
    /// Weight of any token not listed explicitly, unless configured otherwise.
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    /// Build from explicit weights and a fallback.
    pub fn new(weights: HashMap<String, f64>, default: f64) -> Result<Self> {
        if !check_weight(default) {
            return Err(Error::InvalidDefaultWeight(default));
        }
        if let Some((token, &weight)) = weights.iter().find(|&(_, &w)| !check_weight(w)) {
            return Err(Error::InvalidWeight {
                token: token.clone(),
                weight,
            });
        }
        Ok(Self { weights, default })
    }

    /// Every token weighs `default`.
    pub fn uniform(default: f64) -> Result<Self> {
        Self::new(HashMap::new(), default)
    }

    /// Weight of `token`.
    pub fn weight_of(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(self.default)
    }

    /// Fallback weight.
    pub fn default_weight(&self) -> f64 {
        self.default
    }
}

/// Inclusive range of n-gram orders `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GramRange {
    min: usize,
    max: usize,
}

impl GramRange {
    /// Orders `min..=max`; requires `1 <= min <= max`.
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min == 0 || min > max {
            return Err(Error::InvalidGramRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Smallest order.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Largest order.
    pub fn max(&self) -> usize {
        self.max
    }

    /// All orders, ascending.
    pub fn orders(&self) -> std::ops::RangeInclusive<usize> {
        self.min..=self.max
    }
}

/// Configuration shared read-only by every analysis in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    level: Level,
    weights: TokenWeights,
    gram_range: Option<GramRange>,
    empty_marker: char,
    fill_marker: char,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            level: Level::Word,
            weights: TokenWeights::default(),
            gram_range: None,
            empty_marker: Self::DEFAULT_EMPTY_MARKER,
            fill_marker: Self::DEFAULT_FILL_MARKER,
        }
    }
}

impl AnalysisOptions {
    /// Rendering pad opposite a missing token.
    pub const DEFAULT_EMPTY_MARKER: char = '*';
    /// Rendering pad that evens out a substituted pair.
    pub const DEFAULT_FILL_MARKER: char = '_';

    /// Start from the defaults.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Parse and validate a JSON options document.
    ///
    /// ```json
    /// {"word_level": true, "weights": {"the": 0.0}, "default_weight": 1.0,
    ///  "gram_range": [2, 4], "empty_marker": "*", "fill_marker": "_"}
    /// ```
    /// Every field is optional.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawOptions = serde_json::from_str(json)?;
        let mut builder = Self::builder()
            .word_level(raw.word_level)
            .weights(raw.weights)
            .default_weight(raw.default_weight);
        if let Some((min, max)) = raw.gram_range {
            builder = builder.gram_range(min, max);
        }
        if let Some(c) = raw.empty_marker {
            builder = builder.empty_marker(c);
        }
        if let Some(c) = raw.fill_marker {
            builder = builder.fill_marker(c);
        }
        builder.build()
    }

    /// Comparison granularity.
    pub fn level(&self) -> Level {
        self.level
    }

    /// True for word-level comparison.
    pub fn word_level(&self) -> bool {
        self.level == Level::Word
    }

    /// Salience weights.
    pub fn weights(&self) -> &TokenWeights {
        &self.weights
    }

    /// N-gram orders to collect, if any.
    pub fn gram_range(&self) -> Option<GramRange> {
        self.gram_range
    }

    /// Rendering pad opposite a missing token.
    pub fn empty_marker(&self) -> char {
        self.empty_marker
    }

    /// Rendering pad for unequal-width substitutions.
    pub fn fill_marker(&self) -> char {
        self.fill_marker
    }
}

/// Builder for [`AnalysisOptions`]; validation happens in [`OptionsBuilder::build`].
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    level: Level,
    weights: HashMap<String, f64>,
    default_weight: f64,
    gram_range: Option<(usize, usize)>,
    empty_marker: char,
    fill_marker: char,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            level: Level::Word,
            weights: HashMap::new(),
            default_weight: TokenWeights::DEFAULT_WEIGHT,
            gram_range: None,
            empty_marker: AnalysisOptions::DEFAULT_EMPTY_MARKER,
            fill_marker: AnalysisOptions::DEFAULT_FILL_MARKER,
        }
    }
}

impl OptionsBuilder {
    /// Word-level (`true`) or character-level (`false`) comparison.
    pub fn word_level(mut self, yes: bool) -> Self {
        self.level = if yes { Level::Word } else { Level::Char };
        self
    }

    /// Comparison granularity.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Replace all per-token weights.
    pub fn weights(mut self, weights: HashMap<String, f64>) -> Self {
        self.weights = weights;
        self
    }

    /// Set one token's weight.
    pub fn weight(mut self, token: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(token.into(), weight);
        self
    }

    /// Weight of unlisted tokens.
    pub fn default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    /// Collect n-grams of orders `min..=max`.
    pub fn gram_range(mut self, min: usize, max: usize) -> Self {
        self.gram_range = Some((min, max));
        self
    }

    /// Rendering pad opposite a missing token.
    pub fn empty_marker(mut self, marker: char) -> Self {
        self.empty_marker = marker;
        self
    }

    /// Rendering pad for unequal-width substitutions.
    pub fn fill_marker(mut self, marker: char) -> Self {
        self.fill_marker = marker;
        self
    }

    /// Validate and freeze.
    pub fn build(self) -> Result<AnalysisOptions> {
        let weights = TokenWeights::new(self.weights, self.default_weight)?;
        let gram_range = self
            .gram_range
            .map(|(min, max)| GramRange::new(min, max))
            .transpose()?;
        Ok(AnalysisOptions {
            level: self.level,
            weights,
            gram_range,
            empty_marker: self.empty_marker,
            fill_marker: self.fill_marker,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    #[serde(default = "default_word_level")]
    word_level: bool,
    #[serde(default)]
    weights: HashMap<String, f64>,
    #[serde(default = "default_weight")]
    default_weight: f64,
    #[serde(default)]
    gram_range: Option<(usize, usize)>,
    #[serde(default)]
    empty_marker: Option<char>,
    #[serde(default)]
    fill_marker: Option<char>,
}

fn default_word_level() -> bool {
    true
}
fn default_weight() -> f64 {
    TokenWeights::DEFAULT_WEIGHT
}
