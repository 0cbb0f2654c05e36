//! Splitting text into comparison units.
//!
//! Words are maximal runs of non-whitespace; characters are Unicode scalar
//! values, whitespace included. No further segmentation is attempted.

use serde::{Deserialize, Serialize};

/// Granularity of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Whitespace-delimited words.
    #[default]
    Word,
    /// Single characters.
    Char,
}

impl Level {
    /// Split `text` into tokens at this level, borrowing from `text`.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            Self::Word => words(text),
            Self::Char => chars(text),
        }
    }

    /// Separator used when rendering a line of tokens.
    pub fn gap(&self) -> &'static str {
        match self {
            Self::Word => " ",
            Self::Char => "",
        }
    }
}

/// Whitespace-delimited words.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Every character as its own one-char slice.
pub fn chars(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, c)| &text[i..i + c.len_utf8()])
        .collect()
}

/// Characters with all whitespace removed; the unit of the character error rate.
pub fn dense_chars(text: &str) -> Vec<char> {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_any_whitespace() {
        assert_eq!(words("  a\tbb\n c  "), vec!["a", "bb", "c"]);
        assert!(words(" \n ").is_empty());
    }

    #[test]
    fn chars_keep_whitespace_and_multibyte_scalars() {
        assert_eq!(chars("ab c"), vec!["a", "b", " ", "c"]);
        assert_eq!(chars("œπ"), vec!["œ", "π"]);
    }

    #[test]
    fn dense_chars_drop_whitespace() {
        assert_eq!(dense_chars("a b\tc"), vec!['a', 'b', 'c']);
    }

    #[test]
    fn level_dispatch() {
        assert_eq!(Level::Word.tokenize("x y"), vec!["x", "y"]);
        assert_eq!(Level::Char.tokenize("x y"), vec!["x", " ", "y"]);
        assert_eq!(Level::default(), Level::Word);
    }
}
