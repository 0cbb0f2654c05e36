//! Compact symbol encoding for token sequences.
//!
//! The distance engine compares fixed-width integers rather than tokens. A
//! [`SymbolTable`] assigns each distinct token the next free [`Symbol`] in
//! first-seen order, so encoding both sides of one comparison through the same
//! table is injective over the union of the two vocabularies:
//! \[
//! \operatorname{enc}(u) = \operatorname{enc}(v) \iff u = v.
//! \]
//!
//! Codes are only meaningful inside one table. Nothing is shared across pairs.

use std::collections::HashMap;
use std::hash::Hash;

/// Code assigned to one distinct token.
pub type Symbol = u32;

/// Bijective token ↔ symbol mapping built incrementally.
#[derive(Debug, Clone)]
pub struct SymbolTable<K> {
    codes: HashMap<K, Symbol>,
    tokens: Vec<K>,
}

impl<K> Default for SymbolTable<K> {
    fn default() -> Self {
        Self {
            codes: HashMap::new(),
            tokens: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> SymbolTable<K> {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbol for `token`, allocating a fresh one on first sight.
    pub fn intern(&mut self, token: &K) -> Symbol {
        if let Some(&code) = self.codes.get(token) {
            return code;
        }
        let code = Symbol::try_from(self.tokens.len())
            .unwrap_or_else(|_| unreachable!("more than u32::MAX distinct tokens in one pair"));
        self.codes.insert(token.clone(), code);
        self.tokens.push(token.clone());
        code
    }

    /// Encode a whole sequence, interning unseen tokens.
    pub fn encode(&mut self, seq: &[K]) -> Vec<Symbol> {
        seq.iter().map(|t| self.intern(t)).collect()
    }

    /// Token behind `symbol`, if it was allocated by this table.
    pub fn token(&self, symbol: Symbol) -> Option<&K> {
        self.tokens.get(symbol as usize)
    }

    /// Number of distinct tokens seen.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Encode a pair of sequences through one shared table.
pub fn encode_pair<K: Eq + Hash + Clone>(a: &[K], b: &[K]) -> (Vec<Symbol>, Vec<Symbol>) {
    let mut table = SymbolTable::new();
    let ea = table.encode(a);
    let eb = table.encode(b);
    (ea, eb)
}
