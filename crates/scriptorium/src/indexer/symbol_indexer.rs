//! # Symbol Indexer ``{ S <-> usize }``

use core::{borrow::Borrow, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{SCResult, ScriptoriumError},
    types::{CommonHashMap, SymbolType},
};

/// Bidirectional map between dense ids and symbols.
///
/// Ids are assigned in insertion order, starting at zero, and never change.
/// While mutable, [`SymbolIndexer::index_of`] assigns ids to unseen symbols;
/// once [`SymbolIndexer::freeze`] has been called it fails instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    into = "IndexerRecord<S>",
    try_from = "IndexerRecord<S>",
    bound(serialize = "S: SymbolType + Serialize", deserialize = "S: SymbolType + Deserialize<'de>")
)]
pub struct SymbolIndexer<S: SymbolType> {
    objects: Vec<S>,
    index: CommonHashMap<S, usize>,
    frozen: bool,
}

/// The persisted form of a [`SymbolIndexer`]; the reverse index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct IndexerRecord<S> {
    objects: Vec<S>,
    frozen: bool,
}

impl<S: SymbolType> From<SymbolIndexer<S>> for IndexerRecord<S> {
    fn from(indexer: SymbolIndexer<S>) -> Self {
        Self {
            objects: indexer.objects,
            frozen: indexer.frozen,
        }
    }
}

impl<S: SymbolType> TryFrom<IndexerRecord<S>> for SymbolIndexer<S> {
    type Error = String;

    fn try_from(record: IndexerRecord<S>) -> Result<Self, Self::Error> {
        let mut indexer = Self::new();
        for symbol in record.objects {
            if indexer.get_index(&symbol).is_some() {
                return Err(format!("duplicate symbol {symbol:?}"));
            }
            indexer.push(symbol);
        }
        indexer.frozen = record.frozen;
        Ok(indexer)
    }
}

impl<S: SymbolType> Default for SymbolIndexer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SymbolType> PartialEq for SymbolIndexer<S> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.objects == other.objects && self.frozen == other.frozen
    }
}

impl<S: SymbolType> Eq for SymbolIndexer<S> {}

impl<S: SymbolType> FromIterator<S> for SymbolIndexer<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut indexer = Self::new();
        for symbol in iter {
            if indexer.get_index(&symbol).is_none() {
                indexer.push(symbol);
            }
        }
        indexer
    }
}

impl<S: SymbolType> SymbolIndexer<S> {
    /// Create a new, empty, mutable indexer.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            index: CommonHashMap::new(),
            frozen: false,
        }
    }

    fn push(
        &mut self,
        symbol: S,
    ) -> usize {
        let id = self.objects.len();
        self.index.insert(symbol.clone(), id);
        self.objects.push(symbol);
        id
    }

    /// Get the id of a symbol, assigning the next id if it is unseen.
    ///
    /// ## Arguments
    /// * `symbol` - the symbol to look up.
    ///
    /// ## Returns
    /// The symbol's id.
    ///
    /// ## Errors
    /// [`ScriptoriumError::UnknownSymbol`] if the symbol is unseen and the indexer is frozen.
    pub fn index_of<Q>(
        &mut self,
        symbol: &Q,
    ) -> SCResult<usize>
    where
        S: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = S> + core::fmt::Debug,
    {
        if let Some(&id) = self.index.get(symbol) {
            return Ok(id);
        }
        if self.frozen {
            return Err(ScriptoriumError::UnknownSymbol {
                symbol: format!("{symbol:?}"),
            });
        }
        Ok(self.push(symbol.to_owned()))
    }

    /// Look up the id of a symbol without inserting.
    pub fn get_index<Q>(
        &self,
        symbol: &Q,
    ) -> Option<usize>
    where
        S: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.get(symbol).copied()
    }

    /// Look up the id of a symbol that must already be present.
    ///
    /// ## Errors
    /// [`ScriptoriumError::UnknownSymbol`] if the symbol has no id.
    pub fn lookup<Q>(
        &self,
        symbol: &Q,
    ) -> SCResult<usize>
    where
        S: Borrow<Q>,
        Q: ?Sized + Hash + Eq + core::fmt::Debug,
    {
        self.get_index(symbol)
            .ok_or_else(|| ScriptoriumError::UnknownSymbol {
                symbol: format!("{symbol:?}"),
            })
    }

    /// Get the symbol with the given id.
    ///
    /// ## Errors
    /// [`ScriptoriumError::OutOfRange`] if the id is not assigned.
    pub fn object_of(
        &self,
        id: usize,
    ) -> SCResult<&S> {
        self.objects.get(id).ok_or(ScriptoriumError::OutOfRange {
            id,
            len: self.objects.len(),
        })
    }

    /// Does the indexer contain this symbol?
    pub fn contains<Q>(
        &self,
        symbol: &Q,
    ) -> bool
    where
        S: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.contains_key(symbol)
    }

    /// The number of assigned ids.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if no ids are assigned.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Stop assigning new ids.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Consume and return a frozen indexer.
    pub fn frozen(mut self) -> Self {
        self.freeze();
        self
    }

    /// Has [`SymbolIndexer::freeze`] been called?
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The symbols, in id order.
    pub fn objects(&self) -> &[S] {
        &self.objects
    }

    /// Iterate over ``(id, symbol)`` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &S)> {
        self.objects.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::CharIndexer;

    #[test]
    fn test_insertion_order_ids() {
        let mut chars = CharIndexer::new();
        assert_eq!(chars.index_of("a").unwrap(), 0);
        assert_eq!(chars.index_of("b").unwrap(), 1);
        assert_eq!(chars.index_of("a").unwrap(), 0);
        assert_eq!(chars.index_of("-").unwrap(), 2);

        assert_eq!(chars.len(), 3);
        assert_eq!(chars.object_of(1).unwrap(), "b");
        assert_eq!(chars.get_index("-"), Some(2));
        assert_eq!(chars.get_index("q"), None);
    }

    #[test]
    fn test_frozen_lookup() {
        let mut chars: CharIndexer = ["a", "b"].iter().map(|s| s.to_string()).collect();
        chars.freeze();
        assert!(chars.is_frozen());

        assert_eq!(chars.index_of("b").unwrap(), 1);
        assert!(matches!(
            chars.index_of("q"),
            Err(ScriptoriumError::UnknownSymbol { .. })
        ));
        assert!(matches!(
            chars.lookup("q"),
            Err(ScriptoriumError::UnknownSymbol { .. })
        ));
        assert_eq!(chars.len(), 2);
    }

    #[test]
    fn test_out_of_range() {
        let chars: CharIndexer = ["a"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            chars.object_of(1),
            Err(ScriptoriumError::OutOfRange { id: 1, len: 1 })
        ));
    }

    #[test]
    fn test_from_iter_dedupes() {
        let chars: CharIndexer = ["x", "y", "x", "z"].iter().map(|s| s.to_string()).collect();
        assert_eq!(chars.objects(), &["x", "y", "z"]);
        assert!(!chars.is_frozen());
    }

    #[test]
    fn test_serde_rebuilds_index() {
        let chars: CharIndexer = ["a", "b", "c"]
            .iter()
            .map(|s| s.to_string())
            .collect::<CharIndexer>()
            .frozen();

        let bytes = bincode::serialize(&chars).unwrap();
        let loaded: CharIndexer = bincode::deserialize(&bytes).unwrap();

        assert_eq!(loaded, chars);
        assert!(loaded.is_frozen());
        assert_eq!(loaded.get_index("c"), Some(2));
    }

    #[test]
    fn test_serde_rejects_duplicates() {
        let record = IndexerRecord {
            objects: vec!["a".to_string(), "a".to_string()],
            frozen: true,
        };
        let bytes = bincode::serialize(&record).unwrap();
        assert!(bincode::deserialize::<CharIndexer>(&bytes).is_err());
    }
}
