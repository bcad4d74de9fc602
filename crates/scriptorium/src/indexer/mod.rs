//! # Symbol Indexers
//!
//! Two independent [`SymbolIndexer`] namespaces exist:
//! * [`CharIndexer`] - the language-model alphabet (including meta characters
//!   such as [`charset::HYPHEN`]).
//! * [`LanguageIndexer`] - the language names.
//!
//! Both are frozen before training starts.

pub mod charset;
mod symbol_indexer;

pub use symbol_indexer::SymbolIndexer;

/// Indexer over the language-model alphabet.
pub type CharIndexer = SymbolIndexer<String>;

/// Indexer over language names.
pub type LanguageIndexer = SymbolIndexer<String>;
