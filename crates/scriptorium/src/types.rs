//! # Common Types and Traits
use core::{fmt::Debug, hash::Hash};

/// Dense id of a character in the [`crate::CharIndexer`].
pub type CharId = usize;

/// Dense id of a language in the [`crate::LanguageIndexer`].
pub type LanguageId = usize;

/// A type that can be stored in a [`crate::SymbolIndexer`].
pub trait SymbolType: 'static + Clone + Eq + Hash + Ord + Debug + Send + Sync {}

impl<T> SymbolType for T where T: 'static + Clone + Eq + Hash + Ord + Debug + Send + Sync {}

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type CommonHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type CommonHashSet<V> = ahash::AHashSet<V>;

    } else {
        /// Type Alias for hash maps in this crate.
        pub type CommonHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type CommonHashSet<V> = std::collections::HashSet<V>;
    }
}

/// Compile-time check that a value is [`Send`].
pub fn check_is_send<S: Send>(_: S) {}

/// Compile-time check that a value is [`Sync`].
pub fn check_is_sync<S: Sync>(_: S) {}
