//! hybrid-hashmap: a single-threaded map that keeps string keys and all
//! other keys in two separately optimized stores behind one map API.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: arbitrary keys (including a null key) with pluggable equality
//!   and hashing, while string keys take a fast text-indexed path.
//! - Layers:
//!   - StringKeyStore<K, V, S>: dense entries indexed by key text. String
//!     keys are equal iff their text is equal; the owner's strategy is
//!     never consulted for them.
//!   - HashBucketStore<K, V, S>: entries grouped by the 32-bit hash code
//!     the owner's strategy computes. Collisions are resolved by a linear
//!     scan using the strategy's equality. The null key has a reserved
//!     bucket.
//!   - HybridMap<K, V, E, S>: classifies every key (string, null, other)
//!     and delegates to exactly one store. Only `len`, `contains_value`,
//!     `clear` and iteration touch both.
//!   - EntrySet / EntryCursor: a live view over the map and a chained
//!     cursor that walks the string store, then the bucket store, and can
//!     remove the entry it last returned.
//!
//! Constraints
//! - Single-threaded: no locking, no atomics.
//! - No capacity or load-factor tuning; hints are validated and ignored.
//! - Key sets of the two stores are disjoint: a string key is never in the
//!   bucket store and vice versa.
//!
//! Strategies
//! - `Structural` compares with `PartialEq` and derives hash codes from a
//!   fixed-key SipHash. `Identity` compares `Rc`/`Arc`/`&T` by address.
//! - Panics raised by a strategy or by `Classify` propagate unchanged.
//!
//! Reentrancy policy
//! - Stores run user code (classification, equality, hash codes) while
//!   probing. A debug-only guard panics if such a callback re-enters the
//!   same store.
//!
//! Iteration order
//! - All string-keyed entries come first, then bucketed entries. No other
//!   order is guaranteed, and mutating the map other than through
//!   `EntryCursor::remove` while a cursor is live is not supported (the
//!   borrow checker rules it out).

mod bucket_store;
mod entry_set;
mod equivalence;
mod error;
mod hybrid_map;
mod key;
mod reentrancy;
mod string_store;

#[cfg(test)]
mod store_proptest;

// Public surface
pub use entry_set::{EntryCursor, EntrySet, Iter};
pub use equivalence::{Equivalence, HashCode, Identity, Structural};
pub use error::{Error, Result};
pub use hybrid_map::{HybridMap, IdentityMap, Keys, Values, DEFAULT_LOAD_FACTOR};
pub use key::{Classify, Key, KeyKind};
