//! HybridMap: routes each key to the string store or the bucket store.

use crate::bucket_store::{BucketSlot, HashBucketStore};
use crate::entry_set::{EntrySet, Iter};
use crate::equivalence::{Equivalence, HashCode, Identity, Structural};
use crate::error::{Error, Result};
use crate::key::{Classify, KeyKind};
use crate::string_store::StringKeyStore;
use core::fmt;
use core::hash::BuildHasher;
use std::collections::hash_map::RandomState;

/// Load factor used when only a capacity hint is given.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// A map whose string keys live in a text-indexed store and whose other
/// keys, including null, live in hash-code buckets compared with the
/// equivalence strategy `E`.
///
/// The two stores never share a key: `"1"` and `1` are different keys.
///
/// ```
/// use hybrid_hashmap::{HybridMap, Key};
///
/// let mut m: HybridMap<Key, &str> = HybridMap::new();
/// m.put(Key::from("a"), "letter");
/// m.put(Key::from(2), "number");
/// m.put(Key::Null, "null");
/// assert_eq!(m.len(), 3);
/// assert_eq!(m.get(&Key::Null), Some(&"null"));
/// ```
#[derive(Clone)]
pub struct HybridMap<K, V, E = Structural, S = RandomState> {
    pub(crate) strings: StringKeyStore<K, V, S>,
    pub(crate) hashes: HashBucketStore<K, V, S>,
    pub(crate) equivalence: E,
}

/// A map comparing non-string keys and all values by reference identity.
pub type IdentityMap<K, V, S = RandomState> = HybridMap<K, V, Identity, S>;

#[inline]
fn same_key<K, E: Equivalence<K>>(eq: &E, a: &K, b: &K) -> bool {
    eq.equals(a, b)
}

#[inline]
fn same_value<V, E: Equivalence<V>>(eq: &E, a: &V, b: &V) -> bool {
    eq.equals(a, b)
}

fn check_hints(capacity: i64, load_factor: f32) -> Result<()> {
    // NaN fails `> 0.0` and is rejected with the non-positive factors.
    if capacity < 0 || !(load_factor > 0.0) {
        log::warn!(
            "rejecting map construction: capacity {}, load factor {}",
            capacity,
            load_factor
        );
        return Err(Error::InvalidConstructionArgument {
            capacity,
            load_factor,
        });
    }
    log::debug!(
        "ignoring capacity hint {} and load factor {}; stores grow on demand",
        capacity,
        load_factor
    );
    Ok(())
}

impl<K, V> HybridMap<K, V>
where
    K: Classify,
{
    pub fn new() -> Self {
        Self::with_equivalence(Structural)
    }

    /// Accepts a capacity hint for interface compatibility. The hint has
    /// no effect; a negative capacity is rejected.
    pub fn with_capacity(capacity: i64) -> Result<Self> {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Like `with_capacity`; a load factor that is not strictly positive
    /// is rejected.
    pub fn with_capacity_and_load_factor(capacity: i64, load_factor: f32) -> Result<Self> {
        check_hints(capacity, load_factor)?;
        Ok(Self::new())
    }
}

impl<K, V, E> HybridMap<K, V, E>
where
    K: Classify,
{
    pub fn with_equivalence(equivalence: E) -> Self {
        Self::with_equivalence_and_hasher(equivalence, RandomState::new())
    }
}

impl<K, V, E, S> HybridMap<K, V, E, S>
where
    K: Classify,
    S: BuildHasher + Clone,
{
    /// `hasher` indexes the string store's text and the bucket store's
    /// hash codes; it never replaces the strategy's hash codes.
    pub fn with_equivalence_and_hasher(equivalence: E, hasher: S) -> Self {
        Self {
            strings: StringKeyStore::with_hasher(hasher.clone()),
            hashes: HashBucketStore::with_hasher(hasher),
            equivalence,
        }
    }

    pub fn equivalence(&self) -> &E {
        &self.equivalence
    }

    pub fn len(&self) -> usize {
        self.strings.len() + self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty() && self.hashes.is_empty()
    }

    pub fn clear(&mut self) {
        log::trace!(
            "clearing map: {} string-keyed, {} hashed entries",
            self.strings.len(),
            self.hashes.len()
        );
        self.strings.clear();
        self.hashes.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.strings.iter(), self.hashes.iter())
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Live view of the entries; removals through it remove from the map.
    pub fn entry_set(&mut self) -> EntrySet<'_, K, V, E, S> {
        EntrySet::new(self)
    }

    pub fn get_str(&self, key: &str) -> Option<&V> {
        self.strings.get(key)
    }

    pub fn contains_str(&self, key: &str) -> bool {
        self.strings.contains(key)
    }

    pub fn remove_str(&mut self, key: &str) -> Option<V> {
        self.strings.remove(key).map(|(_, v)| v)
    }
}

impl<K, V, E, S> HybridMap<K, V, E, S>
where
    K: Classify,
    E: HashCode<K> + Equivalence<V>,
    S: BuildHasher + Clone,
{
    /// Copy every entry of `source` through `put`, so routing is decided
    /// by this map's classification and strategy. `source` is any borrowed
    /// map: another `HybridMap`, a `std::collections::HashMap`, and so on.
    pub fn from_map<'a, I>(source: I) -> Self
    where
        I: IntoIterator<Item = (&'a K, &'a V)>,
        K: Clone + 'a,
        V: Clone + 'a,
        E: Default,
        S: Default,
    {
        Self::from_entries(source, E::default(), S::default())
    }

    /// Like `from_map`, with the strategy and hasher supplied by the
    /// caller.
    pub fn from_entries<'a, I>(source: I, equivalence: E, hasher: S) -> Self
    where
        I: IntoIterator<Item = (&'a K, &'a V)>,
        K: Clone + 'a,
        V: Clone + 'a,
    {
        let mut map = Self::with_equivalence_and_hasher(equivalence, hasher);
        map.put_all(source.into_iter().map(|(k, v)| (k.clone(), v.clone())));
        map
    }

    // `None` for string keys.
    fn bucket_slot(&self, key: &K) -> Option<BucketSlot> {
        match key.classify() {
            KeyKind::Str(_) => None,
            KeyKind::Null => Some(BucketSlot::Null),
            KeyKind::Object => Some(BucketSlot::Code(self.equivalence.hash_code(key))),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match key.classify() {
            KeyKind::Str(s) => self.strings.get(s),
            KeyKind::Null => self.hashes.get(BucketSlot::Null, |_| true),
            KeyKind::Object => {
                let slot = BucketSlot::Code(self.equivalence.hash_code(key));
                self.hashes
                    .get(slot, |k| same_key(&self.equivalence, k, key))
            }
        }
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match key.classify() {
            KeyKind::Str(s) => self.strings.get_mut(s),
            KeyKind::Null => self.hashes.get_mut(BucketSlot::Null, |_| true),
            KeyKind::Object => {
                let eq = &self.equivalence;
                let slot = BucketSlot::Code(eq.hash_code(key));
                self.hashes.get_mut(slot, |k| same_key(eq, k, key))
            }
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        match key.classify() {
            KeyKind::Str(s) => self.strings.contains(s),
            KeyKind::Null => self.hashes.contains(BucketSlot::Null, |_| true),
            KeyKind::Object => {
                let slot = BucketSlot::Code(self.equivalence.hash_code(key));
                self.hashes
                    .contains(slot, |k| same_key(&self.equivalence, k, key))
            }
        }
    }

    /// Associate `value` with `key`, returning the previous value. An
    /// existing entry keeps its original key.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.bucket_slot(&key) {
            None => self.strings.put(key, value),
            Some(BucketSlot::Null) => self.hashes.put(BucketSlot::Null, key, value, |_, _| true),
            Some(slot) => {
                let eq = &self.equivalence;
                self.hashes.put(slot, key, value, |a, b| same_key(eq, a, b))
            }
        }
    }

    pub fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in entries {
            self.put(k, v);
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Remove `key`, returning the stored key and its value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        match key.classify() {
            KeyKind::Str(s) => self.strings.remove(s),
            KeyKind::Null => self.hashes.remove(BucketSlot::Null, |_| true),
            KeyKind::Object => {
                let eq = &self.equivalence;
                let slot = BucketSlot::Code(eq.hash_code(key));
                self.hashes.remove(slot, |k| same_key(eq, k, key))
            }
        }
    }

    /// Scans the string store first, then the buckets.
    pub fn contains_value(&self, value: &V) -> bool {
        let eq = &self.equivalence;
        self.strings.contains_value(|v| same_value(eq, v, value))
            || self.hashes.contains_value(|v| same_value(eq, v, value))
    }
}

impl<K, V, E, S> Default for HybridMap<K, V, E, S>
where
    K: Classify,
    E: Default,
    S: BuildHasher + Clone + Default,
{
    fn default() -> Self {
        Self::with_equivalence_and_hasher(E::default(), S::default())
    }
}

impl<K, V> HybridMap<K, V, Identity>
where
    K: Classify,
{
    pub fn new_identity() -> Self {
        Self::with_equivalence(Identity)
    }
}

impl<K, V, E, S> PartialEq for HybridMap<K, V, E, S>
where
    K: Classify,
    E: HashCode<K> + Equivalence<V>,
    S: BuildHasher + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(k, v)| {
                other
                    .get(k)
                    .map_or(false, |ov| same_value(&self.equivalence, v, ov))
            })
    }
}

impl<K, V, E, S> fmt::Debug for HybridMap<K, V, E, S>
where
    K: Classify + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, E, S> Extend<(K, V)> for HybridMap<K, V, E, S>
where
    K: Classify,
    E: HashCode<K> + Equivalence<V>,
    S: BuildHasher + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

impl<K, V> FromIterator<(K, V)> for HybridMap<K, V>
where
    K: Classify,
    Structural: HashCode<K> + Equivalence<V>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.put_all(iter);
        map
    }
}

impl<'a, K, V, E, S> IntoIterator for &'a HybridMap<K, V, E, S>
where
    K: Classify,
    S: BuildHasher + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Every key hashes to the same code; equality is structural.
    #[derive(Default)]
    struct Colliding {
        hashed: Cell<usize>,
    }
    impl<T: PartialEq> Equivalence<T> for Colliding {
        fn equals(&self, a: &T, b: &T) -> bool {
            a == b
        }
    }
    impl<T: PartialEq> HashCode<T> for Colliding {
        fn hash_code(&self, _key: &T) -> i32 {
            self.hashed.set(self.hashed.get() + 1);
            0
        }
    }

    #[test]
    fn string_and_null_keys_never_reach_the_strategy_hash() {
        let mut m: HybridMap<Key, i32, Colliding> =
            HybridMap::with_equivalence(Colliding::default());
        m.put(Key::from("a"), 1);
        m.put(Key::Null, 2);
        assert_eq!(m.get(&Key::from("a")), Some(&1));
        assert_eq!(m.get(&Key::Null), Some(&2));
        assert_eq!(m.equivalence().hashed.get(), 0);

        m.put(Key::from(1), 3);
        assert_eq!(m.equivalence().hashed.get(), 1);
    }

    #[test]
    fn colliding_object_keys_stay_distinct() {
        let mut m: HybridMap<Key, i32, Colliding> =
            HybridMap::with_equivalence(Colliding::default());
        for i in 0..10 {
            m.put(Key::from(i), i as i32);
        }
        assert_eq!(m.len(), 10);
        assert_eq!(m.hashes.bucket_count(), 1);
        for i in 0..10 {
            assert_eq!(m.get(&Key::from(i)), Some(&(i as i32)));
        }
        assert_eq!(m.remove(&Key::from(4)), Some(4));
        assert!(!m.contains_key(&Key::from(4)));
        assert_eq!(m.len(), 9);
    }

    #[test]
    fn copy_uses_the_supplied_strategy_instance() {
        let mut src: HybridMap<Key, i32> = HybridMap::new();
        src.put(Key::from("s"), 1);
        src.put(Key::from(1), 2);
        src.put(Key::from(2), 3);
        src.put(Key::Null, 4);

        let eq = Colliding::default();
        eq.hashed.set(5);
        let copy = HybridMap::from_entries(&src, eq, RandomState::new());
        assert_eq!(copy.len(), 4);
        // Two object keys were hashed by the instance passed in.
        assert_eq!(copy.equivalence().hashed.get(), 7);
        assert_eq!(copy.hashes.bucket_count(), 2);
        assert_eq!(copy.get(&Key::from(2)), Some(&3));
        assert_eq!(copy.get_str("s"), Some(&1));
    }

    #[test]
    fn keys_are_routed_by_classification() {
        let mut m: HybridMap<Key, i32> = HybridMap::new();
        m.put(Key::from("1"), 1);
        m.put(Key::from(1), 2);
        m.put(Key::Null, 3);
        assert_eq!(m.strings.len(), 1);
        assert_eq!(m.hashes.len(), 2);
        assert_eq!(m.get_str("1"), Some(&1));
        assert_eq!(m.get(&Key::from(1)), Some(&2));
    }

    #[test]
    fn identity_map_compares_allocations() {
        let a = Rc::new(10u32);
        let b = Rc::new(10u32);
        let mut m: IdentityMap<Rc<u32>, Rc<&str>> = HybridMap::new_identity();
        let va = Rc::new("a");
        m.put(a.clone(), va.clone());
        m.put(b.clone(), Rc::new("b"));
        assert_eq!(m.len(), 2);
        assert!(m.contains_key(&a));
        assert!(!m.contains_key(&Rc::new(10u32)));
        assert!(m.contains_value(&va));
        assert!(!m.contains_value(&Rc::new("a")));
    }

    #[test]
    fn identity_map_still_routes_strings_by_text() {
        let mut m: IdentityMap<Rc<str>, Rc<i32>> = HybridMap::new_identity();
        m.put(Rc::from("k"), Rc::new(1));
        let prev = m.put(Rc::from("k"), Rc::new(2));
        assert_eq!(prev.as_deref(), Some(&1));
        assert_eq!(m.len(), 1);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn strategy_reading_its_own_map_panics_in_debug() {
        use std::cell::RefCell;
        use std::rc::Weak;

        /// Key equality that reads the map it belongs to.
        struct Peeking {
            map: RefCell<Weak<RefCell<HybridMap<Key, i32, Peeking>>>>,
        }
        impl Equivalence<Key> for Peeking {
            fn equals(&self, a: &Key, b: &Key) -> bool {
                if let Some(map) = self.map.borrow().upgrade() {
                    map.borrow().contains_value(&0);
                }
                a == b
            }
        }
        impl HashCode<Key> for Peeking {
            fn hash_code(&self, key: &Key) -> i32 {
                Structural.hash_code(key)
            }
        }
        impl Equivalence<i32> for Peeking {
            fn equals(&self, a: &i32, b: &i32) -> bool {
                a == b
            }
        }

        let map = Rc::new(RefCell::new(HybridMap::with_equivalence(Peeking {
            map: RefCell::new(Weak::new()),
        })));
        *map.borrow().equivalence().map.borrow_mut() = Rc::downgrade(&map);
        map.borrow_mut().put(Key::from(1), 1);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            map.borrow().get(&Key::from(1)).copied()
        }));
        assert!(res.is_err(), "nested lookup should panic in debug builds");
    }

    #[test]
    fn capacity_hints_are_validated() {
        assert!(HybridMap::<Key, i32>::with_capacity(0).is_ok());
        assert!(HybridMap::<Key, i32>::with_capacity(16).is_ok());
        assert_eq!(
            HybridMap::<Key, i32>::with_capacity(-1).err(),
            Some(Error::InvalidConstructionArgument {
                capacity: -1,
                load_factor: DEFAULT_LOAD_FACTOR
            })
        );
        assert!(HybridMap::<Key, i32>::with_capacity_and_load_factor(4, 0.0).is_err());
        assert!(HybridMap::<Key, i32>::with_capacity_and_load_factor(4, -0.5).is_err());
        assert!(HybridMap::<Key, i32>::with_capacity_and_load_factor(4, f32::NAN).is_err());
        assert!(HybridMap::<Key, i32>::with_capacity_and_load_factor(4, 0.5).is_ok());
    }

    #[test]
    fn get_mut_reaches_every_store() {
        let mut m: HybridMap<Key, i32> = HybridMap::new();
        m.put(Key::from("s"), 1);
        m.put(Key::from(5), 2);
        m.put(Key::Null, 3);
        for k in [Key::from("s"), Key::from(5), Key::Null] {
            *m.get_mut(&k).unwrap() *= 10;
        }
        assert_eq!(m.get(&Key::from("s")), Some(&10));
        assert_eq!(m.get(&Key::from(5)), Some(&20));
        assert_eq!(m.get(&Key::Null), Some(&30));
        assert!(m.get_mut(&Key::from("missing")).is_none());
    }
}
