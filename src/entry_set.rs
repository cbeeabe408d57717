//! Entry-set view and the chained iteration over both stores.
//!
//! Iteration visits the string store first and then the bucket store. The
//! switch happens once, the first time the string store is found
//! exhausted, and is never undone.

use crate::bucket_store;
use crate::equivalence::{Equivalence, HashCode};
use crate::error::{Error, Result};
use crate::hybrid_map::HybridMap;
use crate::key::Classify;
use crate::string_store;
use core::hash::BuildHasher;
use core::iter::FusedIterator;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Phase {
    Strings,
    Hashes,
}

/// Borrowing iterator over `(&K, &V)`, string-keyed entries first.
pub struct Iter<'a, K, V> {
    phase: Phase,
    strings: string_store::Iter<'a, K, V>,
    hashes: bucket_store::Iter<'a, K, V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(
        strings: string_store::Iter<'a, K, V>,
        hashes: bucket_store::Iter<'a, K, V>,
    ) -> Self {
        Self {
            phase: Phase::Strings,
            strings,
            hashes,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.phase == Phase::Strings {
            if let Some(kv) = self.strings.next() {
                return Some(kv);
            }
            self.phase = Phase::Hashes;
        }
        self.hashes.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.hashes.size_hint().0;
        let n = match self.phase {
            Phase::Strings => self.strings.size_hint().0 + rest,
            Phase::Hashes => rest,
        };
        (n, Some(n))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            phase: self.phase,
            strings: self.strings.clone(),
            hashes: self.hashes.clone(),
        }
    }
}

/// Live set-of-entries view over a `HybridMap`.
///
/// The view owns no entries; every call goes to the borrowed map.
pub struct EntrySet<'a, K, V, E, S> {
    map: &'a mut HybridMap<K, V, E, S>,
}

impl<'a, K, V, E, S> EntrySet<'a, K, V, E, S>
where
    K: Classify,
    S: BuildHasher + Clone,
{
    pub(crate) fn new(map: &'a mut HybridMap<K, V, E, S>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.map.iter()
    }

    /// Removal-capable cursor over the entries.
    pub fn cursor(&mut self) -> EntryCursor<'_, K, V, E, S> {
        EntryCursor::new(self.map)
    }

    pub fn into_cursor(self) -> EntryCursor<'a, K, V, E, S> {
        EntryCursor::new(self.map)
    }
}

impl<K, V, E, S> EntrySet<'_, K, V, E, S>
where
    K: Classify,
    E: HashCode<K> + Equivalence<V>,
    S: BuildHasher + Clone,
{
    /// True iff the map maps `key` to a value equal to `value` under the
    /// map's strategy.
    pub fn contains(&self, key: &K, value: &V) -> bool {
        match self.map.get(key) {
            Some(current) => Equivalence::<V>::equals(&self.map.equivalence, value, current),
            None => false,
        }
    }

    /// Remove `key` if it currently maps to `value`. Returns whether an
    /// entry was removed.
    pub fn remove(&mut self, key: &K, value: &V) -> bool {
        if !self.contains(key, value) {
            return false;
        }
        self.map.remove(key);
        true
    }
}

impl<'s, 'a, K, V, E, S> IntoIterator for &'s EntrySet<'a, K, V, E, S>
where
    K: Classify,
    S: BuildHasher + Clone,
{
    type Item = (&'s K, &'s V);
    type IntoIter = Iter<'s, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Copy, Clone, Debug)]
enum Position {
    Str(usize),
    Bucket(usize, usize),
}

/// Chained cursor over a map's entries that can remove the entry it last
/// returned.
///
/// ```
/// use hybrid_hashmap::{HybridMap, Key};
///
/// let mut m: HybridMap<Key, i32> = HybridMap::new();
/// m.put(Key::from("a"), 1);
/// m.put(Key::from(2), 2);
/// let mut entries = m.entry_set();
/// let mut cursor = entries.cursor();
/// while cursor.has_next() {
///     let (_, v) = cursor.next().unwrap();
///     if *v == 1 {
///         cursor.remove().unwrap();
///     }
/// }
/// assert_eq!(m.len(), 1);
/// ```
pub struct EntryCursor<'a, K, V, E, S> {
    map: &'a mut HybridMap<K, V, E, S>,
    phase: Phase,
    string_pos: usize,
    bucket_pos: (usize, usize),
    last: Option<Position>,
}

impl<'a, K, V, E, S> EntryCursor<'a, K, V, E, S>
where
    K: Classify,
    S: BuildHasher + Clone,
{
    fn new(map: &'a mut HybridMap<K, V, E, S>) -> Self {
        Self {
            map,
            phase: Phase::Strings,
            string_pos: 0,
            bucket_pos: (0, 0),
            last: None,
        }
    }

    pub fn has_next(&mut self) -> bool {
        if self.phase == Phase::Strings {
            if self.string_pos < self.map.strings.len() {
                return true;
            }
            self.phase = Phase::Hashes;
        }
        let (b, e) = self.bucket_pos;
        self.map.hashes.seek(b, e).is_some()
    }

    /// Advance and return the next entry, or `ExhaustedIteration`.
    pub fn next(&mut self) -> Result<(&K, &V)> {
        if !self.has_next() {
            return Err(Error::ExhaustedIteration);
        }
        match self.phase {
            Phase::Strings => {
                let pos = self.string_pos;
                self.string_pos += 1;
                self.last = Some(Position::Str(pos));
                self.map
                    .strings
                    .entry_at(pos)
                    .ok_or(Error::ExhaustedIteration)
            }
            Phase::Hashes => {
                let (b, e) = self.bucket_pos;
                let (b, e) = self.map.hashes.seek(b, e).ok_or(Error::ExhaustedIteration)?;
                self.bucket_pos = (b, e + 1);
                self.last = Some(Position::Bucket(b, e));
                self.map
                    .hashes
                    .entry_at(b, e)
                    .ok_or(Error::ExhaustedIteration)
            }
        }
    }

    /// Remove the entry returned by the last `next()` and hand it back.
    ///
    /// Fails with `InvalidIteratorState` if `next()` has not been called
    /// since the cursor was created or since the previous removal.
    pub fn remove(&mut self) -> Result<(K, V)> {
        let last = self.last.take().ok_or(Error::InvalidIteratorState)?;
        match last {
            Position::Str(pos) => {
                let kv = self
                    .map
                    .strings
                    .remove_at(pos)
                    .ok_or(Error::InvalidIteratorState)?;
                // The last string entry was swapped into `pos` and is unvisited.
                self.string_pos = pos;
                Ok(kv)
            }
            Position::Bucket(b, e) => {
                let kv = self
                    .map
                    .hashes
                    .remove_at(b, e)
                    .ok_or(Error::InvalidIteratorState)?;
                self.bucket_pos = (b, e);
                Ok(kv)
            }
        }
    }
}
