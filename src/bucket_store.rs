//! HashBucketStore: entries grouped into collision buckets by 32-bit hash code.
//!
//! The store knows nothing about how codes are computed or how keys are
//! compared; callers pass the bucket slot and a key predicate supplied by
//! the owning map's equivalence strategy. The null key has a reserved
//! slot of its own.
//!
//! Invariants:
//! - Every bucket in `buckets` is non-empty and is reachable from `index`
//!   under its slot's hash.
//! - Within a bucket, no two keys match under the owner's equality.
//! - `len` equals the total number of entries across buckets.

use crate::reentrancy::DebugReentrancy;
use core::hash::BuildHasher;
use core::mem;
use hashbrown::HashTable;
use std::collections::hash_map::RandomState;

/// Identifies a bucket.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum BucketSlot {
    Null,
    Code(i32),
}

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

#[derive(Clone, Debug)]
struct Bucket<K, V> {
    slot: BucketSlot,
    hash: u64,
    entries: Vec<Entry<K, V>>,
}

#[derive(Clone)]
pub(crate) struct HashBucketStore<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<usize>,
    buckets: Vec<Bucket<K, V>>,
    len: usize,
    reentrancy: DebugReentrancy,
}

impl<K, V, S> HashBucketStore<K, V, S>
where
    S: BuildHasher,
{
    pub(crate) fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            buckets: Vec::new(),
            len: 0,
            reentrancy: DebugReentrancy::new(),
        }
    }

    fn bucket_of(&self, slot: BucketSlot) -> Option<usize> {
        let hash = self.hasher.hash_one(slot);
        let buckets = &self.buckets;
        self.index.find(hash, |&b| buckets[b].slot == slot).copied()
    }

    fn locate<F>(&self, slot: BucketSlot, mut matches: F) -> Option<(usize, usize)>
    where
        F: FnMut(&K) -> bool,
    {
        let b = self.bucket_of(slot)?;
        let e = self.buckets[b]
            .entries
            .iter()
            .position(|e| matches(&e.key))?;
        Some((b, e))
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn get<F>(&self, slot: BucketSlot, matches: F) -> Option<&V>
    where
        F: FnMut(&K) -> bool,
    {
        let _g = self.reentrancy.enter();
        let (b, e) = self.locate(slot, matches)?;
        Some(&self.buckets[b].entries[e].value)
    }

    pub(crate) fn get_mut<F>(&mut self, slot: BucketSlot, matches: F) -> Option<&mut V>
    where
        F: FnMut(&K) -> bool,
    {
        let _g = self.reentrancy.enter();
        let (b, e) = self.locate(slot, matches)?;
        Some(&mut self.buckets[b].entries[e].value)
    }

    pub(crate) fn contains<F>(&self, slot: BucketSlot, matches: F) -> bool
    where
        F: FnMut(&K) -> bool,
    {
        let _g = self.reentrancy.enter();
        self.locate(slot, matches).is_some()
    }

    /// Overwrite the value of the entry whose key is `same(stored, &key)`,
    /// or append a new entry to the slot's bucket, creating it if absent.
    pub(crate) fn put<F>(&mut self, slot: BucketSlot, key: K, value: V, mut same: F) -> Option<V>
    where
        F: FnMut(&K, &K) -> bool,
    {
        let _g = self.reentrancy.enter();
        match self.bucket_of(slot) {
            Some(b) => {
                let bucket = &mut self.buckets[b];
                match bucket.entries.iter().position(|e| same(&e.key, &key)) {
                    Some(e) => Some(mem::replace(&mut bucket.entries[e].value, value)),
                    None => {
                        bucket.entries.push(Entry { key, value });
                        self.len += 1;
                        None
                    }
                }
            }
            None => {
                let hash = self.hasher.hash_one(slot);
                let b = self.buckets.len();
                self.buckets.push(Bucket {
                    slot,
                    hash,
                    entries: vec![Entry { key, value }],
                });
                let buckets = &self.buckets;
                self.index.insert_unique(hash, b, |&i| buckets[i].hash);
                self.len += 1;
                None
            }
        }
    }

    pub(crate) fn remove<F>(&mut self, slot: BucketSlot, matches: F) -> Option<(K, V)>
    where
        F: FnMut(&K) -> bool,
    {
        let (b, e) = {
            let _g = self.reentrancy.enter();
            self.locate(slot, matches)?
        };
        self.remove_at(b, e)
    }

    /// Remove entry `e` of bucket `b`. Later entries of the bucket shift
    /// down by one; an emptied bucket is replaced by the last bucket.
    pub(crate) fn remove_at(&mut self, b: usize, e: usize) -> Option<(K, V)> {
        let _g = self.reentrancy.enter();
        let bucket = self.buckets.get_mut(b)?;
        if e >= bucket.entries.len() {
            return None;
        }
        let entry = bucket.entries.remove(e);
        self.len -= 1;
        if bucket.entries.is_empty() {
            let hash = bucket.hash;
            if let Ok(occupied) = self.index.find_entry(hash, |&i| i == b) {
                occupied.remove();
            }
            self.buckets.swap_remove(b);
            if let Some(moved) = self.buckets.get(b) {
                let last = self.buckets.len();
                if let Some(pos) = self.index.find_mut(moved.hash, |&i| i == last) {
                    *pos = b;
                }
            }
        }
        Some((entry.key, entry.value))
    }

    /// First occupied position at or after `(b, e)` in bucket order.
    pub(crate) fn seek(&self, mut b: usize, mut e: usize) -> Option<(usize, usize)> {
        while let Some(bucket) = self.buckets.get(b) {
            if e < bucket.entries.len() {
                return Some((b, e));
            }
            b += 1;
            e = 0;
        }
        None
    }

    pub(crate) fn entry_at(&self, b: usize, e: usize) -> Option<(&K, &V)> {
        self.buckets
            .get(b)?
            .entries
            .get(e)
            .map(|entry| (&entry.key, &entry.value))
    }

    /// True if any stored value satisfies `pred`. Linear in the entry count.
    pub(crate) fn contains_value<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&V) -> bool,
    {
        let _g = self.reentrancy.enter();
        self.buckets
            .iter()
            .flat_map(|b| b.entries.iter())
            .any(|e| pred(&e.value))
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.buckets.clear();
        self.len = 0;
    }

    #[cfg(test)]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: [].iter(),
            remaining: self.len,
        }
    }
}

pub(crate) struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Bucket<K, V>>,
    current: core::slice::Iter<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.next() {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            self.current = self.buckets.next()?.entries.iter();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            buckets: self.buckets.clone(),
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}
