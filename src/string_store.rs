//! StringKeyStore: entries keyed by the text of string-classified keys.
//!
//! Storage is a dense entry vector with a `HashTable<usize>` index over
//! the key text. Lookups never call the owner's equality strategy: two
//! string keys are the same key iff their text is equal. Removal swaps the
//! last entry into the vacated position, which the entry cursor relies on
//! to resume without skipping.

use crate::key::Classify;
use crate::reentrancy::DebugReentrancy;
use core::hash::BuildHasher;
use core::mem;
use hashbrown::HashTable;
use std::collections::hash_map::RandomState;

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

#[derive(Clone)]
pub(crate) struct StringKeyStore<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<usize>,
    entries: Vec<Entry<K, V>>,
    reentrancy: DebugReentrancy,
}

#[inline]
fn key_text<K: Classify>(key: &K) -> &str {
    key.classify().as_str().unwrap_or_default()
}

// The index slot for `i` must already be erased.
fn swap_remove_finish<K, V>(
    entries: &mut Vec<Entry<K, V>>,
    index: &mut HashTable<usize>,
    i: usize,
) -> (K, V) {
    let entry = entries.swap_remove(i);
    if let Some(moved) = entries.get(i) {
        let last = entries.len();
        if let Some(slot) = index.find_mut(moved.hash, |&j| j == last) {
            *slot = i;
        }
    }
    (entry.key, entry.value)
}

impl<K, V, S> StringKeyStore<K, V, S>
where
    K: Classify,
    S: BuildHasher,
{
    pub(crate) fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            entries: Vec::new(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    fn position(&self, text: &str) -> Option<usize> {
        let hash = self.hasher.hash_one(text);
        let entries = &self.entries;
        self.index
            .find(hash, |&i| key_text(&entries[i].key) == text)
            .copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn get(&self, text: &str) -> Option<&V> {
        let _g = self.reentrancy.enter();
        self.position(text).map(|i| &self.entries[i].value)
    }

    pub(crate) fn get_mut(&mut self, text: &str) -> Option<&mut V> {
        let _g = self.reentrancy.enter();
        let i = self.position(text)?;
        Some(&mut self.entries[i].value)
    }

    pub(crate) fn contains(&self, text: &str) -> bool {
        let _g = self.reentrancy.enter();
        self.position(text).is_some()
    }

    /// Insert or overwrite. On overwrite the stored key is kept and the
    /// previous value returned. `key` must classify as a string.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        debug_assert!(
            key.classify().as_str().is_some(),
            "non-string key in string store"
        );
        let text = key_text(&key);
        let hash = self.hasher.hash_one(text);
        let entries = &self.entries;
        let found = self
            .index
            .find(hash, |&i| key_text(&entries[i].key) == text)
            .copied();
        match found {
            Some(i) => Some(mem::replace(&mut self.entries[i].value, value)),
            None => {
                let i = self.entries.len();
                self.entries.push(Entry { key, value, hash });
                let entries = &self.entries;
                self.index.insert_unique(hash, i, |&j| entries[j].hash);
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, text: &str) -> Option<(K, V)> {
        let _g = self.reentrancy.enter();
        let hash = self.hasher.hash_one(text);
        let entries = &self.entries;
        let i = match self
            .index
            .find_entry(hash, |&i| key_text(&entries[i].key) == text)
        {
            Ok(occupied) => occupied.remove().0,
            Err(_) => return None,
        };
        Some(swap_remove_finish(&mut self.entries, &mut self.index, i))
    }

    /// Remove the entry at `pos`, moving the last entry into its place.
    pub(crate) fn remove_at(&mut self, pos: usize) -> Option<(K, V)> {
        let _g = self.reentrancy.enter();
        let hash = self.entries.get(pos)?.hash;
        if let Ok(occupied) = self.index.find_entry(hash, |&i| i == pos) {
            occupied.remove();
        }
        Some(swap_remove_finish(&mut self.entries, &mut self.index, pos))
    }

    pub(crate) fn entry_at(&self, pos: usize) -> Option<(&K, &V)> {
        self.entries.get(pos).map(|e| (&e.key, &e.value))
    }

    /// True if any stored value satisfies `pred`.
    pub(crate) fn contains_value<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&V) -> bool,
    {
        let _g = self.reentrancy.enter();
        self.entries.iter().any(|e| pred(&e.value))
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.entries.iter(),
        }
    }
}

pub(crate) struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (&e.key, &e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            it: self.it.clone(),
        }
    }
}
