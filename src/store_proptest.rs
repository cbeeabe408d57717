#![cfg(test)]

// Property tests for the two stores, kept inside the crate so they can
// reach the crate-private store types.

use crate::bucket_store::{BucketSlot, HashBucketStore};
use crate::string_store::StringKeyStore;
use proptest::prelude::*;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};

#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    RemoveAt(usize),
    Get(usize),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=8).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            idx.clone().prop_map(Op::Remove),
            (0usize..16).prop_map(Op::RemoveAt),
            idx.clone().prop_map(Op::Get),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

fn run_string_store<S: BuildHasher>(
    mut sut: StringKeyStore<String, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = pool[i].clone();
                prop_assert_eq!(sut.put(k.clone(), v), model.insert(k, v));
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let got = sut.remove(k);
                let want = model.remove(k).map(|v| (k.clone(), v));
                prop_assert_eq!(got, want);
            }
            Op::RemoveAt(p) => {
                let expected = sut.entry_at(p).map(|(k, v)| (k.clone(), *v));
                let got = sut.remove_at(p);
                prop_assert_eq!(&got, &expected);
                if let Some((k, _)) = got {
                    model.remove(&k);
                }
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.contains(k), model.contains_key(k));
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k) {
                    *v = v.wrapping_add(d);
                }
                if let Some(v) = model.get_mut(k) {
                    *v = v.wrapping_add(d);
                }
            }
            Op::Iterate => {
                let s: BTreeSet<_> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeSet<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
            }
        }
        prop_assert_eq!(sut.len(), model.len());
    }
    Ok(())
}

// Keys are pool indices; codes collide in pairs (i / 2) to build chains.
fn run_bucket_store<S: BuildHasher>(
    mut sut: HashBucketStore<usize, i32, S>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let slot = |k: usize| BucketSlot::Code((k / 2) as i32);
    let mut model: HashMap<usize, i32> = HashMap::new();
    let mut flat = 0usize;
    for op in ops {
        match op {
            Op::Put(k, v) => {
                prop_assert_eq!(sut.put(slot(k), k, v, |a, b| a == b), model.insert(k, v));
            }
            Op::Remove(k) => {
                let got = sut.remove(slot(k), |x| *x == k);
                prop_assert_eq!(got, model.remove(&k).map(|v| (k, v)));
            }
            Op::RemoveAt(p) => {
                // Interpret p as a flat index and resolve it via seek.
                flat = flat.wrapping_add(p);
                if let Some((b, e)) = sut.seek(0, 0) {
                    let (b, e) = sut.seek(b + flat % 3, e).unwrap_or((b, e));
                    let expected = sut.entry_at(b, e).map(|(k, v)| (*k, *v));
                    let got = sut.remove_at(b, e);
                    prop_assert_eq!(&got, &expected);
                    if let Some((k, _)) = got {
                        model.remove(&k);
                    }
                }
            }
            Op::Get(k) => {
                prop_assert_eq!(sut.get(slot(k), |x| *x == k), model.get(&k));
                prop_assert_eq!(sut.contains(slot(k), |x| *x == k), model.contains_key(&k));
            }
            Op::Mutate(k, d) => {
                if let Some(v) = sut.get_mut(slot(k), |x| *x == k) {
                    *v = v.wrapping_add(d);
                }
                if let Some(v) = model.get_mut(&k) {
                    *v = v.wrapping_add(d);
                }
            }
            Op::Iterate => {
                let s: BTreeSet<_> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                let m: BTreeSet<_> = model.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(s, m);
            }
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

// Property: each store behaves like std::collections::HashMap over random
// operation sequences, including positional removal used by the cursor.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_string_store_matches_model((pool, ops) in arb_scenario()) {
        run_string_store(StringKeyStore::with_hasher(RandomState::new()), &pool, ops)?;
    }

    #[test]
    fn prop_string_store_matches_model_with_collisions((pool, ops) in arb_scenario()) {
        run_string_store(StringKeyStore::with_hasher(ConstBuildHasher), &pool, ops)?;
    }

    #[test]
    fn prop_bucket_store_matches_model((_pool, ops) in arb_scenario()) {
        run_bucket_store(HashBucketStore::with_hasher(RandomState::new()), ops)?;
    }

    #[test]
    fn prop_bucket_store_matches_model_with_collisions((_pool, ops) in arb_scenario()) {
        run_bucket_store(HashBucketStore::with_hasher(ConstBuildHasher), ops)?;
    }
}
