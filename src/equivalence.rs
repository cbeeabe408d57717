//! Pluggable equality and hash codes.
//!
//! A map owns one strategy value and consults it for every key comparison
//! in the bucket store and every value comparison (`contains_value`,
//! entry-set membership). Hash codes are only requested for keys that
//! classify as `Object`; string and null keys are handled by the stores.

use core::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;
use std::rc::Rc;
use std::sync::Arc;

/// Equality predicate. Must be reflexive, symmetric and transitive.
pub trait Equivalence<T: ?Sized> {
    fn equals(&self, a: &T, b: &T) -> bool;
}

/// Hash code consistent with `equals`: equal keys yield equal codes.
pub trait HashCode<T: ?Sized>: Equivalence<T> {
    fn hash_code(&self, key: &T) -> i32;
}

/// `PartialEq` equality with a deterministic 32-bit hash.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Structural;

impl<T: PartialEq + ?Sized> Equivalence<T> for Structural {
    #[inline]
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

impl<T: Hash + Eq + ?Sized> HashCode<T> for Structural {
    #[inline]
    fn hash_code(&self, key: &T) -> i32 {
        // DefaultHasher::new() uses fixed keys, so codes are stable per process.
        let mut h = DefaultHasher::new();
        key.hash(&mut h);
        fold(h.finish())
    }
}

/// Reference identity: two keys are equal only if they are the same
/// allocation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Identity;

impl<T: ?Sized> Equivalence<Rc<T>> for Identity {
    #[inline]
    fn equals(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
        Rc::ptr_eq(a, b)
    }
}

impl<T: ?Sized> HashCode<Rc<T>> for Identity {
    #[inline]
    fn hash_code(&self, key: &Rc<T>) -> i32 {
        address_code(Rc::as_ptr(key) as *const ())
    }
}

impl<T: ?Sized> Equivalence<Arc<T>> for Identity {
    #[inline]
    fn equals(&self, a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl<T: ?Sized> HashCode<Arc<T>> for Identity {
    #[inline]
    fn hash_code(&self, key: &Arc<T>) -> i32 {
        address_code(Arc::as_ptr(key) as *const ())
    }
}

impl<T: ?Sized> Equivalence<&T> for Identity {
    #[inline]
    fn equals(&self, a: &&T, b: &&T) -> bool {
        core::ptr::eq(*a as *const T as *const (), *b as *const T as *const ())
    }
}

impl<T: ?Sized> HashCode<&T> for Identity {
    #[inline]
    fn hash_code(&self, key: &&T) -> i32 {
        address_code(*key as *const T as *const ())
    }
}

impl<T> Equivalence<Option<T>> for Identity
where
    Identity: Equivalence<T>,
{
    fn equals(&self, a: &Option<T>, b: &Option<T>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.equals(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T> HashCode<Option<T>> for Identity
where
    Identity: HashCode<T>,
{
    fn hash_code(&self, key: &Option<T>) -> i32 {
        key.as_ref().map_or(0, |k| self.hash_code(k))
    }
}

#[inline]
fn fold(h: u64) -> i32 {
    (h ^ (h >> 32)) as i32
}

#[inline]
fn address_code(p: *const ()) -> i32 {
    fold(p as usize as u64)
}
