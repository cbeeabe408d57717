//! Debug-only reentrancy guard for the stores.
//!
//! Mutating store methods take `&mut self`, so safe code cannot reach a
//! store while its index and entry vector are out of step (between an index
//! erase and the swap that follows it no user code runs). What the guard
//! catches is a lookup whose equality, hash or classification callback reads
//! the same map again, for instance through an `Rc<RefCell<_>>`. That is
//! memory safe, but the callback's answer then depends on the very buckets
//! it is helping to probe, so key equality stops being a fixed predicate
//! over a bucket and distinct keys can collapse. Debug builds panic on such
//! nesting; release builds compile the guard away.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // Stores are single-threaded; keep them !Send + !Sync.
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _nosend: PhantomData,
        }
    }

    /// Mark the owning store as busy until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.get(),
                "store re-entered from an equality, hash or classification callback"
            );
            self.active.set(true);
            ReentrancyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            ReentrancyGuard { _z: PhantomData }
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DebugReentrancy {
    // A cloned store starts idle regardless of the source's state.
    fn clone(&self) -> Self {
        Self::new()
    }
}

pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(false);
    }
}
