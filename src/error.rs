//! Error type shared by map construction and the entry cursor.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// `next()` was called on a cursor with no remaining entries.
    #[error("no more entries in iteration")]
    ExhaustedIteration,

    /// `remove()` was called before any `next()`, or twice without an
    /// intervening `next()`.
    #[error("remove() requires a preceding next()")]
    InvalidIteratorState,

    /// Capacity was negative or the load factor was not strictly positive.
    #[error("initial capacity was negative or load factor was non-positive (capacity {capacity}, load factor {load_factor})")]
    InvalidConstructionArgument { capacity: i64, load_factor: f32 },
}

pub type Result<T> = core::result::Result<T, Error>;
