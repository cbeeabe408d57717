//! Key classification: decides which store a key lives in.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// How a key is routed by `HybridMap`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyKind<'a> {
    /// The null key; stored in the bucket store's reserved slot.
    Null,
    /// A string key; stored in the string store by its text.
    Str(&'a str),
    /// Any other key; stored in the bucket store under its hash code.
    Object,
}

impl<'a> KeyKind<'a> {
    #[inline]
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            KeyKind::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Types usable as `HybridMap` keys.
///
/// The default classification is `Object`, so non-string key types only
/// need an empty impl:
///
/// ```
/// use hybrid_hashmap::Classify;
///
/// #[derive(PartialEq, Eq, Hash)]
/// struct Point(i32, i32);
/// impl Classify for Point {}
/// ```
pub trait Classify {
    fn classify(&self) -> KeyKind<'_> {
        KeyKind::Object
    }
}

impl Classify for str {
    #[inline]
    fn classify(&self) -> KeyKind<'_> {
        KeyKind::Str(self)
    }
}

impl Classify for String {
    #[inline]
    fn classify(&self) -> KeyKind<'_> {
        KeyKind::Str(self.as_str())
    }
}

impl Classify for Cow<'_, str> {
    #[inline]
    fn classify(&self) -> KeyKind<'_> {
        KeyKind::Str(self.as_ref())
    }
}

/// Only the outer `None` is null. A present value whose inner key is null
/// (`Some(None)`, `Some(Key::Null)`) is an ordinary object key, so it stays
/// distinct from `None` under the map's equality.
impl<T: Classify> Classify for Option<T> {
    #[inline]
    fn classify(&self) -> KeyKind<'_> {
        match self {
            Some(k) => match k.classify() {
                KeyKind::Null => KeyKind::Object,
                kind => kind,
            },
            None => KeyKind::Null,
        }
    }
}

impl<T: Classify + ?Sized> Classify for &T {
    #[inline]
    fn classify(&self) -> KeyKind<'_> {
        (**self).classify()
    }
}

impl<T: Classify + ?Sized> Classify for Box<T> {
    #[inline]
    fn classify(&self) -> KeyKind<'_> {
        (**self).classify()
    }
}

impl<T: Classify + ?Sized> Classify for Rc<T> {
    #[inline]
    fn classify(&self) -> KeyKind<'_> {
        (**self).classify()
    }
}

impl<T: Classify + ?Sized> Classify for Arc<T> {
    #[inline]
    fn classify(&self) -> KeyKind<'_> {
        (**self).classify()
    }
}

macro_rules! object_keys {
    ($($t:ty),* $(,)?) => {
        $(impl Classify for $t {})*
    };
}

object_keys!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, ()
);

/// A dynamically typed key, for maps mixing strings, numbers and null.
///
/// `Key::Int(1)` and `Key::from("1")` are different keys: the first lives
/// in the bucket store, the second in the string store.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Key {
    Null,
    Str(String),
    Int(i64),
    Bool(bool),
    Char(char),
}

impl Classify for Key {
    #[inline]
    fn classify(&self) -> KeyKind<'_> {
        match self {
            Key::Null => KeyKind::Null,
            Key::Str(s) => KeyKind::Str(s),
            Key::Int(_) | Key::Bool(_) | Key::Char(_) => KeyKind::Object,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => f.write_str("null"),
            Key::Str(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{}", i),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Char(c) => write!(f, "{}", c),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Char(c)
    }
}

impl<T: Into<Key>> From<Option<T>> for Key {
    fn from(o: Option<T>) -> Self {
        o.map_or(Key::Null, Into::into)
    }
}
