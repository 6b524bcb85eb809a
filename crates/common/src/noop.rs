//! Wrappers that take one field out of a type's equality or hashing.
//!
//! Handy for embedding a handle (a store, a client, a callback) inside a
//! struct that derives `PartialEq`/`Hash` over its data fields.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};

/// Any two `EquatableNoop`s compare equal, whatever they hold, and hashing
/// one writes nothing.
#[derive(Clone, Copy, Default)]
pub struct EquatableNoop<V>(V);

impl<V> EquatableNoop<V> {
    pub fn new(value: V) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> V {
        self.0
    }
}

impl<V> From<V> for EquatableNoop<V> {
    fn from(value: V) -> Self {
        Self(value)
    }
}

impl<V> Deref for EquatableNoop<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.0
    }
}

impl<V> DerefMut for EquatableNoop<V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut self.0
    }
}

impl<V> PartialEq for EquatableNoop<V> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<V> Eq for EquatableNoop<V> {}

impl<V> Hash for EquatableNoop<V> {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl<V: fmt::Debug> fmt::Debug for EquatableNoop<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EquatableNoop").field(&self.0).finish()
    }
}

/// Equality delegates to the wrapped value, but hashing writes nothing, so a
/// containing type can derive `Hash` without requiring `V: Hash`.
#[derive(Clone, Copy, Default, Debug)]
pub struct HashableNoop<V>(V);

impl<V> HashableNoop<V> {
    pub fn new(value: V) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> V {
        self.0
    }
}

impl<V> From<V> for HashableNoop<V> {
    fn from(value: V) -> Self {
        Self(value)
    }
}

impl<V> Deref for HashableNoop<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.0
    }
}

impl<V> DerefMut for HashableNoop<V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut self.0
    }
}

impl<V: PartialEq> PartialEq for HashableNoop<V> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<V: Eq> Eq for HashableNoop<V> {}

impl<V> Hash for HashableNoop<V> {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}
