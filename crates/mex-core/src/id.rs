use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic identifier wrapper providing compile-time type safety over `uuid::Uuid`.
///
/// A bare `String` display name cannot distinguish a reconnecting human from an
/// AI seat that happens to share a name; every addressable entity (a match, a
/// seat, a connection) gets its own `ID<T>` so the two never collide.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ID<T> {
    inner: uuid::Uuid,
    #[serde(skip)]
    marker: PhantomData<fn() -> T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Casts `ID<T>` to `ID<U>` while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

/// Identifies the owner of a domain value (a match, a seat, ...).
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    struct Match;
    struct Seat;

    #[test]
    fn ids_are_unique() {
        let a: ID<Match> = ID::default();
        let b: ID<Match> = ID::default();
        assert_ne!(a, b);
    }
    #[test]
    fn cast_preserves_uuid() {
        let a: ID<Match> = ID::default();
        let b: ID<Seat> = a.cast();
        assert_eq!(a.inner(), b.inner());
    }
    #[test]
    fn roundtrips_through_json() {
        let a: ID<Match> = ID::default();
        let json = serde_json::to_string(&a).unwrap();
        let b: ID<Match> = serde_json::from_str(&json).unwrap();
        assert_eq!(a, b);
    }
}
