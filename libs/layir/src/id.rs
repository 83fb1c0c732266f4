use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A numeric identifier tagged with the kind of object it refers to.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Id<T> {
    id: u64,
    #[serde(skip)]
    marker: std::marker::PhantomData<T>,
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq(&other.id)
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id({})", self.id)
    }
}

impl<T> Id<T> {
    pub(crate) fn new() -> Self {
        Self {
            id: 0,
            marker: std::marker::PhantomData,
        }
    }

    pub(crate) fn alloc(&mut self) -> Self {
        self.id += 1;
        *self
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
