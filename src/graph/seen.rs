use std::collections::HashSet;

use crate::inspect::Identity;

/// Identity-keyed set of composite values already admitted during one walk.
///
/// Membership means "descending again would recurse", not value equality, so
/// scalars are never inserted. Insertions are journaled so that an abandoned
/// enumeration attempt can be rolled back.
#[derive(Debug, Default)]
pub struct SeenSet {
    members: HashSet<Identity>,
    journal: Vec<Identity>,
}

impl SeenSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `identity`. Returns false if it was already present.
    pub fn insert(&mut self, identity: Identity) -> bool {
        let fresh = self.members.insert(identity);
        if fresh {
            self.journal.push(identity);
        }
        fresh
    }

    /// True if `identity` was admitted before.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.members.contains(identity)
    }

    /// Number of admitted identities.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if nothing was admitted.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A marker for [`rollback`](Self::rollback).
    pub(crate) fn mark(&self) -> usize {
        self.journal.len()
    }

    /// Forgets every insertion made after `mark`.
    pub(crate) fn rollback(&mut self, mark: usize) {
        for identity in self.journal.drain(mark..) {
            self.members.remove(&identity);
        }
    }
}
