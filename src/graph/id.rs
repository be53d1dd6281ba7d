use std::fmt;

/// Position of a slot in the walker's arena.
///
/// Ids are handed out in insertion order, so a rollback to an earlier arena
/// length invalidates exactly the ids at or past that length.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Id for the slot about to be pushed at `position`.
    /// Saturates; a walk never admits anywhere near `u32::MAX` slots.
    pub(crate) fn at(position: usize) -> Self {
        Self(u32::try_from(position).unwrap_or(u32::MAX))
    }

    /// Returns the position in the arena.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}
