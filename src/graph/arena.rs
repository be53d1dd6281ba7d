use super::id::NodeId;
use super::node::{GraphNode, SeqKind};
use crate::inspect::Capability;

/// Number of items left out when the visit budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Overflow {
    /// `None` when the value could not report its length.
    pub remaining: Option<usize>,
}

impl Overflow {
    pub(crate) fn new(total: Option<usize>, collected: usize) -> Self {
        Self {
            remaining: total.map(|t| t.saturating_sub(collected)),
        }
    }
}

/// One node of the tree under construction.
///
/// Composite slots remember the capability that built them so a later pass
/// can enumerate the value again and reach the pending frontier.
#[derive(Debug)]
pub(crate) enum Slot {
    Scalar(String),
    Truncated,
    /// Composite child admitted but not yet expanded.
    Pending,
    Sequence {
        kind: SeqKind,
        capability: Capability,
        children: Vec<NodeId>,
        overflow: Option<Overflow>,
        open: bool,
    },
    Mapping {
        children: Vec<(NodeId, NodeId)>,
        overflow: Option<Overflow>,
        open: bool,
    },
    Object {
        name: &'static str,
        members: Vec<(&'static str, NodeId)>,
        overflow: Option<Overflow>,
        open: bool,
    },
}

/// Arena holding the slots of one walk. Ids are positions in the arena.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Adds a slot and returns its id.
    pub(crate) fn add(&mut self, slot: Slot) -> NodeId {
        let id = NodeId::at(self.slots.len());
        self.slots.push(slot);
        id
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.index())
    }

    /// Replaces the slot at `id`. Unknown ids are ignored.
    pub(crate) fn replace(&mut self, id: NodeId, slot: Slot) {
        if let Some(entry) = self.slots.get_mut(id.index()) {
            *entry = slot;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Drops every slot added after the arena had `len` slots.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    /// True if the slot is pending or has pending slots below it.
    pub(crate) fn is_open(&self, id: NodeId) -> bool {
        match self.get(id) {
            Some(Slot::Pending) => true,
            Some(
                Slot::Sequence { open, .. } | Slot::Mapping { open, .. } | Slot::Object { open, .. },
            ) => *open,
            _ => false,
        }
    }

    /// Records whether a composite slot still has pending slots below it.
    pub(crate) fn set_open(&mut self, id: NodeId, still_open: bool) {
        if let Some(
            Slot::Sequence { open, .. } | Slot::Mapping { open, .. } | Slot::Object { open, .. },
        ) = self.slots.get_mut(id.index())
        {
            *open = still_open;
        }
    }

    /// Stops expansion below `id`: pending slots become truncated and
    /// composite slots are marked closed.
    pub(crate) fn close(&mut self, id: NodeId) {
        let children: Vec<NodeId> = match self.slots.get_mut(id.index()) {
            Some(slot @ Slot::Pending) => {
                *slot = Slot::Truncated;
                return;
            }
            Some(Slot::Sequence { children, open, .. }) if *open => {
                *open = false;
                children.clone()
            }
            Some(Slot::Mapping { children, open, .. }) if *open => {
                *open = false;
                children.iter().flat_map(|(k, v)| [*k, *v]).collect()
            }
            Some(Slot::Object { members, open, .. }) if *open => {
                *open = false;
                members.iter().map(|(_, v)| *v).collect()
            }
            _ => return,
        };
        for child in children {
            self.close(child);
        }
    }

    /// Converts the slots reachable from `id` into a `GraphNode` tree.
    ///
    /// Slots still pending at this point were cut by the layer budget and
    /// become `Truncated`.
    pub(crate) fn to_tree(&self, id: NodeId) -> GraphNode {
        match self.get(id) {
            Some(Slot::Scalar(text)) => GraphNode::Scalar(text.clone()),
            Some(Slot::Truncated | Slot::Pending) | None => GraphNode::Truncated(None),
            Some(Slot::Sequence {
                kind,
                children,
                overflow,
                ..
            }) => {
                let mut items: Vec<GraphNode> = children.iter().map(|c| self.to_tree(*c)).collect();
                if let Some(o) = overflow {
                    items.push(GraphNode::Truncated(o.remaining));
                }
                GraphNode::Sequence {
                    kind: kind.clone(),
                    items,
                }
            }
            Some(Slot::Mapping {
                children, overflow, ..
            }) => GraphNode::Mapping {
                label: None,
                entries: children
                    .iter()
                    .map(|(k, v)| (self.to_tree(*k), self.to_tree(*v)))
                    .collect(),
                overflow: overflow.map(|o| Box::new(GraphNode::Truncated(o.remaining))),
            },
            Some(Slot::Object {
                name,
                members,
                overflow,
                ..
            }) => GraphNode::Mapping {
                label: Some(name),
                entries: members
                    .iter()
                    .map(|(member, v)| (GraphNode::Scalar((*member).to_string()), self.to_tree(*v)))
                    .collect(),
                overflow: overflow.map(|o| Box::new(GraphNode::Truncated(o.remaining))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_slots_become_truncated() {
        let mut arena = Arena::new();
        let a = arena.add(Slot::Scalar("1".into()));
        let b = arena.add(Slot::Pending);
        let root = arena.add(Slot::Sequence {
            kind: SeqKind::List,
            capability: Capability::Elements,
            children: vec![a, b],
            overflow: Some(Overflow::new(Some(5), 2)),
            open: true,
        });
        assert!(arena.is_open(root));
        arena.set_open(root, false);
        assert!(!arena.is_open(root));
        assert!(arena.is_open(b));

        assert_eq!(
            arena.to_tree(root),
            GraphNode::Sequence {
                kind: SeqKind::List,
                items: vec![
                    GraphNode::Scalar("1".into()),
                    GraphNode::Truncated(None),
                    GraphNode::Truncated(Some(3)),
                ],
            }
        );
    }

    #[test]
    fn close_truncates_pending_descendants() {
        let mut arena = Arena::new();
        let key = arena.add(Slot::Scalar("k".into()));
        let value = arena.add(Slot::Pending);
        let root = arena.add(Slot::Mapping {
            children: vec![(key, value)],
            overflow: None,
            open: true,
        });
        arena.close(root);
        assert!(!arena.is_open(root));
        assert!(!arena.is_open(value));
        assert!(matches!(arena.get(value), Some(Slot::Truncated)));
    }
}
