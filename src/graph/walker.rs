//! Layer-by-layer flattening of a composite value into a [`GraphNode`] tree.

use std::ops::ControlFlow;

use tracing::{debug, trace};

use super::arena::{Arena, Overflow, Slot};
use super::id::NodeId;
use super::node::{GraphNode, SeqKind};
use super::quota::{Budget, Quota};
use super::seen::SeenSet;
use crate::cache::{FormatterCache, short_type_name};
use crate::error::{InspectError, Result};
use crate::inspect::{Capability, Inspect, LayoutKind};
use crate::scalar::{Class, classify, clip, render_scalar};

/// Restore point for an enumeration attempt.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    slots: usize,
    visits: Budget,
    seen: usize,
}

/// Converts one value into a bounded, acyclic tree.
///
/// A walker lives for a single call. The first pass expands the root and
/// admits its composite children as pending slots; every further pass walks
/// again from the root, enumerating the built nodes to reach the pending
/// frontier, and expands that frontier by one layer. The walk stops when the
/// layer budget runs out or nothing is pending.
///
/// Visits are charged once per collected element, entry or member. Passes
/// that re-enumerate already built nodes are free.
#[derive(Debug)]
pub struct Walker<'c> {
    cache: &'c FormatterCache,
    quota: Quota,
    use_quotes: bool,
    seen: SeenSet,
    arena: Arena,
}

impl<'c> Walker<'c> {
    /// Creates a walker drawing from `quota`.
    pub fn new(cache: &'c FormatterCache, quota: Quota, use_quotes: bool) -> Self {
        Self {
            cache,
            quota,
            use_quotes,
            seen: SeenSet::new(),
            arena: Arena::new(),
        }
    }

    /// Flattens `value`. Atomic values become a single scalar leaf.
    pub fn flatten(mut self, value: &dyn Inspect) -> GraphNode {
        let class = classify(value, self.cache);
        if let Some(text) = self.leaf_text(class) {
            return GraphNode::Scalar(text);
        }

        if let Some(identity) = value.identity() {
            self.seen.insert(identity);
        }
        let root = self.arena.add(Slot::Pending);

        let mut passes = 0usize;
        while self.arena.is_open(root) && self.quota.take_layer() {
            passes += 1;
            self.descend(root, value);
        }
        trace!(
            passes,
            slots = self.arena.len(),
            visits_left = ?self.quota.visits().limit(),
            "flatten finished"
        );
        self.arena.to_tree(root)
    }

    /// The quota left after the walk so far.
    pub fn quota(&self) -> &Quota {
        &self.quota
    }

    /// Expands the pending frontier below `id` by one layer.
    fn descend(&mut self, id: NodeId, value: &dyn Inspect) {
        match self.arena.get(id) {
            Some(Slot::Pending) => self.expand(id, value),
            Some(Slot::Sequence { .. } | Slot::Mapping { .. } | Slot::Object { .. })
                if self.arena.is_open(id) =>
            {
                self.revisit(id, value)
            }
            _ => {}
        }
    }

    /// Replaces a pending slot with the first capability that enumerates.
    fn expand(&mut self, id: NodeId, value: &dyn Inspect) {
        for capability in Capability::PRIORITY {
            let checkpoint = self.checkpoint();
            match self.try_expand(capability, value) {
                None => {}
                Some(Ok(slot)) => {
                    self.arena.replace(id, slot);
                    let open = self.children(id).into_iter().any(|c| self.arena.is_open(c));
                    self.arena.set_open(id, open);
                    return;
                }
                Some(Err(err)) => {
                    debug!(
                        handler = ?capability,
                        type_name = value.type_name(),
                        error = %err,
                        "enumeration failed, falling back"
                    );
                    self.rollback(checkpoint);
                }
            }
        }
        let name = short_type_name(value.type_name());
        self.arena.replace(id, Slot::Scalar(name));
    }

    fn try_expand(&mut self, capability: Capability, value: &dyn Inspect) -> Option<Result<Slot>> {
        match capability {
            Capability::Entries => self.expand_entries(value),
            Capability::Elements => self.expand_sequence(value, capability, SeqKind::List),
            Capability::Positional => self.expand_sequence(value, capability, SeqKind::Tuple),
            Capability::Members => self.expand_members(value).map(Ok),
        }
    }

    fn expand_entries(&mut self, value: &dyn Inspect) -> Option<Result<Slot>> {
        let total = value.len_hint();
        let mut children = Vec::new();
        let mut overflow = None;
        let outcome = value.entries(&mut |key: &dyn Inspect, item: &dyn Inspect| {
            if !self.quota.take_visit() {
                trace!(collected = children.len(), "visit budget exhausted");
                overflow = Some(Overflow::new(total, children.len()));
                return ControlFlow::Break(());
            }
            let k = self.admit(key);
            let v = self.admit(item);
            children.push((k, v));
            ControlFlow::Continue(())
        })?;
        Some(outcome.map(|()| Slot::Mapping {
            children,
            overflow,
            open: true,
        }))
    }

    fn expand_sequence(
        &mut self,
        value: &dyn Inspect,
        capability: Capability,
        kind: SeqKind,
    ) -> Option<Result<Slot>> {
        let total = value.len_hint();
        let mut children = Vec::new();
        let mut overflow = None;
        let outcome = capability.enumerate(value, &mut |child: &dyn Inspect| {
            if !self.quota.take_visit() {
                trace!(collected = children.len(), "visit budget exhausted");
                overflow = Some(Overflow::new(total, children.len()));
                return ControlFlow::Break(());
            }
            children.push(self.admit(child));
            ControlFlow::Continue(())
        })?;
        Some(outcome.map(|()| Slot::Sequence {
            kind,
            capability,
            children,
            overflow,
            open: true,
        }))
    }

    /// Reflective decomposition over the compiled member order.
    fn expand_members(&mut self, value: &dyn Inspect) -> Option<Slot> {
        let layout = value.layout()?;
        let compiled = self.cache.compiled(layout);
        if compiled.is_empty() {
            return Some(Slot::Scalar(compiled.name().to_string()));
        }

        let is_error = value.is_error();
        let mut members = Vec::with_capacity(compiled.len());
        let mut overflow = None;
        for slot in compiled.slots() {
            if !self.quota.take_visit() {
                trace!(collected = members.len(), "visit budget exhausted");
                overflow = Some(Overflow::new(Some(compiled.len()), members.len()));
                break;
            }
            let mut child = None;
            value.member(slot.index, &mut |outcome: Result<&dyn Inspect>| {
                child = Some(self.admit_member(outcome, is_error));
            });
            let child = match child {
                Some(child) => child,
                None => self.arena.add(Slot::Scalar(
                    InspectError::invalid_operation("member index out of range").marker(),
                )),
            };
            members.push((slot.name, child));
        }

        Some(match compiled.kind() {
            LayoutKind::Tuple => Slot::Sequence {
                kind: SeqKind::Named(compiled.name()),
                capability: Capability::Members,
                children: members.into_iter().map(|(_, id)| id).collect(),
                overflow,
                open: true,
            },
            LayoutKind::Struct | LayoutKind::Unit => Slot::Object {
                name: compiled.name(),
                members,
                overflow,
                open: true,
            },
        })
    }

    fn admit_member(&mut self, outcome: Result<&dyn Inspect>, is_error: bool) -> NodeId {
        match outcome {
            Ok(member) => self.admit(member),
            Err(err) if is_error => {
                let text = clip(&err.to_string(), self.quota.string_length());
                self.arena.add(Slot::Scalar(text))
            }
            Err(err) => self.admit(&err),
        }
    }

    /// Re-enumerates a built node and descends into its open children.
    ///
    /// Children the value no longer yields are closed so the walk always
    /// makes progress.
    fn revisit(&mut self, id: NodeId, value: &dyn Inspect) {
        let (capability, children) = match self.arena.get(id) {
            Some(Slot::Sequence {
                capability,
                children,
                ..
            }) => (*capability, children.clone()),
            Some(Slot::Mapping { .. }) => (Capability::Entries, self.children(id)),
            Some(Slot::Object { .. }) => (Capability::Members, self.children(id)),
            _ => return,
        };

        let mut reached = 0usize;
        let outcome = match capability {
            Capability::Entries => {
                value.entries(&mut |key: &dyn Inspect, item: &dyn Inspect| {
                    let (Some(k), Some(v)) = (children.get(reached), children.get(reached + 1))
                    else {
                        return ControlFlow::Break(());
                    };
                    let (k, v) = (*k, *v);
                    reached += 2;
                    self.descend(k, key);
                    self.descend(v, item);
                    ControlFlow::Continue(())
                })
            }
            Capability::Elements | Capability::Positional => {
                capability.enumerate(value, &mut |child: &dyn Inspect| {
                    let Some(c) = children.get(reached).copied() else {
                        return ControlFlow::Break(());
                    };
                    reached += 1;
                    self.descend(c, child);
                    ControlFlow::Continue(())
                })
            }
            Capability::Members => {
                let Some(layout) = value.layout() else {
                    self.arena.close(id);
                    return;
                };
                let compiled = self.cache.compiled(layout);
                for (slot, c) in compiled.slots().iter().zip(children.iter().copied()) {
                    if self.arena.is_open(c) {
                        value.member(slot.index, &mut |outcome: Result<&dyn Inspect>| match outcome {
                            Ok(member) => self.descend(c, member),
                            Err(err) => self.descend(c, &err),
                        });
                    }
                    reached += 1;
                }
                None
            }
        };
        if let Some(Err(err)) = outcome {
            debug!(
                handler = ?capability,
                type_name = value.type_name(),
                error = %err,
                "re-walk enumeration failed, closing unreached children"
            );
        }

        for c in children.iter().skip(reached) {
            self.arena.close(*c);
        }
        let open = children.iter().any(|c| self.arena.is_open(*c));
        self.arena.set_open(id, open);
    }

    /// Admits one child: atomic values become leaves, composites are checked
    /// against the seen set and left pending for the next pass.
    ///
    /// The seen set is consulted before classification so that a guarded
    /// value already held further up the walk is never probed again.
    fn admit(&mut self, value: &dyn Inspect) -> NodeId {
        let identity = value.identity();
        if identity.is_some_and(|id| self.seen.contains(&id)) {
            return self.arena.add(Slot::Truncated);
        }
        let class = classify(value, self.cache);
        let slot = match self.leaf_text(class) {
            Some(text) => Slot::Scalar(text),
            None => {
                if let Some(identity) = identity {
                    self.seen.insert(identity);
                }
                Slot::Pending
            }
        };
        self.arena.add(slot)
    }

    /// Text of a non-composite value; `None` for composites.
    fn leaf_text(&self, class: Class<'_>) -> Option<String> {
        let limit = self.quota.string_length();
        match class {
            Class::Atomic(scalar) => Some(render_scalar(&scalar, self.use_quotes, limit)),
            Class::Custom(text) => Some(clip(&text, limit)),
            Class::Unsupported(err) => Some(err.marker()),
            Class::Composite => None,
        }
    }

    /// Child ids of a composite slot, keys and values interleaved for mappings.
    fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.arena.get(id) {
            Some(Slot::Sequence { children, .. }) => children.clone(),
            Some(Slot::Mapping { children, .. }) => {
                children.iter().flat_map(|(k, v)| [*k, *v]).collect()
            }
            Some(Slot::Object { members, .. }) => members.iter().map(|(_, v)| *v).collect(),
            _ => Vec::new(),
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            slots: self.arena.len(),
            visits: self.quota.visits(),
            seen: self.seen.mark(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.arena.truncate(checkpoint.slots);
        self.quota.restore_visits(checkpoint.visits);
        self.seen.rollback(checkpoint.seen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::VisitElement;

    fn walk(value: &dyn Inspect, visits: i64, layers: i64) -> GraphNode {
        let quota = Quota::new(
            Budget::from_signed(visits),
            Budget::Unbounded,
            Budget::from_signed(layers),
        );
        Walker::new(&FormatterCache::new(), quota, false).flatten(value)
    }

    fn scalar(s: &str) -> GraphNode {
        GraphNode::Scalar(s.to_string())
    }

    #[test]
    fn atomic_root_is_a_leaf() {
        assert_eq!(walk(&42, 80, 20), scalar("42"));
    }

    #[test]
    fn overflow_counts_remaining_items() {
        let items: Vec<u8> = (0..5).collect();
        let GraphNode::Sequence { items, .. } = walk(&items, 3, 20) else {
            panic!("expected a sequence");
        };
        assert_eq!(
            items,
            vec![scalar("0"), scalar("1"), scalar("2"), GraphNode::Truncated(Some(2))]
        );
    }

    #[test]
    fn layer_budget_cuts_depth() {
        let nested = vec![vec![vec![1u8]]];
        let node = walk(&nested, 80, 2);
        assert_eq!(
            node,
            GraphNode::Sequence {
                kind: SeqKind::List,
                items: vec![GraphNode::Sequence {
                    kind: SeqKind::List,
                    items: vec![GraphNode::Truncated(None)],
                }],
            }
        );
    }

    #[test]
    fn rewalk_does_not_charge_twice() {
        let nested = vec![vec![1u8, 2], vec![3, 4]];
        let walker_quota = Quota::new(Budget::Limited(6), Budget::Unbounded, Budget::Unbounded);
        let cache = FormatterCache::new();
        let node = Walker::new(&cache, walker_quota, false).flatten(&nested);
        assert_eq!(node.size(), 7);
        assert!(!format!("{node:?}").contains("Truncated"));
    }

    struct Flaky;

    impl Inspect for Flaky {
        fn elements(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
            let _ = visit(&1u8);
            Some(Err(InspectError::failed("enumerator broke")))
        }

        fn positional(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
            let _ = visit(&"a");
            let _ = visit(&"b");
            Some(Ok(()))
        }
    }

    #[test]
    fn failed_enumeration_falls_back_and_refunds() {
        let walker_quota = Quota::new(Budget::Limited(2), Budget::Unbounded, Budget::Unbounded);
        let cache = FormatterCache::new();
        let node = Walker::new(&cache, walker_quota, false).flatten(&Flaky);
        assert_eq!(
            node,
            GraphNode::Sequence {
                kind: SeqKind::Tuple,
                items: vec![scalar("a"), scalar("b")],
            }
        );
    }

    struct Opaque;

    impl Inspect for Opaque {}

    #[test]
    fn no_capability_renders_short_type_name() {
        assert_eq!(walk(&vec![Opaque], 80, 20), GraphNode::Sequence {
            kind: SeqKind::List,
            items: vec![scalar("Opaque")],
        });
    }
}
