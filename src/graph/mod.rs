//! The graph walker.
//!
//! This module turns a composite value into a bounded, acyclic [`GraphNode`]
//! tree. Nodes live in an arena while the walk is in progress; the walk adds
//! one layer per pass and consumes from a per-call [`Quota`].

/// Defines the `Arena` and `Slot` structures used during a walk.
pub(crate) mod arena;
/// Defines the `NodeId` type.
pub mod id;
/// Defines the public `GraphNode` tree.
pub mod node;
/// Defines `Budget`, `Quota` and the nesting ceiling.
pub mod quota;
/// Defines the identity-keyed `SeenSet`.
pub mod seen;
/// Defines the layer-by-layer `Walker`.
pub mod walker;

pub use id::NodeId;
pub use node::{GraphNode, SeqKind};
pub use quota::{Budget, MAX_NESTING, Quota};
pub use seen::SeenSet;
pub use walker::Walker;
