/// Bracket style of a [`GraphNode::Sequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeqKind {
    /// Ordered collection, `[a, b]`.
    List,
    /// Anonymous tuple, `(a, b)`.
    Tuple,
    /// Tuple struct or tuple variant, `Name(a, b)`.
    Named(&'static str),
}

/// The bounded, acyclic tree produced by the walker.
///
/// No node contains itself: re-entry into an already admitted value is
/// replaced by [`GraphNode::Truncated`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphNode {
    /// An ordered list of children. A budget cut appends a `Truncated` item.
    Sequence {
        /// Bracket style.
        kind: SeqKind,
        /// Children in enumeration order.
        items: Vec<GraphNode>,
    },
    /// Key/value pairs. With a label the mapping is an object keyed by member
    /// name, without one it is a dictionary.
    Mapping {
        /// Type name of an object.
        label: Option<&'static str>,
        /// Entries in enumeration order (member-name order for objects).
        entries: Vec<(GraphNode, GraphNode)>,
        /// Sentinel recorded when the visit budget ran out.
        overflow: Option<Box<GraphNode>>,
    },
    /// Rendered atomic value.
    Scalar(String),
    /// Ellipsis sentinel; carries the number of omitted items when known.
    Truncated(Option<usize>),
}

impl GraphNode {
    /// True for the ellipsis sentinel.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated(_))
    }

    /// Number of nodes in the tree, including this one.
    pub fn size(&self) -> usize {
        1 + match self {
            Self::Sequence { items, .. } => items.iter().map(GraphNode::size).sum(),
            Self::Mapping {
                entries, overflow, ..
            } => {
                entries.iter().map(|(k, v)| k.size() + v.size()).sum::<usize>()
                    + overflow.as_deref().map_or(0, GraphNode::size)
            }
            Self::Scalar(_) | Self::Truncated(_) => 0,
        }
    }
}
