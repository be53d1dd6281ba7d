//! Text conventions shared by the walker output and the type formatter.
//!
//! Brackets: `[a, b]` lists, `(a, b)` tuples, `Name(a, b)` named tuples,
//! `{k: v}` dictionaries, `Name { m: v }` objects and a bare `Name` for objects
//! without members. Truncation shows as `…` or `…N more` and always comes last.

use crate::graph::{GraphNode, SeqKind};

/// The truncation marker.
pub const ELLIPSIS: &str = "…";

/// `…N more` when the number of omitted items is known, `…` otherwise.
pub fn marker(remaining: Option<usize>) -> String {
    match remaining {
        Some(n) => format!("{ELLIPSIS}{n} more"),
        None => ELLIPSIS.to_string(),
    }
}

/// `[a, b]`.
pub fn list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

/// `(a, b)`, or `Name(a, b)` with a name.
pub fn tuple(name: Option<&str>, items: &[String]) -> String {
    format!("{}({})", name.unwrap_or_default(), items.join(", "))
}

/// `{k: v}` with entries sorted by rendered key and `overflow` last.
pub fn dictionary(mut entries: Vec<(String, String)>, overflow: Option<String>) -> String {
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let mut parts: Vec<String> = entries
        .into_iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect();
    parts.extend(overflow);
    format!("{{{}}}", parts.join(", "))
}

/// `Name { a: 1, b: 2 }` with members in the given order, or `Name` when
/// there is nothing to show.
pub fn object(name: &str, members: &[(String, String)], overflow: Option<String>) -> String {
    if members.is_empty() && overflow.is_none() {
        return name.to_string();
    }
    let mut parts: Vec<String> = members.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    parts.extend(overflow);
    format!("{name} {{ {} }}", parts.join(", "))
}

/// Renders a walker tree.
pub fn render(node: &GraphNode) -> String {
    match node {
        GraphNode::Scalar(text) => text.clone(),
        GraphNode::Truncated(remaining) => marker(*remaining),
        GraphNode::Sequence { kind, items } => {
            let items: Vec<String> = items.iter().map(render).collect();
            match kind {
                SeqKind::List => list(&items),
                SeqKind::Tuple => tuple(None, &items),
                SeqKind::Named(name) => tuple(Some(name), &items),
            }
        }
        GraphNode::Mapping {
            label,
            entries,
            overflow,
        } => {
            let pairs: Vec<(String, String)> =
                entries.iter().map(|(k, v)| (render(k), render(v))).collect();
            let overflow = overflow.as_deref().map(render);
            match label {
                Some(name) => object(name, &pairs, overflow),
                None => dictionary(pairs, overflow),
            }
        }
    }
}
