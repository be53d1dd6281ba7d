//! Process-wide cache of compiled type formatters.
//!
//! A [`CompiledFormatter`] is built once per [`Layout`] and shared for the rest
//! of the process. The cache key is the address of the layout's static, so
//! each type (each variant for enums with data) gets exactly one entry.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::inspect::{Layout, LayoutKind};

/// One member of a compiled layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberSlot {
    /// Member name as rendered.
    pub name: &'static str,
    /// Index to pass to [`Inspect::member`](crate::Inspect::member).
    pub index: usize,
}

/// The member order and flags of one type, computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFormatter {
    name: &'static str,
    kind: LayoutKind,
    slots: Vec<MemberSlot>,
    custom_text: bool,
}

impl CompiledFormatter {
    /// Compiles `layout`. Struct members are ordered by name; tuple members
    /// keep their declaration order.
    pub fn compile(layout: &'static Layout) -> Self {
        let mut slots: Vec<MemberSlot> = layout
            .members
            .iter()
            .enumerate()
            .map(|(index, name)| MemberSlot { name: *name, index })
            .collect();
        if layout.kind == LayoutKind::Struct {
            slots.sort_by(|a, b| a.name.cmp(b.name));
        }
        Self {
            name: layout.name,
            kind: layout.kind,
            slots,
            custom_text: layout.custom_text,
        }
    }

    /// Display name of the type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Member shape.
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Members in rendering order.
    pub fn slots(&self) -> &[MemberSlot] {
        &self.slots
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True for layouts without members.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the type renders through its custom text form.
    pub fn has_custom_text(&self) -> bool {
        self.custom_text
    }
}

/// Thread-safe map from layout to compiled formatter.
///
/// Reads take the shared lock. A miss compiles outside the lock and inserts
/// under the write lock only if no other thread got there first, so every
/// caller observes the first published entry.
#[derive(Debug, Default)]
pub struct FormatterCache {
    entries: RwLock<HashMap<usize, Arc<CompiledFormatter>>>,
}

static GLOBAL: OnceLock<FormatterCache> = OnceLock::new();

impl FormatterCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static FormatterCache {
        GLOBAL.get_or_init(FormatterCache::new)
    }

    fn key(layout: &'static Layout) -> usize {
        layout as *const Layout as usize
    }

    /// Returns the compiled formatter of `layout`, compiling it on first use.
    pub fn compiled(&self, layout: &'static Layout) -> Arc<CompiledFormatter> {
        let key = Self::key(layout);
        if let Ok(entries) = self.entries.read() {
            if let Some(found) = entries.get(&key) {
                return Arc::clone(found);
            }
        }

        let fresh = Arc::new(CompiledFormatter::compile(layout));
        match self.entries.write() {
            Ok(mut entries) => {
                let published = entries.entry(key).or_insert_with(|| {
                    debug!(
                        type_name = layout.name,
                        members = fresh.len(),
                        "compiled formatter cached"
                    );
                    Arc::clone(&fresh)
                });
                Arc::clone(published)
            }
            // A poisoned cache still serves correct, uncached formatters.
            Err(_) => fresh,
        }
    }

    /// True if `layout` was compiled already.
    pub fn contains(&self, layout: &'static Layout) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(&Self::key(layout)))
            .unwrap_or(false)
    }

    /// Number of cached formatters.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// True if nothing was compiled yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Strips module paths from a type name, keeping generic arguments:
/// `alloc::vec::Vec<my_app::Point>` becomes `Vec<Point>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                out.truncate(segment_start);
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' | '*' => {
                out.push(c);
                segment_start = out.len();
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    static POINT: Layout = Layout {
        name: "Point",
        kind: LayoutKind::Struct,
        members: &["y", "x", "label"],
        custom_text: false,
    };

    static PAIR: Layout = Layout {
        name: "Pair",
        kind: LayoutKind::Tuple,
        members: &["1", "0"],
        custom_text: false,
    };

    #[test]
    fn struct_members_sorted_by_name() {
        let compiled = CompiledFormatter::compile(&POINT);
        let names: Vec<_> = compiled.slots().iter().map(|s| s.name).collect();
        assert_eq!(names, ["label", "x", "y"]);
        let indices: Vec<_> = compiled.slots().iter().map(|s| s.index).collect();
        assert_eq!(indices, [2, 1, 0]);
    }

    #[test]
    fn tuple_members_keep_declaration_order() {
        let compiled = CompiledFormatter::compile(&PAIR);
        let names: Vec<_> = compiled.slots().iter().map(|s| s.name).collect();
        assert_eq!(names, ["1", "0"]);
    }

    #[test]
    fn compiled_once_per_layout() {
        let cache = FormatterCache::new();
        assert!(cache.is_empty());
        let a = cache.compiled(&POINT);
        let b = cache.compiled(&POINT);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.contains(&POINT));
        assert!(!cache.contains(&PAIR));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn short_names_drop_module_paths() {
        assert_eq!(short_type_name("i32"), "i32");
        assert_eq!(short_type_name("alloc::string::String"), "String");
        assert_eq!(
            short_type_name("std::collections::hash::map::HashMap<alloc::string::String, my::Point>"),
            "HashMap<String, Point>"
        );
        assert_eq!(short_type_name("&dyn loupe::inspect::Inspect"), "&dyn Inspect");
        assert_eq!(short_type_name("(u8, core::time::Duration)"), "(u8, Duration)");
    }
}
