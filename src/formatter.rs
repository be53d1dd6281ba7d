//! Depth-limited, type-directed formatting.
//!
//! Unlike the walker, the formatter renders straight to text. It recurses on
//! the call stack, bounded by the depth budget, and guards against cycles by
//! tracking the identities on the current path.

use std::ops::ControlFlow;

use tracing::debug;

use crate::api::Options;
use crate::cache::{FormatterCache, short_type_name};
use crate::error::{InspectError, Result};
use crate::graph::{Budget, MAX_NESTING};
use crate::inspect::{Capability, Identity, Inspect, LayoutKind};
use crate::render::{self, ELLIPSIS};
use crate::scalar::{Class, classify, clip, render_scalar};

/// Renders values up to a depth, using the compiled formatter of each type.
#[derive(Debug, Clone, Copy)]
pub struct TypeFormatter<'c> {
    cache: &'c FormatterCache,
    use_quotes: bool,
    string_length: Budget,
    max_elements: usize,
}

impl<'c> TypeFormatter<'c> {
    /// Creates a formatter configured by `options`.
    pub fn new(cache: &'c FormatterCache, options: &Options) -> Self {
        Self {
            cache,
            use_quotes: options.use_quotes,
            string_length: Budget::from_signed(options.string_length_budget),
            max_elements: options.max_elements,
        }
    }

    /// Formats `value`. Composite values at depth zero render as their type
    /// name. The depth is capped at [`MAX_NESTING`].
    pub fn format(&self, value: &dyn Inspect, depth: Budget) -> String {
        let mut trail = Vec::new();
        self.format_value(value, depth.capped(MAX_NESTING), &mut trail)
    }

    fn format_value(&self, value: &dyn Inspect, depth: Budget, trail: &mut Vec<Identity>) -> String {
        let identity = value.identity();
        if identity.is_some_and(|id| trail.contains(&id)) {
            return ELLIPSIS.to_string();
        }
        match classify(value, self.cache) {
            Class::Atomic(scalar) => return render_scalar(&scalar, self.use_quotes, self.string_length),
            Class::Custom(text) => return clip(&text, self.string_length),
            Class::Unsupported(err) => return err.marker(),
            Class::Composite => {}
        }
        if depth.is_exhausted() {
            return type_label(value);
        }

        if let Some(identity) = identity {
            trail.push(identity);
        }
        let text = self.format_composite(value, depth.lower(), trail);
        if identity.is_some() {
            trail.pop();
        }
        text
    }

    fn format_composite(&self, value: &dyn Inspect, inner: Budget, trail: &mut Vec<Identity>) -> String {
        for capability in Capability::PRIORITY {
            let outcome = match capability {
                Capability::Entries => self.format_entries(value, inner, trail),
                Capability::Elements => self
                    .format_sequence(value, capability, inner, trail)
                    .map(|items| items.map(|items| render::list(&items))),
                Capability::Positional => self
                    .format_sequence(value, capability, inner, trail)
                    .map(|items| items.map(|items| render::tuple(None, &items))),
                Capability::Members => self.format_members(value, inner, trail).map(Ok),
            };
            match outcome {
                None => {}
                Some(Ok(text)) => return text,
                Some(Err(err)) => {
                    debug!(
                        handler = ?capability,
                        type_name = value.type_name(),
                        error = %err,
                        "enumeration failed, falling back"
                    );
                }
            }
        }
        short_type_name(value.type_name())
    }

    /// Renders every key, keeps the first `max_elements` in key order and only
    /// then renders the values of the kept entries.
    fn format_entries(
        &self,
        value: &dyn Inspect,
        inner: Budget,
        trail: &mut Vec<Identity>,
    ) -> Option<Result<String>> {
        let mut keys: Vec<(String, usize)> = Vec::new();
        if let Err(err) = value.entries(&mut |key: &dyn Inspect, _: &dyn Inspect| {
            let text = self.format_value(key, inner, trail);
            keys.push((text, keys.len()));
            ControlFlow::Continue(())
        })? {
            return Some(Err(err));
        }

        let total = keys.len();
        keys.sort();
        keys.truncate(self.max_elements);

        let mut slots: Vec<Option<String>> = vec![None; total];
        let mut ordinal = 0usize;
        if let Err(err) = value.entries(&mut |_: &dyn Inspect, item: &dyn Inspect| {
            if keys.iter().any(|(_, o)| *o == ordinal) {
                if let Some(slot) = slots.get_mut(ordinal) {
                    *slot = Some(self.format_value(item, inner, trail));
                }
            }
            ordinal += 1;
            ControlFlow::Continue(())
        })? {
            return Some(Err(err));
        }

        let pairs: Vec<(String, String)> = keys
            .into_iter()
            .map(|(key, o)| {
                let item = slots
                    .get_mut(o)
                    .and_then(Option::take)
                    .unwrap_or_else(|| ELLIPSIS.to_string());
                (key, item)
            })
            .collect();
        let overflow = (total > pairs.len()).then(|| render::marker(Some(total - pairs.len())));
        Some(Ok(render::dictionary(pairs, overflow)))
    }

    /// Renders up to `max_elements` items and appends `…N more` for the rest.
    fn format_sequence(
        &self,
        value: &dyn Inspect,
        capability: Capability,
        inner: Budget,
        trail: &mut Vec<Identity>,
    ) -> Option<Result<Vec<String>>> {
        let hint = value.len_hint();
        let mut items = Vec::new();
        let mut skipped = 0usize;
        let outcome = capability.enumerate(value, &mut |child: &dyn Inspect| {
            if items.len() < self.max_elements {
                items.push(self.format_value(child, inner, trail));
                return ControlFlow::Continue(());
            }
            match hint {
                Some(total) => {
                    skipped = total.saturating_sub(items.len());
                    ControlFlow::Break(())
                }
                None => {
                    skipped += 1;
                    ControlFlow::Continue(())
                }
            }
        })?;
        Some(outcome.map(|()| {
            if skipped > 0 {
                items.push(render::marker(Some(skipped)));
            }
            items
        }))
    }

    /// `Name { a: .., b: .. }`, `Name(a, b)` or `Name`; failing members show a
    /// marker in place of their value.
    fn format_members(&self, value: &dyn Inspect, inner: Budget, trail: &mut Vec<Identity>) -> Option<String> {
        let layout = value.layout()?;
        let compiled = self.cache.compiled(layout);
        if compiled.is_empty() {
            return Some(compiled.name().to_string());
        }

        let mut members = Vec::with_capacity(compiled.len());
        for slot in compiled.slots() {
            let mut text = None;
            value.member(slot.index, &mut |outcome: Result<&dyn Inspect>| {
                text = Some(match outcome {
                    Ok(member) => self.format_value(member, inner, trail),
                    Err(err) => err.marker(),
                });
            });
            let text = text.unwrap_or_else(|| {
                InspectError::invalid_operation("member index out of range").marker()
            });
            members.push((slot.name.to_string(), text));
        }

        Some(match compiled.kind() {
            LayoutKind::Tuple => {
                let items: Vec<String> = members.into_iter().map(|(_, v)| v).collect();
                render::tuple(Some(compiled.name()), &items)
            }
            LayoutKind::Struct | LayoutKind::Unit => render::object(compiled.name(), &members, None),
        })
    }
}

/// Name shown for a composite cut by the depth budget.
fn type_label(value: &dyn Inspect) -> String {
    match value.layout() {
        Some(layout) => layout.name.to_string(),
        None => short_type_name(value.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::{Layout, VisitMember};

    struct Point {
        x: i32,
        y: i32,
    }

    static POINT: Layout = Layout {
        name: "Point",
        kind: LayoutKind::Struct,
        members: &["y", "x"],
        custom_text: false,
    };

    impl Inspect for Point {
        fn layout(&self) -> Option<&'static Layout> {
            Some(&POINT)
        }

        fn member(&self, index: usize, visit: &mut VisitMember<'_>) {
            match index {
                0 => visit(Ok(&self.y)),
                1 => visit(Ok(&self.x)),
                _ => {}
            }
        }
    }

    fn format(value: &dyn Inspect, depth: i64) -> String {
        let cache = FormatterCache::new();
        TypeFormatter::new(&cache, &Options::default()).format(value, Budget::from_signed(depth))
    }

    #[test]
    fn members_render_in_name_order() {
        assert_eq!(format(&Point { x: 1, y: 2 }, 3), "Point { x: 1, y: 2 }");
    }

    #[test]
    fn depth_zero_renders_type_name() {
        assert_eq!(format(&Point { x: 1, y: 2 }, 0), "Point");
        assert_eq!(format(&vec![vec![1u8]], 1), "[Vec<u8>]");
    }

    #[test]
    fn elements_are_capped() {
        let items: Vec<u32> = (0..40).collect();
        let text = format(&items, 3);
        assert!(text.starts_with("[0, 1, 2"));
        assert!(text.ends_with("31, …8 more]"));
    }
}
