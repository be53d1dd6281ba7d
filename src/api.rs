//! The public entry points.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::FormatterCache;
use crate::error::Result;
use crate::formatter::TypeFormatter;
use crate::graph::{Budget, GraphNode, Quota, Walker};
use crate::inspect::Inspect;
use crate::render;
use crate::scalar::{Class, classify};

/// Budgets and rendering switches.
///
/// Negative budgets mean unbounded. Missing fields take their defaults when
/// deserialized, so a partial configuration file is enough:
///
/// ```
/// let options: loupe::Options = serde_json::from_str(r#"{ "visit_budget": 10 }"#).unwrap();
/// assert_eq!(options.visit_budget, 10);
/// assert_eq!(options.string_length_budget, 400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Elements, entries and members collected per `stringify` call.
    pub visit_budget: i64,
    /// Characters kept of each rendered scalar.
    pub string_length_budget: i64,
    /// Layers expanded per `stringify` call, never more than
    /// [`MAX_NESTING`](crate::MAX_NESTING).
    pub recursion_budget: i64,
    /// Default depth of `format`, never more than
    /// [`MAX_NESTING`](crate::MAX_NESTING).
    pub format_depth: i64,
    /// Quote and escape chars and strings.
    pub use_quotes: bool,
    /// Elements shown per collection by `format`.
    pub max_elements: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            visit_budget: 80,
            string_length_budget: 400,
            recursion_budget: 20,
            format_depth: 3,
            use_quotes: false,
            max_elements: 32,
        }
    }
}

/// A configured renderer.
///
/// ```
/// use loupe::Inspector;
///
/// let inspector = Inspector::builder().use_quotes(true).build();
/// assert_eq!(inspector.stringify(&vec!["a", "b"]), r#"["a", "b"]"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    options: Options,
}

impl Inspector {
    /// An inspector with the given options.
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Starts a builder from the default options.
    pub fn builder() -> InspectorBuilder {
        InspectorBuilder::default()
    }

    /// The active options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Flattens `value` into a bounded, acyclic tree.
    pub fn flatten<T: Inspect + ?Sized>(&self, value: &T) -> GraphNode {
        let root: &dyn Inspect = &value;
        let quota = Quota::from_options(&self.options);
        Walker::new(FormatterCache::global(), quota, self.options.use_quotes).flatten(root)
    }

    /// Renders `value` through the graph walker. Never fails; budgets
    /// truncate the output instead.
    pub fn stringify<T: Inspect + ?Sized>(&self, value: &T) -> String {
        render::render(&self.flatten(value))
    }

    /// Renders `value` through the type formatter at the configured depth.
    pub fn format<T: Inspect + ?Sized>(&self, value: &T) -> String {
        self.format_with_depth(value, self.options.format_depth)
    }

    /// Renders `value` through the type formatter at `depth`; negative depths
    /// go as deep as [`MAX_NESTING`](crate::MAX_NESTING).
    pub fn format_with_depth<T: Inspect + ?Sized>(&self, value: &T, depth: i64) -> String {
        let root: &dyn Inspect = &value;
        TypeFormatter::new(FormatterCache::global(), &self.options)
            .format(root, Budget::from_signed(depth))
    }

    /// Like [`format`](Self::format), but reports a root value with no safe
    /// textual form as an error instead of a marker.
    pub fn try_format<T: Inspect + ?Sized>(&self, value: &T) -> Result<String> {
        let root: &dyn Inspect = &value;
        if let Class::Unsupported(err) = classify(root, FormatterCache::global()) {
            return Err(err);
        }
        Ok(self.format(value))
    }
}

/// Builder for [`Inspector`].
#[derive(Debug, Clone, Default)]
pub struct InspectorBuilder {
    options: Options,
}

impl InspectorBuilder {
    /// Sets the visit budget.
    pub fn visit_budget(mut self, budget: i64) -> Self {
        self.options.visit_budget = budget;
        self
    }

    /// Sets the per-scalar length budget.
    pub fn string_length_budget(mut self, budget: i64) -> Self {
        self.options.string_length_budget = budget;
        self
    }

    /// Sets the layer budget of `stringify`.
    pub fn recursion_budget(mut self, budget: i64) -> Self {
        self.options.recursion_budget = budget;
        self
    }

    /// Sets the default depth of `format`.
    pub fn format_depth(mut self, depth: i64) -> Self {
        self.options.format_depth = depth;
        self
    }

    /// Turns quoting of chars and strings on or off.
    pub fn use_quotes(mut self, on: bool) -> Self {
        self.options.use_quotes = on;
        self
    }

    /// Sets how many elements `format` shows per collection.
    pub fn max_elements(mut self, max: usize) -> Self {
        self.options.max_elements = max;
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> Inspector {
        Inspector::new(self.options)
    }
}

/// Renders `value` with the default options through the graph walker.
pub fn stringify<T: Inspect + ?Sized>(value: &T) -> String {
    Inspector::default().stringify(value)
}

/// Renders `value` with the default options through the type formatter.
pub fn format<T: Inspect + ?Sized>(value: &T) -> String {
    Inspector::default().format(value)
}

/// `Display` adapter rendering through [`stringify`].
///
/// ```
/// let ids = vec![3, 1, 2];
/// assert_eq!(format!("ids={}", loupe::inspected(&ids)), "ids=[3, 1, 2]");
/// ```
pub struct Inspected<'a, T: ?Sized> {
    value: &'a T,
}

/// Wraps `value` for use with `format!` and `tracing` fields.
pub fn inspected<T: Inspect + ?Sized>(value: &T) -> Inspected<'_, T> {
    Inspected { value }
}

impl<T: Inspect + ?Sized> fmt::Display for Inspected<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self.value))
    }
}

impl<T: Inspect + ?Sized> fmt::Debug for Inspected<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<Options> for Inspector {
    fn from(options: Options) -> Self {
        Self::new(options)
    }
}
