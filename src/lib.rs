//! # loupe
//!
//! A cycle-safe, budget-bounded debug stringifier for arbitrary Rust values.
//!
//! ## Overview
//!
//! Given a value of unknown shape that may be cyclic or huge, loupe produces a
//! deterministic, bounded, human-readable string suitable for logs and debug
//! output. It never loops forever and never overflows the stack, and a type
//! only needs `#[derive(Inspect)]` to take part.
//!
//! ### Key Features
//!
//! *   **Cycle Safety:** Identity-bearing handles (`Rc`, `Arc`, `Weak`,
//!     references) are tracked in a per-call seen set; re-entry renders as `…`.
//! *   **Budgets:** Visits, characters per scalar and layers are capped. When a
//!     budget runs out the output is truncated with `…` or `…N more`, never an
//!     error.
//! *   **Layered Walk:** The graph walker expands the value one layer per pass,
//!     so a shallow view of a wide value is always produced before anything
//!     deep.
//! *   **Compiled Layouts:** Member order of each type is computed once and
//!     cached process-wide.
//!
//! ## Architecture
//!
//! Four components, leaves first:
//!
//! - [`scalar`]: decides whether a value is atomic and renders atomic values.
//! - [`graph`]: the [`Walker`] turns a composite value into a bounded,
//!   acyclic [`GraphNode`] tree.
//! - [`cache`] and [`formatter`]: the [`FormatterCache`] compiles each type's
//!   [`Layout`] once; the [`TypeFormatter`] renders depth-limited text with it.
//! - [`render`]: bracket conventions, separators and truncation markers.
//!
//! ## Usage
//!
//! ```rust
//! use loupe::Inspect;
//!
//! #[derive(Inspect)]
//! struct Point {
//!     y: i32,
//!     x: i32,
//! }
//!
//! let p = Point { x: 1, y: 2 };
//! assert_eq!(loupe::stringify(&p), "Point { x: 1, y: 2 }");
//! assert_eq!(loupe::format(&vec![p]), "[Point { x: 1, y: 2 }]");
//! ```
//!
//! Cycles through shared handles terminate:
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let list: Rc<RefCell<Vec<Box<dyn loupe::Inspect>>>> =
//!     Rc::new(RefCell::new(vec![Box::new(1), Box::new(2)]));
//! list.borrow_mut().push(Box::new(Rc::clone(&list)));
//! assert_eq!(loupe::stringify(&list), "[1, 2, …]");
//! # list.borrow_mut().clear();
//! ```
//!
//! ### Safety and Error Handling
//!
//! * **No Unsafe:** the crate forbids `unsafe` code.
//! * **No Panics:** no `unwrap()` or `panic!()` in the library (enforced by
//!   clippy lints).
//! * **Local Recovery:** failures of a single member or enumeration are
//!   recovered where they happen; see [`InspectError`].

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

extern crate self as loupe;

// --- PUBLIC API MODULES ---
pub mod api;
pub mod cache;
pub mod error;
pub mod formatter;
pub mod graph;
pub mod inspect;
pub mod render;
pub mod scalar;

// Private modules
mod inspect_impls;

// --- MACRO SUPPORT MODULES ---

/// Runtime utilities used by the derived code.
#[doc(hidden)]
pub mod rt;

// --- RE-EXPORTS ---

pub use api::{Inspected, Inspector, InspectorBuilder, Options, format, inspected, stringify};
pub use cache::{CompiledFormatter, FormatterCache, MemberSlot, short_type_name};
pub use error::{InspectError, Result};
pub use formatter::TypeFormatter;
pub use graph::{Budget, GraphNode, MAX_NESTING, Quota, SeqKind, Walker};
pub use inspect::{Flow, Identity, Inspect, Layout, LayoutKind, VisitElement, VisitEntry, VisitMember};
pub use render::render;
pub use scalar::{EnumValue, Scalar, SignedDuration, TypeHandle};

// Re-export the derive macro so it is accessible as `loupe::Inspect`
pub use loupe_derive::Inspect;
