//! Defines the `Inspect` trait, the capability interface every renderable value
//! implements.
//!
//! Types describe themselves through a small set of optional hooks instead of
//! runtime reflection. The walker and the type formatter probe the hooks in a
//! fixed priority order (see [`Capability::PRIORITY`]); the first hook that
//! answers decides the shape of the output.

use std::ops::ControlFlow;

use crate::error::Result;
use crate::scalar::Scalar;

/// Return type of enumeration callbacks. `Break` stops the enumeration early.
pub type Flow = ControlFlow<()>;

/// Callback receiving one element of an ordered or positional value.
pub type VisitElement<'v> = dyn FnMut(&dyn Inspect) -> Flow + 'v;

/// Callback receiving one `(key, value)` entry of a dictionary-like value.
pub type VisitEntry<'v> = dyn FnMut(&dyn Inspect, &dyn Inspect) -> Flow + 'v;

/// Callback receiving the outcome of one member getter.
pub type VisitMember<'v> = dyn FnMut(Result<&dyn Inspect>) + 'v;

/// A value that can be rendered by loupe.
///
/// Every hook has a default, so an implementation only spells out the
/// capabilities the type actually has. `#[derive(Inspect)]` generates
/// [`layout`](Inspect::layout) and [`member`](Inspect::member) for structs and
/// enums; the standard library types are covered by the crate.
///
/// Enumeration hooks return:
/// - `None` when the capability is not supported,
/// - `Some(Ok(()))` after a complete (or deliberately stopped) enumeration,
/// - `Some(Err(_))` when enumeration failed; callers fall back to the next
///   capability.
pub trait Inspect {
    /// The full type name, used for labels of values without a layout.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Classifies the value as atomic.
    ///
    /// `Some(Err(_))` signals a shape with no safe textual form.
    fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
        None
    }

    /// Identity of an identity-bearing handle (`Rc`, `Arc`, references).
    ///
    /// Only values reporting an identity take part in cycle detection.
    fn identity(&self) -> Option<Identity> {
        None
    }

    /// True for error values.
    fn is_error(&self) -> bool {
        false
    }

    /// Number of elements or entries, if known without enumerating.
    fn len_hint(&self) -> Option<usize> {
        None
    }

    /// Dictionary-like enumeration.
    fn entries(&self, _visit: &mut VisitEntry<'_>) -> Option<Result<()>> {
        None
    }

    /// Ordered enumeration.
    fn elements(&self, _visit: &mut VisitElement<'_>) -> Option<Result<()>> {
        None
    }

    /// Fixed-arity, tuple-like enumeration.
    fn positional(&self, _visit: &mut VisitElement<'_>) -> Option<Result<()>> {
        None
    }

    /// Static member table used for reflective decomposition.
    fn layout(&self) -> Option<&'static Layout> {
        None
    }

    /// Reads the member at `index` of [`layout`](Inspect::layout) and hands the
    /// outcome to `visit`. Out of range indices leave `visit` uncalled.
    fn member(&self, _index: usize, _visit: &mut VisitMember<'_>) {}

    /// Custom text form. Only consulted when the layout declares one.
    fn custom_text(&self) -> Option<String> {
        None
    }
}

/// Shape of a [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Named members, rendered `Name { a: 1 }` in name order.
    Struct,
    /// Positional members, rendered `Name(1, 2)` in declaration order.
    Tuple,
    /// No members, rendered `Name`.
    Unit,
}

/// Static description of a type's members.
///
/// One `Layout` exists per type (per variant for enums with data); its address
/// is the key of the process-wide formatter cache.
#[derive(Debug)]
pub struct Layout {
    /// Display name (`Point`, `Shape::Circle`).
    pub name: &'static str,
    /// Member shape.
    pub kind: LayoutKind,
    /// Member names in declaration order; the index is the `member` index.
    pub members: &'static [&'static str],
    /// Whether the type renders through [`Inspect::custom_text`].
    pub custom_text: bool,
}

/// Identity of a composite value: its address plus its type.
///
/// The type is part of the key so that a struct and its first field, which
/// share an address, are never confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    address: usize,
    type_name: &'static str,
}

impl Identity {
    /// Identity of the value behind `value`.
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self {
            address: (value as *const T).cast::<()>() as usize,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Identity of the value `ptr` points to. The pointer is never read.
    pub fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
        Self {
            address: ptr.cast::<()>() as usize,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The address part of the identity.
    pub fn address(&self) -> usize {
        self.address
    }
}

/// The capability handlers, in the order they are probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Capability {
    Entries,
    Elements,
    Positional,
    Members,
}

impl Capability {
    /// Dictionary-like first, reflective decomposition last.
    pub(crate) const PRIORITY: [Capability; 4] = [
        Capability::Entries,
        Capability::Elements,
        Capability::Positional,
        Capability::Members,
    ];

    /// Runs an element-style enumeration. `None` for the other capabilities.
    pub(crate) fn enumerate(
        self,
        value: &dyn Inspect,
        visit: &mut VisitElement<'_>,
    ) -> Option<Result<()>> {
        match self {
            Capability::Elements => value.elements(visit),
            Capability::Positional => value.positional(visit),
            Capability::Entries | Capability::Members => None,
        }
    }
}
