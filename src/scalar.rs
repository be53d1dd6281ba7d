//! Scalar classification and rendering.
//!
//! A value is *atomic* when it converts to text without structural expansion:
//! booleans, numbers, chars, strings, enumerations, pointers, type handles,
//! durations, and anything exposing a custom text form. Atomic values bypass
//! the seen set and the graph walker and are rendered here directly.

use std::borrow::Cow;
use std::time::Duration;

use crate::cache::{FormatterCache, short_type_name};
use crate::error::InspectError;
use crate::graph::Budget;
use crate::inspect::Inspect;
use crate::render::ELLIPSIS;

/// An atomic value, borrowed from the inspected value where possible.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'a> {
    /// Absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer of any width.
    Int(i128),
    /// An unsigned integer of any width.
    UInt(u128),
    /// A floating point number.
    Float(f64),
    /// A character; quoted when quoting is on.
    Char(char),
    /// A string; quoted and escaped when quoting is on.
    Str(Cow<'a, str>),
    /// An enumeration value.
    Enum(EnumValue),
    /// A time span.
    Duration(SignedDuration),
    /// A raw address.
    Pointer(usize),
    /// A type handle, rendered as its short type name.
    Type(&'static str),
    /// Pre-rendered text (addresses, paths, versions); never quoted.
    Text(Cow<'a, str>),
}

impl Scalar<'_> {
    /// Detaches the scalar from the value it borrows from.
    pub fn into_owned(self) -> Scalar<'static> {
        match self {
            Scalar::Null => Scalar::Null,
            Scalar::Bool(b) => Scalar::Bool(b),
            Scalar::Int(i) => Scalar::Int(i),
            Scalar::UInt(u) => Scalar::UInt(u),
            Scalar::Float(f) => Scalar::Float(f),
            Scalar::Char(c) => Scalar::Char(c),
            Scalar::Str(s) => Scalar::Str(Cow::Owned(s.into_owned())),
            Scalar::Enum(e) => Scalar::Enum(e),
            Scalar::Duration(d) => Scalar::Duration(d),
            Scalar::Pointer(p) => Scalar::Pointer(p),
            Scalar::Type(t) => Scalar::Type(t),
            Scalar::Text(s) => Scalar::Text(Cow::Owned(s.into_owned())),
        }
    }
}

/// An enumeration value together with its variant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    type_name: &'static str,
    value: i128,
    variants: &'static [(&'static str, i128)],
    flags: bool,
}

impl EnumValue {
    /// Builds an enumeration value. `flags` selects the bitwise rendering.
    pub fn new(
        type_name: &'static str,
        value: i128,
        variants: &'static [(&'static str, i128)],
        flags: bool,
    ) -> Self {
        Self {
            type_name,
            value,
            variants,
            flags,
        }
    }

    /// The raw value.
    pub fn value(&self) -> i128 {
        self.value
    }

    /// `TypeName(value) = Name` or `TypeName(0xHEX) = A | B`.
    pub fn render(&self) -> String {
        if !self.flags {
            return match self.variants.iter().find(|(_, v)| *v == self.value) {
                Some((name, _)) => format!("{}({}) = {}", self.type_name, self.value, name),
                None => format!("{}({})", self.type_name, self.value),
            };
        }

        let head = format!("{}(0x{:X})", self.type_name, self.value);
        if self.value == 0 {
            return match self.variants.iter().find(|(_, v)| *v == 0) {
                Some((name, _)) => format!("{head} = {name}"),
                None => head,
            };
        }

        let mut names = Vec::new();
        let mut covered = 0i128;
        for (name, bits) in self.variants {
            if *bits != 0 && self.value & bits == *bits {
                names.push((*name).to_string());
                covered |= bits;
            }
        }
        if names.is_empty() {
            return head;
        }
        let rest = self.value & !covered;
        if rest != 0 {
            names.push(format!("0x{rest:X}"));
        }
        format!("{head} = {}", names.join(" | "))
    }
}

/// A duration that may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedDuration {
    negative: bool,
    magnitude: Duration,
}

impl SignedDuration {
    /// A non-negative span.
    pub fn positive(magnitude: Duration) -> Self {
        Self {
            negative: false,
            magnitude,
        }
    }

    /// A negative span of the given magnitude.
    pub fn negative(magnitude: Duration) -> Self {
        Self {
            negative: !magnitude.is_zero(),
            magnitude,
        }
    }

    /// Abbreviated form: `0`, `8d`, `1d2h`, `1h2m3s`, `1m30s`, `1.5s`,
    /// `2.5ms`, `750µs`; negative spans get a leading `-`.
    pub fn render(&self) -> String {
        let d = self.magnitude;
        if d.is_zero() {
            return "0".to_string();
        }

        let secs = d.as_secs();
        let days = secs / 86_400;
        let hours = (secs % 86_400) / 3_600;
        let minutes = (secs % 3_600) / 60;
        let seconds = secs % 60;

        let body = if days >= 7 {
            format!("{days}d")
        } else if days >= 1 {
            format!("{days}d{hours}h")
        } else if secs >= 3_600 {
            format!("{hours}h{minutes}m{seconds}s")
        } else if secs >= 60 {
            format!("{minutes}m{seconds}s")
        } else {
            // The unit is picked after rounding to one decimal.
            let millis = d.as_secs_f64() * 1_000.0;
            let tenth_secs = (millis / 100.0).round() / 10.0;
            let tenth_millis = (millis * 10.0).round() / 10.0;
            if tenth_secs >= 60.0 {
                "1m0s".to_string()
            } else if secs >= 1 || tenth_millis >= 1_000.0 {
                format!("{tenth_secs:.1}s")
            } else if d.as_nanos() >= 1_000_000 {
                format!("{tenth_millis:.1}ms")
            } else {
                format!("{}µs", d.as_nanos() as f64 / 1_000.0)
            }
        };

        if self.negative { format!("-{body}") } else { body }
    }
}

/// A type handle: renders the short name of `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHandle(&'static str);

impl TypeHandle {
    /// The handle of `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>())
    }
}

impl Inspect for TypeHandle {
    fn as_scalar(&self) -> Option<crate::Result<Scalar<'_>>> {
        Some(Ok(Scalar::Type(self.0)))
    }
}

/// Outcome of classifying a value.
pub(crate) enum Class<'v> {
    Atomic(Scalar<'v>),
    Custom(String),
    Unsupported(InspectError),
    Composite,
}

/// Decides whether `value` renders directly or must be traversed.
pub(crate) fn classify<'v>(value: &'v dyn Inspect, cache: &FormatterCache) -> Class<'v> {
    match value.as_scalar() {
        Some(Ok(scalar)) => return Class::Atomic(scalar),
        Some(Err(err)) => return Class::Unsupported(err),
        None => {}
    }
    if let Some(layout) = value.layout() {
        if cache.compiled(layout).has_custom_text() {
            if let Some(text) = value.custom_text() {
                return Class::Custom(text);
            }
        }
    }
    Class::Composite
}

/// Renders an atomic value, quoting chars and strings when asked. The final
/// text, quotes included, is cut to `limit` characters.
pub fn render_scalar(scalar: &Scalar<'_>, use_quotes: bool, limit: Budget) -> String {
    let text = match scalar {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::UInt(u) => u.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Char(c) if use_quotes => format!("'{}'", c.escape_debug()),
        Scalar::Char(c) => c.to_string(),
        Scalar::Str(s) if use_quotes => {
            let escaped: String = s.chars().flat_map(char::escape_debug).collect();
            format!("\"{escaped}\"")
        }
        Scalar::Str(s) | Scalar::Text(s) => return clip(s, limit),
        Scalar::Enum(e) => e.render(),
        Scalar::Duration(d) => d.render(),
        Scalar::Pointer(p) => format!("{p:#x}"),
        Scalar::Type(t) => short_type_name(t),
    };
    clip(&text, limit)
}

/// Cuts `text` to `limit` characters, appending an ellipsis when it was cut.
pub fn clip(text: &str, limit: Budget) -> String {
    let Some(max) = limit.limit() else {
        return text.to_string();
    };
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> String {
        SignedDuration::positive(Duration::from_secs_f64(s)).render()
    }

    #[test]
    fn duration_convention() {
        assert_eq!(secs(0.0), "0");
        assert_eq!(secs(90.0), "1m30s");
        assert_eq!(secs(1.5), "1.5s");
        assert_eq!(secs(3_723.0), "1h2m3s");
        assert_eq!(secs(93_600.0), "1d2h");
        assert_eq!(secs(8.0 * 86_400.0), "8d");
        assert_eq!(
            SignedDuration::positive(Duration::from_micros(2_500)).render(),
            "2.5ms"
        );
        assert_eq!(
            SignedDuration::positive(Duration::from_micros(750)).render(),
            "750µs"
        );
        assert_eq!(
            SignedDuration::negative(Duration::from_secs(90)).render(),
            "-1m30s"
        );
    }

    #[test]
    fn rounding_never_shows_a_full_unit() {
        assert_eq!(secs(59.96), "1m0s");
        assert_eq!(secs(59.94), "59.9s");
        assert_eq!(
            SignedDuration::positive(Duration::from_micros(999_960)).render(),
            "1.0s"
        );
        assert_eq!(
            SignedDuration::positive(Duration::from_micros(999_940)).render(),
            "999.9ms"
        );
    }

    #[test]
    fn every_kind_is_clipped_after_quoting() {
        let limit = Budget::Limited(2);
        let color = EnumValue::new("Color", 2, ACCESS, false);
        let cases = [
            (Scalar::Null, "nu…"),
            (Scalar::Bool(true), "tr…"),
            (Scalar::Int(-123), "-1…"),
            (Scalar::UInt(999), "99…"),
            (Scalar::Float(1.25), "1.…"),
            (Scalar::Char('x'), "'x…"),
            (Scalar::Str(Cow::Borrowed("ab")), "\"a…"),
            (Scalar::Enum(color), "Co…"),
            (Scalar::Duration(SignedDuration::positive(Duration::from_secs(3_723))), "1h…"),
            (Scalar::Pointer(0xbeef), "0x…"),
            (Scalar::Type("alloc::string::String"), "St…"),
            (Scalar::Text(Cow::Borrowed("v1.4")), "v1…"),
        ];
        for (scalar, expected) in cases {
            assert_eq!(render_scalar(&scalar, true, limit), expected, "{scalar:?}");
        }
    }

    #[test]
    fn negative_zero_renders_plain_zero() {
        assert_eq!(SignedDuration::negative(Duration::ZERO).render(), "0");
    }

    #[test]
    fn clip_counts_chars_not_bytes() {
        assert_eq!(clip("héllo", Budget::Limited(2)), "hé…");
        assert_eq!(clip("héllo", Budget::Limited(5)), "héllo");
        assert_eq!(clip("héllo", Budget::Unbounded), "héllo");
        assert_eq!(clip("abc", Budget::Limited(0)), "…");
    }

    #[test]
    fn quoting_escapes_before_clipping() {
        let s = Scalar::Str(Cow::Borrowed("a\nb"));
        assert_eq!(render_scalar(&s, true, Budget::Unbounded), "\"a\\nb\"");
        assert_eq!(render_scalar(&s, false, Budget::Unbounded), "a\nb");
        assert_eq!(render_scalar(&Scalar::Char('x'), true, Budget::Unbounded), "'x'");
    }

    const ACCESS: &[(&str, i128)] = &[("None", 0), ("Read", 1), ("Write", 2), ("Exec", 4)];

    #[test]
    fn flags_render_in_table_order() {
        let v = EnumValue::new("Flags", 3, ACCESS, true);
        assert_eq!(v.render(), "Flags(0x3) = Read | Write");
        let zero = EnumValue::new("Flags", 0, ACCESS, true);
        assert_eq!(zero.render(), "Flags(0x0) = None");
        let stray = EnumValue::new("Flags", 0x11, ACCESS, true);
        assert_eq!(stray.render(), "Flags(0x11) = Read | 0x10");
    }

    #[test]
    fn plain_enum_renders_value_and_name() {
        assert_eq!(EnumValue::new("Access", 2, ACCESS, false).render(), "Access(2) = Write");
        assert_eq!(EnumValue::new("Access", 9, ACCESS, false).render(), "Access(9)");
    }
}
