//! Runtime support for code generated by `#[derive(Inspect)]`.
//! Do not use directly.

use crate::scalar::{EnumValue, Scalar};

/// Variant table of a fieldless enum, generated by the derive.
///
/// Integer newtypes marked `#[inspect(flags = "Path")]` borrow the table of
/// `Path` to render their bits.
pub trait EnumTable {
    /// Display name of the enum.
    const NAME: &'static str;
    /// `(name, value)` pairs in declaration order.
    const VARIANTS: &'static [(&'static str, i128)];
}

/// Bits of a flags newtype's integer, masked to the integer's own width.
///
/// Signed values are reinterpreted through their unsigned counterpart, so
/// `-1i8` renders as `0xFF` rather than a 128-bit pattern.
pub trait FlagBits: Copy {
    /// The value as a non-negative bit pattern.
    fn flag_bits(self) -> i128;
}

macro_rules! impl_flag_bits {
    (unsigned: $($u:ty),*; signed: $($s:ty => $as:ty),*) => {
        $(impl FlagBits for $u {
            fn flag_bits(self) -> i128 {
                self as i128
            }
        })*
        $(impl FlagBits for $s {
            fn flag_bits(self) -> i128 {
                self as $as as i128
            }
        })*
    };
}

impl_flag_bits!(
    unsigned: u8, u16, u32, u64, usize;
    signed: i8 => u8, i16 => u16, i32 => u32, i64 => u64, isize => usize
);

/// Builds the scalar of an enumeration value described by `E`'s table.
pub fn enum_scalar<E: EnumTable + ?Sized>(name: &'static str, value: i128, flags: bool) -> Scalar<'static> {
    Scalar::Enum(EnumValue::new(name, value, E::VARIANTS, flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Budget;
    use crate::scalar::render_scalar;

    struct Access;

    impl EnumTable for Access {
        const NAME: &'static str = "Access";
        const VARIANTS: &'static [(&'static str, i128)] = &[("Read", 1), ("Write", 2)];
    }

    #[test]
    fn signed_bits_keep_their_width() {
        assert_eq!((-1i8).flag_bits(), 0xFF);
        assert_eq!((-2i32).flag_bits(), 0xFFFF_FFFE);
        assert_eq!(5u16.flag_bits(), 5);

        let scalar = enum_scalar::<Access>("Neg", (-1i8).flag_bits(), true);
        assert_eq!(
            render_scalar(&scalar, false, Budget::Unbounded),
            "Neg(0xFF) = Read | Write | 0xFC"
        );
    }

    #[test]
    fn newtype_borrows_variant_table() {
        let scalar = enum_scalar::<Access>("Permissions", 3, true);
        assert_eq!(
            render_scalar(&scalar, false, Budget::Unbounded),
            "Permissions(0x3) = Read | Write"
        );
    }
}
