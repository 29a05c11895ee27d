// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Utilities to make decoding various map data less terrible.

use crate::Error;

/// Extract a bit from a byte.
pub const fn extract_bit(word: u8, bit: u8) -> Result<bool, Error> {
    if bit > 7 {
        return Err(Error::BitOutOfRange);
    }
    Ok((word & (1 << bit)) != 0)
}

/// Compute an SFF-style check code: the low 8 bits of the sum of all bytes.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Convert a space-padded ASCII field into a string.
pub fn ascii_to_string(buf: &[u8]) -> Result<String, Error> {
    if !buf.is_ascii() {
        return Err(Error::ParseFailed);
    }
    let s = std::str::from_utf8(buf).map_err(|_| Error::ParseFailed)?;
    Ok(s.trim_end_matches([' ', '\0']).to_string())
}

mod private {
    pub trait ScalableSealed: Sized + Copy + Into<f32> {}
}

pub trait Scalable: private::ScalableSealed {
    fn from_bytes(buf: [u8; 2]) -> Self;
}

impl private::ScalableSealed for i16 {}

impl Scalable for i16 {
    fn from_bytes(buf: [u8; 2]) -> Self {
        Self::from_be_bytes(buf)
    }
}

impl private::ScalableSealed for u16 {}

impl Scalable for u16 {
    fn from_bytes(buf: [u8; 2]) -> Self {
        Self::from_be_bytes(buf)
    }
}

/// Decode a 2-byte word into a float with a defined scale factor.
pub fn decode_with_scale<T: Scalable>(buf: [u8; 2], scale: f32) -> f32 {
    T::from_bytes(buf).into() * scale
}

/// Copy a fixed-size word out of a memory map.
///
/// Offsets into the loaded maps are all compile-time constants well inside
/// the map, so an out-of-range offset is a programming error.
pub(crate) fn word(map: &[u8], offset: usize) -> [u8; 2] {
    [map[offset], map[offset + 1]]
}

/// A helper macro to generate an enum from a one-byte code.
///
/// Many fields defined in SFF-8024 are a single byte, where a handful of
/// values are assigned and the rest are reserved or vendor-specific. This
/// macro generates an enum with one variant per assigned value, plus
/// catch-all variants holding the raw byte for each listed range.
///
/// It also generates `From<u8>`, `From<$name> for u8` and `Display`
/// implementations.
///
/// # Example
/// ```ignore
/// tcv_decode::bitfield_enum! {
///     name = Foo,
///     description = "A byte representing foo",
///     variants = {
///         0x00, First, "The first value",
///         0x01, Second, "The second value",
///     },
///     other_variants = {
///         Reserved: 0x02..=0xff,
///     }
/// }
/// ```
#[macro_export]
macro_rules! bitfield_enum {
    (
        name = $name:ident,
        description = $docstring:literal,
        variants = { $( $bits:literal, $variant:ident, $display:literal $(,)? ),+ },
        other_variants = { $( $other_variant:ident : $other_pattern:pat $(,)? ),+ }
        $(,)?
    ) => {
        #[doc = $docstring]
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[cfg_attr(
            any(feature = "api-traits", test),
            derive(schemars::JsonSchema, serde::Deserialize, serde::Serialize)
        )]
        #[cfg_attr(
            any(feature = "api-traits", test),
            serde(rename_all = "snake_case"),
        )]
        pub enum $name {
            $(
                #[doc = $display]
                $variant
            ),+,
            $($other_variant(u8)),+
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
                use $name::*;
                match self {
                    $( $variant => write!(f, "{}", $display), )+
                    $( $other_variant(x) => write!(f, "{} ({x:02x})", stringify!($other_variant)), )+
                }
            }
        }

        impl ::core::convert::From<u8> for $name {
            fn from(x: u8) -> Self {
                use $name::*;
                #[deny(overlapping_range_endpoints)]
                match x {
                    $( $bits => $variant, )+
                    $( $other_pattern => $other_variant(x), )+
                }
            }
        }

        impl ::core::convert::From<$name> for u8 {
            fn from(x: $name) -> u8 {
                use $name::*;
                match x {
                    $( $variant => $bits, )+
                    $( $other_variant(x) => x, )+
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::ascii_to_string;
    use super::checksum;
    use super::decode_with_scale;
    use super::extract_bit;

    #[test]
    fn test_extract_bit() {
        for shift in 0..8 {
            let expected = 1 << shift;
            assert!(extract_bit(expected, shift).unwrap());
            for other_shift in (0..8).filter(|s| *s != shift) {
                assert!(!extract_bit(expected, other_shift).unwrap());
            }
        }
        assert!(extract_bit(0, 8).is_err());
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x01, 0x02, 0x03]), 0x06);
        assert_eq!(checksum(&[0xff, 0x02]), 0x01);
    }

    #[test]
    fn test_ascii_to_string() {
        assert_eq!(ascii_to_string(b"ACME CORP       ").unwrap(), "ACME CORP");
        assert_eq!(ascii_to_string(b"A1\0\0").unwrap(), "A1");
        assert!(ascii_to_string(&[0x41, 0xc3]).is_err());
    }

    #[test]
    fn test_decode_with_scale() {
        assert_eq!(decode_with_scale::<i16>([0xff, 0x00], 1.0 / 256.0), -1.0);
        assert_eq!(decode_with_scale::<u16>([0x01, 0x00], 0.5), 128.0);
    }
}
