//! BER encoded integers.
//!
//! This is a private module. Its public items are re-exported by the parent.

use bytes::Bytes;
use crate::error::Error;


//------------ Int -----------------------------------------------------------

/// An ASN.1 INTEGER of arbitrary size.
///
/// As integers are variable length in BER, this type is a simple wrapper
/// atop the underlying `Bytes` value containing the content octets, i.e.,
/// the variable-length, big-endian, two's complement representation of the
/// integer. The most-significant bit of the first octet serves as the sign
/// bit.
///
/// The wrapped octets are always in the shortest possible form: the first
/// nine bits of a multi-octet integer are never all equal. Insisting on
/// this rule means equal integers have equal octets, so comparison can
/// simply compare slices, and re-encoding a decoded value reproduces its
/// input.
///
/// Values of any of Rust's integer types convert into `Int` via `From`.
/// Conversions in the other direction are fallible and report
/// [`Overflow`][crate::ErrorKind::Overflow] if the value doesn't fit.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Int(Bytes);

impl Int {
    /// Creates an integer from its content octets.
    ///
    /// Returns a validation error if the octets are empty or not in the
    /// shortest form.
    pub fn from_content(content: &[u8]) -> Result<Self, Error> {
        match (content.first(), content.get(1).map(|x| x & 0x80 != 0)) {
            (None, _) => {
                Err(Error::validation("empty INTEGER content"))
            }
            (Some(0), Some(false)) => {
                Err(Error::validation("non-minimal INTEGER content"))
            }
            (Some(0xFF), Some(true)) => {
                Err(Error::validation("non-minimal INTEGER content"))
            }
            _ => Ok(Int(Bytes::copy_from_slice(content)))
        }
    }

    /// Returns the content octets of the integer.
    pub fn content(&self) -> Bytes {
        self.0.clone()
    }

    /// Returns the content octets as a slice.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns the number of content octets.
    pub fn content_len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the integer is zero.
    pub fn is_zero(&self) -> bool {
        self.0.as_ref() == [0]
    }

    /// Returns whether the integer is negative.
    pub fn is_negative(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    /// Creates an integer from a signed value of up to 128 bits.
    fn from_i128(val: i128) -> Self {
        let bytes = val.to_be_bytes();
        let mut start = 0;
        while start < bytes.len() - 1 {
            let skippable = if bytes[start + 1] & 0x80 == 0 {
                bytes[start] == 0
            }
            else {
                bytes[start] == 0xFF
            };
            if !skippable {
                break
            }
            start += 1;
        }
        Int(Bytes::copy_from_slice(&bytes[start..]))
    }

    /// Creates an integer from an unsigned value of up to 128 bits.
    fn from_u128(val: u128) -> Self {
        // One extra leading octet so the sign bit can stay clear.
        let mut buf = [0u8; 17];
        buf[1..].copy_from_slice(&val.to_be_bytes());
        let mut start = 0;
        while start < buf.len() - 1
            && buf[start] == 0
            && buf[start + 1] & 0x80 == 0
        {
            start += 1;
        }
        Int(Bytes::copy_from_slice(&buf[start..]))
    }

    /// Converts the integer into an `i128` if it fits.
    pub fn to_i128(&self) -> Result<i128, Error> {
        if self.0.len() > 16 {
            return Err(Error::overflow("INTEGER does not fit i128"))
        }
        let mut res = if self.is_negative() { -1i128 } else { 0 };
        for &octet in self.0.iter() {
            res = res << 8 | i128::from(octet);
        }
        Ok(res)
    }

    /// Converts the integer into an `i64` if it fits.
    pub fn to_i64(&self) -> Result<i64, Error> {
        if self.0.len() > 8 {
            return Err(Error::overflow("INTEGER does not fit i64"))
        }
        let mut res = if self.is_negative() { -1i64 } else { 0 };
        for &octet in self.0.iter() {
            res = res << 8 | i64::from(octet);
        }
        Ok(res)
    }

    /// Converts the integer into a `u64` if it fits.
    pub fn to_u64(&self) -> Result<u64, Error> {
        if self.is_negative() {
            return Err(
                Error::overflow("negative INTEGER for an unsigned type")
            )
        }
        let slice = if self.0.len() > 1 && self.0[0] == 0 {
            &self.0[1..]
        }
        else {
            self.0.as_ref()
        };
        if slice.len() > 8 {
            return Err(Error::overflow("INTEGER does not fit u64"))
        }
        let mut res = 0u64;
        for &octet in slice {
            res = res << 8 | u64::from(octet);
        }
        Ok(res)
    }
}

/// # Conversions to the Smaller Builtin Types
///
/// Each of these goes through the 64 bit conversion above and then performs
/// a range check.
macro_rules! narrow_impl {
    ( $( ($method:ident, $wide:ident, $type:ident), )* ) => {
        impl Int {
            $(
                pub fn $method(&self) -> Result<$type, Error> {
                    self.$wide()?.try_into().map_err(|_| {
                        Error::overflow(
                            concat!(
                                "INTEGER does not fit ", stringify!($type)
                            )
                        )
                    })
                }
            )*
        }
    }
}

narrow_impl!(
    (to_i8, to_i64, i8),
    (to_i16, to_i64, i16),
    (to_i32, to_i64, i32),
    (to_u8, to_u64, u8),
    (to_u16, to_u64, u16),
    (to_u32, to_u64, u32),
);


//--- Default

impl Default for Int {
    /// Returns zero.
    fn default() -> Self {
        Int(Bytes::from_static(b"\x00"))
    }
}


//--- From

macro_rules! from_signed_impl {
    ( $( $type:ident ),* ) => {
        $(
            impl From<$type> for Int {
                fn from(val: $type) -> Self {
                    Int::from_i128(val.into())
                }
            }
        )*
    }
}

macro_rules! from_unsigned_impl {
    ( $( $type:ident ),* ) => {
        $(
            impl From<$type> for Int {
                fn from(val: $type) -> Self {
                    Int::from_u128(val.into())
                }
            }
        )*
    }
}

from_signed_impl!(i8, i16, i32, i64, i128);
from_unsigned_impl!(u8, u16, u32, u64, u128);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use super::*;

    fn content(val: impl Into<Int>) -> Vec<u8> {
        val.into().content().to_vec()
    }

    #[test]
    fn minimal_content() {
        assert_eq!(content(0i64), b"\x00");
        assert_eq!(content(127i64), b"\x7F");
        assert_eq!(content(128i64), b"\x00\x80");
        assert_eq!(content(-1i64), b"\xFF");
        assert_eq!(content(-128i64), b"\x80");
        assert_eq!(content(-129i64), b"\xFF\x7F");
        assert_eq!(content(256i64), b"\x01\x00");
        assert_eq!(content(0x8000u32), b"\x00\x80\x00");
        assert_eq!(content(u64::MAX), b"\x00\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF");
        assert_eq!(content(i64::MIN), b"\x80\x00\x00\x00\x00\x00\x00\x00");
    }

    #[test]
    fn from_content() {
        assert_eq!(
            Int::from_content(b"\x00\x80").unwrap().to_i64().unwrap(),
            128
        );
        assert_eq!(
            Int::from_content(b"").unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
        assert_eq!(
            Int::from_content(b"\x00\x7F").unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
        assert_eq!(
            Int::from_content(b"\xFF\x80").unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
    }

    #[test]
    fn roundtrip_i64() {
        for val in [
            0i64, 1, -1, 127, 128, -128, -129, 255, 256, 0x7FFF, -0x8000,
            i64::MAX, i64::MIN,
        ] {
            assert_eq!(Int::from(val).to_i64().unwrap(), val);
        }
    }

    #[test]
    fn conversion_overflow() {
        assert_eq!(
            Int::from(i64::MAX).to_i32().unwrap_err().kind(),
            ErrorKind::Overflow
        );
        assert_eq!(
            Int::from(-1i64).to_u64().unwrap_err().kind(),
            ErrorKind::Overflow
        );
        assert_eq!(
            Int::from(256u32).to_u8().unwrap_err().kind(),
            ErrorKind::Overflow
        );
        assert_eq!(
            Int::from(u128::MAX).to_i64().unwrap_err().kind(),
            ErrorKind::Overflow
        );
        assert_eq!(Int::from(u64::MAX).to_u64().unwrap(), u64::MAX);
        assert_eq!(Int::from(255u16).to_u8().unwrap(), 255);
    }

    #[test]
    fn sign_and_zero() {
        assert!(Int::from(0u8).is_zero());
        assert!(!Int::from(1u8).is_zero());
        assert!(Int::from(-5i8).is_negative());
        assert!(!Int::from(5i8).is_negative());
    }

    #[test]
    fn big_values_survive_content() {
        // A 20 octet positive integer round-trips through its content
        // octets even though it fits no builtin type.
        let content = b"\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0A\
                        \x0B\x0C\x0D\x0E\x0F\x10\x11\x12\x13\x14";
        let int = Int::from_content(content).unwrap();
        assert_eq!(int.as_slice(), content);
        assert_eq!(int.to_i128().unwrap_err().kind(), ErrorKind::Overflow);
    }
}
