//! BER encoded bit strings.
//!
//! This is a private module. Its public items are re-exported by the parent.

use bytes::Bytes;
use crate::error::Error;


//------------ BitString -----------------------------------------------------

/// An ASN.1 BIT STRING.
///
/// A bit string is a sequence of bits with the most significant bit of the
/// first octet carrying bit 0. Since the length of the sequence does not
/// need to be divisible by eight, the value keeps the number of _unused
/// bits_ at the end of the last octet alongside the bit data.
///
/// The invariants of the encoding hold for every constructed value: the
/// unused count is between 0 and 7 and can only be non-zero if there is at
/// least one data octet.
///
/// In the content octets, the unused count is prepended to the bit data as
/// a single octet.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct BitString {
    /// The number of unused bits in the last octet.
    unused: u8,

    /// The bit data.
    data: Bytes,
}

impl BitString {
    /// Creates a bit string from data octets and an unused bit count.
    pub fn new(data: impl Into<Bytes>, unused: u8) -> Result<Self, Error> {
        let data = data.into();
        if unused > 7 {
            return Err(
                Error::validation("unused bits must be between 0 and 7")
            )
        }
        if unused > 0 && data.is_empty() {
            return Err(Error::validation(
                "unused bits require at least one data octet"
            ))
        }
        Ok(BitString { unused, data })
    }

    /// Creates a bit string from a literal of `'0'` and `'1'` characters.
    pub fn from_bit_str(bits: &str) -> Result<Self, Error> {
        let mut data = vec![0u8; (bits.len() + 7) / 8];
        for (i, ch) in bits.chars().enumerate() {
            match ch {
                '1' => data[i / 8] |= 1 << (7 - (i % 8)),
                '0' => { }
                _ => {
                    return Err(Error::validation(
                        format!("invalid bit character {:?}", ch)
                    ))
                }
            }
        }
        let unused = (8 - bits.len() % 8) % 8;
        Ok(BitString { unused: unused as u8, data: data.into() })
    }

    /// Creates a bit string from its content octets.
    pub fn from_content(content: &[u8]) -> Result<Self, Error> {
        let (&unused, data) = content.split_first().ok_or_else(|| {
            Error::validation("empty BIT STRING content")
        })?;
        Self::new(Bytes::copy_from_slice(data), unused)
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the bit data.
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }

    /// Returns the number of bits in the bit string.
    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - self.unused as usize
    }

    /// Returns the bit at the given index.
    ///
    /// Bits are numbered from the front, most significant bit of each
    /// octet first. Indexes at or past [`bit_len`][Self::bit_len] are
    /// simply unset.
    pub fn bit(&self, index: usize) -> bool {
        if index >= self.bit_len() {
            return false
        }
        self.data[index / 8] & (1 << (7 - (index % 8))) != 0
    }

    /// Returns the bit string as a literal of `'0'` and `'1'` characters.
    pub fn to_bit_string(&self) -> String {
        (0..self.bit_len()).map(|i| {
            if self.bit(i) { '1' } else { '0' }
        }).collect()
    }

    /// Returns the number of content octets.
    pub fn content_len(&self) -> usize {
        self.data.len() + 1
    }

    /// Writes the content octets to the given target.
    pub fn write_content<W: std::io::Write>(
        &self,
        target: &mut W,
    ) -> Result<(), std::io::Error> {
        target.write_all(&[self.unused])?;
        target.write_all(self.data.as_ref())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use super::*;

    #[test]
    fn invariants() {
        assert_eq!(
            BitString::new(Bytes::new(), 8).unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
        assert_eq!(
            BitString::new(Bytes::new(), 1).unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
        assert!(BitString::new(Bytes::new(), 0).is_ok());
    }

    #[test]
    fn bit_literal() {
        let bits = BitString::from_bit_str("1010").unwrap();
        assert_eq!(bits.unused(), 4);
        assert_eq!(bits.data().as_ref(), b"\xA0");
        assert_eq!(bits.bit_len(), 4);
        assert_eq!(bits.to_bit_string(), "1010");
        assert!(bits.bit(0));
        assert!(!bits.bit(1));
        assert!(bits.bit(2));
        assert!(!bits.bit(3));
        // Past the end.
        assert!(!bits.bit(4));
        assert!(!bits.bit(100));

        assert_eq!(
            BitString::from_bit_str("10x1").unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );

        let empty = BitString::from_bit_str("").unwrap();
        assert_eq!(empty.bit_len(), 0);
        assert_eq!(empty.to_bit_string(), "");
    }

    #[test]
    fn content() {
        let bits = BitString::from_bit_str("1010").unwrap();
        let mut content = Vec::new();
        bits.write_content(&mut content).unwrap();
        assert_eq!(content, b"\x04\xA0");
        assert_eq!(content.len(), bits.content_len());
        assert_eq!(BitString::from_content(&content).unwrap(), bits);

        assert_eq!(
            BitString::from_content(b"").unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
        assert_eq!(
            BitString::from_content(b"\x08\xA0").unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
        assert_eq!(
            BitString::from_content(b"\x01").unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
        assert_eq!(BitString::from_content(b"\x00").unwrap().bit_len(), 0);
    }

    #[test]
    fn nine_bits() {
        let bits = BitString::from_bit_str("101100111").unwrap();
        assert_eq!(bits.unused(), 7);
        assert_eq!(bits.data().as_ref(), b"\xB3\x80");
        assert_eq!(bits.to_bit_string(), "101100111");
    }
}
