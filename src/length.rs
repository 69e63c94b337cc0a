//! The length octets.
//!
//! This is a private module. The [`Length`] defined herein is not publicly
//! exposed.

use std::io;
use std::mem::size_of;
use crate::decode::SliceSource;
use crate::error::Error;


//------------ Length --------------------------------------------------------

/// The definite length octets of an encoded value.
///
/// # BER Encoding
///
/// The length can be encoded in one of two basic ways. Which one is used is
/// determined by the most significant bit of the first octet. If it is not
/// set, the remaining bits of this first octet provide the length directly.
///
/// If the most significant bit is set, the remaining bits of the first
/// octet specify the number of octets that follow to encode the actual
/// length as a big-endian unsigned integer. A count of zero would mean the
/// indefinite form, which this crate rejects on input and never produces on
/// output.
///
/// We insist on minimally encoded lengths on both sides: the encoder emits
/// the shortest form and the decoder refuses anything longer. This is what
/// makes re-encoding a decoded value reproduce the input octets exactly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Length(usize);

impl Length {
    /// The largest number of long-form length octets we accept.
    const MAX_LENGTH_OCTETS: usize = 4;

    /// Creates a length from the number of content octets.
    pub fn new(len: usize) -> Self {
        Length(len)
    }

    /// Returns the number of content octets.
    pub fn definite(self) -> usize {
        self.0
    }

    /// Parses a length from a source.
    pub fn take_from(source: &mut SliceSource) -> Result<Self, Error> {
        let pos = source.pos();
        let first = source.take_u8().map_err(|err| err.at(pos))?;
        if first & 0x80 == 0 {
            return Ok(Length(first as usize))
        }
        if first == 0x80 {
            return Err(
                Error::length("indefinite length not supported").at(pos)
            )
        }
        if first == 0xFF {
            return Err(Error::length("reserved length octet").at(pos))
        }
        let count = (first & 0x7F) as usize;
        if count > Self::MAX_LENGTH_OCTETS {
            return Err(
                Error::length(
                    format!("{} length octets exceed the supported 4", count)
                ).at(pos)
            )
        }

        let mut len = 0usize;
        for i in 0..count {
            let octet = source.take_u8().map_err(|_| {
                Error::truncated("incomplete length octets").at(pos)
            })?;
            if i == 0 && octet == 0 {
                // A shorter long form exists.
                return Err(Error::length("non-minimal length").at(pos))
            }
            len = len << 8 | octet as usize;
        }
        if count == 1 && len < 0x80 {
            // The short form would have done.
            return Err(Error::length("non-minimal length").at(pos))
        }
        Ok(Length(len))
    }

    /// Returns the length of the encoded representation of the length.
    pub fn encoded_len(self) -> usize {
        if self.0 < 0x80 {
            1
        }
        else {
            let idx = self.encoded_start_idx();
            size_of::<usize>() - idx + 1
        }
    }

    /// Writes the encoded length to the given target.
    pub fn write_encoded<W: io::Write>(
        self,
        target: &mut W,
    ) -> Result<(), io::Error> {
        if self.0 < 0x80 {
            target.write_all(&[self.0 as u8])
        }
        else {
            let idx = self.encoded_start_idx();
            let count = size_of::<usize>() - idx;
            target.write_all(&[0x80 | count as u8])?;
            target.write_all(&self.0.to_be_bytes()[idx..])
        }
    }

    /// Returns the index of the first non-zero octet of the length value.
    fn encoded_start_idx(self) -> usize {
        (self.0.leading_zeros() / 8) as usize
    }
}


//============ Tests =========================================================
