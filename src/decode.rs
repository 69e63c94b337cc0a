//! Parsing BER-encoded data.
//!
//! The decoder works on whole buffers: [`decode_first`] parses one value
//! off the front of its input and reports how many octets it consumed,
//! [`decode_all`] parses values until the input is exhausted. Both
//! materialize the complete [`Value`] tree.
//!
//! Values in constructed encoding have their content parsed recursively,
//! depth-first, up to a fixed nesting limit that guards against stack
//! exhaustion on hostile input. Primitive values whose universal tag the
//! decoder knows are promoted into their typed nodes with full content
//! validation; primitives of the other classes stay
//! [`Opaque`][crate::value::Opaque], since with IMPLICIT tagging only a
//! schema can know the underlying type.
//!
//! The decoder accepts exactly the encodings the encoder produces:
//! definite lengths only, in minimal form, minimal identifier octets, and
//! minimal INTEGER content. Re-encoding a decoded value therefore always
//! reproduces the input octets.

use bytes::Bytes;
use crate::bitstring::BitString;
use crate::error::Error;
use crate::int::Int;
use crate::length::Length;
use crate::oid::Oid;
use crate::strings;
use crate::tag::Tag;
use crate::time::Time;
use crate::value::{Enumerated, Structured, Value};


/// The maximum nesting depth of constructed values.
const DEPTH_LIMIT: usize = 64;


//------------ SliceSource ---------------------------------------------------

/// A position-tracking reader over an octet slice.
///
/// The position is kept relative to the buffer handed to the outermost
/// decoding call even when the decoder descends into the content of a
/// constructed value, so that errors can report a meaningful offset.
#[derive(Clone, Debug)]
pub struct SliceSource<'a> {
    /// The unread remainder of the input.
    data: &'a [u8],

    /// The position of the next octet within the overall input.
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a new source reading from the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        SliceSource { data, pos: 0 }
    }

    /// Creates a new source with the given explicit start position.
    pub fn with_pos(data: &'a [u8], pos: usize) -> Self {
        SliceSource { data, pos }
    }

    /// Returns the position of the next octet.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the unread remainder of the input.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }

    /// Takes the next octet off the source.
    pub(crate) fn take_u8(&mut self) -> Result<u8, Error> {
        match self.data.split_first() {
            Some((&octet, tail)) => {
                self.data = tail;
                self.pos += 1;
                Ok(octet)
            }
            None => Err(Error::truncated("unexpected end of data"))
        }
    }

    /// Takes the next `len` octets off the source.
    pub(crate) fn take_slice(
        &mut self,
        len: usize,
    ) -> Result<&'a [u8], Error> {
        if len > self.data.len() {
            return Err(Error::truncated("unexpected end of data"))
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        self.pos += len;
        Ok(head)
    }
}


//------------ Public Functions ----------------------------------------------

/// Decodes the first value off the front of `data`.
///
/// Returns the value and the number of octets it occupied. Octets after
/// the value are left untouched.
pub fn decode_first(data: &[u8]) -> Result<(Value, usize), Error> {
    let mut source = SliceSource::new(data);
    let value = take_value_from(&mut source, 0)?;
    Ok((value, source.pos()))
}

/// Decodes all values contained in `data`.
///
/// The input must be a plain concatenation of encoded values. An empty
/// input yields an empty list.
pub fn decode_all(data: &[u8]) -> Result<Vec<Value>, Error> {
    let mut source = SliceSource::new(data);
    let mut res = Vec::new();
    while !source.remaining().is_empty() {
        res.push(take_value_from(&mut source, 0)?);
    }
    Ok(res)
}


//------------ Internal Machinery --------------------------------------------

/// Takes a single value from the source.
fn take_value_from(
    source: &mut SliceSource,
    depth: usize,
) -> Result<Value, Error> {
    if depth >= DEPTH_LIMIT {
        return Err(
            Error::depth("constructed values nested too deeply")
                .at(source.pos())
        )
    }
    let tag = Tag::take_from(source)?;
    let length_pos = source.pos();
    let length = Length::take_from(source)?.definite();
    let content_pos = source.pos();
    let content = source.take_slice(length).map_err(|_| {
        Error::length("length exceeds remaining input").at(length_pos)
    })?;

    if tag.is_constructed() {
        let mut inner = SliceSource::with_pos(content, content_pos);
        let mut elements = Vec::new();
        while !inner.remaining().is_empty() {
            elements.push(take_value_from(&mut inner, depth + 1)?);
        }
        Ok(Value::Structured(Structured::new(tag, elements)))
    }
    else {
        promote(tag, content).map_err(|err| err.at(content_pos))
    }
}

/// Promotes a primitive into its typed node where the tag allows it.
///
/// Universal tags the crate knows produce typed nodes with their content
/// checked; everything else is kept opaque for a schema to interpret.
fn promote(tag: Tag, content: &[u8]) -> Result<Value, Error> {
    if !tag.is_universal() {
        return Ok(Value::opaque(tag, Bytes::copy_from_slice(content)))
    }
    match tag {
        Tag::BOOLEAN => {
            match content {
                [0x00] => Ok(Value::Boolean(false)),
                [0xFF] => Ok(Value::Boolean(true)),
                [_] => Err(Error::validation(
                    "BOOLEAN content must be 0x00 or 0xFF"
                )),
                _ => Err(Error::validation(
                    "BOOLEAN content must be a single octet"
                )),
            }
        }
        Tag::INTEGER => {
            Int::from_content(content).map(Value::Integer)
        }
        Tag::BIT_STRING => {
            BitString::from_content(content).map(Value::BitString)
        }
        Tag::OCTET_STRING => {
            Ok(Value::OctetString(Bytes::copy_from_slice(content)))
        }
        Tag::NULL => {
            if content.is_empty() {
                Ok(Value::Null)
            }
            else {
                Err(Error::validation("NULL content must be empty"))
            }
        }
        Tag::OID => {
            Oid::from_content(content).map(Value::Oid)
        }
        Tag::ENUMERATED => {
            Int::from_content(content).map(|value| {
                Value::Enumerated(Enumerated::new(value, None))
            })
        }
        Tag::UTF8_STRING => {
            decode_utf8(content).map(Value::Utf8String)
        }
        Tag::PRINTABLE_STRING => {
            let res = decode_utf8(content)?;
            strings::check_printable(&res)?;
            Ok(Value::PrintableString(res))
        }
        Tag::IA5_STRING => {
            let res = decode_utf8(content)?;
            strings::check_ia5(&res)?;
            Ok(Value::Ia5String(res))
        }
        Tag::UTC_TIME => {
            Time::parse_utc(content).map(Value::UtcTime)
        }
        Tag::GENERALIZED_TIME => {
            Time::parse_generalized(content).map(Value::GeneralizedTime)
        }
        _ => Ok(Value::opaque(tag, Bytes::copy_from_slice(content)))
    }
}

/// Decodes content octets into a string.
fn decode_utf8(content: &[u8]) -> Result<String, Error> {
    std::str::from_utf8(content).map(String::from).map_err(|_| {
        Error::validation("invalid UTF-8 in string content")
    })
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use super::*;

    fn first(data: &[u8]) -> Value {
        let (value, consumed) = decode_first(data).unwrap();
        assert_eq!(consumed, data.len());
        value
    }

    fn first_err(data: &[u8]) -> ErrorKind {
        decode_first(data).unwrap_err().kind()
    }

    #[test]
    fn decode_primitives() {
        assert_eq!(first(b"\x01\x01\x00"), Value::Boolean(false));
        assert_eq!(first(b"\x01\x01\xFF"), Value::Boolean(true));
        assert_eq!(first(b"\x02\x01\x2A"), Value::integer(42));
        assert_eq!(first(b"\x02\x02\x00\x80"), Value::integer(128));
        assert_eq!(first(b"\x05\x00"), Value::Null);
        assert_eq!(first(b"\x0C\x02hi"), Value::utf8_string("hi"));
        assert_eq!(
            first(b"\x06\x03\x55\x04\x03"),
            Value::oid_from_dotted_str("2.5.4.3").unwrap()
        );
    }

    #[test]
    fn decode_oid_arcs() {
        match first(b"\x06\x03\x55\x04\x03") {
            Value::Oid(oid) => assert_eq!(oid.arcs(), [2, 5, 4, 3]),
            other => panic!("expected OID, got {:?}", other),
        }
    }

    #[test]
    fn decode_bit_string_literal() {
        match first(b"\x03\x02\x04\xA0") {
            Value::BitString(bits) => {
                assert_eq!(bits.to_bit_string(), "1010")
            }
            other => panic!("expected BIT STRING, got {:?}", other),
        }
    }

    #[test]
    fn decode_sequence() {
        let value = first(b"\x30\x06\x02\x01\x2A\x01\x01\xFF");
        assert_eq!(
            value,
            Value::sequence(vec![Value::integer(42), Value::boolean(true)])
        );
    }

    #[test]
    fn decode_utc_time() {
        match first(b"\x17\x0D231225103045Z") {
            Value::UtcTime(time) => {
                assert_eq!(time.year(), 2023);
                assert_eq!(time.month(), 12);
                assert_eq!(time.day(), 25);
                assert_eq!(time.hour(), 10);
                assert_eq!(time.minute(), 30);
                assert_eq!(time.second(), 45);
            }
            other => panic!("expected UTCTime, got {:?}", other),
        }
    }

    #[test]
    fn context_primitives_stay_opaque() {
        let value = first(b"\x80\x01\x2A");
        assert_eq!(value, Value::opaque(Tag::ctx(0), b"\x2A".as_ref()));
    }

    #[test]
    fn context_constructed_becomes_structured() {
        let value = first(b"\xA0\x03\x02\x01\x2A");
        assert_eq!(
            value,
            Value::structured(Tag::ctx_constructed(0), vec![
                Value::integer(42)
            ])
        );
    }

    #[test]
    fn unknown_universal_primitive_stays_opaque() {
        let value = first(b"\x07\x01\xAB");
        assert_eq!(
            value,
            Value::opaque(Tag::universal(7), b"\xAB".as_ref())
        );
    }

    #[test]
    fn decode_first_leaves_trailing_octets() {
        let (value, consumed) = decode_first(
            b"\x02\x01\x07\x01\x01\xFF"
        ).unwrap();
        assert_eq!(value, Value::integer(7));
        assert_eq!(consumed, 3);
    }

    #[test]
    fn decode_all_collects_everything() {
        let values = decode_all(b"\x02\x01\x07\x01\x01\xFF").unwrap();
        assert_eq!(
            values,
            [Value::integer(7), Value::boolean(true)]
        );
        assert!(decode_all(b"").unwrap().is_empty());
    }

    #[test]
    fn reencode_identity() {
        // Everything the decoder accepts re-encodes to the input octets.
        for input in [
            b"\x01\x01\xFF".as_ref(),
            b"\x02\x01\x00",
            b"\x02\x02\x00\x80",
            b"\x03\x02\x04\xA0",
            b"\x04\x03\x01\x02\x03",
            b"\x05\x00",
            b"\x06\x03\x55\x04\x03",
            b"\x0A\x01\x02",
            b"\x0C\x02hi",
            b"\x17\x0D231225103045Z",
            b"\x18\x0F20231225103045Z",
            b"\x30\x06\x02\x01\x2A\x01\x01\xFF",
            b"\x80\x01\x2A",
            b"\xA0\x03\x02\x01\x2A",
            b"\x5f\x81\x01\x01\x00",
        ] {
            let (value, consumed) = decode_first(input).unwrap();
            assert_eq!(consumed, input.len());
            assert_eq!(value.encode(), input, "re-encode of {:?}", input);
        }
    }

    #[test]
    fn malformed_input() {
        assert_eq!(first_err(b""), ErrorKind::TruncatedInput);
        assert_eq!(first_err(b"\x02"), ErrorKind::TruncatedInput);
        assert_eq!(first_err(b"\x02\x05\x01"), ErrorKind::MalformedLength);
        assert_eq!(first_err(b"\x30\x80"), ErrorKind::MalformedLength);
        assert_eq!(first_err(b"\x02\x81\x01\x00"), ErrorKind::MalformedLength);
        assert_eq!(first_err(b"\x02\x00"), ErrorKind::ValidationFailure);
        assert_eq!(
            first_err(b"\x02\x02\x00\x01"),
            ErrorKind::ValidationFailure
        );
        assert_eq!(first_err(b"\x01\x01\x01"), ErrorKind::ValidationFailure);
        assert_eq!(
            first_err(b"\x01\x02\x00\x00"),
            ErrorKind::ValidationFailure
        );
        assert_eq!(first_err(b"\x05\x01\x00"), ErrorKind::ValidationFailure);
        assert_eq!(
            first_err(b"\x0C\x02\xFF\xFE"),
            ErrorKind::ValidationFailure
        );
        assert_eq!(
            first_err(b"\x13\x01\x40"),
            ErrorKind::ValidationFailure
        );
        assert_eq!(
            first_err(b"\x16\x02\xC3\xA9"),
            ErrorKind::ValidationFailure
        );
        assert_eq!(
            first_err(b"\x17\x041234"),
            ErrorKind::ValidationFailure
        );
        // An inner length pointing past the end of the outer value.
        assert_eq!(first_err(b"\x30\x02\x02\x05"), ErrorKind::MalformedLength);
    }

    #[test]
    fn error_positions() {
        // The offending BOOLEAN content octet sits at offset 7.
        let err = decode_first(
            b"\x30\x06\x02\x01\x2A\x01\x01\x05"
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        assert_eq!(err.pos(), Some(7));
    }

    #[test]
    fn depth_limit() {
        // 64 nested SEQUENCEs around an INTEGER are too deep, 63 are fine.
        fn nested(depth: usize) -> Vec<u8> {
            let mut value = Value::integer(1);
            for _ in 0..depth {
                value = Value::sequence(vec![value]);
            }
            value.encode().to_vec()
        }
        assert!(decode_first(&nested(63)).is_ok());
        assert_eq!(
            decode_first(&nested(64)).unwrap_err().kind(),
            ErrorKind::DepthExceeded
        );
    }
}
