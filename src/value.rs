//! The ASN.1 value tree.
//!
//! This module provides [`Value`], the closed sum over every kind of node
//! this crate can encode and decode. Primitive nodes wrap their dedicated
//! payload types, [`Structured`] is the ordered container behind SEQUENCE,
//! SET, and every other constructed encoding, [`Choice`] marks a selected
//! CHOICE alternative, and [`Opaque`] carries payloads whose underlying
//! type is not known without a schema.

use std::io;
use bytes::Bytes;
use crate::bitstring::BitString;
use crate::error::Error;
use crate::int::Int;
use crate::length::Length;
use crate::oid::Oid;
use crate::strings;
use crate::tag::{Class, Tag};
use crate::time::Time;


//------------ Value ---------------------------------------------------------

/// A single node of the ASN.1 value tree.
///
/// Values are built by callers – either directly through the constructor
/// functions or by the schema layer – encoded to octets, and discarded.
/// A value owns its children exclusively; accessors hand out clones.
///
/// Encoding is a two-pass affair: [`encoded_len`][Self::encoded_len]
/// computes the size of the final encoding so that the definite length
/// octets can be written before the content without buffering, and
/// [`write_encoded`][Self::write_encoded] produces the octets. The
/// convenience method [`encode`][Self::encode] bundles both.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// A BOOLEAN value.
    Boolean(bool),

    /// An INTEGER value of arbitrary size.
    Integer(Int),

    /// A BIT STRING value.
    BitString(BitString),

    /// An OCTET STRING value.
    OctetString(Bytes),

    /// The NULL value.
    Null,

    /// An OBJECT IDENTIFIER value.
    Oid(Oid),

    /// A UTF8String value.
    Utf8String(String),

    /// A PrintableString value.
    PrintableString(String),

    /// An IA5String value.
    Ia5String(String),

    /// A UTCTime value.
    UtcTime(Time),

    /// A GeneralizedTime value.
    GeneralizedTime(Time),

    /// An ENUMERATED value.
    Enumerated(Enumerated),

    /// A constructed value: SEQUENCE, SET, or any tagged container.
    Structured(Structured),

    /// A selected CHOICE alternative.
    ///
    /// Boxed since the alternative is a single nested value.
    Choice(Box<Choice>),

    /// A payload whose underlying type is unknown.
    ///
    /// The decoder produces these for context-specific, application, and
    /// private class primitives as well as for universal primitives it has
    /// no knowledge of. The schema layer later promotes them once a
    /// descriptor reveals the underlying type.
    Opaque(Opaque),
}

/// # Constructors
///
impl Value {
    /// Creates a BOOLEAN value.
    pub fn boolean(val: bool) -> Self {
        Value::Boolean(val)
    }

    /// Creates an INTEGER value.
    pub fn integer(val: impl Into<Int>) -> Self {
        Value::Integer(val.into())
    }

    /// Creates a BIT STRING value.
    pub fn bit_string(val: BitString) -> Self {
        Value::BitString(val)
    }

    /// Creates an OCTET STRING value.
    pub fn octet_string(val: impl Into<Bytes>) -> Self {
        Value::OctetString(val.into())
    }

    /// Creates the NULL value.
    pub fn null() -> Self {
        Value::Null
    }

    /// Creates an OBJECT IDENTIFIER value.
    pub fn oid(val: Oid) -> Self {
        Value::Oid(val)
    }

    /// Creates an OBJECT IDENTIFIER value from dotted notation.
    pub fn oid_from_dotted_str(s: &str) -> Result<Self, Error> {
        Oid::from_dotted_str(s).map(Value::Oid)
    }

    /// Creates a UTF8String value.
    ///
    /// Infallible: a Rust string is valid UTF-8 by construction.
    pub fn utf8_string(val: impl Into<String>) -> Self {
        Value::Utf8String(val.into())
    }

    /// Creates a PrintableString value, checking the alphabet.
    pub fn printable_string(val: impl Into<String>) -> Result<Self, Error> {
        let val = val.into();
        strings::check_printable(&val)?;
        Ok(Value::PrintableString(val))
    }

    /// Creates an IA5String value, checking for seven bit characters.
    pub fn ia5_string(val: impl Into<String>) -> Result<Self, Error> {
        let val = val.into();
        strings::check_ia5(&val)?;
        Ok(Value::Ia5String(val))
    }

    /// Creates a UTCTime value.
    ///
    /// Fails if the year cannot be expressed in UTCTime's two digits,
    /// i.e., lies outside 1950 through 2049.
    pub fn utc_time(val: Time) -> Result<Self, Error> {
        if !val.fits_utc() {
            return Err(
                Error::validation("year not expressible in UTCTime")
            )
        }
        Ok(Value::UtcTime(val))
    }

    /// Creates a GeneralizedTime value.
    pub fn generalized_time(val: Time) -> Self {
        Value::GeneralizedTime(val)
    }

    /// Creates an ENUMERATED value.
    pub fn enumerated(val: impl Into<Int>) -> Self {
        Value::Enumerated(Enumerated::new(val.into(), None))
    }

    /// Creates an ENUMERATED value with a symbolic name.
    ///
    /// The name aids debugging only and is never encoded.
    pub fn enumerated_named(
        val: impl Into<Int>,
        name: impl Into<String>,
    ) -> Self {
        Value::Enumerated(Enumerated::new(val.into(), Some(name.into())))
    }

    /// Creates a SEQUENCE from its elements.
    pub fn sequence(elements: Vec<Value>) -> Self {
        Value::Structured(Structured::new(Tag::SEQUENCE, elements))
    }

    /// Creates a SET from its elements.
    ///
    /// The elements keep their order; BER does not require sorting.
    pub fn set(elements: Vec<Value>) -> Self {
        Value::Structured(Structured::new(Tag::SET, elements))
    }

    /// Creates a constructed value with the given tag.
    pub fn structured(tag: Tag, elements: Vec<Value>) -> Self {
        Value::Structured(Structured::new(tag, elements))
    }

    /// Creates a CHOICE holding the selected alternative.
    pub fn choice(inner: Value) -> Self {
        Value::Choice(Box::new(Choice::new(inner, None)))
    }

    /// Creates a CHOICE with an identifier naming the alternative.
    ///
    /// The identifier aids construction and debugging only and is never
    /// encoded.
    pub fn choice_with_id(inner: Value, id: impl Into<String>) -> Self {
        Value::Choice(Box::new(Choice::new(inner, Some(id.into()))))
    }

    /// Creates an opaque value from a tag and raw content octets.
    pub fn opaque(tag: Tag, content: impl Into<Bytes>) -> Self {
        Value::Opaque(Opaque::new(tag, content))
    }
}

/// # Introspection
///
impl Value {
    /// Returns the tag of the value.
    ///
    /// A CHOICE reports the tag of its selected alternative since it has
    /// no wire form of its own.
    pub fn tag(&self) -> Tag {
        match *self {
            Value::Boolean(_) => Tag::BOOLEAN,
            Value::Integer(_) => Tag::INTEGER,
            Value::BitString(_) => Tag::BIT_STRING,
            Value::OctetString(_) => Tag::OCTET_STRING,
            Value::Null => Tag::NULL,
            Value::Oid(_) => Tag::OID,
            Value::Utf8String(_) => Tag::UTF8_STRING,
            Value::PrintableString(_) => Tag::PRINTABLE_STRING,
            Value::Ia5String(_) => Tag::IA5_STRING,
            Value::UtcTime(_) => Tag::UTC_TIME,
            Value::GeneralizedTime(_) => Tag::GENERALIZED_TIME,
            Value::Enumerated(_) => Tag::ENUMERATED,
            Value::Structured(ref inner) => inner.tag(),
            Value::Choice(ref inner) => inner.value().tag(),
            Value::Opaque(ref inner) => inner.tag(),
        }
    }

    /// Returns a noun describing the kind of the value.
    ///
    /// Used in error messages.
    pub fn type_name(&self) -> &'static str {
        match *self {
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::BitString(_) => "BIT STRING",
            Value::OctetString(_) => "OCTET STRING",
            Value::Null => "NULL",
            Value::Oid(_) => "OBJECT IDENTIFIER",
            Value::Utf8String(_) => "UTF8String",
            Value::PrintableString(_) => "PrintableString",
            Value::Ia5String(_) => "IA5String",
            Value::UtcTime(_) => "UTCTime",
            Value::GeneralizedTime(_) => "GeneralizedTime",
            Value::Enumerated(_) => "ENUMERATED",
            Value::Structured(_) => "constructed value",
            Value::Choice(_) => "CHOICE",
            Value::Opaque(_) => "opaque value",
        }
    }
}

/// # Encoding
///
impl Value {
    /// Returns the number of content octets of the value.
    pub fn content_len(&self) -> usize {
        match *self {
            Value::Boolean(_) => 1,
            Value::Integer(ref inner) => inner.content_len(),
            Value::BitString(ref inner) => inner.content_len(),
            Value::OctetString(ref inner) => inner.len(),
            Value::Null => 0,
            Value::Oid(ref inner) => inner.content_len(),
            Value::Utf8String(ref inner) => inner.len(),
            Value::PrintableString(ref inner) => inner.len(),
            Value::Ia5String(ref inner) => inner.len(),
            Value::UtcTime(_) => Time::UTC_CONTENT_LEN,
            Value::GeneralizedTime(_) => Time::GENERALIZED_CONTENT_LEN,
            Value::Enumerated(ref inner) => inner.value().content_len(),
            Value::Structured(ref inner) => {
                inner.elements().iter().map(Value::encoded_len).sum()
            }
            Value::Choice(ref inner) => inner.value().content_len(),
            Value::Opaque(ref inner) => inner.content_ref().len(),
        }
    }

    /// Returns the length of the complete encoding of the value.
    pub fn encoded_len(&self) -> usize {
        if let Value::Choice(ref inner) = *self {
            return inner.value().encoded_len()
        }
        let content_len = self.content_len();
        self.tag().encoded_len()
            + Length::new(content_len).encoded_len()
            + content_len
    }

    /// Writes the complete encoding of the value to the given target.
    pub fn write_encoded<W: io::Write>(
        &self,
        target: &mut W,
    ) -> Result<(), io::Error> {
        if let Value::Choice(ref inner) = *self {
            return inner.value().write_encoded(target)
        }
        self.tag().write_encoded(target)?;
        Length::new(self.content_len()).write_encoded(target)?;
        self.write_content(target)
    }

    /// Writes the content octets of the value to the given target.
    pub fn write_content<W: io::Write>(
        &self,
        target: &mut W,
    ) -> Result<(), io::Error> {
        match *self {
            Value::Boolean(true) => target.write_all(&[0xFF]),
            Value::Boolean(false) => target.write_all(&[0x00]),
            Value::Integer(ref inner) => target.write_all(inner.as_slice()),
            Value::BitString(ref inner) => inner.write_content(target),
            Value::OctetString(ref inner) => target.write_all(inner.as_ref()),
            Value::Null => Ok(()),
            Value::Oid(ref inner) => target.write_all(inner.as_slice()),
            Value::Utf8String(ref inner) => {
                target.write_all(inner.as_bytes())
            }
            Value::PrintableString(ref inner) => {
                target.write_all(inner.as_bytes())
            }
            Value::Ia5String(ref inner) => {
                target.write_all(inner.as_bytes())
            }
            Value::UtcTime(inner) => inner.write_utc(target),
            Value::GeneralizedTime(inner) => {
                inner.write_generalized(target)
            }
            Value::Enumerated(ref inner) => {
                target.write_all(inner.value().as_slice())
            }
            Value::Structured(ref inner) => {
                for element in inner.elements() {
                    element.write_encoded(target)?;
                }
                Ok(())
            }
            Value::Choice(ref inner) => inner.value().write_content(target),
            Value::Opaque(ref inner) => {
                target.write_all(inner.content_ref())
            }
        }
    }

    /// Returns the complete encoding of the value.
    pub fn encode(&self) -> Bytes {
        let mut target = Vec::with_capacity(self.encoded_len());
        // Writing to a Vec cannot fail.
        self.write_encoded(&mut target).unwrap();
        target.into()
    }

    /// Returns the content octets of the value.
    ///
    /// This is the encoding with the identifier and length octets
    /// stripped, which is both what an IMPLICIT tag rewrite keeps and
    /// what custom codec hooks exchange.
    pub fn content_to_bytes(&self) -> Bytes {
        match *self {
            Value::OctetString(ref inner) => inner.clone(),
            Value::Integer(ref inner) => inner.content(),
            Value::Oid(ref inner) => inner.content(),
            Value::Opaque(ref inner) => inner.content(),
            Value::Choice(ref inner) => inner.value().content_to_bytes(),
            ref other => {
                let mut target = Vec::with_capacity(other.content_len());
                other.write_content(&mut target).unwrap();
                target.into()
            }
        }
    }
}

/// # Tag Rewriting
///
impl Value {
    /// Rewrites the value for an IMPLICIT context-specific tag.
    ///
    /// The outer tag is replaced by the context-specific tag of the given
    /// number, keeping the constructed bit of the original. A primitive
    /// becomes an [`Opaque`] node carrying the new tag over the old
    /// content octets; a constructed value keeps its children and only has
    /// its tag restamped. A CHOICE has the rewrite applied to its selected
    /// alternative, as it has no tag of its own.
    pub fn with_implicit_tag(self, number: u32) -> Value {
        match self {
            Value::Structured(inner) => {
                Value::Structured(Structured::new(
                    Tag::new(Class::Context, true, number),
                    inner.into_elements(),
                ))
            }
            Value::Choice(inner) => {
                inner.into_value().with_implicit_tag(number)
            }
            Value::Opaque(inner) => {
                let constructed = inner.tag().is_constructed();
                Value::Opaque(Opaque::new(
                    Tag::new(Class::Context, constructed, number),
                    inner.content(),
                ))
            }
            ref primitive => {
                Value::Opaque(Opaque::new(
                    Tag::ctx(number),
                    primitive.content_to_bytes(),
                ))
            }
        }
    }

    /// Wraps the value for an EXPLICIT context-specific tag.
    ///
    /// The result is a constructed value with the context-specific tag of
    /// the given number whose single element is `self`.
    pub fn with_explicit_tag(self, number: u32) -> Value {
        Value::structured(Tag::ctx_constructed(number), vec![self])
    }
}


//--- Default

impl Default for Value {
    /// Returns the NULL value.
    fn default() -> Self {
        Value::Null
    }
}


//------------ Enumerated ----------------------------------------------------

/// The payload of an ENUMERATED value.
///
/// ENUMERATED shares the encoding of INTEGER under its own tag. The
/// optional symbolic name exists for builders and debugging; it is not
/// part of the encoding and does not survive a round trip.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Enumerated {
    /// The numeric value.
    value: Int,

    /// The symbolic name, if the builder provided one.
    name: Option<String>,
}

impl Enumerated {
    /// Creates a new enumerated payload.
    pub fn new(value: Int, name: Option<String>) -> Self {
        Enumerated { value, name }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> &Int {
        &self.value
    }

    /// Returns the symbolic name if there is one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}


//------------ Structured ----------------------------------------------------

/// The payload of a constructed value.
///
/// This is an ordered list of child values under an arbitrary tag:
/// universal SEQUENCE or SET, or any context-specific, application, or
/// private class constructed value. The constructed bit of the tag is
/// forced on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Structured {
    /// The tag of the value.
    tag: Tag,

    /// The child values in encoding order.
    elements: Vec<Value>,
}

impl Structured {
    /// Creates a new constructed payload.
    pub fn new(tag: Tag, elements: Vec<Value>) -> Self {
        Structured { tag: tag.with_constructed(true), elements }
    }

    /// Returns the tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the child values.
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    /// Returns the number of child values.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns whether there are no child values.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Appends a child value.
    pub fn push(&mut self, element: Value) {
        self.elements.push(element)
    }

    /// Converts the payload into its child values.
    pub fn into_elements(self) -> Vec<Value> {
        self.elements
    }
}


//------------ Choice --------------------------------------------------------

/// The payload of a CHOICE marker.
///
/// A CHOICE has no wire form of its own: it encodes exactly as its
/// selected alternative and reports that alternative's tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Choice {
    /// The selected alternative.
    value: Value,

    /// The identifier of the alternative, if the builder provided one.
    id: Option<String>,
}

impl Choice {
    /// Creates a new choice payload.
    pub fn new(value: Value, id: Option<String>) -> Self {
        Choice { value, id }
    }

    /// Returns the selected alternative.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the identifier if there is one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Converts the payload into the selected alternative.
    pub fn into_value(self) -> Value {
        self.value
    }
}


//------------ Opaque --------------------------------------------------------

/// A tagged payload whose underlying type is unknown.
///
/// With IMPLICIT tagging, the wire carries a context-specific tag over the
/// content octets of some universal type – which one, only the schema
/// knows. The decoder therefore keeps such payloads opaque and the schema
/// layer promotes them when a descriptor supplies the missing type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Opaque {
    /// The tag of the value.
    tag: Tag,

    /// The raw content octets.
    content: Bytes,
}

impl Opaque {
    /// Creates a new opaque payload.
    pub fn new(tag: Tag, content: impl Into<Bytes>) -> Self {
        Opaque { tag, content: content.into() }
    }

    /// Returns the tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the content octets.
    pub fn content(&self) -> Bytes {
        self.content.clone()
    }

    /// Returns the content octets as a slice.
    pub fn content_ref(&self) -> &[u8] {
        self.content.as_ref()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use super::*;

    fn encoded(value: &Value) -> Vec<u8> {
        let octets = value.encode();
        assert_eq!(octets.len(), value.encoded_len());
        octets.to_vec()
    }

    #[test]
    fn encode_boolean() {
        assert_eq!(encoded(&Value::boolean(true)), b"\x01\x01\xFF");
        assert_eq!(encoded(&Value::boolean(false)), b"\x01\x01\x00");
    }

    #[test]
    fn encode_integer_edges() {
        assert_eq!(encoded(&Value::integer(0)), b"\x02\x01\x00");
        assert_eq!(encoded(&Value::integer(127)), b"\x02\x01\x7F");
        assert_eq!(encoded(&Value::integer(128)), b"\x02\x02\x00\x80");
        assert_eq!(encoded(&Value::integer(-1)), b"\x02\x01\xFF");
        assert_eq!(encoded(&Value::integer(-128)), b"\x02\x01\x80");
    }

    #[test]
    fn encode_oid() {
        assert_eq!(
            encoded(&Value::oid_from_dotted_str("2.5.4.3").unwrap()),
            b"\x06\x03\x55\x04\x03"
        );
    }

    #[test]
    fn encode_bit_string() {
        assert_eq!(
            encoded(&Value::bit_string(
                BitString::from_bit_str("1010").unwrap()
            )),
            b"\x03\x02\x04\xA0"
        );
    }

    #[test]
    fn encode_null_and_strings() {
        assert_eq!(encoded(&Value::null()), b"\x05\x00");
        assert_eq!(
            encoded(&Value::utf8_string("hi")),
            b"\x0C\x02hi"
        );
        assert_eq!(
            encoded(&Value::printable_string("Test User 1").unwrap()),
            b"\x13\x0BTest User 1"
        );
        assert_eq!(
            encoded(&Value::ia5_string("a@b").unwrap()),
            b"\x16\x03a@b"
        );
        assert_eq!(
            Value::printable_string("no@sign").unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
        assert_eq!(
            Value::ia5_string("caf\u{e9}").unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
    }

    #[test]
    fn encode_sequence() {
        let seq = Value::sequence(vec![
            Value::integer(42),
            Value::boolean(true),
        ]);
        assert_eq!(encoded(&seq), b"\x30\x06\x02\x01\x2A\x01\x01\xFF");
    }

    #[test]
    fn encode_set_keeps_order() {
        let set = Value::set(vec![
            Value::integer(2),
            Value::integer(1),
        ]);
        assert_eq!(encoded(&set), b"\x31\x06\x02\x01\x02\x02\x01\x01");
    }

    #[test]
    fn encode_times() {
        let time = Time::new(2023, 12, 25, 10, 30, 45).unwrap();
        assert_eq!(
            encoded(&Value::utc_time(time).unwrap()),
            b"\x17\x0D231225103045Z"
        );
        assert_eq!(
            encoded(&Value::generalized_time(time)),
            b"\x18\x0F20231225103045Z"
        );
        let far = Time::new(2120, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            Value::utc_time(far).unwrap_err().kind(),
            ErrorKind::ValidationFailure
        );
    }

    #[test]
    fn enumerated_shares_integer_encoding() {
        assert_eq!(encoded(&Value::enumerated(2)), b"\x0A\x01\x02");
        let named = Value::enumerated_named(2, "contractor");
        // The name changes nothing on the wire.
        assert_eq!(encoded(&named), b"\x0A\x01\x02");
    }

    #[test]
    fn choice_is_transparent() {
        let choice = Value::choice_with_id(Value::integer(7), "byNumber");
        assert_eq!(encoded(&choice), encoded(&Value::integer(7)));
        assert_eq!(choice.tag(), Tag::INTEGER);
    }

    #[test]
    fn implicit_tag_rewrite() {
        // [0] IMPLICIT over INTEGER 42.
        let tagged = Value::integer(42).with_implicit_tag(0);
        assert_eq!(encoded(&tagged), b"\x80\x01\x2A");
        assert_eq!(tagged.tag(), Tag::ctx(0));

        // Constructed values keep their children.
        let tagged = Value::sequence(vec![Value::boolean(true)])
            .with_implicit_tag(4);
        assert_eq!(encoded(&tagged), b"\xA4\x03\x01\x01\xFF");

        // A CHOICE rewrites its alternative.
        let tagged = Value::choice(Value::integer(42)).with_implicit_tag(1);
        assert_eq!(encoded(&tagged), b"\x81\x01\x2A");
    }

    #[test]
    fn explicit_tag_wrap() {
        // [0] EXPLICIT over INTEGER 42.
        let tagged = Value::integer(42).with_explicit_tag(0);
        assert_eq!(encoded(&tagged), b"\xA0\x03\x02\x01\x2A");
    }

    #[test]
    fn long_form_length() {
        let value = Value::octet_string(vec![0u8; 200]);
        let octets = encoded(&value);
        assert_eq!(&octets[..3], b"\x04\x81\xC8");
        assert_eq!(octets.len(), 203);
    }

    #[test]
    fn content_extraction() {
        assert_eq!(
            Value::integer(128).content_to_bytes().as_ref(),
            b"\x00\x80"
        );
        assert_eq!(
            Value::sequence(vec![Value::integer(42)])
                .content_to_bytes().as_ref(),
            b"\x02\x01\x2A"
        );
        assert_eq!(
            Value::boolean(true).content_to_bytes().as_ref(),
            b"\xFF"
        );
    }
}
