//! The binding between host fields and value nodes.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use bytes::Bytes;
use crate::bitstring::BitString;
use crate::error::Error;
use crate::int::Int;
use crate::oid::Oid;
use crate::strings;
use crate::tag::Tag;
use crate::time::Time;
use crate::value::Value;
use super::descriptor::{Descriptor, FieldType};


//------------ AsnField ------------------------------------------------------

/// A type that can live in a field of a bound record.
///
/// The marshaler talks to record fields exclusively through this trait:
/// it probes for absence and emptiness, converts the field into a value
/// node according to the field's descriptor, and fills the field back in
/// from a decoded node.
///
/// Implementations exist for the builtin scalars, `String`, `Bytes`,
/// [`Int`], [`BitString`], [`Time`], [`Value`] (an open CHOICE container),
/// `Option<T>`, `Box<T>`, and `Vec<T>` (SEQUENCE OF). Records generated
/// by [`asn_record!`][crate::asn_record] implement it too, so records
/// nest, and [`octets_codec!`][crate::octets_codec] derives it for types
/// with their own wire representation.
///
/// When filling a field in, implementations accept both the typed node the
/// decoder promotes for universal tags and an [`Opaque`][crate::value::Opaque]
/// node carrying the matching universal tag over raw content octets. The
/// latter is how IMPLICIT tag restoration hands over context-specific
/// payloads: promotion is deferred to this point, where the descriptor is
/// known.
pub trait AsnField {
    /// Returns whether the field is absent.
    ///
    /// Only unset `Option`s are absent. Absence of a required field is an
    /// error; absence of an optional one omits the field from the
    /// encoding.
    fn is_absent(&self) -> bool {
        false
    }

    /// Returns whether the field holds its type's empty value.
    ///
    /// Empty fields are dropped from the encoding when their descriptor
    /// says `omitempty`.
    fn is_empty(&self) -> bool {
        false
    }

    /// Builds the value node for this field.
    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error>;

    /// Fills the field from a decoded node.
    fn assign(&mut self, value: &Value, descr: &Descriptor)
        -> Result<(), Error>;

    /// Resets the field after its optional value turned out absent.
    fn clear(&mut self) { }
}


/// Checks a declared field type against what the host type supports.
fn check_type(
    descr: &Descriptor,
    allowed: &[FieldType],
    host: &'static str,
) -> Result<(), Error> {
    match descr.field_type() {
        None => Ok(()),
        Some(field_type) if allowed.contains(&field_type) => Ok(()),
        Some(field_type) => {
            Err(Error::mismatch(format!(
                "a {} field cannot be declared {}", host, field_type
            )))
        }
    }
}

/// Builds the error for a node of the wrong kind.
fn wrong_node(expected: &'static str, found: &Value) -> Error {
    Error::mismatch(
        format!("expected {}, found {}", expected, found.type_name())
    )
}


//--- impl for bool

impl AsnField for bool {
    fn is_empty(&self) -> bool {
        !*self
    }

    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        check_type(descr, &[FieldType::Boolean], "bool")?;
        Ok(Value::boolean(*self))
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        check_type(descr, &[FieldType::Boolean], "bool")?;
        match *value {
            Value::Boolean(val) => {
                *self = val;
                Ok(())
            }
            Value::Opaque(ref inner)
                if inner.tag().matches(Tag::BOOLEAN) =>
            {
                match inner.content_ref() {
                    [0x00] => { *self = false; Ok(()) }
                    [0xFF] => { *self = true; Ok(()) }
                    _ => Err(Error::validation(
                        "BOOLEAN content must be 0x00 or 0xFF"
                    )),
                }
            }
            ref other => Err(wrong_node("BOOLEAN", other)),
        }
    }
}


//--- impls for the builtin integers

/// Pulls an [`Int`] out of a node, parsing implicit payloads.
fn int_from_node(value: &Value) -> Result<Int, Error> {
    match *value {
        Value::Integer(ref inner) => Ok(inner.clone()),
        Value::Opaque(ref inner) if inner.tag().matches(Tag::INTEGER) => {
            Int::from_content(inner.content_ref())
        }
        ref other => Err(wrong_node("INTEGER", other)),
    }
}

macro_rules! builtin_int_impl {
    ( $( ($type:ident, $to:ident), )* ) => {
        $(
            impl AsnField for $type {
                fn is_empty(&self) -> bool {
                    *self == 0
                }

                fn to_value(
                    &self, descr: &Descriptor,
                ) -> Result<Value, Error> {
                    check_type(
                        descr, &[FieldType::Integer], stringify!($type)
                    )?;
                    Ok(Value::integer(*self))
                }

                fn assign(
                    &mut self, value: &Value, descr: &Descriptor,
                ) -> Result<(), Error> {
                    check_type(
                        descr, &[FieldType::Integer], stringify!($type)
                    )?;
                    *self = int_from_node(value)?.$to()?;
                    Ok(())
                }
            }
        )*
    }
}

// Note that `u8` makes `Vec<u8>` a SEQUENCE OF INTEGER; octet string
// fields are `Bytes`.
builtin_int_impl!(
    (i8, to_i8),
    (i16, to_i16),
    (i32, to_i32),
    (i64, to_i64),
    (u8, to_u8),
    (u16, to_u16),
    (u32, to_u32),
    (u64, to_u64),
);


//--- impl for Int

impl AsnField for Int {
    fn is_empty(&self) -> bool {
        self.is_zero()
    }

    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        check_type(descr, &[FieldType::Integer], "Int")?;
        Ok(Value::Integer(self.clone()))
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        check_type(descr, &[FieldType::Integer], "Int")?;
        *self = int_from_node(value)?;
        Ok(())
    }
}


//--- impl for String

const STRING_TYPES: &[FieldType] = &[
    FieldType::Utf8String, FieldType::PrintableString, FieldType::Ia5String,
];

impl AsnField for String {
    fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        check_type(descr, STRING_TYPES, "string")?;
        match descr.field_type() {
            None | Some(FieldType::Utf8String) => {
                Ok(Value::utf8_string(self.clone()))
            }
            Some(FieldType::PrintableString) => {
                Value::printable_string(self.clone())
            }
            // check_type left only Ia5String.
            _ => Value::ia5_string(self.clone()),
        }
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        check_type(descr, STRING_TYPES, "string")?;
        match *value {
            Value::Utf8String(ref val)
            | Value::PrintableString(ref val)
            | Value::Ia5String(ref val) => {
                *self = val.clone();
                Ok(())
            }
            Value::Opaque(ref inner) if inner.tag().is_universal() => {
                let val = std::str::from_utf8(
                    inner.content_ref()
                ).map_err(|_| {
                    Error::validation("invalid UTF-8 in string content")
                })?;
                if inner.tag().matches(Tag::PRINTABLE_STRING) {
                    strings::check_printable(val)?;
                }
                else if inner.tag().matches(Tag::IA5_STRING) {
                    strings::check_ia5(val)?;
                }
                else if !inner.tag().matches(Tag::UTF8_STRING) {
                    return Err(wrong_node("a string", value))
                }
                *self = val.into();
                Ok(())
            }
            ref other => Err(wrong_node("a string", other)),
        }
    }

    fn clear(&mut self) {
        String::clear(self)
    }
}


//--- impl for Bytes

impl AsnField for Bytes {
    fn is_empty(&self) -> bool {
        self.as_ref().is_empty()
    }

    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        check_type(descr, &[FieldType::OctetString], "Bytes")?;
        Ok(Value::octet_string(self.clone()))
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        check_type(descr, &[FieldType::OctetString], "Bytes")?;
        match *value {
            Value::OctetString(ref val) => {
                *self = val.clone();
                Ok(())
            }
            Value::Opaque(ref inner)
                if inner.tag().matches(Tag::OCTET_STRING) =>
            {
                *self = inner.content();
                Ok(())
            }
            ref other => Err(wrong_node("OCTET STRING", other)),
        }
    }

    fn clear(&mut self) {
        *self = Bytes::new()
    }
}


//--- impl for BitString

impl AsnField for BitString {
    fn is_empty(&self) -> bool {
        self.bit_len() == 0
    }

    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        check_type(descr, &[FieldType::BitString], "BitString")?;
        Ok(Value::BitString(self.clone()))
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        check_type(descr, &[FieldType::BitString], "BitString")?;
        match *value {
            Value::BitString(ref val) => {
                *self = val.clone();
                Ok(())
            }
            Value::Opaque(ref inner)
                if inner.tag().matches(Tag::BIT_STRING) =>
            {
                *self = BitString::from_content(inner.content_ref())?;
                Ok(())
            }
            ref other => Err(wrong_node("BIT STRING", other)),
        }
    }
}


//--- impl for Time

const TIME_TYPES: &[FieldType] = &[
    FieldType::UtcTime, FieldType::GeneralizedTime,
];

impl AsnField for Time {
    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        check_type(descr, TIME_TYPES, "Time")?;
        match descr.field_type() {
            Some(FieldType::GeneralizedTime) => {
                Ok(Value::generalized_time(*self))
            }
            _ => Value::utc_time(*self),
        }
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        check_type(descr, TIME_TYPES, "Time")?;
        match *value {
            Value::UtcTime(val) | Value::GeneralizedTime(val) => {
                *self = val;
                Ok(())
            }
            Value::Opaque(ref inner)
                if inner.tag().matches(Tag::UTC_TIME) =>
            {
                *self = Time::parse_utc(inner.content_ref())?;
                Ok(())
            }
            Value::Opaque(ref inner)
                if inner.tag().matches(Tag::GENERALIZED_TIME) =>
            {
                *self = Time::parse_generalized(inner.content_ref())?;
                Ok(())
            }
            ref other => Err(wrong_node("a time value", other)),
        }
    }
}


//--- impl for Oid

impl AsnField for Oid {
    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        // There is no descriptor type for object identifiers; they bind
        // through inference only.
        check_type(descr, &[], "Oid")?;
        Ok(Value::Oid(self.clone()))
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        check_type(descr, &[], "Oid")?;
        match *value {
            Value::Oid(ref val) => {
                *self = val.clone();
                Ok(())
            }
            Value::Opaque(ref inner) if inner.tag().matches(Tag::OID) => {
                *self = Oid::from_content(inner.content_ref())?;
                Ok(())
            }
            ref other => Err(wrong_node("OBJECT IDENTIFIER", other)),
        }
    }
}


//--- impl for Value: the open CHOICE container

impl AsnField for Value {
    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        check_type(descr, &[FieldType::Choice], "Value")?;
        Ok(self.clone())
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        check_type(descr, &[FieldType::Choice], "Value")?;
        *self = value.clone();
        Ok(())
    }
}


//--- impl for Option

impl<T: AsnField + Default> AsnField for Option<T> {
    fn is_absent(&self) -> bool {
        self.is_none()
    }

    fn is_empty(&self) -> bool {
        self.is_none()
    }

    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        match *self {
            Some(ref inner) => inner.to_value(descr),
            None => Err(Error::missing("value absent")),
        }
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        self.get_or_insert_with(T::default).assign(value, descr)
    }

    fn clear(&mut self) {
        *self = None;
    }
}


//--- impl for Box

impl<T: AsnField> AsnField for Box<T> {
    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        (**self).to_value(descr)
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        (**self).assign(value, descr)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}


//--- impl for Vec: SEQUENCE OF

impl<T: AsnField + Default> AsnField for Vec<T> {
    fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    fn to_value(&self, descr: &Descriptor) -> Result<Value, Error> {
        check_type(descr, &[FieldType::Sequence], "Vec")?;
        let elem_descr = Descriptor::auto();
        let mut elements = Vec::with_capacity(self.len());
        for item in self {
            elements.push(item.to_value(&elem_descr)?);
        }
        Ok(Value::sequence(elements))
    }

    fn assign(
        &mut self, value: &Value, descr: &Descriptor,
    ) -> Result<(), Error> {
        check_type(descr, &[FieldType::Sequence], "Vec")?;
        let structured = match *value {
            Value::Structured(ref inner) => inner,
            ref other => return Err(wrong_node("SEQUENCE", other)),
        };
        let elem_descr = Descriptor::auto();
        let mut res = Vec::with_capacity(structured.len());
        for element in structured.elements() {
            let mut item = T::default();
            item.assign(element, &elem_descr)?;
            res.push(item);
        }
        *self = res;
        Ok(())
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }
}


//------------ Custom codec hooks --------------------------------------------

/// A type producing its own raw value octets.
///
/// The octets are the content of the value only, without identifier and
/// length octets; the library wraps them in the tag the field's
/// descriptor declares (and in any context-specific tag on top). Hook
/// failures should be reported via [`Error::custom`], which the library
/// passes through unchanged.
pub trait ToOctets {
    fn to_octets(&self) -> Result<Vec<u8>, Error>;
}

/// A type consuming its own raw value octets.
///
/// The counterpart of [`ToOctets`]: receives the content octets of the
/// decoded value with all tagging already removed.
pub trait FromOctets: Sized {
    fn from_octets(octets: &[u8]) -> Result<Self, Error>;
}

/// Builds the value node of a custom codec field.
///
/// The octets the hook produced become the content of a node of the
/// declared type without running that type's validator – the hook owns
/// the content. With no declared type, OCTET STRING it is.
pub fn octets_to_value<T: ToOctets>(
    host: &T,
    descr: &Descriptor,
) -> Result<Value, Error> {
    let octets = host.to_octets()?;
    let tag = match descr.field_type() {
        Some(field_type) => field_type.universal_tag(),
        None => Tag::OCTET_STRING,
    };
    Ok(Value::opaque(tag, octets))
}

/// Fills a custom codec field from a decoded node.
///
/// The hook receives the raw content octets of whatever node arrived,
/// without re-encoding the outer identifier and length octets.
pub fn octets_assign<T: FromOctets>(
    host: &mut T,
    value: &Value,
    _descr: &Descriptor,
) -> Result<(), Error> {
    *host = T::from_octets(value.content_to_bytes().as_ref())?;
    Ok(())
}
