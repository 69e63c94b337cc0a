//! Filling records from decoded value trees.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use crate::decode::decode_first;
use crate::error::Error;
use crate::tag::Tag;
use crate::value::{Structured, Value};
use super::descriptor::{Descriptor, FieldType};
use super::record::AsnRecord;


/// Decodes `data` into an existing record.
///
/// The first value in `data` is decoded and consumed into the record's
/// fields in declaration order; octets after it are ignored. On failure
/// the record may have been partially overwritten and should be treated
/// as indeterminate.
pub fn unmarshal<T: AsnRecord>(
    data: &[u8],
    target: &mut T,
) -> Result<(), Error> {
    let (value, _) = decode_first(data)?;
    record_assign(target, &value, &Descriptor::auto())
}

/// Decodes `data` into a fresh record.
pub fn from_ber<T: AsnRecord + Default>(data: &[u8]) -> Result<T, Error> {
    let mut res = T::default();
    unmarshal(data, &mut res)?;
    Ok(res)
}

/// Fills a record from a decoded value under the given descriptor.
pub fn record_assign<T: AsnRecord>(
    record: &mut T,
    value: &Value,
    descr: &Descriptor,
) -> Result<(), Error> {
    match descr.field_type() {
        None | Some(FieldType::Sequence) => {
            unmarshal_sequence(record, value)
        }
        Some(FieldType::Choice) => unmarshal_choice(record, value),
        Some(other) => {
            Err(Error::mismatch(
                format!("a record field cannot be declared {}", other)
            ))
        }
    }
}

/// Fills a record from a constructed value, field by field.
///
/// A cursor walks the value's elements. Context-tagged fields consume an
/// element only when its tag matches; a mismatch skips an optional field
/// and fails a required one. Elements beyond the last field are ignored.
fn unmarshal_sequence<T: AsnRecord>(
    record: &mut T,
    value: &Value,
) -> Result<(), Error> {
    let structured = match *value {
        Value::Structured(ref inner) => inner,
        ref other => {
            return Err(Error::mismatch(format!(
                "expected a constructed value, found {}", other.type_name()
            )))
        }
    };
    let descriptors = T::descriptors()?;
    let names = T::field_names();
    let mut fields = record.fields_mut();
    let elements = structured.elements();
    let mut index = 0;

    for ((field, descr), &name) in
        fields.iter_mut().zip(descriptors).zip(names)
    {
        if descr.is_skip() {
            continue
        }
        match descr.tag() {
            Some(number) => {
                match elements.get(index) {
                    Some(element)
                        if element.tag().matches(Tag::ctx(number)) =>
                    {
                        index += 1;
                        feed_tagged(&mut **field, element, descr, name)?;
                    }
                    Some(element) => {
                        if descr.is_optional() {
                            field.clear();
                            continue
                        }
                        return Err(Error::unexpected(format!(
                            "field {}: expected tag [{}], found {}",
                            name, number, element.tag()
                        )))
                    }
                    None => {
                        if descr.is_optional() {
                            field.clear();
                            continue
                        }
                        return Err(Error::missing(format!(
                            "no element left for required field {}", name
                        )))
                    }
                }
            }
            None => {
                match elements.get(index) {
                    Some(element) => {
                        index += 1;
                        field.assign(element, descr).map_err(|err| {
                            err.in_field(name)
                        })?;
                    }
                    None => {
                        if descr.is_optional() {
                            field.clear();
                            continue
                        }
                        return Err(Error::missing(format!(
                            "no element left for required field {}", name
                        )))
                    }
                }
            }
        }
    }
    Ok(())
}

/// Fills a one-of record from the decoded alternative.
///
/// The value's tag picks the alternative whose descriptor carries the
/// matching `tag:` number; every other alternative is cleared.
fn unmarshal_choice<T: AsnRecord>(
    record: &mut T,
    value: &Value,
) -> Result<(), Error> {
    let descriptors = T::descriptors()?;
    let names = T::field_names();
    let mut fields = record.fields_mut();
    let tag = value.tag();

    let mut matched = false;
    for ((field, descr), &name) in
        fields.iter_mut().zip(descriptors).zip(names)
    {
        if descr.is_skip() {
            continue
        }
        let hit = !matched && descr.tag().is_some_and(|number| {
            tag.matches(Tag::ctx(number))
        });
        if hit {
            matched = true;
            feed_tagged(&mut **field, value, descr, name)?;
        }
        else {
            field.clear();
        }
    }
    if !matched {
        return Err(Error::unexpected(
            format!("no CHOICE alternative matches tag {}", tag)
        ))
    }
    Ok(())
}

/// Feeds a context-tagged element into a field.
///
/// EXPLICIT tags unwrap their single inner element; IMPLICIT tags are
/// restored to the universal tag the descriptor implies before the field
/// takes over.
fn feed_tagged(
    field: &mut dyn super::field::AsnField,
    element: &Value,
    descr: &Descriptor,
    name: &str,
) -> Result<(), Error> {
    if descr.is_explicit() {
        let inner = unwrap_explicit(element).map_err(|err| {
            err.in_field(name)
        })?;
        field.assign(inner, descr).map_err(|err| err.in_field(name))
    }
    else {
        let restored = restore_implicit(element, descr);
        field.assign(&restored, descr).map_err(|err| err.in_field(name))
    }
}

/// Unwraps an EXPLICIT tag.
fn unwrap_explicit(element: &Value) -> Result<&Value, Error> {
    match *element {
        Value::Structured(ref inner) if inner.len() == 1 => {
            Ok(&inner.elements()[0])
        }
        Value::Structured(_) => {
            Err(Error::validation(
                "EXPLICIT tag must wrap exactly one value"
            ))
        }
        _ => Err(Error::validation("EXPLICIT tag must be constructed")),
    }
}

/// Restores the universal tag an IMPLICIT tag replaced.
///
/// Constructed elements are restamped with the universal tag the
/// descriptor implies, keeping their children. Primitive payloads stay
/// [`Opaque`][crate::value::Opaque] under the restored tag; the field
/// performs the final promotion, where the content is validated against
/// the type the descriptor declared.
fn restore_implicit(element: &Value, descr: &Descriptor) -> Value {
    let Some(field_type) = descr.field_type() else {
        return element.clone()
    };
    let universal = field_type.universal_tag();
    match *element {
        Value::Structured(ref inner) if universal.is_constructed() => {
            Value::Structured(Structured::new(
                universal, inner.elements().to_vec(),
            ))
        }
        Value::Opaque(ref inner) if !universal.is_constructed() => {
            Value::opaque(universal, inner.content())
        }
        ref other => other.clone(),
    }
}
