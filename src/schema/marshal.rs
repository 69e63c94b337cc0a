//! Turning records into value trees.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use bytes::Bytes;
use crate::error::Error;
use crate::value::Value;
use super::descriptor::{Descriptor, FieldType};
use super::record::AsnRecord;


/// Encodes a record.
///
/// The record's fields are walked in declaration order into a SEQUENCE,
/// which is then encoded. Skipped fields, absent optionals, and empty
/// `omitempty` fields contribute nothing; an unset required field is a
/// [`MissingRequired`][crate::ErrorKind::MissingRequired] error.
pub fn marshal<T: AsnRecord>(record: &T) -> Result<Bytes, Error> {
    record_to_value(record, &Descriptor::auto()).map(|value| value.encode())
}

/// Builds the value tree of a record under the given descriptor.
///
/// A record is a SEQUENCE unless its descriptor declares it a CHOICE, in
/// which case it must be a one-of record: all alternatives optional, with
/// exactly one of them set.
pub fn record_to_value<T: AsnRecord>(
    record: &T,
    descr: &Descriptor,
) -> Result<Value, Error> {
    match descr.field_type() {
        None | Some(FieldType::Sequence) => marshal_sequence(record),
        Some(FieldType::Choice) => marshal_choice(record),
        Some(other) => {
            Err(Error::mismatch(
                format!("a record field cannot be declared {}", other)
            ))
        }
    }
}

/// Marshals a record as a SEQUENCE.
fn marshal_sequence<T: AsnRecord>(record: &T) -> Result<Value, Error> {
    let descriptors = T::descriptors()?;
    let names = T::field_names();
    let fields = record.fields();

    let mut elements = Vec::new();
    for ((field, descr), &name) in
        fields.iter().zip(descriptors).zip(names)
    {
        if descr.is_skip() {
            continue
        }
        if field.is_absent() {
            if descr.is_optional() {
                continue
            }
            return Err(Error::missing(
                format!("required field {} is unset", name)
            ))
        }
        if descr.is_omitempty() && field.is_empty() {
            continue
        }
        let value = field.to_value(descr).map_err(|err| {
            err.in_field(name)
        })?;
        elements.push(apply_tag(value, descr));
    }
    Ok(Value::sequence(elements))
}

/// Marshals a one-of record as its single set alternative.
///
/// The alternative is tagged per its own descriptor; the CHOICE itself
/// adds no wire form.
fn marshal_choice<T: AsnRecord>(record: &T) -> Result<Value, Error> {
    let descriptors = T::descriptors()?;
    let names = T::field_names();
    let fields = record.fields();

    let mut chosen = None;
    for (index, (field, descr)) in
        fields.iter().zip(descriptors).enumerate()
    {
        if descr.is_skip() || field.is_absent() {
            continue
        }
        if chosen.is_some() {
            return Err(Error::validation(
                format!(
                    "more than one CHOICE alternative set, including {}",
                    names[index]
                )
            ))
        }
        chosen = Some(index);
    }
    let index = chosen.ok_or_else(|| {
        Error::missing("no CHOICE alternative set")
    })?;

    let descr = &descriptors[index];
    let value = fields[index].to_value(descr).map_err(|err| {
        err.in_field(names[index])
    })?;
    Ok(apply_tag(value, descr))
}

/// Applies the context tagging a descriptor asks for.
pub(super) fn apply_tag(value: Value, descr: &Descriptor) -> Value {
    match descr.tag() {
        Some(number) if descr.is_explicit() => {
            value.with_explicit_tag(number)
        }
        Some(number) => value.with_implicit_tag(number),
        None => value,
    }
}
