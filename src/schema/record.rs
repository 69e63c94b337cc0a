//! Bound records.
//!
//! This is a private module. Its public items are re-exported by the
//! parent; the macros export from the crate root.

use super::descriptor::Descriptor;
use super::field::AsnField;
use crate::error::Error;


//------------ AsnRecord -----------------------------------------------------

/// A record type bound to an ASN.1 SEQUENCE or CHOICE.
///
/// The trait supplies everything the marshaler needs to walk a record:
/// the parsed descriptor of every field and read and write views of the
/// fields themselves, all in declaration order and all of equal length.
///
/// Implement this via the [`asn_record!`][crate::asn_record] macro rather
/// than by hand; the macro also implements [`AsnField`] so the record can
/// appear as a field of other records.
pub trait AsnRecord: Sized {
    /// Returns the parsed descriptor table in field declaration order.
    ///
    /// The table is parsed once per type and memoized; a bad descriptor
    /// string surfaces as the same error on every call.
    fn descriptors() -> Result<&'static [Descriptor], Error>;

    /// Returns the field names, for error messages.
    fn field_names() -> &'static [&'static str];

    /// Returns read views of the fields in declaration order.
    fn fields(&self) -> Vec<&dyn AsnField>;

    /// Returns write views of the fields in declaration order.
    fn fields_mut(&mut self) -> Vec<&mut dyn AsnField>;
}


//------------ asn_record! ---------------------------------------------------

/// Defines a record type bound to ASN.1.
///
/// The macro takes a struct definition where every field carries a
/// descriptor string after a `=>`:
///
/// ```
/// use berbind::asn_record;
///
/// asn_record! {
///     #[derive(Clone, Debug, Default, PartialEq)]
///     pub struct Person {
///         pub id: i64 => "integer",
///         pub name: String => "utf8string",
///         pub department: Option<String> => "printablestring,optional,tag:0",
///     }
/// }
/// ```
///
/// It emits the struct unchanged (minus the descriptors) and implements
/// [`AsnRecord`][crate::schema::AsnRecord] and
/// [`AsnField`][crate::schema::AsnField] for it. Every field type must
/// itself implement `AsnField`.
#[macro_export]
macro_rules! asn_record {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fattr:meta])*
                $fvis:vis $field:ident : $ftype:ty => $descr:literal
            ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        $vis struct $name {
            $(
                $(#[$fattr])*
                $fvis $field: $ftype,
            )*
        }

        impl $crate::schema::AsnRecord for $name {
            fn descriptors() -> ::std::result::Result<
                &'static [$crate::schema::Descriptor], $crate::Error
            > {
                static TABLE: ::std::sync::OnceLock<
                    ::std::result::Result<
                        ::std::vec::Vec<$crate::schema::Descriptor>,
                        $crate::Error,
                    >
                > = ::std::sync::OnceLock::new();
                match TABLE.get_or_init(|| {
                    [ $( $descr ),* ].iter().map(|descr| {
                        $crate::schema::Descriptor::parse(descr)
                    }).collect()
                }) {
                    ::std::result::Result::Ok(table) => {
                        ::std::result::Result::Ok(table.as_slice())
                    }
                    ::std::result::Result::Err(err) => {
                        ::std::result::Result::Err(err.clone())
                    }
                }
            }

            fn field_names() -> &'static [&'static str] {
                &[ $( stringify!($field) ),* ]
            }

            fn fields(&self) -> ::std::vec::Vec<
                &dyn $crate::schema::AsnField
            > {
                vec![
                    $( &self.$field as &dyn $crate::schema::AsnField ),*
                ]
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<
                &mut dyn $crate::schema::AsnField
            > {
                vec![
                    $(
                        &mut self.$field
                            as &mut dyn $crate::schema::AsnField
                    ),*
                ]
            }
        }

        impl $crate::schema::AsnField for $name {
            fn to_value(
                &self,
                descr: &$crate::schema::Descriptor,
            ) -> ::std::result::Result<$crate::Value, $crate::Error> {
                $crate::schema::record_to_value(self, descr)
            }

            fn assign(
                &mut self,
                value: &$crate::Value,
                descr: &$crate::schema::Descriptor,
            ) -> ::std::result::Result<(), $crate::Error> {
                $crate::schema::record_assign(self, value, descr)
            }
        }
    };
}


//------------ octets_codec! -------------------------------------------------

/// Makes a type with custom codec hooks usable as a record field.
///
/// The type must implement [`ToOctets`][crate::schema::ToOctets] and
/// [`FromOctets`][crate::schema::FromOctets]; the macro derives the
/// field binding from them. Context tags, `optional`, and `omitempty`
/// compose with the hooks like with any other field.
#[macro_export]
macro_rules! octets_codec {
    ( $type:ty ) => {
        impl $crate::schema::AsnField for $type {
            fn to_value(
                &self,
                descr: &$crate::schema::Descriptor,
            ) -> ::std::result::Result<$crate::Value, $crate::Error> {
                $crate::schema::octets_to_value(self, descr)
            }

            fn assign(
                &mut self,
                value: &$crate::Value,
                descr: &$crate::schema::Descriptor,
            ) -> ::std::result::Result<(), $crate::Error> {
                $crate::schema::octets_assign(self, value, descr)
            }
        }
    };
}
