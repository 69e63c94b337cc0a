//! Handling of data in Basic Encoding Rules.
//!
//! This crate allows decoding and encoding of ASN.1 values encoded in
//! ASN.1's _Basic Encoding Rules_ as defined in ITU recommendation X.690,
//! together with a declarative binding between Rust records and ASN.1
//! schemas.
//!
//! Two surfaces share one engine. The low-level surface is the typed value
//! tree of the [`value`] module: [`Value`] covers the universal primitives
//! – BOOLEAN, INTEGER of arbitrary size, BIT STRING, OCTET STRING, NULL,
//! object identifiers, the string and time types, ENUMERATED – as well as
//! constructed values, CHOICE, and opaque payloads. Values encode via
//! [`Value::encode`] and come back via [`decode_first`] and
//! [`decode_all`].
//!
//! The high-level surface is the [`schema`] module: record types declared
//! through the [`asn_record!`] macro carry a descriptor string per field
//! and marshal and unmarshal automatically, including IMPLICIT and
//! EXPLICIT context tagging, OPTIONAL fields, SEQUENCE OF, CHOICE, and
//! custom codec hooks for types that own their wire representation.
//!
//! Only definite length encodings are supported, and only the forms the
//! encoder itself produces are accepted when decoding, so that decoding
//! and re-encoding octets always reproduces them exactly.

pub use self::bitstring::BitString;
pub use self::decode::{SliceSource, decode_all, decode_first};
pub use self::error::{Error, ErrorKind};
pub use self::int::Int;
pub use self::oid::Oid;
pub use self::schema::{from_ber, marshal, unmarshal};
pub use self::tag::{Class, Tag};
pub use self::time::Time;
pub use self::value::Value;


//--- Public modules

pub mod decode;
pub mod schema;
pub mod value;


//--- Private modules

mod bitstring;
mod error;
mod int;
mod length;
mod oid;
mod strings;
mod tag;
mod time;
