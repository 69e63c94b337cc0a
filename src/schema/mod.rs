//! Schema-driven marshaling of records.
//!
//! This module binds user-defined record types to ASN.1 via per-field
//! descriptor strings, the same comma-separated notation the library's
//! ancestors used in struct tags:
//!
//! ```text
//! "printablestring,optional,tag:0"
//! ```
//!
//! The first token names the ASN.1 type of the field (or `auto` to infer
//! it from the host type), the remaining tokens are `optional`,
//! `omitempty`, `explicit`, and `tag:N`. A descriptor of just `-` skips
//! the field entirely.
//!
//! A record declares its shape once via the [`asn_record!`][crate::asn_record]
//! macro, which implements [`AsnRecord`] – the descriptor table plus views
//! of the fields – and [`AsnField`], so records nest. [`marshal`] walks
//! the fields in declaration order into a SEQUENCE; [`unmarshal`] consumes
//! a decoded value tree back into the fields, restoring IMPLICIT tags and
//! honouring OPTIONAL, SEQUENCE OF, and CHOICE along the way.
//!
//! Types with their own wire representation implement [`ToOctets`] and
//! [`FromOctets`] and hook into any field position via the
//! [`octets_codec!`][crate::octets_codec] macro.

pub use self::descriptor::{Descriptor, FieldType};
pub use self::field::{
    AsnField, FromOctets, ToOctets, octets_assign, octets_to_value,
};
pub use self::marshal::{marshal, record_to_value};
pub use self::record::AsnRecord;
pub use self::unmarshal::{from_ber, record_assign, unmarshal};

mod descriptor;
mod field;
mod marshal;
mod record;
mod unmarshal;
