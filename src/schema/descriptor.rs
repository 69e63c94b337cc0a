//! Field descriptors.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::fmt;
use crate::error::Error;
use crate::tag::Tag;


//------------ FieldType -----------------------------------------------------

/// The ASN.1 type a descriptor declares for a field.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FieldType {
    Boolean,
    Integer,
    OctetString,
    Utf8String,
    PrintableString,
    Ia5String,
    UtcTime,
    GeneralizedTime,
    Sequence,
    Choice,
    BitString,
}

impl FieldType {
    /// Returns the field type named by a descriptor token.
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "boolean" => Some(FieldType::Boolean),
            "integer" => Some(FieldType::Integer),
            "octetstring" => Some(FieldType::OctetString),
            "utf8string" => Some(FieldType::Utf8String),
            "printablestring" => Some(FieldType::PrintableString),
            "ia5string" => Some(FieldType::Ia5String),
            "utctime" => Some(FieldType::UtcTime),
            "generalizedtime" => Some(FieldType::GeneralizedTime),
            "sequence" => Some(FieldType::Sequence),
            "choice" => Some(FieldType::Choice),
            "bitstring" => Some(FieldType::BitString),
            _ => None,
        }
    }

    /// Returns the universal tag implied by the field type.
    ///
    /// This is the tag an IMPLICIT context-specific tag replaced and that
    /// tag restoration brings back. A CHOICE bound to a one-of record is
    /// restored as a SEQUENCE, the shape such records decode from.
    pub fn universal_tag(self) -> Tag {
        match self {
            FieldType::Boolean => Tag::BOOLEAN,
            FieldType::Integer => Tag::INTEGER,
            FieldType::OctetString => Tag::OCTET_STRING,
            FieldType::Utf8String => Tag::UTF8_STRING,
            FieldType::PrintableString => Tag::PRINTABLE_STRING,
            FieldType::Ia5String => Tag::IA5_STRING,
            FieldType::UtcTime => Tag::UTC_TIME,
            FieldType::GeneralizedTime => Tag::GENERALIZED_TIME,
            FieldType::Sequence => Tag::SEQUENCE,
            FieldType::Choice => Tag::SEQUENCE,
            FieldType::BitString => Tag::BIT_STRING,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::OctetString => "octetstring",
            FieldType::Utf8String => "utf8string",
            FieldType::PrintableString => "printablestring",
            FieldType::Ia5String => "ia5string",
            FieldType::UtcTime => "utctime",
            FieldType::GeneralizedTime => "generalizedtime",
            FieldType::Sequence => "sequence",
            FieldType::Choice => "choice",
            FieldType::BitString => "bitstring",
        })
    }
}


//------------ Descriptor ----------------------------------------------------

/// The parsed descriptor of a single record field.
///
/// Descriptors are immutable once parsed. The schema layer memoizes the
/// parsed table per record type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Descriptor {
    /// The declared ASN.1 type, or `None` for `auto`.
    field_type: Option<FieldType>,

    /// Whether the field may be absent.
    optional: bool,

    /// Whether an empty value is omitted when marshaling.
    omitempty: bool,

    /// Whether a context-specific tag wraps rather than replaces.
    explicit: bool,

    /// The context-specific tag number, if any.
    tag: Option<u32>,

    /// Whether the field is ignored entirely.
    skip: bool,
}

impl Descriptor {
    /// Returns the descriptor used where no annotation applies.
    ///
    /// This is the descriptor of SEQUENCE OF elements and of the top-level
    /// record itself: type inferred from the host, nothing optional, no
    /// context tag.
    pub fn auto() -> Self {
        Descriptor {
            field_type: None,
            optional: false,
            omitempty: false,
            explicit: false,
            tag: None,
            skip: false,
        }
    }

    /// Parses a descriptor string.
    ///
    /// The whole-string sentinel `-` yields a skip descriptor. Otherwise
    /// the string is split on commas; the first token names the type, the
    /// remaining tokens set options. Unknown tokens, an empty string,
    /// a malformed `tag:` number, and `explicit` without `tag:` are all
    /// errors.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s == "-" {
            let mut res = Self::auto();
            res.skip = true;
            return Ok(res)
        }
        if s.is_empty() {
            return Err(Error::validation("empty field descriptor"))
        }

        let mut parts = s.split(',').map(str::trim);
        let mut res = Self::auto();

        // The unwrap is fine: split always yields at least one item.
        let type_token = parts.next().unwrap().to_ascii_lowercase();
        if type_token != "auto" {
            res.field_type = match FieldType::from_token(&type_token) {
                Some(field_type) => Some(field_type),
                None => {
                    return Err(Error::validation(
                        format!("unknown ASN.1 type {:?}", type_token)
                    ))
                }
            };
        }

        for part in parts {
            if part == "optional" {
                res.optional = true;
            }
            else if part == "omitempty" {
                res.omitempty = true;
            }
            else if part == "explicit" {
                res.explicit = true;
            }
            else if let Some(number) = part.strip_prefix("tag:") {
                let number: u32 = number.parse().map_err(|_| {
                    Error::validation(
                        format!("invalid tag number {:?}", number)
                    )
                })?;
                if number > Tag::MAX_NUMBER {
                    return Err(Error::validation(
                        format!("tag number {} too large", number)
                    ))
                }
                res.tag = Some(number);
            }
            else {
                return Err(Error::validation(
                    format!("unknown descriptor token {:?}", part)
                ))
            }
        }

        if res.explicit && res.tag.is_none() {
            return Err(
                Error::validation("explicit requires a tag: option")
            )
        }
        Ok(res)
    }

    /// Returns the declared type, or `None` for inference.
    pub fn field_type(&self) -> Option<FieldType> {
        self.field_type
    }

    /// Returns whether the field may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns whether an empty value is omitted when marshaling.
    pub fn is_omitempty(&self) -> bool {
        self.omitempty
    }

    /// Returns whether the context-specific tag wraps rather than
    /// replaces.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Returns the context-specific tag number, if any.
    pub fn tag(&self) -> Option<u32> {
        self.tag
    }

    /// Returns whether the field is ignored entirely.
    pub fn is_skip(&self) -> bool {
        self.skip
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use super::*;

    #[test]
    fn parse_full() {
        let descr = Descriptor::parse(
            "printablestring,optional,tag:0"
        ).unwrap();
        assert_eq!(descr.field_type(), Some(FieldType::PrintableString));
        assert!(descr.is_optional());
        assert!(!descr.is_omitempty());
        assert!(!descr.is_explicit());
        assert_eq!(descr.tag(), Some(0));
        assert!(!descr.is_skip());
    }

    #[test]
    fn parse_variants() {
        assert_eq!(
            Descriptor::parse("integer").unwrap().field_type(),
            Some(FieldType::Integer)
        );
        assert!(Descriptor::parse("-").unwrap().is_skip());
        assert_eq!(Descriptor::parse("auto").unwrap().field_type(), None);
        assert_eq!(
            Descriptor::parse("INTEGER, tag:3").unwrap().tag(),
            Some(3)
        );
        let descr = Descriptor::parse("integer,tag:2,explicit").unwrap();
        assert!(descr.is_explicit());
        assert_eq!(descr.tag(), Some(2));
        assert!(
            Descriptor::parse("utf8string,omitempty").unwrap().is_omitempty()
        );
    }

    #[test]
    fn parse_failures() {
        for bad in [
            "", "integer,tag:x", "integer,tag:", "integer,explicit",
            "flonum", "integer,optionall", "integer,tag:99999999",
        ] {
            assert_eq!(
                Descriptor::parse(bad).unwrap_err().kind(),
                ErrorKind::ValidationFailure,
                "accepted {:?}", bad
            );
        }
    }
}
