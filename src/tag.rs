//! The identifier octets of a BER encoded value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{fmt, io};
use crate::decode::SliceSource;
use crate::error::Error;


//------------ Class ---------------------------------------------------------

/// The class of a tag.
///
/// ASN.1 partitions tags into four classes. The universal class is reserved
/// for the types defined by X.680 itself; the other three are available to
/// applications, with the context-specific class carrying the tags that
/// IMPLICIT and EXPLICIT tagging produce.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    /// The universal class.
    Universal = 0,

    /// The application class.
    Application = 1,

    /// The context-specific class.
    Context = 2,

    /// The private class.
    Private = 3,
}

impl Class {
    /// Returns the class encoded in the two top bits of the given octet.
    fn from_octet(octet: u8) -> Self {
        match octet >> 6 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::Context,
            _ => Class::Private,
        }
    }

    /// Returns the class as the two top bits of an identifier octet.
    fn to_octet(self) -> u8 {
        (self as u8) << 6
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a BER encoded value.
///
/// Each BER encoded value starts with a sequence of one or more octets
/// called the _identifier octets._ They encode the class and number of the
/// value's tag as well as whether the value uses primitive or constructed
/// encoding. The `Tag` type keeps all three parts together, since the value
/// tree needs to rewrite class and number while preserving the encoding
/// form.
///
/// # Limitations
///
/// We only support tag numbers up to [`Tag::MAX_NUMBER`], i.e., those that
/// fit into four base-128 digits. Larger numbers result in a
/// [`MalformedTag`][crate::ErrorKind::MalformedTag] error when decoding and
/// a panic when constructing a tag programmatically.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Tag {
    /// The class of the tag.
    class: Class,

    /// Whether the value uses constructed encoding.
    constructed: bool,

    /// The tag number.
    number: u32,
}

/// # Constants for Often Used Tag Values
///
impl Tag {
    /// The mask for the constructed bit in the first identifier octet.
    const CONSTRUCTED_MASK: u8 = 0x20;

    /// The mask for the number bits of a single octet identifier.
    ///
    /// (5 bits – 0b0001_1111).
    const SINGLEBYTE_DATA_MASK: u8 = 0x1f;

    /// The mask for the data bits of a subsequent identifier octet.
    ///
    /// (7 bits – 0b0111_1111).
    const MULTIBYTE_DATA_MASK: u8 = 0x7f;

    /// The mask for the continuation bit of a subsequent identifier octet.
    ///
    /// It is cleared in the last octet.
    const LAST_OCTET_MASK: u8 = 0x80;

    /// The largest tag number we support.
    ///
    /// Four base-128 digits, i.e., five identifier octets in total.
    pub const MAX_NUMBER: u32 = 0x01FF_FFFF;

    /// The largest tag number that still fits the first octet.
    const MAX_VAL_FIRST_OCTET: u32 = 0x1e;

    //--- Universal Tags
    //
    // See clause 8.4 of X.690.

    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Tag::flat(Class::Universal, false, 1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Tag::flat(Class::Universal, false, 2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Tag::flat(Class::Universal, false, 3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Tag::flat(Class::Universal, false, 4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Tag::flat(Class::Universal, false, 5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Tag::flat(Class::Universal, false, 6);

    /// The tag for the ENUMERATED type, UNIVERSAL 10.
    pub const ENUMERATED: Self = Tag::flat(Class::Universal, false, 10);

    /// The tag for the UTF8String type, UNIVERSAL 12.
    pub const UTF8_STRING: Self = Tag::flat(Class::Universal, false, 12);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Tag::flat(Class::Universal, true, 16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Tag::flat(Class::Universal, true, 17);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Tag::flat(Class::Universal, false, 19);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Tag::flat(Class::Universal, false, 22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Tag::flat(Class::Universal, false, 23);

    /// The tag for the GeneralizedTime type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Tag::flat(Class::Universal, false, 24);
}

impl Tag {
    /// Creates a tag without range checking.
    ///
    /// Only for the constants above whose numbers are trivially in range.
    const fn flat(class: Class, constructed: bool, number: u32) -> Self {
        Tag { class, constructed, number }
    }

    /// Creates a new tag from its three parts.
    ///
    /// # Panics
    ///
    /// This function panics if the tag number is greater than
    /// [`Tag::MAX_NUMBER`].
    pub fn new(class: Class, constructed: bool, number: u32) -> Self {
        assert!(number <= Tag::MAX_NUMBER);
        Tag { class, constructed, number }
    }

    /// Creates a primitive tag in the universal class.
    pub fn universal(number: u32) -> Self {
        Tag::new(Class::Universal, false, number)
    }

    /// Creates a primitive tag in the application class.
    pub fn application(number: u32) -> Self {
        Tag::new(Class::Application, false, number)
    }

    /// Creates a primitive tag in the context-specific class.
    pub fn ctx(number: u32) -> Self {
        Tag::new(Class::Context, false, number)
    }

    /// Creates a constructed tag in the context-specific class.
    pub fn ctx_constructed(number: u32) -> Self {
        Tag::new(Class::Context, true, number)
    }

    /// Creates a primitive tag in the private class.
    pub fn private(number: u32) -> Self {
        Tag::new(Class::Private, false, number)
    }

    /// Returns the same tag with the constructed bit set as given.
    pub fn with_constructed(self, constructed: bool) -> Self {
        Tag { constructed, ..self }
    }

    /// Returns the class of the tag.
    pub fn class(self) -> Class {
        self.class
    }

    /// Returns whether the value uses constructed encoding.
    pub fn is_constructed(self) -> bool {
        self.constructed
    }

    /// Returns the number of the tag.
    pub fn number(self) -> u32 {
        self.number
    }

    /// Returns whether the tag is of the universal class.
    pub fn is_universal(self) -> bool {
        self.class == Class::Universal
    }

    /// Returns whether the tag is of the context-specific class.
    pub fn is_context_specific(self) -> bool {
        self.class == Class::Context
    }

    /// Returns whether class and number equal those of `other`.
    ///
    /// The constructed bit is ignored, which is what tag matching during
    /// unmarshaling needs: an IMPLICIT tag copies the form of the
    /// underlying value while an EXPLICIT tag is always constructed.
    pub fn matches(self, other: Tag) -> bool {
        self.class == other.class && self.number == other.number
    }

    /// Takes a tag from the beginning of a source.
    ///
    /// The single-octet form is required for numbers up to 30 and the
    /// multi-octet form must use the least number of octets; anything else
    /// is malformed. Numbers beyond [`Tag::MAX_NUMBER`] are refused.
    pub fn take_from(source: &mut SliceSource) -> Result<Self, Error> {
        let pos = source.pos();
        let first = source.take_u8().map_err(|err| err.at(pos))?;
        let class = Class::from_octet(first);
        let constructed = first & Tag::CONSTRUCTED_MASK != 0;
        if first & Tag::SINGLEBYTE_DATA_MASK != Tag::SINGLEBYTE_DATA_MASK {
            return Ok(Tag {
                class, constructed,
                number: u32::from(first & Tag::SINGLEBYTE_DATA_MASK),
            })
        }

        let mut number = 0u32;
        for i in 0.. {
            let octet = source.take_u8().map_err(|_| {
                Error::tag("incomplete multi-octet tag").at(pos)
            })?;
            if i == 0 && octet == Tag::LAST_OCTET_MASK {
                // A leading zero digit: there is a shorter form.
                return Err(Error::tag("non-minimal tag number").at(pos))
            }
            if i == 4 {
                return Err(Error::tag("tag number too large").at(pos))
            }
            number = number << 7 | u32::from(octet & Tag::MULTIBYTE_DATA_MASK);
            if octet & Tag::LAST_OCTET_MASK == 0 {
                break
            }
        }
        if number <= Tag::MAX_VAL_FIRST_OCTET {
            return Err(Error::tag("non-minimal tag number").at(pos))
        }
        if number > Tag::MAX_NUMBER {
            return Err(Error::tag("tag number too large").at(pos))
        }
        Ok(Tag { class, constructed, number })
    }

    /// Returns the number of octets of the encoded form of the tag.
    pub fn encoded_len(self) -> usize {
        if self.number <= Tag::MAX_VAL_FIRST_OCTET {
            1
        }
        else if self.number <= 0x7f {
            2
        }
        else if self.number <= 0x3fff {
            3
        }
        else if self.number <= 0x1f_ffff {
            4
        }
        else {
            5
        }
    }

    /// Writes the identifier octets to the given target.
    pub fn write_encoded<W: io::Write>(
        self,
        target: &mut W,
    ) -> Result<(), io::Error> {
        let mut first = self.class.to_octet();
        if self.constructed {
            first |= Tag::CONSTRUCTED_MASK;
        }
        if self.number <= Tag::MAX_VAL_FIRST_OCTET {
            return target.write_all(&[first | self.number as u8])
        }

        let mut buf = [first | Tag::SINGLEBYTE_DATA_MASK, 0, 0, 0, 0];
        let len = self.encoded_len();
        let mut number = self.number;
        for i in (1..len).rev() {
            buf[i] = number as u8 & Tag::MULTIBYTE_DATA_MASK;
            if i != len - 1 {
                buf[i] |= Tag::LAST_OCTET_MASK;
            }
            number >>= 7;
        }
        target.write_all(&buf[..len])
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::ENUMERATED => write!(f, "ENUMERATED"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            tag => {
                match tag.class {
                    Class::Universal => write!(f, "[UNIVERSAL ")?,
                    Class::Application => write!(f, "[APPLICATION ")?,
                    Class::Context => write!(f, "[")?,
                    Class::Private => write!(f, "[PRIVATE ")?,
                }
                write!(f, "{}]", tag.number)
            }
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    const CLASSES: &[Class] = &[
        Class::Universal, Class::Application, Class::Context, Class::Private,
    ];

    fn encoded(tag: Tag) -> Vec<u8> {
        let mut vec = Vec::new();
        tag.write_encoded(&mut vec).unwrap();
        assert_eq!(vec.len(), tag.encoded_len());
        vec
    }

    fn decoded(data: &[u8]) -> Result<Tag, Error> {
        let mut source = SliceSource::new(data);
        let res = Tag::take_from(&mut source)?;
        assert!(source.remaining().is_empty());
        Ok(res)
    }

    #[test]
    fn roundtrip_all_spans() {
        // Edge values around every span boundary.
        let numbers: Vec<u32> = (0..5).chain([
            29, 30, 31, 0x7e, 0x7f, 0x80, 0x3ffe, 0x3fff, 0x4000,
            0x1f_fffe, 0x1f_ffff, 0x20_0000, Tag::MAX_NUMBER,
        ]).collect();
        for &class in CLASSES {
            for &number in &numbers {
                for constructed in [false, true] {
                    let tag = Tag::new(class, constructed, number);
                    let back = decoded(&encoded(tag)).unwrap();
                    assert_eq!(back, tag);
                    assert_eq!(back.class(), class);
                    assert_eq!(back.is_constructed(), constructed);
                    assert_eq!(back.number(), number);
                }
            }
        }
    }

    #[test]
    fn known_octets() {
        assert_eq!(encoded(Tag::INTEGER), b"\x02");
        assert_eq!(encoded(Tag::SEQUENCE), b"\x30");
        assert_eq!(encoded(Tag::ctx(0)), b"\x80");
        assert_eq!(encoded(Tag::ctx_constructed(0)), b"\xa0");
        assert_eq!(encoded(Tag::universal(31)), b"\x1f\x1f");
        assert_eq!(encoded(Tag::application(0x81)), b"\x5f\x81\x01");
    }

    #[test]
    fn take_from_failures() {
        // Truncated multi-octet form.
        assert_eq!(
            decoded(b"\xff\x81").unwrap_err().kind(),
            ErrorKind::MalformedTag
        );
        // More than four continuation octets.
        assert_eq!(
            decoded(b"\xff\x81\x82\x83\x84\x05").unwrap_err().kind(),
            ErrorKind::MalformedTag
        );
        // Leading zero digit.
        assert_eq!(
            decoded(b"\x1f\x80\x7f").unwrap_err().kind(),
            ErrorKind::MalformedTag
        );
        // Multi-octet form for a number that fits the first octet.
        assert_eq!(
            decoded(b"\x1f\x1e").unwrap_err().kind(),
            ErrorKind::MalformedTag
        );
        // Empty input.
        assert_eq!(
            decoded(b"").unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }

    #[test]
    fn matching_ignores_constructed() {
        assert!(Tag::ctx(3).matches(Tag::ctx_constructed(3)));
        assert!(!Tag::ctx(3).matches(Tag::ctx(4)));
        assert!(!Tag::ctx(3).matches(Tag::application(3)));
    }

    #[test]
    fn display() {
        assert_eq!(Tag::SEQUENCE.to_string(), "SEQUENCE");
        assert_eq!(Tag::ctx(5).to_string(), "[5]");
        assert_eq!(Tag::application(7).to_string(), "[APPLICATION 7]");
        assert_eq!(Tag::universal(9).to_string(), "[UNIVERSAL 9]");
    }
}
