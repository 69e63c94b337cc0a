//! ASN.1 Object Identifiers.
//!
//! This module contains the [`Oid`] type that implements object
//! identifiers, a construct used by ASN.1 to uniquely identify all sorts of
//! things. The type is re-exported at the top-level.

use std::fmt;
use bytes::Bytes;
use smallvec::SmallVec;
use crate::error::Error;


//------------ Oid -----------------------------------------------------------

/// An object identifier.
///
/// Object identifiers are globally unique, hierarchical values that are
/// used to identify objects or their type. When written, they are presented
/// as a sequence of integers separated by dots such as '2.5.4.3'.
///
/// Values of this type keep the object identifier in its BER content form:
/// the first two arcs combine into a single subidentifier as 40 · a₀ + a₁
/// and every subidentifier is a base-128 big-endian integer whose non-final
/// octets have their most significant bit set. All constructors check the
/// arc invariants – at least two arcs, the first between 0 and 2, the
/// second below 40 unless the first is 2 – so a constructed value is
/// always well-formed and [`arcs`][Self::arcs] cannot fail.
///
/// Arcs beyond the range of `u32` are refused; nothing in the wild gets
/// anywhere near that.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Oid(Bytes);

impl Oid {
    /// Creates an object identifier from its arcs.
    pub fn from_arcs(arcs: &[u32]) -> Result<Self, Error> {
        if arcs.len() < 2 {
            return Err(
                Error::validation("object identifier needs at least 2 arcs")
            )
        }
        if arcs[0] > 2 {
            return Err(Error::validation("first arc must be 0, 1, or 2"))
        }
        if arcs[0] < 2 && arcs[1] > 39 {
            return Err(Error::validation(
                "second arc must be below 40 when the first arc is 0 or 1"
            ))
        }
        let first = u64::from(arcs[0]) * 40 + u64::from(arcs[1]);
        if first > u64::from(u32::MAX) {
            return Err(Error::validation("second arc too large"))
        }
        let mut content = Vec::new();
        push_subid(&mut content, first as u32);
        for &arc in &arcs[2..] {
            push_subid(&mut content, arc);
        }
        Ok(Oid(content.into()))
    }

    /// Creates an object identifier from dotted notation.
    pub fn from_dotted_str(s: &str) -> Result<Self, Error> {
        let mut arcs = SmallVec::<[u32; 12]>::new();
        for part in s.split('.') {
            arcs.push(part.parse().map_err(|_| {
                Error::validation(format!("invalid arc {:?}", part))
            })?);
        }
        Self::from_arcs(&arcs)
    }

    /// Creates an object identifier from its content octets.
    ///
    /// The octets must contain at least one subidentifier, every
    /// subidentifier must be complete and minimally encoded, and none may
    /// exceed the range of `u32`.
    pub fn from_content(content: &[u8]) -> Result<Self, Error> {
        if content.is_empty() {
            return Err(
                Error::validation("empty OBJECT IDENTIFIER content")
            )
        }
        let mut iter = content.iter();
        loop {
            let mut octet = match iter.next() {
                Some(octet) => *octet,
                None => break,
            };
            if octet == 0x80 {
                return Err(Error::validation(
                    "non-minimal subidentifier in OBJECT IDENTIFIER"
                ))
            }
            let mut subid = 0u64;
            loop {
                subid = subid << 7 | u64::from(octet & 0x7F);
                if subid > u64::from(u32::MAX) {
                    return Err(Error::validation(
                        "subidentifier in OBJECT IDENTIFIER too large"
                    ))
                }
                if octet & 0x80 == 0 {
                    break
                }
                octet = match iter.next() {
                    Some(octet) => *octet,
                    None => {
                        return Err(Error::validation(
                            "incomplete subidentifier in OBJECT IDENTIFIER"
                        ))
                    }
                };
            }
        }
        Ok(Oid(Bytes::copy_from_slice(content)))
    }

    /// Returns the content octets.
    pub fn content(&self) -> Bytes {
        self.0.clone()
    }

    /// Returns the content octets as a slice.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns the number of content octets.
    pub fn content_len(&self) -> usize {
        self.0.len()
    }

    /// Returns the arcs of the object identifier.
    ///
    /// The reconstructed first subidentifier `s` splits into `(0, s)` for
    /// `s` below 40, `(1, s − 40)` below 80, and `(2, s − 80)` otherwise.
    pub fn arcs(&self) -> Vec<u32> {
        let mut res = Vec::new();
        let mut subid = 0u64;
        for &octet in self.0.iter() {
            subid = subid << 7 | u64::from(octet & 0x7F);
            if octet & 0x80 == 0 {
                if res.is_empty() {
                    if subid < 40 {
                        res.push(0);
                        res.push(subid as u32);
                    }
                    else if subid < 80 {
                        res.push(1);
                        res.push(subid as u32 - 40);
                    }
                    else {
                        res.push(2);
                        res.push(subid as u32 - 80);
                    }
                }
                else {
                    res.push(subid as u32);
                }
                subid = 0;
            }
        }
        res
    }
}

/// Appends the base-128 encoding of a single subidentifier.
fn push_subid(target: &mut Vec<u8>, subid: u32) {
    let mut buf = SmallVec::<[u8; 5]>::new();
    let mut subid = subid;
    loop {
        buf.push(subid as u8 & 0x7F);
        subid >>= 7;
        if subid == 0 {
            break
        }
    }
    for (i, &octet) in buf.iter().enumerate().rev() {
        if i == 0 {
            target.push(octet);
        }
        else {
            target.push(octet | 0x80);
        }
    }
}


//--- Display

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut arcs = self.arcs().into_iter();
        // There are always at least two arcs.
        write!(f, "{}", arcs.next().unwrap())?;
        for arc in arcs {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}


//============ Tests =========================================================
