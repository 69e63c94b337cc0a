//! Error handling.
//!
//! This is a private module. Its public content is being re-exported by the
//! crate root.

use std::{error, fmt};


//------------ ErrorKind -----------------------------------------------------

/// The category of an error.
///
/// Every [`Error`] produced by this crate falls into exactly one of these
/// kinds. The kind is the part of an error that is stable enough to match
/// on; the message only adds human-readable detail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The input buffer ended inside a tag, length, or value.
    TruncatedInput,

    /// The length octets were unacceptable.
    ///
    /// This covers the indefinite form, excessive long-form sizes,
    /// non-minimal long forms, and lengths exceeding the remaining buffer.
    MalformedLength,

    /// The identifier octets were unacceptable.
    ///
    /// This covers incomplete high-tag-number forms, non-minimal forms,
    /// and tag numbers beyond the supported ceiling.
    MalformedTag,

    /// The observed tag differs from the tag required at this position.
    UnexpectedTag,

    /// A content-level invariant was broken.
    ValidationFailure,

    /// A decoded value does not fit the targeted host type.
    Overflow,

    /// A required field was absent.
    MissingRequired,

    /// The host type is incompatible with the declared descriptor type.
    TypeMismatch,

    /// The decoder's recursion limit was exceeded.
    DepthExceeded,

    /// A user-provided codec hook reported a failure.
    CustomCodec,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ErrorKind::TruncatedInput => "unexpected end of input",
            ErrorKind::MalformedLength => "malformed length octets",
            ErrorKind::MalformedTag => "malformed identifier octets",
            ErrorKind::UnexpectedTag => "unexpected tag",
            ErrorKind::ValidationFailure => "invalid content",
            ErrorKind::Overflow => "value out of range",
            ErrorKind::MissingRequired => "missing required field",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::DepthExceeded => "nesting too deep",
            ErrorKind::CustomCodec => "custom codec failed",
        })
    }
}


//------------ ErrorMessage --------------------------------------------------

/// The detail message of an error.
///
/// Most messages are static strings. Messages that need to mention runtime
/// data are carried as owned strings. The type exists so that the common
/// case stays allocation-free. It is created via `From` impls for both
/// string flavours; you will rarely deal with it directly.
#[derive(Clone)]
pub struct ErrorMessage {
    /// The actual yet hidden message.
    inner: ErrorMessageKind,
}

/// The actual error message as a hidden enum.
#[derive(Clone)]
enum ErrorMessageKind {
    /// The message is a static str.
    Static(&'static str),

    /// The message was built at runtime.
    Owned(String),
}

impl From<&'static str> for ErrorMessage {
    fn from(msg: &'static str) -> Self {
        ErrorMessage { inner: ErrorMessageKind::Static(msg) }
    }
}

impl From<String> for ErrorMessage {
    fn from(msg: String) -> Self {
        ErrorMessage { inner: ErrorMessageKind::Owned(msg) }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            ErrorMessageKind::Static(msg) => f.write_str(msg),
            ErrorMessageKind::Owned(ref msg) => f.write_str(msg),
        }
    }
}


//------------ Error ---------------------------------------------------------

/// An error produced while encoding, decoding, or binding values.
///
/// An error consists of its [`ErrorKind`], a message, and, for errors
/// discovered while decoding octets, the byte offset the decoder was at.
///
/// The type is cheap to clone so that it can be kept in caches, e.g. the
/// memoized per-record descriptor tables of the schema layer.
#[derive(Clone)]
pub struct Error {
    /// The category of the error.
    kind: ErrorKind,

    /// Human-readable detail.
    msg: ErrorMessage,

    /// The byte offset within the decoded input, if known.
    pos: Option<usize>,
}

impl Error {
    /// Creates a new error from a kind and a message.
    pub fn new(kind: ErrorKind, msg: impl Into<ErrorMessage>) -> Self {
        Error { kind, msg: msg.into(), pos: None }
    }

    /// Returns an identical error that reports the given byte offset.
    pub fn at(mut self, pos: usize) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the byte offset the error was discovered at, if any.
    pub fn pos(&self) -> Option<usize> {
        self.pos
    }

    //--- Shorthand constructors for the kinds used all over the crate.

    pub(crate) fn truncated(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::TruncatedInput, msg)
    }

    pub(crate) fn length(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::MalformedLength, msg)
    }

    pub(crate) fn tag(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::MalformedTag, msg)
    }

    pub(crate) fn unexpected(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::UnexpectedTag, msg)
    }

    pub(crate) fn validation(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::ValidationFailure, msg)
    }

    pub(crate) fn overflow(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::Overflow, msg)
    }

    pub(crate) fn missing(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::MissingRequired, msg)
    }

    pub(crate) fn mismatch(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::TypeMismatch, msg)
    }

    pub(crate) fn depth(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::DepthExceeded, msg)
    }

    /// Returns the error with the given field name prefixed to the message.
    pub(crate) fn in_field(self, name: &str) -> Self {
        Error {
            kind: self.kind,
            msg: format!("field {}: {}", name, self.msg).into(),
            pos: self.pos,
        }
    }

    /// Creates an error reporting a failed codec hook.
    ///
    /// This is the constructor for [`ToOctets`][crate::schema::ToOctets]
    /// and [`FromOctets`][crate::schema::FromOctets] implementations.
    pub fn custom(msg: impl Into<ErrorMessage>) -> Self {
        Self::new(ErrorKind::CustomCodec, msg)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("msg", &format_args!("{}", self.msg))
            .field("pos", &self.pos)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)?;
        if let Some(pos) = self.pos {
            write!(f, " (at offset {})", pos)?;
        }
        Ok(())
    }
}

impl error::Error for Error { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::validation("unused bits must not exceed 7").to_string(),
            "invalid content: unused bits must not exceed 7"
        );
        assert_eq!(
            Error::truncated("short value").at(12).to_string(),
            "unexpected end of input: short value (at offset 12)"
        );
    }

    #[test]
    fn kind_matching() {
        let err = Error::overflow(format!("{} does not fit i64", u64::MAX));
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert_eq!(err.pos(), None);
        assert_eq!(err.clone().at(3).pos(), Some(3));
    }
}
