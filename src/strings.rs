//! Character set checks for the restricted string types.
//!
//! Only UTF8String, PrintableString, and IA5String appear in the value
//! tree; the two restricted ones share their alphabet checks here so that
//! constructors, the decoder, and the schema layer all agree.

use crate::error::Error;


/// Checks that a string only uses the PrintableString alphabet.
///
/// That alphabet consists of the latin letters, the digits, space, and
/// the characters `' ( ) + , - . / : = ?`.
pub(crate) fn check_printable(s: &str) -> Result<(), Error> {
    if s.chars().all(is_printable_char) {
        Ok(())
    }
    else {
        Err(Error::validation(
            "character outside the PrintableString alphabet"
        ))
    }
}

/// Checks that a string only uses IA5, i.e., seven bit characters.
pub(crate) fn check_ia5(s: &str) -> Result<(), Error> {
    if s.bytes().all(|ch| ch <= 0x7F) {
        Ok(())
    }
    else {
        Err(Error::validation("character outside the IA5 range"))
    }
}

/// Returns whether a character is in the PrintableString alphabet.
fn is_printable_char(ch: char) -> bool {
    matches!(
        ch,
        'A'..='Z' | 'a'..='z' | '0'..='9'
        | ' ' | '\'' | '(' | ')' | '+' | ',' | '-' | '.' | '/' | ':'
        | '=' | '?'
    )
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn printable() {
        assert!(check_printable("Jane Doe (Sales), x-12.3/4:5=6?").is_ok());
        assert!(check_printable("").is_ok());
        assert!(check_printable("at@example").is_err());
        assert!(check_printable("under_score").is_err());
        assert!(check_printable("caf\u{e9}").is_err());
    }

    #[test]
    fn ia5() {
        assert!(check_ia5("mailbox@example.com\t\n").is_ok());
        assert!(check_ia5("").is_ok());
        assert!(check_ia5("caf\u{e9}").is_err());
    }
}
