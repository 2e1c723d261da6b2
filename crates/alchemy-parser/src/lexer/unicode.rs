//! Character classification for identifiers, whitespace, and newlines.
//!
//! ASCII is decided with range checks; everything else consults the Unicode
//! general category via `unicode-properties`.

use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// identifier-start-character: a letter (any Unicode letter category or Nl)
/// or `_`.
pub fn is_identifier_start(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_alphabetic() || c == '_';
    }
    matches!(
        c.general_category(),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::LetterNumber
    )
}

/// identifier-part-character: letters, digits, `_`, plus connecting,
/// combining, and formatting characters (Pc, Mn, Mc, Cf).
pub fn is_identifier_part(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_alphanumeric() || c == '_';
    }
    matches!(
        c.general_category(),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::LetterNumber
            | GeneralCategory::NonspacingMark
            | GeneralCategory::SpacingMark
            | GeneralCategory::DecimalNumber
            | GeneralCategory::ConnectorPunctuation
            | GeneralCategory::Format
    )
}

/// new-line-character: CR, LF, NEL, LS, PS.
pub fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

/// Horizontal whitespace: space, tab, vertical tab, form feed, SUB, and
/// category Zs. The BOM is category Cf, handled separately by the lexer.
pub fn is_whitespace(c: char) -> bool {
    if c.is_ascii() {
        return matches!(c, ' ' | '\t' | '\x0B' | '\x0C' | '\x1A');
    }
    c.general_category() == GeneralCategory::SpaceSeparator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_identifiers() {
        assert!(is_identifier_start('a'));
        assert!(is_identifier_start('_'));
        assert!(!is_identifier_start('5'));
        assert!(is_identifier_part('5'));
        assert!(!is_identifier_part('-'));
    }

    #[test]
    fn unicode_identifiers() {
        assert!(is_identifier_start('ä'));
        assert!(is_identifier_start('変'));
        assert!(is_identifier_start('α'));
        // Combining acute accent continues but cannot start.
        assert!(is_identifier_part('\u{0301}'));
        assert!(!is_identifier_start('\u{0301}'));
        // Zero-width joiner is Cf.
        assert!(is_identifier_part('\u{200D}'));
    }

    #[test]
    fn newlines() {
        assert!(is_newline('\n'));
        assert!(is_newline('\r'));
        assert!(is_newline('\u{2028}'));
        assert!(is_newline('\u{2029}'));
        assert!(!is_newline(' '));
    }

    #[test]
    fn whitespace() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\t'));
        assert!(is_whitespace('\u{00A0}')); // no-break space is Zs
        assert!(!is_whitespace('\n'));
    }
}
