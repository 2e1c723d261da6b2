//! Escape-sequence decoding and character literals.

use rowan::TextRange;

use crate::diagnostics::{Diagnostics, ErrorCode};

use super::cursor::Cursor;
use super::token::LitValue;
use super::unicode;

fn hex_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'a'..=b'f' => Some((b - b'a' + 10) as u32),
        b'A'..=b'F' => Some((b - b'A' + 10) as u32),
        _ => None,
    }
}

fn span(start: usize, cursor: &Cursor<'_>) -> TextRange {
    TextRange::new((start as u32).into(), (cursor.position() as u32).into())
}

/// Decodes one escape sequence with the cursor on the `\`. Returns the
/// scalar value, which may be an unpaired UTF-16 surrogate from `\u`; the
/// chunk decoder pairs those up. On an illegal escape a diagnostic is
/// emitted, the cursor still advances past the sequence, and `None` is
/// returned so the caller keeps the raw text.
pub(super) fn scan_escape(cursor: &mut Cursor<'_>, diagnostics: &mut Diagnostics) -> Option<u32> {
    let start = cursor.position();
    debug_assert_eq!(cursor.peek_byte(0), b'\\');
    cursor.advance(1);

    let value = match cursor.peek_byte(0) {
        b'n' => {
            cursor.advance(1);
            Some(u32::from('\n'))
        }
        b'r' => {
            cursor.advance(1);
            Some(u32::from('\r'))
        }
        b't' => {
            cursor.advance(1);
            Some(u32::from('\t'))
        }
        b'0' => {
            cursor.advance(1);
            Some(0)
        }
        b'\\' => {
            cursor.advance(1);
            Some(u32::from('\\'))
        }
        b'\'' => {
            cursor.advance(1);
            Some(u32::from('\''))
        }
        b'"' => {
            cursor.advance(1);
            Some(u32::from('"'))
        }
        b'u' => {
            cursor.advance(1);
            scan_hex_digits(cursor, 4, 4)
        }
        b'U' => {
            cursor.advance(1);
            match scan_hex_digits(cursor, 8, 8) {
                Some(v) if v <= 0x0010_FFFF => Some(v),
                _ => None,
            }
        }
        b'x' => {
            cursor.advance(1);
            scan_hex_digits(cursor, 1, 4)
        }
        _ => {
            // Skip the offending character so progress is guaranteed.
            if let Some((_, width)) = cursor.try_peek_codepoint() {
                cursor.advance(width as usize);
            }
            None
        }
    };

    if value.is_none() {
        diagnostics
            .report(ErrorCode::IllegalEscape, span(start, cursor))
            .emit();
    }
    value
}

fn scan_hex_digits(cursor: &mut Cursor<'_>, min: usize, max: usize) -> Option<u32> {
    let mut value: u32 = 0;
    let mut count = 0;
    while count < max {
        match hex_value(cursor.peek_byte(0)) {
            Some(digit) => {
                value = (value << 4) + digit;
                cursor.advance(1);
                count += 1;
            }
            None => break,
        }
    }
    (count >= min).then_some(value)
}

pub(super) fn is_high_surrogate(v: u32) -> bool {
    (0xD800..=0xDBFF).contains(&v)
}

pub(super) fn is_low_surrogate(v: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&v)
}

pub(super) fn combine_surrogates(high: u32, low: u32) -> u32 {
    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
}

/// Scans a character literal with the cursor on the opening `'`. Always
/// produces a value; an empty or overlong literal keeps lexing and reports.
pub(super) fn scan_char_literal(
    cursor: &mut Cursor<'_>,
    diagnostics: &mut Diagnostics,
) -> LitValue {
    let start = cursor.position();
    debug_assert_eq!(cursor.peek_byte(0), b'\'');
    cursor.advance(1);

    let mut value: Option<char> = None;
    let mut count = 0;

    loop {
        let b = cursor.peek_byte(0);
        if b == b'\'' {
            cursor.advance(1);
            break;
        }
        let Some((c, width)) = cursor.try_peek_codepoint() else {
            diagnostics
                .report(ErrorCode::UnterminatedString, span(start, cursor))
                .emit();
            break;
        };
        if unicode::is_newline(c) {
            diagnostics
                .report(ErrorCode::UnterminatedString, span(start, cursor))
                .emit();
            break;
        }
        if b == b'\\' {
            let scalar = scan_escape(cursor, diagnostics);
            if count == 0 {
                value = scalar.and_then(char::from_u32);
            }
        } else {
            cursor.advance(width as usize);
            if count == 0 {
                value = Some(c);
            }
        }
        count += 1;
    }

    if count == 0 {
        diagnostics
            .report(ErrorCode::EmptyCharLiteral, span(start, cursor))
            .emit();
    } else if count > 1 {
        diagnostics
            .report(ErrorCode::TooManyCharsInCharLiteral, span(start, cursor))
            .emit();
    }

    LitValue::Char(value.unwrap_or('\0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(input: &str) -> (Option<u32>, Diagnostics, usize) {
        let mut cursor = Cursor::new(input);
        let mut diagnostics = Diagnostics::new();
        let value = scan_escape(&mut cursor, &mut diagnostics);
        (value, diagnostics, cursor.position())
    }

    #[test]
    fn simple_escapes() {
        assert_eq!(escape(r"\n").0, Some(u32::from('\n')));
        assert_eq!(escape(r"\t").0, Some(u32::from('\t')));
        assert_eq!(escape(r"\0").0, Some(0));
        assert_eq!(escape(r"\\").0, Some(u32::from('\\')));
        assert_eq!(escape(r#"\""#).0, Some(u32::from('"')));
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(escape(r"\U0001F600").0, Some(0x0001_F600));
        assert_eq!(escape(r"\u0041").0, Some(0x41));
        assert_eq!(escape(r"\x41").0, Some(0x41));
        assert_eq!(escape(r"\x4").0, Some(0x4));
    }

    #[test]
    fn utf32_overflow_is_illegal() {
        let (value, diagnostics, _) = escape(r"\Uffffffff");
        assert_eq!(value, None);
        assert_eq!(diagnostics.as_slice()[0].code, ErrorCode::IllegalEscape);
    }

    #[test]
    fn surrogate_pair_scalars() {
        let (high, _, consumed) = escape(r"\uD83D");
        assert_eq!(high, Some(0xD83D));
        assert_eq!(consumed, 6);
        assert!(is_high_surrogate(0xD83D));
        assert!(is_low_surrogate(0xDE00));
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), 0x1F600);
    }

    #[test]
    fn short_unicode_escape_is_illegal() {
        let (value, diagnostics, _) = escape(r"\uFjFF");
        assert_eq!(value, None);
        assert_eq!(diagnostics.as_slice()[0].code, ErrorCode::IllegalEscape);
    }

    #[test]
    fn unknown_escape_is_illegal() {
        let (value, diagnostics, pos) = escape(r"\q");
        assert_eq!(value, None);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(pos, 2); // still consumed
    }

    fn char_lit(input: &str) -> (LitValue, Diagnostics, usize) {
        let mut cursor = Cursor::new(input);
        let mut diagnostics = Diagnostics::new();
        let value = scan_char_literal(&mut cursor, &mut diagnostics);
        (value, diagnostics, cursor.position())
    }

    #[test]
    fn char_literals() {
        assert_eq!(char_lit("'a'").0, LitValue::Char('a'));
        assert_eq!(char_lit(r"'\n'").0, LitValue::Char('\n'));
        assert_eq!(char_lit(r"'A'").0, LitValue::Char('A'));
        assert_eq!(char_lit("'ä'").0, LitValue::Char('ä'));
    }

    #[test]
    fn empty_char_literal() {
        let (value, diagnostics, pos) = char_lit("''x");
        assert_eq!(value, LitValue::Char('\0'));
        assert_eq!(diagnostics.as_slice()[0].code, ErrorCode::EmptyCharLiteral);
        assert_eq!(pos, 2);
    }

    #[test]
    fn overlong_char_literal_keeps_first() {
        let (value, diagnostics, _) = char_lit("'ab'");
        assert_eq!(value, LitValue::Char('a'));
        assert_eq!(
            diagnostics.as_slice()[0].code,
            ErrorCode::TooManyCharsInCharLiteral
        );
    }

    #[test]
    fn unterminated_char_literal() {
        let (value, diagnostics, _) = char_lit("'a\nrest");
        assert_eq!(value, LitValue::Char('a'));
        assert_eq!(
            diagnostics.as_slice()[0].code,
            ErrorCode::UnterminatedString
        );
    }
}
