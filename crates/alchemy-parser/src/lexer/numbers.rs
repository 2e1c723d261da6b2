//! Numeric literal scanning and decoding.

use rowan::TextRange;

use crate::diagnostics::{Diagnostics, ErrorCode};

use super::cursor::Cursor;
use super::token::LitValue;

fn is_dec_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

fn is_binary_digit(b: u8) -> bool {
    b == b'0' || b == b'1'
}

/// Scans the digits (and underscores) of a single integer run into `buffer`,
/// recording underscore misuse. The cursor is left on the first byte that is
/// neither a digit of the requested base nor an underscore.
fn scan_single_integer(
    cursor: &mut Cursor<'_>,
    buffer: &mut String,
    underscore_in_wrong_place: &mut bool,
    is_hex: bool,
    is_binary: bool,
) {
    if cursor.peek_byte(0) == b'_' {
        *underscore_in_wrong_place = true;
    }
    let mut last_was_underscore = false;
    loop {
        let b = cursor.peek_byte(0);
        if b == b'_' {
            last_was_underscore = true;
        } else if if is_hex {
            is_hex_digit(b)
        } else if is_binary {
            is_binary_digit(b)
        } else {
            is_dec_digit(b)
        } {
            buffer.push(b as char);
            last_was_underscore = false;
        } else {
            break;
        }
        cursor.advance(1);
    }
    if last_was_underscore {
        *underscore_in_wrong_place = true;
    }
}

/// Scans a numeric literal at the cursor. Returns `None` without advancing
/// when the input is a lone `.` not followed by a digit; the caller then
/// lexes the dot tokens itself.
///
/// Every malformed literal still produces a value (0 for integers) so the
/// parser downstream always sees a usable token.
pub(super) fn scan_numeric_literal(
    cursor: &mut Cursor<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<LitValue> {
    let start = cursor.position();
    let mut is_hex = false;
    let mut is_binary = false;
    let mut has_decimal = false;
    let mut has_exponent = false;
    let mut has_u_suffix = false;
    let mut has_l_suffix = false;
    let mut underscore_in_wrong_place = false;
    let mut buffer = String::new();

    if cursor.peek_byte(0) == b'0' {
        match cursor.peek_byte(1) {
            b'x' | b'X' => {
                cursor.advance(2);
                is_hex = true;
            }
            b'b' | b'B' => {
                cursor.advance(2);
                is_binary = true;
            }
            _ => {}
        }
    }

    let mut real_suffix: Option<u8> = None;

    if is_hex || is_binary {
        scan_single_integer(
            cursor,
            &mut buffer,
            &mut underscore_in_wrong_place,
            is_hex,
            is_binary,
        );
        match cursor.peek_byte(0) {
            b'l' | b'L' => {
                cursor.advance(1);
                has_l_suffix = true;
                if matches!(cursor.peek_byte(0), b'u' | b'U') {
                    cursor.advance(1);
                    has_u_suffix = true;
                }
            }
            b'u' | b'U' => {
                cursor.advance(1);
                has_u_suffix = true;
                if matches!(cursor.peek_byte(0), b'l' | b'L') {
                    cursor.advance(1);
                    has_l_suffix = true;
                }
            }
            _ => {}
        }
    } else {
        scan_single_integer(
            cursor,
            &mut buffer,
            &mut underscore_in_wrong_place,
            false,
            false,
        );

        if cursor.peek_byte(0) == b'.' {
            if is_dec_digit(cursor.peek_byte(1)) {
                has_decimal = true;
                buffer.push('.');
                cursor.advance(1);
                scan_single_integer(
                    cursor,
                    &mut buffer,
                    &mut underscore_in_wrong_place,
                    false,
                    false,
                );
            } else if buffer.is_empty() {
                // Only the dot so far; not a numeric literal at all.
                return None;
            }
        }

        match cursor.peek_byte(0) {
            b'e' | b'E' => {
                buffer.push('e');
                cursor.advance(1);
                has_exponent = true;
                let b = cursor.peek_byte(0);
                if b == b'-' || b == b'+' {
                    buffer.push(b as char);
                    cursor.advance(1);
                }
                let b = cursor.peek_byte(0);
                if !is_dec_digit(b) && b != b'_' {
                    diagnostics
                        .report(ErrorCode::InvalidReal, span(start, cursor))
                        .emit();
                    // Dummy exponent so the value still decodes.
                    buffer.push('0');
                } else {
                    scan_single_integer(
                        cursor,
                        &mut buffer,
                        &mut underscore_in_wrong_place,
                        false,
                        false,
                    );
                }
            }
            _ => {}
        }

        match cursor.peek_byte(0) {
            b'f' | b'F' => {
                cursor.advance(1);
                real_suffix = Some(b'f');
            }
            b'd' | b'D' => {
                cursor.advance(1);
                real_suffix = Some(b'd');
            }
            b'l' | b'L' if !has_decimal && !has_exponent => {
                cursor.advance(1);
                has_l_suffix = true;
                if matches!(cursor.peek_byte(0), b'u' | b'U') {
                    cursor.advance(1);
                    has_u_suffix = true;
                }
            }
            b'u' | b'U' if !has_decimal && !has_exponent => {
                cursor.advance(1);
                has_u_suffix = true;
                if matches!(cursor.peek_byte(0), b'l' | b'L') {
                    cursor.advance(1);
                    has_l_suffix = true;
                }
            }
            _ => {}
        }
    }

    if underscore_in_wrong_place {
        diagnostics
            .report(ErrorCode::InvalidNumber, span(start, cursor))
            .emit();
    }

    let is_real = has_decimal || has_exponent || real_suffix.is_some();
    let value = if is_real {
        decode_real(&buffer, real_suffix, start, cursor, diagnostics)
    } else {
        decode_integer(
            &buffer,
            is_hex,
            is_binary,
            has_u_suffix,
            has_l_suffix,
            underscore_in_wrong_place,
            start,
            cursor,
            diagnostics,
        )
    };

    Some(value)
}

fn span(start: usize, cursor: &Cursor<'_>) -> TextRange {
    TextRange::new(
        (start as u32).into(),
        (cursor.position() as u32).into(),
    )
}

fn decode_real(
    buffer: &str,
    suffix: Option<u8>,
    start: usize,
    cursor: &Cursor<'_>,
    diagnostics: &mut Diagnostics,
) -> LitValue {
    if suffix == Some(b'f') {
        match buffer.parse::<f32>() {
            Ok(v) if v.is_finite() => LitValue::F32(v),
            _ => {
                diagnostics
                    .report(ErrorCode::InvalidReal, span(start, cursor))
                    .emit();
                LitValue::F32(0.0)
            }
        }
    } else {
        match buffer.parse::<f64>() {
            Ok(v) if v.is_finite() => LitValue::F64(v),
            _ => {
                diagnostics
                    .report(ErrorCode::InvalidReal, span(start, cursor))
                    .emit();
                LitValue::F64(0.0)
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_integer(
    buffer: &str,
    is_hex: bool,
    is_binary: bool,
    has_u_suffix: bool,
    has_l_suffix: bool,
    already_invalid: bool,
    start: usize,
    cursor: &Cursor<'_>,
    diagnostics: &mut Diagnostics,
) -> LitValue {
    if buffer.is_empty() {
        // `0x` or `0b` with no digits.
        if !already_invalid {
            diagnostics
                .report(ErrorCode::InvalidNumber, span(start, cursor))
                .emit();
        }
        return LitValue::I32(0);
    }

    let radix = if is_hex {
        16
    } else if is_binary {
        2
    } else {
        10
    };

    let value = match u64::from_str_radix(buffer, radix) {
        Ok(v) => v,
        Err(_) => {
            // Digits were validated during scanning, so the only failure
            // mode left is overflow.
            diagnostics
                .report(ErrorCode::IntOverflow, span(start, cursor))
                .emit();
            return LitValue::I32(0);
        }
    };

    select_integer_kind(value, has_u_suffix, has_l_suffix)
}

/// Picks the literal kind: a `u`/`l` suffix takes that kind directly,
/// otherwise the smallest of i32, u32, i64, u64 that holds the value.
fn select_integer_kind(value: u64, has_u: bool, has_l: bool) -> LitValue {
    match (has_u, has_l) {
        (true, true) => LitValue::U64(value),
        (true, false) => {
            if let Ok(v) = u32::try_from(value) {
                LitValue::U32(v)
            } else {
                LitValue::U64(value)
            }
        }
        (false, true) => {
            if let Ok(v) = i64::try_from(value) {
                LitValue::I64(v)
            } else {
                LitValue::U64(value)
            }
        }
        (false, false) => {
            if let Ok(v) = i32::try_from(value) {
                LitValue::I32(v)
            } else if let Ok(v) = u32::try_from(value) {
                LitValue::U32(v)
            } else if let Ok(v) = i64::try_from(value) {
                LitValue::I64(v)
            } else {
                LitValue::U64(value)
            }
        }
    }
}
