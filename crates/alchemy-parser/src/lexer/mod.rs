//! The Alchemy lexer.
//!
//! A streaming tokenizer over a [`Cursor`]: trivia (whitespace, newlines,
//! comments) become their own tokens, literals are decoded as they are
//! scanned, and string interpolation is handled with a mode stack that
//! re-enters normal tokenization inside `${ ... }`.
//!
//! The lexer never aborts: every malformed construct emits a diagnostic,
//! advances at least one byte (or pops a mode), and keeps going. The output
//! always ends with a zero-width `Eof` token.

mod cursor;
mod keywords;
mod numbers;
mod strings;
mod token;
pub(crate) mod unicode;

#[cfg(test)]
mod tests;

use alchemy_syntax::SyntaxKind;
use indexmap::IndexMap;
use rowan::TextRange;

use crate::diagnostics::{Diagnostics, ErrorCode};

pub use cursor::Cursor;
pub use keywords::match_keyword;
pub use token::{LitValue, Token, TokenFlags, TokenList};

/// Lexer state: which construct the cursor is currently inside.
///
/// `Normal` is the bottom of the stack and is never popped. Entering a
/// string pushes `InString`; `${` pushes `InInterpolation`, whose contents
/// are tokenized exactly like normal code apart from brace accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    InString { start: usize },
    InInterpolation { brace_depth: u32 },
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    diagnostics: Diagnostics,
    tokens: Vec<Token>,
    literals: IndexMap<u32, LitValue>,
    modes: Vec<Mode>,
}

/// Tokenizes `source` into a [`TokenList`] plus the lexical diagnostics.
///
/// Every byte of the input is covered by exactly one token (counting trivia
/// tokens), and the list always ends with `Eof`.
pub fn tokenize(source: &str) -> (TokenList, Diagnostics) {
    let mut lexer = Lexer {
        cursor: Cursor::new(source),
        diagnostics: Diagnostics::new(),
        tokens: Vec::new(),
        literals: IndexMap::new(),
        modes: vec![Mode::Normal],
    };
    lexer.run();
    lexer.finish()
}

impl<'a> Lexer<'a> {
    fn run(&mut self) {
        loop {
            match self.mode() {
                Mode::InString { start } => {
                    if !self.scan_string_part(start) {
                        break;
                    }
                }
                _ => {
                    self.scan_trivia();
                    if !self.cursor.has_more_content() {
                        break;
                    }
                    self.scan_token();
                }
            }
        }

        if self.modes.len() > 1 {
            // End of input while inside a string or interpolation.
            let start = self
                .modes
                .iter()
                .rev()
                .find_map(|m| match m {
                    Mode::InString { start } => Some(*start),
                    _ => None,
                })
                .unwrap_or(self.cursor.position());
            self.diagnostics
                .report(
                    ErrorCode::UnterminatedString,
                    range(start, self.cursor.position()),
                )
                .emit();
        }

        let eof_pos = self.cursor.position();
        self.push_token(Token::new(SyntaxKind::Eof, range(eof_pos, eof_pos)));
    }

    fn finish(mut self) -> (TokenList, Diagnostics) {
        self.compute_trivia_flags();
        (
            TokenList {
                tokens: self.tokens,
                literals: self.literals,
            },
            self.diagnostics,
        )
    }

    fn mode(&self) -> Mode {
        *self.modes.last().expect("mode stack never empty")
    }

    fn push_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn push_simple(&mut self, kind: SyntaxKind, start: usize) {
        let span = range(start, self.cursor.position());
        self.push_token(Token::new(kind, span));
    }

    fn push_literal(&mut self, kind: SyntaxKind, start: usize, value: LitValue) {
        let id = self.tokens.len() as u32;
        self.push_simple(kind, start);
        self.literals.insert(id, value);
    }

    // ------------------------------------------------------------------
    // Trivia
    // ------------------------------------------------------------------

    fn scan_trivia(&mut self) {
        loop {
            let start = self.cursor.position();
            let Some((c, width)) = self.cursor.try_peek_codepoint() else {
                return;
            };
            match c {
                _ if unicode::is_whitespace(c) || c == '\u{FEFF}' => {
                    self.scan_whitespace_run();
                    self.push_simple(SyntaxKind::Whitespace, start);
                }
                '\r' => {
                    self.cursor.advance(1);
                    self.cursor.try_advance(b'\n');
                    self.push_simple(SyntaxKind::Newline, start);
                }
                _ if unicode::is_newline(c) => {
                    self.cursor.advance(width as usize);
                    self.push_simple(SyntaxKind::Newline, start);
                }
                '/' if self.cursor.peek_byte(1) == b'/' => {
                    self.scan_to_end_of_line();
                    self.push_simple(SyntaxKind::SingleLineComment, start);
                }
                '/' if self.cursor.peek_byte(1) == b'*' => {
                    self.scan_multi_line_comment(start);
                    self.push_simple(SyntaxKind::MultiLineComment, start);
                }
                _ => return,
            }
        }
    }

    fn scan_whitespace_run(&mut self) {
        while let Some((c, width)) = self.cursor.try_peek_codepoint() {
            if unicode::is_whitespace(c) || c == '\u{FEFF}' {
                self.cursor.advance(width as usize);
            } else {
                break;
            }
        }
    }

    fn scan_to_end_of_line(&mut self) {
        while let Some((c, width)) = self.cursor.try_peek_codepoint() {
            if unicode::is_newline(c) {
                break;
            }
            self.cursor.advance(width as usize);
        }
    }

    fn scan_multi_line_comment(&mut self, start: usize) {
        self.cursor.advance(2); // `/*`
        match memchr::memmem::find(self.cursor.remaining().as_bytes(), b"*/") {
            Some(offset) => self.cursor.advance(offset + 2),
            None => {
                self.cursor.advance(self.cursor.remaining().len());
                self.diagnostics
                    .report(
                        ErrorCode::UnterminatedComment,
                        range(start, self.cursor.position()),
                    )
                    .emit();
            }
        }
    }

    // ------------------------------------------------------------------
    // Regular tokens
    // ------------------------------------------------------------------

    fn scan_token(&mut self) {
        let start = self.cursor.position();
        let c = self.cursor.peek_char();

        match c {
            '"' => {
                self.cursor.advance(1);
                self.push_simple(SyntaxKind::StringLiteralStart, start);
                self.modes.push(Mode::InString { start });
            }
            '\'' => {
                let value = strings::scan_char_literal(&mut self.cursor, &mut self.diagnostics);
                self.push_literal(SyntaxKind::CharacterLiteralToken, start, value);
            }
            '/' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::SlashEqualsToken
                } else {
                    SyntaxKind::SlashToken
                };
                self.push_simple(kind, start);
            }
            '.' => {
                match numbers::scan_numeric_literal(&mut self.cursor, &mut self.diagnostics) {
                    Some(value) => {
                        self.push_literal(SyntaxKind::NumericLiteralToken, start, value)
                    }
                    None => {
                        self.cursor.advance(1);
                        let mut kind = SyntaxKind::DotToken;
                        if self.cursor.try_advance(b'.') {
                            kind = SyntaxKind::DotDotToken;
                            if self.cursor.try_advance(b'.') {
                                kind = SyntaxKind::DotDotDotToken;
                            }
                        }
                        self.push_simple(kind, start);
                    }
                }
            }
            ',' => self.single(SyntaxKind::CommaToken, start),
            ';' => self.single(SyntaxKind::SemicolonToken, start),
            '~' => self.single(SyntaxKind::TildeToken, start),
            '(' => self.single(SyntaxKind::OpenParenToken, start),
            ')' => self.single(SyntaxKind::CloseParenToken, start),
            '[' => self.single(SyntaxKind::OpenBracketToken, start),
            ']' => self.single(SyntaxKind::CloseBracketToken, start),
            '{' => {
                if let Mode::InInterpolation { brace_depth } = self.mode() {
                    *self.modes.last_mut().unwrap() = Mode::InInterpolation {
                        brace_depth: brace_depth + 1,
                    };
                }
                self.single(SyntaxKind::OpenBraceToken, start);
            }
            '}' => match self.mode() {
                Mode::InInterpolation { brace_depth: 0 } => {
                    self.modes.pop();
                    self.single(SyntaxKind::InterpolationEnd, start);
                }
                Mode::InInterpolation { brace_depth } => {
                    *self.modes.last_mut().unwrap() = Mode::InInterpolation {
                        brace_depth: brace_depth - 1,
                    };
                    self.single(SyntaxKind::CloseBraceToken, start);
                }
                _ => self.single(SyntaxKind::CloseBraceToken, start),
            },
            ':' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b':') {
                    SyntaxKind::ColonColonToken
                } else {
                    SyntaxKind::ColonToken
                };
                self.push_simple(kind, start);
            }
            '!' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::ExclamationEqualsToken
                } else {
                    SyntaxKind::ExclamationToken
                };
                self.push_simple(kind, start);
            }
            '=' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::EqualsEqualsToken
                } else if self.cursor.try_advance(b'>') {
                    SyntaxKind::EqualsGreaterThanToken
                } else {
                    SyntaxKind::EqualsToken
                };
                self.push_simple(kind, start);
            }
            '*' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::AsteriskEqualsToken
                } else {
                    SyntaxKind::AsteriskToken
                };
                self.push_simple(kind, start);
            }
            '%' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::PercentEqualsToken
                } else {
                    SyntaxKind::PercentToken
                };
                self.push_simple(kind, start);
            }
            '?' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'?') {
                    if self.cursor.try_advance(b'=') {
                        SyntaxKind::QuestionQuestionEqualsToken
                    } else {
                        SyntaxKind::QuestionQuestionToken
                    }
                } else {
                    SyntaxKind::QuestionToken
                };
                self.push_simple(kind, start);
            }
            '+' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::PlusEqualsToken
                } else if self.cursor.try_advance(b'+') {
                    SyntaxKind::PlusPlusToken
                } else {
                    SyntaxKind::PlusToken
                };
                self.push_simple(kind, start);
            }
            '-' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::MinusEqualsToken
                } else if self.cursor.try_advance(b'-') {
                    SyntaxKind::MinusMinusToken
                } else if self.cursor.try_advance(b'>') {
                    SyntaxKind::MinusGreaterThanToken
                } else {
                    SyntaxKind::MinusToken
                };
                self.push_simple(kind, start);
            }
            '&' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::AmpersandEqualsToken
                } else if self.cursor.try_advance(b'&') {
                    SyntaxKind::AmpersandAmpersandToken
                } else {
                    SyntaxKind::AmpersandToken
                };
                self.push_simple(kind, start);
            }
            '|' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::BarEqualsToken
                } else if self.cursor.try_advance(b'|') {
                    SyntaxKind::BarBarToken
                } else {
                    SyntaxKind::BarToken
                };
                self.push_simple(kind, start);
            }
            '^' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'=') {
                    SyntaxKind::CaretEqualsToken
                } else {
                    SyntaxKind::CaretToken
                };
                self.push_simple(kind, start);
            }
            '<' => {
                self.cursor.advance(1);
                let kind = if self.cursor.try_advance(b'<') {
                    if self.cursor.try_advance(b'=') {
                        SyntaxKind::LessThanLessThanEqualsToken
                    } else {
                        SyntaxKind::LessThanLessThanToken
                    }
                } else if self.cursor.try_advance(b'=') {
                    SyntaxKind::LessThanEqualsToken
                } else {
                    SyntaxKind::LessThanToken
                };
                self.push_simple(kind, start);
            }
            // `>` never fuses in the lexer; the parser joins adjacent `>`
            // tokens when the grammar calls for a shift or `>=` operator.
            '>' => self.single(SyntaxKind::GreaterThanToken, start),
            '0'..='9' => {
                let value = numbers::scan_numeric_literal(&mut self.cursor, &mut self.diagnostics)
                    .expect("digit always scans");
                self.push_literal(SyntaxKind::NumericLiteralToken, start, value);
            }
            _ if unicode::is_identifier_start(c) => self.scan_identifier_or_keyword(start),
            _ => {
                let width = self
                    .cursor
                    .try_peek_codepoint()
                    .map(|(_, w)| w as usize)
                    .unwrap_or(1);
                self.cursor.advance(width);
                self.diagnostics
                    .report(
                        ErrorCode::UnexpectedCharacter,
                        range(start, self.cursor.position()),
                    )
                    .message(format!("unexpected character '{}'", c))
                    .emit();
                let mut token = Token::new(
                    SyntaxKind::BadToken,
                    range(start, self.cursor.position()),
                );
                token.flags |= TokenFlags::ERROR;
                self.push_token(token);
            }
        }
    }

    fn single(&mut self, kind: SyntaxKind, start: usize) {
        self.cursor.advance(1);
        self.push_simple(kind, start);
    }

    fn scan_identifier_or_keyword(&mut self, start: usize) {
        while let Some((c, width)) = self.cursor.try_peek_codepoint() {
            if unicode::is_identifier_part(c) {
                self.cursor.advance(width as usize);
            } else {
                break;
            }
        }
        let text = self.cursor.slice_from(start);
        let span = range(start, self.cursor.position());

        let mut token = Token::new(SyntaxKind::IdentifierToken, span);
        match match_keyword(text) {
            Some(keyword) if keyword.is_reserved_keyword() => {
                token.kind = keyword;
                if keyword == SyntaxKind::TrueKeyword {
                    self.literals
                        .insert(self.tokens.len() as u32, LitValue::Bool(true));
                } else if keyword == SyntaxKind::FalseKeyword {
                    self.literals
                        .insert(self.tokens.len() as u32, LitValue::Bool(false));
                }
            }
            Some(contextual) => token.contextual_kind = Some(contextual),
            None => {
                if text == "_" {
                    token.contextual_kind = Some(SyntaxKind::UnderscoreToken);
                }
            }
        }
        self.push_token(token);
    }

    // ------------------------------------------------------------------
    // String scanning
    // ------------------------------------------------------------------

    /// Scans one string part (chunk, marker, or interpolation opener).
    /// Returns `false` when the input ran out.
    fn scan_string_part(&mut self, string_start: usize) -> bool {
        let start = self.cursor.position();
        let b = self.cursor.peek_byte(0);

        if !self.cursor.has_more_content() {
            self.terminate_string(string_start, start);
            return false;
        }

        match b {
            b'"' => {
                self.cursor.advance(1);
                self.push_simple(SyntaxKind::StringLiteralEnd, start);
                self.modes.pop();
            }
            b'$' if self.cursor.peek_byte(1) == b'{' => {
                self.cursor.advance(2);
                self.push_simple(SyntaxKind::InterpolationStart, start);
                self.modes.push(Mode::InInterpolation { brace_depth: 0 });
            }
            b'$' if self.is_interp_identifier_start() => {
                self.cursor.advance(1);
                self.push_simple(SyntaxKind::DollarToken, start);
                let ident_start = self.cursor.position();
                while let Some((c, width)) = self.cursor.try_peek_codepoint() {
                    if unicode::is_identifier_part(c) {
                        self.cursor.advance(width as usize);
                    } else {
                        break;
                    }
                }
                self.push_simple(SyntaxKind::IdentifierToken, ident_start);
            }
            _ => {
                if let Some((c, _)) = self.cursor.try_peek_codepoint() {
                    if unicode::is_newline(c) {
                        self.terminate_string(string_start, start);
                        return true;
                    }
                }
                self.scan_string_chunk(start);
            }
        }
        true
    }

    fn is_interp_identifier_start(&self) -> bool {
        let rest = &self.cursor.remaining()[1..];
        rest.chars()
            .next()
            .is_some_and(unicode::is_identifier_start)
    }

    /// Unterminated string: report, close the literal with a zero-width end
    /// marker, and fall back to the surrounding mode.
    fn terminate_string(&mut self, string_start: usize, at: usize) {
        self.diagnostics
            .report(ErrorCode::UnterminatedString, range(string_start, at))
            .emit();
        let mut token = Token::new(SyntaxKind::StringLiteralEnd, range(at, at));
        token.flags |= TokenFlags::ERROR | TokenFlags::MISSING;
        self.push_token(token);
        self.modes.pop();
    }

    fn scan_string_chunk(&mut self, start: usize) {
        let mut value = String::new();
        let mut pending_high: Option<u32> = None;

        loop {
            let Some((c, width)) = self.cursor.try_peek_codepoint() else {
                break;
            };
            match c {
                '"' => break,
                '$' if self.cursor.peek_byte(1) == b'{' || self.is_interp_identifier_start() => {
                    break
                }
                _ if unicode::is_newline(c) => break,
                '\\' => {
                    let escape_start = self.cursor.position();
                    match strings::scan_escape(&mut self.cursor, &mut self.diagnostics) {
                        Some(scalar) => {
                            if let Some(high) = pending_high.take() {
                                if strings::is_low_surrogate(scalar) {
                                    let combined = strings::combine_surrogates(high, scalar);
                                    value.push(
                                        char::from_u32(combined).unwrap_or('\u{FFFD}'),
                                    );
                                    continue;
                                }
                                value.push('\u{FFFD}');
                            }
                            if strings::is_high_surrogate(scalar) {
                                pending_high = Some(scalar);
                            } else {
                                value.push(char::from_u32(scalar).unwrap_or('\u{FFFD}'));
                            }
                        }
                        None => {
                            // Keep the raw text of an illegal escape.
                            value.push_str(self.cursor.slice_from(escape_start));
                        }
                    }
                }
                _ => {
                    self.cursor.advance(width as usize);
                    if pending_high.take().is_some() {
                        value.push('\u{FFFD}');
                    }
                    value.push(c);
                }
            }
        }
        if pending_high.is_some() {
            value.push('\u{FFFD}');
        }

        debug_assert!(self.cursor.position() > start, "chunk must consume input");
        self.push_literal(
            SyntaxKind::StringLiteralChunk,
            start,
            LitValue::String(value),
        );
    }

    // ------------------------------------------------------------------
    // Post-pass
    // ------------------------------------------------------------------

    /// Marks each non-trivia token that has attached leading or trailing
    /// trivia. The attachment rule itself lives on [`TokenList`].
    fn compute_trivia_flags(&mut self) {
        let len = self.tokens.len();
        for i in 0..len {
            if self.tokens[i].is_trivia() {
                continue;
            }
            let leading = i > 0 && self.tokens[i - 1].is_trivia();
            let trailing = i + 1 < len
                && self.tokens[i + 1].is_trivia()
                && self.tokens[i + 1].kind != SyntaxKind::Newline;
            if leading {
                self.tokens[i].flags |= TokenFlags::LEADING_TRIVIA;
            }
            if trailing {
                self.tokens[i].flags |= TokenFlags::TRAILING_TRIVIA;
            }
        }
    }
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new((start as u32).into(), (end as u32).into())
}
