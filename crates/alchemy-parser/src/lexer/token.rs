//! Token records and the lexed token list.
//!
//! Tokens are split hot/cold: the hot record is a fixed-size, copyable
//! struct indexed by token id (its position in the list); decoded literal
//! values live in a side table keyed by id and are only materialized for
//! literal tokens.

use alchemy_syntax::SyntaxKind;
use bitflags::bitflags;
use indexmap::IndexMap;
use rowan::{TextRange, TextSize};

bitflags! {
    /// Per-token state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TokenFlags: u8 {
        /// Zero-width token synthesized during recovery.
        const MISSING = 1 << 0;
        /// The token itself carries a diagnostic.
        const ERROR = 1 << 1;
        const LEADING_TRIVIA = 1 << 2;
        const TRAILING_TRIVIA = 1 << 3;
        /// Zero-width marker for an intentionally empty grammar slot.
        const OMITTED = 1 << 4;
    }
}

/// The hot token record: kind, contextual kind, flags, and source span.
///
/// `contextual_kind` is set when an identifier's spelling matches a
/// contextual keyword (`where`, `get`, ...) or a lone `_`; the token kind
/// stays `IdentifierToken` and the parser decides which reading applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub contextual_kind: Option<SyntaxKind>,
    pub flags: TokenFlags,
    pub span: TextRange,
}

impl Token {
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self {
            kind,
            contextual_kind: None,
            flags: TokenFlags::empty(),
            span,
        }
    }

    #[inline]
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.flags.contains(TokenFlags::MISSING)
    }

    #[inline]
    pub fn width(&self) -> TextSize {
        self.span.len()
    }
}

/// Decoded value of a literal token, tagged by literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum LitValue {
    Bool(bool),
    Char(char),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Decoded content of one string chunk, escapes resolved.
    String(String),
}

/// Output of the lexer: every token in source order (trivia included),
/// terminated by an `Eof` token, plus the cold literal-value table.
#[derive(Debug, Default)]
pub struct TokenList {
    pub(crate) tokens: Vec<Token>,
    pub(crate) literals: IndexMap<u32, LitValue>,
}

impl TokenList {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Token> {
        self.tokens.get(id as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Decoded value for a literal token, if it has one.
    pub fn literal(&self, id: u32) -> Option<&LitValue> {
        self.literals.get(&id)
    }

    /// Source text of a token. O(1) slice.
    pub fn text<'s>(&self, source: &'s str, id: u32) -> &'s str {
        let span = self.tokens[id as usize].span;
        &source[usize::from(span.start())..usize::from(span.end())]
    }

    /// Ids of the trivia tokens attached to `id` as leading trivia: the run
    /// between the previous non-trivia token's trailing trivia and the token
    /// itself.
    pub fn leading_trivia(&self, id: u32) -> std::ops::Range<u32> {
        let id = id as usize;
        debug_assert!(!self.tokens[id].is_trivia());
        let mut start = id;
        while start > 0 && self.tokens[start - 1].is_trivia() {
            start -= 1;
        }
        // Trivia on the previous token's line belongs to the previous token.
        let mut first = start;
        if start > 0 {
            while first < id && self.tokens[first].kind != SyntaxKind::Newline {
                first += 1;
            }
        }
        first as u32..id as u32
    }

    /// Ids of the trivia tokens attached to `id` as trailing trivia: the run
    /// after the token up to, but not including, the next newline.
    pub fn trailing_trivia(&self, id: u32) -> std::ops::Range<u32> {
        let id = id as usize;
        debug_assert!(!self.tokens[id].is_trivia());
        let mut end = id + 1;
        while end < self.tokens.len()
            && self.tokens[end].is_trivia()
            && self.tokens[end].kind != SyntaxKind::Newline
        {
            end += 1;
        }
        (id + 1) as u32..end as u32
    }
}
