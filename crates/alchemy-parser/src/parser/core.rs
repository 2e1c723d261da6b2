//! Parser state machine and low-level operations.

use alchemy_syntax::{SyntaxKind, SyntaxNode, TokenSet};
use indexmap::IndexMap;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange};

use crate::diagnostics::{Diagnostics, ErrorCode};
use crate::lexer::{LitValue, Token, TokenFlags};
use crate::Error;

use super::terminator::TerminatorState;

/// What a list loop should do after skipping unparseable tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostSkipAction {
    /// A separator or element start was found; resume the list.
    Continue,
    /// A terminator was found; exit the list.
    Abort,
}

/// A scoped snapshot of the parser's observable state for speculative
/// scanning: cursor position, buffered trivia, and emitted diagnostics.
/// Speculative scans never write to the tree builder, so restoring these
/// three rewinds everything.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResetPoint {
    pos: usize,
    trivia_len: usize,
    diagnostics_len: usize,
}

/// Trivia tokens are buffered while peeking and flushed as leading trivia
/// when the next token or node is committed to the tree. Trailing trivia
/// (same line, up to but not including the newline) is attached eagerly
/// after each consumed token.
pub struct Parser<'src> {
    pub(crate) source: &'src str,
    pub(crate) tokens: Vec<Token>,
    pub(crate) literals: IndexMap<u32, LitValue>,
    pub(crate) pos: usize,
    pub(crate) trivia_buffer: Vec<Token>,
    pub(crate) builder: GreenNodeBuilder<'static>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) term_state: TerminatorState,
    pub(crate) depth: u32,
    pub(crate) debug_fuel: std::cell::Cell<u32>,
    exec_fuel_remaining: Option<u32>,
    recursion_fuel_limit: Option<u32>,
    fatal_error: Option<Error>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>, literals: IndexMap<u32, LitValue>) -> Self {
        Self {
            source,
            tokens,
            literals,
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            term_state: TerminatorState::empty(),
            depth: 0,
            debug_fuel: std::cell::Cell::new(256),
            exec_fuel_remaining: None,
            recursion_fuel_limit: None,
            fatal_error: None,
        }
    }

    pub fn with_exec_fuel(mut self, limit: Option<u32>) -> Self {
        self.exec_fuel_remaining = limit;
        self
    }

    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel_limit = limit;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn parse(mut self) -> Result<(SyntaxNode, Diagnostics), Error> {
        self.parse_compilation_unit();
        let (green, diagnostics) = self.finish()?;
        Ok((SyntaxNode::new_root(green), diagnostics))
    }

    fn finish(mut self) -> Result<(GreenNode, Diagnostics), Error> {
        if let Some(err) = self.fatal_error {
            return Err(err);
        }
        debug_assert!(self.trivia_buffer.is_empty(), "trivia must be flushed");
        Ok((self.builder.finish(), self.diagnostics))
    }

    pub(crate) fn has_fatal_error(&self) -> bool {
        self.fatal_error.is_some()
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    /// Kind of the current (non-trivia) token. `Eof` saturates.
    pub(crate) fn current(&mut self) -> SyntaxKind {
        self.nth(0)
    }

    /// Full record of the current token.
    pub(crate) fn current_token(&mut self) -> Token {
        self.skip_trivia_to_buffer();
        self.token_at(self.pos)
    }

    /// Contextual kind of the current token (`where`, `get`, `_`, ...).
    pub(crate) fn current_contextual(&mut self) -> Option<SyntaxKind> {
        self.current_token().contextual_kind
    }

    /// LL(k) lookahead past trivia. `nth(0)` is the current token.
    pub(crate) fn nth(&mut self, lookahead: usize) -> SyntaxKind {
        self.nth_token(lookahead).kind
    }

    pub(crate) fn nth_token(&mut self, lookahead: usize) -> Token {
        self.ensure_progress();
        self.skip_trivia_to_buffer();
        let mut remaining = lookahead;
        let mut pos = self.pos;
        while pos < self.tokens.len() {
            let token = self.tokens[pos];
            if !token.is_trivia() {
                if remaining == 0 {
                    return token;
                }
                remaining -= 1;
            }
            pos += 1;
        }
        self.eof_token()
    }

    fn token_at(&self, pos: usize) -> Token {
        if pos < self.tokens.len() {
            self.tokens[pos]
        } else {
            self.eof_token()
        }
    }

    fn eof_token(&self) -> Token {
        // The lexer always terminates the list with Eof, so this fallback
        // only covers reads past the end during speculation.
        *self.tokens.last().expect("token list is never empty")
    }

    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_set(&mut self, set: TokenSet) -> bool {
        set.contains(self.current())
    }

    pub(crate) fn at_contextual(&mut self, kind: SyntaxKind) -> bool {
        self.current() == SyntaxKind::IdentifierToken && self.current_contextual() == Some(kind)
    }

    pub(crate) fn at_eof(&mut self) -> bool {
        self.at(SyntaxKind::Eof)
    }

    pub(crate) fn current_span(&mut self) -> TextRange {
        self.current_token().span
    }

    /// Text of the current token.
    pub(crate) fn current_text(&mut self) -> &'src str {
        let span = self.current_span();
        &self.source[usize::from(span.start())..usize::from(span.end())]
    }

    /// True when the token `lookahead` steps ahead starts at the byte where
    /// the previous token ends, with no trivia between. Used for `>`-fusion.
    pub(crate) fn tokens_adjacent(&mut self, lookahead: usize) -> bool {
        let prev = self.nth_token(lookahead - 1);
        let next = self.nth_token(lookahead);
        prev.span.end() == next.span.start()
    }

    // ------------------------------------------------------------------
    // Trivia plumbing
    // ------------------------------------------------------------------

    pub(crate) fn skip_trivia_to_buffer(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].is_trivia() {
            self.trivia_buffer.push(self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    pub(crate) fn drain_trivia(&mut self) {
        for token in std::mem::take(&mut self.trivia_buffer) {
            self.push_token_to_tree(token.kind, token.span);
        }
    }

    /// After consuming a token, pull its same-line trivia (everything up to
    /// but not including the next newline) into the tree immediately so it
    /// stays inside the current node.
    fn attach_trailing_trivia(&mut self) {
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos];
            if !token.is_trivia() || token.kind == SyntaxKind::Newline {
                break;
            }
            self.push_token_to_tree(token.kind, token.span);
            self.pos += 1;
        }
    }

    fn push_token_to_tree(&mut self, kind: SyntaxKind, span: TextRange) {
        let text = &self.source[usize::from(span.start())..usize::from(span.end())];
        self.builder.token(kind.into(), text);
    }

    // ------------------------------------------------------------------
    // Tree building
    // ------------------------------------------------------------------

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    /// Wrap previously-parsed content using a checkpoint.
    pub(crate) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(crate) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(crate) fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
        self.builder.checkpoint()
    }

    /// Consumes the current token into the tree.
    pub(crate) fn bump(&mut self) {
        let kind = self.current();
        self.bump_as(kind);
    }

    /// Consumes the current token, relabeling it as `kind`. The source text
    /// is preserved; only the stored kind changes. Used for contextual
    /// keywords and recovery.
    pub(crate) fn bump_as(&mut self, kind: SyntaxKind) {
        debug_assert!(!self.at_eof(), "bump at EOF");
        self.skip_trivia_to_buffer();
        self.drain_trivia();
        self.reset_debug_fuel();
        self.consume_exec_fuel();

        let token = self.token_at(self.pos);
        self.push_token_to_tree(kind, token.span);
        self.pos += 1;
        self.attach_trailing_trivia();
    }

    /// Consumes the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes a contextual keyword, relabeling the identifier token.
    pub(crate) fn eat_contextual(&mut self, kind: SyntaxKind) -> bool {
        if self.at_contextual(kind) {
            self.bump_as(kind);
            true
        } else {
            false
        }
    }

    /// Consumes the current token if it matches; otherwise synthesizes a
    /// zero-width missing token of the expected kind and reports a targeted
    /// diagnostic at the insertion point.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) {
        if self.at(kind) {
            self.bump();
        } else {
            self.missing_token(kind, true);
        }
    }

    /// Inserts a zero-width token of kind `expected` at the current
    /// position. A token that already carries an error does not generate a
    /// second "expected" message at its insertion site.
    pub(crate) fn missing_token(&mut self, expected: SyntaxKind, report: bool) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
        let current = self.token_at(self.pos);
        if report && !current.flags.contains(TokenFlags::ERROR) {
            let code = expected_token_code(expected, current.kind);
            let at = TextRange::empty(current.span.start());
            let mut builder = self.diagnostics.report(code, at);
            if code == ErrorCode::SyntaxError {
                builder = builder.message(format!("'{}' expected", expected.describe()));
            } else if code == ErrorCode::IdentifierExpectedKeyword {
                builder = builder.message(format!(
                    "identifier expected; '{}' is a keyword",
                    current.kind.describe()
                ));
            }
            builder.emit();
        }
        self.builder.token(expected.into(), "");
    }

    /// Pushes the end-of-file token into the tree, after flushing any
    /// trailing trivia as its leading trivia.
    pub(crate) fn bump_eof(&mut self) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
        let token = self.token_at(self.pos);
        debug_assert_eq!(token.kind, SyntaxKind::Eof);
        self.push_token_to_tree(SyntaxKind::Eof, token.span);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Zero-width marker for an intentionally absent array size.
    pub(crate) fn omitted_array_size(&mut self) {
        self.start_node(SyntaxKind::OmittedArraySizeExpression);
        self.builder
            .token(SyntaxKind::OmittedArraySizeToken.into(), "");
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Speculation
    // ------------------------------------------------------------------

    pub(crate) fn reset_point(&self) -> ResetPoint {
        ResetPoint {
            pos: self.pos,
            trivia_len: self.trivia_buffer.len(),
            diagnostics_len: self.diagnostics.len(),
        }
    }

    /// Rewinds the cursor, buffered trivia, and diagnostics to the reset
    /// point. Scans that only used `scan_advance` are fully undone.
    pub(crate) fn restore(&mut self, point: ResetPoint) {
        self.pos = point.pos;
        self.trivia_buffer.truncate(point.trivia_len);
        self.diagnostics.truncate(point.diagnostics_len);
        self.reset_debug_fuel();
    }

    /// Advances over the current token without writing to the tree. Only
    /// valid inside a speculative scan that will be restored or replayed.
    pub(crate) fn scan_advance(&mut self) -> Token {
        self.skip_trivia_to_buffer();
        let token = self.token_at(self.pos);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        self.reset_debug_fuel();
        token
    }

    // ------------------------------------------------------------------
    // Errors and recovery
    // ------------------------------------------------------------------

    pub(crate) fn error(&mut self, code: ErrorCode) {
        let range = self.current_span();
        self.diagnostics.report(code, range).emit();
    }

    pub(crate) fn error_msg(&mut self, code: ErrorCode, message: impl Into<String>) {
        let range = self.current_span();
        self.diagnostics.report(code, range).message(message).emit();
    }

    /// Consumes the current token into a `SkippedTokens` run with an error.
    pub(crate) fn error_and_skip(&mut self, code: ErrorCode) {
        self.error(code);
        if !self.at_eof() {
            self.start_node(SyntaxKind::SkippedTokens);
            self.bump();
            self.finish_node();
        }
    }

    /// Skips tokens until `is_expected` holds, `abort` says the enclosing
    /// list is over, or a terminator is reached. Skipped tokens land in a
    /// `SkippedTokens` node so the source round-trips. The first skipped
    /// token carries the "expected" diagnostic.
    pub(crate) fn skip_bad_tokens(
        &mut self,
        expected: SyntaxKind,
        is_expected: impl Fn(&mut Self) -> bool,
        abort: impl Fn(&mut Self) -> bool,
    ) -> PostSkipAction {
        let mut action = PostSkipAction::Continue;
        let mut opened = false;
        let mut first = true;
        let mut last_pos = usize::MAX;

        loop {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if is_expected(self) {
                break;
            }
            if self.at_eof() || abort(self) || self.is_terminator() {
                action = PostSkipAction::Abort;
                break;
            }
            if first {
                self.missing_token_diagnostic_only(expected);
                first = false;
            }
            if !opened {
                self.start_node(SyntaxKind::SkippedTokens);
                opened = true;
            }
            self.bump();
        }

        if opened {
            self.finish_node();
        }
        action
    }

    fn missing_token_diagnostic_only(&mut self, expected: SyntaxKind) {
        let current = self.current_token();
        if !current.flags.contains(TokenFlags::ERROR) {
            let code = expected_token_code(expected, current.kind);
            let mut builder = self.diagnostics.report(code, current.span);
            if code == ErrorCode::SyntaxError {
                builder = builder.message(format!("'{}' expected", expected.describe()));
            }
            builder.emit();
        }
    }

    // ------------------------------------------------------------------
    // Terminator states
    // ------------------------------------------------------------------

    /// Runs `f` with additional terminator bits set, restoring the previous
    /// set on every exit path.
    pub(crate) fn with_terminator<T>(
        &mut self,
        bits: TerminatorState,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.term_state;
        self.term_state |= bits;
        let result = f(self);
        self.term_state = saved;
        result
    }

    // ------------------------------------------------------------------
    // Fuel
    // ------------------------------------------------------------------

    fn consume_exec_fuel(&mut self) {
        if let Some(ref mut remaining) = self.exec_fuel_remaining {
            if *remaining == 0 {
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(Error::ExecFuelExhausted);
                }
                return;
            }
            *remaining -= 1;
        }
    }

    pub(crate) fn enter_recursion(&mut self) -> bool {
        if let Some(limit) = self.recursion_fuel_limit
            && self.depth >= limit
        {
            if self.fatal_error.is_none() {
                self.fatal_error = Some(Error::RecursionLimitExceeded);
            }
            return false;
        }
        self.depth += 1;
        self.reset_debug_fuel();
        true
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.reset_debug_fuel();
    }

    pub(crate) fn should_stop(&mut self) -> bool {
        self.has_fatal_error() || self.at_eof()
    }

    /// Every inner loop must advance the cursor between iterations; this is
    /// the backstop against recovery code that spins in place.
    pub(crate) fn is_making_progress(&mut self, last_pos: &mut usize) -> bool {
        if *last_pos == usize::MAX || self.pos > *last_pos {
            *last_pos = self.pos;
            return true;
        }
        debug_assert!(false, "parser is not making progress at {}", self.pos);
        false
    }
}

/// Targeted error code for "expected X, found Y".
pub(crate) fn expected_token_code(expected: SyntaxKind, actual: SyntaxKind) -> ErrorCode {
    match expected {
        SyntaxKind::IdentifierToken => {
            if actual.is_reserved_keyword() {
                ErrorCode::IdentifierExpectedKeyword
            } else {
                ErrorCode::IdentifierExpected
            }
        }
        SyntaxKind::SemicolonToken => ErrorCode::SemicolonExpected,
        SyntaxKind::CloseParenToken => ErrorCode::CloseParenExpected,
        SyntaxKind::CloseBracketToken => ErrorCode::CloseBracketExpected,
        SyntaxKind::OpenBraceToken => ErrorCode::LbraceExpected,
        SyntaxKind::CloseBraceToken => ErrorCode::RbraceExpected,
        SyntaxKind::ColonToken => ErrorCode::ColonExpected,
        SyntaxKind::InKeyword => ErrorCode::InExpected,
        SyntaxKind::ForEachKeyword => ErrorCode::ExpectedForeachKeyword,
        _ => ErrorCode::SyntaxError,
    }
}
