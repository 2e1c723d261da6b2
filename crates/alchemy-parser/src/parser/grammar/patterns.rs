//! Pattern parsing: constants, declarations, recursive (positional and
//! property), lists, slices, relational operators, and `and`/`or`/`not`
//! combinators.
//!
//! In contexts where both a pattern and an expression are legal (`case`
//! labels), a pattern that turns out to be a plain constant expression is
//! left unwrapped; combinators wrap their operands retroactively through
//! checkpoints.

use alchemy_syntax::facts::{self, Precedence};
use alchemy_syntax::SyntaxKind::*;
use rowan::Checkpoint;

use crate::parser::core::Parser;

use super::types::{ParseTypeMode, ScanTypeFlags};

impl Parser<'_> {
    /// Parses a pattern, always producing a pattern node.
    pub(crate) fn parse_pattern(&mut self, precedence: Precedence) {
        self.parse_pattern_allow_bare(precedence, false);
    }

    /// Designations may not reuse the pattern combinator keywords.
    fn is_possible_designation(&mut self) -> bool {
        if self.at_contextual(UnderscoreToken) {
            return true;
        }
        self.is_true_identifier()
            && !matches!(
                self.current_contextual(),
                Some(AndKeyword) | Some(OrKeyword) | Some(WhenKeyword)
            )
    }

    /// Parses a pattern; when `allow_bare` is set, a constant pattern is
    /// left as its bare expression and `false` is returned. This is the
    /// pattern-to-expression conversion for `case` labels.
    pub(crate) fn parse_pattern_allow_bare(
        &mut self,
        precedence: Precedence,
        allow_bare: bool,
    ) -> bool {
        let checkpoint = self.checkpoint();
        let mut is_pattern = self.parse_conjunctive_pattern(precedence);

        while self.at_contextual(OrKeyword) {
            if !is_pattern {
                self.wrap_constant_pattern(checkpoint);
            }
            is_pattern = true;
            self.bump_as(OrKeyword);
            let rhs = self.checkpoint();
            if !self.parse_conjunctive_pattern(precedence) {
                self.wrap_constant_pattern(rhs);
            }
            self.start_node_at(checkpoint, OrPattern);
            self.finish_node();
        }

        if !is_pattern && !allow_bare {
            self.wrap_constant_pattern(checkpoint);
            is_pattern = true;
        }
        is_pattern
    }

    fn wrap_constant_pattern(&mut self, checkpoint: Checkpoint) {
        self.start_node_at(checkpoint, ConstantPattern);
        self.finish_node();
    }

    fn parse_conjunctive_pattern(&mut self, precedence: Precedence) -> bool {
        let checkpoint = self.checkpoint();
        let mut is_pattern = self.parse_negated_pattern(precedence);

        while self.at_contextual(AndKeyword) {
            if !is_pattern {
                self.wrap_constant_pattern(checkpoint);
            }
            is_pattern = true;
            self.bump_as(AndKeyword);
            let rhs = self.checkpoint();
            if !self.parse_negated_pattern(precedence) {
                self.wrap_constant_pattern(rhs);
            }
            self.start_node_at(checkpoint, AndPattern);
            self.finish_node();
        }
        is_pattern
    }

    fn parse_negated_pattern(&mut self, precedence: Precedence) -> bool {
        if self.at_contextual(NotKeyword) {
            let checkpoint = self.checkpoint();
            self.bump_as(NotKeyword);
            let rhs = self.checkpoint();
            if !self.parse_negated_pattern(precedence) {
                self.wrap_constant_pattern(rhs);
            }
            self.start_node_at(checkpoint, NotPattern);
            self.finish_node();
            return true;
        }
        self.parse_primary_pattern(precedence)
    }

    /// Returns whether a pattern node was produced; `false` means a bare
    /// constant expression was parsed instead.
    fn parse_primary_pattern(&mut self, precedence: Precedence) -> bool {
        let tk = self.current();

        // Relational patterns: `< expr`, `>= expr`, ...
        let (op, extra) = self.fuse_greater_than(tk);
        if matches!(
            op,
            LessThanToken | LessThanEqualsToken | GreaterThanToken | GreaterThanEqualsToken
        ) {
            self.start_node(RelationalPattern);
            self.bump();
            for _ in 0..extra {
                self.bump();
            }
            self.parse_sub_expression(Precedence::Relational);
            self.finish_node();
            return true;
        }

        match tk {
            VarKeyword => {
                self.start_node(VarPattern);
                self.bump();
                self.parse_designation();
                self.finish_node();
                true
            }
            IdentifierToken if self.current_contextual() == Some(UnderscoreToken) => {
                self.start_node(DiscardPattern);
                self.bump_as(UnderscoreToken);
                self.finish_node();
                true
            }
            OpenParenToken => {
                self.parse_positional_or_parenthesized_pattern(precedence);
                true
            }
            OpenBraceToken => {
                let checkpoint = self.checkpoint();
                self.parse_property_pattern_clause();
                self.finish_recursive_pattern(checkpoint);
                true
            }
            OpenBracketToken => {
                self.parse_list_pattern();
                true
            }
            _ => self.parse_type_or_constant_pattern(precedence),
        }
    }

    /// Decides between a declaration/recursive/type pattern and a constant
    /// expression using a bounded type scan.
    fn parse_type_or_constant_pattern(&mut self, precedence: Precedence) -> bool {
        let point = self.reset_point();
        let flags = self.scan_type(ParseTypeMode::AfterIs);
        let after = self.current();
        let after_is_designation = self.is_possible_designation()
            || matches!(after, OpenBraceToken | OpenParenToken);
        self.restore(point);

        if flags != ScanTypeFlags::NotType && after_is_designation {
            // `T x`, `T { ... }`, `T ( ... )`
            let checkpoint = self.checkpoint();
            self.parse_type(ParseTypeMode::DefinitePattern);
            match self.current() {
                OpenBraceToken => {
                    self.parse_property_pattern_clause();
                    self.finish_recursive_pattern(checkpoint);
                }
                OpenParenToken => {
                    self.parse_positional_clause_for_recursive(checkpoint);
                }
                _ => {
                    self.start_node_at(checkpoint, DeclarationPattern);
                    self.parse_designation();
                    self.finish_node();
                }
            }
            return true;
        }

        if flags == ScanTypeFlags::MustBeType || flags == ScanTypeFlags::NullableType {
            // A type with no designation (`case int:`, `case Foo[]:`) is a
            // type pattern; qualified names without a strong type signal
            // stay constant expressions.
            self.start_node(TypePattern);
            self.parse_type(ParseTypeMode::DefinitePattern);
            self.finish_node();
            return true;
        }

        // Constant pattern: an expression limited below lambdas/assignment.
        let limit = precedence.max(Precedence::Conditional);
        self.parse_sub_expression(limit);
        false
    }

    /// `( sub, sub ) { props }? designation?` or `( pattern )`.
    fn parse_positional_or_parenthesized_pattern(&mut self, precedence: Precedence) {
        debug_assert!(self.at(OpenParenToken));
        let checkpoint = self.checkpoint();
        self.bump(); // `(`

        let first = self.checkpoint();
        let named = self.parse_subpattern_content(precedence);

        if self.at(CommaToken) || named {
            self.start_node_at(first, Subpattern);
            self.finish_node();
            while self.at(CommaToken) {
                self.bump();
                self.start_node(Subpattern);
                self.parse_subpattern_content(precedence);
                self.finish_node();
            }
            self.expect(CloseParenToken);
            self.start_node_at(checkpoint, PositionalPatternClause);
            self.finish_node();
            self.finish_recursive_pattern_after_positional(checkpoint);
        } else {
            self.expect(CloseParenToken);
            self.start_node_at(checkpoint, ParenthesizedPattern);
            self.finish_node();
        }
    }

    fn parse_positional_clause_for_recursive(&mut self, type_checkpoint: Checkpoint) {
        debug_assert!(self.at(OpenParenToken));
        let clause = self.checkpoint();
        self.bump();
        if !self.at(CloseParenToken) {
            self.start_node(Subpattern);
            self.parse_subpattern_content(Precedence::Conditional);
            self.finish_node();
            while self.eat(CommaToken) {
                self.start_node(Subpattern);
                self.parse_subpattern_content(Precedence::Conditional);
                self.finish_node();
            }
        }
        self.expect(CloseParenToken);
        self.start_node_at(clause, PositionalPatternClause);
        self.finish_node();
        self.finish_recursive_pattern_after_positional(type_checkpoint);
    }

    /// Optional property clause and designation after a positional clause,
    /// then the enclosing `RecursivePattern` wrap.
    fn finish_recursive_pattern_after_positional(&mut self, checkpoint: Checkpoint) {
        if self.at(OpenBraceToken) {
            self.parse_property_pattern_clause();
        }
        self.finish_recursive_pattern(checkpoint);
    }

    fn finish_recursive_pattern(&mut self, checkpoint: Checkpoint) {
        if self.is_possible_designation() {
            self.parse_designation();
        }
        self.start_node_at(checkpoint, RecursivePattern);
        self.finish_node();
    }

    /// `{ Name: pattern, ... }`
    fn parse_property_pattern_clause(&mut self) {
        debug_assert!(self.at(OpenBraceToken));
        self.start_node(PropertyPatternClause);
        self.bump();
        let mut last_pos = usize::MAX;
        while !self.at(CloseBraceToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            self.start_node(Subpattern);
            self.parse_subpattern_content(Precedence::Conditional);
            self.finish_node();
            if !self.eat(CommaToken) {
                break;
            }
        }
        self.expect(CloseBraceToken);
        self.finish_node();
    }

    /// `[name:] pattern`. Returns whether the name prefix was present.
    fn parse_subpattern_content(&mut self, precedence: Precedence) -> bool {
        let named =
            self.at(IdentifierToken) && self.nth(1) == ColonToken && self.nth(2) != ColonToken;
        if named {
            self.start_node(NameColon);
            self.bump();
            self.bump();
            self.finish_node();
        }
        self.parse_pattern(precedence);
        named
    }

    /// `[ pattern, .., pattern ] designation?`
    fn parse_list_pattern(&mut self) {
        debug_assert!(self.at(OpenBracketToken));
        self.start_node(ListPattern);
        self.bump();
        let mut last_pos = usize::MAX;
        while !self.at(CloseBracketToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if self.at(DotDotToken) {
                self.start_node(SlicePattern);
                self.bump();
                if self.starts_pattern() {
                    self.parse_pattern(Precedence::Conditional);
                }
                self.finish_node();
            } else {
                self.parse_pattern(Precedence::Conditional);
            }
            if !self.eat(CommaToken) {
                break;
            }
        }
        self.expect(CloseBracketToken);
        if self.is_possible_designation() {
            self.parse_designation();
        }
        self.finish_node();
    }

    fn starts_pattern(&mut self) -> bool {
        let tk = self.current();
        matches!(
            tk,
            OpenParenToken
                | OpenBraceToken
                | OpenBracketToken
                | VarKeyword
                | LessThanToken
                | LessThanEqualsToken
                | GreaterThanToken
                | IdentifierToken
        ) || facts::is_predefined_type(tk)
            || self.is_possible_expression(false, false)
    }

    /// `x is ...` right-hand side: a plain type keeps the node an
    /// `IsExpression`; anything pattern-shaped makes it an
    /// `IsPatternExpression`. Returns `true` for the pattern reading.
    pub(crate) fn parse_type_or_pattern_for_is(&mut self) -> bool {
        // Shapes that can only be patterns.
        if self.at_contextual(NotKeyword)
            || self.at_contextual(UnderscoreToken)
            || matches!(
                self.current(),
                OpenBraceToken | OpenBracketToken | VarKeyword
            )
        {
            self.parse_pattern(Precedence::Relational);
            return true;
        }

        let current = self.current();
        let (op, _) = self.fuse_greater_than(current);
        if matches!(
            op,
            LessThanToken | LessThanEqualsToken | GreaterThanToken | GreaterThanEqualsToken
        ) {
            self.parse_pattern(Precedence::Relational);
            return true;
        }

        let point = self.reset_point();
        let flags = self.scan_type(ParseTypeMode::AfterIs);
        let continues_pattern = flags != ScanTypeFlags::NotType
            && (self.is_possible_designation()
                || matches!(self.current(), OpenBraceToken | OpenParenToken)
                || self.at_contextual(AndKeyword)
                || self.at_contextual(OrKeyword));
        let scanned_type = flags != ScanTypeFlags::NotType;
        self.restore(point);

        if continues_pattern || !scanned_type {
            // `x is T y`, `x is { ... }`, `x is T and ...`, `x is 1 or 2`
            self.parse_pattern(Precedence::Relational);
            true
        } else {
            // `x is T`: plain type test.
            self.parse_type(ParseTypeMode::AfterIs);
            false
        }
    }
}
