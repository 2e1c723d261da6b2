//! Expression parsing: precedence climbing over the operator table, term
//! parsing with postfix chains, cast/lambda/tuple disambiguation behind
//! reset points, and interpolated strings.

use alchemy_syntax::facts::{self, Precedence};
use alchemy_syntax::SyntaxKind::{self, *};
use rowan::Checkpoint;

use crate::diagnostics::ErrorCode;
use crate::parser::core::{Parser, PostSkipAction};
use crate::parser::terminator::TerminatorState;

use super::types::{NameOptions, ParseTypeMode, ScanTypeFlags};

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) {
        self.parse_sub_expression(Precedence::Expression);
    }

    /// Core precedence-climbing loop.
    pub(crate) fn parse_sub_expression(&mut self, precedence: Precedence) {
        if !self.enter_recursion() {
            self.consume_rest_as_error();
            return;
        }
        let checkpoint = self.checkpoint();
        self.parse_prefix_or_term(checkpoint, precedence);
        self.parse_binary_suffixes(checkpoint, precedence);
        self.exit_recursion();
    }

    fn consume_rest_as_error(&mut self) {
        self.start_node(SyntaxKind::Error);
        while !self.should_stop() {
            self.bump();
        }
        self.finish_node();
    }

    fn parse_prefix_or_term(&mut self, checkpoint: Checkpoint, precedence: Precedence) {
        let tk = self.current();

        // Statement keywords can never begin a sub-expression. Report here
        // without consuming; the enclosing construct decides what to do
        // with the keyword. (`switch` still works as an *infix* operator:
        // the continuation loop below handles `expr switch { ... }`.)
        if facts::is_invalid_sub_expression(tk) {
            self.report_invalid_term(tk);
            return;
        }

        if let Some(unary_kind) = facts::prefix_unary_expression_kind(tk) {
            self.bump();
            self.parse_sub_expression(Precedence::Unary);
            self.start_node_at(checkpoint, unary_kind);
            self.finish_node();
        } else if tk == DotDotToken {
            // Range with no left operand: `..b` or a bare `..`.
            self.bump();
            if self.can_start_expression() {
                self.parse_sub_expression(Precedence::Range);
            }
            self.start_node_at(checkpoint, RangeExpression);
            self.finish_node();
        } else if tk == ThrowKeyword {
            self.bump();
            self.parse_sub_expression(Precedence::Coalescing);
            self.start_node_at(checkpoint, ThrowExpression);
            self.finish_node();
        } else if tk == RefKeyword {
            self.bump();
            self.parse_sub_expression(Precedence::Expression);
            self.start_node_at(checkpoint, RefExpression);
            self.finish_node();
        } else if tk == OpenParenToken && self.scan_cast() {
            self.bump(); // `(`
            self.parse_type(ParseTypeMode::Normal);
            self.expect(CloseParenToken);
            self.parse_sub_expression(Precedence::Cast);
            self.start_node_at(checkpoint, CastExpression);
            self.finish_node();
        } else {
            self.parse_term(checkpoint, precedence);
        }
    }

    fn can_start_expression(&mut self) -> bool {
        self.is_possible_expression(false, false)
    }

    // ------------------------------------------------------------------
    // Binary operators, assignment, conditional, switch/with, is/as
    // ------------------------------------------------------------------

    fn parse_binary_suffixes(&mut self, checkpoint: Checkpoint, precedence: Precedence) {
        let mut last_pos = usize::MAX;
        while self.is_making_progress(&mut last_pos) {
            let tk = self.current();

            // Fuse adjacent `>` tokens into shift/relational operators; the
            // lexer never does this so that nested generics close cleanly.
            let (op_token, extra_tokens) = self.fuse_greater_than(tk);

            let op_kind = if let Some(kind) = facts::assignment_expression_kind(op_token) {
                kind
            } else if let Some(kind) = facts::binary_expression_kind(op_token) {
                kind
            } else if op_token == QuestionToken {
                ConditionalExpression
            } else if op_token == SwitchKeyword {
                SwitchExpression
            } else if op_token == IdentifierToken
                && self.current_contextual() == Some(WithKeyword)
                && self.nth(1) == OpenBraceToken
            {
                WithExpression
            } else {
                break;
            };

            let new_precedence = facts::precedence_of(op_kind);
            if new_precedence < precedence {
                break;
            }
            if new_precedence == precedence && !facts::is_right_associative(op_kind) {
                break;
            }

            match op_kind {
                // `x is Type` / `x is pattern` and `x as Type` replace the
                // generic binary handling.
                IsExpression => {
                    self.bump();
                    let kind = if self.parse_type_or_pattern_for_is() {
                        IsPatternExpression
                    } else {
                        IsExpression
                    };
                    self.start_node_at(checkpoint, kind);
                    self.finish_node();
                }
                AsExpression => {
                    self.bump();
                    self.parse_type(ParseTypeMode::AsExpression);
                    self.start_node_at(checkpoint, AsExpression);
                    self.finish_node();
                }
                ConditionalExpression => {
                    // `cond ? when-true : when-false`, right-associative.
                    self.bump();
                    self.parse_expression();
                    self.expect(ColonToken);
                    self.parse_sub_expression(Precedence::Conditional);
                    self.start_node_at(checkpoint, ConditionalExpression);
                    self.finish_node();
                }
                SwitchExpression => {
                    self.parse_switch_expression_suffix(checkpoint);
                }
                WithExpression => {
                    self.bump_as(WithKeyword);
                    self.parse_with_initializer();
                    self.start_node_at(checkpoint, WithExpression);
                    self.finish_node();
                }
                RangeExpression => {
                    // The right operand of `..` is optional: `a..` is open.
                    self.bump();
                    if self.can_start_expression() {
                        self.parse_sub_expression(new_precedence);
                    }
                    self.start_node_at(checkpoint, RangeExpression);
                    self.finish_node();
                }
                _ => {
                    self.bump(); // first operator token
                    for _ in 0..extra_tokens {
                        self.bump();
                    }
                    // The operand is parsed at the operator's own level;
                    // the equal-precedence break above realizes left
                    // associativity, and right-associative operators chain
                    // through the recursion instead.
                    self.parse_sub_expression(new_precedence);
                    self.start_node_at(checkpoint, op_kind);
                    self.finish_node();
                }
            }
        }
    }

    /// Detects `>`-sequences with no interior trivia and reports the fused
    /// operator kind plus how many extra tokens it consumes.
    pub(crate) fn fuse_greater_than(&mut self, tk: SyntaxKind) -> (SyntaxKind, usize) {
        if tk != GreaterThanToken {
            return (tk, 0);
        }
        if self.nth(1) == GreaterThanToken && self.tokens_adjacent(1) {
            if self.nth(2) == GreaterThanToken && self.tokens_adjacent(2) {
                if self.nth(3) == EqualsToken && self.tokens_adjacent(3) {
                    return (GreaterThanGreaterThanGreaterThanEqualsToken, 3);
                }
                return (GreaterThanGreaterThanGreaterThanToken, 2);
            }
            if self.nth(2) == EqualsToken && self.tokens_adjacent(2) {
                return (GreaterThanGreaterThanEqualsToken, 2);
            }
            return (GreaterThanGreaterThanToken, 1);
        }
        if self.nth(1) == EqualsToken && self.tokens_adjacent(1) {
            return (GreaterThanEqualsToken, 1);
        }
        (GreaterThanToken, 0)
    }

    // ------------------------------------------------------------------
    // Terms
    // ------------------------------------------------------------------

    fn parse_term(&mut self, checkpoint: Checkpoint, precedence: Precedence) {
        let tk = self.current();
        match tk {
            IdentifierToken => {
                if self.is_possible_lambda_expression(precedence) {
                    self.parse_lambda_expression(checkpoint);
                    return; // lambda bodies absorb their own postfix
                }
                self.parse_simple_name(NameOptions::IN_EXPRESSION);
            }
            NumericLiteralToken | CharacterLiteralToken | NullKeyword | TrueKeyword
            | FalseKeyword | DefaultKeyword => {
                self.parse_literal_expression(tk);
            }
            StringLiteralStart => {
                self.parse_string_literal_expression();
            }
            ThisKeyword => {
                self.start_node(ThisExpression);
                self.bump();
                self.finish_node();
            }
            BaseKeyword => {
                self.start_node(BaseExpression);
                self.bump();
                self.finish_node();
            }
            TypeOfKeyword => {
                self.start_node(TypeOfExpression);
                self.bump();
                self.expect(OpenParenToken);
                self.parse_type(ParseTypeMode::Normal);
                self.expect(CloseParenToken);
                self.finish_node();
            }
            SizeOfKeyword => {
                self.start_node(SizeOfExpression);
                self.bump();
                self.expect(OpenParenToken);
                self.parse_type(ParseTypeMode::Normal);
                self.expect(CloseParenToken);
                self.finish_node();
            }
            NewKeyword => self.parse_new_expression(checkpoint),
            DelegateKeyword => self.parse_anonymous_method(checkpoint),
            StackAllocKeyword => self.parse_stackalloc_expression(checkpoint),
            OpenParenToken => {
                if self.is_possible_lambda_expression(precedence) {
                    self.parse_lambda_expression(checkpoint);
                    return; // lambda bodies absorb their own postfix
                }
                self.parse_paren_or_tuple(checkpoint);
            }
            OpenBracketToken => self.parse_collection_expression(),
            StaticKeyword => {
                if self.is_possible_lambda_expression(precedence) {
                    self.parse_lambda_expression(checkpoint);
                    return;
                }
                self.report_invalid_term(tk);
                return;
            }
            kind if facts::is_predefined_type(kind) => {
                // `int.Parse(...)` and friends.
                self.start_node(PredefinedType);
                self.bump();
                self.finish_node();
            }
            _ => {
                self.report_invalid_term(tk);
                return; // no postfix on a missing term
            }
        }
        self.parse_postfix_expression(checkpoint);
    }

    fn report_invalid_term(&mut self, tk: SyntaxKind) {
        // Tokens that already carry a lexical error do not cascade into an
        // "invalid term" message as well.
        if !self
            .current_token()
            .flags
            .contains(crate::lexer::TokenFlags::ERROR)
        {
            let text = self.current_text().to_string();
            let shown = if text.is_empty() {
                tk.describe().to_string()
            } else {
                text
            };
            self.error_msg(
                ErrorCode::InvalidExprTerm,
                format!("invalid expression term '{shown}'"),
            );
        }
        self.create_missing_identifier_name(false);
    }

    fn parse_literal_expression(&mut self, tk: SyntaxKind) {
        // `default(T)` is an expression with a type; a bare `default` is
        // the only literal the operator table does not map.
        if tk == DefaultKeyword && self.nth(1) == OpenParenToken {
            self.start_node(DefaultExpression);
            self.bump();
            self.expect(OpenParenToken);
            self.parse_type(ParseTypeMode::Normal);
            self.expect(CloseParenToken);
            self.finish_node();
            return;
        }
        let node = facts::literal_expression_kind(tk).unwrap_or(DefaultLiteralExpression);
        self.start_node(node);
        self.bump();
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Postfix chains
    // ------------------------------------------------------------------

    fn parse_postfix_expression(&mut self, checkpoint: Checkpoint) {
        let mut last_pos = usize::MAX;
        while self.is_making_progress(&mut last_pos) {
            match self.current() {
                OpenParenToken => {
                    self.parse_argument_list(OpenParenToken, CloseParenToken, ArgumentList);
                    self.start_node_at(checkpoint, InvocationExpression);
                    self.finish_node();
                }
                OpenBracketToken => {
                    self.parse_argument_list(
                        OpenBracketToken,
                        CloseBracketToken,
                        BracketedArgumentList,
                    );
                    self.start_node_at(checkpoint, ElementAccessExpression);
                    self.finish_node();
                }
                DotToken => {
                    self.bump();
                    self.parse_simple_name(NameOptions::IN_EXPRESSION);
                    self.start_node_at(checkpoint, SimpleMemberAccessExpression);
                    self.finish_node();
                }
                MinusGreaterThanToken => {
                    self.bump();
                    self.parse_simple_name(NameOptions::IN_EXPRESSION);
                    self.start_node_at(checkpoint, PointerMemberAccessExpression);
                    self.finish_node();
                }
                ColonColonToken => {
                    // `a::b` past the alias position is always an error but
                    // parses like member access to keep the tree regular.
                    self.error(ErrorCode::UnexpectedDoubleColon);
                    self.bump();
                    self.parse_simple_name(NameOptions::IN_EXPRESSION);
                    self.start_node_at(checkpoint, SimpleMemberAccessExpression);
                    self.finish_node();
                }
                PlusPlusToken => {
                    self.bump();
                    self.start_node_at(checkpoint, PostIncrementExpression);
                    self.finish_node();
                }
                MinusMinusToken => {
                    self.bump();
                    self.start_node_at(checkpoint, PostDecrementExpression);
                    self.finish_node();
                }
                ExclamationToken => {
                    self.bump();
                    self.start_node_at(checkpoint, BangExpression);
                    self.finish_node();
                }
                QuestionToken
                    if matches!(self.nth(1), DotToken | OpenBracketToken) =>
                {
                    self.bump(); // `?`
                    if self.at(DotToken) {
                        self.start_node(MemberBindingExpression);
                        self.bump();
                        self.parse_simple_name(NameOptions::IN_EXPRESSION);
                        self.finish_node();
                    } else {
                        self.start_node(ElementBindingExpression);
                        self.parse_argument_list(
                            OpenBracketToken,
                            CloseBracketToken,
                            BracketedArgumentList,
                        );
                        self.finish_node();
                    }
                    self.start_node_at(checkpoint, ConditionalAccessExpression);
                    self.finish_node();
                }
                _ => break,
            }
        }
    }

    /// `( arg, ... )` or `[ arg, ... ]`, with skip-bad-token recovery.
    pub(crate) fn parse_argument_list(
        &mut self,
        open: SyntaxKind,
        close: SyntaxKind,
        node: SyntaxKind,
    ) {
        debug_assert!(self.at(open));
        self.start_node(node);
        self.bump();

        self.with_terminator(TerminatorState::IS_END_OF_ARGUMENT_LIST, |p| {
            if !p.at(close) {
                let mut last_pos = usize::MAX;
                loop {
                    if !p.is_making_progress(&mut last_pos) {
                        break;
                    }
                    if p.at(close) || p.should_stop() {
                        break;
                    }
                    if p.is_possible_argument() {
                        p.parse_argument();
                    } else if p.at(CommaToken) {
                        // An empty slot before a separator.
                        p.error(ErrorCode::ElementIsRequired);
                        p.create_missing_identifier_name(false);
                    } else {
                        let action = p.skip_bad_tokens(
                            CommaToken,
                            |p| p.at(CommaToken) || p.is_possible_argument(),
                            |p| p.at(close),
                        );
                        if action == PostSkipAction::Abort {
                            break;
                        }
                    }
                    if p.at(CommaToken) {
                        p.bump();
                        if p.at(close) {
                            // Trailing separator: the slot is required.
                            p.error(ErrorCode::ElementIsRequired);
                            p.create_missing_identifier_name(false);
                            break;
                        }
                        continue;
                    }
                    break;
                }
            }
        });

        self.expect(close);
        self.finish_node();
    }

    fn is_possible_argument(&mut self) -> bool {
        matches!(self.current(), RefKeyword | OutKeyword | InKeyword)
            || self.is_possible_expression(true, true)
    }

    /// `[name:] [ref|out|in] expr`, with `out var x` declarations.
    fn parse_argument(&mut self) {
        self.start_node(Argument);
        if self.at(IdentifierToken) && self.nth(1) == ColonToken && self.nth(2) != ColonToken {
            self.start_node(NameColon);
            self.bump();
            self.bump();
            self.finish_node();
        }
        let ref_kind = self.current();
        if matches!(ref_kind, RefKeyword | OutKeyword | InKeyword) {
            self.bump();
            if ref_kind == OutKeyword && self.is_possible_out_declaration() {
                self.parse_declaration_expression(ParseTypeMode::AfterOut);
                self.finish_node();
                return;
            }
        }
        self.parse_expression();
        self.finish_node();
    }

    fn is_possible_out_declaration(&mut self) -> bool {
        if self.at(VarKeyword) && self.nth(1) == IdentifierToken {
            return true;
        }
        let point = self.reset_point();
        let flags = self.scan_type(ParseTypeMode::AfterOut);
        let ok = flags != ScanTypeFlags::NotType && self.at(IdentifierToken);
        self.restore(point);
        ok
    }

    /// `T designation` as an expression (`out var x`, tuple deconstruction).
    fn parse_declaration_expression(&mut self, mode: ParseTypeMode) {
        self.start_node(DeclarationExpression);
        self.parse_type(mode);
        self.parse_designation();
        self.finish_node();
    }

    pub(crate) fn parse_designation(&mut self) {
        if self.at(OpenParenToken) {
            self.start_node(ParenthesizedVariableDesignation);
            self.bump();
            if !self.at(CloseParenToken) {
                self.parse_designation();
                while self.eat(CommaToken) {
                    self.parse_designation();
                }
            }
            self.expect(CloseParenToken);
            self.finish_node();
        } else if self.at_contextual(UnderscoreToken) {
            self.start_node(DiscardDesignation);
            self.bump();
            self.finish_node();
        } else {
            self.start_node(SingleVariableDesignation);
            self.expect(IdentifierToken);
            self.finish_node();
        }
    }

    // ------------------------------------------------------------------
    // Parenthesized / tuple / lambda / cast
    // ------------------------------------------------------------------

    /// Casts and lambdas were ruled out before this point, so a `(` starts
    /// either a parenthesized expression or a tuple literal. The decision
    /// falls out of the parse: a comma (or a leading `name:`) makes it a
    /// tuple; otherwise the first expression stays parenthesized.
    fn parse_paren_or_tuple(&mut self, checkpoint: Checkpoint) {
        debug_assert!(self.at(OpenParenToken));
        self.bump(); // `(`

        let first = self.checkpoint();
        let named = self.parse_tuple_element_content(
            ParseTypeMode::FirstElementOfPossibleTupleLiteral,
        );

        if self.at(CommaToken) || named {
            self.start_node_at(first, Argument);
            self.finish_node();
            let mut elements = 1;
            while self.at(CommaToken) {
                self.bump();
                self.start_node(Argument);
                self.parse_tuple_element_content(ParseTypeMode::AfterTupleComma);
                self.finish_node();
                elements += 1;
            }
            if elements < 2 {
                self.error(ErrorCode::TupleTooFewElements);
            }
            self.expect(CloseParenToken);
            self.start_node_at(checkpoint, TupleExpression);
            self.finish_node();
        } else {
            self.expect(CloseParenToken);
            self.start_node_at(checkpoint, ParenthesizedExpression);
            self.finish_node();
        }
    }

    /// One tuple slot: `[name:] expr` or a declaration expression. Returns
    /// whether a `name:` prefix was present.
    fn parse_tuple_element_content(&mut self, mode: ParseTypeMode) -> bool {
        let named =
            self.at(IdentifierToken) && self.nth(1) == ColonToken && self.nth(2) != ColonToken;
        if named {
            self.start_node(NameColon);
            self.bump();
            self.bump();
            self.finish_node();
        }
        if self.at(VarKeyword) && matches!(self.nth(1), IdentifierToken | OpenParenToken) {
            self.parse_declaration_expression(mode);
        } else if self.is_possible_tuple_declaration() {
            self.parse_declaration_expression(mode);
        } else {
            self.parse_expression();
        }
        named
    }

    /// `(int x, int y) = ...`: a typed declaration in a tuple slot.
    fn is_possible_tuple_declaration(&mut self) -> bool {
        if !self.at_set(crate::parser::grammar::TYPE_FIRST) {
            return false;
        }
        let point = self.reset_point();
        let flags = self.scan_type(ParseTypeMode::Normal);
        let declares = flags != ScanTypeFlags::NotType
            && self.at(IdentifierToken)
            && matches!(self.nth(1), CommaToken | CloseParenToken);
        self.restore(point);
        declares
    }

    /// Bounded speculative scan for a cast: `( type )` followed by a token
    /// that may begin a cast operand.
    fn scan_cast(&mut self) -> bool {
        let point = self.reset_point();
        self.scan_advance(); // `(`
        let flags = self.scan_type(ParseTypeMode::Normal);
        let result = if flags == ScanTypeFlags::NotType || !self.at(CloseParenToken) {
            false
        } else {
            self.scan_advance(); // `)`
            match flags {
                ScanTypeFlags::MustBeType => true,
                _ => facts::can_follow_cast(self.current()),
            }
        };
        self.restore(point);
        result
    }

    // ------------------------------------------------------------------
    // Lambdas and anonymous methods
    // ------------------------------------------------------------------

    /// `static =>` is also treated as a possible lambda for recovery.
    pub(crate) fn is_possible_lambda_expression(&mut self, precedence: Precedence) -> bool {
        if precedence > Precedence::LAMBDA {
            return false;
        }

        // `x =>`
        if self.at(IdentifierToken) && self.nth(1) == EqualsGreaterThanToken {
            return true;
        }

        if self.at(StaticKeyword) {
            // `static =>` (error but clearly a lambda), `static (`,
            // `static x =>`.
            match self.nth(1) {
                EqualsGreaterThanToken | OpenParenToken => return true,
                IdentifierToken if self.nth(2) == EqualsGreaterThanToken => return true,
                _ => return false,
            }
        }

        if self.at(OpenParenToken) {
            return self.scan_parenthesized_lambda();
        }

        // Explicit return type: `T (x) =>`.
        if self.at(IdentifierToken) || facts::is_predefined_type(self.current()) {
            let point = self.reset_point();
            let flags = self.scan_type(ParseTypeMode::Normal);
            let possible = flags != ScanTypeFlags::NotType
                && self.at(OpenParenToken)
                && self.scan_parenthesized_lambda();
            self.restore(point);
            return possible;
        }

        false
    }

    /// From `(`: find the matching close paren and check for `=>`.
    fn scan_parenthesized_lambda(&mut self) -> bool {
        debug_assert!(self.at(OpenParenToken));
        let point = self.reset_point();
        self.scan_advance();
        let mut depth = 1u32;
        while depth > 0 {
            match self.current() {
                Eof => break,
                OpenParenToken => depth += 1,
                CloseParenToken => depth -= 1,
                // A semicolon inside parentheses means this is broken
                // anyway; treat it as "not a lambda".
                SemicolonToken => break,
                _ => {}
            }
            self.scan_advance();
        }
        let is_lambda = depth == 0 && self.at(EqualsGreaterThanToken);
        self.restore(point);
        is_lambda
    }

    fn parse_lambda_expression(&mut self, checkpoint: Checkpoint) {
        self.eat(StaticKeyword);

        if self.at(IdentifierToken) && self.nth(1) == EqualsGreaterThanToken {
            // Simple lambda: `x => body`.
            self.start_node(Parameter);
            self.bump();
            self.finish_node();
            self.expect(EqualsGreaterThanToken);
            self.parse_lambda_body();
            self.start_node_at(checkpoint, SimpleLambdaExpression);
            self.finish_node();
            return;
        }

        // Optional explicit return type.
        if !self.at(OpenParenToken) && !self.at(EqualsGreaterThanToken) {
            self.parse_type(ParseTypeMode::Normal);
        }

        if self.at(OpenParenToken) {
            self.parse_parameter_list(true);
        }
        self.expect(EqualsGreaterThanToken);
        self.parse_lambda_body();
        self.start_node_at(checkpoint, ParenthesizedLambdaExpression);
        self.finish_node();
    }

    fn parse_lambda_body(&mut self) {
        if self.at(OpenBraceToken) {
            self.parse_block();
        } else {
            self.parse_possible_ref_expression();
        }
    }

    pub(crate) fn parse_possible_ref_expression(&mut self) {
        if self.at(RefKeyword) {
            self.start_node(RefExpression);
            self.bump();
            self.parse_expression();
            self.finish_node();
        } else {
            self.parse_expression();
        }
    }

    /// `delegate [(params)] { body }`
    fn parse_anonymous_method(&mut self, checkpoint: Checkpoint) {
        self.bump(); // `delegate`
        if self.at(OpenParenToken) {
            self.parse_parameter_list(true);
        }
        if self.at(OpenBraceToken) {
            self.parse_block();
        } else {
            self.missing_token(OpenBraceToken, true);
        }
        self.start_node_at(checkpoint, AnonymousMethodExpression);
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // new / stackalloc / collection expressions / initializers
    // ------------------------------------------------------------------

    fn parse_new_expression(&mut self, checkpoint: Checkpoint) {
        debug_assert!(self.at(NewKeyword));
        self.bump();

        match self.current() {
            OpenBraceToken => {
                // `new { a = 1, b }`: anonymous object.
                self.parse_anonymous_object_initializer();
                self.start_node_at(checkpoint, AnonymousObjectCreationExpression);
                self.finish_node();
            }
            OpenBracketToken => {
                // `new[] { ... }`: implicitly typed array.
                self.bump();
                while self.at(CommaToken) {
                    self.bump();
                }
                self.expect(CloseBracketToken);
                self.parse_array_initializer();
                self.start_node_at(checkpoint, ImplicitArrayCreationExpression);
                self.finish_node();
            }
            OpenParenToken => {
                // `new(...)`: target-typed.
                self.parse_argument_list(OpenParenToken, CloseParenToken, ArgumentList);
                if self.at(OpenBraceToken) {
                    self.parse_object_or_collection_initializer();
                }
                self.start_node_at(checkpoint, ImplicitObjectCreationExpression);
                self.finish_node();
            }
            _ => {
                let shape = self.parse_type(ParseTypeMode::NewExpression);
                if shape.is_array {
                    if self.at(OpenBraceToken) {
                        self.parse_array_initializer();
                    }
                    self.start_node_at(checkpoint, ArrayCreationExpression);
                    self.finish_node();
                } else {
                    if self.at(OpenParenToken) {
                        self.parse_argument_list(OpenParenToken, CloseParenToken, ArgumentList);
                    } else if !self.at(OpenBraceToken) {
                        self.error_msg(
                            ErrorCode::SyntaxError,
                            "a new expression requires (), [], or {} after type",
                        );
                    }
                    if self.at(OpenBraceToken) {
                        self.parse_object_or_collection_initializer();
                    }
                    self.start_node_at(checkpoint, ObjectCreationExpression);
                    self.finish_node();
                }
            }
        }
    }

    /// `stackalloc T[n] { ... }` or `stackalloc [] { ... }`.
    fn parse_stackalloc_expression(&mut self, checkpoint: Checkpoint) {
        self.bump(); // `stackalloc`
        if self.at(OpenBracketToken) {
            self.bump();
            self.expect(CloseBracketToken);
            self.parse_array_initializer();
            self.start_node_at(checkpoint, ImplicitStackAllocArrayCreationExpression);
            self.finish_node();
        } else {
            self.parse_type(ParseTypeMode::Normal);
            if self.at(OpenBraceToken) {
                self.parse_array_initializer();
            }
            self.start_node_at(checkpoint, StackAllocArrayCreationExpression);
            self.finish_node();
        }
    }

    /// `[a, b, .. rest]`
    fn parse_collection_expression(&mut self) {
        self.start_node(CollectionExpression);
        self.bump(); // `[`
        if !self.at(CloseBracketToken) {
            let mut last_pos = usize::MAX;
            loop {
                if !self.is_making_progress(&mut last_pos) {
                    break;
                }
                if self.at(DotDotToken) {
                    self.start_node(SpreadElement);
                    self.bump();
                    self.parse_expression();
                    self.finish_node();
                } else if self.is_possible_expression(true, true) {
                    self.start_node(ExpressionElement);
                    self.parse_expression();
                    self.finish_node();
                } else {
                    let action = self.skip_bad_tokens(
                        CommaToken,
                        |p| p.at(CommaToken) || p.is_possible_expression(true, true),
                        |p| p.at(CloseBracketToken),
                    );
                    if action == PostSkipAction::Abort {
                        break;
                    }
                }
                if !self.eat(CommaToken) {
                    break;
                }
            }
        }
        self.expect(CloseBracketToken);
        self.finish_node();
    }

    /// `{ a = 1, B = { ... } }` or `{ x, y, { k, v } }`. The first element
    /// decides between object and collection flavor.
    pub(crate) fn parse_object_or_collection_initializer(&mut self) {
        debug_assert!(self.at(OpenBraceToken));
        let is_object = self.nth(1) == CloseBraceToken
            || (self.nth(1) == IdentifierToken && self.nth(2) == EqualsToken);

        let kind = if is_object {
            ObjectInitializerExpression
        } else {
            CollectionInitializerExpression
        };
        self.start_node(kind);
        self.bump(); // `{`
        let mut last_pos = usize::MAX;
        while !self.at(CloseBraceToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if is_object {
                self.parse_object_initializer_member();
            } else if self.at(OpenBraceToken) {
                // `{ k, v }` element of a dictionary-style initializer.
                self.start_node(ComplexElementInitializerExpression);
                self.bump();
                self.parse_expression();
                while self.eat(CommaToken) {
                    self.parse_expression();
                }
                self.expect(CloseBraceToken);
                self.finish_node();
            } else if self.is_possible_expression(true, true) {
                self.parse_expression();
            } else {
                let action = self.skip_bad_tokens(
                    CommaToken,
                    |p| p.at(CommaToken) || p.is_possible_expression(true, true),
                    |p| p.at(CloseBraceToken),
                );
                if action == PostSkipAction::Abort {
                    break;
                }
            }
            if !self.eat(CommaToken) {
                break;
            }
        }
        self.expect(CloseBraceToken);
        self.finish_node();
    }

    fn parse_object_initializer_member(&mut self) {
        self.start_node(SimpleAssignmentExpression);
        self.create_name_or_missing();
        self.expect(EqualsToken);
        if self.at(OpenBraceToken) {
            self.parse_object_or_collection_initializer();
        } else {
            self.parse_expression();
        }
        self.finish_node();
    }

    fn create_name_or_missing(&mut self) {
        if self.at(IdentifierToken) {
            self.start_node(IdentifierName);
            self.bump();
            self.finish_node();
        } else {
            self.create_missing_identifier_name(true);
        }
    }

    /// `{ expr, expr, { nested } }`
    pub(crate) fn parse_array_initializer(&mut self) {
        if !self.at(OpenBraceToken) {
            self.missing_token(OpenBraceToken, true);
            return;
        }
        self.start_node(ArrayInitializerExpression);
        self.bump();
        let mut last_pos = usize::MAX;
        while !self.at(CloseBraceToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if self.at(OpenBraceToken) {
                self.parse_array_initializer();
            } else if self.is_possible_expression(true, true) {
                self.parse_expression();
            } else {
                let action = self.skip_bad_tokens(
                    CommaToken,
                    |p| p.at(CommaToken) || p.is_possible_expression(true, true),
                    |p| p.at(CloseBraceToken),
                );
                if action == PostSkipAction::Abort {
                    break;
                }
            }
            if !self.eat(CommaToken) {
                break;
            }
        }
        self.expect(CloseBraceToken);
        self.finish_node();
    }

    /// `new { Name = expr, Other }`
    fn parse_anonymous_object_initializer(&mut self) {
        debug_assert!(self.at(OpenBraceToken));
        self.bump();
        let mut last_pos = usize::MAX;
        while !self.at(CloseBraceToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            self.start_node(AnonymousObjectMemberDeclarator);
            if self.at(IdentifierToken) && self.nth(1) == EqualsToken {
                self.start_node(NameEquals);
                self.start_node(IdentifierName);
                self.bump();
                self.finish_node();
                self.bump(); // `=`
                self.finish_node();
            }
            self.parse_expression();
            self.finish_node();
            if !self.eat(CommaToken) {
                break;
            }
        }
        self.expect(CloseBraceToken);
    }

    /// `with { X = 1 }` initializer, object-initializer shaped.
    fn parse_with_initializer(&mut self) {
        debug_assert!(self.at(OpenBraceToken));
        self.start_node(WithInitializerExpression);
        self.bump();
        let mut last_pos = usize::MAX;
        while !self.at(CloseBraceToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            self.parse_object_initializer_member();
            if !self.eat(CommaToken) {
                break;
            }
        }
        self.expect(CloseBraceToken);
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // switch expressions
    // ------------------------------------------------------------------

    /// `expr switch { pattern [when cond] => expr, ... }`
    fn parse_switch_expression_suffix(&mut self, checkpoint: Checkpoint) {
        debug_assert!(self.at(SwitchKeyword));
        self.bump();
        self.expect(OpenBraceToken);

        let mut last_pos = usize::MAX;
        while !self.at(CloseBraceToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            self.with_terminator(TerminatorState::IS_PATTERN_IN_SWITCH_EXPRESSION_ARM, |p| {
                p.parse_switch_expression_arm();
            });
            if !self.eat(CommaToken) {
                break;
            }
        }

        self.expect(CloseBraceToken);
        self.start_node_at(checkpoint, SwitchExpression);
        self.finish_node();
    }

    fn parse_switch_expression_arm(&mut self) {
        self.start_node(SwitchExpressionArm);
        self.parse_pattern(Precedence::Coalescing);
        if self.at_contextual(WhenKeyword) {
            self.start_node(WhenClause);
            self.bump_as(WhenKeyword);
            self.parse_expression();
            self.finish_node();
        }
        self.expect(EqualsGreaterThanToken);
        self.parse_possible_ref_expression();
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // String literals
    // ------------------------------------------------------------------

    /// A simple string is start/chunk/end; anything with interpolation
    /// parts becomes an `InterpolatedStringExpression`.
    fn parse_string_literal_expression(&mut self) {
        debug_assert!(self.at(StringLiteralStart));

        let interpolated = {
            let mut n = 1;
            loop {
                match self.nth(n) {
                    StringLiteralEnd | Eof => break false,
                    DollarToken | InterpolationStart => break true,
                    _ => n += 1,
                }
            }
        };

        if !interpolated {
            self.start_node(StringLiteralExpression);
            self.bump(); // start marker
            if self.at(StringLiteralChunk) {
                self.bump();
            }
            self.expect(StringLiteralEnd);
            self.finish_node();
            return;
        }

        self.start_node(InterpolatedStringExpression);
        self.bump(); // start marker
        let mut last_pos = usize::MAX;
        loop {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            match self.current() {
                StringLiteralChunk => self.bump(),
                DollarToken => {
                    self.start_node(Interpolation);
                    self.bump();
                    self.start_node(IdentifierName);
                    self.expect(IdentifierToken);
                    self.finish_node();
                    self.finish_node();
                }
                InterpolationStart => {
                    self.start_node(Interpolation);
                    self.bump();
                    self.parse_expression();
                    self.expect(InterpolationEnd);
                    self.finish_node();
                }
                StringLiteralEnd => {
                    self.bump();
                    break;
                }
                _ => {
                    self.missing_token(StringLiteralEnd, false);
                    break;
                }
            }
        }
        self.finish_node();
    }
}
