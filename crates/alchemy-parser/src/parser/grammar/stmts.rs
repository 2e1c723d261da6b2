//! Statement parsing.

use alchemy_syntax::facts::{self, Precedence};
use alchemy_syntax::SyntaxKind::{self, *};

use crate::diagnostics::ErrorCode;
use crate::parser::core::{Parser, PostSkipAction};
use crate::parser::terminator::TerminatorState;

use super::types::{ParseTypeMode, ScanTypeFlags};

impl Parser<'_> {
    /// Parses one statement. Callers guarantee `is_possible_statement` or
    /// accept a skipped-token run for stray keywords.
    pub(crate) fn parse_statement(&mut self) {
        if !self.enter_recursion() {
            self.start_node(SyntaxKind::Error);
            while !self.should_stop() {
                self.bump();
            }
            self.finish_node();
            return;
        }
        self.parse_statement_core();
        self.exit_recursion();
    }

    fn parse_statement_core(&mut self) {
        match self.current() {
            OpenBraceToken => self.parse_block(),
            SemicolonToken => {
                self.start_node(EmptyStatement);
                self.bump();
                self.finish_node();
            }
            IfKeyword => self.parse_if_statement(),
            WhileKeyword => self.parse_while_statement(),
            DoKeyword => self.parse_do_statement(),
            ForKeyword => self.parse_for_or_foreach_statement(),
            ForEachKeyword => self.parse_foreach_statement(),
            SwitchKeyword => self.parse_switch_statement(),
            TryKeyword => self.parse_try_statement(),
            ReturnKeyword => self.parse_return_statement(),
            ThrowKeyword => self.parse_throw_statement(),
            BreakKeyword => {
                self.start_node(BreakStatement);
                self.bump();
                self.expect(SemicolonToken);
                self.finish_node();
            }
            ContinueKeyword => {
                self.start_node(ContinueStatement);
                self.bump();
                self.expect(SemicolonToken);
                self.finish_node();
            }
            GotoKeyword => self.parse_goto_statement(),
            UsingKeyword => self.parse_using_statement_or_declaration(),
            ConstKeyword => self.parse_local_declaration_statement(),
            VarKeyword if self.nth(1) == OpenParenToken => {
                self.parse_deconstruction_statement();
            }
            CatchKeyword | FinallyKeyword => {
                // Orphan handlers outside a try.
                let keyword = self.current_text().to_string();
                self.error_msg(
                    ErrorCode::SyntaxError,
                    format!("'{keyword}' without a preceding 'try'"),
                );
                self.start_node(SkippedTokens);
                self.bump();
                self.finish_node();
                self.start_node(EmptyStatement);
                self.missing_token(SemicolonToken, false);
                self.finish_node();
            }
            CaseKeyword | DefaultKeyword if self.nth(1) != OpenParenToken => {
                // An errant label outside a switch.
                self.error_msg(
                    ErrorCode::SyntaxError,
                    "'case' or 'default' label is only valid inside a switch",
                );
                self.start_node(SkippedTokens);
                self.bump();
                self.finish_node();
                self.start_node(EmptyStatement);
                self.missing_token(SemicolonToken, false);
                self.finish_node();
            }
            IdentifierToken
                if self.nth(1) == ColonToken
                    && self.nth(2) != ColonToken
                    && self.is_true_identifier() =>
            {
                self.parse_labeled_statement();
            }
            _ => self.parse_declaration_or_expression_statement(),
        }
    }

    pub(crate) fn parse_block(&mut self) {
        self.start_node(Block);
        self.expect(OpenBraceToken);
        self.with_terminator(TerminatorState::IS_POSSIBLE_STATEMENT_START_OR_STOP, |p| {
            p.parse_statements_until(CloseBraceToken);
        });
        self.expect(CloseBraceToken);
        self.finish_node();
    }

    /// Statement list with skip-bad-token recovery, shared by blocks and
    /// switch sections.
    fn parse_statements_until(&mut self, close: SyntaxKind) {
        let mut last_pos = usize::MAX;
        loop {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if self.at(close) || self.should_stop() {
                break;
            }
            if self.is_possible_statement(true) {
                self.parse_statement();
            } else {
                let action = self.skip_bad_tokens(
                    close,
                    |p| p.is_possible_statement(true),
                    |p| p.at(close),
                );
                if action == PostSkipAction::Abort {
                    break;
                }
            }
        }
    }

    fn parse_if_statement(&mut self) {
        self.start_node(IfStatement);
        self.bump(); // `if`
        self.expect(OpenParenToken);
        self.parse_expression();
        self.expect(CloseParenToken);
        self.parse_embedded_statement();
        if self.at(ElseKeyword) {
            self.start_node(ElseClause);
            self.bump();
            self.parse_embedded_statement();
            self.finish_node();
        }
        self.finish_node();
    }

    /// The body of a control construct. A stray declaration keyword still
    /// parses so recovery stays local.
    fn parse_embedded_statement(&mut self) {
        if self.is_possible_statement(true) {
            self.parse_statement();
        } else {
            self.start_node(EmptyStatement);
            self.missing_token(SemicolonToken, true);
            self.finish_node();
        }
    }

    fn parse_while_statement(&mut self) {
        self.start_node(WhileStatement);
        self.bump();
        self.expect(OpenParenToken);
        self.parse_expression();
        self.expect(CloseParenToken);
        self.parse_embedded_statement();
        self.finish_node();
    }

    fn parse_do_statement(&mut self) {
        self.start_node(DoStatement);
        self.bump();
        self.parse_embedded_statement();
        self.expect(WhileKeyword);
        self.expect(OpenParenToken);
        self.with_terminator(TerminatorState::IS_END_OF_DO_WHILE_EXPRESSION, |p| {
            p.parse_expression();
        });
        self.expect(CloseParenToken);
        self.expect(SemicolonToken);
        self.finish_node();
    }

    /// `for (T x in e)` is a common slip for `foreach`; it reparses as a
    /// foreach whose keyword is synthesized, with the `for` preserved as
    /// skipped tokens.
    fn parse_for_or_foreach_statement(&mut self) {
        debug_assert!(self.at(ForKeyword));

        let point = self.reset_point();
        self.scan_advance(); // `for`
        let mut is_foreach = false;
        if self.at(OpenParenToken) {
            self.scan_advance();
            let flags = self.scan_type(ParseTypeMode::Normal);
            if flags != ScanTypeFlags::NotType && self.at(IdentifierToken) {
                self.scan_advance();
                is_foreach = self.at(InKeyword);
            }
        }
        self.restore(point);

        if is_foreach {
            self.parse_foreach_statement();
        } else {
            self.parse_for_statement();
        }
    }

    fn parse_for_statement(&mut self) {
        self.start_node(ForStatement);
        self.bump(); // `for`
        self.expect(OpenParenToken);

        self.with_terminator(TerminatorState::IS_END_OF_FOR_STATEMENT_ARGUMENT, |p| {
            // Initializer: declaration or expression list.
            if !p.at(SemicolonToken) {
                if p.is_possible_local_declaration() {
                    p.parse_variable_declaration();
                } else {
                    p.parse_expression();
                    while p.eat(CommaToken) {
                        p.parse_expression();
                    }
                }
            }
            p.expect(SemicolonToken);

            if !p.at(SemicolonToken) && !p.at(CloseParenToken) {
                p.parse_expression();
            }
            p.expect(SemicolonToken);

            if !p.at(CloseParenToken) {
                p.parse_expression();
                while p.eat(CommaToken) {
                    p.parse_expression();
                }
            }
        });

        self.expect(CloseParenToken);
        self.parse_embedded_statement();
        self.finish_node();
    }

    fn parse_foreach_statement(&mut self) {
        let checkpoint = self.checkpoint();
        let mut deconstructed = false;

        if self.at(ForKeyword) {
            // Reinterpreted `for`: keep the token, synthesize `foreach`.
            self.error(ErrorCode::ExpectedForeachKeyword);
            self.start_node(SkippedTokens);
            self.bump();
            self.finish_node();
            self.missing_token(ForEachKeyword, false);
        } else {
            self.expect(ForEachKeyword);
        }

        self.expect(OpenParenToken);

        // `foreach (var (a, b) in e)` deconstructs; otherwise a type and a
        // single designation. A bare identifier is the classic bad foreach.
        if self.at(IdentifierToken) && self.nth(1) == InKeyword {
            self.error(ErrorCode::BadForeachDecl);
            self.create_missing_identifier_name(false);
            self.parse_designation();
        } else if self.at(VarKeyword) && self.nth(1) == OpenParenToken {
            self.parse_foreach_deconstruction();
            deconstructed = true;
        } else {
            self.parse_type(ParseTypeMode::Normal);
            self.parse_designation();
        }

        self.expect(InKeyword);
        self.parse_expression();
        self.expect(CloseParenToken);
        self.parse_embedded_statement();

        let kind = if deconstructed {
            ForEachVariableStatement
        } else {
            ForEachStatement
        };
        self.start_node_at(checkpoint, kind);
        self.finish_node();
    }

    fn parse_foreach_deconstruction(&mut self) {
        self.start_node(DeclarationExpression);
        self.start_node(IdentifierName);
        self.bump(); // `var`
        self.finish_node();
        self.parse_designation();
        self.finish_node();
    }

    fn parse_switch_statement(&mut self) {
        self.start_node(SwitchStatement);
        self.bump(); // `switch`
        self.expect(OpenParenToken);
        self.parse_expression();
        self.expect(CloseParenToken);
        self.expect(OpenBraceToken);

        let mut seen_default = false;
        let mut last_pos = usize::MAX;
        while !self.at(CloseBraceToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if matches!(self.current(), CaseKeyword | DefaultKeyword) {
                self.parse_switch_section(&mut seen_default);
            } else {
                let action = self.skip_bad_tokens(
                    CaseKeyword,
                    |p| matches!(p.current(), CaseKeyword | DefaultKeyword),
                    |p| p.at(CloseBraceToken),
                );
                if action == PostSkipAction::Abort {
                    break;
                }
            }
        }

        self.expect(CloseBraceToken);
        self.finish_node();
    }

    fn parse_switch_section(&mut self, seen_default: &mut bool) {
        self.start_node(SwitchSection);

        // One or more labels.
        let mut last_pos = usize::MAX;
        while matches!(self.current(), CaseKeyword | DefaultKeyword) {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if self.at(DefaultKeyword) {
                if *seen_default {
                    self.error(ErrorCode::DefaultLabelAlreadyPresent);
                }
                *seen_default = true;
                self.start_node(DefaultSwitchLabel);
                self.bump();
                self.expect(ColonToken);
                self.finish_node();
                continue;
            }

            // `case` label: expression or pattern.
            let checkpoint = self.checkpoint();
            self.bump(); // `case`
            if self.at(ColonToken) {
                self.error(ErrorCode::CaseExpressionExpected);
                self.start_node(ConstantPattern);
                self.create_missing_identifier_name(false);
                self.finish_node();
                self.start_node_at(checkpoint, CasePatternSwitchLabel);
                self.expect(ColonToken);
                self.finish_node();
                continue;
            }

            if self.at_contextual(UnderscoreToken) && self.nth(1) == ColonToken {
                self.error(ErrorCode::DiscardPatternInSwitchStatement);
            }

            let is_pattern = self.with_terminator(
                TerminatorState::IS_EXPRESSION_OR_PATTERN_IN_CASE_LABEL,
                |p| p.parse_pattern_allow_bare(Precedence::Conditional, true),
            );
            let label_kind = if is_pattern {
                if self.at_contextual(WhenKeyword) {
                    self.start_node(WhenClause);
                    self.bump_as(WhenKeyword);
                    self.parse_expression();
                    self.finish_node();
                }
                CasePatternSwitchLabel
            } else {
                CaseSwitchLabel
            };
            self.start_node_at(checkpoint, label_kind);
            self.expect(ColonToken);
            self.finish_node();
        }

        // Section body until the next label or the closing brace.
        self.with_terminator(TerminatorState::IS_SWITCH_SECTION_START, |p| {
            let mut last_pos = usize::MAX;
            loop {
                if !p.is_making_progress(&mut last_pos) {
                    break;
                }
                if matches!(
                    p.current(),
                    CaseKeyword | DefaultKeyword | CloseBraceToken | Eof
                ) {
                    break;
                }
                if p.is_possible_statement(true) {
                    p.parse_statement();
                } else {
                    let action = p.skip_bad_tokens(
                        CloseBraceToken,
                        |p| p.is_possible_statement(true),
                        |p| {
                            matches!(
                                p.current(),
                                CaseKeyword | DefaultKeyword | CloseBraceToken
                            )
                        },
                    );
                    if action == PostSkipAction::Abort {
                        break;
                    }
                }
            }
        });

        self.finish_node();
    }

    fn parse_try_statement(&mut self) {
        self.start_node(TryStatement);
        self.bump(); // `try`
        self.with_terminator(TerminatorState::IS_END_OF_TRY_BLOCK, |p| {
            if p.at(OpenBraceToken) {
                p.parse_block();
            } else {
                p.error(ErrorCode::LbraceExpected);
                p.start_node(Block);
                p.missing_token(OpenBraceToken, false);
                p.missing_token(CloseBraceToken, false);
                p.finish_node();
            }
        });

        let mut handled = false;
        while self.at(CatchKeyword) {
            handled = true;
            self.parse_catch_clause();
        }
        if self.at(FinallyKeyword) {
            handled = true;
            self.start_node(FinallyClause);
            self.bump();
            self.parse_block();
            self.finish_node();
        }
        if !handled {
            self.error(ErrorCode::ExpectedEndTry);
        }
        self.finish_node();
    }

    fn parse_catch_clause(&mut self) {
        self.start_node(CatchClause);
        self.bump(); // `catch`

        if self.at(OpenParenToken) {
            self.start_node(CatchDeclaration);
            self.bump();
            self.with_terminator(TerminatorState::IS_END_OF_CATCH_CLAUSE, |p| {
                p.parse_type(ParseTypeMode::Normal);
                if p.is_true_identifier() {
                    p.bump();
                }
            });
            self.expect(CloseParenToken);
            self.finish_node();
        }

        if self.at_contextual(WhenKeyword) {
            self.start_node(CatchFilterClause);
            self.bump_as(WhenKeyword);
            self.expect(OpenParenToken);
            self.with_terminator(TerminatorState::IS_END_OF_FILTER_CLAUSE, |p| {
                p.parse_expression();
            });
            self.expect(CloseParenToken);
            self.finish_node();
        }

        self.with_terminator(TerminatorState::IS_END_OF_CATCH_BLOCK, |p| {
            p.parse_block();
        });
        self.finish_node();
    }

    fn parse_return_statement(&mut self) {
        self.start_node(ReturnStatement);
        self.bump();
        if !self.at(SemicolonToken) && self.is_possible_expression(true, true) {
            self.parse_possible_ref_expression();
        }
        self.expect(SemicolonToken);
        self.finish_node();
    }

    fn parse_throw_statement(&mut self) {
        self.start_node(ThrowStatement);
        self.bump();
        if !self.at(SemicolonToken) && self.is_possible_expression(true, true) {
            self.parse_expression();
        }
        self.expect(SemicolonToken);
        self.finish_node();
    }

    fn parse_goto_statement(&mut self) {
        match self.nth(1) {
            CaseKeyword => {
                self.start_node(GotoCaseStatement);
                self.bump();
                self.bump();
                if self.is_possible_expression(true, true) {
                    self.parse_expression();
                } else {
                    self.error(ErrorCode::ConstantExpected);
                    self.create_missing_identifier_name(false);
                }
                self.expect(SemicolonToken);
                self.finish_node();
            }
            DefaultKeyword => {
                self.start_node(GotoDefaultStatement);
                self.bump();
                self.bump();
                self.expect(SemicolonToken);
                self.finish_node();
            }
            _ => {
                self.start_node(GotoStatement);
                self.bump();
                self.start_node(IdentifierName);
                self.expect(IdentifierToken);
                self.finish_node();
                self.expect(SemicolonToken);
                self.finish_node();
            }
        }
    }

    /// `using (resource) statement` or a `using` local declaration.
    fn parse_using_statement_or_declaration(&mut self) {
        if self.nth(1) == OpenParenToken {
            self.start_node(UsingStatement);
            self.bump(); // `using`
            self.bump(); // `(`
            if self.is_possible_local_declaration() {
                self.parse_variable_declaration();
            } else {
                self.parse_expression();
            }
            self.expect(CloseParenToken);
            self.parse_embedded_statement();
            self.finish_node();
        } else {
            self.start_node(LocalDeclarationStatement);
            self.bump(); // `using`
            self.parse_variable_declaration();
            self.expect(SemicolonToken);
            self.finish_node();
        }
    }

    /// `var (a, b) = e;` as an expression statement.
    fn parse_deconstruction_statement(&mut self) {
        self.start_node(ExpressionStatement);
        let checkpoint = self.checkpoint();
        self.start_node(DeclarationExpression);
        self.start_node(IdentifierName);
        self.bump(); // `var`
        self.finish_node();
        self.parse_designation();
        self.finish_node();
        if self.at(EqualsToken) {
            self.bump();
            self.parse_expression();
            self.start_node_at(checkpoint, SimpleAssignmentExpression);
            self.finish_node();
        } else {
            self.missing_token(EqualsToken, true);
        }
        self.expect(SemicolonToken);
        self.finish_node();
    }

    fn parse_labeled_statement(&mut self) {
        self.start_node(LabeledStatement);
        self.bump(); // identifier
        self.bump(); // `:`
        if self.is_possible_statement(true) {
            self.parse_statement();
        } else {
            self.start_node(EmptyStatement);
            self.missing_token(SemicolonToken, true);
            self.finish_node();
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Declarations vs expressions
    // ------------------------------------------------------------------

    /// `type identifier` at statement level means a declaration; decided by
    /// a bounded type scan.
    pub(crate) fn is_possible_local_declaration(&mut self) -> bool {
        if matches!(self.current(), ConstKeyword | VarKeyword | RefKeyword) {
            return true;
        }
        let point = self.reset_point();
        let flags = self.scan_type(ParseTypeMode::Normal);
        let declares = flags != ScanTypeFlags::NotType && self.is_true_identifier();
        self.restore(point);
        declares
    }

    /// Local function lookahead: `[static|extern] type name [<...>] ( ... )`
    /// followed by `{`, `=>`, or `;`.
    fn is_possible_local_function(&mut self) -> bool {
        let point = self.reset_point();
        while facts::is_additional_local_function_modifier(self.current()) {
            self.scan_advance();
        }
        let mut possible = false;
        if self.scan_type(ParseTypeMode::Normal) != ScanTypeFlags::NotType
            && self.at(IdentifierToken)
        {
            self.scan_advance();
            if self.at(LessThanToken) {
                let mut unused = false;
                self.scan_possible_type_argument_list(&mut unused);
            }
            if self.at(OpenParenToken) {
                self.scan_advance();
                let mut depth = 1u32;
                while depth > 0 && !self.at(Eof) {
                    match self.current() {
                        OpenParenToken => depth += 1,
                        CloseParenToken => depth -= 1,
                        OpenBraceToken | CloseBraceToken | SemicolonToken => break,
                        _ => {}
                    }
                    self.scan_advance();
                }
                possible = depth == 0
                    && (matches!(
                        self.current(),
                        OpenBraceToken | EqualsGreaterThanToken | SemicolonToken
                    ) || self.at_contextual(WhereKeyword));
            }
        }
        self.restore(point);
        possible
    }

    fn parse_declaration_or_expression_statement(&mut self) {
        if self.is_possible_local_function() {
            self.parse_local_function_statement();
            return;
        }
        if self.is_possible_local_declaration() {
            self.parse_local_declaration_statement();
            return;
        }
        self.start_node(ExpressionStatement);
        self.parse_expression();
        self.expect(SemicolonToken);
        self.finish_node();
    }

    fn parse_local_declaration_statement(&mut self) {
        self.start_node(LocalDeclarationStatement);
        self.eat(ConstKeyword);
        self.parse_variable_declaration();
        self.expect(SemicolonToken);
        self.finish_node();
    }

    /// `type declarator (, declarator)*`
    pub(crate) fn parse_variable_declaration(&mut self) {
        self.start_node(VariableDeclaration);
        self.parse_type(ParseTypeMode::Normal);
        self.with_terminator(
            TerminatorState::IS_POSSIBLE_END_OF_VARIABLE_DECLARATION,
            |p| {
                p.parse_variable_declarator();
                while p.at(CommaToken) {
                    p.bump();
                    p.parse_variable_declarator();
                }
            },
        );
        self.finish_node();
    }

    pub(crate) fn parse_variable_declarator(&mut self) {
        self.start_node(VariableDeclarator);
        self.expect(IdentifierToken);
        if self.at(EqualsToken) {
            self.start_node(EqualsValueClause);
            self.bump();
            if self.at(OpenBraceToken) {
                self.parse_array_initializer();
            } else {
                self.parse_possible_ref_expression();
            }
            self.finish_node();
        }
        self.finish_node();
    }

    fn parse_local_function_statement(&mut self) {
        self.start_node(LocalFunctionStatement);
        while facts::is_additional_local_function_modifier(self.current()) {
            self.bump();
        }
        self.with_terminator(TerminatorState::IS_END_OF_RETURN_TYPE, |p| {
            p.parse_type(ParseTypeMode::Normal);
        });
        self.expect(IdentifierToken);
        if self.at(LessThanToken) {
            self.parse_type_parameter_list();
        }
        self.parse_parameter_list(false);
        while self.at_contextual(WhereKeyword) {
            self.parse_type_parameter_constraint_clause();
        }
        self.parse_function_body();
        self.finish_node();
    }

    /// `{ ... }`, `=> expr ;`, or just `;`.
    pub(crate) fn parse_function_body(&mut self) {
        if self.at(EqualsGreaterThanToken) {
            self.start_node(ArrowExpressionClause);
            self.bump();
            self.parse_possible_ref_expression();
            self.finish_node();
            self.expect(SemicolonToken);
        } else if self.at(OpenBraceToken) {
            self.parse_block();
        } else {
            self.expect(SemicolonToken);
        }
    }
}
