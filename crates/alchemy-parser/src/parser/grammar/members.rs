//! Type declarations and their members: fields, constants, constructors,
//! methods, properties, indexers, operators, and conversion operators.

use alchemy_syntax::facts;
use alchemy_syntax::SyntaxKind::{self, *};
use rowan::Checkpoint;

use crate::diagnostics::ErrorCode;
use crate::parser::core::{Parser, PostSkipAction};
use crate::parser::terminator::TerminatorState;

use super::types::ParseTypeMode;
use super::MEMBER_MODIFIERS;

impl Parser<'_> {
    /// Modifier run before a declaration, including the contextual
    /// `partial` and `required`.
    pub(crate) fn parse_modifiers(&mut self) {
        let mut seen: Vec<SyntaxKind> = Vec::new();
        let mut last_pos = usize::MAX;
        loop {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if MEMBER_MODIFIERS.contains(self.current()) {
                // `readonly int x` is a modifier; `readonly` as the last
                // token before a non-member is left for the type parser.
                let modifier = self.current();
                if seen.contains(&modifier) {
                    self.error_msg(
                        ErrorCode::BadModifier,
                        format!("duplicate '{}' modifier", modifier.describe()),
                    );
                }
                seen.push(modifier);
                self.bump();
            } else if self.at_contextual(PartialKeyword)
                && matches!(
                    self.nth(1),
                    ClassKeyword | StructKeyword | InterfaceKeyword
                )
            {
                self.bump_as(PartialKeyword);
            } else if self.at_contextual(RequiredKeyword)
                && (self.nth(1) == IdentifierToken
                    || facts::is_predefined_type(self.nth(1))
                    || MEMBER_MODIFIERS.contains(self.nth(1)))
            {
                self.bump_as(RequiredKeyword);
            } else {
                break;
            }
        }
    }

    /// `class` / `struct` / `interface` / `enum` / `delegate` with the
    /// modifier run already consumed; wraps at `checkpoint`.
    pub(crate) fn parse_type_declaration_body(&mut self, checkpoint: Checkpoint) {
        match self.current() {
            ClassKeyword => self.parse_class_like(checkpoint, ClassDeclaration),
            StructKeyword => self.parse_class_like(checkpoint, StructDeclaration),
            InterfaceKeyword => self.parse_class_like(checkpoint, InterfaceDeclaration),
            EnumKeyword => self.parse_enum_declaration(checkpoint),
            DelegateKeyword => self.parse_delegate_declaration(checkpoint),
            _ => unreachable!("caller checked for a type declaration start"),
        }
    }

    fn parse_class_like(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.bump(); // class/struct/interface

        self.with_terminator(TerminatorState::IS_END_OF_TYPE_SIGNATURE, |p| {
            p.expect(IdentifierToken);
            if p.at(LessThanToken) {
                p.parse_type_parameter_list();
            }
            if p.at(ColonToken) {
                p.parse_base_list();
            }
            while p.at_contextual(WhereKeyword) {
                p.parse_type_parameter_constraint_clause();
            }
        });

        self.expect(OpenBraceToken);
        self.parse_member_declarations_until_close_brace();
        self.expect(CloseBraceToken);
        self.eat(SemicolonToken);

        self.start_node_at(checkpoint, kind);
        self.finish_node();
    }

    pub(crate) fn parse_member_declarations_until_close_brace(&mut self) {
        self.with_terminator(TerminatorState::IS_POSSIBLE_MEMBER_START_OR_STOP, |p| {
            let mut last_pos = usize::MAX;
            loop {
                if !p.is_making_progress(&mut last_pos) {
                    break;
                }
                if p.at(CloseBraceToken) || p.should_stop() {
                    break;
                }
                if p.at(NamespaceKeyword) {
                    p.error(ErrorCode::NamespaceUnexpected);
                    p.parse_namespace_declaration_for_recovery();
                } else if p.is_possible_member_start() {
                    p.parse_member_declaration();
                } else {
                    let action = p.skip_bad_tokens(
                        CloseBraceToken,
                        |p| p.is_possible_member_start(),
                        |p| p.at(CloseBraceToken),
                    );
                    if action == PostSkipAction::Abort {
                        break;
                    }
                }
            }
        });
    }

    fn parse_base_list(&mut self) {
        debug_assert!(self.at(ColonToken));
        self.start_node(BaseList);
        self.bump();
        self.start_node(SimpleBaseType);
        self.parse_type(ParseTypeMode::Normal);
        self.finish_node();
        while self.eat(CommaToken) {
            self.start_node(SimpleBaseType);
            self.parse_type(ParseTypeMode::Normal);
            self.finish_node();
        }
        self.finish_node();
    }

    fn parse_enum_declaration(&mut self, checkpoint: Checkpoint) {
        self.bump(); // `enum`
        self.expect(IdentifierToken);
        if self.at(ColonToken) {
            self.parse_base_list();
        }
        self.expect(OpenBraceToken);

        let mut last_pos = usize::MAX;
        while !self.at(CloseBraceToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if self.is_true_identifier() {
                self.start_node(EnumMemberDeclaration);
                self.bump();
                if self.at(EqualsToken) {
                    self.start_node(EqualsValueClause);
                    self.bump();
                    self.parse_expression();
                    self.finish_node();
                }
                self.finish_node();
            } else {
                let action = self.skip_bad_tokens(
                    IdentifierToken,
                    |p| p.is_true_identifier() || p.at(CommaToken),
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
        self.eat(SemicolonToken);
        self.start_node_at(checkpoint, EnumDeclaration);
        self.finish_node();
    }

    fn parse_delegate_declaration(&mut self, checkpoint: Checkpoint) {
        self.bump(); // `delegate`
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
        self.expect(SemicolonToken);
        self.start_node_at(checkpoint, DelegateDeclaration);
        self.finish_node();
    }

    /// One member of a class/struct/interface body.
    pub(crate) fn parse_member_declaration(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_modifiers();

        match self.current() {
            ClassKeyword | StructKeyword | InterfaceKeyword | EnumKeyword | DelegateKeyword => {
                self.parse_type_declaration_body(checkpoint);
            }
            ConstKeyword => self.parse_constant_declaration(checkpoint),
            ConstructorKeyword => self.parse_constructor_declaration(checkpoint),
            ImplicitKeyword | ExplicitKeyword => {
                self.parse_conversion_operator_declaration(checkpoint);
            }
            OperatorKeyword => {
                // Missing return type: `operator +(...)`.
                self.error(ErrorCode::MemberNeedsType);
                self.create_missing_identifier_name(false);
                self.parse_operator_declaration_body(checkpoint);
            }
            _ => self.parse_typed_member(checkpoint),
        }
    }

    fn parse_constant_declaration(&mut self, checkpoint: Checkpoint) {
        self.bump(); // `const`
        self.parse_variable_declaration();
        self.expect(SemicolonToken);
        self.start_node_at(checkpoint, ConstantDeclaration);
        self.finish_node();
    }

    /// `constructor (params) [: this(...) | : base(...)] body`
    fn parse_constructor_declaration(&mut self, checkpoint: Checkpoint) {
        self.bump(); // `constructor`
        self.parse_parameter_list(false);

        if self.at(ColonToken) {
            self.start_node(ConstructorInitializer);
            self.bump();
            if matches!(self.current(), ThisKeyword | BaseKeyword) {
                self.bump();
            } else {
                self.error_msg(
                    ErrorCode::SyntaxError,
                    "expected 'this' or 'base' in constructor initializer",
                );
                self.missing_token(ThisKeyword, false);
            }
            if self.at(OpenParenToken) {
                self.parse_argument_list(OpenParenToken, CloseParenToken, ArgumentList);
            } else {
                self.missing_token(OpenParenToken, true);
                self.missing_token(CloseParenToken, false);
            }
            self.finish_node();
        }

        self.parse_function_body();
        self.start_node_at(checkpoint, ConstructorDeclaration);
        self.finish_node();
    }

    /// `implicit operator T (params) body` / `explicit operator T ...`
    fn parse_conversion_operator_declaration(&mut self, checkpoint: Checkpoint) {
        self.bump(); // implicit/explicit
        self.expect(OperatorKeyword);
        self.parse_type(ParseTypeMode::Normal);
        self.parse_parameter_list(false);
        self.parse_function_body();
        self.start_node_at(checkpoint, ConversionOperatorDeclaration);
        self.finish_node();
    }

    /// Members that begin with a (return) type.
    fn parse_typed_member(&mut self, checkpoint: Checkpoint) {
        if !self.at_set(super::TYPE_FIRST) {
            self.error(ErrorCode::InvalidMemberDecl);
            self.skip_bad_tokens(
                CloseBraceToken,
                |p| p.is_possible_member_start(),
                |p| p.at(CloseBraceToken),
            );
            self.start_node_at(checkpoint, IncompleteMember);
            self.finish_node();
            return;
        }

        let type_checkpoint = self.checkpoint();
        self.with_terminator(TerminatorState::IS_END_OF_RETURN_TYPE, |p| {
            p.parse_type(ParseTypeMode::Normal);
        });

        match self.current() {
            OperatorKeyword => self.parse_operator_declaration_body(checkpoint),
            ThisKeyword => self.parse_indexer_declaration(checkpoint),
            IdentifierToken => {
                match self.nth(1) {
                    OpenParenToken | LessThanToken => self.parse_method_declaration(checkpoint),
                    OpenBraceToken | EqualsGreaterThanToken => {
                        self.parse_property_declaration(checkpoint)
                    }
                    _ => self.parse_field_declaration(checkpoint, type_checkpoint),
                }
            }
            _ => {
                // A type with nothing usable after it.
                self.error(ErrorCode::IdentifierExpected);
                self.eat(SemicolonToken);
                self.start_node_at(checkpoint, IncompleteMember);
                self.finish_node();
            }
        }
    }

    fn parse_method_declaration(&mut self, checkpoint: Checkpoint) {
        self.with_terminator(TerminatorState::IS_END_OF_METHOD_SIGNATURE, |p| {
            p.expect(IdentifierToken);
            if p.at(LessThanToken) {
                p.parse_type_parameter_list();
            }
            p.parse_parameter_list(false);
            while p.at_contextual(WhereKeyword) {
                p.parse_type_parameter_constraint_clause();
            }
        });
        self.parse_function_body();
        self.start_node_at(checkpoint, MethodDeclaration);
        self.finish_node();
    }

    fn parse_property_declaration(&mut self, checkpoint: Checkpoint) {
        self.expect(IdentifierToken);
        if self.at(EqualsGreaterThanToken) {
            // Expression-bodied property.
            self.start_node(ArrowExpressionClause);
            self.bump();
            self.parse_possible_ref_expression();
            self.finish_node();
            self.expect(SemicolonToken);
        } else {
            self.parse_accessor_list();
            if self.at(EqualsToken) {
                // Property initializer: `{ get; } = value;`
                self.start_node(EqualsValueClause);
                self.bump();
                self.parse_expression();
                self.finish_node();
                self.expect(SemicolonToken);
            }
        }
        self.start_node_at(checkpoint, PropertyDeclaration);
        self.finish_node();
    }

    fn parse_indexer_declaration(&mut self, checkpoint: Checkpoint) {
        self.bump(); // `this`
        if self.at(OpenBracketToken) {
            self.parse_bracketed_parameter_list();
        } else {
            self.missing_token(OpenBracketToken, true);
        }
        if self.at(EqualsGreaterThanToken) {
            self.start_node(ArrowExpressionClause);
            self.bump();
            self.parse_possible_ref_expression();
            self.finish_node();
            self.expect(SemicolonToken);
        } else {
            self.parse_accessor_list();
        }
        self.start_node_at(checkpoint, IndexerDeclaration);
        self.finish_node();
    }

    /// `operator <op> (params) body`, return type already parsed.
    fn parse_operator_declaration_body(&mut self, checkpoint: Checkpoint) {
        self.expect(OperatorKeyword);

        let tk = self.current();
        let (op, extra) = self.fuse_greater_than(tk);
        if facts::is_overloadable_operator(op) {
            self.bump();
            for _ in 0..extra {
                self.bump();
            }
        } else {
            self.error(ErrorCode::OvlOperatorExpected);
            self.missing_token(PlusToken, false);
        }

        self.parse_parameter_list(false);
        self.parse_function_body();
        self.start_node_at(checkpoint, OperatorDeclaration);
        self.finish_node();
    }

    /// The type was already parsed; the declarators join it under a
    /// `VariableDeclaration` wrapped at `type_checkpoint`.
    fn parse_field_declaration(&mut self, checkpoint: Checkpoint, type_checkpoint: Checkpoint) {
        self.with_terminator(TerminatorState::IS_END_OF_FIELD_DECLARATION, |p| {
            p.parse_variable_declarator();
            while p.at(CommaToken) {
                p.bump();
                p.parse_variable_declarator();
            }
        });
        self.start_node_at(type_checkpoint, VariableDeclaration);
        self.finish_node();
        self.expect(SemicolonToken);
        self.start_node_at(checkpoint, FieldDeclaration);
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    fn parse_accessor_list(&mut self) {
        self.start_node(AccessorList);
        self.expect(OpenBraceToken);

        let mut last_pos = usize::MAX;
        while !self.at(CloseBraceToken) && !self.should_stop() {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if self.is_possible_accessor() {
                self.parse_accessor_declaration();
            } else {
                self.error(ErrorCode::AccessorExpected);
                let action = self.skip_bad_tokens(
                    CloseBraceToken,
                    |p| p.is_possible_accessor(),
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

    fn is_possible_accessor(&mut self) -> bool {
        matches!(
            self.current_contextual(),
            Some(GetKeyword) | Some(SetKeyword) | Some(InitKeyword)
        ) || facts::is_accessibility_modifier(self.current())
            || self.at(IdentifierToken)
            || self.at(OpenBraceToken)
    }

    fn parse_accessor_declaration(&mut self) {
        let checkpoint = self.checkpoint();
        while facts::is_accessibility_modifier(self.current()) {
            self.bump();
        }

        let kind = match self.current_contextual().and_then(facts::accessor_declaration_kind) {
            Some(kind) => {
                let contextual = self.current_contextual().expect("checked");
                self.bump_as(contextual);
                kind
            }
            None => {
                self.error(ErrorCode::GetOrSetExpected);
                if self.at(IdentifierToken) {
                    self.bump();
                } else {
                    self.missing_token(IdentifierToken, false);
                }
                UnknownAccessorDeclaration
            }
        };

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

        self.start_node_at(checkpoint, kind);
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Parameters and type parameters
    // ------------------------------------------------------------------

    /// `( parameter, ... )`. For lambdas the parameter types are optional.
    pub(crate) fn parse_parameter_list(&mut self, for_lambda: bool) {
        self.start_node(ParameterList);
        self.expect(OpenParenToken);
        self.parse_parameters_until(CloseParenToken, for_lambda);
        self.expect(CloseParenToken);
        self.finish_node();
    }

    /// `[ parameter, ... ]` for indexers.
    fn parse_bracketed_parameter_list(&mut self) {
        self.start_node(BracketedParameterList);
        self.expect(OpenBracketToken);
        self.parse_parameters_until(CloseBracketToken, false);
        self.expect(CloseBracketToken);
        self.finish_node();
    }

    fn parse_parameters_until(&mut self, close: SyntaxKind, for_lambda: bool) {
        self.with_terminator(TerminatorState::IS_END_OF_PARAMETER_LIST, |p| {
            if p.at(close) {
                return;
            }
            let mut last_pos = usize::MAX;
            loop {
                if !p.is_making_progress(&mut last_pos) {
                    break;
                }
                if p.at(close) || p.should_stop() {
                    break;
                }
                if p.is_possible_parameter(for_lambda) {
                    p.parse_parameter(for_lambda);
                } else {
                    let action = p.skip_bad_tokens(
                        CommaToken,
                        |p| p.at(CommaToken) || p.is_possible_parameter(for_lambda),
                        |p| p.at(close),
                    );
                    if action == PostSkipAction::Abort {
                        break;
                    }
                }
                if !p.eat(CommaToken) {
                    break;
                }
            }
        });
    }

    fn is_possible_parameter(&mut self, for_lambda: bool) -> bool {
        let _ = for_lambda;
        matches!(
            self.current(),
            RefKeyword | OutKeyword | InKeyword | ParamsKeyword | ReadOnlyKeyword | ThisKeyword
        ) || self.at_set(super::TYPE_FIRST)
    }

    fn parse_parameter(&mut self, for_lambda: bool) {
        self.start_node(Parameter);

        while matches!(
            self.current(),
            RefKeyword | OutKeyword | InKeyword | ParamsKeyword | ReadOnlyKeyword | ThisKeyword
        ) {
            self.bump();
        }

        // Lambda parameters may omit the type: `(x, y) => ...`.
        let untyped = for_lambda
            && self.at(IdentifierToken)
            && matches!(self.nth(1), CommaToken | CloseParenToken | EqualsGreaterThanToken);
        if !untyped {
            self.parse_type(ParseTypeMode::Parameter);
        }

        if self.is_true_identifier() {
            self.bump();
        } else if self.at_contextual(UnderscoreToken) {
            self.bump();
        } else {
            self.missing_token(IdentifierToken, true);
        }

        if self.at(EqualsToken) {
            self.start_node(EqualsValueClause);
            self.bump();
            self.parse_expression();
            self.finish_node();
        }

        self.finish_node();
    }

    /// `< T, U >`
    pub(crate) fn parse_type_parameter_list(&mut self) {
        debug_assert!(self.at(LessThanToken));
        self.start_node(TypeParameterList);
        self.bump();

        self.with_terminator(TerminatorState::IS_END_OF_TYPE_PARAMETER_LIST, |p| {
            p.parse_type_parameter();
            let mut last_pos = usize::MAX;
            loop {
                if !p.is_making_progress(&mut last_pos) {
                    break;
                }
                if p.at(CommaToken) {
                    p.bump();
                    p.parse_type_parameter();
                } else if p.at(GreaterThanToken) || p.is_terminator() {
                    break;
                } else {
                    let action = p.skip_bad_tokens(
                        CommaToken,
                        |p| p.at(CommaToken),
                        |p| p.at(GreaterThanToken),
                    );
                    if action == PostSkipAction::Abort {
                        break;
                    }
                }
            }
        });

        self.expect(GreaterThanToken);
        self.finish_node();
    }

    fn parse_type_parameter(&mut self) {
        self.start_node(TypeParameter);
        self.expect(IdentifierToken);
        self.finish_node();
    }

    /// `where T : base, new(), class`
    pub(crate) fn parse_type_parameter_constraint_clause(&mut self) {
        debug_assert!(self.at_contextual(WhereKeyword));
        self.start_node(TypeParameterConstraintClause);
        self.bump_as(WhereKeyword);
        self.start_node(IdentifierName);
        self.expect(IdentifierToken);
        self.finish_node();
        self.expect(ColonToken);

        let mut last_pos = usize::MAX;
        loop {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            self.parse_type_parameter_constraint();
            if !self.eat(CommaToken) {
                break;
            }
        }
        self.finish_node();
    }

    fn parse_type_parameter_constraint(&mut self) {
        match self.current() {
            NewKeyword => {
                self.start_node(ConstructorConstraint);
                self.bump();
                self.expect(OpenParenToken);
                self.expect(CloseParenToken);
                self.finish_node();
            }
            ClassKeyword | StructKeyword => {
                self.start_node(TypeConstraint);
                self.bump();
                self.finish_node();
            }
            _ if self.at_set(super::TYPE_FIRST) => {
                self.start_node(TypeConstraint);
                self.parse_type(ParseTypeMode::Normal);
                self.finish_node();
            }
            _ => {
                self.error(ErrorCode::ConstraintExpected);
                self.start_node(TypeConstraint);
                self.create_missing_identifier_name(false);
                self.finish_node();
            }
        }
    }
}
