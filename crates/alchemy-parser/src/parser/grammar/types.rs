//! Type syntax: names, generics, tuples, arrays, nullables, and the
//! bounded speculative scanner that disambiguates `<` between a
//! type-argument list and a less-than operator.

use alchemy_syntax::facts;
use alchemy_syntax::SyntaxKind::*;
use bitflags::bitflags;

use crate::diagnostics::ErrorCode;
use crate::parser::core::Parser;
use crate::parser::terminator::TerminatorState;

/// Result of a speculative type scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanTypeFlags {
    /// Definitely not a type name.
    NotType,
    /// Definitely a type: a predefined type or an array type.
    MustBeType,
    /// `Alias::Name`, and nothing after it.
    AliasQualifiedName,
    /// Might be a generic (qualified) type name or a method name.
    GenericTypeOrMethod,
    /// Might be a generic (qualified) type name or an expression.
    GenericTypeOrExpression,
    /// Might be a non-generic (qualified) type name or an expression.
    NonGenericTypeOrExpression,
    /// Nullable type, ending with `?`.
    NullableType,
    /// Might be a tuple type.
    TupleType,
}

/// Context a type is being parsed in; drives `?` and tuple handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseTypeMode {
    Normal,
    Parameter,
    AfterIs,
    DefinitePattern,
    AfterOut,
    AfterRef,
    AfterTupleComma,
    AsExpression,
    NewExpression,
    FirstElementOfPossibleTupleLiteral,
}

/// Verdict on a `<` in expression context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanTypeArgumentListKind {
    NotTypeArgumentList,
    PossibleTypeArgumentList,
    DefiniteTypeArgumentList,
}

bitflags! {
    /// Context bits for name parsing, mostly influencing the `<` decision.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct NameOptions: u16 {
        const IN_EXPRESSION = 1 << 0;
        const IN_TYPE_LIST = 1 << 1;
        const POSSIBLE_PATTERN = 1 << 2;
        const AFTER_IS = 1 << 3;
        const DEFINITE_PATTERN = 1 << 4;
        const AFTER_OUT = 1 << 5;
        const AFTER_TUPLE_COMMA = 1 << 6;
        const FIRST_ELEMENT_OF_POSSIBLE_TUPLE_LITERAL = 1 << 7;
    }
}

/// Shape summary of a parsed type, for callers (like `new`) whose grammar
/// depends on whether the type ended as an array.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ParsedType {
    pub(crate) is_array: bool,
}

impl ParseTypeMode {
    fn name_options(self) -> NameOptions {
        match self {
            ParseTypeMode::AfterIs => NameOptions::AFTER_IS,
            ParseTypeMode::DefinitePattern => NameOptions::DEFINITE_PATTERN,
            ParseTypeMode::AfterOut => NameOptions::AFTER_OUT,
            ParseTypeMode::AfterTupleComma => NameOptions::AFTER_TUPLE_COMMA,
            ParseTypeMode::FirstElementOfPossibleTupleLiteral => {
                NameOptions::FIRST_ELEMENT_OF_POSSIBLE_TUPLE_LITERAL
            }
            _ => NameOptions::empty(),
        }
    }
}

impl Parser<'_> {
    // ------------------------------------------------------------------
    // Speculative scanning (cursor only, never writes to the tree)
    // ------------------------------------------------------------------

    /// Scans over a candidate type. On return the cursor sits after the
    /// scanned type; the caller restores its reset point if the result is
    /// consumed speculatively.
    pub(crate) fn scan_type(&mut self, mode: ParseTypeMode) -> ScanTypeFlags {
        debug_assert!(mode != ParseTypeMode::NewExpression);

        if self.at(RefKeyword) {
            // In a ref local or ref return, `ref` and `ref readonly` are
            // part of the type.
            self.scan_advance();
            if self.at(ReadOnlyKeyword) {
                self.scan_advance();
            }
        }

        let mut result;
        if self.at(IdentifierToken) || self.at(ColonColonToken) {
            let mut is_alias;
            if self.at(ColonColonToken) {
                // Error case of an alias used without a preceding name.
                result = ScanTypeFlags::NonGenericTypeOrExpression;
                is_alias = true;
            } else {
                is_alias = self.nth(1) == ColonColonToken;
                result = self.scan_named_type_part();
                if result == ScanTypeFlags::NotType {
                    return ScanTypeFlags::NotType;
                }
            }

            let mut first = true;
            while matches!(self.current(), DotToken | ColonColonToken) {
                // A second separator of either flavor ends the alias
                // reading: `x::y.z` is back to a normal qualified name.
                if !first {
                    is_alias = false;
                }
                self.scan_advance();
                result = self.scan_named_type_part();
                if result == ScanTypeFlags::NotType {
                    return ScanTypeFlags::NotType;
                }
                first = false;
            }

            if is_alias {
                result = ScanTypeFlags::AliasQualifiedName;
            }
        } else if facts::is_predefined_type(self.current()) || self.at(VarKeyword) {
            self.scan_advance();
            result = ScanTypeFlags::MustBeType;
        } else if self.at(OpenParenToken) {
            self.scan_advance();
            result = self.scan_tuple_type();
            if result == ScanTypeFlags::NotType
                || (mode == ParseTypeMode::DefinitePattern && !self.at(OpenBracketToken))
            {
                // A tuple type appears in a pattern only as the element
                // type of an array.
                return ScanTypeFlags::NotType;
            }
        } else {
            return ScanTypeFlags::NotType;
        }

        let mut last_was_question = false;
        let mut last_pos = usize::MAX;
        while self.is_making_progress(&mut last_pos) {
            match self.current() {
                QuestionToken if !last_was_question && self.can_be_nullable_type(mode) => {
                    self.scan_advance();
                    result = ScanTypeFlags::NullableType;
                    last_was_question = true;
                }
                OpenBracketToken => {
                    self.scan_advance();
                    while self.at(CommaToken) {
                        self.scan_advance();
                    }
                    if !self.at(CloseBracketToken) {
                        return ScanTypeFlags::NotType;
                    }
                    self.scan_advance();
                    result = ScanTypeFlags::MustBeType;
                    last_was_question = false;
                }
                _ => break,
            }
        }

        result
    }

    /// One dotted segment: identifier plus an optional type-argument list.
    fn scan_named_type_part(&mut self) -> ScanTypeFlags {
        if !self.at(IdentifierToken) || !self.is_true_identifier() {
            return ScanTypeFlags::NotType;
        }
        self.scan_advance();
        if self.at(LessThanToken) {
            let mut unused = false;
            self.scan_possible_type_argument_list(&mut unused)
        } else {
            ScanTypeFlags::NonGenericTypeOrExpression
        }
    }

    /// Walks the comma-separated arguments between `<` and the matching
    /// `>`, eagerly deciding "definitely a type argument list" on strong
    /// signals.
    pub(crate) fn scan_possible_type_argument_list(
        &mut self,
        is_definitely_type_argument_list: &mut bool,
    ) -> ScanTypeFlags {
        debug_assert!(self.at(LessThanToken));
        *is_definitely_type_argument_list = false;

        let mut result = ScanTypeFlags::GenericTypeOrExpression;
        let mut last_scanned_type = ScanTypeFlags::NotType;

        loop {
            self.scan_advance(); // `<` or `,`

            // Type arguments cannot contain attributes, so an open bracket
            // here means this is not a type argument list.
            if self.at(OpenBracketToken) {
                return ScanTypeFlags::NotType;
            }

            if self.at(GreaterThanToken) {
                self.scan_advance();
                return self.finish_scanned_type_argument_list(
                    result,
                    is_definitely_type_argument_list,
                );
            }

            last_scanned_type = self.scan_type(ParseTypeMode::Normal);

            match last_scanned_type {
                ScanTypeFlags::NotType => return ScanTypeFlags::NotType,

                ScanTypeFlags::MustBeType => {
                    // A predefined type or array type before `,` or `>` has
                    // no reading as an expression: `X<int,` must be a type
                    // argument list, while `X<Int32,` might still be two
                    // relational comparisons.
                    *is_definitely_type_argument_list = *is_definitely_type_argument_list
                        || matches!(self.current(), CommaToken | GreaterThanToken);
                    result = ScanTypeFlags::GenericTypeOrMethod;
                }

                ScanTypeFlags::NullableType => {
                    // `X<Y?,` and `X<Y?>` are definite; a bare `X<Y?` may
                    // still be a conditional: `X < Y ? Z : W`.
                    *is_definitely_type_argument_list = *is_definitely_type_argument_list
                        || matches!(self.current(), CommaToken | GreaterThanToken);
                    if *is_definitely_type_argument_list {
                        result = ScanTypeFlags::GenericTypeOrMethod;
                    }
                }

                ScanTypeFlags::GenericTypeOrExpression => {
                    // `X<Y<Z>,` is definite; `X<Y<Z>>` could be comparisons
                    // feeding a shift.
                    if !*is_definitely_type_argument_list {
                        *is_definitely_type_argument_list = self.at(CommaToken);
                        result = ScanTypeFlags::GenericTypeOrMethod;
                    }
                }

                ScanTypeFlags::GenericTypeOrMethod => {
                    result = ScanTypeFlags::GenericTypeOrMethod;
                }

                _ => {}
            }

            if !self.at(CommaToken) {
                break;
            }
        }

        if !self.at(GreaterThanToken) {
            // Missing `>` recovery: at an identifier (`X<A, B C`) assume the
            // `>` was forgotten; after a tuple type, `(` means an invocation
            // of `X<(T, U)>` with the `>` forgotten.
            if self.at(IdentifierToken)
                || (last_scanned_type == ScanTypeFlags::TupleType && self.at(OpenParenToken))
            {
                return result;
            }
            return ScanTypeFlags::NotType;
        }

        self.scan_advance();
        self.finish_scanned_type_argument_list(result, is_definitely_type_argument_list)
    }

    fn finish_scanned_type_argument_list(
        &mut self,
        result: ScanTypeFlags,
        is_definitely_type_argument_list: &mut bool,
    ) -> ScanTypeFlags {
        // `X<Y>)` is definitely a type argument list.
        *is_definitely_type_argument_list =
            *is_definitely_type_argument_list || self.at(CloseParenToken);
        if *is_definitely_type_argument_list {
            ScanTypeFlags::GenericTypeOrMethod
        } else {
            result
        }
    }

    fn scan_tuple_type(&mut self) -> ScanTypeFlags {
        let element = self.scan_type(ParseTypeMode::Normal);
        if element != ScanTypeFlags::NotType {
            if self.is_true_identifier() {
                self.scan_advance();
            }
            if self.at(CommaToken) {
                while self.at(CommaToken) {
                    self.scan_advance();
                    if self.scan_type(ParseTypeMode::Normal) == ScanTypeFlags::NotType {
                        return ScanTypeFlags::NotType;
                    }
                    if self.is_true_identifier() {
                        self.scan_advance();
                    }
                }
                if self.at(CloseParenToken) {
                    self.scan_advance();
                    return ScanTypeFlags::TupleType;
                }
            }
        }
        ScanTypeFlags::NotType
    }

    /// Decides what an infix `<` means after a name in expression context.
    pub(crate) fn scan_type_argument_list(
        &mut self,
        options: NameOptions,
    ) -> ScanTypeArgumentListKind {
        if !self.at(LessThanToken) {
            return ScanTypeArgumentListKind::NotTypeArgumentList;
        }
        if !options.contains(NameOptions::IN_EXPRESSION) {
            return ScanTypeArgumentListKind::DefiniteTypeArgumentList;
        }

        let point = self.reset_point();
        let mut is_definite = false;
        let flags = self.scan_possible_type_argument_list(&mut is_definite);
        let follow = self.current();
        let follow_contextual = self.current_contextual();
        self.restore(point);

        if flags == ScanTypeFlags::NotType {
            return ScanTypeArgumentListKind::NotTypeArgumentList;
        }
        if is_definite {
            return ScanTypeArgumentListKind::DefiniteTypeArgumentList;
        }

        // The token after the closing `>` drives the final decision.
        let accepted = match follow {
            OpenParenToken | CloseParenToken | CloseBracketToken | CloseBraceToken | ColonToken
            | SemicolonToken | CommaToken | DotToken | QuestionToken | EqualsEqualsToken
            | ExclamationEqualsToken | BarToken | CaretToken | AmpersandAmpersandToken
            | BarBarToken | AmpersandToken | OpenBracketToken | LessThanToken
            | LessThanEqualsToken | IsKeyword | AsKeyword | OpenBraceToken
            | EqualsGreaterThanToken | Eof => true,
            IdentifierToken if follow_contextual != Some(UnderscoreToken) => options.intersects(
                NameOptions::AFTER_IS
                    | NameOptions::DEFINITE_PATTERN
                    | NameOptions::AFTER_OUT
                    | NameOptions::AFTER_TUPLE_COMMA
                    | NameOptions::FIRST_ELEMENT_OF_POSSIBLE_TUPLE_LITERAL,
            ),
            _ => false,
        };

        if accepted {
            ScanTypeArgumentListKind::PossibleTypeArgumentList
        } else {
            ScanTypeArgumentListKind::NotTypeArgumentList
        }
    }

    // ------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------

    pub(crate) fn parse_type(&mut self, mode: ParseTypeMode) -> ParsedType {
        if self.at(RefKeyword) && mode != ParseTypeMode::AfterRef {
            self.start_node(RefType);
            self.bump();
            self.eat(ReadOnlyKeyword);
            let inner = self.parse_type(ParseTypeMode::AfterRef);
            self.finish_node();
            return inner;
        }

        let checkpoint = self.checkpoint();
        self.parse_underlying_type(mode);

        let mut shape = ParsedType::default();
        let mut last_pos = usize::MAX;
        while self.is_making_progress(&mut last_pos) {
            match self.current() {
                QuestionToken if self.can_be_nullable_type(mode) => {
                    self.start_node_at(checkpoint, NullableType);
                    self.bump();
                    self.finish_node();
                    shape.is_array = false;
                }
                OpenBracketToken => {
                    self.start_node_at(checkpoint, ArrayType);
                    while self.at(OpenBracketToken) {
                        self.parse_array_rank_specifier();
                    }
                    self.finish_node();
                    shape.is_array = true;
                }
                _ => break,
            }
        }
        shape
    }

    /// `T?` is only a nullable type where a conditional expression could
    /// not also start here.
    fn can_be_nullable_type(&mut self, mode: ParseTypeMode) -> bool {
        match mode {
            ParseTypeMode::AfterIs
            | ParseTypeMode::AsExpression
            | ParseTypeMode::FirstElementOfPossibleTupleLiteral => {
                // `x is T ? a : b` keeps the `?` for the conditional.
                let next = self.nth(1);
                !self.nth_starts_expression(1)
                    || matches!(
                        next,
                        CloseParenToken
                            | CloseBracketToken
                            | CloseBraceToken
                            | SemicolonToken
                            | CommaToken
                            | EqualsGreaterThanToken
                    )
            }
            _ => true,
        }
    }

    /// Shallow check whether the token `n` ahead could begin an expression.
    fn nth_starts_expression(&mut self, n: usize) -> bool {
        let kind = self.nth(n);
        matches!(
            kind,
            IdentifierToken
                | NumericLiteralToken
                | StringLiteralStart
                | CharacterLiteralToken
                | OpenParenToken
                | NewKeyword
                | ThisKeyword
                | BaseKeyword
                | NullKeyword
                | TrueKeyword
                | FalseKeyword
                | TypeOfKeyword
                | SizeOfKeyword
                | DefaultKeyword
                | ExclamationToken
                | TildeToken
                | MinusToken
                | PlusToken
        ) || facts::is_predefined_type(kind)
    }

    fn parse_underlying_type(&mut self, mode: ParseTypeMode) {
        let kind = self.current();
        if facts::is_predefined_type(kind) {
            if kind == VoidKeyword && self.nth(1) != AsteriskToken && mode != ParseTypeMode::Normal
            {
                // `void` only makes sense as a return type; other positions
                // still parse it so the tree stays regular.
                self.error(ErrorCode::NoVoidHere);
            }
            self.start_node(PredefinedType);
            self.bump();
            self.finish_node();
        } else if kind == VarKeyword {
            self.start_node(IdentifierName);
            self.bump();
            self.finish_node();
        } else if kind == IdentifierToken || kind == ColonColonToken {
            self.parse_qualified_name(mode.name_options());
        } else if kind == OpenParenToken {
            self.parse_tuple_type();
        } else {
            self.error(ErrorCode::TypeExpected);
            self.create_missing_identifier_name(false);
        }
    }

    /// `(T a, U b)`: a tuple type needs at least two elements.
    fn parse_tuple_type(&mut self) {
        self.start_node(TupleType);
        self.bump(); // `(`
        self.parse_tuple_element();
        let mut elements = 1;
        while self.at(CommaToken) {
            self.bump();
            self.parse_tuple_element();
            elements += 1;
        }
        if elements < 2 {
            self.error(ErrorCode::TupleTooFewElements);
        }
        self.expect(CloseParenToken);
        self.finish_node();
    }

    fn parse_tuple_element(&mut self) {
        self.start_node(TupleElement);
        self.parse_type(ParseTypeMode::Normal);
        if self.is_true_identifier() {
            self.bump();
        }
        self.finish_node();
    }

    /// `[ ]`, `[ , ]`, or `[ expr, expr ]`. Sizes are only meaningful under
    /// `new`; in plain type positions they are parsed anyway and rejected
    /// by the semantic pass.
    pub(crate) fn parse_array_rank_specifier(&mut self) {
        debug_assert!(self.at(OpenBracketToken));
        self.start_node(ArrayRankSpecifier);
        self.bump();

        if self.at(CloseBracketToken) {
            self.omitted_array_size();
        } else {
            let mut last_pos = usize::MAX;
            loop {
                if !self.is_making_progress(&mut last_pos) {
                    break;
                }
                if self.at(CommaToken) {
                    self.omitted_array_size();
                    self.bump();
                    continue;
                }
                if self.at(CloseBracketToken) {
                    self.omitted_array_size();
                    break;
                }
                if self.is_possible_expression(false, false) {
                    self.parse_expression();
                } else {
                    self.error(ErrorCode::ValueExpected);
                    self.omitted_array_size();
                }
                if self.at(CommaToken) {
                    self.bump();
                    continue;
                }
                break;
            }
        }

        self.expect(CloseBracketToken);
        self.finish_node();
    }

    /// `A`, `A.B`, `A::B.C<T>` with `::` only valid as the first separator.
    pub(crate) fn parse_qualified_name(&mut self, options: NameOptions) {
        let checkpoint = self.checkpoint();
        if self.at(ColonColonToken) {
            // `::B` without an alias in front.
            self.error(ErrorCode::UnexpectedDoubleColon);
            self.create_missing_identifier_name(false);
            self.start_node_at(checkpoint, AliasQualifiedName);
            self.bump();
            self.parse_simple_name(options);
            self.finish_node();
        } else {
            self.parse_simple_name(options);
        }

        let mut first = true;
        let mut last_pos = usize::MAX;
        while self.is_making_progress(&mut last_pos) {
            match self.current() {
                DotToken => {
                    self.start_node_at(checkpoint, QualifiedName);
                    self.bump();
                    self.parse_simple_name(options);
                    self.finish_node();
                }
                ColonColonToken => {
                    if first {
                        self.start_node_at(checkpoint, AliasQualifiedName);
                    } else {
                        self.error(ErrorCode::UnexpectedDoubleColon);
                        self.start_node_at(checkpoint, QualifiedName);
                    }
                    self.bump();
                    self.parse_simple_name(options);
                    self.finish_node();
                }
                _ => break,
            }
            first = false;
        }
    }

    /// An identifier, possibly with a type-argument list when the `<`
    /// decision says so.
    pub(crate) fn parse_simple_name(&mut self, options: NameOptions) {
        if !self.at(IdentifierToken) {
            self.create_missing_identifier_name(true);
            return;
        }

        let checkpoint = self.checkpoint();
        self.bump();

        if self.at(LessThanToken)
            && self.scan_type_argument_list(options)
                != ScanTypeArgumentListKind::NotTypeArgumentList
        {
            self.start_node_at(checkpoint, GenericName);
            self.parse_type_argument_list();
            self.finish_node();
        } else {
            self.start_node_at(checkpoint, IdentifierName);
            self.finish_node();
        }
    }

    /// `< type, type >`
    pub(crate) fn parse_type_argument_list(&mut self) {
        debug_assert!(self.at(LessThanToken));
        self.start_node(TypeArgumentList);
        self.bump();

        self.with_terminator(TerminatorState::IS_END_OF_TYPE_ARGUMENT_LIST, |p| {
            p.parse_type(ParseTypeMode::Normal);
            let mut last_pos = usize::MAX;
            while p.is_making_progress(&mut last_pos) {
                if p.at(CommaToken) {
                    p.bump();
                    p.parse_type(ParseTypeMode::Normal);
                } else if p.at(GreaterThanToken) || p.is_terminator() {
                    break;
                } else {
                    let action = p.skip_bad_tokens(
                        CommaToken,
                        |p| p.at(CommaToken),
                        |p| p.at(GreaterThanToken),
                    );
                    if action == crate::parser::core::PostSkipAction::Abort {
                        break;
                    }
                }
            }
        });

        self.expect(GreaterThanToken);
        self.finish_node();
    }

    /// A zero-width `IdentifierName` used wherever a name was required.
    pub(crate) fn create_missing_identifier_name(&mut self, report: bool) {
        self.start_node(IdentifierName);
        self.missing_token(IdentifierToken, report);
        self.finish_node();
    }
}
