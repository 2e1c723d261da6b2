//! Grammar productions, implemented as `impl Parser` extensions.
//!
//! Split by construct family: declarations and directives (`items`), type
//! members (`members`), statements (`stmts`), expressions (`exprs`), type
//! syntax and the speculative type scanner (`types`), patterns
//! (`patterns`).

mod exprs;
mod items;
mod members;
mod patterns;
mod stmts;
mod types;

pub(crate) use types::{ParseTypeMode, ScanTypeFlags};

use alchemy_syntax::facts;
use alchemy_syntax::SyntaxKind::{self, *};
use alchemy_syntax::TokenSet;

use super::core::Parser;

/// Tokens that may begin a statement, before any deeper lookahead.
pub(crate) const STATEMENT_FIRST: TokenSet = TokenSet::new(&[
    OpenBraceToken,
    SemicolonToken,
    BreakKeyword,
    ContinueKeyword,
    TryKeyword,
    ConstKeyword,
    DoKeyword,
    ForKeyword,
    ForEachKeyword,
    IfKeyword,
    ElseKeyword,
    ReturnKeyword,
    SwitchKeyword,
    ThrowKeyword,
    UsingKeyword,
    WhileKeyword,
    GotoKeyword,
    StaticKeyword,
    ReadOnlyKeyword,
    RefKeyword,
    ExternKeyword,
    OpenBracketToken,
    CaseKeyword,
]);

/// Tokens that may begin a type syntax.
pub(crate) const TYPE_FIRST: TokenSet = TokenSet::new(&[
    IdentifierToken,
    ColonColonToken,
    OpenParenToken,
    RefKeyword,
    VarKeyword,
    BoolKeyword,
    ByteKeyword,
    SByteKeyword,
    ShortKeyword,
    UShortKeyword,
    IntKeyword,
    UIntKeyword,
    LongKeyword,
    ULongKeyword,
    DoubleKeyword,
    FloatKeyword,
    StringKeyword,
    CharKeyword,
    VoidKeyword,
    ObjectKeyword,
]);

/// Modifiers that may precede a member declaration.
pub(crate) const MEMBER_MODIFIERS: TokenSet = TokenSet::new(&[
    PublicKeyword,
    PrivateKeyword,
    InternalKeyword,
    ProtectedKeyword,
    StaticKeyword,
    ReadOnlyKeyword,
    SealedKeyword,
    AbstractKeyword,
    VirtualKeyword,
    OverrideKeyword,
    ExternKeyword,
    NewKeyword,
    FixedKeyword,
]);

impl Parser<'_> {
    /// An identifier usable as a name right now. Contextual keywords count,
    /// except where the next tokens commit them to their keyword reading
    /// (`partial class`, `where T :`).
    pub(crate) fn is_true_identifier(&mut self) -> bool {
        if !self.at(IdentifierToken) {
            return false;
        }
        match self.current_contextual() {
            Some(PartialKeyword) => !self.is_partial_type_start(),
            Some(WhereKeyword) => !self.is_where_of_constraint_clause(),
            _ => true,
        }
    }

    fn is_partial_type_start(&mut self) -> bool {
        matches!(
            self.nth(1),
            ClassKeyword | StructKeyword | InterfaceKeyword | NamespaceKeyword
        )
    }

    fn is_where_of_constraint_clause(&mut self) -> bool {
        self.nth(1) == IdentifierToken && self.nth(2) == ColonToken
    }

    /// A token that could begin an expression, with optional admission of
    /// binary/assignment operators (their parse inserts a missing operand).
    pub(crate) fn is_possible_expression(
        &mut self,
        allow_binary: bool,
        allow_assignment: bool,
    ) -> bool {
        let kind = self.current();
        match kind {
            TypeOfKeyword | DefaultKeyword | SizeOfKeyword | BaseKeyword | FalseKeyword
            | ThisKeyword | TrueKeyword | NullKeyword | OpenParenToken | NumericLiteralToken
            | StringLiteralStart | CharacterLiteralToken | NewKeyword | DelegateKeyword
            | ThrowKeyword | StackAllocKeyword | DotDotToken | RefKeyword | OpenBracketToken
            | ColonColonToken => true,
            StaticKeyword => self.is_possible_lambda_expression(facts::Precedence::Expression),
            IdentifierToken => self.is_true_identifier(),
            _ => {
                facts::is_predefined_type(kind)
                    || facts::is_any_unary_expression(kind)
                    || (allow_binary && facts::is_binary_expression_operator(kind))
                    || (allow_assignment && facts::is_assignment_expression_operator(kind))
            }
        }
    }

    /// A token that could begin a statement.
    pub(crate) fn is_possible_statement(&mut self, accept_accessibility_mods: bool) -> bool {
        let kind = self.current();
        match kind {
            IdentifierToken => self.is_true_identifier(),
            PublicKeyword | InternalKeyword | ProtectedKeyword | PrivateKeyword => {
                accept_accessibility_mods
            }
            _ if STATEMENT_FIRST.contains(kind) => true,
            _ => facts::is_predefined_type(kind) || self.is_possible_expression(true, true),
        }
    }

    pub(crate) fn is_possible_member_start(&mut self) -> bool {
        let current = self.current();
        self.can_start_member(current)
    }

    fn can_start_member(&mut self, kind: SyntaxKind) -> bool {
        MEMBER_MODIFIERS.contains(kind)
            || facts::is_predefined_type(kind)
            || matches!(
                kind,
                ClassKeyword
                    | StructKeyword
                    | InterfaceKeyword
                    | EnumKeyword
                    | DelegateKeyword
                    | ConstKeyword
                    | ConstructorKeyword
                    | OperatorKeyword
                    | ImplicitKeyword
                    | ExplicitKeyword
                    | IdentifierToken
                    | VoidKeyword
                    | OpenBraceToken
            )
    }

    pub(crate) fn is_possible_member_start_or_stop(&mut self) -> bool {
        self.at(CloseBraceToken) || self.is_possible_member_start()
    }

    pub(crate) fn is_namespace_member_start_or_stop(&mut self) -> bool {
        self.at(CloseBraceToken) || self.is_possible_namespace_member_declaration()
    }

    pub(crate) fn is_possible_namespace_member_declaration(&mut self) -> bool {
        match self.current() {
            ExternKeyword | UsingKeyword | NamespaceKeyword => true,
            IdentifierToken => self.is_partial_in_namespace_member_declaration(),
            kind => facts::is_type_modifier_or_type_keyword(kind),
        }
    }

    fn is_partial_in_namespace_member_declaration(&mut self) -> bool {
        self.current_contextual() == Some(PartialKeyword) && self.is_partial_type_start()
    }

    pub(crate) fn is_end_of_return_type(&mut self) -> bool {
        matches!(
            self.current(),
            OpenParenToken | OpenBraceToken | SemicolonToken
        )
    }

    pub(crate) fn is_end_of_parameter_list(&mut self) -> bool {
        matches!(
            self.current(),
            CloseParenToken | CloseBracketToken | SemicolonToken
        )
    }
}
