//! Compilation units, namespaces, and directives.

use alchemy_syntax::SyntaxKind::{self, *};

use crate::diagnostics::ErrorCode;
use crate::parser::core::{Parser, PostSkipAction};
use crate::parser::terminator::TerminatorState;

/// How far a namespace body has progressed. Transitions are monotonic in
/// the listed order; the final state is an error sink for declarations that
/// appear after top-level statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NamespaceParts {
    None,
    ExternAliases,
    Usings,
    /// Reserved: attribute syntax is not in the grammar, but the state is
    /// kept so the ordering matches the progression of a full body.
    #[allow(dead_code)]
    GlobalAttributes,
    MembersAndStatements,
    TypesAndNamespaces,
    TopLevelStatementsAfterTypesAndNamespaces,
}

impl Parser<'_> {
    pub(crate) fn parse_compilation_unit(&mut self) {
        self.start_node(CompilationUnit);
        self.with_terminator(TerminatorState::IS_NAMESPACE_MEMBER_START_OR_STOP, |p| {
            p.parse_namespace_body(true);
        });
        self.bump_eof();
        self.finish_node();
    }

    /// Shared by the compilation unit (top level) and namespace bodies.
    fn parse_namespace_body(&mut self, top_level: bool) {
        let mut seen = NamespaceParts::None;
        let mut last_pos = usize::MAX;

        loop {
            if !self.is_making_progress(&mut last_pos) {
                break;
            }
            if self.should_stop() {
                break;
            }
            match self.current() {
                CloseBraceToken => {
                    if !top_level {
                        break;
                    }
                    // An unmatched `}` at the top level is skipped so the
                    // file keeps parsing.
                    self.error_msg(ErrorCode::UnexpectedToken, "unexpected '}'");
                    self.start_node(SkippedTokens);
                    self.bump();
                    self.finish_node();
                }
                NamespaceKeyword => {
                    self.parse_namespace_declaration();
                    seen = seen.max(NamespaceParts::TypesAndNamespaces);
                }
                ExternKeyword if self.nth_contextual_is(1, AliasKeyword) => {
                    if seen > NamespaceParts::ExternAliases {
                        self.error_msg(
                            ErrorCode::UsingAfterElements,
                            "an extern alias must precede all other declarations",
                        );
                    }
                    self.parse_extern_alias_directive();
                    seen = seen.max(NamespaceParts::ExternAliases);
                }
                UsingKeyword if !self.using_is_statement() => {
                    if seen >= NamespaceParts::MembersAndStatements {
                        self.error(ErrorCode::UsingAfterElements);
                    }
                    self.parse_using_directive();
                    seen = seen.max(NamespaceParts::Usings);
                }
                _ if self.is_possible_type_declaration_start() => {
                    self.parse_namespace_member_declaration();
                    seen = seen.max(NamespaceParts::TypesAndNamespaces);
                }
                _ if self.is_possible_statement(true) => {
                    if !top_level {
                        self.error_msg(
                            ErrorCode::InvalidMemberDecl,
                            "statements are not valid directly in a namespace",
                        );
                    } else if seen >= NamespaceParts::TypesAndNamespaces {
                        self.error(ErrorCode::TopLevelStatementAfterNamespaceOrType);
                        seen = NamespaceParts::TopLevelStatementsAfterTypesAndNamespaces;
                    } else {
                        seen = seen.max(NamespaceParts::MembersAndStatements);
                    }
                    self.start_node(GlobalStatement);
                    self.parse_statement();
                    self.finish_node();
                }
                _ => {
                    let action = self.skip_bad_tokens(
                        CloseBraceToken,
                        |p| p.is_possible_namespace_member_declaration() || p.is_possible_statement(true),
                        |p| p.at(CloseBraceToken),
                    );
                    if action == PostSkipAction::Abort && !top_level {
                        break;
                    }
                }
            }
        }
    }

    fn nth_contextual_is(&mut self, n: usize, contextual: SyntaxKind) -> bool {
        self.nth_token(n).contextual_kind == Some(contextual)
    }

    /// A `using (` or `using var` at the top level is a statement, not a
    /// directive.
    fn using_is_statement(&mut self) -> bool {
        matches!(self.nth(1), OpenParenToken | VarKeyword)
    }

    /// Skips a possible modifier run speculatively and checks whether a
    /// type declaration keyword follows.
    fn is_possible_type_declaration_start(&mut self) -> bool {
        let point = self.reset_point();
        let mut last_pos = usize::MAX;
        let mut found = false;
        while self.is_making_progress(&mut last_pos) {
            let current = self.current();
            if alchemy_syntax::facts::is_type_declaration_start(current) {
                found = true;
                break;
            }
            let is_modifier = alchemy_syntax::facts::is_type_modifier_or_type_keyword(current)
                || (self.at_contextual(PartialKeyword)
                    && matches!(
                        self.nth(1),
                        ClassKeyword | StructKeyword | InterfaceKeyword
                    ));
            if !is_modifier {
                break;
            }
            self.scan_advance();
        }
        self.restore(point);
        found
    }

    /// Recovery entry for a `namespace` in a position where it is not
    /// allowed; the declaration still parses so its contents survive.
    pub(crate) fn parse_namespace_declaration_for_recovery(&mut self) {
        self.parse_namespace_declaration();
    }

    fn parse_namespace_declaration(&mut self) {
        self.start_node(NamespaceDeclaration);
        self.bump(); // `namespace`
        self.parse_namespace_name();
        self.expect(OpenBraceToken);
        self.parse_namespace_body(false);
        self.expect(CloseBraceToken);
        self.eat(SemicolonToken);
        self.finish_node();
    }

    /// A namespace name is dotted simple names only; `::` never names a
    /// namespace and is consumed as a separator with a diagnostic.
    fn parse_namespace_name(&mut self) {
        let checkpoint = self.checkpoint();
        if self.at(IdentifierToken) {
            self.start_node(IdentifierName);
            self.bump();
            self.finish_node();
        } else {
            self.error(ErrorCode::IdentifierExpected);
            self.create_missing_identifier_name(false);
        }

        let mut last_pos = usize::MAX;
        while self.is_making_progress(&mut last_pos) {
            match self.current() {
                DotToken => {}
                ColonColonToken => self.error(ErrorCode::UnexpectedDoubleColon),
                _ => break,
            }
            self.start_node_at(checkpoint, QualifiedName);
            self.bump(); // separator
            self.start_node(IdentifierName);
            self.expect(IdentifierToken);
            self.finish_node();
            self.finish_node();
        }
    }

    /// `extern alias Name ;`
    fn parse_extern_alias_directive(&mut self) {
        self.start_node(ExternAliasDirective);
        self.bump(); // `extern`
        self.bump_as(AliasKeyword);
        self.start_node(IdentifierName);
        self.expect(IdentifierToken);
        self.finish_node();
        self.expect(SemicolonToken);
        self.finish_node();
    }

    /// `using N;`, `using static T;`, `using A = N;`
    fn parse_using_directive(&mut self) {
        self.start_node(UsingDirective);
        self.bump(); // `using`
        self.eat(StaticKeyword);

        if self.at(IdentifierToken) && self.nth(1) == EqualsToken {
            self.start_node(NameEquals);
            self.start_node(IdentifierName);
            self.bump();
            self.finish_node();
            self.bump(); // `=`
            self.finish_node();
        }

        if self.at_set(super::TYPE_FIRST) {
            self.parse_type(super::types::ParseTypeMode::Normal);
        } else {
            self.error(ErrorCode::NameExpected);
            self.create_missing_identifier_name(false);
        }
        self.expect(SemicolonToken);
        self.finish_node();
    }

    /// A namespace-level type declaration with its modifier run.
    fn parse_namespace_member_declaration(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_modifiers();
        if alchemy_syntax::facts::is_type_declaration_start(self.current()) {
            self.parse_type_declaration_body(checkpoint);
        } else {
            self.error(ErrorCode::InvalidMemberDecl);
            self.start_node_at(checkpoint, IncompleteMember);
            self.finish_node();
        }
    }
}
