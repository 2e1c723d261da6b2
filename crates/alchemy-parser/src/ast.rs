//! Typed wrappers over CST nodes and the visitor protocol.
//!
//! Each wrapper holds a `SyntaxNode` and exposes typed accessors; `cast` is
//! the only fallible step. Tree traversal, spans, and token iteration come
//! from rowan.

use alchemy_syntax::{facts, SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(CompilationUnit, CompilationUnit);
ast_node!(NamespaceDeclaration, NamespaceDeclaration);
ast_node!(UsingDirective, UsingDirective);
ast_node!(ExternAliasDirective, ExternAliasDirective);
ast_node!(GlobalStatement, GlobalStatement);
ast_node!(ClassDeclaration, ClassDeclaration);
ast_node!(StructDeclaration, StructDeclaration);
ast_node!(InterfaceDeclaration, InterfaceDeclaration);
ast_node!(EnumDeclaration, EnumDeclaration);
ast_node!(DelegateDeclaration, DelegateDeclaration);
ast_node!(FieldDeclaration, FieldDeclaration);
ast_node!(ConstantDeclaration, ConstantDeclaration);
ast_node!(MethodDeclaration, MethodDeclaration);
ast_node!(ConstructorDeclaration, ConstructorDeclaration);
ast_node!(PropertyDeclaration, PropertyDeclaration);
ast_node!(IndexerDeclaration, IndexerDeclaration);
ast_node!(OperatorDeclaration, OperatorDeclaration);
ast_node!(ConversionOperatorDeclaration, ConversionOperatorDeclaration);
ast_node!(ParameterList, ParameterList);
ast_node!(Parameter, Parameter);
ast_node!(VariableDeclaration, VariableDeclaration);
ast_node!(VariableDeclarator, VariableDeclarator);
ast_node!(EqualsValueClause, EqualsValueClause);
ast_node!(Block, Block);
ast_node!(LocalDeclarationStatement, LocalDeclarationStatement);
ast_node!(ExpressionStatement, ExpressionStatement);
ast_node!(IfStatement, IfStatement);
ast_node!(ForEachStatement, ForEachStatement);
ast_node!(SwitchStatement, SwitchStatement);
ast_node!(TryStatement, TryStatement);
ast_node!(IdentifierName, IdentifierName);
ast_node!(QualifiedName, QualifiedName);
ast_node!(GenericName, GenericName);
ast_node!(PredefinedType, PredefinedType);
ast_node!(TupleExpression, TupleExpression);
ast_node!(ParenthesizedExpression, ParenthesizedExpression);
ast_node!(IsPatternExpression, IsPatternExpression);
ast_node!(RecursivePattern, RecursivePattern);

/// Any expression node, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression(SyntaxNode);

impl Expression {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        facts::is_expression_syntax(node.kind()).then(|| Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind()
    }
}

/// Any statement node, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement(SyntaxNode);

impl Statement {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        facts::is_statement_syntax(node.kind()).then(|| Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind()
    }
}

/// Any member declaration, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberDeclaration(SyntaxNode);

impl MemberDeclaration {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        facts::is_member_declaration_syntax(node.kind()).then(|| Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind()
    }
}

fn first_identifier(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == SyntaxKind::IdentifierToken)
}

impl CompilationUnit {
    pub fn namespaces(&self) -> impl Iterator<Item = NamespaceDeclaration> + '_ {
        self.0.children().filter_map(NamespaceDeclaration::cast)
    }

    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> + '_ {
        self.0.children().filter_map(UsingDirective::cast)
    }

    pub fn members(&self) -> impl Iterator<Item = MemberDeclaration> + '_ {
        self.0.children().filter_map(MemberDeclaration::cast)
    }

    pub fn statements(&self) -> impl Iterator<Item = GlobalStatement> + '_ {
        self.0.children().filter_map(GlobalStatement::cast)
    }
}

impl NamespaceDeclaration {
    pub fn name(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| facts::is_name(n.kind()))
    }

    pub fn members(&self) -> impl Iterator<Item = MemberDeclaration> + '_ {
        self.0.children().filter_map(MemberDeclaration::cast)
    }
}

impl ClassDeclaration {
    pub fn identifier(&self) -> Option<SyntaxToken> {
        first_identifier(&self.0)
    }

    pub fn members(&self) -> impl Iterator<Item = MemberDeclaration> + '_ {
        self.0.children().filter_map(MemberDeclaration::cast)
    }
}

impl StructDeclaration {
    pub fn identifier(&self) -> Option<SyntaxToken> {
        first_identifier(&self.0)
    }

    pub fn members(&self) -> impl Iterator<Item = MemberDeclaration> + '_ {
        self.0.children().filter_map(MemberDeclaration::cast)
    }
}

impl MethodDeclaration {
    pub fn identifier(&self) -> Option<SyntaxToken> {
        first_identifier(&self.0)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        self.0.children().find_map(ParameterList::cast)
    }

    pub fn body(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }
}

impl FieldDeclaration {
    pub fn declaration(&self) -> Option<VariableDeclaration> {
        self.0.children().find_map(VariableDeclaration::cast)
    }
}

impl VariableDeclaration {
    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> + '_ {
        self.0.children().filter_map(VariableDeclarator::cast)
    }

    pub fn ty(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| facts::is_type_syntax(n.kind()))
    }
}

impl VariableDeclarator {
    pub fn identifier(&self) -> Option<SyntaxToken> {
        first_identifier(&self.0)
    }

    pub fn initializer(&self) -> Option<EqualsValueClause> {
        self.0.children().find_map(EqualsValueClause::cast)
    }
}

impl EqualsValueClause {
    pub fn value(&self) -> Option<Expression> {
        self.0.children().find_map(Expression::cast)
    }
}

impl LocalDeclarationStatement {
    pub fn declaration(&self) -> Option<VariableDeclaration> {
        self.0.children().find_map(VariableDeclaration::cast)
    }
}

/// Visitor keyed on node kind. Every method defaults to walking the node's
/// children, and kinds without a dedicated hook fall through to
/// [`SyntaxVisitor::visit_other`], so new node kinds never break an
/// existing visitor.
pub trait SyntaxVisitor {
    fn visit(&mut self, node: &SyntaxNode) {
        match node.kind() {
            SyntaxKind::CompilationUnit => self.visit_compilation_unit(node),
            SyntaxKind::NamespaceDeclaration => self.visit_namespace_declaration(node),
            SyntaxKind::UsingDirective | SyntaxKind::ExternAliasDirective => {
                self.visit_directive(node)
            }
            kind if facts::is_member_declaration_syntax(kind) => {
                self.visit_member_declaration(node)
            }
            kind if facts::is_statement_syntax(kind) => self.visit_statement(node),
            kind if facts::is_pattern_syntax(kind) => self.visit_pattern(node),
            kind if facts::is_type_syntax(kind) => self.visit_type(node),
            kind if facts::is_expression_syntax(kind) => self.visit_expression(node),
            _ => self.visit_other(node),
        }
    }

    fn walk(&mut self, node: &SyntaxNode) {
        for child in node.children() {
            self.visit(&child);
        }
    }

    fn visit_compilation_unit(&mut self, node: &SyntaxNode) {
        self.walk(node);
    }

    fn visit_namespace_declaration(&mut self, node: &SyntaxNode) {
        self.walk(node);
    }

    fn visit_directive(&mut self, node: &SyntaxNode) {
        self.walk(node);
    }

    fn visit_member_declaration(&mut self, node: &SyntaxNode) {
        self.walk(node);
    }

    fn visit_statement(&mut self, node: &SyntaxNode) {
        self.walk(node);
    }

    fn visit_expression(&mut self, node: &SyntaxNode) {
        self.walk(node);
    }

    fn visit_pattern(&mut self, node: &SyntaxNode) {
        self.walk(node);
    }

    fn visit_type(&mut self, node: &SyntaxNode) {
        self.walk(node);
    }

    /// Fallback for kinds the visitor does not model (including kinds added
    /// after the visitor was written). Walking keeps traversal total.
    fn visit_other(&mut self, node: &SyntaxNode) {
        self.walk(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_compilation_unit, ParseOptions};

    fn parse(source: &str) -> crate::Parse {
        parse_compilation_unit(source, ParseOptions::default()).expect("no fuel limits")
    }

    #[test]
    fn typed_accessors() {
        let parse = parse("namespace N { class C { int x = 1, y = 2; } }");
        let root = parse.root();
        let ns = root.namespaces().next().expect("namespace");
        assert_eq!(ns.name().unwrap().text(), "N");

        let class = ns
            .members()
            .find_map(|m| ClassDeclaration::cast(m.syntax().clone()))
            .expect("class");
        assert_eq!(class.identifier().unwrap().text(), "C");

        let field = class
            .members()
            .find_map(|m| FieldDeclaration::cast(m.syntax().clone()))
            .expect("field");
        let decl = field.declaration().expect("variable declaration");
        let names: Vec<_> = decl
            .declarators()
            .map(|d| d.identifier().unwrap().text().to_string())
            .collect();
        assert_eq!(names, ["x", "y"]);

        let init = decl
            .declarators()
            .next()
            .unwrap()
            .initializer()
            .expect("initializer");
        assert_eq!(init.value().unwrap().kind(), SyntaxKind::NumericLiteralExpression);
    }

    #[test]
    fn visitor_walks_and_ignores_unknown_kinds() {
        struct Counter {
            expressions: usize,
            statements: usize,
            others: usize,
        }

        impl SyntaxVisitor for Counter {
            fn visit_expression(&mut self, node: &SyntaxNode) {
                self.expressions += 1;
                self.walk(node);
            }
            fn visit_statement(&mut self, node: &SyntaxNode) {
                self.statements += 1;
                self.walk(node);
            }
            fn visit_other(&mut self, node: &SyntaxNode) {
                self.others += 1;
                self.walk(node);
            }
        }

        let parse = parse("int x = 1 + 2; if (x) { f(x); }");
        let mut counter = Counter {
            expressions: 0,
            statements: 0,
            others: 0,
        };
        counter.visit(&parse.syntax());

        assert!(counter.expressions >= 4); // 1, 2, 1+2, f(x), ...
        assert!(counter.statements >= 3); // declaration, if, block, call
        // Structural kinds without hooks (declarators, argument lists)
        // flow through visit_other without breaking traversal.
        assert!(counter.others > 0);
    }

    #[test]
    fn statement_and_member_wrappers() {
        let parse = parse("class C { void M() { return; } }");
        let statements = parse
            .syntax()
            .descendants()
            .filter_map(Statement::cast)
            .count();
        assert!(statements >= 2); // block + return

        let members = parse
            .syntax()
            .descendants()
            .filter_map(MemberDeclaration::cast)
            .count();
        assert_eq!(members, 2); // class + method
    }
}
