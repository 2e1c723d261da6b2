use alchemy_syntax::SyntaxKind::*;

use super::{assert_no_errors, child_kinds, codes, dump, find, parse};
use crate::diagnostics::ErrorCode;

#[test]
fn empty_input() {
    let parse = parse("");
    assert!(parse.diagnostics().is_empty());
    assert_eq!(parse.syntax().kind(), CompilationUnit);
    assert!(child_kinds(&parse.syntax()).is_empty());
    insta::assert_snapshot!(dump(""), @"CompilationUnit");
}

#[test]
fn namespace_with_class_and_field() {
    let source = "namespace N { class C { int x; } }";
    assert_no_errors(source);
    insta::assert_snapshot!(dump(source), @r#"
    CompilationUnit
      NamespaceDeclaration
        NamespaceKeyword "namespace"
        IdentifierName
          IdentifierToken "N"
        OpenBraceToken "{"
        ClassDeclaration
          ClassKeyword "class"
          IdentifierToken "C"
          OpenBraceToken "{"
          FieldDeclaration
            VariableDeclaration
              PredefinedType
                IntKeyword "int"
              VariableDeclarator
                IdentifierToken "x"
            SemicolonToken ";"
          CloseBraceToken "}"
        CloseBraceToken "}"
    "#);
}

#[test]
fn dotted_namespace_name() {
    let source = "namespace A.B.C { }";
    assert_no_errors(source);
    let parse = parse(source);
    let name = find(&parse, QualifiedName).expect("qualified name");
    // Left-nested: (A.B).C
    assert_eq!(child_kinds(&name), [QualifiedName, IdentifierName]);
}

#[test]
fn using_directives() {
    assert_no_errors("using A; using static B.C; using D = E.F; class X { }");
    let parse = parse("using D = E.F;");
    let using = find(&parse, UsingDirective).unwrap();
    assert_eq!(child_kinds(&using), [NameEquals, QualifiedName]);
}

#[test]
fn extern_alias_first() {
    assert_no_errors("extern alias Lib; using A; namespace N { }");
    // Out of order: extern alias after a using.
    assert_eq!(
        codes("using A; extern alias Lib;"),
        [ErrorCode::UsingAfterElements]
    );
}

#[test]
fn using_after_members_is_reported() {
    assert_eq!(
        codes("class C { } using A;"),
        [ErrorCode::UsingAfterElements]
    );
}

#[test]
fn top_level_statements_precede_types() {
    assert_no_errors("int x = 1; class C { }");
    assert_eq!(
        codes("class C { } int x = 1;"),
        [ErrorCode::TopLevelStatementAfterNamespaceOrType]
    );
}

#[test]
fn statement_inside_namespace_is_reported() {
    let parse = parse("namespace N { int x = 1; }");
    assert!(
        parse
            .diagnostics()
            .iter()
            .any(|d| d.code == ErrorCode::InvalidMemberDecl)
    );
}

#[test]
fn nested_namespaces() {
    let source = "namespace A { namespace B { class C { } } }";
    assert_no_errors(source);
    let parse = parse(source);
    let outer = find(&parse, NamespaceDeclaration).unwrap();
    assert!(
        outer
            .descendants()
            .filter(|n| n.kind() == NamespaceDeclaration)
            .count()
            == 2
    );
}

#[test]
fn namespace_name_with_double_colon_is_reported() {
    assert!(codes("namespace A::B { }").contains(&ErrorCode::UnexpectedDoubleColon));
}

#[test]
fn modifiers_on_type_declarations() {
    assert_no_errors("public sealed class A { } internal struct B { } public interface I { }");
    assert_no_errors("public abstract partial class P { }");
}

#[test]
fn global_statement_wraps_statement() {
    let parse = parse("return;");
    let global = find(&parse, GlobalStatement).unwrap();
    assert_eq!(child_kinds(&global), [ReturnStatement]);
}

#[test]
fn stray_close_brace_at_top_level_is_skipped() {
    let parse = parse("} class C { }");
    assert!(
        parse
            .diagnostics()
            .iter()
            .any(|d| d.code == ErrorCode::UnexpectedToken)
    );
    assert!(find(&parse, ClassDeclaration).is_some());
    assert!(find(&parse, SkippedTokens).is_some());
}

#[test]
fn eof_token_is_always_present() {
    for source in ["", "class C { }", "x"] {
        let parse = parse(source);
        let last = parse
            .syntax()
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .last()
            .expect("compilation unit has tokens");
        assert_eq!(last.kind(), Eof);
        assert!(last.text().is_empty());
    }
}
