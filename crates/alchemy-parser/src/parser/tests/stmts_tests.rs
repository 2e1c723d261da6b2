use alchemy_syntax::SyntaxKind::*;
use indoc::indoc;

use super::{assert_no_errors, child_kinds, codes, dump, find, parse};
use crate::diagnostics::ErrorCode;

#[test]
fn local_declarations() {
    assert_no_errors("int x;");
    assert_no_errors("int x = 1, y = 2;");
    assert_no_errors("var v = f();");
    assert_no_errors("const int K = 3;");
    assert_no_errors("C<T> c = null;");
    assert_no_errors("int[,] grid = null;");

    let parse = parse("int x = 1, y = 2;");
    let decl = find(&parse, VariableDeclaration).unwrap();
    assert_eq!(
        child_kinds(&decl),
        [PredefinedType, VariableDeclarator, VariableDeclarator]
    );
}

#[test]
fn if_else_chains() {
    let source = "if (a) { } else if (b) { } else { }";
    assert_no_errors(source);
    let parse = parse(source);
    let outer = find(&parse, IfStatement).unwrap();
    let else_clause = outer
        .children()
        .find(|n| n.kind() == ElseClause)
        .expect("else clause");
    assert_eq!(child_kinds(&else_clause), [IfStatement]);
}

#[test]
fn loops() {
    assert_no_errors("while (x) { }");
    assert_no_errors("do { } while (x);");
    assert_no_errors("for (int i = 0; i < n; i++) { }");
    assert_no_errors("for (;;) { }");
    assert_no_errors("foreach (int x in xs) { }");
    assert_no_errors("foreach (var (a, b) in pairs) { }");

    assert!(find(&parse("do { } while (x);"), DoStatement).is_some());
    assert!(
        find(&parse("foreach (var (a, b) in pairs) { }"), ForEachVariableStatement).is_some()
    );
}

#[test]
fn for_with_in_reparses_as_foreach() {
    let source = "for (SomeType t in list) { }";
    let parse = parse(source);
    assert_eq!(codes(source), [ErrorCode::ExpectedForeachKeyword]);

    let foreach = find(&parse, ForEachStatement).expect("reinterpreted as foreach");
    // The original `for` is preserved as skipped tokens; the `foreach`
    // token is zero-width.
    let skipped = foreach
        .children()
        .find(|n| n.kind() == SkippedTokens)
        .expect("`for` kept in the tree");
    assert_eq!(skipped.text().to_string().trim_end(), "for");
    let foreach_kw = foreach
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == ForEachKeyword)
        .expect("synthesized keyword");
    assert!(foreach_kw.text().is_empty());
}

#[test]
fn bad_foreach_declaration() {
    assert!(codes("foreach (x in xs) { }").contains(&ErrorCode::BadForeachDecl));
}

#[test]
fn switch_statement_sections() {
    let source = indoc! {r#"
        switch (x) {
            case 1:
            case 2:
                f();
                break;
            case int n when n > 3:
                break;
            default:
                break;
        }
    "#};
    assert_no_errors(source);
    let parse = parse(source);
    let switch = find(&parse, SwitchStatement).unwrap();
    let sections: Vec<_> = switch
        .children()
        .filter(|n| n.kind() == SwitchSection)
        .collect();
    assert_eq!(sections.len(), 3);
    // Plain constants stay expressions under CaseSwitchLabel.
    assert!(find(&parse, CaseSwitchLabel).is_some());
    assert!(find(&parse, CasePatternSwitchLabel).is_some());
    assert!(find(&parse, DefaultSwitchLabel).is_some());
    assert!(find(&parse, WhenClause).is_some());
}

#[test]
fn case_label_pattern_to_expression_conversion() {
    // `case A.B:` is a constant expression, not a pattern.
    let parse = parse("switch (x) { case A.B: break; }");
    let label = find(&parse, CaseSwitchLabel).unwrap();
    assert_eq!(child_kinds(&label), [SimpleMemberAccessExpression]);
    assert!(find(&parse, ConstantPattern).is_none());
}

#[test]
fn discard_in_switch_statement_is_reported() {
    assert!(
        codes("switch (x) { case _: break; }")
            .contains(&ErrorCode::DiscardPatternInSwitchStatement)
    );
}

#[test]
fn duplicate_default_label_is_reported() {
    assert!(
        codes("switch (x) { default: break; default: break; }")
            .contains(&ErrorCode::DefaultLabelAlreadyPresent)
    );
}

#[test]
fn try_catch_finally() {
    assert_no_errors("try { } catch { }");
    assert_no_errors("try { } catch (E e) { }");
    assert_no_errors("try { } catch (E e) when (f(e)) { } finally { }");
    assert_no_errors("try { } finally { }");

    let parse = parse("try { } catch (E e) when (g) { } finally { }");
    let try_stmt = find(&parse, TryStatement).unwrap();
    assert_eq!(
        child_kinds(&try_stmt),
        [Block, CatchClause, FinallyClause]
    );
    assert!(find(&parse, CatchDeclaration).is_some());
    assert!(find(&parse, CatchFilterClause).is_some());
}

#[test]
fn try_without_handlers_is_reported() {
    assert!(codes("try { }").contains(&ErrorCode::ExpectedEndTry));
}

#[test]
fn jumps_and_labels() {
    assert_no_errors("loop: goto loop;");
    assert_no_errors("switch (x) { case 1: goto case 2; case 2: goto default; default: break; }");

    assert!(find(&parse("a: f();"), LabeledStatement).is_some());
    assert!(find(&parse("goto a;"), GotoStatement).is_some());
    let in_switch = parse("switch (x) { case 1: goto case 2; default: goto default; }");
    assert!(find(&in_switch, GotoCaseStatement).is_some());
    assert!(find(&in_switch, GotoDefaultStatement).is_some());
}

#[test]
fn using_statement_and_declaration() {
    assert_no_errors("using (var f = open()) { }");
    assert_no_errors("using (stream) { }");
    assert_no_errors("using var f = open();");

    assert!(find(&parse("using (x) { }"), UsingStatement).is_some());
    let decl = parse("using var f = open();");
    assert!(find(&decl, LocalDeclarationStatement).is_some());
    assert!(find(&decl, UsingStatement).is_none());
}

#[test]
fn local_functions() {
    let source = "int add(int a, int b) { return a + b; }";
    assert_no_errors(source);
    let parse1 = parse(source);
    let func = find(&parse1, LocalFunctionStatement).unwrap();
    assert!(func.children().any(|n| n.kind() == ParameterList));
    assert!(func.children().any(|n| n.kind() == Block));

    assert_no_errors("T id<T>(T x) where T : class => x;");
    assert!(
        find(&parse("T id<T>(T x) where T : class => x;"), LocalFunctionStatement).is_some()
    );
}

#[test]
fn deconstruction_declaration() {
    let source = "var (a, b) = pair;";
    assert_no_errors(source);
    let parse = parse(source);
    assert!(find(&parse, DeclarationExpression).is_some());
    assert!(find(&parse, ParenthesizedVariableDesignation).is_some());
    assert!(find(&parse, SimpleAssignmentExpression).is_some());
}

#[test]
fn empty_and_expression_statements() {
    assert_no_errors(";");
    assert_no_errors("f();");
    assert_no_errors("x++;");
    insta::assert_snapshot!(dump("f();"), @r#"
    CompilationUnit
      GlobalStatement
        ExpressionStatement
          InvocationExpression
            IdentifierName
              IdentifierToken "f"
            ArgumentList
              OpenParenToken "("
              CloseParenToken ")"
          SemicolonToken ";"
    "#);
}

#[test]
fn throw_and_return() {
    assert_no_errors("return;");
    assert_no_errors("return x + 1;");
    assert_no_errors("throw;");
    assert_no_errors("throw new E();");
}
