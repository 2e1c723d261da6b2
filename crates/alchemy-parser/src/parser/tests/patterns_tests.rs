use alchemy_syntax::SyntaxKind::*;

use super::{assert_no_errors, child_kinds, dump, find, parse};

#[test]
fn is_type_vs_is_pattern() {
    // A plain type test stays an IsExpression.
    let parse1 = parse("b = x is C;");
    assert!(find(&parse1, IsExpression).is_some());
    assert!(find(&parse1, IsPatternExpression).is_none());

    // A designation makes it a declaration pattern.
    let parse2 = parse("b = x is C c;");
    assert!(find(&parse2, IsPatternExpression).is_some());
    assert!(find(&parse2, DeclarationPattern).is_some());
}

#[test]
fn property_pattern_with_designation() {
    let source = "b = x is { A: 1 } y;";
    assert_no_errors(source);
    insta::assert_snapshot!(dump(source), @r#"
    CompilationUnit
      GlobalStatement
        ExpressionStatement
          SimpleAssignmentExpression
            IdentifierName
              IdentifierToken "b"
            EqualsToken "="
            IsPatternExpression
              IdentifierName
                IdentifierToken "x"
              IsKeyword "is"
              RecursivePattern
                PropertyPatternClause
                  OpenBraceToken "{"
                  Subpattern
                    NameColon
                      IdentifierToken "A"
                      ColonToken ":"
                    ConstantPattern
                      NumericLiteralExpression
                        NumericLiteralToken "1"
                  CloseBraceToken "}"
                SingleVariableDesignation
                  IdentifierToken "y"
          SemicolonToken ";"
    "#);
}

#[test]
fn constant_and_relational_patterns() {
    assert_no_errors("b = x is 1;");
    assert_no_errors("b = x is > 5;");
    assert_no_errors("b = x is >= 5;");

    let parse = parse("b = x is > 5;");
    assert!(find(&parse, RelationalPattern).is_some());
}

#[test]
fn combinator_patterns() {
    let source = "b = x is 1 or 2 and not 3;";
    assert_no_errors(source);
    let parse = parse(source);
    assert!(find(&parse, OrPattern).is_some());
    assert!(find(&parse, AndPattern).is_some());
    assert!(find(&parse, NotPattern).is_some());
    // Operands of combinators are wrapped constant patterns.
    assert!(find(&parse, ConstantPattern).is_some());
}

#[test]
fn var_and_discard_patterns() {
    assert_no_errors("b = x is var v;");
    assert_no_errors("b = x is _;");
    assert!(find(&parse("b = x is var v;"), VarPattern).is_some());
    assert!(find(&parse("b = x is _;"), DiscardPattern).is_some());
}

#[test]
fn positional_patterns() {
    let source = "b = x is (1, 2) t;";
    assert_no_errors(source);
    let parse1 = parse(source);
    let recursive = find(&parse1, RecursivePattern).unwrap();
    assert!(
        recursive
            .children()
            .any(|n| n.kind() == PositionalPatternClause)
    );

    // With a type in front.
    let parse2 = parse("b = x is Point(1, 2);");
    let recursive = find(&parse2, RecursivePattern).unwrap();
    assert_eq!(
        child_kinds(&recursive),
        [IdentifierName, PositionalPatternClause]
    );
}

#[test]
fn parenthesized_pattern() {
    let parse = parse("b = x is (not null);");
    assert!(find(&parse, ParenthesizedPattern).is_some());
}

#[test]
fn list_and_slice_patterns() {
    let source = "b = x is [1, .., var last];";
    assert_no_errors(source);
    let parse = parse(source);
    let list = find(&parse, ListPattern).unwrap();
    assert!(list.children().any(|n| n.kind() == SlicePattern));
    assert!(find(&parse, VarPattern).is_some());
}

#[test]
fn nested_recursive_pattern() {
    let source = "b = x is { Inner: { Value: > 3 } };";
    assert_no_errors(source);
    let parse = parse(source);
    let outer = find(&parse, PropertyPatternClause).unwrap();
    assert!(
        outer
            .descendants()
            .filter(|n| n.kind() == PropertyPatternClause)
            .count()
            == 2
    );
}

#[test]
fn type_pattern_in_is() {
    // `is int` has a strong type signal and no designation.
    let parse1 = parse("b = x is int;");
    assert!(find(&parse1, IsExpression).is_some());

    // In a case label the same shape becomes a type pattern.
    let parse2 = parse("switch (x) { case int: break; }");
    assert!(find(&parse2, TypePattern).is_some());
}

#[test]
fn pattern_with_and_keyword_does_not_bind_designation() {
    // `and` stays a combinator, not a designation identifier.
    let source = "b = x is C and not null;";
    assert_no_errors(source);
    let parse = parse(source);
    assert!(find(&parse, AndPattern).is_some());
    assert!(find(&parse, SingleVariableDesignation).is_none());
}
