use alchemy_syntax::SyntaxKind::*;

use super::{assert_no_errors, child_kinds, dump, find, parse};
use crate::diagnostics::ErrorCode;

#[test]
fn precedence_shapes_the_tree() {
    let source = "int x = 1 + 2 * 3;";
    assert_no_errors(source);
    insta::assert_snapshot!(dump(source), @r#"
    CompilationUnit
      GlobalStatement
        LocalDeclarationStatement
          VariableDeclaration
            PredefinedType
              IntKeyword "int"
            VariableDeclarator
              IdentifierToken "x"
              EqualsValueClause
                EqualsToken "="
                AddExpression
                  NumericLiteralExpression
                    NumericLiteralToken "1"
                  PlusToken "+"
                  MultiplyExpression
                    NumericLiteralExpression
                      NumericLiteralToken "2"
                    AsteriskToken "*"
                    NumericLiteralExpression
                      NumericLiteralToken "3"
          SemicolonToken ";"
    "#);
}

#[test]
fn left_associative_chains() {
    let parse = parse("int x = a - b - c;");
    let outer = find(&parse, SubtractExpression).unwrap();
    // ((a - b) - c): the first subtraction is nested in the second.
    assert_eq!(
        child_kinds(&outer),
        [SubtractExpression, IdentifierName]
    );
}

#[test]
fn right_associative_assignment() {
    let parse = parse("a = b = c;");
    let outer = find(&parse, SimpleAssignmentExpression).unwrap();
    assert_eq!(
        child_kinds(&outer),
        [IdentifierName, SimpleAssignmentExpression]
    );
}

#[test]
fn conditional_is_right_associative() {
    let parse = parse("x = a ? b : c ? d : e;");
    let outer = find(&parse, ConditionalExpression).unwrap();
    let nested: Vec<_> = child_kinds(&outer);
    assert_eq!(
        nested,
        [IdentifierName, IdentifierName, ConditionalExpression]
    );
}

#[test]
fn coalesce_and_coalesce_assign() {
    assert_no_errors("x = a ?? b;");
    assert_no_errors("a ??= b;");
    let parse = parse("x = a ?? b ?? c;");
    let outer = find(&parse, CoalesceExpression).unwrap();
    // Right-associative: a ?? (b ?? c).
    assert_eq!(child_kinds(&outer), [IdentifierName, CoalesceExpression]);
}

#[test]
fn shift_operators_fuse_adjacent_greater_thans() {
    let parse1 = parse("x = a >> 2;");
    assert!(find(&parse1, RightShiftExpression).is_some());

    let parse2 = parse("x = a >>> 2;");
    assert!(find(&parse2, UnsignedRightShiftExpression).is_some());

    let parse3 = parse("a >>= 1;");
    assert!(find(&parse3, RightShiftAssignmentExpression).is_some());

    let parse4 = parse("a >>>= 1;");
    assert!(find(&parse4, UnsignedRightShiftAssignmentExpression).is_some());

    let parse5 = parse("x = a >= b;");
    assert!(find(&parse5, GreaterThanOrEqualExpression).is_some());
}

#[test]
fn spaced_greater_thans_do_not_fuse() {
    // `a > > b` is not a shift; the second `>` dangles as an error operand.
    let parse = parse("x = a > > b;");
    assert!(find(&parse, RightShiftExpression).is_none());
    assert!(!parse.diagnostics().is_empty());
}

#[test]
fn nested_generics_parse_in_expressions() {
    let source = "var d = new Dictionary<int, List<string>>();";
    assert_no_errors(source);
    let parse = parse(source);
    assert!(find(&parse, ObjectCreationExpression).is_some());
    let generic = find(&parse, GenericName).unwrap();
    assert_eq!(generic.children().next().unwrap().kind(), TypeArgumentList);
}

#[test]
fn deeply_nested_generic_type_arguments() {
    let source = "A<B<C<D<E>>>> x = null;";
    assert_no_errors(source);
    let parse = parse(source);
    let gt_tokens = parse
        .syntax()
        .descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind() == GreaterThanToken)
        .count();
    assert_eq!(gt_tokens, 4, "four separate `>` tokens, never fused");
}

#[test]
fn less_than_stays_relational_outside_generics() {
    let parse1 = parse("x = a < b;");
    assert!(find(&parse1, LessThanExpression).is_some());
    assert!(find(&parse1, GenericName).is_none());

    // `f(a < b, c > d)`: two comparisons, not a generic invocation.
    let parse2 = parse("x = f(a < b, c > d);");
    assert!(find(&parse2, LessThanExpression).is_some());
    assert!(find(&parse2, GreaterThanExpression).is_some());
}

#[test]
fn generic_method_call_with_definite_signal() {
    // Predefined type argument before `>` is a definite type argument list.
    let source = "x = f<int>(y);";
    assert_no_errors(source);
    let parse = parse(source);
    assert!(find(&parse, GenericName).is_some());
    assert!(find(&parse, InvocationExpression).is_some());
}

#[test]
fn tuple_vs_parenthesized() {
    let parse1 = parse("var t = (a, b);");
    let tuple = find(&parse1, TupleExpression).unwrap();
    assert_eq!(
        child_kinds(&tuple),
        [Argument, Argument]
    );

    let parse2 = parse("var t = (a);");
    assert!(find(&parse2, TupleExpression).is_none());
    assert!(find(&parse2, ParenthesizedExpression).is_some());
}

#[test]
fn named_tuple_elements() {
    let source = "var t = (first: 1, second: 2);";
    assert_no_errors(source);
    let parse = parse(source);
    let tuple = find(&parse, TupleExpression).unwrap();
    let first = tuple.children().next().unwrap();
    assert_eq!(child_kinds(&first), [NameColon, NumericLiteralExpression]);
}

#[test]
fn cast_vs_parenthesized() {
    // Definite type: always a cast.
    let parse1 = parse("x = (int)y;");
    assert!(find(&parse1, CastExpression).is_some());

    // Ambiguous name followed by identifier: a cast.
    let parse2 = parse("x = (T)y;");
    assert!(find(&parse2, CastExpression).is_some());

    // Ambiguous name followed by `-`: a subtraction.
    let parse3 = parse("x = (a) - b;");
    assert!(find(&parse3, CastExpression).is_none());
    assert!(find(&parse3, SubtractExpression).is_some());
}

#[test]
fn lambdas() {
    assert_no_errors("f = x => x;");
    assert_no_errors("f = (x, y) => x;");
    assert_no_errors("f = (int x) => { return x; };");
    assert_no_errors("f = static (x) => x;");

    let parse1 = parse("f = x => x;");
    assert!(find(&parse1, SimpleLambdaExpression).is_some());

    let parse2 = parse("f = (x, y) => x;");
    assert!(find(&parse2, ParenthesizedLambdaExpression).is_some());
}

#[test]
fn anonymous_method() {
    let source = "f = delegate (int x) { return x; };";
    assert_no_errors(source);
    assert!(find(&parse(source), AnonymousMethodExpression).is_some());
}

#[test]
fn object_creation_forms() {
    assert_no_errors("var a = new C();");
    assert_no_errors("var b = new C(1, 2) { X = 3 };");
    assert_no_errors("var c = new C { X = 1, Y = 2 };");
    assert_no_errors("var d = new();");
    assert_no_errors("var e = new { Name = 1, Other };");
    assert_no_errors("var f = new int[3];");
    assert_no_errors("var g = new int[] { 1, 2, 3 };");
    assert_no_errors("var h = new[] { 1, 2 };");

    assert!(find(&parse("var x = new C();"), ObjectCreationExpression).is_some());
    assert!(find(&parse("var x = new();"), ImplicitObjectCreationExpression).is_some());
    assert!(find(&parse("var x = new int[3];"), ArrayCreationExpression).is_some());
    assert!(find(&parse("var x = new[] { 1 };"), ImplicitArrayCreationExpression).is_some());
    assert!(find(&parse("var x = new { A = 1 };"), AnonymousObjectCreationExpression).is_some());
}

#[test]
fn collection_initializer_flavors() {
    let parse1 = parse("var x = new C { 1, 2 };");
    assert!(find(&parse1, CollectionInitializerExpression).is_some());

    let parse2 = parse("var x = new C { { 1, 2 }, { 3, 4 } };");
    assert!(find(&parse2, ComplexElementInitializerExpression).is_some());

    let parse3 = parse("var x = new C { A = 1 };");
    assert!(find(&parse3, ObjectInitializerExpression).is_some());
}

#[test]
fn collection_expressions_and_spread() {
    let source = "int[] x = [1, 2, .. rest];";
    assert_no_errors(source);
    let parse = parse(source);
    let collection = find(&parse, CollectionExpression).unwrap();
    assert_eq!(
        child_kinds(&collection),
        [ExpressionElement, ExpressionElement, SpreadElement]
    );
}

#[test]
fn stackalloc_forms() {
    assert_no_errors("var x = stackalloc int[8];");
    assert_no_errors("var y = stackalloc [] { 1, 2 };");
    assert!(
        find(&parse("var x = stackalloc int[8];"), StackAllocArrayCreationExpression).is_some()
    );
    assert!(
        find(
            &parse("var y = stackalloc [] { 1 };"),
            ImplicitStackAllocArrayCreationExpression
        )
        .is_some()
    );
}

#[test]
fn conditional_access_chains() {
    let source = "x = a?.b?[1];";
    assert_no_errors(source);
    let parse = parse(source);
    assert!(find(&parse, ConditionalAccessExpression).is_some());
    assert!(find(&parse, MemberBindingExpression).is_some());
    assert!(find(&parse, ElementBindingExpression).is_some());
}

#[test]
fn null_forgiving_postfix() {
    let parse = parse("x = a!.b;");
    assert!(find(&parse, BangExpression).is_some());
}

#[test]
fn pointer_member_access_and_address_of() {
    assert_no_errors("x = p->y;");
    assert_no_errors("x = &y;");
    assert_no_errors("x = *p;");
    assert!(find(&parse("x = p->y;"), PointerMemberAccessExpression).is_some());
    assert!(find(&parse("x = &y;"), AddressOfExpression).is_some());
    assert!(find(&parse("x = *p;"), PointerIndirectionExpression).is_some());
}

#[test]
fn unary_and_postfix_increments() {
    assert_no_errors("x = ++a;");
    assert_no_errors("x = a++;");
    assert!(find(&parse("x = ++a;"), PreIncrementExpression).is_some());
    assert!(find(&parse("x = a++;"), PostIncrementExpression).is_some());
    assert!(find(&parse("x = ^a;"), IndexExpression).is_some());
}

#[test]
fn range_expressions() {
    assert_no_errors("x = a..b;");
    assert_no_errors("x = ..b;");
    assert_no_errors("x = a..;");
    let parse = parse("x = a..b;");
    assert!(find(&parse, RangeExpression).is_some());
}

#[test]
fn typeof_sizeof_default() {
    assert_no_errors("x = typeof(int);");
    assert_no_errors("x = sizeof(long);");
    assert_no_errors("x = default(C);");
    assert_no_errors("x = default;");
    assert!(find(&parse("x = default;"), DefaultLiteralExpression).is_some());
    assert!(find(&parse("x = default(C);"), DefaultExpression).is_some());
}

#[test]
fn throw_expression() {
    let source = "x = y ?? throw new E();";
    assert_no_errors(source);
    assert!(find(&parse(source), ThrowExpression).is_some());
}

#[test]
fn switch_expression() {
    let source = "x = y switch { 1 => a, > 2 when b => c, _ => d };";
    assert_no_errors(source);
    let parse = parse(source);
    let switch = find(&parse, SwitchExpression).unwrap();
    let arms = switch
        .children()
        .filter(|n| n.kind() == SwitchExpressionArm)
        .count();
    assert_eq!(arms, 3);
    assert!(find(&parse, RelationalPattern).is_some());
    assert!(find(&parse, WhenClause).is_some());
    assert!(find(&parse, DiscardPattern).is_some());
}

#[test]
fn with_expression() {
    let source = "x = y with { A = 1 };";
    assert_no_errors(source);
    let parse = parse(source);
    assert!(find(&parse, WithExpression).is_some());
    assert!(find(&parse, WithInitializerExpression).is_some());
}

#[test]
fn interpolated_strings() {
    let source = r#"var s = "a${1 + b}c";"#;
    assert_no_errors(source);
    let parse1 = parse(source);
    let interp = find(&parse1, InterpolatedStringExpression).unwrap();
    assert_eq!(child_kinds(&interp), [Interpolation]);
    assert!(find(&parse1, AddExpression).is_some());

    let simple = parse(r#"var s = "plain";"#);
    assert!(find(&simple, StringLiteralExpression).is_some());
    assert!(find(&simple, InterpolatedStringExpression).is_none());

    let ident = parse(r#"var s = "x = $value";"#);
    assert!(find(&ident, InterpolatedStringExpression).is_some());
}

#[test]
fn out_var_argument() {
    let source = "f(out var x);";
    assert_no_errors(source);
    let parse = parse(source);
    let arg = find(&parse, Argument).unwrap();
    assert!(
        arg.children()
            .any(|n| n.kind() == DeclarationExpression)
    );
}

#[test]
fn named_arguments_and_ref_kinds() {
    assert_no_errors("f(name: 1, ref x, in y, out z);");
    let parse = parse("f(name: 1);");
    let arg = find(&parse, Argument).unwrap();
    assert_eq!(child_kinds(&arg), [NameColon, NumericLiteralExpression]);
}

#[test]
fn invalid_expression_term_recovers() {
    let parse = parse("x = );");
    assert!(
        parse
            .diagnostics()
            .iter()
            .any(|d| d.code == ErrorCode::InvalidExprTerm)
    );
}

#[test]
fn ref_expressions() {
    assert_no_errors("ref int r = ref x;");
    let parse = parse("ref int r = ref x;");
    assert!(find(&parse, RefType).is_some());
    assert!(find(&parse, RefExpression).is_some());
}
