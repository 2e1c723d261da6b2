use alchemy_syntax::SyntaxKind::{self, *};

use super::{tokenize, LitValue, TokenFlags, TokenList};
use crate::diagnostics::{Diagnostics, ErrorCode};

fn lex(source: &str) -> (TokenList, Diagnostics) {
    tokenize(source)
}

/// Kinds of all non-trivia tokens, excluding the trailing Eof.
fn kinds(source: &str) -> Vec<SyntaxKind> {
    let (tokens, _) = lex(source);
    tokens
        .iter()
        .filter(|t| !t.is_trivia() && t.kind != Eof)
        .map(|t| t.kind)
        .collect()
}

/// Every byte of the source is covered by exactly one token, in order.
fn assert_round_trip(source: &str) {
    let (tokens, _) = lex(source);
    let mut pos = 0u32;
    for token in tokens.iter() {
        assert_eq!(u32::from(token.span.start()), pos, "gap before {token:?}");
        pos = token.span.end().into();
    }
    assert_eq!(pos as usize, source.len(), "tokens must cover the source");
}

#[test]
fn empty_input_has_eof() {
    let (tokens, diagnostics) = lex("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens.get(0).unwrap().kind, Eof);
    assert_eq!(tokens.get(0).unwrap().width(), 0.into());
    assert!(diagnostics.is_empty());
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("class C int foo"),
        [ClassKeyword, IdentifierToken, IntKeyword, IdentifierToken]
    );
}

#[test]
fn contextual_keywords_stay_identifiers() {
    let (tokens, _) = lex("where x");
    let token = tokens.get(0).unwrap();
    assert_eq!(token.kind, IdentifierToken);
    assert_eq!(token.contextual_kind, Some(WhereKeyword));
}

#[test]
fn underscore_is_contextual() {
    let (tokens, _) = lex("_");
    let token = tokens.get(0).unwrap();
    assert_eq!(token.kind, IdentifierToken);
    assert_eq!(token.contextual_kind, Some(UnderscoreToken));
    // But a named identifier starting with `_` is ordinary.
    let (tokens, _) = lex("_x");
    assert_eq!(tokens.get(0).unwrap().contextual_kind, None);
}

#[test]
fn unicode_identifier() {
    let (tokens, diagnostics) = lex("äpple = 1;");
    assert_eq!(tokens.get(0).unwrap().kind, IdentifierToken);
    assert!(diagnostics.is_empty());
    assert_round_trip("äpple = 1;");
}

#[test]
fn compound_operators() {
    assert_eq!(
        kinds("a ??= b << c ?? d"),
        [
            IdentifierToken,
            QuestionQuestionEqualsToken,
            IdentifierToken,
            LessThanLessThanToken,
            IdentifierToken,
            QuestionQuestionToken,
            IdentifierToken
        ]
    );
    assert_eq!(kinds(".. ... ."), [DotDotToken, DotDotDotToken, DotToken]);
    assert_eq!(kinds("-> -- -="), [MinusGreaterThanToken, MinusMinusToken, MinusEqualsToken]);
}

#[test]
fn greater_than_never_fuses() {
    // `List<Dict<K,V>>` must produce two separate `>` tokens.
    let k = kinds("A<B<C>>");
    assert_eq!(
        k,
        [
            IdentifierToken,
            LessThanToken,
            IdentifierToken,
            LessThanToken,
            IdentifierToken,
            GreaterThanToken,
            GreaterThanToken
        ]
    );
    assert_eq!(kinds(">>="), [GreaterThanToken, GreaterThanToken, EqualsToken]);
    assert_eq!(kinds(">="), [GreaterThanToken, EqualsToken]);
}

#[test]
fn deeply_nested_generic_keeps_four_tokens() {
    let k = kinds("A<B<C<D<E>>>>");
    let closers: Vec<_> = k.iter().filter(|k| **k == GreaterThanToken).collect();
    assert_eq!(closers.len(), 4);
}

#[test]
fn numeric_literal_values() {
    let (tokens, diagnostics) = lex("0xFFFFFFFF");
    assert_eq!(tokens.get(0).unwrap().kind, NumericLiteralToken);
    assert_eq!(tokens.literal(0), Some(&LitValue::U32(0xFFFF_FFFF)));
    assert!(diagnostics.is_empty());

    let (tokens, diagnostics) = lex("18446744073709551616");
    assert_eq!(tokens.literal(0), Some(&LitValue::I32(0)));
    assert_eq!(diagnostics.as_slice()[0].code, ErrorCode::IntOverflow);
}

#[test]
fn bool_literals_have_values() {
    let (tokens, _) = lex("true false");
    assert_eq!(tokens.get(0).unwrap().kind, TrueKeyword);
    assert_eq!(tokens.literal(0), Some(&LitValue::Bool(true)));
    let false_id = tokens
        .iter()
        .position(|t| t.kind == FalseKeyword)
        .unwrap() as u32;
    assert_eq!(tokens.literal(false_id), Some(&LitValue::Bool(false)));
}

#[test]
fn simple_string() {
    let (tokens, diagnostics) = lex(r#""hello""#);
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        [StringLiteralStart, StringLiteralChunk, StringLiteralEnd, Eof]
    );
    assert_eq!(
        tokens.literal(1),
        Some(&LitValue::String("hello".to_string()))
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn string_escapes_decode() {
    let (tokens, diagnostics) = lex(r#""a\tbA\U0001F600""#);
    assert_eq!(
        tokens.literal(1),
        Some(&LitValue::String("a\tbA😀".to_string()))
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn surrogate_pair_escapes_combine() {
    let (tokens, _) = lex("\"\\uD83D\\uDE00\"");
    assert_eq!(tokens.literal(1), Some(&LitValue::String("\u{1F600}".to_string())));
    // A raw astral character decodes as itself.
    let (tokens, _) = lex("\"\u{1F600}\"");
    assert_eq!(tokens.literal(1), Some(&LitValue::String("\u{1F600}".to_string())));
}

#[test]
fn illegal_escape_keeps_raw_text() {
    let (tokens, diagnostics) = lex(r#""a\qb""#);
    assert_eq!(diagnostics.as_slice()[0].code, ErrorCode::IllegalEscape);
    assert_eq!(
        tokens.literal(1),
        Some(&LitValue::String("a\\qb".to_string()))
    );
}

#[test]
fn unterminated_string_stops_at_newline() {
    let source = "\"abc\nx";
    let (tokens, diagnostics) = lex(source);
    assert_eq!(diagnostics.as_slice()[0].code, ErrorCode::UnterminatedString);
    let k: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        k,
        [
            StringLiteralStart,
            StringLiteralChunk,
            StringLiteralEnd, // zero width
            Newline,
            IdentifierToken,
            Eof
        ]
    );
    assert_eq!(tokens.get(2).unwrap().width(), 0.into());
    assert!(tokens.get(2).unwrap().flags.contains(TokenFlags::MISSING));
    assert_round_trip(source);
}

#[test]
fn identifier_interpolation() {
    let (tokens, _) = lex(r#""x = $value!""#);
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        [
            StringLiteralStart,
            StringLiteralChunk,
            DollarToken,
            IdentifierToken,
            StringLiteralChunk,
            StringLiteralEnd,
            Eof
        ]
    );
}

#[test]
fn expression_interpolation_reenters_normal_lexing() {
    let source = r#""a${1 + b}c""#;
    let (tokens, diagnostics) = lex(source);
    assert!(diagnostics.is_empty());
    let k: Vec<_> = tokens
        .iter()
        .filter(|t| !t.is_trivia())
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        k,
        [
            StringLiteralStart,
            StringLiteralChunk,
            InterpolationStart,
            NumericLiteralToken,
            PlusToken,
            IdentifierToken,
            InterpolationEnd,
            StringLiteralChunk,
            StringLiteralEnd,
            Eof
        ]
    );
    assert_round_trip(source);
}

#[test]
fn nested_braces_inside_interpolation() {
    let source = r#""${ f(new C { }) }""#;
    let (tokens, _) = lex(source);
    let k: Vec<_> = tokens
        .iter()
        .filter(|t| !t.is_trivia())
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        k,
        [
            StringLiteralStart,
            InterpolationStart,
            IdentifierToken,
            OpenParenToken,
            NewKeyword,
            IdentifierToken,
            OpenBraceToken,
            CloseBraceToken,
            CloseParenToken,
            InterpolationEnd,
            StringLiteralEnd,
            Eof
        ]
    );
    assert_round_trip(source);
}

#[test]
fn nested_string_inside_interpolation() {
    let source = r#""${f("inner")}""#;
    let (tokens, diagnostics) = lex(source);
    assert!(diagnostics.is_empty());
    let string_starts = tokens
        .iter()
        .filter(|t| t.kind == StringLiteralStart)
        .count();
    assert_eq!(string_starts, 2);
    assert_round_trip(source);
}

#[test]
fn eof_inside_interpolation_is_unterminated() {
    let (_, diagnostics) = lex(r#""${1 + 2"#);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.code == ErrorCode::UnterminatedString)
    );
}

#[test]
fn lone_dollar_is_chunk_content() {
    let (tokens, diagnostics) = lex(r#""a$ b""#);
    assert!(diagnostics.is_empty());
    assert_eq!(
        tokens.literal(1),
        Some(&LitValue::String("a$ b".to_string()))
    );
}

#[test]
fn comment_trivia() {
    let source = "x // line\ny /* block */ z";
    let (tokens, diagnostics) = lex(source);
    assert!(diagnostics.is_empty());
    let k: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        k,
        [
            IdentifierToken,
            Whitespace,
            SingleLineComment,
            Newline,
            IdentifierToken,
            Whitespace,
            MultiLineComment,
            Whitespace,
            IdentifierToken,
            Eof
        ]
    );
    assert_round_trip(source);
}

#[test]
fn lone_open_comment_spans_to_eof() {
    let (tokens, diagnostics) = lex("/*");
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        [MultiLineComment, Eof]
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.as_slice()[0].code, ErrorCode::UnterminatedComment);
}

#[test]
fn crlf_is_one_newline() {
    let (tokens, _) = lex("a\r\nb");
    let k: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(k, [IdentifierToken, Newline, IdentifierToken, Eof]);
    assert_eq!(tokens.get(1).unwrap().width(), 2.into());
}

#[test]
fn unicode_line_separators() {
    let (tokens, _) = lex("a\u{2028}b");
    let k: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(k, [IdentifierToken, Newline, IdentifierToken, Eof]);
}

#[test]
fn bom_becomes_leading_whitespace() {
    let source = "\u{FEFF}class";
    let (tokens, diagnostics) = lex(source);
    assert!(diagnostics.is_empty());
    let k: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(k, [Whitespace, ClassKeyword, Eof]);
    assert_round_trip(source);
}

#[test]
fn bad_character() {
    let (tokens, diagnostics) = lex("a @ b");
    assert_eq!(diagnostics.as_slice()[0].code, ErrorCode::UnexpectedCharacter);
    assert!(tokens.iter().any(|t| t.kind == BadToken));
    assert_round_trip("a @ b");
}

#[test]
fn trivia_attachment_flags() {
    let (tokens, _) = lex("a b");
    let a = tokens.get(0).unwrap();
    assert!(!a.flags.contains(TokenFlags::LEADING_TRIVIA));
    assert!(a.flags.contains(TokenFlags::TRAILING_TRIVIA));
    let b = tokens.get(2).unwrap();
    assert!(b.flags.contains(TokenFlags::LEADING_TRIVIA));
}

#[test]
fn trailing_trivia_stops_at_newline() {
    // `a` owns the comment on its line; the newline and indentation lead `b`.
    let (tokens, _) = lex("a // c\n  b");
    let a_trailing = tokens.trailing_trivia(0);
    let trailing: Vec<_> = (a_trailing.start..a_trailing.end)
        .map(|i| tokens.get(i).unwrap().kind)
        .collect();
    assert_eq!(trailing, [Whitespace, SingleLineComment]);

    let b_id = tokens
        .iter()
        .position(|t| t.kind == IdentifierToken && t.span.start() > 0.into())
        .unwrap() as u32;
    let leading = tokens.leading_trivia(b_id);
    let lead: Vec<_> = (leading.start..leading.end)
        .map(|i| tokens.get(i).unwrap().kind)
        .collect();
    assert_eq!(lead, [Newline, Whitespace]);
}

#[test]
fn adjacency_predicate() {
    // No trivia between `>` and `>`: spans touch.
    let (tokens, _) = lex(">> > >");
    let t0 = tokens.get(0).unwrap();
    let t1 = tokens.get(1).unwrap();
    assert_eq!(t0.span.end(), t1.span.start());
    let t2 = tokens.get(3).unwrap(); // after whitespace
    assert_ne!(t1.span.end(), t2.span.start());
}

#[test]
fn round_trip_torture() {
    for source in [
        "namespace N { class C { int x = 1; } }",
        "var s = \"a${(x, y) => x}b\";",
        "x >>= 1; y >>>= 2;",
        "/* unterminated",
        "\"unterminated",
        "int[,] grid;",
        "a?.b?[1]!\n",
        "'c' '' 'ab'",
        "#!%^",
    ] {
        assert_round_trip(source);
    }
}
