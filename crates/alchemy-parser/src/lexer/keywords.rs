//! Keyword recognition.
//!
//! A precomputed dispatch keyed on the identifier's length and first two
//! bytes, followed by a full comparison of the candidate spelling. Keywords
//! outside the 2..=11 length band short-circuit immediately.

use alchemy_syntax::SyntaxKind;
use alchemy_syntax::SyntaxKind::*;

const MIN_KEYWORD_LEN: usize = 2;
const MAX_KEYWORD_LEN: usize = 11;

#[inline]
fn kw(text: &str, spelling: &str, kind: SyntaxKind) -> Option<SyntaxKind> {
    (text == spelling).then_some(kind)
}

/// Maps an identifier spelling to its keyword kind (reserved or contextual),
/// or `None` if it is an ordinary identifier.
pub fn match_keyword(text: &str) -> Option<SyntaxKind> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    if !(MIN_KEYWORD_LEN..=MAX_KEYWORD_LEN).contains(&len) {
        return None;
    }

    match (len, bytes[0], bytes[1]) {
        (2, b'a', b's') => Some(AsKeyword),
        (2, b'd', b'o') => Some(DoKeyword),
        (2, b'i', b'f') => Some(IfKeyword),
        (2, b'i', b'n') => Some(InKeyword),
        (2, b'i', b's') => Some(IsKeyword),
        (2, b'o', b'r') => Some(OrKeyword),

        (3, b'a', b'n') => kw(text, "and", AndKeyword),
        (3, b'f', b'o') => kw(text, "for", ForKeyword),
        (3, b'g', b'e') => kw(text, "get", GetKeyword),
        (3, b'i', b'n') => kw(text, "int", IntKeyword),
        (3, b'n', b'e') => kw(text, "new", NewKeyword),
        (3, b'n', b'o') => kw(text, "not", NotKeyword),
        (3, b'o', b'u') => kw(text, "out", OutKeyword),
        (3, b'r', b'e') => kw(text, "ref", RefKeyword),
        (3, b's', b'e') => kw(text, "set", SetKeyword),
        (3, b't', b'r') => kw(text, "try", TryKeyword),
        (3, b'v', b'a') => kw(text, "var", VarKeyword),

        (4, b'b', b'a') => kw(text, "base", BaseKeyword),
        (4, b'b', b'o') => kw(text, "bool", BoolKeyword),
        (4, b'b', b'y') => kw(text, "byte", ByteKeyword),
        (4, b'c', b'a') => kw(text, "case", CaseKeyword),
        (4, b'c', b'h') => kw(text, "char", CharKeyword),
        (4, b'e', b'l') => kw(text, "else", ElseKeyword),
        (4, b'e', b'n') => kw(text, "enum", EnumKeyword),
        (4, b'f', b'r') => kw(text, "from", FromKeyword),
        (4, b'g', b'o') => kw(text, "goto", GotoKeyword),
        (4, b'i', b'n') => kw(text, "init", InitKeyword),
        (4, b'l', b'o') => kw(text, "long", LongKeyword).or_else(|| kw(text, "lock", LockKeyword)),
        (4, b'n', b'u') => kw(text, "null", NullKeyword),
        (4, b't', b'h') => kw(text, "this", ThisKeyword),
        (4, b't', b'r') => kw(text, "true", TrueKeyword),
        (4, b'u', b'i') => kw(text, "uint", UIntKeyword),
        (4, b'v', b'o') => kw(text, "void", VoidKeyword),
        (4, b'w', b'h') => kw(text, "when", WhenKeyword),
        (4, b'w', b'i') => kw(text, "with", WithKeyword),

        (5, b'a', b'l') => kw(text, "alias", AliasKeyword),
        (5, b'b', b'r') => kw(text, "break", BreakKeyword),
        (5, b'c', b'a') => kw(text, "catch", CatchKeyword),
        (5, b'c', b'l') => kw(text, "class", ClassKeyword),
        (5, b'c', b'o') => kw(text, "const", ConstKeyword),
        (5, b'f', b'a') => kw(text, "false", FalseKeyword),
        (5, b'f', b'i') => kw(text, "fixed", FixedKeyword),
        (5, b'f', b'l') => kw(text, "float", FloatKeyword),
        (5, b's', b'b') => kw(text, "sbyte", SByteKeyword),
        (5, b's', b'h') => kw(text, "short", ShortKeyword),
        (5, b't', b'h') => kw(text, "throw", ThrowKeyword),
        (5, b'u', b'l') => kw(text, "ulong", ULongKeyword),
        (5, b'u', b's') => kw(text, "using", UsingKeyword),
        (5, b'w', b'h') => {
            kw(text, "while", WhileKeyword).or_else(|| kw(text, "where", WhereKeyword))
        }

        (6, b'd', b'o') => kw(text, "double", DoubleKeyword),
        (6, b'e', b'x') => kw(text, "extern", ExternKeyword),
        (6, b'o', b'b') => kw(text, "object", ObjectKeyword),
        (6, b'p', b'a') => kw(text, "params", ParamsKeyword),
        (6, b'p', b'u') => kw(text, "public", PublicKeyword),
        (6, b'r', b'e') => kw(text, "return", ReturnKeyword),
        (6, b's', b'e') => kw(text, "sealed", SealedKeyword),
        (6, b's', b'i') => kw(text, "sizeof", SizeOfKeyword),
        (6, b's', b't') => kw(text, "string", StringKeyword)
            .or_else(|| kw(text, "static", StaticKeyword))
            .or_else(|| kw(text, "struct", StructKeyword)),
        (6, b's', b'w') => kw(text, "switch", SwitchKeyword),
        (6, b't', b'y') => kw(text, "typeof", TypeOfKeyword),
        (6, b'u', b's') => kw(text, "ushort", UShortKeyword),

        (7, b'd', b'e') => kw(text, "default", DefaultKeyword),
        (7, b'f', b'i') => kw(text, "finally", FinallyKeyword),
        (7, b'f', b'o') => kw(text, "foreach", ForEachKeyword),
        (7, b'p', b'a') => kw(text, "partial", PartialKeyword),
        (7, b'p', b'r') => kw(text, "private", PrivateKeyword),
        (7, b'v', b'i') => kw(text, "virtual", VirtualKeyword),

        (8, b'a', b'b') => kw(text, "abstract", AbstractKeyword),
        (8, b'c', b'o') => kw(text, "continue", ContinueKeyword),
        (8, b'd', b'e') => kw(text, "delegate", DelegateKeyword),
        (8, b'e', b'x') => kw(text, "explicit", ExplicitKeyword),
        (8, b'i', b'm') => kw(text, "implicit", ImplicitKeyword),
        (8, b'i', b'n') => kw(text, "internal", InternalKeyword),
        (8, b'o', b'p') => kw(text, "operator", OperatorKeyword),
        (8, b'o', b'v') => kw(text, "override", OverrideKeyword),
        (8, b'r', b'e') => {
            kw(text, "readonly", ReadOnlyKeyword).or_else(|| kw(text, "required", RequiredKeyword))
        }

        (9, b'i', b'n') => kw(text, "interface", InterfaceKeyword),
        (9, b'n', b'a') => kw(text, "namespace", NamespaceKeyword),
        (9, b'p', b'r') => kw(text, "protected", ProtectedKeyword),

        (10, b's', b't') => kw(text, "stackalloc", StackAllocKeyword),

        (11, b'c', b'o') => kw(text, "constructor", ConstructorKeyword),

        _ => None,
    }
}
