//! Stable error codes for lexical and syntactic diagnostics.

use serde::Serialize;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Closed enumeration of diagnostic codes.
///
/// Codes are stable identifiers: the display name is part of the tooling
/// contract, so variants are never renamed, only added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    // Lexical
    UnterminatedComment,
    UnterminatedString,
    IllegalEscape,
    UnexpectedCharacter,
    InvalidReal,
    InvalidNumber,
    IntOverflow,
    EmptyCharLiteral,
    TooManyCharsInCharLiteral,

    // Token-expected
    IdentifierExpected,
    IdentifierExpectedKeyword,
    SemicolonExpected,
    CloseParenExpected,
    CloseBracketExpected,
    LbraceExpected,
    RbraceExpected,
    ColonExpected,
    SyntaxError,

    // Parse
    ExpectedForeachKeyword,
    InExpected,
    BadForeachDecl,
    DiscardPatternInSwitchStatement,
    TupleTooFewElements,
    TopLevelStatementAfterNamespaceOrType,
    UsingAfterElements,
    ElementIsRequired,
    InvalidMemberDecl,
    MemberNeedsType,
    ExpectedEndTry,
    UnexpectedDoubleColon,
    ConstantExpected,
    TypeExpected,
    ValueExpected,
    NameExpected,
    InvalidExprTerm,
    UnexpectedToken,
    NamespaceUnexpected,
    AccessorExpected,
    GetOrSetExpected,
    NoVoidHere,
    OvlOperatorExpected,
    BadModifier,
    ConstraintExpected,
    CaseExpressionExpected,
    DefaultLabelAlreadyPresent,
}

impl ErrorCode {
    pub fn severity(self) -> Severity {
        match self {
            ErrorCode::BadModifier => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Message used when the reporting site does not supply its own.
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::UnterminatedComment => "end-of-file found, '*/' expected",
            ErrorCode::UnterminatedString => "newline in string literal",
            ErrorCode::IllegalEscape => "unrecognized escape sequence",
            ErrorCode::UnexpectedCharacter => "unexpected character",
            ErrorCode::InvalidReal => "invalid real literal",
            ErrorCode::InvalidNumber => "invalid number",
            ErrorCode::IntOverflow => "integral constant is too large",
            ErrorCode::EmptyCharLiteral => "empty character literal",
            ErrorCode::TooManyCharsInCharLiteral => "too many characters in character literal",
            ErrorCode::IdentifierExpected => "identifier expected",
            ErrorCode::IdentifierExpectedKeyword => {
                "identifier expected; keyword cannot be used as an identifier here"
            }
            ErrorCode::SemicolonExpected => "; expected",
            ErrorCode::CloseParenExpected => ") expected",
            ErrorCode::CloseBracketExpected => "] expected",
            ErrorCode::LbraceExpected => "{ expected",
            ErrorCode::RbraceExpected => "} expected",
            ErrorCode::ColonExpected => ": expected",
            ErrorCode::SyntaxError => "syntax error",
            ErrorCode::ExpectedForeachKeyword => {
                "'foreach' expected; 'for' cannot declare an 'in' iteration"
            }
            ErrorCode::InExpected => "'in' expected",
            ErrorCode::BadForeachDecl => "bad foreach declaration",
            ErrorCode::DiscardPatternInSwitchStatement => {
                "a discard pattern is not a valid switch statement label"
            }
            ErrorCode::TupleTooFewElements => "a tuple must contain at least two elements",
            ErrorCode::TopLevelStatementAfterNamespaceOrType => {
                "top-level statements must precede namespace and type declarations"
            }
            ErrorCode::UsingAfterElements => {
                "a using directive must precede all other declarations"
            }
            ErrorCode::ElementIsRequired => "an expression is expected for this element",
            ErrorCode::InvalidMemberDecl => "invalid member declaration",
            ErrorCode::MemberNeedsType => "member declaration requires a type",
            ErrorCode::ExpectedEndTry => "expected catch or finally",
            ErrorCode::UnexpectedDoubleColon => {
                "'::' may only follow an alias qualifier"
            }
            ErrorCode::ConstantExpected => "a constant value is expected",
            ErrorCode::TypeExpected => "type expected",
            ErrorCode::ValueExpected => "value expected",
            ErrorCode::NameExpected => "name expected",
            ErrorCode::InvalidExprTerm => "invalid expression term",
            ErrorCode::UnexpectedToken => "unexpected token",
            ErrorCode::NamespaceUnexpected => {
                "a namespace declaration is not valid here"
            }
            ErrorCode::AccessorExpected => "accessor declaration expected",
            ErrorCode::GetOrSetExpected => "'get', 'set', or 'init' accessor expected",
            ErrorCode::NoVoidHere => "'void' is not a valid type here",
            ErrorCode::OvlOperatorExpected => "overloadable operator expected",
            ErrorCode::BadModifier => "modifier is not valid for this item",
            ErrorCode::ConstraintExpected => "constraint expected",
            ErrorCode::CaseExpressionExpected => "a case label requires an expression or pattern",
            ErrorCode::DefaultLabelAlreadyPresent => {
                "the switch statement already contains a 'default' label"
            }
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
