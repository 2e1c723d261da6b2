//! Front end for the Alchemy language: a Unicode-aware lexer and a
//! recursive-descent, lookahead-capable parser producing a lossless
//! concrete syntax tree.
//!
//! # Example
//!
//! ```
//! use alchemy_parser::{parse_compilation_unit, ParseOptions};
//!
//! let parse = parse_compilation_unit(
//!     "namespace N { class C { int x; } }",
//!     ParseOptions::default(),
//! )
//! .expect("no resource limits configured");
//!
//! assert!(parse.diagnostics().is_empty());
//! assert_eq!(parse.syntax().text(), "namespace N { class C { int x; } }");
//! ```
//!
//! Malformed input never fails: the tree covers every byte of the source,
//! missing pieces are zero-width tokens, and problems surface as
//! [`diagnostics::Diagnostic`]s. The only `Err` cases are the optional
//! resource limits in [`ParseOptions`].

pub mod ast;
pub mod diagnostics;
mod lexer;
mod parser;

pub use alchemy_syntax::{facts, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, TokenSet};
pub use lexer::{tokenize, LitValue, Token, TokenFlags, TokenList};

use diagnostics::Diagnostics;

/// Errors from resource-limit enforcement. Syntax problems are never
/// errors; they are diagnostics on an otherwise complete tree.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Knobs for a single parse. The defaults impose no limits; the debug-build
/// progress assertions are always active.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Maximum number of tokens the parser may consume before aborting
    /// with [`Error::ExecFuelExhausted`].
    pub exec_fuel: Option<u32>,
    /// Maximum grammar recursion depth before aborting with
    /// [`Error::RecursionLimitExceeded`].
    pub recursion_limit: Option<u32>,
}

/// A parsed compilation unit: the syntax tree plus accumulated diagnostics.
#[derive(Debug)]
pub struct Parse {
    root: SyntaxNode,
    diagnostics: Diagnostics,
}

impl Parse {
    /// The root node. Its text reproduces the source byte-for-byte.
    pub fn syntax(&self) -> SyntaxNode {
        self.root.clone()
    }

    /// Typed view of the root.
    pub fn root(&self) -> ast::CompilationUnit {
        ast::CompilationUnit::cast(self.root.clone()).expect("root is always a compilation unit")
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn printer<'a>(&'a self, source: &'a str) -> diagnostics::DiagnosticsPrinter<'a> {
        self.diagnostics.printer(source)
    }

    /// True when at least one diagnostic lies within `node`'s span. Zero
    /// width diagnostics on a node's boundary count as contained.
    pub fn node_contains_diagnostics(&self, node: &SyntaxNode) -> bool {
        let range = node.text_range();
        self.diagnostics
            .iter()
            .any(|d| range.intersect(d.range).is_some())
    }

    /// True when every token under `node` is zero-width, which is exactly
    /// the case for nodes synthesized entirely out of missing tokens.
    pub fn node_is_missing(node: &SyntaxNode) -> bool {
        node.text_range().is_empty()
    }
}

/// Parses `source` into a compilation unit.
///
/// Always returns a tree for any input when no fuel limits are set; the
/// tree's text concatenation equals the input.
pub fn parse_compilation_unit(source: &str, options: ParseOptions) -> Result<Parse> {
    let (tokens, diagnostics) = lexer::tokenize(source);
    let TokenList { tokens, literals } = tokens;
    let (root, diagnostics) = parser::Parser::new(source, tokens, literals)
        .with_diagnostics(diagnostics)
        .with_exec_fuel(options.exec_fuel)
        .with_recursion_fuel(options.recursion_limit)
        .parse()?;
    Ok(Parse { root, diagnostics })
}
