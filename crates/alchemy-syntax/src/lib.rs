//! Syntax kinds, token sets, and grammar facts for the Alchemy language.
//!
//! This crate is the pure, stateless layer shared between the lexer and the
//! parser: the [`SyntaxKind`] enumeration (token and node kinds in one
//! space), the [`rowan::Language`] implementation, fixed-width
//! [`TokenSet`]s, and the [`facts`] module of predicates and operator
//! mappings. It holds no mutable state and performs no allocation of its
//! own.

pub mod facts;
mod kind;
mod token_set;

pub use kind::{AlchemyLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
pub use token_set::TokenSet;

pub use facts::Precedence;
