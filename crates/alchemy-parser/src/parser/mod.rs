//! Parser infrastructure.
//!
//! # Architecture
//!
//! The parser is a hand-written recursive-descent machine over the lexed
//! token vector, producing a lossless concrete syntax tree through rowan's
//! green tree builder:
//!
//! - Zero-copy: tokens carry spans; text is sliced only when committed to
//!   the tree.
//! - Trivia buffering: whitespace/comments are collected while peeking and
//!   flushed as leading trivia of the next committed token; same-line
//!   trivia after a token is attached eagerly as its trailing trivia.
//! - Checkpoint wrapping: infix operators, casts, and patterns wrap
//!   already-parsed content retroactively.
//! - Speculation: `scan_*` functions advance only the cursor and are undone
//!   with a `ResetPoint` (cursor, buffered trivia, diagnostic count).
//! - Terminator states: a bitset of predicates describing which tokens end
//!   the enclosing construct, consulted during panic-mode recovery.
//!
//! # Recovery
//!
//! The parser always produces a tree. Expected-but-absent tokens become
//! zero-width missing tokens with targeted diagnostics; unparseable runs
//! are consumed into `SkippedTokens` nodes; terminator states decide when a
//! list bails out to its enclosing construct.

mod core;
mod grammar;
mod invariants;
mod terminator;

#[cfg(test)]
mod tests;

pub(crate) use core::Parser;
