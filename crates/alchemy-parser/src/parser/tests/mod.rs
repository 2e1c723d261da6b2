//! Parser test support: parse helpers, a trivia-free CST dump matching the
//! shapes asserted in snapshots, and round-trip checks run on every input.

mod exprs_tests;
mod items_tests;
mod patterns_tests;
mod stmts_tests;

use alchemy_syntax::{SyntaxKind, SyntaxNode};
use rowan::NodeOrToken;

use crate::diagnostics::ErrorCode;
use crate::{parse_compilation_unit, Parse, ParseOptions};

pub(crate) fn parse(source: &str) -> Parse {
    let parse = parse_compilation_unit(source, ParseOptions::default())
        .expect("no fuel limits configured");
    assert_eq!(
        parse.syntax().text(),
        source,
        "tree text must reproduce the source byte-for-byte"
    );
    parse
}

/// Tree dump without trivia and without the EOF marker.
pub(crate) fn dump(source: &str) -> String {
    let parse = parse(source);
    let mut out = String::new();
    format_node(&parse.syntax(), 0, false, &mut out);
    out
}

/// Tree dump including trivia tokens.
pub(crate) fn dump_full(source: &str) -> String {
    let parse = parse(source);
    let mut out = String::new();
    format_node(&parse.syntax(), 0, true, &mut out);
    out
}

fn format_node(node: &SyntaxNode, indent: usize, trivia: bool, out: &mut String) {
    out.push_str(&"  ".repeat(indent));
    out.push_str(&format!("{:?}\n", node.kind()));
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => format_node(&n, indent + 1, trivia, out),
            NodeOrToken::Token(t) => {
                if t.kind() == SyntaxKind::Eof && !trivia {
                    continue;
                }
                if trivia || !t.kind().is_trivia() {
                    out.push_str(&"  ".repeat(indent + 1));
                    out.push_str(&format!("{:?} {:?}\n", t.kind(), t.text()));
                }
            }
        }
    }
}

/// Error codes of all diagnostics, in emission order.
pub(crate) fn codes(source: &str) -> Vec<ErrorCode> {
    parse(source).diagnostics().iter().map(|d| d.code).collect()
}

pub(crate) fn assert_no_errors(source: &str) {
    let parse = parse(source);
    assert!(
        parse.diagnostics().is_empty(),
        "expected clean parse, got:\n{}",
        parse.printer(source).render()
    );
}

/// The first descendant node of the given kind.
pub(crate) fn find(parse: &Parse, kind: SyntaxKind) -> Option<SyntaxNode> {
    parse.syntax().descendants().find(|n| n.kind() == kind)
}

/// Kinds of the node's direct child nodes.
pub(crate) fn child_kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
    node.children().map(|n| n.kind()).collect()
}
