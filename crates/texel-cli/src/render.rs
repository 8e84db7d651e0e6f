//! Serializable views of tokens, trees and errors for the CLI output.

use line_index::LineIndex;
use serde::Serialize;
use std::fmt;
use texel_syntax::{NodeOrToken, SyntaxError, SyntaxKind, SyntaxNode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenView {
    pub kind: SyntaxKind,
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl fmt::Display for TokenView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}..{} {:?}", self.kind, self.start, self.end, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub kind: SyntaxKind,
    pub start: u32,
    pub end: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticView {
    pub message: String,
    pub start: u32,
    pub end: u32,
    /// 1-based
    pub line: u32,
    /// 1-based, in bytes
    pub column: u32,
}

impl fmt::Display for DiagnosticView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

pub fn tokens(source: &str) -> Vec<TokenView> {
    texel_syntax::Lexer::new(source)
        .map(|t| TokenView {
            kind: t.kind,
            start: t.range.start().into(),
            end: t.range.end().into(),
            text: t.text.to_string(),
        })
        .collect()
}

pub fn tree(node: &SyntaxNode) -> NodeView {
    let children = node
        .children_with_tokens()
        .map(|element| match element {
            NodeOrToken::Node(n) => tree(&n),
            NodeOrToken::Token(t) => NodeView {
                kind: t.kind(),
                start: t.text_range().start().into(),
                end: t.text_range().end().into(),
                text: Some(t.text().to_string()),
                children: Vec::new(),
            },
        })
        .collect();
    NodeView {
        kind: node.kind(),
        start: node.text_range().start().into(),
        end: node.text_range().end().into(),
        text: None,
        children,
    }
}

pub fn diagnostics(source: &str, errors: &[SyntaxError]) -> Vec<DiagnosticView> {
    let index = LineIndex::new(source);
    errors
        .iter()
        .map(|error| {
            let pos = index.line_col(error.range.start());
            DiagnosticView {
                message: error.message(),
                start: error.range.start().into(),
                end: error.range.end().into(),
                line: pos.line + 1,
                column: pos.col + 1,
            }
        })
        .collect()
}
