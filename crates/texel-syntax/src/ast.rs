//! Typed views over the untyped syntax tree.
//!
//! [`Element::cast`] is the single place that maps a node kind to its typed
//! wrapper. The grammar is closed, so the match is exhaustive and a new
//! [`SyntaxKind`] will not compile until it is handled here.

use crate::token_set::INSTRUCTIONS;
use crate::{NodeOrToken, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == $kind).then(|| Self(node))
            }

            pub fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(
    /// The root of a parsed document.
    File,
    SyntaxKind::File
);
ast_node!(
    /// A control sequence with its adjacent arguments.
    Instruction,
    SyntaxKind::Instruction
);
ast_node!(Environment, SyntaxKind::Environment);
ast_node!(Group, SyntaxKind::Group);
ast_node!(
    /// A stray closer or a construct that was never closed.
    ErrorNode,
    SyntaxKind::Error
);

/// `\begin{..}` or `\end{..}` with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvMarker(SyntaxNode);

impl EnvMarker {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        matches!(node.kind(), SyntaxKind::EnvBegin | SyntaxKind::EnvEnd)
            .then(|| Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn is_begin(&self) -> bool {
        self.0.kind() == SyntaxKind::EnvBegin
    }

    pub fn keyword(&self) -> Option<SyntaxToken> {
        instruction_token(&self.0)
    }

    pub fn arguments(&self) -> impl Iterator<Item = SyntaxElement> {
        self.0.children_with_tokens().skip(1)
    }

    /// Text of the first brace argument, trimmed. Unclosed arguments count.
    pub fn name(&self) -> Option<String> {
        self.0
            .children()
            .map(unwrap_error)
            .filter_map(Group::cast)
            .find(|g| g.delimiter() == Some(Delimiter::Brace))
            .map(|g| g.inner_text().trim().to_string())
    }
}

/// Every node kind, typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    File(File),
    Instruction(Instruction),
    Environment(Environment),
    EnvMarker(EnvMarker),
    Group(Group),
    Error(ErrorNode),
}

impl Element {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let element = match node.kind() {
            SyntaxKind::File => Element::File(File(node)),
            SyntaxKind::Instruction => Element::Instruction(Instruction(node)),
            SyntaxKind::Environment => Element::Environment(Environment(node)),
            SyntaxKind::EnvBegin | SyntaxKind::EnvEnd => Element::EnvMarker(EnvMarker(node)),
            SyntaxKind::Group => Element::Group(Group(node)),
            SyntaxKind::Error => Element::Error(ErrorNode(node)),
            SyntaxKind::Whitespace
            | SyntaxKind::Comment
            | SyntaxKind::Identifier
            | SyntaxKind::IdentifierBegin
            | SyntaxKind::IdentifierEnd
            | SyntaxKind::Arg
            | SyntaxKind::LBrace
            | SyntaxKind::RBrace
            | SyntaxKind::LBracket
            | SyntaxKind::RBracket
            | SyntaxKind::LParen
            | SyntaxKind::RParen
            | SyntaxKind::BadCharacter
            | SyntaxKind::Eof => return None,
        };
        Some(element)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Element::File(it) => it.syntax(),
            Element::Instruction(it) => it.syntax(),
            Element::Environment(it) => it.syntax(),
            Element::EnvMarker(it) => it.syntax(),
            Element::Group(it) => it.syntax(),
            Element::Error(it) => it.syntax(),
        }
    }
}

impl File {
    pub fn environments(&self) -> impl Iterator<Item = Environment> {
        self.0.descendants().filter_map(Environment::cast)
    }

    pub fn instructions(&self) -> impl Iterator<Item = Instruction> {
        self.0.descendants().filter_map(Instruction::cast)
    }
}

impl Instruction {
    pub fn name(&self) -> Option<SyntaxToken> {
        instruction_token(&self.0)
    }

    pub fn arguments(&self) -> impl Iterator<Item = SyntaxElement> {
        self.0.children_with_tokens().skip(1)
    }
}

impl Environment {
    pub fn begin(&self) -> Option<EnvMarker> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::EnvBegin)
            .map(EnvMarker)
    }

    pub fn end(&self) -> Option<EnvMarker> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::EnvEnd)
            .map(EnvMarker)
    }

    pub fn name(&self) -> Option<String> {
        self.begin()?.name()
    }

    pub fn end_name(&self) -> Option<String> {
        self.end()?.name()
    }

    pub fn is_terminated(&self) -> bool {
        self.end().is_some()
    }

    /// Everything between the begin and end markers.
    pub fn body(&self) -> impl Iterator<Item = SyntaxElement> {
        self.0.children_with_tokens().filter(|e| {
            !matches!(e.kind(), SyntaxKind::EnvBegin | SyntaxKind::EnvEnd)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Brace,
    Bracket,
    Paren,
}

impl Group {
    pub fn delimiter(&self) -> Option<Delimiter> {
        match self.0.first_token()?.kind() {
            SyntaxKind::LBrace => Some(Delimiter::Brace),
            SyntaxKind::LBracket => Some(Delimiter::Bracket),
            SyntaxKind::LParen => Some(Delimiter::Paren),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        let mut children = self.0.children_with_tokens();
        let Some(first) = children.next() else {
            return false;
        };
        let Some(last) = children.last() else {
            return false;
        };
        first.kind().closer() == Some(last.kind())
    }

    /// Elements between the delimiters.
    pub fn content(&self) -> impl Iterator<Item = SyntaxElement> {
        let closed = self.is_closed();
        let mut elements: Vec<_> = self.0.children_with_tokens().skip(1).collect();
        if closed {
            elements.pop();
        }
        elements.into_iter()
    }

    pub fn inner_text(&self) -> String {
        self.content().map(|e| element_text(&e)).collect()
    }
}

impl ErrorNode {
    /// The unterminated construct this node wraps, if any.
    pub fn inner(&self) -> Option<Element> {
        self.0.first_child().and_then(Element::cast)
    }

    /// The stray token this node wraps, if any.
    pub fn stray_token(&self) -> Option<SyntaxToken> {
        self.0
            .first_child_or_token()
            .and_then(|e| e.into_token())
    }
}

fn instruction_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| INSTRUCTIONS.contains(t.kind()))
}

fn unwrap_error(node: SyntaxNode) -> SyntaxNode {
    if node.kind() == SyntaxKind::Error {
        if let Some(inner) = node.first_child() {
            return inner;
        }
    }
    node
}

fn element_text(element: &SyntaxElement) -> String {
    match element {
        NodeOrToken::Node(n) => n.text().to_string(),
        NodeOrToken::Token(t) => t.text().to_string(),
    }
}
