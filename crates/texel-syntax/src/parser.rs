use crate::{lexer::Lexer, SyntaxKind, SyntaxNode};
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};
use std::iter::Peekable;
use thiserror::Error;

/// Maximum number of groups and environments open at once.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("Expected '{expected}'")]
    UnterminatedGroup { expected: char },
    #[error("Unclosed environment, expected \\end")]
    UnterminatedEnvironment,
    #[error("Expected '{{' with an environment name")]
    MissingEnvironmentName,
    #[error("Unmatched '{found}'")]
    UnmatchedCloser { found: char },
    #[error("Unmatched \\end")]
    UnmatchedEnd,
    #[error("Unrecognized character")]
    BadCharacter,
    #[error("Nesting deeper than {} levels", MAX_DEPTH)]
    NestingTooDeep,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{kind}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    /// Closing tokens expected by the groups and environments currently open.
    open: Vec<SyntaxKind>,
    current_offset: TextSize,
    consumed: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input).peekable(),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            open: Vec::new(),
            current_offset: TextSize::from(0),
            consumed: 0,
        }
    }

    pub fn parse(mut self) -> ParseResult {
        self.builder.start_node(SyntaxKind::File.into());
        while self.peek() != SyntaxKind::Eof {
            self.parse_item();
        }
        self.builder.finish_node();
        debug_assert!(self.open.is_empty());

        self.errors.sort_by_key(|e| e.range.start());
        log::debug!(
            "parsed {} tokens ({} bytes) with {} errors",
            self.consumed,
            u32::from(self.current_offset),
            self.errors.len()
        );
        ParseResult {
            green_node: self.builder.finish(),
            errors: self.errors,
        }
    }

    fn peek(&mut self) -> SyntaxKind {
        self.lexer
            .peek()
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::Eof)
    }

    fn peek_range(&mut self) -> TextRange {
        let offset = self.current_offset;
        self.lexer
            .peek()
            .map(|t| t.range)
            .unwrap_or_else(|| TextRange::empty(offset))
    }

    fn bump(&mut self) {
        if let Some(token) = self.lexer.next() {
            self.builder.token(token.kind.into(), token.text);
            self.current_offset = token.range.end();
            self.consumed += 1;
        }
    }

    fn error(&mut self, kind: SyntaxErrorKind, range: TextRange) {
        self.errors.push(SyntaxError { kind, range });
    }

    /// Wraps everything built since `checkpoint` in an `Error` node.
    fn wrap_error(&mut self, checkpoint: Checkpoint, start: TextSize, kind: SyntaxErrorKind) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::Error.into());
        self.builder.finish_node();
        let range = TextRange::new(start, self.current_offset);
        log::trace!("recovered from {kind:?} at {range:?}");
        self.error(kind, range);
    }

    fn parse_item(&mut self) {
        match self.peek() {
            SyntaxKind::Identifier => self.parse_instruction(),
            SyntaxKind::IdentifierBegin => self.parse_environment(),
            SyntaxKind::LBrace | SyntaxKind::LBracket | SyntaxKind::LParen => self.parse_group(),
            kind if kind.is_closer() => self.parse_stray_closer(kind),
            SyntaxKind::BadCharacter => {
                let range = self.peek_range();
                self.error(SyntaxErrorKind::BadCharacter, range);
                self.bump();
            }
            SyntaxKind::Eof => {}
            _ => self.bump(),
        }
    }

    /// Parses items until `closer` is next. Returns `false` when input ends or
    /// an enclosing construct's closer shows up first.
    fn parse_items_until(&mut self, closer: SyntaxKind) -> bool {
        loop {
            let kind = self.peek();
            if kind == closer {
                return true;
            }
            if kind == SyntaxKind::Eof || (kind.is_closer() && self.open.contains(&kind)) {
                return false;
            }
            let before = self.consumed;
            self.parse_item();
            debug_assert!(self.consumed > before, "parser made no progress");
        }
    }

    fn too_deep(&mut self) -> bool {
        if self.open.len() < MAX_DEPTH {
            return false;
        }
        let range = self.peek_range();
        self.error(SyntaxErrorKind::NestingTooDeep, range);
        self.bump();
        true
    }

    /// Adjacent groups, and for plain instructions adjacent text as well.
    fn parse_arguments(&mut self, text_arguments: bool) {
        loop {
            match self.peek() {
                SyntaxKind::LBrace | SyntaxKind::LBracket | SyntaxKind::LParen => {
                    self.parse_group()
                }
                SyntaxKind::Arg if text_arguments => self.bump(),
                _ => break,
            }
        }
    }

    fn parse_instruction(&mut self) {
        self.builder.start_node(SyntaxKind::Instruction.into());
        self.bump(); // Consume \name
        self.parse_arguments(true);
        self.builder.finish_node();
    }

    fn parse_group(&mut self) {
        let opener = self.peek();
        let Some(closer) = opener.closer() else {
            self.bump();
            return;
        };
        if self.too_deep() {
            return;
        }

        let checkpoint = self.builder.checkpoint();
        let start = self.current_offset;
        self.builder.start_node(SyntaxKind::Group.into());
        self.bump(); // Consume opener

        self.open.push(closer);
        let closed = self.parse_items_until(closer);
        self.open.pop();

        if closed {
            self.bump(); // Consume closer
        }
        self.builder.finish_node();

        if !closed {
            let expected = delimiter_char(closer);
            self.wrap_error(checkpoint, start, SyntaxErrorKind::UnterminatedGroup { expected });
        }
    }

    fn parse_environment(&mut self) {
        if self.too_deep() {
            return;
        }

        let checkpoint = self.builder.checkpoint();
        let start = self.current_offset;
        self.builder.start_node(SyntaxKind::Environment.into());
        // Pushed first so an unclosed argument of \begin cannot swallow \end.
        self.open.push(SyntaxKind::IdentifierEnd);
        self.parse_marker(SyntaxKind::EnvBegin);

        let closed = self.parse_items_until(SyntaxKind::IdentifierEnd);
        self.open.pop();

        if closed {
            self.parse_marker(SyntaxKind::EnvEnd);
        }
        self.builder.finish_node();

        if !closed {
            self.wrap_error(checkpoint, start, SyntaxErrorKind::UnterminatedEnvironment);
        }
    }

    /// `\begin` or `\end` together with its arguments.
    fn parse_marker(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
        self.bump();
        if self.peek() != SyntaxKind::LBrace {
            let range = TextRange::empty(self.current_offset);
            self.error(SyntaxErrorKind::MissingEnvironmentName, range);
        }
        self.parse_arguments(false);
        self.builder.finish_node();
    }

    fn parse_stray_closer(&mut self, kind: SyntaxKind) {
        let checkpoint = self.builder.checkpoint();
        let start = self.current_offset;
        if kind == SyntaxKind::IdentifierEnd {
            self.parse_marker(SyntaxKind::EnvEnd);
            self.wrap_error(checkpoint, start, SyntaxErrorKind::UnmatchedEnd);
        } else {
            self.bump();
            let found = delimiter_char(kind);
            self.wrap_error(checkpoint, start, SyntaxErrorKind::UnmatchedCloser { found });
        }
    }
}

fn delimiter_char(kind: SyntaxKind) -> char {
    match kind {
        SyntaxKind::LBrace => '{',
        SyntaxKind::RBrace => '}',
        SyntaxKind::LBracket => '[',
        SyntaxKind::RBracket => ']',
        SyntaxKind::LParen => '(',
        SyntaxKind::RParen => ')',
        _ => '?',
    }
}

/// The immutable outcome of one parse: the green tree and its errors, sorted
/// by start offset.
pub struct ParseResult {
    pub green_node: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl ParseResult {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green_node.clone())
    }

    /// Every `Error` node in document order.
    pub fn error_nodes(&self) -> impl Iterator<Item = SyntaxNode> {
        self.syntax()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::Error)
    }
}

pub fn parse(input: &str) -> ParseResult {
    Parser::new(input).parse()
}
