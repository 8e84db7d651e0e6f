//! # Texel Syntax
//!
//! Fault-tolerant lexer and parser for LaTeX source.
//!
//! The [`lexer`] turns raw text into a lossless stream of [`lexer::Token`]s,
//! and the [`parser`] assembles them into a [`rowan`] tree rooted at a
//! [`SyntaxKind::File`] node. Malformed input never aborts a parse: stray
//! closers and unterminated constructs are wrapped in [`SyntaxKind::Error`]
//! nodes and reported through [`parser::SyntaxError`].
//!
//! ```
//! use texel_syntax::{parse, SyntaxKind};
//!
//! let result = parse(r"\begin{itemize} \item{A} \end{itemize}");
//! let root = result.syntax();
//! assert_eq!(root.kind(), SyntaxKind::File);
//! assert!(result.errors.is_empty());
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token_set;


pub use lexer::{LexError, Lexer, Token};
pub use parser::{parse, ParseResult, SyntaxError, SyntaxErrorKind};
use rowan::Language;
pub use rowan::{NodeOrToken, TextRange, TextSize};
pub use token_set::TokenSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[repr(u16)]
pub enum SyntaxKind {
    // Tokens
    Whitespace = 0,
    Comment,         // % ...
    Identifier,      // \section, \%
    IdentifierBegin, // \begin
    IdentifierEnd,   // \end
    Arg,             // plain text run
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    BadCharacter,

    // Composite Nodes
    File,
    Instruction, // \foo[opt]{arg}
    Environment, // \begin{...} ... \end{...}
    EnvBegin,    // \begin{...}
    EnvEnd,      // \end{...}
    Group,       // { ... }, [ ... ], ( ... )
    Error,

    // Technical
    Eof,
}

impl SyntaxKind {
    /// The closing token paired with an opening bracket or `\begin`.
    pub const fn closer(self) -> Option<SyntaxKind> {
        match self {
            SyntaxKind::LBrace => Some(SyntaxKind::RBrace),
            SyntaxKind::LBracket => Some(SyntaxKind::RBracket),
            SyntaxKind::LParen => Some(SyntaxKind::RParen),
            SyntaxKind::IdentifierBegin => Some(SyntaxKind::IdentifierEnd),
            _ => None,
        }
    }

    pub const fn is_closer(self) -> bool {
        matches!(
            self,
            SyntaxKind::RBrace
                | SyntaxKind::RBracket
                | SyntaxKind::RParen
                | SyntaxKind::IdentifierEnd
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TexelLanguage {}

impl Language for TexelLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::Eof as u16);
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<TexelLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<TexelLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<TexelLanguage>;
