use crate::SyntaxKind;
use rowan::{TextRange, TextSize};
use thiserror::Error;

/// Control sequence that opens an environment block.
pub const BEGIN_KEYWORD: &str = "\\begin";
/// Control sequence that closes an environment block.
pub const END_KEYWORD: &str = "\\end";

/// A single lexed token: its kind, its source text and its byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// Raised when a lexer is restarted at an offset it cannot start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("offset {offset} is past the end of the input ({len} bytes)")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
    #[error("input of {len} bytes exceeds the 4 GiB limit of text offsets")]
    InputTooLarge { len: usize },
}

/// A lexer for LaTeX source code.
///
/// ## Overview
///
/// The lexer performs **character-level scanning** of LaTeX source, producing
/// a stream of [`Token`]s. Rules are tried in this order:
///
/// - **Instructions**: `\section`, `\begin`, `\end`, and control symbols such as `\%`
/// - **Comments**: `%` through end of line, newline excluded
/// - **Brackets**: `{`, `}`, `[`, `]`, `(`, `)`
/// - **Whitespace**: Consecutive whitespace collapsed into single tokens
/// - **Bad characters**: Control characters that are not whitespace, one per token
/// - **Arguments**: Everything else, consumed greedily until a delimiter
///
/// Every byte of the input ends up in exactly one token, so concatenating the
/// token texts reproduces the source.
///
/// ## Restarting
///
/// The lexer carries no state between tokens. [`Lexer::starting_at`] resumes
/// from any token boundary and yields exactly the tokens that lexing from the
/// start would have produced after that point.
///
/// ## Examples
///
/// ```
/// use texel_syntax::lexer::Lexer;
/// use texel_syntax::SyntaxKind;
///
/// let source = r"\section{Hello} % comment";
/// let tokens: Vec<_> = Lexer::new(source).collect();
///
/// assert_eq!(tokens[0].kind, SyntaxKind::Identifier); // \section
/// assert_eq!(tokens[1].kind, SyntaxKind::LBrace);     // {
/// assert_eq!(tokens[2].kind, SyntaxKind::Arg);        // Hello
/// ```
pub struct Lexer<'a> {
    /// The input source text being lexed.
    input: &'a str,
    /// Current byte position in the input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new `Lexer` for the given input string.
    ///
    /// Offsets are `u32`, so inputs must be smaller than 4 GiB. Ranges past
    /// that limit saturate; use [`Lexer::starting_at`] to get an error instead.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Creates a `Lexer` that resumes at byte `offset`.
    pub fn starting_at(input: &'a str, offset: usize) -> Result<Self, LexError> {
        check_len(input.len())?;
        if offset > input.len() {
            return Err(LexError::OffsetOutOfBounds {
                offset,
                len: input.len(),
            });
        }
        if !input.is_char_boundary(offset) {
            return Err(LexError::NotCharBoundary { offset });
        }
        Ok(Self {
            input,
            position: offset,
        })
    }

    /// Current byte offset; always a token boundary between calls.
    pub fn offset(&self) -> usize {
        self.position
    }

    /// Returns the next token.
    /// If EOF, returns a `SyntaxKind::Eof` token with empty text.
    pub fn next_token(&mut self) -> Token<'a> {
        let start = self.position;
        let kind = match self.peek_char() {
            Some(c) => self.scan(c),
            None => SyntaxKind::Eof,
        };
        debug_assert!(kind == SyntaxKind::Eof || self.position > start);

        Token {
            kind,
            text: &self.input[start..self.position],
            range: TextRange::new(to_size(start), to_size(self.position)),
        }
    }

    fn scan(&mut self, c: char) -> SyntaxKind {
        match c {
            '\\' => self.scan_escape(),
            '%' => {
                self.bump(c);
                self.eat_while(|n| n != '\n' && n != '\r');
                SyntaxKind::Comment
            }
            '{' => self.single(c, SyntaxKind::LBrace),
            '}' => self.single(c, SyntaxKind::RBrace),
            '[' => self.single(c, SyntaxKind::LBracket),
            ']' => self.single(c, SyntaxKind::RBracket),
            '(' => self.single(c, SyntaxKind::LParen),
            ')' => self.single(c, SyntaxKind::RParen),
            c if c.is_whitespace() => {
                self.eat_while(char::is_whitespace);
                SyntaxKind::Whitespace
            }
            c if c.is_control() => self.single(c, SyntaxKind::BadCharacter),
            _ => {
                self.eat_while(is_arg_char);
                SyntaxKind::Arg
            }
        }
    }

    fn scan_escape(&mut self) -> SyntaxKind {
        let start = self.position;
        self.bump('\\');
        match self.peek_char() {
            Some(n) if n.is_alphabetic() => {
                // Control word: \section
                self.eat_while(char::is_alphabetic);
                match &self.input[start..self.position] {
                    BEGIN_KEYWORD => SyntaxKind::IdentifierBegin,
                    END_KEYWORD => SyntaxKind::IdentifierEnd,
                    _ => SyntaxKind::Identifier,
                }
            }
            Some(n) if n.is_whitespace() || !n.is_control() => {
                // Control symbol: \% or \\ or "\ "
                self.bump(n);
                SyntaxKind::Identifier
            }
            _ => SyntaxKind::BadCharacter,
        }
    }

    fn single(&mut self, c: char, kind: SyntaxKind) -> SyntaxKind {
        self.bump(c);
        kind
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.position += c.len_utf8();
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(n) = self.peek_char() {
            if !pred(n) {
                break;
            }
            self.bump(n);
        }
    }
}

fn is_arg_char(c: char) -> bool {
    !matches!(c, '\\' | '%' | '{' | '}' | '[' | ']' | '(' | ')')
        && !c.is_whitespace()
        && !c.is_control()
}

fn check_len(len: usize) -> Result<(), LexError> {
    match u32::try_from(len) {
        Ok(_) => Ok(()),
        Err(_) => Err(LexError::InputTooLarge { len }),
    }
}

fn to_size(offset: usize) -> TextSize {
    TextSize::try_from(offset).unwrap_or(TextSize::from(u32::MAX))
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == SyntaxKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Lexes the whole input in one go.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(input: &str) -> Vec<(SyntaxKind, &str)> {
        tokenize(input).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let input = r"\section{Hello} % comment";
        let tokens = kinds_and_text(input);
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Identifier, "\\section"),
                (SyntaxKind::LBrace, "{"),
                (SyntaxKind::Arg, "Hello"),
                (SyntaxKind::RBrace, "}"),
                (SyntaxKind::Whitespace, " "),
                (SyntaxKind::Comment, "% comment"),
            ]
        );
    }

    #[test]
    fn test_comment_excludes_newline() {
        let input = "\\foo % comment\nbar";
        let tokens = kinds_and_text(input);
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Identifier, "\\foo"),
                (SyntaxKind::Whitespace, " "),
                (SyntaxKind::Comment, "% comment"),
                (SyntaxKind::Whitespace, "\n"),
                (SyntaxKind::Arg, "bar"),
            ]
        );
    }

    #[test]
    fn test_begin_and_end_keywords() {
        let input = r"\begin{a}\end{a}\beginning";
        let kinds: Vec<_> = tokenize(input).into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::IdentifierBegin,
                SyntaxKind::LBrace,
                SyntaxKind::Arg,
                SyntaxKind::RBrace,
                SyntaxKind::IdentifierEnd,
                SyntaxKind::LBrace,
                SyntaxKind::Arg,
                SyntaxKind::RBrace,
                SyntaxKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_escaped_symbols() {
        let input = r"Wait 50\%";
        let tokens = kinds_and_text(input);
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Arg, "Wait"),
                (SyntaxKind::Whitespace, " "),
                (SyntaxKind::Arg, "50"),
                (SyntaxKind::Identifier, "\\%"),
            ]
        );
    }

    #[test]
    fn test_control_space_and_linebreak() {
        let tokens = kinds_and_text("a\\ b\\\\");
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Arg, "a"),
                (SyntaxKind::Identifier, "\\ "),
                (SyntaxKind::Arg, "b"),
                (SyntaxKind::Identifier, "\\\\"),
            ]
        );
    }

    #[test]
    fn test_lexer_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_lexer_only_whitespace() {
        let input = "   \n\t ";
        assert_eq!(
            kinds_and_text(input),
            vec![(SyntaxKind::Whitespace, "   \n\t ")]
        );
    }

    #[test]
    fn test_lexer_punctuation_is_argument_text() {
        let input = "@#*&^$";
        assert_eq!(kinds_and_text(input), vec![(SyntaxKind::Arg, "@#*&^$")]);
    }

    #[test]
    fn test_lexer_all_brackets() {
        let kinds: Vec<_> = tokenize("{}[]()").into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::LBrace,
                SyntaxKind::RBrace,
                SyntaxKind::LBracket,
                SyntaxKind::RBracket,
                SyntaxKind::LParen,
                SyntaxKind::RParen,
            ]
        );
    }

    #[test]
    fn test_nul_is_a_single_bad_character() {
        let tokens = kinds_and_text("ab\0cd");
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Arg, "ab"),
                (SyntaxKind::BadCharacter, "\0"),
                (SyntaxKind::Arg, "cd"),
            ]
        );
    }

    #[test]
    fn test_consecutive_bad_characters_are_separate() {
        let kinds: Vec<_> = tokenize("\0\x1b").into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::BadCharacter, SyntaxKind::BadCharacter]
        );
    }

    #[test]
    fn test_trailing_backslash_is_bad() {
        let tokens = kinds_and_text("x\\");
        assert_eq!(
            tokens,
            vec![(SyntaxKind::Arg, "x"), (SyntaxKind::BadCharacter, "\\")]
        );
    }

    #[test]
    fn test_backslash_before_control_char() {
        let tokens = kinds_and_text("\\\0");
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::BadCharacter, "\\"),
                (SyntaxKind::BadCharacter, "\0"),
            ]
        );
    }

    #[test]
    fn test_lexer_multi_byte_text() {
        let tokens = kinds_and_text(r"Étude \émile");
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::Arg, "Étude"),
                (SyntaxKind::Whitespace, " "),
                (SyntaxKind::Identifier, "\\émile"),
            ]
        );
    }

    #[test]
    fn test_lexer_comment_with_carriage_return() {
        let tokens = kinds_and_text("% comment\rnext");
        assert_eq!(tokens[0], (SyntaxKind::Comment, "% comment"));
        assert_eq!(tokens[1], (SyntaxKind::Whitespace, "\r"));
    }

    #[test]
    fn test_ranges_are_byte_offsets() {
        let tokens = tokenize("é{x}");
        assert_eq!(tokens[0].range, TextRange::new(0.into(), 2.into()));
        assert_eq!(tokens[1].range, TextRange::new(2.into(), 3.into()));
    }

    #[test]
    fn test_eof_token_is_empty_and_repeats() {
        let mut lexer = Lexer::new("a");
        lexer.next_token();
        let eof = lexer.next_token();
        assert_eq!(eof.kind, SyntaxKind::Eof);
        assert_eq!(eof.text, "");
        assert_eq!(eof.range, TextRange::empty(1.into()));
        assert_eq!(lexer.next_token().kind, SyntaxKind::Eof);
    }

    #[test]
    fn test_restart_at_token_boundary() {
        let input = r"\begin{doc} text % note";
        let all = tokenize(input);
        for (i, token) in all.iter().enumerate() {
            let offset = u32::from(token.range.start()) as usize;
            let lexer = Lexer::starting_at(input, offset).unwrap();
            assert_eq!(lexer.offset(), offset);
            let resumed: Vec<_> = lexer.collect();
            assert_eq!(resumed, all[i..].to_vec());
        }
    }

    #[test]
    fn test_offset_tracks_token_ends() {
        let input = r"\a{b}";
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.offset(), 0);
        let first = lexer.next_token();
        assert_eq!(lexer.offset(), u32::from(first.range.end()) as usize);
        while lexer.next().is_some() {}
        assert_eq!(lexer.offset(), input.len());
    }

    #[test]
    fn test_input_length_limit() {
        assert_eq!(check_len(u32::MAX as usize), Ok(()));
        #[cfg(target_pointer_width = "64")]
        {
            let len = u32::MAX as usize + 1;
            assert_eq!(check_len(len), Err(LexError::InputTooLarge { len }));
            assert_eq!(to_size(len), TextSize::from(u32::MAX));
        }
    }

    #[test]
    fn test_restart_rejects_bad_offsets() {
        assert_eq!(
            Lexer::starting_at("ab", 3).err(),
            Some(LexError::OffsetOutOfBounds { offset: 3, len: 2 })
        );
        assert_eq!(
            Lexer::starting_at("é", 1).err(),
            Some(LexError::NotCharBoundary { offset: 1 })
        );
        assert!(Lexer::starting_at("ab", 2).unwrap().next().is_none());
    }
}
