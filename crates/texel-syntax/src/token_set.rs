//! Static token classification tables.
//!
//! Each table groups token kinds by the behaviour an editor attaches to them:
//! whitespace skipping, comment folding, instruction highlighting, bracket
//! matching. They are plain `const` values and depend on nothing but
//! [`SyntaxKind`].

use crate::SyntaxKind;

/// A set of [`SyntaxKind`]s, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub const fn new(kinds: &[SyntaxKind]) -> TokenSet {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            bits |= mask(kinds[i]);
            i += 1;
        }
        TokenSet(bits)
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    pub const fn contains(self, kind: SyntaxKind) -> bool {
        self.0 & mask(kind) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

const fn mask(kind: SyntaxKind) -> u64 {
    1u64 << (kind as u16)
}

pub const WHITESPACE: TokenSet = TokenSet::new(&[SyntaxKind::Whitespace]);

/// `%` line comments.
pub const COMMENTS: TokenSet = TokenSet::new(&[SyntaxKind::Comment]);

/// Control sequences introduced by `\`.
pub const INSTRUCTIONS: TokenSet = TokenSet::new(&[
    SyntaxKind::Identifier,
    SyntaxKind::IdentifierBegin,
    SyntaxKind::IdentifierEnd,
]);

/// Instruction argument payloads.
pub const ARGUMENTS: TokenSet = TokenSet::new(&[SyntaxKind::Arg]);

/// Braces, brackets and parentheses.
pub const BRACKETS: TokenSet = TokenSet::new(&[
    SyntaxKind::LBrace,
    SyntaxKind::RBrace,
    SyntaxKind::LBracket,
    SyntaxKind::RBracket,
    SyntaxKind::LParen,
    SyntaxKind::RParen,
]);

/// LaTeX has no string literal tokens.
pub const STRING_LITERALS: TokenSet = TokenSet::EMPTY;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_token_kind_fits_the_mask() {
        assert!((SyntaxKind::Eof as u16) < 64);
    }

    #[test]
    fn test_classification_tables() {
        assert!(WHITESPACE.contains(SyntaxKind::Whitespace));
        assert!(!WHITESPACE.contains(SyntaxKind::Comment));
        assert!(COMMENTS.contains(SyntaxKind::Comment));
        assert!(INSTRUCTIONS.contains(SyntaxKind::IdentifierBegin));
        assert!(INSTRUCTIONS.contains(SyntaxKind::IdentifierEnd));
        assert!(!INSTRUCTIONS.contains(SyntaxKind::Arg));
        assert!(ARGUMENTS.contains(SyntaxKind::Arg));
        assert!(BRACKETS.contains(SyntaxKind::RParen));
        assert!(!BRACKETS.contains(SyntaxKind::Group));
        assert!(STRING_LITERALS.is_empty());
    }

    #[test]
    fn test_tables_are_disjoint() {
        let tables = [WHITESPACE, COMMENTS, INSTRUCTIONS, ARGUMENTS, BRACKETS];
        for (i, a) in tables.iter().enumerate() {
            for b in &tables[i + 1..] {
                assert_eq!(a.0 & b.0, 0);
            }
        }
    }

    #[test]
    fn test_union() {
        let trivia = WHITESPACE.union(COMMENTS);
        assert!(trivia.contains(SyntaxKind::Whitespace));
        assert!(trivia.contains(SyntaxKind::Comment));
        assert!(!trivia.contains(SyntaxKind::BadCharacter));
    }
}
