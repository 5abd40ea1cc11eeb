//! Panic-mode recovery: after a syntax error the parser skips to a token
//! in a recovery set and carries on.

use stencil_ir::TokenKind;

use crate::cursor::Cursor;

/// Token kinds as bits of a `u128`, indexed by discriminant. Sets are built
/// in `const` items and tested once per skipped token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenSet(u128);

impl TokenSet {
    pub const fn new() -> Self {
        TokenSet(0)
    }

    #[inline]
    const fn bit(kind: TokenKind) -> u128 {
        1u128 << kind.discriminant_index()
    }

    #[must_use]
    #[allow(clippy::needless_pass_by_value, reason = "`const` builder over a `Copy` kind")]
    pub const fn with(self, kind: TokenKind) -> Self {
        TokenSet(self.0 | Self::bit(kind))
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        TokenSet(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        self.0 & Self::bit(kind) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of kinds in the set.
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

/// Tokens that end a code span.
pub const CODE_EXIT: TokenSet = TokenSet::new()
    .with(TokenKind::CodeExit)
    .with(TokenKind::TagExit)
    .with(TokenKind::FrontMatterMarker)
    .with(TokenKind::Eof);

/// Statement boundaries inside native code.
pub const STMT_END: TokenSet = CODE_EXIT
    .with(TokenKind::Newline)
    .with(TokenKind::Semicolon);

/// Keywords that close or continue an enclosing native block.
pub const BLOCK_KEYWORDS: TokenSet = TokenSet::new()
    .with(TokenKind::End)
    .with(TokenKind::Else)
    .with(TokenKind::When);

/// Recovery set for a native statement.
pub const STMT_RECOVERY: TokenSet = STMT_END.union(BLOCK_KEYWORDS);

/// Skip tokens until the cursor sits on a member of `recovery`.
///
/// `false` means input ran out first; the cursor is then at `Eof`.
pub fn synchronize(cursor: &mut Cursor<'_>, recovery: TokenSet) -> bool {
    loop {
        if cursor.is_at_end() {
            return false;
        }
        if recovery.contains(cursor.current_kind()) {
            return true;
        }
        cursor.advance();
    }
}
