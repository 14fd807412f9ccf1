use crate::syntax::lexer::TokenKind;

use super::source::TextRange;

/// A token as written in the main file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpelledToken {
    pub kind: TokenKind,
    pub range: TextRange,
    /// The token survives preprocessing (not in a directive, a skipped region or a macro name).
    pub expanded: bool,
    /// The token is the name of a macro invocation.
    pub starts_expansion: bool,
}

impl SpelledToken {
    pub fn text<'a>(
        &self,
        source: &'a str,
    ) -> &'a str {
        source.get(self.range.as_usize()).unwrap_or("")
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

/// Spelled tokens of the main file, in source order, without trivia.
#[derive(Debug, Clone, Default)]
pub struct TokenBuffer {
    tokens: Vec<SpelledToken>,
}

impl TokenBuffer {
    pub fn new(tokens: Vec<SpelledToken>) -> Self {
        Self {
            tokens,
        }
    }

    pub fn tokens(&self) -> &[SpelledToken] {
        &self.tokens
    }

    /// Tokens whose range contains `offset` or ends exactly at it. At most two.
    pub fn touching(
        &self,
        offset: u32,
    ) -> &[SpelledToken] {
        let first = self.tokens.partition_point(|tok| tok.range.end < offset);
        let mut last = first;
        while last < self.tokens.len() && self.tokens[last].range.touches(offset) {
            last += 1;
        }
        &self.tokens[first..last]
    }

    pub fn spelled_identifier_touching(
        &self,
        offset: u32,
    ) -> Option<&SpelledToken> {
        self.touching(offset).iter().find(|tok| tok.is_identifier())
    }

    /// The token whose half-open range contains `offset`.
    pub fn containing(
        &self,
        offset: u32,
    ) -> Option<&SpelledToken> {
        let idx = self.tokens.partition_point(|tok| tok.range.end <= offset);
        self.tokens.get(idx).filter(|tok| tok.range.start <= offset)
    }

    /// Index of the first token starting at or after `offset`.
    pub fn partition_point(
        &self,
        offset: u32,
    ) -> usize {
        self.tokens.partition_point(|tok| tok.range.start < offset)
    }
}

#[cfg(test)]
#[path = "../../tests/src/semantic/tokens_tests.rs"]
mod tests;
