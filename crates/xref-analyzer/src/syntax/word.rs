use once_cell::sync::Lazy;
use regex::Regex;

use crate::semantic::{SpelledToken, TextRange, TokenBuffer};

use super::lexer::is_keyword_spelling;

/// Doxygen commands whose argument names an entity.
static DOXYGEN_ENTITY_TAG: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^(p|c|class|tparam|param|param\[in\]|param\[out\]|param\[in,out\]|retval|throw|throws|link)$").ok()
});

/// How far back to look for a doxygen command before a word.
const DOXYGEN_LOOKBEHIND: usize = 100;

/// A word under the cursor: either a spelled identifier/keyword token, or a
/// run of identifier characters recovered from raw text (comments, strings,
/// disabled regions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpelledWord<'a> {
    pub text: &'a str,
    pub range: TextRange,
    /// Identifier-shaped and not a keyword.
    pub likely_identifier: bool,
    /// The identifier or keyword token this word is.
    pub spelled_token: Option<SpelledToken>,
    /// The last touching token starting at or before the word.
    pub part_of_spelled_token: Option<SpelledToken>,
    /// `spelled_token` survives preprocessing.
    pub expanded_token: bool,
}

impl<'a> SpelledWord<'a> {
    pub fn touching(
        offset: u32,
        source: &'a str,
        tokens: &TokenBuffer,
    ) -> Option<SpelledWord<'a>> {
        let touching = tokens.touching(offset);
        for tok in touching {
            if tok.is_identifier() || tok.kind.is_keyword() {
                return Some(SpelledWord {
                    text: tok.text(source),
                    range: tok.range,
                    likely_identifier: tok.is_identifier(),
                    spelled_token: Some(*tok),
                    part_of_spelled_token: Some(*tok),
                    expanded_token: tok.expanded,
                });
            }
        }

        let bytes = source.as_bytes();
        let offset = (offset as usize).min(bytes.len());
        let mut begin = offset;
        let mut end = offset;
        while begin > 0 && is_identifier_continue(bytes[begin - 1]) {
            begin -= 1;
        }
        while end < bytes.len() && is_identifier_continue(bytes[end]) {
            end += 1;
        }
        if begin == end {
            return None;
        }

        let text = &source[begin..end];
        let likely_identifier =
            is_likely_identifier(text, &source[..begin], &source[end..]) && !is_keyword_spelling(text);
        let part_of_spelled_token = touching.iter().filter(|tok| tok.range.start as usize <= begin).last().copied();
        Some(SpelledWord {
            text,
            range: TextRange::new(begin as u32, end as u32),
            likely_identifier,
            spelled_token: None,
            part_of_spelled_token,
            expanded_token: false,
        })
    }

    /// Whether the word sits inside a string literal token.
    pub fn in_string_literal(&self) -> bool {
        self.part_of_spelled_token.is_some_and(|tok| tok.kind.is_string_literal())
    }
}

fn is_identifier_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Heuristic for text that is probably an identifier even outside code.
pub fn is_likely_identifier(
    word: &str,
    before: &str,
    after: &str,
) -> bool {
    if before.ends_with('`') && after.starts_with('`') {
        return true;
    }
    if before.ends_with("::") || after.starts_with("::") {
        return true;
    }

    let mut window_start = before.len().saturating_sub(DOXYGEN_LOOKBEHIND);
    while !before.is_char_boundary(window_start) {
        window_start += 1;
    }
    let window = &before[window_start..];
    if let Some(pos) = window.rfind(['\\', '@']) {
        let tag = window[pos + 1..].trim_end_matches(' ');
        if DOXYGEN_ENTITY_TAG.as_ref().is_some_and(|re| re.is_match(tag)) {
            return true;
        }
    }

    if word.contains('_') {
        return true;
    }
    // Mixed case only; all-caps words are usually prose initialisms.
    let has_lower = word.chars().any(|c| c.is_ascii_lowercase());
    has_lower && word.chars().skip(1).any(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
#[path = "../../tests/src/syntax/word_tests.rs"]
mod tests;
