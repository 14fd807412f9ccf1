//! Conversions between byte offsets and editor positions (zero-based line, UTF-16 column).

use crate::ide::navigation::IdePosition;

/// Byte offset of the first character on zero-based `line`, clamped to the end of `source`.
pub fn line_start_offset(
    source: &str,
    line: u32,
) -> usize {
    match line.checked_sub(1) {
        None => 0,
        Some(skip) => source.match_indices('\n').nth(skip as usize).map_or(source.len(), |(nl, _)| nl + 1),
    }
}

/// Zero-based line containing `byte_offset`.
pub fn line_of_byte_offset(
    source: &str,
    byte_offset: usize,
) -> u32 {
    let clamped = byte_offset.min(source.len());
    source.as_bytes()[..clamped].iter().filter(|&&byte| byte == b'\n').count() as u32
}

/// Byte offset of `position`, or `None` when the line does not exist or the column lies past its end.
///
/// A column inside a surrogate pair maps to the start of the following character.
pub fn byte_offset_from_position(
    source: &str,
    position: IdePosition,
) -> Option<usize> {
    let start = if position.line == 0 {
        0
    } else {
        source.match_indices('\n').nth(position.line as usize - 1)?.0 + 1
    };
    let line = source[start..].split('\n').next().unwrap_or("");

    let mut units = 0u32;
    for (idx, ch) in line.char_indices() {
        if units >= position.character {
            return Some(start + idx);
        }
        units += ch.len_utf16() as u32;
    }
    (units >= position.character).then_some(start + line.len())
}

/// Editor position of `byte_offset`; offsets past the end map to the end of the text.
pub fn position_from_byte_offset(
    source: &str,
    byte_offset: usize,
) -> IdePosition {
    let mut offset = byte_offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
    let column: usize = before[line_start..].chars().map(char::len_utf16).sum();
    IdePosition::new(line_of_byte_offset(source, offset), column as u32)
}

#[cfg(test)]
#[path = "../tests/src/text_pos_tests.rs"]
mod tests;
