//! Conversion between LSP positions (zero-based line, UTF-16 column) and
//! byte offsets into the document.

use groove_common::span::{LineIndex, Span};
use tower_lsp::lsp_types::{Position, Range};

/// Byte offset of `position`. Columns past the end of the line clamp to the
/// line end; a line past the end of the document gives `None`.
pub fn position_to_offset(source: &str, position: Position) -> Option<u32> {
    let index = LineIndex::new(source);
    let line_start = index.offset(source, position.line + 1, 1)?;
    let rest = &source[line_start as usize..];
    let line = rest.split('\n').next().unwrap_or(rest);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut utf16 = 0;
    for (byte, ch) in line.char_indices() {
        if utf16 >= position.character {
            return Some(line_start + byte as u32);
        }
        utf16 += ch.len_utf16() as u32;
    }
    Some(line_start + line.len() as u32)
}

pub fn offset_to_position(source: &str, offset: u32) -> Position {
    let (line, col) = LineIndex::new(source).line_col(offset);
    let line_start = (offset - (col - 1)) as usize;
    let character = source[line_start..offset as usize].encode_utf16().count() as u32;
    Position::new(line - 1, character)
}

pub fn span_to_range(source: &str, span: Span) -> Range {
    Range::new(
        offset_to_position(source, span.start),
        offset_to_position(source, span.end),
    )
}
