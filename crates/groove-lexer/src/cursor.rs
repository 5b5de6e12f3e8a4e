/// Character cursor over Groovy source with byte-offset tracking.
///
/// Positions are byte offsets into the UTF-8 source, which is what rowan
/// and the completion engine use as well.
pub struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            chars: source.chars(),
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// The character after [`Cursor::peek`], without consuming anything.
    pub fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    /// Whether the unconsumed input starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.chars.as_str().starts_with(prefix)
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume `n` characters (fewer at end of input).
    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            if self.advance().is_none() {
                break;
            }
        }
    }

    pub fn pos(&self) -> u32 {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// Advance while the predicate holds for the current character.
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
    }

    /// Slice of the source between two byte offsets.
    ///
    /// # Panics
    ///
    /// Panics if the offsets are out of bounds or not on UTF-8 boundaries.
    pub fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_multibyte_utf8() {
        let mut cursor = Cursor::new("\u{00E9}a");
        assert_eq!(cursor.advance(), Some('\u{00E9}'));
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.pos(), 3);
        assert!(cursor.is_eof());
    }

    #[test]
    fn starts_with_and_advance_by() {
        let mut cursor = Cursor::new("'''text'''");
        assert!(cursor.starts_with("'''"));
        cursor.advance_by(3);
        assert_eq!(cursor.pos(), 3);
        assert!(!cursor.starts_with("'''"));
        cursor.advance_by(100);
        assert!(cursor.is_eof());
    }

    #[test]
    fn eat_while_and_slice() {
        let mut cursor = Cursor::new("name = 1");
        cursor.eat_while(|c| c.is_alphanumeric());
        assert_eq!(cursor.pos(), 4);
        assert_eq!(cursor.slice(0, 4), "name");
        assert_eq!(cursor.peek(), Some(' '));
        assert_eq!(cursor.peek_next(), Some('='));
    }
}
