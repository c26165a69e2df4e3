use std::str::Chars;

/// Returned by [`Cursor::first`] past the end of input.
pub const EOF_CHAR: char = '\0';

/// Peekable cursor over the characters of the source.
pub struct Cursor<'a> {
    len_remaining: usize,
    chars: Chars<'a>,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Cursor<'a> {
        Cursor {
            len_remaining: input.len(),
            chars: input.chars(),
        }
    }

    /// Peek the next character without consuming it.
    pub fn first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// Consume one character.
    pub fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    /// Consume characters while the predicate holds.
    pub fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while pred(self.first()) && !self.is_eof() {
            self.bump();
        }
    }

    /// Bytes consumed since the last [`Cursor::reset_pos`].
    pub fn pos_in_token(&self) -> usize {
        self.len_remaining - self.chars.as_str().len()
    }

    pub fn reset_pos(&mut self) {
        self.len_remaining = self.chars.as_str().len();
    }
}
