use crate::lexer::cursor::Cursor;

pub mod cursor;

/// A raw token that only carries its kind and length; spans and values are
/// derived by the parser.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RawToken {
    pub kind: RawTokenKind,
    pub len: usize,
}

impl RawToken {
    pub fn new(kind: RawTokenKind, len: usize) -> Self {
        RawToken { kind, len }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawTokenKind {
    /// Mnemonic, register name or label. Starts with a letter or underscore.
    Ident,
    /// Numeric literal. Starts with a digit; the radix suffix is resolved by
    /// the parser.
    Number,
    Colon,
    Comma,
    /// `;` through to the end of the line.
    Comment,
    Newline,
    Whitespace,
    Unknown,
    Eof,
}

pub fn tokenize(input: &str) -> impl Iterator<Item = RawToken> + '_ {
    let mut cursor = Cursor::new(input);
    std::iter::from_fn(move || {
        let token = cursor.advance_token();
        if token.kind != RawTokenKind::Eof {
            Some(token)
        } else {
            None
        }
    })
}

/// Test if a character can start an identifier.
pub(crate) fn is_id_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

/// Test if a character can continue an identifier or numeric literal. The
/// radix suffixes `H` and `B` make hex digits and suffix letters
/// indistinguishable while scanning, so literals take the full identifier
/// alphabet and the parser validates them.
pub(crate) fn is_id_continue(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_')
}

impl Cursor<'_> {
    pub fn advance_token(&mut self) -> RawToken {
        let first_char = match self.bump() {
            Some(c) => c,
            None => return RawToken::new(RawTokenKind::Eof, 0),
        };
        let token_kind = match first_char {
            ';' => {
                self.take_while(|c| c != '\n');
                RawTokenKind::Comment
            }
            '\n' => RawTokenKind::Newline,
            ' ' | '\t' | '\r' => {
                self.take_while(|c| matches!(c, ' ' | '\t' | '\r'));
                RawTokenKind::Whitespace
            }
            ',' => RawTokenKind::Comma,
            ':' => RawTokenKind::Colon,
            c if c.is_ascii_digit() => {
                self.take_while(is_id_continue);
                RawTokenKind::Number
            }
            c if is_id_start(c) => {
                self.take_while(is_id_continue);
                RawTokenKind::Ident
            }
            _ => RawTokenKind::Unknown,
        };
        let res = RawToken::new(token_kind, self.pos_in_token());
        self.reset_pos();
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<RawTokenKind> {
        tokenize(src).map(|t| t.kind).collect()
    }

    #[test]
    fn scans_a_labelled_instruction() {
        use RawTokenKind::*;
        assert_eq!(
            kinds("LOOP: MOV B, C ; step\n"),
            vec![
                Ident, Colon, Whitespace, Ident, Whitespace, Ident, Comma, Whitespace, Ident,
                Whitespace, Comment, Newline
            ]
        );
    }

    #[test]
    fn numbers_swallow_radix_suffixes() {
        let tokens: Vec<RawToken> = tokenize("0FFH 1010B 42").collect();
        assert_eq!(tokens[0], RawToken::new(RawTokenKind::Number, 4));
        assert_eq!(tokens[2], RawToken::new(RawTokenKind::Number, 5));
        assert_eq!(tokens[4], RawToken::new(RawTokenKind::Number, 2));
    }

    #[test]
    fn token_lengths_cover_the_source() {
        let src = "START:\tMVI A, 01H ; seed\n HLT";
        let total: usize = tokenize(src).map(|t| t.len).sum();
        assert_eq!(total, src.len());
    }

    #[test]
    fn unknown_characters_are_single_tokens() {
        let tokens: Vec<RawToken> = tokenize("@").collect();
        assert_eq!(tokens, vec![RawToken::new(RawTokenKind::Unknown, 1)]);
    }
}
