use std::iter::Peekable;
use std::vec::IntoIter;

use miette::Result;

use crate::error;
use crate::lexer::{tokenize, RawTokenKind};
use crate::line::{Instr, Label, Mnemonic, Operand, OperandKind, SourceLine};
use crate::span::Span;

/// A spanned token with literals already radix-decoded. Whitespace never
/// makes it out of [`scan`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Ident,
    Number(u32),
    Colon,
    Comma,
    Comment,
    Newline,
}

/// Attach spans to the raw token stream, decode numeric literals and drop
/// whitespace. Unknown characters end the scan with an error.
fn scan(src: &str) -> Result<Vec<Token>> {
    let mut toks = Vec::new();
    let mut offset = 0;
    for raw in tokenize(src) {
        let span = Span::new(offset, raw.len);
        offset += raw.len;
        let kind = match raw.kind {
            RawTokenKind::Whitespace => continue,
            RawTokenKind::Ident => TokenKind::Ident,
            RawTokenKind::Number => {
                TokenKind::Number(parse_literal(&src[span.start()..span.end()], span)?)
            }
            RawTokenKind::Colon => TokenKind::Colon,
            RawTokenKind::Comma => TokenKind::Comma,
            RawTokenKind::Comment => TokenKind::Comment,
            RawTokenKind::Newline => TokenKind::Newline,
            RawTokenKind::Unknown => return Err(error::lex_unknown(span)),
            RawTokenKind::Eof => break,
        };
        toks.push(Token { kind, span });
    }
    Ok(toks)
}

/// Decode a literal: decimal by default, `H` suffix for hex, `B` for binary.
fn parse_literal(text: &str, span: Span) -> Result<u32> {
    let (digits, radix) = match text.as_bytes().last() {
        Some(b'H' | b'h') => (&text[..text.len() - 1], 16),
        Some(b'B' | b'b') => (&text[..text.len() - 1], 2),
        _ => (text, 10),
    };
    u32::from_str_radix(digits, radix).map_err(|e| error::lex_invalid_lit(span, e))
}

/// Transforms the token stream into parsed source lines.
pub struct AsmParser<'a> {
    /// Reference to the source file
    src: &'a str,
    /// Peekable iterator over scanned tokens
    toks: Peekable<IntoIter<Token>>,
}

impl<'a> AsmParser<'a> {
    pub fn new(src: &'a str) -> Result<Self> {
        let toks = scan(src)?;
        Ok(AsmParser {
            src,
            toks: toks.into_iter().peekable(),
        })
    }

    fn get_span(&self, span: Span) -> &str {
        &self.src[span.start()..span.end()]
    }

    /// Parse the whole file. Blank lines produce no entry.
    pub fn parse(mut self) -> Result<Vec<SourceLine>> {
        let mut lines = Vec::new();
        while self.toks.peek().is_some() {
            if let Some(line) = self.parse_line()? {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    /// `line := [ident ':'] [instr] [comment] (newline | eof)`
    fn parse_line(&mut self) -> Result<Option<SourceLine>> {
        let mut label = None;
        let mut instr = None;
        let mut comment = None;

        // A leading identifier is a label when a colon follows, otherwise it
        // is the mnemonic.
        if let Some(ident) = self.next_if(TokenKind::Ident) {
            if self.next_if(TokenKind::Colon).is_some() {
                label = Some(Label {
                    name: self.get_span(ident.span).to_uppercase(),
                    span: ident.span,
                });
                if let Some(mnemonic) = self.next_if(TokenKind::Ident) {
                    instr = Some(self.parse_instr(mnemonic)?);
                }
            } else {
                instr = Some(self.parse_instr(ident)?);
            }
        }

        if let Some(tok) = self.toks.peek() {
            if tok.kind == TokenKind::Comment {
                comment = Some(tok.span);
                self.toks.next();
            }
        }

        match self.toks.next() {
            None => {}
            Some(tok) if tok.kind == TokenKind::Newline => {}
            Some(tok) => return Err(error::parse_trailing(tok.span)),
        }

        if label.is_none() && instr.is_none() && comment.is_none() {
            return Ok(None);
        }
        Ok(Some(SourceLine {
            label,
            instr,
            comment,
        }))
    }

    fn parse_instr(&mut self, name_tok: Token) -> Result<Instr> {
        let name = self.get_span(name_tok.span).to_uppercase();
        let Some(mnemonic) = Mnemonic::parse(&name) else {
            return Err(error::parse_unknown_mnemonic(name_tok.span, &name));
        };

        let mut operands = Vec::new();
        if self.peek_operand() {
            operands.push(self.expect_operand()?);
            while self.next_if(TokenKind::Comma).is_some() {
                operands.push(self.expect_operand()?);
            }
        }

        Ok(Instr {
            mnemonic,
            operands,
            span: name_tok.span,
        })
    }

    fn peek_operand(&mut self) -> bool {
        matches!(
            self.toks.peek(),
            Some(tok) if matches!(tok.kind, TokenKind::Ident | TokenKind::Number(_))
        )
    }

    fn expect_operand(&mut self) -> Result<Operand> {
        match self.toks.next() {
            Some(tok) => {
                let kind = match tok.kind {
                    TokenKind::Ident => OperandKind::Name(self.get_span(tok.span).to_uppercase()),
                    TokenKind::Number(value) => OperandKind::Number(value),
                    _ => return Err(error::parse_unexpected(tok.span, "a register, number or label")),
                };
                Ok(Operand {
                    kind,
                    span: tok.span,
                })
            }
            None => Err(error::parse_unexpected(
                Span::new(self.src.len().saturating_sub(1), 1),
                "a register, number or label",
            )),
        }
    }

    /// Consume the next token if it matches, or leave the iterator untouched.
    fn next_if(&mut self, kind: TokenKind) -> Option<Token> {
        match self.toks.peek() {
            Some(tok) if tok.kind == kind => self.toks.next(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Vec<SourceLine> {
        AsmParser::new(src).unwrap().parse().unwrap()
    }

    fn first_instr(src: &str) -> Instr {
        parse(src).remove(0).instr.unwrap()
    }

    #[test]
    fn parses_instruction_with_operands() {
        let instr = first_instr("MVI A, 34H");
        assert_eq!(instr.mnemonic, Mnemonic::Mvi);
        assert_eq!(instr.operands.len(), 2);
        assert_eq!(instr.operands[0].kind, OperandKind::Name("A".into()));
        assert_eq!(instr.operands[1].kind, OperandKind::Number(0x34));
    }

    #[test]
    fn mnemonics_and_names_are_case_insensitive() {
        let instr = first_instr("mvi a, 5");
        assert_eq!(instr.mnemonic, Mnemonic::Mvi);
        assert_eq!(instr.operands[0].kind, OperandKind::Name("A".into()));
    }

    #[test]
    fn literals_decode_all_radixes() {
        let lines = parse("ADI 0FFH\nADI 1010B\nADI 42");
        let ops: Vec<_> = lines
            .iter()
            .map(|l| l.instr.as_ref().unwrap().operands[0].kind.clone())
            .collect();
        assert_eq!(
            ops,
            vec![
                OperandKind::Number(0xFF),
                OperandKind::Number(10),
                OperandKind::Number(42)
            ]
        );
    }

    #[test]
    fn label_prefix_binds_to_the_line() {
        let lines = parse("LOOP: DCR B\n JNZ LOOP");
        assert_eq!(lines[0].label.as_ref().unwrap().name, "LOOP");
        assert_eq!(lines[0].instr.as_ref().unwrap().mnemonic, Mnemonic::Dcr);
        assert!(lines[1].label.is_none());
        assert_eq!(
            lines[1].instr.as_ref().unwrap().operands[0].kind,
            OperandKind::Name("LOOP".into())
        );
    }

    #[test]
    fn label_only_line_is_kept() {
        let lines = parse("START:\n HLT");
        assert_eq!(lines[0].label.as_ref().unwrap().name, "START");
        assert!(lines[0].instr.is_none());
        assert_eq!(lines[1].instr.as_ref().unwrap().mnemonic, Mnemonic::Hlt);
    }

    #[test]
    fn comments_and_blank_lines() {
        let lines = parse("; header\n\n  \nNOP ; trailing\n");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].comment.is_some());
        assert!(lines[0].instr.is_none());
        assert!(lines[1].comment.is_some());
        assert_eq!(lines[1].instr.as_ref().unwrap().mnemonic, Mnemonic::Nop);
    }

    #[test]
    fn rejects_unknown_mnemonics() {
        assert!(AsmParser::new("MOVE A, B").unwrap().parse().is_err());
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!(AsmParser::new("MVI A, @").is_err());
    }

    #[test]
    fn rejects_bad_literals() {
        assert!(AsmParser::new("ADI 0FGH").is_err());
        assert!(AsmParser::new("ADI 99999999999999999999").is_err());
    }

    #[test]
    fn rejects_missing_operand_after_comma() {
        assert!(AsmParser::new("MOV B,").unwrap().parse().is_err());
        assert!(AsmParser::new("MOV B,\nHLT").unwrap().parse().is_err());
    }

    #[test]
    fn rejects_operands_without_commas() {
        assert!(AsmParser::new("MOV B C").unwrap().parse().is_err());
    }
}
