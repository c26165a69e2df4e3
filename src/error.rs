//! Diagnostic constructors for the assembler.
//!
//! Source text is attached once by [`crate::assemble`], so the factories
//! here deal only in spans.

use std::num::ParseIntError;

use miette::{miette, LabeledSpan, Report, Severity};

use crate::line::Mnemonic;
use crate::span::Span;

// Lexer errors

pub fn lex_unknown(span: Span) -> Report {
    miette!(
        severity = Severity::Error,
        code = "lex::unknown",
        help = "only labels, mnemonics, registers, numbers, commas and ; comments are valid",
        labels = vec![LabeledSpan::at(span, "unknown token")],
        "Encountered an unknown token",
    )
}

pub fn lex_invalid_lit(span: Span, e: ParseIntError) -> Report {
    miette!(
        severity = Severity::Error,
        code = "lex::bad_lit",
        help = "literals are decimal by default; use an H suffix for hex or a B suffix for binary",
        labels = vec![LabeledSpan::at(span, "invalid literal")],
        "Encountered an invalid numeric literal: {e}",
    )
}

// Parser errors

pub fn parse_unknown_mnemonic(span: Span, name: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::mnemonic",
        help = "check the mnemonic against the 8080 instruction set",
        labels = vec![LabeledSpan::at(span, "not a mnemonic")],
        "Unknown mnemonic `{name}`",
    )
}

pub fn parse_unexpected(span: Span, expected: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::unexpected_token",
        help = "check the operands for this instruction",
        labels = vec![LabeledSpan::at(span, "unexpected token")],
        "Expected {expected}",
    )
}

pub fn parse_trailing(span: Span) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::end_of_line",
        help = "operands are separated by commas; anything else ends the statement",
        labels = vec![LabeledSpan::at(span, "unexpected token")],
        "Expected end of line",
    )
}

// Assembler errors

pub fn asm_duplicate_label(span: Span, name: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::duplicate_label",
        help = "labels may be defined only once per file",
        labels = vec![LabeledSpan::at(span, "redefined here")],
        "Duplicate label `{name}`",
    )
}

pub fn asm_operand_count(span: Span, mnemonic: Mnemonic, given: usize) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::operand_count",
        labels = vec![LabeledSpan::at(span, "wrong operand count")],
        "{mnemonic} expects {} operand(s), found {given}",
        mnemonic.arity(),
    )
}

pub fn asm_undefined(span: Span, name: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::undefined",
        help = "operands must be registers, numbers or labels defined in this file",
        labels = vec![LabeledSpan::at(span, "not defined")],
        "Undefined name `{name}`",
    )
}

pub fn asm_register_range(span: Span, value: u32) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::register_range",
        help = "byte registers are B, C, D, E, H, L, M and A, encoded as 0 to 7",
        labels = vec![LabeledSpan::at(span, "not a register")],
        "Value {value} is not a byte register",
    )
}

pub fn asm_pair_range(span: Span, value: u32) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::pair_range",
        help = "register pairs are B, D, H and SP or PSW",
        labels = vec![LabeledSpan::at(span, "not a register pair")],
        "Value {value} is not a register pair",
    )
}

pub fn asm_index_pair_range(span: Span, value: u32) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::index_pair",
        help = "LDAX and STAX address through the B and D pairs only",
        labels = vec![LabeledSpan::at(span, "not addressable")],
        "Value {value} is not an addressing pair",
    )
}

pub fn asm_byte_range(span: Span, value: u32) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::byte_range",
        help = "immediate bytes range from 0 to 255",
        labels = vec![LabeledSpan::at(span, "out of range")],
        "Value {value} does not fit in a byte",
    )
}

pub fn asm_word_range(span: Span, value: u32) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::word_range",
        help = "addresses and wide immediates range from 0 to 65,535",
        labels = vec![LabeledSpan::at(span, "out of range")],
        "Value {value} does not fit in a word",
    )
}

pub fn asm_mov_both_memory(span: Span) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::mov_memory",
        help = "the memory-to-memory encoding is taken by HLT; move through a register instead",
        labels = vec![LabeledSpan::at(span, "no such encoding")],
        "MOV cannot take M for both operands",
    )
}
