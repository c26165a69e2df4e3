use miette::{Report, Result};

use crate::codegen;
use crate::line::SourceLine;
use crate::parser::AsmParser;
use crate::symbol::{self, SymbolMap};

/// Assemble source text into a byte image based at address 0.
///
/// Three stages: line parsing, pass 1 label binding, pass 2 encoding. The
/// first error aborts the run; no partial image is ever returned.
pub fn assemble(src: &str) -> Result<Vec<u8>> {
    assemble_with_symbols(src).map(|(image, _)| image)
}

/// Like [`assemble`], also handing back the symbol map for hosts that want
/// to report label addresses.
pub fn assemble_with_symbols(src: &str) -> Result<(Vec<u8>, SymbolMap)> {
    let lines = parse_lines(src)?;
    let symbols = symbol::build_symbol_map(&lines).map_err(|e| attach(e, src))?;
    let image = codegen::generate(&lines, &symbols).map_err(|e| attach(e, src))?;
    Ok((image, symbols))
}

/// Parse without assembling, for syntax-only checks.
pub fn parse_lines(src: &str) -> Result<Vec<SourceLine>> {
    let parser = AsmParser::new(src).map_err(|e| attach(e, src))?;
    parser.parse().map_err(|e| attach(e, src))
}

/// Diagnostics carry spans only; the source text is attached once, here.
fn attach(report: Report, src: &str) -> Report {
    report.with_source_code(src.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_the_fibonacci_program() {
        let src = "\
        START:  MVI A, 1\n\
                MVI B, 1\n\
                MVI D, 5\n\
        LOOP:   MOV C, A\n\
                ADD B\n\
                MOV B, C\n\
                DCR D\n\
                JNZ LOOP\n\
                PUSH PSW\n\
                HLT\n";
        let image = assemble(src).unwrap();
        assert_eq!(
            image,
            vec![
                0x3E, 0x01, // MVI A,1
                0x06, 0x01, // MVI B,1
                0x16, 0x05, // MVI D,5
                0x4F, // MOV C,A
                0x80, // ADD B
                0x41, // MOV B,C
                0x15, // DCR D
                0xC2, 0x06, 0x00, // JNZ LOOP
                0xF5, // PUSH PSW
                0x76, // HLT
            ]
        );
    }

    #[test]
    fn errors_carry_the_source_text() {
        let err = assemble("MVI A, 999").unwrap_err();
        let rendered = format!("{err:?}");
        assert!(rendered.contains("999"));
    }

    #[test]
    fn symbol_map_is_returned_alongside_the_image() {
        let (image, symbols) = assemble_with_symbols("NOP\nSPIN: JMP SPIN").unwrap();
        assert_eq!(image, vec![0x00, 0xC3, 0x01, 0x00]);
        assert_eq!(symbols.get("SPIN"), Some(1));
    }

    #[test]
    fn empty_source_assembles_to_an_empty_image() {
        assert_eq!(assemble("").unwrap(), Vec::<u8>::new());
        assert_eq!(assemble("\n; nothing\n").unwrap(), Vec::<u8>::new());
    }
}
