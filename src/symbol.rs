use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use miette::Result;

use crate::error;
use crate::line::SourceLine;

// Symbol table of name -> 16-bit value, in insertion order
type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

lazy_static! {
    /// Fixed register encodings seeding every fresh symbol map. M, SP and
    /// PSW share slot 6; the operand position picks the right reading.
    static ref REGISTER_SYMBOLS: FxMap<String, u16> = {
        let mut map = IndexMap::with_hasher(FxBuildHasher::default());
        for (name, value) in [
            ("B", 0),
            ("C", 1),
            ("D", 2),
            ("E", 3),
            ("H", 4),
            ("L", 5),
            ("M", 6),
            ("SP", 6),
            ("PSW", 6),
            ("A", 7),
        ] {
            map.insert(name.to_string(), value);
        }
        map
    };
}

/// One flat namespace for register names and user labels, local to a single
/// assembly run. Registers are plain entries, so labels resolve through the
/// same lookup as registers do.
pub struct SymbolMap {
    entries: FxMap<String, u16>,
}

impl SymbolMap {
    pub fn new() -> Self {
        SymbolMap {
            entries: REGISTER_SYMBOLS.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.entries.get(name).copied()
    }

    /// User-defined labels, without the register seeds.
    pub fn labels(&self) -> impl Iterator<Item = (&str, u16)> {
        self.entries
            .iter()
            .skip(REGISTER_SYMBOLS.len())
            .map(|(name, value)| (name.as_str(), *value))
    }
}

impl Default for SymbolMap {
    fn default() -> Self {
        SymbolMap::new()
    }
}

/// Assembler pass 1: bind every label to the address of the instruction it
/// precedes. Addresses come from the fixed per-mnemonic encoding lengths, so
/// no operand is resolved here.
pub fn build_symbol_map(lines: &[SourceLine]) -> Result<SymbolMap> {
    let mut symbols = SymbolMap::new();
    let mut address: u16 = 0;
    for line in lines {
        if let Some(label) = &line.label {
            if symbols
                .entries
                .insert(label.name.clone(), address)
                .is_some()
            {
                return Err(error::asm_duplicate_label(label.span, &label.name));
            }
        }
        if let Some(instr) = &line.instr {
            address = address.wrapping_add(instr.mnemonic.encoded_len());
        }
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AsmParser;

    fn symbols_for(src: &str) -> SymbolMap {
        let lines = AsmParser::new(src).unwrap().parse().unwrap();
        build_symbol_map(&lines).unwrap()
    }

    #[test]
    fn register_seeds_are_present() {
        let symbols = SymbolMap::new();
        assert_eq!(symbols.get("B"), Some(0));
        assert_eq!(symbols.get("A"), Some(7));
        assert_eq!(symbols.get("M"), Some(6));
        assert_eq!(symbols.get("SP"), Some(6));
        assert_eq!(symbols.get("PSW"), Some(6));
        assert_eq!(symbols.get("LOOP"), None);
    }

    #[test]
    fn labels_bind_to_instruction_addresses() {
        let symbols = symbols_for(
            "START: MVI A, 1\n\
             LOOP: DCR A\n\
             JNZ LOOP\n\
             DONE: HLT",
        );
        assert_eq!(symbols.get("START"), Some(0));
        assert_eq!(symbols.get("LOOP"), Some(2));
        assert_eq!(symbols.get("DONE"), Some(6));
    }

    #[test]
    fn label_on_bare_line_takes_next_address() {
        let symbols = symbols_for("NOP\nEND:\n; comment only\nHLT");
        assert_eq!(symbols.get("END"), Some(1));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let lines = AsmParser::new("X: NOP\nX: HLT").unwrap().parse().unwrap();
        assert!(build_symbol_map(&lines).is_err());
    }

    #[test]
    fn labels_cannot_shadow_registers() {
        let lines = AsmParser::new("SP: NOP").unwrap().parse().unwrap();
        assert!(build_symbol_map(&lines).is_err());
    }

    #[test]
    fn labels_iterator_skips_register_seeds() {
        let symbols = symbols_for("X: NOP\nY: HLT");
        let labels: Vec<_> = symbols.labels().collect();
        assert_eq!(labels, vec![("X", 0), ("Y", 1)]);
    }
}
