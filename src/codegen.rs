//! Assembler pass 2: encoding against the finished symbol map.
//!
//! Operands resolve through one path whether they are register names,
//! labels or literals; each role then validates the resolved value. The
//! emitted bytes are the exact inverse of the decoder.

use miette::Result;

use crate::error;
use crate::line::{Instr, Mnemonic, Operand, OperandKind, SourceLine};
use crate::symbol::SymbolMap;

/// Encode every parsed line into one contiguous image based at address 0.
pub fn generate(lines: &[SourceLine], symbols: &SymbolMap) -> Result<Vec<u8>> {
    let mut image = Vec::new();
    for line in lines {
        if let Some(instr) = &line.instr {
            encode(instr, symbols, &mut image)?;
        }
    }
    Ok(image)
}

fn encode(instr: &Instr, symbols: &SymbolMap, out: &mut Vec<u8>) -> Result<()> {
    use Mnemonic::*;
    match instr.mnemonic {
        Mov => {
            let [dst, src] = operands(instr)?;
            let dst = register(dst, symbols)?;
            let src = register(src, symbols)?;
            // Both fields as M would collide with the HLT encoding.
            if dst == 6 && src == 6 {
                return Err(error::asm_mov_both_memory(instr.span));
            }
            out.push(0x40 | dst << 3 | src);
        }
        Mvi => {
            let [dst, value] = operands(instr)?;
            let dst = register(dst, symbols)?;
            let value = byte_value(value, symbols)?;
            out.extend([0x06 | dst << 3, value]);
        }
        Lxi => {
            let [pair, value] = operands(instr)?;
            let pair = pair_index(pair, symbols)?;
            let value = word_value(value, symbols)?;
            out.push(0x01 | pair << 4);
            push_word(out, value);
        }
        Lda => wide(instr, symbols, out, 0x3A)?,
        Sta => wide(instr, symbols, out, 0x32)?,
        Lhld => wide(instr, symbols, out, 0x2A)?,
        Shld => wide(instr, symbols, out, 0x22)?,
        Ldax => {
            let [pair] = operands(instr)?;
            out.push(0x0A | index_pair(pair, symbols)? << 4);
        }
        Stax => {
            let [pair] = operands(instr)?;
            out.push(0x02 | index_pair(pair, symbols)? << 4);
        }
        Xchg => nullary(instr, out, 0xEB)?,
        Xthl => nullary(instr, out, 0xE3)?,
        Sphl => nullary(instr, out, 0xF9)?,
        Push => {
            let [pair] = operands(instr)?;
            out.push(0xC5 | pair_index(pair, symbols)? << 4);
        }
        Pop => {
            let [pair] = operands(instr)?;
            out.push(0xC1 | pair_index(pair, symbols)? << 4);
        }
        Add => alu_reg(instr, symbols, out, 0x80)?,
        Adc => alu_reg(instr, symbols, out, 0x88)?,
        Sub => alu_reg(instr, symbols, out, 0x90)?,
        Sbb => alu_reg(instr, symbols, out, 0x98)?,
        Ana => alu_reg(instr, symbols, out, 0xA0)?,
        Xra => alu_reg(instr, symbols, out, 0xA8)?,
        Ora => alu_reg(instr, symbols, out, 0xB0)?,
        Cmp => alu_reg(instr, symbols, out, 0xB8)?,
        Adi => alu_imm(instr, symbols, out, 0xC6)?,
        Aci => alu_imm(instr, symbols, out, 0xCE)?,
        Sui => alu_imm(instr, symbols, out, 0xD6)?,
        Sbi => alu_imm(instr, symbols, out, 0xDE)?,
        Ani => alu_imm(instr, symbols, out, 0xE6)?,
        Xri => alu_imm(instr, symbols, out, 0xEE)?,
        Ori => alu_imm(instr, symbols, out, 0xF6)?,
        Cpi => alu_imm(instr, symbols, out, 0xFE)?,
        Inr => {
            let [reg] = operands(instr)?;
            out.push(0x04 | register(reg, symbols)? << 3);
        }
        Dcr => {
            let [reg] = operands(instr)?;
            out.push(0x05 | register(reg, symbols)? << 3);
        }
        Inx => {
            let [pair] = operands(instr)?;
            out.push(0x03 | pair_index(pair, symbols)? << 4);
        }
        Dcx => {
            let [pair] = operands(instr)?;
            out.push(0x0B | pair_index(pair, symbols)? << 4);
        }
        Dad => {
            let [pair] = operands(instr)?;
            out.push(0x09 | pair_index(pair, symbols)? << 4);
        }
        Daa => nullary(instr, out, 0x27)?,
        Rlc => nullary(instr, out, 0x07)?,
        Rrc => nullary(instr, out, 0x0F)?,
        Ral => nullary(instr, out, 0x17)?,
        Rar => nullary(instr, out, 0x1F)?,
        Cma => nullary(instr, out, 0x2F)?,
        Cmc => nullary(instr, out, 0x3F)?,
        Stc => nullary(instr, out, 0x37)?,
        Jmp => wide(instr, symbols, out, 0xC3)?,
        JmpIf(cond) => wide(instr, symbols, out, 0xC2 | cond.bits() << 3)?,
        Pchl => nullary(instr, out, 0xE9)?,
        Call => wide(instr, symbols, out, 0xCD)?,
        CallIf(cond) => wide(instr, symbols, out, 0xC4 | cond.bits() << 3)?,
        Ret => nullary(instr, out, 0xC9)?,
        RetIf(cond) => nullary(instr, out, 0xC0 | cond.bits() << 3)?,
        Nop => nullary(instr, out, 0x00)?,
        Hlt => nullary(instr, out, 0x76)?,
    }
    Ok(())
}

/// Check the operand count and hand back exactly `N` operands.
fn operands<const N: usize>(instr: &Instr) -> Result<[&Operand; N]> {
    if instr.operands.len() != N {
        return Err(error::asm_operand_count(
            instr.span,
            instr.mnemonic,
            instr.operands.len(),
        ));
    }
    Ok(std::array::from_fn(|i| &instr.operands[i]))
}

/// Resolve a name through the symbol map or take a literal as-is.
fn resolve(operand: &Operand, symbols: &SymbolMap) -> Result<u32> {
    match &operand.kind {
        OperandKind::Number(value) => Ok(*value),
        OperandKind::Name(name) => symbols
            .get(name)
            .map(u32::from)
            .ok_or_else(|| error::asm_undefined(operand.span, name)),
    }
}

fn register(operand: &Operand, symbols: &SymbolMap) -> Result<u8> {
    let value = resolve(operand, symbols)?;
    if value > 7 {
        return Err(error::asm_register_range(operand.span, value));
    }
    Ok(value as u8)
}

/// Pair operands resolve to even register values and halve down to the
/// 2-bit field.
fn pair_index(operand: &Operand, symbols: &SymbolMap) -> Result<u8> {
    let value = resolve(operand, symbols)?;
    if value % 2 != 0 || value > 6 {
        return Err(error::asm_pair_range(operand.span, value));
    }
    Ok((value / 2) as u8)
}

/// LDAX/STAX reach only the B and D pairs.
fn index_pair(operand: &Operand, symbols: &SymbolMap) -> Result<u8> {
    let value = resolve(operand, symbols)?;
    if value != 0 && value != 2 {
        return Err(error::asm_index_pair_range(operand.span, value));
    }
    Ok((value / 2) as u8)
}

fn byte_value(operand: &Operand, symbols: &SymbolMap) -> Result<u8> {
    let value = resolve(operand, symbols)?;
    if value > 0xFF {
        return Err(error::asm_byte_range(operand.span, value));
    }
    Ok(value as u8)
}

fn word_value(operand: &Operand, symbols: &SymbolMap) -> Result<u16> {
    let value = resolve(operand, symbols)?;
    if value > 0xFFFF {
        return Err(error::asm_word_range(operand.span, value));
    }
    Ok(value as u16)
}

fn push_word(out: &mut Vec<u8>, value: u16) {
    out.extend([value as u8, (value >> 8) as u8]);
}

fn nullary(instr: &Instr, out: &mut Vec<u8>, opcode: u8) -> Result<()> {
    operands::<0>(instr)?;
    out.push(opcode);
    Ok(())
}

/// Opcode followed by a little-endian word operand.
fn wide(instr: &Instr, symbols: &SymbolMap, out: &mut Vec<u8>, opcode: u8) -> Result<()> {
    let [addr] = operands(instr)?;
    let value = word_value(addr, symbols)?;
    out.push(opcode);
    push_word(out, value);
    Ok(())
}

fn alu_reg(instr: &Instr, symbols: &SymbolMap, out: &mut Vec<u8>, base: u8) -> Result<()> {
    let [reg] = operands(instr)?;
    out.push(base | register(reg, symbols)?);
    Ok(())
}

fn alu_imm(instr: &Instr, symbols: &SymbolMap, out: &mut Vec<u8>, opcode: u8) -> Result<()> {
    let [value] = operands(instr)?;
    let value = byte_value(value, symbols)?;
    out.extend([opcode, value]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AsmParser;
    use crate::symbol::build_symbol_map;

    fn assemble(src: &str) -> Result<Vec<u8>> {
        let lines = AsmParser::new(src)?.parse()?;
        let symbols = build_symbol_map(&lines)?;
        generate(&lines, &symbols)
    }

    #[test]
    fn encodes_register_fields() {
        assert_eq!(assemble("MOV B, C").unwrap(), vec![0x41]);
        assert_eq!(assemble("MOV M, A").unwrap(), vec![0x77]);
        assert_eq!(assemble("ADD M").unwrap(), vec![0x86]);
        assert_eq!(assemble("CMP A").unwrap(), vec![0xBF]);
        assert_eq!(assemble("INR A").unwrap(), vec![0x3C]);
        assert_eq!(assemble("DCR M").unwrap(), vec![0x35]);
    }

    #[test]
    fn encodes_pair_fields_from_even_registers() {
        assert_eq!(assemble("LXI SP, 0FFFEH").unwrap(), vec![0x31, 0xFE, 0xFF]);
        assert_eq!(assemble("LXI H, 1234H").unwrap(), vec![0x21, 0x34, 0x12]);
        assert_eq!(assemble("INX D").unwrap(), vec![0x13]);
        assert_eq!(assemble("DAD B").unwrap(), vec![0x09]);
        assert_eq!(assemble("PUSH PSW").unwrap(), vec![0xF5]);
        assert_eq!(assemble("POP H").unwrap(), vec![0xE1]);
        assert_eq!(assemble("LDAX D").unwrap(), vec![0x1A]);
        assert_eq!(assemble("STAX B").unwrap(), vec![0x02]);
    }

    #[test]
    fn encodes_immediates_and_addresses_little_endian() {
        assert_eq!(assemble("MVI M, 42H").unwrap(), vec![0x36, 0x42]);
        assert_eq!(assemble("CPI 0DH").unwrap(), vec![0xFE, 0x0D]);
        assert_eq!(assemble("STA 2010H").unwrap(), vec![0x32, 0x10, 0x20]);
        assert_eq!(assemble("JMP 3").unwrap(), vec![0xC3, 0x03, 0x00]);
    }

    #[test]
    fn encodes_conditional_families() {
        assert_eq!(assemble("JNZ 6").unwrap(), vec![0xC2, 0x06, 0x00]);
        assert_eq!(assemble("JM 6").unwrap(), vec![0xFA, 0x06, 0x00]);
        assert_eq!(assemble("CC 6").unwrap(), vec![0xDC, 0x06, 0x00]);
        assert_eq!(assemble("RPE").unwrap(), vec![0xE8]);
        assert_eq!(assemble("RET").unwrap(), vec![0xC9]);
    }

    #[test]
    fn forward_reference_binds_past_the_branch() {
        // The 3-byte branch pushes the label to address 3.
        let image = assemble("JNZ LOOP\nLOOP: HLT").unwrap();
        assert_eq!(image, vec![0xC2, 0x03, 0x00, 0x76]);
    }

    #[test]
    fn labels_resolve_forward_and_backward() {
        let image = assemble(
            "START: NOP\n\
             JMP END\n\
             END: HLT",
        )
        .unwrap();
        assert_eq!(image, vec![0x00, 0xC3, 0x04, 0x00, 0x76]);
    }

    #[test]
    fn labels_can_be_immediates() {
        // A label used where a byte is expected works when it fits.
        let image = assemble("MVI A, TWO\nTWO: NOP\nNOP").unwrap();
        assert_eq!(image, vec![0x3E, 0x02, 0x00, 0x00]);
    }

    #[test]
    fn rejects_memory_to_memory_move() {
        assert!(assemble("MOV M, M").is_err());
        // Equivalent numeric operands hit the same check.
        assert!(assemble("MOV 6, 6").is_err());
    }

    #[test]
    fn rejects_odd_or_oversized_pair_operands() {
        assert!(assemble("LXI C, 0").is_err());
        assert!(assemble("DAD A").is_err());
        assert!(assemble("LDAX H").is_err());
        assert!(assemble("STAX SP").is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(assemble("MVI A, 256").is_err());
        assert!(assemble("ADD 8").is_err());
        assert!(assemble("JMP 65536").is_err());
        assert!(assemble("ADI 100H").is_err());
    }

    #[test]
    fn rejects_undefined_names_and_bad_arity() {
        assert!(assemble("JMP NOWHERE").is_err());
        assert!(assemble("MOV B").is_err());
        assert!(assemble("NOP 1").is_err());
        assert!(assemble("LXI B").is_err());
    }

    #[test]
    fn numeric_register_operands_are_allowed() {
        assert_eq!(assemble("MOV 0, 7").unwrap(), vec![0x47]);
        assert_eq!(assemble("ADD 6").unwrap(), vec![0x86]);
    }
}
