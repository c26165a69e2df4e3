//! Instruction fetch and decode.
//!
//! Operands are read from the instruction stream as part of decoding, so the
//! program counter always ends up past the whole instruction. Decoding is
//! total: every byte maps to an [`Operation`], with the twelve bytes outside
//! the machine model mapping to [`Operation::Unsupported`].

use crate::memory::Memory;
use crate::operation::{Condition, Operation, Pair, Reg, StackPair};
use crate::registers::RegisterFile;
use crate::word::Word;

fn fetch_byte(regs: &mut RegisterFile, mem: &Memory) -> u8 {
    let byte = mem.read(regs.pc);
    regs.pc = regs.pc.increment().0;
    byte
}

fn fetch_word(regs: &mut RegisterFile, mem: &Memory) -> Word {
    let low = fetch_byte(regs, mem);
    let high = fetch_byte(regs, mem);
    Word::new(high, low)
}

/// Decode the instruction at the program counter, advancing it past the
/// opcode and any operand bytes.
pub fn next_operation(regs: &mut RegisterFile, mem: &Memory) -> Operation {
    let raw = fetch_byte(regs, mem);
    let opcode = match raw {
        // Unused opcodes behave as NOP.
        0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => 0x00,
        // Alternate encodings of JMP, RET and CALL.
        0xCB => 0xC3,
        0xD9 => 0xC9,
        0xDD | 0xED | 0xFD => 0xCD,
        _ => raw,
    };

    match opcode {
        0x00 => Operation::Nop,
        0x76 => Operation::Hlt,

        // Wide immediate loads and direct transfers
        op if op & 0xCF == 0x01 => Operation::Lxi {
            pair: Pair::from_bits(op >> 4),
            value: fetch_word(regs, mem),
        },
        0x22 => Operation::Shld(fetch_word(regs, mem)),
        0x2A => Operation::Lhld(fetch_word(regs, mem)),
        0x32 => Operation::Sta(fetch_word(regs, mem)),
        0x3A => Operation::Lda(fetch_word(regs, mem)),
        0x02 => Operation::Stax(Pair::Bc),
        0x12 => Operation::Stax(Pair::De),
        0x0A => Operation::Ldax(Pair::Bc),
        0x1A => Operation::Ldax(Pair::De),

        // Pair arithmetic
        op if op & 0xCF == 0x03 => Operation::Inx(Pair::from_bits(op >> 4)),
        op if op & 0xCF == 0x09 => Operation::Dad(Pair::from_bits(op >> 4)),
        op if op & 0xCF == 0x0B => Operation::Dcx(Pair::from_bits(op >> 4)),

        // Rotates, decimal adjust and flag toggles
        0x07 => Operation::Rlc,
        0x0F => Operation::Rrc,
        0x17 => Operation::Ral,
        0x1F => Operation::Rar,
        0x27 => Operation::Daa,
        0x2F => Operation::Cma,
        0x37 => Operation::Stc,
        0x3F => Operation::Cmc,

        // Byte increment/decrement and immediate load
        op if op & 0xC7 == 0x04 => Operation::Inr(Reg::from_bits(op >> 3)),
        op if op & 0xC7 == 0x05 => Operation::Dcr(Reg::from_bits(op >> 3)),
        op if op & 0xC7 == 0x06 => Operation::Mvi {
            dst: Reg::from_bits(op >> 3),
            value: fetch_byte(regs, mem),
        },

        // Register moves; 0x76 in the middle of the block is HLT, above.
        op @ 0x40..=0x7F => Operation::Mov {
            dst: Reg::from_bits(op >> 3),
            src: Reg::from_bits(op),
        },

        // Accumulator arithmetic and logic against a register
        op @ 0x80..=0xBF => {
            let reg = Reg::from_bits(op);
            match (op >> 3) & 0b111 {
                0 => Operation::Add(reg),
                1 => Operation::Adc(reg),
                2 => Operation::Sub(reg),
                3 => Operation::Sbb(reg),
                4 => Operation::Ana(reg),
                5 => Operation::Xra(reg),
                6 => Operation::Ora(reg),
                _ => Operation::Cmp(reg),
            }
        }

        // Jumps, calls and returns
        0xC3 => Operation::Jmp(fetch_word(regs, mem)),
        0xC9 => Operation::Ret,
        0xCD => Operation::Call(fetch_word(regs, mem)),
        0xE9 => Operation::Pchl,
        op if op & 0xC7 == 0xC2 => {
            Operation::JmpIf(Condition::from_bits(op >> 3), fetch_word(regs, mem))
        }
        op if op & 0xC7 == 0xC4 => {
            Operation::CallIf(Condition::from_bits(op >> 3), fetch_word(regs, mem))
        }
        op if op & 0xC7 == 0xC0 => Operation::RetIf(Condition::from_bits(op >> 3)),

        // Stack and pointer transfers
        op if op & 0xCF == 0xC1 => Operation::Pop(StackPair::from_bits(op >> 4)),
        op if op & 0xCF == 0xC5 => Operation::Push(StackPair::from_bits(op >> 4)),
        0xE3 => Operation::Xthl,
        0xEB => Operation::Xchg,
        0xF9 => Operation::Sphl,

        // Immediate accumulator arithmetic and logic
        op if op & 0xC7 == 0xC6 => {
            let value = fetch_byte(regs, mem);
            match (op >> 3) & 0b111 {
                0 => Operation::Adi(value),
                1 => Operation::Aci(value),
                2 => Operation::Sui(value),
                3 => Operation::Sbi(value),
                4 => Operation::Ani(value),
                5 => Operation::Xri(value),
                6 => Operation::Ori(value),
                _ => Operation::Cpi(value),
            }
        }

        // RST vectors, port I/O and interrupt toggles
        op => Operation::Unsupported(op),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_bytes(bytes: &[u8]) -> (Operation, u16) {
        let mut regs = RegisterFile::new();
        let mut mem = Memory::new();
        mem.load(Word::ZERO, bytes);
        let op = next_operation(&mut regs, &mem);
        (op, regs.pc.value())
    }

    #[test]
    fn moves_decode_register_fields() {
        assert_eq!(
            decode_bytes(&[0x41]),
            (
                Operation::Mov {
                    dst: Reg::B,
                    src: Reg::C
                },
                1
            )
        );
        assert_eq!(
            decode_bytes(&[0x7E]),
            (
                Operation::Mov {
                    dst: Reg::A,
                    src: Reg::M
                },
                1
            )
        );
        assert_eq!(decode_bytes(&[0x76]), (Operation::Hlt, 1));
    }

    #[test]
    fn immediates_advance_past_operands() {
        assert_eq!(
            decode_bytes(&[0x36, 0x5A]),
            (
                Operation::Mvi {
                    dst: Reg::M,
                    value: 0x5A
                },
                2
            )
        );
        assert_eq!(
            decode_bytes(&[0x31, 0xFE, 0xFF]),
            (
                Operation::Lxi {
                    pair: Pair::Sp,
                    value: Word::from(0xFFFE)
                },
                3
            )
        );
        assert_eq!(decode_bytes(&[0xFE, 0x0D]), (Operation::Cpi(0x0D), 2));
    }

    #[test]
    fn address_operands_are_little_endian() {
        assert_eq!(
            decode_bytes(&[0xC3, 0x06, 0x20]),
            (Operation::Jmp(Word::from(0x2006)), 3)
        );
        assert_eq!(
            decode_bytes(&[0x3A, 0x34, 0x12]),
            (Operation::Lda(Word::from(0x1234)), 3)
        );
    }

    #[test]
    fn arithmetic_block_decodes_all_families() {
        assert_eq!(decode_bytes(&[0x80]).0, Operation::Add(Reg::B));
        assert_eq!(decode_bytes(&[0x8F]).0, Operation::Adc(Reg::A));
        assert_eq!(decode_bytes(&[0x96]).0, Operation::Sub(Reg::M));
        assert_eq!(decode_bytes(&[0x9A]).0, Operation::Sbb(Reg::D));
        assert_eq!(decode_bytes(&[0xA1]).0, Operation::Ana(Reg::C));
        assert_eq!(decode_bytes(&[0xAB]).0, Operation::Xra(Reg::E));
        assert_eq!(decode_bytes(&[0xB4]).0, Operation::Ora(Reg::H));
        assert_eq!(decode_bytes(&[0xBD]).0, Operation::Cmp(Reg::L));
    }

    #[test]
    fn conditional_branches_decode_condition_fields() {
        assert_eq!(
            decode_bytes(&[0xC2, 0x06, 0x00]).0,
            Operation::JmpIf(Condition::Nz, Word::from(0x0006))
        );
        assert_eq!(
            decode_bytes(&[0xFA, 0x00, 0x10]).0,
            Operation::JmpIf(Condition::M, Word::from(0x1000))
        );
        assert_eq!(
            decode_bytes(&[0xDC, 0x00, 0x30]).0,
            Operation::CallIf(Condition::C, Word::from(0x3000))
        );
        assert_eq!(decode_bytes(&[0xE0]).0, Operation::RetIf(Condition::Po));
        assert_eq!(decode_bytes(&[0xF5]).0, Operation::Push(StackPair::Psw));
        assert_eq!(decode_bytes(&[0xD1]).0, Operation::Pop(StackPair::De));
    }

    #[test]
    fn alternate_encodings_decode_as_canonical() {
        assert_eq!(
            decode_bytes(&[0xCB, 0x21, 0x43]),
            decode_bytes(&[0xC3, 0x21, 0x43])
        );
        assert_eq!(decode_bytes(&[0xD9]), decode_bytes(&[0xC9]));
        for alias in [0xDD, 0xED, 0xFD] {
            assert_eq!(
                decode_bytes(&[alias, 0x00, 0x01]),
                decode_bytes(&[0xCD, 0x00, 0x01])
            );
        }
        for nop in [0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38] {
            assert_eq!(decode_bytes(&[nop]), (Operation::Nop, 1));
        }
    }

    #[test]
    fn decode_is_total_with_twelve_unsupported_bytes() {
        let mut unsupported = Vec::new();
        for byte in 0..=0xFFu16 {
            let byte = byte as u8;
            let (op, _) = decode_bytes(&[byte, 0x00, 0x00]);
            if let Operation::Unsupported(raw) = op {
                assert_eq!(raw, byte);
                unsupported.push(byte);
            }
        }
        assert_eq!(
            unsupported,
            vec![0xC7, 0xCF, 0xD3, 0xD7, 0xDB, 0xDF, 0xE7, 0xEF, 0xF3, 0xF7, 0xFB, 0xFF]
        );
    }

    #[test]
    fn unsupported_consumes_only_the_opcode() {
        let (op, pc) = decode_bytes(&[0xD3, 0x10]);
        assert_eq!(op, Operation::Unsupported(0xD3));
        assert_eq!(pc, 1);
    }
}
