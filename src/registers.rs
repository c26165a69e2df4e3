use crate::memory::Memory;
use crate::operation::{Pair, Reg, StackPair};
use crate::word::Word;

/// Condition flags written by the arithmetic and logic instructions.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Flags {
    pub carry: bool,
    pub zero: bool,
    pub sign: bool,
    /// Set when the result has an even number of one bits.
    pub parity: bool,
    /// Carry out of bit 3, consumed only by decimal adjust.
    pub aux: bool,
}

impl Flags {
    /// Pack into the processor status word layout: `S Z 0 A 0 P 1 C`.
    ///
    /// Bit 1 always reads as set; bits 3 and 5 always read as clear.
    pub fn to_byte(self) -> u8 {
        let mut byte = 0x02;
        if self.sign {
            byte |= 0x80;
        }
        if self.zero {
            byte |= 0x40;
        }
        if self.aux {
            byte |= 0x10;
        }
        if self.parity {
            byte |= 0x04;
        }
        if self.carry {
            byte |= 0x01;
        }
        byte
    }

    pub fn from_byte(byte: u8) -> Flags {
        Flags {
            sign: byte & 0x80 != 0,
            zero: byte & 0x40 != 0,
            aux: byte & 0x10 != 0,
            parity: byte & 0x04 != 0,
            carry: byte & 0x01 != 0,
        }
    }
}

/// The register file: seven byte registers, the flags, and the two pointer
/// words. Everything resets to zero, so execution starts at address 0.
#[derive(Default)]
pub struct RegisterFile {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub flags: Flags,
    pub pc: Word,
    pub sp: Word,
    pub halted: bool,
}

impl RegisterFile {
    pub fn new() -> Self {
        RegisterFile::default()
    }

    /// Read a register. `M` reads memory at the address in HL.
    pub fn get(&self, reg: Reg, mem: &Memory) -> u8 {
        match reg {
            Reg::B => self.b,
            Reg::C => self.c,
            Reg::D => self.d,
            Reg::E => self.e,
            Reg::H => self.h,
            Reg::L => self.l,
            Reg::M => mem.read(self.pair(Pair::Hl)),
            Reg::A => self.a,
        }
    }

    /// Write a register. `M` writes memory at the address in HL.
    pub fn set(&mut self, reg: Reg, value: u8, mem: &mut Memory) {
        match reg {
            Reg::B => self.b = value,
            Reg::C => self.c = value,
            Reg::D => self.d = value,
            Reg::E => self.e = value,
            Reg::H => self.h = value,
            Reg::L => self.l = value,
            Reg::M => mem.write(self.pair(Pair::Hl), value),
            Reg::A => self.a = value,
        }
    }

    /// 16-bit view over a register pair, or the stack pointer itself.
    pub fn pair(&self, pair: Pair) -> Word {
        match pair {
            Pair::Bc => Word::new(self.b, self.c),
            Pair::De => Word::new(self.d, self.e),
            Pair::Hl => Word::new(self.h, self.l),
            Pair::Sp => self.sp,
        }
    }

    pub fn set_pair(&mut self, pair: Pair, value: Word) {
        match pair {
            Pair::Bc => {
                self.b = value.high;
                self.c = value.low;
            }
            Pair::De => {
                self.d = value.high;
                self.e = value.low;
            }
            Pair::Hl => {
                self.h = value.high;
                self.l = value.low;
            }
            Pair::Sp => self.sp = value,
        }
    }

    /// PUSH/POP view: `PSW` packs the accumulator over the flag byte.
    pub fn stack_pair(&self, pair: StackPair) -> Word {
        match pair {
            StackPair::Bc => Word::new(self.b, self.c),
            StackPair::De => Word::new(self.d, self.e),
            StackPair::Hl => Word::new(self.h, self.l),
            StackPair::Psw => Word::new(self.a, self.flags.to_byte()),
        }
    }

    pub fn set_stack_pair(&mut self, pair: StackPair, value: Word) {
        match pair {
            StackPair::Bc => {
                self.b = value.high;
                self.c = value.low;
            }
            StackPair::De => {
                self.d = value.high;
                self.e = value.low;
            }
            StackPair::Hl => {
                self.h = value.high;
                self.l = value.low;
            }
            StackPair::Psw => {
                self.a = value.high;
                self.flags = Flags::from_byte(value.low);
            }
        }
    }
}
