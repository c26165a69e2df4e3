use crate::registers::Flags;
use crate::word::Word;

/// 8-bit register selector as encoded in instruction register fields.
///
/// `M` is not storage of its own: reads and writes through it go to memory
/// at the address held in HL.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reg {
    B,
    C,
    D,
    E,
    H,
    L,
    M,
    A,
}

impl Reg {
    /// Selector for a 3-bit register field. Bits above the field are masked off.
    pub fn from_bits(bits: u8) -> Reg {
        match bits & 0b111 {
            0 => Reg::B,
            1 => Reg::C,
            2 => Reg::D,
            3 => Reg::E,
            4 => Reg::H,
            5 => Reg::L,
            6 => Reg::M,
            _ => Reg::A,
        }
    }
}

/// 16-bit operand selector for the wide loads and pair arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pair {
    Bc,
    De,
    Hl,
    Sp,
}

impl Pair {
    /// Selector for a 2-bit pair field.
    pub fn from_bits(bits: u8) -> Pair {
        match bits & 0b11 {
            0 => Pair::Bc,
            1 => Pair::De,
            2 => Pair::Hl,
            _ => Pair::Sp,
        }
    }
}

/// PUSH/POP operand selector: the slot shared with SP holds the
/// accumulator-and-flags word instead.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StackPair {
    Bc,
    De,
    Hl,
    Psw,
}

impl StackPair {
    pub fn from_bits(bits: u8) -> StackPair {
        match bits & 0b11 {
            0 => StackPair::Bc,
            1 => StackPair::De,
            2 => StackPair::Hl,
            _ => StackPair::Psw,
        }
    }
}

/// Branch condition codes in encoding order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Condition {
    Nz,
    Z,
    Nc,
    C,
    Po,
    Pe,
    P,
    M,
}

impl Condition {
    /// Selector for a 3-bit condition field.
    pub fn from_bits(bits: u8) -> Condition {
        match bits & 0b111 {
            0 => Condition::Nz,
            1 => Condition::Z,
            2 => Condition::Nc,
            3 => Condition::C,
            4 => Condition::Po,
            5 => Condition::Pe,
            6 => Condition::P,
            _ => Condition::M,
        }
    }

    /// Field value for this condition, the inverse of [`Condition::from_bits`].
    pub fn bits(self) -> u8 {
        match self {
            Condition::Nz => 0,
            Condition::Z => 1,
            Condition::Nc => 2,
            Condition::C => 3,
            Condition::Po => 4,
            Condition::Pe => 5,
            Condition::P => 6,
            Condition::M => 7,
        }
    }

    /// Each condition tests exactly one flag.
    pub fn holds(self, flags: &Flags) -> bool {
        match self {
            Condition::Nz => !flags.zero,
            Condition::Z => flags.zero,
            Condition::Nc => !flags.carry,
            Condition::C => flags.carry,
            Condition::Po => !flags.parity,
            Condition::Pe => flags.parity,
            Condition::P => !flags.sign,
            Condition::M => flags.sign,
        }
    }
}

/// A fetched and decoded instruction, carrying the operands read from the
/// instruction stream.
///
/// Produced by [`crate::decode::next_operation`] and consumed exactly once by
/// [`crate::execute::apply`]. `Unsupported` keeps the raw opcode so the
/// processor can report it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operation {
    // Data transfer
    Mov { dst: Reg, src: Reg },
    Mvi { dst: Reg, value: u8 },
    Lxi { pair: Pair, value: Word },
    Lda(Word),
    Sta(Word),
    Lhld(Word),
    Shld(Word),
    Ldax(Pair),
    Stax(Pair),
    Xchg,
    Xthl,
    Sphl,
    Push(StackPair),
    Pop(StackPair),
    // Accumulator arithmetic and logic
    Add(Reg),
    Adc(Reg),
    Sub(Reg),
    Sbb(Reg),
    Ana(Reg),
    Xra(Reg),
    Ora(Reg),
    Cmp(Reg),
    Adi(u8),
    Aci(u8),
    Sui(u8),
    Sbi(u8),
    Ani(u8),
    Xri(u8),
    Ori(u8),
    Cpi(u8),
    Daa,
    // Byte and pair increment/decrement, pair addition
    Inr(Reg),
    Dcr(Reg),
    Inx(Pair),
    Dcx(Pair),
    Dad(Pair),
    // Rotates and flag toggles
    Rlc,
    Rrc,
    Ral,
    Rar,
    Cma,
    Cmc,
    Stc,
    // Control flow
    Jmp(Word),
    JmpIf(Condition, Word),
    Pchl,
    Call(Word),
    CallIf(Condition, Word),
    Ret,
    RetIf(Condition),
    Nop,
    Hlt,
    /// RST vectors, port I/O and interrupt toggles are outside the machine
    /// model; they decode to this variant and execute as a no-op.
    Unsupported(u8),
}
