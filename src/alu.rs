//! Pure 8-bit arithmetic and logic.
//!
//! Every function returns the masked result together with the full flag set
//! it defines; callers write back only the flags their instruction family
//! actually updates.

use crate::registers::Flags;

/// Value and flags produced by one ALU operation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AluResult {
    pub value: u8,
    pub flags: Flags,
}

/// Zero, sign and parity of a result byte. Carry and aux start clear.
fn szp(value: u8) -> Flags {
    Flags {
        zero: value == 0,
        sign: value & 0x80 != 0,
        parity: value.count_ones() % 2 == 0,
        ..Flags::default()
    }
}

pub fn add(a: u8, b: u8) -> AluResult {
    adc(a, b, false)
}

pub fn adc(a: u8, b: u8, carry_in: bool) -> AluResult {
    let sum = u16::from(a) + u16::from(b) + u16::from(carry_in);
    let value = sum as u8;
    AluResult {
        value,
        flags: Flags {
            carry: sum > 0xFF,
            aux: (a & 0x0F) + (b & 0x0F) + u8::from(carry_in) > 0x0F,
            ..szp(value)
        },
    }
}

pub fn sub(a: u8, b: u8) -> AluResult {
    sbb(a, b, false)
}

/// Subtract with borrow. Carry reports the borrow out; aux is left clear
/// for the whole subtraction family.
pub fn sbb(a: u8, b: u8, borrow_in: bool) -> AluResult {
    let diff = i16::from(a) - i16::from(b) - i16::from(borrow_in);
    let value = diff as u8;
    AluResult {
        value,
        flags: Flags {
            carry: diff < 0,
            ..szp(value)
        },
    }
}

/// Compare is a subtraction whose value the caller throws away.
pub fn cmp(a: u8, b: u8) -> AluResult {
    sub(a, b)
}

pub fn and(a: u8, b: u8) -> AluResult {
    logical(a & b)
}

pub fn or(a: u8, b: u8) -> AluResult {
    logical(a | b)
}

pub fn xor(a: u8, b: u8) -> AluResult {
    logical(a ^ b)
}

pub fn complement(a: u8) -> AluResult {
    logical(!a)
}

/// Logic results clear carry and aux.
fn logical(value: u8) -> AluResult {
    AluResult {
        value,
        flags: szp(value),
    }
}

pub fn increment(a: u8) -> AluResult {
    add(a, 1)
}

pub fn decrement(a: u8) -> AluResult {
    sub(a, 1)
}

/// Rotate left; bit 7 moves to both bit 0 and the carry.
pub fn rotate_left(a: u8) -> AluResult {
    let bit7 = a & 0x80 != 0;
    carry_only(a << 1 | u8::from(bit7), bit7)
}

/// Rotate right; bit 0 moves to both bit 7 and the carry.
pub fn rotate_right(a: u8) -> AluResult {
    let bit0 = a & 0x01 != 0;
    carry_only(a >> 1 | u8::from(bit0) << 7, bit0)
}

/// Nine-bit rotate left through the carry flag.
pub fn rotate_left_carry(a: u8, carry_in: bool) -> AluResult {
    carry_only(a << 1 | u8::from(carry_in), a & 0x80 != 0)
}

/// Nine-bit rotate right through the carry flag.
pub fn rotate_right_carry(a: u8, carry_in: bool) -> AluResult {
    carry_only(a >> 1 | u8::from(carry_in) << 7, a & 0x01 != 0)
}

/// Only the carry is meaningful after a rotate.
fn carry_only(value: u8, carry: bool) -> AluResult {
    AluResult {
        value,
        flags: Flags {
            carry,
            ..Flags::default()
        },
    }
}

/// Decimal-adjust the accumulator after a binary addition of packed BCD
/// operands.
///
/// Two correction steps: add 6 when the low nibble exceeds 9 or aux came in
/// set, then add 0x60 when the high nibble of that intermediate exceeds 9 or
/// carry came in. Carry out is sticky: set on entry, it stays set.
pub fn decimal_adjust(a: u8, carry_in: bool, aux_in: bool) -> AluResult {
    let fix_low = (a & 0x0F) > 9 || aux_in;
    let step = u16::from(a) + if fix_low { 0x06 } else { 0 };
    let fix_high = (step >> 4) & 0x0F > 9 || carry_in;
    let adjusted = step + if fix_high { 0x60 } else { 0 };
    let value = adjusted as u8;
    AluResult {
        value,
        flags: Flags {
            carry: carry_in || adjusted > 0xFF,
            aux: fix_low && (a & 0x0F) + 0x06 > 0x0F,
            ..szp(value)
        },
    }
}
