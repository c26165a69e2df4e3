use std::fmt;

/// 16-bit machine word stored as two 8-bit limbs.
///
/// The numeric value is `high * 256 + low`. Arithmetic always wraps modulo
/// 65536; overflow is reported through the returned carry flag, never as an
/// error.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Word {
    pub high: u8,
    pub low: u8,
}

impl Word {
    pub const ZERO: Word = Word { high: 0, low: 0 };

    pub fn new(high: u8, low: u8) -> Self {
        Word { high, low }
    }

    pub fn value(self) -> u16 {
        u16::from(self.high) << 8 | u16::from(self.low)
    }

    /// Wrapping sum. Carry is set iff the unmasked sum exceeds 0xFFFF.
    pub fn add(self, rhs: Word) -> (Word, bool) {
        let sum = u32::from(self.value()) + u32::from(rhs.value());
        (Word::from(sum as u16), sum > 0xFFFF)
    }

    pub fn increment(self) -> (Word, bool) {
        self.add(Word::from(1))
    }

    /// Wrapping decrement. Carry reports the borrow out of bit 15.
    pub fn decrement(self) -> (Word, bool) {
        let value = self.value();
        (Word::from(value.wrapping_sub(1)), value == 0)
    }

    /// Wrapping displacement, for addressing neighbouring memory cells.
    pub fn offset(self, amount: u16) -> Word {
        Word::from(self.value().wrapping_add(amount))
    }
}

impl From<u16> for Word {
    fn from(value: u16) -> Self {
        Word {
            high: (value >> 8) as u8,
            low: value as u8,
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.value())
    }
}
