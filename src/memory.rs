use crate::word::Word;

pub const MEMORY_SIZE: usize = 0x10000;

/// Flat 64KB of byte-addressable memory.
///
/// Boxed so the machine stays cheap to move around. Addresses are [`Word`]s,
/// so every access is in range by construction and wraps at the top of the
/// address space.
pub struct Memory {
    cells: Box<[u8; MEMORY_SIZE]>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            cells: Box::new([0; MEMORY_SIZE]),
        }
    }

    pub fn read(&self, addr: Word) -> u8 {
        self.cells[addr.value() as usize]
    }

    pub fn write(&mut self, addr: Word, value: u8) {
        self.cells[addr.value() as usize] = value;
    }

    /// Read a little-endian word: low byte at `addr`, high byte after it.
    pub fn read_word(&self, addr: Word) -> Word {
        Word::new(self.read(addr.offset(1)), self.read(addr))
    }

    pub fn write_word(&mut self, addr: Word, value: Word) {
        self.write(addr, value.low);
        self.write(addr.offset(1), value.high);
    }

    /// Copy a program image into memory starting at `origin`.
    pub fn load(&mut self, origin: Word, image: &[u8]) {
        let mut addr = origin;
        for &byte in image {
            self.write(addr, byte);
            addr = addr.offset(1);
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let mem = Memory::new();
        assert_eq!(mem.read(Word::from(0x0000)), 0);
        assert_eq!(mem.read(Word::from(0xFFFF)), 0);
    }

    #[test]
    fn word_access_is_little_endian() {
        let mut mem = Memory::new();
        mem.write_word(Word::from(0x2000), Word::from(0x1234));
        assert_eq!(mem.read(Word::from(0x2000)), 0x34);
        assert_eq!(mem.read(Word::from(0x2001)), 0x12);
        assert_eq!(mem.read_word(Word::from(0x2000)).value(), 0x1234);
    }

    #[test]
    fn load_places_image_at_origin() {
        let mut mem = Memory::new();
        mem.load(Word::from(0x0100), &[0xAA, 0xBB, 0xCC]);
        assert_eq!(mem.read(Word::from(0x0100)), 0xAA);
        assert_eq!(mem.read(Word::from(0x0102)), 0xCC);
    }

    #[test]
    fn load_wraps_at_address_top() {
        let mut mem = Memory::new();
        mem.load(Word::from(0xFFFF), &[0x11, 0x22]);
        assert_eq!(mem.read(Word::from(0xFFFF)), 0x11);
        assert_eq!(mem.read(Word::from(0x0000)), 0x22);
    }
}
