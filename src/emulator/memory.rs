//! The 4KB address space, with the built-in font and the program region.

use crate::error::{Error, Result};

pub const MEM_SIZE: usize = 4096;

/// Mask that folds any computed address back into the address space.
pub const ADDR_MASK: u16 = (MEM_SIZE - 1) as u16;

/// Where programs are loaded, and where execution starts.
pub const PROGRAM_START: u16 = 0x200;

/// The largest program that fits between `PROGRAM_START` and the end of memory.
pub const MAX_ROM_SIZE: usize = MEM_SIZE - PROGRAM_START as usize;

pub const FONT_START: u16 = 0x50;

/// Bytes per font glyph.
pub const GLYPH_SIZE: u16 = 5;

const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Byte-addressable memory. Every access wraps the address into `0..MEM_SIZE`,
/// so no instruction can reach outside the buffer.
#[derive(Clone)]
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {

    /// Zeroed memory with the font installed.
    pub fn new() -> Memory {
        let mut memory = Memory { bytes: [0; MEM_SIZE] };
        memory.install_font();
        memory
    }

    /// Zero every byte and reinstall the font.
    pub fn reset(&mut self) {
        self.bytes = [0; MEM_SIZE];
        self.install_font();
    }

    fn install_font(&mut self) {
        let start = FONT_START as usize;
        self.bytes[start..start + FONT.len()].copy_from_slice(&FONT);
    }

    /// Copy a program into memory at `PROGRAM_START`.
    /// Only the program region is touched.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Error::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.bytes[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[wrap(addr) as usize]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[wrap(addr) as usize] = value;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold an address into the address space.
pub fn wrap(addr: u16) -> u16 {
    if addr > ADDR_MASK {
        log::debug!("Address {:#06x} is outside memory, wrapping to {:#05x}", addr, addr & ADDR_MASK);
    }
    addr & ADDR_MASK
}
