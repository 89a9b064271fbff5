/// A raw two-byte instruction word, split into the
/// nibble fields that the CHIP-8 instruction formats use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(u16);

impl Opcode {

    /// Combine the high and low byte, in the order they appear in memory.
    pub fn from_bytes(high: u8, low: u8) -> Opcode {
        Opcode(((high as u16) << 8) | low as u16)
    }

    pub fn from_u16(value: u16) -> Opcode {
        Opcode(value)
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// The four nibbles, most significant first.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (
            ((self.0 >> 12) & 0xF) as u8,
            ((self.0 >> 8) & 0xF) as u8,
            ((self.0 >> 4) & 0xF) as u8,
            (self.0 & 0xF) as u8,
        )
    }

    /// The low byte, `NN`.
    pub fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// The low 12 bits, `NNN`.
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn from_bytes_equals_from_u16() {
        assert_eq!(Opcode::from_bytes(0x12, 0x34), Opcode::from_u16(0x1234));
        assert_eq!(Opcode::from_bytes(0xFF, 0x00), Opcode::from_u16(0xFF00));
        assert_eq!(Opcode::from_bytes(0x00, 0xFF), Opcode::from_u16(0x00FF));
    }

    #[test]
    fn nibbles_are_split_most_significant_first() {
        assert_eq!((0xA, 0xB, 0xC, 0xD), Opcode::from_u16(0xABCD).nibbles());
        assert_eq!((0, 0, 0xE, 0), Opcode::from_u16(0x00E0).nibbles());
    }

    #[test]
    fn fields() {
        let opcode = Opcode::from_u16(0xD12F);
        assert_eq!(0x2F, opcode.nn());
        assert_eq!(0x12F, opcode.nnn());
        assert_eq!(0xD12F, opcode.as_u16());
    }
}
