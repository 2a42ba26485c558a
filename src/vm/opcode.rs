/// A raw 16-bit CHIP-8 instruction word.
///
/// Opcodes are fetched from two consecutive memory bytes, high byte first.
/// The accessors expose the sub-fields the instruction set dispatches on:
/// - `x`: bits 8-11, a register index
/// - `y`: bits 4-7, a register index
/// - `n`: bits 0-3, a 4-bit constant
/// - `nn`: bits 0-7, an 8-bit constant
/// - `nnn`: bits 0-11, an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(u16);

impl Opcode {
    pub fn from_bytes(high: u8, low: u8) -> Opcode {
        Opcode(((high as u16) << 8) | low as u16)
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// The four nibbles from most to least significant.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (((self.0 >> 12) & 0xF) as u8, self.x(), self.y(), self.n())
    }

    pub fn x(self) -> u8 {
        ((self.0 >> 8) & 0xF) as u8
    }

    pub fn y(self) -> u8 {
        ((self.0 >> 4) & 0xF) as u8
    }

    pub fn n(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    pub fn nn(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Opcode {
        Opcode(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_is_big_endian() {
        assert_eq!(Opcode::from_bytes(0x12, 0x34).as_u16(), 0x1234);
        assert_eq!(Opcode::from_bytes(0xFF, 0x00).as_u16(), 0xFF00);
        assert_eq!(Opcode::from_bytes(0x00, 0xFF).as_u16(), 0x00FF);
    }

    #[test]
    fn nibbles_are_split_correctly() {
        assert_eq!(Opcode::from(0xABCD).nibbles(), (0xA, 0xB, 0xC, 0xD));
        assert_eq!(Opcode::from(0x0000).nibbles(), (0, 0, 0, 0));
        assert_eq!(Opcode::from(0xF00F).nibbles(), (0xF, 0, 0, 0xF));
    }

    #[test]
    fn fields_are_extracted_correctly() {
        let opcode = Opcode::from(0xABCD);
        assert_eq!(opcode.x(), 0xB);
        assert_eq!(opcode.y(), 0xC);
        assert_eq!(opcode.n(), 0xD);
        assert_eq!(opcode.nn(), 0xCD);
        assert_eq!(opcode.nnn(), 0xBCD);
    }
}
