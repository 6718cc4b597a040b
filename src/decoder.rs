use serde::{Deserialize, Serialize};

use crate::isa::chip8::Chip8Decoder;
use crate::registers::RegisterName;

/// Bit-field views of one opcode word. Each family reads only the fields it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub m: u8,     // 15..12, family selector
    pub addr: u16, // 11..0
    pub x: u8,     // 11..8
    pub y: u8,     // 7..4
    pub kk: u8,    // 7..0
    pub n: u8,     // 3..0
}

pub fn extract(word: u16) -> Fields {
    Fields {
        m: (word >> 12) as u8,
        addr: word & 0x0FFF,
        x: ((word >> 8) & 0xF) as u8,
        y: ((word >> 4) & 0xF) as u8,
        kk: (word & 0xFF) as u8,
        n: (word & 0xF) as u8,
    }
}

/// Index of one of the sixteen general registers V0..VF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vreg(u8);

impl Vreg {
    pub fn new(idx: u8) -> Self {
        Self(idx & 0xF)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn name(self) -> RegisterName {
        RegisterName::general(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    // 0x0 system
    ClearScreen,
    Return,
    Sys { addr: u16 },
    // 0x1 / 0x2
    Jump { addr: u16 },
    Call { addr: u16 },
    // 0x3 .. 0x7
    SkipEqImm { x: Vreg, kk: u8 },
    SkipNeImm { x: Vreg, kk: u8 },
    SkipEqReg { x: Vreg, y: Vreg },
    LoadImm { x: Vreg, kk: u8 },
    AddImm { x: Vreg, kk: u8 },
    // 0x8 ALU, selected by n
    Load { x: Vreg, y: Vreg },
    Or { x: Vreg, y: Vreg },
    And { x: Vreg, y: Vreg },
    Xor { x: Vreg, y: Vreg },
    Add { x: Vreg, y: Vreg },
    Sub { x: Vreg, y: Vreg },
    ShiftRight { x: Vreg, y: Vreg },
    SubN { x: Vreg, y: Vreg },
    ShiftLeft { x: Vreg, y: Vreg },
    // 0x9 .. 0xD
    SkipNeReg { x: Vreg, y: Vreg },
    SetIndex { addr: u16 },
    JumpPlusV0 { addr: u16 },
    Random { x: Vreg, kk: u8 },
    Draw { x: Vreg, y: Vreg, n: u8 },
    // 0xE keypad, selected by kk
    SkipIfKeyPressed { x: Vreg },
    SkipIfKeyNotPressed { x: Vreg },
    // 0xF timers / index / memory, selected by kk
    LoadDelay { x: Vreg },
    WaitKey { x: Vreg },
    SetDelay { x: Vreg },
    SetSound { x: Vreg },
    AddIndex { x: Vreg },
    LoadFont { x: Vreg },
    LoadBcd { x: Vreg },
    StoreRegisters { x: Vreg },
    LoadRegisters { x: Vreg },
}

impl Instruction {
    /// True for the conditional instructions that skip the following word.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Instruction::SkipEqImm { .. }
                | Instruction::SkipNeImm { .. }
                | Instruction::SkipEqReg { .. }
                | Instruction::SkipNeReg { .. }
                | Instruction::SkipIfKeyPressed { .. }
                | Instruction::SkipIfKeyNotPressed { .. }
        )
    }

    /// Every CHIP-8 instruction occupies exactly one word.
    pub const WIDTH: u16 = 2;
}

pub trait Decoder {
    fn decode(&self, word: u16) -> Option<Instruction>;
}

/// Decode with the standard instruction set.
pub fn decode(word: u16) -> Option<Instruction> {
    Chip8Decoder::new().decode(word)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("instruction window holds {len} byte(s), need 2")]
    Truncated { len: usize },
}

/// Big-endian word from the first two bytes of `window`.
pub fn word_from_bytes(window: &[u8]) -> Result<u16, WindowError> {
    match window {
        [hi, lo, ..] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(WindowError::Truncated { len: window.len() }),
    }
}

/// Big-endian word at `offset`, or `None` past the end of `bytes`.
pub fn word_at(bytes: &[u8], offset: usize) -> Option<u16> {
    let window = bytes.get(offset..offset.checked_add(2)?)?;
    word_from_bytes(window).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_split_word() {
        let f = extract(0xD12F);
        assert_eq!(f, Fields { m: 0xD, addr: 0x12F, x: 1, y: 2, kk: 0x2F, n: 0xF });
    }

    #[test]
    fn vreg_masks_to_nibble() {
        assert_eq!(Vreg::new(0x1A).index(), 0xA);
    }

    #[test]
    fn word_readers_are_big_endian() {
        assert_eq!(word_from_bytes(&[0x12, 0x34, 0xFF]), Ok(0x1234));
        assert_eq!(word_from_bytes(&[0x12]), Err(WindowError::Truncated { len: 1 }));
        let bytes = [0x00, 0xE0, 0xA3];
        assert_eq!(word_at(&bytes, 0), Some(0x00E0));
        assert_eq!(word_at(&bytes, 1), Some(0xE0A3));
        assert_eq!(word_at(&bytes, 2), None);
        assert_eq!(word_at(&bytes, usize::MAX), None);
    }
}
