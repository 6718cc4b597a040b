use crate::decoder::{extract, Decoder, Fields, Instruction, Vreg};

/// CHIP-8 (COSMAC VIP) decoder.
/// Dispatches on the family nibble first, then on the exact word (0x0),
/// `n` (0x8) or `kk` (0xE, 0xF). Unassigned selector values yield `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Chip8Decoder;

impl Chip8Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Chip8Decoder {
    fn decode(&self, word: u16) -> Option<Instruction> {
        use Instruction::*;

        let f = extract(word);
        let x = Vreg::new(f.x);
        let y = Vreg::new(f.y);

        let insn = match f.m {
            0x0 => match word {
                0x00E0 => ClearScreen,
                0x00EE => Return,
                _ => Sys { addr: f.addr },
            },
            0x1 => Jump { addr: f.addr },
            0x2 => Call { addr: f.addr },
            0x3 => SkipEqImm { x, kk: f.kk },
            0x4 => SkipNeImm { x, kk: f.kk },
            // low nibble is not inspected for 5xy? / 9xy?
            0x5 => SkipEqReg { x, y },
            0x6 => LoadImm { x, kk: f.kk },
            0x7 => AddImm { x, kk: f.kk },
            0x8 => return alu(&f),
            0x9 => SkipNeReg { x, y },
            0xA => SetIndex { addr: f.addr },
            0xB => JumpPlusV0 { addr: f.addr },
            0xC => Random { x, kk: f.kk },
            0xD => Draw { x, y, n: f.n },
            0xE => match f.kk {
                0x9E => SkipIfKeyPressed { x },
                0xA1 => SkipIfKeyNotPressed { x },
                _ => return None,
            },
            0xF => return misc(&f),
            _ => unreachable!("family nibble is four bits"),
        };
        Some(insn)
    }
}

fn alu(f: &Fields) -> Option<Instruction> {
    use Instruction::*;

    let (x, y) = (Vreg::new(f.x), Vreg::new(f.y));
    Some(match f.n {
        0x0 => Load { x, y },
        0x1 => Or { x, y },
        0x2 => And { x, y },
        0x3 => Xor { x, y },
        0x4 => Add { x, y },
        0x5 => Sub { x, y },
        0x6 => ShiftRight { x, y },
        0x7 => SubN { x, y },
        0xE => ShiftLeft { x, y },
        _ => return None,
    })
}

fn misc(f: &Fields) -> Option<Instruction> {
    use Instruction::*;

    let x = Vreg::new(f.x);
    Some(match f.kk {
        0x07 => LoadDelay { x },
        0x0A => WaitKey { x },
        0x15 => SetDelay { x },
        0x18 => SetSound { x },
        0x1E => AddIndex { x },
        0x29 => LoadFont { x },
        0x33 => LoadBcd { x },
        0x55 => StoreRegisters { x },
        0x65 => LoadRegisters { x },
        _ => return None,
    })
}
