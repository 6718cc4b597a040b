use serde::Serialize;

use crate::decoder::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Op {
    Cls,
    Ret,
    Sys,
    Jp,
    Call,
    SeImm,
    SneImm,
    SeReg,
    LdImm,
    AddImm,
    Ld,
    Or,
    And,
    Xor,
    Add,
    Sub,
    Shr,
    Subn,
    Shl,
    SneReg,
    LdI,
    JpV0,
    Rnd,
    Drw,
    Skp,
    Sknp,
    LdVxDt,
    LdVxK,
    LdDtVx,
    LdStVx,
    AddIVx,
    LdFVx,
    LdBVx,
    LdMemVx,
    LdVxMem,
}

/// One row of the opcode map. `word & mask == value` selects the row;
/// rows are ordered so the first match wins (00E0/00EE before 0nnn).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub pattern: &'static str,
    pub syntax: &'static str,
    pub mask: u16,
    pub value: u16,
}

const fn row(
    op: Op,
    mnemonic: &'static str,
    pattern: &'static str,
    syntax: &'static str,
    mask: u16,
    value: u16,
) -> InstrDesc {
    InstrDesc { op, mnemonic, pattern, syntax, mask, value }
}

pub const TABLE: &[InstrDesc] = &[
    row(Op::Cls, "CLS", "00E0", "CLS", 0xFFFF, 0x00E0),
    row(Op::Ret, "RET", "00EE", "RET", 0xFFFF, 0x00EE),
    row(Op::Sys, "SYS", "0nnn", "SYS addr", 0xF000, 0x0000),
    row(Op::Jp, "JP", "1nnn", "JP addr", 0xF000, 0x1000),
    row(Op::Call, "CALL", "2nnn", "CALL addr", 0xF000, 0x2000),
    row(Op::SeImm, "SE", "3xkk", "SE Vx, byte", 0xF000, 0x3000),
    row(Op::SneImm, "SNE", "4xkk", "SNE Vx, byte", 0xF000, 0x4000),
    row(Op::SeReg, "SE", "5xy0", "SE Vx, Vy", 0xF000, 0x5000),
    row(Op::LdImm, "LD", "6xkk", "LD Vx, byte", 0xF000, 0x6000),
    row(Op::AddImm, "ADD", "7xkk", "ADD Vx, byte", 0xF000, 0x7000),
    row(Op::Ld, "LD", "8xy0", "LD Vx, Vy", 0xF00F, 0x8000),
    row(Op::Or, "OR", "8xy1", "OR Vx, Vy", 0xF00F, 0x8001),
    row(Op::And, "AND", "8xy2", "AND Vx, Vy", 0xF00F, 0x8002),
    row(Op::Xor, "XOR", "8xy3", "XOR Vx, Vy", 0xF00F, 0x8003),
    row(Op::Add, "ADD", "8xy4", "ADD Vx, Vy", 0xF00F, 0x8004),
    row(Op::Sub, "SUB", "8xy5", "SUB Vx, Vy", 0xF00F, 0x8005),
    row(Op::Shr, "SHR", "8xy6", "SHR Vx, 1", 0xF00F, 0x8006),
    row(Op::Subn, "SUBN", "8xy7", "SUBN Vx, Vy", 0xF00F, 0x8007),
    row(Op::Shl, "SHL", "8xyE", "SHL Vx, 1", 0xF00F, 0x800E),
    row(Op::SneReg, "SNE", "9xy0", "SNE Vx, Vy", 0xF000, 0x9000),
    row(Op::LdI, "LD", "Annn", "LD I, addr", 0xF000, 0xA000),
    row(Op::JpV0, "JP", "Bnnn", "JP V0, addr", 0xF000, 0xB000),
    row(Op::Rnd, "RND", "Cxkk", "RND Vx, byte", 0xF000, 0xC000),
    row(Op::Drw, "DRW", "Dxyn", "DRW Vx, Vy, nibble", 0xF000, 0xD000),
    row(Op::Skp, "SKP", "Ex9E", "SKP Vx", 0xF0FF, 0xE09E),
    row(Op::Sknp, "SKNP", "ExA1", "SKNP Vx", 0xF0FF, 0xE0A1),
    row(Op::LdVxDt, "LD", "Fx07", "LD Vx, DT", 0xF0FF, 0xF007),
    row(Op::LdVxK, "LD", "Fx0A", "LD Vx, K", 0xF0FF, 0xF00A),
    row(Op::LdDtVx, "LD", "Fx15", "LD DT, Vx", 0xF0FF, 0xF015),
    row(Op::LdStVx, "LD", "Fx18", "LD ST, Vx", 0xF0FF, 0xF018),
    row(Op::AddIVx, "ADD", "Fx1E", "ADD I, Vx", 0xF0FF, 0xF01E),
    row(Op::LdFVx, "LD", "Fx29", "LD F, Vx", 0xF0FF, 0xF029),
    row(Op::LdBVx, "LD", "Fx33", "LD B, Vx", 0xF0FF, 0xF033),
    row(Op::LdMemVx, "LD", "Fx55", "LD [I], Vx", 0xF0FF, 0xF055),
    row(Op::LdVxMem, "LD", "Fx65", "LD Vx, [I]", 0xF0FF, 0xF065),
];

pub fn desc(op: Op) -> &'static InstrDesc {
    TABLE
        .iter()
        .find(|d| d.op == op)
        .unwrap_or_else(|| unreachable!("every Op has a table row"))
}

/// Table row matching a raw word, if any.
pub fn lookup(word: u16) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| word & d.mask == d.value)
}

impl Instruction {
    pub fn op(&self) -> Op {
        use Instruction::*;
        match self {
            ClearScreen => Op::Cls,
            Return => Op::Ret,
            Sys { .. } => Op::Sys,
            Jump { .. } => Op::Jp,
            Call { .. } => Op::Call,
            SkipEqImm { .. } => Op::SeImm,
            SkipNeImm { .. } => Op::SneImm,
            SkipEqReg { .. } => Op::SeReg,
            LoadImm { .. } => Op::LdImm,
            AddImm { .. } => Op::AddImm,
            Load { .. } => Op::Ld,
            Or { .. } => Op::Or,
            And { .. } => Op::And,
            Xor { .. } => Op::Xor,
            Add { .. } => Op::Add,
            Sub { .. } => Op::Sub,
            ShiftRight { .. } => Op::Shr,
            SubN { .. } => Op::Subn,
            ShiftLeft { .. } => Op::Shl,
            SkipNeReg { .. } => Op::SneReg,
            SetIndex { .. } => Op::LdI,
            JumpPlusV0 { .. } => Op::JpV0,
            Random { .. } => Op::Rnd,
            Draw { .. } => Op::Drw,
            SkipIfKeyPressed { .. } => Op::Skp,
            SkipIfKeyNotPressed { .. } => Op::Sknp,
            LoadDelay { .. } => Op::LdVxDt,
            WaitKey { .. } => Op::LdVxK,
            SetDelay { .. } => Op::LdDtVx,
            SetSound { .. } => Op::LdStVx,
            AddIndex { .. } => Op::AddIVx,
            LoadFont { .. } => Op::LdFVx,
            LoadBcd { .. } => Op::LdBVx,
            StoreRegisters { .. } => Op::LdMemVx,
            LoadRegisters { .. } => Op::LdVxMem,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        desc(self.op()).mnemonic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;

    #[test]
    fn table_has_one_row_per_op() {
        assert_eq!(TABLE.len(), 35);
        for (i, a) in TABLE.iter().enumerate() {
            assert!(TABLE[i + 1..].iter().all(|b| b.op != a.op), "{:?} listed twice", a.op);
        }
    }

    #[test]
    fn table_agrees_with_decoder_for_every_word() {
        for w in 0..=u16::MAX {
            let from_table = lookup(w).map(|d| d.op);
            let from_decoder = decode(w).map(|i| i.op());
            assert_eq!(from_table, from_decoder, "word {w:#06x}");
        }
    }

    #[test]
    fn mnemonics() {
        assert_eq!(decode(0xF155).unwrap().mnemonic(), "LD");
        assert_eq!(decode(0x8127).unwrap().mnemonic(), "SUBN");
        assert_eq!(decode(0xE1A1).unwrap().mnemonic(), "SKNP");
    }
}
