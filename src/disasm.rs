use serde::{Deserialize, Serialize};

use crate::decoder::{Decoder, Instruction, Vreg, WindowError, word_from_bytes};
use crate::isa::chip8::Chip8Decoder;
use crate::registers::RegisterName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Instruction,
    Text,
    Register,
    OperandSeparator,
    Integer,
    PossibleAddress,
    HexDumpByte,
}

/// One piece of rendered disassembly. Numeric tokens keep their value so a
/// host can hyperlink addresses without reparsing the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u16>,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into(), value: None }
    }

    fn num(kind: TokenKind, v: u16) -> Self {
        Self { kind, text: format!("{v:#x}"), value: Some(v) }
    }
}

fn mnem(s: &str) -> Token {
    Token::new(TokenKind::Instruction, s)
}
fn text(s: &str) -> Token {
    Token::new(TokenKind::Text, s)
}
fn sep(s: &str) -> Token {
    Token::new(TokenKind::OperandSeparator, s)
}
fn reg(r: RegisterName) -> Token {
    Token::new(TokenKind::Register, r.as_str())
}
fn v(r: Vreg) -> Token {
    reg(r.name())
}
fn imm(val: u8) -> Token {
    Token::num(TokenKind::Integer, val as u16)
}
fn addr(a: u16) -> Token {
    Token::num(TokenKind::PossibleAddress, a)
}

// `MN a, b, ...`
fn ops(mn: &str, operands: Vec<Token>) -> Vec<Token> {
    let mut out = vec![mnem(mn)];
    for (i, t) in operands.into_iter().enumerate() {
        out.push(if i == 0 { text(" ") } else { sep(", ") });
        out.push(t);
    }
    out
}

pub fn tokenize(d: &Instruction) -> Vec<Token> {
    use Instruction::*;

    let mn = d.mnemonic();
    match *d {
        ClearScreen | Return => vec![mnem(mn)],
        Sys { addr: a } | Jump { addr: a } | Call { addr: a } => ops(mn, vec![addr(a)]),
        SkipEqImm { x, kk } | SkipNeImm { x, kk } | LoadImm { x, kk } | AddImm { x, kk } | Random { x, kk } => {
            ops(mn, vec![v(x), imm(kk)])
        }
        SkipEqReg { x, y }
        | SkipNeReg { x, y }
        | Load { x, y }
        | Or { x, y }
        | And { x, y }
        | Xor { x, y }
        | Add { x, y }
        | Sub { x, y }
        | SubN { x, y } => ops(mn, vec![v(x), v(y)]),
        ShiftRight { x, .. } | ShiftLeft { x, .. } => ops(mn, vec![v(x), imm(1)]),
        SetIndex { addr: a } => ops(mn, vec![reg(RegisterName::I), addr(a)]),
        JumpPlusV0 { addr: a } => ops(mn, vec![reg(RegisterName::V0), addr(a)]),
        Draw { x, y, n } => ops(mn, vec![v(x), v(y), imm(n)]),
        SkipIfKeyPressed { x } | SkipIfKeyNotPressed { x } => ops(mn, vec![v(x)]),
        LoadDelay { x } => ops(mn, vec![v(x), reg(RegisterName::Dt)]),
        WaitKey { x } => ops(mn, vec![v(x), reg(RegisterName::K)]),
        SetDelay { x } => ops(mn, vec![reg(RegisterName::Dt), v(x)]),
        SetSound { x } => ops(mn, vec![reg(RegisterName::St), v(x)]),
        AddIndex { x } => ops(mn, vec![reg(RegisterName::I), v(x)]),
        LoadFont { x } => ops(mn, vec![reg(RegisterName::F), v(x)]),
        LoadBcd { x } => ops(mn, vec![reg(RegisterName::B), v(x)]),
        StoreRegisters { x } => vec![mnem(mn), text(" ["), reg(RegisterName::I), sep("], "), v(x)],
        LoadRegisters { x } => vec![mnem(mn), text(" "), v(x), sep(", ["), reg(RegisterName::I), text("]")],
    }
}

/// Raw-data rendering for a word with no instruction: `_emit 0xaa 0xbb`.
pub fn emit_tokens(hi: u8, lo: u8) -> Vec<Token> {
    vec![
        mnem("_emit"),
        text(" "),
        Token::num(TokenKind::HexDumpByte, hi as u16),
        sep(" "),
        Token::num(TokenKind::HexDumpByte, lo as u16),
    ]
}

/// Tokens for the 2-byte window at the start of `window`, plus the number of
/// bytes consumed (always 2). Undecodable words render as `_emit`.
pub fn tokenize_window(window: &[u8]) -> Result<(Vec<Token>, usize), WindowError> {
    let word = word_from_bytes(window)?;
    let tokens = match Chip8Decoder::new().decode(word) {
        Some(d) => tokenize(&d),
        None => emit_tokens(window[0], window[1]),
    };
    Ok((tokens, Instruction::WIDTH as usize))
}

pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

pub fn fmt_decoded(d: &Instruction) -> String {
    render(&tokenize(d))
}

/// Listing text for any word: the instruction, or `_emit` for data.
pub fn fmt_word(word: u16) -> String {
    match Chip8Decoder::new().decode(word) {
        Some(d) => fmt_decoded(&d),
        None => {
            let [hi, lo] = word.to_be_bytes();
            render(&emit_tokens(hi, lo))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use pretty_assertions::assert_eq;

    #[test]
    fn se_imm_token_stream() {
        let toks = tokenize(&decode(0x3A12).unwrap());
        let kinds: Vec<TokenKind> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Instruction,
                TokenKind::Text,
                TokenKind::Register,
                TokenKind::OperandSeparator,
                TokenKind::Integer,
            ]
        );
        assert_eq!(toks[4].value, Some(0x12));
        assert_eq!(render(&toks), "SE Va, 0x12");
    }

    #[test]
    fn address_operand_keeps_value() {
        let toks = tokenize(&decode(0x2ABC).unwrap());
        let last = toks.last().unwrap();
        assert_eq!(last.kind, TokenKind::PossibleAddress);
        assert_eq!(last.value, Some(0xABC));
    }

    #[test]
    fn window_falls_back_to_emit() {
        let (toks, len) = tokenize_window(&[0x8F, 0xFF]).unwrap();
        assert_eq!(len, 2);
        assert_eq!(render(&toks), "_emit 0x8f 0xff");
        assert_eq!(toks[2].kind, TokenKind::HexDumpByte);
        assert!(tokenize_window(&[0x00]).is_err());
    }
}
