//! ROM plausibility check for format auto-detection.
//!
//! CHIP-8 images carry no magic number, so the only evidence is the bytes
//! themselves: the image must fit in program RAM and its leading
//! instructions must all decode. Both false positives and false negatives
//! are possible.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arch::MAX_PROGRAM_SIZE;
use crate::decoder::{word_at, Decoder, Instruction};
use crate::isa::chip8::Chip8Decoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Largest accepted image, in bytes.
    pub max_program_size: usize,
    /// Leading instructions that must decode.
    pub probe_instructions: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_program_size: MAX_PROGRAM_SIZE,
            probe_instructions: 20,
        }
    }
}

impl ProbeConfig {
    pub fn window_bytes(&self) -> usize {
        self.probe_instructions.saturating_mul(Instruction::WIDTH as usize)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("image is {len:#x} bytes, larger than {max:#x}")]
    TooLarge { len: usize, max: usize },
    #[error("image is {len} bytes, shorter than the {need}-byte probe window")]
    TooShort { len: usize, need: usize },
    #[error("no instruction decodes from {word:#06x} at offset {offset:#x}")]
    Undecodable { offset: usize, word: u16 },
}

/// Check `bytes` against `cfg`, reporting why an image was rejected.
pub fn probe(bytes: &[u8], cfg: &ProbeConfig) -> Result<(), Rejection> {
    let len = bytes.len();
    if len > cfg.max_program_size {
        return Err(Rejection::TooLarge { len, max: cfg.max_program_size });
    }
    let need = cfg.window_bytes();
    if len < need {
        return Err(Rejection::TooShort { len, need });
    }

    let dec = Chip8Decoder::new();
    for offset in (0..need).step_by(Instruction::WIDTH as usize) {
        let Some(word) = word_at(bytes, offset) else {
            return Err(Rejection::TooShort { len, need });
        };
        if dec.decode(word).is_none() {
            return Err(Rejection::Undecodable { offset, word });
        }
    }
    Ok(())
}

/// True when `bytes` plausibly is a CHIP-8 program under the default policy:
/// at most 0xE00 bytes, and the first 20 instructions all decode.
pub fn looks_like_chip8(bytes: &[u8]) -> bool {
    match probe(bytes, &ProbeConfig::default()) {
        Ok(()) => true,
        Err(why) => {
            debug!(%why, "not a CHIP-8 image");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(ws: &[u16]) -> Vec<u8> {
        ws.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    #[test]
    fn custom_window() {
        let cfg = ProbeConfig { max_program_size: 0x10, probe_instructions: 2 };
        assert_eq!(probe(&words(&[0x00E0, 0x1200]), &cfg), Ok(()));
        assert_eq!(
            probe(&words(&[0x00E0, 0xE1FF]), &cfg),
            Err(Rejection::Undecodable { offset: 2, word: 0xE1FF })
        );
        assert_eq!(probe(&[0x00, 0xE0, 0x12], &cfg), Err(Rejection::TooShort { len: 3, need: 4 }));
        assert_eq!(probe(&[0u8; 0x11], &cfg), Err(Rejection::TooLarge { len: 0x11, max: 0x10 }));
    }

    #[test]
    fn bytes_past_window_are_not_checked() {
        let mut img = words(&[0x6000; 20]);
        img.extend(words(&[0xFFFF, 0xFFFF]));
        assert!(looks_like_chip8(&img));
    }

    #[test]
    fn zero_window_accepts_anything_small() {
        let cfg = ProbeConfig { probe_instructions: 0, ..ProbeConfig::default() };
        assert_eq!(probe(&[], &cfg), Ok(()));
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: ProbeConfig = serde_json::from_str(r#"{ "probe_instructions": 4 }"#).unwrap();
        assert_eq!(cfg.max_program_size, 0xE00);
        assert_eq!(cfg.window_bytes(), 8);
    }
}
