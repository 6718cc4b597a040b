use std::fmt;
use std::path::Path;

use anyhow::Result;
use bitflags::bitflags;
use chip8_rs::arch::ADDRESS_MASK;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct SegmentFlags: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const EXEC = 1 << 2;
        const CODE = 1 << 3; // contains code, not just executable
    }
}

impl fmt::Display for SegmentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |flag: SegmentFlags, c: char| if self.contains(flag) { c } else { '-' };
        write!(f, "{}{}{}", bit(Self::READ, 'r'), bit(Self::WRITE, 'w'), bit(Self::EXEC, 'x'))
    }
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub base: u16,
    pub bytes: Vec<u8>,
    pub flags: SegmentFlags,
}

impl Segment {
    pub fn end(&self) -> u32 {
        self.base as u32 + self.bytes.len() as u32
    }

    fn contains(&self, addr: u16) -> bool {
        (addr as u32) >= self.base as u32 && (addr as u32) < self.end()
    }
}

#[derive(Debug, Clone)]
pub struct Image {
    pub segments: Vec<Segment>,
    pub entry: u16,
}

impl Image {
    /// Map a ROM payload at `base`. The program lives in RAM, so the segment is
    /// readable, writable and executable; the entry point is its first byte.
    pub fn from_rom(payload: Vec<u8>, base: u16) -> Result<Self> {
        let end = base as usize + payload.len();
        anyhow::ensure!(
            end <= ADDRESS_MASK as usize + 1,
            "ROM of {:#x} bytes at {base:#05x} runs past the 12-bit address space",
            payload.len()
        );
        let seg = Segment {
            name: "ROM Data".into(),
            base,
            bytes: payload,
            flags: SegmentFlags::all(),
        };
        Ok(Image { segments: vec![seg], entry: base })
    }
}

/// File bytes after dropping `skip` leading bytes, cut to `len` when given.
pub fn load_payload(path: &Path, skip: usize, len: Option<usize>) -> Result<Vec<u8>> {
    let mut file = std::fs::read(path)?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    file.drain(..skip);
    if let Some(lim) = len {
        anyhow::ensure!(lim <= file.len(), "--len exceeds remaining file size after skip");
        file.truncate(lim);
    }
    Ok(file)
}

pub fn load_rom(path: &Path, base: u16, skip: usize, len: Option<usize>) -> Result<Image> {
    Image::from_rom(load_payload(path, skip, len)?, base)
}

pub fn read_u8(img: &Image, addr: u16) -> Option<u8> {
    img.segments
        .iter()
        .find(|s| s.contains(addr))
        .map(|s| s.bytes[(addr - s.base) as usize])
}

/// Big-endian instruction word at `addr`.
pub fn read_u16(img: &Image, addr: u16) -> Option<u16> {
    let b0 = read_u8(img, addr)?;
    let b1 = read_u8(img, addr.checked_add(1)?)?;
    Some(u16::from_be_bytes([b0, b1]))
}

pub fn is_mapped(img: &Image, addr: u16) -> bool {
    img.segments.iter().any(|s| s.contains(addr))
}
