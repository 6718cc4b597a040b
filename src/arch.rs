use serde::Serialize;

use crate::registers::{RegisterInfo, REGISTER_FILE};

/// Programs are loaded right above the 512-byte interpreter area.
pub const LOAD_ADDRESS: u16 = 0x200;
/// RAM available to a program above `LOAD_ADDRESS` in a 4 KiB machine.
pub const MAX_PROGRAM_SIZE: usize = 0xE00;
/// Highest addressable byte (12-bit address space).
pub const ADDRESS_MASK: u16 = 0x0FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Endianness {
    Big,
    Little,
}

/// Static facts a host needs to register this architecture.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArchInfo {
    pub name: &'static str,
    pub endianness: Endianness,
    pub address_size: u8,
    pub default_int_size: u8,
    pub instr_alignment: u8,
    pub max_instr_length: u8,
    pub opcode_display_length: u8,
    pub stack_pointer: &'static str,
    pub load_address: u16,
    pub registers: &'static [RegisterInfo],
}

pub const CHIP8: ArchInfo = ArchInfo {
    name: "CHIP-8",
    endianness: Endianness::Big,
    address_size: 2,
    default_int_size: 2,
    instr_alignment: 2,
    max_instr_length: 2,
    opcode_display_length: 2,
    stack_pointer: "SP",
    load_address: LOAD_ADDRESS,
    registers: REGISTER_FILE,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::register_info;

    #[test]
    fn program_space_ends_at_top_of_ram() {
        assert_eq!(LOAD_ADDRESS as usize + MAX_PROGRAM_SIZE, 0x1000);
        assert_eq!(CHIP8.max_instr_length, CHIP8.instr_alignment);
        assert!(register_info(CHIP8.stack_pointer).is_some());
    }
}
