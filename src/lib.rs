pub mod arch;
pub mod branch;
pub mod decoder;
pub mod detect;
pub mod disasm;
pub mod instructions;
pub mod registers;

pub mod isa {
    pub mod chip8; // COSMAC VIP instruction set, 35 opcodes
}

pub use branch::{classify, successors, BranchDescriptor};
pub use decoder::{decode, extract, word_at, Decoder, Fields, Instruction, Vreg};
pub use detect::{looks_like_chip8, probe, ProbeConfig, Rejection};
pub use isa::chip8::Chip8Decoder;
