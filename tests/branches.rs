use chip8_rs::branch::{classify, BranchDescriptor};
use chip8_rs::decoder::{decode, Instruction};

#[test]
fn fixture_descriptors() {
    assert_eq!(classify(0x00EE, 0x200), BranchDescriptor::Return);
    assert_eq!(classify(0x00EE, 0xABC), BranchDescriptor::Return);
    assert_eq!(classify(0x1234, 0x200), BranchDescriptor::Unconditional { target: 0x234 });
    assert_eq!(classify(0x2456, 0x200), BranchDescriptor::Call { target: 0x456 });
    assert_eq!(classify(0xA3F0, 0x200), BranchDescriptor::None);
    assert_eq!(classify(0xB300, 0x200), BranchDescriptor::Indirect);
}

#[test]
fn conditional_pair_iff_skip_instruction() {
    for addr in [0x000u16, 0x200, 0x2FE, 0xFFE] {
        for w in 0..=u16::MAX {
            let is_skip = decode(w).map_or(false, |d| d.is_skip());
            let pair = BranchDescriptor::ConditionalPair {
                true_target: addr.wrapping_add(4),
                false_target: addr.wrapping_add(2),
            };
            assert_eq!(classify(w, addr) == pair, is_skip, "word {w:#06x} at {addr:#x}");
        }
    }
}

#[test]
fn jump_and_call_targets_match_decoded_addr() {
    for w in (0x0000u16..=0x2FFF).step_by(7) {
        let d = decode(w).unwrap();
        let target = match d {
            Instruction::Sys { addr } | Instruction::Jump { addr } | Instruction::Call { addr } => addr,
            _ => continue,
        };
        assert_eq!(classify(w, 0x200).target(), Some(target), "word {w:#06x}");
    }
}

#[test]
fn undecodable_words_fall_through() {
    for w in [0xE19Fu16, 0xF1FF, 0x800F] {
        assert!(decode(w).is_none());
        assert_eq!(classify(w, 0x200), BranchDescriptor::None);
    }
}

#[test]
fn classify_is_idempotent() {
    for w in [0x00EEu16, 0x3A12, 0xB123, 0xE0A1] {
        assert_eq!(classify(w, 0x250), classify(w, 0x250));
    }
}
