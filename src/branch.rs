use serde::{Deserialize, Serialize};

use crate::decoder::{extract, Instruction};

/// Control-flow shape of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BranchDescriptor {
    /// Falls through to `addr + 2`; implied, not encoded.
    None,
    Unconditional { target: u16 },
    Call { target: u16 },
    Return,
    /// Target depends on runtime register state.
    Indirect,
    /// Skip instruction: `true_target` is `addr + 4`, `false_target` is `addr + 2`.
    ConditionalPair { true_target: u16, false_target: u16 },
}

impl BranchDescriptor {
    pub fn is_branch(&self) -> bool {
        !matches!(self, BranchDescriptor::None)
    }

    /// Statically known jump or call target.
    pub fn target(&self) -> Option<u16> {
        match *self {
            BranchDescriptor::Unconditional { target } | BranchDescriptor::Call { target } => Some(target),
            _ => None,
        }
    }
}

/// Classify the word at `addr`. Reads the same fields as the decoder; words
/// the decoder rejects (e.g. `ExFF`) classify as `None`.
///
/// A legacy `SYS nnn` is reported as an unconditional jump to `nnn`. Real
/// interpreters ignore it, so a CFG built from this is an over-approximation.
pub fn classify(word: u16, addr: u16) -> BranchDescriptor {
    let f = extract(word);
    let skip = || BranchDescriptor::ConditionalPair {
        true_target: addr.wrapping_add(4),
        false_target: addr.wrapping_add(2),
    };
    match f.m {
        0x0 => match word {
            0x00EE => BranchDescriptor::Return,
            0x00E0 => BranchDescriptor::None,
            _ => BranchDescriptor::Unconditional { target: f.addr },
        },
        0x1 => BranchDescriptor::Unconditional { target: f.addr },
        0x2 => BranchDescriptor::Call { target: f.addr },
        0x3 | 0x4 | 0x5 | 0x9 => skip(),
        0xB => BranchDescriptor::Indirect,
        0xE => match f.kk {
            0x9E | 0xA1 => skip(),
            _ => BranchDescriptor::None,
        },
        _ => BranchDescriptor::None,
    }
}

/// Statically known successors of the word at `addr`.
/// `Call` yields the callee then the return site; `Return` and `Indirect`
/// yield nothing, which a CFG builder must read as "unknown", not "dead end".
pub fn successors(word: u16, addr: u16) -> Vec<u16> {
    let ft = addr.wrapping_add(Instruction::WIDTH);
    match classify(word, addr) {
        BranchDescriptor::None => vec![ft],
        BranchDescriptor::Unconditional { target } => vec![target],
        BranchDescriptor::Call { target } => vec![target, ft],
        BranchDescriptor::ConditionalPair { true_target, false_target } => vec![true_target, false_target],
        BranchDescriptor::Return | BranchDescriptor::Indirect => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_words() {
        assert_eq!(classify(0x00EE, 0x300), BranchDescriptor::Return);
        assert_eq!(classify(0x00E0, 0x300), BranchDescriptor::None);
        assert_eq!(classify(0x0456, 0x300), BranchDescriptor::Unconditional { target: 0x456 });
        // only the exact words are CLS / RET; the rest of family 0 is SYS
        assert_eq!(classify(0x01EE, 0x300), BranchDescriptor::Unconditional { target: 0x1EE });
        assert_eq!(classify(0x01E0, 0x300), BranchDescriptor::Unconditional { target: 0x1E0 });
    }

    #[test]
    fn skip_pair_wraps_at_top_of_u16() {
        assert_eq!(
            classify(0x3000, 0xFFFE),
            BranchDescriptor::ConditionalPair { true_target: 0x0002, false_target: 0x0000 }
        );
    }

    #[test]
    fn successors_follow_descriptor() {
        assert_eq!(successors(0x2345, 0x200), vec![0x345, 0x202]);
        assert_eq!(successors(0x4A01, 0x200), vec![0x204, 0x202]);
        assert!(successors(0xB300, 0x200).is_empty());
        assert!(successors(0x00EE, 0x200).is_empty());
        assert_eq!(successors(0x6A01, 0x200), vec![0x202]);
    }
}
