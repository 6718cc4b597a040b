use std::fmt;

use serde::{Deserialize, Serialize};

/// Register labels as they appear in operand text. `I`, `DT` and `ST` are real
/// machine registers but not general ones; `K`, `B` and `F` only ever appear
/// as placeholders in the `Fx..` forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterName {
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    Va,
    Vb,
    Vc,
    Vd,
    Ve,
    Vf,
    I,
    Dt,
    St,
    K,
    B,
    F,
}

const GENERAL: [RegisterName; 16] = [
    RegisterName::V0,
    RegisterName::V1,
    RegisterName::V2,
    RegisterName::V3,
    RegisterName::V4,
    RegisterName::V5,
    RegisterName::V6,
    RegisterName::V7,
    RegisterName::V8,
    RegisterName::V9,
    RegisterName::Va,
    RegisterName::Vb,
    RegisterName::Vc,
    RegisterName::Vd,
    RegisterName::Ve,
    RegisterName::Vf,
];

impl RegisterName {
    /// General register `V{idx}`; `idx` is taken modulo 16.
    pub fn general(idx: u8) -> Self {
        GENERAL[(idx & 0xF) as usize]
    }

    pub fn is_general(self) -> bool {
        self.general_index().is_some()
    }

    pub fn general_index(self) -> Option<u8> {
        GENERAL.iter().position(|&r| r == self).map(|i| i as u8)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegisterName::V0 => "V0",
            RegisterName::V1 => "V1",
            RegisterName::V2 => "V2",
            RegisterName::V3 => "V3",
            RegisterName::V4 => "V4",
            RegisterName::V5 => "V5",
            RegisterName::V6 => "V6",
            RegisterName::V7 => "V7",
            RegisterName::V8 => "V8",
            RegisterName::V9 => "V9",
            RegisterName::Va => "Va",
            RegisterName::Vb => "Vb",
            RegisterName::Vc => "Vc",
            RegisterName::Vd => "Vd",
            RegisterName::Ve => "Ve",
            RegisterName::Vf => "Vf",
            RegisterName::I => "I",
            RegisterName::Dt => "DT",
            RegisterName::St => "ST",
            RegisterName::K => "K",
            RegisterName::B => "B",
            RegisterName::F => "F",
        }
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine register file entry: name and width in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegisterInfo {
    pub name: &'static str,
    pub size: u8,
}

pub const REGISTER_FILE: &[RegisterInfo] = &[
    RegisterInfo { name: "PC", size: 2 },
    RegisterInfo { name: "SP", size: 1 },
    RegisterInfo { name: "I", size: 2 },
    RegisterInfo { name: "DT", size: 1 },
    RegisterInfo { name: "ST", size: 1 },
    RegisterInfo { name: "V0", size: 1 },
    RegisterInfo { name: "V1", size: 1 },
    RegisterInfo { name: "V2", size: 1 },
    RegisterInfo { name: "V3", size: 1 },
    RegisterInfo { name: "V4", size: 1 },
    RegisterInfo { name: "V5", size: 1 },
    RegisterInfo { name: "V6", size: 1 },
    RegisterInfo { name: "V7", size: 1 },
    RegisterInfo { name: "V8", size: 1 },
    RegisterInfo { name: "V9", size: 1 },
    RegisterInfo { name: "Va", size: 1 },
    RegisterInfo { name: "Vb", size: 1 },
    RegisterInfo { name: "Vc", size: 1 },
    RegisterInfo { name: "Vd", size: 1 },
    RegisterInfo { name: "Ve", size: 1 },
    RegisterInfo { name: "Vf", size: 1 },
];

pub fn register_info(name: &str) -> Option<&'static RegisterInfo> {
    REGISTER_FILE.iter().find(|r| r.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_names_round_trip_index() {
        for i in 0..16u8 {
            let r = RegisterName::general(i);
            assert!(r.is_general());
            assert_eq!(r.general_index(), Some(i));
        }
        assert_eq!(RegisterName::general(0xA).as_str(), "Va");
        assert!(!RegisterName::Dt.is_general());
    }

    #[test]
    fn every_general_register_is_in_the_file() {
        for i in 0..16u8 {
            let info = register_info(RegisterName::general(i).as_str()).unwrap();
            assert_eq!(info.size, 1);
        }
        assert_eq!(register_info("I").unwrap().size, 2);
        assert!(register_info("K").is_none());
    }
}
