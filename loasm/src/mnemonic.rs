use std::str::FromStr;

use strum_macros::EnumString;

/// The fixed LoChip mnemonic set. Matching is case sensitive. `Db` is the
/// raw-byte directive and has two spellings in source.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum Mnemonic {
    #[strum(serialize = "DB", serialize = "define")]
    Db,
    CLS,
    RET,
    JP,
    CALL,
    JE,
    JNE,
    LD,
    ADD,
    OR,
    AND,
    XOR,
    SUB,
    SHR,
    SUBN,
    SHL,
    RND,
    DRW,
    JKP,
    JKNP,
    EXIT,
}

impl Mnemonic {
    pub fn parse(token: &str) -> Option<Self> {
        Self::from_str(token).ok()
    }
}
