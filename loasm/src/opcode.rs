use num_derive::{FromPrimitive, ToPrimitive};

/// Every opcode byte the LoChip emulator understands, named after the
/// operand form that selects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Jp = 0x10,
    Call = 0x20,
    JeImm = 0x30,
    JneImm = 0x31,
    JeReg = 0x50,
    JneReg = 0x51,
    LdXImm = 0x60,
    LdYImm = 0x61,
    LdXIdx = 0x62,
    LdYIdx = 0x63,
    LdIdxX = 0x64,
    LdIdxY = 0x65,
    AddXImm = 0x70,
    AddYImm = 0x71,
    LdXY = 0x80,
    Or = 0x81,
    And = 0x82,
    Xor = 0x83,
    AddXY = 0x84,
    Sub = 0x85,
    Shr = 0x86,
    Subn = 0x87,
    LdYX = 0x8A,
    Shl = 0x8E,
    LdIdxAddr = 0xA0,
    LdIdxPair = 0xA1,
    Exit = 0xAA,
    JpX = 0xB0,
    Rnd = 0xC0,
    DrwSized = 0xD0,
    Drw = 0xD1,
    Cls = 0xE0,
    Jkp = 0xE1,
    Jknp = 0xE2,
    Ret = 0xEE,
    LdXDt = 0xF1,
    LdXKey = 0xF2,
    LdDtX = 0xF3,
    LdStX = 0xF4,
    AddIdxX = 0xFA,
    LdBcdX = 0xFC,
    LdIdxXY = 0xFD,
    LdXYIdx = 0xFE,
}

impl Opcode {
    pub fn byte(self) -> u8 {
        self as u8
    }
}
