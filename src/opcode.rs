//! Decoding of 16-bit instruction words.
//!
//! Operand naming follows the usual CHIP-8 notation: `x`, `y` are register
//! selectors (bits 8-11 / 4-7), `kk` the low byte, `nnn` the low 12 bits and
//! `n` the low nibble.

use std::fmt;

/// a single decoded operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump { nnn: u16 },
    /// 2nnn
    Call { nnn: u16 },
    /// 3xkk
    SkipEqImm { x: u8, kk: u8 },
    /// 4xkk
    SkipNeImm { x: u8, kk: u8 },
    /// 5xy0
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadImm { x: u8, kk: u8 },
    /// 7xkk
    AddImm { x: u8, kk: u8 },
    /// 8xy0
    Move { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddReg { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8 },
    /// 8xy7
    SubReverse { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8 },
    /// 9xy0
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    LoadIndex { nnn: u16 },
    /// Bnnn
    JumpOffset { nnn: u16 },
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipKeyDown { x: u8 },
    /// ExA1
    SkipKeyUp { x: u8 },
    /// Fx07
    LoadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    LoadGlyph { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegs { x: u8 },
    /// Fx65
    LoadRegs { x: u8 },
    /// anything else; executes as a no-op
    Unknown(u16),
}

/// an opcode word with its operand fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }
    pub fn x(self) -> u8 {
        ((self.0 >> 8) & 0x0f) as u8
    }
    pub fn y(self) -> u8 {
        ((self.0 >> 4) & 0x0f) as u8
    }
    pub fn n(self) -> u8 {
        (self.0 & 0x0f) as u8
    }
    pub fn kk(self) -> u8 {
        (self.0 & 0xff) as u8
    }
    pub fn nnn(self) -> u16 {
        self.0 & 0x0fff
    }

    /// two-level decode: the top nibble picks the family; family 8 then looks
    /// at the low nibble, E and F at the low byte. Family 0 only knows two
    /// exact words.
    pub fn decode(self) -> Instruction {
        use Instruction::*;
        let (x, y, kk, nnn) = (self.x(), self.y(), self.kk(), self.nnn());
        match self.family() {
            0x0 => match self.0 {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => Unknown(self.0),
            },
            0x1 => Jump { nnn },
            0x2 => Call { nnn },
            0x3 => SkipEqImm { x, kk },
            0x4 => SkipNeImm { x, kk },
            0x5 => SkipEqReg { x, y },
            0x6 => LoadImm { x, kk },
            0x7 => AddImm { x, kk },
            0x8 => match self.n() {
                0x0 => Move { x, y },
                0x1 => Or { x, y },
                0x2 => And { x, y },
                0x3 => Xor { x, y },
                0x4 => AddReg { x, y },
                0x5 => Sub { x, y },
                0x6 => ShiftRight { x },
                0x7 => SubReverse { x, y },
                0xe => ShiftLeft { x },
                _ => Unknown(self.0),
            },
            0x9 => SkipNeReg { x, y },
            0xa => LoadIndex { nnn },
            0xb => JumpOffset { nnn },
            0xc => Random { x, kk },
            0xd => Draw { x, y, n: self.n() },
            0xe => match kk {
                0x9e => SkipKeyDown { x },
                0xa1 => SkipKeyUp { x },
                _ => Unknown(self.0),
            },
            0xf => match kk {
                0x07 => LoadDelay { x },
                0x0a => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1e => AddIndex { x },
                0x29 => LoadGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegs { x },
                0x65 => LoadRegs { x },
                _ => Unknown(self.0),
            },
            _ => Unknown(self.0),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}
