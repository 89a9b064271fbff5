use super::opcode::Opcode;
use crate::error::{Error, Result};
use std::fmt;

/// A wrapper for 12-bit addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr(pub u16);

/// A wrapper for register identifiers, `0x0..=0xF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(pub u8);

/// A wrapper for constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const(pub u8);

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05X}", self.0)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:X}", self.0)
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04X}", self.0)
    }
}

/// A single instruction from the CHIP-8 instruction set.
/// Two bytes written in hexadecimal, with the following special characters:
/// - NNN: address
/// - NN: 8-bit constant
/// - N: 4-bit constant
/// - X and Y: 4-bit register identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen, // 00E0
    Return, // 00EE
    Jump(Addr), // 1NNN
    Call(Addr), // 2NNN
    SkipIfEqConst(Reg, Const), // 3XNN
    SkipIfNeqConst(Reg, Const), // 4XNN
    SkipIfEqReg(Reg, Reg), // 5XY0
    SetConst(Reg, Const), // 6XNN
    AddConst(Reg, Const), // 7XNN
    SetReg(Reg, Reg), // 8XY0
    Or(Reg, Reg), // 8XY1
    And(Reg, Reg), // 8XY2
    Xor(Reg, Reg), // 8XY3
    AddReg(Reg, Reg), // 8XY4
    SubReg(Reg, Reg), // 8XY5
    ShiftRight(Reg, Reg), // 8XY6
    SubFromReg(Reg, Reg), // 8XY7
    ShiftLeft(Reg, Reg), // 8XYE
    SkipIfNeqReg(Reg, Reg), // 9XY0
    SetIndex(Addr), // ANNN
    /// BNNN. Shown as `JP V0, NNN`; with the jump quirk the offset register is
    /// really VX, X being the high nibble of NNN.
    JumpWithOffset(Addr),
    Random(Reg, Const), // CXNN
    Draw(Reg, Reg, Const), // DXYN
    SkipIfKey(Reg), // EX9E
    SkipIfNotKey(Reg), // EXA1
    GetDelayTimer(Reg), // FX07
    WaitForKey(Reg), // FX0A
    SetDelayTimer(Reg), // FX15
    SetSoundTimer(Reg), // FX18
    AddToIndex(Reg), // FX1E
    FontCharacter(Reg), // FX29
    StoreBcd(Reg), // FX33
    StoreRegisters(Reg), // FX55
    LoadRegisters(Reg), // FX65
}

impl Instruction {

    /// Decode an instruction word. `address` is only used to report where an invalid
    /// opcode was found.
    pub fn decode(opcode: Opcode, address: u16) -> Result<Instruction> {
        let instruction = match opcode.nibbles() {
            (0, 0, 0xE, 0) => Instruction::ClearScreen,
            (0, 0, 0xE, 0xE) => Instruction::Return,
            (1, _, _, _) => Instruction::Jump(Addr(opcode.nnn())),
            (2, _, _, _) => Instruction::Call(Addr(opcode.nnn())),
            (3, x, _, _) => Instruction::SkipIfEqConst(Reg(x), Const(opcode.nn())),
            (4, x, _, _) => Instruction::SkipIfNeqConst(Reg(x), Const(opcode.nn())),
            (5, x, y, 0) => Instruction::SkipIfEqReg(Reg(x), Reg(y)),
            (6, x, _, _) => Instruction::SetConst(Reg(x), Const(opcode.nn())),
            (7, x, _, _) => Instruction::AddConst(Reg(x), Const(opcode.nn())),
            (8, x, y, 0) => Instruction::SetReg(Reg(x), Reg(y)),
            (8, x, y, 1) => Instruction::Or(Reg(x), Reg(y)),
            (8, x, y, 2) => Instruction::And(Reg(x), Reg(y)),
            (8, x, y, 3) => Instruction::Xor(Reg(x), Reg(y)),
            (8, x, y, 4) => Instruction::AddReg(Reg(x), Reg(y)),
            (8, x, y, 5) => Instruction::SubReg(Reg(x), Reg(y)),
            (8, x, y, 6) => Instruction::ShiftRight(Reg(x), Reg(y)),
            (8, x, y, 7) => Instruction::SubFromReg(Reg(x), Reg(y)),
            (8, x, y, 0xE) => Instruction::ShiftLeft(Reg(x), Reg(y)),
            (9, x, y, 0) => Instruction::SkipIfNeqReg(Reg(x), Reg(y)),
            (0xA, _, _, _) => Instruction::SetIndex(Addr(opcode.nnn())),
            (0xB, _, _, _) => Instruction::JumpWithOffset(Addr(opcode.nnn())),
            (0xC, x, _, _) => Instruction::Random(Reg(x), Const(opcode.nn())),
            (0xD, x, y, n) => Instruction::Draw(Reg(x), Reg(y), Const(n)),
            (0xE, x, 9, 0xE) => Instruction::SkipIfKey(Reg(x)),
            (0xE, x, 0xA, 1) => Instruction::SkipIfNotKey(Reg(x)),
            (0xF, x, 0, 7) => Instruction::GetDelayTimer(Reg(x)),
            (0xF, x, 0, 0xA) => Instruction::WaitForKey(Reg(x)),
            (0xF, x, 1, 5) => Instruction::SetDelayTimer(Reg(x)),
            (0xF, x, 1, 8) => Instruction::SetSoundTimer(Reg(x)),
            (0xF, x, 1, 0xE) => Instruction::AddToIndex(Reg(x)),
            (0xF, x, 2, 9) => Instruction::FontCharacter(Reg(x)),
            (0xF, x, 3, 3) => Instruction::StoreBcd(Reg(x)),
            (0xF, x, 5, 5) => Instruction::StoreRegisters(Reg(x)),
            (0xF, x, 6, 5) => Instruction::LoadRegisters(Reg(x)),
            _ => {
                return Err(Error::InvalidOpcode {
                    opcode: opcode.as_u16(),
                    address,
                })
            }
        };
        Ok(instruction)
    }

    pub fn from_u16(value: u16) -> Result<Instruction> {
        Instruction::decode(Opcode::from_u16(value), 0)
    }
}

/// Conventional CHIP-8 assembler mnemonics.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump(addr) => write!(f, "JP {}", addr),
            Instruction::Call(addr) => write!(f, "CALL {}", addr),
            Instruction::SkipIfEqConst(x, n) => write!(f, "SE {}, {}", x, n),
            Instruction::SkipIfNeqConst(x, n) => write!(f, "SNE {}, {}", x, n),
            Instruction::SkipIfEqReg(x, y) => write!(f, "SE {}, {}", x, y),
            Instruction::SetConst(x, n) => write!(f, "LD {}, {}", x, n),
            Instruction::AddConst(x, n) => write!(f, "ADD {}, {}", x, n),
            Instruction::SetReg(x, y) => write!(f, "LD {}, {}", x, y),
            Instruction::Or(x, y) => write!(f, "OR {}, {}", x, y),
            Instruction::And(x, y) => write!(f, "AND {}, {}", x, y),
            Instruction::Xor(x, y) => write!(f, "XOR {}, {}", x, y),
            Instruction::AddReg(x, y) => write!(f, "ADD {}, {}", x, y),
            Instruction::SubReg(x, y) => write!(f, "SUB {}, {}", x, y),
            Instruction::ShiftRight(x, y) => write!(f, "SHR {}, {}", x, y),
            Instruction::SubFromReg(x, y) => write!(f, "SUBN {}, {}", x, y),
            Instruction::ShiftLeft(x, y) => write!(f, "SHL {}, {}", x, y),
            Instruction::SkipIfNeqReg(x, y) => write!(f, "SNE {}, {}", x, y),
            Instruction::SetIndex(addr) => write!(f, "LD I, {}", addr),
            Instruction::JumpWithOffset(addr) => write!(f, "JP V0, {}", addr),
            Instruction::Random(x, n) => write!(f, "RND {}, {}", x, n),
            Instruction::Draw(x, y, Const(n)) => write!(f, "DRW {}, {}, {}", x, y, n),
            Instruction::SkipIfKey(x) => write!(f, "SKP {}", x),
            Instruction::SkipIfNotKey(x) => write!(f, "SKNP {}", x),
            Instruction::GetDelayTimer(x) => write!(f, "LD {}, DT", x),
            Instruction::WaitForKey(x) => write!(f, "LD {}, K", x),
            Instruction::SetDelayTimer(x) => write!(f, "LD DT, {}", x),
            Instruction::SetSoundTimer(x) => write!(f, "LD ST, {}", x),
            Instruction::AddToIndex(x) => write!(f, "ADD I, {}", x),
            Instruction::FontCharacter(x) => write!(f, "LD F, {}", x),
            Instruction::StoreBcd(x) => write!(f, "LD B, {}", x),
            Instruction::StoreRegisters(x) => write!(f, "LD [I], {}", x),
            Instruction::LoadRegisters(x) => write!(f, "LD {}, [I]", x),
        }
    }
}
