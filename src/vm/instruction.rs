use crate::vm::opcode::Opcode;

/// A wrapper for addresses.
#[derive(Debug, PartialEq, Eq)]
pub struct Addr(pub u16);

/// A wrapper for register indices.
#[derive(Debug, PartialEq, Eq)]
pub struct Reg(pub u8);

/// A wrapper for constants.
#[derive(Debug, PartialEq, Eq)]
pub struct Const(pub u8);

/// A single instruction from the CHIP-8 instruction set.
///
/// Two bytes written in hexadecimal, with the following special characters:
/// - NNN: address
/// - NN: 8-bit constant
/// - N: 4-bit constant
/// - X and Y: 4-bit register indices
///
/// Bit patterns that match no defined instruction decode to `Unknown`, which
/// executes as a no-op. Plenty of programs contain such words (data mixed
/// into code, or `0nnn` machine calls) and expect them to be skipped.
#[derive(Debug, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,                  // 00E0
    Return,                       // 00EE
    Jump(Addr),                   // 1NNN
    Call(Addr),                   // 2NNN
    SkipIfEqConst(Reg, Const),    // 3XNN
    SkipIfNeqConst(Reg, Const),   // 4XNN
    SkipIfEqReg(Reg, Reg),        // 5XY0
    SetConst(Reg, Const),         // 6XNN
    AddConst(Reg, Const),         // 7XNN
    Copy(Reg, Reg),               // 8XY0
    Or(Reg, Reg),                 // 8XY1
    And(Reg, Reg),                // 8XY2
    Xor(Reg, Reg),                // 8XY3
    Add(Reg, Reg),                // 8XY4
    Sub(Reg, Reg),                // 8XY5
    ShiftRight(Reg),              // 8XY6
    SubReversed(Reg, Reg),        // 8XY7
    ShiftLeft(Reg),               // 8XYE
    SkipIfNeqReg(Reg, Reg),       // 9XY0
    SetIndex(Addr),               // ANNN
    JumpPlusV0(Addr),             // BNNN
    Random(Reg, Const),           // CXNN
    Draw(Reg, Reg, Const),        // DXYN
    SkipIfKeyPressed(Reg),        // EX9E
    SkipIfKeyNotPressed(Reg),     // EXA1
    ReadDelayTimer(Reg),          // FX07
    WaitForKey(Reg),              // FX0A
    SetDelayTimer(Reg),           // FX15
    SetSoundTimer(Reg),           // FX18
    AddToIndex(Reg),              // FX1E
    FontAddress(Reg),             // FX29
    StoreBcd(Reg),                // FX33
    StoreRegisters(Reg),          // FX55
    LoadRegisters(Reg),           // FX65
    Unknown(u16),                 // anything else, executed as a no-op
}

impl Instruction {
    /// Decode an opcode word by dispatching on its high nibble, with several
    /// families further distinguished by the low nibble or low byte.
    pub fn decode(opcode: Opcode) -> Instruction {
        match opcode.nibbles() {
            (0, 0, 0xE, 0) => Instruction::ClearScreen,
            (0, 0, 0xE, 0xE) => Instruction::Return,
            (1, _, _, _) => Instruction::Jump(Addr(opcode.nnn())),
            (2, _, _, _) => Instruction::Call(Addr(opcode.nnn())),
            (3, x, _, _) => Instruction::SkipIfEqConst(Reg(x), Const(opcode.nn())),
            (4, x, _, _) => Instruction::SkipIfNeqConst(Reg(x), Const(opcode.nn())),
            (5, x, y, 0) => Instruction::SkipIfEqReg(Reg(x), Reg(y)),
            (6, x, _, _) => Instruction::SetConst(Reg(x), Const(opcode.nn())),
            (7, x, _, _) => Instruction::AddConst(Reg(x), Const(opcode.nn())),
            (8, x, y, 0) => Instruction::Copy(Reg(x), Reg(y)),
            (8, x, y, 1) => Instruction::Or(Reg(x), Reg(y)),
            (8, x, y, 2) => Instruction::And(Reg(x), Reg(y)),
            (8, x, y, 3) => Instruction::Xor(Reg(x), Reg(y)),
            (8, x, y, 4) => Instruction::Add(Reg(x), Reg(y)),
            (8, x, y, 5) => Instruction::Sub(Reg(x), Reg(y)),
            (8, x, _, 6) => Instruction::ShiftRight(Reg(x)),
            (8, x, y, 7) => Instruction::SubReversed(Reg(x), Reg(y)),
            (8, x, _, 0xE) => Instruction::ShiftLeft(Reg(x)),
            (9, x, y, 0) => Instruction::SkipIfNeqReg(Reg(x), Reg(y)),
            (0xA, _, _, _) => Instruction::SetIndex(Addr(opcode.nnn())),
            (0xB, _, _, _) => Instruction::JumpPlusV0(Addr(opcode.nnn())),
            (0xC, x, _, _) => Instruction::Random(Reg(x), Const(opcode.nn())),
            (0xD, x, y, n) => Instruction::Draw(Reg(x), Reg(y), Const(n)),
            (0xE, x, 9, 0xE) => Instruction::SkipIfKeyPressed(Reg(x)),
            (0xE, x, 0xA, 1) => Instruction::SkipIfKeyNotPressed(Reg(x)),
            (0xF, x, 0, 7) => Instruction::ReadDelayTimer(Reg(x)),
            (0xF, x, 0, 0xA) => Instruction::WaitForKey(Reg(x)),
            (0xF, x, 1, 5) => Instruction::SetDelayTimer(Reg(x)),
            (0xF, x, 1, 8) => Instruction::SetSoundTimer(Reg(x)),
            (0xF, x, 1, 0xE) => Instruction::AddToIndex(Reg(x)),
            (0xF, x, 2, 9) => Instruction::FontAddress(Reg(x)),
            (0xF, x, 3, 3) => Instruction::StoreBcd(Reg(x)),
            (0xF, x, 5, 5) => Instruction::StoreRegisters(Reg(x)),
            (0xF, x, 6, 5) => Instruction::LoadRegisters(Reg(x)),
            _ => Instruction::Unknown(opcode.as_u16()),
        }
    }

    pub fn from_u16(word: u16) -> Instruction {
        Instruction::decode(Opcode::from(word))
    }
}
