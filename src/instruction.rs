use rand::RngCore;

use crate::error::{Error, Result};
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// A decoded opcode together with its operands
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqByte { x: u8, kk: u8 },
    /// 4xkk
    SkipNeByte { x: u8, kk: u8 },
    /// 5xy0
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadByte { x: u8, kk: u8 },
    /// 7xkk
    AddByte { x: u8, kk: u8 },
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
    SubN { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8 },
    /// 9xy0
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    LoadI { addr: u16 },
    /// Bnnn
    JumpV0 { addr: u16 },
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipPressed { x: u8 },
    /// ExA1
    SkipNotPressed { x: u8 },
    /// Fx07
    LoadDelay { x: u8 },
    /// Fx0A
    AwaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddI { x: u8 },
    /// Fx29
    LoadGlyph { x: u8 },
    /// Fx33
    Bcd { x: u8 },
    /// Fx55
    Store { x: u8 },
    /// Fx65
    Restore { x: u8 },
    /// Anything else
    Unknown(Opcode),
}

impl Instruction {
    /// Selects the Instruction for a given Opcode.
    /// Total: opcodes with no defined meaning decode to `Unknown`.
    pub fn decode(op: Opcode) -> Self {
        use Instruction::*;

        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.addr());
        match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Clear,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, ..) => Jump { addr },
            (0x2, ..) => Call { addr },
            (0x3, ..) => SkipEqByte { x, kk },
            (0x4, ..) => SkipNeByte { x, kk },
            (0x5, .., 0x0) => SkipEqReg { x, y },
            (0x6, ..) => LoadByte { x, kk },
            (0x7, ..) => AddByte { x, kk },
            (0x8, .., 0x0) => Move { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddReg { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => ShiftRight { x },
            (0x8, .., 0x7) => SubN { x, y },
            (0x8, .., 0xE) => ShiftLeft { x },
            (0x9, .., 0x0) => SkipNeReg { x, y },
            (0xA, ..) => LoadI { addr },
            (0xB, ..) => JumpV0 { addr },
            (0xC, ..) => Random { x, kk },
            (0xD, ..) => Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => SkipPressed { x },
            (0xE, _, 0xA, 0x1) => SkipNotPressed { x },
            (0xF, _, 0x0, 0x7) => LoadDelay { x },
            (0xF, _, 0x0, 0xA) => AwaitKey { x },
            (0xF, _, 0x1, 0x5) => SetDelay { x },
            (0xF, _, 0x1, 0x8) => SetSound { x },
            (0xF, _, 0x1, 0xE) => AddI { x },
            (0xF, _, 0x2, 0x9) => LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => Bcd { x },
            (0xF, _, 0x5, 0x5) => Store { x },
            (0xF, _, 0x6, 0x5) => Restore { x },
            _ => Unknown(op),
        }
    }

    /// Applies the instruction to `state` and returns the state that follows it.
    ///
    /// The pc is moved past the instruction before the operation runs, so
    /// jumps, calls and skips act on the address of the next instruction.
    pub fn execute(self, state: &State, rng: &mut dyn RngCore) -> Result<State> {
        use Instruction::*;

        let state = &State {
            pc: state.pc.wrapping_add(0x2),
            ..*state
        };
        match self {
            Clear => clr(state),
            Return => rts(state),
            Jump { addr } => jump(addr, state),
            Call { addr } => call(addr, state),
            SkipEqByte { x, kk } => ske(x, kk, state),
            SkipNeByte { x, kk } => skne(x, kk, state),
            SkipEqReg { x, y } => skre(x, y, state),
            LoadByte { x, kk } => load(x, kk, state),
            AddByte { x, kk } => add(x, kk, state),
            Move { x, y } => mv(x, y, state),
            Or { x, y } => or(x, y, state),
            And { x, y } => and(x, y, state),
            Xor { x, y } => xor(x, y, state),
            AddReg { x, y } => addr(x, y, state),
            Sub { x, y } => sub(x, y, state),
            ShiftRight { x } => shr(x, state),
            SubN { x, y } => subn(x, y, state),
            ShiftLeft { x } => shl(x, state),
            SkipNeReg { x, y } => skrne(x, y, state),
            LoadI { addr } => loadi(addr, state),
            JumpV0 { addr } => jumpi(addr, state),
            Random { x, kk } => rand(x, kk, state, rng),
            Draw { x, y, n } => draw(x, y, n, state),
            SkipPressed { x } => skpr(x, state),
            SkipNotPressed { x } => skup(x, state),
            LoadDelay { x } => moved(x, state),
            AwaitKey { x } => keyd(x, state),
            SetDelay { x } => loads(x, state),
            SetSound { x } => ld(x, state),
            AddI { x } => addi(x, state),
            LoadGlyph { x } => ldspr(x, state),
            Bcd { x } => bcd(x, state),
            Store { x } => stor(x, state),
            Restore { x } => read(x, state),
            Unknown(op) => Err(Error::UnknownOpcode { opcode: op.0 }),
        }
    }
}
