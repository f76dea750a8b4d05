use std::io;

use crate::constants::STACK_DEPTH;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a single step of the Chip-8.
///
/// A faulting step never commits a partial state change; the machine is left
/// as it was before the offending instruction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown opcode {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("stack overflow: more than {depth} nested calls", depth = STACK_DEPTH)]
    StackOverflow,

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("program image is {size} bytes but only {max} fit in memory")]
    RomTooLarge { size: usize, max: usize },

    #[error("unable to read program image")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the error came from executing an instruction rather than loading one
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Error::UnknownOpcode { .. }
                | Error::MemoryOutOfBounds { .. }
                | Error::StackOverflow
                | Error::StackUnderflow
        )
    }
}
