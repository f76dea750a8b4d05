pub use chip8::{Chip8, Status};
pub use constants::CLOCK_SPEED;
pub use error::{Error, Result};
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use state::FrameBuffer;
pub use timer::{Clock, SystemClock, TimerDriver};

mod chip8;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
mod timer;
