use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_START, KEY_COUNT, MEMORY_SIZE, PROGRAM_START,
    REGISTER_COUNT, SPRITE_SHEET, STACK_DEPTH,
};
use crate::error::{Error, Result};
use crate::opcode::Opcode;

/// The FrameBuffer is indexed as [y][x]; every cell is either 0 or 1
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// The machine is stalled on FX0A until a key goes down.
///
/// `held` is the key latch as last observed while waiting, so a key that was
/// already down when the wait began has to be released and pressed again.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyWait {
    pub register: u8,
    pub held: u16,
}

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) holds whichever flag was written last
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented at 60Hz by the TimerDriver
///
/// ## Memory
/// - a stack of STACK_DEPTH return addresses
/// - 4096 bytes of addressable memory, with the sprite sheet at 0x000
/// - 64x32 frame buffer
///
/// ## Input
/// - a 16-bit latch with one bit per key 0..F
/// - execution halts while `key_wait` is Some
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub keys: u16,
    pub key_wait: Option<KeyWait>,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[FONT_START..FONT_START + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            keys: 0,
            key_wait: None,
        }
    }

    /// Reads the opcode the pc points at
    pub fn fetch(&self) -> Result<Opcode> {
        let bytes = self.read(self.pc, 2)?;
        Ok(Opcode::from_bytes(bytes[0], bytes[1]))
    }

    /// Borrows `len` bytes of memory starting at `addr`
    pub fn read(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let start = addr as usize;
        self.memory
            .get(start..start + len)
            .ok_or_else(|| out_of_bounds(start))
    }

    /// Copies `data` into memory starting at `addr`; nothing is written unless all of it fits
    pub fn write(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        let start = addr as usize;
        self.memory
            .get_mut(start..start + data.len())
            .ok_or_else(|| out_of_bounds(start))?
            .copy_from_slice(data);
        Ok(())
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        let slot = self
            .stack
            .get_mut(self.sp as usize)
            .ok_or(Error::StackOverflow)?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp as usize])
    }

    /// Whether `key` is currently held according to the key latch
    pub fn is_key_down(&self, key: u8) -> bool {
        key < KEY_COUNT && self.keys & (1 << key) != 0
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// The first address of an access starting at `start` that falls outside memory
fn out_of_bounds(start: usize) -> Error {
    Error::MemoryOutOfBounds {
        address: start.max(MEMORY_SIZE),
    }
}
