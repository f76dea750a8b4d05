use std::io::Read;
use std::time::Instant;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{KEY_COUNT, MEMORY_SIZE, PROGRAM_START};
use crate::error::{Error, Result};
use crate::instruction::Instruction;
use crate::operations::await_key;
use crate::state::{FrameBuffer, State};
use crate::timer::{Clock, SystemClock, TimerDriver};

/// What a call to `Chip8::step` did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// An instruction ran, or a pending FX0A was satisfied
    Running,
    /// Waiting on FX0A for a key to go down; nothing changed
    AwaitingKey,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the `timers` driver and the `clock` it is polled with
///  - the random number generator used by CXNN
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU by one instruction
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
pub struct Chip8 {
    state: State,
    timers: TimerDriver,
    clock: Box<dyn Clock>,
    rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A Chip8 whose random numbers are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            state: State::new(),
            timers: TimerDriver::new(),
            clock: Box::new(SystemClock),
            rng,
        }
    }

    /// Replaces the clock that `advance_timers` reads
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a reader that yields the whole program image
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<()> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.load_program(&program)
    }

    /// Copies a program image into memory at 0x200.
    /// The bytes aren't validated; bad instructions fault when they're reached.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        let max = MEMORY_SIZE - PROGRAM_START as usize;
        if program.len() > max {
            return Err(Error::RomTooLarge {
                size: program.len(),
                max,
            });
        }
        self.state.write(PROGRAM_START, program)?;
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// Returns the FrameBuffer if it changed since the last call
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// The FrameBuffer as it is right now
    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Replace the key latch; bit n is set while key n is down
    pub fn set_keys(&mut self, keys: u16) {
        self.state.keys = keys;
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        if key < KEY_COUNT {
            self.state.keys |= 1 << key;
        } else {
            warn!("ignoring press of unknown key {:#X}", key);
        }
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        if key < KEY_COUNT {
            self.state.keys &= !(1 << key);
        } else {
            warn!("ignoring release of unknown key {:#X}", key);
        }
    }

    pub fn is_awaiting_key(&self) -> bool {
        self.state.key_wait.is_some()
    }

    /// Whether a beep should currently be playing
    pub fn is_sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// Advances the CPU by a single instruction
    /// - while awaiting a keypress only checks the key latch
    /// - otherwise fetches, decodes and executes the opcode at the pc
    ///
    /// On error the state is left as it was before the step.
    pub fn step(&mut self) -> Result<Status> {
        if let Some(wait) = self.state.key_wait {
            self.state = await_key(wait, &self.state);
            return Ok(match self.state.key_wait {
                Some(_) => Status::AwaitingKey,
                None => {
                    debug!(
                        "V{:X} received key {:X}",
                        wait.register, self.state.v[wait.register as usize]
                    );
                    Status::Running
                }
            });
        }

        match self.execute_next() {
            Ok(state) => {
                self.state = state;
                if let Some(wait) = state.key_wait {
                    debug!("awaiting key for V{:X}", wait.register);
                }
                Ok(Status::Running)
            }
            Err(e) => {
                warn!("fault at pc {:04X}: {}", self.state.pc, e);
                Err(e)
            }
        }
    }

    /// Runs the instruction at the pc against a copy of the state
    fn execute_next(&mut self) -> Result<State> {
        let op = self.state.fetch()?;
        trace!(
            "{:?} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            self.state.pc
        );
        Instruction::decode(op).execute(&self.state, &mut self.rng)
    }

    /// Polls the timer driver with the Chip8's clock
    pub fn advance_timers(&mut self) -> bool {
        let now = self.clock.now();
        self.advance_timers_at(now)
    }

    /// Polls the timer driver as if the time were `now`
    pub fn advance_timers_at(&mut self, now: Instant) -> bool {
        self.timers.advance(now, &mut self.state)
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::timer::tests::ManualClock;

    fn chip8_with(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_seed(0x8);
        chip8.load_program(program).unwrap();
        chip8
    }

    #[test]
    fn test_load_program_at_0x200() {
        let chip8 = chip8_with(&[0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(chip8.state.memory[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(chip8.state.memory[0x00..0x02], [0xF0, 0x90]);
    }

    #[test]
    fn test_load_rom_from_reader() {
        let mut chip8 = Chip8::with_seed(0x8);
        let mut rom: &[u8] = &[0x60, 0x2A];
        chip8.load_rom(&mut rom).unwrap();
        assert_eq!(chip8.state.memory[0x200..0x202], [0x60, 0x2A]);
    }

    #[test]
    fn test_load_fills_memory() {
        let mut chip8 = Chip8::with_seed(0x8);
        assert!(chip8.load_program(&[0xAB; 0xE00]).is_ok());
        assert_eq!(chip8.state.memory[0xFFF], 0xAB);
        assert!(matches!(
            chip8.load_program(&[0xAB; 0xE01]),
            Err(Error::RomTooLarge {
                size: 0xE01,
                max: 0xE00
            })
        ));
    }

    #[test]
    fn test_cycles_while_no_register_needs_key() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        let starting_pc = chip8.state.pc;
        assert_eq!(chip8.step().unwrap(), Status::Running);
        assert_eq!(chip8.state.pc, starting_pc + 0x2);
    }

    #[test]
    fn test_fault_leaves_state_untouched() {
        let mut chip8 = chip8_with(&[0x61, 0x05, 0x00, 0xEE]);
        chip8.step().unwrap();
        let before = chip8.state;
        let err = chip8.step().unwrap_err();
        assert!(err.is_fault());
        assert!(matches!(err, Error::StackUnderflow));
        assert_eq!(chip8.state, before);
    }

    #[test]
    fn test_fetch_past_memory_faults() {
        let mut chip8 = chip8_with(&[0x1F, 0xFF]);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0xFFF);
        assert!(matches!(
            chip8.step(),
            Err(Error::MemoryOutOfBounds { address: 0x1000 })
        ));
    }

    #[test]
    fn test_doesnt_cycle_while_register_needs_key() {
        // LD V1, K ; LD V2, 0x42
        let mut chip8 = chip8_with(&[0xF1, 0x0A, 0x62, 0x42]);
        chip8.step().unwrap();
        assert!(chip8.is_awaiting_key());
        let blocked = chip8.state;
        for _ in 0..5 {
            assert_eq!(chip8.step().unwrap(), Status::AwaitingKey);
            assert_eq!(chip8.state, blocked);
        }
        assert_eq!(chip8.state.pc, 0x200);
    }

    #[test]
    fn test_captures_key_presses() {
        let mut chip8 = chip8_with(&[0xF1, 0x0A, 0x62, 0x42]);
        chip8.step().unwrap();
        chip8.key_press(0xE);
        assert_eq!(chip8.step().unwrap(), Status::Running);
        assert!(!chip8.is_awaiting_key());
        assert_eq!(chip8.state.v[0x1], 0xE);
        assert_eq!(chip8.state.pc, 0x202);

        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x2], 0x42);
        assert_eq!(chip8.state.pc, 0x204);
    }

    #[test]
    fn test_key_press_and_release() {
        let mut chip8 = Chip8::with_seed(0x8);
        chip8.key_press(0x3);
        chip8.key_press(0xF);
        assert_eq!(chip8.state.keys, 0x8008);
        chip8.key_release(0x3);
        chip8.key_press(0x10);
        assert_eq!(chip8.state.keys, 0x8000);
        chip8.set_keys(0x0001);
        assert_eq!(chip8.state.keys, 0x0001);
    }

    #[test]
    fn test_take_frame_once_per_draw() {
        // LD I, 0x000 ; DRW V0, V0, 5
        let mut chip8 = chip8_with(&[0xA0, 0x00, 0xD0, 0x05]);
        chip8.step().unwrap();
        assert!(chip8.take_frame().is_none());
        chip8.step().unwrap();
        let frame = chip8.take_frame().unwrap();
        assert_eq!(frame[0][0..4], [1, 1, 1, 1]);
        assert!(chip8.take_frame().is_none());
        assert_eq!(chip8.frame()[0][0..4], [1, 1, 1, 1]);
    }

    #[test]
    fn test_timers_follow_the_clock() {
        let clock = ManualClock::new();
        // LD V0, 0x03 ; LD DT, V0 ; LD ST, V0
        let mut chip8 = chip8_with(&[0x60, 0x03, 0xF0, 0x15, 0xF0, 0x18]).with_clock(clock.clone());
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        assert!(chip8.is_sound_active());

        assert!(!chip8.advance_timers());
        for remaining in (0..3).rev() {
            clock.advance(Duration::from_micros(16_600));
            assert!(chip8.advance_timers());
            assert_eq!(chip8.state.delay_timer, remaining);
        }
        assert!(!chip8.is_sound_active());
    }

    #[test]
    fn test_timers_run_while_awaiting_key() {
        let clock = ManualClock::new();
        // LD V0, 0x02 ; LD DT, V0 ; LD V1, K
        let mut chip8 = chip8_with(&[0x60, 0x02, 0xF0, 0x15, 0xF1, 0x0A]).with_clock(clock.clone());
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        chip8.advance_timers();
        clock.advance(Duration::from_micros(16_600));
        assert_eq!(chip8.step().unwrap(), Status::AwaitingKey);
        chip8.advance_timers();
        assert_eq!(chip8.state.delay_timer, 1);
        assert_eq!(chip8.state.v[0x1], 0x0);
    }
}
