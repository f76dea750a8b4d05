use std::time::Duration;

/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Where program images are loaded and where execution starts
pub const PROGRAM_START: u16 = 0x200;

/// Where the built-in hexadecimal glyphs live
pub const FONT_START: usize = 0x000;

/// Bytes per glyph in the SPRITE_SHEET
pub const GLYPH_SIZE: u16 = 5;

pub const REGISTER_COUNT: usize = 16;

/// Maximum number of nested subroutine calls
pub const STACK_DEPTH: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: u8 = 16;

/// Time between delay/sound timer decrements.
/// 60Hz, rounded down to a tenth of a millisecond.
pub const TIMER_INTERVAL: Duration = Duration::from_micros(16_600);

/// Default host clock: 500Hz expressed in nanoseconds per instruction
pub const CLOCK_SPEED: u64 = 2_000_000;

/// # Sprite Sheet
/// One 4x5 glyph for each hexadecimal digit, stored at FONT_START.
///
/// ```text
/// 0xF0 -> ████
/// 0x90 -> █  █
/// 0x90 -> █  █
/// 0x90 -> █  █
/// 0xF0 -> ████
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
