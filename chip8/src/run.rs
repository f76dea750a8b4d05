use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::info;

use vm8::{Chip8, Status, CLOCK_SPEED};

use crate::display;

/// Runs a rom headless, printing every new frame to stdout.
///
/// Stops after `cycles` steps if given, otherwise when the program faults.
/// No keyboard is attached, so a program waiting on a key waits forever
/// unless the cycle limit ends the run.
pub fn run(rom: PathBuf, cycles: Option<u64>) -> vm8::Result<()> {
    let mut chip8: Chip8 = Chip8::new();

    // Load ROM
    let file = File::open(&rom)?;
    let mut reader = BufReader::new(file);
    chip8.load_rom(&mut reader)?;
    info!("loaded {}", rom.display());

    // Set initial timing
    let cycle_time: Duration = Duration::from_nanos(CLOCK_SPEED);
    let mut last_cycle: Instant = Instant::now();
    let mut executed: u64 = 0;
    let mut waiting = false;

    while cycles.map_or(true, |limit| executed < limit) {
        // The host has no input device; every key reads as released
        chip8.set_keys(0);

        // Update state
        let status = chip8.step()?;
        if status == Status::AwaitingKey && !waiting {
            info!("program is waiting for a key");
        }
        waiting = status == Status::AwaitingKey;
        chip8.advance_timers();
        executed += 1;

        // If a draw happened, render the new frame
        if let Some(frame) = chip8.take_frame() {
            print!("{}", display::render(&frame));
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    info!("stopped after {} cycles", executed);
    Ok(())
}
