use std::path::PathBuf;
use std::process;

use log::{error, LevelFilter};
use simple_logger::SimpleLogger;

mod display;
mod run;

fn main() {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Info).env().init() {
        eprintln!("unable to start logger: {}", e);
    }

    let mut args = std::env::args().skip(1);
    let rom = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: vm8-run <rom> [cycles]");
            process::exit(2);
        }
    };
    let cycles = match args.next().map(|n| n.parse::<u64>()) {
        Some(Ok(n)) => Some(n),
        Some(Err(e)) => {
            eprintln!("cycles must be a number: {}", e);
            process::exit(2);
        }
        None => None,
    };

    if let Err(e) = run::run(rom, cycles) {
        error!("{}", e);
        process::exit(1);
    }
}
