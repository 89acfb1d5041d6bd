use std::process;

use crate::disk::FileDisk;
use crate::shell::start_shell;

mod disk;
mod fs;
mod shell;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (path, nblocks) = match (args.next(), args.next()) {
        (Some(path), Some(nblocks)) => (path, nblocks),
        _ => {
            eprintln!("Usage: simplefs <path_to_image> <number_of_blocks>");
            process::exit(1);
        }
    };

    let nblocks: u32 = match nblocks.parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("error: invalid number_of_blocks value (use a valid number)");
            process::exit(1);
        }
    };

    let disk = match FileDisk::open(&path, nblocks) {
        Ok(disk) => disk,
        Err(e) => {
            eprintln!("failed to open disk: {}", e);
            process::exit(1);
        }
    };

    start_shell(disk);
}
