use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;

use chip8_vm::vm::interpreter::Interpreter;

/// Run a ROM without a display. Useful for debugging ROMs and the
/// interpreter itself with RUST_LOG=trace.
#[derive(StructOpt)]
struct Opt {
    /// The ROM to execute
    #[structopt(parse(from_os_str))]
    rom: PathBuf,

    /// Stop after this many instructions instead of running forever
    #[structopt(short, long)]
    steps: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get configuration and read the ROM
    let opt = Opt::from_args();
    log::info!("Executing {:?}", &opt.rom);
    let rom = std::fs::read(&opt.rom)?;

    let mut vm = Interpreter::new();
    vm.load(&rom)?;

    // With no renderer there is nothing to synchronize with, so the 60 Hz
    // timer cadence is folded into the step loop: at 600 steps per second,
    // tick the timers every tenth step.
    let mut executed: u64 = 0;
    while opt.steps.map_or(true, |limit| executed < limit) {
        vm.step()?;
        executed += 1;
        if executed % 10 == 0 {
            vm.tick_timers();
        }
        std::thread::sleep(Duration::from_micros(1_000_000 / 600));
    }

    Ok(())
}
