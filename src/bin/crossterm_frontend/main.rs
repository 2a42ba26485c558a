use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{read, Event, KeyCode};
use structopt::StructOpt;

use chip8_vm::vm::interpreter::Interpreter;
use chip8_vm::vm::rng::ThreadRandom;

mod keymap;
mod screen;

use keymap::{keymap, KeyTracker};
use screen::Screen;

/// Tick the timers at 60 Hz.
const TIMER_INTERVAL: Duration = Duration::from_micros(1_000_000 / 60);
/// Throttle instruction execution lightly, as the original did.
const STEP_INTERVAL: Duration = Duration::from_millis(2);
/// How long a key press counts as held, since terminals report no releases.
const KEY_HOLD: Duration = Duration::from_millis(200);

/// The program options.
#[derive(StructOpt)]
struct Opt {
    /// The ROM to execute
    #[structopt(parse(from_os_str))]
    rom: PathBuf,
}

/// Everything the three threads share: the interpreter itself and the
/// key-hold bookkeeping. A single mutex guards it all, so the step loop, the
/// 60 Hz ticker and the key listener never race on timers, keypad flags or
/// the framebuffer.
struct Shared {
    vm: Interpreter<ThreadRandom>,
    keys: KeyTracker,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Get configuration and read the ROM
    let opt = Opt::from_args();
    log::info!("Executing {:?}", &opt.rom);
    let rom = std::fs::read(&opt.rom)?;

    let mut vm = Interpreter::new();
    vm.load(&rom)?;

    let shared = Arc::new(Mutex::new(Shared {
        vm,
        keys: KeyTracker::new(),
    }));
    let stop = Arc::new(Mutex::new(false));

    spawn_timer_ticker(shared.clone(), stop.clone());
    spawn_key_listener(shared.clone(), stop.clone());

    let mut screen = Screen::new()?;
    let result = run(&shared, &stop, &mut screen);

    // Stop the timer thread and restore the terminal before reporting
    // whatever ended the run.
    *stop.lock().unwrap() = true;
    drop(screen);
    result
}

/// The fetch-execute loop: release stale keys, step once, then hand the
/// framebuffer and sound state to the renderer.
fn run(
    shared: &Arc<Mutex<Shared>>,
    stop: &Arc<Mutex<bool>>,
    screen: &mut Screen,
) -> Result<(), Box<dyn Error>> {
    loop {
        if *stop.lock().unwrap() {
            return Ok(());
        }

        {
            let mut guard = shared.lock().unwrap();
            for key in guard.keys.sweep(KEY_HOLD) {
                guard.vm.machine_mut().key_up(key);
            }

            guard.vm.step()?;

            let beeping = guard.vm.machine().sound_timer() > 0;
            screen.render(guard.vm.machine().framebuffer(), beeping)?;
        }

        thread::sleep(STEP_INTERVAL);
    }
}

/// Decrement the timers at a fixed 60 Hz, independently of how fast the
/// instruction loop runs.
fn spawn_timer_ticker(shared: Arc<Mutex<Shared>>, stop: Arc<Mutex<bool>>) -> JoinHandle<()> {
    thread::spawn(move || loop {
        thread::sleep(TIMER_INTERVAL);
        if *stop.lock().unwrap() {
            break;
        }
        shared.lock().unwrap().vm.tick_timers();
    })
}

/// Listen for key events and apply them to the keypad. Esc stops the run.
fn spawn_key_listener(shared: Arc<Mutex<Shared>>, stop: Arc<Mutex<bool>>) -> JoinHandle<()> {
    thread::spawn(move || loop {
        let event = match read() {
            Ok(event) => event,
            Err(_) => break,
        };
        log::trace!("got event {:?}", event);

        if *stop.lock().unwrap() {
            break;
        }

        if let Event::Key(key_event) = event {
            if key_event.code == KeyCode::Esc {
                *stop.lock().unwrap() = true;
                break;
            }
            if let Some(key) = keymap(key_event.code) {
                let mut guard = shared.lock().unwrap();
                guard.keys.press(key);
                guard.vm.machine_mut().key_down(key);
            }
        }
    })
}
