/*!

A CHIP-8 virtual machine as described at https://en.wikipedia.org/wiki/CHIP-8.

The crate is split into the machine state (memory, registers, stack, timers,
framebuffer and keypad) and an interpreter that drives it one instruction at
a time. Frontends are expected to call `step` at their own pace, tick the
timers at 60 Hz on a schedule of their own, and read the framebuffer and
sound timer after each step.

# Crossterm Frontend

If you want to try the virtual machine on some programs, there is a
ready-to-use terminal frontend you can run with
`cargo run --release --bin crossterm_frontend -- <rom>`.
The keys 1-4, q-r, a-f and z-v map to the 16-key CHIP-8 keypad,
but which ones to use depends on the program.

# Library

The main way of running a program is to load it as bytes and step through it.

```rust
use chip8_vm::vm::interpreter::Interpreter;

let mut vm = Interpreter::new();

// Load a program at address 0x200.
let clear_display = [0x00, 0xE0];
vm.load(&clear_display).unwrap();
vm.step().unwrap(); // Will now clear the framebuffer
```

Timers are not coupled to instruction execution; drive them separately:

```rust
use chip8_vm::vm::interpreter::Interpreter;

let mut vm = Interpreter::new();
vm.load(&[0x12, 0x00]).unwrap(); // jump-to-self
vm.tick_timers(); // call this at 60 Hz from your own schedule
```

## Custom randomness

The `Cxnn` instruction needs a source of random bytes. By default this is the
thread-local generator from `rand`, but anything implementing `RandomSource`
can be substituted, which is how the tests pin down exact masked results.

```rust
use chip8_vm::vm::interpreter::Interpreter;
use chip8_vm::vm::rng::FixedSequence;

let mut vm = Interpreter::with_random(FixedSequence::new(vec![0xAB]));
vm.load(&[0xC0, 0xFF]).unwrap(); // V0 = random byte AND 0xFF
vm.step().unwrap();
assert_eq!(vm.machine().v(0), 0xAB);
```
*/

pub mod vm;
