//! The fetch-decode-execute cycle that drives a [`Machine`] one instruction
//! at a time.

use crate::vm::error::{StepError, VmError};
use crate::vm::instruction::*;
use crate::vm::machine::{Machine, FONT_GLYPH_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::vm::opcode::Opcode;
use crate::vm::rng::{RandomSource, ThreadRandom};

/// The CHIP-8 interpreter.
///
/// Owns a [`Machine`] and advances it with [`Interpreter::step`]. Timers are
/// deliberately not coupled to stepping; the driver calls
/// [`Interpreter::tick_timers`] on its own 60 Hz schedule.
pub struct Interpreter<R: RandomSource> {
    machine: Machine,
    random: R,
}

impl Interpreter<ThreadRandom> {
    /// Create an interpreter with the default random-byte source.
    pub fn new() -> Interpreter<ThreadRandom> {
        Interpreter::with_random(ThreadRandom)
    }
}

impl Default for Interpreter<ThreadRandom> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandomSource> Interpreter<R> {
    /// Create an interpreter with a custom random-byte source.
    pub fn with_random(random: R) -> Interpreter<R> {
        Interpreter {
            machine: Machine::new(),
            random,
        }
    }

    /// Copy a program into memory at 0x200.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), VmError> {
        self.machine.load_rom(rom)
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Mutable access to the machine state, used by frontends to apply key
    /// presses and releases.
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    /// Decrement both timers once. Call at 60 Hz.
    pub fn tick_timers(&mut self) {
        self.machine.tick_timers();
    }

    /// Fetch, decode and execute a single instruction.
    ///
    /// The program counter is advanced past the fetched word *before*
    /// execution, so jumps and calls are not double-advanced. On failure the
    /// error carries the opcode word and the address it was fetched from.
    pub fn step(&mut self) -> Result<(), StepError> {
        let pc = self.machine.pc();
        let high = self.machine.read_byte(pc);
        let low = self.machine.read_byte(pc.wrapping_add(1));
        let opcode = match (high, low) {
            (Ok(high), Ok(low)) => Opcode::from_bytes(high, low),
            (Err(source), _) | (_, Err(source)) => {
                // The word itself is unreadable, so report a zero opcode.
                return Err(StepError {
                    opcode: 0,
                    addr: pc,
                    source,
                });
            }
        };

        let instruction = Instruction::decode(opcode);
        log::trace!("{:#06X} at {:#05X}: {:?}", opcode.as_u16(), pc, instruction);

        self.machine.set_pc(pc.wrapping_add(2));

        self.execute(instruction).map_err(|source| StepError {
            opcode: opcode.as_u16(),
            addr: pc,
            source,
        })
    }

    /// Execute a single, already decoded instruction.
    pub fn execute(&mut self, instruction: Instruction) -> Result<(), VmError> {
        match instruction {
            Instruction::ClearScreen => {
                self.machine.clear_framebuffer();
            }

            // Return to the previous call site via the stack.
            Instruction::Return => {
                let addr = self.machine.pop()?;
                self.machine.set_pc(addr);
            }

            Instruction::Jump(Addr(addr)) => {
                self.machine.set_pc(addr);
            }

            // Store the current address on the stack, then jump.
            Instruction::Call(Addr(addr)) => {
                self.machine.push(self.machine.pc())?;
                self.machine.set_pc(addr);
            }

            Instruction::SkipIfEqConst(Reg(x), Const(n)) => {
                if self.machine.v(x) == n {
                    self.machine.skip_next();
                }
            }

            Instruction::SkipIfNeqConst(Reg(x), Const(n)) => {
                if self.machine.v(x) != n {
                    self.machine.skip_next();
                }
            }

            Instruction::SkipIfEqReg(Reg(x), Reg(y)) => {
                if self.machine.v(x) == self.machine.v(y) {
                    self.machine.skip_next();
                }
            }

            Instruction::SetConst(Reg(x), Const(n)) => {
                self.machine.set_v(x, n);
            }

            // Wrapping add, and no flag change, unlike Add below.
            Instruction::AddConst(Reg(x), Const(n)) => {
                self.machine.set_v(x, self.machine.v(x).wrapping_add(n));
            }

            Instruction::Copy(Reg(x), Reg(y)) => {
                self.machine.set_v(x, self.machine.v(y));
            }

            Instruction::Or(Reg(x), Reg(y)) => {
                self.machine.set_v(x, self.machine.v(x) | self.machine.v(y));
            }

            Instruction::And(Reg(x), Reg(y)) => {
                self.machine.set_v(x, self.machine.v(x) & self.machine.v(y));
            }

            Instruction::Xor(Reg(x), Reg(y)) => {
                self.machine.set_v(x, self.machine.v(x) ^ self.machine.v(y));
            }

            // VF becomes the carry of the 8-bit add. The result is written
            // first, so VF holds the flag even when x is 0xF.
            Instruction::Add(Reg(x), Reg(y)) => {
                let (sum, carry) = self.machine.v(x).overflowing_add(self.machine.v(y));
                self.machine.set_v(x, sum);
                self.machine.set_v(0xF, carry as u8);
            }

            // The borrow flag is computed from the operands before the
            // subtraction mutates Vx.
            Instruction::Sub(Reg(x), Reg(y)) => {
                let no_borrow = self.machine.v(x) >= self.machine.v(y);
                self.machine.set_v(0xF, no_borrow as u8);
                self.machine
                    .set_v(x, self.machine.v(x).wrapping_sub(self.machine.v(y)));
            }

            // VF takes the shifted-out bit. Vx is re-read after the flag
            // write, which matters when x is 0xF.
            Instruction::ShiftRight(Reg(x)) => {
                self.machine.set_v(0xF, self.machine.v(x) & 0x1);
                self.machine.set_v(x, self.machine.v(x) >> 1);
            }

            Instruction::SubReversed(Reg(x), Reg(y)) => {
                let no_borrow = self.machine.v(y) >= self.machine.v(x);
                self.machine.set_v(0xF, no_borrow as u8);
                self.machine
                    .set_v(x, self.machine.v(y).wrapping_sub(self.machine.v(x)));
            }

            Instruction::ShiftLeft(Reg(x)) => {
                self.machine.set_v(0xF, (self.machine.v(x) & 0x80) >> 7);
                self.machine.set_v(x, self.machine.v(x) << 1);
            }

            Instruction::SkipIfNeqReg(Reg(x), Reg(y)) => {
                if self.machine.v(x) != self.machine.v(y) {
                    self.machine.skip_next();
                }
            }

            Instruction::SetIndex(Addr(addr)) => {
                self.machine.set_i(addr);
            }

            Instruction::JumpPlusV0(Addr(addr)) => {
                self.machine.set_pc(addr.wrapping_add(self.machine.v(0) as u16));
            }

            Instruction::Random(Reg(x), Const(n)) => {
                let byte = self.random.random_byte();
                self.machine.set_v(x, byte & n);
            }

            Instruction::Draw(Reg(x), Reg(y), Const(n)) => {
                self.draw_sprite(x, y, n)?;
            }

            Instruction::SkipIfKeyPressed(Reg(x)) => {
                if self.machine.is_key_pressed(self.machine.v(x))? {
                    self.machine.skip_next();
                }
            }

            Instruction::SkipIfKeyNotPressed(Reg(x)) => {
                if !self.machine.is_key_pressed(self.machine.v(x))? {
                    self.machine.skip_next();
                }
            }

            Instruction::ReadDelayTimer(Reg(x)) => {
                self.machine.set_v(x, self.machine.delay_timer());
            }

            // Block until a key is pressed, without actually blocking: if no
            // key is down the program counter rewinds so the instruction
            // re-executes on the next step, keeping timers and rendering
            // live. The consumed key's flag is cleared, so each press is
            // observed at most once. (Ports disagree on the clearing; this
            // keeps the behavior downstream programs here rely on.)
            Instruction::WaitForKey(Reg(x)) => match self.machine.first_pressed_key() {
                Some(key) => {
                    self.machine.set_v(x, key);
                    self.machine.key_up(key);
                }
                None => self.machine.rewind_pc(),
            },

            Instruction::SetDelayTimer(Reg(x)) => {
                self.machine.set_delay_timer(self.machine.v(x));
            }

            Instruction::SetSoundTimer(Reg(x)) => {
                self.machine.set_sound_timer(self.machine.v(x));
            }

            // No overflow flag, unlike the register-register add.
            Instruction::AddToIndex(Reg(x)) => {
                self.machine
                    .set_i(self.machine.i().wrapping_add(self.machine.v(x) as u16));
            }

            Instruction::FontAddress(Reg(x)) => {
                self.machine
                    .set_i(self.machine.v(x) as u16 * FONT_GLYPH_SIZE);
            }

            // Hundreds, tens, ones at I, I+1, I+2.
            Instruction::StoreBcd(Reg(x)) => {
                let value = self.machine.v(x);
                let i = self.machine.i();
                self.machine.write_byte(i, value / 100)?;
                self.machine.write_byte(i.wrapping_add(1), (value / 10) % 10)?;
                self.machine.write_byte(i.wrapping_add(2), value % 10)?;
            }

            // Store V0..=Vx at I. I itself is left unchanged.
            Instruction::StoreRegisters(Reg(x)) => {
                let i = self.machine.i();
                for reg in 0..=x {
                    self.machine
                        .write_byte(i.wrapping_add(reg as u16), self.machine.v(reg))?;
                }
            }

            Instruction::LoadRegisters(Reg(x)) => {
                let i = self.machine.i();
                for reg in 0..=x {
                    let value = self.machine.read_byte(i.wrapping_add(reg as u16))?;
                    self.machine.set_v(reg, value);
                }
            }

            // Deliberate leniency: anything undecodable only advanced PC.
            Instruction::Unknown(word) => {
                log::debug!("ignoring unknown opcode {:#06X}", word);
            }
        };
        Ok(())
    }

    /// Draw an n-byte sprite from memory at I to (Vx, Vy).
    ///
    /// The starting position wraps around the screen once; rows and columns
    /// that would then fall outside the grid are clipped, not wrapped. VF is
    /// set to 1 if the draw erases any lit pixel.
    fn draw_sprite(&mut self, x: u8, y: u8, n: u8) -> Result<(), VmError> {
        let start_x = (self.machine.v(x) as usize) % SCREEN_WIDTH;
        let start_y = (self.machine.v(y) as usize) % SCREEN_HEIGHT;

        self.machine.set_v(0xF, 0);

        for row in 0..n as usize {
            let py = start_y + row;
            if py >= SCREEN_HEIGHT {
                break;
            }

            let sprite_byte = self.machine.read_byte(self.machine.i().wrapping_add(row as u16))?;
            for col in 0..8 {
                let px = start_x + col;
                if px >= SCREEN_WIDTH {
                    break;
                }

                if (sprite_byte >> (7 - col)) & 1 == 1 {
                    if self.machine.pixel(px, py) == 1 {
                        self.machine.set_v(0xF, 1);
                    }
                    self.machine.flip_pixel(px, py);
                }
            }
        }

        Ok(())
    }
}
