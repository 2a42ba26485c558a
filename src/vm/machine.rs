//! The machine state: memory, registers, call stack, timers, framebuffer and
//! keypad, with invariant-checked accessors. No opcode knowledge lives here.

use crate::vm::error::VmError;

pub const MEM_SIZE: usize = 4096;
pub const NUM_REGISTERS: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const NUM_KEYS: usize = 16;
pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const PC_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = MEM_SIZE - PC_START as usize;

/// Each built-in font glyph is this many bytes tall.
pub const FONT_GLYPH_SIZE: u16 = 5;

const FONT: [u8; 80] = [
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

/// The full state of a CHIP-8 machine.
///
/// Created once per run with the program counter at 0x200 and the font
/// sprites pre-loaded at 0x000. Everything else starts zeroed.
pub struct Machine {
    memory: [u8; MEM_SIZE],
    v: [u8; NUM_REGISTERS],
    i: u16,
    pc: u16,
    sp: u8,
    stack: [u16; STACK_SIZE],
    delay_timer: u8,
    sound_timer: u8,
    framebuffer: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    keys: [bool; NUM_KEYS],
}

impl Machine {
    pub fn new() -> Machine {
        let mut memory = [0; MEM_SIZE];
        memory[..FONT.len()].copy_from_slice(&FONT);

        Machine {
            memory,
            v: [0; NUM_REGISTERS],
            i: 0,
            pc: PC_START,
            sp: 0,
            stack: [0; STACK_SIZE],
            delay_timer: 0,
            sound_timer: 0,
            framebuffer: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            keys: [false; NUM_KEYS],
        }
    }

    /// Copy a program into memory at 0x200.
    ///
    /// Fails without mutating any state if the program does not fit in the
    /// 3584 bytes above the reserved area.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), VmError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(VmError::RomTooLarge {
                len: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = PC_START as usize;
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    pub fn read_byte(&self, addr: u16) -> Result<u8, VmError> {
        self.memory
            .get(addr as usize)
            .copied()
            .ok_or(VmError::MemoryOutOfBounds { addr })
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), VmError> {
        match self.memory.get_mut(addr as usize) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(VmError::MemoryOutOfBounds { addr }),
        }
    }

    /// Read register Vx. `index` comes from an opcode nibble, so 0..=0xF.
    pub fn v(&self, index: u8) -> u8 {
        debug_assert!((index as usize) < NUM_REGISTERS);
        self.v[index as usize]
    }

    pub fn set_v(&mut self, index: u8, value: u8) {
        debug_assert!((index as usize) < NUM_REGISTERS);
        self.v[index as usize] = value;
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn set_i(&mut self, value: u16) {
        self.i = value;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, addr: u16) {
        self.pc = addr;
    }

    /// Advance past the next instruction, used by the skip opcodes.
    pub fn skip_next(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Move back to the previous instruction so it re-executes on the next
    /// step. Used by the key-wait opcode to poll cooperatively.
    pub fn rewind_pc(&mut self) {
        self.pc = self.pc.wrapping_sub(2);
    }

    pub fn push(&mut self, addr: u16) -> Result<(), VmError> {
        if self.sp as usize >= STACK_SIZE {
            return Err(VmError::StackOverflow);
        }
        self.stack[self.sp as usize] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, VmError> {
        if self.sp == 0 {
            return Err(VmError::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp as usize])
    }

    pub fn stack_depth(&self) -> u8 {
        self.sp
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.framebuffer[y * SCREEN_WIDTH + x]
    }

    /// XOR a pixel, the only way sprites touch the framebuffer.
    pub fn flip_pixel(&mut self, x: usize, y: usize) {
        self.framebuffer[y * SCREEN_WIDTH + x] ^= 1;
    }

    pub fn clear_framebuffer(&mut self) {
        self.framebuffer = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
    }

    /// The 2048-cell framebuffer, row-major with the origin top-left.
    /// Renderers read this after each step.
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    /// Mark a key as pressed. Keys outside 0x0..=0xF are ignored, the
    /// frontend owns the mapping from physical keys to this range.
    pub fn key_down(&mut self, key: u8) {
        if let Some(flag) = self.keys.get_mut(key as usize) {
            *flag = true;
        }
    }

    pub fn key_up(&mut self, key: u8) {
        if let Some(flag) = self.keys.get_mut(key as usize) {
            *flag = false;
        }
    }

    /// Whether a key is currently pressed. Unlike `key_down`/`key_up` this
    /// is reached from the key-test opcodes, where an out-of-range index is
    /// an error in the program being run.
    pub fn is_key_pressed(&self, key: u8) -> Result<bool, VmError> {
        self.keys
            .get(key as usize)
            .copied()
            .ok_or(VmError::InvalidKeyIndex { key })
    }

    /// The lowest-numbered currently pressed key, if any.
    pub fn first_pressed_key(&self) -> Option<u8> {
        self.keys.iter().position(|&pressed| pressed).map(|key| key as u8)
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
    }

    /// Decrement both timers once, saturating at zero. Driven at 60 Hz by
    /// the frontend, independently of instruction execution.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn new_machine_has_font_and_start_pc() {
        let machine = Machine::new();
        assert_eq!(machine.pc(), 0x200);
        assert_eq!(machine.stack_depth(), 0);
        // First glyph is the "0" sprite
        assert_eq!(&machine.memory[..5], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // Last glyph is the "F" sprite
        assert_eq!(&machine.memory[75..80], &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
    }

    #[test]
    fn load_rom_copies_to_0x200() {
        let mut machine = Machine::new();
        machine.load_rom(&[0x12, 0x34, 0x56]).unwrap();
        assert_eq!(machine.read_byte(0x200).unwrap(), 0x12);
        assert_eq!(machine.read_byte(0x201).unwrap(), 0x34);
        assert_eq!(machine.read_byte(0x202).unwrap(), 0x56);
    }

    #[test]
    fn load_rom_accepts_maximum_size() {
        let mut machine = Machine::new();
        assert_eq!(machine.load_rom(&[0xAB; MAX_ROM_SIZE]), Ok(()));
        assert_eq!(machine.read_byte(0xFFF).unwrap(), 0xAB);
    }

    #[test]
    fn oversized_rom_is_rejected_without_mutation() {
        let mut machine = Machine::new();
        let result = machine.load_rom(&[0xAB; MAX_ROM_SIZE + 1]);
        assert_eq!(
            result,
            Err(VmError::RomTooLarge {
                len: MAX_ROM_SIZE + 1,
                max: MAX_ROM_SIZE
            })
        );
        assert_eq!(machine.read_byte(0x200).unwrap(), 0);
    }

    #[test]
    fn memory_access_is_bounds_checked() {
        let mut machine = Machine::new();
        assert_eq!(
            machine.read_byte(0x1000),
            Err(VmError::MemoryOutOfBounds { addr: 0x1000 })
        );
        assert_eq!(
            machine.write_byte(0x1000, 1),
            Err(VmError::MemoryOutOfBounds { addr: 0x1000 })
        );
        assert_eq!(machine.write_byte(0xFFF, 7), Ok(()));
        assert_eq!(machine.read_byte(0xFFF), Ok(7));
    }

    #[test]
    fn push_and_pop_round_trip() {
        let mut machine = Machine::new();
        machine.push(0x234).unwrap();
        machine.push(0x456).unwrap();
        assert_eq!(machine.stack_depth(), 2);
        assert_eq!(machine.pop(), Ok(0x456));
        assert_eq!(machine.pop(), Ok(0x234));
        assert_eq!(machine.stack_depth(), 0);
    }

    #[test]
    fn push_past_capacity_overflows() {
        let mut machine = Machine::new();
        for _ in 0..STACK_SIZE {
            machine.push(0x200).unwrap();
        }
        assert_eq!(machine.push(0x200), Err(VmError::StackOverflow));
    }

    #[test]
    fn pop_on_empty_stack_underflows() {
        let mut machine = Machine::new();
        assert_eq!(machine.pop(), Err(VmError::StackUnderflow));
    }

    #[test_case(10, 3, 7 ; "regular decrement")]
    #[test_case(3, 10, 0 ; "saturates at zero")]
    #[test_case(0, 5, 0 ; "stays at zero")]
    fn timers_decrement_and_saturate(initial: u8, ticks: u8, expected: u8) {
        let mut machine = Machine::new();
        machine.set_delay_timer(initial);
        machine.set_sound_timer(initial);
        for _ in 0..ticks {
            machine.tick_timers();
        }
        assert_eq!(machine.delay_timer(), expected);
        assert_eq!(machine.sound_timer(), expected);
    }

    #[test]
    fn first_pressed_key_scans_low_to_high() {
        let mut machine = Machine::new();
        assert_eq!(machine.first_pressed_key(), None);
        machine.key_down(0xB);
        machine.key_down(0x4);
        assert_eq!(machine.first_pressed_key(), Some(0x4));
        machine.key_up(0x4);
        assert_eq!(machine.first_pressed_key(), Some(0xB));
    }

    #[test]
    fn key_test_rejects_out_of_range_index() {
        let machine = Machine::new();
        assert_eq!(machine.is_key_pressed(0xF), Ok(false));
        assert_eq!(
            machine.is_key_pressed(0x10),
            Err(VmError::InvalidKeyIndex { key: 0x10 })
        );
    }

    #[test]
    fn out_of_range_key_events_are_ignored() {
        let mut machine = Machine::new();
        machine.key_down(0x42);
        assert_eq!(machine.first_pressed_key(), None);
    }

    #[test]
    fn flip_pixel_xors() {
        let mut machine = Machine::new();
        machine.flip_pixel(3, 5);
        assert_eq!(machine.pixel(3, 5), 1);
        machine.flip_pixel(3, 5);
        assert_eq!(machine.pixel(3, 5), 0);
    }

    #[test]
    fn clear_framebuffer_zeroes_everything() {
        let mut machine = Machine::new();
        machine.flip_pixel(0, 0);
        machine.flip_pixel(63, 31);
        machine.clear_framebuffer();
        assert!(machine.framebuffer().iter().all(|&cell| cell == 0));
    }
}
