use crossterm::event::KeyCode;
use std::time::{Duration, Instant};

/// Map a physical key to its CHIP-8 keypad index.
///
/// The left-hand block of a qwerty keyboard mirrors the original 4x4 keypad:
///
/// ```text
/// 1 2 3 4        1 2 3 C
/// q w e r   ->   4 5 6 D
/// a s d f        7 8 9 E
/// z x c v        A 0 B F
/// ```
pub fn keymap(code: KeyCode) -> Option<u8> {
    match code {
        KeyCode::Char('1') => Some(0x1),
        KeyCode::Char('2') => Some(0x2),
        KeyCode::Char('3') => Some(0x3),
        KeyCode::Char('4') => Some(0xC),
        KeyCode::Char('q') => Some(0x4),
        KeyCode::Char('w') => Some(0x5),
        KeyCode::Char('e') => Some(0x6),
        KeyCode::Char('r') => Some(0xD),
        KeyCode::Char('a') => Some(0x7),
        KeyCode::Char('s') => Some(0x8),
        KeyCode::Char('d') => Some(0x9),
        KeyCode::Char('f') => Some(0xE),
        KeyCode::Char('z') => Some(0xA),
        KeyCode::Char('x') => Some(0x0),
        KeyCode::Char('c') => Some(0xB),
        KeyCode::Char('v') => Some(0xF),
        _ => None,
    }
}

/// Tracks when each keypad key was last pressed.
///
/// Terminals only report key presses, never releases, so a key counts as
/// held for a short window after its last press event and is released when
/// that window expires.
pub struct KeyTracker {
    held: [Option<Instant>; 16],
}

impl KeyTracker {
    pub fn new() -> KeyTracker {
        KeyTracker { held: [None; 16] }
    }

    pub fn press(&mut self, key: u8) {
        self.held[key as usize] = Some(Instant::now());
    }

    /// Clear and return the keys whose hold window has expired.
    pub fn sweep(&mut self, timeout: Duration) -> Vec<u8> {
        let mut released = Vec::new();
        for (key, slot) in self.held.iter_mut().enumerate() {
            if let Some(pressed_at) = *slot {
                if pressed_at.elapsed() >= timeout {
                    *slot = None;
                    released.push(key as u8);
                }
            }
        }
        released
    }
}
