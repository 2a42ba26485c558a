use std::io::{stdout, Write};

use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};

use chip8_vm::vm::machine::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Renders the 64x32 framebuffer on the terminal's alternate screen inside a
/// box-drawn border. Each cell is two characters wide so the picture comes
/// out roughly square. Only cells that changed since the previous frame are
/// redrawn.
pub struct Screen {
    cells: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    beeping: bool,
}

impl Screen {
    pub fn new() -> crossterm::Result<Screen> {
        execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        execute!(stdout(), Clear(ClearType::All))?;
        draw_border()?;
        Ok(Screen {
            cells: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            beeping: false,
        })
    }

    /// Draw the framebuffer and the sound indicator.
    ///
    /// `beeping` is sampled from the sound timer by the caller; a real audio
    /// backend would start and stop a tone on the same signal.
    pub fn render(&mut self, framebuffer: &[u8], beeping: bool) -> crossterm::Result<()> {
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                let state = framebuffer[y * SCREEN_WIDTH + x];
                if self.cells[y * SCREEN_WIDTH + x] != state {
                    self.cells[y * SCREEN_WIDTH + x] = state;
                    execute!(stdout(), cursor::MoveTo(2 * x as u16 + 1, y as u16 + 1))?;
                    write!(stdout(), "{}", if state == 1 { "██" } else { "  " })?;
                }
            }
        }

        if beeping != self.beeping {
            self.beeping = beeping;
            execute!(stdout(), cursor::MoveTo(1, SCREEN_HEIGHT as u16 + 2))?;
            write!(stdout(), "{}", if beeping { "♪ beep" } else { "      " })?;
        }

        stdout().flush()?;
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        // Restore the terminal no matter how the run ended.
        let _ = terminal::disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, cursor::Show);
    }
}

fn draw_border() -> crossterm::Result<()> {
    let right = 2 * SCREEN_WIDTH as u16 + 1;
    let bottom = SCREEN_HEIGHT as u16 + 1;
    for y in 0..=bottom {
        for x in 0..=right {
            let c = if y == 0 && x == 0 {
                '┏'
            } else if y == 0 && x == right {
                '┓'
            } else if y == bottom && x == 0 {
                '┗'
            } else if y == bottom && x == right {
                '┛'
            } else if y == 0 || y == bottom {
                '━'
            } else if x == 0 || x == right {
                '┃'
            } else {
                continue;
            };
            execute!(stdout(), cursor::MoveTo(x, y))?;
            write!(stdout(), "{}", c)?;
        }
    }
    stdout().flush()?;
    Ok(())
}
