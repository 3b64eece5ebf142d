use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::debug;

use super::traits::{DisplayError, PreviewDisplay};
use crate::keys::Key;

const HINT: &str = "Enter/Space: keep photo   Esc/Backspace/q: quit";

/// Preview drawn into the terminal with half-block cells, two image rows per
/// text row. Runs in raw mode on the alternate screen until closed.
pub struct TerminalDisplay {
    out: Stdout,
    active: bool,
}

impl TerminalDisplay {
    pub fn new() -> Result<Self, DisplayError> {
        let mut out = io::stdout();
        enable_raw_mode()?;
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        debug!("terminal preview opened");
        Ok(Self { out, active: true })
    }
}

impl PreviewDisplay for TerminalDisplay {
    fn show(&mut self, title: &str, image: &RgbImage) -> Result<(), DisplayError> {
        let (cols, rows) = terminal::size()?;
        queue!(self.out, MoveTo(0, 0), ResetColor, Print(title))?;

        let side = fit_side(cols, rows);
        if side >= 2 {
            let scaled = imageops::resize(image, side, side, FilterType::Nearest);
            for y in (0..side).step_by(2) {
                queue!(self.out, MoveTo(0, 1 + (y / 2) as u16))?;
                for x in 0..side {
                    let top = scaled.get_pixel(x, y).0;
                    let bottom = scaled.get_pixel(x, y + 1).0;
                    queue!(
                        self.out,
                        SetForegroundColor(Color::Rgb { r: top[0], g: top[1], b: top[2] }),
                        SetBackgroundColor(Color::Rgb {
                            r: bottom[0],
                            g: bottom[1],
                            b: bottom[2]
                        }),
                        Print('▀')
                    )?;
                }
                queue!(self.out, ResetColor)?;
            }
        }

        queue!(
            self.out,
            MoveTo(0, rows.saturating_sub(1)),
            ResetColor,
            Print(HINT)
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn wait_for_key(&mut self, timeout: Duration) -> Result<Option<Key>, DisplayError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(None);
            }
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(map_key(key)));
                }
            }
        }
    }

    fn close(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let _ = execute!(self.out, ResetColor, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
        debug!("terminal preview closed");
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        self.close();
    }
}

/// Largest even square (in image pixels) that fits between the title line
/// and the hint line.
fn fit_side(cols: u16, rows: u16) -> u32 {
    let pixel_rows = u32::from(rows.saturating_sub(2)) * 2;
    let side = u32::from(cols).min(pixel_rows);
    side & !1
}

fn map_key(key: KeyEvent) -> Key {
    match key.code {
        // Raw mode swallows SIGINT, so Ctrl+C has to abort by hand.
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}
