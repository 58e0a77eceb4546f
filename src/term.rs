use std::io::{self, Write};

use anyhow::Result;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};

use crate::color::Rgb;

/// Puts the terminal into raw mode on the alternate screen and restores it
/// on drop, so panics and error returns leave the shell usable.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn to_color(color: Rgb) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

fn pixel_at(pixels: &[u8], width: usize, x: usize, y: usize) -> Rgb {
    let offset = (y * width + x) * 4;
    Rgb::new(pixels[offset], pixels[offset + 1], pixels[offset + 2])
}

/// Blits the RGBA pixel buffer to the terminal. Each character cell carries
/// two vertically stacked pixels via the upper-half-block glyph. Color
/// escapes are only emitted when the color actually changes.
pub fn present<W: Write>(out: &mut W, pixels: &[u8], width: usize, height: usize) -> Result<()> {
    let rows = height / 2;
    let mut last_fg: Option<Rgb> = None;
    let mut last_bg: Option<Rgb> = None;

    for row in 0..rows {
        queue!(out, cursor::MoveTo(0, row as u16))?;
        for col in 0..width {
            let top = pixel_at(pixels, width, col, row * 2);
            let bottom = if row * 2 + 1 < height {
                pixel_at(pixels, width, col, row * 2 + 1)
            } else {
                top
            };
            if last_fg != Some(top) {
                queue!(out, SetForegroundColor(to_color(top)))?;
                last_fg = Some(top);
            }
            if last_bg != Some(bottom) {
                queue!(out, SetBackgroundColor(to_color(bottom)))?;
                last_bg = Some(bottom);
            }
            queue!(out, Print('▀'))?;
        }
    }
    queue!(out, ResetColor)?;
    Ok(())
}

/// Draws overlay text lines in the top-left corner, over the frame.
pub fn overlay<W: Write>(out: &mut W, lines: &[String]) -> Result<()> {
    for (i, line) in lines.iter().enumerate() {
        queue!(
            out,
            cursor::MoveTo(1, i as u16 + 1),
            SetForegroundColor(Color::White),
            SetBackgroundColor(Color::Black),
            Print(line)
        )?;
    }
    queue!(out, ResetColor)?;
    Ok(())
}
