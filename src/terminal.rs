use crate::config::RendererMode;
use anyhow::Context;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{self, ClearType},
};
use std::io::{Stdout, Write, stdout};

pub const MIN_SIZE: (u16, u16) = (4, 2);

pub struct TerminalGuard {
    kitty_images: bool,
}

impl TerminalGuard {
    pub fn new(renderer: RendererMode) -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Raw mode is already on, so the guard must exist before anything else can fail.
        let guard = Self {
            kitty_images: renderer == RendererMode::Kitty,
        };

        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)
            .context("enter alternate screen")?;
        out.execute(terminal::Clear(ClearType::All))
            .context("clear screen")?;
        out.execute(cursor::Hide).context("hide cursor")?;
        log::debug!("terminal taken over ({renderer:?})");

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.kitty_images {
            // Images outlive the alternate screen in kitty unless deleted.
            let _ = out.write_all(b"\x1b_Ga=d,d=A\x1b\\");
        }
        let _ = out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m");
        let _ = out.flush();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        log::debug!("terminal restored");
    }
}

pub fn checked_size() -> anyhow::Result<(u16, u16)> {
    let size = terminal::size().context("get terminal size")?;
    ensure_min_size(size)?;
    Ok(size)
}

pub fn ensure_min_size(size: (u16, u16)) -> anyhow::Result<()> {
    let (cols, rows) = size;
    if cols < MIN_SIZE.0 || rows < MIN_SIZE.1 {
        anyhow::bail!(
            "terminal too small (need at least {}x{}, got {cols}x{rows})",
            MIN_SIZE.0,
            MIN_SIZE.1
        );
    }
    Ok(())
}
