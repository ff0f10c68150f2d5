mod braille;
mod halfblock;
mod kitty;

pub use braille::BrailleRenderer;
pub use halfblock::HalfBlockRenderer;
pub use kitty::KittyRenderer;

use crate::config::RendererMode;
use std::io::{self, Write};

pub type Rgb = (u8, u8, u8);

const SYNC_BEGIN: &[u8] = b"\x1b[?2026h";
const SYNC_END: &[u8] = b"\x1b[?2026l";
const AUTOWRAP_OFF: &[u8] = b"\x1b[?7l";
const AUTOWRAP_ON: &[u8] = b"\x1b[?7h";
const NOTICE_STYLE: &str = "\x1b[1m\x1b[38;2;255;196;92m";
const POPUP_STYLE: &str = "\x1b[38;2;236;242;255m\x1b[48;2;10;14;24m";

pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    // Drawn on the first text row.
    pub notice: Option<&'a str>,
    pub hud: &'a str,
    // Notice included.
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

pub fn make_renderer(mode: RendererMode) -> Box<dyn Renderer> {
    match mode {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
        RendererMode::Kitty => Box::new(KittyRenderer::new()),
    }
}

fn required_pixels(frame: &Frame<'_>) -> anyhow::Result<usize> {
    let need = frame
        .pixel_width
        .saturating_mul(frame.pixel_height)
        .saturating_mul(4);
    anyhow::ensure!(
        frame.pixels_rgba.len() >= need,
        "pixel buffer too small (need {need}, got {})",
        frame.pixels_rgba.len()
    );
    Ok(need)
}

fn canvas_fits(frame: &Frame<'_>, per_cell: (usize, usize)) -> anyhow::Result<bool> {
    let cols = frame.term_cols as usize;
    let rows = frame.visual_rows as usize;
    if cols == 0 || rows == 0 || frame.pixel_width == 0 || frame.pixel_height == 0 {
        return Ok(false);
    }
    if frame.pixel_width != cols.saturating_mul(per_cell.0)
        || frame.pixel_height != rows.saturating_mul(per_cell.1)
    {
        return Ok(false);
    }
    required_pixels(frame)?;
    Ok(true)
}

fn synchronized<F>(out: &mut dyn Write, sync: bool, body: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut dyn Write) -> anyhow::Result<()>,
{
    if sync {
        out.write_all(SYNC_BEGIN)?;
    }
    body(&mut *out)?;
    if sync {
        out.write_all(SYNC_END)?;
    }
    out.flush()?;
    Ok(())
}

#[derive(Default)]
struct Pen {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
}

impl Pen {
    fn set(&mut self, out: &mut dyn Write, fg: Rgb, bg: Rgb) -> io::Result<()> {
        if self.fg != Some(fg) {
            write!(out, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
            self.fg = Some(fg);
        }
        if self.bg != Some(bg) {
            write!(out, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
            self.bg = Some(bg);
        }
        Ok(())
    }
}

fn present_cells<F>(
    out: &mut dyn Write,
    frame: &Frame<'_>,
    per_cell: (usize, usize),
    mut encode: F,
) -> anyhow::Result<()>
where
    F: FnMut(&[Rgb]) -> (Rgb, Rgb, char),
{
    synchronized(out, frame.sync_updates, |out| {
        out.write_all(b"\x1b[H\x1b[0m")?;
        // Painting the last column would wrap otherwise.
        out.write_all(AUTOWRAP_OFF)?;

        let (cw, ch) = per_cell;
        let w = frame.pixel_width;
        let px = frame.pixels_rgba;
        let rows = frame.visual_rows as usize;
        let mut cell = vec![(0u8, 0u8, 0u8); cw * ch];
        let mut pen = Pen::default();

        for row in 0..rows {
            for col in 0..frame.term_cols as usize {
                for (i, c) in cell.iter_mut().enumerate() {
                    let k = ((row * ch + i / cw) * w + col * cw + i % cw) * 4;
                    *c = (px[k], px[k + 1], px[k + 2]);
                }
                let (fg, bg, glyph) = encode(&cell);
                pen.set(out, fg, bg)?;
                write!(out, "{glyph}")?;
            }
            // A newline after the last row would scroll when there are no text rows.
            if row + 1 < rows {
                out.write_all(b"\r\n")?;
            }
        }

        write_text_rows(out, frame)?;
        if let Some(text) = frame.overlay {
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
        }
        out.write_all(AUTOWRAP_ON)?;
        Ok(())
    })
}

pub fn write_text_rows(out: &mut dyn Write, frame: &Frame<'_>) -> anyhow::Result<()> {
    let cols = frame.term_cols as usize;
    let mut hud = frame.hud.lines();

    for i in 0..frame.hud_rows as usize {
        let row = frame.visual_rows as usize + 1 + i;
        write!(out, "\x1b[{row};1H\x1b[0m\x1b[2K")?;
        match (i, frame.notice) {
            (0, Some(notice)) => {
                write!(out, "{NOTICE_STYLE}{}\x1b[0m", truncate_chars(notice, cols))?;
            }
            _ => {
                if let Some(line) = hud.next() {
                    write!(out, "{}", truncate_chars(line, cols))?;
                }
            }
        }
    }
    Ok(())
}

fn clear_rows(out: &mut dyn Write, rows: impl Iterator<Item = usize>) -> io::Result<()> {
    for row in rows {
        write!(out, "\x1b[{row};1H\x1b[0m\x1b[2K")?;
    }
    Ok(())
}

fn truncate_chars(s: &str, cols: usize) -> &str {
    match s.char_indices().nth(cols) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn wrap_chars(line: &str, width: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let head = truncate_chars(rest, width);
        parts.push(head);
        rest = &rest[head.len()..];
    }
    if parts.is_empty() {
        parts.push("");
    }
    parts
}

pub fn draw_overlay_popup(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if cols < 8 || rows < 4 || text.trim().is_empty() {
        return Ok(());
    }

    let lines = text
        .lines()
        .flat_map(|l| wrap_chars(l, cols - 4))
        .take(rows - 2)
        .collect::<Vec<_>>();
    let inner = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(1);

    let box_w = inner + 4;
    let box_h = lines.len() + 2;
    let left = (cols - box_w) / 2 + 1;
    let top = (rows - box_h) / 2 + 1;
    let edge = format!("+{}+", "-".repeat(inner + 2));

    write!(out, "\x1b[0m{POPUP_STYLE}\x1b[{top};{left}H{edge}")?;
    for (i, line) in lines.iter().enumerate() {
        let pad = inner - line.chars().count();
        write!(out, "\x1b[{};{left}H| ", top + 1 + i)?;
        if i == 0 {
            write!(out, "\x1b[1m{line}\x1b[22m")?;
        } else {
            write!(out, "{line}")?;
        }
        write!(out, "{:pad$} |", "")?;
    }
    write!(out, "\x1b[{};{left}H{edge}\x1b[0m", top + box_h - 1)?;
    Ok(())
}
