use crate::render::{Frame, Renderer, Rgb, canvas_fits, present_cells};
use std::io::Write;

const PER_CELL: (usize, usize) = (2, 4);

// Dot bit for cell pixel `dy * 2 + dx`.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

#[derive(Debug, Default)]
pub struct BrailleRenderer;

impl BrailleRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !canvas_fits(frame, PER_CELL)? {
            return Ok(());
        }
        present_cells(out, frame, PER_CELL, encode_cell)
    }
}

#[derive(Default)]
struct Tally {
    sum: [u32; 3],
    n: u32,
}

impl Tally {
    fn add(&mut self, (r, g, b): Rgb) {
        self.sum[0] += r as u32;
        self.sum[1] += g as u32;
        self.sum[2] += b as u32;
        self.n += 1;
    }

    fn mean(&self) -> Option<Rgb> {
        (self.n > 0).then(|| {
            (
                (self.sum[0] / self.n) as u8,
                (self.sum[1] / self.n) as u8,
                (self.sum[2] / self.n) as u8,
            )
        })
    }
}

fn encode_cell(cell: &[Rgb]) -> (Rgb, Rgb, char) {
    let lum = cell.iter().map(|&c| luma(c)).collect::<Vec<_>>();
    let lo = lum.iter().copied().min().unwrap_or(0);
    let hi = lum.iter().copied().max().unwrap_or(0);
    let threshold = (lo + hi) / 2;

    let mut bits = 0u8;
    let mut on = Tally::default();
    let mut off = Tally::default();
    for (i, (&c, &l)) in cell.iter().zip(&lum).enumerate() {
        if l > threshold {
            bits |= DOT_BITS[i];
            on.add(c);
        } else {
            off.add(c);
        }
    }

    let bg = off.mean();
    if bits == 0 {
        let c = bg.unwrap_or((0, 0, 0));
        return (c, c, ' ');
    }
    let fg = on.mean().unwrap_or((0, 0, 0));
    let glyph = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
    (fg, bg.unwrap_or(fg), glyph)
}

// Rec.709 weights in 8.8 fixed point.
fn luma((r, g, b): Rgb) -> u16 {
    ((r as u32 * 54 + g as u32 * 183 + b as u32 * 19) >> 8) as u16
}
