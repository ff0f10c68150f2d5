use crate::render::{Frame, Renderer, canvas_fits, present_cells};
use std::io::Write;

const PER_CELL: (usize, usize) = (1, 2);
const UPPER_HALF: char = '\u{2580}';

#[derive(Debug, Default)]
pub struct HalfBlockRenderer;

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !canvas_fits(frame, PER_CELL)? {
            return Ok(());
        }
        present_cells(out, frame, PER_CELL, |cell| (cell[0], cell[1], UPPER_HALF))
    }
}
