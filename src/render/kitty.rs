use crate::render::{
    Frame, Renderer, clear_rows, draw_overlay_popup, required_pixels, synchronized,
    write_text_rows,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::Write;

// Raw bytes per escape; a multiple of 3 so only the last chunk is padded,
// and 4096 base64 bytes is the protocol's chunk limit.
const RAW_CHUNK: usize = 3 * 1024;

pub struct KittyRenderer {
    image_id: u32,
    placement_id: u32,
    encoded: String,
    popup_shown: bool,
    last_text_rows: u16,
}

impl KittyRenderer {
    pub fn new() -> Self {
        Self {
            image_id: 1,
            placement_id: 1,
            encoded: String::new(),
            popup_shown: false,
            last_text_rows: 0,
        }
    }

    fn transmit(
        &mut self,
        out: &mut dyn Write,
        rgba: &[u8],
        frame: &Frame<'_>,
    ) -> anyhow::Result<()> {
        let total = rgba.len().div_ceil(RAW_CHUNK);
        for (i, chunk) in rgba.chunks(RAW_CHUNK).enumerate() {
            let more = u8::from(i + 1 < total);
            if i == 0 {
                write!(
                    out,
                    "\x1b_Ga=T,f=32,s={},v={},t=d,i={},p={},c={},r={},C=1,q=2,m={more};",
                    frame.pixel_width,
                    frame.pixel_height,
                    self.image_id,
                    self.placement_id,
                    frame.term_cols,
                    frame.visual_rows
                )?;
            } else {
                write!(out, "\x1b_Gm={more};")?;
            }
            self.encoded.clear();
            STANDARD.encode_string(chunk, &mut self.encoded);
            out.write_all(self.encoded.as_bytes())?;
            out.write_all(b"\x1b\\")?;
        }
        Ok(())
    }
}

impl Default for KittyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for KittyRenderer {
    fn name(&self) -> &'static str {
        "kitty"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if frame.term_cols == 0
            || frame.visual_rows == 0
            || frame.pixel_width == 0
            || frame.pixel_height == 0
        {
            return Ok(());
        }
        let need = required_pixels(frame)?;
        let visual_rows = frame.visual_rows as usize;
        let term_rows = frame.term_rows as usize;

        synchronized(out, frame.sync_updates, |out| {
            if let Some(text) = frame.overlay {
                // Images cover text, so the bitmap goes away while the popup is up.
                write!(out, "\x1b_Ga=d,d=I,i={}\x1b\\", self.image_id)?;
                clear_rows(out, 1..=term_rows)?;
                write_text_rows(out, frame)?;
                draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
                self.popup_shown = true;
            } else {
                out.write_all(b"\x1b[H")?;
                self.transmit(out, &frame.pixels_rgba[..need], frame)?;
                if frame.hud_rows != self.last_text_rows {
                    clear_rows(out, visual_rows + 1..=term_rows)?;
                }
                if self.popup_shown {
                    clear_rows(out, 1..=visual_rows)?;
                    self.popup_shown = false;
                }
                write_text_rows(out, frame)?;
            }
            self.last_text_rows = frame.hud_rows;
            Ok(())
        })
    }
}
