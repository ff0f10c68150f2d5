use dotwave::config::RendererMode;
use dotwave::render::{
    BrailleRenderer, Frame, HalfBlockRenderer, KittyRenderer, Renderer, make_renderer,
};

/// Build a solid-color RGBA pixel buffer.
fn solid_pixels(w: usize, h: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px[0] = r;
        px[1] = g;
        px[2] = b;
        px[3] = 255;
    }
    buf
}

/// Left column of every 2-wide cell lit, right column dark.
fn striped_pixels(w: usize, h: usize) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 4;
            let v = if x % 2 == 0 { 255 } else { 0 };
            buf[i] = v;
            buf[i + 1] = v;
            buf[i + 2] = v;
            buf[i + 3] = 255;
        }
    }
    buf
}

fn make_frame<'a>(
    cols: u16,
    visual_rows: u16,
    pw: usize,
    ph: usize,
    pixels: &'a [u8],
    sync: bool,
) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: visual_rows + 2,
        visual_rows,
        pixel_width: pw,
        pixel_height: ph,
        pixels_rgba: pixels,
        notice: None,
        hud: "60 fps | amp 0.020",
        hud_rows: 1,
        overlay: None,
        sync_updates: sync,
    }
}

fn render_to_string(r: &mut dyn Renderer, frame: &Frame<'_>) -> String {
    let mut out = Vec::new();
    r.render(frame, &mut out).unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

// ── HalfBlock renderer ──────────────────────────────────────────────────────

#[test]
fn halfblock_renders_solid_frame() {
    let (cols, rows) = (10u16, 4u16);
    let pixels = solid_pixels(cols as usize, rows as usize * 2, 70, 180, 100);
    let frame = make_frame(cols, rows, cols as usize, rows as usize * 2, &pixels, true);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);

    assert!(s.starts_with("\x1b[?2026h"), "missing sync begin");
    assert!(s.ends_with("\x1b[?2026l"), "missing sync end");
    assert!(s.contains("\x1b[?7l") && s.contains("\x1b[?7h"));
    assert!(s.contains("38;2;70;180;100"), "missing FG color");
    assert!(s.contains("48;2;70;180;100"), "missing BG color");
    assert_eq!(s.matches('\u{2580}').count(), 40);
    // Colour escapes are cached across the frame.
    assert_eq!(s.matches("38;2;70;180;100").count(), 1);
    assert!(s.contains("60 fps"), "HUD text missing");
}

#[test]
fn halfblock_does_not_newline_after_last_row() {
    let pixels = solid_pixels(4, 4, 1, 2, 3);
    let mut frame = make_frame(4, 2, 4, 4, &pixels, false);
    frame.hud_rows = 0;
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert_eq!(s.matches("\r\n").count(), 1);
}

#[test]
fn halfblock_name() {
    assert_eq!(HalfBlockRenderer::new().name(), "halfblock");
}

#[test]
fn halfblock_skips_dimension_mismatch() {
    let pixels = solid_pixels(20, 20, 255, 255, 255);
    // Terminal says 10 cols, canvas is 20 wide: last frame before a resize.
    let frame = make_frame(10, 5, 20, 20, &pixels, false);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.is_empty());
}

#[test]
fn halfblock_rejects_short_buffer() {
    let pixels = vec![0u8; 8];
    let frame = make_frame(4, 2, 4, 4, &pixels, false);
    let mut out = Vec::new();
    assert!(HalfBlockRenderer::new().render(&frame, &mut out).is_err());
}

#[test]
fn halfblock_resets_color_cache_each_frame() {
    let pixels = solid_pixels(3, 2, 9, 9, 9);
    let frame = make_frame(3, 1, 3, 2, &pixels, false);
    let mut r = HalfBlockRenderer::new();
    let first = render_to_string(&mut r, &frame);
    let second = render_to_string(&mut r, &frame);
    assert!(first.contains("38;2;9;9;9"));
    assert!(second.contains("38;2;9;9;9"), "colour must be re-sent after home");
}

// ── Braille renderer ────────────────────────────────────────────────────────

#[test]
fn braille_encodes_left_column_dots() {
    let (cols, rows) = (3u16, 2u16);
    let (w, h) = (cols as usize * 2, rows as usize * 4);
    let pixels = striped_pixels(w, h);
    let frame = make_frame(cols, rows, w, h, &pixels, false);
    let s = render_to_string(&mut BrailleRenderer::new(), &frame);
    // Dots 1, 2, 3 and 7 form the left column.
    assert_eq!(s.matches('\u{2847}').count(), 6);
    assert!(s.contains("38;2;255;255;255"));
    assert!(s.contains("48;2;0;0;0"));
}

#[test]
fn braille_flat_cells_are_blank() {
    let pixels = solid_pixels(4, 4, 0, 0, 0);
    let frame = make_frame(2, 1, 4, 4, &pixels, false);
    let s = render_to_string(&mut BrailleRenderer::new(), &frame);
    assert!(!s.chars().any(|c| ('\u{2801}'..='\u{28ff}').contains(&c)));
}

#[test]
fn braille_name() {
    assert_eq!(BrailleRenderer::new().name(), "braille");
}

#[test]
fn braille_skips_dimension_mismatch() {
    let pixels = solid_pixels(8, 8, 255, 255, 255);
    let frame = make_frame(8, 2, 8, 8, &pixels, false);
    assert!(render_to_string(&mut BrailleRenderer::new(), &frame).is_empty());
}

// ── Kitty renderer ──────────────────────────────────────────────────────────

#[test]
fn kitty_transmits_inline_rgba() {
    let pixels = solid_pixels(16, 16, 10, 20, 30);
    let frame = make_frame(4, 2, 16, 16, &pixels, false);
    let s = render_to_string(&mut KittyRenderer::new(), &frame);
    assert!(s.contains("\x1b_Ga=T,f=32,s=16,v=16,t=d"), "missing transmit header");
    assert!(s.contains("c=4,r=2"), "missing placement size");
    assert!(s.contains("\x1b\\"), "missing string terminator");
    assert!(s.contains("60 fps"));
}

#[test]
fn kitty_splits_large_images_into_chunks() {
    // 64x64x4 bytes is well over one chunk.
    let pixels = solid_pixels(64, 64, 1, 1, 1);
    let frame = make_frame(16, 8, 64, 64, &pixels, false);
    let s = render_to_string(&mut KittyRenderer::new(), &frame);
    assert!(s.contains("m=1;"));
    assert!(s.contains("\x1b_Gm=1;"));
    assert!(s.contains("\x1b_Gm=0;"));
}

#[test]
fn kitty_hides_image_under_overlay() {
    let pixels = solid_pixels(16, 16, 10, 20, 30);
    let mut frame = make_frame(20, 8, 16, 16, &pixels, false);
    frame.overlay = Some("help\nq quit");
    let s = render_to_string(&mut KittyRenderer::new(), &frame);
    assert!(s.contains("\x1b_Ga=d,d=I,i=1"));
    assert!(!s.contains("a=T"));
    assert!(s.contains("q quit"));
}

#[test]
fn kitty_name() {
    assert_eq!(KittyRenderer::new().name(), "kitty");
}

// ── text rows and overlay ───────────────────────────────────────────────────

#[test]
fn notice_is_drawn_above_the_hud() {
    let pixels = solid_pixels(10, 8, 0, 0, 0);
    let mut frame = make_frame(10, 4, 10, 8, &pixels, false);
    frame.term_rows = 6;
    frame.hud_rows = 2;
    frame.notice = Some("No mic");
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);

    let notice_at = s.find("\x1b[5;1H").unwrap();
    let hud_at = s.find("\x1b[6;1H").unwrap();
    assert!(notice_at < hud_at);
    assert!(s.contains("\x1b[38;2;255;196;92mNo mic"), "notice must be highlighted");
    assert!(s.contains("60 fps"));
}

#[test]
fn notice_takes_the_only_text_row() {
    let (cols, rows) = (30u16, 2u16);
    let pixels = solid_pixels(60, 8, 0, 0, 0);
    let mut frame = make_frame(cols, rows, 60, 8, &pixels, false);
    frame.notice = Some("Microphone access denied.");
    let s = render_to_string(&mut BrailleRenderer::new(), &frame);
    assert!(s.contains("Microphone access denied."));
    assert!(!s.contains("60 fps"), "HUD has no row left");
}

#[test]
fn hud_is_truncated_on_char_boundaries() {
    let pixels = solid_pixels(4, 2, 0, 0, 0);
    let mut frame = make_frame(4, 1, 4, 2, &pixels, false);
    frame.hud = "ééééééé";
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.contains("éééé"));
    assert!(!s.contains("ééééé"));
}

#[test]
fn overlay_popup_draws_a_box() {
    let pixels = solid_pixels(30, 20, 0, 0, 0);
    let mut frame = make_frame(30, 10, 30, 20, &pixels, false);
    frame.overlay = Some("dotwave\n\nq quit");
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.contains("+-"), "popup border missing");
    assert!(s.contains("| "), "popup body missing");
    assert!(s.contains("q quit"));
}

#[test]
fn factory_matches_mode() {
    assert_eq!(make_renderer(RendererMode::HalfBlock).name(), "halfblock");
    assert_eq!(make_renderer(RendererMode::Braille).name(), "braille");
    assert_eq!(make_renderer(RendererMode::Kitty).name(), "kitty");
}
