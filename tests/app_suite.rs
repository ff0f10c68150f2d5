use crossterm::event::{KeyCode, KeyModifiers};
use dotwave::app::{KeyAction, Layout, handle_key};
use dotwave::config::RendererMode;

// ── layout ──────────────────────────────────────────────────────────────────

#[test]
fn canvas_fills_the_terminal_without_text() {
    let l = Layout::new((80, 24), false, false, RendererMode::HalfBlock.pixels_per_cell());
    assert_eq!(l.text_rows, 0);
    assert_eq!(l.visual_rows, 24);
    assert_eq!((l.pixel_width, l.pixel_height), (80, 48));
}

#[test]
fn notice_and_hud_each_take_a_row() {
    let l = Layout::new((80, 24), true, true, RendererMode::HalfBlock.pixels_per_cell());
    assert_eq!(l.text_rows, 2);
    assert_eq!(l.visual_rows, 22);
    assert_eq!(l.pixel_height, 44);

    let l = Layout::new((80, 24), true, false, RendererMode::Braille.pixels_per_cell());
    assert_eq!((l.text_rows, l.visual_rows), (1, 23));
    assert_eq!((l.pixel_width, l.pixel_height), (160, 92));
}

#[test]
fn one_row_always_stays_for_the_canvas() {
    let l = Layout::new((10, 2), true, true, (1, 2));
    assert_eq!((l.visual_rows, l.text_rows), (1, 1));

    let l = Layout::new((10, 1), true, true, (1, 2));
    assert_eq!((l.visual_rows, l.text_rows), (1, 0));
}

#[test]
fn kitty_layout_scales_by_cell_bitmap() {
    let l = Layout::new((40, 10), false, true, RendererMode::Kitty.pixels_per_cell());
    assert_eq!((l.pixel_width, l.pixel_height), (160, 72));
}

// ── keys ────────────────────────────────────────────────────────────────────

#[test]
fn quit_keys() {
    let (mut hud, mut help) = (false, false);
    for code in [KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')] {
        assert_eq!(
            handle_key(code, KeyModifiers::NONE, &mut hud, &mut help),
            KeyAction::Quit
        );
    }
    assert_eq!(
        handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL, &mut hud, &mut help),
        KeyAction::Quit
    );
    assert!(!hud && !help);
}

#[test]
fn plain_c_does_not_quit() {
    let (mut hud, mut help) = (false, false);
    assert_eq!(
        handle_key(KeyCode::Char('c'), KeyModifiers::NONE, &mut hud, &mut help),
        KeyAction::Continue
    );
}

#[test]
fn hud_and_help_toggle() {
    let (mut hud, mut help) = (false, false);
    handle_key(KeyCode::Char('i'), KeyModifiers::NONE, &mut hud, &mut help);
    assert!(hud);
    handle_key(KeyCode::Char('I'), KeyModifiers::SHIFT, &mut hud, &mut help);
    assert!(!hud);

    handle_key(KeyCode::Char('?'), KeyModifiers::NONE, &mut hud, &mut help);
    assert!(help);
    handle_key(KeyCode::Char('h'), KeyModifiers::NONE, &mut hud, &mut help);
    assert!(!help);
    assert!(!hud);
}

#[test]
fn other_keys_are_ignored() {
    let (mut hud, mut help) = (true, false);
    for code in [KeyCode::Enter, KeyCode::Char('x'), KeyCode::Left, KeyCode::F(1)] {
        assert_eq!(
            handle_key(code, KeyModifiers::NONE, &mut hud, &mut help),
            KeyAction::Continue
        );
    }
    assert!(hud && !help);
}

// ── terminal size ───────────────────────────────────────────────────────────

#[test]
fn tiny_terminals_are_rejected() {
    use dotwave::terminal::{MIN_SIZE, ensure_min_size};

    assert!(ensure_min_size(MIN_SIZE).is_ok());
    assert!(ensure_min_size((200, 60)).is_ok());
    let err = ensure_min_size((3, 10)).unwrap_err();
    assert!(err.to_string().contains("got 3x10"));
    assert!(ensure_min_size((80, 1)).is_err());
}
