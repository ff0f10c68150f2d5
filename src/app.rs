use crate::audio::{AudioSampler, SampleSource};
use crate::config::{AudioSource, Config};
use crate::driver::{AnimationDriver, Ticker};
use crate::render::{Frame, make_renderer};
use crate::terminal::{self, TerminalGuard};
use crate::visual::DotWaveEngine;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub visual_rows: u16,
    pub text_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
}

impl Layout {
    pub fn new(
        size: (u16, u16),
        has_notice: bool,
        show_hud: bool,
        pixels_per_cell: (usize, usize),
    ) -> Self {
        let (cols, rows) = size;
        let wanted = u16::from(has_notice) + u16::from(show_hud);
        let text_rows = wanted.min(rows.saturating_sub(1));
        let visual_rows = rows.saturating_sub(text_rows).max(1);
        Self {
            visual_rows,
            text_rows,
            pixel_width: (cols as usize).saturating_mul(pixels_per_cell.0),
            pixel_height: (visual_rows as usize).saturating_mul(pixels_per_cell.1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Continue,
}

pub fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    show_hud: &mut bool,
    show_help: &mut bool,
) -> KeyAction {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return KeyAction::Quit;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char('i') | KeyCode::Char('I') => {
            *show_hud = !*show_hud;
            KeyAction::Continue
        }
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => {
            *show_help = !*show_help;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    // Asked once, before the terminal is taken over; the outcome holds for the session.
    let (mut sampler, notice) = match cfg.source {
        AudioSource::Mic => match AudioSampler::request_access(cfg.device.as_deref()) {
            Ok(s) => (Some(s), None),
            Err(err) => {
                log::warn!("{err}; continuing without audio");
                (None, Some(err.user_message()))
            }
        },
        AudioSource::None => {
            log::info!("audio disabled, running at the floor amplitude");
            (None, None)
        }
    };
    let source_label = sampler
        .as_ref()
        .map(|s| s.device_name.clone())
        .unwrap_or_else(|| "no audio".to_string());

    let mut last_size = terminal::checked_size()?;
    let _term = TerminalGuard::new(cfg.renderer)?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer = make_renderer(cfg.renderer);
    let pixels_per_cell = cfg.renderer.pixels_per_cell();

    let mut show_hud = cfg.hud;
    let mut show_help = false;

    let layout = Layout::new(last_size, notice.is_some(), show_hud, pixels_per_cell);
    let mut driver = AnimationDriver::new(DotWaveEngine::new());
    driver.start(layout.pixel_width, layout.pixel_height);

    let mut ticker = Ticker::new(cfg.fps);
    let mut fps = FpsCounter::new();

    while driver.is_running() {
        ticker.begin_frame();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    if handle_key(k.code, k.modifiers, &mut show_hud, &mut show_help)
                        == KeyAction::Quit
                    {
                        driver.stop();
                    }
                }
                Event::Resize(c, r) => last_size = (c, r),
                _ => {}
            }
        }
        if !driver.is_running() {
            break;
        }

        // Resize events can be missed in some terminals.
        last_size = crossterm::terminal::size()?;

        let layout = Layout::new(last_size, notice.is_some(), show_hud, pixels_per_cell);
        driver.resize(layout.pixel_width, layout.pixel_height);

        let hud = if show_hud {
            format!(
                "{:>3.0} fps | amp {:.3} | {}x{} px | {} | {}",
                fps.fps(),
                driver.amplitude(),
                layout.pixel_width,
                layout.pixel_height,
                renderer.name(),
                source_label
            )
        } else {
            String::new()
        };

        let source = sampler.as_mut().map(|s| s as &mut dyn SampleSource);
        let Some(pixels) = driver.tick(source) else {
            break;
        };

        let frame = Frame {
            term_cols: last_size.0,
            term_rows: last_size.1,
            visual_rows: layout.visual_rows,
            pixel_width: layout.pixel_width,
            pixel_height: layout.pixel_height,
            pixels_rgba: pixels,
            notice,
            hud: &hud,
            hud_rows: layout.text_rows,
            overlay: show_help.then_some(HELP_TEXT),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;

        fps.tick();
        ticker.wait();
    }

    log::info!("exiting after {} frame(s)", driver.frames());
    Ok(())
}

const HELP_TEXT: &str = "dotwave

q / Esc / Ctrl-C   quit
i                  status line
h / ?              this help";

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
