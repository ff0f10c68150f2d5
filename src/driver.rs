use crate::amplitude::derive_amplitude;
use crate::audio::SampleSource;
use crate::visual::{RenderCtx, VisualEngine};
use std::time::{Duration, Instant};

pub const PHASE_A_STEP: f32 = 0.005;
pub const PHASE_B_STEP: f32 = -0.003;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Running,
    Stopped,
}

/// Owns the only state that survives between frames: the two rotation
/// phases and the cached canvas size.
///
/// Resizes are cached and handed to the engine at the start of the next
/// tick, never in the middle of a frame. Once stopped, ticks and resizes are
/// ignored for good.
pub struct AnimationDriver<E> {
    engine: E,
    state: DriverState,
    phase_a: f32,
    phase_b: f32,
    size: (usize, usize),
    amplitude: f32,
    frames: u64,
}

impl<E: VisualEngine> AnimationDriver<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: DriverState::Uninitialized,
            phase_a: 0.0,
            phase_b: 0.0,
            size: (0, 0),
            amplitude: crate::amplitude::AMPLITUDE_FLOOR,
            frames: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn start(&mut self, w: usize, h: usize) {
        if self.state != DriverState::Uninitialized {
            return;
        }
        self.size = (w, h);
        self.state = DriverState::Running;
        log::debug!("driver running at {w}x{h}");
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        if self.state != DriverState::Running || self.size == (w, h) {
            return;
        }
        log::debug!("canvas resize {}x{} -> {w}x{h}", self.size.0, self.size.1);
        self.size = (w, h);
    }

    pub fn stop(&mut self) {
        if self.state == DriverState::Stopped {
            return;
        }
        self.state = DriverState::Stopped;
        log::debug!("driver stopped after {} frame(s)", self.frames);
    }

    pub fn tick(&mut self, source: Option<&mut dyn SampleSource>) -> Option<&[u8]> {
        if self.state != DriverState::Running {
            return None;
        }

        self.phase_a += PHASE_A_STEP;
        self.phase_b += PHASE_B_STEP;

        let sample = source.map(|s| s.sample());
        self.amplitude = derive_amplitude(sample.as_ref());

        let (w, h) = self.size;
        if self.engine.size() != (w, h) {
            self.engine.resize(w, h);
        }

        let ctx = RenderCtx {
            w,
            h,
            amplitude: self.amplitude,
            phase_a: self.phase_a,
            phase_b: self.phase_b,
        };
        self.frames += 1;
        Some(self.engine.render(&ctx))
    }

    pub fn phases(&self) -> (f32, f32) {
        (self.phase_a, self.phase_b)
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

pub struct Ticker {
    interval: Duration,
    frame_start: Instant,
}

impl Ticker {
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f32(1.0 / fps.max(1) as f32),
            frame_start: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn begin_frame(&mut self) -> Instant {
        self.frame_start = Instant::now();
        self.frame_start
    }

    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.frame_start.elapsed())
    }

    pub fn wait(&self) {
        let rest = self.remaining();
        if !rest.is_zero() {
            std::thread::sleep(rest);
        }
    }
}
