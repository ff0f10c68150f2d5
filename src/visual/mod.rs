pub mod canvas;
pub mod dotwave;

use canvas::Canvas;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub w: usize,
    pub h: usize,
    pub amplitude: f32,
    pub phase_a: f32,
    pub phase_b: f32,
}

pub trait VisualEngine {
    fn name(&self) -> &'static str;
    fn size(&self) -> (usize, usize);
    fn resize(&mut self, w: usize, h: usize);
    fn render(&mut self, ctx: &RenderCtx) -> &[u8];
}

pub struct DotWaveEngine {
    canvas: Canvas,
}

impl DotWaveEngine {
    pub fn new() -> Self {
        Self {
            canvas: Canvas::new(0, 0),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

impl Default for DotWaveEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualEngine for DotWaveEngine {
    fn name(&self) -> &'static str {
        "dotwave"
    }

    fn size(&self) -> (usize, usize) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.canvas.resize(w, h);
    }

    fn render(&mut self, ctx: &RenderCtx) -> &[u8] {
        if self.size() != (ctx.w, ctx.h) {
            self.canvas.resize(ctx.w, ctx.h);
        }
        dotwave::draw_frame(ctx, &mut self.canvas);
        self.canvas.pixels()
    }
}
