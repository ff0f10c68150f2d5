pub const BACKGROUND: [u8; 3] = [0, 0, 0];

pub struct Canvas {
    w: usize,
    h: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        let mut c = Self {
            w: 0,
            h: 0,
            pixels: Vec::new(),
        };
        c.resize(w, h);
        c
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.pixels.resize(w.saturating_mul(h).saturating_mul(4), 0);
        self.clear();
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let i = (y * self.w + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn clear(&mut self) {
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = BACKGROUND[0];
            px[1] = BACKGROUND[1];
            px[2] = BACKGROUND[2];
            px[3] = 255;
        }
    }

    fn blend(&mut self, x: isize, y: isize, rgb: [u8; 3], alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let i = (y as usize * self.w + x as usize) * 4;
        for c in 0..3 {
            let dst = self.pixels[i + c] as f32;
            let src = rgb[c] as f32;
            self.pixels[i + c] = (src * a + dst * (1.0 - a)).round() as u8;
        }
        self.pixels[i + 3] = 255;
    }

    /// Axis-aligned square of side `size` centered on `(cx, cy)`.
    ///
    /// A pixel is covered when its center lies inside the square. Squares
    /// smaller than a pixel tint the pixel under their center, with alpha
    /// scaled by their area.
    pub fn fill_square(&mut self, cx: f32, cy: f32, size: f32, rgb: [u8; 3], alpha: f32) {
        if !(size > 0.0) || !(alpha > 0.0) || self.w == 0 || self.h == 0 {
            return;
        }
        let half = size * 0.5;
        let x0 = (cx - half - 0.5).ceil();
        let x1 = (cx + half - 0.5).ceil();
        let y0 = (cy - half - 0.5).ceil();
        let y1 = (cy + half - 0.5).ceil();

        if size < 1.0 || x1 <= x0 || y1 <= y0 {
            let coverage = (size * size).min(1.0);
            self.blend(cx.floor() as isize, cy.floor() as isize, rgb, alpha * coverage);
            return;
        }

        let xs = (x0.max(0.0) as isize)..(x1.min(self.w as f32) as isize);
        let ys = (y0.max(0.0) as isize)..(y1.min(self.h as f32) as isize);
        for y in ys {
            for x in xs.clone() {
                self.blend(x, y, rgb, alpha);
            }
        }
    }

    // Shared vertices are blended once.
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], rgb: [u8; 3], alpha: f32) {
        if !(alpha > 0.0) || self.w == 0 || self.h == 0 {
            return;
        }
        let mut prev: Option<(isize, isize)> = None;
        for &(x, y) in points {
            let cur = (x.floor() as isize, y.floor() as isize);
            match prev {
                None => self.blend(cur.0, cur.1, rgb, alpha),
                Some(p) if p == cur => {}
                Some(p) => self.line(p, cur, rgb, alpha),
            }
            prev = Some(cur);
        }
    }

    // Bresenham; the start pixel is skipped since the previous segment drew it.
    fn line(&mut self, from: (isize, isize), to: (isize, isize), rgb: [u8; 3], alpha: f32) {
        let (w, h) = (self.w as isize, self.h as isize);
        if (from.0 < 0 && to.0 < 0)
            || (from.0 >= w && to.0 >= w)
            || (from.1 < 0 && to.1 < 0)
            || (from.1 >= h && to.1 >= h)
        {
            return;
        }

        let dx = (to.0 - from.0).abs();
        let dy = -(to.1 - from.1).abs();
        let sx = if from.0 < to.0 { 1 } else { -1 };
        let sy = if from.1 < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = from;

        while (x, y) != to {
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            self.blend(x, y, rgb, alpha);
        }
    }
}
