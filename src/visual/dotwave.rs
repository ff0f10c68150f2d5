use crate::visual::RenderCtx;
use crate::visual::canvas::Canvas;
use std::f32::consts::PI;

pub const RING_COUNT: usize = 15;
pub const DOTS_PER_RING: usize = 80;

const INNER_RADIUS_FRAC: f32 = 0.1;
const OUTER_RADIUS_FRAC: f32 = 0.45;
const RING_EXPANSION: f32 = 0.1;
const DOT_SIZE_MIN: f32 = 1.0;
const DOT_SIZE_MAX: f32 = 5.0;
const DOT_SIZE_GAIN: f32 = 2.0;
const OPACITY_EXPONENT: f32 = 0.8;

pub const WARM: [u8; 3] = [200, 100, 70];
pub const COOL: [u8; 3] = [70, 180, 100];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralStyle {
    pub revolutions: f32,
    pub points: usize,
    pub max_radius_frac: f32,
    pub rgb: [u8; 3],
    pub alpha: f32,
}

pub const SPIRAL_A: SpiralStyle = SpiralStyle {
    revolutions: 1.5,
    points: 200,
    max_radius_frac: 0.4,
    rgb: [0, 255, 255],
    alpha: 0.15,
};

pub const SPIRAL_B: SpiralStyle = SpiralStyle {
    revolutions: 2.0,
    points: 250,
    max_radius_frac: 0.35,
    rgb: [255, 100, 100],
    alpha: 0.10,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub cx: f32,
    pub cy: f32,
    pub min_dim: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl Geometry {
    pub fn for_canvas(w: usize, h: usize) -> Self {
        let min_dim = w.min(h) as f32;
        Self {
            cx: w as f32 * 0.5,
            cy: h as f32 * 0.5,
            min_dim,
            inner_radius: min_dim * INNER_RADIUS_FRAC,
            outer_radius: min_dim * OUTER_RADIUS_FRAC,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingLayout {
    pub radius: f32,
    pub dot_size: f32,
    pub opacity: f32,
}

pub fn ring_layout(index: usize, amplitude: f32, geom: &Geometry) -> RingLayout {
    let t = index as f32 / (RING_COUNT - 1) as f32;
    let expansion = 1.0 + amplitude * RING_EXPANSION;
    let radius = lerp(geom.inner_radius, geom.outer_radius, t) * expansion;

    let size_curve = 1.0 - 2.0 * (t - 0.5).abs();
    let base = lerp(DOT_SIZE_MIN, DOT_SIZE_MAX, size_curve);

    RingLayout {
        radius,
        dot_size: base * (1.0 + amplitude * DOT_SIZE_GAIN),
        opacity: t.powf(OPACITY_EXPONENT),
    }
}

pub fn dot_color(angle: f32) -> [u8; 3] {
    let mix = (angle.cos() + 1.0) * 0.5;
    std::array::from_fn(|c| {
        lerp(WARM[c] as f32, COOL[c] as f32, mix)
            .round()
            .clamp(0.0, 255.0) as u8
    })
}

pub fn dot_angle(j: usize) -> f32 {
    2.0 * PI * j as f32 / DOTS_PER_RING as f32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralPoint {
    pub angle: f32,
    pub radius: f32,
    pub x: f32,
    pub y: f32,
}

pub fn spiral_points(style: &SpiralStyle, phase: f32, geom: &Geometry) -> Vec<SpiralPoint> {
    let p = style.points.max(1);
    let max_radius = geom.min_dim * style.max_radius_frac;
    (0..=p)
        .map(|k| {
            let f = k as f32 / p as f32;
            let angle = 2.0 * PI * style.revolutions * f + phase;
            let radius = lerp(geom.inner_radius, max_radius, f);
            SpiralPoint {
                angle,
                radius,
                x: geom.cx + angle.cos() * radius,
                y: geom.cy + angle.sin() * radius,
            }
        })
        .collect()
}

pub fn draw_frame(ctx: &RenderCtx, canvas: &mut Canvas) {
    canvas.clear();
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }
    let geom = Geometry::for_canvas(canvas.width(), canvas.height());

    for (style, phase) in [(&SPIRAL_A, ctx.phase_a), (&SPIRAL_B, ctx.phase_b)] {
        let pts = spiral_points(style, phase, &geom)
            .into_iter()
            .map(|p| (p.x, p.y))
            .collect::<Vec<_>>();
        canvas.stroke_polyline(&pts, style.rgb, style.alpha);
    }

    for i in 0..RING_COUNT {
        let ring = ring_layout(i, ctx.amplitude, &geom);
        if ring.opacity <= 0.0 {
            continue;
        }
        for j in 0..DOTS_PER_RING {
            let angle = dot_angle(j);
            let x = geom.cx + angle.cos() * ring.radius;
            let y = geom.cy + angle.sin() * ring.radius;
            canvas.fill_square(x, y, ring.dot_size, dot_color(angle), ring.opacity);
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
