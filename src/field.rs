// Copyright (c) 2026 softveil

use crossterm::style::Color;
use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

use crate::{
    frame::Frame,
    palette::{self, scheme_tint},
    particle::{disc_alpha, Particle},
    runtime::{ColorMode, Scheme},
};

/// Fixed pool cardinality for the whole session. Slots are recycled in
/// place, never allocated or freed after `reset`.
pub const POOL_SIZE: usize = 30;

/// Vertical anchor of the emission band, as a fraction of surface height.
const ANCHOR_Y: f64 = 0.72;

/// The particle field simulator: a fixed pool of rising, expanding, fading
/// puffs above a jittered anchor, splatted into a per-subpixel coverage
/// buffer and composed into terminal cells once per tick.
pub struct Field {
    pub cols: u16,
    pub rows: u16,

    /// Simulation surface in virtual pixels. One terminal cell covers
    /// `scale` x `2 * scale` pixels, i.e. two square subpixels stacked
    /// vertically.
    pub width: f64,
    pub height: f64,

    pub scale: u16,
    pub intensity: f32,
    pub paused: bool,
    pub running: bool,

    pub color_mode: ColorMode,
    pub bg: Option<Color>,

    scheme: Scheme,
    tint: (u8, u8, u8),

    particles: Vec<Particle>,
    coverage: Vec<f32>,

    mt: StdRng,

    rand_jitter_x: Uniform<f64>,
    rand_jitter_y: Uniform<f64>,
    rand_size: Uniform<f64>,
    rand_rise: Uniform<f64>,
    rand_drift: Uniform<f64>,
    rand_opacity: Uniform<f64>,
    rand_life: Uniform<u32>,
    rand_expansion: Uniform<f64>,
}

impl Field {
    pub fn new(
        color_mode: ColorMode,
        scheme: Scheme,
        bg: Option<Color>,
        scale: u16,
        seed: Option<u64>,
    ) -> Self {
        let mt = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        Self {
            cols: 0,
            rows: 0,
            width: 0.0,
            height: 0.0,
            scale: scale.max(1),
            intensity: 1.0,
            paused: false,
            running: true,
            color_mode,
            bg,
            scheme,
            tint: scheme_tint(scheme),
            particles: Vec::new(),
            coverage: Vec::new(),
            mt,
            rand_jitter_x: Uniform::new(-50.0, 50.0).expect("valid range"),
            rand_jitter_y: Uniform::new(0.0, 40.0).expect("valid range"),
            rand_size: Uniform::new(10.0, 25.0).expect("valid range"),
            rand_rise: Uniform::new(0.2, 0.6).expect("valid range"),
            rand_drift: Uniform::new(-0.125, 0.125).expect("valid range"),
            rand_opacity: Uniform::new(0.05, 0.20).expect("valid range"),
            rand_life: Uniform::new(300u32, 700u32).expect("valid range"),
            rand_expansion: Uniform::new(0.05, 0.13).expect("valid range"),
        }
    }

    pub fn set_scheme(&mut self, scheme: Scheme) {
        self.scheme = scheme;
        self.tint = scheme_tint(scheme);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Rebuilds the pool against the given surface dimensions. Zero
    /// dimensions are legal: puffs spawn at degenerate coordinates and the
    /// loop stays stable.
    pub fn reset(&mut self, cols: u16, rows: u16) {
        self.resize(cols, rows);
        self.particles.clear();
        for _ in 0..POOL_SIZE {
            let p = self.spawn_particle();
            self.particles.push(p);
        }
    }

    /// Adopts new surface dimensions without touching live particles; their
    /// coordinates stay valid in the old frame and drift out naturally.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        let s = self.scale as f64;
        self.width = cols as f64 * s;
        self.height = rows as f64 * 2.0 * s;
        self.coverage.clear();
        self.coverage.resize(cols as usize * rows as usize * 2, 0.0);
    }

    /// Fresh attributes for one slot, each drawn independently and
    /// uniformly, anchored to the lower-middle of the current surface.
    fn spawn_particle(&mut self) -> Particle {
        let size = self.rand_size.sample(&mut self.mt);
        Particle {
            x: self.width / 2.0 + self.rand_jitter_x.sample(&mut self.mt),
            y: self.height * ANCHOR_Y + self.rand_jitter_y.sample(&mut self.mt),
            size,
            base_size: size,
            speed_y: self.rand_rise.sample(&mut self.mt),
            speed_x: self.rand_drift.sample(&mut self.mt),
            opacity: self.rand_opacity.sample(&mut self.mt),
            life: 0,
            max_life: self.rand_life.sample(&mut self.mt),
            expansion: self.rand_expansion.sample(&mut self.mt),
        }
    }

    /// One tick: clear the surface, advance every puff (respawning expired
    /// slots in place), splat the pool and compose it into `frame`.
    pub fn advance(&mut self, frame: &mut Frame) {
        if self.paused {
            return;
        }

        frame.clear();
        self.coverage.fill(0.0);

        for i in 0..self.particles.len() {
            if self.particles[i].step() {
                let fresh = self.spawn_particle();
                self.particles[i] = fresh;
            }
            let p = self.particles[i];
            self.splat(&p);
        }

        self.compose(frame);
    }

    /// Source-over splat of one soft disc into the coverage grid, clipped
    /// to the disc's bounding box.
    fn splat(&mut self, p: &Particle) {
        if self.coverage.is_empty() || p.size <= 0.0 {
            return;
        }

        let s = self.scale as f64;
        let cols = self.cols as usize;
        let sub_rows = self.rows as usize * 2;

        let min_sx = ((p.x - p.size) / s).floor();
        let max_sx = ((p.x + p.size) / s).ceil();
        let min_sy = ((p.y - p.size) / s).floor();
        let max_sy = ((p.y + p.size) / s).ceil();
        if max_sx < 0.0 || max_sy < 0.0 || min_sx >= cols as f64 || min_sy >= sub_rows as f64 {
            return;
        }

        let x0 = min_sx.max(0.0) as usize;
        let x1 = max_sx.min(cols as f64 - 1.0) as usize;
        let y0 = min_sy.max(0.0) as usize;
        let y1 = max_sy.min(sub_rows as f64 - 1.0) as usize;

        let gain = self.intensity as f64;
        for sy in y0..=y1 {
            let cy = (sy as f64 + 0.5) * s;
            let dy = cy - p.y;
            for sx in x0..=x1 {
                let cx = (sx as f64 + 0.5) * s;
                let dx = cx - p.x;
                let t = (dx * dx + dy * dy).sqrt() / p.size;
                let a = (disc_alpha(p.opacity, t) * gain).clamp(0.0, 1.0);
                if a <= 0.0 {
                    continue;
                }
                let idx = sy * cols + sx;
                let under = self.coverage[idx] as f64;
                self.coverage[idx] = (a + under * (1.0 - a)) as f32;
            }
        }
    }

    fn compose(&self, frame: &mut Frame) {
        let cols = self.cols as usize;
        for y in 0..self.rows.min(frame.height) {
            let top = y as usize * 2 * cols;
            let bottom = top + cols;
            for x in 0..self.cols.min(frame.width) {
                let upper = self.coverage[top + x as usize];
                let lower = self.coverage[bottom + x as usize];
                if let Some(cell) =
                    palette::steam_cell(self.color_mode, self.tint, upper, lower, self.bg)
                {
                    frame.set(x, y, cell);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn make_field() -> Field {
        let mut field = Field::new(ColorMode::Mono, Scheme::Steam, None, 10, Some(7));
        // 100x40 cells at scale 10 -> 1000x800 virtual pixels.
        field.reset(100, 40);
        field
    }

    #[test]
    fn pool_size_is_invariant() {
        let mut field = make_field();
        assert_eq!(field.particles().len(), POOL_SIZE);

        let mut frame = Frame::new(100, 40, None);
        for _ in 0..200 {
            field.advance(&mut frame);
        }
        assert_eq!(field.particles().len(), POOL_SIZE);
    }

    #[test]
    fn spawns_land_in_the_emission_window() {
        let field = make_field();
        assert_eq!(field.width, 1000.0);
        assert_eq!(field.height, 800.0);
        for p in field.particles() {
            assert!((450.0..550.0).contains(&p.x));
            assert!((576.0..616.0).contains(&p.y));
            assert!((10.0..25.0).contains(&p.size));
            assert_eq!(p.size, p.base_size);
            assert!((0.2..0.6).contains(&p.speed_y));
            assert!((-0.125..0.125).contains(&p.speed_x));
            assert!((0.05..0.20).contains(&p.opacity));
            assert!((300..700).contains(&p.max_life));
            assert!((0.05..0.13).contains(&p.expansion));
            assert_eq!(p.life, 0);
        }
    }

    #[test]
    fn expired_slot_respawns_in_place() {
        let mut field = make_field();
        let max_life = field.particles()[0].max_life;
        field.particles_mut()[0].life = max_life - 1;

        let mut frame = Frame::new(100, 40, None);
        field.advance(&mut frame);

        let p = field.particles()[0];
        assert_eq!(p.life, 0);
        assert!((10.0..25.0).contains(&p.size));
        assert_eq!(field.particles().len(), POOL_SIZE);
    }

    #[test]
    fn faded_out_slot_respawns_in_place() {
        let mut field = make_field();
        {
            let p = &mut field.particles_mut()[0];
            p.life = (p.max_life as f64 * 0.9) as u32;
            p.opacity = 0.0004;
        }

        let mut frame = Frame::new(100, 40, None);
        field.advance(&mut frame);

        let p = field.particles()[0];
        assert_eq!(p.life, 0);
        assert!(p.opacity > 0.0);
    }

    #[test]
    fn resize_leaves_particles_untouched() {
        let mut field = make_field();
        let before: Vec<Particle> = field.particles().to_vec();

        field.resize(10, 5);
        assert_eq!(field.particles(), &before[..]);

        field.resize(200, 60);
        assert_eq!(field.particles(), &before[..]);
    }

    #[test]
    fn zero_dimensions_stay_stable() {
        let mut field = Field::new(ColorMode::Mono, Scheme::Steam, None, 10, Some(7));
        field.reset(0, 0);
        assert_eq!(field.particles().len(), POOL_SIZE);

        let mut frame = Frame::new(0, 0, None);
        for _ in 0..50 {
            field.advance(&mut frame);
        }
        assert_eq!(field.particles().len(), POOL_SIZE);
    }

    #[test]
    fn advance_repaints_from_a_cleared_frame() {
        let mut field = make_field();
        let mut frame = Frame::new(100, 40, None);

        // A stale cell far from the emission band must not survive a tick.
        frame.set(
            0,
            0,
            Cell {
                ch: '#',
                fg: None,
                bg: None,
            },
        );
        field.advance(&mut frame);
        assert_eq!(frame.get(0, 0).unwrap().ch, ' ');

        // And the steam itself must have painted something.
        assert!(frame.cells.iter().any(|c| c.ch != ' '));
    }

    #[test]
    fn paused_field_does_not_advance() {
        let mut field = make_field();
        let mut frame = Frame::new(100, 40, None);
        field.paused = true;

        let before: Vec<Particle> = field.particles().to_vec();
        field.advance(&mut frame);
        assert_eq!(field.particles(), &before[..]);

        field.paused = false;
        field.advance(&mut frame);
        assert!(field.particles()[0].life > before[0].life || field.particles()[0].life == 0);
    }
}
