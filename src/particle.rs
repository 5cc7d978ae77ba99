// Copyright (c) 2026 softveil

/// One recyclable steam puff. Plain value type; the field owns the pool and
/// overwrites expired slots in place, so a slot keeps its identity across
/// respawns.
///
/// Coordinates are virtual pixels with the origin at the surface top-left.
/// All motion is expressed per frame, not per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub base_size: f64,
    pub speed_y: f64,
    pub speed_x: f64,
    pub opacity: f64,
    pub life: u32,
    pub max_life: u32,
    pub expansion: f64,
}

impl Particle {
    /// Advances one frame. Returns true once the puff has expired; the
    /// caller respawns the slot.
    ///
    /// Motion and growth integrate before the fade and expiry checks, so
    /// the last rendered frame of a dying puff still reflects its latest
    /// position.
    pub fn step(&mut self) -> bool {
        self.y -= self.speed_y;
        self.x += self.speed_x + (self.life as f64 / 50.0).sin() * 0.1;
        self.size += self.expansion;
        self.life += 1;

        // Fade out over the last 30% of the lifetime budget.
        if self.life as f64 > self.max_life as f64 * 0.7 {
            self.opacity -= 0.0005;
        }

        self.life >= self.max_life || self.opacity <= 0.0
    }
}

/// Alpha of the soft disc at normalized distance `t` from its center
/// (0 = center, 1 = edge). Three stops, linearly interpolated: `opacity`
/// at the center, half of it at 40% of the radius, transparent at the
/// edge. Never negative, whatever the inputs.
pub fn disc_alpha(opacity: f64, t: f64) -> f64 {
    let op = opacity.max(0.0);
    if t >= 1.0 {
        0.0
    } else if t <= 0.4 {
        op - op * 0.5 * (t / 0.4)
    } else {
        op * 0.5 * (1.0 - (t - 0.4) / 0.6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puff() -> Particle {
        Particle {
            x: 3.0,
            y: 10.0,
            size: 12.0,
            base_size: 12.0,
            speed_y: 0.3,
            speed_x: 0.05,
            opacity: 0.15,
            life: 123,
            max_life: 500,
            expansion: 0.08,
        }
    }

    #[test]
    fn step_integrates_position_exactly() {
        let mut p = puff();
        let want_x = p.x + p.speed_x + (p.life as f64 / 50.0).sin() * 0.1;
        let want_y = p.y - p.speed_y;
        p.step();
        assert!((p.x - want_x).abs() < 1e-9);
        assert!((p.y - want_y).abs() < 1e-9);
        assert_eq!(p.life, 124);
    }

    #[test]
    fn size_never_shrinks_between_spawns() {
        let mut p = puff();
        let mut prev = p.size;
        for _ in 0..500 {
            p.step();
            assert!(p.size >= prev);
            prev = p.size;
        }
    }

    #[test]
    fn opacity_holds_until_seventy_percent_of_life() {
        let mut p = puff();
        p.life = 100;
        let before = p.opacity;
        p.step();
        assert_eq!(p.opacity, before);
    }

    #[test]
    fn opacity_fades_by_exact_step_past_threshold() {
        let mut p = puff();
        p.life = 210;
        p.max_life = 300;
        let before = p.opacity;
        p.step();
        assert!((before - p.opacity - 0.0005).abs() < 1e-12);
    }

    #[test]
    fn expires_at_end_of_life() {
        let mut p = puff();
        p.life = p.max_life - 1;
        assert!(p.step());
    }

    #[test]
    fn expires_when_faded_out() {
        let mut p = puff();
        p.life = 400;
        p.opacity = 0.0004;
        assert!(p.step());
        assert!(p.opacity <= 0.0);
    }

    #[test]
    fn disc_alpha_matches_gradient_stops() {
        let op = 0.2;
        assert!((disc_alpha(op, 0.0) - op).abs() < 1e-12);
        assert!((disc_alpha(op, 0.4) - op * 0.5).abs() < 1e-12);
        assert_eq!(disc_alpha(op, 1.0), 0.0);
        assert_eq!(disc_alpha(op, 2.5), 0.0);
    }

    #[test]
    fn disc_alpha_stays_in_render_bounds() {
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let a = disc_alpha(0.2, t);
            assert!((0.0..=0.2).contains(&a));
        }
        // A puff that overshot zero opacity must still draw as nothing.
        assert_eq!(disc_alpha(-0.001, 0.2), 0.0);
    }
}
