// Copyright (c) 2026 softveil

use crossterm::style::Color;

use crate::cell::Cell;
use crate::runtime::{ColorMode, Scheme};

/// Coverage below this quantizes to the background anyway.
const DIM_FLOOR: f32 = 1.0 / 255.0;

/// Shade ramp for color-less terminals, dimmest first.
const MONO_RAMP: [char; 4] = ['░', '▒', '▓', '█'];

pub fn scheme_tint(scheme: Scheme) -> (u8, u8, u8) {
    match scheme {
        Scheme::Steam => (255, 255, 255),
        Scheme::Moonlit => (196, 214, 255),
        Scheme::Amber => (255, 200, 128),
        Scheme::Mint => (170, 255, 210),
        Scheme::Rose => (255, 176, 196),
        Scheme::Ember => (255, 122, 64),
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn shade(tint: (u8, u8, u8), v: f32) -> (u8, u8, u8) {
    let v = v.clamp(0.0, 1.0);
    let scale = |c: u8| ((c as f32) * v).round().clamp(0.0, 255.0) as u8;
    (scale(tint.0), scale(tint.1), scale(tint.2))
}

fn quantize(mode: ColorMode, (r, g, b): (u8, u8, u8)) -> Color {
    match mode {
        ColorMode::TrueColor | ColorMode::Mono => Color::Rgb { r, g, b },
        ColorMode::Color256 => Color::AnsiValue(rgb_to_ansi256(r, g, b)),
        ColorMode::Color16 => rgb_to_color16(r, g, b),
    }
}

/// Builds the cell for one column of two stacked subpixels (`upper` drawn
/// via the half-block glyph's foreground, `lower` via its background), or
/// `None` when both are too dim to differ from the cleared background.
pub fn steam_cell(
    mode: ColorMode,
    tint: (u8, u8, u8),
    upper: f32,
    lower: f32,
    bg: Option<Color>,
) -> Option<Cell> {
    let up = upper >= DIM_FLOOR;
    let low = lower >= DIM_FLOOR;
    if !up && !low {
        return None;
    }

    if mode == ColorMode::Mono {
        let v = ((upper + lower) * 0.5).clamp(0.0, 1.0);
        let idx = ((v * MONO_RAMP.len() as f32) as usize).min(MONO_RAMP.len() - 1);
        return Some(Cell {
            ch: MONO_RAMP[idx],
            fg: None,
            bg,
        });
    }

    let color = |v: f32| quantize(mode, shade(tint, v));

    Some(if up && low {
        Cell {
            ch: '▀',
            fg: Some(color(upper)),
            bg: Some(color(lower)),
        }
    } else if up {
        Cell {
            ch: '▀',
            fg: Some(color(upper)),
            bg,
        }
    } else {
        Cell {
            ch: '▄',
            fg: Some(color(lower)),
            bg,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_subpixels_draw_nothing() {
        assert!(steam_cell(ColorMode::TrueColor, (255, 255, 255), 0.0, 0.0, None).is_none());
        assert!(steam_cell(ColorMode::Mono, (255, 255, 255), 0.001, 0.001, None).is_none());
    }

    #[test]
    fn half_blocks_pick_the_lit_subpixel() {
        let tint = (255, 255, 255);
        let upper_only = steam_cell(ColorMode::TrueColor, tint, 0.5, 0.0, None).unwrap();
        assert_eq!(upper_only.ch, '▀');
        assert!(upper_only.bg.is_none());

        let lower_only = steam_cell(ColorMode::TrueColor, tint, 0.0, 0.5, None).unwrap();
        assert_eq!(lower_only.ch, '▄');

        let both = steam_cell(ColorMode::TrueColor, tint, 0.5, 0.5, None).unwrap();
        assert_eq!(both.ch, '▀');
        assert!(both.bg.is_some());
    }

    #[test]
    fn mono_uses_the_shade_ramp() {
        let dim = steam_cell(ColorMode::Mono, (255, 255, 255), 0.1, 0.1, None).unwrap();
        assert_eq!(dim.ch, '░');
        assert!(dim.fg.is_none());

        let bright = steam_cell(ColorMode::Mono, (255, 255, 255), 1.0, 1.0, None).unwrap();
        assert_eq!(bright.ch, '█');
    }

    #[test]
    fn ansi256_hits_the_cube_corners() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
    }

    #[test]
    fn shade_scales_toward_black() {
        assert_eq!(shade((200, 100, 50), 0.0), (0, 0, 0));
        assert_eq!(shade((200, 100, 50), 1.0), (200, 100, 50));
        assert_eq!(shade((200, 100, 50), 0.5), (100, 50, 25));
    }
}
