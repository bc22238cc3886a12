use serde::{Deserialize, Serialize};

use crate::catalog::ROUNDS_PER_LEVEL;
use crate::palette::{self, ColorToken};
use crate::rng::RandomSource;

/// Longest run of identical forbidden colors the generator aims for.
pub const MAX_RUN: usize = 3;

/// Draws per position before the run constraint is abandoned. The loop must
/// terminate, so the last draw is accepted regardless.
const MAX_DRAW_ATTEMPTS: usize = 10;

/// The per-level "avoid" sequence: one forbidden color per round, plus the
/// palette subset it was drawn from. Replaced wholesale at level start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSpec {
    colors: Vec<ColorToken>,
    palette: Vec<ColorToken>,
}

impl SequenceSpec {
    pub fn generate<R: RandomSource>(level: u8, rng: &mut R) -> Self {
        let palette = palette::palette_for_level(level);
        let mut colors = Vec::with_capacity(ROUNDS_PER_LEVEL);
        for _ in 0..ROUNDS_PER_LEVEL {
            let mut candidate = draw(palette, rng);
            for _attempt in 1..MAX_DRAW_ATTEMPTS {
                if !extends_max_run(&colors, candidate) {
                    break;
                }
                candidate = draw(palette, rng);
            }
            colors.push(candidate);
        }
        Self {
            colors,
            palette: palette.to_vec(),
        }
    }

    pub fn color_at(&self, round: usize) -> ColorToken {
        self.colors[round]
    }

    pub fn colors(&self) -> &[ColorToken] {
        &self.colors
    }

    pub fn palette(&self) -> &[ColorToken] {
        &self.palette
    }
}

fn draw<R: RandomSource>(palette: &[ColorToken], rng: &mut R) -> ColorToken {
    palette[rng.index(palette.len())]
}

/// True when appending `candidate` would make a fourth consecutive identical
/// entry.
fn extends_max_run(colors: &[ColorToken], candidate: ColorToken) -> bool {
    colors.len() >= MAX_RUN
        && colors[colors.len() - MAX_RUN..]
            .iter()
            .all(|&color| color == candidate)
}
