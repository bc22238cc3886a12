use serde::{Deserialize, Serialize};

use crate::palette::{self, ColorToken};
use crate::rng::RandomSource;

/// Re-shuffles before an arrangement identical to the previous round is
/// accepted anyway. Termination wins over the anti-repeat rule.
const MAX_SHUFFLE_ATTEMPTS: usize = 10;

/// The ordered set of color buttons shown for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardArrangement {
    cells: Vec<ColorToken>,
}

impl BoardArrangement {
    /// Builds the board for one round.
    ///
    /// Levels 1-2 show the two-color subset and refuse to repeat the previous
    /// round's exact order; levels 3-4 and 6+ show the full palette shuffled;
    /// level 5 doubles the forbidden color into two trap cells.
    pub fn generate<R: RandomSource>(
        level: u8,
        forbidden: ColorToken,
        previous: Option<&BoardArrangement>,
        rng: &mut R,
    ) -> Self {
        if level == 5 {
            return Self::trap_board(forbidden, rng);
        }

        let palette = palette::palette_for_level(level);
        let mut cells: Vec<ColorToken> = palette.to_vec();
        shuffle(&mut cells, rng);

        if level <= 2 {
            if let Some(previous) = previous {
                let mut attempts = 1;
                while cells == previous.cells && attempts < MAX_SHUFFLE_ATTEMPTS {
                    shuffle(&mut cells, rng);
                    attempts += 1;
                }
            }
        }

        Self { cells }
    }

    /// Level-5 board: the forbidden color twice, padded with the first two
    /// other palette colors, then shuffled.
    fn trap_board<R: RandomSource>(forbidden: ColorToken, rng: &mut R) -> Self {
        let mut cells = vec![forbidden, forbidden];
        cells.extend(
            ColorToken::ALL
                .iter()
                .copied()
                .filter(|&color| color != forbidden)
                .take(2),
        );
        shuffle(&mut cells, rng);
        Self { cells }
    }

    pub fn cells(&self) -> &[ColorToken] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Fisher-Yates, uniform per call.
fn shuffle<R: RandomSource>(cells: &mut [ColorToken], rng: &mut R) {
    for i in (1..cells.len()).rev() {
        let j = rng.index(i + 1);
        cells.swap(i, j);
    }
}
