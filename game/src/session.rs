use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::BoardArrangement;
use crate::catalog::{self, LEVEL_COUNT, ROUNDS_PER_LEVEL, STARTING_LIVES};
use crate::clock;
use crate::palette::ColorToken;
use crate::phase::{GamePhase, ScoreBreakdown, SummaryOutcome};
use crate::rng::XorShift64;
use crate::sequence::SequenceSpec;

pub const BASE_POINTS_PER_ROUND: u32 = 10;
pub const TIME_BONUS_PER_SECOND: u32 = 10;
pub const PENALTY_POINTS: u32 = 10;

/// Delay before the round-0 color is announced at level start.
pub const LEVEL_START_ANNOUNCE_DELAY: Duration = Duration::from_secs(1);

/// Announcement the caller schedules after a transition. The session never
/// speaks on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    None,
    Announce { text: String, delay: Duration },
}

/// One running game: level progression, scoring, lives, round state, and the
/// per-session level unlocks. All operations are synchronous; callers pass
/// the current wall-clock reading where timing matters and dispatch the
/// returned [`SessionEffect`] themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    phase: GamePhase,
    level: u8,
    score: u32,
    lives: u8,
    round: usize,
    sequence: Option<SequenceSpec>,
    board: BoardArrangement,
    #[serde(with = "crate::serde_duration")]
    started_at: Duration,
    #[serde(with = "crate::serde_duration")]
    time_limit: Duration,
    transitioning: bool,
    game_active: bool,
    unlocked: BTreeSet<u8>,
    breakdown: Option<ScoreBreakdown>,
    rng: XorShift64,
}

impl GameSession {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::Homepage,
            level: 1,
            score: 0,
            lives: STARTING_LIVES,
            round: 0,
            sequence: None,
            board: BoardArrangement::default(),
            started_at: Duration::ZERO,
            time_limit: Duration::ZERO,
            transitioning: false,
            game_active: false,
            unlocked: BTreeSet::from([1]),
            breakdown: None,
            rng: XorShift64::new(seed),
        }
    }

    /// Homepage -> Waiting: a fresh run from level 1. Unlocks are untouched.
    pub fn start_from_homepage(&mut self) -> SessionEffect {
        if self.phase != GamePhase::Homepage {
            return SessionEffect::None;
        }
        self.level = 1;
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.phase = GamePhase::Waiting;
        SessionEffect::None
    }

    /// Entry action into Playing, valid from Waiting, Homepage, or either
    /// summary. Regenerates the sequence and the round-0 board and anchors
    /// the level clock at `now`.
    pub fn start_level(&mut self, level: u8, now: Duration) -> SessionEffect {
        match self.phase {
            GamePhase::Homepage | GamePhase::Waiting | GamePhase::LevelSummary { .. } => {
                self.begin_level(level, now)
            }
            GamePhase::Playing | GamePhase::Failed => SessionEffect::None,
        }
    }

    /// Homepage -> Playing directly, only for a level already unlocked.
    /// Selecting a locked level is a deliberate no-op.
    pub fn start_at_level(&mut self, level: u8, now: Duration) -> SessionEffect {
        if self.phase != GamePhase::Homepage || !self.unlocked.contains(&level) {
            return SessionEffect::None;
        }
        self.begin_level(level, now)
    }

    fn begin_level(&mut self, level: u8, now: Duration) -> SessionEffect {
        let level = catalog::clamp_level(level);
        let sequence = SequenceSpec::generate(level, &mut self.rng);
        let first = sequence.color_at(0);

        self.level = level;
        self.board = BoardArrangement::generate(level, first, None, &mut self.rng);
        self.sequence = Some(sequence);
        self.round = 0;
        self.started_at = now;
        self.time_limit = catalog::time_limit(level);
        self.transitioning = false;
        self.breakdown = None;
        self.phase = GamePhase::Playing;
        self.game_active = true;

        tracing::debug!(level, "level started");
        SessionEffect::Announce {
            text: first.spoken_name().to_string(),
            delay: LEVEL_START_ANNOUNCE_DELAY,
        }
    }

    /// A tap on a color button. Correct means the tapped color is NOT the
    /// announced one; rewards avoidance, punishes obedience.
    pub fn handle_click(&mut self, color: ColorToken, now: Duration) -> SessionEffect {
        if !self.phase.is_playing() || self.transitioning {
            return SessionEffect::None;
        }
        let Some(forbidden) = self.forbidden_color() else {
            return SessionEffect::None;
        };

        if color == forbidden {
            self.apply_penalty();
            return SessionEffect::None;
        }

        if self.round + 1 >= ROUNDS_PER_LEVEL {
            self.complete_level(now);
            return SessionEffect::None;
        }

        self.advance_round()
    }

    /// Time budget exhausted while playing. Same penalty branch as a wrong
    /// tap; the driver guarantees this fires once per expiry.
    pub fn handle_timeout(&mut self) -> SessionEffect {
        if !self.phase.is_playing() {
            return SessionEffect::None;
        }
        tracing::debug!(level = self.level, round = self.round, "time expired");
        self.apply_penalty();
        SessionEffect::None
    }

    /// Won summary -> the next level.
    pub fn continue_to_next_level(&mut self, now: Duration) -> SessionEffect {
        if !self.phase.is_won_summary() {
            return SessionEffect::None;
        }
        self.begin_level(self.level.saturating_add(1), now)
    }

    /// Retry summary -> the same level again, with the decremented score and
    /// lives carried over.
    pub fn retry_level(&mut self, now: Duration) -> SessionEffect {
        if !self.phase.is_retry_summary() {
            return SessionEffect::None;
        }
        self.begin_level(self.level, now)
    }

    /// Any phase -> Homepage. Round state is dropped; score, lives, level and
    /// unlocks are preserved. Idempotent.
    pub fn return_to_homepage(&mut self) -> SessionEffect {
        self.phase = GamePhase::Homepage;
        self.sequence = None;
        self.board = BoardArrangement::default();
        self.round = 0;
        self.transitioning = false;
        self.game_active = false;
        self.breakdown = None;
        SessionEffect::None
    }

    /// Back to a pristine session: Homepage, level 1, and only level 1
    /// unlocked. The rng stream is deliberately not rewound.
    pub fn reset(&mut self) -> SessionEffect {
        self.phase = GamePhase::Homepage;
        self.level = 1;
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.round = 0;
        self.sequence = None;
        self.board = BoardArrangement::default();
        self.started_at = Duration::ZERO;
        self.time_limit = Duration::ZERO;
        self.transitioning = false;
        self.game_active = false;
        self.unlocked = BTreeSet::from([1]);
        self.breakdown = None;
        SessionEffect::None
    }

    fn advance_round(&mut self) -> SessionEffect {
        // Latch out clicks until the next round's board is in place.
        self.transitioning = true;

        let next_round = self.round + 1;
        let next_forbidden = self
            .sequence
            .as_ref()
            .expect("playing phase always holds a sequence")
            .color_at(next_round);
        self.board = BoardArrangement::generate(
            self.level,
            next_forbidden,
            Some(&self.board),
            &mut self.rng,
        );
        self.round = next_round;
        self.transitioning = false;

        SessionEffect::Announce {
            text: next_forbidden.spoken_name().to_string(),
            delay: Duration::ZERO,
        }
    }

    fn complete_level(&mut self, now: Duration) {
        let elapsed = now.saturating_sub(self.started_at);
        let actual_remaining = self.time_limit.saturating_sub(elapsed);

        let base = BASE_POINTS_PER_ROUND * ROUNDS_PER_LEVEL as u32;
        let time_bonus = actual_remaining.as_secs() as u32 * TIME_BONUS_PER_SECOND;
        let total = base + time_bonus;
        self.score = self.score.saturating_add(total);

        let next = self.level + 1;
        if next <= LEVEL_COUNT {
            self.unlocked.insert(next);
        }

        self.breakdown = Some(ScoreBreakdown {
            base,
            time_bonus,
            total: total as i32,
        });
        self.phase = GamePhase::LevelSummary {
            outcome: SummaryOutcome::Won,
        };
        self.game_active = false;
        tracing::debug!(level = self.level, score = self.score, "level complete");
    }

    fn apply_penalty(&mut self) {
        self.score = self.score.saturating_sub(PENALTY_POINTS);
        self.lives = self.lives.saturating_sub(1);
        self.breakdown = Some(ScoreBreakdown {
            base: 0,
            time_bonus: 0,
            total: -(PENALTY_POINTS as i32),
        });
        self.game_active = false;

        if self.score == 0 || self.lives == 0 {
            // Session over: everything rewinds for a fresh run from level 1.
            self.score = 0;
            self.lives = STARTING_LIVES;
            self.level = 1;
            self.phase = GamePhase::Failed;
        } else {
            self.phase = GamePhase::LevelSummary {
                outcome: SummaryOutcome::Retry,
            };
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn round_index(&self) -> usize {
        self.round
    }

    pub fn board(&self) -> &BoardArrangement {
        &self.board
    }

    pub fn sequence(&self) -> Option<&SequenceSpec> {
        self.sequence.as_ref()
    }

    /// The color announced for the current round, while a level is loaded.
    pub fn forbidden_color(&self) -> Option<ColorToken> {
        self.sequence.as_ref().map(|spec| spec.color_at(self.round))
    }

    pub fn unlocked_levels(&self) -> &BTreeSet<u8> {
        &self.unlocked
    }

    pub fn is_active(&self) -> bool {
        self.game_active
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    pub fn breakdown(&self) -> Option<ScoreBreakdown> {
        self.breakdown
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        clock::remaining(self.time_limit, self.started_at, now)
    }

    /// Read model handed to UI hosts.
    pub fn snapshot(&self, now: Duration) -> SessionSnapshot {
        let remaining_seconds = if self.game_active {
            clock::display_seconds(self.remaining(now))
        } else {
            0
        };
        SessionSnapshot {
            phase: self.phase,
            level: self.level,
            score: self.score,
            lives: self.lives,
            round_index: self.round,
            board: self.board.cells().to_vec(),
            remaining_seconds,
            unlocked_levels: self.unlocked.iter().copied().collect(),
            breakdown: self.breakdown,
        }
    }

    pub fn set_score_for_test(&mut self, score: u32) {
        self.score = score;
    }

    pub fn set_lives_for_test(&mut self, lives: u8) {
        self.lives = lives.min(STARTING_LIVES);
    }
}

/// Serializable read model; what a UI needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub level: u8,
    pub score: u32,
    pub lives: u8,
    pub round_index: usize,
    pub board: Vec<ColorToken>,
    pub remaining_seconds: u64,
    pub unlocked_levels: Vec<u8>,
    pub breakdown: Option<ScoreBreakdown>,
}
