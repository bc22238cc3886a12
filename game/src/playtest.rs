use std::time::Duration;

use engine::GameLogic;

use crate::palette::ColorToken;
use crate::session::GameSession;

/// Scripted session inputs. `Wait` stands in for the timer driver: it
/// advances virtual time and fires the timeout when the budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptInput {
    Wait(Duration),
    Click(ColorToken),
    StartFromHomepage,
    StartLevel(u8),
    SelectLevel(u8),
    ContinueToNextLevel,
    RetryLevel,
    ReturnToHomepage,
    Reset,
}

/// Session plus the virtual clock the script advances.
#[derive(Debug, Clone)]
pub struct ScriptedSession {
    pub session: GameSession,
    pub now: Duration,
}

impl ScriptedSession {
    /// Any color that is safe to tap for the current round, or an arbitrary
    /// one when no level is loaded.
    pub fn safe_color(&self) -> ColorToken {
        let forbidden = self.session.forbidden_color();
        ColorToken::ALL
            .iter()
            .copied()
            .find(|&color| Some(color) != forbidden)
            .expect("the palette always holds a non-forbidden color")
    }
}

#[derive(Debug, Clone)]
pub struct SessionLogic {
    seed: u64,
}

impl SessionLogic {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl GameLogic for SessionLogic {
    type State = ScriptedSession;
    type Input = ScriptInput;

    fn initial_state(&self) -> Self::State {
        ScriptedSession {
            session: GameSession::new(self.seed),
            now: Duration::ZERO,
        }
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        match input {
            ScriptInput::Wait(by) => {
                next.now += by;
                if next.session.is_active() && next.session.remaining(next.now).is_zero() {
                    next.session.handle_timeout();
                }
            }
            ScriptInput::Click(color) => {
                next.session.handle_click(color, next.now);
            }
            ScriptInput::StartFromHomepage => {
                next.session.start_from_homepage();
            }
            ScriptInput::StartLevel(level) => {
                next.session.start_level(level, next.now);
            }
            ScriptInput::SelectLevel(level) => {
                next.session.start_at_level(level, next.now);
            }
            ScriptInput::ContinueToNextLevel => {
                next.session.continue_to_next_level(next.now);
            }
            ScriptInput::RetryLevel => {
                next.session.retry_level(next.now);
            }
            ScriptInput::ReturnToHomepage => {
                next.session.return_to_homepage();
            }
            ScriptInput::Reset => {
                next.session.reset();
            }
        }
        next
    }
}
