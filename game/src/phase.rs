use serde::{Deserialize, Serialize};

/// Why a level summary is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryOutcome {
    /// All ten rounds cleared; the next level may have unlocked.
    Won,
    /// A wrong tap or a timeout ended the attempt, but the session survives.
    Retry,
}

/// Score movement behind the most recent summary or failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base: u32,
    pub time_bonus: u32,
    pub total: i32,
}

/// The five session statuses. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    #[default]
    Homepage,
    Waiting,
    Playing,
    LevelSummary {
        outcome: SummaryOutcome,
    },
    Failed,
}

impl GamePhase {
    pub fn is_playing(self) -> bool {
        matches!(self, GamePhase::Playing)
    }

    pub fn is_summary(self) -> bool {
        matches!(self, GamePhase::LevelSummary { .. })
    }

    pub fn is_won_summary(self) -> bool {
        matches!(
            self,
            GamePhase::LevelSummary {
                outcome: SummaryOutcome::Won
            }
        )
    }

    pub fn is_retry_summary(self) -> bool {
        matches!(
            self,
            GamePhase::LevelSummary {
                outcome: SummaryOutcome::Retry
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_is_homepage() {
        assert_eq!(GamePhase::default(), GamePhase::Homepage);
    }

    #[test]
    fn summary_predicates_distinguish_outcomes() {
        let won = GamePhase::LevelSummary {
            outcome: SummaryOutcome::Won,
        };
        let retry = GamePhase::LevelSummary {
            outcome: SummaryOutcome::Retry,
        };

        assert!(won.is_summary() && won.is_won_summary() && !won.is_retry_summary());
        assert!(retry.is_summary() && retry.is_retry_summary() && !retry.is_won_summary());
        assert!(!GamePhase::Playing.is_summary());
    }
}
