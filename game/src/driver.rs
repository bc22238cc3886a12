use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::announcer::Announcer;
use crate::clock::Clock;
use crate::palette::ColorToken;
use crate::session::{GameSession, SessionEffect, SessionSnapshot};

/// Fixed tick cadence: coarse enough to be cheap, fine enough for
/// ceiling-second display accuracy.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Commands delivered serially to the session loop.
#[derive(Debug)]
pub enum SessionCmd {
    StartFromHomepage,
    StartLevel(u8),
    SelectLevel(u8),
    Click(ColorToken),
    ContinueToNextLevel,
    RetryLevel,
    ReturnToHomepage,
    Reset,
    Snapshot {
        respond: oneshot::Sender<SessionSnapshot>,
    },
}

pub fn channel() -> (
    mpsc::UnboundedSender<SessionCmd>,
    mpsc::UnboundedReceiver<SessionCmd>,
) {
    mpsc::unbounded_channel()
}

/// Owns the session: drains commands and the fixed tick, fires the timeout
/// transition exactly once per expiry, and dispatches announce effects.
/// Runs until every command sender is gone, then returns the final session.
pub async fn run_session_loop<C: Clock>(
    mut session: GameSession,
    clock: C,
    announcer: Arc<dyn Announcer>,
    mut rx: mpsc::UnboundedReceiver<SessionCmd>,
) -> GameSession {
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    loop {
        // A due tick is observed before any queued command, so a click that
        // races the expiry always loses to it.
        tokio::select! {
            biased;
            _ = ticker.tick() => {
                // Leaving Playing clears the active flag, so an expiry can
                // never fire twice.
                if session.is_active() && session.remaining(clock.now()).is_zero() {
                    let effect = session.handle_timeout();
                    dispatch(effect, &announcer);
                }
            }
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                let effect = apply_cmd(&mut session, &clock, cmd);
                dispatch(effect, &announcer);
            }
        }
    }
    session
}

fn apply_cmd<C: Clock>(session: &mut GameSession, clock: &C, cmd: SessionCmd) -> SessionEffect {
    let now = clock.now();
    match cmd {
        SessionCmd::StartFromHomepage => session.start_from_homepage(),
        SessionCmd::StartLevel(level) => session.start_level(level, now),
        SessionCmd::SelectLevel(level) => session.start_at_level(level, now),
        SessionCmd::Click(color) => session.handle_click(color, now),
        SessionCmd::ContinueToNextLevel => session.continue_to_next_level(now),
        SessionCmd::RetryLevel => session.retry_level(now),
        SessionCmd::ReturnToHomepage => session.return_to_homepage(),
        SessionCmd::Reset => session.reset(),
        SessionCmd::Snapshot { respond } => {
            let _ = respond.send(session.snapshot(now));
            SessionEffect::None
        }
    }
}

fn dispatch(effect: SessionEffect, announcer: &Arc<dyn Announcer>) {
    match effect {
        SessionEffect::None => {}
        SessionEffect::Announce { text, delay } => {
            let announcer = Arc::clone(announcer);
            tokio::spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                announcer.announce(&text);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcer::NullAnnouncer;
    use crate::clock::ManualClock;
    use crate::phase::{GamePhase, SummaryOutcome};

    async fn snapshot(tx: &mpsc::UnboundedSender<SessionCmd>) -> SessionSnapshot {
        let (respond, rx) = oneshot::channel();
        tx.send(SessionCmd::Snapshot { respond }).unwrap();
        rx.await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_fires_the_timeout_transition_once() {
        let clock = ManualClock::default();
        let (tx, rx) = channel();
        let handle = tokio::spawn(run_session_loop(
            GameSession::new(1),
            clock.clone(),
            Arc::new(NullAnnouncer),
            rx,
        ));

        tx.send(SessionCmd::StartLevel(1)).unwrap();
        let snap = snapshot(&tx).await;
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.remaining_seconds, 20);

        // Burn the budget and let ticks run. With nothing banked, the
        // penalty floors the score at zero and the expiry is a full game
        // over.
        clock.set(Duration::from_secs(30));
        tokio::time::advance(TICK_INTERVAL * 2).await;

        let snap = snapshot(&tx).await;
        assert_eq!(snap.phase, GamePhase::Failed);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.level, 1);

        // Further ticks do not fire again: the phase is stable.
        tokio::time::advance(TICK_INTERVAL * 5).await;
        let again = snapshot(&tx).await;
        assert_eq!(again.phase, snap.phase);

        drop(tx);
        let final_session = handle.await.unwrap();
        assert_eq!(final_session.phase(), GamePhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_with_banked_score_lands_on_retry() {
        let clock = ManualClock::default();
        let (tx, rx) = channel();

        let mut session = GameSession::new(2);
        session.set_score_for_test(50);
        let handle = tokio::spawn(run_session_loop(
            session,
            clock.clone(),
            Arc::new(NullAnnouncer),
            rx,
        ));

        tx.send(SessionCmd::StartLevel(2)).unwrap();
        // Force the loop to process the start before the clock moves.
        let snap = snapshot(&tx).await;
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.remaining_seconds, 15);

        clock.set(Duration::from_secs(16));
        tokio::time::advance(TICK_INTERVAL * 2).await;

        let snap = snapshot(&tx).await;
        assert_eq!(
            snap.phase,
            GamePhase::LevelSummary {
                outcome: SummaryOutcome::Retry
            }
        );
        assert_eq!(snap.score, 40);
        assert_eq!(snap.lives, 2);

        drop(tx);
        handle.await.unwrap();
    }
}
