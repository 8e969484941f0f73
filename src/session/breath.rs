use super::messages::pick_message;
use super::SessionCell;
use crate::model::{
    AppEvent, BreathPhase, BreathTiming, CircleBounds, SessionState, MAX_RADIUS, MIN_RADIUS,
    RADIUS_STEP,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Parameters for the breathing animation loop.
pub(crate) struct BreathParams {
    pub state: SessionCell,
    pub timing: BreathTiming,
    pub event_tx: UnboundedSender<AppEvent>,
}

pub(crate) fn inhale_radii() -> impl Iterator<Item = u32> {
    (MIN_RADIUS..=MAX_RADIUS).step_by(RADIUS_STEP as usize)
}

pub(crate) fn exhale_radii() -> impl Iterator<Item = u32> {
    (MIN_RADIUS..=MAX_RADIUS).rev().step_by(RADIUS_STEP as usize)
}

/// Drive inhale/hold/exhale cycles until the session returns to `Idle` or the UI side
/// of the event channel goes away.
pub(crate) async fn run_breathing(params: BreathParams) {
    let BreathParams {
        state,
        timing,
        event_tx,
    } = params;
    let mut rng = StdRng::from_entropy();
    let mut cycles = 0u64;

    loop {
        if !wait_until_active(&state, &timing).await {
            break;
        }
        if event_tx
            .send(AppEvent::Prompt(pick_message(&mut rng).to_string()))
            .is_err()
        {
            break;
        }
        if !sweep(&state, &timing, &event_tx, BreathPhase::Inhale, inhale_radii()).await {
            break;
        }

        let _ = event_tx.send(AppEvent::Breath {
            phase: BreathPhase::Hold,
            radius: MAX_RADIUS,
            bounds: CircleBounds::from_radius(MAX_RADIUS),
        });
        tokio::time::sleep(timing.hold).await;

        if !wait_until_active(&state, &timing).await {
            break;
        }
        if event_tx
            .send(AppEvent::Prompt(pick_message(&mut rng).to_string()))
            .is_err()
        {
            break;
        }
        if !sweep(&state, &timing, &event_tx, BreathPhase::Exhale, exhale_radii()).await {
            break;
        }

        cycles += 1;
        debug!(cycles, "breathing cycle complete");
    }

    debug!(cycles, "breathing animation finished");
}

/// Emit one circle update per radius. Returns false when the loop should end.
async fn sweep(
    state: &SessionCell,
    timing: &BreathTiming,
    event_tx: &UnboundedSender<AppEvent>,
    phase: BreathPhase,
    radii: impl Iterator<Item = u32>,
) -> bool {
    for radius in radii {
        if !wait_until_active(state, timing).await {
            return false;
        }
        let ev = AppEvent::Breath {
            phase,
            radius,
            bounds: CircleBounds::from_radius(radius),
        };
        if event_tx.send(ev).is_err() {
            return false;
        }
        tokio::time::sleep(timing.step_interval).await;
    }
    true
}

/// Block while paused. Returns false once the session is back to `Idle`.
async fn wait_until_active(state: &SessionCell, timing: &BreathTiming) -> bool {
    loop {
        match state.load() {
            SessionState::Active => return true,
            SessionState::Paused => tokio::time::sleep(timing.pause_poll).await,
            SessionState::Idle => return false,
        }
    }
}
