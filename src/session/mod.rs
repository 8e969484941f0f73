//! Panic-mode session: state machine, breathing animation and ambient sound.
//!
//! `SessionController` is the only writer of the session state. Each animation task gets a
//! read handle to the atomic cell of the session it was spawned for and checks it before
//! every step. A stopped session's cell stays `Idle` for good.

mod breath;
pub mod messages;
pub mod sound;

use crate::model::{AppEvent, BreathTiming, InfoEvent, SessionState};
use sound::SoundPlayer;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Session state shared between the controller and the animation task.
#[derive(Debug, Clone)]
pub struct SessionCell(Arc<AtomicU8>);

impl SessionCell {
    pub fn new(state: SessionState) -> Self {
        Self(Arc::new(AtomicU8::new(encode(state))))
    }

    pub fn load(&self) -> SessionState {
        decode(self.0.load(Ordering::Acquire))
    }

    fn store(&self, state: SessionState) {
        self.0.store(encode(state), Ordering::Release);
    }
}

fn encode(state: SessionState) -> u8 {
    match state {
        SessionState::Idle => 0,
        SessionState::Active => 1,
        SessionState::Paused => 2,
    }
}

fn decode(raw: u8) -> SessionState {
    match raw {
        1 => SessionState::Active,
        2 => SessionState::Paused,
        _ => SessionState::Idle,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
}

pub struct SessionController {
    cell: SessionCell,
    timing: BreathTiming,
    sound: Arc<dyn SoundPlayer>,
    event_tx: UnboundedSender<AppEvent>,
    animation: Option<JoinHandle<()>>,
}

impl SessionController {
    pub fn new(
        timing: BreathTiming,
        sound: Arc<dyn SoundPlayer>,
        event_tx: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            cell: SessionCell::new(SessionState::Idle),
            timing,
            sound,
            event_tx,
            animation: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.cell.load()
    }

    /// Start a session from `Idle` or resume a paused one. No-op while `Active`.
    ///
    /// Must be called from within a tokio runtime: starting from `Idle` spawns the
    /// animation task.
    pub fn start_or_resume(&mut self) -> Option<Transition> {
        let from = self.state();
        let info_ev = match from {
            SessionState::Active => return None,
            SessionState::Idle => {
                // Each animation task watches its own cell. A stopped one stays Idle.
                self.cell = SessionCell::new(SessionState::Active);
                self.animation = Some(tokio::spawn(breath::run_breathing(breath::BreathParams {
                    state: self.cell.clone(),
                    timing: self.timing,
                    event_tx: self.event_tx.clone(),
                })));
                InfoEvent::SessionStarted
            }
            SessionState::Paused => {
                self.cell.store(SessionState::Active);
                InfoEvent::SessionResumed
            }
        };
        let sound_err = self.sound.start().err();
        self.announce(from, SessionState::Active, info_ev);
        if let Some(e) = sound_err {
            warn!(error = %e, "continuing without sound");
            self.emit(AppEvent::Info(InfoEvent::SoundUnavailable(e.to_string())));
        }
        Some(Transition {
            from,
            to: SessionState::Active,
        })
    }

    /// Pause an active session. The animation keeps running but stops advancing.
    pub fn pause(&mut self) -> Option<Transition> {
        let from = self.state();
        if from != SessionState::Active {
            return None;
        }
        self.cell.store(SessionState::Paused);
        self.sound.stop();
        self.announce(from, SessionState::Paused, InfoEvent::SessionPaused);
        Some(Transition {
            from,
            to: SessionState::Paused,
        })
    }

    /// End the session and return to `Idle`.
    pub fn stop(&mut self) -> Option<Transition> {
        let from = self.state();
        if from == SessionState::Idle {
            return None;
        }
        self.cell.store(SessionState::Idle);
        self.sound.stop();
        if let Some(handle) = self.animation.take() {
            handle.abort();
        }
        self.announce(from, SessionState::Idle, InfoEvent::SessionStopped);
        Some(Transition {
            from,
            to: SessionState::Idle,
        })
    }

    fn announce(&self, from: SessionState, to: SessionState, info_ev: InfoEvent) {
        info!(from = from.label(), to = to.label(), "session transition");
        self.emit(AppEvent::SessionChanged { state: to });
        self.emit(AppEvent::Info(info_ev));
    }

    fn emit(&self, ev: AppEvent) {
        let _ = self.event_tx.send(ev);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.sound.stop();
        if let Some(handle) = self.animation.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SoundError;
    use crate::model::{CIRCLE_CENTER, MAX_RADIUS, MIN_RADIUS, RADIUS_STEP};
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    #[derive(Default)]
    struct RecordingPlayer {
        playing: Mutex<bool>,
        starts: AtomicUsize,
    }

    impl SoundPlayer for RecordingPlayer {
        fn start(&self) -> Result<(), SoundError> {
            let mut playing = self.playing.lock().unwrap();
            if !*playing {
                self.starts.fetch_add(1, Ordering::SeqCst);
                *playing = true;
            }
            Ok(())
        }

        fn stop(&self) {
            *self.playing.lock().unwrap() = false;
        }

        fn is_playing(&self) -> bool {
            *self.playing.lock().unwrap()
        }
    }

    struct BrokenPlayer;

    impl SoundPlayer for BrokenPlayer {
        fn start(&self) -> Result<(), SoundError> {
            Err(SoundError::AssetMissing(PathBuf::from("relaxing_sound.wav")))
        }

        fn stop(&self) {}

        fn is_playing(&self) -> bool {
            false
        }
    }

    fn controller() -> (
        SessionController,
        Arc<RecordingPlayer>,
        UnboundedReceiver<AppEvent>,
    ) {
        let (tx, rx) = unbounded_channel();
        let player = Arc::new(RecordingPlayer::default());
        let ctrl = SessionController::new(BreathTiming::default(), player.clone(), tx);
        (ctrl, player, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn radii(events: &[AppEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|ev| match ev {
                AppEvent::Breath { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect()
    }

    fn assert_sound_matches(ctrl: &SessionController, player: &RecordingPlayer) {
        assert_eq!(
            player.is_playing(),
            ctrl.state() == SessionState::Active,
            "sound must play exactly while active (state {:?})",
            ctrl.state()
        );
    }

    #[test]
    fn cell_round_trips_every_state() {
        let cell = SessionCell::new(SessionState::Idle);
        for s in [SessionState::Active, SessionState::Paused, SessionState::Idle] {
            cell.store(s);
            assert_eq!(cell.load(), s);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_from_idle_plays_sound_and_animates() {
        let (mut ctrl, player, mut rx) = controller();
        assert_eq!(ctrl.state(), SessionState::Idle);

        let t = ctrl.start_or_resume();
        assert_eq!(
            t,
            Some(Transition {
                from: SessionState::Idle,
                to: SessionState::Active
            })
        );
        assert!(player.is_playing());

        tokio::time::sleep(Duration::from_millis(250)).await;
        let events = drain(&mut rx);
        assert!(matches!(
            events[0],
            AppEvent::SessionChanged {
                state: SessionState::Active
            }
        ));
        assert!(events.iter().any(|e| matches!(e, AppEvent::Prompt(_))));
        assert_eq!(&radii(&events)[..3], &[40, 44, 48]);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_start_and_pause_are_no_ops() {
        let (mut ctrl, player, mut rx) = controller();
        ctrl.start_or_resume();
        tokio::time::sleep(Duration::from_millis(150)).await;
        drain(&mut rx);

        assert_eq!(ctrl.start_or_resume(), None);
        assert_eq!(player.starts.load(Ordering::SeqCst), 1);
        assert!(drain(&mut rx)
            .iter()
            .all(|e| !matches!(e, AppEvent::SessionChanged { .. })));

        assert!(ctrl.pause().is_some());
        assert_eq!(ctrl.pause(), None);
        assert!(!player.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_stop_from_idle_do_nothing() {
        let (mut ctrl, player, mut rx) = controller();
        assert_eq!(ctrl.pause(), None);
        assert_eq!(ctrl.stop(), None);
        assert!(!player.is_playing());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sound_tracks_active_state_across_transitions() {
        let (mut ctrl, player, _rx) = controller();
        let ops: [fn(&mut SessionController) -> Option<Transition>; 10] = [
            SessionController::pause,
            SessionController::start_or_resume,
            SessionController::start_or_resume,
            SessionController::pause,
            SessionController::pause,
            SessionController::start_or_resume,
            SessionController::stop,
            SessionController::pause,
            SessionController::start_or_resume,
            SessionController::stop,
        ];
        for op in ops {
            op(&mut ctrl);
            assert_sound_matches(&ctrl, &player);
            tokio::time::sleep(Duration::from_millis(130)).await;
            assert_sound_matches(&ctrl, &player);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn radius_stays_in_range_and_bounds_stay_centered() {
        let (mut ctrl, _player, mut rx) = controller();
        ctrl.start_or_resume();
        tokio::time::sleep(Duration::from_secs(6)).await;
        let events = drain(&mut rx);

        let mut saw_max = false;
        for ev in &events {
            if let AppEvent::Breath { radius, bounds, .. } = ev {
                assert!((MIN_RADIUS..=MAX_RADIUS).contains(radius));
                assert_eq!(bounds.center(), (CIRCLE_CENTER, CIRCLE_CENTER));
                assert_eq!(bounds.radius(), f64::from(*radius));
                saw_max |= *radius == MAX_RADIUS;
            }
        }
        assert!(saw_max);
        let steps = radii(&events);
        assert!(steps
            .windows(2)
            .all(|w| w[0].abs_diff(w[1]) <= RADIUS_STEP));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_radius_and_resume_continues_from_it() {
        let (mut ctrl, player, mut rx) = controller();
        ctrl.start_or_resume();
        tokio::time::sleep(Duration::from_millis(500)).await;

        ctrl.pause();
        assert!(!player.is_playing());
        let before = radii(&drain(&mut rx));
        let frozen = *before.last().unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        let during = drain(&mut rx);
        assert!(radii(&during).is_empty(), "circle moved while paused");
        assert!(during.iter().all(|e| !matches!(e, AppEvent::Prompt(_))));

        ctrl.start_or_resume();
        assert!(player.is_playing());
        tokio::time::sleep(Duration::from_millis(350)).await;
        let after = radii(&drain(&mut rx));
        let next = *after.first().unwrap();
        assert!((MIN_RADIUS..=MAX_RADIUS).contains(&next));
        assert!(next.abs_diff(frozen) <= RADIUS_STEP);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_animation_and_allows_restart() {
        let (mut ctrl, player, mut rx) = controller();
        ctrl.start_or_resume();
        tokio::time::sleep(Duration::from_millis(300)).await;
        ctrl.pause();

        assert!(ctrl.stop().is_some());
        assert_eq!(ctrl.state(), SessionState::Idle);
        assert!(!player.is_playing());
        drain(&mut rx);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(radii(&drain(&mut rx)).is_empty());

        ctrl.start_or_resume();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(radii(&drain(&mut rx)).first(), Some(&MIN_RADIUS));
        assert_eq!(player.starts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_leaves_the_old_task_idle() {
        let (mut ctrl, _player, mut rx) = controller();
        ctrl.start_or_resume();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let old_cell = ctrl.cell.clone();

        ctrl.stop();
        ctrl.start_or_resume();
        assert_eq!(old_cell.load(), SessionState::Idle);
        assert_eq!(ctrl.state(), SessionState::Active);
        drain(&mut rx);

        // Only the new task animates: one sweep from rest, no interleaved frames.
        tokio::time::sleep(Duration::from_millis(350)).await;
        let steps = radii(&drain(&mut rx));
        assert_eq!(&steps[..4], &[40, 44, 48, 52]);
        assert!(steps.windows(2).all(|w| w[1] == w[0] + RADIUS_STEP));
    }

    #[tokio::test(start_paused = true)]
    async fn sound_failure_is_reported_but_session_runs() {
        let (tx, mut rx) = unbounded_channel();
        let mut ctrl = SessionController::new(BreathTiming::default(), Arc::new(BrokenPlayer), tx);
        ctrl.start_or_resume();
        assert_eq!(ctrl.state(), SessionState::Active);

        tokio::time::sleep(Duration::from_millis(150)).await;
        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Info(InfoEvent::SoundUnavailable(_)))));
        assert!(!radii(&events).is_empty());
    }
}
