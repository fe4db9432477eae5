//! Timer-Driven Session Integration Tests
//!
//! Runs on a paused Tokio clock:
//! - Reel stop ordering and timing
//! - Rejections and notices
//! - Auto-play chaining and cancellation
//! - Reset and developer overrides

use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;
use parking_lot::Mutex;
use rf_slot_core::{
    GameConfig, SessionState, SlotError, SpinPhase, Symbol, FORCED_WIN_SYMBOL, REEL_COUNT,
};
use rf_slot_session::{
    AudioError, Notice, NoticeLevel, Notifier, SessionEvent, SlotSession, SoundBoard, SoundCue,
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::sleep;

const SEED: u64 = 7;

#[derive(Default)]
struct Recorder {
    cues: Mutex<Vec<SoundCue>>,
    notices: Mutex<Vec<Notice>>,
}

impl SoundBoard for Recorder {
    fn play(&self, cue: SoundCue) -> Result<(), AudioError> {
        self.cues.lock().push(cue);
        Ok(())
    }
}

impl Notifier for Recorder {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

impl Recorder {
    fn notices_at(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }
}

struct BrokenSpeaker;

impl SoundBoard for BrokenSpeaker {
    fn play(&self, _cue: SoundCue) -> Result<(), AudioError> {
        Err(AudioError::Unavailable("no output device".into()))
    }
}

fn session_with(config: GameConfig) -> (SlotSession, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let session = SlotSession::builder(config)
        .seed(SEED)
        .sound(recorder.clone())
        .notifier(recorder.clone())
        .build()
        .unwrap();
    (session, recorder)
}

fn session() -> (SlotSession, Arc<Recorder>) {
    session_with(GameConfig::default())
}

fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return events,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPIN SEQUENCING
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_reels_stop_left_to_right_then_resolve() {
    let (session, _) = session();
    let mut rx = session.subscribe();

    let outcome = session.spin_and_wait().await.unwrap();
    let events = drain(&mut rx);

    assert!(matches!(events.first(), Some(SessionEvent::SpinStarted(_))));
    let reels: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::ReelStopped(stop) => Some(stop.reel),
            _ => None,
        })
        .collect();
    assert_eq!(reels, vec![0, 1, 2]);
    assert!(matches!(events.last(), Some(SessionEvent::SpinResolved(_))));

    let state = session.snapshot();
    assert_eq!(state.phase, SpinPhase::Idle);
    assert_eq!(state.reels_spinning, [false; REEL_COUNT]);
    assert_eq!(state.window, outcome.window);
    assert_relative_eq!(state.balance, 99.0 + outcome.total_payout);
}

#[tokio::test(start_paused = true)]
async fn test_reel_stops_follow_timing_windows() {
    let (session, _) = session();
    let ticket = session.spin().unwrap();

    for pair in ticket.reel_delays_ms.windows(2) {
        assert!(pair[1] > pair[0]);
    }

    // Before the earliest stop window opens
    sleep(Duration::from_millis(400)).await;
    assert_eq!(session.snapshot().reels_spinning, [true; REEL_COUNT]);

    // Just past the first reel's stop
    sleep(Duration::from_millis(ticket.reel_delays_ms[0] as u64 + 20 - 400)).await;
    let state = session.snapshot();
    assert!(!state.reels_spinning[0]);
    assert!(state.is_spinning());

    sleep(Duration::from_secs(3)).await;
    assert!(!session.is_spinning());
}

#[tokio::test(start_paused = true)]
async fn test_spin_rejected_while_spinning() {
    let (session, _) = session();
    session.spin().unwrap();
    let before = session.snapshot();

    let err = session.spin().unwrap_err();
    assert!(matches!(err, SlotError::SpinInProgress));
    assert_eq!(session.snapshot(), before);
    assert_eq!(before.balance, 99.0);
}

#[tokio::test(start_paused = true)]
async fn test_insufficient_balance_notice() {
    let (session, recorder) = session();
    session.set_balance(0.5);
    let before = session.snapshot();
    let mut rx = session.subscribe();

    let err = session.spin().unwrap_err();
    assert!(matches!(err, SlotError::InsufficientBalance { .. }));
    assert_eq!(session.snapshot(), before);
    assert_eq!(recorder.notices_at(NoticeLevel::Error).len(), 1);
    assert!(recorder.cues.lock().is_empty());
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [SessionEvent::SpinRejected { .. }]
    ));
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUTO-PLAY
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_auto_play_toggled_off_before_first_spin() {
    let (session, _) = session();

    assert!(session.toggle_auto_play());
    assert!(!session.toggle_auto_play());
    sleep(Duration::from_secs(10)).await;

    assert_eq!(session.snapshot().spin_count, 0);
    assert!(!session.is_auto_play());
}

#[tokio::test(start_paused = true)]
async fn test_auto_play_chains_spins_until_stopped() {
    let (session, _) = session();
    session.set_balance(1_000.0);

    session.toggle_auto_play();
    sleep(Duration::from_millis(400)).await;
    assert_eq!(session.snapshot().spin_count, 0);

    sleep(Duration::from_secs(10)).await;
    let chained = session.snapshot().spin_count;
    assert!(chained >= 3, "only {} spins", chained);

    session.stop_auto_play();
    sleep(Duration::from_secs(10)).await;
    let state = session.snapshot();
    assert_eq!(state.spin_count, chained);
    assert_eq!(state.phase, SpinPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_auto_play_stopped_between_chained_spins() {
    let (session, _) = session();
    let mut rx = session.subscribe();
    session.toggle_auto_play();

    loop {
        if let SessionEvent::SpinResolved(_) = rx.recv().await.unwrap() {
            break;
        }
    }
    assert!(session.has_pending_auto_spin());

    // Inside the gap before the next chained spin
    sleep(Duration::from_millis(300)).await;
    assert!(!session.is_spinning());
    session.stop_auto_play();
    assert!(!session.has_pending_auto_spin());

    sleep(Duration::from_secs(5)).await;
    let state = session.snapshot();
    assert_eq!(state.spin_count, 1);
    assert!(!state.auto_play);
    assert_eq!(state.phase, SpinPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_auto_play_enabled_mid_spin_continues_after_resolution() {
    let (session, _) = session();
    session.spin().unwrap();
    session.toggle_auto_play();

    sleep(Duration::from_secs(5)).await;
    assert!(session.snapshot().spin_count >= 2);
    session.stop_auto_play();
}

#[tokio::test(start_paused = true)]
async fn test_auto_play_stops_when_balance_runs_out() {
    let (session, recorder) = session();
    let mut rx = session.subscribe();

    session.toggle_auto_play();
    sleep(Duration::from_millis(600)).await;
    assert!(session.is_spinning());

    // Setters apply mid-spin; no payout can cover this
    session.set_balance(-1.0e9);
    sleep(Duration::from_secs(10)).await;

    let state = session.snapshot();
    assert!(!state.auto_play);
    assert_eq!(state.spin_count, 1);
    assert_eq!(
        recorder.notices_at(NoticeLevel::Info),
        vec!["Auto-play stopped: insufficient balance".to_string()]
    );
    assert!(drain(&mut rx)
        .iter()
        .any(|e| *e == SessionEvent::AutoPlayChanged(false)));
}

#[tokio::test(start_paused = true)]
async fn test_auto_play_first_trigger_rejected() {
    let (session, recorder) = session();

    session.toggle_auto_play();
    session.set_balance(0.0);
    sleep(Duration::from_secs(2)).await;

    assert!(!session.is_auto_play());
    assert_eq!(session.snapshot().spin_count, 0);
    assert_eq!(recorder.notices_at(NoticeLevel::Error).len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESET
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_timers() {
    let (session, _) = session();
    session.toggle_auto_play();
    sleep(Duration::from_millis(700)).await;
    assert!(session.is_spinning());

    session.reset_game();
    let mut rx = session.subscribe();
    sleep(Duration::from_secs(10)).await;

    assert!(drain(&mut rx).is_empty());
    assert_eq!(session.snapshot(), SessionState::initial(&GameConfig::default()));
}

#[tokio::test(start_paused = true)]
async fn test_reset_announces_auto_play_off() {
    let (session, _) = session();
    session.toggle_auto_play();
    let mut rx = session.subscribe();

    session.reset_game();

    assert_eq!(
        drain(&mut rx),
        vec![SessionEvent::AutoPlayChanged(false), SessionEvent::SessionReset]
    );
    assert!(!session.is_auto_play());
    assert!(!session.has_pending_auto_spin());
}

#[tokio::test(start_paused = true)]
async fn test_reset_without_auto_play_only_announces_reset() {
    let (session, _) = session();
    let mut rx = session.subscribe();

    session.reset_game();

    assert_eq!(drain(&mut rx), vec![SessionEvent::SessionReset]);
}

#[tokio::test(start_paused = true)]
async fn test_wait_fails_on_reset() {
    let (session, _) = session();
    let mut rx = session.subscribe();
    let ticket = session.spin().unwrap();
    session.reset_game();

    let err = rf_slot_session::wait_for_outcome(&mut rx, ticket.spin_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SlotError::StaleSpin { .. }));
}

// ═══════════════════════════════════════════════════════════════════════════════
// OVERRIDES & PRESENTATION
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_force_win() {
    let (session, recorder) = session();
    session.force_win();
    assert_eq!(recorder.notices_at(NoticeLevel::Info).len(), 1);

    let outcome = session.spin_and_wait().await.unwrap();
    assert_eq!(outcome.window.row(1), [FORCED_WIN_SYMBOL; REEL_COUNT]);
    assert!(outcome.is_win());
    assert!(!outcome.is_jackpot());
    assert_eq!(
        *recorder.cues.lock(),
        vec![SoundCue::SpinStart, SoundCue::Win]
    );

    // One-shot
    assert_eq!(session.snapshot().pending_override, None);
}

#[tokio::test(start_paused = true)]
async fn test_force_jackpot() {
    let (session, recorder) = session();
    session.force_jackpot();

    let outcome = session.spin_and_wait().await.unwrap();
    assert!(outcome.jackpot_award.unwrap() >= 50.0);
    assert_eq!(outcome.window.uniform_symbol(), Some(Symbol::Seven));
    assert_eq!(session.snapshot().jackpot_pool(), 50.0);
    assert_eq!(
        *recorder.cues.lock(),
        vec![SoundCue::SpinStart, SoundCue::Jackpot]
    );
    let success = recorder.notices_at(NoticeLevel::Success);
    assert_eq!(success.len(), 1);
    assert!(success[0].starts_with("JACKPOT WIN!"));
}

#[tokio::test(start_paused = true)]
async fn test_muted_session_plays_no_cues() {
    let (session, recorder) = session();
    assert!(!session.toggle_sound());
    session.force_win();
    session.spin_and_wait().await.unwrap();
    assert!(recorder.cues.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_audio_failure_is_not_fatal() {
    let session = SlotSession::builder(GameConfig::default())
        .seed(SEED)
        .sound(Arc::new(BrokenSpeaker))
        .build()
        .unwrap();
    session.force_win();
    let outcome = session.spin_and_wait().await.unwrap();
    assert!(outcome.is_win());
}

#[tokio::test(start_paused = true)]
async fn test_setters_clamp_and_broadcast() {
    let (session, _) = session();
    let mut rx = session.subscribe();

    assert_eq!(session.set_wager(50.0), 10.0);
    assert_eq!(session.decrease_bet(), 9.5);
    assert_eq!(session.set_min_bet(), 1.0);
    session.set_jackpot(-5.0);

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![
            SessionEvent::WagerChanged(10.0),
            SessionEvent::WagerChanged(9.5),
            SessionEvent::WagerChanged(1.0),
            SessionEvent::JackpotChanged(0.0),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_studio_profile_resolves_without_waiting() {
    let (session, _) = session_with(GameConfig::studio());
    session.set_balance(500.0);
    for _ in 0..20 {
        session.spin_and_wait().await.unwrap();
    }
    let stats = session.stats();
    assert_eq!(stats.total_spins, 20);
    assert_eq!(session.paytable().len(), 9);
}
