use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use typeprobe::app::{App, AppState, Control};
use typeprobe::config::Config;
use typeprobe::dataset::ReferenceData;
use typeprobe::evaluator::Outcome;
use typeprobe::runtime::{AppEvent, FixedTicker, ManualClock, Runner, TestEventSource};
use typeprobe::session::Phase;
use typeprobe::store::{LastResult, ResultStore};
use typeprobe::word_bank::{FixedWords, WordSequence};

// Speed falls one wpm per UPDRS point from 50 wpm at a score of zero.
const REFERENCE_CSV: &str = "\
pID,gt,updrs108,typingSpeed
1,True,40,10
2,true,30,20
3,false,20,30
4,False,10,40
";

struct NoStore;

impl ResultStore for NoStore {
    fn load(&self) -> Option<LastResult> {
        None
    }

    fn save(&self, _: &LastResult) -> std::io::Result<()> {
        Ok(())
    }
}

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn headless_app(secs: u32, clock: &ManualClock) -> App<ManualClock> {
    let config = Config {
        number_of_secs: secs,
        ..Config::default()
    };
    App::new(
        &config,
        Box::new(FixedWords(WordSequence::new(["the", "and", "is"]))),
        clock.clone(),
        Box::new(NoStore),
    )
}

// Drives the app through Runner/TestEventSource without a TTY
#[test]
fn headless_session_times_out_and_evaluates() {
    let clock = ManualClock::default();
    let mut app = headless_app(5, &clock);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    for c in "the and is ".chars() {
        tx.send(key(c)).unwrap();
    }
    tx.send(AppEvent::Dataset(ReferenceData::from_reader(
        REFERENCE_CSV.as_bytes(),
    )))
    .unwrap();

    for _ in 0..12 {
        assert_eq!(app.handle_event(runner.step()), Control::Continue);
    }
    assert_eq!(app.tracker.phase(), Phase::Running);
    assert_eq!(app.tracker.state().word_index, 3);

    clock.advance(Duration::from_secs(5));
    app.handle_event(runner.step());

    assert_eq!(app.state, AppState::Results);
    // 11 chars over 5 seconds: (11 / 5) / (5 / 60) = 26.4
    let summary = assert_matches!(app.outcome(), Outcome::Ready(s) => s);
    assert_eq!(summary.wpm, 26);
    assert_eq!(summary.accuracy, 100);
    assert_eq!(summary.percentile, Some(50));
    let estimate = summary.estimate.unwrap();
    assert!((estimate - 24.0).abs() < 1e-9, "estimate was {estimate}");
}

#[test]
fn headless_mistyped_word_lowers_accuracy() {
    let clock = ManualClock::default();
    let mut app = headless_app(2, &clock);

    for c in "the adn is ".chars() {
        app.handle_event(key(c));
    }
    clock.advance(Duration::from_secs(2));
    app.handle_event(AppEvent::Tick);

    let completion = app.tracker.completion().unwrap();
    assert_eq!(completion.accuracy, 67);
    assert_matches!(app.outcome(), Outcome::Pending(c) if c == completion);
}

#[test]
fn headless_ticks_do_not_end_an_idle_session() {
    let clock = ManualClock::default();
    let mut app = headless_app(1, &clock);

    clock.advance(Duration::from_secs(30));
    for _ in 0..3 {
        app.handle_event(AppEvent::Tick);
    }

    assert_eq!(app.tracker.phase(), Phase::Idle);
    assert_eq!(app.state, AppState::Typing);
    assert_eq!(app.outcome(), Outcome::Idle);
}

#[test]
fn headless_restart_mid_session_rearms_countdown() {
    let clock = ManualClock::default();
    let mut app = headless_app(3, &clock);

    app.handle_event(key('t'));
    let first = app.tracker.timer();
    clock.advance(Duration::from_secs(2));
    app.handle_event(AppEvent::Tick);
    assert_eq!(app.tracker.state().seconds_remaining, 1);

    app.handle_event(AppEvent::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)));
    assert_eq!(app.tracker.phase(), Phase::Idle);
    assert_eq!(app.tracker.timer(), None);

    app.handle_event(key('t'));
    assert_ne!(app.tracker.timer(), first);
    assert_eq!(app.tracker.state().seconds_remaining, 3);

    // one second in the new session must not finish it
    clock.advance(Duration::from_secs(1));
    app.handle_event(AppEvent::Tick);
    assert_eq!(app.tracker.phase(), Phase::Running);
    assert_eq!(app.tracker.state().seconds_remaining, 2);
}

// Input arriving faster than the tick interval never lets the runner time out
#[test]
fn headless_continuous_input_still_expires_on_time() {
    let clock = ManualClock::default();
    let mut app = headless_app(1, &clock);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(100)),
    );

    let mut steps = Vec::new();
    for c in "the and is ".chars() {
        tx.send(key(c)).unwrap();
        let event = runner.step();
        assert_matches!(event, AppEvent::Key(_));
        steps.push(app.handle_event(event));
        clock.advance(Duration::from_millis(100));
    }

    assert!(steps.iter().all(|c| *c == Control::Continue));
    assert_eq!(app.tracker.phase(), Phase::Ended);
    assert_eq!(app.state, AppState::Results);
    // the trailing space arrives exactly at the deadline and is dropped
    assert_eq!(app.tracker.state().total_chars_typed, 10);
    assert_eq!(app.tracker.state().attempted_words, 2);
    let completion = app.tracker.completion().unwrap();
    assert_eq!(completion.accuracy, 100);
    // (10 / 5) / (1 / 60) = 120
    assert_eq!(completion.wpm, 120);
}
