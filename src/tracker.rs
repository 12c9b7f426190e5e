use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::events::{EventBus, SessionEvent};
use crate::runtime::Clock;
use crate::session::{
    word_accuracy, words_per_minute, Completion, Phase, SessionConfig, SessionState,
};
use crate::word_bank::{WordSequence, WordSource};

const TICK: Duration = Duration::from_secs(1);

/// Identifies one armed countdown. A new id is issued every time the
/// countdown is armed, so ticks addressed to a cancelled one are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy)]
struct Countdown {
    id: TimerId,
    next_fire: SystemTime,
}

/// What a keystroke did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeystrokeOutcome {
    /// session ended or no word left to type
    Ignored,
    Counted,
    /// a trailing space closed the current word; the input buffer should be cleared
    WordCommitted { correct: bool },
}

/// Owns one timed typing test from first keystroke to expiry
pub struct Tracker<C: Clock> {
    config: SessionConfig,
    source: Box<dyn WordSource>,
    words: WordSequence,
    state: SessionState,
    countdown: Option<Countdown>,
    timers_armed: u64,
    completion: Option<Completion>,
    bus: EventBus,
    clock: C,
}

impl<C: Clock> Tracker<C> {
    pub fn new(config: SessionConfig, mut source: Box<dyn WordSource>, clock: C) -> Self {
        let words = source.generate(config.number_of_words);
        Self {
            state: SessionState::new(config.number_of_secs),
            config,
            source,
            words,
            countdown: None,
            timers_armed: 0,
            completion: None,
            bus: EventBus::new(),
            clock,
        }
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn words(&self) -> &WordSequence {
        &self.words
    }

    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.state.word_index)
    }

    pub fn completion(&self) -> Option<Completion> {
        self.completion
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.countdown.map(|c| c.id)
    }

    /// Start over with fresh words. Cancels any armed countdown first.
    pub fn reset(&mut self) {
        self.countdown = None;
        self.words = self.source.generate(self.config.number_of_words);
        self.state = SessionState::new(self.config.number_of_secs);
        self.completion = None;
        debug!(words = self.words.len(), "session reset");
        self.bus.publish(SessionEvent::Restarted);
    }

    /// Feed the whole contents of the input buffer after a change
    pub fn on_keystroke(&mut self, buffer: &str) -> KeystrokeOutcome {
        self.catch_up();
        if self.state.phase == Phase::Ended {
            return KeystrokeOutcome::Ignored;
        }

        if self.state.phase == Phase::Idle {
            self.start();
        }

        let Some(target) = self.words.get(self.state.word_index) else {
            return KeystrokeOutcome::Ignored;
        };

        if !buffer.is_empty() {
            self.state.total_chars_typed += 1;
        }

        // best effort: compare the newest char against the same offset in the target
        if let Some(last) = buffer.chars().last() {
            let offset = buffer.chars().count() - 1;
            if target.chars().nth(offset) == Some(last) {
                self.state.correct_chars += 1;
            }
        }

        let typed = buffer.trim();
        if buffer.ends_with(' ') && !typed.is_empty() {
            let correct = typed == target;
            self.state.attempted_words += 1;
            if correct {
                self.state.correct_words += 1;
            }
            self.state.word_index += 1;
            return KeystrokeOutcome::WordCommitted { correct };
        }

        KeystrokeOutcome::Counted
    }

    /// Returns false when backspace is not accepted in the current phase
    pub fn on_backspace(&mut self) -> bool {
        self.catch_up();
        if self.state.phase != Phase::Running {
            return false;
        }
        self.state.total_chars_typed = self.state.total_chars_typed.saturating_sub(1);
        self.state.correct_chars = self.state.correct_chars.saturating_sub(1);
        true
    }

    /// The armed countdown if its next one-second tick is due
    pub fn due_tick(&self) -> Option<TimerId> {
        self.countdown
            .filter(|c| self.clock.now() >= c.next_fire)
            .map(|c| c.id)
    }

    /// One countdown tick. Returns the completion when this tick expired the test.
    pub fn on_tick(&mut self, timer: TimerId) -> Option<Completion> {
        let countdown = self.countdown.as_mut()?;
        if countdown.id != timer || self.state.phase != Phase::Running {
            return None;
        }
        let fired_at = countdown.next_fire;
        countdown.next_fire += TICK;

        self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
        if self.state.seconds_remaining == 0 {
            return Some(self.end(fired_at));
        }
        None
    }

    /// Run every tick that is due by now. Returns the completion if one of
    /// them expired the test.
    pub fn catch_up(&mut self) -> Option<Completion> {
        let mut done = None;
        while let Some(timer) = self.due_tick() {
            done = done.or(self.on_tick(timer));
        }
        done
    }

    /// WPM against the current time while running, final WPM once ended
    pub fn live_wpm(&self) -> u32 {
        let Some(started) = self.state.started_at else {
            return 0;
        };
        let until = self.state.ended_at.unwrap_or_else(|| self.clock.now());
        words_per_minute(self.state.total_chars_typed, elapsed_secs(started, until))
    }

    pub fn live_accuracy(&self) -> u32 {
        word_accuracy(self.state.correct_words, self.state.attempted_words)
    }

    fn start(&mut self) {
        let now = self.clock.now();
        self.state.started_at = Some(now);
        self.state.phase = Phase::Running;
        self.timers_armed += 1;
        self.countdown = Some(Countdown {
            id: TimerId(self.timers_armed),
            next_fire: now + TICK,
        });
        info!(secs = self.config.number_of_secs, "session started");
    }

    /// `at` is the scheduled expiry, which may lie before now when ticks
    /// were processed late
    fn end(&mut self, at: SystemTime) -> Completion {
        self.countdown = None;
        self.state.phase = Phase::Ended;
        self.state.seconds_remaining = 0;
        self.state.ended_at = Some(at);

        let completion = Completion {
            wpm: self.live_wpm(),
            accuracy: self.live_accuracy(),
        };
        self.completion = Some(completion);

        info!(
            wpm = completion.wpm,
            accuracy = completion.accuracy,
            chars = self.state.total_chars_typed,
            "session ended"
        );
        self.bus.publish(SessionEvent::Completed(completion));
        completion
    }
}

fn elapsed_secs(from: SystemTime, to: SystemTime) -> f64 {
    to.duration_since(from)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
