use std::time::SystemTime;

use crate::word_bank::DEFAULT_WORD_COUNT;

/// Default length of a timed test in seconds
pub const DEFAULT_SECS: u32 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub number_of_words: usize,
    pub number_of_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            number_of_words: DEFAULT_WORD_COUNT,
            number_of_secs: DEFAULT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    /// created, waiting for the first keystroke
    Idle,
    Running,
    /// countdown expired, input locked
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub word_index: usize,
    pub total_chars_typed: u32,
    pub correct_chars: u32,
    pub attempted_words: u32,
    pub correct_words: u32,
    pub started_at: Option<SystemTime>,
    pub ended_at: Option<SystemTime>,
    pub seconds_remaining: u32,
}

impl SessionState {
    pub fn new(number_of_secs: u32) -> Self {
        Self {
            phase: Phase::Idle,
            word_index: 0,
            total_chars_typed: 0,
            correct_chars: 0,
            attempted_words: 0,
            correct_words: 0,
            started_at: None,
            ended_at: None,
            seconds_remaining: number_of_secs,
        }
    }

    pub fn input_enabled(&self) -> bool {
        self.phase != Phase::Ended
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_SECS)
    }
}

/// Final numbers for a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub wpm: u32,
    pub accuracy: u32,
}

/// Words per minute from characters typed over an elapsed span.
/// A zero or negative span yields 0 rather than dividing by ~0.
pub fn words_per_minute(total_chars: u32, elapsed_secs: f64) -> u32 {
    let minutes = elapsed_secs / 60.0;
    if !minutes.is_finite() || minutes <= 0.0 {
        return 0;
    }
    let wpm = ((total_chars as f64 / 5.0) / minutes).round();
    if wpm.is_finite() && wpm > 0.0 {
        wpm as u32
    } else {
        0
    }
}

/// Whole-word accuracy in percent, 100 when nothing was attempted
pub fn word_accuracy(correct_words: u32, attempted_words: u32) -> u32 {
    if attempted_words == 0 {
        return 100;
    }
    let pct = (correct_words.min(attempted_words) as f64 / attempted_words as f64) * 100.0;
    pct.round() as u32
}
