use std::sync::mpsc::Receiver;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

use crate::config::Config;
use crate::dataset::ReferenceData;
use crate::evaluator::{Evaluator, Outcome};
use crate::events::SessionEvent;
use crate::histogram::{BinScale, Histogram, DEFAULT_BINS};
use crate::runtime::{AppEvent, Clock};
use crate::session::Phase;
use crate::store::{LastResult, ResultStore};
use crate::tracker::{KeystrokeOutcome, Tracker};
use crate::word_bank::WordSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
    Distribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App<C: Clock> {
    pub tracker: Tracker<C>,
    pub evaluator: Evaluator,
    pub state: AppState,
    pub bin_scale: BinScale,
    /// text typed so far for the current word
    pub input: String,
    /// result stored by the previous run, shown next to the new one
    pub previous: Option<LastResult>,
    reference: Option<ReferenceData>,
    store: Box<dyn ResultStore>,
    session_events: Receiver<SessionEvent>,
}

impl<C: Clock> App<C> {
    pub fn new(
        config: &Config,
        words: Box<dyn WordSource>,
        clock: C,
        store: Box<dyn ResultStore>,
    ) -> Self {
        let mut tracker = Tracker::new(config.session(), words, clock);
        let session_events = tracker.events().subscribe();
        Self {
            tracker,
            evaluator: Evaluator::new(),
            state: AppState::Typing,
            bin_scale: config.bin_scale,
            input: String::new(),
            previous: store.load(),
            reference: None,
            store,
            session_events,
        }
    }

    pub fn reference(&self) -> Option<&ReferenceData> {
        self.reference.as_ref()
    }

    pub fn histogram(&self) -> Option<Histogram> {
        self.reference
            .as_ref()
            .and_then(|data| Histogram::build(data, DEFAULT_BINS, self.bin_scale))
    }

    pub fn outcome(&self) -> Outcome {
        self.evaluator.outcome()
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Control {
        // keys can arrive faster than the runner times out into a Tick, so the
        // countdown is brought up to date before any event is applied
        self.tracker.catch_up();
        self.drain_session_events();

        let control = match event {
            AppEvent::Tick | AppEvent::Resize => Control::Continue,
            AppEvent::Dataset(result) => {
                if let Ok(data) = &result {
                    self.reference = Some(data.clone());
                }
                self.evaluator.on_dataset(result);
                Control::Continue
            }
            AppEvent::Key(key) => self.on_key(key),
        };
        self.drain_session_events();
        control
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }
        if key.code == KeyCode::Tab {
            self.tracker.reset();
            return Control::Continue;
        }

        match self.state {
            AppState::Typing => match key.code {
                KeyCode::Char(c) => self.type_char(c),
                KeyCode::Backspace => {
                    if self.tracker.on_backspace() {
                        self.input.pop();
                    }
                }
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.tracker.reset(),
                KeyCode::Char('h') => self.state = AppState::Distribution,
                _ => {}
            },
            AppState::Distribution => match key.code {
                KeyCode::Char('c') => self.bin_scale = BinScale::Count,
                KeyCode::Char('d') => self.bin_scale = BinScale::Density,
                KeyCode::Char('r') => self.tracker.reset(),
                KeyCode::Char('b') | KeyCode::Backspace => {
                    self.state = if self.tracker.phase() == Phase::Ended {
                        AppState::Results
                    } else {
                        AppState::Typing
                    };
                }
                _ => {}
            },
        }
        Control::Continue
    }

    fn type_char(&mut self, c: char) {
        if !self.tracker.state().input_enabled() {
            return;
        }
        self.input.push(c);
        match self.tracker.on_keystroke(&self.input) {
            KeystrokeOutcome::WordCommitted { .. } => self.input.clear(),
            KeystrokeOutcome::Ignored => {
                self.input.pop();
            }
            KeystrokeOutcome::Counted => {}
        }
    }

    fn drain_session_events(&mut self) {
        while let Ok(event) = self.session_events.try_recv() {
            match event {
                SessionEvent::Completed(completion) => {
                    self.evaluator.record(completion);
                    if let Err(err) = self.store.save(&LastResult::now(completion)) {
                        warn!(error = %err, "failed to persist last result");
                    }
                    self.input.clear();
                    self.state = AppState::Results;
                }
                SessionEvent::Restarted => {
                    self.evaluator.clear();
                    self.input.clear();
                    self.state = AppState::Typing;
                }
            }
        }
    }
}
