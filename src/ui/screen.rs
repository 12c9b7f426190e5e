use ratatui::Frame;

use crate::app::{App, AppState};
use crate::runtime::Clock;

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen<C: Clock> {
    fn title(&self) -> &'static str;
    fn render(&self, app: &App<C>, f: &mut Frame);
}

/// Words to type, countdown and live numbers
pub struct TypingScreen;

impl<C: Clock> Screen<C> for TypingScreen {
    fn title(&self) -> &'static str {
        "typing"
    }

    fn render(&self, app: &App<C>, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Final numbers, percentile and estimate, with the distribution chart
pub struct ResultsScreen;

impl<C: Clock> Screen<C> for ResultsScreen {
    fn title(&self) -> &'static str {
        "results"
    }

    fn render(&self, app: &App<C>, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct DistributionScreen;

impl<C: Clock> Screen<C> for DistributionScreen {
    fn title(&self) -> &'static str {
        "distribution"
    }

    fn render(&self, app: &App<C>, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen<C: Clock>(state: AppState) -> Box<dyn Screen<C>> {
    match state {
        AppState::Typing => Box::new(TypingScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::Distribution => Box::new(DistributionScreen),
    }
}
