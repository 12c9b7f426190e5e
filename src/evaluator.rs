use std::fmt;

use tracing::{debug, warn};

use crate::dataset::{DatasetError, ReferenceData, RegressionModel};
use crate::session::Completion;

/// Percent of reference speeds at or below `wpm`, rounded.
/// None when there is nothing to compare against.
pub fn compute_percentile(wpm: f64, reference_speeds: &[f64]) -> Option<u32> {
    if reference_speeds.is_empty() {
        return None;
    }
    let wpm = clamp_wpm(wpm);
    let at_or_below = reference_speeds.iter().filter(|&&v| v <= wpm).count();
    Some((100.0 * at_or_below as f64 / reference_speeds.len() as f64).round() as u32)
}

/// Inverts the speed-on-UPDRS line to estimate a score from `wpm`.
/// None for a flat line or any non-finite input.
pub fn compute_estimate(wpm: f64, slope: f64, intercept: f64) -> Option<f64> {
    let wpm = clamp_wpm(wpm);
    if slope == 0.0 || !slope.is_finite() || !intercept.is_finite() || !wpm.is_finite() {
        return None;
    }
    let estimate = (wpm - intercept) / slope;
    estimate.is_finite().then_some(estimate)
}

fn clamp_wpm(wpm: f64) -> f64 {
    if wpm < 0.0 {
        0.0
    } else {
        wpm
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultSummary {
    pub wpm: u32,
    pub accuracy: u32,
    pub percentile: Option<u32>,
    pub estimate: Option<f64>,
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "You typed {} wpm", self.wpm)?;
        match self.percentile {
            Some(p) => write!(f, ", faster than or equal to {p}% of participants")?,
            None => write!(f, ", percentile N/A")?,
        }
        match self.estimate {
            Some(e) => write!(f, "; estimated UPDRS {e:.1}"),
            None => write!(f, "; estimated UPDRS N/A"),
        }
    }
}

/// What the results panel can show right now
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// no finished session yet
    Idle,
    /// session finished, reference data still loading
    Pending(Completion),
    /// reference data could not be loaded
    Unavailable { completion: Completion, reason: String },
    Ready(ResultSummary),
}

#[derive(Debug, Clone, PartialEq)]
enum Reference {
    Loading,
    Loaded {
        speeds: Vec<f64>,
        regression: Option<RegressionModel>,
    },
    Failed(String),
}

/// Pairs the latest completed session with the reference data, in whichever
/// order the two arrive.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator {
    reference: Reference,
    completion: Option<Completion>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            reference: Reference::Loading,
            completion: None,
        }
    }

    pub fn on_dataset(&mut self, result: Result<ReferenceData, DatasetError>) {
        self.reference = match result {
            Ok(data) => {
                let regression = data.fit_regression();
                debug!(rows = data.records().len(), ?regression, "reference data ready");
                Reference::Loaded {
                    speeds: data.speeds(),
                    regression,
                }
            }
            Err(err) => {
                warn!(error = %err, "reference data unavailable");
                Reference::Failed(err.to_string())
            }
        };
    }

    /// Overrides the fitted line, e.g. with published constants
    pub fn set_regression(&mut self, model: Option<RegressionModel>) {
        if let Reference::Loaded { regression, .. } = &mut self.reference {
            *regression = model;
        }
    }

    pub fn regression(&self) -> Option<RegressionModel> {
        match &self.reference {
            Reference::Loaded { regression, .. } => *regression,
            _ => None,
        }
    }

    pub fn record(&mut self, completion: Completion) {
        self.completion = Some(completion);
    }

    /// Forget the last session; the reference data is kept
    pub fn clear(&mut self) {
        self.completion = None;
    }

    pub fn outcome(&self) -> Outcome {
        let Some(completion) = self.completion else {
            return Outcome::Idle;
        };
        match &self.reference {
            Reference::Loading => Outcome::Pending(completion),
            Reference::Failed(reason) => Outcome::Unavailable {
                completion,
                reason: reason.clone(),
            },
            Reference::Loaded { speeds, regression } => {
                let wpm = completion.wpm as f64;
                Outcome::Ready(ResultSummary {
                    wpm: completion.wpm,
                    accuracy: completion.accuracy,
                    percentile: compute_percentile(wpm, speeds),
                    estimate: regression
                        .and_then(|m| compute_estimate(wpm, m.slope, m.intercept)),
                })
            }
        }
    }
}
