use serde::{Serialize, Deserialize};

/// Average training error over one reporting window.
///
/// `train_loop` emits one of these every `report_every` iterations, both as
/// a `tracing` event and in the returned [`TrainSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// 1-based iteration that closed the window.
    pub iteration: usize,
    /// Mean per-sample error over the window.
    pub average_error: f64,
    /// Wall-clock duration of the window in milliseconds.
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainSummary {
    pub iterations: usize,
    pub reports: Vec<ErrorReport>,
}

impl TrainSummary {
    pub fn first_average(&self) -> Option<f64> {
        self.reports.first().map(|r| r.average_error)
    }

    pub fn last_average(&self) -> Option<f64> {
        self.reports.last().map(|r| r.average_error)
    }
}
