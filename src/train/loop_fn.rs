use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::error::{Result, TrainError};
use crate::train::error_report::{ErrorReport, TrainSummary};
use crate::train::train_config::TrainConfig;
use crate::train::trainer::TrainStep;

/// Trains `model` for `config.iterations` samples drawn from `sampler`.
///
/// Every `config.report_every` iterations the mean error of the samples seen
/// since the previous report is logged at `info` and recorded in the
/// returned summary. A trailing partial window is not reported.
///
/// # Errors
/// - the config fails validation,
/// - the model rejects a sample,
/// - a sample's error is NaN or infinite (`TrainError::NonFiniteError`).
pub fn train_loop<M, R, F>(
    model: &mut M,
    rng: &mut R,
    mut sampler: F,
    config: &TrainConfig,
) -> Result<TrainSummary>
where
    M: TrainStep,
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> M::Sample,
{
    config.validate()?;
    debug!(
        iterations = config.iterations,
        report_every = config.report_every,
        learning_rate = config.learning_rate,
        batch_size = config.batch_size,
        "starting training loop"
    );

    let mut summary = TrainSummary { iterations: 0, reports: Vec::new() };
    let mut window_error = 0.0;
    let mut window_len = 0usize;
    let mut window_start = Instant::now();

    for iteration in 1..=config.iterations {
        let sample = sampler(rng);
        let error = model.train_step(&sample, config)?;
        if !error.is_finite() {
            return Err(TrainError::NonFiniteError { iteration, value: error }.into());
        }

        window_error += error;
        window_len += 1;
        summary.iterations = iteration;

        if iteration % config.report_every == 0 {
            let report = ErrorReport {
                iteration,
                average_error: window_error / window_len as f64,
                elapsed_ms: window_start.elapsed().as_millis() as u64,
            };
            info!(
                iteration = report.iteration,
                average_error = report.average_error,
                elapsed_ms = report.elapsed_ms,
                "average error"
            );
            summary.reports.push(report);

            window_error = 0.0;
            window_len = 0;
            window_start = Instant::now();
        }
    }

    model.finish(config)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rand::{rngs::StdRng, SeedableRng};

    /// Returns the sample as its error and counts finish calls.
    struct Echo {
        finished: usize,
    }

    impl TrainStep for Echo {
        type Sample = f64;

        fn train_step(&mut self, sample: &f64, _config: &TrainConfig) -> Result<f64> {
            Ok(*sample)
        }

        fn finish(&mut self, _config: &TrainConfig) -> Result<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn reports_window_means() {
        let mut model = Echo { finished: 0 };
        let mut rng = StdRng::seed_from_u64(0);
        let mut next = 0.0;
        let config = TrainConfig::new(7, 3, 0.1);

        let summary = train_loop(&mut model, &mut rng, |_| { next += 1.0; next }, &config).unwrap();

        let averages: Vec<f64> = summary.reports.iter().map(|r| r.average_error).collect();
        assert_eq!(averages, vec![2.0, 5.0]);
        assert_eq!(summary.reports[1].iteration, 6);
        assert_eq!(summary.iterations, 7);
        assert_eq!(model.finished, 1);
    }

    #[test]
    fn non_finite_error_stops_training() {
        let mut model = Echo { finished: 0 };
        let mut rng = StdRng::seed_from_u64(0);
        let mut calls = 0;
        let config = TrainConfig::new(10, 5, 0.1);

        let err = train_loop(&mut model, &mut rng, |_| {
            calls += 1;
            if calls == 4 { f64::NAN } else { 1.0 }
        }, &config).unwrap_err();

        match err {
            Error::Train(TrainError::NonFiniteError { iteration, .. }) => assert_eq!(iteration, 4),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(model.finished, 0);
    }

    #[test]
    fn invalid_config_is_rejected_before_training() {
        let mut model = Echo { finished: 0 };
        let mut rng = StdRng::seed_from_u64(0);
        let config = TrainConfig::new(0, 5, 0.1);
        assert!(matches!(
            train_loop(&mut model, &mut rng, |_| 1.0, &config),
            Err(Error::Config(_))
        ));
    }
}
