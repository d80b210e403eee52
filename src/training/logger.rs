//! Training progress logging.
//!
//! [`TrainingLogger`] routes progress through the `log` facade. Each message
//! is emitted only when the configured [`Verbosity`] allows it, so a silent
//! trainer never touches the logger even if one is installed.

use std::time::Instant;

use super::eval::MetricValue;

/// How much the trainer reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    #[default]
    Silent,
    Warning,
    Info,
    Debug,
}

#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
    n_rounds: usize,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
            n_rounds: 0,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn start_training(&mut self, n_rounds: usize, objective: &str) {
        self.started = Some(Instant::now());
        self.n_rounds = n_rounds;
        if self.verbosity >= Verbosity::Info {
            log::info!("training up to {n_rounds} rounds with objective {objective}");
        }
    }

    /// Per-round metrics at debug verbosity.
    pub fn log_metrics(&self, round: usize, metrics: &[MetricValue]) {
        if self.verbosity < Verbosity::Debug || metrics.is_empty() {
            return;
        }
        let line = metrics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("  ");
        log::debug!("[{}/{}] {line}", round + 1, self.n_rounds);
    }

    pub fn log_early_stopping(&self, round: usize, best_round: usize, metric: &str) {
        if self.verbosity >= Verbosity::Info {
            log::info!(
                "early stopping at round {}: best {metric} at round {}",
                round + 1,
                best_round + 1
            );
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= Verbosity::Warning {
            log::warn!("{message}");
        }
    }

    pub fn finish_training(&self, n_trees: usize) {
        if self.verbosity < Verbosity::Info {
            return;
        }
        match self.started {
            Some(start) => log::info!(
                "training finished with {n_trees} trees in {:.2?}",
                start.elapsed()
            ),
            None => log::info!("training finished with {n_trees} trees"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_ordering() {
        assert!(Verbosity::Debug > Verbosity::Info);
        assert!(Verbosity::Info > Verbosity::Warning);
        assert!(Verbosity::Warning > Verbosity::Silent);
        assert_eq!(Verbosity::default(), Verbosity::Silent);
    }

    #[test]
    fn silent_logger_runs_without_backend() {
        let mut logger = TrainingLogger::new(Verbosity::Silent);
        logger.start_training(10, "squared_error");
        logger.log_metrics(0, &[MetricValue::new("train-rmse", 1.0, false)]);
        logger.finish_training(10);
        assert_eq!(logger.verbosity(), Verbosity::Silent);
    }
}
