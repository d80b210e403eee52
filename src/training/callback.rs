//! Early stopping callback for training.
//!
//! Monitors a metric and stops training when no improvement is seen for a
//! specified number of rounds.

/// Outcome of feeding one round's metric to [`EarlyStopping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStopAction {
    /// The value is a new best.
    Improved,
    /// No improvement, but still within patience.
    Continue,
    /// Patience exhausted.
    Stop,
}

/// Early stopping configuration and state.
///
/// A patience of 0 disables early stopping; callers should check
/// [`is_enabled`](Self::is_enabled) before feeding values.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best_value: Option<f64>,
    best_round: usize,
    current_round: usize,
    higher_is_better: bool,
}

impl EarlyStopping {
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
            higher_is_better,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.patience > 0
    }

    /// Record a metric value for the current round.
    ///
    /// NaN values never count as improvements.
    pub fn update(&mut self, value: f64) -> EarlyStopAction {
        let is_improvement = match self.best_value {
            None => !value.is_nan(),
            Some(best) if self.higher_is_better => value > best,
            Some(best) => value < best,
        };

        let round = self.current_round;
        self.current_round += 1;

        if is_improvement {
            self.best_value = Some(value);
            self.best_round = round;
            return EarlyStopAction::Improved;
        }

        if self.current_round - self.best_round > self.patience {
            EarlyStopAction::Stop
        } else {
            EarlyStopAction::Continue
        }
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Round (0-based) at which the best value was observed.
    pub fn best_round(&self) -> usize {
        self.best_round
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn reset(&mut self) {
        self.best_value = None;
        self.best_round = 0;
        self.current_round = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_stop_while_improving() {
        let mut es = EarlyStopping::new(3, false);
        for v in [1.0, 0.9, 0.8, 0.7, 0.6] {
            assert_eq!(es.update(v), EarlyStopAction::Improved);
        }
        assert_eq!(es.best_round(), 4);
        assert_eq!(es.best_value(), Some(0.6));
    }

    #[test]
    fn stops_after_patience() {
        let mut es = EarlyStopping::new(3, false);
        assert_eq!(es.update(0.5), EarlyStopAction::Improved);
        assert_eq!(es.update(0.6), EarlyStopAction::Continue);
        assert_eq!(es.update(0.7), EarlyStopAction::Continue);
        assert_eq!(es.update(0.8), EarlyStopAction::Stop);
        assert_eq!(es.best_round(), 0);
    }

    #[test]
    fn improvement_resets_window() {
        let mut es = EarlyStopping::new(2, true);
        assert_eq!(es.update(0.5), EarlyStopAction::Improved);
        assert_eq!(es.update(0.4), EarlyStopAction::Continue);
        assert_eq!(es.update(0.6), EarlyStopAction::Improved);
        assert_eq!(es.update(0.6), EarlyStopAction::Continue);
        assert_eq!(es.update(0.5), EarlyStopAction::Stop);
        assert_eq!(es.best_round(), 2);
    }

    #[test]
    fn zero_patience_is_disabled() {
        assert!(!EarlyStopping::new(0, false).is_enabled());
        assert!(EarlyStopping::new(10, false).is_enabled());
    }

    #[test]
    fn reset_clears_state() {
        let mut es = EarlyStopping::new(2, false);
        es.update(1.0);
        es.update(2.0);
        es.reset();
        assert_eq!(es.best_value(), None);
        assert_eq!(es.current_round(), 0);
    }
}
