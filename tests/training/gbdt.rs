//! GBDT training integration tests.
//!
//! Focused on behavior and invariants (not default params or superficial shapes).

use loanboost::GBDTModel;
use loanboost::model::GBDTConfig;
use loanboost::training::{EvalSet, GBDTParams, GBDTTrainer, Metric, Objective, TrainError};
use ndarray::Array2;

fn linear_problem(n_samples: usize) -> (Array2<f32>, Vec<f32>) {
    let features = Array2::from_shape_fn((n_samples, 2), |(i, j)| {
        if j == 0 { i as f32 / 10.0 } else { ((i * 7) % 13) as f32 }
    });
    let targets = features.rows().into_iter().map(|r| r[0] + 0.5).collect();
    (features, targets)
}

#[test]
fn train_rejects_invalid_targets_len() {
    let (features, _) = linear_problem(4);
    let trainer = GBDTTrainer::new(Objective::squared(), Metric::none(), GBDTParams::default());
    let result = trainer.train(features.view(), &[1.0, 2.0], &[]);

    assert!(matches!(
        result,
        Err(TrainError::TargetLengthMismatch { expected: 4, found: 2 })
    ));
}

#[test]
fn trained_model_improves_over_base_score() {
    let (features, targets) = linear_problem(100);
    let config = GBDTConfig::builder()
        .n_trees(50)
        .min_samples_leaf(2)
        .feature_fraction(1.0)
        .bagging_fraction(1.0)
        .build()
        .unwrap();
    let model = GBDTModel::train(features.view(), &targets, &[], config).unwrap();
    model.forest().validate(2).expect("trained forest should be valid");

    let base = model.forest().base_score();
    let predictions = model.predict(features.view());
    let base_error: f32 = targets.iter().map(|t| (base - t).powi(2)).sum();
    let model_error: f32 = predictions
        .iter()
        .zip(&targets)
        .map(|(p, t)| (p - t).powi(2))
        .sum();

    assert!(model_error < base_error * 0.1, "{model_error} vs {base_error}");
}

#[test]
fn same_seed_same_forest() {
    let (features, targets) = linear_problem(200);
    let train = || {
        GBDTModel::train(features.view(), &targets, &[], GBDTConfig::default())
            .unwrap()
            .forest()
            .clone()
    };
    assert_eq!(train(), train());
}

#[test]
fn early_stopping_truncates_to_best_round() {
    let (features, targets) = linear_problem(200);
    // Validation targets unrelated to the features stop improving quickly.
    let noise: Vec<f32> = (0..200).map(|i| ((i * 31) % 17) as f32).collect();
    let eval = [EvalSet::new("valid", features.view(), &noise)];

    let config = GBDTConfig::builder()
        .n_trees(200)
        .metric(Metric::rmse())
        .early_stopping_rounds(5)
        .build()
        .unwrap();
    let model = GBDTModel::train(features.view(), &targets, &eval, config).unwrap();

    assert!(model.forest().n_trees() < 200);
    assert_eq!(model.meta().best_iteration, Some(model.forest().n_trees()));
}
