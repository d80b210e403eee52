//! End-to-end tests: corpus on disk to persisted predictor and report.

use std::fs::File;
use std::path::Path;

use loanboost::config::BoostingSettings;
use loanboost::ensemble::ArtifactStore;
use loanboost::testing::{synthetic_loans, write_csv};
use loanboost::{
    CategoryService, LoanLoader, LoanPatch, LoanRecord, LoanboostConfig, MetricsEvaluator,
    Parallelism, Pipeline, RiskScoreNormalizer, SampleSession,
};

fn write_corpus(path: &Path, n: usize, seed: u64) -> Vec<LoanRecord> {
    let records = synthetic_loans(n, seed);
    write_csv(File::create(path).unwrap(), &records).unwrap();
    records
}

fn config(dir: &Path) -> LoanboostConfig {
    LoanboostConfig {
        data_path: dir.join("loans.csv"),
        artifact_dir: dir.join("models"),
        boosting: BoostingSettings {
            n_trees: 30,
            ..BoostingSettings::default()
        },
        ..LoanboostConfig::default()
    }
}

#[test]
fn train_persist_reload_predict() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_corpus(&config.data_path, 400, 100);

    let outcome = Pipeline::run(&config).unwrap();
    let report = outcome.report.as_ref().unwrap();
    assert_eq!(report.n_samples, 120);
    assert!(report.risk_score.r_squared > 0.3, "r2 {}", report.risk_score.r_squared);

    let trained = &outcome.predictor;
    let store = ArtifactStore::new(&config.artifact_dir);
    store
        .save_all(trained.encoder(), trained.risk_model(), trained.approval_model())
        .unwrap();
    let loaded = store.load_predictor().unwrap();

    let fresh = synthetic_loans(50, 101);
    let expected: Vec<_> = fresh.iter().map(|r| trained.predict(r)).collect();
    assert_eq!(loaded.predict_batch(&fresh), expected);
    assert_eq!(
        loaded.predict_batch_with(&fresh, Parallelism::Parallel),
        expected
    );
}

#[test]
fn evaluation_of_reloaded_corpus_matches_predictor() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_corpus(&config.data_path, 300, 200);
    let outcome = Pipeline::run(&config).unwrap();

    let records = LoanLoader::default().load_path(&config.data_path).unwrap();
    let predictions = outcome.predictor.predict_batch(&records);
    let report = MetricsEvaluator::evaluate_predictions(&records, &predictions).unwrap();
    assert_eq!(report, outcome.predictor.evaluate(&records).unwrap());

    let cm = report.approval.confusion;
    assert_eq!(cm.tp + cm.tn + cm.fp + cm.fn_, records.len());
    assert!(report.approval.auc.unwrap() > 0.7);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["risk_score"]["rmse"].as_f64().unwrap() >= 0.0);
    assert!(report.to_string().contains("Business metrics"));
}

#[test]
fn categories_from_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loans.csv");
    let records = write_corpus(&path, 200, 300);

    let options = CategoryService::new(LoanLoader::default()).discover(&path);
    let mut statuses: Vec<String> = records.iter().map(|r| r.employment_status.clone()).collect();
    statuses.sort();
    statuses.dedup();
    assert_eq!(options.employment_statuses, statuses);
    assert!(options.loan_purposes.windows(2).all(|w| w[0] < w[1]));

    let missing = CategoryService::new(LoanLoader::default()).discover(&dir.path().join("none.csv"));
    assert!(missing.is_empty());
}

#[test]
fn interactive_sample_flow() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_corpus(&config.data_path, 300, 400);
    let predictor = Pipeline::run(&config).unwrap().predictor;

    let mut session = SampleSession::new(LoanRecord::sample());
    session.update(LoanPatch {
        credit_score: Some(780.0),
        ..LoanPatch::default()
    });
    let prediction = predictor.predict(session.record());
    session.record_prediction(&prediction);

    let assessment = RiskScoreNormalizer::assess(prediction.risk_score);
    assert!((0.0..=100.0).contains(&assessment.display_score));
    assert!(session.is_predicted());
    assert!(!session.describe().contains("(Not Initialized)"));
}
