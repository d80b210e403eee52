//! Command-line front end: train, evaluate, predict and list categories.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use loanboost::ensemble::ArtifactStore;
use loanboost::{
    CategoryService, LoanLoader, LoanRecord, LoanboostConfig, MetricsEvaluator, Parallelism,
    Pipeline, RiskScoreNormalizer, run_with_threads,
};

#[derive(Parser)]
#[command(name = "loanboost", version, about = "Two-stage loan scoring ensemble")]
struct Cli {
    /// TOML configuration file; every field is optional.
    #[arg(long, short, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Overrides {
    /// Corpus CSV (overrides `data_path`).
    #[arg(long, value_name = "CSV")]
    data: Option<PathBuf>,

    /// Artifact directory (overrides `artifact_dir`).
    #[arg(long, value_name = "DIR")]
    artifacts: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Train both models, save the artifacts and print the test report.
    Train {
        #[command(flatten)]
        paths: Overrides,

        /// Held-out fraction (overrides `test_fraction`).
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Random seed (overrides `seed`).
        #[arg(long)]
        seed: Option<u64>,

        /// Boosting rounds (overrides `boosting.n_trees`).
        #[arg(long)]
        trees: Option<u32>,
    },
    /// Score a labeled CSV with saved artifacts and print the report.
    Evaluate {
        #[command(flatten)]
        paths: Overrides,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Score each row of a CSV, or the built-in sample applicant.
    Predict {
        #[command(flatten)]
        paths: Overrides,

        /// Score the built-in sample instead of a CSV.
        #[arg(long)]
        sample: bool,
    },
    /// List the distinct category values of a corpus.
    Categories {
        #[command(flatten)]
        paths: Overrides,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(cli: &Cli) -> Result<LoanboostConfig> {
    match &cli.config {
        Some(path) => LoanboostConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(LoanboostConfig::default()),
    }
}

fn apply_overrides(config: &mut LoanboostConfig, paths: &Overrides) {
    if let Some(data) = &paths.data {
        config.data_path = data.clone();
    }
    if let Some(dir) = &paths.artifacts {
        config.artifact_dir = dir.clone();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = load_config(&cli)?;

    match &cli.command {
        Command::Train {
            paths,
            test_fraction,
            seed,
            trees,
        } => {
            apply_overrides(&mut config, paths);
            if let Some(fraction) = test_fraction {
                config.test_fraction = *fraction;
            }
            if let Some(seed) = seed {
                config.seed = *seed;
            }
            if let Some(trees) = trees {
                config.boosting.n_trees = *trees;
            }
            train(&config)
        }
        Command::Evaluate { paths, json } => {
            apply_overrides(&mut config, paths);
            evaluate(&config, *json)
        }
        Command::Predict { paths, sample } => {
            apply_overrides(&mut config, paths);
            predict(&config, *sample)
        }
        Command::Categories { paths } => {
            apply_overrides(&mut config, paths);
            categories(&config)
        }
    }
}

fn train(config: &LoanboostConfig) -> Result<()> {
    let outcome = Pipeline::run(config).context("training pipeline failed")?;
    let predictor = &outcome.predictor;

    ArtifactStore::new(&config.artifact_dir)
        .save_all(
            predictor.encoder(),
            predictor.risk_model(),
            predictor.approval_model(),
        )
        .context("saving artifacts")?;

    println!(
        "Trained on {} records, tested on {}",
        outcome.n_train, outcome.n_test
    );
    for metric in outcome.risk_metrics.iter().chain(&outcome.approval_metrics) {
        println!("  {metric}");
    }
    if let Some(report) = &outcome.report {
        println!();
        print!("{report}");
    }
    Ok(())
}

fn load_records(config: &LoanboostConfig) -> Result<Vec<LoanRecord>> {
    LoanLoader::new(config.numeric_parsing)
        .load_path(&config.data_path)
        .with_context(|| format!("loading {}", config.data_path.display()))
}

fn evaluate(config: &LoanboostConfig, json: bool) -> Result<()> {
    let predictor = ArtifactStore::new(&config.artifact_dir)
        .load_predictor()
        .context("loading artifacts")?;
    let records = load_records(config)?;

    let predictions = run_with_threads(config.boosting.n_threads, |parallelism| {
        predictor.predict_batch_with(&records, parallelism)
    });
    let report = MetricsEvaluator::evaluate_predictions(&records, &predictions)
        .context("evaluating predictions")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn predict(config: &LoanboostConfig, sample: bool) -> Result<()> {
    let predictor = ArtifactStore::new(&config.artifact_dir)
        .load_predictor()
        .context("loading artifacts")?;
    let records = if sample {
        vec![LoanRecord::sample()]
    } else {
        load_records(config)?
    };

    let parallelism = Parallelism::from_threads(config.boosting.n_threads);
    let predictions = predictor.predict_batch_with(&records, parallelism);
    println!("row\trisk_score\tdisplay\tcategory\tapproved\tprobability");
    for (i, p) in predictions.iter().enumerate() {
        let assessment = RiskScoreNormalizer::assess(p.risk_score);
        println!(
            "{}\t{:.3}\t{:.1}\t{}\t{}\t{:.3}",
            i + 1,
            p.risk_score,
            assessment.display_score,
            assessment.category,
            p.approved,
            p.approval_probability
        );
    }
    Ok(())
}

fn categories(config: &LoanboostConfig) -> Result<()> {
    let options = CategoryService::new(LoanLoader::new(config.numeric_parsing))
        .discover(&config.data_path);
    if options.is_empty() {
        anyhow::bail!("no categories found in {}", config.data_path.display());
    }
    for (field, values) in [
        ("Employment status", &options.employment_statuses),
        ("Education level", &options.education_levels),
        ("Marital status", &options.marital_statuses),
        ("Home ownership status", &options.home_ownership_statuses),
        ("Loan purpose", &options.loan_purposes),
    ] {
        println!("{field}: {}", values.join(", "));
    }
    Ok(())
}
