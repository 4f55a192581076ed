//! Operator-facing output for training runs and predictions.

use arrow::util::pretty::pretty_format_batches;
use phishguard_ai::{Evaluation, TrainingRun};
use phishguard_core::Prediction;
use serde::Serialize;

/// JSON shape of `phishguard train --json`.
#[derive(Serialize)]
pub struct TrainReport<'a> {
    pub run_id: &'a str,
    pub corpus_size: usize,
    pub reference_rows: usize,
    pub verified_rows: usize,
    pub train_size: usize,
    pub holdout_size: usize,
    pub features: usize,
    pub elapsed_secs: f64,
    pub evaluation: &'a Evaluation,
}

impl<'a> From<&'a TrainingRun> for TrainReport<'a> {
    fn from(run: &'a TrainingRun) -> Self {
        Self {
            run_id: &run.run_id,
            corpus_size: run.corpus_size(),
            reference_rows: run.reference_rows,
            verified_rows: run.verified_rows,
            train_size: run.train_size,
            holdout_size: run.holdout_size,
            features: run.features,
            elapsed_secs: run.elapsed_secs,
            evaluation: &run.evaluation,
        }
    }
}

pub fn print_training_run(run: &TrainingRun) -> anyhow::Result<()> {
    println!(
        "Total training examples: {} ({} reference, {} verified)",
        run.corpus_size(),
        run.reference_rows,
        run.verified_rows
    );
    println!("{}", pretty_format_batches(std::slice::from_ref(&run.preview))?);
    println!();
    println!(
        "Split: {} train / {} holdout, {} features",
        run.train_size, run.holdout_size, run.features
    );
    println!("Accuracy: {:.4}", run.evaluation.accuracy);
    println!();
    print!("{}", run.evaluation);
    println!();
    println!("Model {} saved in {:.2}s", run.run_id, run.elapsed_secs);
    Ok(())
}

pub fn print_training_json(run: &TrainingRun) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&TrainReport::from(run))?);
    Ok(())
}

pub fn print_prediction(prediction: &Prediction) {
    println!(
        "{}  (spam probability {:.3})",
        prediction.label.as_str().to_uppercase(),
        prediction.spam_probability
    );
}
