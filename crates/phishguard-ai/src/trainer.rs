//! Fit and evaluate one vectorizer/classifier pair.

use chrono::Utc;
use phishguard_core::{Label, TrainingConfig};
use tracing::info;

use crate::corpus::TrainingCorpus;
use crate::metrics::Evaluation;
use crate::naive_bayes::MultinomialNb;
use crate::split::train_test_split;
use crate::vectorizer::TfidfVectorizer;
use crate::TrainError;

/// Output of one training run. The vectorizer and classifier are only ever
/// published and loaded together, tagged with `run_id`.
pub struct TrainedModel {
    pub run_id: String,
    pub vectorizer: TfidfVectorizer,
    pub classifier: MultinomialNb,
    pub evaluation: Evaluation,
    pub train_size: usize,
    pub holdout_size: usize,
}

/// Split, fit on the training side only, and evaluate on the holdout.
pub fn train(corpus: &TrainingCorpus, cfg: &TrainingConfig) -> Result<TrainedModel, TrainError> {
    if corpus.is_empty() {
        return Err(TrainError::EmptyCorpus);
    }

    let split = train_test_split(corpus.len(), cfg.test_fraction, cfg.seed)?;
    let rows = corpus.rows();

    let train_text: Vec<&str> = split.train.iter().map(|&i| rows[i].text.as_str()).collect();
    let train_labels: Vec<Label> = split.train.iter().map(|&i| rows[i].label).collect();
    let holdout_text: Vec<&str> = split.holdout.iter().map(|&i| rows[i].text.as_str()).collect();
    let holdout_labels: Vec<Label> = split.holdout.iter().map(|&i| rows[i].label).collect();

    // The holdout never influences the vocabulary or idf weights.
    let vectorizer = TfidfVectorizer::fit(&train_text, cfg.min_df, cfg.stop_words);
    if vectorizer.n_features() == 0 {
        return Err(TrainError::EmptyVocabulary);
    }

    let train_x = vectorizer.transform_all(&train_text);
    let holdout_x = vectorizer.transform_all(&holdout_text);

    let classifier = MultinomialNb::fit(&train_x, &train_labels, vectorizer.n_features(), cfg.alpha);
    let predicted = classifier.predict_all(&holdout_x);
    let evaluation = Evaluation::compute(&holdout_labels, &predicted);

    let run_id = Utc::now().format("%Y%m%dT%H%M%S%.6fZ").to_string();
    info!(
        run_id = %run_id,
        train = split.train.len(),
        holdout = split.holdout.len(),
        features = vectorizer.n_features(),
        accuracy = evaluation.accuracy,
        "model trained"
    );

    Ok(TrainedModel {
        run_id,
        vectorizer,
        classifier,
        evaluation,
        train_size: split.train.len(),
        holdout_size: split.holdout.len(),
    })
}
