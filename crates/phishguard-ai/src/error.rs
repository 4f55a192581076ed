use std::path::PathBuf;

use phishguard_fetch::FetchError;
use phishguard_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainError {
    /// The reference dataset could not be obtained. Nothing is published.
    #[error("reference dataset unavailable: {0}")]
    Foundation(#[from] FetchError),

    /// The verified corpus exists but could not be read. Nothing is published.
    #[error("verified corpus unreadable: {0}")]
    Verified(#[from] StoreError),

    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("not enough rows to train: {total} total, {holdout} held out")]
    InsufficientData { total: usize, holdout: usize },

    #[error("test fraction must be strictly between 0 and 1, got {0}")]
    InvalidSplit(f64),

    #[error("vocabulary is empty after tokenisation and stop-word removal")]
    EmptyVocabulary,

    #[error("could not publish artifacts: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("preview error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("arrow error in {path}: {source}")]
    Arrow {
        path: PathBuf,
        source: arrow::error::ArrowError,
    },

    #[error("malformed artifact {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error(
        "artifact pair mismatch: vectorizer from run {vectorizer_run} ({vectorizer_width} features), \
         classifier from run {classifier_run} ({classifier_width} features)"
    )]
    Mismatch {
        vectorizer_run: String,
        vectorizer_width: usize,
        classifier_run: String,
        classifier_width: usize,
    },
}
