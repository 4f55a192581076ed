//! Shared configuration: file locations and training parameters.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Public SMS spam collection used as the fixed reference corpus.
pub const DEFAULT_REFERENCE_URL: &str =
    "https://raw.githubusercontent.com/justmarkham/pycon-2016-tutorial/master/data/sms.tsv";

pub const FEEDBACK_FILE: &str = "feedback.csv";
pub const VERIFIED_FILE: &str = "verified_data.csv";
pub const VECTORIZER_FILE: &str = "vectorizer.arrow";
pub const CLASSIFIER_FILE: &str = "classifier.arrow";

/// Where the reference dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceLocation {
    Url(String),
    File(PathBuf),
}

impl FromStr for ReferenceLocation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Self::Url(s.to_string()))
        } else {
            Ok(Self::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for ReferenceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Default for ReferenceLocation {
    fn default() -> Self {
        Self::Url(DEFAULT_REFERENCE_URL.to_string())
    }
}

/// Parameters for one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Fraction of the corpus held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the train/holdout shuffle.
    pub seed: u64,
    /// Additive (Laplace) smoothing for the classifier.
    pub alpha: f64,
    /// Minimum document frequency for a term to enter the vocabulary.
    pub min_df: usize,
    pub stop_words: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            alpha: 1.0,
            min_df: 1,
            stop_words: true,
        }
    }
}

/// Resolved locations and parameters for every component.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub model_dir: PathBuf,
    pub reference: ReferenceLocation,
    pub training: TrainingConfig,
}

impl Settings {
    /// Settings rooted at `data_dir`, with models stored alongside the data.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            model_dir: data_dir.clone(),
            data_dir,
            reference: ReferenceLocation::default(),
            training: TrainingConfig::default(),
        }
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    pub fn with_reference(mut self, reference: ReferenceLocation) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    pub fn feedback_path(&self) -> PathBuf {
        self.data_dir.join(FEEDBACK_FILE)
    }

    pub fn verified_path(&self) -> PathBuf {
        self.data_dir.join(VERIFIED_FILE)
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}
