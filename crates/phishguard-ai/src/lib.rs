//! Learning layer: TF-IDF features, multinomial naive Bayes, holdout
//! evaluation, paired artifact persistence, and the training engine.

mod artifact;
mod corpus;
mod engine;
mod error;
mod metrics;
mod naive_bayes;
mod predictor;
mod split;
mod stop_words;
mod trainer;
mod vectorizer;

#[cfg(test)]
mod test_support;

pub use artifact::{ArtifactStore, ModelPair};
pub use corpus::TrainingCorpus;
pub use engine::{RequestStats, TrainingEngine, TrainingRun};
pub use error::{ArtifactError, TrainError};
pub use metrics::{ClassReport, ClassScores, Evaluation};
pub use naive_bayes::MultinomialNb;
pub use predictor::Predictor;
pub use split::{Split, train_test_split};
pub use trainer::{TrainedModel, train};
pub use vectorizer::{SparseVec, TfidfVectorizer};
