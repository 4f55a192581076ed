//! Serving-side model: loads the latest artifact pair and classifies messages.

use std::path::Path;

use phishguard_core::{Label, Prediction};
use tracing::{info, warn};

use crate::artifact::{ArtifactStore, ModelPair};

pub struct Predictor {
    model: ModelPair,
}

impl Predictor {
    /// Load the artifact pair from `model_dir`.
    ///
    /// Returns `None` ("no model available") when either file is missing,
    /// unreadable, or from a different training run than its partner.
    pub fn load(model_dir: &Path) -> Option<Self> {
        match ArtifactStore::new(model_dir).load() {
            Ok(Some(model)) => {
                info!(run_id = %model.run_id, "model loaded");
                Some(Self { model })
            }
            Ok(None) => {
                warn!(dir = %model_dir.display(), "no model artifacts found");
                None
            }
            Err(e) => {
                warn!(error = %e, "model artifacts unusable");
                None
            }
        }
    }

    pub fn run_id(&self) -> &str {
        &self.model.run_id
    }

    pub fn predict(&self, message: &str) -> Prediction {
        let row = self.model.vectorizer.transform(message);
        let proba = self.model.classifier.predict_proba(&row);
        Prediction {
            message: message.to_string(),
            label: self.model.classifier.predict(&row),
            spam_probability: proba[Label::Spam.target()],
        }
    }
}

#[cfg(test)]
mod tests {
    use phishguard_core::{TrainingConfig, Verdict};

    use super::*;
    use crate::corpus::TrainingCorpus;
    use crate::test_support::reference_rows;
    use crate::trainer::train;

    #[test]
    fn no_artifacts_means_no_predictor() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(Predictor::load(tmp.path()).is_none());
    }

    #[test]
    fn corrupt_artifacts_mean_no_predictor() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        std::fs::write(store.vectorizer_path(), b"junk").unwrap();
        std::fs::write(store.classifier_path(), b"junk").unwrap();
        assert!(Predictor::load(tmp.path()).is_none());
    }

    #[test]
    fn predicts_with_published_model() {
        let tmp = tempfile::TempDir::new().unwrap();
        let model = train(
            &TrainingCorpus::assemble(reference_rows(), vec![]),
            &TrainingConfig::default(),
        )
        .unwrap();
        ArtifactStore::new(tmp.path()).publish(&model).unwrap();

        let predictor = Predictor::load(tmp.path()).unwrap();
        assert_eq!(predictor.run_id(), model.run_id);

        let spam = predictor.predict("claim your free cash prize");
        assert_eq!(spam.label, Label::Spam);
        assert!(spam.spam_probability > 0.5);

        let ham = predictor.predict("dinner at home with mum tomorrow");
        assert_eq!(ham.label, Label::Ham);

        let correction = ham.feedback(Verdict::Incorrect);
        assert_eq!(correction.label, Label::Spam);
        assert_eq!(correction.message, "dinner at home with mum tomorrow");
    }
}
