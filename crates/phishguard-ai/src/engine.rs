//! Training engine: one blocking batch job that rebuilds the corpus, trains,
//! evaluates, and publishes a fresh artifact pair.
//!
//! Runs either standalone (scheduled or manual) or on [`RetrainRequest`]s
//! received from the curation gate.

use std::time::Instant;

use arrow::record_batch::RecordBatch;
use phishguard_core::{RetrainRequest, Settings};
use phishguard_fetch::ReferenceClient;
use phishguard_store::VerifiedCorpus;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

use crate::artifact::ArtifactStore;
use crate::corpus::TrainingCorpus;
use crate::metrics::Evaluation;
use crate::trainer::train;
use crate::TrainError;

const PREVIEW_ROWS: usize = 5;

/// Summary of a completed, published training run.
pub struct TrainingRun {
    pub run_id: String,
    pub reference_rows: usize,
    pub verified_rows: usize,
    pub train_size: usize,
    pub holdout_size: usize,
    pub features: usize,
    pub evaluation: Evaluation,
    /// First rows of the assembled corpus.
    pub preview: RecordBatch,
    pub elapsed_secs: f64,
}

impl TrainingRun {
    pub fn corpus_size(&self) -> usize {
        self.reference_rows + self.verified_rows
    }
}

/// Counts of runs served by [`TrainingEngine::run_requests`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStats {
    pub completed: usize,
    pub failed: usize,
}

pub struct TrainingEngine {
    settings: Settings,
    reference: ReferenceClient,
    verified: VerifiedCorpus,
    artifacts: ArtifactStore,
}

impl TrainingEngine {
    pub fn new(settings: Settings) -> Self {
        let reference = ReferenceClient::new(settings.reference.clone());
        let verified = VerifiedCorpus::new(settings.verified_path());
        let artifacts = ArtifactStore::new(settings.model_dir());
        Self {
            settings,
            reference,
            verified,
            artifacts,
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Run one full training cycle.
    ///
    /// A reference dataset failure aborts before anything is written, and so
    /// does a verified corpus file that exists but cannot be read. A missing
    /// corpus file narrows training to the reference data; malformed rows
    /// inside it are skipped by the store.
    pub async fn run(&self) -> Result<TrainingRun, TrainError> {
        let start = Instant::now();
        info!("starting training run");

        // 1. Fixed reference corpus.
        let reference = self.reference.fetch().await?;

        // 2. Verified feedback.
        if !self.verified.exists() {
            info!(
                path = %self.verified.path().display(),
                "no verified corpus yet, training on reference data only"
            );
        }
        let verified = self.verified.load_all()?;
        if !verified.is_empty() {
            info!(count = verified.len(), "merging verified feedback");
        }

        // 3. Combine.
        let corpus = TrainingCorpus::assemble(reference.rows, verified);
        let (ham, spam) = corpus.label_counts();
        info!(total = corpus.len(), ham, spam, "assembled training corpus");
        let preview = corpus.preview(PREVIEW_ROWS)?;

        // 4. Fit and evaluate.
        let model = train(&corpus, &self.settings.training)?;

        // 5. Publish.
        self.artifacts.publish(&model)?;

        Ok(TrainingRun {
            run_id: model.run_id,
            reference_rows: corpus.reference_rows(),
            verified_rows: corpus.verified_rows(),
            train_size: model.train_size,
            holdout_size: model.holdout_size,
            features: model.vectorizer.n_features(),
            evaluation: model.evaluation,
            preview,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }

    /// Serve retrain requests until every sender is dropped. Each request
    /// triggers one run whose result is handed to `on_run` as soon as it
    /// finishes; failures are also logged.
    pub async fn run_requests(
        &self,
        mut requests: UnboundedReceiver<RetrainRequest>,
        mut on_run: impl FnMut(Result<TrainingRun, TrainError>),
    ) -> RequestStats {
        let mut stats = RequestStats::default();
        while let Some(request) = requests.recv().await {
            info!(
                reason = ?request.reason,
                requested_at = %request.requested_at,
                "retrain requested"
            );
            let result = self.run().await;
            match &result {
                Ok(_) => stats.completed += 1,
                Err(e) => {
                    stats.failed += 1;
                    error!(error = %e, "training run failed");
                }
            }
            on_run(result);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use phishguard_core::{FeedbackRecord, Label, ReferenceLocation};
    use tokio::sync::mpsc;

    use super::*;
    use crate::predictor::Predictor;
    use crate::test_support::reference_tsv;

    fn settings(tmp: &tempfile::TempDir) -> Settings {
        let reference = tmp.path().join("sms.tsv");
        fs::write(&reference, reference_tsv()).unwrap();
        Settings::new(tmp.path().join("data"))
            .with_model_dir(tmp.path().join("models"))
            .with_reference(ReferenceLocation::File(reference))
    }

    #[tokio::test]
    async fn trains_on_reference_only_when_no_verified_corpus() {
        let tmp = tempfile::TempDir::new().unwrap();
        let engine = TrainingEngine::new(settings(&tmp));

        let run = engine.run().await.unwrap();
        assert_eq!(run.verified_rows, 0);
        assert_eq!(run.reference_rows, 40);
        assert_eq!(run.preview.num_rows(), 5);
        assert!(engine.artifacts().vectorizer_path().exists());
        assert!(engine.artifacts().classifier_path().exists());
    }

    #[tokio::test]
    async fn verified_records_join_the_corpus() {
        let tmp = tempfile::TempDir::new().unwrap();
        let settings = settings(&tmp);
        VerifiedCorpus::new(settings.verified_path())
            .append(&[FeedbackRecord::new(Label::Spam, "WIN FREE CASH NOW").approve()])
            .unwrap();

        let engine = TrainingEngine::new(settings.clone());
        let first = engine.run().await.unwrap();
        assert_eq!(first.verified_rows, 1);
        assert_eq!(first.corpus_size(), 41);

        // Retraining on identical inputs reproduces the evaluation and
        // overwrites the pair.
        let second = engine.run().await.unwrap();
        assert_eq!(first.evaluation, second.evaluation);
        let predictor = Predictor::load(settings.model_dir()).unwrap();
        assert_eq!(predictor.run_id(), second.run_id);
    }

    #[tokio::test]
    async fn reference_failure_leaves_artifacts_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let settings = settings(&tmp);
        let engine = TrainingEngine::new(settings.clone());
        let run = engine.run().await.unwrap();

        let before_v = fs::read(engine.artifacts().vectorizer_path()).unwrap();
        let before_c = fs::read(engine.artifacts().classifier_path()).unwrap();

        let broken = TrainingEngine::new(
            settings.with_reference(ReferenceLocation::File(tmp.path().join("missing.tsv"))),
        );
        assert!(matches!(broken.run().await, Err(TrainError::Foundation(_))));

        assert_eq!(fs::read(broken.artifacts().vectorizer_path()).unwrap(), before_v);
        assert_eq!(fs::read(broken.artifacts().classifier_path()).unwrap(), before_c);
        let leftovers = fs::read_dir(tmp.path().join("models")).unwrap().count();
        assert_eq!(leftovers, 2);
        assert_eq!(
            Predictor::load(&tmp.path().join("models")).unwrap().run_id(),
            run.run_id
        );
    }

    #[tokio::test]
    async fn serves_requests_until_channel_closes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let engine = TrainingEngine::new(settings(&tmp));

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(RetrainRequest::after_curation(1)).unwrap();
        tx.send(RetrainRequest::manual()).unwrap();
        drop(tx);

        let mut run_ids = Vec::new();
        let stats = engine
            .run_requests(rx, |result| run_ids.push(result.unwrap().run_id))
            .await;
        assert_eq!(stats, RequestStats { completed: 2, failed: 0 });
        assert_eq!(run_ids.len(), 2);
    }

    #[tokio::test]
    async fn failed_requests_are_counted_and_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let settings = settings(&tmp)
            .with_reference(ReferenceLocation::File(tmp.path().join("missing.tsv")));
        let engine = TrainingEngine::new(settings);

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(RetrainRequest::manual()).unwrap();
        drop(tx);

        let mut failures = 0;
        let stats = engine
            .run_requests(rx, |result| {
                if result.is_err() {
                    failures += 1;
                }
            })
            .await;
        assert_eq!(stats, RequestStats { completed: 0, failed: 1 });
        assert_eq!(failures, 1);
    }

    #[tokio::test]
    async fn malformed_verified_rows_do_not_drop_the_corpus() {
        let tmp = tempfile::TempDir::new().unwrap();
        let settings = settings(&tmp);
        fs::create_dir_all(&settings.data_dir).unwrap();
        fs::write(
            settings.verified_path(),
            "label,message\nspam,WIN FREE CASH NOW\nham,meeting moved\nspam,extra,field\n",
        )
        .unwrap();

        let run = TrainingEngine::new(settings).run().await.unwrap();
        assert_eq!(run.verified_rows, 2);
        assert_eq!(run.corpus_size(), 42);
    }

    #[tokio::test]
    async fn unreadable_verified_corpus_aborts_before_publishing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let settings = settings(&tmp);
        // A directory where the corpus file should be: exists, cannot be read.
        fs::create_dir_all(settings.verified_path()).unwrap();

        let engine = TrainingEngine::new(settings);
        assert!(matches!(engine.run().await, Err(TrainError::Verified(_))));
        assert!(!engine.artifacts().vectorizer_path().exists());
        assert!(!engine.artifacts().classifier_path().exists());
    }
}
