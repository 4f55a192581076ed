//! The curation gate: the only path from the feedback quarantine into the
//! verified corpus.

use std::fmt;

use phishguard_core::{FeedbackRecord, RetrainRequest, Settings, VerifiedRecord};
use phishguard_store::{FeedbackStore, Pending, VerifiedCorpus};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

use crate::CurationError;
use crate::decision::{Decision, Reviewer};

/// Why a session ended without presenting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NothingToReview {
    NoFile,
    EmptyFile,
    NoEntries,
}

impl fmt::Display for NothingToReview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoFile => "No feedback to review.",
            Self::EmptyFile => "Feedback file is empty.",
            Self::NoEntries => "No new feedback entries.",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub approved: usize,
    pub rejected: usize,
    pub skipped: usize,
    /// Records written to the verified corpus.
    pub promoted: usize,
    pub retrain_requested: bool,
}

impl ReviewSummary {
    pub fn reviewed(&self) -> usize {
        self.approved + self.rejected + self.skipped
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    NothingToReview(NothingToReview),
    Reviewed(ReviewSummary),
}

pub struct CurationGate {
    feedback: FeedbackStore,
    verified: VerifiedCorpus,
    retrain: Option<UnboundedSender<RetrainRequest>>,
}

impl CurationGate {
    pub fn new(feedback: FeedbackStore, verified: VerifiedCorpus) -> Self {
        Self {
            feedback,
            verified,
            retrain: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            FeedbackStore::new(settings.feedback_path()),
            VerifiedCorpus::new(settings.verified_path()),
        )
    }

    /// Emit a [`RetrainRequest`] on `tx` when the admin confirms retraining.
    pub fn with_retrain_channel(mut self, tx: UnboundedSender<RetrainRequest>) -> Self {
        self.retrain = Some(tx);
        self
    }

    /// Run one review session.
    ///
    /// Every pending record gets exactly one decision. Approved records are
    /// appended to the verified corpus as one batch, then the reviewed rows
    /// are drained whatever the decisions were. Feedback submitted while the
    /// session was open stays queued for the next one. If the batch write
    /// fails the quarantine is left intact and the error returned.
    pub fn review(&self, reviewer: &mut dyn Reviewer) -> Result<ReviewOutcome, CurationError> {
        let snapshot = match self.feedback.pending()? {
            Pending::Absent => return Ok(nothing(NothingToReview::NoFile)),
            Pending::EmptyFile => return Ok(nothing(NothingToReview::EmptyFile)),
            Pending::Records(snapshot) if snapshot.is_empty() => {
                return Ok(nothing(NothingToReview::NoEntries));
            }
            Pending::Records(snapshot) => snapshot,
        };

        let total = snapshot.len();
        info!(total, dropped = snapshot.dropped(), "review session started");

        let mut summary = ReviewSummary::default();
        let mut staged: Vec<VerifiedRecord> = Vec::new();
        for (i, record) in snapshot.records().iter().enumerate() {
            let decision = reviewer.decide(record, i + 1, total);
            audit(record, decision);
            match decision {
                Decision::Approve => {
                    summary.approved += 1;
                    staged.push(record.clone().approve());
                }
                Decision::Reject => summary.rejected += 1,
                Decision::Skip => summary.skipped += 1,
            }
        }

        summary.promoted = self.verified.append(&staged)?;
        if let Err(source) = self.feedback.drain_reviewed(&snapshot) {
            error!(
                promoted = summary.promoted,
                error = %source,
                "promoted records are still queued; reject them in the next session"
            );
            return Err(CurationError::Drain {
                promoted: summary.promoted,
                source,
            });
        }

        if summary.promoted > 0 && reviewer.confirm_retrain(summary.promoted) {
            summary.retrain_requested = self.request_retrain(summary.promoted);
        }

        info!(
            approved = summary.approved,
            rejected = summary.rejected,
            skipped = summary.skipped,
            retrain = summary.retrain_requested,
            "review session finished"
        );
        Ok(ReviewOutcome::Reviewed(summary))
    }

    fn request_retrain(&self, promoted: usize) -> bool {
        let Some(tx) = &self.retrain else {
            warn!("retrain confirmed but no training engine is attached");
            return false;
        };
        match tx.send(RetrainRequest::after_curation(promoted)) {
            Ok(()) => true,
            Err(_) => {
                warn!("training engine stopped listening, retrain request dropped");
                false
            }
        }
    }
}

fn nothing(reason: NothingToReview) -> ReviewOutcome {
    info!(%reason, "review session skipped");
    ReviewOutcome::NothingToReview(reason)
}

fn audit(record: &FeedbackRecord, decision: Decision) {
    match decision {
        Decision::Approve => {
            info!(label = %record.label, message = %record.message, "feedback approved")
        }
        Decision::Reject => {
            warn!(label = %record.label, message = %record.message, "feedback rejected")
        }
        Decision::Skip => {
            info!(label = %record.label, message = %record.message, "feedback skipped")
        }
    }
}
