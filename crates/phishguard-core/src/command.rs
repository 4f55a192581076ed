//! Commands passed from the curation gate to the training engine.

use chrono::{DateTime, Utc};

/// Why a retrain was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrainReason {
    /// An admin confirmed retraining at the end of a review session.
    Curation { promoted: usize },
    /// Requested directly by an operator or a scheduler.
    Manual,
}

/// A request for one training run.
#[derive(Debug, Clone)]
pub struct RetrainRequest {
    pub reason: RetrainReason,
    pub requested_at: DateTime<Utc>,
}

impl RetrainRequest {
    pub fn new(reason: RetrainReason) -> Self {
        Self {
            reason,
            requested_at: Utc::now(),
        }
    }

    pub fn after_curation(promoted: usize) -> Self {
        Self::new(RetrainReason::Curation { promoted })
    }

    pub fn manual() -> Self {
        Self::new(RetrainReason::Manual)
    }
}
