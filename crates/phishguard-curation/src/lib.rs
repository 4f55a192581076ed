//! Admin review of quarantined feedback.

mod decision;
mod error;
mod gate;

pub use decision::{Decision, Reviewer};
pub use error::CurationError;
pub use gate::{CurationGate, NothingToReview, ReviewOutcome, ReviewSummary};
