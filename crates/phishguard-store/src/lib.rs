//! Storage layer: the feedback quarantine and the verified corpus, both
//! two-column `label,message` CSV tables.

mod error;
mod feedback;
mod table;
mod verified;

pub use error::StoreError;
pub use feedback::{FeedbackStore, Pending, Snapshot};
pub use verified::VerifiedCorpus;
