use phishguard_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurationError {
    /// Reading the quarantine or writing the verified corpus failed. Nothing
    /// was promoted and the quarantine is unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The approved records were promoted but the reviewed rows are still
    /// queued. Approving them again would duplicate them in the corpus.
    #[error("{promoted} record(s) promoted but the feedback queue was not cleared: {source}")]
    Drain { promoted: usize, source: StoreError },
}
