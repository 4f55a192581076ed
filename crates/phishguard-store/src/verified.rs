//! Verified corpus: append-only store of admin-approved records.

use std::path::{Path, PathBuf};

use phishguard_core::VerifiedRecord;
use tracing::{info, warn};

use crate::StoreError;
use crate::table::{self, TableLock};

/// Durable, append-only store of approved `(label, message)` pairs.
///
/// Never truncated or rewritten: every training run re-reads the full
/// accumulated history.
pub struct VerifiedCorpus {
    path: PathBuf,
    lock: TableLock,
}

impl VerifiedCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = TableLock::for_table(&path);
        Self { path, lock }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append one batch of approved records in a single write. Creates the
    /// file with a header on first write. An empty batch writes nothing.
    pub fn append(&self, records: &[VerifiedRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let encoded = table::encode_rows(records.iter().map(|r| (r.label(), r.message())))?;
        self.lock
            .exclusive(|| table::append_encoded(&self.path, &encoded))?;
        info!(
            count = records.len(),
            path = %self.path.display(),
            "appended verified records"
        );
        Ok(records.len())
    }

    /// Every record ever approved, in approval order; empty if none exist.
    pub fn load_all(&self) -> Result<Vec<VerifiedRecord>, StoreError> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let (decoded, _) = self.lock.shared(|| table::read_file(&self.path))?;
        if decoded.dropped > 0 {
            warn!(
                dropped = decoded.dropped,
                path = %self.path.display(),
                "skipped malformed verified rows"
            );
        }

        Ok(decoded
            .rows
            .into_iter()
            .map(|(label, message)| VerifiedRecord::from_corpus_row(label, message))
            .collect())
    }
}
