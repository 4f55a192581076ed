//! Feedback store: append-only quarantine of unverified user corrections.

use std::fs;
use std::path::{Path, PathBuf};

use phishguard_core::FeedbackRecord;
use tracing::{debug, info, warn};

use crate::StoreError;
use crate::table::{self, TableLock};

/// What the quarantine currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// The store file has never been created.
    Absent,
    /// The file exists but is zero bytes long.
    EmptyFile,
    /// Decoded records, possibly none (header only).
    Records(Snapshot),
}

impl Pending {
    pub fn into_records(self) -> Vec<FeedbackRecord> {
        match self {
            Self::Records(snapshot) => snapshot.records,
            Self::Absent | Self::EmptyFile => Vec::new(),
        }
    }
}

/// The records read by one [`FeedbackStore::pending`] call, and how far into
/// the file that read went.
///
/// Passing it back to [`FeedbackStore::drain_reviewed`] removes exactly these
/// rows and keeps anything submitted since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<FeedbackRecord>,
    dropped: usize,
    end: u64,
}

impl Snapshot {
    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Malformed rows skipped while reading.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Quarantine of `(label, message)` corrections awaiting admin review.
///
/// Stored as a `label,message` CSV file. Every append and every drain holds an
/// exclusive lock on a sidecar lock file, so concurrent submissions from many
/// prediction sessions land as whole rows.
pub struct FeedbackStore {
    path: PathBuf,
    lock: TableLock,
}

impl FeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = TableLock::for_table(&path);
        Self { path, lock }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    ///
    /// Blank messages are ignored without error; returns whether a row was
    /// written.
    pub fn submit(&self, record: &FeedbackRecord) -> Result<bool, StoreError> {
        if record.is_blank() {
            debug!(label = %record.label, "ignoring blank feedback message");
            return Ok(false);
        }

        let encoded = table::encode_rows([(record.label, record.message.as_str())])?;
        self.lock
            .exclusive(|| table::append_encoded(&self.path, &encoded))?;
        info!(label = %record.label, path = %self.path.display(), "feedback recorded");
        Ok(true)
    }

    /// Inspect the quarantine without modifying it.
    pub fn pending(&self) -> Result<Pending, StoreError> {
        let meta = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Pending::Absent),
            Err(e) => return Err(StoreError::io(&self.path)(e)),
        };
        if meta.len() == 0 {
            return Ok(Pending::EmptyFile);
        }

        let (decoded, end) = self.lock.shared(|| table::read_file(&self.path))?;
        if decoded.dropped > 0 {
            warn!(
                dropped = decoded.dropped,
                path = %self.path.display(),
                "skipped malformed feedback rows"
            );
        }

        let records = decoded
            .rows
            .into_iter()
            .map(|(label, message)| FeedbackRecord::new(label, message))
            .collect();
        Ok(Pending::Records(Snapshot {
            records,
            dropped: decoded.dropped,
            end,
        }))
    }

    /// All pending records in submission order; empty if the store is absent.
    pub fn load_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        Ok(self.pending()?.into_records())
    }

    /// Reset the store to a header-only file.
    pub fn drain(&self) -> Result<(), StoreError> {
        self.lock.exclusive(|| table::reset(&self.path))?;
        info!(path = %self.path.display(), "feedback queue reset");
        Ok(())
    }

    /// Remove the rows covered by `snapshot`, keeping anything appended after
    /// it was taken. Returns the number of records kept.
    pub fn drain_reviewed(&self, snapshot: &Snapshot) -> Result<usize, StoreError> {
        let tail = self
            .lock
            .exclusive(|| table::reset_through(&self.path, snapshot.end))?;
        let kept = table::decode(&tail, false)?.rows.len();
        info!(
            reviewed = snapshot.len(),
            kept,
            path = %self.path.display(),
            "feedback queue drained"
        );
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use phishguard_core::Label;
    use proptest::prelude::*;

    use super::*;

    fn store(tmp: &tempfile::TempDir) -> FeedbackStore {
        FeedbackStore::new(tmp.path().join("feedback.csv"))
    }

    #[test]
    fn absent_store_loads_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        assert_eq!(store.pending().unwrap(), Pending::Absent);
        assert!(store.load_all().unwrap().is_empty());
        // Reading must not create anything.
        assert!(!store.path().exists());
        assert!(!tmp.path().join("feedback.csv.lock").exists());
    }

    #[test]
    fn zero_byte_file_is_reported_as_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        fs::write(store.path(), "").unwrap();
        assert_eq!(store.pending().unwrap(), Pending::EmptyFile);
    }

    #[test]
    fn submit_writes_header_once() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(store.submit(&FeedbackRecord::new(Label::Spam, "WIN FREE CASH NOW")).unwrap());
        assert!(store.submit(&FeedbackRecord::new(Label::Ham, "lunch at 1?")).unwrap());

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text.matches("label,message").count(), 1);
        assert_eq!(
            store.load_all().unwrap(),
            vec![
                FeedbackRecord::new(Label::Spam, "WIN FREE CASH NOW"),
                FeedbackRecord::new(Label::Ham, "lunch at 1?"),
            ]
        );
    }

    #[test]
    fn blank_messages_are_not_written() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(!store.submit(&FeedbackRecord::new(Label::Spam, "  \t ")).unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn duplicates_are_kept() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        let rec = FeedbackRecord::new(Label::Spam, "same");
        store.submit(&rec).unwrap();
        store.submit(&rec).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    fn drain_empties_store_and_allows_new_submissions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        store.submit(&FeedbackRecord::new(Label::Spam, "a")).unwrap();
        store.drain().unwrap();
        assert!(matches!(store.pending().unwrap(), Pending::Records(s) if s.is_empty()));

        store.submit(&FeedbackRecord::new(Label::Ham, "b")).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "label,message\nham,b\n");
    }

    #[test]
    fn drain_reviewed_keeps_submissions_made_after_the_snapshot() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store(&tmp);
        store.submit(&FeedbackRecord::new(Label::Ham, "reviewed")).unwrap();
        fs::OpenOptions::new()
            .append(true)
            .open(store.path())
            .and_then(|mut f| std::io::Write::write_all(&mut f, b"spam,too,many\n"))
            .unwrap();

        let Pending::Records(snapshot) = store.pending().unwrap() else {
            panic!("expected records");
        };
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.dropped(), 1);

        store.submit(&FeedbackRecord::new(Label::Spam, "arrived during review")).unwrap();
        assert_eq!(store.drain_reviewed(&snapshot).unwrap(), 1);
        assert_eq!(
            store.load_all().unwrap(),
            vec![FeedbackRecord::new(Label::Spam, "arrived during review")]
        );

        // Nothing new since the second read: the queue ends up header-only.
        let Pending::Records(snapshot) = store.pending().unwrap() else {
            panic!("expected records");
        };
        assert_eq!(store.drain_reviewed(&snapshot).unwrap(), 0);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "label,message\n");
    }

    #[test]
    fn concurrent_submissions_are_not_lost() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = Arc::new(store(&tmp));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..25 {
                        let msg = format!("thread {t} message {i}, with comma");
                        store.submit(&FeedbackRecord::new(Label::Spam, msg)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 200);
        assert!(records.iter().all(|r| r.message.ends_with(", with comma")));
    }

    proptest! {
        #[test]
        fn every_non_blank_submission_is_loaded(
            messages in proptest::collection::vec("[a-zA-Z0-9 ,\"]{1,40}", 0..20)
        ) {
            let tmp = tempfile::TempDir::new().unwrap();
            let store = store(&tmp);
            let mut expected = Vec::new();
            for m in &messages {
                let rec = FeedbackRecord::new(Label::Ham, m.clone());
                if store.submit(&rec).unwrap() {
                    expected.push(rec);
                }
            }
            prop_assert_eq!(store.load_all().unwrap(), expected);
        }
    }
}
