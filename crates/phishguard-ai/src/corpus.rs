//! Training corpus: the reference dataset merged with the verified corpus.
//!
//! Rebuilt from scratch on every training run and never persisted.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use phishguard_core::{Label, LabelledText, VerifiedRecord, messages};

pub struct TrainingCorpus {
    rows: Vec<LabelledText>,
    reference_rows: usize,
    verified_rows: usize,
}

impl TrainingCorpus {
    /// Concatenate reference rows then verified rows, preserving order within
    /// each source. Rows with an empty message are dropped.
    pub fn assemble(reference: Vec<LabelledText>, verified: Vec<VerifiedRecord>) -> Self {
        let reference: Vec<LabelledText> = reference
            .into_iter()
            .filter(|r| !r.text.is_empty())
            .collect();
        let verified: Vec<LabelledText> = verified
            .into_iter()
            .map(LabelledText::from)
            .filter(|r| !r.text.is_empty())
            .collect();

        let reference_rows = reference.len();
        let verified_rows = verified.len();
        let mut rows = reference;
        rows.extend(verified);

        Self {
            rows,
            reference_rows,
            verified_rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn reference_rows(&self) -> usize {
        self.reference_rows
    }

    pub fn verified_rows(&self) -> usize {
        self.verified_rows
    }

    pub fn rows(&self) -> &[LabelledText] {
        &self.rows
    }

    /// Number of rows per class: `(ham, spam)`.
    pub fn label_counts(&self) -> (usize, usize) {
        let spam = self.rows.iter().filter(|r| r.label == Label::Spam).count();
        (self.rows.len() - spam, spam)
    }

    /// The first `n` rows as a `label,message` batch, for operator display.
    pub fn preview(&self, n: usize) -> Result<RecordBatch, ArrowError> {
        let head = &self.rows[..n.min(self.rows.len())];
        let labels: Vec<&str> = head.iter().map(|r| r.label.as_str()).collect();
        let texts: Vec<&str> = head.iter().map(|r| r.text.as_str()).collect();
        RecordBatch::try_new(
            messages::schema_ref(),
            vec![
                Arc::new(StringArray::from(labels)) as ArrayRef,
                Arc::new(StringArray::from(texts)) as ArrayRef,
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use phishguard_core::FeedbackRecord;

    use super::*;

    #[test]
    fn reference_rows_come_first() {
        let corpus = TrainingCorpus::assemble(
            vec![
                LabelledText::new(Label::Ham, "ref one"),
                LabelledText::new(Label::Spam, "ref two"),
            ],
            vec![FeedbackRecord::new(Label::Spam, "WIN FREE CASH NOW").approve()],
        );
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.reference_rows(), 2);
        assert_eq!(corpus.verified_rows(), 1);
        assert_eq!(corpus.rows()[2].text, "WIN FREE CASH NOW");
        assert_eq!(corpus.label_counts(), (1, 2));
    }

    #[test]
    fn drops_empty_messages() {
        let corpus = TrainingCorpus::assemble(
            vec![LabelledText::new(Label::Ham, "")],
            vec![FeedbackRecord::new(Label::Spam, "").approve()],
        );
        assert!(corpus.is_empty());
    }

    #[test]
    fn preview_is_truncated() {
        let rows = (0..10)
            .map(|i| LabelledText::new(Label::Ham, format!("message {i}")))
            .collect();
        let corpus = TrainingCorpus::assemble(rows, vec![]);
        let batch = corpus.preview(5).unwrap();
        assert_eq!(batch.num_rows(), 5);
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(corpus.preview(50).unwrap().num_rows(), 10);
    }
}
