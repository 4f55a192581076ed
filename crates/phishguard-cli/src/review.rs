//! Terminal-driven reviewer for `phishguard review`.

use std::io::{BufRead, Write};

use phishguard_core::FeedbackRecord;
use phishguard_curation::{Decision, Reviewer};
use tracing::warn;

pub struct TerminalReviewer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Show `text` and read one line. EOF or an I/O failure reads as empty.
    fn ask(&mut self, text: &str) -> String {
        if let Err(e) = write!(self.output, "{text}").and_then(|()| self.output.flush()) {
            warn!(error = %e, "failed to write prompt");
        }
        let mut line = String::new();
        if let Err(e) = self.input.read_line(&mut line) {
            warn!(error = %e, "failed to read reviewer input");
            line.clear();
        }
        line
    }
}

impl<R: BufRead, W: Write> Reviewer for TerminalReviewer<R, W> {
    fn decide(&mut self, record: &FeedbackRecord, position: usize, total: usize) -> Decision {
        let prompt = format!(
            "\n[{position}/{total}] Label: {}\nMessage: {}\nApprove? (y = approve, n = reject, other = skip): ",
            record.label, record.message
        );
        Decision::parse(&self.ask(&prompt))
    }

    fn confirm_retrain(&mut self, promoted: usize) -> bool {
        let prompt =
            format!("\n{promoted} record(s) added to the verified corpus. Retrain now? (y/n): ");
        Decision::parse(&self.ask(&prompt)) == Decision::Approve
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use phishguard_core::Label;

    use super::*;

    #[test]
    fn reads_one_decision_per_record() {
        let mut out = Vec::new();
        let mut reviewer = TerminalReviewer::new(Cursor::new("y\nn\n\n"), &mut out);
        let record = FeedbackRecord::new(Label::Spam, "WIN FREE CASH NOW");

        assert_eq!(reviewer.decide(&record, 1, 3), Decision::Approve);
        assert_eq!(reviewer.decide(&record, 2, 3), Decision::Reject);
        assert_eq!(reviewer.decide(&record, 3, 3), Decision::Skip);
        // Input exhausted.
        assert_eq!(reviewer.decide(&record, 3, 3), Decision::Skip);

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("[1/3] Label: spam"));
        assert!(shown.contains("Message: WIN FREE CASH NOW"));
    }

    #[test]
    fn retrain_needs_an_explicit_yes() {
        let mut out = Vec::new();
        let mut reviewer = TerminalReviewer::new(Cursor::new("Y\nmaybe\n"), &mut out);
        assert!(reviewer.confirm_retrain(2));
        assert!(!reviewer.confirm_retrain(2));
        assert!(!reviewer.confirm_retrain(2));
        assert!(String::from_utf8(out).unwrap().contains("2 record(s) added"));
    }
}
