use std::fmt;

use phishguard_core::FeedbackRecord;

/// An admin's ruling on one quarantined record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Stage for promotion to the verified corpus.
    Approve,
    /// Discard; the correction looks like bad faith.
    Reject,
    /// Discard; judgment deferred.
    Skip,
}

impl Decision {
    /// `y` approves, `n` rejects, anything else skips.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" => Self::Approve,
            "n" => Self::Reject,
            _ => Self::Skip,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Skip => "skip",
        })
    }
}

/// The human side of a review session.
pub trait Reviewer {
    /// Rule on `record`, the `position`-th (1-based) of `total` pending records.
    fn decide(&mut self, record: &FeedbackRecord, position: usize, total: usize) -> Decision;

    /// Asked once after `promoted` records reached the verified corpus.
    fn confirm_retrain(&mut self, promoted: usize) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_admin_input() {
        assert_eq!(Decision::parse("y"), Decision::Approve);
        assert_eq!(Decision::parse(" Y\n"), Decision::Approve);
        assert_eq!(Decision::parse("n"), Decision::Reject);
        assert_eq!(Decision::parse("N"), Decision::Reject);
        assert_eq!(Decision::parse(""), Decision::Skip);
        assert_eq!(Decision::parse("s"), Decision::Skip);
        assert_eq!(Decision::parse("yes"), Decision::Skip);
    }
}
