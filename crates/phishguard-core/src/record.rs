//! Shared record types for the feedback loop.
//!
//! A [`FeedbackRecord`] is untrusted: it came from a user disagreeing (or
//! agreeing) with a prediction. A [`VerifiedRecord`] has passed the curation
//! gate and is the only record type the training corpus accepts from
//! feedback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Binary message class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ham,
    Spam,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown label {0:?} (expected \"ham\" or \"spam\")")]
pub struct LabelError(pub String);

impl Label {
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ham => "ham",
            Self::Spam => "spam",
        }
    }

    /// Numeric training target: ham = 0, spam = 1.
    pub fn target(&self) -> usize {
        match self {
            Self::Ham => 0,
            Self::Spam => 1,
        }
    }

    pub fn from_target(target: usize) -> Option<Self> {
        match target {
            0 => Some(Self::Ham),
            1 => Some(Self::Spam),
            _ => None,
        }
    }

    /// The other class.
    pub fn flipped(&self) -> Self {
        match self {
            Self::Ham => Self::Spam,
            Self::Spam => Self::Ham,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ham" => Ok(Self::Ham),
            "spam" => Ok(Self::Spam),
            _ => Err(LabelError(s.to_string())),
        }
    }
}

/// A labelled message with no trust attached. This is the row shape of the
/// reference dataset and of the assembled training corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledText {
    pub label: Label,
    pub text: String,
}

impl LabelledText {
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// An unverified user correction held in quarantine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub label: Label,
    pub message: String,
}

impl FeedbackRecord {
    pub fn new(label: Label, message: impl Into<String>) -> Self {
        Self {
            label,
            message: message.into(),
        }
    }

    /// True when the message has no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.message.trim().is_empty()
    }

    /// Promote this record after an explicit admin approval.
    pub fn approve(self) -> VerifiedRecord {
        VerifiedRecord {
            label: self.label,
            message: self.message,
        }
    }
}

/// An admin-approved record. Fields are private: the only ways to obtain one
/// are [`FeedbackRecord::approve`] and, in the storage layer, reading back
/// rows that were already written to the verified corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRecord {
    label: Label,
    message: String,
}

impl VerifiedRecord {
    /// Rebuild a record read from the verified corpus file. Only available
    /// with the `corpus-rows` feature, which the store crate enables.
    #[cfg(feature = "corpus-rows")]
    #[doc(hidden)]
    pub fn from_corpus_row(label: Label, message: impl Into<String>) -> Self {
        Self {
            label,
            message: message.into(),
        }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<VerifiedRecord> for LabelledText {
    fn from(r: VerifiedRecord) -> Self {
        LabelledText::new(r.label, r.message)
    }
}

/// Result of classifying one message. Returned whole to the caller, who keeps
/// it if they want to follow up with feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub message: String,
    pub label: Label,
    pub spam_probability: f64,
}

/// User response to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Prediction {
    /// The label the user asserts for this message.
    pub fn claimed_label(&self, verdict: Verdict) -> Label {
        match verdict {
            Verdict::Correct => self.label,
            Verdict::Incorrect => self.label.flipped(),
        }
    }

    /// Turn the user's verdict into a quarantined feedback record.
    pub fn feedback(&self, verdict: Verdict) -> FeedbackRecord {
        FeedbackRecord::new(self.claimed_label(verdict), self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_parses_case_insensitively() {
        assert_eq!("ham".parse::<Label>(), Ok(Label::Ham));
        assert_eq!(" SPAM ".parse::<Label>(), Ok(Label::Spam));
        assert!("phish".parse::<Label>().is_err());
    }

    #[test]
    fn label_targets() {
        assert_eq!(Label::Ham.target(), 0);
        assert_eq!(Label::Spam.target(), 1);
        assert_eq!(Label::from_target(1), Some(Label::Spam));
        assert_eq!(Label::from_target(2), None);
    }

    #[test]
    fn blank_feedback_detected() {
        assert!(FeedbackRecord::new(Label::Spam, "   \n\t").is_blank());
        assert!(!FeedbackRecord::new(Label::Spam, " hi ").is_blank());
    }

    #[test]
    fn approve_keeps_content() {
        let v = FeedbackRecord::new(Label::Spam, "WIN FREE CASH NOW").approve();
        assert_eq!(v.label(), Label::Spam);
        assert_eq!(v.message(), "WIN FREE CASH NOW");
    }

    #[test]
    fn incorrect_verdict_flips_label() {
        let p = Prediction {
            message: "hello there".into(),
            label: Label::Spam,
            spam_probability: 0.9,
        };
        assert_eq!(p.feedback(Verdict::Incorrect).label, Label::Ham);
        assert_eq!(p.feedback(Verdict::Correct).label, Label::Spam);
        assert_eq!(p.feedback(Verdict::Correct).message, "hello there");
    }

    #[test]
    fn prediction_serializes_lowercase_label() {
        let p = Prediction {
            message: "x".into(),
            label: Label::Ham,
            spam_probability: 0.1,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"label\":\"ham\""));
    }
}
