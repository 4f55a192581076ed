//! Holdout evaluation: accuracy and a per-class precision/recall/F1 report.

use std::fmt;

use phishguard_core::Label;
use serde::Serialize;

/// Scores for one class (or one average row).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReport {
    pub label: Label,
    #[serde(flatten)]
    pub scores: ClassScores,
}

/// Diagnostic-only evaluation of a freshly trained model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub classes: Vec<ClassReport>,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl Evaluation {
    /// Compare true and predicted labels. Undefined ratios are reported as 0.
    pub fn compute(truth: &[Label], predicted: &[Label]) -> Self {
        let total = truth.len();
        let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();

        let classes: Vec<ClassReport> = Label::ALL
            .iter()
            .map(|&label| ClassReport {
                label,
                scores: class_scores(label, truth, predicted),
            })
            .collect();

        let n = classes.len() as f64;
        let macro_avg = ClassScores {
            precision: classes.iter().map(|c| c.scores.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.scores.recall).sum::<f64>() / n,
            f1: classes.iter().map(|c| c.scores.f1).sum::<f64>() / n,
            support: total,
        };

        let weighted = |f: fn(&ClassScores) -> f64| {
            ratio(
                classes
                    .iter()
                    .map(|c| f(&c.scores) * c.scores.support as f64)
                    .sum(),
                total as f64,
            )
        };
        let weighted_avg = ClassScores {
            precision: weighted(|s| s.precision),
            recall: weighted(|s| s.recall),
            f1: weighted(|s| s.f1),
            support: total,
        };

        Self {
            accuracy: ratio(correct as f64, total as f64),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn class(&self, label: Label) -> Option<&ClassScores> {
        self.classes
            .iter()
            .find(|c| c.label == label)
            .map(|c| &c.scores)
    }
}

fn class_scores(label: Label, truth: &[Label], predicted: &[Label]) -> ClassScores {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fneg = 0usize;
    for (&t, &p) in truth.iter().zip(predicted) {
        match (t == label, p == label) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fneg += 1,
            (false, false) => {}
        }
    }

    let precision = ratio(tp as f64, (tp + fp) as f64);
    let recall = ratio(tp as f64, (tp + fneg) as f64);
    ClassScores {
        precision,
        recall,
        f1: ratio(2.0 * precision * recall, precision + recall),
        support: tp + fneg,
    }
}

fn ratio(num: f64, denom: f64) -> f64 {
    if denom > 0.0 { num / denom } else { 0.0 }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12}{:>11}{:>10}{:>10}{:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            write_row(f, c.label.as_str(), &c.scores)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12}{:>11}{:>10}{:>10.2}{:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, s: &ClassScores) -> fmt::Result {
    writeln!(
        f,
        "{:>12}{:>11.2}{:>10.2}{:>10.2}{:>10}",
        name, s.precision, s.recall, s.f1, s.support
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Ham, Spam};

    #[test]
    fn perfect_predictions() {
        let truth = [Ham, Spam, Ham];
        let eval = Evaluation::compute(&truth, &truth);
        assert_eq!(eval.accuracy, 1.0);
        assert_eq!(eval.class(Spam).unwrap().f1, 1.0);
        assert_eq!(eval.class(Ham).unwrap().support, 2);
    }

    #[test]
    fn mixed_predictions() {
        let truth = [Ham, Ham, Ham, Spam, Spam];
        let pred = [Ham, Ham, Spam, Spam, Ham];
        let eval = Evaluation::compute(&truth, &pred);

        assert!((eval.accuracy - 0.6).abs() < 1e-12);
        let spam = eval.class(Spam).unwrap();
        assert!((spam.precision - 0.5).abs() < 1e-12);
        assert!((spam.recall - 0.5).abs() < 1e-12);
        let ham = eval.class(Ham).unwrap();
        assert!((ham.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((ham.recall - 2.0 / 3.0).abs() < 1e-12);

        let expected_weighted = (ham.f1 * 3.0 + spam.f1 * 2.0) / 5.0;
        assert!((eval.weighted_avg.f1 - expected_weighted).abs() < 1e-12);
    }

    #[test]
    fn never_predicted_class_scores_zero() {
        let eval = Evaluation::compute(&[Ham, Spam], &[Ham, Ham]);
        let spam = eval.class(Spam).unwrap();
        assert_eq!(spam.precision, 0.0);
        assert_eq!(spam.f1, 0.0);
    }

    #[test]
    fn report_renders_every_row() {
        let eval = Evaluation::compute(&[Ham, Spam], &[Ham, Spam]);
        let text = eval.to_string();
        for row in ["ham", "spam", "accuracy", "macro avg", "weighted avg"] {
            assert!(text.contains(row), "missing {row} in\n{text}");
        }
    }

    #[test]
    fn serializes_to_json() {
        let eval = Evaluation::compute(&[Ham, Spam], &[Ham, Spam]);
        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["accuracy"], 1.0);
        assert_eq!(json["classes"][1]["label"], "spam");
        assert_eq!(json["classes"][1]["support"], 1);
    }
}
