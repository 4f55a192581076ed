//! Multinomial naive Bayes over sparse TF-IDF features.

use phishguard_core::Label;

use crate::vectorizer::SparseVec;

const N_CLASSES: usize = Label::ALL.len();

/// Fitted multinomial naive Bayes for the two message classes.
///
/// Class order follows [`Label::target`]: ham = 0, spam = 1.
#[derive(Debug, Clone, PartialEq)]
pub struct MultinomialNb {
    class_log_prior: [f64; N_CLASSES],
    feature_log_prob: [Vec<f64>; N_CLASSES],
}

impl MultinomialNb {
    /// Fit with additive smoothing `alpha`.
    ///
    /// A class absent from `labels` gets a log prior of negative infinity and
    /// is never predicted.
    pub fn fit(rows: &[SparseVec], labels: &[Label], n_features: usize, alpha: f64) -> Self {
        let mut class_count = [0usize; N_CLASSES];
        let mut feature_count = [vec![0.0f64; n_features], vec![0.0f64; n_features]];

        for (row, label) in rows.iter().zip(labels) {
            let c = label.target();
            class_count[c] += 1;
            for &(j, v) in row {
                feature_count[c][j] += v;
            }
        }

        let total = class_count.iter().sum::<usize>() as f64;
        let class_log_prior = class_count.map(|n| (n as f64 / total).ln());

        let feature_log_prob = feature_count.map(|counts| {
            let denom = (counts.iter().sum::<f64>() + alpha * n_features as f64).ln();
            counts.iter().map(|c| (c + alpha).ln() - denom).collect::<Vec<f64>>()
        });

        Self {
            class_log_prior,
            feature_log_prob,
        }
    }

    /// Rebuild from persisted parameters. Both rows of `feature_log_prob`
    /// must have the same length.
    pub fn from_parts(class_log_prior: [f64; 2], feature_log_prob: [Vec<f64>; 2]) -> Self {
        Self {
            class_log_prior,
            feature_log_prob,
        }
    }

    /// Input width this classifier expects.
    pub fn n_features(&self) -> usize {
        self.feature_log_prob[0].len()
    }

    pub fn class_log_prior(&self) -> &[f64; 2] {
        &self.class_log_prior
    }

    pub fn feature_log_prob(&self) -> &[Vec<f64>; 2] {
        &self.feature_log_prob
    }

    fn joint_log_likelihood(&self, row: &SparseVec) -> [f64; N_CLASSES] {
        std::array::from_fn(|c| {
            let flp = &self.feature_log_prob[c];
            self.class_log_prior[c] + row.iter().map(|&(j, v)| v * flp[j]).sum::<f64>()
        })
    }

    /// Most likely class; ties go to ham.
    pub fn predict(&self, row: &SparseVec) -> Label {
        let jll = self.joint_log_likelihood(row);
        if jll[Label::Spam.target()] > jll[Label::Ham.target()] {
            Label::Spam
        } else {
            Label::Ham
        }
    }

    pub fn predict_all(&self, rows: &[SparseVec]) -> Vec<Label> {
        rows.iter().map(|r| self.predict(r)).collect()
    }

    /// Posterior class probabilities, indexed by [`Label::target`].
    pub fn predict_proba(&self, row: &SparseVec) -> [f64; N_CLASSES] {
        let jll = self.joint_log_likelihood(row);
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return [1.0 / N_CLASSES as f64; N_CLASSES];
        }
        let exp = jll.map(|l| (l - max).exp());
        let sum: f64 = exp.iter().sum();
        exp.map(|e| e / sum)
    }
}
