//! TF-IDF text vectorizer.
//!
//! Messages are lowercased and split into word tokens of two or more word
//! characters; English stop words are removed. The vocabulary holds every term
//! whose document frequency in the fitting set reaches `min_df`, indexed in
//! lexicographic order. Each row is `count * idf`, L2-normalised, with the
//! smoothed idf `ln((1 + n) / (1 + df)) + 1`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::stop_words::is_stop_word;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Sparse row: `(feature index, weight)` pairs in ascending index order.
pub type SparseVec = Vec<(usize, f64)>;

/// Fitted TF-IDF vocabulary and idf weights.
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfVectorizer {
    terms: Vec<String>,
    idf: Vec<f64>,
    stop_words: bool,
    index: HashMap<String, usize>,
}

impl TfidfVectorizer {
    /// Fit on a set of documents.
    pub fn fit<S: AsRef<str>>(docs: &[S], min_df: usize, stop_words: bool) -> Self {
        let n_docs = docs.len();
        let mut df: BTreeMap<String, usize> = BTreeMap::new();

        for doc in docs {
            let unique: HashSet<String> = analyze(doc.as_ref(), stop_words).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let (terms, idf) = df
            .into_iter()
            .filter(|(_, count)| *count >= min_df.max(1))
            .map(|(term, count)| (term, smooth_idf(n_docs, count)))
            .unzip();

        Self::from_parts(terms, idf, stop_words)
    }

    /// Rebuild a vectorizer from persisted parts. `terms` must be sorted and
    /// the same length as `idf`.
    pub fn from_parts(terms: Vec<String>, idf: Vec<f64>, stop_words: bool) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self {
            terms,
            idf,
            stop_words,
            index,
        }
    }

    /// Vectorize one document against the fitted vocabulary. Terms outside
    /// the vocabulary are ignored.
    pub fn transform(&self, doc: &str) -> SparseVec {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(doc, self.stop_words) {
            if let Some(&i) = self.index.get(&term) {
                *counts.entry(i).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVec = counts
            .into_iter()
            .map(|(i, count)| (i, count * self.idf[i]))
            .collect();
        normalize(&mut row);
        row
    }

    pub fn transform_all<S: AsRef<str>>(&self, docs: &[S]) -> Vec<SparseVec> {
        docs.iter().map(|d| self.transform(d.as_ref())).collect()
    }

    /// Output width: the number of vocabulary terms.
    pub fn n_features(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn stop_words(&self) -> bool {
        self.stop_words
    }
}

/// Lowercase, tokenize, and optionally drop stop words.
pub fn analyze(doc: &str, stop_words: bool) -> impl Iterator<Item = String> + '_ {
    let lowered = doc.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(move |t| !(stop_words && is_stop_word(t)))
        .collect::<Vec<_>>()
        .into_iter()
}

fn smooth_idf(n_docs: usize, df: usize) -> f64 {
    ((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0
}

/// L2-normalize a sparse row in place.
fn normalize(row: &mut SparseVec) {
    let norm: f64 = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, v) in row.iter_mut() {
            *v /= norm;
        }
    }
}
