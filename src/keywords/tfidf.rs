//! TF-IDF weighting over a small corpus
//!
//! - vocabulary: every token of the corpus, sorted
//! - tf: raw count of the term in the document
//! - idf: ln((1 + n) / (1 + df)) + 1 (smoothed)
//! - rows are L2-normalized

use std::collections::{BTreeMap, BTreeSet};

use super::tokenizer::tokenize;

/// Sparse TF-IDF matrix: one row per document, columns index `vocabulary`.
#[derive(Clone, Debug, Default)]
pub struct TfIdfMatrix {
    pub vocabulary: Vec<String>,
    /// Per document: (term index, weight), sorted by term index, zero
    /// weights omitted.
    pub rows: Vec<Vec<(usize, f64)>>,
}

impl TfIdfMatrix {
    /// Fit on `docs` and transform them.
    ///
    /// Returns `None` when the corpus yields no token at all.
    pub fn fit<S: AsRef<str>>(docs: &[S]) -> Option<Self> {
        let tokenized: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d.as_ref())).collect();

        let vocabulary: Vec<String> = tokenized
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if vocabulary.is_empty() {
            return None;
        }
        let index: BTreeMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let counts: Vec<BTreeMap<usize, usize>> = tokenized
            .iter()
            .map(|tokens| {
                let mut tf = BTreeMap::new();
                for t in tokens {
                    *tf.entry(index[t.as_str()]).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for tf in &counts {
            for &term in tf.keys() {
                df[term] += 1;
            }
        }

        let n = docs.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .into_iter()
            .map(|tf| {
                let mut row: Vec<(usize, f64)> = tf
                    .into_iter()
                    .map(|(term, c)| (term, c as f64 * idf[term]))
                    .collect();
                let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in row.iter_mut() {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        Some(TfIdfMatrix { vocabulary, rows })
    }

    pub fn term(&self, index: usize) -> &str {
        &self.vocabulary[index]
    }

    /// Per-term sum of weights over every document, indexed like `vocabulary`.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.vocabulary.len()];
        for row in &self.rows {
            for &(term, w) in row {
                sums[term] += w;
            }
        }
        sums
    }
}
