//! Keyword ranking over caption text
//!
//! Terms are scored with TF-IDF over the texts passed to a call. Ranking is
//! by score descending; equal scores keep vocabulary (alphabetical) order.
//! A corpus with no usable token ranks to an empty result, never an error.

pub mod stop_words;
pub mod tfidf;
pub mod tokenizer;

use std::cmp::Ordering;
use std::collections::BTreeMap;

pub use tfidf::TfIdfMatrix;
pub use tokenizer::tokenize;

/// Top-`top_n` terms of every text, each text being its own document.
///
/// Every id of the input is present in the output; a text with no usable
/// token maps to an empty list. Repeated ids keep the last text's terms.
pub fn rank_per_item<I, T>(texts: &[(I, T)], top_n: usize) -> BTreeMap<I, Vec<String>>
where
    I: Ord + Clone,
    T: AsRef<str>,
{
    let docs: Vec<&str> = texts.iter().map(|(_, t)| t.as_ref()).collect();
    let Some(matrix) = TfIdfMatrix::fit(&docs) else {
        return BTreeMap::new();
    };

    texts
        .iter()
        .zip(&matrix.rows)
        .map(|((id, _), row)| (id.clone(), top_terms(&matrix, row.iter().copied(), top_n)))
        .collect()
}

/// Top-`top_n` terms of the pooled corpus, scored by the sum of their
/// per-document weights.
pub fn rank_pooled<T: AsRef<str>>(texts: &[T], top_n: usize) -> Vec<String> {
    if texts.iter().all(|t| t.as_ref().trim().is_empty()) {
        return Vec::new();
    }
    let Some(matrix) = TfIdfMatrix::fit(texts) else {
        return Vec::new();
    };

    let sums = matrix.column_sums();
    top_terms(&matrix, sums.into_iter().enumerate(), top_n)
}

fn top_terms(
    matrix: &TfIdfMatrix,
    scores: impl Iterator<Item = (usize, f64)>,
    top_n: usize,
) -> Vec<String> {
    let mut scored: Vec<(usize, f64)> = scores.collect();
    // Stable: ties stay in vocabulary order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
        .into_iter()
        .take(top_n)
        .map(|(term, _)| matrix.term(term).to_string())
        .collect()
}
