//! Corpus-wide TF-IDF matrix over normalized title tokens.
//! Weight = tf × (ln((1 + n_docs) / (1 + df)) + 1), rows L2-normalized.
//! Zero rows are legal input downstream; their cosine similarity is 0.

use super::tokenize;
use crate::error::AnalysisError;
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::{BTreeMap, HashMap};

pub struct TitleMatrix {
    matrix: Array2<f64>,
    vocabulary: Vec<String>,
}

impl TitleMatrix {
    /// Vectorize every title in the corpus. Degenerate titles produce zero
    /// rows; the call fails only when a non-empty corpus yields no tokens.
    pub fn from_titles<S: AsRef<str>>(titles: &[S]) -> Result<Self, AnalysisError> {
        let docs: Vec<Vec<String>> = titles.iter().map(|t| tokenize(t.as_ref())).collect();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &docs {
            let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for token in seen {
                *document_frequency.entry(token).or_default() += 1;
            }
        }
        if document_frequency.is_empty() && !titles.is_empty() {
            return Err(AnalysisError::entries(
                "corpus has no informative tokens after normalization",
            ));
        }

        let vocabulary: Vec<String> = document_frequency.keys().map(|t| t.to_string()).collect();
        let term_index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();
        let n_docs = docs.len() as f64;

        let mut matrix = Array2::<f64>::zeros((docs.len(), vocabulary.len()));
        for (row, tokens) in docs.iter().enumerate() {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for token in tokens {
                *counts.entry(token.as_str()).or_default() += 1;
            }
            for (token, tf) in counts {
                let df = document_frequency[token] as f64;
                let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
                matrix[[row, term_index[token]]] = tf as f64 * idf;
            }
            let norm = matrix.row(row).dot(&matrix.row(row)).sqrt();
            if norm > 0.0 {
                matrix.row_mut(row).mapv_inplace(|w| w / norm);
            }
        }

        Ok(Self { matrix, vocabulary })
    }

    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.matrix.row(i)
    }

    /// Cosine similarity between two titles; 0 when either vector is zero.
    pub fn cosine_similarity(&self, i: usize, j: usize) -> f64 {
        self.matrix.row(i).dot(&self.matrix.row(j))
    }

    /// Cosine distance (1 − similarity).
    pub fn cosine_distance(&self, i: usize, j: usize) -> f64 {
        1.0 - self.cosine_similarity(i, j)
    }

    /// L2-normalized mean of the given rows; all-zero when the members sum
    /// to the zero vector.
    pub fn centroid(&self, members: &[usize]) -> Array1<f64> {
        let mut sum = Array1::<f64>::zeros(self.matrix.ncols());
        for &i in members {
            sum += &self.matrix.row(i);
        }
        let norm = sum.dot(&sum).sqrt();
        if norm > 0.0 {
            sum.mapv_inplace(|w| w / norm);
        }
        sum
    }
}

/// Cosine similarity of two pre-normalized vectors; 0 when either is zero.
pub(crate) fn cosine(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.dot(&b)
}
