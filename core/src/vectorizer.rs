use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ClassifierError, Result};
use crate::tokenizer::TermBag;
use crate::vocabulary::{FeatureIndex, Vocabulary};

/// TF-IDF weighting scheme.
///
/// All variants take the term count `c`, the term's document frequency `df`, the
/// document length `n` and the training document count `d`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// `sqrt(c) * (ln(d / (df + 1)) + 1)`, the classic Lucene similarity.
    #[default]
    Classic,
    /// `c * ln(d / df)`
    Raw,
    /// `(1 + ln c) * ln(d / df)`
    Sublinear,
    /// `(c / n) * ln(d / df)`
    Normalized,
}

impl Weighting {
    pub fn tf_idf(self, count: u64, df: u64, length: u64, documents: u64) -> f64 {
        let c = count as f64;
        let df = df as f64;
        let d = documents as f64;
        match self {
            Weighting::Classic => c.sqrt() * ((d / (df + 1.0)).ln() + 1.0),
            Weighting::Raw => c * (d / df).ln(),
            Weighting::Sublinear => {
                let tf = if count > 0 { 1.0 + c.ln() } else { 0.0 };
                tf * (d / df).ln()
            }
            Weighting::Normalized => {
                let n = length.max(1) as f64;
                (c / n) * (d / df).ln()
            }
        }
    }
}

/// Sparse feature vector over a fixed-cardinality feature space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: BTreeMap<FeatureIndex, f64>,
    cardinality: usize,
}

impl FeatureVector {
    pub fn new(cardinality: usize) -> Self {
        Self { entries: BTreeMap::new(), cardinality }
    }

    /// Overwrites any previous value at `idx`. Zero clears the entry.
    pub fn set(&mut self, idx: FeatureIndex, value: f64) {
        if value == 0.0 {
            self.entries.remove(&idx);
        } else {
            self.entries.insert(idx, value);
        }
    }

    pub fn get(&self, idx: FeatureIndex) -> f64 {
        self.entries.get(&idx).copied().unwrap_or(0.0)
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn cardinality(&self) -> usize { self.cardinality }

    /// Stored entries in ascending feature index.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureIndex, f64)> + '_ {
        self.entries.iter().map(|(&i, &v)| (i, v))
    }
}

/// Build the TF-IDF vector for a bag of vocabulary terms.
pub fn vectorize(terms: &TermBag, vocabulary: &Vocabulary, weighting: Weighting) -> Result<FeatureVector> {
    let length = terms.total();
    let documents = vocabulary.total_document_count();
    let mut vector = FeatureVector::new(vocabulary.cardinality());
    for (term, count) in terms.iter() {
        let idx = vocabulary
            .feature_index_of(term)
            .ok_or_else(|| ClassifierError::invalid_model(format!("term {term:?} is not in the vocabulary")))?;
        let df = vocabulary.document_frequency(idx);
        if df == 0 {
            return Err(ClassifierError::invalid_model(format!(
                "term {term:?} (feature {idx}) has zero document frequency"
            )));
        }
        let value = weighting.tf_idf(count as u64, df, length, documents);
        if !value.is_finite() {
            return Err(ClassifierError::invalid_model(format!(
                "non-finite weight for term {term:?} (count {count}, df {df}, documents {documents})"
            )));
        }
        vector.set(idx, value);
    }
    Ok(vector)
}
