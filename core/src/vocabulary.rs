use std::collections::{HashMap, HashSet};

use crate::error::{ClassifierError, Result};

pub type FeatureIndex = u32;

/// Size of the feature space the model was trained over.
pub const DEFAULT_CARDINALITY: usize = 10_000;

/// Key of the frequency-table entry that stores the number of training documents.
pub const TOTAL_DOCUMENTS_KEY: i64 = -1;

/// Term dictionary and document frequencies the model was trained with.
///
/// Read-only once built; the total document count is kept apart from the per-feature
/// frequencies so the two are never mixed up.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: HashMap<String, FeatureIndex>,
    document_frequencies: HashMap<FeatureIndex, u64>,
    total_document_count: u64,
    cardinality: usize,
}

impl Vocabulary {
    pub fn new(
        terms: HashMap<String, FeatureIndex>,
        document_frequencies: HashMap<FeatureIndex, u64>,
        total_document_count: u64,
        cardinality: usize,
    ) -> Result<Self> {
        if total_document_count == 0 {
            return Err(ClassifierError::load("total document count is zero"));
        }
        let mut seen: HashSet<FeatureIndex> = HashSet::with_capacity(terms.len());
        for (term, &idx) in &terms {
            if term.is_empty() {
                return Err(ClassifierError::load("dictionary contains an empty term"));
            }
            if idx as usize >= cardinality {
                return Err(ClassifierError::load(format!(
                    "feature index {idx} of term {term:?} exceeds cardinality {cardinality}"
                )));
            }
            if !seen.insert(idx) {
                return Err(ClassifierError::load(format!(
                    "feature index {idx} is assigned to more than one term"
                )));
            }
        }
        if let Some(idx) = document_frequencies.keys().find(|&&idx| idx as usize >= cardinality) {
            return Err(ClassifierError::load(format!(
                "document frequency key {idx} exceeds cardinality {cardinality}"
            )));
        }
        Ok(Self { terms, document_frequencies, total_document_count, cardinality })
    }

    /// Build from a frequency table in export form, where the entry at
    /// [`TOTAL_DOCUMENTS_KEY`] holds the training document count.
    pub fn from_frequency_table<I>(terms: HashMap<String, FeatureIndex>, table: I, cardinality: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (i64, u64)>,
    {
        let mut total: Option<u64> = None;
        let mut document_frequencies: HashMap<FeatureIndex, u64> = HashMap::new();
        for (key, count) in table {
            if key == TOTAL_DOCUMENTS_KEY {
                if total.replace(count).is_some() {
                    return Err(ClassifierError::load("frequency table has more than one total document entry"));
                }
                continue;
            }
            // Any other negative key would shadow or collide with the sentinel.
            let idx = FeatureIndex::try_from(key)
                .map_err(|_| ClassifierError::load(format!("invalid feature index {key} in frequency table")))?;
            if document_frequencies.insert(idx, count).is_some() {
                return Err(ClassifierError::load(format!("frequency table lists feature {idx} more than once")));
            }
        }
        let total = total.ok_or_else(|| {
            ClassifierError::load(format!("frequency table is missing the total document entry (key {TOTAL_DOCUMENTS_KEY})"))
        })?;
        Self::new(terms, document_frequencies, total, cardinality)
    }

    pub fn feature_index_of(&self, term: &str) -> Option<FeatureIndex> {
        self.terms.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Number of training documents containing the feature; zero when unknown.
    pub fn document_frequency(&self, idx: FeatureIndex) -> u64 {
        self.document_frequencies.get(&idx).copied().unwrap_or(0)
    }

    pub fn total_document_count(&self) -> u64 {
        self.total_document_count
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Highest feature index any term maps to.
    pub fn max_feature_index(&self) -> Option<FeatureIndex> {
        self.terms.values().copied().max()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, FeatureIndex)> {
        self.terms.iter().map(|(t, &idx)| (t.as_str(), idx))
    }

    /// Frequencies in export form, sentinel first, then ascending feature index.
    pub fn frequency_table(&self) -> Vec<(i64, u64)> {
        let mut table: Vec<(i64, u64)> = self
            .document_frequencies
            .iter()
            .map(|(&idx, &count)| (idx as i64, count))
            .collect();
        table.sort_unstable_by_key(|&(key, _)| key);
        table.insert(0, (TOTAL_DOCUMENTS_KEY, self.total_document_count));
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> HashMap<String, FeatureIndex> {
        [("buy", 0), ("now", 1), ("hello", 2)]
            .into_iter()
            .map(|(t, i)| (t.to_string(), i))
            .collect()
    }

    #[test]
    fn splits_sentinel_from_frequencies() {
        let vocab = Vocabulary::from_frequency_table(terms(), vec![(0, 5), (1, 5), (2, 50), (-1, 100)], DEFAULT_CARDINALITY).unwrap();
        assert_eq!(vocab.total_document_count(), 100);
        assert_eq!(vocab.document_frequency(2), 50);
        assert_eq!(vocab.feature_index_of("now"), Some(1));
        assert_eq!(vocab.feature_index_of("later"), None);
        assert_eq!(vocab.len(), 3);
    }

    #[test]
    fn missing_sentinel_is_a_load_error() {
        let err = Vocabulary::from_frequency_table(terms(), vec![(0, 5), (1, 5)], DEFAULT_CARDINALITY).unwrap_err();
        assert!(matches!(err, ClassifierError::Load(_)));
    }

    #[test]
    fn rejects_other_negative_keys() {
        let err = Vocabulary::from_frequency_table(terms(), vec![(-1, 10), (-2, 3)], DEFAULT_CARDINALITY).unwrap_err();
        assert!(err.is_load_error());
    }

    #[test]
    fn rejects_indices_outside_cardinality() {
        let err = Vocabulary::from_frequency_table(terms(), vec![(-1, 10)], 2).unwrap_err();
        assert!(matches!(err, ClassifierError::Load(_)));
    }

    #[test]
    fn rejects_repeated_feature_keys() {
        let err = Vocabulary::from_frequency_table(terms(), vec![(0, 5), (-1, 100), (0, 9)], DEFAULT_CARDINALITY).unwrap_err();
        assert!(matches!(err, ClassifierError::Load(_)));
    }

    #[test]
    fn max_feature_index_covers_all_terms() {
        let vocab = Vocabulary::from_frequency_table(terms(), vec![(-1, 10)], DEFAULT_CARDINALITY).unwrap();
        assert_eq!(vocab.max_feature_index(), Some(2));
        let empty = Vocabulary::new(HashMap::new(), HashMap::new(), 10, DEFAULT_CARDINALITY).unwrap();
        assert_eq!(empty.max_feature_index(), None);
    }

    #[test]
    fn rejects_shared_feature_index() {
        let mut t = terms();
        t.insert("again".into(), 0);
        assert!(Vocabulary::new(t, HashMap::new(), 10, DEFAULT_CARDINALITY).is_err());
    }

    #[test]
    fn frequency_table_puts_sentinel_first() {
        let vocab = Vocabulary::from_frequency_table(terms(), vec![(2, 50), (0, 5), (-1, 100)], DEFAULT_CARDINALITY).unwrap();
        assert_eq!(vocab.frequency_table(), vec![(-1, 100), (0, 5), (2, 50)]);
    }
}
