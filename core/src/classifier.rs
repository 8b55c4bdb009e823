use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::batch::read_document;
use crate::config::ClassifierConfig;
use crate::error::{ClassifierError, Result};
use crate::label::{Label, LabelIndex};
use crate::persist::{load_label_index, load_model, load_vocabulary};
use crate::scorer::{best_label, NaiveBayesModel, Scores, ScoringModel};
use crate::tokenizer::{TermBag, Tokenizer};
use crate::vectorizer::{vectorize, FeatureVector, Weighting};
use crate::vocabulary::Vocabulary;
use crate::LabelId;

/// Something that maps an input to an outcome, e.g. a document to a label.
pub trait Classify<I: ?Sized> {
    type Outcome;

    fn classify(&self, input: &I) -> Result<Self::Outcome>;

    /// The intermediate artifacts behind a classification.
    fn analysis(&self, input: &I) -> Result<Analysis>;
}

/// Everything computed while classifying one document.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub terms: TermBag,
    pub vector: FeatureVector,
    pub scores: Scores,
    pub best: LabelId,
}

/// Text classifier over immutable, loaded artifacts.
///
/// Holds no interior mutability, so one instance can serve any number of threads.
pub struct Classifier<L = Label, M = NaiveBayesModel> {
    vocabulary: Vocabulary,
    tokenizer: Tokenizer,
    weighting: Weighting,
    model: M,
    labels: LabelIndex<L>,
}

impl<L> Classifier<L, NaiveBayesModel>
where
    L: FromStr,
    L::Err: fmt::Display,
{
    /// Load all artifacts named by `config`. Any failure aborts the whole load.
    pub fn load(config: &ClassifierConfig) -> Result<Self> {
        let vocabulary = load_vocabulary(config)?;
        let labels = LabelIndex::new(load_label_index(&config.label_index)?)?;
        let model = load_model(&config.model)?;
        tracing::info!(
            terms = vocabulary.len(),
            documents = vocabulary.total_document_count(),
            labels = labels.len(),
            "loaded classifier"
        );
        Ok(Self::new(vocabulary, labels, model)?
            .with_tokenizer(Tokenizer::new(config.analyzer.clone()))
            .with_weighting(config.weighting))
    }

    /// Load from a model directory or manifest file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(&ClassifierConfig::load(path)?)
    }
}

impl<L, M: ScoringModel> Classifier<L, M> {
    pub fn new(vocabulary: Vocabulary, labels: LabelIndex<L>, model: M) -> Result<Self> {
        if labels.len() != model.num_labels() {
            return Err(ClassifierError::load(format!(
                "label index has {} labels but the model scores {}",
                labels.len(),
                model.num_labels()
            )));
        }
        if let (Some(features), Some(max)) = (model.feature_count(), vocabulary.max_feature_index()) {
            if max as usize >= features {
                return Err(ClassifierError::load(format!(
                    "vocabulary maps terms to feature {max} but the model has {features} features"
                )));
            }
        }
        Ok(Self { vocabulary, tokenizer: Tokenizer::default(), weighting: Weighting::default(), model, labels })
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn labels(&self) -> &LabelIndex<L> { &self.labels }

    pub fn model(&self) -> &M { &self.model }

    pub fn weighting(&self) -> Weighting { self.weighting }

    pub fn tokenize(&self, text: &str) -> TermBag {
        self.tokenizer.tokenize(text, &self.vocabulary)
    }

    pub fn vectorize(&self, terms: &TermBag) -> Result<FeatureVector> {
        vectorize(terms, &self.vocabulary, self.weighting)
    }

    pub fn score(&self, vector: &FeatureVector) -> Scores {
        self.model.score_all(vector)
    }

    pub fn analysis(&self, text: &str) -> Result<Analysis> {
        let terms = self.tokenize(text);
        let vector = self.vectorize(&terms)?;
        let scores = self.score(&vector);
        let best = best_label(&scores)?;
        tracing::debug!(
            label = self.labels.name(best).unwrap_or("?"),
            terms = terms.total(),
            features = vector.nnz(),
            "classified document"
        );
        Ok(Analysis { terms, vector, scores, best })
    }

    pub fn label_of(&self, id: LabelId) -> Result<&L> {
        self.labels.get(id).ok_or(ClassifierError::UnknownLabelId(id))
    }

    /// Scores keyed by label name, in label id order.
    pub fn named_scores(&self, scores: &Scores) -> Vec<(String, f64)> {
        scores
            .iter()
            .map(|(&id, &s)| (self.labels.name(id).unwrap_or("?").to_string(), s))
            .collect()
    }
}

impl<L: Clone, M: ScoringModel> Classifier<L, M> {
    pub fn classify(&self, text: &str) -> Result<L> {
        let analysis = self.analysis(text)?;
        self.label_of(analysis.best).cloned()
    }

    pub fn classify_with_scores(&self, text: &str) -> Result<(L, Scores)> {
        let analysis = self.analysis(text)?;
        let label = self.label_of(analysis.best)?.clone();
        Ok((label, analysis.scores))
    }

    /// Classify a file's contents, decoded as UTF-8 with invalid sequences replaced.
    pub fn classify_file<P: AsRef<Path>>(&self, path: P) -> Result<L> {
        self.classify(&read_document(path)?)
    }
}

impl<L: Clone, M: ScoringModel> Classify<str> for Classifier<L, M> {
    type Outcome = L;

    fn classify(&self, input: &str) -> Result<L> {
        Classifier::classify(self, input)
    }

    fn analysis(&self, input: &str) -> Result<Analysis> {
        Classifier::analysis(self, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    struct Fixed(Scores);

    impl ScoringModel for Fixed {
        fn num_labels(&self) -> usize { self.0.len() }
        fn score_all(&self, _vector: &FeatureVector) -> Scores { self.0.clone() }
    }

    fn vocab() -> Vocabulary {
        let terms: HashMap<String, u32> = [("offer".to_string(), 0)].into_iter().collect();
        Vocabulary::from_frequency_table(terms, vec![(0, 3), (-1, 30)], 10).unwrap()
    }

    fn labels(n: u32) -> LabelIndex<Label> {
        let all = ["ham", "spam", "unsure"];
        LabelIndex::new((0..n).map(|i| (i, all[i as usize].to_string())).collect::<BTreeMap<_, _>>()).unwrap()
    }

    #[test]
    fn label_count_must_match_model() {
        let model = Fixed([(0, 0.0), (1, 0.0), (2, 0.0)].into_iter().collect());
        assert!(Classifier::new(vocab(), labels(2), model).is_err());
    }

    #[test]
    fn best_id_outside_label_index_is_surfaced() {
        // The model claims two labels but scores an id the index does not have.
        let model = Fixed([(0, -1.0), (7, 3.0)].into_iter().collect());
        let classifier = Classifier::new(vocab(), labels(2), model).unwrap();
        let err = classifier.classify("offer").unwrap_err();
        assert!(matches!(err, ClassifierError::UnknownLabelId(7)));
    }

    #[test]
    fn trait_and_inherent_classify_agree() {
        let model = Fixed([(0, -1.0), (1, 3.0)].into_iter().collect());
        let classifier = Classifier::new(vocab(), labels(2), model).unwrap();
        let via_trait = <Classifier<Label, Fixed> as Classify<str>>::classify(&classifier, "offer").unwrap();
        assert_eq!(via_trait, Label::Spam);
        assert_eq!(classifier.classify("offer").unwrap(), Label::Spam);
    }
}
