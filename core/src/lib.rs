//! Naive Bayes text classification over a fixed TF-IDF feature space.
//!
//! The pipeline is `tokenize -> vectorize -> score -> best_label -> label lookup`. All
//! artifacts (vocabulary, document frequencies, label index, model) are loaded once and
//! shared read-only afterwards.

pub mod batch;
pub mod classifier;
pub mod config;
pub mod error;
pub mod label;
pub mod persist;
pub mod scorer;
pub mod tokenizer;
pub mod vectorizer;
pub mod vocabulary;

pub type LabelId = u32;

pub use classifier::{Analysis, Classifier, Classify};
pub use config::ClassifierConfig;
pub use error::{ClassifierError, Result};
pub use label::{Label, LabelIndex};
pub use scorer::{best_label, score, NaiveBayesModel, Scores, ScoringModel};
pub use tokenizer::{AnalyzerOptions, TermBag, Tokenizer};
pub use vectorizer::{vectorize, FeatureVector, Weighting};
pub use vocabulary::{FeatureIndex, Vocabulary, DEFAULT_CARDINALITY, TOTAL_DOCUMENTS_KEY};
