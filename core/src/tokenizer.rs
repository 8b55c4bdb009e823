use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::vocabulary::Vocabulary;

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    // English stop set of the standard analyzer the dictionaries are built with.
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","but","by","for","if","in","into","is","it",
            "no","not","of","on","or","such","that","the","their","then","there","these",
            "they","this","to","was","will","with",
        ];
        words.iter().copied().collect()
    };
}

pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 255;

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Analyzer settings. They must match the analyzer that produced the dictionary,
/// otherwise most terms silently miss the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    pub stopwords: bool,
    pub stem: bool,
    /// Apply NFKC normalization before segmentation.
    pub normalize: bool,
    /// Tokens longer than this many chars are skipped.
    pub max_token_length: usize,
    /// Upper bound on the number of tokens read from one document.
    pub max_tokens: Option<usize>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self { stopwords: true, stem: false, normalize: false, max_token_length: DEFAULT_MAX_TOKEN_LENGTH, max_tokens: None }
    }
}

/// Multiset of vocabulary terms found in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermBag {
    counts: BTreeMap<String, u32>,
    total: u64,
}

impl TermBag {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, term: impl Into<String>) {
        *self.counts.entry(term.into()).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms.
    pub fn distinct(&self) -> usize { self.counts.len() }

    /// Sum of all occurrence counts, i.e. document length after filtering.
    pub fn total(&self) -> u64 { self.total }

    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    /// Distinct terms with their counts, in term order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(t, &c)| (t.as_str(), c))
    }
}

impl<S: Into<String>> FromIterator<S> for TermBag {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut bag = TermBag::new();
        for term in iter {
            bag.add(term);
        }
        bag
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    options: AnalyzerOptions,
}

impl Tokenizer {
    pub fn new(options: AnalyzerOptions) -> Self { Self { options } }

    pub fn options(&self) -> &AnalyzerOptions { &self.options }

    /// Split text into analyzed tokens: UAX #29 word segmentation, lowercase,
    /// stop-word removal and optional stemming.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let normalized = if self.options.normalize {
            text.nfkc().collect::<String>().to_lowercase()
        } else {
            text.to_lowercase()
        };
        let limit = self.options.max_tokens.unwrap_or(usize::MAX);
        let mut tokens = Vec::new();
        for token in normalized.unicode_words().take(limit) {
            if token.is_empty() || token.chars().count() > self.options.max_token_length { continue; }
            if self.options.stopwords && is_stopword(token) { continue; }
            if self.options.stem {
                tokens.push(STEMMER.stem(token).into_owned());
            } else {
                tokens.push(token.to_string());
            }
        }
        tokens
    }

    /// Analyze text and keep only tokens present in the vocabulary.
    pub fn tokenize(&self, text: &str, vocabulary: &Vocabulary) -> TermBag {
        let mut bag = TermBag::new();
        for token in self.analyze(text) {
            if vocabulary.contains(&token) {
                bag.add(token);
            }
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_analyze() {
        let t = Tokenizer::default().analyze("Buy NOW, the offer ends!");
        assert_eq!(t, vec!["buy", "now", "offer", "ends"]);
    }

    #[test]
    fn stemming_is_optional() {
        let opts = AnalyzerOptions { stem: true, ..AnalyzerOptions::default() };
        let t = Tokenizer::new(opts).analyze("Running runners");
        assert!(t.iter().any(|w| w == "run"));
        let plain = Tokenizer::default().analyze("Running runners");
        assert_eq!(plain, vec!["running", "runners"]);
    }

    #[test]
    fn max_tokens_bounds_the_work() {
        let opts = AnalyzerOptions { max_tokens: Some(2), ..AnalyzerOptions::default() };
        let t = Tokenizer::new(opts).analyze("one two three four");
        assert_eq!(t, vec!["one", "two"]);
    }

    #[test]
    fn overlong_tokens_are_skipped() {
        let opts = AnalyzerOptions { max_token_length: 4, ..AnalyzerOptions::default() };
        let t = Tokenizer::new(opts).analyze("tiny enormous word");
        assert_eq!(t, vec!["tiny", "word"]);
    }

    #[test]
    fn term_bag_counts() {
        let bag: TermBag = ["a", "b", "a"].into_iter().collect();
        assert_eq!(bag.count("a"), 2);
        assert_eq!(bag.distinct(), 2);
        assert_eq!(bag.total(), 3);
    }
}
