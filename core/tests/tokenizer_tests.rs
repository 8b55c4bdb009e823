use classifier_core::tokenizer::{AnalyzerOptions, Tokenizer};
use classifier_core::vocabulary::{Vocabulary, DEFAULT_CARDINALITY};
use std::collections::HashMap;

fn vocab(words: &[&str]) -> Vocabulary {
    let terms: HashMap<String, u32> = words.iter().enumerate().map(|(i, w)| (w.to_string(), i as u32)).collect();
    let mut table: Vec<(i64, u64)> = (0..words.len() as i64).map(|i| (i, 1)).collect();
    table.push((-1, 10));
    Vocabulary::from_frequency_table(terms, table, DEFAULT_CARDINALITY).unwrap()
}

#[test]
fn it_lowercases_and_segments_words() {
    let words = Tokenizer::default().analyze("FREE money!!! Click-here, café-owner's deal");
    assert_eq!(words, vec!["free", "money", "click", "here", "café", "owner's", "deal"]);
}

#[test]
fn it_normalizes_when_asked() {
    let opts = AnalyzerOptions { normalize: true, ..AnalyzerOptions::default() };
    // Fullwidth letters fold to ASCII under NFKC.
    let words = Tokenizer::new(opts).analyze("ＦＲＥＥ offer");
    assert_eq!(words, vec!["free", "offer"]);
}

#[test]
fn it_filters_stopwords() {
    let words = Tokenizer::default().analyze("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"quick".to_string()));

    let keep = Tokenizer::new(AnalyzerOptions { stopwords: false, ..AnalyzerOptions::default() });
    assert!(keep.analyze("the fox").contains(&"the".to_string()));
}

#[test]
fn it_drops_unknown_terms() {
    let v = vocab(&["buy", "now"]);
    let bag = Tokenizer::default().tokenize("Buy it now, buy it today", &v);
    assert_eq!(bag.count("buy"), 2);
    assert_eq!(bag.count("now"), 1);
    assert_eq!(bag.count("today"), 0);
    assert_eq!(bag.total(), 3);
}

#[test]
fn no_known_terms_gives_empty_bag() {
    let v = vocab(&["buy"]);
    assert!(Tokenizer::default().tokenize("nothing relevant here", &v).is_empty());
    assert!(Tokenizer::default().tokenize("", &v).is_empty());
    assert!(Tokenizer::default().tokenize("!!! ... ???", &v).is_empty());
}

#[test]
fn tokenizing_is_deterministic() {
    let v = vocab(&["buy", "now", "hello"]);
    let text = "hello hello, buy now! now? hello";
    let t = Tokenizer::default();
    assert_eq!(t.tokenize(text, &v), t.tokenize(text, &v));
}
