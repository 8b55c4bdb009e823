//! Naive Bayes scoring and arg-max label selection.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{ClassifierError, Result};
use crate::vectorizer::FeatureVector;
use crate::vocabulary::FeatureIndex;
use crate::LabelId;

/// Per-label scores in ascending label id.
pub type Scores = BTreeMap<LabelId, f64>;

/// A trained model that scores a feature vector against every label it knows.
pub trait ScoringModel: Send + Sync {
    fn num_labels(&self) -> usize;

    /// Size of the feature space the model was trained over, when it has a fixed one.
    fn feature_count(&self) -> Option<usize> {
        None
    }

    /// Log-likelihood style score per label, higher is better. Not normalized.
    fn score_all(&self, vector: &FeatureVector) -> Scores;
}

/// Multinomial Naive Bayes model as exported by the trainer.
///
/// The score of label `l` is `prior(l) + sum_i v_i * ln((w(l,i) + alpha) / (W(l) + alpha * F))`
/// where `w(l,i)` is the trained weight of feature `i` under `l`, `W(l)` the sum of `l`'s
/// weights and `F` the number of features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    feature_weights: Vec<HashMap<FeatureIndex, f64>>,
    label_weights: Vec<f64>,
    log_priors: Vec<f64>,
    alpha_i: f64,
    num_features: usize,
}

impl NaiveBayesModel {
    /// `feature_weights[l]` holds the sparse weights of label `l`.
    pub fn new(feature_weights: Vec<HashMap<FeatureIndex, f64>>, alpha_i: f64, num_features: usize) -> Result<Self> {
        let label_weights: Vec<f64> = feature_weights.iter().map(|w| w.values().sum::<f64>()).collect();
        let log_priors = vec![0.0; feature_weights.len()];
        let model = Self { feature_weights, label_weights, log_priors, alpha_i, num_features };
        model.validate()?;
        Ok(model)
    }

    pub fn with_log_priors(mut self, log_priors: Vec<f64>) -> Result<Self> {
        self.log_priors = log_priors;
        self.validate()?;
        Ok(self)
    }

    /// Check internal consistency; run after deserializing.
    pub fn validate(&self) -> Result<()> {
        let n = self.feature_weights.len();
        if n == 0 {
            return Err(ClassifierError::load("model has no labels"));
        }
        if self.label_weights.len() != n || self.log_priors.len() != n {
            return Err(ClassifierError::load(format!(
                "model dimensions disagree: {n} weight rows, {} label weights, {} priors",
                self.label_weights.len(),
                self.log_priors.len()
            )));
        }
        if self.num_features == 0 {
            return Err(ClassifierError::load("model has zero features"));
        }
        if !(self.alpha_i >= 0.0 && self.alpha_i.is_finite()) {
            return Err(ClassifierError::load(format!("invalid smoothing parameter {}", self.alpha_i)));
        }
        for (label, row) in self.feature_weights.iter().enumerate() {
            if row.values().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(ClassifierError::load(format!("label {label} has a negative or non-finite weight")));
            }
            if let Some(idx) = row.keys().find(|&&i| i as usize >= self.num_features) {
                return Err(ClassifierError::load(format!("label {label} weights feature {idx} beyond {} features", self.num_features)));
            }
            if self.denominator(label) <= 0.0 {
                return Err(ClassifierError::load(format!("label {label} has no weight and no smoothing")));
            }
        }
        if self.log_priors.iter().any(|p| p.is_nan()) {
            return Err(ClassifierError::load("model has a NaN prior"));
        }
        Ok(())
    }

    pub fn weight(&self, label: usize, feature: FeatureIndex) -> f64 {
        self.feature_weights
            .get(label)
            .and_then(|row| row.get(&feature))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn label_weight(&self, label: usize) -> f64 {
        self.label_weights.get(label).copied().unwrap_or(0.0)
    }

    pub fn num_features(&self) -> usize { self.num_features }

    fn denominator(&self, label: usize) -> f64 {
        self.label_weight(label) + self.alpha_i * self.num_features as f64
    }

    fn score_for_label_feature(&self, label: usize, feature: FeatureIndex) -> f64 {
        ((self.weight(label, feature) + self.alpha_i) / self.denominator(label)).ln()
    }
}

impl ScoringModel for NaiveBayesModel {
    fn num_labels(&self) -> usize { self.feature_weights.len() }

    fn feature_count(&self) -> Option<usize> { Some(self.num_features) }

    fn score_all(&self, vector: &FeatureVector) -> Scores {
        let mut scores = Scores::new();
        for label in 0..self.num_labels() {
            let mut score = self.log_priors[label];
            for (idx, value) in vector.iter() {
                score += value * self.score_for_label_feature(label, idx);
            }
            scores.insert(label as LabelId, score);
        }
        scores
    }
}

pub fn score<M: ScoringModel + ?Sized>(vector: &FeatureVector, model: &M) -> Scores {
    model.score_all(vector)
}

/// Arg-max over the scores. Ties go to the lowest label id.
pub fn best_label(scores: &Scores) -> Result<LabelId> {
    let mut best_score = f64::NEG_INFINITY;
    let mut best_id: Option<LabelId> = None;
    for (&id, &score) in scores {
        if score.is_nan() {
            return Err(ClassifierError::invalid_model(format!("label {id} scored NaN")));
        }
        if best_id.is_none() || score > best_score {
            best_score = score;
            best_id = Some(id);
        }
    }
    best_id.ok_or(ClassifierError::NoLabelsAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(FeatureIndex, f64)]) -> HashMap<FeatureIndex, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn ties_go_to_lowest_id() {
        let scores: Scores = [(0, 1.5), (1, 1.5), (2, 0.9)].into_iter().collect();
        assert_eq!(best_label(&scores).unwrap(), 0);
    }

    #[test]
    fn all_negative_scores_still_select() {
        let scores: Scores = [(0, -40.0), (1, -12.5)].into_iter().collect();
        assert_eq!(best_label(&scores).unwrap(), 1);
    }

    #[test]
    fn empty_scores_fail() {
        assert!(matches!(best_label(&Scores::new()), Err(ClassifierError::NoLabelsAvailable)));
    }

    #[test]
    fn nan_scores_fail() {
        let scores: Scores = [(0, f64::NAN)].into_iter().collect();
        assert!(matches!(best_label(&scores), Err(ClassifierError::InvalidModel(_))));
    }

    #[test]
    fn scores_follow_feature_weights() {
        let model = NaiveBayesModel::new(vec![row(&[(0, 9.0)]), row(&[(1, 9.0)])], 1.0, 2).unwrap();
        let mut v = FeatureVector::new(2);
        v.set(0, 2.0);
        let s = score(&v, &model);
        assert_eq!(s.len(), 2);
        assert!(s[&0] > s[&1]);
        let expected = 2.0 * (10.0f64 / 11.0).ln();
        assert!((s[&0] - expected).abs() < 1e-12);
    }

    #[test]
    fn empty_vector_scores_are_priors() {
        let model = NaiveBayesModel::new(vec![row(&[(0, 1.0)]), row(&[(1, 1.0)])], 1.0, 2)
            .unwrap()
            .with_log_priors(vec![-0.2, -1.6])
            .unwrap();
        let s = model.score_all(&FeatureVector::new(2));
        assert_eq!(s[&0], -0.2);
        assert_eq!(s[&1], -1.6);
    }

    #[test]
    fn inconsistent_models_are_rejected() {
        assert!(NaiveBayesModel::new(vec![], 1.0, 2).is_err());
        assert!(NaiveBayesModel::new(vec![row(&[(5, 1.0)])], 1.0, 2).is_err());
        assert!(NaiveBayesModel::new(vec![row(&[])], 0.0, 2).is_err());
        let m = NaiveBayesModel::new(vec![row(&[(0, 1.0)])], 1.0, 2).unwrap();
        assert!(m.with_log_priors(vec![0.0, 0.0]).is_err());
    }
}
