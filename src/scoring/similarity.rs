//! Cosine similarity, magnitude activation and their weighted blend

use crate::trigram::TraitVector;
use crate::{Result, TripleOsError};
use serde::{Deserialize, Serialize};

/// Blend weights for the final score
///
/// `final = similarity * similarity_weight + activation * activation_weight`,
/// with `activation = (min |v| / max |v|) ^ activation_exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight of direction agreement
    #[serde(default = "default_similarity_weight")]
    pub similarity_weight: f64,

    /// Weight of intensity agreement
    #[serde(default = "default_activation_weight")]
    pub activation_weight: f64,

    /// Exponent applied to the magnitude ratio
    #[serde(default = "default_activation_exponent")]
    pub activation_exponent: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity_weight: default_similarity_weight(),
            activation_weight: default_activation_weight(),
            activation_exponent: default_activation_exponent(),
        }
    }
}

fn default_similarity_weight() -> f64 { 0.7 }
fn default_activation_weight() -> f64 { 0.3 }
fn default_activation_exponent() -> f64 { 0.5 }

impl ScoringWeights {
    /// Weights finite and non-negative, not both zero; exponent finite and positive
    pub fn validate(&self) -> Result<()> {
        let weights = [self.similarity_weight, self.activation_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(TripleOsError::Config(
                "Scoring weights must be finite and non-negative".into(),
            ));
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(TripleOsError::Config(
                "At least one scoring weight must be positive".into(),
            ));
        }
        if !self.activation_exponent.is_finite() || self.activation_exponent <= 0.0 {
            return Err(TripleOsError::Config(format!(
                "Activation exponent must be positive, got {}",
                self.activation_exponent
            )));
        }
        Ok(())
    }
}

/// Result of comparing a user vector with a reference vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// Cosine similarity in [-1, 1]
    pub similarity: f64,
    /// Magnitude ratio score in [0, 1]
    pub activation: f64,
    /// Weighted blend
    pub final_score: f64,
}

/// Cosine similarity, 0 when either vector has zero magnitude
///
/// NaN inputs yield NaN.
pub fn cosine_similarity(a: &TraitVector, b: &TraitVector) -> f64 {
    let (ma, mb) = (a.magnitude(), b.magnitude());
    if ma == 0.0 || mb == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (ma * mb)).clamp(-1.0, 1.0)
}

/// `(min |a|, |b| / max |a|, |b|) ^ exponent`, 0 when either magnitude is 0
///
/// NaN inputs yield NaN.
pub fn activation(a: &TraitVector, b: &TraitVector, exponent: f64) -> f64 {
    let (ma, mb) = (a.magnitude(), b.magnitude());
    if ma == 0.0 || mb == 0.0 {
        return 0.0;
    }
    // Explicit ordering keeps NaN visible (f64::min would drop it)
    let (low, high) = if ma <= mb { (ma, mb) } else { (mb, ma) };
    (low / high).powf(exponent)
}

/// Pure scoring function over two trait vectors
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimilarityEngine {
    weights: ScoringWeights,
}

impl SimilarityEngine {
    /// Create with the given weights
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Weights in use
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a user vector against a reference vector
    pub fn score(&self, user: &TraitVector, reference: &TraitVector) -> MatchScore {
        let similarity = cosine_similarity(user, reference);
        let activation = activation(user, reference, self.weights.activation_exponent);
        MatchScore {
            similarity,
            activation,
            final_score: similarity * self.weights.similarity_weight
                + activation * self.weights.activation_weight,
        }
    }

    /// Score raw slices, rejecting anything that is not eight-dimensional
    pub fn score_slices(&self, user: &[f64], reference: &[f64]) -> Result<MatchScore> {
        let user = TraitVector::try_from(user)?;
        let reference = TraitVector::try_from(reference)?;
        Ok(self.score(&user, &reference))
    }
}
