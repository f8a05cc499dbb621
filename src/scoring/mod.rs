//! # Scoring
//!
//! The numeric core: answers become a trait vector, the vector is compared
//! with every reference hexagram, and the best matches are ranked.
//!
//! ```text
//! answers ──VectorBuilder──▶ TraitVector ──CandidateSelector──▶ [CandidateScore; top_n]
//!                │                                 │
//!        RelationalRuleset                 SimilarityEngine
//! ```
//!
//! ## Vector construction
//!
//! Per tag, in order:
//!
//! 1. add `weight` (outer scenario side: `weight * situational modifier`)
//! 2. conflicting: add `opposing_coefficient * |weight|` to the opposite
//! 3. complementary: add `complementary_coefficient * |weight|` to the partner
//! 4. with a koui level: add `(multiplier - 1) * weight` to the tag dimension
//!
//! ## Scoring
//!
//! | Score | Formula | Zero-magnitude |
//! |-------|---------|----------------|
//! | similarity | cosine | 0 |
//! | activation | `(min/max magnitude) ^ 0.5` | 0 |
//! | final | `0.7 * similarity + 0.3 * activation` | 0 |
//!
//! The blend weights and the exponent are configurable via [`ScoringWeights`].
//!
//! Everything here is pure and `Send + Sync`.

mod builder;
mod selector;
mod similarity;

pub use builder::{VectorBuild, VectorBuilder};
pub use selector::{CandidateScore, CandidateSelector, SelectionOptions, DEFAULT_TOP_N};
pub use similarity::{activation, cosine_similarity, MatchScore, ScoringWeights, SimilarityEngine};
