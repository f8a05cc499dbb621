//! # triple-os-engine
//!
//! Triple OS personality matching: questionnaire answers become an
//! eight-dimensional trigram trait vector, which is ranked against the 64
//! I-Ching hexagram archetypes.
//!
//! ## Overview
//!
//! Three facets are computed per submission:
//!
//! - **Engine OS**: core values, from the worldview answers
//! - **Interface OS**: social presentation, from the outer side of scenario answers
//! - **SafeMode OS**: stress response, from the inner side of scenario answers
//!
//! Core capabilities:
//!
//! - **Trigram**: closed eight-dimension coordinate system and array-backed vectors
//! - **Scoring**: relational vector construction, cosine + activation scoring, ranked selection
//! - **Ruleset**: injected opposing / complementary / koui / situational tables
//! - **Store**: validated hexagram reference vectors and the King Wen table
//! - **Lines**: six-line (爻) relationship analysis
//! - **Orchestrator**: Engine → Interface / SafeMode composition, parallel batches
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use triple_os_engine::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(HexagramVectorStore::load("hexagrams.json")?);
//! let ruleset = Arc::new(RelationalRuleset::default());
//! let orchestrator = TripleOsOrchestrator::new(store, ruleset);
//!
//! let input = TripleOsInput::new(worldview_answers, scenario_answers);
//! let result = orchestrator.analyze(&input)?;
//! println!("Engine OS: {}", result.engine_os.chosen.name);
//! ```
//!
//! The core performs no I/O during analysis and holds no mutable state; the
//! loaders are the only filesystem entry points.

pub mod config;
pub mod lines;
pub mod orchestrator;
pub mod questionnaire;
pub mod ruleset;
pub mod scoring;
pub mod store;
pub mod trigram;

use orchestrator::OsKind;

/// Error types for Triple OS operations
#[derive(Debug, thiserror::Error)]
pub enum TripleOsError {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidVectorDimension { expected: usize, actual: usize },

    #[error("No valid candidates: {0}")]
    NoValidCandidates(String),

    #[error("Invalid data: {0}")]
    Data(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} OS failed: {source}")]
    Os {
        kind: OsKind,
        source: Box<TripleOsError>,
    },
}

/// Result type alias for Triple OS operations
pub type Result<T> = std::result::Result<T, TripleOsError>;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Result, TripleOsError};

    // Dimensions
    pub use crate::trigram::{DimensionShare, TraitVector, Trigram, DIMENSIONS};

    // Answers
    pub use crate::questionnaire::{
        AnsweredQuestion, Choice, KouiLevel, PartitionConfig, QuestionId, RelationKind,
        ScenarioAnswer, ScenarioSide, ScoringTag, SubmittedAnswer, TripleOsInput,
    };

    // Tables
    pub use crate::ruleset::{MissingRelationalRule, RelationalRuleset};
    pub use crate::store::{HexagramEntry, HexagramVectorStore};

    // Scoring
    pub use crate::scoring::{
        CandidateScore, CandidateSelector, MatchScore, ScoringWeights, SelectionOptions,
        SimilarityEngine, VectorBuilder,
    };

    // Lines
    pub use crate::lines::{apply_line_adjustment, HexagramLines, Line, LinePosition};

    // Orchestration
    pub use crate::config::EngineConfig;
    pub use crate::orchestrator::{OsKind, OsResult, TripleOsOrchestrator, TripleOsResult};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let score = SimilarityEngine::default().score(&TraitVector::zeros(), &TraitVector::zeros());
        assert_eq!(score.final_score, 0.0);
        assert_eq!(Trigram::ALL.len(), DIMENSIONS);
    }

    #[test]
    fn test_os_error_names_the_step() {
        let err = crate::TripleOsError::Os {
            kind: crate::orchestrator::OsKind::SafeMode,
            source: Box::new(crate::TripleOsError::NoValidCandidates("all 1 hexagrams excluded".into())),
        };
        assert_eq!(
            err.to_string(),
            "SafeMode OS failed: No valid candidates: all 1 hexagrams excluded"
        );
    }
}
