//! # Relational Ruleset
//!
//! Static lookup tables that drive relational deepening in vector
//! construction. Loaded once, shared read-only behind an `Arc`.
//!
//! ## Tables
//!
//! | Table | Shape | Default |
//! |-------|-------|---------|
//! | `opposing` | dimension → dimension | 先天 opposition (乾↔坤, 震↔巽, 坎↔離, 艮↔兌) |
//! | `complementary` | dimension → dimension | 乾↔兌, 坤↔艮, 震↔離, 巽↔坎 |
//! | `koui_multipliers` | level 1-6 → factor | 0.9, 1.1, 0.8, 1.2, 1.3, 1.0 |
//! | `situational` | question × dimension → factor | empty (1.0) |
//!
//! ## File Format
//!
//! ```toml
//! opposing_coefficient = -0.3
//! complementary_coefficient = 0.2
//! koui_multipliers = [0.9, 1.1, 0.8, 1.2, 1.3, 1.0]
//!
//! [opposing]
//! qian = "kun"
//! kun = "qian"
//!
//! [situational.q27]
//! zhen = 1.2
//! ```
//!
//! Omitted tables fall back to the defaults above; an explicitly empty table
//! stays empty.

use crate::questionnaire::{KouiLevel, QuestionId, RelationKind};
use crate::trigram::Trigram;
use crate::{Result, TripleOsError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Relational lookup tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationalRuleset {
    /// Dimension suppressed by a conflicting tag
    #[serde(default = "default_opposing")]
    pub opposing: BTreeMap<Trigram, Trigram>,

    /// Dimension reinforced by a complementary tag
    #[serde(default = "default_complementary")]
    pub complementary: BTreeMap<Trigram, Trigram>,

    /// Multiplier per koui level, index 0 = level 1
    #[serde(default = "default_koui_multipliers")]
    pub koui_multipliers: [f64; 6],

    /// Scale of the opposing adjustment, applied to `|weight|`
    #[serde(default = "default_opposing_coefficient")]
    pub opposing_coefficient: f64,

    /// Scale of the complementary adjustment, applied to `|weight|`
    #[serde(default = "default_complementary_coefficient")]
    pub complementary_coefficient: f64,

    /// Per-question dimension multipliers for scenario answers
    #[serde(default)]
    pub situational: BTreeMap<QuestionId, BTreeMap<Trigram, f64>>,
}

impl Default for RelationalRuleset {
    fn default() -> Self {
        Self {
            opposing: default_opposing(),
            complementary: default_complementary(),
            koui_multipliers: default_koui_multipliers(),
            opposing_coefficient: default_opposing_coefficient(),
            complementary_coefficient: default_complementary_coefficient(),
            situational: BTreeMap::new(),
        }
    }
}

fn symmetric(pairs: [(Trigram, Trigram); 4]) -> BTreeMap<Trigram, Trigram> {
    pairs
        .into_iter()
        .flat_map(|(a, b)| [(a, b), (b, a)])
        .collect()
}

fn default_opposing() -> BTreeMap<Trigram, Trigram> {
    use Trigram::*;
    symmetric([(Qian, Kun), (Zhen, Xun), (Kan, Li), (Gen, Dui)])
}

fn default_complementary() -> BTreeMap<Trigram, Trigram> {
    use Trigram::*;
    symmetric([(Qian, Dui), (Kun, Gen), (Zhen, Li), (Xun, Kan)])
}

fn default_koui_multipliers() -> [f64; 6] { [0.9, 1.1, 0.8, 1.2, 1.3, 1.0] }
fn default_opposing_coefficient() -> f64 { -0.3 }
fn default_complementary_coefficient() -> f64 { 0.2 }

impl RelationalRuleset {
    /// Load from a `.toml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(TripleOsError::Io)?;

        let ruleset = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            other => {
                return Err(TripleOsError::Config(format!(
                    "Unsupported ruleset format {:?} for {}",
                    other,
                    path.display()
                )))
            }
        };

        tracing::debug!(
            path = %path.display(),
            opposing = ruleset.opposing.len(),
            complementary = ruleset.complementary.len(),
            situational = ruleset.situational.len(),
            "Loaded relational ruleset"
        );
        Ok(ruleset)
    }

    /// Parse TOML and validate
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let ruleset: Self = toml::from_str(content)
            .map_err(|e| TripleOsError::Data(format!("Failed to parse ruleset: {}", e)))?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    /// Parse JSON and validate
    pub fn from_json_str(content: &str) -> Result<Self> {
        let ruleset: Self = serde_json::from_str(content)
            .map_err(|e| TripleOsError::Data(format!("Failed to parse ruleset: {}", e)))?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    /// Reject non-finite factors
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.koui_multipliers.iter().position(|m| !m.is_finite()) {
            return Err(TripleOsError::Data(format!(
                "Koui multiplier for level {} is not finite",
                level + 1
            )));
        }
        if !self.opposing_coefficient.is_finite() || !self.complementary_coefficient.is_finite() {
            return Err(TripleOsError::Data(
                "Relational coefficients must be finite".into(),
            ));
        }
        for (question, modifiers) in &self.situational {
            if let Some((trigram, _)) = modifiers.iter().find(|(_, m)| !m.is_finite()) {
                return Err(TripleOsError::Data(format!(
                    "Situational modifier {}/{} is not finite",
                    question, trigram
                )));
            }
        }
        Ok(())
    }

    /// Opposing dimension, if any
    pub fn opposing_of(&self, trigram: Trigram) -> Option<Trigram> {
        self.opposing.get(&trigram).copied()
    }

    /// Complementary dimension, if any
    pub fn complementary_of(&self, trigram: Trigram) -> Option<Trigram> {
        self.complementary.get(&trigram).copied()
    }

    /// Target dimension and coefficient of a relational deepening
    ///
    /// `None` for plain tags and for dimensions the table does not cover.
    pub fn relation_target(&self, relation: RelationKind, trigram: Trigram) -> Option<(Trigram, f64)> {
        match relation {
            RelationKind::Plain => None,
            RelationKind::Conflicting => self
                .opposing_of(trigram)
                .map(|t| (t, self.opposing_coefficient)),
            RelationKind::Complementary => self
                .complementary_of(trigram)
                .map(|t| (t, self.complementary_coefficient)),
        }
    }

    /// Multiplier for a koui level
    pub fn koui_multiplier(&self, level: KouiLevel) -> f64 {
        self.koui_multipliers[(level.get() - KouiLevel::MIN) as usize]
    }

    /// Situational multiplier, 1.0 when absent
    pub fn situational_modifier(&self, question: &QuestionId, trigram: Trigram) -> f64 {
        self.situational
            .get(question)
            .and_then(|m| m.get(&trigram))
            .copied()
            .unwrap_or(1.0)
    }

    /// Set a situational multiplier
    pub fn with_situational(mut self, question: impl Into<QuestionId>, trigram: Trigram, modifier: f64) -> Self {
        self.situational
            .entry(question.into())
            .or_default()
            .insert(trigram, modifier);
        self
    }
}

/// A relational deepening that was requested but has no table entry
///
/// Recoverable: the adjustment is skipped and accumulation continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRelationalRule {
    /// Question whose tag requested the adjustment
    pub question_id: QuestionId,
    /// Tag dimension with no mapping
    pub dimension: Trigram,
    /// Requested relation
    pub relation: RelationKind,
}

impl std::fmt::Display for MissingRelationalRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no {} rule for dimension '{}' (question {})",
            self.relation, self.dimension, self.question_id
        )
    }
}
