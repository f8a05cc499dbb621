//! Answer → trait vector construction

use crate::questionnaire::{
    AnsweredQuestion, KouiLevel, QuestionId, RelationKind, ScenarioAnswer, ScenarioSide, ScoringTag,
};
use crate::ruleset::{MissingRelationalRule, RelationalRuleset};
use crate::trigram::TraitVector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// A built vector plus the relational rules it could not apply
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorBuild {
    /// Accumulated trait vector
    pub vector: TraitVector,
    /// Skipped relational adjustments, in encounter order
    pub warnings: Vec<MissingRelationalRule>,
}

/// Builds trait vectors from answers against an injected ruleset
///
/// Stateless apart from the shared ruleset: identical answers always give a
/// bit-identical vector.
#[derive(Debug, Clone)]
pub struct VectorBuilder {
    ruleset: Arc<RelationalRuleset>,
}

impl VectorBuilder {
    /// Create a builder over a shared ruleset
    pub fn new(ruleset: Arc<RelationalRuleset>) -> Self {
        Self { ruleset }
    }

    /// The ruleset in use
    pub fn ruleset(&self) -> &RelationalRuleset {
        &self.ruleset
    }

    /// Build from worldview answers
    pub fn build_vector(&self, answers: &[AnsweredQuestion]) -> VectorBuild {
        let mut build = VectorBuild::default();
        for answer in answers {
            self.accumulate(
                &mut build,
                &answer.question_id,
                &answer.scoring_tags,
                answer.koui_level,
                false,
            );
        }
        debug!(answers = answers.len(), "Built worldview vector");
        build
    }

    /// Build from one side of scenario answers
    ///
    /// The outer side scales base weights by the situational modifiers of
    /// each question; the inner side does not. Answers without the requested
    /// side contribute nothing.
    pub fn build_scenario_vector(&self, answers: &[ScenarioAnswer], side: ScenarioSide) -> VectorBuild {
        let situational = side == ScenarioSide::Outer;
        let mut build = VectorBuild::default();

        for answer in answers {
            let Some(choice) = answer.choice(side) else {
                continue;
            };
            self.accumulate(
                &mut build,
                &answer.question_id,
                &choice.scoring_tags,
                choice.koui_level,
                situational,
            );
        }
        debug!(answers = answers.len(), ?side, "Built scenario vector");
        build
    }

    fn accumulate(
        &self,
        build: &mut VectorBuild,
        question_id: &QuestionId,
        tags: &[ScoringTag],
        koui_level: Option<KouiLevel>,
        situational: bool,
    ) {
        let rules = &self.ruleset;

        for tag in tags {
            let Some(trigram) = tag.dimension.trigram() else {
                debug!(question = %question_id, dimension = %tag.dimension, "Ignoring unrecognized dimension");
                continue;
            };

            let base = if situational {
                tag.weight * rules.situational_modifier(question_id, trigram)
            } else {
                tag.weight
            };
            build.vector.add(trigram, base);

            // Deepening and koui read the unmodified tag weight
            match rules.relation_target(tag.relation, trigram) {
                Some((target, coefficient)) => {
                    build.vector.add(target, coefficient * tag.weight.abs());
                }
                None if tag.relation != RelationKind::Plain => {
                    let missing = MissingRelationalRule {
                        question_id: question_id.clone(),
                        dimension: trigram,
                        relation: tag.relation,
                    };
                    warn!(%missing, "Skipping relational adjustment");
                    build.warnings.push(missing);
                }
                None => {}
            }

            if let Some(level) = koui_level {
                build
                    .vector
                    .add(trigram, (rules.koui_multiplier(level) - 1.0) * tag.weight);
            }
        }
    }
}
