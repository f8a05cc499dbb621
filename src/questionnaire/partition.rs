//! Worldview / scenario partitioning of a submission

use super::{AnsweredQuestion, ScenarioAnswer, SubmittedAnswer};
use crate::{Result, TripleOsError};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// Question-number ranges for each answer subset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Single-choice value questions (Engine OS)
    #[serde(default = "default_worldview")]
    pub worldview: RangeInclusive<u32>,

    /// Two-sided scenario questions (Interface and SafeMode OS)
    #[serde(default = "default_scenario")]
    pub scenario: RangeInclusive<u32>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            worldview: default_worldview(),
            scenario: default_scenario(),
        }
    }
}

fn default_worldview() -> RangeInclusive<u32> { 1..=24 }
fn default_scenario() -> RangeInclusive<u32> { 25..=30 }

impl PartitionConfig {
    /// Check that both ranges are non-empty and disjoint
    pub fn validate(&self) -> Result<()> {
        if self.worldview.is_empty() || self.scenario.is_empty() {
            return Err(TripleOsError::Config(
                "Partition ranges must not be empty".into(),
            ));
        }
        let overlaps = self.worldview.start() <= self.scenario.end()
            && self.scenario.start() <= self.worldview.end();
        if overlaps {
            return Err(TripleOsError::Config(format!(
                "Worldview range {:?} overlaps scenario range {:?}",
                self.worldview, self.scenario
            )));
        }
        Ok(())
    }
}

/// Answers split into the two subsets the Triple OS analysis consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripleOsInput {
    /// Worldview answers, Engine OS source
    pub worldview: Vec<AnsweredQuestion>,
    /// Scenario answers, Interface and SafeMode OS source
    pub scenario: Vec<ScenarioAnswer>,
}

impl TripleOsInput {
    /// Create from already partitioned answers
    pub fn new(worldview: Vec<AnsweredQuestion>, scenario: Vec<ScenarioAnswer>) -> Self {
        Self { worldview, scenario }
    }

    /// Partition a raw submission by question number
    ///
    /// Answers whose id is not `q<N>`, or whose number falls in neither
    /// range, are dropped. Submission order is kept within each subset.
    pub fn from_submission(
        answers: impl IntoIterator<Item = SubmittedAnswer>,
        partition: &PartitionConfig,
    ) -> Self {
        let mut input = Self::default();

        for answer in answers {
            let Some(number) = answer.question_id.number() else {
                warn!(question = %answer.question_id, "Skipping answer with unnumbered question id");
                continue;
            };

            if partition.worldview.contains(&number) {
                input.worldview.push(AnsweredQuestion {
                    question_id: answer.question_id,
                    scoring_tags: answer.scoring_tags,
                    koui_level: answer.koui_level,
                });
            } else if partition.scenario.contains(&number) {
                if !answer.scoring_tags.is_empty() {
                    debug!(question = %answer.question_id, "Ignoring top-level tags on scenario answer");
                }
                input.scenario.push(ScenarioAnswer {
                    question_id: answer.question_id,
                    outer_choice: answer.outer_choice,
                    inner_choice: answer.inner_choice,
                });
            } else {
                warn!(question = %answer.question_id, "Skipping answer outside worldview and scenario ranges");
            }
        }

        debug!(
            worldview = input.worldview.len(),
            scenario = input.scenario.len(),
            "Partitioned submission"
        );
        input
    }
}
