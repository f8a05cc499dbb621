//! # Triple OS Orchestration
//!
//! Composes vector construction and candidate selection into the three
//! personality facets:
//!
//! | OS | Source answers | Situational | Excludes |
//! |----|----------------|-------------|----------|
//! | Engine | worldview | no | nothing |
//! | Interface | scenario, outer choice | yes | Engine OS id |
//! | SafeMode | scenario, inner choice | no | Engine OS id |
//!
//! Koui levels apply wherever an answer carries one.
//!
//! The Engine OS is resolved first because its chosen id feeds the other two
//! exclusion sets. If it fails, the whole analysis aborts; a partial
//! [`TripleOsResult`] is never returned.
//!
//! The orchestrator holds its tables behind `Arc` and never mutates them, so
//! one instance serves any number of threads. [`TripleOsOrchestrator::analyze_batch`]
//! fans independent submissions out over rayon.

pub use crate::questionnaire::TripleOsInput;

use crate::config::EngineConfig;
use crate::questionnaire::{ScenarioSide, SubmittedAnswer};
use crate::ruleset::{MissingRelationalRule, RelationalRuleset};
use crate::scoring::{
    CandidateScore, CandidateSelector, SelectionOptions, SimilarityEngine, VectorBuild, VectorBuilder,
};
use crate::store::HexagramVectorStore;
use crate::trigram::{DimensionShare, TraitVector};
use crate::{Result, TripleOsError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// The three personality facets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsKind {
    /// Core values
    Engine,
    /// Social presentation
    Interface,
    /// Stress response
    SafeMode,
}

impl std::fmt::Display for OsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Engine => "Engine",
            Self::Interface => "Interface",
            Self::SafeMode => "SafeMode",
        };
        write!(f, "{}", name)
    }
}

/// The top-ranked hexagram of one OS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenHexagram {
    /// Hexagram id
    pub id: u8,
    /// Hexagram name
    pub name: String,
}

/// Result for one OS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsResult {
    /// Which facet
    pub kind: OsKind,
    /// The user vector that was matched
    pub vector: TraitVector,
    /// Ranked candidates, best first, never empty
    pub candidates: Vec<CandidateScore>,
    /// First candidate
    pub chosen: ChosenHexagram,
    /// Strongest dimensions (Engine OS only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dominant: Vec<DimensionShare>,
}

/// A skipped relational adjustment and the OS build it happened in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// OS whose vector was being built
    pub os: OsKind,
    /// The missing rule
    pub missing: MissingRelationalRule,
}

/// Complete Triple OS analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripleOsResult {
    /// Core values
    pub engine_os: OsResult,
    /// Social presentation
    pub interface_os: OsResult,
    /// Stress response
    pub safe_mode_os: OsResult,
    /// Recoverable issues met while building vectors
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl TripleOsResult {
    /// The result for one OS
    pub fn os(&self, kind: OsKind) -> &OsResult {
        match kind {
            OsKind::Engine => &self.engine_os,
            OsKind::Interface => &self.interface_os,
            OsKind::SafeMode => &self.safe_mode_os,
        }
    }

    /// Pretty JSON for the rendering layer
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TripleOsError::Serialization(e.to_string()))
    }
}

/// Runs the Triple OS analysis against shared, read-only tables
#[derive(Debug, Clone)]
pub struct TripleOsOrchestrator {
    store: Arc<HexagramVectorStore>,
    builder: VectorBuilder,
    selector: CandidateSelector,
    config: EngineConfig,
}

impl TripleOsOrchestrator {
    /// Create with the default configuration
    pub fn new(store: Arc<HexagramVectorStore>, ruleset: Arc<RelationalRuleset>) -> Self {
        Self {
            store,
            builder: VectorBuilder::new(ruleset),
            selector: CandidateSelector::default(),
            config: EngineConfig::default(),
        }
    }

    /// Replace the configuration after validating it
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        self.selector = CandidateSelector::new(SimilarityEngine::new(config.scoring));
        self.config = config;
        Ok(self)
    }

    /// Configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reference store
    pub fn store(&self) -> &HexagramVectorStore {
        &self.store
    }

    /// Partition a raw submission with the configured ranges, then analyze it
    pub fn analyze_submission(
        &self,
        answers: impl IntoIterator<Item = SubmittedAnswer>,
    ) -> Result<TripleOsResult> {
        let input = TripleOsInput::from_submission(answers, &self.config.partition);
        self.analyze(&input)
    }

    /// Compute all three OS results
    pub fn analyze(&self, input: &TripleOsInput) -> Result<TripleOsResult> {
        let mut diagnostics = Vec::new();

        let engine_build = self.builder.build_vector(&input.worldview);
        let mut engine_os = self.resolve(
            OsKind::Engine,
            engine_build,
            SelectionOptions::top(self.config.selection.top_n),
            &mut diagnostics,
        )?;
        engine_os.dominant = engine_os.vector.dominant(self.config.profile.dominant_trigrams);

        let engine_id = engine_os.chosen.id;
        let exclude_engine = SelectionOptions::top(self.config.selection.top_n).excluding(engine_id);

        let interface_build = self
            .builder
            .build_scenario_vector(&input.scenario, ScenarioSide::Outer);
        let interface_os = self.resolve(
            OsKind::Interface,
            interface_build,
            exclude_engine.clone(),
            &mut diagnostics,
        )?;

        let safe_mode_build = self
            .builder
            .build_scenario_vector(&input.scenario, ScenarioSide::Inner);
        let safe_mode_os = self.resolve(
            OsKind::SafeMode,
            safe_mode_build,
            exclude_engine,
            &mut diagnostics,
        )?;

        info!(
            engine = engine_id,
            interface = interface_os.chosen.id,
            safe_mode = safe_mode_os.chosen.id,
            diagnostics = diagnostics.len(),
            "Triple OS analysis complete"
        );

        Ok(TripleOsResult {
            engine_os,
            interface_os,
            safe_mode_os,
            diagnostics,
        })
    }

    /// Analyze independent submissions in parallel, keeping input order
    pub fn analyze_batch(&self, inputs: &[TripleOsInput]) -> Vec<Result<TripleOsResult>> {
        inputs.par_iter().map(|input| self.analyze(input)).collect()
    }

    fn resolve(
        &self,
        kind: OsKind,
        build: VectorBuild,
        options: SelectionOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<OsResult> {
        diagnostics.extend(
            build
                .warnings
                .into_iter()
                .map(|missing| Diagnostic { os: kind, missing }),
        );

        let candidates = self
            .selector
            .select_candidates(&build.vector, &self.store, &options)
            .map_err(|e| TripleOsError::Os {
                kind,
                source: Box::new(e),
            })?;

        // Selection never returns an empty list
        let best = candidates[0].hexagram_id;
        let name = self
            .store
            .get(best)
            .map(|e| e.name.clone())
            .unwrap_or_default();
        debug!(os = %kind, chosen = best, "Resolved OS");

        Ok(OsResult {
            kind,
            vector: build.vector,
            candidates,
            chosen: ChosenHexagram { id: best, name },
            dominant: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{AnsweredQuestion, Choice, KouiLevel, ScenarioAnswer, ScoringTag};
    use crate::store::HexagramEntry;
    use crate::trigram::Trigram;
    use std::collections::BTreeMap;

    /// One pure hexagram per trigram, each pointing along its own dimension
    fn pure_store() -> Arc<HexagramVectorStore> {
        let ids = [
            (1, Trigram::Qian),
            (58, Trigram::Dui),
            (30, Trigram::Li),
            (51, Trigram::Zhen),
            (57, Trigram::Xun),
            (29, Trigram::Kan),
            (52, Trigram::Gen),
            (2, Trigram::Kun),
        ];
        let entries = ids
            .into_iter()
            .map(|(id, t)| HexagramEntry::canonical(id, TraitVector::from_pairs([(t, 8.0)])).unwrap())
            .collect();
        Arc::new(HexagramVectorStore::new(entries).unwrap())
    }

    fn orchestrator() -> TripleOsOrchestrator {
        TripleOsOrchestrator::new(pure_store(), Arc::new(RelationalRuleset::default()))
    }

    fn worldview(trigram: Trigram) -> Vec<AnsweredQuestion> {
        (1..=3)
            .map(|i| AnsweredQuestion::new(format!("q{}", i).as_str(), vec![ScoringTag::plain(trigram, 3.0)]))
            .collect()
    }

    fn scenario(outer: Trigram, inner: Trigram) -> Vec<ScenarioAnswer> {
        vec![ScenarioAnswer::new(
            "q25",
            Some(Choice::new(vec![ScoringTag::plain(outer, 2.0)])),
            Some(Choice::new(vec![ScoringTag::plain(inner, 2.0)])),
        )]
    }

    #[test]
    fn test_three_distinct_facets() {
        let input = TripleOsInput::new(worldview(Trigram::Qian), scenario(Trigram::Li, Trigram::Gen));
        let result = orchestrator().analyze(&input).unwrap();

        assert_eq!(result.engine_os.chosen.id, 1);
        assert_eq!(result.engine_os.chosen.name, "乾為天");
        assert_eq!(result.interface_os.chosen.id, 30);
        assert_eq!(result.safe_mode_os.chosen.id, 52);
        assert_eq!(result.engine_os.candidates.len(), 4);
        assert!(result.diagnostics.is_empty());

        assert_eq!(result.engine_os.dominant.len(), 3);
        assert_eq!(result.engine_os.dominant[0].trigram, Trigram::Qian);
        assert_eq!(result.engine_os.dominant[0].percentage, 100.0);
        assert!(result.interface_os.dominant.is_empty());
    }

    #[test]
    fn test_interface_and_safe_mode_exclude_engine() {
        // Scenario answers point at the same hexagram as the worldview
        let input = TripleOsInput::new(worldview(Trigram::Kan), scenario(Trigram::Kan, Trigram::Kan));
        let result = orchestrator().analyze(&input).unwrap();

        assert_eq!(result.engine_os.chosen.id, 29);
        for kind in [OsKind::Interface, OsKind::SafeMode] {
            let os = result.os(kind);
            assert_ne!(os.chosen.id, 29);
            assert!(os.candidates.iter().all(|c| c.hexagram_id != 29));
        }
    }

    #[test]
    fn test_situational_modifier_only_on_interface() {
        let rules = RelationalRuleset::default().with_situational("q25", Trigram::Zhen, 3.0);
        let orchestrator = TripleOsOrchestrator::new(pure_store(), Arc::new(rules));

        let choice = Choice::new(vec![
            ScoringTag::plain(Trigram::Zhen, 1.0),
            ScoringTag::plain(Trigram::Xun, 2.0),
        ]);
        let input = TripleOsInput::new(
            worldview(Trigram::Qian),
            vec![ScenarioAnswer::new("q25", Some(choice.clone()), Some(choice))],
        );

        let result = orchestrator.analyze(&input).unwrap();
        assert_eq!(result.interface_os.chosen.id, 51);
        assert_eq!(result.safe_mode_os.chosen.id, 57);
    }

    #[test]
    fn test_inner_koui_changes_safe_mode() {
        let inner = |koui: Option<KouiLevel>| {
            let mut gen = Choice::new(vec![ScoringTag::plain(Trigram::Gen, 1.0)]);
            gen.koui_level = koui;
            vec![
                ScenarioAnswer::new("q25", None, Some(gen)),
                ScenarioAnswer::new(
                    "q26",
                    None,
                    Some(Choice::new(vec![ScoringTag::plain(Trigram::Kun, 1.2)])),
                ),
            ]
        };
        let orchestrator = orchestrator();

        let plain = orchestrator
            .analyze(&TripleOsInput::new(worldview(Trigram::Qian), inner(None)))
            .unwrap();
        assert_eq!(plain.safe_mode_os.chosen.id, 2);

        // Level 5 lifts gen from 1.0 to 1.3, past kun at 1.2
        let lifted = orchestrator
            .analyze(&TripleOsInput::new(
                worldview(Trigram::Qian),
                inner(Some(KouiLevel::new(5).unwrap())),
            ))
            .unwrap();
        assert_eq!(lifted.safe_mode_os.chosen.id, 52);
        assert!((lifted.safe_mode_os.vector[Trigram::Gen] - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_engine_failure_aborts() {
        let empty = Arc::new(HexagramVectorStore::new(Vec::new()).unwrap());
        let orchestrator = TripleOsOrchestrator::new(empty, Arc::new(RelationalRuleset::default()));

        let err = orchestrator
            .analyze(&TripleOsInput::new(worldview(Trigram::Qian), Vec::new()))
            .unwrap_err();
        match err {
            TripleOsError::Os { kind, source } => {
                assert_eq!(kind, OsKind::Engine);
                assert!(matches!(*source, TripleOsError::NoValidCandidates(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_entry_store_fails_interface() {
        let store = Arc::new(
            HexagramVectorStore::new(vec![HexagramEntry::canonical(
                1,
                TraitVector::from_pairs([(Trigram::Qian, 8.0)]),
            )
            .unwrap()])
            .unwrap(),
        );
        let orchestrator = TripleOsOrchestrator::new(store, Arc::new(RelationalRuleset::default()));

        let err = orchestrator
            .analyze(&TripleOsInput::new(worldview(Trigram::Qian), scenario(Trigram::Li, Trigram::Gen)))
            .unwrap_err();
        assert!(matches!(err, TripleOsError::Os { kind: OsKind::Interface, .. }));
    }

    #[test]
    fn test_missing_rules_surface_as_diagnostics() {
        let rules = RelationalRuleset {
            complementary: BTreeMap::new(),
            ..RelationalRuleset::default()
        };
        let orchestrator = TripleOsOrchestrator::new(pure_store(), Arc::new(rules));
        let input = TripleOsInput::new(
            vec![AnsweredQuestion::new("q1", vec![ScoringTag::complementary(Trigram::Qian, 2.0)])],
            vec![ScenarioAnswer::new(
                "q25",
                None,
                Some(Choice::new(vec![ScoringTag::complementary(Trigram::Gen, 1.0)])),
            )],
        );

        let result = orchestrator.analyze(&input).unwrap();
        let kinds: Vec<OsKind> = result.diagnostics.iter().map(|d| d.os).collect();
        assert_eq!(kinds, vec![OsKind::Engine, OsKind::SafeMode]);
        assert_eq!(result.diagnostics[1].missing.dimension, Trigram::Gen);
    }

    #[test]
    fn test_config_applies() {
        let mut config = EngineConfig::default();
        config.selection.top_n = 2;
        config.profile.dominant_trigrams = 1;
        let orchestrator = orchestrator().with_config(config).unwrap();

        let result = orchestrator
            .analyze(&TripleOsInput::new(worldview(Trigram::Dui), scenario(Trigram::Li, Trigram::Gen)))
            .unwrap();
        assert_eq!(result.engine_os.candidates.len(), 2);
        assert_eq!(result.engine_os.dominant.len(), 1);

        let mut bad = EngineConfig::default();
        bad.selection.top_n = 0;
        assert!(orchestrator.with_config(bad).is_err());
    }

    #[test]
    fn test_analyze_submission_partitions() {
        let answers = vec![
            SubmittedAnswer {
                question_id: "q1".into(),
                scoring_tags: vec![ScoringTag::plain(Trigram::Zhen, 3.0)],
                koui_level: None,
                outer_choice: None,
                inner_choice: None,
            },
            SubmittedAnswer {
                question_id: "q25".into(),
                scoring_tags: Vec::new(),
                koui_level: None,
                outer_choice: Some(Choice::new(vec![ScoringTag::plain(Trigram::Kun, 1.0)])),
                inner_choice: Some(Choice::new(vec![ScoringTag::plain(Trigram::Kan, 1.0)])),
            },
        ];

        let result = orchestrator().analyze_submission(answers).unwrap();
        assert_eq!(result.engine_os.chosen.id, 51);
        assert_eq!(result.interface_os.chosen.id, 2);
        assert_eq!(result.safe_mode_os.chosen.id, 29);
    }

    #[test]
    fn test_batch_keeps_order() {
        let inputs: Vec<TripleOsInput> = [Trigram::Qian, Trigram::Kun, Trigram::Li, Trigram::Gen]
            .into_iter()
            .map(|t| TripleOsInput::new(worldview(t), scenario(Trigram::Xun, Trigram::Dui)))
            .collect();

        let orchestrator = orchestrator();
        let results = orchestrator.analyze_batch(&inputs);
        let engine_ids: Vec<u8> = results
            .iter()
            .map(|r| r.as_ref().unwrap().engine_os.chosen.id)
            .collect();
        assert_eq!(engine_ids, vec![1, 2, 30, 52]);

        // Same answers, same output
        let sequential = orchestrator.analyze(&inputs[0]).unwrap();
        assert_eq!(results[0].as_ref().unwrap(), &sequential);
    }

    #[test]
    fn test_result_json_shape() {
        let input = TripleOsInput::new(worldview(Trigram::Qian), scenario(Trigram::Li, Trigram::Gen));
        let json = orchestrator().analyze(&input).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["engine_os"]["chosen"]["id"], 1);
        assert_eq!(value["engine_os"]["kind"], "engine");
        assert_eq!(value["safe_mode_os"]["kind"], "safe_mode");
        assert_eq!(value["engine_os"]["vector"]["qian"], 9.0);
        assert!(value["interface_os"].get("dominant").is_none());
    }

    #[test]
    fn test_orchestrator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TripleOsOrchestrator>();
    }
}
