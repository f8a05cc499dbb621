//! Ranked candidate selection over the hexagram store

use super::similarity::SimilarityEngine;
use crate::store::HexagramVectorStore;
use crate::trigram::TraitVector;
use crate::{Result, TripleOsError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Default number of candidates returned
pub const DEFAULT_TOP_N: usize = 4;

/// Exclusions and result size for one selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOptions {
    /// Hexagram ids never returned
    pub exclude: BTreeSet<u8>,
    /// Maximum number of candidates
    pub top_n: usize,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            exclude: BTreeSet::new(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl SelectionOptions {
    /// Options returning at most `top_n` candidates
    pub fn top(top_n: usize) -> Self {
        Self {
            top_n,
            ..Self::default()
        }
    }

    /// Also exclude `id`
    pub fn excluding(mut self, id: u8) -> Self {
        self.exclude.insert(id);
        self
    }
}

/// One ranked hexagram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Hexagram id
    pub hexagram_id: u8,
    /// Weighted blend of similarity and activation
    pub final_score: f64,
    /// Cosine similarity
    pub similarity: f64,
    /// Magnitude ratio score
    pub activation: f64,
}

/// Scores a user vector against every eligible store entry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandidateSelector {
    engine: SimilarityEngine,
}

impl CandidateSelector {
    /// Create over a similarity engine
    pub fn new(engine: SimilarityEngine) -> Self {
        Self { engine }
    }

    /// The similarity engine in use
    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    /// Top candidates, best first
    ///
    /// Ordering is final score descending, then hexagram id ascending.
    /// Entries with a non-finite score are skipped. Fails with `NoValidCandidates` when
    /// nothing scoreable remains, never returns an empty list.
    pub fn select_candidates(
        &self,
        user: &TraitVector,
        store: &HexagramVectorStore,
        options: &SelectionOptions,
    ) -> Result<Vec<CandidateScore>> {
        if options.top_n == 0 {
            return Err(TripleOsError::Config("top_n must be at least 1".into()));
        }
        if store.is_empty() {
            return Err(TripleOsError::NoValidCandidates(
                "hexagram store is empty".into(),
            ));
        }

        let mut eligible = 0usize;
        let mut candidates: Vec<CandidateScore> = Vec::with_capacity(store.len());

        for entry in store.iter().filter(|e| !options.exclude.contains(&e.id)) {
            eligible += 1;
            let score = self.engine.score(user, &entry.vector);
            if !score.final_score.is_finite() {
                warn!(hexagram = entry.id, "Skipping candidate with invalid score");
                continue;
            }
            candidates.push(CandidateScore {
                hexagram_id: entry.id,
                final_score: score.final_score,
                similarity: score.similarity,
                activation: score.activation,
            });
        }

        if candidates.is_empty() {
            let reason = if eligible == 0 {
                format!("all {} hexagrams excluded", store.len())
            } else {
                format!("none of {} eligible hexagrams produced a valid score", eligible)
            };
            return Err(TripleOsError::NoValidCandidates(reason));
        }

        // partial_cmp so that 0.0 and -0.0 tie and fall through to the id
        candidates.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.hexagram_id.cmp(&b.hexagram_id))
        });
        candidates.truncate(options.top_n);

        debug!(
            eligible,
            returned = candidates.len(),
            best = candidates[0].hexagram_id,
            "Selected candidates"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::HexagramEntry;
    use crate::trigram::Trigram;
    use proptest::prelude::*;

    fn store(entries: &[(u8, Trigram, f64)]) -> HexagramVectorStore {
        HexagramVectorStore::new(
            entries
                .iter()
                .map(|&(id, t, v)| HexagramEntry::canonical(id, TraitVector::from_pairs([(t, v)])).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_qian_answers_rank_qian_first() {
        let store = store(&[(1, Trigram::Qian, 8.0), (2, Trigram::Kun, 8.0)]);
        let user = TraitVector::from_pairs([(Trigram::Qian, 9.0)]);

        let ranked = CandidateSelector::default()
            .select_candidates(&user, &store, &SelectionOptions::default())
            .unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].hexagram_id, 1);
        assert_eq!(ranked[1].hexagram_id, 2);
        assert!(ranked[0].final_score > ranked[1].final_score);
    }

    #[test]
    fn test_top_n_truncates() {
        let store = store(&[
            (1, Trigram::Qian, 8.0),
            (2, Trigram::Kun, 8.0),
            (29, Trigram::Kan, 8.0),
            (30, Trigram::Li, 8.0),
            (51, Trigram::Zhen, 8.0),
            (57, Trigram::Xun, 8.0),
        ]);
        let user = TraitVector::from_pairs([(Trigram::Li, 2.0)]);
        let selector = CandidateSelector::default();

        let ranked = selector
            .select_candidates(&user, &store, &SelectionOptions::default())
            .unwrap();
        assert_eq!(ranked.len(), DEFAULT_TOP_N);
        assert_eq!(ranked[0].hexagram_id, 30);

        let one = selector
            .select_candidates(&user, &store, &SelectionOptions::top(1))
            .unwrap();
        assert_eq!(one.len(), 1);

        assert!(matches!(
            selector.select_candidates(&user, &store, &SelectionOptions::top(0)),
            Err(TripleOsError::Config(_))
        ));
    }

    #[test]
    fn test_ties_break_by_id() {
        // Every orthogonal entry has the same magnitude, so the same score
        let store = store(&[
            (52, Trigram::Gen, 8.0),
            (2, Trigram::Kun, 8.0),
            (29, Trigram::Kan, 8.0),
            (1, Trigram::Qian, 8.0),
        ]);
        let user = TraitVector::from_pairs([(Trigram::Dui, 8.0)]);

        let ranked = CandidateSelector::default()
            .select_candidates(&user, &store, &SelectionOptions::default())
            .unwrap();
        let ids: Vec<u8> = ranked.iter().map(|c| c.hexagram_id).collect();
        assert_eq!(ids, vec![1, 2, 29, 52]);
    }

    #[test]
    fn test_empty_store_fails() {
        let empty = HexagramVectorStore::new(Vec::new()).unwrap();
        let err = CandidateSelector::default()
            .select_candidates(&TraitVector::zeros(), &empty, &SelectionOptions::default())
            .unwrap_err();
        assert!(matches!(err, TripleOsError::NoValidCandidates(_)));
    }

    #[test]
    fn test_everything_excluded_fails() {
        let store = store(&[(1, Trigram::Qian, 8.0)]);
        let err = CandidateSelector::default()
            .select_candidates(
                &TraitVector::from_pairs([(Trigram::Qian, 1.0)]),
                &store,
                &SelectionOptions::default().excluding(1),
            )
            .unwrap_err();
        assert!(matches!(err, TripleOsError::NoValidCandidates(_)));
    }

    #[test]
    fn test_nan_user_vector_fails() {
        let store = store(&[(1, Trigram::Qian, 8.0), (2, Trigram::Kun, 8.0)]);
        let mut user = TraitVector::zeros();
        user[Trigram::Qian] = f64::NAN;

        let err = CandidateSelector::default()
            .select_candidates(&user, &store, &SelectionOptions::default())
            .unwrap_err();
        assert!(matches!(err, TripleOsError::NoValidCandidates(_)));
    }

    #[test]
    fn test_zero_user_vector_ranks_by_id() {
        let store = store(&[(3, Trigram::Kan, 1.0), (1, Trigram::Qian, 8.0)]);
        let ranked = CandidateSelector::default()
            .select_candidates(&TraitVector::zeros(), &store, &SelectionOptions::default())
            .unwrap();
        assert!(ranked.iter().all(|c| c.final_score == 0.0));
        assert_eq!(ranked[0].hexagram_id, 1);
    }

    fn full_store_strategy() -> impl Strategy<Value = HexagramVectorStore> {
        prop::collection::vec(prop::array::uniform8(-10.0f64..10.0), 64).prop_map(|vectors| {
            let entries = vectors
                .into_iter()
                .zip(1u8..)
                .map(|(v, id)| HexagramEntry::new(id, format!("h{}", id), TraitVector::from_array(v)))
                .collect();
            HexagramVectorStore::new(entries).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_exclusion_respected(
            store in full_store_strategy(),
            user in prop::array::uniform8(-10.0f64..10.0),
            excluded in 1u8..=64,
        ) {
            let user = TraitVector::from_array(user);
            let options = SelectionOptions::top(64).excluding(excluded);
            let ranked = CandidateSelector::default()
                .select_candidates(&user, &store, &options)
                .unwrap();

            prop_assert_eq!(ranked.len(), 63);
            prop_assert!(ranked.iter().all(|c| c.hexagram_id != excluded));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].final_score >= pair[1].final_score);
            }
        }
    }
}
