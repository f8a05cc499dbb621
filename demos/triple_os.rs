//! End-to-end Triple OS analysis
//!
//! Demonstrates: store → ruleset → answers → three OS results → line reading
//!
//! Run with:
//! ```bash
//! cargo run --example triple_os
//! ```

use std::sync::Arc;
use triple_os_engine::prelude::*;
use triple_os_engine::store::KING_WEN;

fn main() -> anyhow::Result<()> {
    // 1. Reference vectors
    //
    // A real deployment loads calibrated vectors with HexagramVectorStore::load.
    // Here each hexagram leans 5 toward its upper trigram and 3 toward its lower.
    let entries = KING_WEN
        .iter()
        .map(|h| {
            HexagramEntry::new(
                h.id,
                h.name,
                TraitVector::from_pairs([(h.upper, 5.0), (h.lower, 3.0)]),
            )
        })
        .collect();
    let store = Arc::new(HexagramVectorStore::new(entries)?);

    // 2. Relational tables, with one situational tweak
    let ruleset = Arc::new(RelationalRuleset::default().with_situational("q25", Trigram::Li, 1.3));

    let orchestrator = TripleOsOrchestrator::new(store.clone(), ruleset);

    // 3. Answers
    let worldview = vec![
        AnsweredQuestion::new(
            "q1",
            vec![
                ScoringTag::plain(Trigram::Qian, 3.0),
                ScoringTag::conflicting(Trigram::Kan, 1.0),
            ],
        ),
        AnsweredQuestion::new(
            "q2",
            vec![ScoringTag::complementary(Trigram::Qian, 2.0)],
        )
        .with_koui(KouiLevel::new(5)?),
        AnsweredQuestion::new("q3", vec![ScoringTag::plain(Trigram::Zhen, 1.5)]),
    ];

    let scenario = vec![
        ScenarioAnswer::new(
            "q25",
            Some(Choice::new(vec![ScoringTag::plain(Trigram::Li, 2.0)])),
            Some(Choice::new(vec![ScoringTag::plain(Trigram::Gen, 2.0)]).with_koui(KouiLevel::new(1)?)),
        ),
        ScenarioAnswer::new(
            "q26",
            Some(Choice::new(vec![ScoringTag::complementary(Trigram::Dui, 1.0)])),
            Some(Choice::new(vec![ScoringTag::plain(Trigram::Kun, 1.0)])),
        ),
    ];

    // 4. Analyze
    let result = orchestrator.analyze(&TripleOsInput::new(worldview, scenario))?;

    for kind in [OsKind::Engine, OsKind::Interface, OsKind::SafeMode] {
        let os = result.os(kind);
        println!("\n--- {} OS: {} ({}) ---", kind, os.chosen.name, os.chosen.id);
        for candidate in &os.candidates {
            println!(
                "  #{:<2}  final {:.3}  similarity {:.3}  activation {:.3}",
                candidate.hexagram_id, candidate.final_score, candidate.similarity, candidate.activation
            );
        }
    }

    println!("\nDominant trigrams:");
    for share in &result.engine_os.dominant {
        println!(
            "  {} {} {:>5.1}%",
            share.trigram.symbol(),
            share.trigram.trait_name(),
            share.percentage
        );
    }

    // 5. Line structure of the Engine OS hexagram
    if let Some(lines) = store.get(result.engine_os.chosen.id).and_then(HexagramEntry::lines) {
        let adjusted = apply_line_adjustment(&lines, &result.engine_os.vector);
        println!(
            "\nLine reading: {} resonant pairs, centre bonus {:.2}",
            adjusted.relationships.resonant_count(),
            adjusted.relationships.centrality.bonus()
        );
    }

    Ok(())
}
