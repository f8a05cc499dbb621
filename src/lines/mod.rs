//! # Six-Line Analysis
//!
//! Structural reading of a hexagram's six lines (爻), bottom to top, and the
//! line-position adjustment of a trait vector.
//!
//! ## Relationships
//!
//! | Relation | Lines | Rule |
//! |----------|-------|------|
//! | Correspondence (応/敵) | 1-4, 2-5, 3-6 | resonant when yin/yang differ |
//! | Adjacency (比) | neighbours | complementary when yin/yang differ |
//! | Centrality (中) | 2, 5 | line 2 yin and line 5 yang are correct |
//! | Correctness (正) | all | odd positions yang, even positions yin |
//!
//! ## Adjustment
//!
//! [`apply_line_adjustment`] scales each dimension per line by a position
//! factor and a position-to-dimension influence, then adds flat bonuses for
//! every resonant correspondence and for correct central lines.

use crate::trigram::{TraitVector, Trigram, DIMENSIONS};
use crate::{Result, TripleOsError};
use serde::{Deserialize, Serialize};

/// Number of lines in a hexagram
pub const LINE_COUNT: usize = 6;

// ============================================================================
// Lines and positions
// ============================================================================

/// A single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Line {
    /// Broken line (0)
    Yin,
    /// Solid line (1)
    Yang,
}

impl TryFrom<u8> for Line {
    type Error = TripleOsError;

    fn try_from(bit: u8) -> Result<Self> {
        match bit {
            0 => Ok(Self::Yin),
            1 => Ok(Self::Yang),
            other => Err(TripleOsError::Data(format!("Line must be 0 or 1, got {}", other))),
        }
    }
}

impl From<Line> for u8 {
    fn from(line: Line) -> u8 {
        match line {
            Line::Yin => 0,
            Line::Yang => 1,
        }
    }
}

/// Position of a line, bottom (初) to top (上)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePosition {
    /// 初爻 - foundation
    First,
    /// 二爻 - lower centre
    Second,
    /// 三爻 - transition
    Third,
    /// 四爻 - minister
    Fourth,
    /// 五爻 - ruler, upper centre
    Fifth,
    /// 上爻 - completion
    Top,
}

impl LinePosition {
    /// Positions bottom to top
    pub const ALL: [LinePosition; LINE_COUNT] = [
        Self::First,
        Self::Second,
        Self::Third,
        Self::Fourth,
        Self::Fifth,
        Self::Top,
    ];

    /// 1-based position number
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Traditional name
    pub const fn name(self) -> &'static str {
        match self {
            Self::First => "初爻",
            Self::Second => "二爻",
            Self::Third => "三爻",
            Self::Fourth => "四爻",
            Self::Fifth => "五爻",
            Self::Top => "上爻",
        }
    }

    /// Line expected at this position for it to be correct (正位)
    pub const fn expected_line(self) -> Line {
        if self.number() % 2 == 1 {
            Line::Yang
        } else {
            Line::Yin
        }
    }

    /// Weight of the position: the centres (2, 5) count most, 3 is the danger line
    pub const fn importance(self) -> f64 {
        match self {
            Self::First => 1.0,
            Self::Second => 1.2,
            Self::Third => 0.9,
            Self::Fourth => 1.1,
            Self::Fifth => 1.3,
            Self::Top => 1.0,
        }
    }

    /// How strongly this position colours one dimension
    pub fn influence(self, trigram: Trigram) -> f64 {
        POSITION_INFLUENCE[self as usize][trigram.index()]
    }
}

/// Position × dimension influence, dimensions in trigram order
/// (qian, dui, li, zhen, xun, kan, gen, kun)
const POSITION_INFLUENCE: [[f64; DIMENSIONS]; LINE_COUNT] = [
    [0.10, 0.10, 0.05, 0.05, 0.10, 0.10, 0.30, 0.20],
    [0.05, 0.25, 0.05, 0.05, 0.20, 0.10, 0.10, 0.30],
    [0.10, 0.02, 0.15, 0.20, 0.10, 0.30, 0.10, 0.03],
    [0.01, 0.20, 0.10, 0.01, 0.30, 0.03, 0.10, 0.25],
    [0.35, 0.05, 0.25, 0.20, 0.03, 0.10, 0.01, 0.01],
    [0.01, 0.20, 0.08, 0.01, 0.10, 0.05, 0.30, 0.25],
];

const CORRECT_FACTOR: f64 = 1.1;
const INCORRECT_FACTOR: f64 = 0.9;
const LOWER_CENTRE_BONUS: f64 = 0.03;
const UPPER_CENTRE_BONUS: f64 = 0.05;

/// The three lines of a trigram, bottom to top
pub const fn trigram_lines(trigram: Trigram) -> [Line; 3] {
    use Line::{Yang, Yin};
    match trigram {
        Trigram::Qian => [Yang, Yang, Yang],
        Trigram::Dui => [Yang, Yang, Yin],
        Trigram::Li => [Yang, Yin, Yang],
        Trigram::Zhen => [Yang, Yin, Yin],
        Trigram::Xun => [Yin, Yang, Yang],
        Trigram::Kan => [Yin, Yang, Yin],
        Trigram::Gen => [Yin, Yin, Yang],
        Trigram::Kun => [Yin, Yin, Yin],
    }
}

// ============================================================================
// Hexagram lines
// ============================================================================

/// Six lines, bottom to top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexagramLines([Line; LINE_COUNT]);

impl HexagramLines {
    /// Create from lines ordered bottom to top
    pub const fn new(lines: [Line; LINE_COUNT]) -> Self {
        Self(lines)
    }

    /// Stack a lower and an upper trigram
    pub fn from_trigrams(upper: Trigram, lower: Trigram) -> Self {
        let [l1, l2, l3] = trigram_lines(lower);
        let [l4, l5, l6] = trigram_lines(upper);
        Self([l1, l2, l3, l4, l5, l6])
    }

    /// Parse 0/1 bits ordered bottom to top
    pub fn from_bits(bits: &[u8]) -> Result<Self> {
        if bits.len() != LINE_COUNT {
            return Err(TripleOsError::Data(format!(
                "A hexagram has {} lines, got {}",
                LINE_COUNT,
                bits.len()
            )));
        }
        let mut lines = [Line::Yin; LINE_COUNT];
        for (slot, bit) in lines.iter_mut().zip(bits) {
            *slot = Line::try_from(*bit)?;
        }
        Ok(Self(lines))
    }

    /// Line at a position
    pub fn line(&self, position: LinePosition) -> Line {
        self.0[position as usize]
    }

    /// Whether the line at `position` is correct (正位)
    pub fn is_correct(&self, position: LinePosition) -> bool {
        self.line(position) == position.expected_line()
    }

    /// Full relationship analysis
    pub fn analyze(&self) -> LineRelationships {
        let correspondence = CORRESPONDENCE_PAIRS.map(|(lower, upper, bonus)| {
            let relation = if self.line(lower) != self.line(upper) {
                CorrespondenceKind::Resonant
            } else {
                CorrespondenceKind::Hostile
            };
            Correspondence { lower, upper, relation, bonus }
        });

        let adjacency = [0usize, 1, 2, 3, 4].map(|i| {
            let lower = LinePosition::ALL[i];
            let upper = LinePosition::ALL[i + 1];
            let relation = if self.line(lower) != self.line(upper) {
                AdjacencyKind::Complementary
            } else {
                AdjacencyKind::Kindred
            };
            Adjacency { lower, upper, relation }
        });

        let correctness = LinePosition::ALL.map(|position| LineCorrectness {
            position,
            line: self.line(position),
            correct: self.is_correct(position),
        });

        LineRelationships {
            correspondence,
            adjacency,
            centrality: Centrality {
                lower_correct: self.is_correct(LinePosition::Second),
                upper_correct: self.is_correct(LinePosition::Fifth),
            },
            correctness,
        }
    }
}

/// Correspondence pairs with their harmony bonus; 2-5 (minister and ruler) weighs most
const CORRESPONDENCE_PAIRS: [(LinePosition, LinePosition, f64); 3] = [
    (LinePosition::First, LinePosition::Fourth, 0.05),
    (LinePosition::Second, LinePosition::Fifth, 0.08),
    (LinePosition::Third, LinePosition::Top, 0.06),
];

// ============================================================================
// Relationship results
// ============================================================================

/// 応 / 敵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrespondenceKind {
    /// 応: opposite polarity, the lines support each other
    Resonant,
    /// 敵: same polarity
    Hostile,
}

/// 相補比 / 同気比
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyKind {
    /// 相補比: neighbours of opposite polarity
    Complementary,
    /// 同気比: neighbours of the same polarity
    Kindred,
}

/// Correspondence between a lower-trigram line and its upper counterpart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    /// Line in the lower trigram
    pub lower: LinePosition,
    /// Matching line in the upper trigram
    pub upper: LinePosition,
    /// Resonant or hostile
    pub relation: CorrespondenceKind,
    /// Bonus added to every dimension when resonant
    pub bonus: f64,
}

/// Relation between neighbouring lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjacency {
    /// Lower line
    pub lower: LinePosition,
    /// Line directly above
    pub upper: LinePosition,
    /// Complementary or kindred
    pub relation: AdjacencyKind,
}

/// Correctness of the two central lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Centrality {
    /// Line 2 is yin
    pub lower_correct: bool,
    /// Line 5 is yang
    pub upper_correct: bool,
}

impl Centrality {
    /// Flat bonus for correct central lines
    pub fn bonus(&self) -> f64 {
        let mut bonus = 0.0;
        if self.lower_correct {
            bonus += LOWER_CENTRE_BONUS;
        }
        if self.upper_correct {
            bonus += UPPER_CENTRE_BONUS;
        }
        bonus
    }
}

/// Correctness of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCorrectness {
    /// Position
    pub position: LinePosition,
    /// Actual line
    pub line: Line,
    /// Matches the expected polarity for the position
    pub correct: bool,
}

/// All structural relationships of a hexagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRelationships {
    /// 1-4, 2-5, 3-6
    pub correspondence: [Correspondence; 3],
    /// 1-2 through 5-6
    pub adjacency: [Adjacency; 5],
    /// Lines 2 and 5
    pub centrality: Centrality,
    /// Every line
    pub correctness: [LineCorrectness; LINE_COUNT],
}

impl LineRelationships {
    /// Number of resonant correspondences
    pub fn resonant_count(&self) -> usize {
        self.correspondence
            .iter()
            .filter(|c| c.relation == CorrespondenceKind::Resonant)
            .count()
    }
}

/// Result of [`apply_line_adjustment`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAdjustment {
    /// Adjusted vector
    pub enhanced: TraitVector,
    /// The analysis that drove the adjustment
    pub relationships: LineRelationships,
}

/// Adjust a trait vector by the line structure of a hexagram
///
/// Lines are applied bottom to top and compound: each step scales the
/// already-adjusted value. Bonuses are added after all six lines.
pub fn apply_line_adjustment(lines: &HexagramLines, vector: &TraitVector) -> LineAdjustment {
    let relationships = lines.analyze();
    let mut enhanced = *vector;

    for position in LinePosition::ALL {
        let base = if lines.is_correct(position) {
            CORRECT_FACTOR
        } else {
            INCORRECT_FACTOR
        };
        let factor = base * position.importance();

        for trigram in Trigram::ALL {
            let current = enhanced[trigram];
            enhanced[trigram] = current + current * factor * position.influence(trigram);
        }
    }

    let resonance_bonus: f64 = relationships
        .correspondence
        .iter()
        .filter(|c| c.relation == CorrespondenceKind::Resonant)
        .map(|c| c.bonus)
        .sum();
    let flat_bonus = resonance_bonus + relationships.centrality.bonus();

    for trigram in Trigram::ALL {
        enhanced.add(trigram, flat_bonus);
    }

    LineAdjustment { enhanced, relationships }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_trigrams_stacks_lower_first() {
        // 地天泰: earth above, heaven below
        let tai = HexagramLines::from_trigrams(Trigram::Kun, Trigram::Qian);
        assert_eq!(tai.line(LinePosition::First), Line::Yang);
        assert_eq!(tai.line(LinePosition::Third), Line::Yang);
        assert_eq!(tai.line(LinePosition::Fourth), Line::Yin);
        assert_eq!(tai.line(LinePosition::Top), Line::Yin);
    }

    #[test]
    fn test_from_bits_validation() {
        assert!(HexagramLines::from_bits(&[1, 0, 1]).is_err());
        assert!(HexagramLines::from_bits(&[1, 0, 1, 0, 1, 2]).is_err());
        let lines = HexagramLines::from_bits(&[1, 0, 1, 0, 1, 0]).unwrap();
        assert_eq!(lines.line(LinePosition::Second), Line::Yin);
    }

    #[test]
    fn test_ji_ji_is_fully_correct() {
        // 水火既済: every line in its proper place, every pair resonant
        let ji_ji = HexagramLines::from_trigrams(Trigram::Kan, Trigram::Li);
        let analysis = ji_ji.analyze();

        assert!(analysis.correctness.iter().all(|c| c.correct));
        assert_eq!(analysis.resonant_count(), 3);
        assert!(analysis
            .adjacency
            .iter()
            .all(|a| a.relation == AdjacencyKind::Complementary));
        assert!(analysis.centrality.lower_correct && analysis.centrality.upper_correct);
        assert!((analysis.centrality.bonus() - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_qian_is_hostile_and_kindred() {
        let qian = HexagramLines::from_trigrams(Trigram::Qian, Trigram::Qian);
        let analysis = qian.analyze();

        assert_eq!(analysis.resonant_count(), 0);
        assert!(analysis
            .adjacency
            .iter()
            .all(|a| a.relation == AdjacencyKind::Kindred));
        // Yang on line 5 is correct, yang on line 2 is not
        assert!(!analysis.centrality.lower_correct);
        assert!(analysis.centrality.upper_correct);
    }

    #[test]
    fn test_zero_vector_receives_only_bonuses() {
        let ji_ji = HexagramLines::from_trigrams(Trigram::Kan, Trigram::Li);
        let adjusted = apply_line_adjustment(&ji_ji, &TraitVector::zeros());

        // 0.05 + 0.08 + 0.06 resonance, 0.03 + 0.05 centrality
        for (_, value) in adjusted.enhanced.iter() {
            assert!((value - 0.27).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_line_step() {
        let qian = HexagramLines::from_trigrams(Trigram::Qian, Trigram::Qian);
        let v = TraitVector::from_pairs([(Trigram::Qian, 1.0)]);
        let adjusted = apply_line_adjustment(&qian, &v);

        // qian dimension compounds through every position, then + 0.05 centrality
        let mut expected = 1.0;
        for position in LinePosition::ALL {
            let base = if qian.is_correct(position) { 1.1 } else { 0.9 };
            expected += expected * base * position.importance() * position.influence(Trigram::Qian);
        }
        expected += 0.05;
        assert!((adjusted.enhanced[Trigram::Qian] - expected).abs() < 1e-12);

        // untouched dimensions only receive the flat bonus
        assert!((adjusted.enhanced[Trigram::Kun] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_line_serde_as_bits() {
        let lines: HexagramLines = serde_json::from_str("[1,1,1,0,0,0]").unwrap();
        assert_eq!(lines, HexagramLines::from_trigrams(Trigram::Kun, Trigram::Qian));
        assert!(serde_json::from_str::<HexagramLines>("[1,1,1,0,0]").is_err());
    }
}
