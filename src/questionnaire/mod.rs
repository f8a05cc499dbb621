//! # Questionnaire Answers
//!
//! Typed records for answered questions, as handed over by the quiz layer.
//!
//! ## Shapes
//!
//! - [`AnsweredQuestion`]: a worldview answer (Q1-Q24 by default) carrying
//!   weighted [`ScoringTag`]s and an optional [`KouiLevel`]
//! - [`ScenarioAnswer`]: a scenario answer (Q25-Q30 by default) with separate
//!   outer (social behaviour) and inner (private reaction) [`Choice`]s
//! - [`SubmittedAnswer`]: the loose wire shape before partitioning; see
//!   [`TripleOsInput::from_submission`]
//!
//! The field names accept both the snake_case and camelCase spellings found
//! in questionnaire JSON (`questionId`, `outerChoice`, ...).

mod partition;

pub use partition::{PartitionConfig, TripleOsInput};

use crate::lines::LinePosition;
use crate::trigram::Trigram;
use crate::TripleOsError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Identifiers
// ============================================================================

/// Questionnaire question identifier (e.g. `"q7"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Create a question id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Question number for ids of the form `q<N>` (lowercase only, so the
    /// id matches its situational modifier key)
    pub fn number(&self) -> Option<u32> {
        let digits = self.0.strip_prefix('q')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Scoring tags
// ============================================================================

/// Dimension named by a scoring tag
///
/// Tags naming something outside the eight trigrams are kept as
/// `Unrecognized` and contribute nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagDimension {
    /// One of the eight dimensions
    Known(Trigram),
    /// Anything else, kept verbatim
    Unrecognized(String),
}

impl TagDimension {
    /// The trigram, if recognized
    pub fn trigram(&self) -> Option<Trigram> {
        match self {
            Self::Known(t) => Some(*t),
            Self::Unrecognized(_) => None,
        }
    }
}

impl From<Trigram> for TagDimension {
    fn from(trigram: Trigram) -> Self {
        Self::Known(trigram)
    }
}

impl From<&str> for TagDimension {
    fn from(key: &str) -> Self {
        match Trigram::parse(key) {
            Some(t) => Self::Known(t),
            None => Self::Unrecognized(key.to_string()),
        }
    }
}

impl std::fmt::Display for TagDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(t) => write!(f, "{}", t),
            Self::Unrecognized(key) => write!(f, "{}", key),
        }
    }
}

impl Serialize for TagDimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Known(t) => t.serialize(serializer),
            Self::Unrecognized(key) => serializer.serialize_str(key),
        }
    }
}

impl<'de> Deserialize<'de> for TagDimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// How a tag relates to the rest of the trigram system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Plain addition only
    #[default]
    Plain,
    /// Also suppresses the opposing dimension
    Conflicting,
    /// Also reinforces the complementary dimension
    Complementary,
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Plain => "plain",
            Self::Conflicting => "conflicting",
            Self::Complementary => "complementary",
        };
        write!(f, "{}", name)
    }
}

/// One weighted contribution of an answer to a dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringTag {
    /// Target dimension
    #[serde(rename = "key", alias = "dimension")]
    pub dimension: TagDimension,

    /// Signed weight added to the dimension
    #[serde(rename = "value", alias = "weight")]
    pub weight: f64,

    /// Relational deepening to apply
    #[serde(rename = "type", alias = "relation", default)]
    pub relation: RelationKind,
}

impl ScoringTag {
    /// Tag with no relational deepening
    pub fn plain(dimension: impl Into<TagDimension>, weight: f64) -> Self {
        Self {
            dimension: dimension.into(),
            weight,
            relation: RelationKind::Plain,
        }
    }

    /// Tag that also suppresses the opposing dimension
    pub fn conflicting(dimension: impl Into<TagDimension>, weight: f64) -> Self {
        Self {
            relation: RelationKind::Conflicting,
            ..Self::plain(dimension, weight)
        }
    }

    /// Tag that also reinforces the complementary dimension
    pub fn complementary(dimension: impl Into<TagDimension>, weight: f64) -> Self {
        Self {
            relation: RelationKind::Complementary,
            ..Self::plain(dimension, weight)
        }
    }
}

// ============================================================================
// Koui level
// ============================================================================

/// Line-position strength (爻位) of an answer, 1 (bottom) to 6 (top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct KouiLevel(u8);

impl KouiLevel {
    /// Lowest level (初爻)
    pub const MIN: u8 = 1;
    /// Highest level (上爻)
    pub const MAX: u8 = 6;

    /// Validate a raw level
    pub fn new(level: u8) -> crate::Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(TripleOsError::Data(format!(
                "Koui level {} outside {}..={}",
                level,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Raw level
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Line position this level stands for
    pub fn position(self) -> LinePosition {
        LinePosition::ALL[(self.0 - 1) as usize]
    }
}

impl TryFrom<u8> for KouiLevel {
    type Error = TripleOsError;

    fn try_from(level: u8) -> crate::Result<Self> {
        Self::new(level)
    }
}

impl From<KouiLevel> for u8 {
    fn from(level: KouiLevel) -> u8 {
        level.0
    }
}

// ============================================================================
// Answers
// ============================================================================

/// One answered worldview question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    /// Question id
    #[serde(alias = "questionId")]
    pub question_id: QuestionId,

    /// Weighted tags of the chosen option
    #[serde(default, alias = "scoringTags")]
    pub scoring_tags: Vec<ScoringTag>,

    /// Optional line-position strength
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "kouiLevel")]
    pub koui_level: Option<KouiLevel>,
}

impl AnsweredQuestion {
    /// Create an answer
    pub fn new(question_id: impl Into<QuestionId>, scoring_tags: Vec<ScoringTag>) -> Self {
        Self {
            question_id: question_id.into(),
            scoring_tags,
            koui_level: None,
        }
    }

    /// Attach a koui level
    pub fn with_koui(mut self, level: KouiLevel) -> Self {
        self.koui_level = Some(level);
        self
    }
}

/// One side of a scenario answer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Choice {
    /// Weighted tags of the chosen option
    #[serde(default, alias = "scoringTags")]
    pub scoring_tags: Vec<ScoringTag>,

    /// Optional line-position strength
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "kouiLevel")]
    pub koui_level: Option<KouiLevel>,
}

impl Choice {
    /// Create a choice
    pub fn new(scoring_tags: Vec<ScoringTag>) -> Self {
        Self {
            scoring_tags,
            koui_level: None,
        }
    }

    /// Attach a koui level
    pub fn with_koui(mut self, level: KouiLevel) -> Self {
        self.koui_level = Some(level);
        self
    }
}

/// Which half of a scenario answer to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSide {
    /// Outward behaviour, feeds Interface OS
    Outer,
    /// Inner reaction, feeds SafeMode OS
    Inner,
}

/// One answered scenario question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnswer {
    /// Question id (also keys situational modifiers)
    #[serde(alias = "questionId")]
    pub question_id: QuestionId,

    /// Outward behaviour choice
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "outerChoice")]
    pub outer_choice: Option<Choice>,

    /// Inner reaction choice
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "innerChoice")]
    pub inner_choice: Option<Choice>,
}

impl ScenarioAnswer {
    /// Create a scenario answer
    pub fn new(
        question_id: impl Into<QuestionId>,
        outer_choice: Option<Choice>,
        inner_choice: Option<Choice>,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            outer_choice,
            inner_choice,
        }
    }

    /// The choice for one side
    pub fn choice(&self, side: ScenarioSide) -> Option<&Choice> {
        match side {
            ScenarioSide::Outer => self.outer_choice.as_ref(),
            ScenarioSide::Inner => self.inner_choice.as_ref(),
        }
    }
}

/// Answer as submitted, before worldview/scenario partitioning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    /// Question id
    #[serde(alias = "questionId")]
    pub question_id: QuestionId,

    /// Tags of a single-choice answer
    #[serde(default, alias = "scoringTags")]
    pub scoring_tags: Vec<ScoringTag>,

    /// Optional line-position strength of a single-choice answer
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "kouiLevel")]
    pub koui_level: Option<KouiLevel>,

    /// Outward behaviour choice of a scenario answer
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "outerChoice")]
    pub outer_choice: Option<Choice>,

    /// Inner reaction choice of a scenario answer
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "innerChoice")]
    pub inner_choice: Option<Choice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_number() {
        assert_eq!(QuestionId::new("q1").number(), Some(1));
        assert_eq!(QuestionId::new("q30").number(), Some(30));
        assert_eq!(QuestionId::new("Q30").number(), None);
        assert_eq!(QuestionId::new("q").number(), None);
        assert_eq!(QuestionId::new("q-3").number(), None);
        assert_eq!(QuestionId::new("scenario_1").number(), None);
    }

    #[test]
    fn test_koui_level_bounds() {
        assert!(KouiLevel::new(0).is_err());
        assert!(KouiLevel::new(7).is_err());
        assert_eq!(KouiLevel::new(5).unwrap().get(), 5);
        assert_eq!(KouiLevel::new(1).unwrap().position(), LinePosition::First);
        assert_eq!(KouiLevel::new(6).unwrap().position(), LinePosition::Top);
    }

    #[test]
    fn test_tag_from_questionnaire_json() {
        let tag: ScoringTag =
            serde_json::from_str(r#"{"key": "乾_創造性", "value": 3.0}"#).unwrap();
        assert_eq!(tag.dimension, TagDimension::Known(Trigram::Qian));
        assert_eq!(tag.weight, 3.0);
        assert_eq!(tag.relation, RelationKind::Plain);

        let tag: ScoringTag =
            serde_json::from_str(r#"{"key": "勇気", "value": 1, "type": "conflicting"}"#).unwrap();
        assert_eq!(tag.dimension, TagDimension::Unrecognized("勇気".into()));
        assert_eq!(tag.relation, RelationKind::Conflicting);
    }

    #[test]
    fn test_answer_camel_case_aliases() {
        let json = r#"{
            "questionId": "q25",
            "outerChoice": { "scoring_tags": [{ "key": "dui", "value": 2.0 }] },
            "innerChoice": { "scoring_tags": [{ "key": "kan", "value": 1.0 }], "koui_level": 3 }
        }"#;
        let answer: ScenarioAnswer = serde_json::from_str(json).unwrap();

        assert_eq!(answer.question_id.as_str(), "q25");
        let outer = answer.choice(ScenarioSide::Outer).unwrap();
        assert_eq!(outer.scoring_tags.len(), 1);
        let inner = answer.choice(ScenarioSide::Inner).unwrap();
        assert_eq!(inner.koui_level.map(KouiLevel::get), Some(3));
    }

    #[test]
    fn test_invalid_koui_rejected_at_boundary() {
        let json = r#"{ "question_id": "q1", "scoring_tags": [], "koui_level": 9 }"#;
        let parsed: std::result::Result<AnsweredQuestion, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }
}
