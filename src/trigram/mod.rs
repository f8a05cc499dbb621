//! # Trigram Dimensions
//!
//! The eight trigrams (八卦) form the closed coordinate system every trait
//! vector lives in. Each trigram names one personality dimension.
//!
//! ## Ordering
//!
//! Dimensions use the Earlier-Heaven (先天) sequence, which is also the
//! trigram id order (1-8) used by the hexagram tables:
//!
//! ```text
//! id  trigram  key          trait
//!  1   ☰ 乾    qian         creativity
//!  2   ☱ 兌    dui          harmony
//!  3   ☲ 離    li           expression
//!  4   ☳ 震    zhen         action
//!  5   ☴ 巽    xun          adaptability
//!  6   ☵ 坎    kan          exploration
//!  7   ☶ 艮    gen          stability
//!  8   ☷ 坤    kun          receptivity
//! ```
//!
//! ## Keys
//!
//! Data files in the wild spell dimensions three ways. All of them parse:
//!
//! - pinyin: `"qian"`
//! - bare trigram: `"乾"`
//! - compound trait key: `"乾_創造性"`
//!
//! Serialization always writes pinyin.

mod vector;

pub use vector::{DimensionShare, TraitVector};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Number of trait dimensions. Fixed.
pub const DIMENSIONS: usize = 8;

/// One of the eight trigram dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trigram {
    /// ☰ Heaven - creativity
    Qian,
    /// ☱ Lake - harmony
    Dui,
    /// ☲ Fire - expression
    Li,
    /// ☳ Thunder - action
    Zhen,
    /// ☴ Wind - adaptability
    Xun,
    /// ☵ Water - exploration
    Kan,
    /// ☶ Mountain - stability
    Gen,
    /// ☷ Earth - receptivity
    Kun,
}

impl Trigram {
    /// All trigrams in dimension order
    pub const ALL: [Trigram; DIMENSIONS] = [
        Self::Qian,
        Self::Dui,
        Self::Li,
        Self::Zhen,
        Self::Xun,
        Self::Kan,
        Self::Gen,
        Self::Kun,
    ];

    /// Position of this dimension inside a [`TraitVector`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Trigram id (1-8)
    pub const fn id(self) -> u8 {
        self as u8 + 1
    }

    /// Look up a trigram by id (1-8)
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1..=8 => Some(Self::ALL[(id - 1) as usize]),
            _ => None,
        }
    }

    /// Pinyin key used for serialization
    pub const fn key(self) -> &'static str {
        match self {
            Self::Qian => "qian",
            Self::Dui => "dui",
            Self::Li => "li",
            Self::Zhen => "zhen",
            Self::Xun => "xun",
            Self::Kan => "kan",
            Self::Gen => "gen",
            Self::Kun => "kun",
        }
    }

    /// The trigram character
    pub const fn character(self) -> char {
        match self {
            Self::Qian => '乾',
            Self::Dui => '兌',
            Self::Li => '離',
            Self::Zhen => '震',
            Self::Xun => '巽',
            Self::Kan => '坎',
            Self::Gen => '艮',
            Self::Kun => '坤',
        }
    }

    /// Unicode trigram symbol (☰ through ☷)
    pub const fn symbol(self) -> char {
        match self {
            Self::Qian => '☰',
            Self::Dui => '☱',
            Self::Li => '☲',
            Self::Zhen => '☳',
            Self::Xun => '☴',
            Self::Kan => '☵',
            Self::Gen => '☶',
            Self::Kun => '☷',
        }
    }

    /// Compound trait key as written in questionnaire data (e.g. `乾_創造性`)
    pub const fn trait_key(self) -> &'static str {
        match self {
            Self::Qian => "乾_創造性",
            Self::Dui => "兌_調和性",
            Self::Li => "離_表現性",
            Self::Zhen => "震_行動性",
            Self::Xun => "巽_適応性",
            Self::Kan => "坎_探求性",
            Self::Gen => "艮_安定性",
            Self::Kun => "坤_受容性",
        }
    }

    /// English trait name
    pub const fn trait_name(self) -> &'static str {
        match self {
            Self::Qian => "creativity",
            Self::Dui => "harmony",
            Self::Li => "expression",
            Self::Zhen => "action",
            Self::Xun => "adaptability",
            Self::Kan => "exploration",
            Self::Gen => "stability",
            Self::Kun => "receptivity",
        }
    }

    /// Parse any of the accepted key spellings
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL.into_iter().find(|t| {
            key.eq_ignore_ascii_case(t.key())
                || key == t.trait_key()
                || key.chars().eq(std::iter::once(t.character()))
        })
    }
}

impl std::fmt::Display for Trigram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Trigram {
    type Err = crate::TripleOsError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
            .ok_or_else(|| crate::TripleOsError::Data(format!("Unknown trigram dimension '{}'", s)))
    }
}

impl Serialize for Trigram {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Trigram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown trigram dimension '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for t in Trigram::ALL {
            assert_eq!(Trigram::from_id(t.id()), Some(t));
        }
        assert_eq!(Trigram::from_id(0), None);
        assert_eq!(Trigram::from_id(9), None);
        assert_eq!(Trigram::Qian.id(), 1);
        assert_eq!(Trigram::Kun.id(), 8);
    }

    #[test]
    fn test_parse_all_spellings() {
        assert_eq!(Trigram::parse("qian"), Some(Trigram::Qian));
        assert_eq!(Trigram::parse("QIAN"), Some(Trigram::Qian));
        assert_eq!(Trigram::parse("坤"), Some(Trigram::Kun));
        assert_eq!(Trigram::parse("坎_探求性"), Some(Trigram::Kan));
        assert_eq!(Trigram::parse(" li "), Some(Trigram::Li));
        assert_eq!(Trigram::parse("courage"), None);
        assert_eq!(Trigram::parse("坤坤"), None);
    }

    #[test]
    fn test_serde_writes_pinyin() {
        let json = serde_json::to_string(&Trigram::Xun).unwrap();
        assert_eq!(json, "\"xun\"");

        let parsed: Trigram = serde_json::from_str("\"艮_安定性\"").unwrap();
        assert_eq!(parsed, Trigram::Gen);

        let bad: std::result::Result<Trigram, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_from_str_error() {
        let err = "unknown".parse::<Trigram>().unwrap_err();
        assert!(err.to_string().contains("unknown"));
    }
}
