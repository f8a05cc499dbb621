//! King Wen sequence of the 64 hexagrams

use crate::lines::HexagramLines;
use crate::trigram::Trigram;

/// Number of hexagrams
pub const HEXAGRAM_COUNT: usize = 64;

/// Name and trigram composition of one hexagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalHexagram {
    /// King Wen number (1-64)
    pub id: u8,
    /// Traditional name (e.g. 乾為天)
    pub name: &'static str,
    /// Upper (outer) trigram
    pub upper: Trigram,
    /// Lower (inner) trigram
    pub lower: Trigram,
}

impl CanonicalHexagram {
    /// The six lines, lower trigram at the bottom
    pub fn lines(&self) -> HexagramLines {
        HexagramLines::from_trigrams(self.upper, self.lower)
    }
}

use crate::trigram::Trigram::{Dui, Gen, Kan, Kun, Li, Qian, Xun, Zhen};

const fn h(id: u8, name: &'static str, upper: Trigram, lower: Trigram) -> CanonicalHexagram {
    CanonicalHexagram { id, name, upper, lower }
}

/// All 64 hexagrams, index = id - 1
pub const KING_WEN: [CanonicalHexagram; HEXAGRAM_COUNT] = [
    h(1, "乾為天", Qian, Qian),
    h(2, "坤為地", Kun, Kun),
    h(3, "水雷屯", Kan, Zhen),
    h(4, "山水蒙", Gen, Kan),
    h(5, "水天需", Kan, Qian),
    h(6, "天水訟", Qian, Kan),
    h(7, "地水師", Kun, Kan),
    h(8, "水地比", Kan, Kun),
    h(9, "風天小畜", Xun, Qian),
    h(10, "天沢履", Qian, Dui),
    h(11, "地天泰", Kun, Qian),
    h(12, "天地否", Qian, Kun),
    h(13, "天火同人", Qian, Li),
    h(14, "火天大有", Li, Qian),
    h(15, "地山謙", Kun, Gen),
    h(16, "雷地豫", Zhen, Kun),
    h(17, "沢雷随", Dui, Zhen),
    h(18, "山風蠱", Gen, Xun),
    h(19, "地沢臨", Kun, Dui),
    h(20, "風地観", Xun, Kun),
    h(21, "火雷噬嗑", Li, Zhen),
    h(22, "山火賁", Gen, Li),
    h(23, "山地剥", Gen, Kun),
    h(24, "地雷復", Kun, Zhen),
    h(25, "天雷无妄", Qian, Zhen),
    h(26, "山天大畜", Gen, Qian),
    h(27, "山雷頤", Gen, Zhen),
    h(28, "沢風大過", Dui, Xun),
    h(29, "坎為水", Kan, Kan),
    h(30, "離為火", Li, Li),
    h(31, "沢山咸", Dui, Gen),
    h(32, "雷風恒", Zhen, Xun),
    h(33, "天山遯", Qian, Gen),
    h(34, "雷天大壮", Zhen, Qian),
    h(35, "火地晋", Li, Kun),
    h(36, "地火明夷", Kun, Li),
    h(37, "風火家人", Xun, Li),
    h(38, "火沢睽", Li, Dui),
    h(39, "水山蹇", Kan, Gen),
    h(40, "雷水解", Zhen, Kan),
    h(41, "山沢損", Gen, Dui),
    h(42, "風雷益", Xun, Zhen),
    h(43, "沢天夬", Dui, Qian),
    h(44, "天風姤", Qian, Xun),
    h(45, "沢地萃", Dui, Kun),
    h(46, "地風升", Kun, Xun),
    h(47, "沢水困", Dui, Kan),
    h(48, "水風井", Kan, Xun),
    h(49, "沢火革", Dui, Li),
    h(50, "火風鼎", Li, Xun),
    h(51, "震為雷", Zhen, Zhen),
    h(52, "艮為山", Gen, Gen),
    h(53, "風山漸", Xun, Gen),
    h(54, "雷沢帰妹", Zhen, Dui),
    h(55, "雷火豊", Zhen, Li),
    h(56, "火山旅", Li, Gen),
    h(57, "巽為風", Xun, Xun),
    h(58, "兌為沢", Dui, Dui),
    h(59, "風水渙", Xun, Kan),
    h(60, "水沢節", Kan, Dui),
    h(61, "風沢中孚", Xun, Dui),
    h(62, "雷山小過", Zhen, Gen),
    h(63, "水火既済", Kan, Li),
    h(64, "火水未済", Li, Kan),
];

/// Look up a hexagram by King Wen number
pub fn canonical(id: u8) -> Option<&'static CanonicalHexagram> {
    match id {
        1..=64 => Some(&KING_WEN[(id - 1) as usize]),
        _ => None,
    }
}

/// Hexagram made of the given trigrams
pub fn by_trigrams(upper: Trigram, lower: Trigram) -> Option<&'static CanonicalHexagram> {
    KING_WEN
        .iter()
        .find(|h| h.upper == upper && h.lower == lower)
}
