//! # Hexagram Vector Store
//!
//! The 64 reference archetypes every user vector is matched against.
//!
//! Entries are validated once on construction (ids 1-64, unique, finite
//! vectors), kept sorted by id, and never mutated afterwards. Share the store
//! behind an `Arc`.
//!
//! ## File Formats
//!
//! Entry list (JSON or TOML):
//!
//! ```toml
//! [[hexagrams]]
//! id = 1
//! name = "乾為天"
//! vector = { qian = 9.0, kan = 1.0 }
//! ```
//!
//! Flat map keyed by id, names taken from the King Wen table:
//!
//! ```json
//! { "1": { "乾_創造性": 9, "震_行動性": 2 }, "2": { "坤_受容性": 9 } }
//! ```

mod canonical;

pub use canonical::{by_trigrams, canonical, CanonicalHexagram, HEXAGRAM_COUNT, KING_WEN};

use crate::lines::HexagramLines;
use crate::trigram::{TraitVector, Trigram};
use crate::{Result, TripleOsError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// One reference hexagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexagramEntry {
    /// King Wen number (1-64)
    pub id: u8,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Reference trait vector
    #[serde(alias = "traitVector", alias = "trait_vector")]
    pub vector: TraitVector,
}

impl HexagramEntry {
    /// Create an entry
    pub fn new(id: u8, name: impl Into<String>, vector: TraitVector) -> Self {
        Self {
            id,
            name: name.into(),
            vector,
        }
    }

    /// Create an entry named from the King Wen table
    pub fn canonical(id: u8, vector: TraitVector) -> Result<Self> {
        let hexagram = canonical(id)
            .ok_or_else(|| TripleOsError::Data(format!("Hexagram id {} outside 1..=64", id)))?;
        Ok(Self::new(id, hexagram.name, vector))
    }

    /// Upper and lower trigram
    pub fn composition(&self) -> Option<(Trigram, Trigram)> {
        canonical(self.id).map(|h| (h.upper, h.lower))
    }

    /// Six lines of this hexagram
    pub fn lines(&self) -> Option<HexagramLines> {
        canonical(self.id).map(CanonicalHexagram::lines)
    }
}

/// Key that marks the entry-list shape
const ENTRIES_KEY: &str = "hexagrams";

#[derive(Deserialize)]
struct EntryList {
    hexagrams: Vec<HexagramEntry>,
}

fn parse_error(e: impl std::fmt::Display) -> TripleOsError {
    TripleOsError::Data(format!("Failed to parse hexagram store: {}", e))
}

/// Read-only collection of hexagram entries, sorted by id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HexagramVectorStore {
    hexagrams: Vec<HexagramEntry>,
}

impl HexagramVectorStore {
    /// Validate and sort entries; unnamed entries take their King Wen name
    ///
    /// An empty store is allowed; selection against it fails later with
    /// `NoValidCandidates`.
    pub fn new(mut hexagrams: Vec<HexagramEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &mut hexagrams {
            let Some(hexagram) = canonical(entry.id) else {
                return Err(TripleOsError::Data(format!(
                    "Hexagram id {} outside 1..=64",
                    entry.id
                )));
            };
            if entry.name.is_empty() {
                entry.name = hexagram.name.to_string();
            }
            if !seen.insert(entry.id) {
                return Err(TripleOsError::Data(format!(
                    "Duplicate hexagram id {}",
                    entry.id
                )));
            }
            if !entry.vector.is_finite() {
                return Err(TripleOsError::Data(format!(
                    "Hexagram {} has a non-finite vector",
                    entry.id
                )));
            }
        }

        hexagrams.sort_by_key(|e| e.id);

        if !hexagrams.is_empty() && hexagrams.len() != HEXAGRAM_COUNT {
            warn!(
                count = hexagrams.len(),
                "Hexagram store is incomplete"
            );
        }

        Ok(Self { hexagrams })
    }

    /// Build from the flat `{ "<id>": vector }` shape
    pub fn from_flat(vectors: BTreeMap<String, TraitVector>) -> Result<Self> {
        let entries = vectors
            .into_iter()
            .map(|(key, vector)| {
                let id: u8 = key.trim().parse().map_err(|_| {
                    TripleOsError::Data(format!("Invalid hexagram id '{}'", key))
                })?;
                HexagramEntry::canonical(id, vector)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    /// Load from a `.json` or `.toml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(TripleOsError::Io)?;

        let store = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            Some("toml") => Self::from_toml_str(&content)?,
            other => {
                return Err(TripleOsError::Config(format!(
                    "Unsupported store format {:?} for {}",
                    other,
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), hexagrams = store.len(), "Loaded hexagram store");
        Ok(store)
    }

    /// Parse either JSON shape
    ///
    /// A top-level `hexagrams` key selects the entry list; anything else is
    /// read as the flat map.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content).map_err(parse_error)?;
        if value.get(ENTRIES_KEY).is_some() {
            let list: EntryList = serde_json::from_value(value).map_err(parse_error)?;
            Self::new(list.hexagrams)
        } else {
            Self::from_flat(serde_json::from_value(value).map_err(parse_error)?)
        }
    }

    /// Parse either TOML shape
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content).map_err(parse_error)?;
        let is_entry_list = table.contains_key(ENTRIES_KEY);
        let value = toml::Value::Table(table);
        if is_entry_list {
            let list: EntryList = value.try_into().map_err(parse_error)?;
            Self::new(list.hexagrams)
        } else {
            Self::from_flat(value.try_into().map_err(parse_error)?)
        }
    }

    /// Entry by id
    pub fn get(&self, id: u8) -> Option<&HexagramEntry> {
        self.hexagrams
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.hexagrams[i])
    }

    /// Entries in id order
    pub fn iter(&self) -> impl Iterator<Item = &HexagramEntry> {
        self.hexagrams.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.hexagrams.len()
    }

    /// True when the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.hexagrams.is_empty()
    }

    /// True when all 64 hexagrams are present
    pub fn is_complete(&self) -> bool {
        self.hexagrams.len() == HEXAGRAM_COUNT
    }
}
