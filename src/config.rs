//! # Engine Configuration
//!
//! Tunables for scoring, selection, profiling and answer partitioning,
//! read from TOML. Every field has a default, so an empty file (or no file)
//! gives the standard engine.
//!
//! ```toml
//! [scoring]
//! similarity_weight = 0.7
//! activation_weight = 0.3
//! activation_exponent = 0.5
//!
//! [selection]
//! top_n = 4
//!
//! [profile]
//! dominant_trigrams = 3
//!
//! [partition]
//! worldview = { start = 1, end = 24 }
//! scenario = { start = 25, end = 30 }
//! ```

use crate::questionnaire::PartitionConfig;
use crate::scoring::{ScoringWeights, DEFAULT_TOP_N};
use crate::trigram::DIMENSIONS;
use crate::{Result, TripleOsError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Final score blend
    #[serde(default)]
    pub scoring: ScoringWeights,

    /// Candidate selection
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Dimension profile of the Engine OS
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Worldview / scenario question ranges
    #[serde(default)]
    pub partition: PartitionConfig,
}

/// Candidate selection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Candidates kept per OS
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { top_n: default_top_n() }
    }
}

fn default_top_n() -> usize { DEFAULT_TOP_N }

/// Dimension profile settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Strongest dimensions reported for the Engine OS
    #[serde(default = "default_dominant_trigrams")]
    pub dominant_trigrams: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            dominant_trigrams: default_dominant_trigrams(),
        }
    }
}

fn default_dominant_trigrams() -> usize { 3 }

impl EngineConfig {
    /// Load and validate from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TripleOsError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| TripleOsError::Config(format!("Failed to parse engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Find a config in a project directory
    ///
    /// Looks for:
    /// 1. `.triple-os/engine.toml`
    /// 2. `triple-os.toml`
    ///
    /// A file that exists but fails to load is skipped with a warning.
    pub fn find(project_root: impl AsRef<Path>) -> Option<Self> {
        let root = project_root.as_ref();

        let candidates = [
            root.join(".triple-os/engine.toml"),
            root.join("triple-os.toml"),
        ];

        for path in candidates {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => return Some(config),
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "Ignoring engine config"),
                }
            }
        }

        None
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        if self.selection.top_n == 0 {
            return Err(TripleOsError::Config("selection.top_n must be at least 1".into()));
        }
        if self.profile.dominant_trigrams > DIMENSIONS {
            return Err(TripleOsError::Config(format!(
                "profile.dominant_trigrams must be at most {}",
                DIMENSIONS
            )));
        }
        self.partition.validate()
    }
}
