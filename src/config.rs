// ⚙️ Rule Configuration - the engine's one mutable setting
// The rule tables are compiled in (see tables.rs); only the fuzzy-match
// threshold handed to reference matchers can change.

use crate::error::{Result, RuleError};
use anyhow::Context as AnyhowContext;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_FUZZY_MATCH_THRESHOLD: u8 = 85;
pub const MIN_FUZZY_MATCH_THRESHOLD: i64 = 0;
pub const MAX_FUZZY_MATCH_THRESHOLD: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleConfiguration {
    /// Similarity cutoff (0-100) for matching against the authoritative list
    fuzzy_threshold: u8,
}

/// On-disk shape of a configuration file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    fuzzy_threshold: Option<i64>,
}

impl RuleConfiguration {
    /// Create a configuration; `None` selects the default threshold
    pub fn new(fuzzy_threshold: Option<i64>) -> Result<Self> {
        let fuzzy_threshold = match fuzzy_threshold {
            Some(threshold) => validate_threshold(threshold)?,
            None => DEFAULT_FUZZY_MATCH_THRESHOLD,
        };
        Ok(RuleConfiguration { fuzzy_threshold })
    }

    /// Load from a JSON file such as `{"fuzzy_threshold": 90}`
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(content).context("Failed to parse configuration JSON")?;

        Ok(Self::new(file.fuzzy_threshold)?)
    }

    /// Replace the threshold; out-of-range values leave the current one untouched
    pub fn set_fuzzy_threshold(&mut self, threshold: i64) -> Result<()> {
        self.fuzzy_threshold = validate_threshold(threshold)?;
        Ok(())
    }

    pub fn get_fuzzy_threshold(&self) -> u8 {
        self.fuzzy_threshold
    }
}

impl Default for RuleConfiguration {
    fn default() -> Self {
        RuleConfiguration {
            fuzzy_threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
        }
    }
}

fn validate_threshold(threshold: i64) -> Result<u8> {
    if !(MIN_FUZZY_MATCH_THRESHOLD..=MAX_FUZZY_MATCH_THRESHOLD).contains(&threshold) {
        return Err(RuleError::InvalidArgument(format!(
            "Fuzzy matching threshold must be between {} and {}, got {}",
            MIN_FUZZY_MATCH_THRESHOLD, MAX_FUZZY_MATCH_THRESHOLD, threshold
        )));
    }
    // In range, so it fits
    Ok(threshold as u8)
}

// ============================================================================
// TESTS
// ============================================================================
