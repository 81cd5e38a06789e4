// 📖 Reference Matching - authoritative entity list + fuzzy lookup
// These are the engine's collaborators: the engine only stores the threshold,
// this module loads the canonical names and scores candidates against them.

use crate::engine::{NormalizationEngine, ValidationResult};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Header names (case-insensitive) recognized as the canonical-name column
const NAME_COLUMNS: &[&str] = &["entity name", "entity_name", "name"];

// ============================================================================
// FUZZY MATCHER
// ============================================================================

/// Anything that can score the similarity of two names from 0 to 100
pub trait FuzzyMatcher {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Case-insensitive normalized Levenshtein similarity
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinMatcher;

impl FuzzyMatcher for LevenshteinMatcher {
    fn score(&self, a: &str, b: &str) -> u8 {
        let similarity = strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase());
        (similarity * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

// ============================================================================
// MATCH RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceMatch {
    /// Name as it appears in the authoritative list
    pub canonical_name: String,

    /// Similarity score (0 - 100)
    pub score: u8,

    /// True when the candidate equals the canonical name verbatim
    pub exact: bool,
}

/// Normalization outcome plus the authoritative entry it resolved to, if any
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub input: String,
    pub validation: ValidationResult,
    pub reference: Option<ReferenceMatch>,
}

// ============================================================================
// AUTHORITATIVE LIST
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AuthoritativeList {
    names: Vec<String>,
}

impl AuthoritativeList {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuthoritativeList {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Load canonical names from a CSV file with a header row
    pub fn from_csv(csv_path: &Path) -> Result<Self> {
        let names = load_names(csv_path)
            .with_context(|| format!("Failed to load authoritative list: {:?}", csv_path))?;

        info!(path = ?csv_path, count = names.len(), "loaded authoritative list");
        Ok(AuthoritativeList { names })
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let names = read_names(csv::Reader::from_reader(reader))?;
        Ok(AuthoritativeList { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Best-scoring canonical name at or above `threshold`.
    ///
    /// An exact match wins outright; otherwise ties go to the entry listed first.
    pub fn best_match(
        &self,
        name: &str,
        matcher: &dyn FuzzyMatcher,
        threshold: u8,
    ) -> Option<ReferenceMatch> {
        if self.contains(name) {
            return Some(ReferenceMatch {
                canonical_name: name.to_string(),
                score: 100,
                exact: true,
            });
        }

        let mut best: Option<ReferenceMatch> = None;
        for canonical in &self.names {
            let score = matcher.score(name, canonical);
            if score < threshold {
                continue;
            }
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(ReferenceMatch {
                    canonical_name: canonical.clone(),
                    score,
                    exact: false,
                });
            }
        }

        best
    }

    /// Normalize `name` with the engine, then look the result up using the
    /// engine's configured threshold
    pub fn resolve(
        &self,
        engine: &NormalizationEngine,
        matcher: &dyn FuzzyMatcher,
        name: &str,
    ) -> Resolution {
        let validation = engine.apply_all_rules(name);
        let reference = if validation.is_invalid_input() {
            None
        } else {
            self.best_match(&validation.normalized, matcher, engine.get_fuzzy_threshold())
        };

        Resolution {
            input: name.to_string(),
            validation,
            reference,
        }
    }
}

// ============================================================================
// CSV LOADING
// ============================================================================

/// Read the entity-name column of a CSV file.
///
/// The column is the first header named "Entity Name", "entity_name" or
/// "name" (any case), falling back to the first column. Records with a blank
/// name are skipped.
pub fn load_names(csv_path: &Path) -> Result<Vec<String>> {
    let rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;
    read_names(rdr)
}

fn read_names<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<String>> {
    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let column = name_column(&headers);
    debug!(column, "using name column");

    let mut names = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.context("Failed to read CSV record")?;
        match record.get(column).map(str::trim) {
            Some(name) if !name.is_empty() => names.push(name.to_string()),
            // +2: header row, and lines are 1-based
            _ => warn!(line = line + 2, "skipping record without an entity name"),
        }
    }

    Ok(names)
}

fn name_column(headers: &csv::StringRecord) -> usize {
    headers
        .iter()
        .position(|header| NAME_COLUMNS.contains(&header.trim().to_lowercase().as_str()))
        .unwrap_or(0)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_list() -> AuthoritativeList {
        AuthoritativeList::from_names([
            "Acme Widgets",
            "Smith And Jones",
            "County Of Orange (Ca)",
            "Globex Corporation",
        ])
    }

    #[test]
    fn test_levenshtein_matcher_scores() {
        let matcher = LevenshteinMatcher;
        assert_eq!(matcher.score("Acme", "Acme"), 100);
        assert_eq!(matcher.score("ACME", "acme"), 100);
        assert_eq!(matcher.score("Acme Widgets", "Acme Widget"), 92);
        assert_eq!(matcher.score("abc", "xyz"), 0);
    }

    #[test]
    fn test_from_reader_named_column() {
        let data = "id,Entity Name,state\n1,Acme Widgets,CA\n2,,NY\n3,Globex Corporation,TX\n";
        let list = AuthoritativeList::from_reader(data.as_bytes()).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.names(), &["Acme Widgets", "Globex Corporation"]);
    }

    #[test]
    fn test_from_reader_first_column_fallback() {
        let data = "Organization,Notes\nAcme Widgets,primary\n Smith And Jones ,\n";
        let list = AuthoritativeList::from_reader(data.as_bytes()).unwrap();

        assert_eq!(list.names(), &["Acme Widgets", "Smith And Jones"]);
    }

    #[test]
    fn test_from_csv_missing_file() {
        let path = std::env::temp_dir().join("entity_name_validation_missing_list.csv");
        assert!(AuthoritativeList::from_csv(&path).is_err());
    }

    #[test]
    fn test_load_names_from_file() {
        let path = std::env::temp_dir().join("entity_name_validation_names_test.csv");
        std::fs::write(&path, "ENTITY_NAME,city\nAcme Widgets,Austin\nABC Inc.,Dallas\n").unwrap();

        let names = load_names(&path).unwrap();
        assert_eq!(names, vec!["Acme Widgets", "ABC Inc."]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_csv_file() {
        let path = std::env::temp_dir().join("entity_name_validation_list_test.csv");
        std::fs::write(&path, "name\nAcme Widgets\nState Of California\n").unwrap();

        let list = AuthoritativeList::from_csv(&path).unwrap();
        assert!(list.contains("State Of California"));
        assert_eq!(list.len(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_exact_match() {
        let result = sample_list()
            .best_match("Acme Widgets", &LevenshteinMatcher, 85)
            .unwrap();

        assert!(result.exact);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_fuzzy_match_above_threshold() {
        let result = sample_list()
            .best_match("Acme Widget", &LevenshteinMatcher, 85)
            .unwrap();

        assert_eq!(result.canonical_name, "Acme Widgets");
        assert!(!result.exact);
        assert!(result.score >= 85);
    }

    #[test]
    fn test_no_match_below_threshold() {
        let list = sample_list();
        assert!(list.best_match("Initech", &LevenshteinMatcher, 85).is_none());
        assert!(list.best_match("Acme Widget", &LevenshteinMatcher, 100).is_none());
    }

    #[test]
    fn test_zero_threshold_always_matches_non_empty_list() {
        let list = sample_list();
        assert!(list.best_match("Initech", &LevenshteinMatcher, 0).is_some());
        assert!(AuthoritativeList::default()
            .best_match("Initech", &LevenshteinMatcher, 0)
            .is_none());
    }

    #[test]
    fn test_resolve_normalizes_before_matching() {
        let engine = NormalizationEngine::new();
        let resolution = sample_list().resolve(&engine, &LevenshteinMatcher, "Smith & Jones LLC");

        assert_eq!(resolution.validation.normalized, "Smith And Jones");
        let reference = resolution.reference.unwrap();
        assert!(reference.exact);
        assert_eq!(reference.canonical_name, "Smith And Jones");
    }

    #[test]
    fn test_resolve_uses_engine_threshold() {
        let mut engine = NormalizationEngine::new();
        let list = sample_list();

        assert!(list.resolve(&engine, &LevenshteinMatcher, "Acme Widget").reference.is_some());

        engine.set_fuzzy_threshold(100).unwrap();
        assert!(list.resolve(&engine, &LevenshteinMatcher, "Acme Widget").reference.is_none());
    }

    #[test]
    fn test_resolve_invalid_input() {
        let engine = NormalizationEngine::new();
        let resolution = sample_list().resolve(&engine, &LevenshteinMatcher, "");

        assert!(resolution.validation.is_invalid_input());
        assert!(resolution.reference.is_none());
    }
}
