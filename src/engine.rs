// 🧹 Normalization Engine - ordered rule pipeline over entity names
// Rewrites a free-form organization or government name toward its canonical
// form and reports which naming rules fired along the way.

use crate::config::RuleConfiguration;
use crate::error::Result;
use crate::rules::{default_rules, NameRule, Violation};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Name after every rule has run
    pub normalized: String,

    /// Rules that fired, in pipeline order (empty if nothing net-changed)
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    fn invalid() -> Self {
        ValidationResult {
            normalized: String::new(),
            violations: vec![Violation::EmptyOrInvalid],
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn is_invalid_input(&self) -> bool {
        self.violations == [Violation::EmptyOrInvalid]
    }

    /// Violation messages as plain strings
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

// ============================================================================
// NORMALIZATION ENGINE
// ============================================================================

pub struct NormalizationEngine {
    config: RuleConfiguration,

    /// Evaluated strictly in this order
    rules: Vec<Box<dyn NameRule>>,
}

impl NormalizationEngine {
    /// Create engine with the default threshold
    pub fn new() -> Self {
        Self::with_config(RuleConfiguration::default())
    }

    /// Create engine with an optional threshold (0-100)
    pub fn with_threshold(fuzzy_threshold: Option<i64>) -> Result<Self> {
        Ok(Self::with_config(RuleConfiguration::new(fuzzy_threshold)?))
    }

    pub fn with_config(config: RuleConfiguration) -> Self {
        NormalizationEngine {
            config,
            rules: default_rules(),
        }
    }

    pub fn config(&self) -> &RuleConfiguration {
        &self.config
    }

    pub fn set_fuzzy_threshold(&mut self, threshold: i64) -> Result<()> {
        self.config.set_fuzzy_threshold(threshold)
    }

    pub fn get_fuzzy_threshold(&self) -> u8 {
        self.config.get_fuzzy_threshold()
    }

    /// Rule identifiers in evaluation order
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Run every rule over `entity_name` and report what fired.
    ///
    /// If the final name is identical to the input, the violations are
    /// discarded even when individual rules fired along the way.
    pub fn apply_all_rules(&self, entity_name: &str) -> ValidationResult {
        if entity_name.is_empty() {
            return ValidationResult::invalid();
        }

        let mut violations = Vec::new();
        let mut current = entity_name.to_string();

        for rule in &self.rules {
            if let Some(violation) = rule.check(&current) {
                debug!(rule = rule.id(), %violation, "rule fired");
                violations.push(violation);
                current = rule.apply(&current);
            }
        }

        if current == entity_name {
            violations.clear();
        }

        ValidationResult {
            normalized: current,
            violations,
        }
    }

    /// Same as `apply_all_rules` for loosely typed input; anything other than
    /// a JSON string is treated as an invalid name.
    pub fn apply_to_value(&self, value: &serde_json::Value) -> ValidationResult {
        match value.as_str() {
            Some(name) => self.apply_all_rules(name),
            None => ValidationResult::invalid(),
        }
    }

    /// Validate a list of names and summarize the outcome
    pub fn validate_batch<I, S>(&self, names: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<BatchEntry> = names
            .into_iter()
            .map(|name| {
                let input = name.as_ref().to_string();
                let result = self.apply_all_rules(&input);
                BatchEntry { input, result }
            })
            .collect();

        let summary = BatchSummary::from_entries(&entries);
        info!("{}", summary.summary());

        BatchReport { entries, summary }
    }
}

impl Default for NormalizationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BATCH REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub input: String,

    #[serde(flatten)]
    pub result: ValidationResult,
}

impl BatchEntry {
    pub fn is_unchanged(&self) -> bool {
        self.result.is_clean() && self.result.normalized == self.input
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_names: usize,
    pub unchanged_count: usize,
    pub normalized_count: usize,
    pub invalid_count: usize,

    /// How often each violation message was reported
    pub violation_counts: BTreeMap<String, usize>,
    pub generated_at: DateTime<Utc>,
}

impl BatchSummary {
    fn from_entries(entries: &[BatchEntry]) -> Self {
        let invalid = entries.iter().filter(|e| e.result.is_invalid_input()).count();
        let unchanged = entries.iter().filter(|e| e.is_unchanged()).count();

        let mut violation_counts = BTreeMap::new();
        for violation in entries.iter().flat_map(|e| &e.result.violations) {
            *violation_counts.entry(violation.to_string()).or_insert(0) += 1;
        }

        BatchSummary {
            total_names: entries.len(),
            unchanged_count: unchanged,
            normalized_count: entries.len() - unchanged - invalid,
            invalid_count: invalid,
            violation_counts,
            generated_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} names: {} already canonical, {} normalized, {} invalid",
            self.total_names, self.unchanged_count, self.normalized_count, self.invalid_count
        )
    }

    /// Share of names that needed no change (0.0 - 1.0)
    pub fn compliance_rate(&self) -> f64 {
        if self.total_names == 0 {
            return 1.0;
        }
        self.unchanged_count as f64 / self.total_names as f64
    }
}

// ============================================================================
// TESTS
// ============================================================================
