// Entity Name Validation - Core Library
// Exposes the normalization engine and its collaborators for the CLI and tests

pub mod error;      // Configuration errors
pub mod tables;     // Rule tables: designations, abbreviations, government patterns
pub mod rules;      // One rule per naming convention
pub mod config;     // Fuzzy-match threshold
pub mod engine;     // Ordered rule pipeline + batch reports
pub mod reference;  // Authoritative list + fuzzy matching

// Re-export commonly used types
pub use error::RuleError;
pub use tables::{
    GovernmentKind, GovernmentMatch, match_government, is_valid_state_code,
    ABBREVIATIONS, BUSINESS_DESIGNATIONS, US_STATE_CODES,
};
pub use rules::{
    NameRule, Violation, default_rules, title_case,
    has_special_characters, has_business_designation, has_abbreviation,
    is_government_entity, government_format_issue,
};
pub use config::{RuleConfiguration, DEFAULT_FUZZY_MATCH_THRESHOLD};
pub use engine::{
    NormalizationEngine, ValidationResult, BatchEntry, BatchReport, BatchSummary,
};
pub use reference::{
    AuthoritativeList, FuzzyMatcher, LevenshteinMatcher, ReferenceMatch, Resolution,
    load_names,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
