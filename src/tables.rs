// 📚 Rule Tables - Rules as Data
// Fixed lookup tables the normalization rules read from. Nothing here mutates
// after first use; regexes are compiled once on first access.

use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// BUSINESS DESIGNATIONS
// ============================================================================

/// Legal-form suffixes removed from entity names.
///
/// Order matters: removal runs literal by literal in this order, so the bare
/// form ("Inc") is stripped before the dotted form ("Inc.") gets a chance.
pub const BUSINESS_DESIGNATIONS: &[&str] = &[
    "LLC",
    "Inc",
    "Inc.",
    "Incorporated",
    "Corp",
    "Corp.",
    "Corporation",
    "Ltd",
    "Ltd.",
    "Limited",
    "L.P.",
    "LP",
    "LLP",
    "PLLC",
    "P.C.",
    "L.L.C.",
    "L.L.P.",
    "P.L.L.C.",
];

// ============================================================================
// ABBREVIATIONS
// ============================================================================

/// Abbreviation -> canonical expansion, in alternation priority order.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("Co", "Company"),
    ("Co.", "Company"),
    ("Bros", "Brothers"),
    ("Bros.", "Brothers"),
    ("Mfg", "Manufacturing"),
    ("Mfg.", "Manufacturing"),
    ("Intl", "International"),
    ("Intl.", "International"),
    ("&", "and"),
];

/// Look up the expansion for an abbreviation token
pub fn expansion_for(abbreviation: &str) -> Option<&'static str> {
    ABBREVIATIONS
        .iter()
        .find(|(key, _)| *key == abbreviation)
        .map(|(_, expansion)| *expansion)
}

// ============================================================================
// US STATES AND TERRITORIES
// ============================================================================

/// Two-letter codes accepted inside a "(XX)" suffix: 50 states, DC, and the
/// five inhabited territories.
pub const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA",
    "HI", "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD",
    "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC",
    "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY",
    "DC", "AS", "GU", "MP", "PR", "VI",
];

pub fn is_valid_state_code(code: &str) -> bool {
    US_STATE_CODES.contains(&code)
}

// ============================================================================
// GOVERNMENT ENTITY PATTERNS
// ============================================================================

/// Structural family a government entity name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernmentKind {
    /// "State of X"
    State,

    /// "County of X" with an optional "(XX)" suffix
    County,

    /// "City|Town|Village|Borough of X" with an optional "(XX)" suffix
    Municipality,
}

impl GovernmentKind {
    /// Whether names of this kind must end in a parenthesized state code
    pub fn requires_state_suffix(&self) -> bool {
        matches!(self, GovernmentKind::County | GovernmentKind::Municipality)
    }
}

struct GovernmentPattern {
    kind: GovernmentKind,
    regex: Regex,
}

// Every pattern captures (1) the kind word, (2) the jurisdiction and, where a
// suffix is allowed, (3) the state code. A single trailing newline is accepted
// before the end, the way a Python-style `$` accepts it.
static GOVERNMENT_PATTERNS: LazyLock<Vec<GovernmentPattern>> = LazyLock::new(|| {
    vec![
        GovernmentPattern {
            kind: GovernmentKind::State,
            regex: Regex::new(r"^(State) of ([A-Za-z ]+)\n?$").expect("Invalid state pattern"),
        },
        GovernmentPattern {
            kind: GovernmentKind::County,
            regex: Regex::new(r"^(County) of ([A-Za-z ]+)(?: \(([A-Z]{2})\))?\n?$")
                .expect("Invalid county pattern"),
        },
        GovernmentPattern {
            kind: GovernmentKind::Municipality,
            regex: Regex::new(
                r"^(City|Town|Village|Borough) of ([A-Za-z ]+)(?: \(([A-Z]{2})\))?\n?$",
            )
            .expect("Invalid municipality pattern"),
        },
    ]
});

/// A parenthesized two-letter code anywhere in a name
pub static STATE_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z]{2})\)").expect("Invalid state code pattern"));

/// Result of matching a name against the government pattern table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernmentMatch<'a> {
    pub kind: GovernmentKind,

    /// The literal kind word as written ("County", "Town", ...)
    pub kind_word: &'a str,

    /// The place name after "of"
    pub jurisdiction: &'a str,

    /// Code inside the trailing "(XX)", if present
    pub state_code: Option<&'a str>,
}

/// Match a name against the government pattern table (state, county,
/// municipality, in that order)
pub fn match_government(name: &str) -> Option<GovernmentMatch<'_>> {
    GOVERNMENT_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.regex.captures(name)?;
        Some(GovernmentMatch {
            kind: pattern.kind,
            kind_word: caps.get(1)?.as_str(),
            jurisdiction: caps.get(2)?.as_str(),
            state_code: caps.get(3).map(|m| m.as_str()),
        })
    })
}

/// Build a case-sensitive, word-boundary delimited pattern for a literal
pub(crate) fn whole_word(literal: &str) -> String {
    format!(r"\b{}\b", regex::escape(literal))
}

// ============================================================================
// TESTS
// ============================================================================
