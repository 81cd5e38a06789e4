// 🏷️ Normalization Rules - one rule per naming convention
// Each rule answers "does this fire on the current name?" and "rewrite it".
// Rules hold no state, so the pipeline is a plain fold over an ordered list.

use crate::tables::{
    expansion_for, is_valid_state_code, match_government, whole_word, ABBREVIATIONS,
    BUSINESS_DESIGNATIONS, STATE_CODE_REGEX,
};
use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

// ============================================================================
// VIOLATIONS
// ============================================================================

/// A naming convention that a rule found broken
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Violation {
    /// Input was empty (or not a string at all)
    EmptyOrInvalid,
    Ampersand,
    Apostrophes,
    SpecialCharacters,
    BusinessDesignation,
    Abbreviation,

    /// County or municipality without a "(XX)" suffix; `kind` is the word as written
    MissingStateSuffix { kind: String },

    /// "(XX)" present but XX is not a US state or territory
    InvalidStateCode { code: String },
    TitleCase,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::EmptyOrInvalid => write!(f, "Empty or invalid entity name"),
            Violation::Ampersand => write!(f, "Ampersand used instead of 'and'"),
            Violation::Apostrophes => write!(f, "Apostrophes should be removed"),
            Violation::SpecialCharacters => write!(f, "Special characters should be removed"),
            Violation::BusinessDesignation => {
                write!(f, "Business designations should be removed")
            }
            Violation::Abbreviation => write!(f, "Abbreviations should be expanded"),
            Violation::MissingStateSuffix { kind } => {
                write!(f, "{} must include state in parentheses", kind)
            }
            Violation::InvalidStateCode { code } => write!(f, "Invalid state code: {}", code),
            Violation::TitleCase => write!(f, "Entity name should be in title case"),
        }
    }
}

// Reports carry the human-readable message, not the variant name
impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// RULE DEFINITION
// ============================================================================

pub trait NameRule: Send + Sync {
    /// Stable identifier used in logs
    fn id(&self) -> &'static str;

    /// Return the violation if this rule fires on `name`
    fn check(&self, name: &str) -> Option<Violation>;

    /// Rewrite `name`; only called after `check` fired
    fn apply(&self, name: &str) -> String;
}

// ============================================================================
// COMPILED PATTERNS
// ============================================================================

// Letters, numbers and underscore only. The regex crate's `\w` also admits
// combining marks and connector punctuation, which must be stripped here.
static SPECIAL_CHARACTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{N}_\s]").expect("Invalid special character pattern")
});

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace pattern"));

static DESIGNATION_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    BUSINESS_DESIGNATIONS
        .iter()
        .map(|designation| Regex::new(&whole_word(designation)).expect("Invalid designation pattern"))
        .collect()
});

// One alternation over every key so expansions are substituted in a single
// pass and can never be re-expanded.
static ABBREVIATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = ABBREVIATIONS
        .iter()
        .map(|(abbreviation, _)| regex::escape(abbreviation))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation)).expect("Invalid abbreviation pattern")
});

// ============================================================================
// DETECTORS
// ============================================================================

/// True if any character falls outside ASCII letters, digits, space and parentheses
pub fn has_special_characters(name: &str) -> bool {
    name.chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == ' ' || c == '(' || c == ')'))
}

/// True if any designation literal occurs as a whole word
pub fn has_business_designation(name: &str) -> bool {
    DESIGNATION_REGEXES.iter().any(|re| re.is_match(name))
}

/// True if any abbreviation key occurs as a whole word
pub fn has_abbreviation(name: &str) -> bool {
    ABBREVIATION_REGEX.is_match(name)
}

/// True if the name is a state, county or municipality in canonical shape
pub fn is_government_entity(name: &str) -> bool {
    match_government(name).is_some()
}

/// First government formatting problem found, checked in priority order:
/// missing suffix on a county, missing suffix on a municipality, then an
/// unknown code in any "(XX)".
pub fn government_format_issue(name: &str) -> Option<Violation> {
    if let Some(entity) = match_government(name) {
        if entity.kind.requires_state_suffix() && entity.state_code.is_none() {
            return Some(Violation::MissingStateSuffix {
                kind: entity.kind_word.to_string(),
            });
        }
    }

    let code = STATE_CODE_REGEX.captures(name)?.get(1)?.as_str();
    if is_valid_state_code(code) {
        None
    } else {
        Some(Violation::InvalidStateCode {
            code: code.to_string(),
        })
    }
}

/// Title-case a name: a cased letter is title-cased when it starts a run of
/// cased letters and lower-cased otherwise. Digits and punctuation break runs,
/// so "3rd" becomes "3Rd" and "(CA)" becomes "(Ca)".
pub fn title_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut previous_cased = false;

    for c in name.chars() {
        let cased = c.is_uppercase() || c.is_lowercase() || is_titlecase_letter(c);
        if !cased {
            result.push(c);
        } else if previous_cased {
            result.extend(c.to_lowercase());
        } else {
            push_titlecase(&mut result, c);
        }
        previous_cased = cased;
    }

    result
}

/// Letters of general category Lt (digraphs like "ǅ" and Greek capitals with
/// prosgegrammeni). std classifies them as neither upper nor lower case.
fn is_titlecase_letter(c: char) -> bool {
    matches!(
        c,
        '\u{01C5}'
            | '\u{01C8}'
            | '\u{01CB}'
            | '\u{01F2}'
            | '\u{1F88}'..='\u{1F8F}'
            | '\u{1F98}'..='\u{1F9F}'
            | '\u{1FA8}'..='\u{1FAF}'
            | '\u{1FBC}'
            | '\u{1FCC}'
            | '\u{1FFC}'
    )
}

/// Push the titlecase mapping of `c`. Only the characters listed here differ
/// from their uppercase mapping.
fn push_titlecase(result: &mut String, c: char) {
    match c {
        '\u{01C4}'..='\u{01C6}' => result.push('\u{01C5}'),
        '\u{01C7}'..='\u{01C9}' => result.push('\u{01C8}'),
        '\u{01CA}'..='\u{01CC}' => result.push('\u{01CB}'),
        '\u{01F1}'..='\u{01F3}' => result.push('\u{01F2}'),
        // Greek with ypogegrammeni: the titlecase form sits eight code points up
        '\u{1F80}'..='\u{1F87}' | '\u{1F90}'..='\u{1F97}' | '\u{1FA0}'..='\u{1FA7}' => {
            result.extend(char::from_u32(c as u32 + 8));
        }
        '\u{1F88}'..='\u{1F8F}' | '\u{1F98}'..='\u{1F9F}' | '\u{1FA8}'..='\u{1FAF}' => {
            result.push(c);
        }
        '\u{1FB3}' | '\u{1FBC}' => result.push('\u{1FBC}'),
        '\u{1FC3}' | '\u{1FCC}' => result.push('\u{1FCC}'),
        '\u{1FF3}' | '\u{1FFC}' => result.push('\u{1FFC}'),
        '\u{1FB2}' => result.push_str("\u{1FBA}\u{0345}"),
        '\u{1FB4}' => result.push_str("\u{0386}\u{0345}"),
        '\u{1FB7}' => result.push_str("\u{0391}\u{0342}\u{0345}"),
        '\u{1FC2}' => result.push_str("\u{1FCA}\u{0345}"),
        '\u{1FC4}' => result.push_str("\u{0389}\u{0345}"),
        '\u{1FC7}' => result.push_str("\u{0397}\u{0342}\u{0345}"),
        '\u{1FF2}' => result.push_str("\u{1FFA}\u{0345}"),
        '\u{1FF4}' => result.push_str("\u{038F}\u{0345}"),
        '\u{1FF7}' => result.push_str("\u{03A9}\u{0342}\u{0345}"),
        'ß' => result.push_str("Ss"),
        '\u{FB00}' => result.push_str("Ff"),
        '\u{FB01}' => result.push_str("Fi"),
        '\u{FB02}' => result.push_str("Fl"),
        '\u{FB03}' => result.push_str("Ffi"),
        '\u{FB04}' => result.push_str("Ffl"),
        '\u{FB05}' | '\u{FB06}' => result.push_str("St"),
        '\u{0587}' => result.push_str("\u{0535}\u{0582}"),
        '\u{FB13}' => result.push_str("\u{0544}\u{0576}"),
        '\u{FB14}' => result.push_str("\u{0544}\u{0565}"),
        '\u{FB15}' => result.push_str("\u{0544}\u{056B}"),
        '\u{FB16}' => result.push_str("\u{054E}\u{0576}"),
        '\u{FB17}' => result.push_str("\u{0544}\u{056D}"),
        _ => result.extend(c.to_uppercase()),
    }
}

fn collapse_whitespace(name: &str) -> String {
    WHITESPACE_REGEX.replace_all(name, " ").trim().to_string()
}

// ============================================================================
// RULES
// ============================================================================

pub struct AmpersandRule;

impl NameRule for AmpersandRule {
    fn id(&self) -> &'static str {
        "ampersand"
    }

    fn check(&self, name: &str) -> Option<Violation> {
        name.contains('&').then_some(Violation::Ampersand)
    }

    fn apply(&self, name: &str) -> String {
        name.replace('&', "and")
    }
}

pub struct ApostropheRule;

impl NameRule for ApostropheRule {
    fn id(&self) -> &'static str {
        "apostrophe"
    }

    fn check(&self, name: &str) -> Option<Violation> {
        name.contains('\'').then_some(Violation::Apostrophes)
    }

    fn apply(&self, name: &str) -> String {
        name.replace('\'', "")
    }
}

/// Government entities are skipped so their "(XX)" suffix survives
pub struct SpecialCharacterRule;

impl NameRule for SpecialCharacterRule {
    fn id(&self) -> &'static str {
        "special_characters"
    }

    fn check(&self, name: &str) -> Option<Violation> {
        (!is_government_entity(name) && has_special_characters(name))
            .then_some(Violation::SpecialCharacters)
    }

    fn apply(&self, name: &str) -> String {
        SPECIAL_CHARACTER_REGEX.replace_all(name, "").into_owned()
    }
}

pub struct BusinessDesignationRule;

impl NameRule for BusinessDesignationRule {
    fn id(&self) -> &'static str {
        "business_designation"
    }

    fn check(&self, name: &str) -> Option<Violation> {
        has_business_designation(name).then_some(Violation::BusinessDesignation)
    }

    fn apply(&self, name: &str) -> String {
        DESIGNATION_REGEXES.iter().fold(name.to_string(), |current, re| {
            let stripped = re.replace_all(&current, "");
            collapse_whitespace(stripped.trim())
        })
    }
}

pub struct AbbreviationRule;

impl NameRule for AbbreviationRule {
    fn id(&self) -> &'static str {
        "abbreviation"
    }

    fn check(&self, name: &str) -> Option<Violation> {
        has_abbreviation(name).then_some(Violation::Abbreviation)
    }

    fn apply(&self, name: &str) -> String {
        ABBREVIATION_REGEX
            .replace_all(name, |caps: &Captures| {
                let token = &caps[0];
                expansion_for(token).unwrap_or(token).to_string()
            })
            .into_owned()
    }
}

pub struct GovernmentFormatRule;

impl NameRule for GovernmentFormatRule {
    fn id(&self) -> &'static str {
        "government_format"
    }

    fn check(&self, name: &str) -> Option<Violation> {
        government_format_issue(name)
    }

    // Reports only; the name is left as written
    fn apply(&self, name: &str) -> String {
        name.to_string()
    }
}

pub struct TitleCaseRule;

impl NameRule for TitleCaseRule {
    fn id(&self) -> &'static str {
        "title_case"
    }

    fn check(&self, name: &str) -> Option<Violation> {
        (name != title_case(name)).then_some(Violation::TitleCase)
    }

    fn apply(&self, name: &str) -> String {
        title_case(name)
    }
}

/// The standard pipeline, in evaluation order
pub fn default_rules() -> Vec<Box<dyn NameRule>> {
    vec![
        Box::new(AmpersandRule),
        Box::new(ApostropheRule),
        Box::new(SpecialCharacterRule),
        Box::new(BusinessDesignationRule),
        Box::new(AbbreviationRule),
        Box::new(GovernmentFormatRule),
        Box::new(TitleCaseRule),
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages() {
        assert_eq!(
            Violation::Ampersand.to_string(),
            "Ampersand used instead of 'and'"
        );
        assert_eq!(
            Violation::MissingStateSuffix {
                kind: "Village".to_string()
            }
            .to_string(),
            "Village must include state in parentheses"
        );
        assert_eq!(
            Violation::InvalidStateCode {
                code: "ZZ".to_string()
            }
            .to_string(),
            "Invalid state code: ZZ"
        );
    }

    #[test]
    fn test_violation_serializes_as_message() {
        let json = serde_json::to_string(&vec![Violation::TitleCase]).unwrap();
        assert_eq!(json, r#"["Entity name should be in title case"]"#);
    }

    #[test]
    fn test_ampersand_rule() {
        let rule = AmpersandRule;
        assert_eq!(rule.check("Smith & Jones"), Some(Violation::Ampersand));
        assert_eq!(rule.apply("A&B & C"), "AandB and C");
        assert_eq!(rule.check("Smith and Jones"), None);
    }

    #[test]
    fn test_apostrophe_rule() {
        let rule = ApostropheRule;
        assert_eq!(rule.check("Macy's"), Some(Violation::Apostrophes));
        assert_eq!(rule.apply("O'Brien's"), "OBriens");
    }

    #[test]
    fn test_has_special_characters() {
        assert!(!has_special_characters("Acme Widgets 2 (CA)"));
        assert!(has_special_characters("Acme-Widgets"));
        assert!(has_special_characters("Acme, Inc."));
        assert!(has_special_characters("Café"));
        assert!(has_special_characters("Acme\tWidgets"));
    }

    #[test]
    fn test_special_character_rule_strips_parentheses_for_businesses() {
        let rule = SpecialCharacterRule;
        assert_eq!(rule.check("Acme (West), LLC"), Some(Violation::SpecialCharacters));
        assert_eq!(rule.apply("Acme (West), LLC"), "Acme West LLC");
    }

    #[test]
    fn test_special_character_rule_skips_government_entities() {
        let rule = SpecialCharacterRule;
        assert_eq!(rule.check("County of Orange (CA)"), None);
        assert_eq!(rule.check("State of California"), None);
    }

    #[test]
    fn test_parentheses_alone_do_not_fire() {
        assert_eq!(SpecialCharacterRule.check("Acme (Holdings)"), None);
    }

    #[test]
    fn test_business_designation_detection_is_whole_word_and_case_sensitive() {
        assert!(has_business_designation("Acme LLC"));
        assert!(has_business_designation("Acme Corporation"));
        assert!(!has_business_designation("Acme llc"));
        assert!(!has_business_designation("Incline Partners"));
        assert!(!has_business_designation("LLCs Unlimited"));
    }

    #[test]
    fn test_business_designation_removal_collapses_whitespace() {
        let rule = BusinessDesignationRule;
        assert_eq!(rule.apply("ABC Inc"), "ABC");
        assert_eq!(rule.apply("Smith LLC Holdings Ltd"), "Smith Holdings");
        assert_eq!(rule.apply("  Acme   Corp  "), "Acme");
    }

    #[test]
    fn test_dotted_designation_leaves_trailing_period() {
        // "Inc" is stripped before "Inc." and a trailing "." has no word boundary
        let rule = BusinessDesignationRule;
        assert_eq!(rule.apply("ABC Inc."), "ABC .");
    }

    #[test]
    fn test_abbreviation_rule() {
        let rule = AbbreviationRule;
        assert_eq!(rule.check("Smith Bros Mfg"), Some(Violation::Abbreviation));
        assert_eq!(rule.apply("Smith Bros Mfg"), "Smith Brothers Manufacturing");
        assert_eq!(rule.apply("Acme Intl Co"), "Acme International Company");
        assert_eq!(rule.check("Costco"), None);
        assert_eq!(rule.check("Acme co"), None);
    }

    #[test]
    fn test_abbreviation_expansion_is_single_pass() {
        // "Company" contains "Co" but is never re-expanded
        assert_eq!(AbbreviationRule.apply("Co Co"), "Company Company");
        assert_eq!(AbbreviationRule.apply("Company Co"), "Company Company");
    }

    #[test]
    fn test_government_format_priority() {
        assert_eq!(
            government_format_issue("County of Orange"),
            Some(Violation::MissingStateSuffix {
                kind: "County".to_string()
            })
        );
        assert_eq!(
            government_format_issue("Town of Hempstead"),
            Some(Violation::MissingStateSuffix {
                kind: "Town".to_string()
            })
        );
        assert_eq!(government_format_issue("County of Orange (CA)"), None);
        assert_eq!(
            government_format_issue("County of Orange (ZZ)"),
            Some(Violation::InvalidStateCode {
                code: "ZZ".to_string()
            })
        );
        assert_eq!(government_format_issue("State of California"), None);
    }

    #[test]
    fn test_invalid_code_outside_government_shape() {
        assert_eq!(
            government_format_issue("Acme (XX) Holdings"),
            Some(Violation::InvalidStateCode {
                code: "XX".to_string()
            })
        );
        assert_eq!(government_format_issue("Acme (NY) Holdings"), None);
    }

    #[test]
    fn test_government_format_rule_does_not_rewrite() {
        assert_eq!(GovernmentFormatRule.apply("County of Orange"), "County of Orange");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("smith and jones"), "Smith And Jones");
        assert_eq!(title_case("ABC"), "Abc");
        assert_eq!(title_case("County of Orange (CA)"), "County Of Orange (Ca)");
        assert_eq!(title_case("3rd street"), "3Rd Street");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_title_case_uses_titlecase_mapping() {
        // Digraphs title-case to their mixed form, not the all-caps one
        assert_eq!(title_case("ǆungla"), "ǅungla");
        assert_eq!(title_case("ǄUNGLA"), "ǅungla");
        assert_eq!(title_case("ǉubljana"), "ǈubljana");

        // An Lt letter counts as cased, so the rest of its run is lowered
        assert_eq!(title_case("ǅungla"), "ǅungla");
        assert_eq!(TitleCaseRule.check("ǅungla"), None);

        assert_eq!(title_case("ßeta"), "Sseta");
        assert_eq!(title_case("straße"), "Straße");
    }

    #[test]
    fn test_special_character_rule_strips_combining_marks() {
        let rule = SpecialCharacterRule;
        assert_eq!(rule.apply("Cafe\u{301} Luna"), "Cafe Luna");
        assert_eq!(rule.apply("Acme_Widgets\u{203F}Co"), "Acme_WidgetsCo");
        assert_eq!(rule.apply("Café Luna 2"), "Café Luna 2");
    }

    #[test]
    fn test_title_case_rule() {
        assert_eq!(TitleCaseRule.check("Smith And Jones"), None);
        assert_eq!(TitleCaseRule.check("Smith and Jones"), Some(Violation::TitleCase));
    }

    #[test]
    fn test_default_rule_order() {
        let ids: Vec<&str> = default_rules().iter().map(|rule| rule.id()).collect();
        assert_eq!(
            ids,
            vec![
                "ampersand",
                "apostrophe",
                "special_characters",
                "business_designation",
                "abbreviation",
                "government_format",
                "title_case",
            ]
        );
    }
}
