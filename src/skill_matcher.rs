//! Fuzzy skill signal matching.
//!
//! Matching is a case-folded, trimmed, two-way substring test: "react" matches
//! "React Native" and "typescript" matches "TS/TypeScript". There is no
//! stemming, synonym table or edit distance, so "k8s" never matches
//! "kubernetes". That precision gap is known and accepted.

use crate::models::Candidate;
use serde::Serialize;

/// How a skill was found on a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    /// Found in the declared skill list (verified).
    pub matched_via_structured_field: bool,
    /// Found only in free text (inferred). False whenever the structured match holds.
    pub matched_via_free_text: bool,
}

impl SkillMatch {
    pub fn is_match(&self) -> bool {
        self.matched_via_structured_field || self.matched_via_free_text
    }

    pub fn is_inferred(&self) -> bool {
        !self.matched_via_structured_field && self.matched_via_free_text
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// True if either string contains the other after normalization.
///
/// Empty inputs never match, otherwise every skill would match every blank field.
pub fn has_signal(candidate_text: &str, skill_name: &str) -> bool {
    let text = normalize(candidate_text);
    let skill = normalize(skill_name);
    if text.is_empty() || skill.is_empty() {
        return false;
    }
    text.contains(&skill) || skill.contains(&text)
}

/// Classify a skill against a candidate's structured and free-text fields.
pub fn classify(candidate: &Candidate, skill_name: &str) -> SkillMatch {
    let structured = candidate
        .skills
        .iter()
        .any(|declared| has_signal(declared, skill_name));

    let free_text = !structured && candidate.free_text().any(|text| contains_skill(text, skill_name));

    SkillMatch {
        matched_via_structured_field: structured,
        matched_via_free_text: free_text,
    }
}

/// One-way containment for long free text: a bio containing the skill.
///
/// The reverse direction would let short bios like "a" match every skill.
fn contains_skill(text: &str, skill_name: &str) -> bool {
    let skill = normalize(skill_name);
    !skill.is_empty() && normalize(text).contains(&skill)
}
