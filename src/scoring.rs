//! Alignment scoring: candidate signals against a job's requirements.
//!
//! The score is `base + skills + preferred + location`, clamped to 0..=100.
//! Scoring never fails on candidate data; only the requirements are validated,
//! once, when the scorer is built.

use crate::errors::ValidationError;
use crate::models::{
    Candidate, HardRequirement, HardRequirementKind, LocationMatch, RequirementsConfig,
    ScoreBreakdown, ScoredCandidate,
};
use crate::skill_matcher::{classify, has_signal};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bound for every scoring constant; the final score is clamped to 100 anyway.
pub const MAX_SCORING_CONSTANT: i32 = 100;

/// Point values used by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringWeights {
    pub base: i32,
    pub must_have_match: i32,
    /// Subtracted per missing must-have.
    pub must_have_miss_penalty: i32,
    pub preferred_match: i32,
    pub location_exact: i32,
    pub location_remote: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 40,
            must_have_match: 15,
            must_have_miss_penalty: 10,
            preferred_match: 5,
            location_exact: 10,
            location_remote: 5,
        }
    }
}

impl ScoringWeights {
    fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("base", self.base),
            ("mustHaveMatch", self.must_have_match),
            ("mustHaveMissPenalty", self.must_have_miss_penalty),
            ("preferredMatch", self.preferred_match),
            ("locationExact", self.location_exact),
            ("locationRemote", self.location_remote),
        ];
        for (name, value) in fields {
            if !(0..=MAX_SCORING_CONSTANT).contains(&value) {
                return Err(ValidationError::InvalidScoringConstant(name));
            }
        }
        Ok(())
    }
}

/// Scores candidates against one validated requirements configuration.
#[derive(Debug, Clone)]
pub struct AlignmentScorer {
    requirements: RequirementsConfig,
    weights: ScoringWeights,
}

impl AlignmentScorer {
    /// Validates the configuration up front so no candidate is scored against a bad one.
    pub fn new(
        requirements: RequirementsConfig,
        weights: ScoringWeights,
    ) -> Result<Self, ValidationError> {
        weights.validate()?;
        validate_requirements(&requirements)?;
        Ok(Self {
            requirements,
            weights,
        })
    }

    pub fn requirements(&self) -> &RequirementsConfig {
        &self.requirements
    }

    /// Score one candidate.
    pub fn score(&self, candidate: &Candidate) -> (u8, ScoreBreakdown) {
        let w = &self.weights;
        let mut breakdown = ScoreBreakdown {
            base_score: w.base,
            ..Default::default()
        };

        for skill in self.requirements.must_haves() {
            let m = classify(candidate, &skill.name);
            if m.is_match() {
                breakdown.required_matched.push(skill.name.clone());
                if m.is_inferred() {
                    breakdown.required_matched_inferred.push(skill.name.clone());
                }
                breakdown.skills_score = breakdown.skills_score.saturating_add(w.must_have_match);
            } else {
                breakdown.required_missing.push(skill.name.clone());
                breakdown.skills_score = breakdown.skills_score.saturating_sub(w.must_have_miss_penalty);
            }
        }

        for skill in self.requirements.preferred() {
            if classify(candidate, &skill.name).is_match() {
                breakdown.preferred_matched.push(skill.name.clone());
                breakdown.preferred_score = breakdown.preferred_score.saturating_add(w.preferred_match);
            }
        }

        breakdown.location_match = match_location(self.requirements.job_location(), &candidate.location);
        breakdown.location_score = match breakdown.location_match {
            LocationMatch::Exact => w.location_exact,
            LocationMatch::Remote => w.location_remote,
            LocationMatch::None => 0,
        };

        let total = breakdown
            .base_score
            .saturating_add(breakdown.skills_score)
            .saturating_add(breakdown.preferred_score)
            .saturating_add(breakdown.location_score);

        (total.clamp(0, 100) as u8, breakdown)
    }

    /// Score, optionally hard-filter, and sort descending.
    ///
    /// `sort_by` is stable, so equal scores keep their input order.
    pub fn rank(&self, candidates: Vec<Candidate>) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|candidate| {
                let (score, breakdown) = self.score(&candidate);
                ScoredCandidate {
                    candidate,
                    score,
                    breakdown,
                }
            })
            .filter(|sc| self.passes_hard_filter(sc))
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    /// Hard-filter check for an already scored candidate.
    ///
    /// Always true when hard-filter mode is off. Depends only on the candidate
    /// and the configuration, so filtering twice gives the same list.
    pub fn passes_hard_filter(&self, scored: &ScoredCandidate) -> bool {
        if !self.requirements.hard_filter {
            return true;
        }

        let has_must_haves = self.requirements.must_haves().next().is_some();
        if has_must_haves && scored.breakdown.required_matched.is_empty() {
            return false;
        }

        self.requirements
            .hard_requirements
            .iter()
            .filter(|h| h.enabled && h.must_have)
            .all(|h| meets_hard_requirement(&scored.candidate, h))
    }
}

/// Provisional cap applied by callers before deep evidence exists.
pub fn cap_provisional(score: u8, cap: u8) -> u8 {
    score.min(cap)
}

fn validate_requirements(requirements: &RequirementsConfig) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for (idx, skill) in requirements.skills.iter().enumerate() {
        let name = skill.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptySkillName(idx));
        }
        let weight = skill.effective_weight();
        if !weight.is_finite() || weight < 0.0 {
            return Err(ValidationError::InvalidWeight {
                skill: skill.name.clone(),
                weight,
            });
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(ValidationError::DuplicateSkill(skill.name.clone()));
        }
    }

    for hard in requirements.hard_requirements.iter().filter(|h| h.enabled) {
        let invalid = match hard.kind {
            HardRequirementKind::Experience => parse_years(&hard.value).is_none(),
            HardRequirementKind::Location | HardRequirementKind::Language => {
                hard.value.trim().is_empty()
            }
        };
        if invalid {
            return Err(ValidationError::InvalidHardRequirement {
                kind: hard.kind.as_str().to_string(),
                value: hard.value.clone(),
            });
        }
    }
    Ok(())
}

fn is_remote(s: &str) -> bool {
    s.to_lowercase().contains("remote")
}

fn match_location(job_location: Option<&str>, candidate_location: &str) -> LocationMatch {
    let Some(job) = job_location else {
        return LocationMatch::None;
    };
    if has_signal(candidate_location, job) && !is_remote(candidate_location) {
        return LocationMatch::Exact;
    }
    if is_remote(job) || is_remote(candidate_location) {
        return LocationMatch::Remote;
    }
    LocationMatch::None
}

/// Accepts "5", "5+", "5 years".
fn parse_years(value: &str) -> Option<f64> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok().filter(|y| *y >= 0.0)
}

fn meets_hard_requirement(candidate: &Candidate, req: &HardRequirement) -> bool {
    match req.kind {
        HardRequirementKind::Experience => {
            parse_years(&req.value).map_or(true, |min| candidate.years_experience >= min)
        }
        HardRequirementKind::Location => {
            match_location(Some(&req.value), &candidate.location) != LocationMatch::None
        }
        HardRequirementKind::Language => classify(candidate, &req.value).is_match(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SkillRequirement, SkillTier};

    fn requirements(must: &[&str], nice: &[&str]) -> RequirementsConfig {
        let mut skills: Vec<SkillRequirement> = must
            .iter()
            .map(|s| SkillRequirement::new(*s, SkillTier::MustHave))
            .collect();
        skills.extend(nice.iter().map(|s| SkillRequirement::new(*s, SkillTier::NiceToHave)));
        RequirementsConfig {
            skills,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_candidate_gets_base_minus_penalties() {
        let scorer = AlignmentScorer::new(requirements(&["Rust", "Go"], &[]), ScoringWeights::default()).unwrap();
        let (score, breakdown) = scorer.score(&Candidate::default());
        assert_eq!(score, 20);
        assert_eq!(breakdown.required_missing, vec!["Rust", "Go"]);
        assert_eq!(breakdown.skills_score, -20);
    }

    #[test]
    fn test_score_clamps_at_zero_and_hundred() {
        let many: Vec<String> = (0..10).map(|i| format!("skill{}", i)).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let scorer = AlignmentScorer::new(requirements(&refs, &[]), ScoringWeights::default()).unwrap();

        assert_eq!(scorer.score(&Candidate::default()).0, 0);

        let full = Candidate {
            skills: many.clone(),
            ..Default::default()
        };
        assert_eq!(scorer.score(&full).0, 100);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut req = requirements(&["Rust"], &[]);
        req.skills[0].weight = Some(-0.5);
        let err = AlignmentScorer::new(req, ScoringWeights::default()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidWeight { .. }));
    }

    #[test]
    fn test_duplicate_skill_rejected_case_insensitively() {
        let req = requirements(&["Rust"], &["rust "]);
        let err = AlignmentScorer::new(req, ScoringWeights::default()).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateSkill("rust ".to_string()));
    }

    #[test]
    fn test_negative_constant_rejected() {
        let weights = ScoringWeights {
            must_have_miss_penalty: -10,
            ..Default::default()
        };
        let err = AlignmentScorer::new(RequirementsConfig::default(), weights).unwrap_err();
        assert_eq!(err, ValidationError::InvalidScoringConstant("mustHaveMissPenalty"));
    }

    #[test]
    fn test_oversized_constant_rejected() {
        let weights = ScoringWeights {
            base: i32::MAX,
            ..Default::default()
        };
        let err = AlignmentScorer::new(RequirementsConfig::default(), weights).unwrap_err();
        assert_eq!(err, ValidationError::InvalidScoringConstant("base"));
    }

    #[test]
    fn test_maximum_constants_stay_in_range() {
        let weights = ScoringWeights {
            base: MAX_SCORING_CONSTANT,
            must_have_match: MAX_SCORING_CONSTANT,
            must_have_miss_penalty: MAX_SCORING_CONSTANT,
            preferred_match: MAX_SCORING_CONSTANT,
            location_exact: MAX_SCORING_CONSTANT,
            location_remote: MAX_SCORING_CONSTANT,
        };
        let mut req = requirements(&["Rust", "Go"], &["Kafka"]);
        req.location = Some("Berlin".to_string());
        let scorer = AlignmentScorer::new(req, weights).unwrap();

        let strong = Candidate {
            skills: vec!["Rust".into(), "Go".into(), "Kafka".into()],
            location: "Berlin".into(),
            ..Default::default()
        };
        assert_eq!(scorer.score(&strong).0, 100);
        assert_eq!(scorer.score(&Candidate::default()).0, 0);
    }

    #[test]
    fn test_location_exact_beats_remote() {
        assert_eq!(match_location(Some("Berlin"), "Berlin, Germany"), LocationMatch::Exact);
        assert_eq!(match_location(Some("Berlin"), "Remote"), LocationMatch::Remote);
        assert_eq!(match_location(Some("Remote (EU)"), "Lisbon"), LocationMatch::Remote);
        assert_eq!(match_location(Some("Berlin"), "Lisbon"), LocationMatch::None);
        assert_eq!(match_location(None, "Berlin"), LocationMatch::None);
    }

    #[test]
    fn test_parse_years_variants() {
        assert_eq!(parse_years("5"), Some(5.0));
        assert_eq!(parse_years("3+ years"), Some(3.0));
        assert_eq!(parse_years("senior"), None);
    }

    #[test]
    fn test_cap_provisional() {
        assert_eq!(cap_provisional(85, 60), 60);
        assert_eq!(cap_provisional(42, 60), 42);
    }
}
