use crate::profile_models::AdvancedCandidateProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate record as supplied by the caller.
///
/// Every field is defaulted so partially populated records from any source
/// deserialize; missing data simply contributes nothing to scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub current_role: String,
    pub company: String,
    pub location: String,
    pub years_experience: f64,
    pub avatar: String,

    /// Declared, structured skill list.
    pub skills: Vec<String>,
    /// Free-text bio or summary.
    pub bio: String,
    /// Free-text evidence snippets gathered during sourcing.
    pub key_evidence: Vec<String>,
    pub raw_profile_text: Option<String>,

    pub alignment_score: u8,
    pub score_breakdown: Option<ScoreBreakdown>,

    pub source_type: Option<String>,
    pub pipeline_stage: Option<String>,
    pub source_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_username: Option<String>,

    pub growth_velocity: Option<GrowthVelocity>,
    pub connection_path: Option<String>,
    pub shared_context: Vec<String>,

    pub advanced_profile: Option<AdvancedCandidateProfile>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// All free-text fields joined for inferred matching.
    pub fn free_text(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.bio.as_str())
            .chain(self.key_evidence.iter().map(String::as_str))
            .chain(self.raw_profile_text.as_deref())
            .chain(std::iter::once(self.current_role.as_str()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GrowthVelocity {
    Rapid,
    Steady,
    Slow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SkillTier {
    MustHave,
    NiceToHave,
    Bonus,
}

impl SkillTier {
    /// Weight a skill gets when the job intake does not set one.
    pub fn default_weight(self) -> f64 {
        match self {
            SkillTier::MustHave => 1.0,
            SkillTier::NiceToHave => 0.6,
            SkillTier::Bonus => 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequirement {
    pub name: String,
    pub tier: SkillTier,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl SkillRequirement {
    pub fn new(name: impl Into<String>, tier: SkillTier) -> Self {
        Self {
            name: name.into(),
            tier,
            weight: None,
        }
    }

    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or_else(|| self.tier.default_weight())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HardRequirementKind {
    Location,
    Experience,
    Language,
}

impl HardRequirementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HardRequirementKind::Location => "location",
            HardRequirementKind::Experience => "experience",
            HardRequirementKind::Language => "language",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HardRequirement {
    pub kind: HardRequirementKind,
    pub value: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub must_have: bool,
}

/// Job-side scoring input, supplied once per job context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RequirementsConfig {
    /// Ordered skill list.
    pub skills: Vec<SkillRequirement>,
    pub location: Option<String>,
    pub hard_requirements: Vec<HardRequirement>,
    pub hard_filter: bool,
}

impl RequirementsConfig {
    pub fn must_haves(&self) -> impl Iterator<Item = &SkillRequirement> {
        self.skills.iter().filter(|s| s.tier == SkillTier::MustHave)
    }

    pub fn preferred(&self) -> impl Iterator<Item = &SkillRequirement> {
        self.skills.iter().filter(|s| s.tier != SkillTier::MustHave)
    }

    /// Location the job is advertised for, falling back to an enabled location hard requirement.
    pub fn job_location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .or_else(|| {
                self.hard_requirements
                    .iter()
                    .find(|h| h.enabled && h.kind == HardRequirementKind::Location)
                    .map(|h| h.value.as_str())
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationMatch {
    Exact,
    Remote,
    #[default]
    None,
}

/// Explanation of one scoring pass. Rebuilt on every pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub required_matched: Vec<String>,
    pub required_matched_inferred: Vec<String>,
    pub required_missing: Vec<String>,
    pub preferred_matched: Vec<String>,
    pub location_match: LocationMatch,
    pub base_score: i32,
    pub skills_score: i32,
    pub preferred_score: i32,
    pub location_score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
}

/// Filter for listing stored candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateFilter {
    pub source_type: Option<String>,
    pub pipeline_stage: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub order_by: CandidateOrder,
    pub descending: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CandidateOrder {
    #[default]
    CreatedAt,
    AlignmentScore,
    Name,
}
