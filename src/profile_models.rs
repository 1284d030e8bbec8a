use crate::network_models::NetworkGraph;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ===== Behavioral signals =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityTrend {
    Increasing,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageShare {
    pub language: String,
    /// Whole percent of recent repos.
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentRepo {
    pub name: String,
    pub description: String,
    pub stars: u32,
    pub last_commit: Option<DateTime<Utc>>,
    pub is_original: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenSourceContribution {
    pub repo: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitHubActivity {
    pub username: String,
    pub profile_url: String,
    pub total_contributions: u32,
    /// Consecutive active days ending today or yesterday.
    pub contribution_streak: u32,
    pub top_languages: Vec<LanguageShare>,
    pub recent_repos: Vec<RecentRepo>,
    pub open_source_contributions: Vec<OpenSourceContribution>,
    pub activity_trend: ActivityTrend,
    pub last_active_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeakingEngagement {
    pub event_name: String,
    pub date: Option<String>,
    pub topic: String,
    pub event_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobChangeType {
    TitleChange,
    CompanyChange,
    LocationChange,
    ProfileUpdate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobChangeSignal {
    #[serde(rename = "type")]
    pub change_type: JobChangeType,
    pub detected_at: DateTime<Utc>,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
    pub significance: Significance,
    pub interpretation: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentPlatform {
    Linkedin,
    Medium,
    DevTo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentActivity {
    pub platform: ContentPlatform,
    pub date: Option<NaiveDate>,
    pub topic: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngagementRecency {
    Active,
    Moderate,
    Dormant,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApproachReadiness {
    Ready,
    Neutral,
    NotReady,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralSignals {
    pub candidate_id: String,
    pub github: Option<GitHubActivity>,
    pub speaking_engagements: Vec<SpeakingEngagement>,
    pub job_change_signals: Vec<JobChangeSignal>,
    pub content_activity: Vec<ContentActivity>,
    pub open_to_work_signal: bool,
    /// Profile updates seen in the last 30 days.
    pub recent_profile_updates: u32,
    pub engagement_recency: EngagementRecency,
    pub best_time_to_reach: String,
    pub approach_readiness: ApproachReadiness,
    pub generated_at: DateTime<Utc>,
}

// ===== Cited evidence =====

/// A document the cited-evidence builder may quote from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceSource {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    pub raw_text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Linkedin,
    Github,
    Publication,
    News,
    CompanyPage,
    Resume,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    Unverified,
    Conflicting,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CitedClaim {
    pub claim: String,
    pub source_url: String,
    pub source_type: SourceType,
    pub extracted_text: String,
    /// 0..=1
    pub confidence: f64,
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub corroborating_sources: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Expert,
    Advanced,
    Intermediate,
    Beginner,
}

impl Proficiency {
    /// Years of evidence implied by the proficiency level.
    pub fn years(self) -> u32 {
        match self {
            Proficiency::Expert => 5,
            Proficiency::Advanced => 3,
            Proficiency::Intermediate => 2,
            Proficiency::Beginner => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillEvidence {
    pub skill: String,
    pub proficiency_level: Proficiency,
    pub evidence: Vec<CitedClaim>,
    pub years_of_evidence: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEvidence {
    pub company: String,
    pub role: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: bool,
    pub evidence: Vec<CitedClaim>,
    pub key_achievements: Vec<CitedClaim>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EducationEvidence {
    pub institution: String,
    pub degree: String,
    pub year: Option<i32>,
    pub evidence: CitedClaim,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificationEvidence {
    pub name: String,
    pub issuer: String,
    pub date: Option<String>,
    pub evidence: CitedClaim,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceUsed {
    pub url: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub reliability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CitedProfile {
    pub candidate_id: String,
    pub name: CitedClaim,
    pub headline: Option<CitedClaim>,
    pub location: Option<CitedClaim>,
    pub experiences: Vec<ExperienceEvidence>,
    pub skills: Vec<SkillEvidence>,
    pub education: Vec<EducationEvidence>,
    pub certifications: Vec<CertificationEvidence>,
    /// 0..=100, share of fields backed by a citation.
    pub data_quality_score: u32,
    pub sources_used: Vec<SourceUsed>,
    pub generated_at: DateTime<Utc>,
}

// ===== Aggregate =====

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataCompleteness {
    pub network: u32,
    pub behavioral: u32,
    pub cited: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedCandidateProfile {
    pub candidate_id: String,
    pub network_graph: Option<NetworkGraph>,
    pub behavioral_signals: Option<BehavioralSignals>,
    pub cited_profile: Option<CitedProfile>,
    /// 0..=100, averaged over present sources only.
    pub overall_confidence: u32,
    pub data_completeness: DataCompleteness,
    pub last_updated: DateTime<Utc>,
    pub next_refresh_recommended: DateTime<Utc>,
}
