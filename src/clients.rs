//! Collaborator contracts consumed by the enrichment core.
//!
//! Concrete HTTP implementations live in `services` and `scraping_client`;
//! tests substitute in-memory fakes.

use crate::errors::SourceError;
use crate::network_models::{OrgRef, RepoRef, UserProfile};
use crate::profile_models::{EvidenceSource, Proficiency};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size every paginated list call requests. A shorter page is the last one.
pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub full_name: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityKind {
    Push,
    PullRequest,
    Issues,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub repo: String,
    pub created_at: DateTime<Utc>,
}

/// Developer-platform identity graph.
#[async_trait]
pub trait SourceGraphClient: Send + Sync {
    async fn list_following(&self, user: &str, page: u32) -> Result<Vec<String>, SourceError>;
    async fn list_followers(&self, user: &str, page: u32) -> Result<Vec<String>, SourceError>;
    async fn list_starred(&self, user: &str, page: u32) -> Result<Vec<RepoRef>, SourceError>;
    async fn list_orgs(&self, user: &str) -> Result<Vec<OrgRef>, SourceError>;
    async fn list_repos(&self, user: &str, page: u32) -> Result<Vec<RepoSummary>, SourceError>;
    async fn get_profile(&self, user: &str) -> Result<UserProfile, SourceError>;
    /// Most recent public activity, newest first.
    async fn list_events(&self, user: &str, page: u32) -> Result<Vec<ActivityEvent>, SourceError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeState {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeStatus {
    pub state: ScrapeState,
    pub record_count: u32,
}

/// Professional-network profile extraction (asynchronous jobs).
#[async_trait]
pub trait ProfileScrapingClient: Send + Sync {
    async fn trigger(&self, url: &str) -> Result<String, SourceError>;
    async fn poll_status(&self, job_id: &str) -> Result<ScrapeStatus, SourceError>;
    /// Raw, vendor-shaped record. Normalize before use.
    async fn fetch_result(&self, job_id: &str) -> Result<serde_json::Value, SourceError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

#[async_trait]
pub trait WebSearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError>;
}

/// Claim as returned by the generator: `source_index` is 1-based into the sources sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawClaim {
    pub claim: String,
    pub source_index: usize,
    pub extracted_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawExperience {
    pub company: String,
    pub role: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub source_index: usize,
    pub extracted_text: String,
    pub achievements: Vec<RawClaim>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawSkill {
    pub skill: String,
    pub proficiency: Proficiency,
    #[serde(default)]
    pub source_indices: Vec<usize>,
    #[serde(default)]
    pub extracted_texts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEducation {
    pub institution: String,
    pub degree: String,
    pub year: Option<i32>,
    pub source_index: usize,
    pub extracted_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCertification {
    pub name: String,
    pub issuer: String,
    pub date: Option<String>,
    pub source_index: usize,
    pub extracted_text: String,
}

/// Structured fields extracted by the generative model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedFields {
    pub name_claim: Option<RawClaim>,
    pub headline_claim: Option<RawClaim>,
    pub location_claim: Option<RawClaim>,
    pub experiences: Vec<RawExperience>,
    pub skills: Vec<RawSkill>,
    pub education: Vec<RawEducation>,
    pub certifications: Vec<RawCertification>,
}

#[async_trait]
pub trait GenerativeTextClient: Send + Sync {
    async fn generate_cited_fields(
        &self,
        candidate_name: &str,
        sources: &[EvidenceSource],
    ) -> Result<ExtractedFields, SourceError>;
}
