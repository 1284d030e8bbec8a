use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Professional-network profile after normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfessionalProfile {
    pub name: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub connections: Option<u32>,
    pub followers: Option<u32>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub endorsements: Vec<Endorsement>,
    pub recommendations: Option<u32>,
    pub open_to_work: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfessionalProfile {
    pub fn current_position(&self) -> Option<&Experience> {
        self.experience.iter().find(|e| e.end_date.is_none())
    }

    pub fn total_endorsements(&self) -> u32 {
        self.endorsements.iter().map(|e| e.count).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: String,
    pub title: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub school: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Endorsement {
    pub skill: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Candidate,
    Person,
    Company,
    School,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    pub connection_strength: ConnectionStrength,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    WorkedWith,
    StudiedWith,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    /// 0..=1
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Strength of a warm-intro path. Declaration order is sort order: hot first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum IntroQuality {
    Hot,
    Warm,
    Cold,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarmIntroPath {
    pub target_person: String,
    pub path_nodes: Vec<String>,
    pub path_length: usize,
    pub intro_quality: IntroQuality,
    pub suggested_approach: String,
    pub common_ground: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedEmployer {
    pub company: String,
    pub overlap: String,
    pub people: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedSchool {
    pub school: String,
    pub years: String,
    pub people: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndustryInfluence {
    pub follower_count: Option<u32>,
    pub endorsement_count: Option<u32>,
    /// 0..=100
    pub thought_leadership_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkGraph {
    pub candidate_node_id: String,
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub warm_intro_paths: Vec<WarmIntroPath>,
    pub mutual_connections: Vec<NetworkNode>,
    pub shared_employers: Vec<SharedEmployer>,
    pub shared_schools: Vec<SharedSchool>,
    pub industry_influence: IndustryInfluence,
    pub generated_at: DateTime<Utc>,
}

impl NetworkGraph {
    /// The strongest warm-intro path, if any.
    pub fn best_path(&self) -> Option<&WarmIntroPath> {
        self.warm_intro_paths.iter().min_by_key(|p| p.intro_quality)
    }
}

/// Developer-platform repository reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepoRef {
    pub full_name: String,
    #[serde(default)]
    pub stars: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrgRef {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MutualKind {
    /// A follows X and X follows B.
    BridgeYouFollow,
    /// B follows X and X follows A.
    BridgeTheyFollow,
    MutualFollow,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MutualConnection {
    pub login: String,
    pub kind: MutualKind,
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectConnection {
    pub you_follow_them: bool,
    pub they_follow_you: bool,
}

impl DirectConnection {
    pub fn any(&self) -> bool {
        self.you_follow_them || self.they_follow_you
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTotals {
    pub bridges: usize,
    pub mutual_follows: usize,
    pub shared_orgs: usize,
    pub shared_starred: usize,
    pub shared_contributions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConnectionPath {
    pub from: String,
    pub to: String,
    /// 1 direct, 2 mutual or shared org, 3 shared repo, `None` no connection.
    pub connection_degree: Option<u8>,
    pub direct_connection: DirectConnection,
    pub mutual_connections: Vec<MutualConnection>,
    pub shared_starred: Vec<RepoRef>,
    pub shared_contributions: Vec<String>,
    pub shared_orgs: Vec<OrgRef>,
    pub shortest_path: String,
    pub totals: ConnectionTotals,
}
