//! Professional connection graph around a candidate.
//!
//! Graph construction is pure (`build_graph`); `ConnectionGraphBuilder` only
//! adds the concurrent profile fetches in front of it.

use crate::errors::SourceError;
use crate::network_models::{
    ConnectionStrength, EdgeType, IndustryInfluence, IntroQuality, NetworkEdge, NetworkGraph,
    NetworkNode, NodeType, ProfessionalProfile, SharedEmployer, SharedSchool, WarmIntroPath,
};
use crate::scraping_client::ProfileScraper;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Influence points per metric as `(threshold, points)`, highest threshold first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluenceTiers {
    pub connections: Vec<(u32, u32)>,
    pub followers: Vec<(u32, u32)>,
    pub endorsements: Vec<(u32, u32)>,
    pub recommendations: Vec<(u32, u32)>,
}

impl Default for InfluenceTiers {
    fn default() -> Self {
        Self {
            connections: vec![(500, 20), (200, 10), (100, 5)],
            followers: vec![(10_000, 30), (5_000, 20), (1_000, 10)],
            endorsements: vec![(100, 20), (50, 10), (20, 5)],
            recommendations: vec![(10, 15), (5, 10), (2, 5)],
        }
    }
}

fn tier_points(value: u32, tiers: &[(u32, u32)]) -> u32 {
    tiers
        .iter()
        .filter(|(threshold, _)| value >= *threshold)
        .map(|(_, points)| *points)
        .max()
        .unwrap_or(0)
}

/// Thought-leadership score from audience size and social proof, capped at 100.
pub fn calculate_influence(profile: &ProfessionalProfile, tiers: &InfluenceTiers) -> IndustryInfluence {
    let endorsements = profile.total_endorsements();
    let score = tier_points(profile.connections.unwrap_or(0), &tiers.connections)
        + tier_points(profile.followers.unwrap_or(0), &tiers.followers)
        + tier_points(endorsements, &tiers.endorsements)
        + tier_points(profile.recommendations.unwrap_or(0), &tiers.recommendations);

    IndustryInfluence {
        follower_count: profile.followers,
        endorsement_count: (endorsements > 0).then_some(endorsements),
        thought_leadership_score: score.min(100),
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn company_id(name: &str) -> String {
    format!("company-{}", slug(name))
}

fn school_id(name: &str) -> String {
    format!("school-{}", slug(name))
}

fn person_id(name: &str) -> String {
    format!("person-{}", slug(name))
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn named(institution: &str) -> bool {
    !institution.trim().is_empty()
}

fn push_unique(people: &mut Vec<String>, name: &str) {
    if !people.iter().any(|p| p == name) {
        people.push(name.to_string());
    }
}

fn candidate_nodes(candidate_id: &str, candidate: &ProfessionalProfile) -> Vec<NetworkNode> {
    let mut nodes = vec![NetworkNode {
        id: candidate_id.to_string(),
        node_type: NodeType::Candidate,
        name: candidate.name.clone(),
        role: candidate.headline.clone(),
        relationship: None,
        connection_strength: ConnectionStrength::Strong,
    }];
    let mut seen: HashSet<String> = HashSet::new();

    for exp in candidate.experience.iter().filter(|e| named(&e.company)) {
        let id = company_id(&exp.company);
        if seen.insert(id.clone()) {
            nodes.push(NetworkNode {
                id,
                node_type: NodeType::Company,
                name: exp.company.clone(),
                role: None,
                relationship: None,
                connection_strength: ConnectionStrength::Strong,
            });
        }
    }

    for edu in candidate.education.iter().filter(|e| named(&e.school)) {
        let id = school_id(&edu.school);
        if seen.insert(id.clone()) {
            nodes.push(NetworkNode {
                id,
                node_type: NodeType::School,
                name: edu.school.clone(),
                role: None,
                relationship: None,
                connection_strength: ConnectionStrength::Moderate,
            });
        }
    }

    nodes
}

fn find_shared_employers(candidate: &ProfessionalProfile, team: &[ProfessionalProfile]) -> Vec<SharedEmployer> {
    // (key, display name, people) in candidate history order
    let mut shared: Vec<(String, String, Vec<String>)> = Vec::new();
    for exp in candidate.experience.iter().filter(|e| named(&e.company)) {
        let k = key(&exp.company);
        if !shared.iter().any(|(existing, _, _)| *existing == k) {
            shared.push((k, exp.company.clone(), Vec::new()));
        }
    }

    for member in team {
        for exp in &member.experience {
            let k = key(&exp.company);
            if let Some((_, _, people)) = shared.iter_mut().find(|(existing, _, _)| *existing == k) {
                push_unique(people, &member.name);
            }
        }
    }

    shared
        .into_iter()
        .filter(|(_, _, people)| !people.is_empty())
        .map(|(_, company, people)| SharedEmployer {
            overlap: if people.len() == 1 {
                "1 team member".to_string()
            } else {
                format!("{} team members", people.len())
            },
            company,
            people,
        })
        .collect()
}

fn find_shared_schools(candidate: &ProfessionalProfile, team: &[ProfessionalProfile]) -> Vec<SharedSchool> {
    let mut shared: Vec<(String, String, Vec<String>, BTreeSet<i32>)> = Vec::new();
    for edu in candidate.education.iter().filter(|e| named(&e.school)) {
        let k = key(&edu.school);
        if !shared.iter().any(|(existing, ..)| *existing == k) {
            shared.push((k, edu.school.clone(), Vec::new(), BTreeSet::new()));
        }
    }

    for member in team {
        for edu in &member.education {
            let k = key(&edu.school);
            if let Some((_, _, people, years)) = shared.iter_mut().find(|(existing, ..)| *existing == k) {
                push_unique(people, &member.name);
                if let Some(year) = edu.end_year {
                    years.insert(year);
                }
            }
        }
    }

    shared
        .into_iter()
        .filter(|(_, _, people, _)| !people.is_empty())
        .map(|(_, school, people, years)| SharedSchool {
            school,
            years: if years.is_empty() {
                "Unknown".to_string()
            } else {
                years.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
            },
            people,
        })
        .collect()
}

/// Hot paths through shared employers, warm paths through shared schools.
///
/// A team member with both gets one hot path whose common ground lists the
/// school too. Output is ordered hot, warm, cold.
pub fn build_warm_intro_paths(
    candidate_name: &str,
    employers: &[SharedEmployer],
    schools: &[SharedSchool],
) -> Vec<WarmIntroPath> {
    let mut paths: Vec<WarmIntroPath> = Vec::new();

    for employer in employers {
        for person in &employer.people {
            paths.push(WarmIntroPath {
                target_person: candidate_name.to_string(),
                path_nodes: vec![person.clone(), candidate_name.to_string()],
                path_length: 1,
                intro_quality: IntroQuality::Hot,
                suggested_approach: format!(
                    "{} worked at {} - can provide direct intro and context",
                    person, employer.company
                ),
                common_ground: vec![format!("Both worked at {}", employer.company)],
            });
        }
    }

    for school in schools {
        for person in &school.people {
            let ground = format!("Both attended {}", school.school);
            match paths.iter_mut().find(|p| p.path_nodes.first() == Some(person)) {
                Some(existing) => existing.common_ground.push(ground),
                None => paths.push(WarmIntroPath {
                    target_person: candidate_name.to_string(),
                    path_nodes: vec![person.clone(), candidate_name.to_string()],
                    path_length: 1,
                    intro_quality: IntroQuality::Warm,
                    suggested_approach: format!("{} attended {} - alumni connection", person, school.school),
                    common_ground: vec![ground],
                }),
            }
        }
    }

    paths.sort_by_key(|p| p.intro_quality);
    paths
}

/// Build the full graph from already fetched profiles.
pub fn build_graph(
    candidate_id: &str,
    candidate: &ProfessionalProfile,
    team: &[ProfessionalProfile],
    tiers: &InfluenceTiers,
    now: DateTime<Utc>,
) -> NetworkGraph {
    let candidate_companies: HashSet<String> = candidate
        .experience
        .iter()
        .filter(|e| named(&e.company))
        .map(|e| key(&e.company))
        .collect();
    let candidate_schools: HashSet<String> = candidate
        .education
        .iter()
        .filter(|e| named(&e.school))
        .map(|e| key(&e.school))
        .collect();

    let mut nodes = candidate_nodes(candidate_id, candidate);
    let mut seen_people = HashSet::new();
    for member in team {
        let id = person_id(&member.name);
        if seen_people.insert(id.clone()) {
            nodes.push(NetworkNode {
                id,
                node_type: NodeType::Person,
                name: member.name.clone(),
                role: member.headline.clone(),
                relationship: Some("Hiring team".to_string()),
                connection_strength: ConnectionStrength::Moderate,
            });
        }
    }

    let mut edges = Vec::new();
    // Current roles weigh more; with none open, the most recent (first) one does.
    let has_current = candidate
        .experience
        .iter()
        .any(|e| named(&e.company) && e.end_date.is_none());
    for (idx, exp) in candidate.experience.iter().filter(|e| named(&e.company)).enumerate() {
        let current = if has_current { exp.end_date.is_none() } else { idx == 0 };
        edges.push(NetworkEdge {
            source: candidate_id.to_string(),
            target: company_id(&exp.company),
            edge_type: EdgeType::WorkedWith,
            weight: if current { 0.9 } else { 0.6 },
            context: Some(exp.title.clone()).filter(|t| !t.is_empty()),
        });
    }
    for edu in candidate.education.iter().filter(|e| named(&e.school)) {
        edges.push(NetworkEdge {
            source: candidate_id.to_string(),
            target: school_id(&edu.school),
            edge_type: EdgeType::StudiedWith,
            weight: 0.5,
            context: edu
                .degree
                .as_ref()
                .map(|d| format!("{} in {}", d, edu.field.as_deref().unwrap_or("N/A"))),
        });
    }

    let mut mutual_connections = Vec::new();
    for member in team {
        let member_id = person_id(&member.name);
        let mut shares_background = false;

        for exp in member.experience.iter().filter(|e| candidate_companies.contains(&key(&e.company))) {
            shares_background = true;
            edges.push(NetworkEdge {
                source: member_id.clone(),
                target: company_id(&exp.company),
                edge_type: EdgeType::WorkedWith,
                weight: 0.7,
                context: Some(format!("{} also worked here", member.name)),
            });
        }
        for edu in member.education.iter().filter(|e| candidate_schools.contains(&key(&e.school))) {
            shares_background = true;
            edges.push(NetworkEdge {
                source: member_id.clone(),
                target: school_id(&edu.school),
                edge_type: EdgeType::StudiedWith,
                weight: 0.5,
                context: Some(format!("{} is an alumni", member.name)),
            });
        }

        if shares_background && !mutual_connections.iter().any(|n: &NetworkNode| n.id == member_id) {
            mutual_connections.push(NetworkNode {
                id: member_id,
                node_type: NodeType::Person,
                name: member.name.clone(),
                role: member.headline.clone(),
                relationship: Some("Team member with shared background".to_string()),
                connection_strength: ConnectionStrength::Strong,
            });
        }
    }

    let shared_employers = find_shared_employers(candidate, team);
    let shared_schools = find_shared_schools(candidate, team);
    let warm_intro_paths = build_warm_intro_paths(&candidate.name, &shared_employers, &shared_schools);

    NetworkGraph {
        candidate_node_id: candidate_id.to_string(),
        nodes,
        edges,
        warm_intro_paths,
        mutual_connections,
        shared_employers,
        shared_schools,
        industry_influence: calculate_influence(candidate, tiers),
        generated_at: now,
    }
}

/// Candidate-only graph: own nodes and influence, no team comparison.
pub fn quick_graph(
    candidate_id: &str,
    candidate: &ProfessionalProfile,
    tiers: &InfluenceTiers,
    now: DateTime<Utc>,
) -> NetworkGraph {
    NetworkGraph {
        candidate_node_id: candidate_id.to_string(),
        nodes: candidate_nodes(candidate_id, candidate),
        edges: Vec::new(),
        warm_intro_paths: Vec::new(),
        mutual_connections: Vec::new(),
        shared_employers: Vec::new(),
        shared_schools: Vec::new(),
        industry_influence: calculate_influence(candidate, tiers),
        generated_at: now,
    }
}

/// Fetches the candidate and hiring-team profiles, then builds the graph.
#[derive(Clone)]
pub struct ConnectionGraphBuilder {
    scraper: ProfileScraper,
    tiers: InfluenceTiers,
}

impl ConnectionGraphBuilder {
    pub fn new(scraper: ProfileScraper, tiers: InfluenceTiers) -> Self {
        Self { scraper, tiers }
    }

    /// Fails only when the candidate profile itself cannot be fetched.
    /// Team profiles that fail are dropped individually.
    pub async fn build(
        &self,
        candidate_id: &str,
        candidate_url: &str,
        team_urls: &[String],
    ) -> Result<NetworkGraph, SourceError> {
        let candidate_fetch = self.scraper.fetch_profile(candidate_url);
        let team_fetch = join_all(team_urls.iter().map(|url| self.scraper.fetch_profile(url)));
        let (candidate, team_results) = tokio::join!(candidate_fetch, team_fetch);

        let candidate = candidate?;
        let team: Vec<ProfessionalProfile> = team_results
            .into_iter()
            .zip(team_urls)
            .filter_map(|(result, url)| match result {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping team profile {}: {}", url, e);
                    None
                }
            })
            .collect();

        tracing::info!(
            "Fetched {}/{} team profiles for candidate {}",
            team.len(),
            team_urls.len(),
            candidate_id
        );

        let graph = build_graph(candidate_id, &candidate, &team, &self.tiers, Utc::now());
        tracing::info!(
            "✓ Network graph built: {} nodes, {} edges, {} warm paths",
            graph.nodes.len(),
            graph.edges.len(),
            graph.warm_intro_paths.len()
        );
        Ok(graph)
    }

    pub async fn quick_scan(&self, candidate_id: &str, candidate_url: &str) -> Result<NetworkGraph, SourceError> {
        let candidate = self.scraper.fetch_profile(candidate_url).await?;
        Ok(quick_graph(candidate_id, &candidate, &self.tiers, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network_models::{Education, Endorsement, Experience};

    fn profile(name: &str, companies: &[&str], schools: &[(&str, Option<i32>)]) -> ProfessionalProfile {
        ProfessionalProfile {
            name: name.to_string(),
            experience: companies
                .iter()
                .map(|c| Experience {
                    company: c.to_string(),
                    title: "Engineer".to_string(),
                    ..Default::default()
                })
                .collect(),
            education: schools
                .iter()
                .map(|(s, year)| Education {
                    school: s.to_string(),
                    end_year: *year,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_influence_tiers_sum_and_cap() {
        let p = ProfessionalProfile {
            connections: Some(600),
            followers: Some(12_000),
            endorsements: vec![Endorsement { skill: "Rust".into(), count: 150 }],
            recommendations: Some(11),
            ..Default::default()
        };
        let influence = calculate_influence(&p, &InfluenceTiers::default());
        assert_eq!(influence.thought_leadership_score, 85);
        assert_eq!(influence.endorsement_count, Some(150));

        let generous = InfluenceTiers {
            connections: vec![(0, 90)],
            followers: vec![(0, 90)],
            ..Default::default()
        };
        assert_eq!(calculate_influence(&p, &generous).thought_leadership_score, 100);
    }

    #[test]
    fn test_influence_of_empty_profile_is_zero() {
        let influence = calculate_influence(&ProfessionalProfile::default(), &InfluenceTiers::default());
        assert_eq!(influence.thought_leadership_score, 0);
        assert_eq!(influence.endorsement_count, None);
    }

    #[test]
    fn test_shared_employer_is_case_insensitive_and_aggregated() {
        let candidate = profile("Cara", &["Stripe", "Acme Corp"], &[]);
        let team = vec![
            profile("Tom", &["stripe"], &[]),
            profile("Uma", &["STRIPE", "Other"], &[]),
        ];
        let shared = find_shared_employers(&candidate, &team);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].company, "Stripe");
        assert_eq!(shared[0].overlap, "2 team members");
        assert_eq!(shared[0].people, vec!["Tom", "Uma"]);
    }

    #[test]
    fn test_shared_school_years() {
        let candidate = profile("Cara", &[], &[("MIT", Some(2015))]);
        let team = vec![
            profile("Tom", &[], &[("mit", Some(2012))]),
            profile("Uma", &[], &[("MIT", Some(2009))]),
            profile("Vic", &[], &[("MIT", None)]),
        ];
        let shared = find_shared_schools(&candidate, &team);
        assert_eq!(shared[0].years, "2009, 2012");
        assert_eq!(shared[0].people.len(), 3);

        let no_years = find_shared_schools(&candidate, &team[2..]);
        assert_eq!(no_years[0].years, "Unknown");
    }

    #[test]
    fn test_school_merges_into_existing_hot_path() {
        let candidate = profile("Cara", &["Stripe"], &[("MIT", None)]);
        let team = vec![
            profile("Tom", &["Stripe"], &[("MIT", None)]),
            profile("Uma", &[], &[("MIT", None)]),
        ];
        let graph = build_graph("c-1", &candidate, &team, &InfluenceTiers::default(), Utc::now());

        assert_eq!(graph.warm_intro_paths.len(), 2);
        let hot = &graph.warm_intro_paths[0];
        assert_eq!(hot.intro_quality, IntroQuality::Hot);
        assert_eq!(hot.common_ground, vec!["Both worked at Stripe", "Both attended MIT"]);
        assert_eq!(
            hot.suggested_approach,
            "Tom worked at Stripe - can provide direct intro and context"
        );

        let warm = &graph.warm_intro_paths[1];
        assert_eq!(warm.intro_quality, IntroQuality::Warm);
        assert_eq!(warm.path_nodes, vec!["Uma", "Cara"]);
        assert_eq!(warm.suggested_approach, "Uma attended MIT - alumni connection");
    }

    #[test]
    fn test_graph_nodes_edges_and_mutuals() {
        let mut candidate = profile("Cara", &["Stripe", "Acme Corp"], &[("MIT", None)]);
        candidate.experience[1].end_date = Some("2020".to_string());
        candidate.education[0].degree = Some("BSc".to_string());
        let team = vec![profile("Tom", &["Acme Corp"], &[]), profile("Zed", &["Nowhere"], &[])];

        let graph = build_graph("c-1", &candidate, &team, &InfluenceTiers::default(), Utc::now());

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["c-1", "company-stripe", "company-acme-corp", "school-mit", "person-tom", "person-zed"]
        );
        assert_eq!(graph.edges[0].weight, 0.9);
        assert_eq!(graph.edges[1].weight, 0.6);
        assert_eq!(graph.edges[2].context.as_deref(), Some("BSc in N/A"));
        assert!(graph
            .edges
            .iter()
            .any(|e| e.source == "person-tom" && e.context.as_deref() == Some("Tom also worked here")));
        assert_eq!(graph.mutual_connections.len(), 1);
        assert_eq!(graph.mutual_connections[0].name, "Tom");
    }

    #[test]
    fn test_quick_graph_has_no_paths() {
        let candidate = profile("Cara", &["Stripe"], &[]);
        let graph = quick_graph("c-1", &candidate, &InfluenceTiers::default(), Utc::now());
        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.edges.is_empty());
        assert!(graph.warm_intro_paths.is_empty());
    }

    #[test]
    fn test_blank_school_adds_no_node_or_edge() {
        let candidate = profile("Cara", &["Stripe"], &[("  ", Some(2015)), ("MIT", None)]);
        let team = vec![profile("Tom", &[], &[("", Some(2015))])];

        let graph = build_graph("c-1", &candidate, &team, &InfluenceTiers::default(), Utc::now());

        let schools: Vec<&str> = graph
            .nodes
            .iter()
            .filter(|n| n.node_type == NodeType::School)
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(schools, vec!["MIT"]);
        assert!(graph.edges.iter().all(|e| e.target != "school-"));
        assert!(graph.shared_schools.is_empty());
        assert!(graph.mutual_connections.is_empty());
    }

    #[test]
    fn test_most_recent_role_weighs_more_when_all_ended() {
        let mut candidate = profile("Cara", &["Stripe", "Acme Corp"], &[]);
        candidate.experience[0].end_date = Some("2023".to_string());
        candidate.experience[1].end_date = Some("2020".to_string());

        let graph = build_graph("c-1", &candidate, &[], &InfluenceTiers::default(), Utc::now());

        let weights: Vec<f64> = graph
            .edges
            .iter()
            .filter(|e| e.edge_type == EdgeType::WorkedWith)
            .map(|e| e.weight)
            .collect();
        assert_eq!(weights, vec![0.9, 0.6]);
    }
}
