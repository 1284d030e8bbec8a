/// Orchestrator scenarios: partial failure, disabled collectors, deadlines and cancellation
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use talent_enrichment::cited_evidence::placeholder_profile;
use talent_enrichment::enrichment::{
    approach_readiness_summary, behavioral_confidence, merge_advanced_profile, overall_confidence, BehavioralCollector,
    EnrichmentInput, EnrichmentOptions, EnrichmentOrchestrator, EvidenceCollector, NetworkCollector,
};
use talent_enrichment::errors::SourceError;
use talent_enrichment::models::{Candidate, GrowthVelocity};
use talent_enrichment::network_models::{IndustryInfluence, IntroQuality, NetworkGraph, WarmIntroPath};
use talent_enrichment::profile_models::{
    ActivityTrend, ApproachReadiness, BehavioralSignals, CitedProfile, EngagementRecency, GitHubActivity,
    LanguageShare,
};
use tokio_util::sync::CancellationToken;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn input() -> EnrichmentInput {
    EnrichmentInput {
        candidate_id: "cand-1".into(),
        candidate_name: "Ana Souza".into(),
        linkedin_url: Some("https://www.linkedin.com/in/ana".into()),
        github_url: Some("https://github.com/ana".into()),
        ..Default::default()
    }
}

fn github_activity(trend: ActivityTrend) -> GitHubActivity {
    GitHubActivity {
        username: "ana".into(),
        profile_url: "https://github.com/ana".into(),
        total_contributions: 42,
        contribution_streak: 3,
        top_languages: vec![
            LanguageShare {
                language: "Rust".into(),
                percentage: 60,
            },
            LanguageShare {
                language: "Go".into(),
                percentage: 40,
            },
        ],
        recent_repos: vec![],
        open_source_contributions: vec![],
        activity_trend: trend,
        last_active_date: Some(now()),
    }
}

fn signals(github: Option<GitHubActivity>) -> BehavioralSignals {
    BehavioralSignals {
        candidate_id: "cand-1".into(),
        github,
        speaking_engagements: vec![],
        job_change_signals: vec![],
        content_activity: vec![],
        open_to_work_signal: false,
        recent_profile_updates: 0,
        engagement_recency: EngagementRecency::Moderate,
        best_time_to_reach: "Weekday mornings".into(),
        approach_readiness: ApproachReadiness::Neutral,
        generated_at: now(),
    }
}

fn graph_with_path(quality: IntroQuality, approach: &str) -> NetworkGraph {
    NetworkGraph {
        candidate_node_id: "cand-1".into(),
        nodes: vec![],
        edges: vec![],
        warm_intro_paths: vec![WarmIntroPath {
            target_person: "Ana Souza".into(),
            path_nodes: vec!["Bruno".into(), "Ana Souza".into()],
            path_length: 1,
            intro_quality: quality,
            suggested_approach: approach.into(),
            common_ground: vec!["Both worked at Acme".into()],
        }],
        mutual_connections: vec![],
        shared_employers: vec![],
        shared_schools: vec![],
        industry_influence: IndustryInfluence::default(),
        generated_at: now(),
    }
}

struct FailingNetwork;

#[async_trait]
impl NetworkCollector for FailingNetwork {
    async fn collect_network(&self, _: &EnrichmentInput, _: bool) -> Result<NetworkGraph, SourceError> {
        Err(SourceError::unavailable("scraper", "HTTP 502"))
    }
}

struct SlowNetwork;

#[async_trait]
impl NetworkCollector for SlowNetwork {
    async fn collect_network(&self, _: &EnrichmentInput, _: bool) -> Result<NetworkGraph, SourceError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(graph_with_path(IntroQuality::Hot, "never"))
    }
}

struct StaticBehavioral {
    quick_seen: std::sync::Mutex<Option<bool>>,
}

#[async_trait]
impl BehavioralCollector for StaticBehavioral {
    async fn collect_behavioral(
        &self,
        _: &EnrichmentInput,
        quick: bool,
        _: DateTime<Utc>,
    ) -> Result<BehavioralSignals, SourceError> {
        *self.quick_seen.lock().unwrap() = Some(quick);
        Ok(signals(Some(github_activity(ActivityTrend::Increasing))))
    }
}

struct SlowBehavioral;

#[async_trait]
impl BehavioralCollector for SlowBehavioral {
    async fn collect_behavioral(
        &self,
        _: &EnrichmentInput,
        _: bool,
        _: DateTime<Utc>,
    ) -> Result<BehavioralSignals, SourceError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(signals(None))
    }
}

struct StaticEvidence;

#[async_trait]
impl EvidenceCollector for StaticEvidence {
    async fn collect_evidence(&self, input: &EnrichmentInput, now: DateTime<Utc>) -> Result<CitedProfile, SourceError> {
        let mut profile = placeholder_profile(&input.candidate_id, &input.candidate_name, now);
        profile.data_quality_score = 80;
        Ok(profile)
    }
}

fn behavioral() -> Arc<StaticBehavioral> {
    Arc::new(StaticBehavioral {
        quick_seen: std::sync::Mutex::new(None),
    })
}

#[tokio::test]
async fn failing_collector_leaves_only_its_section_absent() {
    let orchestrator = EnrichmentOrchestrator::new(Duration::from_secs(5))
        .with_network(Arc::new(FailingNetwork))
        .with_behavioral(behavioral())
        .with_evidence(Arc::new(StaticEvidence));

    let profile = orchestrator
        .enrich_at(&input(), EnrichmentOptions::deep(), &CancellationToken::new(), now())
        .await;

    assert!(profile.network_graph.is_none());
    let behavioral = profile.behavioral_signals.as_ref().unwrap();
    assert_eq!(profile.cited_profile.as_ref().unwrap().data_quality_score, 80);

    let expected = ((behavioral_confidence(behavioral) + 80) as f64 / 2.0).round() as u32;
    assert_eq!(profile.overall_confidence, expected);
    assert_eq!(profile.data_completeness.network, 0);
    assert_eq!(profile.last_updated, now());
}

#[tokio::test]
async fn all_disabled_returns_empty_profile() {
    let orchestrator = EnrichmentOrchestrator::new(Duration::from_secs(5))
        .with_network(Arc::new(FailingNetwork))
        .with_behavioral(behavioral())
        .with_evidence(Arc::new(StaticEvidence));

    let profile = orchestrator
        .enrich_at(&input(), EnrichmentOptions::none(), &CancellationToken::new(), now())
        .await;

    assert!(profile.network_graph.is_none());
    assert!(profile.behavioral_signals.is_none());
    assert!(profile.cited_profile.is_none());
    assert_eq!(profile.overall_confidence, 0);
    assert_eq!(profile.next_refresh_recommended, now() + chrono::Duration::days(30));

    let summary = approach_readiness_summary(&profile);
    assert_eq!(summary.status, ApproachReadiness::Neutral);
}

#[tokio::test]
async fn unconfigured_collectors_are_skipped() {
    let orchestrator = EnrichmentOrchestrator::new(Duration::from_secs(5));
    let profile = orchestrator
        .enrich_at(&input(), EnrichmentOptions::deep(), &CancellationToken::new(), now())
        .await;
    assert_eq!(profile.overall_confidence, 0);
    assert_eq!(profile.candidate_id, "cand-1");
}

#[tokio::test]
async fn quick_mode_reaches_collectors() {
    let collector = behavioral();
    let orchestrator = EnrichmentOrchestrator::new(Duration::from_secs(5)).with_behavioral(collector.clone());

    let profile = orchestrator
        .enrich_at(&input(), EnrichmentOptions::quick(), &CancellationToken::new(), now())
        .await;

    assert!(profile.behavioral_signals.is_some());
    assert_eq!(*collector.quick_seen.lock().unwrap(), Some(true));
}

#[tokio::test]
async fn slow_collector_times_out_without_blocking_others() {
    let orchestrator = EnrichmentOrchestrator::new(Duration::from_millis(100))
        .with_network(Arc::new(SlowNetwork))
        .with_behavioral(behavioral());

    let started = Instant::now();
    let profile = orchestrator
        .enrich_at(&input(), EnrichmentOptions::deep(), &CancellationToken::new(), now())
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(profile.network_graph.is_none());
    assert!(profile.behavioral_signals.is_some());
}

#[tokio::test]
async fn cancellation_abandons_in_flight_collectors() {
    let orchestrator = EnrichmentOrchestrator::new(Duration::from_secs(120))
        .with_network(Arc::new(SlowNetwork))
        .with_behavioral(Arc::new(SlowBehavioral));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let profile = orchestrator
        .enrich_at(&input(), EnrichmentOptions::deep(), &cancel, now())
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(profile.network_graph.is_none());
    assert!(profile.behavioral_signals.is_none());
    assert_eq!(profile.overall_confidence, 0);
}

#[test]
fn merge_adds_languages_velocity_and_best_path() {
    let candidate = Candidate {
        id: "cand-1".into(),
        name: "Ana Souza".into(),
        skills: vec!["rust".into(), "Kubernetes".into()],
        ..Default::default()
    };

    let mut graph = graph_with_path(IntroQuality::Warm, "Bruno attended USP - alumni connection");
    graph.warm_intro_paths.push(WarmIntroPath {
        intro_quality: IntroQuality::Hot,
        suggested_approach: "Carla worked at Acme - can provide direct intro and context".into(),
        ..graph.warm_intro_paths[0].clone()
    });

    let profile = talent_enrichment::profile_models::AdvancedCandidateProfile {
        candidate_id: "cand-1".into(),
        network_graph: Some(graph),
        behavioral_signals: Some(signals(Some(github_activity(ActivityTrend::Increasing)))),
        cited_profile: None,
        overall_confidence: 60,
        data_completeness: Default::default(),
        last_updated: now(),
        next_refresh_recommended: now(),
    };

    let merged = merge_advanced_profile(&candidate, &profile);
    assert_eq!(merged.skills, vec!["rust", "Kubernetes", "Go"]);
    assert_eq!(merged.growth_velocity, Some(GrowthVelocity::Rapid));
    assert_eq!(
        merged.connection_path.as_deref(),
        Some("Carla worked at Acme - can provide direct intro and context")
    );
    assert_eq!(merged.updated_at, Some(now()));
    assert!(merged.advanced_profile.is_some());
}

#[test]
fn merge_with_empty_profile_keeps_candidate_fields() {
    let candidate = Candidate {
        id: "cand-1".into(),
        skills: vec!["Rust".into()],
        connection_path: Some("existing".into()),
        ..Default::default()
    };
    let profile = talent_enrichment::profile_models::AdvancedCandidateProfile {
        candidate_id: "cand-1".into(),
        network_graph: None,
        behavioral_signals: Some(signals(Some(github_activity(ActivityTrend::Stable)))),
        cited_profile: None,
        overall_confidence: 0,
        data_completeness: Default::default(),
        last_updated: now(),
        next_refresh_recommended: now(),
    };

    let merged = merge_advanced_profile(&candidate, &profile);
    assert_eq!(merged.connection_path.as_deref(), Some("existing"));
    assert_eq!(merged.growth_velocity, None);
    assert_eq!(merged.skills, vec!["Rust", "Go"]);
}

#[test]
fn merge_keeps_stored_sections_when_new_run_found_nothing() {
    let stored = talent_enrichment::profile_models::AdvancedCandidateProfile {
        candidate_id: "cand-1".into(),
        network_graph: Some(graph_with_path(IntroQuality::Hot, "Ask Bruno")),
        behavioral_signals: Some(signals(Some(github_activity(ActivityTrend::Stable)))),
        cited_profile: Some(placeholder_profile("cand-1", "Ana Souza", now())),
        overall_confidence: 77,
        data_completeness: Default::default(),
        last_updated: now(),
        next_refresh_recommended: now(),
    };
    let candidate = Candidate {
        id: "cand-1".into(),
        advanced_profile: Some(stored.clone()),
        ..Default::default()
    };
    let later = now() + chrono::Duration::days(1);
    let empty_run = talent_enrichment::profile_models::AdvancedCandidateProfile {
        candidate_id: "cand-1".into(),
        network_graph: None,
        behavioral_signals: None,
        cited_profile: None,
        overall_confidence: 0,
        data_completeness: Default::default(),
        last_updated: later,
        next_refresh_recommended: later,
    };

    let merged = merge_advanced_profile(&candidate, &empty_run);
    let profile = merged.advanced_profile.unwrap();
    assert_eq!(profile.network_graph, stored.network_graph);
    assert_eq!(profile.behavioral_signals, stored.behavioral_signals);
    assert_eq!(profile.cited_profile, stored.cited_profile);
    assert_eq!(
        profile.overall_confidence,
        overall_confidence(
            stored.network_graph.as_ref(),
            stored.behavioral_signals.as_ref(),
            stored.cited_profile.as_ref(),
        )
    );
    assert!(profile.overall_confidence > 0);
    assert!(profile.data_completeness.network > 0);
    assert_eq!(profile.last_updated, later);
}

#[test]
fn merge_prefers_fresh_sections_over_stored_ones() {
    let stored = talent_enrichment::profile_models::AdvancedCandidateProfile {
        candidate_id: "cand-1".into(),
        network_graph: Some(graph_with_path(IntroQuality::Warm, "Old approach")),
        behavioral_signals: None,
        cited_profile: None,
        overall_confidence: 50,
        data_completeness: Default::default(),
        last_updated: now(),
        next_refresh_recommended: now(),
    };
    let candidate = Candidate {
        id: "cand-1".into(),
        advanced_profile: Some(stored),
        ..Default::default()
    };
    let fresh = talent_enrichment::profile_models::AdvancedCandidateProfile {
        candidate_id: "cand-1".into(),
        network_graph: Some(graph_with_path(IntroQuality::Hot, "New approach")),
        behavioral_signals: Some(signals(None)),
        cited_profile: None,
        overall_confidence: 0,
        data_completeness: Default::default(),
        last_updated: now(),
        next_refresh_recommended: now(),
    };

    let merged = merge_advanced_profile(&candidate, &fresh);
    let profile = merged.advanced_profile.unwrap();
    assert_eq!(profile.network_graph, fresh.network_graph);
    assert!(profile.behavioral_signals.is_some());
    assert!(profile.cited_profile.is_none());
    assert_eq!(merged.connection_path.as_deref(), Some("New approach"));
}
