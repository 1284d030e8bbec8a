//! Advanced enrichment: run the network, behavioral and cited-evidence
//! collectors side by side and fold their results into one profile.
//!
//! Every collector is optional. A collector that is disabled, unconfigured,
//! failing, slow or cancelled simply leaves its section absent; the profile
//! is still returned and the confidence/completeness metrics say how much
//! of it is there.
use crate::behavioral::{BehavioralInput, BehavioralSignalCollector, PreviousRole};
use crate::cited_evidence::CitedEvidenceBuilder;
use crate::errors::SourceError;
use crate::models::{Candidate, GrowthVelocity};
use crate::network_graph::ConnectionGraphBuilder;
use crate::network_models::NetworkGraph;
use crate::profile_models::{
    ActivityTrend, AdvancedCandidateProfile, ApproachReadiness, BehavioralSignals, CitedProfile,
    DataCompleteness, EvidenceSource, Significance, VerificationStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrichmentInput {
    pub candidate_id: String,
    pub candidate_name: String,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub evidence_sources: Vec<EvidenceSource>,
    pub team_linkedin_urls: Vec<String>,
    pub previous_profile: Option<PreviousRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrichmentOptions {
    pub include_network_analysis: bool,
    pub include_behavioral_signals: bool,
    pub include_cited_evidence: bool,
    /// Swap each collector for its cheaper variant.
    pub quick_mode: bool,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self::deep()
    }
}

impl EnrichmentOptions {
    /// Initial screening: no generative extraction, cheap variants.
    pub fn quick() -> Self {
        Self {
            include_network_analysis: true,
            include_behavioral_signals: true,
            include_cited_evidence: false,
            quick_mode: true,
        }
    }

    /// Shortlisted candidates: everything, full variants.
    pub fn deep() -> Self {
        Self {
            include_network_analysis: true,
            include_behavioral_signals: true,
            include_cited_evidence: true,
            quick_mode: false,
        }
    }

    pub fn none() -> Self {
        Self {
            include_network_analysis: false,
            include_behavioral_signals: false,
            include_cited_evidence: false,
            quick_mode: false,
        }
    }
}

#[async_trait]
pub trait NetworkCollector: Send + Sync {
    async fn collect_network(&self, input: &EnrichmentInput, quick: bool) -> Result<NetworkGraph, SourceError>;
}

#[async_trait]
pub trait BehavioralCollector: Send + Sync {
    async fn collect_behavioral(
        &self,
        input: &EnrichmentInput,
        quick: bool,
        now: DateTime<Utc>,
    ) -> Result<BehavioralSignals, SourceError>;
}

#[async_trait]
pub trait EvidenceCollector: Send + Sync {
    async fn collect_evidence(&self, input: &EnrichmentInput, now: DateTime<Utc>) -> Result<CitedProfile, SourceError>;
}

#[async_trait]
impl NetworkCollector for ConnectionGraphBuilder {
    async fn collect_network(&self, input: &EnrichmentInput, quick: bool) -> Result<NetworkGraph, SourceError> {
        let url = input
            .linkedin_url
            .as_deref()
            .ok_or(SourceError::ConfigurationMissing("linkedin url"))?;
        if quick {
            self.quick_scan(&input.candidate_id, url).await
        } else {
            self.build(&input.candidate_id, url, &input.team_linkedin_urls).await
        }
    }
}

#[async_trait]
impl BehavioralCollector for BehavioralSignalCollector {
    async fn collect_behavioral(
        &self,
        input: &EnrichmentInput,
        quick: bool,
        now: DateTime<Utc>,
    ) -> Result<BehavioralSignals, SourceError> {
        if quick {
            return self
                .quick_check(&input.candidate_id, input.github_url.as_deref(), now)
                .await;
        }
        let behavioral = BehavioralInput {
            candidate_id: input.candidate_id.clone(),
            name: input.candidate_name.clone(),
            linkedin_url: input.linkedin_url.clone(),
            github_url: input.github_url.clone(),
            previous: input.previous_profile.clone(),
        };
        self.collect(&behavioral, now).await
    }
}

#[async_trait]
impl EvidenceCollector for CitedEvidenceBuilder {
    async fn collect_evidence(&self, input: &EnrichmentInput, now: DateTime<Utc>) -> Result<CitedProfile, SourceError> {
        if input.evidence_sources.is_empty() {
            return Err(SourceError::ConfigurationMissing("evidence sources"));
        }
        self.build(&input.candidate_id, &input.candidate_name, &input.evidence_sources, now)
            .await
    }
}

/// Await one collector under a deadline and the shared cancellation token.
/// Every failure mode becomes `None`.
async fn settle<T, F>(name: &'static str, deadline: Duration, cancel: &CancellationToken, work: F) -> Option<T>
where
    F: Future<Output = Result<T, SourceError>>,
{
    let outcome = tokio::select! {
        _ = cancel.cancelled() => Err(SourceError::Cancelled(name)),
        result = tokio::time::timeout(deadline, work) => {
            result.unwrap_or_else(|_| Err(SourceError::Timeout(name, deadline)))
        }
    };

    match outcome {
        Ok(value) => Some(value),
        Err(SourceError::ConfigurationMissing(what)) => {
            tracing::debug!("Skipping {} collector: {} not configured", name, what);
            None
        }
        Err(e @ SourceError::Timeout(..)) => {
            tracing::warn!("⏱ {} collector timed out: {}", name, e);
            None
        }
        Err(e @ SourceError::Cancelled(_)) => {
            tracing::warn!("{} collector cancelled: {}", name, e);
            None
        }
        Err(e) => {
            tracing::warn!("❌ {} collector failed: {}", name, e);
            None
        }
    }
}

pub struct EnrichmentOrchestrator {
    network: Option<Arc<dyn NetworkCollector>>,
    behavioral: Option<Arc<dyn BehavioralCollector>>,
    evidence: Option<Arc<dyn EvidenceCollector>>,
    source_timeout: Duration,
}

impl EnrichmentOrchestrator {
    pub fn new(source_timeout: Duration) -> Self {
        Self {
            network: None,
            behavioral: None,
            evidence: None,
            source_timeout,
        }
    }

    pub fn with_network(mut self, collector: Arc<dyn NetworkCollector>) -> Self {
        self.network = Some(collector);
        self
    }

    pub fn with_behavioral(mut self, collector: Arc<dyn BehavioralCollector>) -> Self {
        self.behavioral = Some(collector);
        self
    }

    pub fn with_evidence(mut self, collector: Arc<dyn EvidenceCollector>) -> Self {
        self.evidence = Some(collector);
        self
    }

    pub async fn enrich(
        &self,
        input: &EnrichmentInput,
        options: EnrichmentOptions,
        cancel: &CancellationToken,
    ) -> AdvancedCandidateProfile {
        self.enrich_at(input, options, cancel, Utc::now()).await
    }

    pub async fn enrich_at(
        &self,
        input: &EnrichmentInput,
        options: EnrichmentOptions,
        cancel: &CancellationToken,
        now: DateTime<Utc>,
    ) -> AdvancedCandidateProfile {
        tracing::info!(
            "🔍 Enriching {} (network={}, behavioral={}, cited={}, quick={})",
            input.candidate_id,
            options.include_network_analysis,
            options.include_behavioral_signals,
            options.include_cited_evidence,
            options.quick_mode
        );
        let quick = options.quick_mode;
        let deadline = self.source_timeout;

        let network = async {
            match (&self.network, options.include_network_analysis) {
                (Some(c), true) => settle("network", deadline, cancel, c.collect_network(input, quick)).await,
                (None, true) => {
                    tracing::debug!("Skipping network collector: not configured");
                    None
                }
                _ => None,
            }
        };
        let behavioral = async {
            match (&self.behavioral, options.include_behavioral_signals) {
                (Some(c), true) => {
                    settle("behavioral", deadline, cancel, c.collect_behavioral(input, quick, now)).await
                }
                (None, true) => {
                    tracing::debug!("Skipping behavioral collector: not configured");
                    None
                }
                _ => None,
            }
        };
        // Generative extraction has no quick variant.
        let cited = async {
            match (&self.evidence, options.include_cited_evidence) {
                (Some(c), true) => settle("cited evidence", deadline, cancel, c.collect_evidence(input, now)).await,
                (None, true) => {
                    tracing::debug!("Skipping cited evidence collector: not configured");
                    None
                }
                _ => None,
            }
        };

        let (network_graph, behavioral_signals, cited_profile) = tokio::join!(network, behavioral, cited);

        let profile = AdvancedCandidateProfile {
            candidate_id: input.candidate_id.clone(),
            overall_confidence: overall_confidence(
                network_graph.as_ref(),
                behavioral_signals.as_ref(),
                cited_profile.as_ref(),
            ),
            data_completeness: data_completeness(
                network_graph.as_ref(),
                behavioral_signals.as_ref(),
                cited_profile.as_ref(),
            ),
            next_refresh_recommended: next_refresh(behavioral_signals.as_ref(), now),
            last_updated: now,
            network_graph,
            behavioral_signals,
            cited_profile,
        };

        tracing::info!(
            "✓ Enriched {}: network={}, behavioral={}, cited={}, confidence={}",
            profile.candidate_id,
            profile.network_graph.is_some(),
            profile.behavioral_signals.is_some(),
            profile.cited_profile.is_some(),
            profile.overall_confidence
        );
        profile
    }
}

/// Richness of a network graph, 50..=100.
pub fn network_confidence(graph: &NetworkGraph) -> u32 {
    let mut score = 50;
    if !graph.warm_intro_paths.is_empty() {
        score += 20;
    }
    if !graph.mutual_connections.is_empty() {
        score += 15;
    }
    if !graph.shared_employers.is_empty() {
        score += 10;
    }
    if graph.industry_influence.thought_leadership_score > 50 {
        score += 5;
    }
    score.min(100)
}

/// Richness of behavioral signals, 50..=100.
pub fn behavioral_confidence(signals: &BehavioralSignals) -> u32 {
    let mut score = 50;
    if signals.github.is_some() {
        score += 20;
    }
    if !signals.speaking_engagements.is_empty() {
        score += 15;
    }
    if !signals.content_activity.is_empty() {
        score += 10;
    }
    if signals.approach_readiness != ApproachReadiness::Neutral {
        score += 5;
    }
    score.min(100)
}

/// Unweighted mean over the sources that are present. No sources, no confidence.
pub fn overall_confidence(
    network: Option<&NetworkGraph>,
    behavioral: Option<&BehavioralSignals>,
    cited: Option<&CitedProfile>,
) -> u32 {
    let scores: Vec<u32> = [
        network.map(network_confidence),
        behavioral.map(behavioral_confidence),
        cited.map(|c| c.data_quality_score),
    ]
    .into_iter()
    .flatten()
    .collect();

    if scores.is_empty() {
        return 0;
    }
    (scores.iter().sum::<u32>() as f64 / scores.len() as f64).round() as u32
}

pub fn data_completeness(
    network: Option<&NetworkGraph>,
    behavioral: Option<&BehavioralSignals>,
    cited: Option<&CitedProfile>,
) -> DataCompleteness {
    let points = |fields: &[(bool, u32)]| -> u32 {
        fields.iter().filter(|(present, _)| *present).map(|(_, p)| p).sum::<u32>().min(100)
    };

    DataCompleteness {
        network: network.map_or(0, |n| {
            points(&[
                (!n.nodes.is_empty(), 20),
                (!n.edges.is_empty(), 20),
                (!n.warm_intro_paths.is_empty(), 20),
                (!n.shared_employers.is_empty(), 20),
                (n.industry_influence.thought_leadership_score > 0, 20),
            ])
        }),
        behavioral: behavioral.map_or(0, |b| {
            points(&[
                (b.github.is_some(), 25),
                (!b.speaking_engagements.is_empty(), 25),
                (!b.job_change_signals.is_empty(), 25),
                (!b.content_activity.is_empty(), 25),
            ])
        }),
        cited: cited.map_or(0, |c| {
            points(&[
                (c.name.verification_status == VerificationStatus::Verified, 15),
                (c.headline.is_some(), 10),
                (c.location.is_some(), 10),
                (!c.experiences.is_empty(), 25),
                (!c.skills.is_empty(), 25),
                (!c.education.is_empty(), 15),
            ])
        }),
    }
}

/// 3 days when ready to move, 7 after a significant job signal, otherwise 30.
pub fn next_refresh(behavioral: Option<&BehavioralSignals>, now: DateTime<Utc>) -> DateTime<Utc> {
    let days = match behavioral {
        Some(b) if b.approach_readiness == ApproachReadiness::Ready => 3,
        Some(b) if b.job_change_signals.iter().any(|s| s.significance == Significance::High) => 7,
        _ => 30,
    };
    now + ChronoDuration::days(days)
}

/// Fold an enrichment result into a candidate. Absent sections leave fields untouched.
pub fn merge_advanced_profile(candidate: &Candidate, profile: &AdvancedCandidateProfile) -> Candidate {
    let mut merged = candidate.clone();

    if let Some(github) = profile.behavioral_signals.as_ref().and_then(|b| b.github.as_ref()) {
        for share in &github.top_languages {
            let known = merged
                .skills
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(share.language.trim()));
            if !known {
                merged.skills.push(share.language.clone());
            }
        }
        if github.activity_trend == ActivityTrend::Increasing {
            merged.growth_velocity = Some(GrowthVelocity::Rapid);
        }
    }

    if let Some(path) = profile.network_graph.as_ref().and_then(|g| g.best_path()) {
        merged.connection_path = Some(path.suggested_approach.clone());
        merged.shared_context = path.common_ground.clone();
    }

    merged.advanced_profile = Some(combine_profiles(candidate.advanced_profile.as_ref(), profile));
    merged.updated_at = Some(profile.last_updated);
    merged
}

/// Section-by-section union: a section missing from `fresh` keeps the stored one.
/// Confidence, completeness and refresh are recomputed over the combined sections.
pub fn combine_profiles(
    stored: Option<&AdvancedCandidateProfile>,
    fresh: &AdvancedCandidateProfile,
) -> AdvancedCandidateProfile {
    let Some(stored) = stored else {
        return fresh.clone();
    };

    let network_graph = fresh.network_graph.clone().or_else(|| stored.network_graph.clone());
    let behavioral_signals = fresh
        .behavioral_signals
        .clone()
        .or_else(|| stored.behavioral_signals.clone());
    let cited_profile = fresh.cited_profile.clone().or_else(|| stored.cited_profile.clone());

    AdvancedCandidateProfile {
        candidate_id: fresh.candidate_id.clone(),
        overall_confidence: overall_confidence(
            network_graph.as_ref(),
            behavioral_signals.as_ref(),
            cited_profile.as_ref(),
        ),
        data_completeness: data_completeness(
            network_graph.as_ref(),
            behavioral_signals.as_ref(),
            cited_profile.as_ref(),
        ),
        next_refresh_recommended: next_refresh(behavioral_signals.as_ref(), fresh.last_updated),
        last_updated: fresh.last_updated,
        network_graph,
        behavioral_signals,
        cited_profile,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessSummary {
    pub status: ApproachReadiness,
    pub headline: String,
    pub details: Vec<String>,
    pub best_time_to_reach: String,
}

pub fn approach_readiness_summary(profile: &AdvancedCandidateProfile) -> ReadinessSummary {
    let Some(behavioral) = &profile.behavioral_signals else {
        return ReadinessSummary {
            status: ApproachReadiness::Neutral,
            headline: "Insufficient data for readiness assessment".to_string(),
            details: vec!["No behavioral signals collected".to_string()],
            best_time_to_reach: "Standard timing recommended".to_string(),
        };
    };

    let mut details = Vec::new();
    if behavioral.open_to_work_signal {
        details.push("\"Open to Work\" signal detected on LinkedIn".to_string());
    }
    if behavioral.github.as_ref().map(|g| g.activity_trend) == Some(ActivityTrend::Increasing) {
        details.push("GitHub activity increasing - technically engaged".to_string());
    }
    if !behavioral.speaking_engagements.is_empty() {
        details.push(format!(
            "{} speaking engagement(s) found",
            behavioral.speaking_engagements.len()
        ));
    }
    let high = behavioral
        .job_change_signals
        .iter()
        .filter(|s| s.significance == Significance::High)
        .count();
    if high > 0 {
        details.push(format!("{} significant job signal(s) detected", high));
    }
    if behavioral.content_activity.len() > 3 {
        details.push("Active content creator - thought leader potential".to_string());
    }
    if details.is_empty() {
        details.push("No specific signals detected".to_string());
    }

    let headline = match behavioral.approach_readiness {
        ApproachReadiness::Ready => "High approach readiness - consider reaching out soon",
        ApproachReadiness::Neutral => "Moderate approach readiness - standard outreach recommended",
        ApproachReadiness::NotReady => "Low approach readiness - consider timing carefully",
    };

    ReadinessSummary {
        status: behavioral.approach_readiness,
        headline: headline.to_string(),
        details,
        best_time_to_reach: behavioral.best_time_to_reach.clone(),
    }
}
