use crate::behavioral::extract_github_username;
use crate::config::Config;
use crate::enrichment::{
    approach_readiness_summary, merge_advanced_profile, EnrichmentInput, EnrichmentOptions,
    EnrichmentOrchestrator, ReadinessSummary,
};
use crate::errors::{AppError, RepositoryError, ResultExt};
use crate::github_connection::SocialGraphTraverser;
use crate::models::{Candidate, CandidateFilter, RequirementsConfig, ScoredCandidate};
use crate::network_models::{DirectConnection, GitHubConnectionPath};
use crate::profile_models::AdvancedCandidateProfile;
use crate::repository::Repository;
use crate::scoring::{cap_provisional, AlignmentScorer, ScoringWeights};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Candidate persistence (local store with optional remote mirror).
    pub repository: Arc<dyn Repository>,
    /// Runs the enrichment collectors that are configured.
    pub orchestrator: Arc<EnrichmentOrchestrator>,
    /// GitHub social-graph traversal (optional).
    pub traverser: Option<Arc<SocialGraphTraverser>>,
    /// Scoring constants used when a request does not override them.
    pub weights: ScoringWeights,
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "talent-enrichment",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub requirements: RequirementsConfig,
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub weights: Option<ScoringWeights>,
    /// Cap every score at the configured provisional cap.
    #[serde(default)]
    pub provisional: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub results: Vec<ScoredCandidate>,
    pub total: usize,
    /// Candidates removed by hard-filter mode.
    pub filtered_out: usize,
}

/// POST /api/v1/score
///
/// Ranks the given candidates against one requirements configuration.
/// A malformed configuration is rejected before any candidate is scored.
pub async fn score_candidates(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let total = request.candidates.len();
    tracing::info!(
        "POST /score - {} candidates, {} skills, hard_filter={}",
        total,
        request.requirements.skills.len(),
        request.requirements.hard_filter
    );

    let scorer = AlignmentScorer::new(
        request.requirements,
        request.weights.unwrap_or(state.weights),
    )?;

    let mut results = scorer.rank(request.candidates);
    if request.provisional {
        let cap = state.config.provisional_score_cap;
        for scored in &mut results {
            scored.score = cap_provisional(scored.score, cap);
        }
    }
    for scored in &mut results {
        scored.candidate.alignment_score = scored.score;
        scored.candidate.score_breakdown = Some(scored.breakdown.clone());
    }

    let filtered_out = total - results.len();
    tracing::info!("✓ Scored {} candidates ({} filtered out)", results.len(), filtered_out);

    Ok(Json(ScoreResponse {
        results,
        total,
        filtered_out,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ConnectionRequest {
    /// Reaching-out user; a login or a profile URL.
    pub from: String,
    /// Target user; a login or a profile URL.
    pub to: String,
}

impl ConnectionRequest {
    fn logins(&self) -> Result<(String, String), AppError> {
        let from = github_login(&self.from)?;
        let to = github_login(&self.to)?;
        if from.eq_ignore_ascii_case(&to) {
            return Err(AppError::BadRequest("from and to must be different users".to_string()));
        }
        Ok((from, to))
    }
}

fn github_login(raw: &str) -> Result<String, AppError> {
    let raw = raw.trim().trim_start_matches('@');
    if raw.is_empty() {
        return Err(AppError::BadRequest("GitHub username is required".to_string()));
    }
    if raw.contains("github.com") {
        return extract_github_username(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Not a GitHub profile URL: {}", raw)));
    }
    Ok(raw.to_string())
}

fn traverser(state: &AppState) -> Result<&SocialGraphTraverser, AppError> {
    state
        .traverser
        .as_deref()
        .ok_or_else(|| AppError::ServiceUnavailable("GitHub client is not configured".to_string()))
}

/// POST /api/v1/github/connection-path
pub async fn github_connection_path(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConnectionRequest>,
) -> Result<Json<GitHubConnectionPath>, AppError> {
    let (from, to) = request.logins()?;
    tracing::info!("POST /github/connection-path - {} -> {}", from, to);
    Ok(Json(traverser(&state)?.degree(&from, &to).await))
}

/// POST /api/v1/github/direct-connection
///
/// Cheap variant of the connection-path route: follow flags only.
pub async fn github_direct_connection(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConnectionRequest>,
) -> Result<Json<DirectConnection>, AppError> {
    let (from, to) = request.logins()?;
    tracing::info!("POST /github/direct-connection - {} -> {}", from, to);
    Ok(Json(traverser(&state)?.direct_connection(&from, &to).await))
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentPreset {
    Quick,
    Deep,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichRequest {
    #[serde(flatten)]
    pub input: EnrichmentInput,
    /// Named option set; takes precedence over `options`.
    #[serde(default)]
    pub preset: Option<EnrichmentPreset>,
    #[serde(default)]
    pub options: Option<EnrichmentOptions>,
}

impl EnrichRequest {
    fn resolved_options(&self) -> EnrichmentOptions {
        match (self.preset, self.options) {
            (Some(EnrichmentPreset::Quick), _) => EnrichmentOptions::quick(),
            (Some(EnrichmentPreset::Deep), _) => EnrichmentOptions::deep(),
            (None, Some(options)) => options,
            (None, None) => EnrichmentOptions::default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichResponse {
    pub profile: AdvancedCandidateProfile,
    pub readiness: ReadinessSummary,
    /// Stored candidate after merge-back, when the id was known.
    pub candidate: Option<Candidate>,
}

/// Missing identity fields are taken from the stored record.
fn complete_input(mut input: EnrichmentInput, stored: Option<&Candidate>) -> EnrichmentInput {
    let Some(stored) = stored else {
        return input;
    };
    if input.candidate_name.trim().is_empty() {
        input.candidate_name = stored.name.clone();
    }
    if input.linkedin_url.is_none() {
        input.linkedin_url = stored.linkedin_url.clone();
    }
    if input.github_url.is_none() {
        input.github_url = stored
            .github_username
            .as_ref()
            .map(|login| format!("https://github.com/{}", login));
    }
    input
}

/// POST /api/v1/enrich
///
/// Runs the enabled collectors concurrently. The profile is returned even
/// when some or all of them fail; when the candidate is stored, the profile
/// is merged back onto it.
pub async fn enrich_candidate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EnrichRequest>,
) -> Result<Json<EnrichResponse>, AppError> {
    let options = request.resolved_options();
    let candidate_id = request.input.candidate_id.trim().to_string();
    if candidate_id.is_empty() {
        return Err(AppError::BadRequest("candidateId is required".to_string()));
    }
    tracing::info!("POST /enrich - {} ({:?})", candidate_id, options);

    let stored = match state.repository.get(&candidate_id).await {
        Ok(candidate) => Some(candidate),
        Err(RepositoryError::NotFound(_)) => None,
        Err(e) => {
            tracing::warn!("Could not load candidate {} before enrichment: {}", candidate_id, e);
            None
        }
    };

    let mut input = complete_input(request.input, stored.as_ref());
    input.candidate_id = candidate_id;

    // Cancelled if the request is dropped mid-flight.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let profile = state.orchestrator.enrich(&input, options, &cancel).await;

    let candidate = match stored {
        Some(candidate) => {
            let merged = merge_advanced_profile(&candidate, &profile);
            Some(
                state
                    .repository
                    .update(merged)
                    .await
                    .context("saving enriched candidate")?,
            )
        }
        None => None,
    };

    Ok(Json(EnrichResponse {
        readiness: approach_readiness_summary(&profile),
        profile,
        candidate,
    }))
}

/// GET /api/v1/candidates
pub async fn list_candidates(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<CandidateFilter>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    tracing::debug!("GET /candidates - {:?}", filter);
    let candidates = state.repository.fetch_all(&filter).await?;
    Ok(Json(candidates))
}

/// POST /api/v1/candidates
pub async fn create_candidate(
    State(state): State<Arc<AppState>>,
    Json(candidate): Json<Candidate>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    if candidate.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    let created = state.repository.create(candidate).await?;
    tracing::info!("✓ Created candidate {}", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/candidates/:id
pub async fn get_candidate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Candidate>, AppError> {
    Ok(Json(state.repository.get(&id).await?))
}

/// Shallow JSON merge of `patch` onto `candidate`. The id is never patched.
pub fn apply_patch(candidate: &Candidate, patch: Value) -> Result<Candidate, AppError> {
    let Value::Object(fields) = patch else {
        return Err(AppError::BadRequest("PATCH body must be a JSON object".to_string()));
    };

    let mut current = serde_json::to_value(candidate)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    if let Value::Object(target) = &mut current {
        for (key, value) in fields {
            if key != "id" {
                target.insert(key, value);
            }
        }
    }

    serde_json::from_value(current).map_err(|e| AppError::BadRequest(format!("Invalid candidate field: {}", e)))
}

/// PATCH /api/v1/candidates/:id
pub async fn update_candidate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<Candidate>, AppError> {
    let existing = state.repository.get(&id).await?;
    let patched = apply_patch(&existing, patch)?;
    let updated = state.repository.update(patched).await?;
    tracing::info!("✓ Updated candidate {}", updated.id);
    Ok(Json(updated))
}

/// DELETE /api/v1/candidates/:id
pub async fn delete_candidate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.repository.delete(&id).await?;
    tracing::info!("Deleted candidate {}", id);
    Ok(StatusCode::NO_CONTENT)
}
