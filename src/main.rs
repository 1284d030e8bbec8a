use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use talent_enrichment::behavioral::BehavioralSignalCollector;
use talent_enrichment::circuit_breaker::RemoteStoreBreaker;
use talent_enrichment::cited_evidence::CitedEvidenceBuilder;
use talent_enrichment::clients::{SourceGraphClient, WebSearchClient};
use talent_enrichment::config::Config;
use talent_enrichment::db::Database;
use talent_enrichment::db_storage::PgCandidateStore;
use talent_enrichment::enrichment::EnrichmentOrchestrator;
use talent_enrichment::github_connection::{SocialGraphTraverser, TraversalLimits};
use talent_enrichment::handlers::{self, AppState};
use talent_enrichment::network_graph::{ConnectionGraphBuilder, InfluenceTiers};
use talent_enrichment::obs;
use talent_enrichment::repository::{FallbackRepository, LocalCandidateStore, Repository};
use talent_enrichment::scoring::ScoringWeights;
use talent_enrichment::scraping_client::{BrightDataClient, PollSettings, ProfileScraper};
use talent_enrichment::services::{GeminiClient, GitHubClient};

/// Remote store when configured and reachable. A store that cannot be reached
/// at startup is logged and skipped; the service then runs local-only.
async fn remote_store(config: &Config) -> Option<Arc<dyn Repository>> {
    let url = config.database_url.as_deref()?;
    let db = match Database::new(url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to remote store: {}", e);
            return None;
        }
    };
    if let Err(e) = db.ensure_schema().await {
        tracing::error!("Failed to prepare candidate schema: {}", e);
        return None;
    }
    tracing::info!("✓ Remote candidate store connected");
    Some(Arc::new(PgCandidateStore::new(db.pool, RemoteStoreBreaker::default())))
}

/// Wire every collector whose credentials are present.
fn build_orchestrator(
    config: &Config,
    github: Option<Arc<dyn SourceGraphClient>>,
) -> EnrichmentOrchestrator {
    let mut orchestrator = EnrichmentOrchestrator::new(config.source_timeout());

    let brightdata = match BrightDataClient::new(config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::info!("Scraping client disabled: {}", e);
            None
        }
    };
    let scraper = brightdata
        .clone()
        .map(|client| ProfileScraper::new(client, PollSettings::from_config(config)));

    if let Some(scraper) = scraper.clone() {
        orchestrator = orchestrator.with_network(Arc::new(ConnectionGraphBuilder::new(
            scraper,
            InfluenceTiers::default(),
        )));
        tracing::info!("✓ Network collector enabled");
    }

    if let Some(github) = github {
        let search = brightdata.map(|client| client as Arc<dyn WebSearchClient>);
        orchestrator = orchestrator.with_behavioral(Arc::new(BehavioralSignalCollector::new(
            github, scraper, search,
        )));
        tracing::info!("✓ Behavioral collector enabled");
    }

    match GeminiClient::new(config) {
        Ok(client) => {
            orchestrator =
                orchestrator.with_evidence(Arc::new(CitedEvidenceBuilder::new(Arc::new(client))));
            tracing::info!("✓ Cited evidence collector enabled ({})", config.gemini_model);
        }
        Err(e) => tracing::info!("Cited evidence collector disabled: {}", e),
    }

    orchestrator
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing();

    let config = Config::from_env()?;

    let local = Arc::new(LocalCandidateStore::new(config.local_cache_capacity));
    let repository = FallbackRepository::new(local, remote_store(&config).await);

    let github: Option<Arc<dyn SourceGraphClient>> = match GitHubClient::new(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::error!("Failed to initialize GitHub client: {}", e);
            None
        }
    };
    let traverser = github
        .clone()
        .map(|client| Arc::new(SocialGraphTraverser::new(client, TraversalLimits::default())));

    let app_state = Arc::new(AppState {
        orchestrator: Arc::new(build_orchestrator(&config, github)),
        repository: Arc::new(repository),
        traverser,
        weights: ScoringWeights::default(),
        config: config.clone(),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );

    let protected_routes = Router::new()
        .route("/api/v1/score", post(handlers::score_candidates))
        .route("/api/v1/github/connection-path", post(handlers::github_connection_path))
        .route("/api/v1/github/direct-connection", post(handlers::github_direct_connection))
        .route("/api/v1/enrich", post(handlers::enrich_candidate))
        .route(
            "/api/v1/candidates",
            get(handlers::list_candidates).post(handlers::create_candidate),
        )
        .route(
            "/api/v1/candidates/:id",
            get(handlers::get_candidate)
                .patch(handlers::update_candidate)
                .delete(handlers::delete_candidate),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 5MB max payload
                .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
