//! Talent Enrichment Library
//!
//! Scores candidates against a job's requirements and enriches them with
//! professional-network, GitHub social-graph, behavioral and cited-evidence
//! signals gathered from external sources.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `data`: Data access layer.
//! - `integrations`: External service integrations.
//! - `obs`: Observability and logging.
//! - `behavioral`: Behavioral-signal collection and readiness heuristics.
//! - `cache_validator`: Checksummed entries for the local store.
//! - `circuit_breaker`: Circuit breaker for the remote store.
//! - `cited_evidence`: Source-cited profile assembly.
//! - `clients`: Collaborator traits for external sources.
//! - `config`: Configuration management.
//! - `db`: Database connection and schema.
//! - `db_storage`: Postgres candidate store.
//! - `enrichment`: Enrichment orchestration and merge-back.
//! - `errors`: Error handling types.
//! - `github_connection`: GitHub connection-degree traversal.
//! - `handlers`: HTTP request handlers.
//! - `models`: Candidate and scoring models.
//! - `network_graph`: Professional connection graph and warm intros.
//! - `network_models`, `profile_models`: Enrichment result models.
//! - `repository`: Repository trait, local store and fallback.
//! - `scoring`: Alignment scoring.
//! - `scraping_client`: Profile scraping and payload normalization.
//! - `services`: GitHub and generative-text clients.
//! - `skill_matcher`: Skill signal matching.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;
pub mod obs;

pub mod behavioral;
pub mod cache_validator;
pub mod circuit_breaker;
pub mod cited_evidence;
pub mod clients;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod enrichment;
pub mod errors;
pub mod github_connection;
pub mod handlers;
pub mod models;
pub mod network_graph;
pub mod network_models;
pub mod profile_models;
pub mod repository;
pub mod scoring;
pub mod scraping_client;
pub mod services;
pub mod skill_matcher;
