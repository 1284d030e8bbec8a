//! Candidate persistence.
//!
//! [`FallbackRepository`] composes a local store and an optional remote store:
//! writes land locally first and are then mirrored remotely on a best-effort
//! basis; reads prefer the remote store and fall back to the local one.

use crate::cache_validator::{EntryState, ValidatedCacheEntry};
use crate::errors::RepositoryError;
use crate::models::{Candidate, CandidateFilter, CandidateOrder};
use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use std::cmp::Ordering;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait Repository: Send + Sync {
    async fn fetch_all(&self, filter: &CandidateFilter) -> Result<Vec<Candidate>, RepositoryError>;
    async fn get(&self, id: &str) -> Result<Candidate, RepositoryError>;
    async fn create(&self, candidate: Candidate) -> Result<Candidate, RepositoryError>;
    /// Insert-or-replace by id.
    async fn update(&self, candidate: Candidate) -> Result<Candidate, RepositoryError>;
    /// Deleting a missing id is not an error.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

/// Give a new record an id and timestamps, keeping any the caller supplied.
pub fn stamp_new(mut candidate: Candidate) -> Candidate {
    let now = Utc::now();
    if candidate.id.trim().is_empty() {
        candidate.id = Uuid::new_v4().to_string();
    }
    candidate.created_at.get_or_insert(now);
    candidate.updated_at = Some(now);
    candidate
}

fn matches_filter(candidate: &Candidate, filter: &CandidateFilter) -> bool {
    let eq = |want: &Option<String>, have: &Option<String>| match want {
        Some(want) => have.as_deref().is_some_and(|h| h.eq_ignore_ascii_case(want)),
        None => true,
    };
    let search = match filter.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            let term = term.to_lowercase();
            [&candidate.name, &candidate.current_role, &candidate.company]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        }
        _ => true,
    };
    search && eq(&filter.source_type, &candidate.source_type) && eq(&filter.pipeline_stage, &candidate.pipeline_stage)
}

/// In-memory filtering, ordering and paging. The remote store does the same in SQL.
pub fn apply_filter(candidates: Vec<Candidate>, filter: &CandidateFilter) -> Vec<Candidate> {
    let mut selected: Vec<Candidate> = candidates.into_iter().filter(|c| matches_filter(c, filter)).collect();

    selected.sort_by(|a, b| {
        let ordering = match filter.order_by {
            CandidateOrder::CreatedAt => a.created_at.cmp(&b.created_at),
            CandidateOrder::AlignmentScore => a.alignment_score.cmp(&b.alignment_score),
            CandidateOrder::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        let ordering = if filter.descending { ordering.reverse() } else { ordering };
        match ordering {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        }
    });

    selected
        .into_iter()
        .skip(filter.offset.unwrap_or(0))
        .take(filter.limit.unwrap_or(usize::MAX))
        .collect()
}

/// Process-local candidate store backed by an unbounded moka cache.
/// It may hold the only copy of a record, so nothing is ever evicted.
/// Entries are kept as checksummed JSON.
#[derive(Clone)]
pub struct LocalCandidateStore {
    entries: Cache<String, String>,
}

impl LocalCandidateStore {
    /// `initial_capacity` only pre-sizes the table; the store grows past it.
    pub fn new(initial_capacity: u64) -> Self {
        let initial_capacity = usize::try_from(initial_capacity).unwrap_or(usize::MAX);
        Self {
            entries: Cache::builder().initial_capacity(initial_capacity).build(),
        }
    }

    async fn put(&self, candidate: &Candidate) -> Result<(), RepositoryError> {
        let sealed = ValidatedCacheEntry::seal(candidate)?;
        self.entries.insert(candidate.id.clone(), sealed).await;
        Ok(())
    }

    fn open(id: &str, stored: &str) -> Result<Candidate, RepositoryError> {
        ValidatedCacheEntry::open(stored).map_err(|state| {
            tracing::warn!("Local entry {} unusable ({:?})", id, state);
            RepositoryError::Corrupted(id.to_string())
        })
    }

    /// Replace the local contents for these ids without touching others.
    pub async fn warm(&self, candidates: &[Candidate]) {
        for candidate in candidates {
            if let Err(e) = self.put(candidate).await {
                tracing::warn!("Could not cache candidate {}: {}", candidate.id, e);
            }
        }
    }

    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Repository for LocalCandidateStore {
    async fn fetch_all(&self, filter: &CandidateFilter) -> Result<Vec<Candidate>, RepositoryError> {
        let candidates: Vec<Candidate> = self
            .entries
            .iter()
            .filter_map(|(id, stored)| Self::open(&id, &stored).ok())
            .collect();
        Ok(apply_filter(candidates, filter))
    }

    async fn get(&self, id: &str) -> Result<Candidate, RepositoryError> {
        match self.entries.get(id).await {
            Some(stored) => match Self::open(id, &stored) {
                Ok(candidate) => Ok(candidate),
                Err(_) => {
                    self.entries.invalidate(id).await;
                    Err(RepositoryError::NotFound(id.to_string()))
                }
            },
            None => Err(RepositoryError::NotFound(id.to_string())),
        }
    }

    async fn create(&self, candidate: Candidate) -> Result<Candidate, RepositoryError> {
        let candidate = stamp_new(candidate);
        self.put(&candidate).await?;
        Ok(candidate)
    }

    async fn update(&self, mut candidate: Candidate) -> Result<Candidate, RepositoryError> {
        candidate.updated_at = Some(Utc::now());
        self.put(&candidate).await?;
        Ok(candidate)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.entries.invalidate(id).await;
        Ok(())
    }
}

/// Local-first writes, remote-first reads.
#[derive(Clone)]
pub struct FallbackRepository {
    local: Arc<LocalCandidateStore>,
    remote: Option<Arc<dyn Repository>>,
}

impl FallbackRepository {
    pub fn new(local: Arc<LocalCandidateStore>, remote: Option<Arc<dyn Repository>>) -> Self {
        if remote.is_none() {
            tracing::info!("No remote store configured, candidates are kept locally only");
        }
        Self { local, remote }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }
}

#[async_trait]
impl Repository for FallbackRepository {
    async fn fetch_all(&self, filter: &CandidateFilter) -> Result<Vec<Candidate>, RepositoryError> {
        if let Some(remote) = &self.remote {
            match remote.fetch_all(filter).await {
                Ok(candidates) => {
                    self.local.warm(&candidates).await;
                    return Ok(candidates);
                }
                Err(e) => tracing::warn!("Remote fetch_all failed, serving local store: {}", e),
            }
        }
        self.local.fetch_all(filter).await
    }

    async fn get(&self, id: &str) -> Result<Candidate, RepositoryError> {
        if let Some(remote) = &self.remote {
            match remote.get(id).await {
                Ok(candidate) => {
                    self.local.warm(std::slice::from_ref(&candidate)).await;
                    return Ok(candidate);
                }
                // Not remote yet does not mean not local: a mirror write may have failed.
                Err(RepositoryError::NotFound(_)) => {}
                Err(e) => tracing::warn!("Remote get {} failed, serving local store: {}", id, e),
            }
        }
        self.local.get(id).await
    }

    async fn create(&self, candidate: Candidate) -> Result<Candidate, RepositoryError> {
        let candidate = self.local.create(candidate).await?;
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.update(candidate.clone()).await {
                tracing::warn!("Remote create {} failed, kept locally: {}", candidate.id, e);
            }
        }
        Ok(candidate)
    }

    async fn update(&self, candidate: Candidate) -> Result<Candidate, RepositoryError> {
        let candidate = self.local.update(candidate).await?;
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.update(candidate.clone()).await {
                tracing::warn!("Remote update {} failed, kept locally: {}", candidate.id, e);
            }
        }
        Ok(candidate)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.local.delete(id).await?;
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.delete(id).await {
                tracing::warn!("Remote delete {} failed: {}", id, e);
            }
        }
        Ok(())
    }
}
