use crate::circuit_breaker::RemoteStoreBreaker;
use crate::errors::RepositoryError;
use crate::models::{Candidate, CandidateFilter, CandidateOrder};
use crate::repository::{stamp_new, Repository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Postgres candidate store. The full record lives in a JSONB payload; the
/// columns next to it exist only for filtering and ordering.
#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
    breaker: RemoteStoreBreaker,
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// SELECT for a filter. Kept separate so the SQL can be checked without a database.
pub fn build_filter_query(filter: &CandidateFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT payload FROM candidates WHERE TRUE");

    if let Some(source_type) = &filter.source_type {
        qb.push(" AND lower(source_type) = lower(")
            .push_bind(source_type.clone())
            .push(")");
    }
    if let Some(stage) = &filter.pipeline_stage {
        qb.push(" AND lower(pipeline_stage) = lower(")
            .push_bind(stage.clone())
            .push(")");
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR role_title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    let column = match filter.order_by {
        CandidateOrder::CreatedAt => "created_at",
        CandidateOrder::AlignmentScore => "alignment_score",
        CandidateOrder::Name => "lower(name)",
    };
    let direction = if filter.descending { "DESC" } else { "ASC" };
    qb.push(format!(" ORDER BY {} {}, id ASC", column, direction));

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit as i64);
    }
    if let Some(offset) = filter.offset {
        qb.push(" OFFSET ").push_bind(offset as i64);
    }
    qb
}

impl PgCandidateStore {
    pub fn new(pool: PgPool, breaker: RemoteStoreBreaker) -> Self {
        Self { pool, breaker }
    }

    async fn upsert(&self, candidate: Candidate) -> Result<Candidate, RepositoryError> {
        let pool = self.pool.clone();
        self.breaker
            .call(async move {
                let now = Utc::now();
                let mut candidate = candidate;
                candidate.updated_at = Some(now);
                let created_at = *candidate.created_at.get_or_insert(now);

                sqlx::query(
                    r#"
                    INSERT INTO candidates
                        (id, name, role_title, company, source_type, pipeline_stage,
                         alignment_score, payload, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        role_title = EXCLUDED.role_title,
                        company = EXCLUDED.company,
                        source_type = EXCLUDED.source_type,
                        pipeline_stage = EXCLUDED.pipeline_stage,
                        alignment_score = EXCLUDED.alignment_score,
                        payload = EXCLUDED.payload,
                        updated_at = EXCLUDED.updated_at
                    "#,
                )
                .bind(&candidate.id)
                .bind(&candidate.name)
                .bind(&candidate.current_role)
                .bind(&candidate.company)
                .bind(&candidate.source_type)
                .bind(&candidate.pipeline_stage)
                .bind(candidate.alignment_score as i16)
                .bind(Json(&candidate))
                .bind(created_at)
                .bind(now)
                .execute(&pool)
                .await?;

                tracing::debug!("Stored candidate {} remotely", candidate.id);
                Ok(candidate)
            })
            .await
    }
}

#[async_trait]
impl Repository for PgCandidateStore {
    async fn fetch_all(&self, filter: &CandidateFilter) -> Result<Vec<Candidate>, RepositoryError> {
        let pool = self.pool.clone();
        let mut qb = build_filter_query(filter);
        self.breaker
            .call(async move {
                let rows: Vec<Json<Candidate>> = qb.build_query_scalar().fetch_all(&pool).await?;
                Ok(rows.into_iter().map(|Json(c)| c).collect())
            })
            .await
    }

    async fn get(&self, id: &str) -> Result<Candidate, RepositoryError> {
        let pool = self.pool.clone();
        let id = id.to_string();
        self.breaker
            .call(async move {
                let row: Option<Json<Candidate>> =
                    sqlx::query_scalar("SELECT payload FROM candidates WHERE id = $1")
                        .bind(&id)
                        .fetch_optional(&pool)
                        .await?;
                row.map(|Json(c)| c).ok_or(RepositoryError::NotFound(id))
            })
            .await
    }

    async fn create(&self, candidate: Candidate) -> Result<Candidate, RepositoryError> {
        self.upsert(stamp_new(candidate)).await
    }

    async fn update(&self, candidate: Candidate) -> Result<Candidate, RepositoryError> {
        self.upsert(candidate).await
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let pool = self.pool.clone();
        let id = id.to_string();
        self.breaker
            .call(async move {
                sqlx::query("DELETE FROM candidates WHERE id = $1")
                    .bind(&id)
                    .execute(&pool)
                    .await?;
                Ok(())
            })
            .await
    }
}
