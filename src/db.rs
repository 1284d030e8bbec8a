use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

const CREATE_CANDIDATES: &str = r#"
CREATE TABLE IF NOT EXISTS candidates (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL DEFAULT '',
    role_title      TEXT NOT NULL DEFAULT '',
    company         TEXT NOT NULL DEFAULT '',
    source_type     TEXT,
    pipeline_stage  TEXT,
    alignment_score SMALLINT NOT NULL DEFAULT 0,
    payload         JSONB NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS candidates_source_type_idx ON candidates (source_type)",
    "CREATE INDEX IF NOT EXISTS candidates_created_at_idx ON candidates (created_at)",
];

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Create the candidate table if it does not exist yet.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_CANDIDATES).execute(&self.pool).await?;
        for statement in CREATE_INDEXES {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Candidate schema ready");
        Ok(())
    }
}
