use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BRIGHTDATA_BASE_URL: &str = "https://api.brightdata.com";
pub const DEFAULT_PROFILE_DATASET: &str = "gd_l1viktl72bvl7bjuj0";
pub const DEFAULT_SERP_DATASET: &str = "gd_mfz5x93lmsjjjylob";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Remote store. Without it the repository runs local-only.
    pub database_url: Option<String>,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub brightdata_api_key: Option<String>,
    pub brightdata_base_url: String,
    pub brightdata_profile_dataset: String,
    pub brightdata_serp_dataset: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub source_timeout_secs: u64,
    pub scrape_poll_interval_ms: u64,
    pub scrape_max_attempts: u32,
    pub provisional_score_cap: u8,
    pub local_cache_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            github_token: None,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            brightdata_api_key: None,
            brightdata_base_url: DEFAULT_BRIGHTDATA_BASE_URL.to_string(),
            brightdata_profile_dataset: DEFAULT_PROFILE_DATASET.to_string(),
            brightdata_serp_dataset: DEFAULT_SERP_DATASET.to_string(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            source_timeout_secs: 90,
            scrape_poll_interval_ms: 2000,
            scrape_max_attempts: 30,
            provisional_score_cap: 60,
            local_cache_capacity: 50_000,
        }
    }
}

fn optional_secret(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn http_url(key: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(key).unwrap_or_else(|_| default.to_string());
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", key);
    }
    let parsed = url::Url::parse(url.trim())
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", key, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("{} must start with http:// or https://", key);
    }
    Ok(url.trim().trim_end_matches('/').to_string())
}

fn number<T: std::str::FromStr>(key: &str, default: T, hint: &str) -> anyhow::Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be {}", key, hint)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            port: number("PORT", defaults.port, "a valid number between 1-65535")?,
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })
                .transpose()?,
            github_token: optional_secret("GITHUB_TOKEN"),
            github_api_url: http_url("GITHUB_API_URL", DEFAULT_GITHUB_API_URL)?,
            brightdata_api_key: optional_secret("BRIGHTDATA_API_KEY"),
            brightdata_base_url: http_url("BRIGHTDATA_BASE_URL", DEFAULT_BRIGHTDATA_BASE_URL)?,
            brightdata_profile_dataset: optional_secret("BRIGHTDATA_PROFILE_DATASET")
                .unwrap_or(defaults.brightdata_profile_dataset),
            brightdata_serp_dataset: optional_secret("BRIGHTDATA_SERP_DATASET")
                .unwrap_or(defaults.brightdata_serp_dataset),
            gemini_api_key: optional_secret("GEMINI_API_KEY"),
            gemini_base_url: http_url("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL)?,
            gemini_model: optional_secret("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            source_timeout_secs: number(
                "SOURCE_TIMEOUT_SECS",
                defaults.source_timeout_secs,
                "a whole number of seconds",
            )?,
            scrape_poll_interval_ms: number(
                "SCRAPE_POLL_INTERVAL_MS",
                defaults.scrape_poll_interval_ms,
                "a whole number of milliseconds",
            )?,
            scrape_max_attempts: number(
                "SCRAPE_MAX_ATTEMPTS",
                defaults.scrape_max_attempts,
                "a positive whole number",
            )?,
            provisional_score_cap: number(
                "PROVISIONAL_SCORE_CAP",
                defaults.provisional_score_cap,
                "a number between 1-100",
            )?,
            local_cache_capacity: number(
                "LOCAL_CACHE_CAPACITY",
                defaults.local_cache_capacity,
                "a positive whole number",
            )?,
        };

        if config.provisional_score_cap == 0 || config.provisional_score_cap > 100 {
            anyhow::bail!("PROVISIONAL_SCORE_CAP must be a number between 1-100");
        }
        if config.scrape_max_attempts == 0 {
            anyhow::bail!("SCRAPE_MAX_ATTEMPTS must be a positive whole number");
        }
        if config.source_timeout_secs == 0 {
            anyhow::bail!("SOURCE_TIMEOUT_SECS must be a whole number of seconds");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match config.database_url {
            Some(ref url) => tracing::debug!("Database URL: {}...", &url[..20.min(url.len())]),
            None => tracing::warn!("No DATABASE_URL set, candidates are kept in the local store only"),
        }
        tracing::debug!("GitHub API URL: {}", config.github_api_url);
        if config.brightdata_api_key.is_none() {
            tracing::info!("BRIGHTDATA_API_KEY not set, network and job-change signals are skipped");
        }
        if config.gemini_api_key.is_none() {
            tracing::info!("GEMINI_API_KEY not set, cited evidence is skipped");
        }
        tracing::debug!("Source timeout: {}s", config.source_timeout_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}
