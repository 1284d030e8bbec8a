use crate::clients::{ProfileScrapingClient, ScrapeState, ScrapeStatus, SearchResult, WebSearchClient};
use crate::config::Config;
use crate::errors::{ParseError, SourceError};
use crate::network_models::{Education, Endorsement, Experience, ProfessionalProfile};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

const SOURCE: &str = "profile scraper";

/// Polling cadence for asynchronous scrape jobs.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 30,
        }
    }
}

impl PollSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: Duration::from_millis(config.scrape_poll_interval_ms),
            max_attempts: config.scrape_max_attempts,
        }
    }
}

/// Wait for a triggered job and return its raw result.
///
/// Sleeps before every status check. Gives up when the job fails, the status
/// endpoint errors, or `max_attempts` checks pass without a ready result.
pub async fn await_snapshot<C>(
    client: &C,
    job_id: &str,
    poll: PollSettings,
) -> Result<Value, SourceError>
where
    C: ProfileScrapingClient + ?Sized,
{
    for attempt in 1..=poll.max_attempts {
        tokio::time::sleep(poll.interval).await;

        let ScrapeStatus {
            state,
            record_count,
        } = client.poll_status(job_id).await?;

        match state {
            ScrapeState::Ready if record_count > 0 => {
                tracing::debug!("Snapshot {} ready after {} polls", job_id, attempt);
                return client.fetch_result(job_id).await;
            }
            ScrapeState::Ready => {
                return Err(SourceError::unavailable(SOURCE, format!("snapshot {} is empty", job_id)));
            }
            ScrapeState::Failed => {
                return Err(SourceError::unavailable(SOURCE, format!("snapshot {} failed", job_id)));
            }
            ScrapeState::Pending => {}
        }
    }

    Err(SourceError::unavailable(
        SOURCE,
        format!("snapshot {} not ready after {} polls", job_id, poll.max_attempts),
    ))
}

/// Trigger, wait, normalize: one professional profile.
#[derive(Clone)]
pub struct ProfileScraper {
    client: Arc<dyn ProfileScrapingClient>,
    poll: PollSettings,
}

impl ProfileScraper {
    pub fn new(client: Arc<dyn ProfileScrapingClient>, poll: PollSettings) -> Self {
        Self { client, poll }
    }

    pub async fn fetch_profile(&self, url: &str) -> Result<ProfessionalProfile, SourceError> {
        let job_id = self.client.trigger(url).await?;
        tracing::info!("Profile scrape triggered for {} (job {})", url, job_id);

        let raw = await_snapshot(self.client.as_ref(), &job_id, self.poll).await?;
        let profile = normalize_professional_profile(&raw)?;

        tracing::info!(
            "✓ Profile scraped: {} ({} positions, {} schools)",
            profile.name,
            profile.experience.len(),
            profile.education.len()
        );
        Ok(profile)
    }
}

fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(o) => o.get("name").and_then(Value::as_str).map(|s| s.trim().to_string()),
            _ => None,
        })
        .find(|s| !s.is_empty())
}

fn count_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| v.as_u64())
        .map(|n| n.min(u32::MAX as u64) as u32)
}

fn year_field(obj: &Map<String, Value>, key: &str) -> Option<i32> {
    obj.get(key).and_then(Value::as_i64).map(|y| y as i32)
}

fn array_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

fn normalize_experience(items: &[Value]) -> Vec<Experience> {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|e| Experience {
            company: str_field(e, &["company", "company_name"]).unwrap_or_default(),
            title: str_field(e, &["title", "position"]).unwrap_or_default(),
            start_date: str_field(e, &["start_date", "starts_at"]),
            end_date: str_field(e, &["end_date", "ends_at"]),
            location: str_field(e, &["location"]),
        })
        .filter(|e| !e.company.is_empty() || !e.title.is_empty())
        .collect()
}

fn normalize_education(items: &[Value]) -> Vec<Education> {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|e| Education {
            school: str_field(e, &["school", "institution", "title"]).unwrap_or_default(),
            degree: str_field(e, &["degree"]),
            field: str_field(e, &["field", "field_of_study"]),
            start_year: year_field(e, "start_year"),
            end_year: year_field(e, "end_year"),
        })
        .filter(|e| !e.school.is_empty())
        .collect()
}

fn normalize_endorsements(items: &[Value]) -> Vec<Endorsement> {
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|o| {
            let skill = str_field(o, &["skill", "name"])?;
            let count = count_field(o, &["endorsement_count", "count"]).unwrap_or(0);
            Some(Endorsement { skill, count })
        })
        .collect()
}

fn normalize_skills(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|s| match s {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(o) => o.get("name").and_then(Value::as_str).map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Normalize a vendor profile record into a typed profile.
///
/// Accepts either a single record or a list of records (the first is used).
/// Field names vary between dataset versions; every known alias is tried.
pub fn normalize_professional_profile(raw: &Value) -> Result<ProfessionalProfile, ParseError> {
    let record = match raw {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| ParseError::UnexpectedShape("empty record list".to_string()))?,
        other => other,
    };
    let obj = record
        .as_object()
        .ok_or_else(|| ParseError::UnexpectedShape(format!("expected object, got {}", type_name(record))))?;

    let name = str_field(obj, &["name", "full_name"]).ok_or(ParseError::MissingField("name"))?;

    let mut experience = normalize_experience(array_field(obj, &["experience", "positions"]));
    if experience.is_empty() {
        if let Some(company) = str_field(obj, &["current_company", "company"]) {
            experience.push(Experience {
                company,
                title: str_field(obj, &["position", "title"]).unwrap_or_default(),
                ..Default::default()
            });
        }
    }

    let endorsements_src = if obj.get("endorsements").and_then(Value::as_array).is_some() {
        array_field(obj, &["endorsements"])
    } else {
        array_field(obj, &["skills"])
    };

    Ok(ProfessionalProfile {
        name,
        headline: str_field(obj, &["headline", "title", "position"]),
        location: str_field(obj, &["location", "city"]),
        connections: count_field(obj, &["connections"]),
        followers: count_field(obj, &["followers"]),
        experience,
        education: normalize_education(array_field(obj, &["education"])),
        skills: normalize_skills(array_field(obj, &["skills"])),
        endorsements: normalize_endorsements(endorsements_src),
        recommendations: count_field(obj, &["recommendations", "recommendations_count"]),
        open_to_work: ["open_to_work", "looking_for_opportunities"]
            .iter()
            .any(|k| obj.get(*k).and_then(Value::as_bool).unwrap_or(false)),
        updated_at: str_field(obj, &["last_updated", "updated_at"])
            .as_deref()
            .and_then(parse_timestamp),
    })
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Client for the Bright Data datasets API (profile scraping and SERP).
#[derive(Clone)]
pub struct BrightDataClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    profile_dataset: String,
    serp_dataset: String,
    poll: PollSettings,
}

impl BrightDataClient {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let api_key = config
            .brightdata_api_key
            .clone()
            .ok_or(SourceError::ConfigurationMissing("BRIGHTDATA_API_KEY"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::unavailable(SOURCE, format!("failed to create client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.brightdata_base_url.trim_end_matches('/').to_string(),
            api_key,
            profile_dataset: config.brightdata_profile_dataset.clone(),
            serp_dataset: config.brightdata_serp_dataset.clone(),
            poll: PollSettings::from_config(config),
        })
    }

    async fn send_json(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Value, SourceError> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| SourceError::unavailable(SOURCE, format!("{} request failed: {}", what, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SourceError::unavailable(
                SOURCE,
                format!("{} returned {}: {}", what, status, error_text),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::unavailable(SOURCE, format!("failed to parse {} response: {}", what, e)))
    }

    async fn trigger_dataset(&self, dataset_id: &str, input: Value) -> Result<String, SourceError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/datasets/v3/trigger", self.base_url),
            &[("dataset_id", dataset_id), ("format", "json")],
        )
        .map_err(|e| SourceError::unavailable(SOURCE, format!("failed to build URL: {}", e)))?;

        let body = self
            .send_json(self.client.post(url).json(&json!([input])), "trigger")
            .await?;

        body.get("snapshot_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ParseError::MissingField("snapshot_id").into())
    }
}

#[async_trait]
impl ProfileScrapingClient for BrightDataClient {
    async fn trigger(&self, url: &str) -> Result<String, SourceError> {
        self.trigger_dataset(&self.profile_dataset, json!({ "url": url })).await
    }

    async fn poll_status(&self, job_id: &str) -> Result<ScrapeStatus, SourceError> {
        let url = format!("{}/datasets/v3/progress/{}", self.base_url, job_id);
        let body = self.send_json(self.client.get(&url), "progress").await?;

        let state = match body.get("status").and_then(Value::as_str) {
            Some("ready") => ScrapeState::Ready,
            Some("failed") => ScrapeState::Failed,
            _ => ScrapeState::Pending,
        };
        let record_count = body
            .get("records")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;

        Ok(ScrapeStatus {
            state,
            record_count,
        })
    }

    async fn fetch_result(&self, job_id: &str) -> Result<Value, SourceError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/datasets/v3/snapshot/{}", self.base_url, job_id),
            &[("format", "json")],
        )
        .map_err(|e| SourceError::unavailable(SOURCE, format!("failed to build URL: {}", e)))?;

        self.send_json(self.client.get(url), "snapshot").await
    }
}

#[async_trait]
impl WebSearchClient for BrightDataClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError> {
        let job_id = self
            .trigger_dataset(
                &self.serp_dataset,
                json!({ "url": "https://www.google.com/", "keyword": query }),
            )
            .await?;
        tracing::debug!("SERP job {} triggered for query {:?}", job_id, query);

        let raw = await_snapshot(self, &job_id, self.poll).await?;
        Ok(parse_serp_results(&raw))
    }
}

/// Flatten `[{organic_results: [...]}, ...]` into search results.
pub fn parse_serp_results(raw: &Value) -> Vec<SearchResult> {
    let pages: &[Value] = match raw {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    };

    pages
        .iter()
        .filter_map(|page| page.get("organic_results").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(|r| {
            Some(SearchResult {
                title: str_field(r, &["title"]).unwrap_or_default(),
                url: str_field(r, &["url", "link"])?,
                snippet: str_field(r, &["snippet", "description"]).unwrap_or_default(),
            })
        })
        .collect()
}
