use crate::clients::{
    ActivityEvent, ActivityKind, ExtractedFields, GenerativeTextClient, RepoSummary, SourceGraphClient, PAGE_SIZE,
};
use crate::config::Config;
use crate::errors::{ParseError, SourceError};
use crate::network_models::{OrgRef, RepoRef, UserProfile};
use crate::profile_models::EvidenceSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const GITHUB: &str = "github";
const GEMINI: &str = "gemini";

#[derive(Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Deserialize)]
struct GhRepo {
    full_name: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u32,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    pushed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct GhOrg {
    login: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct GhProfile {
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct GhEventRepo {
    name: String,
}

#[derive(Deserialize)]
struct GhEvent {
    #[serde(rename = "type")]
    kind: String,
    repo: GhEventRepo,
    created_at: DateTime<Utc>,
}

/// GitHub REST v3 client. Works unauthenticated at a lower rate limit.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("talent-enrichment/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::unavailable(GITHUB, format!("failed to create client: {}", e)))?;

        if config.github_token.is_none() {
            tracing::warn!("GITHUB_TOKEN not set, using unauthenticated GitHub API (60 requests/hour)");
        }

        Ok(Self {
            client,
            base_url: config.github_api_url.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
        })
    }

    fn url(&self, path: &str, page: Option<u32>) -> Result<Url, SourceError> {
        let base = format!("{}{}", self.base_url, path);
        let built = match page {
            Some(page) => Url::parse_with_params(
                &base,
                &[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())],
            ),
            None => Url::parse(&base),
        };
        built.map_err(|e| SourceError::unavailable(GITHUB, format!("failed to build URL: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        tracing::debug!("GitHub GET {}", url.path());

        let mut request = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::unavailable(GITHUB, format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::unavailable(GITHUB, format!("{} not found", url.path())));
        }
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::unavailable(GITHUB, "rate limited"));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SourceError::unavailable(
                GITHUB,
                format!("{} returned {}: {}", url.path(), status, error_text),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::unavailable(GITHUB, format!("failed to parse response: {}", e)))
    }

    async fn logins(&self, path: String, page: u32) -> Result<Vec<String>, SourceError> {
        let users: Vec<GhUser> = self.get(self.url(&path, Some(page))?).await?;
        Ok(users.into_iter().map(|u| u.login).collect())
    }
}

#[async_trait]
impl SourceGraphClient for GitHubClient {
    async fn list_following(&self, user: &str, page: u32) -> Result<Vec<String>, SourceError> {
        self.logins(format!("/users/{}/following", user), page).await
    }

    async fn list_followers(&self, user: &str, page: u32) -> Result<Vec<String>, SourceError> {
        self.logins(format!("/users/{}/followers", user), page).await
    }

    async fn list_starred(&self, user: &str, page: u32) -> Result<Vec<RepoRef>, SourceError> {
        let repos: Vec<GhRepo> = self
            .get(self.url(&format!("/users/{}/starred", user), Some(page))?)
            .await?;
        Ok(repos
            .into_iter()
            .map(|r| RepoRef {
                full_name: r.full_name,
                stars: r.stargazers_count,
            })
            .collect())
    }

    async fn list_orgs(&self, user: &str) -> Result<Vec<OrgRef>, SourceError> {
        let orgs: Vec<GhOrg> = self.get(self.url(&format!("/users/{}/orgs", user), None)?).await?;
        Ok(orgs
            .into_iter()
            .map(|o| OrgRef {
                login: o.login,
                name: o.name,
            })
            .collect())
    }

    async fn list_repos(&self, user: &str, page: u32) -> Result<Vec<RepoSummary>, SourceError> {
        let mut url = self.url(&format!("/users/{}/repos", user), Some(page))?;
        url.query_pairs_mut().append_pair("sort", "pushed");

        let repos: Vec<GhRepo> = self.get(url).await?;
        Ok(repos
            .into_iter()
            .map(|r| RepoSummary {
                full_name: r.full_name,
                name: r.name,
                description: r.description,
                language: r.language,
                stars: r.stargazers_count,
                fork: r.fork,
                pushed_at: r.pushed_at,
            })
            .collect())
    }

    async fn get_profile(&self, user: &str) -> Result<UserProfile, SourceError> {
        let profile: GhProfile = self.get(self.url(&format!("/users/{}", user), None)?).await?;
        Ok(UserProfile {
            login: profile.login,
            name: profile.name,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
        })
    }

    async fn list_events(&self, user: &str, page: u32) -> Result<Vec<ActivityEvent>, SourceError> {
        let events: Vec<GhEvent> = self
            .get(self.url(&format!("/users/{}/events/public", user), Some(page))?)
            .await?;
        Ok(events
            .into_iter()
            .map(|e| ActivityEvent {
                kind: match e.kind.as_str() {
                    "PushEvent" => ActivityKind::Push,
                    "PullRequestEvent" => ActivityKind::PullRequest,
                    "IssuesEvent" => ActivityKind::Issues,
                    _ => ActivityKind::Other,
                },
                repo: e.repo.name,
                created_at: e.created_at,
            })
            .collect())
    }
}

const MAX_SOURCE_CHARS: usize = 6000;
const MAX_PROMPT_EVIDENCE_CHARS: usize = 40000;

/// Numbered evidence block the model cites from (`SOURCE #1`, `SOURCE #2`, ...).
pub fn build_cited_prompt(candidate_name: &str, sources: &[EvidenceSource]) -> String {
    let evidence: String = sources
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "SOURCE #{} [{}]:\nTitle: {}\nContent:\n{}\n---END SOURCE---\n",
                i + 1,
                s.url,
                s.title.as_deref().unwrap_or("N/A"),
                s.raw_text.chars().take(MAX_SOURCE_CHARS).collect::<String>()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
        .chars()
        .take(MAX_PROMPT_EVIDENCE_CHARS)
        .collect();

    format!(
        "You extract facts about a candidate and cite every one of them.\n\n\
         RULES:\n\
         1. Only extract claims that appear verbatim or near-verbatim in the sources.\n\
         2. For every claim give sourceIndex (the SOURCE # it came from) and extractedText (the exact quote).\n\
         3. Leave out anything you cannot cite.\n\
         4. Proficiency: expert (5+ years of evidence), advanced (3-5), intermediate (1-3), beginner (<1).\n\n\
         CANDIDATE: {}\n\n\
         EVIDENCE SOURCES:\n{}\n\n\
         Return JSON with keys nameClaim, headlineClaim, locationClaim ({{claim, sourceIndex, extractedText}} or null), \
         experiences [{{company, role, startDate, endDate, sourceIndex, extractedText, achievements}}], \
         skills [{{skill, proficiency, sourceIndices, extractedTexts}}], \
         education [{{institution, degree, year, sourceIndex, extractedText}}], \
         certifications [{{name, issuer, date, sourceIndex, extractedText}}].",
        candidate_name, evidence
    )
}

/// Pull the model's JSON text out of a generateContent response.
pub fn parse_generated_fields(body: &Value) -> Result<ExtractedFields, ParseError> {
    let text = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingField("candidates[0].content.parts[0].text"))?;

    let trimmed = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    Ok(serde_json::from_str(trimmed)?)
}

/// Gemini `generateContent` client returning JSON-mode output.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or(SourceError::ConfigurationMissing("GEMINI_API_KEY"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SourceError::unavailable(GEMINI, format!("failed to create client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl GenerativeTextClient for GeminiClient {
    async fn generate_cited_fields(
        &self,
        candidate_name: &str,
        sources: &[EvidenceSource],
    ) -> Result<ExtractedFields, SourceError> {
        // Build URL with proper parameter encoding to prevent injection attacks
        let url = Url::parse_with_params(
            &format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model),
            &[("key", self.api_key.as_str())],
        )
        .map_err(|e| SourceError::unavailable(GEMINI, format!("failed to build URL: {}", e)))?;

        // Redact key from logs to prevent credential exposure
        tracing::debug!(
            "Gemini URL: {}/v1beta/models/{}:generateContent?key=[REDACTED]",
            self.base_url,
            self.model
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": build_cited_prompt(candidate_name, sources) }] }],
            "generationConfig": { "responseMimeType": "application/json", "temperature": 0.1 }
        });

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::unavailable(GEMINI, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(SourceError::unavailable(
                GEMINI,
                format!("returned status {}: {}", status, error_text),
            ));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| SourceError::unavailable(GEMINI, format!("failed to parse response: {}", e)))?;

        Ok(parse_generated_fields(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_numbers_sources_from_one() {
        let sources = vec![
            EvidenceSource {
                url: "https://github.com/ana".into(),
                title: None,
                raw_text: "Rust".into(),
            },
            EvidenceSource {
                url: "local://resume".into(),
                title: Some("Resume".into()),
                raw_text: "x".repeat(10_000),
            },
        ];
        let prompt = build_cited_prompt("Ana", &sources);
        assert!(prompt.contains("SOURCE #1 [https://github.com/ana]"));
        assert!(prompt.contains("SOURCE #2 [local://resume]"));
        assert!(prompt.contains("Title: Resume"));
        assert!(!prompt.contains(&"x".repeat(MAX_SOURCE_CHARS + 1)));
    }

    #[test]
    fn test_parse_generated_fields_strips_fences() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{
                "text": "```json\n{\"nameClaim\": {\"claim\": \"Ana\", \"sourceIndex\": 1, \"extractedText\": \"Ana\"}, \"skills\": []}\n```"
            }]}}]
        });
        let fields = parse_generated_fields(&body).unwrap();
        assert_eq!(fields.name_claim.unwrap().source_index, 1);
    }

    #[test]
    fn test_parse_generated_fields_missing_text() {
        let err = parse_generated_fields(&json!({"candidates": []})).unwrap_err();
        assert!(matches!(err, ParseError::MissingField(_)));
    }
}
