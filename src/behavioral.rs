//! Behavioral signals: what a candidate has been doing lately and whether
//! now is a good moment to reach out.
//!
//! Fetching lives on [`BehavioralSignalCollector`]; every heuristic is a pure
//! function taking `now` so it can be tested without a clock.

use crate::clients::{ActivityEvent, ActivityKind, RepoSummary, SearchResult, SourceGraphClient, WebSearchClient};
use crate::errors::SourceError;
use crate::network_models::ProfessionalProfile;
use crate::profile_models::{
    ActivityTrend, ApproachReadiness, BehavioralSignals, ContentActivity, ContentPlatform,
    EngagementRecency, GitHubActivity, JobChangeSignal, JobChangeType, LanguageShare,
    OpenSourceContribution, RecentRepo, Significance, SpeakingEngagement,
};
use crate::scraping_client::ProfileScraper;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::future::join_all;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

const MAX_SPEAKING: usize = 10;
const MAX_CONTENT: usize = 15;
const CONTENT_PER_PLATFORM: usize = 5;
const REPOS_CONSIDERED: usize = 10;

static GITHUB_USER: OnceLock<Option<Regex>> = OnceLock::new();
static TALK_WORDS: OnceLock<Option<Regex>> = OnceLock::new();
static SNIPPET_DATE: OnceLock<Option<Regex>> = OnceLock::new();
static TITLE_SUFFIX: OnceLock<Option<Regex>> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Option<Regex>>, source: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(source).ok()).as_ref()
}

/// Last known role, used to detect job changes since the previous snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviousRole {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehavioralInput {
    pub candidate_id: String,
    pub name: String,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub previous: Option<PreviousRole>,
}

/// Username from a profile or repository URL. Site sections are not users.
pub fn extract_github_username(url: &str) -> Option<String> {
    let re = pattern(&GITHUB_USER, r"github\.com/([A-Za-z0-9_-]+)(?:/|$|\?|#)")?;
    let login = re.captures(url.trim())?.get(1)?.as_str();
    if matches!(login, "orgs" | "settings" | "notifications") {
        return None;
    }
    Some(login.to_string())
}

/// Consecutive active days, counting back from `today`. A one-day gap is tolerated
/// at the start so activity ending yesterday still counts.
pub fn contribution_streak(events: &[ActivityEvent], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = events
        .iter()
        .map(|e| e.created_at.date_naive())
        .filter(|day| *day <= today)
        .collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let mut streak = 0;
    let mut current = today;
    for day in days {
        if (current - day).num_days() <= 1 {
            streak += 1;
            current = day;
        } else {
            break;
        }
    }
    streak
}

/// Last 30 days against the 30 before them.
pub fn activity_trend(events: &[ActivityEvent], now: DateTime<Utc>) -> ActivityTrend {
    let month_ago = now - Duration::days(30);
    let two_months_ago = now - Duration::days(60);

    let recent = events.iter().filter(|e| e.created_at > month_ago).count() as f64;
    let older = events
        .iter()
        .filter(|e| e.created_at > two_months_ago && e.created_at <= month_ago)
        .count() as f64;

    if recent > older * 1.2 {
        ActivityTrend::Increasing
    } else if recent < older * 0.8 {
        ActivityTrend::Declining
    } else {
        ActivityTrend::Stable
    }
}

fn top_languages(repos: &[RepoSummary]) -> Vec<LanguageShare> {
    let mut counts: Vec<(String, u32)> = Vec::new();
    for language in repos.iter().filter_map(|r| r.language.as_deref()) {
        match counts.iter_mut().find(|(l, _)| l == language) {
            Some((_, n)) => *n += 1,
            None => counts.push((language.to_string(), 1)),
        }
    }

    let total: u32 = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = counts
        .into_iter()
        .map(|(language, n)| LanguageShare {
            language,
            percentage: ((n as f64 / total as f64) * 100.0).round() as u32,
        })
        .collect();
    shares.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    shares.truncate(5);
    shares
}

fn open_source_contributions(username: &str, events: &[ActivityEvent]) -> Vec<OpenSourceContribution> {
    let own_prefix = format!("{}/", username.to_lowercase());
    let mut by_repo: Vec<OpenSourceContribution> = Vec::new();

    for event in events.iter().filter(|e| e.kind == ActivityKind::PullRequest) {
        if event.repo.is_empty() || event.repo.to_lowercase().starts_with(&own_prefix) {
            continue;
        }
        match by_repo.iter_mut().find(|c| c.repo == event.repo) {
            Some(c) => c.count += 1,
            None => by_repo.push(OpenSourceContribution {
                repo: event.repo.clone(),
                count: 1,
            }),
        }
    }
    by_repo
}

/// Activity summary from recently pushed repositories and public events (newest first).
pub fn summarize_activity(
    username: &str,
    mut repos: Vec<RepoSummary>,
    events: &[ActivityEvent],
    now: DateTime<Utc>,
) -> GitHubActivity {
    repos.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at));
    repos.truncate(REPOS_CONSIDERED);

    let total_contributions = events
        .iter()
        .filter(|e| matches!(e.kind, ActivityKind::Push | ActivityKind::PullRequest | ActivityKind::Issues))
        .count() as u32;

    let last_active_date = events
        .first()
        .map(|e| e.created_at)
        .or_else(|| repos.iter().filter_map(|r| r.pushed_at).max());

    GitHubActivity {
        username: username.to_string(),
        profile_url: format!("https://github.com/{}", username),
        total_contributions,
        contribution_streak: contribution_streak(events, now.date_naive()),
        top_languages: top_languages(&repos),
        recent_repos: repos
            .iter()
            .take(5)
            .map(|r| RecentRepo {
                name: r.name.clone(),
                description: r.description.clone().unwrap_or_default(),
                stars: r.stars,
                last_commit: r.pushed_at,
                is_original: !r.fork,
            })
            .collect(),
        open_source_contributions: open_source_contributions(username, events),
        activity_trend: activity_trend(events, now),
        last_active_date,
    }
}

fn snippet_date(text: &str) -> Option<String> {
    let re = pattern(
        &SNIPPET_DATE,
        r"([A-Z][a-z]+ \d{1,2},? \d{4})|(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
    )?;
    re.find(text).map(|m| m.as_str().to_string())
}

/// Best-effort calendar date out of a snippet date string.
pub fn parse_snippet_date(raw: &str) -> Option<NaiveDate> {
    let normalized = raw.replace(',', "").replace('-', "/");
    ["%B %d %Y", "%b %d %Y", "%m/%d/%Y", "%m/%d/%y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
}

/// Conference-looking search hits, deduplicated by URL.
pub fn speaking_from_results(results: &[SearchResult]) -> Vec<SpeakingEngagement> {
    let Some(talk) = pattern(&TALK_WORDS, r"(?i)conference|summit|meetup|talk|keynote|speaker") else {
        return Vec::new();
    };
    let suffix = pattern(&TITLE_SUFFIX, r"[|–-].*");

    let mut seen = HashSet::new();
    results
        .iter()
        .filter(|r| !r.url.is_empty() && talk.is_match(&format!("{} {}", r.title, r.snippet)))
        .filter(|r| seen.insert(r.url.clone()))
        .map(|r| {
            let trimmed = match suffix {
                Some(re) => re.replace(&r.title, "").trim().to_string(),
                None => r.title.trim().to_string(),
            };
            SpeakingEngagement {
                event_name: if trimmed.is_empty() { "Conference".to_string() } else { trimmed },
                date: snippet_date(&r.snippet),
                topic: r.snippet.chars().take(100).collect(),
                event_url: Some(r.url.clone()),
            }
        })
        .take(MAX_SPEAKING)
        .collect()
}

pub fn content_from_results(platform: ContentPlatform, results: &[SearchResult]) -> Vec<ContentActivity> {
    results
        .iter()
        .take(CONTENT_PER_PLATFORM)
        .map(|r| ContentActivity {
            platform,
            date: snippet_date(&r.snippet).and_then(|d| parse_snippet_date(&d)),
            topic: Some(r.title.clone()).filter(|t| !t.is_empty()),
            url: Some(r.url.clone()).filter(|u| !u.is_empty()),
        })
        .collect()
}

fn differs(previous: &Option<String>, current: &Option<String>) -> Option<(String, String)> {
    match (previous, current) {
        (Some(p), Some(c)) if !p.trim().is_empty() && !c.trim().is_empty() && !p.trim().eq_ignore_ascii_case(c.trim()) => {
            Some((p.clone(), c.clone()))
        }
        _ => None,
    }
}

/// Compare a freshly scraped profile with the last known role.
pub fn detect_job_changes(
    current: &ProfessionalProfile,
    previous: Option<&PreviousRole>,
    now: DateTime<Utc>,
) -> Vec<JobChangeSignal> {
    let mut signals = Vec::new();
    let position = current.current_position();
    let title = position.map(|p| p.title.clone()).filter(|t| !t.is_empty()).or_else(|| current.headline.clone());
    let company = position.map(|p| p.company.clone()).filter(|c| !c.is_empty());

    if let Some(previous) = previous {
        if let Some((old, new)) = differs(&previous.title, &title) {
            let lower = new.to_lowercase();
            let promoted = ["senior", "lead", "director"].iter().any(|w| lower.contains(w));
            signals.push(JobChangeSignal {
                change_type: JobChangeType::TitleChange,
                detected_at: now,
                previous_value: Some(old),
                new_value: Some(new),
                significance: Significance::High,
                interpretation: if promoted {
                    "Recently promoted - may be satisfied in current role".to_string()
                } else {
                    "Title changed - could indicate role transition".to_string()
                },
            });
        }

        if let Some((old, new)) = differs(&previous.company, &company) {
            signals.push(JobChangeSignal {
                change_type: JobChangeType::CompanyChange,
                detected_at: now,
                previous_value: Some(old),
                new_value: Some(new),
                significance: Significance::High,
                interpretation: "Recently changed companies - unlikely to be looking soon".to_string(),
            });
        }

        if let Some((old, new)) = differs(&previous.location, &current.location) {
            signals.push(JobChangeSignal {
                change_type: JobChangeType::LocationChange,
                detected_at: now,
                previous_value: Some(old),
                new_value: Some(new),
                significance: Significance::Medium,
                interpretation: "Relocated - may indicate life change or new opportunity".to_string(),
            });
        }
    }

    if current.open_to_work {
        signals.push(JobChangeSignal {
            change_type: JobChangeType::ProfileUpdate,
            detected_at: now,
            previous_value: None,
            new_value: Some("Open to Work enabled".to_string()),
            significance: Significance::High,
            interpretation: "Actively looking for new opportunities - high approach readiness".to_string(),
        });
    }

    if let Some(updated) = current.updated_at {
        let days = (now - updated).num_days();
        if (0..=7).contains(&days) {
            signals.push(JobChangeSignal {
                change_type: JobChangeType::ProfileUpdate,
                detected_at: now,
                previous_value: None,
                new_value: Some(format!("Profile updated {} days ago", days)),
                significance: Significance::Medium,
                interpretation: "Recent profile activity - may be exploring options".to_string(),
            });
        }
    }

    signals
}

pub fn engagement_recency(
    github: Option<&GitHubActivity>,
    content: &[ContentActivity],
    job_signals: &[JobChangeSignal],
    now: DateTime<Utc>,
) -> EngagementRecency {
    let mut score = 0;

    if let Some(github) = github {
        score += match github.activity_trend {
            ActivityTrend::Increasing => 3,
            ActivityTrend::Stable => 2,
            ActivityTrend::Declining => 1,
        };
        if github.contribution_streak > 7 {
            score += 2;
        } else if github.contribution_streak > 0 {
            score += 1;
        }
    }

    let today = now.date_naive();
    let recent_content = content
        .iter()
        .filter_map(|c| c.date)
        .filter(|d| (today - *d).num_days() <= 180)
        .count();
    if recent_content >= 3 {
        score += 3;
    } else if recent_content >= 1 {
        score += 2;
    }

    if job_signals.iter().any(|s| now - s.detected_at <= Duration::days(90)) {
        score += 2;
    }

    match score {
        s if s >= 6 => EngagementRecency::Active,
        s if s >= 3 => EngagementRecency::Moderate,
        _ => EngagementRecency::Dormant,
    }
}

pub fn approach_readiness(
    job_signals: &[JobChangeSignal],
    recency: EngagementRecency,
    open_to_work: bool,
    now: DateTime<Utc>,
) -> ApproachReadiness {
    if open_to_work {
        return ApproachReadiness::Ready;
    }

    let within = |s: &JobChangeSignal, days: i64| s.detected_at > now - Duration::days(days);

    let settled = job_signals.iter().any(|s| {
        within(s, 90)
            && (s.change_type == JobChangeType::CompanyChange
                || (s.change_type == JobChangeType::TitleChange && s.interpretation.contains("promoted")))
    });
    if settled {
        return ApproachReadiness::NotReady;
    }

    let profile_touched = job_signals
        .iter()
        .any(|s| s.change_type == JobChangeType::ProfileUpdate && within(s, 30));
    if recency == EngagementRecency::Active && profile_touched {
        return ApproachReadiness::Ready;
    }

    ApproachReadiness::Neutral
}

pub fn best_time_to_reach(github: Option<&GitHubActivity>, content: &[ContentActivity]) -> String {
    let trend = github.map(|g| g.activity_trend);

    let advice = if trend == Some(ActivityTrend::Increasing) {
        "Currently very active - reach out soon while engaged"
    } else if github.is_some_and(|g| g.contribution_streak > 30) {
        "Highly consistent activity - any weekday morning should work"
    } else if content.iter().filter(|c| c.date.is_some()).count() > 3 {
        "Active content creator - reach out after they publish new content"
    } else if trend == Some(ActivityTrend::Declining) {
        "Activity declining - may be good time as they could be looking for change"
    } else {
        "Standard timing - Tuesday/Wednesday mid-morning typically best"
    };
    advice.to_string()
}

/// Assemble the final record from whatever was gathered.
pub fn assemble_signals(
    candidate_id: &str,
    github: Option<GitHubActivity>,
    speaking_engagements: Vec<SpeakingEngagement>,
    job_change_signals: Vec<JobChangeSignal>,
    content_activity: Vec<ContentActivity>,
    now: DateTime<Utc>,
) -> BehavioralSignals {
    let open_to_work_signal = job_change_signals
        .iter()
        .any(|s| s.new_value.as_deref().is_some_and(|v| v.contains("Open to Work")));
    let recent_profile_updates = job_change_signals
        .iter()
        .filter(|s| s.change_type == JobChangeType::ProfileUpdate && now - s.detected_at <= Duration::days(30))
        .count() as u32;

    let engagement = engagement_recency(github.as_ref(), &content_activity, &job_change_signals, now);
    let readiness = approach_readiness(&job_change_signals, engagement, open_to_work_signal, now);

    BehavioralSignals {
        candidate_id: candidate_id.to_string(),
        best_time_to_reach: best_time_to_reach(github.as_ref(), &content_activity),
        github,
        speaking_engagements,
        job_change_signals,
        content_activity,
        open_to_work_signal,
        recent_profile_updates,
        engagement_recency: engagement,
        approach_readiness: readiness,
        generated_at: now,
    }
}

/// Fetches behavioral evidence. Web search and profile scraping are optional.
#[derive(Clone)]
pub struct BehavioralSignalCollector {
    github: Arc<dyn SourceGraphClient>,
    scraper: Option<ProfileScraper>,
    search: Option<Arc<dyn WebSearchClient>>,
}

impl BehavioralSignalCollector {
    pub fn new(
        github: Arc<dyn SourceGraphClient>,
        scraper: Option<ProfileScraper>,
        search: Option<Arc<dyn WebSearchClient>>,
    ) -> Self {
        Self { github, scraper, search }
    }

    pub async fn github_activity(&self, username: &str, now: DateTime<Utc>) -> Result<GitHubActivity, SourceError> {
        // The profile lookup doubles as an existence check.
        self.github.get_profile(username).await?;

        let (repos, events) = tokio::join!(self.github.list_repos(username, 1), self.github.list_events(username, 1));
        let repos = repos.unwrap_or_else(|e| {
            tracing::warn!("Repos for {} unavailable: {}", username, e);
            Vec::new()
        });
        let events = events.unwrap_or_else(|e| {
            tracing::warn!("Events for {} unavailable: {}", username, e);
            Vec::new()
        });

        Ok(summarize_activity(username, repos, &events, now))
    }

    async fn search_all(&self, queries: &[String]) -> Vec<Vec<SearchResult>> {
        let Some(search) = &self.search else {
            return Vec::new();
        };
        join_all(queries.iter().map(|q| async move {
            search.search(q).await.unwrap_or_else(|e| {
                tracing::warn!("Search '{}' failed: {}", q, e);
                Vec::new()
            })
        }))
        .await
    }

    async fn speaking(&self, name: &str) -> Vec<SpeakingEngagement> {
        let queries = [
            format!("\"{}\" speaker conference talk", name),
            format!("\"{}\" keynote presentation", name),
            format!("\"{}\" tech talk meetup", name),
        ];
        let results: Vec<SearchResult> = self.search_all(&queries).await.into_iter().flatten().collect();
        speaking_from_results(&results)
    }

    async fn content(&self, name: &str) -> Vec<ContentActivity> {
        let platforms = [
            (ContentPlatform::Medium, format!("site:medium.com \"@{}\"", name)),
            (ContentPlatform::DevTo, format!("site:dev.to \"{}\"", name)),
            (ContentPlatform::Linkedin, format!("site:linkedin.com/pulse \"{}\"", name)),
        ];
        let queries: Vec<String> = platforms.iter().map(|(_, q)| q.clone()).collect();
        let mut activity: Vec<ContentActivity> = platforms
            .iter()
            .zip(self.search_all(&queries).await)
            .flat_map(|((platform, _), results)| content_from_results(*platform, &results))
            .collect();
        activity.truncate(MAX_CONTENT);
        activity
    }

    async fn job_changes(&self, linkedin_url: Option<&str>, previous: Option<&PreviousRole>, now: DateTime<Utc>) -> Vec<JobChangeSignal> {
        let (Some(scraper), Some(url)) = (&self.scraper, linkedin_url) else {
            return Vec::new();
        };
        match scraper.fetch_profile(url).await {
            Ok(profile) => detect_job_changes(&profile, previous, now),
            Err(e) => {
                tracing::warn!("Job-change scrape for {} failed: {}", url, e);
                Vec::new()
            }
        }
    }

    /// Full collection. Individual sources that fail are left empty.
    pub async fn collect(&self, input: &BehavioralInput, now: DateTime<Utc>) -> Result<BehavioralSignals, SourceError> {
        let username = input.github_url.as_deref().and_then(extract_github_username);
        let can_scrape = self.scraper.is_some() && input.linkedin_url.is_some();
        if username.is_none() && !can_scrape && self.search.is_none() {
            return Err(SourceError::ConfigurationMissing("github url or BRIGHTDATA_API_KEY"));
        }

        tracing::info!("Collecting behavioral signals for {}", input.name);

        let github = async {
            match &username {
                Some(login) => self
                    .github_activity(login, now)
                    .await
                    .map_err(|e| tracing::warn!("GitHub activity for {} unavailable: {}", login, e))
                    .ok(),
                None => None,
            }
        };

        let (github, speaking, job_signals, content) = tokio::join!(
            github,
            self.speaking(&input.name),
            self.job_changes(input.linkedin_url.as_deref(), input.previous.as_ref(), now),
            self.content(&input.name),
        );

        let signals = assemble_signals(&input.candidate_id, github, speaking, job_signals, content, now);
        tracing::info!(
            "✓ Behavioral signals for {}: github={}, talks={}, job signals={}, content={}, readiness={:?}",
            input.name,
            signals.github.is_some(),
            signals.speaking_engagements.len(),
            signals.job_change_signals.len(),
            signals.content_activity.len(),
            signals.approach_readiness
        );
        Ok(signals)
    }

    /// GitHub only. No search or scraping calls.
    pub async fn quick_check(
        &self,
        candidate_id: &str,
        github_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<BehavioralSignals, SourceError> {
        let username = github_url
            .and_then(extract_github_username)
            .ok_or(SourceError::ConfigurationMissing("github url"))?;
        let github = self.github_activity(&username, now).await?;
        let mut signals = assemble_signals(candidate_id, Some(github), Vec::new(), Vec::new(), Vec::new(), now);
        signals.approach_readiness = ApproachReadiness::Neutral;
        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn event(kind: ActivityKind, repo: &str, days_ago: i64) -> ActivityEvent {
        ActivityEvent {
            kind,
            repo: repo.to_string(),
            created_at: now() - Duration::days(days_ago),
        }
    }

    fn repo(name: &str, language: Option<&str>, days_ago: i64) -> RepoSummary {
        RepoSummary {
            full_name: format!("octo/{}", name),
            name: name.to_string(),
            description: None,
            language: language.map(String::from),
            stars: 3,
            fork: false,
            pushed_at: Some(now() - Duration::days(days_ago)),
        }
    }

    #[test]
    fn test_extract_github_username() {
        assert_eq!(extract_github_username("https://github.com/octocat"), Some("octocat".into()));
        assert_eq!(extract_github_username("https://github.com/octocat/"), Some("octocat".into()));
        assert_eq!(extract_github_username("github.com/octo-cat/hello-world"), Some("octo-cat".into()));
        assert_eq!(extract_github_username("https://github.com/orgs/rust-lang"), None);
        assert_eq!(extract_github_username("https://gitlab.com/octocat"), None);
    }

    #[test]
    fn test_streak_tolerates_yesterday_start() {
        let events = vec![
            event(ActivityKind::Push, "octo/a", 1),
            event(ActivityKind::Push, "octo/a", 2),
            event(ActivityKind::Push, "octo/a", 2),
            event(ActivityKind::Push, "octo/a", 3),
            event(ActivityKind::Push, "octo/a", 6),
        ];
        assert_eq!(contribution_streak(&events, now().date_naive()), 3);
        assert_eq!(contribution_streak(&[], now().date_naive()), 0);
    }

    #[test]
    fn test_streak_ignores_future_dated_events() {
        let events = vec![
            event(ActivityKind::Push, "octo/a", -3),
            event(ActivityKind::Push, "octo/a", -1),
            event(ActivityKind::Push, "octo/a", 0),
            event(ActivityKind::Push, "octo/a", 1),
        ];
        assert_eq!(contribution_streak(&events, now().date_naive()), 2);

        let only_future = vec![event(ActivityKind::Push, "octo/a", -2)];
        assert_eq!(contribution_streak(&only_future, now().date_naive()), 0);
    }

    #[test]
    fn test_activity_trend() {
        let rising = vec![
            event(ActivityKind::Push, "a", 1),
            event(ActivityKind::Push, "a", 2),
            event(ActivityKind::Push, "a", 40),
        ];
        assert_eq!(activity_trend(&rising, now()), ActivityTrend::Increasing);

        let falling = vec![event(ActivityKind::Push, "a", 1), event(ActivityKind::Push, "a", 35), event(ActivityKind::Push, "a", 45)];
        assert_eq!(activity_trend(&falling, now()), ActivityTrend::Declining);

        assert_eq!(activity_trend(&[], now()), ActivityTrend::Stable);
    }

    #[test]
    fn test_summarize_activity() {
        let repos = vec![
            repo("old", Some("Go"), 90),
            repo("api", Some("Rust"), 1),
            repo("cli", Some("Rust"), 2),
            repo("docs", None, 3),
        ];
        let events = vec![
            event(ActivityKind::PullRequest, "tokio-rs/tokio", 0),
            event(ActivityKind::PullRequest, "octo/api", 1),
            event(ActivityKind::PullRequest, "tokio-rs/tokio", 2),
            event(ActivityKind::Issues, "serde-rs/serde", 3),
            event(ActivityKind::Other, "octo/api", 3),
        ];

        let activity = summarize_activity("Octo", repos, &events, now());
        assert_eq!(activity.total_contributions, 4);
        assert_eq!(activity.recent_repos[0].name, "api");
        assert_eq!(activity.top_languages[0].language, "Rust");
        assert_eq!(activity.top_languages[0].percentage, 67);
        assert_eq!(
            activity.open_source_contributions,
            vec![OpenSourceContribution {
                repo: "tokio-rs/tokio".into(),
                count: 2
            }]
        );
        assert_eq!(activity.last_active_date, Some(now()));
    }

    #[test]
    fn test_speaking_filter_and_dedupe() {
        let hit = |title: &str, url: &str, snippet: &str| SearchResult {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        };
        let results = vec![
            hit("RustConf 2023 | Speakers", "https://rustconf.com/a", "Talk on async, September 12, 2023"),
            hit("RustConf 2023 | Speakers", "https://rustconf.com/a", "duplicate"),
            hit("Random blog", "https://blog.example", "nothing relevant"),
            hit("Keynote", "", "no url"),
        ];
        let talks = speaking_from_results(&results);
        assert_eq!(talks.len(), 1);
        assert_eq!(talks[0].event_name, "RustConf 2023");
        assert_eq!(talks[0].date.as_deref(), Some("September 12, 2023"));
    }

    #[test]
    fn test_content_dates_parse() {
        let results = vec![SearchResult {
            title: "Ownership explained".into(),
            url: "https://dev.to/x/ownership".into(),
            snippet: "Posted 03/14/2024 by X".into(),
        }];
        let content = content_from_results(ContentPlatform::DevTo, &results);
        assert_eq!(content[0].date, NaiveDate::from_ymd_opt(2024, 3, 14));
        assert_eq!(parse_snippet_date("Jan 5, 2024"), NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn test_job_changes_and_readiness() {
        let profile = ProfessionalProfile {
            name: "Ana".into(),
            location: Some("Berlin".into()),
            experience: vec![crate::network_models::Experience {
                company: "NewCo".into(),
                title: "Senior Engineer".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let previous = PreviousRole {
            title: Some("Engineer".into()),
            company: Some("OldCo".into()),
            location: Some("berlin".into()),
        };

        let signals = detect_job_changes(&profile, Some(&previous), now());
        assert_eq!(signals.len(), 2);
        assert!(signals[0].interpretation.contains("promoted"));
        assert_eq!(signals[1].change_type, JobChangeType::CompanyChange);
        assert_eq!(
            approach_readiness(&signals, EngagementRecency::Active, false, now()),
            ApproachReadiness::NotReady
        );
        assert_eq!(
            approach_readiness(&signals, EngagementRecency::Dormant, true, now()),
            ApproachReadiness::Ready
        );
    }

    #[test]
    fn test_open_to_work_makes_ready() {
        let profile = ProfessionalProfile {
            name: "Ana".into(),
            open_to_work: true,
            updated_at: Some(now() - Duration::days(2)),
            ..Default::default()
        };
        let signals = assemble_signals("c1", None, vec![], detect_job_changes(&profile, None, now()), vec![], now());
        assert!(signals.open_to_work_signal);
        assert_eq!(signals.recent_profile_updates, 2);
        assert_eq!(signals.approach_readiness, ApproachReadiness::Ready);
        assert_eq!(signals.engagement_recency, EngagementRecency::Dormant);
    }

    #[test]
    fn test_engagement_and_best_time() {
        let activity = summarize_activity(
            "octo",
            vec![],
            &(0..10).map(|d| event(ActivityKind::Push, "octo/a", d)).collect::<Vec<_>>(),
            now(),
        );
        assert_eq!(activity.activity_trend, ActivityTrend::Increasing);
        assert_eq!(activity.contribution_streak, 10);
        assert_eq!(engagement_recency(Some(&activity), &[], &[], now()), EngagementRecency::Moderate);

        let articles: Vec<ContentActivity> = (1..=3)
            .map(|m| ContentActivity {
                platform: ContentPlatform::Medium,
                date: NaiveDate::from_ymd_opt(2024, m, 10),
                topic: None,
                url: None,
            })
            .collect();
        assert_eq!(
            engagement_recency(Some(&activity), &articles, &[], now()),
            EngagementRecency::Active
        );
        assert_eq!(
            best_time_to_reach(Some(&activity), &[]),
            "Currently very active - reach out soon while engaged"
        );
        assert_eq!(
            best_time_to_reach(None, &[]),
            "Standard timing - Tuesday/Wednesday mid-morning typically best"
        );
    }
}
