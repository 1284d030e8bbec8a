//! Connection degree between two developer-platform identities.
//!
//! Only locally observable signals are used: follows, followers, stars, orgs
//! and repositories, each fetched with a bounded number of pages. Accounts
//! larger than the page caps can therefore report a weaker degree than the
//! true one.

use crate::clients::{SourceGraphClient, PAGE_SIZE};
use crate::errors::SourceError;
use crate::network_models::{
    ConnectionTotals, DirectConnection, GitHubConnectionPath, MutualConnection, MutualKind,
    OrgRef, RepoRef, UserProfile,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraversalLimits {
    pub follow_pages: u32,
    pub starred_pages: u32,
    pub repo_pages: u32,
    /// Bridge profiles fetched per bridge kind.
    pub bridge_details: usize,
    pub mutual_details: usize,
    pub shared_starred_shown: usize,
    /// Deadline for each individual paginated fetch.
    #[serde(with = "secs")]
    pub fetch_timeout: Duration,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            follow_pages: 5,
            starred_pages: 3,
            repo_pages: 2,
            bridge_details: 5,
            mutual_details: 10,
            shared_starred_shown: 10,
            fetch_timeout: Duration::from_secs(20),
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Everything fetched for one identity. Logins are lowercased.
#[derive(Debug, Default)]
struct Footprint {
    following: BTreeSet<String>,
    followers: BTreeSet<String>,
    starred: BTreeMap<String, RepoRef>,
    orgs: BTreeMap<String, OrgRef>,
    repos: BTreeSet<String>,
}

fn login_key(login: &str) -> String {
    login.trim().to_lowercase()
}

pub struct SocialGraphTraverser {
    client: Arc<dyn SourceGraphClient>,
    limits: TraversalLimits,
}

impl SocialGraphTraverser {
    pub fn new(client: Arc<dyn SourceGraphClient>, limits: TraversalLimits) -> Self {
        Self { client, limits }
    }

    /// Fetch pages `1..=max_pages` until a short page.
    ///
    /// Any failure or timeout yields whatever was collected so far, so one bad
    /// call degrades the answer instead of aborting it.
    async fn paginate<T, F, Fut>(&self, what: &str, user: &str, max_pages: u32, fetch: F) -> Vec<T>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>, SourceError>>,
    {
        let mut items = Vec::new();
        for page in 1..=max_pages {
            match tokio::time::timeout(self.limits.fetch_timeout, fetch(page)).await {
                Ok(Ok(batch)) => {
                    let len = batch.len();
                    items.extend(batch);
                    if len < PAGE_SIZE {
                        break;
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("Fetching {} of {} (page {}) failed: {}", what, user, page, e);
                    break;
                }
                Err(_) => {
                    tracing::warn!("Fetching {} of {} (page {}) timed out", what, user, page);
                    break;
                }
            }
        }
        items
    }

    async fn following(&self, user: &str) -> BTreeSet<String> {
        self.paginate("following", user, self.limits.follow_pages, |p| self.client.list_following(user, p))
            .await
            .iter()
            .map(|l| login_key(l))
            .collect()
    }

    async fn followers(&self, user: &str) -> BTreeSet<String> {
        self.paginate("followers", user, self.limits.follow_pages, |p| self.client.list_followers(user, p))
            .await
            .iter()
            .map(|l| login_key(l))
            .collect()
    }

    async fn starred(&self, user: &str) -> BTreeMap<String, RepoRef> {
        self.paginate("starred", user, self.limits.starred_pages, |p| self.client.list_starred(user, p))
            .await
            .into_iter()
            .map(|r| (r.full_name.to_lowercase(), r))
            .collect()
    }

    async fn orgs(&self, user: &str) -> BTreeMap<String, OrgRef> {
        match tokio::time::timeout(self.limits.fetch_timeout, self.client.list_orgs(user)).await {
            Ok(Ok(orgs)) => orgs.into_iter().map(|o| (o.login.to_lowercase(), o)).collect(),
            Ok(Err(e)) => {
                tracing::warn!("Fetching orgs of {} failed: {}", user, e);
                BTreeMap::new()
            }
            Err(_) => {
                tracing::warn!("Fetching orgs of {} timed out", user);
                BTreeMap::new()
            }
        }
    }

    async fn repos(&self, user: &str) -> BTreeSet<String> {
        self.paginate("repos", user, self.limits.repo_pages, |p| self.client.list_repos(user, p))
            .await
            .into_iter()
            .map(|r| r.full_name.to_lowercase())
            .collect()
    }

    async fn footprint(&self, user: &str) -> Footprint {
        let (following, followers, starred, orgs, repos) = tokio::join!(
            self.following(user),
            self.followers(user),
            self.starred(user),
            self.orgs(user),
            self.repos(user),
        );
        Footprint {
            following,
            followers,
            starred,
            orgs,
            repos,
        }
    }

    async fn profiles(&self, logins: &[String]) -> Vec<Option<UserProfile>> {
        join_all(logins.iter().map(|login| async move {
            match tokio::time::timeout(self.limits.fetch_timeout, self.client.get_profile(login)).await {
                Ok(Ok(profile)) => Some(profile),
                Ok(Err(e)) => {
                    tracing::debug!("Profile lookup for {} failed: {}", login, e);
                    None
                }
                Err(_) => None,
            }
        }))
        .await
    }

    /// Connection degree from `from` (the reaching-out side) to `to`.
    pub async fn degree(&self, from: &str, to: &str) -> GitHubConnectionPath {
        let (a, b) = tokio::join!(self.footprint(from), self.footprint(to));
        let mut path = resolve_connection(from, to, &a, &b, &self.limits);

        let logins: Vec<String> = path.mutual_connections.iter().map(|m| m.login.clone()).collect();
        for (mutual, profile) in path.mutual_connections.iter_mut().zip(self.profiles(&logins).await) {
            mutual.profile = profile;
        }

        tracing::info!(
            "Connection {} -> {}: degree {:?} ({})",
            from,
            to,
            path.connection_degree,
            path.shortest_path
        );
        path
    }

    /// Direct follow flags only. Reads both following lists and nothing else.
    pub async fn direct_connection(&self, from: &str, to: &str) -> DirectConnection {
        let (a_following, b_following) = tokio::join!(self.following(from), self.following(to));
        DirectConnection {
            you_follow_them: a_following.contains(&login_key(to)),
            they_follow_you: b_following.contains(&login_key(from)),
        }
    }
}

/// Pure resolution over two fetched footprints. Mutual profiles are left empty.
fn resolve_connection(
    from: &str,
    to: &str,
    a: &Footprint,
    b: &Footprint,
    limits: &TraversalLimits,
) -> GitHubConnectionPath {
    let a_login = login_key(from);
    let b_login = login_key(to);

    let direct = DirectConnection {
        you_follow_them: a.following.contains(&b_login) || b.followers.contains(&a_login),
        they_follow_you: b.following.contains(&a_login) || a.followers.contains(&b_login),
    };

    let bridge_you_follow: Vec<&String> = a.following.intersection(&b.followers).collect();
    let bridge_they_follow: Vec<&String> = a.followers.intersection(&b.following).collect();

    let mutual_follows: BTreeSet<&String> = a
        .following
        .intersection(&b.following)
        .chain(a.followers.intersection(&b.followers))
        .collect();

    let mut mutual_connections: Vec<MutualConnection> = Vec::new();
    let mut push = |login: &String, kind: MutualKind| {
        if !mutual_connections.iter().any(|m| &m.login == login) {
            mutual_connections.push(MutualConnection {
                login: login.clone(),
                kind,
                profile: None,
            });
        }
    };
    for login in bridge_you_follow.iter().take(limits.bridge_details) {
        push(login, MutualKind::BridgeYouFollow);
    }
    for login in bridge_they_follow.iter().take(limits.bridge_details) {
        push(login, MutualKind::BridgeTheyFollow);
    }
    for login in mutual_follows.iter().take(limits.mutual_details) {
        push(login, MutualKind::MutualFollow);
    }

    let mut shared_starred: Vec<RepoRef> = a
        .starred
        .iter()
        .filter(|(name, _)| b.starred.contains_key(*name))
        .map(|(_, repo)| repo.clone())
        .collect();
    shared_starred.sort_by(|x, y| y.stars.cmp(&x.stars));
    let total_starred = shared_starred.len();
    shared_starred.truncate(limits.shared_starred_shown);

    let shared_orgs: Vec<OrgRef> = a
        .orgs
        .iter()
        .filter(|(login, _)| b.orgs.contains_key(*login))
        .map(|(_, org)| org.clone())
        .collect();

    let shared_contributions: Vec<String> = a.repos.intersection(&b.repos).cloned().collect();

    let (connection_degree, shortest_path) = if direct.any() {
        let why = match (direct.you_follow_them, direct.they_follow_you) {
            (true, true) => "Direct (mutual follow)",
            (true, false) => "Direct (you follow them)",
            _ => "Direct (they follow you)",
        };
        (Some(1), why.to_string())
    } else if let Some(login) = bridge_you_follow.first() {
        (Some(2), format!("Ask @{} (you follow them, they follow candidate)", login))
    } else if let Some(login) = bridge_they_follow.first() {
        (Some(2), format!("Via @{} (candidate follows them, they follow you)", login))
    } else if let Some(login) = mutual_follows.iter().next() {
        (Some(2), format!("Via @{} (mutual connection)", login))
    } else if let Some(org) = shared_orgs.first() {
        (
            Some(2),
            format!("Via {} (shared org)", org.name.as_deref().unwrap_or(&org.login)),
        )
    } else if let Some(repo) = shared_starred.first() {
        (Some(3), format!("Via {} (shared interest only)", repo.full_name))
    } else if let Some(repo) = shared_contributions.first() {
        (Some(3), format!("Via {} (both contribute)", repo))
    } else {
        (None, "No connection found".to_string())
    };

    GitHubConnectionPath {
        from: from.to_string(),
        to: to.to_string(),
        connection_degree,
        direct_connection: direct,
        totals: ConnectionTotals {
            bridges: bridge_you_follow.len() + bridge_they_follow.len(),
            mutual_follows: mutual_follows.len(),
            shared_orgs: shared_orgs.len(),
            shared_starred: total_starred,
            shared_contributions: shared_contributions.len(),
        },
        mutual_connections,
        shared_starred,
        shared_contributions,
        shared_orgs,
        shortest_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reverse_follow_seen_from_either_list() {
        // b's following list was truncated; a's followers list still shows b
        let a = Footprint {
            followers: set(&["bob"]),
            ..Default::default()
        };
        let path = resolve_connection("alice", "bob", &a, &Footprint::default(), &TraversalLimits::default());
        assert_eq!(path.connection_degree, Some(1));
        assert_eq!(path.shortest_path, "Direct (they follow you)");
        assert!(!path.direct_connection.you_follow_them);
    }

    #[test]
    fn test_direct_wins_over_everything() {
        let a = Footprint {
            following: set(&["bob", "carol"]),
            orgs: [("rust-lang".to_string(), OrgRef { login: "rust-lang".into(), name: None })].into(),
            ..Default::default()
        };
        let b = Footprint {
            following: set(&["alice", "carol"]),
            orgs: a.orgs.clone(),
            ..Default::default()
        };
        let path = resolve_connection("Alice", "Bob", &a, &b, &TraversalLimits::default());
        assert_eq!(path.connection_degree, Some(1));
        assert_eq!(path.shortest_path, "Direct (mutual follow)");
        assert_eq!(path.totals.mutual_follows, 1);
        assert_eq!(path.totals.shared_orgs, 1);
    }

    #[test]
    fn test_bridge_preferred_over_plain_mutual() {
        let a = Footprint {
            following: set(&["dave", "erin"]),
            ..Default::default()
        };
        let b = Footprint {
            following: set(&["erin"]),
            followers: set(&["dave"]),
            ..Default::default()
        };
        let path = resolve_connection("alice", "bob", &a, &b, &TraversalLimits::default());
        assert_eq!(path.connection_degree, Some(2));
        assert_eq!(path.shortest_path, "Ask @dave (you follow them, they follow candidate)");
        assert_eq!(path.mutual_connections[0].kind, MutualKind::BridgeYouFollow);
        assert_eq!(path.mutual_connections[1].login, "erin");
    }

    #[test]
    fn test_shared_starred_sorted_and_truncated() {
        let repos: Vec<RepoRef> = (0..12)
            .map(|i| RepoRef {
                full_name: format!("org/repo{}", i),
                stars: i * 10,
            })
            .collect();
        let starred: BTreeMap<String, RepoRef> =
            repos.iter().map(|r| (r.full_name.clone(), r.clone())).collect();
        let a = Footprint {
            starred: starred.clone(),
            ..Default::default()
        };
        let b = Footprint {
            starred,
            ..Default::default()
        };
        let path = resolve_connection("alice", "bob", &a, &b, &TraversalLimits::default());
        assert_eq!(path.connection_degree, Some(3));
        assert_eq!(path.shared_starred.len(), 10);
        assert_eq!(path.totals.shared_starred, 12);
        assert_eq!(path.shortest_path, "Via org/repo11 (shared interest only)");
    }

    #[test]
    fn test_shared_contribution_is_last_resort() {
        let a = Footprint {
            repos: set(&["acme/tool"]),
            ..Default::default()
        };
        let b = Footprint {
            repos: set(&["acme/tool"]),
            ..Default::default()
        };
        let path = resolve_connection("alice", "bob", &a, &b, &TraversalLimits::default());
        assert_eq!(path.connection_degree, Some(3));
        assert_eq!(path.shortest_path, "Via acme/tool (both contribute)");
    }

    #[test]
    fn test_no_connection() {
        let path = resolve_connection(
            "alice",
            "bob",
            &Footprint::default(),
            &Footprint::default(),
            &TraversalLimits::default(),
        );
        assert_eq!(path.connection_degree, None);
        assert_eq!(path.shortest_path, "No connection found");
    }
}
