use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::retry::RetryPolicy;
use crate::types::{FolioError, GithubRepo};

const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));
const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

/// Repository descriptor as returned by the GitHub listing and single-repo
/// endpoints. `languages_url` locates the per-repository breakdown.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteRepo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    pub languages_url: String,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub updated_at: String,
}

impl RemoteRepo {
    /// Pairs the descriptor with its language breakdown to form a snapshot
    /// row.
    pub fn into_snapshot(self, languages: BTreeMap<String, u64>) -> GithubRepo {
        GithubRepo {
            id: self.id,
            name: self.name,
            description: self.description,
            url: self.html_url,
            stars: self.stargazers_count,
            language: self.language,
            languages,
            forks: self.forks_count,
            watchers: self.watchers_count,
            open_issues: self.open_issues_count,
            updated_at: self.updated_at,
        }
    }
}

/// Remote repository source. The concrete client talks to the GitHub REST
/// API; sync logic only sees this trait so tests can inject fakes.
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn list_repos(&self) -> Result<Vec<RemoteRepo>, FolioError>;
    async fn fetch_repo(&self, name: &str) -> Result<RemoteRepo, FolioError>;
    async fn fetch_languages(
        &self,
        repo: &RemoteRepo,
    ) -> Result<BTreeMap<String, u64>, FolioError>;
    async fn fetch_readme(&self, name: &str) -> Result<String, FolioError>;
}

pub struct GithubClient {
    http: reqwest::Client,
    api_base: Url,
    raw_base: Url,
    username: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl GithubClient {
    pub fn new(
        username: &str,
        token: Option<&str>,
        api_url: &str,
        raw_url: &str,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            api_base: parse_base(api_url)?,
            raw_base: parse_base(raw_url)?,
            username: username.to_string(),
            token: token.map(str::to_string),
            retry,
        })
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response, FolioError> {
        let mut req = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, ACCEPT_GITHUB_JSON);
        if let Some(token) = &self.token {
            req = req.header(header::AUTHORIZATION, format!("token {token}"));
        }
        let resp = req
            .send()
            .await
            .map_err(|e| FolioError::Upstream("github", e.to_string()))?;
        if !resp.status().is_success() {
            return Err(FolioError::Upstream(
                "github",
                format!("{} returned {}", url.path(), resp.status()),
            ));
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FolioError> {
        let resp = self
            .retry
            .run(url.path(), || {
                let url = url.clone();
                async move { self.send(&url).await }
            })
            .await?;
        resp.json::<T>()
            .await
            .map_err(|_| FolioError::UnexpectedShape("github"))
    }

    fn api_url(&self, path: &str) -> Result<Url, FolioError> {
        self.api_base
            .join(path)
            .map_err(|e| FolioError::Upstream("github", format!("bad url {path}: {e}")))
    }
}

#[async_trait]
impl RepoSource for GithubClient {
    async fn list_repos(&self) -> Result<Vec<RemoteRepo>, FolioError> {
        let url = self.api_url(&format!("users/{}/repos?per_page=100", self.username))?;
        self.get_json(&url).await
    }

    async fn fetch_repo(&self, name: &str) -> Result<RemoteRepo, FolioError> {
        let url = self.api_url(&format!("repos/{}/{}", self.username, name))?;
        self.get_json(&url).await
    }

    async fn fetch_languages(
        &self,
        repo: &RemoteRepo,
    ) -> Result<BTreeMap<String, u64>, FolioError> {
        let url = Url::parse(&repo.languages_url).map_err(|e| {
            FolioError::Upstream("github", format!("bad languages url for {}: {e}", repo.name))
        })?;
        self.get_json(&url).await
    }

    async fn fetch_readme(&self, name: &str) -> Result<String, FolioError> {
        let url = self
            .raw_base
            .join(&format!("{}/{}/master/README.md", self.username, name))
            .map_err(|e| FolioError::Upstream("github", format!("bad readme url: {e}")))?;
        let resp = self
            .retry
            .run(url.path(), || {
                let url = url.clone();
                async move { self.send(&url).await }
            })
            .await?;
        resp.text()
            .await
            .map_err(|e| FolioError::Upstream("github", e.to_string()))
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).with_context(|| format!("invalid base url {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_join_without_clobbering_paths() {
        let client = GithubClient::new(
            "me",
            None,
            "http://127.0.0.1:9999/api",
            "http://127.0.0.1:9999/raw",
            RetryPolicy::default(),
        )
        .unwrap();
        let url = client.api_url("users/me/repos?per_page=100").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9999/api/users/me/repos?per_page=100");
    }

    #[test]
    fn listing_descriptor_deserializes_from_api_payload() {
        let raw = r#"{
            "id": 42, "name": "app", "description": null,
            "html_url": "https://github.com/me/app",
            "stargazers_count": 5, "language": "Rust",
            "languages_url": "https://api.github.com/repos/me/app/languages",
            "forks_count": 2, "watchers_count": 3, "open_issues_count": 1,
            "updated_at": "2024-01-01T00:00:00Z",
            "full_name": "me/app", "private": false
        }"#;
        let repo: RemoteRepo = serde_json::from_str(raw).unwrap();
        let snapshot = repo.into_snapshot(BTreeMap::from([("Rust".to_string(), 10)]));
        assert_eq!(snapshot.name, "app");
        assert_eq!(snapshot.stars, 5);
        assert_eq!(snapshot.url, "https://github.com/me/app");
        assert_eq!(snapshot.languages["Rust"], 10);
    }
}
