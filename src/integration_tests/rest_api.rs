use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::github::{RemoteRepo, RepoSource};
use crate::rest::{router, AppState};
use crate::store::{FileStore, SnapshotStore};
use crate::summarizer::Summarizer;
use crate::sync::SyncService;
use crate::types::{CuratedEntry, FolioError, GithubRepo};

struct MockSource {
    repos: Vec<RemoteRepo>,
}

#[async_trait]
impl RepoSource for MockSource {
    async fn list_repos(&self) -> Result<Vec<RemoteRepo>, FolioError> {
        Ok(self.repos.clone())
    }

    async fn fetch_repo(&self, name: &str) -> Result<RemoteRepo, FolioError> {
        self.repos
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| FolioError::Upstream("github", format!("{name} returned 404")))
    }

    async fn fetch_languages(
        &self,
        _repo: &RemoteRepo,
    ) -> Result<BTreeMap<String, u64>, FolioError> {
        Ok(BTreeMap::from([("Rust".to_string(), 2048)]))
    }

    async fn fetch_readme(&self, name: &str) -> Result<String, FolioError> {
        Ok(format!("{name} readme"))
    }
}

struct MockSummarizer;

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, readme: &str) -> Result<String, FolioError> {
        Ok(format!("summary of {readme}"))
    }
}

fn remote(name: &str) -> RemoteRepo {
    RemoteRepo {
        id: 11,
        name: name.to_string(),
        description: Some("desc".to_string()),
        html_url: format!("https://github.com/me/{name}"),
        stargazers_count: 8,
        language: Some("Rust".to_string()),
        languages_url: format!("https://api.test/repos/me/{name}/languages"),
        forks_count: 2,
        watchers_count: 3,
        open_issues_count: 1,
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

fn curated(name: &str) -> CuratedEntry {
    CuratedEntry {
        id: 11,
        name: name.to_string(),
        url: format!("https://github.com/me/{name}"),
        language: Some("Go".to_string()),
        stars: 5,
        summary: "a tool".to_string(),
        tags: vec!["cli".to_string()],
        visible: true,
        description: None,
    }
}

fn state_with_source(
    dir: &Path,
    repos: Vec<RemoteRepo>,
    admin_token: Option<&str>,
) -> AppState {
    let store = Arc::new(FileStore::new(dir));
    let sync = SyncService::new(
        Some(Arc::new(MockSource { repos })),
        Some(Arc::new(MockSummarizer)),
        store.clone(),
    );
    AppState {
        store,
        sync: Arc::new(sync),
        data_dir: dir.to_path_buf(),
        admin_token: admin_token.map(str::to_string),
        started_at: std::time::SystemTime::now(),
    }
}

fn state_without_clients(dir: &Path) -> AppState {
    let store = Arc::new(FileStore::new(dir));
    let sync = SyncService::new(None, None, store.clone());
    AppState {
        store,
        sync: Arc::new(sync),
        data_dir: dir.to_path_buf(),
        admin_token: None,
        started_at: std::time::SystemTime::now(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_without_clients(dir.path());

    let response = router(state).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn projects_returns_merged_view() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_without_clients(dir.path());

    state
        .store
        .save_curated(&BTreeMap::from([("app".to_string(), curated("app"))]))
        .unwrap();
    let github_row: GithubRepo =
        remote("app").into_snapshot(BTreeMap::from([("Rust".to_string(), 100)]));
    state.store.save_github(&[github_row]).unwrap();

    let response = router(state).oneshot(get("/api/projects")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // curated wins for language/stars, GitHub row supplies the rest
    assert_eq!(body["app"]["language"], "Go");
    assert_eq!(body["app"]["stars"], 5);
    assert_eq!(body["app"]["languages"]["Rust"], 100);
    assert_eq!(body["app"]["description"], "desc");
    assert_eq!(body["app"]["forks"], 2);
}

#[tokio::test]
async fn projects_renders_when_github_snapshot_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_without_clients(dir.path());
    state
        .store
        .save_curated(&BTreeMap::from([("app".to_string(), curated("app"))]))
        .unwrap();

    let response = router(state).oneshot(get("/api/projects")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["app"]["languages"], json!({}));
    assert_eq!(body["app"]["forks"], 0);
}

#[tokio::test]
async fn save_projects_overwrites_curated_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_without_clients(dir.path());
    state
        .store
        .save_curated(&BTreeMap::from([("old".to_string(), curated("old"))]))
        .unwrap();

    let entries = BTreeMap::from([("new".to_string(), curated("new"))]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/projects")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&entries).unwrap()))
        .unwrap();
    let response = router(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let curated = state.store.load_curated().unwrap();
    assert!(curated.contains_key("new"));
    assert!(!curated.contains_key("old"));
}

#[tokio::test]
async fn mutating_routes_require_the_admin_token() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_source(dir.path(), vec![remote("app")], Some("s3cret"));

    let response = router(state.clone()).oneshot(post("/api/refresh")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/refresh")
        .header("x-api-key", "s3cret")
        .body(Body::empty())
        .unwrap();
    let response = router(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("POST")
        .uri("/api/refresh")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let response = router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_with_repo_query_updates_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_source(dir.path(), vec![remote("app")], None);

    let response = router(state.clone())
        .oneshot(post("/api/refresh?repo=app"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let snapshot = state.store.load_github().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "app");
    assert_eq!(snapshot[0].languages["Rust"], 2048);
}

#[tokio::test]
async fn refresh_without_credentials_fails_with_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_without_clients(dir.path());

    let response = router(state).oneshot(post("/api/refresh")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("GITHUB_USERNAME"));
}

#[tokio::test]
async fn regenerate_seeds_curated_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_source(dir.path(), vec![remote("app")], None);

    let response = router(state.clone())
        .oneshot(post("/api/regenerate"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let curated = state.store.load_curated().unwrap();
    assert_eq!(curated["app"].summary, "summary of app readme");
    assert!(curated["app"].visible);
}

#[tokio::test]
async fn reset_summary_returns_fresh_summary() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_source(dir.path(), vec![remote("app")], None);

    let response = router(state.clone())
        .oneshot(get("/api/summary/reset?repo=app"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["summary"], "summary of app readme");
    // reset does not persist; the admin saves through the bulk endpoint
    assert!(state.store.load_curated().unwrap().is_empty());
}

#[tokio::test]
async fn socials_served_from_read_only_document() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(crate::socials::SOCIALS_FILE),
        br#"{"github":"https://github.com/me"}"#,
    )
    .unwrap();
    let state = state_without_clients(dir.path());

    let response = router(state).oneshot(get("/api/socials")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["github"], "https://github.com/me");
}

#[tokio::test]
async fn unknown_routes_get_a_json_404() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_without_clients(dir.path());

    let response = router(state).oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not found");
}
