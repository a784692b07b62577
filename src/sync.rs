use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::github::RepoSource;
use crate::store::SnapshotStore;
use crate::summarizer::Summarizer;
use crate::types::{CuratedEntry, FolioError, GithubRepo};

/// Summary recorded for a repository whose README could not be fetched or
/// summarized during regeneration.
pub const PLACEHOLDER_SUMMARY: &str = "No summary";

/// Stateless read-modify-write cycles over the snapshot store, driven by
/// the admin surface. Clients are optional: a missing one means the
/// corresponding credential was never configured, and operations needing
/// it fail with `MissingCredential`. There is no locking between
/// concurrent operations; the last writer wins.
pub struct SyncService {
    source: Option<Arc<dyn RepoSource>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    store: Arc<dyn SnapshotStore>,
}

impl SyncService {
    pub fn new(
        source: Option<Arc<dyn RepoSource>>,
        summarizer: Option<Arc<dyn Summarizer>>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            source,
            summarizer,
            store,
        }
    }

    fn source(&self) -> Result<&dyn RepoSource, FolioError> {
        self.source
            .as_deref()
            .ok_or(FolioError::MissingCredential("GITHUB_USERNAME"))
    }

    fn summarizer(&self) -> Result<&dyn Summarizer, FolioError> {
        self.summarizer
            .as_deref()
            .ok_or(FolioError::MissingCredential("GEMINI_API_KEY"))
    }

    /// Refreshes one repository's snapshot row: metadata, then its language
    /// breakdown, then a stable upsert into the stored list. Other rows
    /// keep their position and contents.
    pub async fn refresh_one(&self, name: &str) -> Result<(), FolioError> {
        let source = self.source()?;
        let repo = source.fetch_repo(name).await?;
        let languages = source.fetch_languages(&repo).await?;
        let row = repo.into_snapshot(languages);

        let mut snapshot = self.store.load_github().map_err(FolioError::storage)?;
        upsert(&mut snapshot, row);
        self.store
            .save_github(&snapshot)
            .map_err(FolioError::storage)?;
        log::info!("🔄 refreshed snapshot row for {}", name);
        Ok(())
    }

    /// Replaces the GitHub snapshot wholesale with the account's current
    /// listing. Language fetches fan out concurrently; a failed fetch
    /// degrades that repository to an empty breakdown instead of failing
    /// the batch. Repositories gone upstream are dropped.
    pub async fn refresh_all(&self) -> Result<usize, FolioError> {
        let source = self.source()?;
        let listed = source.list_repos().await?;

        let fetched = join_all(listed.into_iter().map(|repo| async move {
            let languages = match source.fetch_languages(&repo).await {
                Ok(languages) => languages,
                Err(e) => {
                    log::warn!("language breakdown for {} unavailable: {}", repo.name, e);
                    BTreeMap::new()
                }
            };
            repo.into_snapshot(languages)
        }))
        .await;

        // one row per listed name, last write wins
        let mut snapshot: Vec<GithubRepo> = Vec::with_capacity(fetched.len());
        for row in fetched {
            upsert(&mut snapshot, row);
        }
        let count = snapshot.len();
        self.store
            .save_github(&snapshot)
            .map_err(FolioError::storage)?;
        log::info!("🔄 refreshed GitHub snapshot ({} repositories)", count);
        Ok(count)
    }

    /// Seeds the curated snapshot from scratch: one entry per listed
    /// repository, summary generated from its README. Any per-repository
    /// failure yields the placeholder summary for that repository only.
    pub async fn regenerate_all(&self) -> Result<usize, FolioError> {
        let source = self.source()?;
        let summarizer = self.summarizer()?;
        let listed = source.list_repos().await?;

        let entries = join_all(listed.into_iter().map(|repo| async move {
            let summary = match fetch_and_summarize(source, summarizer, &repo.name).await {
                Ok(summary) => summary,
                Err(e) => {
                    log::warn!("could not generate summary for {}: {}", repo.name, e);
                    PLACEHOLDER_SUMMARY.to_string()
                }
            };
            CuratedEntry {
                id: repo.id,
                name: repo.name,
                url: repo.html_url,
                language: repo.language,
                stars: repo.stargazers_count,
                summary,
                tags: Vec::new(),
                visible: true,
                description: None,
            }
        }))
        .await;

        let curated: BTreeMap<String, CuratedEntry> = entries
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect();
        let count = curated.len();
        self.store
            .save_curated(&curated)
            .map_err(FolioError::storage)?;
        log::info!("📝 regenerated curated snapshot ({} repositories)", count);
        Ok(count)
    }

    /// Fetches and summarizes one repository's README without persisting;
    /// the admin applies the result through the bulk save.
    pub async fn reset_summary(&self, name: &str) -> Result<String, FolioError> {
        let source = self.source()?;
        let summarizer = self.summarizer()?;
        fetch_and_summarize(source, summarizer, name).await
    }

    /// Admin bulk save: overwrites the curated snapshot wholesale, no merge
    /// with prior content and no field-level validation.
    pub fn save_curated(
        &self,
        entries: &BTreeMap<String, CuratedEntry>,
    ) -> Result<(), FolioError> {
        self.store.save_curated(entries).map_err(FolioError::storage)
    }
}

async fn fetch_and_summarize(
    source: &dyn RepoSource,
    summarizer: &dyn Summarizer,
    name: &str,
) -> Result<String, FolioError> {
    let readme = source.fetch_readme(name).await?;
    summarizer.summarize(&readme).await
}

fn upsert(snapshot: &mut Vec<GithubRepo>, row: GithubRepo) {
    match snapshot.iter_mut().find(|r| r.name == row.name) {
        Some(slot) => *slot = row,
        None => snapshot.push(row),
    }
}
