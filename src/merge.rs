use std::collections::BTreeMap;

use anyhow::Result;

use crate::store::SnapshotStore;
use crate::types::{CuratedEntry, GithubRepo, RepoView};

/// Combines the curated snapshot with the cached GitHub snapshot into the
/// view served to the front end. The curated snapshot defines which
/// repositories appear; rows present only in the GitHub snapshot are not
/// surfaced. Curated values win for `language` and `stars`; the GitHub row
/// supplies `languages`, `forks`, `watchers`, `open_issues` and
/// `updated_at`, and its `description` is used when the curated one is
/// empty. A repository with no GitHub row renders with an empty breakdown
/// and zeroed counters.
pub fn merged_view(
    curated: &BTreeMap<String, CuratedEntry>,
    github: &[GithubRepo],
) -> BTreeMap<String, RepoView> {
    let by_name: BTreeMap<&str, &GithubRepo> =
        github.iter().map(|r| (r.name.as_str(), r)).collect();

    curated
        .iter()
        .map(|(name, entry)| {
            let remote = by_name.get(name.as_str()).copied();
            let description = entry
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .or_else(|| remote.and_then(|r| r.description.clone()))
                .unwrap_or_default();
            let view = RepoView {
                id: entry.id,
                name: entry.name.clone(),
                url: entry.url.clone(),
                language: entry.language.clone(),
                stars: entry.stars,
                summary: entry.summary.clone(),
                tags: entry.tags.clone(),
                visible: entry.visible,
                description,
                languages: remote.map(|r| r.languages.clone()).unwrap_or_default(),
                forks: remote.map(|r| r.forks).unwrap_or(0),
                watchers: remote.map(|r| r.watchers).unwrap_or(0),
                open_issues: remote.map(|r| r.open_issues).unwrap_or(0),
                updated_at: remote.map(|r| r.updated_at.clone()).unwrap_or_default(),
            };
            (name.clone(), view)
        })
        .collect()
}

/// Reads both snapshots fresh and merges them. Staleness is bounded only by
/// when a refresh last ran; there is no cache across calls.
pub fn load_merged_view(store: &dyn SnapshotStore) -> Result<BTreeMap<String, RepoView>> {
    let curated = store.load_curated()?;
    let github = store.load_github()?;
    Ok(merged_view(&curated, &github))
}
