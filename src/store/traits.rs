use std::collections::BTreeMap;

use anyhow::Result;

use crate::types::{CuratedEntry, GithubRepo};

/// Persistence for the two snapshot documents. Documents are read and
/// written wholesale; a save either fully replaces the document or leaves
/// the prior one intact.
pub trait SnapshotStore: Send + Sync {
    /// Cached GitHub metadata in listing order. A missing or unreadable
    /// snapshot loads as empty.
    fn load_github(&self) -> Result<Vec<GithubRepo>>;
    fn save_github(&self, repos: &[GithubRepo]) -> Result<()>;
    /// Admin-curated entries keyed by repository name. A missing or
    /// unreadable snapshot loads as empty.
    fn load_curated(&self) -> Result<BTreeMap<String, CuratedEntry>>;
    fn save_curated(&self, entries: &BTreeMap<String, CuratedEntry>) -> Result<()>;
}
