use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_visible() -> bool {
    true
}

/// Admin-curated display metadata for one repository. The curated snapshot
/// maps repository name to this record and defines the set of repositories
/// the merged view surfaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedEntry {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One row of the cached GitHub snapshot. Rows keep listing order; `name`
/// is unique within the snapshot and joins against the curated snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubRepo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,
    #[serde(default)]
    pub forks: u64,
    #[serde(default)]
    pub watchers: u64,
    #[serde(default)]
    pub open_issues: u64,
    #[serde(default)]
    pub updated_at: String,
}

/// Read-time combination of a curated entry with its GitHub snapshot row,
/// as served to the front end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoView {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub language: Option<String>,
    pub stars: u64,
    pub summary: String,
    pub tags: Vec<String>,
    pub visible: bool,
    pub description: String,
    pub languages: BTreeMap<String, u64>,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub updated_at: String,
}
