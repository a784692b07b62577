use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::SnapshotStore;
use crate::types::{CuratedEntry, GithubRepo};

pub const GITHUB_FILE: &str = "githubData.json";
pub const CURATED_FILE: &str = "summaryData.json";

/// Flat-file backend: two pretty-printed JSON documents in the data
/// directory, rewritten wholesale on every save. Writes go through a
/// temporary sibling path and a rename, so a crash mid-write leaves the
/// prior document intact.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn reset_all(&self) -> Result<()> {
        for file in [GITHUB_FILE, CURATED_FILE] {
            match fs::remove_file(self.dir.join(file)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_doc<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                log::warn!(
                    "snapshot {} is not valid JSON ({}), reading as empty",
                    path.display(),
                    e
                );
                Ok(T::default())
            }
        }
    }

    fn write_doc<T: Serialize>(&self, file: &str, doc: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file);
        let tmp = self.dir.join(format!("{file}.tmp"));
        let body = serde_json::to_string_pretty(doc)?;
        fs::write(&tmp, body.as_bytes())?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl SnapshotStore for FileStore {
    fn load_github(&self) -> Result<Vec<GithubRepo>> {
        self.read_doc(GITHUB_FILE)
    }

    fn save_github(&self, repos: &[GithubRepo]) -> Result<()> {
        self.write_doc(GITHUB_FILE, &repos)
    }

    fn load_curated(&self) -> Result<BTreeMap<String, CuratedEntry>> {
        self.read_doc(CURATED_FILE)
    }

    fn save_curated(&self, entries: &BTreeMap<String, CuratedEntry>) -> Result<()> {
        self.write_doc(CURATED_FILE, entries)
    }
}
