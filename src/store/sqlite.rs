use std::collections::BTreeMap;
use std::io;

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::SnapshotStore;
use crate::types::{CuratedEntry, GithubRepo};

const GITHUB_DOC: &str = "github";
const CURATED_DOC: &str = "curated";

/// Embedded document store: one row per snapshot document, replaced with a
/// single upsert statement so concurrent readers never observe a partially
/// written document.
#[derive(Clone)]
pub struct SqliteStore {
    pub path: String,
}

impl SqliteStore {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }

    pub fn init(&self) -> Result<()> {
        self.conn()?;
        Ok(())
    }

    pub fn reset_all(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                name TEXT PRIMARY KEY,
                body TEXT NOT NULL
            )",
            [],
        )?;
        Ok(conn)
    }

    fn load_doc<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let conn = self.conn()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        let Some(body) = body else {
            return Ok(T::default());
        };
        match serde_json::from_str(&body) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                log::warn!("document {} is not valid JSON ({}), reading as empty", name, e);
                Ok(T::default())
            }
        }
    }

    fn save_doc<T: Serialize>(&self, name: &str, doc: &T) -> Result<()> {
        let conn = self.conn()?;
        let body = serde_json::to_string(doc)?;
        conn.execute(
            "INSERT INTO documents (name, body) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET body = excluded.body",
            params![name, body],
        )?;
        Ok(())
    }
}

impl SnapshotStore for SqliteStore {
    fn load_github(&self) -> Result<Vec<GithubRepo>> {
        self.load_doc(GITHUB_DOC)
    }

    fn save_github(&self, repos: &[GithubRepo]) -> Result<()> {
        self.save_doc(GITHUB_DOC, &repos)
    }

    fn load_curated(&self) -> Result<BTreeMap<String, CuratedEntry>> {
        self.load_doc(CURATED_DOC)
    }

    fn save_curated(&self, entries: &BTreeMap<String, CuratedEntry>) -> Result<()> {
        self.save_doc(CURATED_DOC, entries)
    }
}
