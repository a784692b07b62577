use std::sync::Arc;

use anyhow::{Context as AnyhowContext, Result};

use crate::cli::StoreKind;
use crate::context::Context;
use crate::github::{GithubClient, RepoSource};
use crate::retry::RetryPolicy;
use crate::store::{FileStore, SnapshotStore, SqliteStore};
use crate::summarizer::{GeminiSummarizer, Summarizer};

pub fn init_data_dir(ctx: &Context) -> Result<()> {
    std::fs::create_dir_all(&ctx.data_dir)?;
    Ok(())
}

pub fn init_store(ctx: &Context) -> Result<Arc<dyn SnapshotStore>> {
    match ctx.store {
        StoreKind::Sqlite => {
            let db_path = std::path::PathBuf::from(&ctx.data_dir)
                .join("folio.sqlite")
                .to_string_lossy()
                .into_owned();
            let sqlite = SqliteStore::new(&db_path);
            if ctx.reset {
                sqlite.reset_all().context("resetting storage")?;
            }
            sqlite.init().context("initializing storage")?;
            Ok(Arc::new(sqlite))
        }
        StoreKind::File => {
            let files = FileStore::new(&ctx.data_dir);
            if ctx.reset {
                files.reset_all().context("resetting storage")?;
            }
            Ok(Arc::new(files))
        }
    }
}

pub fn build_source(ctx: &Context) -> Result<Option<Arc<dyn RepoSource>>> {
    let Some(username) = &ctx.github_username else {
        log::warn!("GITHUB_USERNAME not set; GitHub refresh operations are disabled");
        return Ok(None);
    };
    if ctx.github_token.is_none() {
        log::warn!("GITHUB_TOKEN not set; GitHub requests will be unauthenticated");
    }
    let client = GithubClient::new(
        username,
        ctx.github_token.as_deref(),
        &ctx.github_api_url,
        &ctx.raw_content_url,
        RetryPolicy::default(),
    )?;
    Ok(Some(Arc::new(client)))
}

pub fn build_summarizer(ctx: &Context) -> Result<Option<Arc<dyn Summarizer>>> {
    let Some(key) = &ctx.gemini_api_key else {
        log::warn!("GEMINI_API_KEY not set; summary regeneration is disabled");
        return Ok(None);
    };
    let client = GeminiSummarizer::new(key, &ctx.gemini_api_url, RetryPolicy::default())?;
    Ok(Some(Arc::new(client)))
}
