use std::net::SocketAddr;

use crate::cli::{Cli, StoreKind};

/// Resolved runtime configuration, built once from the CLI.
#[derive(Clone)]
pub struct Context {
    pub listen: SocketAddr,
    pub data_dir: String,
    pub store: StoreKind,
    pub reset: bool,
    pub log_file: Option<String>,
    pub github_username: Option<String>,
    pub github_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub admin_token: Option<String>,
    pub github_api_url: String,
    pub raw_content_url: String,
    pub gemini_api_url: String,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            listen: cli.listen,
            data_dir: cli.data_dir.clone(),
            store: cli.store,
            reset: cli.reset,
            log_file: non_empty(&cli.log_file),
            github_username: non_empty(&cli.github_username),
            github_token: non_empty(&cli.github_token),
            gemini_api_key: non_empty(&cli.gemini_api_key),
            admin_token: non_empty(&cli.admin_token),
            github_api_url: cli.github_api_url.clone(),
            raw_content_url: cli.raw_content_url.clone(),
            gemini_api_url: cli.gemini_api_url.clone(),
        }
    }
}

// An env var set to the empty string reads as unset.
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
