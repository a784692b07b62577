use std::env;
use std::fmt;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Sqlite,
    File,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Sqlite => write!(f, "sqlite"),
            StoreKind::File => write!(f, "file"),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(
        about = "Refresh the GitHub snapshot for every repository",
        long_about = "List all repositories for the configured account, fetch each language breakdown, and overwrite the GitHub snapshot wholesale."
    )]
    RefreshAll,
    #[command(
        about = "Refresh the GitHub snapshot for a single repository",
        long_about = "Fetch one repository's metadata and language breakdown and upsert it into the GitHub snapshot, leaving other rows untouched."
    )]
    Refresh {
        #[arg(long, value_name = "NAME")]
        name: String,
    },
    #[command(
        about = "Rebuild the curated snapshot from READMEs",
        long_about = "Summarize every repository's README through the configured summarizer and overwrite the curated snapshot. Repositories without a usable README get a placeholder summary."
    )]
    RegenerateAll,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Portfolio backend: caches GitHub repository metadata, merges it with curated summaries, and serves the result over REST",
    long_about = "Serves a merged per-repository view built from two snapshot documents (admin-curated summaries and cached GitHub metadata), with admin endpoints to refresh either snapshot from the GitHub API and an LLM summarizer.\n\nEnvironment:\n  GITHUB_USERNAME      GitHub account to aggregate\n  GITHUB_TOKEN         GitHub API token\n  GEMINI_API_KEY       Summarizer API key\n  FOLIO_ADMIN_TOKEN    Shared token for mutating endpoints\n",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    #[arg(
        long,
        env = "FOLIO_LISTEN",
        default_value = "127.0.0.1:8086",
        value_name = "ADDR",
        help = "REST listen address (host:port)"
    )]
    pub listen: std::net::SocketAddr,

    #[arg(
        long,
        default_value = ".folio/",
        value_name = "DIR",
        help = "Directory to store persistent data"
    )]
    pub data_dir: String,

    #[arg(
        long,
        value_enum,
        default_value_t = StoreKind::Sqlite,
        help = "Snapshot store backend"
    )]
    pub store: StoreKind,

    #[arg(
        long,
        default_value_t = false,
        help = "Reset all persisted snapshots before starting"
    )]
    pub reset: bool,

    #[arg(
        long = "log-file",
        env = "FOLIO_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[arg(
        long,
        env = "GITHUB_USERNAME",
        value_name = "USER",
        help = "GitHub account whose repositories are aggregated"
    )]
    pub github_username: Option<String>,

    #[arg(
        long,
        env = "GITHUB_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        help = "GitHub API token"
    )]
    pub github_token: Option<String>,

    #[arg(
        long,
        env = "GEMINI_API_KEY",
        value_name = "KEY",
        hide_env_values = true,
        help = "API key for README summarization"
    )]
    pub gemini_api_key: Option<String>,

    #[arg(
        long,
        env = "FOLIO_ADMIN_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        help = "Shared token required by mutating endpoints (open when unset)"
    )]
    pub admin_token: Option<String>,

    #[arg(
        long,
        env = "FOLIO_GITHUB_API_URL",
        default_value = "https://api.github.com",
        value_name = "URL",
        help = "GitHub API base URL"
    )]
    pub github_api_url: String,

    #[arg(
        long,
        env = "FOLIO_RAW_CONTENT_URL",
        default_value = "https://raw.githubusercontent.com",
        value_name = "URL",
        help = "Raw content base URL for README fetches"
    )]
    pub raw_content_url: String,

    #[arg(
        long,
        env = "FOLIO_GEMINI_API_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent",
        value_name = "URL",
        help = "Summarizer endpoint"
    )]
    pub gemini_api_url: String,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}
