mod app;
mod cli;
mod context;
mod github;
mod merge;
mod rest;
mod retry;
mod socials;
mod store;
mod summarizer;
mod sync;
mod tracing;
mod types;

#[cfg(test)]
mod integration_tests;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
