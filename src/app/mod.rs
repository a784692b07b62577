mod wiring;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as AnyhowContext, Result};
use tokio_util::sync::CancellationToken;

use crate::cli::{self, Cli, Command};
use crate::context::Context;
use crate::rest::{self, AppState};
use crate::sync::SyncService;

pub struct App {
    pub ctx: Context,
    pub state: AppState,
}

impl App {
    pub fn from_cli() -> Result<(Self, Cli)> {
        let cli = cli::parse();
        let ctx = Context::from_cli(&cli);

        crate::tracing::init(ctx.log_file.as_deref().map(Path::new));
        log::info!("🚀 Starting folio");
        log::info!("🌐 Listen: {}", ctx.listen);
        log::info!("📂 Data dir: {}", ctx.data_dir);
        log::info!("🗃️ Store: {}", ctx.store);
        if let Some(username) = &ctx.github_username {
            log::info!("🐙 GitHub account: {}", username);
        }
        if let Some(path) = ctx.log_file.as_deref() {
            log::info!("📝 Log file: {}", path);
        }

        wiring::init_data_dir(&ctx).context("initializing data dir")?;
        let store = wiring::init_store(&ctx)?;
        let source = wiring::build_source(&ctx)?;
        let summarizer = wiring::build_summarizer(&ctx)?;
        let sync = Arc::new(SyncService::new(source, summarizer, store.clone()));

        let state = AppState {
            store,
            sync,
            data_dir: std::path::PathBuf::from(&ctx.data_dir),
            admin_token: ctx.admin_token.clone(),
            started_at: std::time::SystemTime::now(),
        };

        Ok((Self { ctx, state }, cli))
    }
}

pub async fn run_daemon(app: App) -> Result<()> {
    let shutdown = CancellationToken::new();

    let listen = app.ctx.listen;
    let rest_state = app.state.clone();
    let rest_shutdown = shutdown.clone();

    let mut rest_handle = tokio::spawn(async move {
        if let Err(e) = rest::serve(listen, rest_state, rest_shutdown).await {
            log::error!("REST server error: {}", e);
        }
    });

    let joined = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("🧨 Ctrl-C received, shutting down");
            None
        }
        joined = &mut rest_handle => Some(joined),
    };

    shutdown.cancel();
    let joined = match joined {
        Some(joined) => joined,
        None => rest_handle.await,
    };

    if let Err(e) = joined {
        log::error!("REST server task error: {}", e);
        return Err(e.into());
    }

    log::info!("✅ Shutdown complete");
    Ok(())
}

pub async fn run() -> Result<()> {
    let (app, cli) = App::from_cli()?;

    if let Some(cmd) = &cli.cmd {
        // one-shot command mode
        return run_command(&app, cmd).await;
    }

    run_daemon(app).await
}

async fn run_command(app: &App, cmd: &Command) -> Result<()> {
    match cmd {
        Command::RefreshAll => {
            let count = app.state.sync.refresh_all().await?;
            log::info!("✅ refreshed {} repositories", count);
        }
        Command::Refresh { name } => {
            app.state.sync.refresh_one(name).await?;
            log::info!("✅ refreshed {}", name);
        }
        Command::RegenerateAll => {
            let count = app.state.sync.regenerate_all().await?;
            log::info!("✅ regenerated summaries for {} repositories", count);
        }
    }
    Ok(())
}
