use anyhow::Result;
use clap::Args;
use colored::Colorize;
use copydesk_server::{
    build_router, AppState, Config, DeferredApplier, EditApplier, ImmediateApplier,
    OriginMatcher, PageMap,
};
use copydesk_store::{EditStore, SqliteStore};
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the bind address from the config
    #[arg(short, long)]
    pub bind: Option<String>,
}

pub fn serve(args: ServeArgs, cwd: &str) -> Result<()> {
    let mut config = Config::load(cwd)?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let store: Arc<dyn EditStore> = Arc::new(SqliteStore::open(
        &std::path::PathBuf::from(cwd).join(&config.db_path),
    )?);

    let applier: Arc<dyn EditApplier> = if config.environment.is_production() {
        Arc::new(DeferredApplier)
    } else {
        Arc::new(ImmediateApplier::new(PageMap::new(
            config.get_content_dir(cwd),
            config.pages.clone(),
        )))
    };

    let state = Arc::new(AppState {
        store,
        applier,
        origins: OriginMatcher::new(&config.allowed_origins),
    });

    println!(
        "{} edit intake on {} ({:?})",
        "Serving".green().bold(),
        config.bind_addr,
        config.environment
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let app = build_router(state);
        let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    })
}
