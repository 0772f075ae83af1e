use copydesk_server::{
    build_router, AppState, Config, DeferredApplier, EditApplier, ImmediateApplier,
    OriginMatcher, PageMap,
};
use copydesk_store::{EditStore, SqliteStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cwd = std::env::current_dir()?;
    let cwd_str = cwd.to_string_lossy().to_string();
    let config = Config::load(&cwd_str)?;

    let store: Arc<dyn EditStore> = Arc::new(SqliteStore::open(&cwd.join(&config.db_path))?);

    let applier: Arc<dyn EditApplier> = if config.environment.is_production() {
        Arc::new(DeferredApplier)
    } else {
        Arc::new(ImmediateApplier::new(PageMap::new(
            config.get_content_dir(&cwd_str),
            config.pages.clone(),
        )))
    };

    let state = Arc::new(AppState {
        store,
        applier,
        origins: OriginMatcher::new(&config.allowed_origins),
    });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        environment = ?config.environment,
        "copydesk edit intake listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
