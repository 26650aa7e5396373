use std::sync::Arc;

use naylos::config::AppConfig;
use naylos::error::AppError;
use naylos::routes::create_router;
use naylos::services::sheet::{self, SheetClient, SyncStatus};
use naylos::services::storage::{JsonFileStore, RecordStore};
use naylos::state::AppState;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;

    let store = JsonFileStore::new(config.data_root.clone());
    store.ensure_structure().await?;
    let store: Arc<dyn RecordStore> = Arc::new(store);

    let sheet = SheetClient::new(config.sheet_url.clone());
    let sync = SyncStatus::default();
    let sheet_queue = sheet::spawn_push_worker(sheet.clone(), sync.clone());

    // Seeds the store from the sheet when empty; the page is served
    // (empty) before this resolves.
    tokio::spawn(sheet::bootstrap_if_empty(sheet, store.clone(), sync.clone()));

    let state = AppState::new(config.clone(), store, sheet_queue, sync);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,naylos=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
