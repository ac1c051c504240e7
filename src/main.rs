use dotenvy::dotenv;
use ledger_core::{
    config::load_app_settings,
    core::{AppState, ConnectivityFlag, MockRemote, SyncReconciler},
    errors::Result,
    store::EntityStore,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Settings from ledger.toml and the environment
    let settings = load_app_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Open the store
    let store = EntityStore::open(&settings.database_url)
        .await
        .inspect(|_| info!("Store opened at {}", settings.database_url))
        .inspect_err(|e| error!("Failed to open store: {}", e))?;

    // 5. Wire the remote and build application state
    let remote = Arc::new(MockRemote::new(Duration::from_millis(
        settings.sync.remote_delay_ms,
    )));
    let connectivity = Arc::new(ConnectivityFlag::new(settings.sync.online));
    let sync = SyncReconciler::new(store.clone(), remote, connectivity);
    let state = AppState::new(store, Some(sync), settings.seed_demo_data);

    // 6. Cold start
    state
        .initialize()
        .await
        .inspect_err(|e| error!("Failed to initialize application state: {}", e))?;

    let collections = state.snapshot().await;
    for wallet in &collections.wallets {
        info!(
            "{:<12} {:>14} {}",
            wallet.name, wallet.current_balance, wallet.currency
        );
    }
    match state.last_sync_at().await? {
        Some(at) => info!("Last synced at {}", at),
        None => info!("Never synced"),
    }

    let drift = state.ledger()?.audit().await?;
    if drift.is_empty() {
        info!("All wallet balances match their transaction logs");
    }

    Ok(())
}
