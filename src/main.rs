use building_vote::{
    api,
    config::{self, StorageBackend, database},
    context::AppContext,
    errors::Result,
    store::{MemoryStore, SeaOrmStore, VoteStore},
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the store
    let store: Arc<dyn VoteStore> = match app_config.backend {
        StorageBackend::Sqlite => {
            let db = database::create_connection(&app_config.database_url)
                .await
                .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
            database::create_tables(&db)
                .await
                .inspect(|_| info!("Database initialized successfully."))
                .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
            Arc::new(SeaOrmStore::new(db))
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory store; votes are lost on restart.");
            Arc::new(MemoryStore::new())
        }
    };

    // 5. Serve
    let ctx = AppContext::new(store, app_config.schedule);
    let app = api::create_app(ctx, &app_config.static_dir);
    api::serve(app, app_config.port).await
}
