use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use xtdb_query::catalog::TypeKeeper;
use xtdb_query::server::{router, AppState};
use xtdb_query::settings::Settings;
use xtdb_query::translate::Translator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let catalog = match &settings.types_path {
        Some(path) => TypeKeeper::from_path(path)?,
        None => {
            warn!("no types_path configured, every search will match nothing");
            TypeKeeper::new()
        }
    };
    info!(types = catalog.len(), lucene = settings.lucene_enabled, "type catalog loaded");

    let translator = Translator::from_settings(Arc::new(catalog), &settings);
    let app = router(Arc::new(AppState::new(translator)));
    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!(address = %settings.bind_address, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
